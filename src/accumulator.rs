//! Response accumulator shared between the receiver thread and the main flow.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Append-only record of every inbound chunk.
///
/// The byte counter is kept separately from the buffer so the main flow can
/// read the count without touching the lock.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    count: AtomicUsize,
    bytes: Mutex<Vec<u8>>,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk
    pub fn append(&self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        bytes.extend_from_slice(chunk);
        self.count.fetch_add(chunk.len(), Ordering::Release);
    }

    /// Total number of bytes appended so far
    pub fn byte_count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Copy of everything received so far, in arrival order
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn empty_chunks_are_ignored() {
        let acc = ResponseAccumulator::new();
        acc.append(&[]);
        assert_eq!(acc.byte_count(), 0);
        assert!(acc.snapshot().is_empty());
    }

    #[test]
    fn keeps_arrival_order() {
        let acc = ResponseAccumulator::new();
        acc.append(&[0x01, 0x02]);
        acc.append(&[0x03]);
        assert_eq!(acc.snapshot(), vec![0x01, 0x02, 0x03]);
        assert_eq!(acc.byte_count(), 3);
    }

    proptest! {
        #[test]
        fn count_is_sum_of_chunk_lengths(
            chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 0..40)
        ) {
            let acc = ResponseAccumulator::new();
            thread::scope(|s| {
                s.spawn(|| {
                    for chunk in &chunks {
                        acc.append(chunk);
                    }
                });
                // concurrent reader; values seen must never go down
                let mut last = 0;
                for _ in 0..100 {
                    let now = acc.byte_count();
                    assert!(now >= last);
                    last = now;
                }
            });

            let total: usize = chunks.iter().map(Vec::len).sum();
            prop_assert_eq!(acc.byte_count(), total);
            prop_assert_eq!(acc.snapshot(), chunks.concat());
        }
    }
}
