//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::channel::{SerialChannel, Transport};

/// Inbound queue shared between a test and its [`Loopback`]
pub type Inbound = Arc<Mutex<VecDeque<u8>>>;

/// Everything written comes back as inbound data; tests may also push
/// bytes directly into the inbound queue.
pub struct Loopback {
    inbound: Inbound,
    failures: Mutex<usize>,
}

impl Loopback {
    /// Channel backed by a loopback, plus a handle to its inbound queue
    pub fn channel() -> (SerialChannel, Inbound) {
        Self::flaky_channel(0)
    }

    /// Like [`Loopback::channel`] but the first `failures` calls to
    /// `bytes_to_read` fail with an I/O error.
    pub fn flaky_channel(failures: usize) -> (SerialChannel, Inbound) {
        let inbound = Inbound::default();
        let transport = Loopback {
            inbound: Arc::clone(&inbound),
            failures: Mutex::new(failures),
        };
        (SerialChannel::from_transport("loop", Box::new(transport)), inbound)
    }
}

impl Read for Loopback {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inbound = self.inbound.lock().unwrap();
        if inbound.is_empty() {
            drop(inbound);
            thread::sleep(Duration::from_millis(1));
            return Err(io::Error::new(ErrorKind::TimedOut, "no data"));
        }
        let n = buf.len().min(inbound.len());
        for (slot, byte) in buf.iter_mut().zip(inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for Loopback {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inbound.lock().unwrap().extend(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for Loopback {
    fn bytes_to_read(&self) -> io::Result<u32> {
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(io::Error::other("line glitch"));
        }
        Ok(self.inbound.lock().unwrap().len() as u32)
    }
}
