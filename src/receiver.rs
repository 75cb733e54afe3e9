//! Background receiver
//!
//! A scoped thread that polls the channel for buffered bytes and hands each
//! chunk to a callback until the channel is closed.

use std::sync::mpsc;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;

use log::{debug, trace};

use crate::channel::SerialChannel;
use crate::constants::POLL_INTERVAL_MS;
use crate::error::ChannelError;

/// Handle to a running receiver thread
pub struct BackgroundReceiver<'scope> {
    handle: ScopedJoinHandle<'scope, usize>,
}

impl<'scope> BackgroundReceiver<'scope> {
    /// Spawn the receiver and wait until it reports that it is running.
    pub fn start<'env, F>(
        scope: &'scope Scope<'scope, 'env>,
        channel: &'scope SerialChannel,
        on_chunk: F,
    ) -> Result<Self, ChannelError>
    where
        F: FnMut(&[u8]) + Send + 'scope,
    {
        let (started_tx, started_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("rs232c-receiver".to_string())
            .spawn_scoped(scope, move || {
                let _ = started_tx.send(());
                drain(channel, on_chunk)
            })?;

        started_rx.recv().map_err(|_| {
            ChannelError::Io(std::io::Error::other("receiver thread exited before starting"))
        })?;
        debug!("Receiver started on {}", channel.port_name());
        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to observe the close and exit. Returns the number
    /// of bytes it forwarded.
    pub fn join(self) -> thread::Result<usize> {
        self.handle.join()
    }
}

/// Receive loop. Runs until the channel is closed and returns the number of
/// bytes forwarded to `on_chunk`.
///
/// The count from `bytes_available` can be stale by the time the read
/// finishes; later bytes are picked up on the next pass. Errors end the
/// current pass only.
pub fn drain<F>(channel: &SerialChannel, mut on_chunk: F) -> usize
where
    F: FnMut(&[u8]),
{
    let poll = Duration::from_millis(POLL_INTERVAL_MS);
    let mut forwarded = 0;

    while channel.is_open() {
        match channel.bytes_available() {
            Ok(0) => thread::sleep(poll),
            Ok(available) => match channel.read_exact(available) {
                Ok(chunk) if !chunk.is_empty() => {
                    trace!("Received {} bytes", chunk.len());
                    forwarded += chunk.len();
                    on_chunk(&chunk);
                }
                Ok(_) => {}
                Err(e) => trace!("Read on {} failed: {}", channel.port_name(), e),
            },
            Err(e) => {
                trace!("Poll on {} failed: {}", channel.port_name(), e);
                thread::sleep(poll);
            }
        }
    }

    debug!("Receiver on {} stopped after {} bytes", channel.port_name(), forwarded);
    forwarded
}
