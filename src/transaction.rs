//! Transaction controller
//!
//! One transaction sends one frame, waits the full deadline, and compares the
//! number of reply bytes against the expected length:
//!
//! ```text
//! Idle -> Configuring -> Opening -> Transmitting -> Waiting -> Verifying -> Closed
//!              \______________\____________\________________________________-> Aborted
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::accumulator::ResponseAccumulator;
use crate::channel::SerialChannel;
use crate::config::{ChannelConfiguration, Settings};
use crate::constants::DEFAULT_WAIT_MS;
use crate::error::{ChannelError, Error, Result};
use crate::receiver::BackgroundReceiver;
use crate::trace;
use crate::types::{TransactionReport, TransactionState, Verdict};

/// A single send/wait/verify cycle against one port
pub struct Transaction {
    port_name: String,
    settings: Settings,
    payload: Vec<u8>,
    expected_len: usize,
    wait: Duration,
    state: TransactionState,
}

impl Transaction {
    pub fn new(port_name: &str, settings: Settings, payload: Vec<u8>, expected_len: usize) -> Self {
        Self {
            port_name: port_name.to_string(),
            settings,
            payload,
            expected_len,
            wait: Duration::from_millis(DEFAULT_WAIT_MS),
            state: TransactionState::Idle,
        }
    }

    /// Set how long to wait for the reply after the frame is written
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Read a payload file completely into memory
    pub fn load_payload(path: &Path) -> Result<Vec<u8>> {
        let payload = fs::read(path).map_err(|source| Error::Payload {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} byte payload from {}", payload.len(), path.display());
        Ok(payload)
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Run against the real serial port named at construction.
    pub fn run<T, D>(&mut self, trace_out: &mut T, diagnostic_out: &mut D) -> Result<TransactionReport>
    where
        T: Write + Send,
        D: Write,
    {
        self.run_with(SerialChannel::open, trace_out, diagnostic_out)
    }

    /// Run with a caller supplied way of opening the channel.
    ///
    /// Received chunks are echoed to `trace_out` as they arrive. A short
    /// response writes one timestamped line to `diagnostic_out` and is still
    /// returned as `Ok`; only configuration, open and write failures are
    /// errors.
    pub fn run_with<O, T, D>(
        &mut self,
        open: O,
        trace_out: &mut T,
        diagnostic_out: &mut D,
    ) -> Result<TransactionReport>
    where
        O: FnOnce(&ChannelConfiguration) -> std::result::Result<SerialChannel, ChannelError>,
        T: Write + Send,
        D: Write,
    {
        self.transition(TransactionState::Configuring);
        let config = match ChannelConfiguration::build(&self.port_name, &self.settings) {
            Ok(config) => config,
            Err(e) => return Err(self.abort(e.into())),
        };

        self.transition(TransactionState::Opening);
        let channel = match open(&config) {
            Ok(channel) => channel,
            Err(e) => return Err(self.abort(e.into())),
        };

        let accumulator = ResponseAccumulator::new();
        let verdict = thread::scope(|s| {
            let receiver = BackgroundReceiver::start(s, &channel, |chunk| {
                accumulator.append(chunk);
                if let Err(e) = trace::write_chunk(trace_out, chunk) {
                    warn!("Failed to echo received bytes: {}", e);
                }
            });
            let receiver = match receiver {
                Ok(receiver) => receiver,
                Err(e) => {
                    channel.close();
                    return Err(self.abort(e.into()));
                }
            };

            self.transition(TransactionState::Transmitting);
            if let Err(e) = channel.write(&self.payload) {
                channel.close();
                Self::join(receiver);
                return Err(self.abort(e.into()));
            }

            self.transition(TransactionState::Waiting);
            thread::sleep(self.wait);

            self.transition(TransactionState::Verifying);
            let verdict = Verdict::evaluate(accumulator.byte_count(), self.expected_len);
            if let Verdict::Incomplete { received, expected } = verdict {
                info!("Response incomplete: {} of {} bytes", received, expected);
                if let Err(e) = trace::report_incomplete(diagnostic_out) {
                    warn!("Failed to write diagnostic line: {}", e);
                }
            }

            channel.close();
            Self::join(receiver);
            self.transition(TransactionState::Closed);
            Ok(verdict)
        })?;

        info!("Transaction on {} finished: {:?}", self.port_name, verdict);
        Ok(TransactionReport {
            verdict,
            received: accumulator.snapshot(),
            expected_len: self.expected_len,
            final_state: self.state,
        })
    }

    fn join(receiver: BackgroundReceiver<'_>) {
        if receiver.join().is_err() {
            error!("Receiver thread panicked");
        }
    }

    fn transition(&mut self, next: TransactionState) {
        debug!("{} -> {}", self.state, next);
        self.state = next;
    }

    fn abort(&mut self, e: Error) -> Error {
        self.transition(TransactionState::Aborted);
        e
    }
}
