//! # rs232c
//!
//! Send a byte payload to a device on a serial line, listen for the reply for
//! a fixed time, and report whether enough reply bytes arrived.
//!
//! A background thread drains the port while the main flow writes the frame
//! and sleeps until the deadline. Every received chunk is echoed as hex; a
//! short reply produces one timestamped diagnostic line.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use rs232c::{Settings, Transaction};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let payload = vec![0x02, 0x31, 0x03];
//!     let mut tx = Transaction::new("/dev/ttyUSB0", Settings::default(), payload, 10)
//!         .with_wait(Duration::from_millis(2000));
//!     let report = tx.run(&mut std::io::stdout(), &mut std::io::stderr())?;
//!     println!("\n{:?}", report.verdict);
//!     Ok(())
//! }
//! ```

pub mod accumulator;
pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod ports;
pub mod receiver;
pub mod trace;
pub mod transaction;
pub mod types;

#[cfg(test)]
mod testing;

pub use accumulator::ResponseAccumulator;
pub use channel::{SerialChannel, Transport};
pub use config::{ChannelConfiguration, Settings};
pub use error::{ChannelError, ConfigError, Error, Result};
pub use receiver::BackgroundReceiver;
pub use transaction::Transaction;
pub use types::*;
