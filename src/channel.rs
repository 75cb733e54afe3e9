//! Serial channel
//!
//! Owns the open port for the duration of one transaction. The main flow
//! writes through it while the background receiver reads from it, so every
//! operation takes `&self` and the handle sits behind a mutex.

use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::debug;
use serialport::SerialPort;

use crate::config::ChannelConfiguration;
use crate::constants::READ_TIMEOUT_MS;
use crate::error::ChannelError;
use crate::types::{FlowControl, Parity, StopBits};

/// Byte transport underneath a [`SerialChannel`].
///
/// Implemented for real ports opened through `serialport`; tests and
/// simulators provide their own.
pub trait Transport: Read + Write + Send {
    /// Number of inbound bytes buffered and ready to read
    fn bytes_to_read(&self) -> io::Result<u32>;
}

impl Transport for Box<dyn SerialPort> {
    fn bytes_to_read(&self) -> io::Result<u32> {
        SerialPort::bytes_to_read(&**self).map_err(io::Error::from)
    }
}

/// An open serial connection
pub struct SerialChannel {
    port_name: String,
    port: Mutex<Option<Box<dyn Transport>>>,
    open: AtomicBool,
}

impl SerialChannel {
    /// Open the configured port with every setting applied.
    pub fn open(config: &ChannelConfiguration) -> Result<Self, ChannelError> {
        let data_bits = to_data_bits(config)?;
        let parity = to_parity(config)?;
        let stop_bits = to_stop_bits(config)?;
        let flow_control = to_flow_control(config)?;

        let port = serialport::new(&config.port_name, config.baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .flow_control(flow_control)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .map_err(|e| open_error(&config.port_name, e))?;

        debug!(
            "Opened {} at {} baud ({:?}, {:?}, {:?}, {:?})",
            config.port_name, config.baud_rate, data_bits, parity, stop_bits, flow_control
        );
        Ok(Self::from_transport(&config.port_name, Box::new(port)))
    }

    /// Wrap an already connected transport
    pub fn from_transport(port_name: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            port_name: port_name.to_string(),
            port: Mutex::new(Some(transport)),
            open: AtomicBool::new(true),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Write the whole frame and flush it to the line
    pub fn write(&self, bytes: &[u8]) -> Result<(), ChannelError> {
        let mut guard = self.lock_open()?;
        let port = guard.as_mut().ok_or(ChannelError::Closed)?;

        port.write_all(bytes)
            .and_then(|()| port.flush())
            .map_err(ChannelError::WriteFailed)?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.port_name);
        Ok(())
    }

    /// Inbound bytes ready to read, without consuming them
    pub fn bytes_available(&self) -> Result<usize, ChannelError> {
        let guard = self.lock_open()?;
        let port = guard.as_ref().ok_or(ChannelError::Closed)?;
        Ok(port.bytes_to_read()? as usize)
    }

    /// Block until exactly `n` bytes have been read.
    ///
    /// The lock is released between driver reads so the main flow can write
    /// or close meanwhile; a close during the wait yields
    /// [`ChannelError::Closed`].
    pub fn read_exact(&self, n: usize) -> Result<Vec<u8>, ChannelError> {
        let mut buffer = vec![0u8; n];
        let mut filled = 0;

        while filled < n {
            let mut guard = self.lock_open()?;
            let port = guard.as_mut().ok_or(ChannelError::Closed)?;
            match port.read(&mut buffer[filled..]) {
                Ok(0) => {
                    drop(guard);
                    thread::yield_now();
                }
                Ok(read) => filled += read,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(buffer)
    }

    /// Release the port. Closing twice is a no-op.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            let port = self.lock().take();
            drop(port);
            debug!("Closed {}", self.port_name);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Transport>>> {
        self.port.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, Option<Box<dyn Transport>>>, ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::Closed);
        }
        Ok(self.lock())
    }
}

/// Sort a driver open failure into "cannot reach the device" versus "the
/// device refused the settings". Anything raised once the device node was
/// reached counts as a rejected configuration.
fn open_error(port: &str, e: serialport::Error) -> ChannelError {
    use serialport::ErrorKind as Kind;

    match e.kind() {
        Kind::NoDevice
        | Kind::Io(ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::AddrInUse) => {
            ChannelError::PortUnavailable {
                port: port.to_string(),
                reason: e.description,
            }
        }
        Kind::InvalidInput | Kind::Unknown | Kind::Io(_) => ChannelError::InvalidParameter {
            port: port.to_string(),
            reason: e.description,
        },
    }
}

fn unsupported(config: &ChannelConfiguration, what: String) -> ChannelError {
    ChannelError::InvalidParameter {
        port: config.port_name.clone(),
        reason: what,
    }
}

fn to_data_bits(config: &ChannelConfiguration) -> Result<serialport::DataBits, ChannelError> {
    match config.data_bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        n => Err(unsupported(config, format!("{} data bits", n))),
    }
}

fn to_parity(config: &ChannelConfiguration) -> Result<serialport::Parity, ChannelError> {
    match config.parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Odd => Ok(serialport::Parity::Odd),
        other => Err(unsupported(config, format!("parity {:?}", other))),
    }
}

fn to_stop_bits(config: &ChannelConfiguration) -> Result<serialport::StopBits, ChannelError> {
    match config.stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        other => Err(unsupported(config, format!("stop bits {:?}", other))),
    }
}

fn to_flow_control(config: &ChannelConfiguration) -> Result<serialport::FlowControl, ChannelError> {
    match config.flow_control {
        FlowControl::None => Ok(serialport::FlowControl::None),
        FlowControl::RequestToSend => Ok(serialport::FlowControl::Hardware),
        FlowControl::XOnXOff => Ok(serialport::FlowControl::Software),
        other => Err(unsupported(config, format!("flow control {:?}", other))),
    }
}
