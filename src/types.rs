use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
    Mark,
    Space,
}

impl FromStr for Parity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Parity::None),
            "even" => Ok(Parity::Even),
            "odd" => Ok(Parity::Odd),
            "mark" => Ok(Parity::Mark),
            "space" => Ok(Parity::Space),
            _ => Err(ConfigError::InvalidSetting {
                field: "Parity mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    None,
    One,
    OnePointFive,
    Two,
}

impl FromStr for StopBits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(StopBits::None),
            "1" => Ok(StopBits::One),
            "1.5" => Ok(StopBits::OnePointFive),
            "2" => Ok(StopBits::Two),
            _ => Err(ConfigError::InvalidSetting {
                field: "Stop bits",
                value: s.to_string(),
            }),
        }
    }
}

/// Handshake used on the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    RequestToSend,
    RequestToSendXOnXOff,
    XOnXOff,
}

impl FromStr for FlowControl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FlowControl::None),
            "rts" => Ok(FlowControl::RequestToSend),
            "rtsxonxoff" => Ok(FlowControl::RequestToSendXOnXOff),
            "xonxoff" => Ok(FlowControl::XOnXOff),
            _ => Err(ConfigError::InvalidSetting {
                field: "FlowControl",
                value: s.to_string(),
            }),
        }
    }
}

/// Stages a transaction moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Configuring,
    Opening,
    Transmitting,
    Waiting,
    Verifying,
    Closed,
    Aborted,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of the completeness check made at the deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// At least the expected number of bytes arrived
    Complete,
    /// Fewer bytes than expected arrived; zero means no answer at all
    Incomplete { received: usize, expected: usize },
}

impl Verdict {
    /// Compare the received byte count against the expected length
    pub fn evaluate(received: usize, expected: usize) -> Self {
        if received < expected {
            Verdict::Incomplete { received, expected }
        } else {
            Verdict::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Verdict::Complete)
    }
}

/// Result of one send/wait/verify cycle
#[derive(Debug, Clone)]
pub struct TransactionReport {
    pub verdict: Verdict,
    pub received: Vec<u8>,
    pub expected_len: usize,
    pub final_state: TransactionState,
}
