//! Defaults and timing parameters for a single send/receive transaction.

/// Baud rate used when no setting overrides it
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Data bits used when no setting overrides it
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Parity used when no setting overrides it
pub const DEFAULT_PARITY: &str = "none";

/// Stop bits used when no setting overrides it
pub const DEFAULT_STOP_BITS: &str = "1";

/// Flow control used when no setting overrides it
pub const DEFAULT_FLOW_CONTROL: &str = "none";

/// Time to wait for the reply after the frame is written, in milliseconds
pub const DEFAULT_WAIT_MS: u64 = 1000;

/// Driver-level read timeout. Reads only ask for bytes already buffered, so
/// this bounds how long a read can stall if the driver misreports.
pub const READ_TIMEOUT_MS: u64 = 100;

/// How long the receiver yields when nothing is buffered
pub const POLL_INTERVAL_MS: u64 = 2;

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_SETTINGS_FILE: &str = "rs232c.toml";

/// Prefix for environment variable overrides (`RS232C_BAUD_RATE`, ...)
pub const ENV_PREFIX: &str = "RS232C_";

/// Timestamp layout of the diagnostic line, e.g. `[ 2026/10/16 9:05:03 +09:00]`
pub const DIAGNOSTIC_TIMESTAMP_FORMAT: &str = "[ %Y/%m/%d %-H:%M:%S %:z]";

/// Message written when fewer reply bytes than expected arrived
pub const INCOMPLETE_RESPONSE_MESSAGE: &str = "Can not data received.";
