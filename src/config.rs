//! Serial settings: raw values from file and environment, and the validated
//! [`ChannelConfiguration`] built from them.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::constants::*;
use crate::error::ConfigError;
use crate::types::{FlowControl, Parity, StopBits};

/// Unvalidated serial settings as they appear in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: String,
    pub stop_bits: String,
    pub flow_control: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            parity: DEFAULT_PARITY.to_string(),
            stop_bits: DEFAULT_STOP_BITS.to_string(),
            flow_control: DEFAULT_FLOW_CONTROL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `rs232c.toml` in the working
    /// directory if present, then apply `RS232C_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_overrides(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())?;
        Ok(settings)
    }

    /// Read and parse a TOML settings file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&text).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Replace fields for which `lookup` yields a value. Keys are the
    /// upper-case field names without prefix.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BAUD_RATE") {
            self.baud_rate = value.trim().parse().map_err(|_| ConfigError::NotAnInteger {
                field: "BaudRate",
                value,
            })?;
        }
        if let Some(value) = lookup("DATA_BITS") {
            self.data_bits = value.trim().parse().map_err(|_| ConfigError::NotAnInteger {
                field: "DataBits",
                value,
            })?;
        }
        if let Some(value) = lookup("PARITY") {
            self.parity = value;
        }
        if let Some(value) = lookup("STOP_BITS") {
            self.stop_bits = value;
        }
        if let Some(value) = lookup("FLOW_CONTROL") {
            self.flow_control = value;
        }
        Ok(())
    }
}

/// Validated, immutable serial parameters for one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfiguration {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl ChannelConfiguration {
    /// Resolve every textual setting. Baud rate and data bits are passed
    /// through unchecked; opening the port decides whether they are usable.
    pub fn build(port_name: &str, settings: &Settings) -> Result<Self, ConfigError> {
        let config = Self {
            port_name: port_name.to_string(),
            baud_rate: settings.baud_rate,
            data_bits: settings.data_bits,
            parity: settings.parity.parse()?,
            stop_bits: settings.stop_bits.parse()?,
            flow_control: settings.flow_control.parse()?,
        };
        debug!("Channel configuration: {:?}", config);
        Ok(config)
    }
}
