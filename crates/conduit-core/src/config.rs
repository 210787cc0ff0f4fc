//! Timeout configuration.
//!
//! Connection timeouts can be loaded from:
//! - Environment variables (`CONDUIT_READ_TIMEOUT_MS`, `CONDUIT_WRITE_TIMEOUT_MS`)
//! - A TOML document, either standalone or as a table embedded in an
//!   application's own configuration

use crate::handler::Timeouts;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the default read timeout.
pub const READ_TIMEOUT_ENV: &str = "CONDUIT_READ_TIMEOUT_MS";

/// Environment variable overriding the default write timeout.
pub const WRITE_TIMEOUT_ENV: &str = "CONDUIT_WRITE_TIMEOUT_MS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection timeout configuration, in milliseconds.
///
/// Zero means "unspecified": the connection layer falls back to its own
/// default.
///
/// A field missing from the TOML document takes its value from the
/// matching environment variable ([`READ_TIMEOUT_ENV`], [`WRITE_TIMEOUT_ENV`]),
/// also when the table is embedded in an application's own configuration.
/// Unset or unparsable variables yield zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Read timeout in milliseconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,

    /// Write timeout in milliseconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
}

fn default_read_timeout() -> u64 {
    env_millis(READ_TIMEOUT_ENV)
}

fn default_write_timeout() -> u64 {
    env_millis(WRITE_TIMEOUT_ENV)
}

fn env_millis(key: &str) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout(),
            write_timeout_ms: default_write_timeout(),
        }
    }
}

impl TimeoutConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has
    /// mistyped fields.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// The configured timeouts as durations.
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::new(
            Duration::from_millis(self.read_timeout_ms),
            Duration::from_millis(self.write_timeout_ms),
        )
    }
}

impl From<&TimeoutConfig> for Timeouts {
    fn from(config: &TimeoutConfig) -> Self {
        config.timeouts()
    }
}
