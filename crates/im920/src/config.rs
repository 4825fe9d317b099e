//! Driver configuration.
//!
//! Every field has a default, so a YAML file only needs the keys it changes:
//!
//! ```yaml
//! port_name: /dev/ttyUSB0
//! read_timeout_ms: 2000
//! ```

use std::path::Path;
use std::time::Duration;

use im920_protocol::DEFAULT_BAUD_RATE;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default overall deadline for one receive call (milliseconds).
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;
/// Default quiet time that ends a receive burst (milliseconds).
pub const DEFAULT_IDLE_GAP_MS: u64 = 0;
/// Default deadline for the busy check to clear (milliseconds).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 500;
/// Default interval between busy check polls (milliseconds).
pub const DEFAULT_BUSY_POLL_INTERVAL_MS: u64 = 10;

/// Configuration for an [`Im920`](crate::Im920) driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Serial port the module is attached to (e.g. `/dev/ttyUSB0`, `COM4`).
    pub port_name: String,
    /// Serial baud rate.
    pub baud_rate: u32,
    /// Overall deadline for one receive call.
    pub read_timeout_ms: u64,
    /// How long the line must stay quiet after data before a receive call
    /// returns. Zero ends the burst on the first empty poll.
    pub idle_gap_ms: u64,
    /// How long to wait for the busy check to clear before giving up.
    pub busy_timeout_ms: u64,
    /// How often to poll the busy check.
    pub busy_poll_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            idle_gap_ms: DEFAULT_IDLE_GAP_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            busy_poll_interval_ms: DEFAULT_BUSY_POLL_INTERVAL_MS,
        }
    }
}

impl DriverConfig {
    /// Create a configuration for the given port with default timings.
    pub fn new(port_name: impl Into<String>) -> Self {
        DriverConfig {
            port_name: port_name.into(),
            ..Default::default()
        }
    }

    /// Set the overall receive deadline.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the quiet time that ends a receive burst.
    pub fn with_idle_gap(mut self, gap: Duration) -> Self {
        self.idle_gap_ms = duration_ms(gap);
        self
    }

    /// Set the busy check deadline.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = duration_ms(timeout);
        self
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: DriverConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check the timings and baud rate.
    ///
    /// The port name is only checked when opening a real serial port.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::config("baud_rate must be non-zero"));
        }
        if self.read_timeout_ms == 0 {
            return Err(Error::config("read_timeout_ms must be non-zero"));
        }
        if self.busy_poll_interval_ms == 0 {
            return Err(Error::config("busy_poll_interval_ms must be non-zero"));
        }
        Ok(())
    }

    /// Overall receive deadline.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Quiet time that ends a receive burst.
    pub fn idle_gap(&self) -> Duration {
        Duration::from_millis(self.idle_gap_ms)
    }

    /// Busy check deadline.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Busy check poll interval.
    pub fn busy_poll_interval(&self) -> Duration {
        Duration::from_millis(self.busy_poll_interval_ms)
    }

    /// Per-read timeout handed to the serial port: the time 100 bytes take
    /// on the wire at the configured baud rate.
    pub fn port_read_timeout(&self) -> Duration {
        Duration::from_millis(1000 * 100 * 8 / u64::from(self.baud_rate.max(1)))
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
