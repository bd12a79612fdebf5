//! Link configuration.
//!
//! Loaded from a JSON file; every field has a default so a partial file
//! (or none at all) is valid.
//!
//! # Example
//!
//! ```
//! use alex_link::config::LinkConfig;
//!
//! let config = LinkConfig::from_json(r#"{ "port": "/dev/ttyUSB0" }"#).unwrap();
//! assert_eq!(config.port, "/dev/ttyUSB0");
//! assert_eq!(config.reboot_delay_ms, 2000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// Default serial device node.
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Default wait for the device to reboot after the port opens.
pub const DEFAULT_REBOOT_DELAY_MS: u64 = 2000;

/// Default line speed.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default serial read timeout. Bounds how long a receive can go without
/// checking its cancel token.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings for one link session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Serial device node.
    pub port: String,
    /// Line speed; the line is always 8N1 without flow control.
    pub baud_rate: u32,
    /// Milliseconds a serial read waits before reporting "no data yet".
    pub read_timeout_ms: u64,
    /// Milliseconds to wait after opening the port before the handshake.
    pub reboot_delay_ms: u64,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Print reports as JSON instead of text.
    pub json_reports: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            reboot_delay_ms: DEFAULT_REBOOT_DELAY_MS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_reports: false,
        }
    }
}

impl LinkConfig {
    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LinkError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Reboot delay as a duration.
    pub fn reboot_delay(&self) -> Duration {
        Duration::from_millis(self.reboot_delay_ms)
    }

    /// Serial read timeout as a duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(LinkError::Config("port must not be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(LinkError::Config("baud_rate must be positive".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(LinkError::Config("read_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_millis(10));
        assert_eq!(config.reboot_delay(), Duration::from_secs(2));
        assert_eq!(config.log_level, "info");
        assert!(!config.json_reports);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(LinkConfig::from_json("{}").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            LinkConfig::from_json(r#"{ "reboot_delay_ms": 0, "json_reports": true }"#).unwrap();
        assert_eq!(config.reboot_delay_ms, 0);
        assert!(config.json_reports);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = LinkConfig::from_json(r#"{ "baud": 9600 }"#);
        assert!(matches!(result, Err(LinkError::Json(_))));
    }

    #[test]
    fn test_empty_port_rejected() {
        let result = LinkConfig::from_json(r#"{ "port": "  " }"#);
        assert!(matches!(result, Err(LinkError::Config(_))));
    }

    #[test]
    fn test_line_settings() {
        let config =
            LinkConfig::from_json(r#"{ "baud_rate": 115200, "read_timeout_ms": 50 }"#).unwrap();
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.read_timeout(), Duration::from_millis(50));

        let result = LinkConfig::from_json(r#"{ "baud_rate": 0 }"#);
        assert!(matches!(result, Err(LinkError::Config(_))));
        let result = LinkConfig::from_json(r#"{ "read_timeout_ms": 0 }"#);
        assert!(matches!(result, Err(LinkError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "port": "/dev/ttyUSB1" }}"#).unwrap();

        let config = LinkConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, "/dev/ttyUSB1");
    }

    #[test]
    fn test_from_missing_file() {
        let result = LinkConfig::from_file("/nonexistent/alex-link.json");
        assert!(matches!(result, Err(LinkError::Config(_))));
    }
}
