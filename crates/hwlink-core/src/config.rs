//! Link and sampling configuration.
//!
//! Values come from three layers, lowest precedence first: built-in
//! defaults, an optional TOML file, then command-line flags (applied by the
//! CLI on top of whatever [`LinkConfig::load`] returns).
//!
//! ```toml
//! port = "/dev/ttyACM0"
//! baud = 115200
//! interval_ms = 500
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default baud rate expected by the display firmware.
pub const DEFAULT_BAUD: u32 = 9600;
/// Default delay between ticks in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
/// Default timeout for the `sensors` tool.
pub const DEFAULT_SENSORS_TIMEOUT_MS: u64 = 2000;
/// Default timeout for `nvidia-smi`.
pub const DEFAULT_GPU_TIMEOUT_MS: u64 = 5000;

/// Runtime configuration for a hwlink session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Serial device path. `None` means auto-discover.
    pub port: Option<String>,
    /// Serial baud rate.
    pub baud: u32,
    /// Delay between the end of one tick and the start of the next.
    pub interval_ms: u64,
    /// Upper bound on one `sensors` invocation.
    pub sensors_timeout_ms: u64,
    /// Upper bound on one `nvidia-smi` invocation.
    pub gpu_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            interval_ms: DEFAULT_INTERVAL_MS,
            sensors_timeout_ms: DEFAULT_SENSORS_TIMEOUT_MS,
            gpu_timeout_ms: DEFAULT_GPU_TIMEOUT_MS,
        }
    }
}

impl LinkConfig {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// Reject values the transport cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud == 0 {
            return Err(ConfigError::Invalid("baud must be greater than 0".into()));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "interval_ms must be greater than 0".into(),
            ));
        }
        if self.port.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("port must not be empty".into()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn sensors_timeout(&self) -> Duration {
        Duration::from_millis(self.sensors_timeout_ms)
    }

    pub fn gpu_timeout(&self) -> Duration {
        Duration::from_millis(self.gpu_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_firmware_expectations() {
        let c = LinkConfig::default();
        assert_eq!(c.port, None);
        assert_eq!(c.baud, 9600);
        assert_eq!(c.interval(), Duration::from_millis(1000));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = LinkConfig::from_toml_str("baud = 115200\n", Path::new("inline")).unwrap();
        assert_eq!(c.baud, 115200);
        assert_eq!(c.interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(c.port, None);
    }

    #[test]
    fn full_toml_overrides_everything() {
        let raw = r#"
            port = "/dev/ttyACM1"
            baud = 57600
            interval_ms = 250
            sensors_timeout_ms = 800
            gpu_timeout_ms = 1500
        "#;
        let c = LinkConfig::from_toml_str(raw, Path::new("inline")).unwrap();
        assert_eq!(c.port.as_deref(), Some("/dev/ttyACM1"));
        assert_eq!(c.baud, 57600);
        assert_eq!(c.interval(), Duration::from_millis(250));
        assert_eq!(c.sensors_timeout(), Duration::from_millis(800));
        assert_eq!(c.gpu_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = LinkConfig::from_toml_str("baudrate = 9600\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("x.toml"));
    }

    #[test]
    fn validate_rejects_zero_values() {
        let c = LinkConfig {
            baud: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));

        let c = LinkConfig {
            interval_ms: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));

        let c = LinkConfig {
            port: Some("  ".into()),
            ..LinkConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "interval_ms = 2000").unwrap();
        let c = LinkConfig::load(f.path()).unwrap();
        assert_eq!(c.interval_ms, 2000);
    }

    #[test]
    fn load_missing_file() {
        let err = LinkConfig::load(Path::new("/nonexistent/hwlink.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
