//! Process-wide protocol configuration.

use envelope::COMPLETION_RECORD_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

pub const DEFAULT_SHARED_REGION_BASE: u64 = 0x2009_0000;
pub const DEFAULT_MAX_COMPLETION_LEN: u32 = 4096;

static INSTALLED: OnceLock<ProtocolConfig> = OnceLock::new();
static FALLBACK: ProtocolConfig = ProtocolConfig::DEFAULT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Protocol config is already installed")]
    AlreadyInstalled,
}

/// Settings shared by every client in the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Address the service's completion region is mapped at.
    pub shared_region_base: u64,
    /// Largest completion payload a reader accepts.
    pub max_completion_len: u32,
}

impl ProtocolConfig {
    pub const DEFAULT: ProtocolConfig = ProtocolConfig {
        shared_region_base: DEFAULT_SHARED_REGION_BASE,
        max_completion_len: DEFAULT_MAX_COMPLETION_LEN,
    };

    pub fn with_shared_region_base(mut self, base: u64) -> Self {
        self.shared_region_base = base;
        self
    }

    pub fn with_max_completion_len(mut self, len: u32) -> Self {
        self.max_completion_len = len;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.max_completion_len as usize) < COMPLETION_RECORD_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_completion_len {} is smaller than a {} byte completion record",
                self.max_completion_len, COMPLETION_RECORD_SIZE
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Parses and validates. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ProtocolConfig =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data =
            fs::read_to_string(path.as_ref()).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_json(&data)
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Installs the process-wide config. Only the first call succeeds.
pub fn install(config: ProtocolConfig) -> Result<(), ConfigError> {
    config.validate()?;
    INSTALLED
        .set(config)
        .map_err(|_| ConfigError::AlreadyInstalled)
}

/// The installed config, or the defaults when nothing was installed.
pub fn current() -> &'static ProtocolConfig {
    INSTALLED.get().unwrap_or(&FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ProtocolConfig::default();
        assert_eq!(config.shared_region_base, 0x2009_0000);
        assert_eq!(config.max_completion_len, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ProtocolConfig::from_json(r#"{ "shared_region_base": 536870912 }"#).unwrap();
        assert_eq!(config.shared_region_base, 0x2000_0000);
        assert_eq!(config.max_completion_len, DEFAULT_MAX_COMPLETION_LEN);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ProtocolConfig::default().with_max_completion_len(256);
        let json = config.to_json().unwrap();
        assert_eq!(ProtocolConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_tiny_completion_limit_rejected() {
        let err = ProtocolConfig::from_json(r#"{ "max_completion_len": 16 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = ProtocolConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("protocol.json");
        fs::write(&path, r#"{ "shared_region_base": 4096, "max_completion_len": 64 }"#).unwrap();

        let config = ProtocolConfig::load_from_path(&path).unwrap();
        assert_eq!(config.shared_region_base, 4096);
        assert_eq!(config.max_completion_len, 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = ProtocolConfig::load_from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_install_once() {
        install(ProtocolConfig::default().with_shared_region_base(0x3000_0000)).unwrap();
        assert_eq!(current().shared_region_base, 0x3000_0000);

        let err = install(ProtocolConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyInstalled));
        assert_eq!(current().shared_region_base, 0x3000_0000);
    }
}
