//! Crate-wide error type for `dlep-config`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("interface {0} declared twice in config")]
    DuplicateInterface(String),

    #[error("interface {interface}: {field} must be positive, got {value}ms")]
    NonPositiveDuration {
        interface: String,
        field: &'static str,
        value: u64,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
