use std::io;
use std::net::AddrParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("default_temperature must be between 0.0 and 2.0, got {value}")]
    InvalidTemperature { value: f32 },

    #[error("'{field}' must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("invalid REST bind address '{value}': {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("server preset '{server}' is missing required field 'command'")]
    MissingCommand { server: String },

    #[error("fallback schema entry is missing a tool name")]
    UnnamedFallback,
}
