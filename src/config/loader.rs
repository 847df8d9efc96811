use super::app::{AppConfig, FallbackSchemaConfig, LedgerConfig, ModelConfig, RestConfig, SessionConfig};
use super::error::ConfigError;
use super::server::{RawServer, ServerConfig};
use crate::constants::{CONFIG_PATH, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub model: RawModel,
    #[serde(default)]
    pub session: RawSession,
    #[serde(default)]
    pub ledger: RawLedger,
    #[serde(default)]
    pub rest: RawRest,
    #[serde(default)]
    pub fallback_schemas: Vec<FallbackSchemaConfig>,
    #[serde(default)]
    pub servers: Vec<RawServer>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawModel {
    pub endpoint: Option<String>,
    pub api_path: Option<String>,
    pub default_model: Option<String>,
    pub default_temperature: Option<f32>,
    pub api_key_env: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawSession {
    pub handshake_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawLedger {
    pub prompt_window: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawRest {
    pub bind: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration.
///
/// An explicit path must exist. When no path is given the default location
/// is tried and built-in defaults are used if it is absent.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)
            } else {
                debug!(path = CONFIG_PATH, "No configuration file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

/// Parse configuration from TOML text; `origin` is only used in error messages.
pub fn parse_config(content: &str, origin: &Path) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    validate_and_build(parsed)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading bridge configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();

    let model = build_model(parsed.model, defaults.model)?;

    let handshake_timeout_secs = parsed
        .session
        .handshake_timeout_secs
        .unwrap_or(defaults.session.handshake_timeout_secs);
    if handshake_timeout_secs == 0 {
        return Err(ConfigError::ZeroValue {
            field: "session.handshake_timeout_secs",
        });
    }

    if parsed.ledger.prompt_window == Some(0) {
        return Err(ConfigError::ZeroValue {
            field: "ledger.prompt_window",
        });
    }

    let bind = match parsed.rest.bind {
        Some(value) => value
            .parse()
            .map_err(|source| ConfigError::InvalidBind { value, source })?,
        None => defaults.rest.bind,
    };

    if parsed
        .fallback_schemas
        .iter()
        .any(|entry| entry.name.trim().is_empty())
    {
        return Err(ConfigError::UnnamedFallback);
    }

    let mut servers = Vec::with_capacity(parsed.servers.len());
    for raw in parsed.servers {
        if raw.command.trim().is_empty() {
            return Err(ConfigError::MissingCommand { server: raw.name });
        }
        servers.push(ServerConfig::from(raw));
    }

    Ok(AppConfig {
        model,
        session: SessionConfig {
            handshake_timeout_secs,
        },
        ledger: LedgerConfig {
            prompt_window: parsed.ledger.prompt_window,
        },
        rest: RestConfig {
            bind,
            cors_origins: parsed.rest.cors_origins,
        },
        fallback_schemas: parsed.fallback_schemas,
        servers,
    })
}

fn build_model(raw: RawModel, defaults: ModelConfig) -> Result<ModelConfig, ConfigError> {
    let default_temperature = raw
        .default_temperature
        .unwrap_or(defaults.default_temperature);
    if !(0.0..=2.0).contains(&default_temperature) {
        return Err(ConfigError::InvalidTemperature {
            value: default_temperature,
        });
    }

    let request_timeout_secs = raw
        .request_timeout_secs
        .unwrap_or(defaults.request_timeout_secs);
    if request_timeout_secs == 0 {
        return Err(ConfigError::ZeroValue {
            field: "model.request_timeout_secs",
        });
    }

    Ok(ModelConfig {
        endpoint: raw.endpoint.unwrap_or(defaults.endpoint),
        api_path: raw.api_path.unwrap_or(defaults.api_path),
        default_model: raw.default_model.unwrap_or(defaults.default_model),
        default_temperature,
        api_key_env: raw.api_key_env.unwrap_or(defaults.api_key_env),
        request_timeout_secs,
    })
}
