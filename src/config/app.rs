use super::error::ConfigError;
use super::server::ServerConfig;
use crate::application::catalog::{FallbackTable, ParameterShape, ParameterSpec};
use crate::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_GEMINI_API_PATH, DEFAULT_GEMINI_ENDPOINT,
    DEFAULT_HANDSHAKE_TIMEOUT_SECS, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_REST_BIND,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Application configuration loaded from bridge.toml
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub session: SessionConfig,
    pub ledger: LedgerConfig,
    pub rest: RestConfig,
    pub fallback_schemas: Vec<FallbackSchemaConfig>,
    pub servers: Vec<ServerConfig>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Built-in fallback table with the `[[fallback_schemas]]` entries layered on top.
    pub fn fallback_table(&self) -> FallbackTable {
        let mut table = FallbackTable::default();
        for entry in &self.fallback_schemas {
            table.insert(
                entry.name.clone(),
                ParameterShape::new(entry.parameters.clone()),
            );
        }
        table
    }

    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|server| server.name == name)
    }
}

/// `[model]`: the Gemini generation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub endpoint: String,
    pub api_path: String,
    pub default_model: String,
    pub default_temperature: f32,
    /// Name of the environment variable holding the fallback API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            api_path: DEFAULT_GEMINI_API_PATH.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: 0.0,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// `[session]`: transport lifecycle limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub handshake_timeout_secs: u64,
}

impl SessionConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
        }
    }
}

/// `[ledger]`: how much history is rendered into each prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerConfig {
    /// Most recent turns to include; `None` renders the whole ledger.
    pub prompt_window: Option<usize>,
}

/// `[rest]`: HTTP façade settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    pub bind: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_REST_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8001))),
            cors_origins: Vec::new(),
        }
    }
}

/// One `[[fallback_schemas]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FallbackSchemaConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}
