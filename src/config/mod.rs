pub mod app;
pub mod error;
pub mod loader;
pub mod server;

pub use crate::constants::CONFIG_PATH;
pub use app::{AppConfig, FallbackSchemaConfig, LedgerConfig, ModelConfig, RestConfig, SessionConfig};
pub use error::ConfigError;
pub use loader::parse_config;
pub use server::ServerConfig;
