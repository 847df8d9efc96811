//! Application constants
//!
//! Single source of truth for paths and protocol defaults.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/bridge.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variable holding the Gemini key when no credential is passed on connect
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_REST_BIND: &str = "0.0.0.0:8001";

pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// MCP protocol revision announced during `initialize`
pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";
