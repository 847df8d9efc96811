use crate::config::AppConfig;
use crate::types::{LaunchSpec, ToolDescriptor};
use serde::Serialize;

/// Query defaults applied when a request leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSettings {
    pub default_model: String,
    pub default_temperature: f32,
    pub prompt_window: Option<usize>,
}

impl BridgeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_model: config.model.default_model.clone(),
            default_temperature: config.model.default_temperature,
            prompt_window: config.ledger.prompt_window,
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectRequest {
    /// Gemini credential used for every query on this session.
    pub api_key: Option<String>,
    pub launch: LaunchSpec,
}

impl ConnectRequest {
    pub fn new(launch: LaunchSpec) -> Self {
        Self {
            api_key: None,
            launch,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectOutcome {
    pub message: String,
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub query: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Result of a query with failures folded in as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub response: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryOutcome {
    pub fn answered(response: String) -> Self {
        Self {
            response,
            success: true,
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            response: String::new(),
            success: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeStatus {
    pub connected: bool,
    pub tools: Vec<ToolDescriptor>,
    pub conversation_history_length: usize,
}
