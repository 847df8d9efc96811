use crate::application::bridge::{BridgeStatus, QueryOutcome};
use crate::types::{ConversationTurn, ToolDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestConnectRequest {
    /// Gemini API key; empty falls back to the server's environment.
    #[serde(default)]
    pub api_key: String,
    pub server_command: String,
    #[serde(default)]
    pub server_args: Vec<String>,
    #[serde(default)]
    pub env_vars: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

impl From<ToolDescriptor> for ToolSummary {
    fn from(tool: ToolDescriptor) -> Self {
        Self {
            name: tool.name,
            description: tool.description,
        }
    }
}

fn summaries(tools: Vec<ToolDescriptor>) -> Vec<ToolSummary> {
    tools.into_iter().map(ToolSummary::from).collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
    pub tools: Vec<ToolSummary>,
}

impl ConnectResponse {
    pub fn connected(message: String, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            success: true,
            message,
            tools: summaries(tools),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestQueryRequest {
    pub query: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestQueryResponse {
    pub response: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<QueryOutcome> for RestQueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            response: outcome.response,
            success: outcome.success,
            error: outcome.error,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub connected: bool,
    pub tools: Vec<ToolSummary>,
    pub conversation_history_length: usize,
}

impl From<BridgeStatus> for StatusResponse {
    fn from(status: BridgeStatus) -> Self {
        Self {
            connected: status.connected,
            tools: summaries(status.tools),
            conversation_history_length: status.conversation_history_length,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolsResponse {
    pub tools: Vec<ToolSummary>,
}

impl From<Vec<ToolDescriptor>> for ToolsResponse {
    fn from(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools: summaries(tools),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub conversation: Vec<ConversationTurn>,
    pub length: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
