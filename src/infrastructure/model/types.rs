//! Model types - Request, Response, and Error types

use crate::types::{FunctionDeclaration, ToolInvocation};
use reqwest::StatusCode;
use thiserror::Error;

/// One generation call: the rendered prompt plus the functions the model may call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub functions: Vec<FunctionDeclaration>,
    /// Credential supplied on connect; the client falls back to its own key.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub text: String,
    pub function_call: Option<ToolInvocation>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_call: None,
        }
    }

    pub fn function_call(invocation: ToolInvocation) -> Self {
        Self {
            text: String::new(),
            function_call: Some(invocation),
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("failed to build HTTP client for provider '{provider}': {source}")]
    Client {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn api(provider: impl Into<String>, status: StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn client(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Client {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Message suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => {
                format!("Provider '{provider}' needs an API key. Pass one on connect or set it in the environment.")
            }
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Could not reach model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("The request to '{provider}' timed out.")
                } else {
                    format!("Network error while calling '{provider}'.")
                }
            }
            ModelError::Api {
                provider,
                status,
                message,
            } => match StatusCode::from_u16(*status) {
                Ok(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    format!("Provider '{provider}' rejected the API key: {message}")
                }
                Ok(StatusCode::NOT_FOUND) => {
                    format!("Provider '{provider}' does not know that model: {message}")
                }
                Ok(StatusCode::TOO_MANY_REQUESTS) => {
                    format!("Provider '{provider}' is rate limiting requests. Try again shortly.")
                }
                Ok(StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY) => {
                    format!("Provider '{provider}' is currently unavailable.")
                }
                _ => format!("Request to '{provider}' failed ({status}): {message}"),
            },
            ModelError::InvalidResponse { provider, .. } => {
                format!("The response from '{provider}' could not be understood.")
            }
            ModelError::Client { provider, .. } => {
                format!("The HTTP client for '{provider}' could not be set up.")
            }
        }
    }
}
