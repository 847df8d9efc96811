use crate::application::tooling::ToolInvokeError;
use crate::infrastructure::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to connect to MCP server: {0}")]
    Connect(#[source] ToolInvokeError),
    #[error("MCP session failed: {0}")]
    Transport(#[source] ToolInvokeError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("no active MCP connection")]
    NotConnected,
}

impl BridgeError {
    /// Sorts a transport failure on an open session into provider-side
    /// (dispatch) and channel-side (transport) errors.
    pub(crate) fn from_tool(tool: &str, source: ToolInvokeError) -> Self {
        if source.is_application_error() {
            DispatchError::Provider {
                tool: tool.to_string(),
                source,
            }
            .into()
        } else {
            BridgeError::Transport(source)
        }
    }

    pub(crate) fn from_listing(source: ToolInvokeError) -> Self {
        if source.is_application_error() {
            DispatchError::Catalog { source }.into()
        } else {
            BridgeError::Transport(source)
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            BridgeError::Connect(source) => match source {
                ToolInvokeError::Spawn { server, .. } => format!(
                    "Could not start MCP server '{server}'. Check the command and its arguments."
                ),
                ToolInvokeError::HandshakeTimeout { server, .. } => {
                    format!("MCP server '{server}' did not respond to the handshake in time.")
                }
                other => format!("Failed to connect to MCP server: {other}"),
            },
            BridgeError::Transport(source) => format!(
                "Lost the connection to MCP server '{}'. Please connect again.",
                source.server()
            ),
            BridgeError::Dispatch(err) => err.user_message(),
            BridgeError::Model(err) => err.user_message(),
            BridgeError::NotConnected => {
                "No active MCP connection. Please connect to a server first.".to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),
    #[error("tool '{tool}' failed: {source}")]
    Provider {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("MCP server refused to list its tools: {source}")]
    Catalog {
        #[source]
        source: ToolInvokeError,
    },
}

impl DispatchError {
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::UnknownTool(name) => {
                format!("The model asked for tool \"{name}\", which the server does not provide.")
            }
            DispatchError::Provider { tool, source } => match source {
                ToolInvokeError::ToolFailed { message, .. } => {
                    format!("Tool \"{tool}\" reported an error: {message}")
                }
                ToolInvokeError::Rpc { message, .. } => {
                    format!("Tool \"{tool}\" failed: {message}")
                }
                other => format!("Tool \"{tool}\" failed: {other}"),
            },
            DispatchError::Catalog { source } => {
                format!("The MCP server could not list its tools: {source}")
            }
        }
    }
}
