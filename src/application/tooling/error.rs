use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("failed to spawn MCP server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MCP server '{server}' failed the handshake: {source}")]
    Handshake {
        server: String,
        #[source]
        source: Box<ToolInvokeError>,
    },
    #[error("MCP server '{server}' did not finish the handshake within {timeout:?}")]
    HandshakeTimeout { server: String, timeout: Duration },
    #[error("MCP server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("MCP server '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("MCP server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("tool '{tool}' on MCP server '{server}' reported an error: {message}")]
    ToolFailed {
        server: String,
        tool: String,
        message: String,
    },
    #[error("MCP server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("MCP server '{server}' request cancelled")]
    Cancelled { server: String },
    #[error("MCP server '{server}' session is closed")]
    Closed { server: String },
}

impl ToolInvokeError {
    /// The provider answered, but with an error of its own.
    pub fn is_application_error(&self) -> bool {
        matches!(
            self,
            ToolInvokeError::Rpc { .. } | ToolInvokeError::ToolFailed { .. }
        )
    }

    /// Raised while a session was being opened rather than on an open one.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            ToolInvokeError::Spawn { .. }
                | ToolInvokeError::Handshake { .. }
                | ToolInvokeError::HandshakeTimeout { .. }
        )
    }

    pub fn server(&self) -> &str {
        match self {
            ToolInvokeError::Spawn { server, .. }
            | ToolInvokeError::Handshake { server, .. }
            | ToolInvokeError::HandshakeTimeout { server, .. }
            | ToolInvokeError::Transport { server, .. }
            | ToolInvokeError::InvalidJson { server, .. }
            | ToolInvokeError::Rpc { server, .. }
            | ToolInvokeError::ToolFailed { server, .. }
            | ToolInvokeError::Terminated { server }
            | ToolInvokeError::Cancelled { server }
            | ToolInvokeError::Closed { server } => server,
        }
    }
}
