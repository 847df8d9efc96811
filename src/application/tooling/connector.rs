use super::error::ToolInvokeError;
use super::interface::{ToolTransport, TransportConnector};
use super::process::McpProcess;
use crate::constants::DEFAULT_HANDSHAKE_TIMEOUT_SECS;
use crate::types::LaunchSpec;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Opens MCP providers as child processes over stdio.
#[derive(Debug, Clone, Copy)]
pub struct StdioConnector {
    handshake_timeout: Duration,
}

impl StdioConnector {
    pub fn new(handshake_timeout: Duration) -> Self {
        Self { handshake_timeout }
    }

    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }
}

impl Default for StdioConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_HANDSHAKE_TIMEOUT_SECS))
    }
}

#[async_trait]
impl TransportConnector for StdioConnector {
    async fn open(&self, launch: &LaunchSpec) -> Result<Arc<dyn ToolTransport>, ToolInvokeError> {
        info!(
            command = %launch.command,
            args = ?launch.args,
            "starting MCP server"
        );
        let process = McpProcess::spawn(launch, self.handshake_timeout).await?;
        Ok(Arc::new(process))
    }
}
