use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::error::ToolInvokeError;
use crate::types::{LaunchSpec, SessionStatus, ToolDescriptor, ToolValue};

/// One open channel to a tool provider.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    fn label(&self) -> &str;

    fn status(&self) -> SessionStatus;

    /// Queries the provider for its current catalog.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError>;

    /// Catalog the transport already holds from its handshake or its most
    /// recent listing, if it keeps one.
    fn catalog(&self) -> Option<Vec<ToolDescriptor>> {
        None
    }

    async fn call_tool(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolValue, ToolInvokeError>;

    async fn instructions(&self) -> Option<String>;

    /// Releases the channel. Safe to call more than once.
    async fn close(&self);
}

/// Opens transports from launch specs.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn open(&self, launch: &LaunchSpec) -> Result<Arc<dyn ToolTransport>, ToolInvokeError>;
}
