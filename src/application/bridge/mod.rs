//! The bridge between the Gemini model and one MCP tool provider.
//!
//! A `Bridge` owns at most one active session and the conversation ledger.
//! Front ends (REST, stdio) hold it behind an `Arc` and only call the
//! operations defined here.

mod errors;
mod models;
mod query;

pub use errors::{BridgeError, DispatchError};
pub use models::{
    BridgeSettings, BridgeStatus, ConnectOutcome, ConnectRequest, QueryOutcome, QueryRequest,
};

use crate::application::catalog::{SchemaAdapter, ToolCatalog};
use crate::application::ledger::ConversationLedger;
use crate::application::tooling::{StdioConnector, ToolTransport, TransportConnector};
use crate::config::AppConfig;
use crate::infrastructure::model::ModelProvider;
use crate::types::{ConversationTurn, ToolDescriptor};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

const CONNECTED_MESSAGE: &str = "Successfully connected to MCP server";
const DISCONNECTED_MESSAGE: &str = "Disconnected from server";

struct ActiveSession {
    transport: Arc<dyn ToolTransport>,
    api_key: Option<String>,
}

pub struct Bridge<P: ModelProvider> {
    provider: P,
    connector: Arc<dyn TransportConnector>,
    adapter: SchemaAdapter,
    settings: BridgeSettings,
    /// Held for the whole of every session operation, which serializes queries.
    session: Mutex<Option<ActiveSession>>,
    ledger: ConversationLedger,
    /// Last catalog seen; `None` while disconnected.
    catalog: RwLock<Option<ToolCatalog>>,
}

impl<P: ModelProvider> Bridge<P> {
    pub fn new(
        provider: P,
        connector: Arc<dyn TransportConnector>,
        adapter: SchemaAdapter,
        settings: BridgeSettings,
    ) -> Self {
        Self {
            provider,
            connector,
            adapter,
            settings,
            session: Mutex::new(None),
            ledger: ConversationLedger::new(),
            catalog: RwLock::new(None),
        }
    }

    /// Bridge over stdio MCP providers, configured from `config`.
    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        let connector = Arc::new(StdioConnector::new(config.session.handshake_timeout()));
        Self::new(
            provider,
            connector,
            SchemaAdapter::new(config.fallback_table()),
            BridgeSettings::from_config(config),
        )
    }

    /// Replaces any active session with a new one and starts a fresh
    /// conversation. The previous session is fully closed before the new
    /// provider is launched.
    pub async fn connect(&self, request: ConnectRequest) -> Result<ConnectOutcome, BridgeError> {
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            info!(server = previous.transport.label(), "closing previous MCP session");
            previous.transport.close().await;
            self.store_catalog(None);
        }

        let transport = self
            .connector
            .open(&request.launch)
            .await
            .map_err(BridgeError::Connect)?;

        let listed = match transport.catalog() {
            Some(tools) => Ok(tools),
            None => transport.list_tools().await,
        };
        let tools = match listed {
            Ok(tools) => tools,
            Err(err) => {
                transport.close().await;
                return Err(BridgeError::Connect(err));
            }
        };
        let catalog = ToolCatalog::new(tools);
        let descriptors = catalog.descriptors().to_vec();
        info!(
            server = transport.label(),
            tool_count = descriptors.len(),
            "MCP session ready"
        );

        self.store_catalog(Some(catalog));
        self.ledger.clear();
        *session = Some(ActiveSession {
            transport,
            api_key: request.api_key,
        });

        Ok(ConnectOutcome {
            message: CONNECTED_MESSAGE.to_string(),
            tools: descriptors,
        })
    }

    /// Closes the active session if there is one. Always succeeds.
    pub async fn disconnect(&self) -> String {
        let mut session = self.session.lock().await;
        self.drop_session(&mut session).await;
        DISCONNECTED_MESSAGE.to_string()
    }

    /// Closes the active session when the host process exits.
    pub async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        if session.is_some() {
            info!("shutting down active MCP session");
        }
        self.drop_session(&mut session).await;
    }

    /// Connection state from the cached catalog; never contacts the provider.
    pub fn status(&self) -> BridgeStatus {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        BridgeStatus {
            connected: catalog.is_some(),
            tools: catalog
                .as_ref()
                .map(|catalog| catalog.descriptors().to_vec())
                .unwrap_or_default(),
            conversation_history_length: self.ledger.len(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Lists the provider's tools afresh and updates the cached catalog.
    pub async fn tools(&self) -> Result<Vec<ToolDescriptor>, BridgeError> {
        let mut session = self.session.lock().await;
        let transport = match session.as_ref() {
            Some(active) => Arc::clone(&active.transport),
            None => return Err(BridgeError::NotConnected),
        };
        match transport.list_tools().await {
            Ok(tools) => {
                let catalog = ToolCatalog::new(tools);
                let descriptors = catalog.descriptors().to_vec();
                self.store_catalog(Some(catalog));
                Ok(descriptors)
            }
            Err(err) => {
                let err = BridgeError::from_listing(err);
                if err.is_transport() {
                    self.drop_session(&mut session).await;
                }
                Err(err)
            }
        }
    }

    /// Provider instructions from the handshake, when it sent any.
    pub async fn instructions(&self) -> Option<String> {
        let session = self.session.lock().await;
        match session.as_ref() {
            Some(active) => active.transport.instructions().await,
            None => None,
        }
    }

    pub fn conversation(&self) -> Vec<ConversationTurn> {
        self.ledger.all()
    }

    pub fn clear_conversation(&self) {
        self.ledger.clear();
        info!("conversation history cleared");
    }

    async fn drop_session(&self, session: &mut MutexGuard<'_, Option<ActiveSession>>) {
        if let Some(active) = session.take() {
            info!(server = active.transport.label(), "closing MCP session");
            active.transport.close().await;
        }
        self.store_catalog(None);
    }

    fn store_catalog(&self, catalog: Option<ToolCatalog>) {
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
    }
}
