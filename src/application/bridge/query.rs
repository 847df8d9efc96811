use super::{ActiveSession, Bridge, BridgeError, DispatchError, QueryOutcome, QueryRequest};
use crate::application::catalog::ToolCatalog;
use crate::application::tooling::ToolTransport;
use crate::infrastructure::model::{GenerationRequest, ModelProvider};
use crate::types::{ConversationTurn, ToolInvocation};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl<P: ModelProvider> Bridge<P> {
    /// Answers one query, dispatching at most one tool call.
    ///
    /// The ledger grows by three turns after a tool call and by two after a
    /// plain answer. It is left untouched when anything fails. A broken
    /// channel also ends the session.
    pub async fn query(&self, request: QueryRequest) -> Result<String, BridgeError> {
        let mut session = self.session.lock().await;
        let (transport, api_key) = match session.as_ref() {
            Some(ActiveSession { transport, api_key }) => (Arc::clone(transport), api_key.clone()),
            None => return Err(BridgeError::NotConnected),
        };

        let result = self.run_query(transport.as_ref(), api_key, &request).await;
        if let Err(err) = &result {
            if err.is_transport() {
                self.drop_session(&mut session).await;
            }
        }
        result
    }

    /// `query` with failures reported as data, the shape front ends return.
    pub async fn query_outcome(&self, request: QueryRequest) -> QueryOutcome {
        match self.query(request).await {
            Ok(response) => QueryOutcome::answered(response),
            Err(err) => {
                warn!(%err, "query failed");
                QueryOutcome::failed(err.user_message())
            }
        }
    }

    async fn run_query(
        &self,
        transport: &dyn ToolTransport,
        api_key: Option<String>,
        request: &QueryRequest,
    ) -> Result<String, BridgeError> {
        let tools = transport
            .list_tools()
            .await
            .map_err(BridgeError::from_listing)?;
        let catalog = ToolCatalog::new(tools);
        let functions = self.adapter.adapt_all(catalog.iter());
        self.store_catalog(Some(catalog.clone()));

        let prompt = self
            .ledger
            .render_prompt(&request.query, self.settings.prompt_window);
        let model = request
            .model
            .clone()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_model.clone());
        let temperature = request
            .temperature
            .unwrap_or(self.settings.default_temperature);

        debug!(
            model = model.as_str(),
            temperature,
            functions = functions.len(),
            history = self.ledger.len(),
            "requesting generation"
        );
        let response = self
            .provider
            .generate(GenerationRequest {
                model,
                prompt,
                temperature,
                functions,
                api_key,
            })
            .await?;

        match response.function_call {
            Some(invocation) => {
                self.dispatch(transport, &catalog, &request.query, invocation)
                    .await
            }
            None => {
                self.ledger.append_all([
                    ConversationTurn::user(request.query.as_str()),
                    ConversationTurn::assistant(response.text.as_str()),
                ]);
                Ok(response.text)
            }
        }
    }

    async fn dispatch(
        &self,
        transport: &dyn ToolTransport,
        catalog: &ToolCatalog,
        query: &str,
        invocation: ToolInvocation,
    ) -> Result<String, BridgeError> {
        if !catalog.contains(&invocation.tool_name) {
            return Err(DispatchError::UnknownTool(invocation.tool_name).into());
        }

        info!(
            server = transport.label(),
            tool = invocation.tool_name.as_str(),
            args = %invocation.render_arguments(),
            "dispatching tool call"
        );
        let value = transport
            .call_tool(&invocation.tool_name, invocation.arguments.clone())
            .await
            .map_err(|source| BridgeError::from_tool(&invocation.tool_name, source))?;

        let result = value.display_text();
        self.ledger.append_all([
            ConversationTurn::user(query),
            ConversationTurn::assistant(invocation.summary()),
            ConversationTurn::tool_result(result.as_str()),
        ]);
        Ok(result)
    }
}
