use super::error::ToolInvokeError;
use super::interface::ToolTransport;
use crate::constants::MCP_PROTOCOL_VERSION;
use crate::types::{LaunchSpec, SessionStatus, ToolDescriptor, ToolValue};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

/// An MCP provider running as a child process, spoken to over its stdio.
///
/// The reader task only holds a weak reference, so dropping the last
/// `McpProcess` drops the child, which is spawned with `kill_on_drop`.
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    label: String,
    status: StdMutex<SessionStatus>,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: StdMutex<HashMap<String, Responder>>,
    /// Held for the whole of a public request so calls are never pipelined.
    request_gate: AsyncMutex<()>,
    id_counter: AtomicU64,
    instructions: AsyncMutex<Option<String>>,
    tools: StdMutex<Vec<ToolDescriptor>>,
}

/// Removes its request from the pending map when dropped, so a caller that
/// stops waiting leaves nothing behind.
struct PendingEntry<'a> {
    inner: &'a McpProcessInner,
    id: String,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        self.inner.pending_map().remove(&self.id);
    }
}

impl McpProcess {
    /// Starts the provider and completes the MCP handshake within
    /// `handshake_timeout`. The child is torn down on any failure.
    pub async fn spawn(
        launch: &LaunchSpec,
        handshake_timeout: Duration,
    ) -> Result<Self, ToolInvokeError> {
        let label = launch.label();
        let mut command = Command::new(&launch.command);
        command
            .args(&launch.args)
            .envs(&launch.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: label.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| transport_error(&label, "failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| transport_error(&label, "failed to capture server stdout"))?;

        let inner = Arc::new(McpProcessInner {
            label: label.clone(),
            status: StdMutex::new(SessionStatus::Connecting),
            child: AsyncMutex::new(Some(child)),
            writer: AsyncMutex::new(Some(BufWriter::new(stdin))),
            pending: StdMutex::new(HashMap::new()),
            request_gate: AsyncMutex::new(()),
            id_counter: AtomicU64::new(1),
            instructions: AsyncMutex::new(None),
            tools: StdMutex::new(Vec::new()),
        });

        tokio::spawn(McpProcessInner::reader_loop(Arc::downgrade(&inner), stdout));

        match tokio::time::timeout(handshake_timeout, inner.initialize_sequence()).await {
            Ok(Ok(())) => {
                inner.set_status(SessionStatus::Ready);
                let tool_count = inner.cached_tools().len();
                info!(server = %label, tool_count, "MCP server ready");
                Ok(Self { inner })
            }
            Ok(Err(err)) => {
                inner.shutdown().await;
                Err(ToolInvokeError::Handshake {
                    server: label,
                    source: Box::new(err),
                })
            }
            Err(_) => {
                inner.shutdown().await;
                Err(ToolInvokeError::HandshakeTimeout {
                    server: label,
                    timeout: handshake_timeout,
                })
            }
        }
    }

    /// Requests still waiting for a reply.
    pub fn pending_requests(&self) -> usize {
        self.inner.pending_map().len()
    }
}

#[async_trait]
impl ToolTransport for McpProcess {
    fn label(&self) -> &str {
        &self.inner.label
    }

    fn status(&self) -> SessionStatus {
        self.inner.current_status()
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let _gate = self.inner.request_gate.lock().await;
        self.inner.ensure_ready()?;
        self.inner.fetch_tools().await
    }

    /// Kept current by `notifications/tools/list_changed` refreshes.
    fn catalog(&self) -> Option<Vec<ToolDescriptor>> {
        Some(self.inner.cached_tools())
    }

    async fn call_tool(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolValue, ToolInvokeError> {
        let _gate = self.inner.request_gate.lock().await;
        self.inner.ensure_ready()?;
        debug!(server = %self.inner.label, tool, "calling tool");
        let params = json!({
            "name": tool,
            "arguments": Value::Object(arguments),
        });
        let result = self.inner.send_request("tools/call", params).await?;
        if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
            return Err(ToolInvokeError::ToolFailed {
                server: self.inner.label.clone(),
                tool: tool.to_string(),
                message: ToolValue::from(result).display_text(),
            });
        }
        Ok(ToolValue::from(result))
    }

    async fn instructions(&self) -> Option<String> {
        self.inner.instructions.lock().await.clone()
    }

    async fn close(&self) {
        if self.inner.current_status() != SessionStatus::Closed {
            info!(server = %self.inner.label, "closing MCP server");
        }
        self.inner.shutdown().await;
    }
}

impl McpProcessInner {
    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {}
        });
        let init_result = self.send_request("initialize", params).await?;
        if let Some(text) = init_result.get("instructions").and_then(Value::as_str) {
            *self.instructions.lock().await = Some(text.to_string());
        }
        self.send_notification("notifications/initialized", json!({}))
            .await?;
        self.fetch_tools().await?;
        Ok(())
    }

    /// Follows `nextCursor` until the provider has listed every tool.
    async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let result = self.send_request("tools/list", params).await?;
            if let Some(entries) = result.get("tools").and_then(Value::as_array) {
                tools.extend(entries.iter().filter_map(ToolDescriptor::from_mcp));
            }
            cursor = result
                .get("nextCursor")
                .and_then(Value::as_str)
                .filter(|next| !next.is_empty())
                .map(str::to_string);
            if cursor.is_none() {
                break;
            }
        }
        debug!(server = %self.label, tool_count = tools.len(), "listed tools");
        *self.tools.lock().unwrap_or_else(PoisonError::into_inner) = tools.clone();
        Ok(tools)
    }

    async fn reader_loop(inner: Weak<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let raw = match lines.next_line().await {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(err) => {
                    debug!(%err, "MCP server stdout read failed");
                    break;
                }
            };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(process) = inner.upgrade() else {
                return;
            };
            if trimmed.starts_with('\u{1b}') {
                debug!(
                    server = %process.label,
                    line = trimmed,
                    "skipping non-JSON ANSI log line from MCP server"
                );
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = process.process_inbound_message(value).await {
                        warn!(
                            server = %process.label,
                            %err,
                            "failed to process message from MCP server"
                        );
                    }
                }
                Err(source) => {
                    warn!(
                        server = %process.label,
                        line = trimmed,
                        %source,
                        "received invalid JSON from MCP server"
                    );
                }
            }
        }

        if let Some(process) = inner.upgrade() {
            if process.current_status() != SessionStatus::Closed {
                warn!(server = %process.label, "MCP server closed its output");
            }
            process.shutdown().await;
        }
    }

    async fn process_inbound_message(self: &Arc<Self>, value: Value) -> Result<(), ToolInvokeError> {
        match (value.get("id").cloned(), value.get("method").is_some()) {
            (Some(id), true) => self.handle_server_request(id, &value).await,
            (Some(id), false) => {
                self.handle_response(&id, value).await;
                Ok(())
            }
            (None, true) => {
                self.handle_notification(&value);
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }

    async fn handle_response(&self, id: &Value, value: Value) {
        let Some(key) = response_key(id) else {
            return;
        };
        let responder = self.pending_map().remove(&key);
        let Some(sender) = responder else {
            debug!(
                server = %self.label,
                response_id = key,
                "received response for unknown request"
            );
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => {
                let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                Err(ToolInvokeError::Rpc {
                    server: self.label.clone(),
                    code,
                    message,
                })
            }
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = sender.send(outcome);
    }

    async fn handle_server_request(&self, id: Value, value: &Value) -> Result<(), ToolInvokeError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match method {
            "ping" => self.send_response(id, json!({})).await,
            other => {
                warn!(
                    server = %self.label,
                    method = other,
                    "server sent unsupported request"
                );
                let error = json!({
                    "code": -32601,
                    "message": format!("client does not implement method '{other}'"),
                });
                self.send_error(id, error).await
            }
        }
    }

    /// Refreshes run on their own task; waiting for the reply here would
    /// block the only reader of that reply.
    fn handle_notification(self: &Arc<Self>, value: &Value) {
        let Some(method) = value.get("method").and_then(Value::as_str) else {
            return;
        };
        debug!(server = %self.label, method, "received notification from server");
        if method != "notifications/tools/list_changed" {
            return;
        }
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let Some(process) = weak.upgrade() else {
                return;
            };
            let _gate = process.request_gate.lock().await;
            if process.ensure_ready().is_err() {
                return;
            }
            if let Err(err) = process.fetch_tools().await {
                warn!(server = %process.label, %err, "failed to refresh tool catalog");
            }
        });
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending_map().insert(id.clone(), tx);
        let _entry = PendingEntry {
            inner: self,
            id: id.clone(),
        };

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.write_message(&payload).await?;

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolInvokeError::Cancelled {
                server: self.label.clone(),
            }),
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write_message(&payload).await
    }

    async fn send_response(&self, id: Value, result: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        });
        self.write_message(&payload).await
    }

    async fn send_error(&self, id: Value, error: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": error
        });
        self.write_message(&payload).await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_string(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.label.clone(),
                source,
            })?;
        encoded.push('\n');

        let mut writer = self.writer.lock().await;
        let stream = writer.as_mut().ok_or_else(|| ToolInvokeError::Closed {
            server: self.label.clone(),
        })?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| transport_error(&self.label, source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| transport_error(&self.label, source.to_string()))?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.set_status(SessionStatus::Closed);
        self.writer.lock().await.take();

        let child = self.child.lock().await.take();
        if let Some(mut child) = child {
            if let Err(err) = child.kill().await {
                debug!(
                    server = %self.label,
                    %err,
                    "failed to kill MCP server process (may have already exited)"
                );
            }
        }

        self.fail_all_pending();
        self.instructions.lock().await.take();
    }

    fn fail_all_pending(&self) {
        let drained: Vec<Responder> = self
            .pending_map()
            .drain()
            .map(|(_, sender)| sender)
            .collect();
        for sender in drained {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.label.clone(),
            }));
        }
    }

    fn ensure_ready(&self) -> Result<(), ToolInvokeError> {
        if self.current_status().is_ready() {
            Ok(())
        } else {
            Err(ToolInvokeError::Closed {
                server: self.label.clone(),
            })
        }
    }

    fn pending_map(&self) -> MutexGuard<'_, HashMap<String, Responder>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn current_status(&self) -> SessionStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

fn transport_error(server: &str, message: impl Into<String>) -> ToolInvokeError {
    ToolInvokeError::Transport {
        server: server.to_string(),
        message: message.into(),
    }
}
