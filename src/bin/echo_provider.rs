//! Minimal MCP stdio server used as a demo and as a fixture for the bridge's
//! transport tests.
//!
//! Tools: `echo` (explicit schema), `get_products` (no schema, so the bridge
//! falls back to its built-in shape) and `fail` (always reports `isError`).
//! The catalog is served in two pages to exercise `nextCursor`.
//!
//! Flags: `--silent` never answers, `--exit-on-call` exits on the first
//! `tools/call` and `--hang-on-call` leaves every `tools/call` unanswered.

use clap::Parser;
use serde_json::{Value, json};
use std::error::Error;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

const SECOND_PAGE: &str = "page-2";

#[derive(Parser, Debug)]
#[command(name = "echo-provider", version, about = "Demo MCP server over stdio")]
struct Args {
    /// Read requests but never answer them
    #[arg(long)]
    silent: bool,
    /// Exit without replying on the first tools/call
    #[arg(long)]
    exit_on_call: bool,
    /// Answer the handshake but never reply to tools/call
    #[arg(long)]
    hang_on_call: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if args.silent || line.trim().is_empty() {
            continue;
        }
        let Ok(message) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        let Some(id) = message.get("id").cloned() else {
            continue;
        };
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if method == "tools/call" && args.exit_on_call {
            return Ok(());
        }
        if method == "tools/call" && args.hang_on_call {
            continue;
        }

        let params = message.get("params").cloned().unwrap_or(Value::Null);
        let reply = match handle(method, &params) {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, text)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": code, "message": text}
            }),
        };
        let mut encoded = serde_json::to_string(&reply)?;
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn handle(method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": params
                .get("protocolVersion")
                .cloned()
                .unwrap_or_else(|| json!("2025-06-18")),
            "capabilities": {"tools": {}},
            "serverInfo": {"name": "echo-provider", "version": env!("CARGO_PKG_VERSION")},
            "instructions": "Echo provider: echo text back, list products, or fail on purpose."
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(list_tools(params)),
        "tools/call" => call_tool(params),
        other => Err((-32601, format!("Method not found: {other}"))),
    }
}

fn list_tools(params: &Value) -> Value {
    let cursor = params.get("cursor").and_then(Value::as_str);
    if cursor == Some(SECOND_PAGE) {
        return json!({
            "tools": [{
                "name": "fail",
                "description": "Always reports a tool error",
                "inputSchema": {"type": "object", "properties": {}}
            }]
        });
    }
    json!({
        "tools": [
            {
                "name": "echo",
                "description": "Echo the given text back",
                "inputSchema": {
                    "$schema": "http://json-schema.org/draft-07/schema#",
                    "type": "object",
                    "properties": {"text": {"type": "string", "description": "Text to echo"}},
                    "required": ["text"],
                    "additionalProperties": false
                }
            },
            {
                "name": "get_products",
                "description": "List products, optionally paginated"
            }
        ],
        "nextCursor": SECOND_PAGE
    })
}

fn call_tool(params: &Value) -> Result<Value, (i64, String)> {
    let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
    match name {
        "echo" => {
            let text = arguments
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| arguments.to_string());
            Ok(text_result(&text, false))
        }
        "get_products" => {
            let page = arguments.get("page").and_then(Value::as_i64).unwrap_or(1);
            let limit = arguments.get("limit").and_then(Value::as_i64).unwrap_or(10);
            let listing = json!({
                "page": page,
                "limit": limit,
                "items": ["keyboard", "mouse", "monitor"]
            });
            Ok(text_result(&listing.to_string(), false))
        }
        "fail" => Ok(text_result("requested failure", true)),
        other => Err((-32602, format!("Unknown tool: {other}"))),
    }
}

fn text_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{"type": "text", "text": text}],
        "isError": is_error
    })
}
