// Transport tests - a real MCP child process over stdio
//
// Every test launches the bundled echo-provider binary.

use gemini_mcp_bridge::tooling::{
    McpProcess, StdioConnector, ToolInvokeError, ToolTransport, TransportConnector,
};
use gemini_mcp_bridge::types::{LaunchSpec, SessionStatus};
use serde_json::{Map, Value, json};
use std::time::Duration;

const HANDSHAKE: Duration = Duration::from_secs(10);

fn echo_provider() -> LaunchSpec {
    LaunchSpec::new(env!("CARGO_BIN_EXE_echo-provider"))
}

fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[tokio::test]
async fn handshake_collects_every_catalog_page() {
    let process = McpProcess::spawn(&echo_provider(), HANDSHAKE)
        .await
        .expect("echo-provider starts");

    assert_eq!(process.status(), SessionStatus::Ready);
    let names: Vec<String> = process
        .list_tools()
        .await
        .expect("tools/list")
        .into_iter()
        .map(|tool| tool.name)
        .collect();
    assert_eq!(names, vec!["echo", "get_products", "fail"]);

    let cached = process.catalog().expect("catalog known after handshake");
    assert_eq!(cached.len(), 3);
    let echo = cached.iter().find(|tool| tool.name == "echo").expect("echo");
    assert!(echo.parameter_schema.is_some());
    let products = cached
        .iter()
        .find(|tool| tool.name == "get_products")
        .expect("get_products");
    assert!(products.parameter_schema.is_none());
    let fail = cached.iter().find(|tool| tool.name == "fail").expect("fail");
    assert!(fail.parameter_schema.is_none());

    assert!(
        process
            .instructions()
            .await
            .is_some_and(|text| text.starts_with("Echo provider"))
    );
    process.close().await;
}

#[tokio::test]
async fn tool_calls_return_provider_content() {
    let process = McpProcess::spawn(&echo_provider(), HANDSHAKE)
        .await
        .expect("echo-provider starts");

    let echoed = process
        .call_tool("echo", arguments(json!({"text": "hello bridge"})))
        .await
        .expect("echo call");
    assert_eq!(echoed.display_text(), "hello bridge");

    let products = process
        .call_tool("get_products", arguments(json!({"page": 2})))
        .await
        .expect("get_products call");
    let listing: Value = serde_json::from_str(&products.display_text()).expect("json listing");
    assert_eq!(listing["page"], 2);
    assert_eq!(listing["limit"], 10);

    process.close().await;
}

#[tokio::test]
async fn provider_errors_are_application_errors() {
    let process = McpProcess::spawn(&echo_provider(), HANDSHAKE)
        .await
        .expect("echo-provider starts");

    let failed = process
        .call_tool("fail", Map::new())
        .await
        .expect_err("fail reports isError");
    assert!(matches!(
        failed,
        ToolInvokeError::ToolFailed { ref tool, ref message, .. }
            if tool == "fail" && message == "requested failure"
    ));
    assert!(failed.is_application_error());

    let unknown = process
        .call_tool("missing", Map::new())
        .await
        .expect_err("unknown tool");
    assert!(matches!(unknown, ToolInvokeError::Rpc { code: -32602, .. }));

    assert_eq!(process.status(), SessionStatus::Ready);
    process.close().await;
}

#[tokio::test]
async fn spawn_failure_is_reported() {
    let launch = LaunchSpec::new("/definitely/not/an/mcp-server");

    let err = McpProcess::spawn(&launch, HANDSHAKE)
        .await
        .err()
        .expect("spawn fails");

    assert!(matches!(err, ToolInvokeError::Spawn { .. }));
    assert!(err.is_connect_failure());
}

#[tokio::test]
async fn silent_provider_times_out_during_handshake() {
    let launch = echo_provider().with_args(["--silent"]);
    let timeout = Duration::from_millis(300);

    let err = McpProcess::spawn(&launch, timeout)
        .await
        .err()
        .expect("handshake times out");

    assert!(matches!(
        err,
        ToolInvokeError::HandshakeTimeout { timeout: waited, .. } if waited == timeout
    ));
}

#[tokio::test]
async fn provider_exit_mid_call_closes_the_session() {
    let launch = echo_provider().with_args(["--exit-on-call"]);
    let process = McpProcess::spawn(&launch, HANDSHAKE)
        .await
        .expect("echo-provider starts");

    let err = process
        .call_tool("echo", arguments(json!({"text": "bye"})))
        .await
        .expect_err("provider exits");
    assert!(!err.is_application_error());

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while process.status() != SessionStatus::Closed {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(closed.is_ok(), "session should close after the provider exits");

    let after = process
        .call_tool("echo", Map::new())
        .await
        .expect_err("session closed");
    assert!(matches!(after, ToolInvokeError::Closed { .. }));
}

#[tokio::test]
async fn abandoned_calls_leave_no_pending_requests() {
    let launch = echo_provider().with_args(["--hang-on-call"]);
    let process = McpProcess::spawn(&launch, HANDSHAKE)
        .await
        .expect("echo-provider starts");
    assert_eq!(process.pending_requests(), 0);

    for _ in 0..5 {
        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            process.call_tool("echo", arguments(json!({"text": "anyone there?"}))),
        )
        .await;
        assert!(waited.is_err(), "hanging provider should never answer");
    }

    assert_eq!(process.pending_requests(), 0);
    assert_eq!(process.status(), SessionStatus::Ready);
    process.close().await;
}

#[tokio::test]
async fn close_is_idempotent() {
    let connector = StdioConnector::new(HANDSHAKE);
    let transport = connector
        .open(&echo_provider())
        .await
        .expect("connector opens echo-provider");

    transport.close().await;
    transport.close().await;

    assert_eq!(transport.status(), SessionStatus::Closed);
    assert!(transport.instructions().await.is_none());
    assert!(matches!(
        transport.list_tools().await,
        Err(ToolInvokeError::Closed { .. })
    ));
}
