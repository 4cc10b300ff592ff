//! MCP Server Tests
//!
//! Protocol-level tests that drive the dispatcher directly, one frame at a
//! time, without a transport in between.

pub mod protocol_flow_tests;

use {
    crate::{
        dispatcher::{Dispatcher, ServerState},
        protocol::McpProtocol,
    },
    serde_json::Value,
    tokio_util::sync::CancellationToken,
};

/// A fresh server state and dispatcher
pub(crate) fn test_server() -> (Dispatcher, ServerState) {
    (
        Dispatcher::with_builtins(),
        ServerState::new(McpProtocol::new("test-server", "1.0.0")),
    )
}

/// Dispatch one frame and return the response as JSON, if any
pub(crate) async fn send(dispatcher: &Dispatcher, state: &ServerState, message: Value) -> Option<Value> {
    let line = serde_json::to_vec(&message).expect("serialize test frame");
    send_raw(dispatcher, state, &line).await
}

/// Dispatch raw bytes, exactly as they would arrive on one input line
pub(crate) async fn send_raw(dispatcher: &Dispatcher, state: &ServerState, line: &[u8]) -> Option<Value> {
    let response = dispatcher
        .handle_line(state, line, &CancellationToken::new())
        .await?;
    let encoded = response.encode().expect("encode response");
    assert!(encoded.ends_with('\n'));
    assert_eq!(encoded.matches('\n').count(), 1, "response must be a single line");
    Some(serde_json::from_str(&encoded).expect("response is valid JSON"))
}
