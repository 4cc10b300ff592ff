//! Protocol Flow Tests
//!
//! The handshake and the list/call/read/get methods as a client would use
//! them in one session.

#[cfg(test)]
mod tests {
    use crate::{
        handler::HandlerContext,
        session::SessionState,
        tests::{send, test_server},
        types::{PromptDescriptor, ResourceDescriptor, ToolDescriptor, MCP_VERSION},
    };
    use serde_json::{json, value::RawValue, Value};
    use std::sync::Arc;

    fn initialize_request(id: i64) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "initialize",
            "params": {
                "protocolVersion": MCP_VERSION,
                "capabilities": { "roots": { "listChanged": true } },
                "clientInfo": { "name": "claude-desktop", "version": "0.7.1" }
            }
        })
    }

    #[tokio::test]
    async fn test_initialize_result_shape() {
        let (dispatcher, state) = test_server();
        let response = send(&dispatcher, &state, initialize_request(1)).await.unwrap();

        let result = &response["result"];
        assert_eq!(result["protocolVersion"], MCP_VERSION);
        assert_eq!(result["serverInfo"], json!({ "name": "test-server", "version": "1.0.0" }));
        assert_eq!(
            result["capabilities"],
            json!({
                "logging": {},
                "prompts": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "tools": { "listChanged": false }
            })
        );

        let client = state.session.client_info().await.unwrap();
        assert_eq!(client.name, "claude-desktop");
        assert_eq!(state.session.client_protocol_version().await.as_deref(), Some(MCP_VERSION));
    }

    #[tokio::test]
    async fn test_full_handshake() {
        let (dispatcher, state) = test_server();
        assert_eq!(state.session.state().await, SessionState::Uninitialized);

        send(&dispatcher, &state, initialize_request(1)).await.unwrap();
        assert_eq!(state.session.state().await, SessionState::Uninitialized);

        let ack = send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "method": "initialized" })).await;
        assert!(ack.is_none());
        assert_eq!(state.session.state().await, SessionState::Initialized);

        // A second handshake neither fails nor resets the session
        send(&dispatcher, &state, initialize_request(2)).await.unwrap();
        send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "method": "initialized" })).await;
        assert!(state.session.is_initialized().await);
    }

    /// `initialized` alone is enough; the initialize request is not gating
    #[tokio::test]
    async fn test_initialized_without_initialize() {
        let (dispatcher, state) = test_server();
        send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "method": "initialized" })).await;
        assert!(state.session.is_initialized().await);
    }

    /// The core serves every method before the handshake completes
    #[tokio::test]
    async fn test_methods_served_before_initialization() {
        let (dispatcher, state) = test_server();
        for method in ["tools/list", "resources/list", "prompts/list"] {
            let response = send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "id": 1, "method": method }))
                .await
                .unwrap();
            assert!(response.get("result").is_some(), "{method}");
        }
        assert!(!state.session.is_initialized().await);
    }

    #[tokio::test]
    async fn test_session_with_all_capability_kinds() {
        let (dispatcher, state) = test_server();
        state
            .registry
            .tools
            .register(
                ToolDescriptor::new("get_mesh_status", "Mesh status", json!({ "type": "object", "properties": {} })),
                Arc::new(|_ctx: HandlerContext, _args: Box<RawValue>| async move {
                    Ok::<Value, anyhow::Error>(json!({ "health": "healthy", "nodes": 3 }))
                }),
            )
            .await;
        state
            .registry
            .resources
            .register(
                ResourceDescriptor::new("receptor://nodes/status", "Node Status")
                    .with_description("Current status of all nodes")
                    .with_mime_type("application/json"),
                Arc::new(|_ctx: HandlerContext, _params: Box<RawValue>| async move {
                    Ok::<Value, anyhow::Error>(json!({
                        "contents": [{ "uri": "receptor://nodes/status", "mimeType": "application/json", "text": "{}" }]
                    }))
                }),
            )
            .await;
        state
            .registry
            .prompts
            .register(
                PromptDescriptor::new("optimize_workload"),
                Arc::new(|_ctx: HandlerContext, params: Box<RawValue>| async move {
                    let params: Value = serde_json::from_str(params.get())?;
                    let goal = params["arguments"]["performance_goals"].as_str().unwrap_or("none").to_string();
                    Ok::<Value, anyhow::Error>(json!({
                        "messages": [{ "role": "user", "content": [{ "type": "text", "text": goal }] }]
                    }))
                }),
            )
            .await;

        send(&dispatcher, &state, initialize_request(1)).await.unwrap();
        send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "method": "initialized" })).await;

        let tools = send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
            .await
            .unwrap();
        assert_eq!(tools["result"]["tools"][0]["name"], "get_mesh_status");
        assert_eq!(tools["result"]["tools"][0]["inputSchema"]["type"], "object");

        let call = send(
            &dispatcher,
            &state,
            json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": { "name": "get_mesh_status", "arguments": {} } }),
        )
        .await
        .unwrap();
        let result = &call["result"];
        assert!(result.get("isError").is_none());
        let payload: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(payload, json!({ "health": "healthy", "nodes": 3 }));

        let resources = send(&dispatcher, &state, json!({ "jsonrpc": "2.0", "id": 4, "method": "resources/list" }))
            .await
            .unwrap();
        assert_eq!(
            resources["result"]["resources"][0],
            json!({
                "uri": "receptor://nodes/status",
                "name": "Node Status",
                "description": "Current status of all nodes",
                "mimeType": "application/json"
            })
        );

        let read = send(
            &dispatcher,
            &state,
            json!({ "jsonrpc": "2.0", "id": 5, "method": "resources/read", "params": { "uri": "receptor://nodes/status" } }),
        )
        .await
        .unwrap();
        assert_eq!(read["result"]["contents"][0]["mimeType"], "application/json");

        let prompt = send(
            &dispatcher,
            &state,
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "prompts/get",
                "params": { "name": "optimize_workload", "arguments": { "performance_goals": "latency" } }
            }),
        )
        .await
        .unwrap();
        assert_eq!(prompt["result"]["messages"][0]["content"][0]["text"], "latency");
    }

    /// Tool values that are already shaped as a call result pass through
    #[tokio::test]
    async fn test_tool_result_shaping() {
        let (dispatcher, state) = test_server();
        let outputs = [
            ("shaped", json!({ "content": [{ "type": "text", "text": "as is" }] }), json!([{ "type": "text", "text": "as is" }])),
            ("string", json!("plain text"), json!([{ "type": "text", "text": "plain text" }])),
            ("number", json!(42), json!([{ "type": "text", "text": "42" }])),
        ];

        for (name, output, _) in &outputs {
            let output = output.clone();
            state
                .registry
                .tools
                .register(
                    ToolDescriptor::new(*name, "shaping", json!({ "type": "object" })),
                    Arc::new(move |_ctx: HandlerContext, _args: Box<RawValue>| {
                        let output = output.clone();
                        async move { Ok::<Value, anyhow::Error>(output) }
                    }),
                )
                .await;
        }

        for (name, _, expected) in outputs {
            let response = send(
                &dispatcher,
                &state,
                json!({ "jsonrpc": "2.0", "id": name, "method": "tools/call", "params": { "name": name } }),
            )
            .await
            .unwrap();
            assert_eq!(response["result"]["content"], expected, "tool {name}");
        }
    }
}
