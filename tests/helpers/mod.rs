//! Test helpers for integration tests
//!
//! Runs a server over in-memory pipes and talks to it the way an MCP client
//! talks to a stdio server: one JSON document per line in each direction.

#![allow(dead_code)]

use receptor_mcp::{catalog, McpResult, McpServer, ServerConfig};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines},
    task::JoinHandle,
    time::timeout,
};
use tokio_util::sync::CancellationToken;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Client end of a running server
pub struct McpTestClient {
    input: Option<DuplexStream>,
    output: Lines<BufReader<DuplexStream>>,
    pub cancel: CancellationToken,
    handle: JoinHandle<McpResult<()>>,
}

impl McpTestClient {
    /// Start serving `server` on a fresh pair of pipes
    pub fn start(server: Arc<McpServer>) -> Self {
        let (client_in, server_in) = tokio::io::duplex(256 * 1024);
        let (server_out, client_out) = tokio::io::duplex(256 * 1024);
        let cancel = CancellationToken::new();

        let serve_cancel = cancel.clone();
        let handle = tokio::spawn(async move { server.serve(server_in, server_out, serve_cancel).await });

        Self {
            input: Some(client_in),
            output: BufReader::new(client_out).lines(),
            cancel,
            handle,
        }
    }

    /// Write raw bytes to the server's input
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        let input = self.input.as_mut().expect("input already closed");
        input.write_all(bytes).await.expect("write to server input");
        input.flush().await.expect("flush server input");
    }

    /// Write one JSON frame followed by a newline
    pub async fn send(&mut self, message: &Value) {
        let mut line = serde_json::to_vec(message).expect("serialize frame");
        line.push(b'\n');
        self.send_raw(&line).await;
    }

    /// Next response line, parsed
    pub async fn recv(&mut self) -> Value {
        let line = timeout(RECV_TIMEOUT, self.output.next_line())
            .await
            .expect("timed out waiting for a response")
            .expect("read server output")
            .expect("server output closed");
        serde_json::from_str(&line).unwrap_or_else(|e| panic!("response is not JSON ({e}): {line}"))
    }

    /// Send a request and wait for the next response
    pub async fn request(&mut self, message: Value) -> Value {
        self.send(&message).await;
        self.recv().await
    }

    /// Assert that nothing is written within `wait`
    pub async fn expect_silence(&mut self, wait: Duration) {
        if let Ok(line) = timeout(wait, self.output.next_line()).await {
            panic!("expected no output, got {line:?}");
        }
    }

    /// Run the initialize / initialized handshake
    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request(json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "test-client", "version": "1.0.0" }
                }
            }))
            .await;
        self.send(&json!({ "jsonrpc": "2.0", "method": "initialized" })).await;
        response
    }

    /// Close the server's input, wait for it to stop and collect whatever
    /// it wrote after the last `recv`.
    pub async fn finish(mut self) -> (McpResult<()>, Vec<Value>) {
        drop(self.input.take());
        let result = timeout(RECV_TIMEOUT, self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked");

        let mut remaining = Vec::new();
        while let Some(line) = self.output.next_line().await.expect("read server output") {
            remaining.push(serde_json::from_str(&line).expect("response is valid JSON"));
        }
        (result, remaining)
    }

    /// Cancel the server and wait for it to stop
    pub async fn shutdown(self) -> McpResult<()> {
        self.cancel.cancel();
        timeout(RECV_TIMEOUT, self.handle)
            .await
            .expect("server did not stop after cancellation")
            .expect("server task panicked")
    }
}

/// Server with the Receptor catalog registered
pub async fn receptor_server() -> Arc<McpServer> {
    receptor_server_with_config(ServerConfig::default()).await
}

pub async fn receptor_server_with_config(config: ServerConfig) -> Arc<McpServer> {
    let server = McpServer::with_config("receptor-mcp-server", "1.0.0", config);
    catalog::register_receptor_catalog(&server).await;
    Arc::new(server)
}

pub fn request(id: impl Into<Value>, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id.into(), "method": method, "params": params })
}

pub fn tool_call(id: impl Into<Value>, name: &str, arguments: Value) -> Value {
    request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Parse the JSON carried in a tool result's first text block
pub fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no text content in {response}"));
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Initialize test tracing for debugging
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("receptor_mcp=debug")
        .with_test_writer()
        .try_init();
}
