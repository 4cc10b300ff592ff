//! Capability Handler Trait
//!
//! Tools, resources and prompts are all served by a [`CapabilityHandler`]: one
//! async call from a cancellable context and raw argument JSON to an opaque
//! result value. The engine never looks inside a handler.
//!
//! Any `Fn(HandlerContext, Box<RawValue>) -> impl Future<Output = anyhow::Result<Value>>`
//! closure is a handler:
//!
//! ```rust
//! use receptor_mcp::{handler::HandlerContext, McpServer, ToolDescriptor};
//! use serde_json::{json, value::RawValue, Value};
//!
//! # async fn register(server: &McpServer) {
//! server
//!     .register_tool(
//!         ToolDescriptor::new("ping", "Reply with pong", json!({ "type": "object" })),
//!         |_ctx: HandlerContext, _args: Box<RawValue>| async move {
//!             Ok::<Value, anyhow::Error>(json!("pong"))
//!         },
//!     )
//!     .await;
//! # }
//! ```

use {
    crate::response::RequestId,
    anyhow::Result,
    async_trait::async_trait,
    serde::de::DeserializeOwned,
    serde_json::{value::RawValue, Value},
    std::future::Future,
    tokio_util::sync::CancellationToken,
};

/// Context handed to every handler invocation
#[derive(Debug, Clone)]
pub struct HandlerContext {
    /// Id of the request being served, `None` for notifications
    pub request_id: Option<RequestId>,
    /// Protocol method that led to this call
    pub method: String,
    /// Cancelled when the server shuts down
    pub cancellation: CancellationToken,
}

impl HandlerContext {
    pub fn new(
        request_id: Option<RequestId>,
        method: impl Into<String>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            request_id,
            method: method.into(),
            cancellation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A tool, resource or prompt implementation
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn call(&self, context: HandlerContext, arguments: Box<RawValue>) -> Result<Value>;
}

#[async_trait]
impl<F, Fut> CapabilityHandler for F
where
    F: Fn(HandlerContext, Box<RawValue>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn call(&self, context: HandlerContext, arguments: Box<RawValue>) -> Result<Value> {
        (self)(context, arguments).await
    }
}

/// Deserialize raw handler arguments into a typed input.
///
/// `null` arguments are treated as an empty object so optional-only inputs
/// work when a client omits `arguments`.
pub fn parse_arguments<T: DeserializeOwned>(arguments: &RawValue) -> Result<T> {
    let text = match arguments.get().trim() {
        "null" => "{}",
        other => other,
    };
    Ok(serde_json::from_str(text)?)
}

/// The JSON `null` passed when a call carries no arguments
pub(crate) fn null_arguments() -> serde_json::Result<Box<RawValue>> {
    RawValue::from_string("null".to_string())
}
