//! Protocol dispatcher
//!
//! A table from method name to [`MethodHandler`], seeded with the eight
//! built-in MCP methods. `tools/call`, `resources/read` and `prompts/get`
//! resolve a second time, by name or URI, against the capability registry;
//! nothing else routes.

mod builtin;

use {
    crate::{
        error::{McpError, McpResult},
        logging,
        protocol::{Frame, McpProtocol},
        registry::CapabilityRegistry,
        response::JsonRpcResponse,
        session::Session,
    },
    async_trait::async_trait,
    serde_json::Value,
    std::{collections::HashMap, sync::Arc, time::Instant},
    tokio_util::sync::CancellationToken,
    tracing::Instrument,
};

pub use builtin::BUILTIN_METHODS;

/// Shared state every method handler can see
pub struct ServerState {
    pub protocol: McpProtocol,
    pub registry: CapabilityRegistry,
    pub session: Session,
}

impl ServerState {
    pub fn new(protocol: McpProtocol) -> Self {
        Self {
            protocol,
            registry: CapabilityRegistry::new(),
            session: Session::new(),
        }
    }
}

/// A protocol-level method
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn handle(
        &self,
        state: &ServerState,
        frame: &Frame,
        cancellation: &CancellationToken,
    ) -> McpResult<Value>;
}

pub struct Dispatcher {
    methods: HashMap<String, Arc<dyn MethodHandler>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Dispatcher {
    /// Dispatcher with the built-in MCP methods and nothing else
    pub fn with_builtins() -> Self {
        let methods = builtin::builtins()
            .into_iter()
            .map(|(name, handler)| (name.to_string(), handler))
            .collect();
        Self { methods }
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode and dispatch one input line.
    ///
    /// Returns the response frame to write, or `None` for notifications.
    pub async fn handle_line(
        &self,
        state: &ServerState,
        line: &[u8],
        cancellation: &CancellationToken,
    ) -> Option<JsonRpcResponse> {
        match Frame::decode(line) {
            Ok(frame) => self.dispatch(state, frame, cancellation).await,
            Err(err) => {
                logging::log_parse_error(&err.error.to_string(), line);
                // No id, no response, even for a broken envelope
                if err.notification {
                    return None;
                }
                Some(JsonRpcResponse::from_error(err.id, &err.error))
            }
        }
    }

    /// Dispatch one decoded frame.
    pub async fn dispatch(
        &self,
        state: &ServerState,
        frame: Frame,
        cancellation: &CancellationToken,
    ) -> Option<JsonRpcResponse> {
        let request_id = frame.id.as_ref().map(ToString::to_string);
        let span = logging::request_span(&frame.method, request_id.as_deref());

        async move {
            let Some(handler) = self.methods.get(frame.method.as_str()) else {
                logging::log_unknown_method(&frame.method);
                let err = McpError::UnknownMethod(frame.method.clone());
                return frame.id.map(|id| JsonRpcResponse::from_error(Some(id), &err));
            };

            let started = Instant::now();
            let result = handler.handle(state, &frame, cancellation).await;

            match (frame.id, result) {
                (Some(id), Ok(value)) => {
                    logging::log_handler_success(&frame.method, started.elapsed());
                    Some(JsonRpcResponse::success(Some(id), value))
                }
                (Some(id), Err(err)) => {
                    logging::log_handler_error(&frame.method, &err.to_string(), started.elapsed());
                    Some(JsonRpcResponse::from_error(Some(id), &err))
                }
                (None, Ok(_)) => None,
                (None, Err(err)) => {
                    logging::log_notification_error(&frame.method, &err.to_string());
                    None
                }
            }
        }
        .instrument(span)
        .await
    }
}
