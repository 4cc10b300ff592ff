//! MCP Server
//!
//! [`McpServer`] owns the capability registry, the handshake state and the
//! read loop. Registration works at any time, before or while serving.

use {
    crate::{
        config::ServerConfig,
        dispatcher::{Dispatcher, ServerState},
        error::{McpError, McpResult},
        handler::{parse_arguments, CapabilityHandler, HandlerContext},
        logging::{self, McpConnectionId},
        protocol::McpProtocol,
        response::JsonRpcResponse,
        session::SessionState,
        transport::{self, Line, LineReader},
        types::{PromptDescriptor, ResourceDescriptor, ToolDescriptor},
    },
    schemars::JsonSchema,
    serde::{de::DeserializeOwned, Serialize},
    serde_json::{value::RawValue, Value},
    std::{future::Future, sync::Arc},
    tokio::{
        io::{AsyncRead, AsyncWrite, BufReader},
        sync::Semaphore,
    },
    tokio_util::{sync::CancellationToken, task::TaskTracker},
    tracing::Instrument,
};

pub struct McpServer {
    state: Arc<ServerState>,
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
}

impl McpServer {
    /// Create a server with default limits.
    ///
    /// `name` and `version` are reported to clients as `serverInfo`.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_config(name, version, ServerConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        version: impl Into<String>,
        config: ServerConfig,
    ) -> Self {
        Self {
            state: Arc::new(ServerState::new(McpProtocol::new(name, version))),
            dispatcher: Arc::new(Dispatcher::with_builtins()),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn protocol(&self) -> &McpProtocol {
        &self.state.protocol
    }

    /// Register a tool, replacing any tool with the same name.
    ///
    /// Returns `true` if a previous registration was replaced.
    pub async fn register_tool<H>(&self, descriptor: ToolDescriptor, handler: H) -> bool
    where
        H: CapabilityHandler + 'static,
    {
        self.state.registry.tools.register(descriptor, Arc::new(handler)).await
    }

    /// Register a tool whose input schema is generated from `I`.
    ///
    /// Arguments are deserialized into `I` before the handler runs and the
    /// output is serialized back to JSON; either failing is a tool error.
    pub async fn register_typed_tool<I, O, F, Fut>(&self, name: &str, description: &str, handler: F) -> bool
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I, HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let descriptor = ToolDescriptor::from_schema::<I>(name, description);
        let handler = Arc::new(handler);
        self.register_tool(descriptor, move |ctx: HandlerContext, args: Box<RawValue>| {
            let handler = Arc::clone(&handler);
            async move {
                let input: I = parse_arguments(&args)?;
                let output = handler(input, ctx).await?;
                Ok::<Value, anyhow::Error>(serde_json::to_value(output)?)
            }
        })
        .await
    }

    /// Register a resource, replacing any resource with the same URI.
    ///
    /// The handler receives the full `resources/read` params.
    pub async fn register_resource<H>(&self, descriptor: ResourceDescriptor, handler: H) -> bool
    where
        H: CapabilityHandler + 'static,
    {
        self.state.registry.resources.register(descriptor, Arc::new(handler)).await
    }

    /// Register a prompt, replacing any prompt with the same name.
    ///
    /// The handler receives the full `prompts/get` params.
    pub async fn register_prompt<H>(&self, descriptor: PromptDescriptor, handler: H) -> bool
    where
        H: CapabilityHandler + 'static,
    {
        self.state.registry.prompts.register(descriptor, Arc::new(handler)).await
    }

    pub async fn tools(&self) -> Vec<ToolDescriptor> {
        self.state.registry.tools.descriptors().await
    }

    pub async fn resources(&self) -> Vec<ResourceDescriptor> {
        self.state.registry.resources.descriptors().await
    }

    pub async fn prompts(&self) -> Vec<PromptDescriptor> {
        self.state.registry.prompts.descriptors().await
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.session.state().await
    }

    /// Whether the client has sent `initialized`
    pub async fn is_initialized(&self) -> bool {
        self.state.session.is_initialized().await
    }

    /// Serve MCP on stdin/stdout until end of input or cancellation.
    pub async fn run(&self, cancel: CancellationToken) -> McpResult<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout(), cancel).await
    }

    /// Serve one newline-delimited JSON-RPC stream.
    ///
    /// Every frame runs in its own task, at most `max_in_flight` at once.
    /// When input ends or `cancel` fires, running handlers get
    /// `shutdown_grace` to finish, then queued responses are flushed.
    /// Responses still unwritten after another `shutdown_grace` are dropped
    /// and this returns [`McpError::Transport`].
    ///
    /// Fails with [`McpError::Config`] before reading anything if the
    /// configured limits are invalid.
    pub async fn serve<R, W>(&self, reader: R, writer: W, cancel: CancellationToken) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let connection_id = McpConnectionId::new();
        let span = logging::connection_span(&connection_id);
        self.serve_connection(reader, writer, cancel).instrument(span).await
    }

    async fn serve_connection<R, W>(&self, reader: R, writer: W, cancel: CancellationToken) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let config = &self.config;
        config.validate()?;
        logging::log_server_startup(self.state.protocol.server_name(), self.state.protocol.server_version());

        let (sink, mut writer) = transport::spawn_writer(writer, config.response_queue_capacity);
        let mut lines = LineReader::new(BufReader::new(reader), config.max_message_size);
        let permits = Arc::new(Semaphore::new(config.max_in_flight));
        let tracker = TaskTracker::new();
        // Fired only when in-flight handlers overrun the grace period
        let abandon = CancellationToken::new();
        let mut consecutive_errors = 0u32;

        let outcome: McpResult<&'static str> = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok("cancelled"),
                next = lines.next_line() => next,
            };

            let line = match next {
                Ok(Some(line)) => {
                    consecutive_errors = 0;
                    line
                }
                Ok(None) => break Ok("end of input"),
                Err(e) => {
                    consecutive_errors += 1;
                    logging::log_read_error(&e.to_string(), consecutive_errors);
                    if consecutive_errors >= config.max_consecutive_read_errors {
                        break Err(McpError::Transport(format!(
                            "giving up after {consecutive_errors} consecutive read errors: {e}"
                        )));
                    }
                    continue;
                }
            };

            let bytes = match line {
                Line::Frame(bytes) => bytes,
                Line::TooLarge(size) => {
                    let err = McpError::MessageTooLarge(size, config.max_message_size);
                    let rejected = JsonRpcResponse::from_error(None, &err);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break Ok("cancelled"),
                        sent = sink.send(&rejected) => {
                            if let Err(e) = sent {
                                logging::log_response_error(&e.to_string());
                            }
                        }
                    }
                    continue;
                }
            };

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok("cancelled"),
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break Err(McpError::Internal("admission semaphore closed".to_string())),
                },
            };

            let state = Arc::clone(&self.state);
            let dispatcher = Arc::clone(&self.dispatcher);
            let sink = sink.clone();
            let cancel = cancel.clone();
            let abandon = abandon.clone();
            tracker.spawn(
                async move {
                    let _permit = permit;
                    let response = tokio::select! {
                        _ = abandon.cancelled() => return,
                        response = dispatcher.handle_line(&state, &bytes, &cancel) => response,
                    };
                    let Some(response) = response else { return };
                    tokio::select! {
                        _ = abandon.cancelled() => {}
                        sent = sink.send(&response) => {
                            if let Err(e) = sent {
                                logging::log_response_error(&e.to_string());
                            }
                        }
                    }
                }
                .in_current_span(),
            );
        };

        let reason = match &outcome {
            Ok(reason) => *reason,
            Err(_) => "input failure",
        };
        logging::log_server_shutdown(reason);

        tracker.close();
        if tokio::time::timeout(config.shutdown_grace, tracker.wait()).await.is_err() {
            logging::log_drain_timeout(tracker.len(), config.shutdown_grace);
            abandon.cancel();
            tracker.wait().await;
        }

        drop(sink);
        let written = match tokio::time::timeout(config.shutdown_grace, &mut writer).await {
            Ok(joined) => joined.map_err(|e| McpError::Internal(format!("response writer panicked: {e}")))?,
            Err(_) => {
                logging::log_writer_stalled(config.shutdown_grace);
                writer.abort();
                Err(McpError::Transport("output stream stalled during shutdown".to_string()))
            }
        };

        outcome?;
        written
    }
}
