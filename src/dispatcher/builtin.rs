//! Built-in MCP methods

use {
    super::{MethodHandler, ServerState},
    crate::{
        error::{McpError, McpResult},
        handler::{null_arguments, HandlerContext},
        logging,
        protocol::{Frame, InitializeParams, PromptGetParams, ResourceReadParams, ToolCallParams},
        types::{PromptsListResult, ResourcesListResult, ToolCallResult, ToolsListResult},
    },
    async_trait::async_trait,
    serde::Serialize,
    serde_json::Value,
    std::sync::Arc,
    tokio_util::sync::CancellationToken,
};

/// Names of the methods every server answers
pub const BUILTIN_METHODS: [&str; 8] = [
    "initialize",
    "initialized",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/read",
    "prompts/list",
    "prompts/get",
];

pub(super) fn builtins() -> Vec<(&'static str, Arc<dyn MethodHandler>)> {
    let handlers: [Arc<dyn MethodHandler>; 8] = [
        Arc::new(Initialize),
        Arc::new(Initialized),
        Arc::new(ToolsList),
        Arc::new(ToolsCall),
        Arc::new(ResourcesList),
        Arc::new(ResourcesRead),
        Arc::new(PromptsList),
        Arc::new(PromptsGet),
    ];
    BUILTIN_METHODS.into_iter().zip(handlers).collect()
}

fn to_value<T: Serialize>(result: &T) -> McpResult<Value> {
    Ok(serde_json::to_value(result)?)
}

fn context(frame: &Frame, cancellation: &CancellationToken) -> HandlerContext {
    HandlerContext::new(frame.id.clone(), frame.method.clone(), cancellation.child_token())
}

struct Initialize;

#[async_trait]
impl MethodHandler for Initialize {
    async fn handle(
        &self,
        state: &ServerState,
        frame: &Frame,
        _cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let params: InitializeParams = frame.parse_params()?;
        let (client, client_version) = params
            .client_info
            .as_ref()
            .map(|info| (info.name.as_str(), info.version.as_str()))
            .unwrap_or(("unknown", "unknown"));
        logging::log_client_initialize(client, client_version, &params.protocol_version);

        state
            .session
            .record_client(params.client_info, params.protocol_version)
            .await;
        to_value(&state.protocol.initialize_result())
    }
}

struct Initialized;

#[async_trait]
impl MethodHandler for Initialized {
    async fn handle(
        &self,
        state: &ServerState,
        _frame: &Frame,
        _cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        state.session.mark_initialized().await;
        Ok(Value::Null)
    }
}

struct ToolsList;

#[async_trait]
impl MethodHandler for ToolsList {
    async fn handle(
        &self,
        state: &ServerState,
        _frame: &Frame,
        _cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let tools = state.registry.tools.descriptors().await;
        to_value(&ToolsListResult { tools })
    }
}

/// Tool failures are reported inside a successful result so the client
/// model can read them.
struct ToolsCall;

#[async_trait]
impl MethodHandler for ToolsCall {
    async fn handle(
        &self,
        state: &ServerState,
        frame: &Frame,
        cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let params: ToolCallParams = frame.parse_params()?;
        let Some(entry) = state.registry.tools.get(&params.name).await else {
            logging::log_unknown_capability("tool", &params.name);
            return Err(McpError::UnknownTool(params.name));
        };

        logging::log_tool_call(&params.name);
        let arguments = match params.arguments {
            Some(arguments) => arguments,
            None => null_arguments()?,
        };

        let result = match entry.handler.call(context(frame, cancellation), arguments).await {
            Ok(value) => ToolCallResult::from_value(value),
            Err(err) => {
                let message = format!("Error executing tool {}: {err:#}", params.name);
                logging::log_tool_failure(&params.name, &message);
                ToolCallResult::error(message)
            }
        };
        to_value(&result)
    }
}

struct ResourcesList;

#[async_trait]
impl MethodHandler for ResourcesList {
    async fn handle(
        &self,
        state: &ServerState,
        _frame: &Frame,
        _cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let resources = state.registry.resources.descriptors().await;
        to_value(&ResourcesListResult { resources })
    }
}

struct ResourcesRead;

#[async_trait]
impl MethodHandler for ResourcesRead {
    async fn handle(
        &self,
        state: &ServerState,
        frame: &Frame,
        cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let params: ResourceReadParams = frame.parse_params()?;
        let Some(entry) = state.registry.resources.get(&params.uri).await else {
            logging::log_unknown_capability("resource", &params.uri);
            return Err(McpError::UnknownResource(params.uri));
        };

        let raw = match &frame.params {
            Some(raw) => raw.clone(),
            None => null_arguments()?,
        };
        entry
            .handler
            .call(context(frame, cancellation), raw)
            .await
            .map_err(McpError::Handler)
    }
}

struct PromptsList;

#[async_trait]
impl MethodHandler for PromptsList {
    async fn handle(
        &self,
        state: &ServerState,
        _frame: &Frame,
        _cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let prompts = state.registry.prompts.descriptors().await;
        to_value(&PromptsListResult { prompts })
    }
}

struct PromptsGet;

#[async_trait]
impl MethodHandler for PromptsGet {
    async fn handle(
        &self,
        state: &ServerState,
        frame: &Frame,
        cancellation: &CancellationToken,
    ) -> McpResult<Value> {
        let params: PromptGetParams = frame.parse_params()?;
        let Some(entry) = state.registry.prompts.get(&params.name).await else {
            logging::log_unknown_capability("prompt", &params.name);
            return Err(McpError::UnknownPrompt(params.name));
        };

        let raw = match &frame.params {
            Some(raw) => raw.clone(),
            None => null_arguments()?,
        };
        entry
            .handler
            .call(context(frame, cancellation), raw)
            .await
            .map_err(McpError::Handler)
    }
}
