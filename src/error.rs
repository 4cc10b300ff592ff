//! JSON-RPC error taxonomy for the MCP server core.
//!
//! Every protocol-level failure is an [`McpError`]; [`McpError::code`] maps it
//! onto the JSON-RPC 2.0 code space and [`McpError::data`] yields the optional
//! `error.data` detail.

use {serde_json::Value, thiserror::Error};

/// Standard JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// MCP extension codes for request- and server-level failures
pub const REQUEST_FAILED: i32 = -32000;
pub const SERVER_FAILED: i32 = -32001;

#[derive(Debug, Error)]
pub enum McpError {
    // Frame errors
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Message too large: {0} bytes (max: {1})")]
    MessageTooLarge(usize, usize),

    // Dispatch errors
    #[error("Method not found: {0}")]
    UnknownMethod(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Resource not found: {0}")]
    UnknownResource(String),

    #[error("Prompt not found: {0}")]
    UnknownPrompt(String),

    // Handler failures surfaced at the RPC level
    #[error("Handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    // Server errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => PARSE_ERROR,
            Self::InvalidRequest(_) => INVALID_REQUEST,
            Self::UnknownMethod(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_)
            | Self::UnknownTool(_)
            | Self::UnknownResource(_)
            | Self::UnknownPrompt(_) => INVALID_PARAMS,
            Self::MessageTooLarge(_, _) => REQUEST_FAILED,
            Self::Transport(_) | Self::Config(_) => SERVER_FAILED,
            Self::Handler(_) | Self::Io(_) | Self::Json(_) | Self::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// Short human message placed in `error.message`
    pub fn message(&self) -> &'static str {
        match self {
            Self::Parse(_) => "Parse error",
            Self::InvalidRequest(_) => "Invalid request",
            Self::MessageTooLarge(_, _) => "Message too large",
            Self::UnknownMethod(_) => "Method not found",
            Self::InvalidParams(_) => "Invalid params",
            Self::UnknownTool(_) => "Tool not found",
            Self::UnknownResource(_) => "Resource not found",
            Self::UnknownPrompt(_) => "Prompt not found",
            Self::Transport(_) | Self::Config(_) => "Server error",
            Self::Handler(_) | Self::Io(_) | Self::Json(_) | Self::Internal(_) => "Internal error",
        }
    }

    /// Detail placed in `error.data`
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::UnknownMethod(key)
            | Self::UnknownTool(key)
            | Self::UnknownResource(key)
            | Self::UnknownPrompt(key) => Some(Value::String(key.clone())),
            // anyhow's alternate form keeps the context chain
            Self::Handler(err) => Some(Value::String(format!("{err:#}"))),
            Self::Parse(err) | Self::Json(err) => Some(Value::String(err.to_string())),
            Self::InvalidRequest(detail)
            | Self::InvalidParams(detail)
            | Self::Transport(detail)
            | Self::Config(detail)
            | Self::Internal(detail) => Some(Value::String(detail.clone())),
            Self::Io(err) => Some(Value::String(err.to_string())),
            Self::MessageTooLarge(size, max) => {
                Some(serde_json::json!({ "size": size, "max": max }))
            }
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
