//! Receptor MCP Server Library
//!
//! A Model Context Protocol server core speaking newline-delimited
//! JSON-RPC 2.0 over stdio: the `initialize`/`initialized` handshake, a
//! registry of tools, resources and prompts, and concurrent dispatch with a
//! single serialized writer.

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod response;
pub mod server;
pub mod session;
pub mod transport;
pub mod types;

// Test modules
#[cfg(test)]
pub mod tests;

// Re-export key types
pub use config::ServerConfig;
pub use error::{McpError, McpResult};
pub use handler::{parse_arguments, CapabilityHandler, HandlerContext};
pub use protocol::McpProtocol;
pub use response::{JsonRpcError, JsonRpcResponse, RequestId};
pub use server::McpServer;
pub use session::SessionState;
pub use types::{
    Content, PromptArgument, PromptDescriptor, PromptMessage, PromptsGetResult, ResourceContent,
    ResourceDescriptor, ResourcesReadResult, ToolCallResult, ToolDescriptor, MCP_VERSION,
};
