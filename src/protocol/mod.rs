//! MCP protocol identity and frame decoding
//!
//! [`McpProtocol`] holds what the server announces during the handshake; the
//! [`message`] module turns input lines into frames.

pub mod message;

pub use message::{
    DecodeError, Frame, InitializeParams, PromptGetParams, ResourceReadParams, ToolCallParams,
};

pub use self::protocol::McpProtocol;

mod protocol {
    //! Handles MCP protocol versioning, capabilities, and server information.

    use crate::types::{Implementation, InitializeResult, ServerCapabilities, MCP_VERSION};

    #[derive(Debug, Clone)]
    pub struct McpProtocol {
        version: String,
        server_info: Implementation,
        capabilities: ServerCapabilities,
    }

    impl McpProtocol {
        pub fn new(server_name: impl Into<String>, server_version: impl Into<String>) -> Self {
            Self {
                version: MCP_VERSION.to_string(),
                server_info: Implementation {
                    name: server_name.into(),
                    version: server_version.into(),
                },
                capabilities: ServerCapabilities::default(),
            }
        }

        /// Get protocol version
        pub fn version(&self) -> &str {
            &self.version
        }

        pub fn server_name(&self) -> &str {
            &self.server_info.name
        }

        pub fn server_version(&self) -> &str {
            &self.server_info.version
        }

        pub fn capabilities(&self) -> &ServerCapabilities {
            &self.capabilities
        }

        /// Create initialization response
        pub fn initialize_result(&self) -> InitializeResult {
            InitializeResult {
                protocol_version: self.version.clone(),
                capabilities: self.capabilities.clone(),
                server_info: self.server_info.clone(),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_initialize_result() {
            let proto = McpProtocol::new("receptor-mcp-server", "1.0.0");
            let resp = serde_json::to_value(proto.initialize_result()).unwrap();
            assert_eq!(resp["protocolVersion"], "2024-11-05");
            assert_eq!(resp["serverInfo"]["name"], proto.server_name());
            assert_eq!(resp["serverInfo"]["version"], proto.server_version());
            assert_eq!(resp["capabilities"]["tools"]["listChanged"], false);
            assert_eq!(resp["capabilities"]["resources"]["subscribe"], false);
        }
    }
}
