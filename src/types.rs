//! Wire-format types for the MCP protocol
//!
//! Descriptors registered with the server, the capability summary returned by
//! `initialize`, and the result shapes of the built-in methods.

use {
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// Protocol revision announced during `initialize`
pub const MCP_VERSION: &str = "2024-11-05";

/// Static metadata for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's `arguments`
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Build a descriptor whose input schema is generated from `I`.
    pub fn from_schema<I: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, schemars::schema_for!(I).to_value())
    }
}

/// Static metadata for a resource, keyed by URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Static metadata for a prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<PromptArgument>,
}

impl PromptDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, argument: PromptArgument) -> Self {
        self.arguments.push(argument);
        self
    }
}

/// An argument accepted by a prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl PromptArgument {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            required: false,
        }
    }
}

/// Name and version of either peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Capability summary advertised by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

impl Default for ServerCapabilities {
    /// Everything supported, nothing subscribable or change-notifying.
    fn default() -> Self {
        Self {
            logging: Some(LoggingCapability {}),
            prompts: Some(PromptsCapability { list_changed: false }),
            resources: Some(ResourcesCapability {
                subscribe: false,
                list_changed: false,
            }),
            tools: Some(ToolsCapability { list_changed: false }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingCapability {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsCapability {
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    pub subscribe: bool,
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// `initialize` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesListResult {
    pub resources: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsListResult {
    pub prompts: Vec<PromptDescriptor>,
}

/// A content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// `tools/call` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(message)],
            is_error: true,
        }
    }

    /// Shape a tool handler's value into a result.
    ///
    /// Values that already carry a `content` array pass through unchanged,
    /// strings become a single text block and anything else is embedded as
    /// compact JSON text.
    pub fn from_value(value: Value) -> Self {
        if value.get("content").is_some_and(Value::is_array) {
            if let Ok(result) = serde_json::from_value::<ToolCallResult>(value.clone()) {
                return result;
            }
        }
        match value {
            Value::String(text) => Self::text(text),
            other => Self::text(other.to_string()),
        }
    }
}

/// `resources/read` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesReadResult {
    pub contents: Vec<ResourceContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64-encoded binary content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

impl ResourceContent {
    pub fn text(uri: impl Into<String>, mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: Some(mime_type.into()),
            text: Some(text.into()),
            blob: None,
        }
    }
}

/// `prompts/get` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsGetResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: Vec<Content>,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![Content::text(text)],
        }
    }
}

/// Severity levels for the advertised `logging` capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(JsonSchema, Deserialize)]
    #[allow(dead_code)]
    struct WorkStatusInput {
        work_id: String,
    }

    #[test]
    fn test_tool_descriptor_from_schema() {
        let tool = ToolDescriptor::from_schema::<WorkStatusInput>("get_work_status", "Status");
        assert_eq!(tool.input_schema["type"], "object");
        assert!(tool.input_schema["properties"]["work_id"].is_object());
        assert_eq!(tool.input_schema["required"], json!(["work_id"]));

        let wire = serde_json::to_value(&tool).unwrap();
        assert!(wire.get("inputSchema").is_some());
    }

    #[test]
    fn test_default_capabilities_are_static_off() {
        let caps = serde_json::to_value(ServerCapabilities::default()).unwrap();
        assert_eq!(
            caps,
            json!({
                "logging": {},
                "prompts": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "tools": { "listChanged": false }
            })
        );
    }

    #[test]
    fn test_tool_call_result_shaping() {
        assert_eq!(ToolCallResult::from_value(json!("done")), ToolCallResult::text("done"));

        let shaped = ToolCallResult::from_value(json!({ "work_id": "w1" }));
        assert_eq!(shaped.content, vec![Content::text(r#"{"work_id":"w1"}"#)]);

        let passthrough = json!({ "content": [{ "type": "text", "text": "hi" }], "isError": true });
        assert_eq!(ToolCallResult::from_value(passthrough), ToolCallResult::error("hi"));
    }

    #[test]
    fn test_is_error_omitted_on_success() {
        let ok = serde_json::to_value(ToolCallResult::text("fine")).unwrap();
        assert!(ok.get("isError").is_none());
        let failed = serde_json::to_value(ToolCallResult::error("broken")).unwrap();
        assert_eq!(failed["isError"], true);
        assert_eq!(failed["content"][0]["type"], "text");
    }

    #[test]
    fn test_prompt_descriptor_wire_shape() {
        let prompt = PromptDescriptor::new("deploy_workflow")
            .with_description("Deploy")
            .with_argument(PromptArgument::required("workflow_type", "Kind"))
            .with_argument(PromptArgument::optional("target_nodes", "Nodes"));
        let wire = serde_json::to_value(prompt).unwrap();
        assert_eq!(wire["arguments"][0]["required"], true);
        assert_eq!(wire["arguments"][1]["required"], false);
    }

    #[test]
    fn test_logging_level_wire_names() {
        assert_eq!(serde_json::to_value(LoggingLevel::Warning).unwrap(), json!("warning"));
        let level: LoggingLevel = serde_json::from_value(json!("emergency")).unwrap();
        assert_eq!(level, LoggingLevel::Emergency);
        assert!(serde_json::from_value::<LoggingLevel>(json!("WARN")).is_err());
        assert!(LoggingLevel::Debug < LoggingLevel::Error);
    }
}
