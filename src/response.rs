//! JSON-RPC response frames
//!
//! A response carries either `result` or `error`, never both, and encodes to a
//! single line.

use {
    crate::error::{McpError, McpResult},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::fmt,
};

/// Request identifier, echoed verbatim in the response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&McpError> for JsonRpcError {
    fn from(err: &McpError) -> Self {
        Self {
            code: err.code(),
            message: err.message().to_string(),
            data: err.data(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` when the id of a broken frame could not be recovered
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn from_error(id: Option<RequestId>, err: &McpError) -> Self {
        Self::error(id, JsonRpcError::from(err))
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Encode as exactly one newline-terminated frame.
    ///
    /// `serde_json` compact output never contains a raw newline, so the
    /// trailing `\n` is the only one in the frame.
    pub fn encode(&self) -> McpResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
