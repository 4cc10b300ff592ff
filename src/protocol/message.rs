//! Frame decoding
//!
//! One input line is decoded into a [`Frame`] with a single borrowed pass:
//! the envelope fields are checked up front while `id` and `params` stay as
//! raw JSON until a handler asks for them.

use {
    crate::{
        error::{McpError, McpResult},
        response::RequestId,
        types::Implementation,
    },
    serde::{de::DeserializeOwned, Deserialize, Serialize},
    serde_json::{error::Category, value::RawValue, Value},
    std::borrow::Cow,
};

/// Borrowed view of a JSON-RPC envelope
#[derive(Debug, Deserialize)]
struct RawFrame<'a> {
    #[serde(default, borrow)]
    jsonrpc: Option<Cow<'a, str>>,
    #[serde(default, borrow)]
    id: Option<&'a RawValue>,
    #[serde(borrow)]
    method: Cow<'a, str>,
    #[serde(default, borrow)]
    params: Option<&'a RawValue>,
}

/// A decoded request or notification
#[derive(Debug, Clone)]
pub struct Frame {
    /// Absent (or `null`) for notifications
    pub id: Option<RequestId>,
    pub method: String,
    pub params: Option<Box<RawValue>>,
}

/// A frame that could not be decoded, with whatever id could be recovered
#[derive(Debug)]
pub struct DecodeError {
    pub id: Option<RequestId>,
    pub error: McpError,
    /// The frame was a JSON object with no `id` (or a null one)
    pub notification: bool,
}

impl DecodeError {
    fn invalid(id: Option<RequestId>, notification: bool, reason: impl Into<String>) -> Self {
        Self {
            id,
            error: McpError::InvalidRequest(reason.into()),
            notification,
        }
    }
}

impl Frame {
    /// Decode one line of input.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: RawFrame<'_> = serde_json::from_slice(bytes).map_err(|err| match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => DecodeError {
                id: None,
                error: McpError::Parse(err),
                notification: false,
            },
            // Well-formed JSON that is not a request envelope
            Category::Data => {
                let (id, notification) = recover_id(bytes);
                DecodeError::invalid(id, notification, err.to_string())
            }
        })?;

        let id = match raw.id {
            Some(raw_id) => Some(
                serde_json::from_str::<RequestId>(raw_id.get())
                    .map_err(|_| DecodeError::invalid(None, false, format!("invalid id: {}", raw_id.get())))?,
            ),
            None => None,
        };
        let notification = id.is_none();

        match raw.jsonrpc.as_deref() {
            Some("2.0") => {}
            Some(other) => {
                return Err(DecodeError::invalid(
                    id,
                    notification,
                    format!("unsupported jsonrpc version: {other}"),
                ))
            }
            None => return Err(DecodeError::invalid(id, notification, "missing jsonrpc field")),
        }

        if raw.method.is_empty() {
            return Err(DecodeError::invalid(id, notification, "empty method name"));
        }

        Ok(Self {
            id,
            method: raw.method.into_owned(),
            params: raw.params.map(RawValue::to_owned),
        })
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Deserialize `params` into the shape a built-in method expects.
    pub fn parse_params<T: DeserializeOwned>(&self) -> McpResult<T> {
        let raw = self
            .params
            .as_ref()
            .ok_or_else(|| McpError::InvalidParams(format!("missing params for {}", self.method)))?;
        serde_json::from_str(raw.get())
            .map_err(|e| McpError::InvalidParams(format!("invalid {} params: {e}", self.method)))
    }
}

/// Best-effort id extraction from a frame that failed envelope validation.
///
/// The flag is set when the frame is an object without an id.
fn recover_id(bytes: &[u8]) -> (Option<RequestId>, bool) {
    let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(bytes) else {
        return (None, false);
    };
    match object.get("id") {
        None | Some(Value::Null) => (None, true),
        Some(id) => (serde_json::from_value(id.clone()).ok(), false),
    }
}

/// `initialize` params
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default)]
    pub client_info: Option<Implementation>,
}

/// `tools/call` params
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Box<RawValue>>,
}

/// `resources/read` params
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

/// `prompts/get` params
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptGetParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}
