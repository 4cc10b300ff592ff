//! MCP Logging Module
//!
//! Structured logging for the server using the tracing crate. Everything goes
//! to stderr: stdout carries only response frames.

use {
    std::time::Duration,
    tracing::{debug, error, info, span, trace, warn, Level, Span},
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
    uuid::Uuid,
};

/// Initialize the tracing subscriber with appropriate configuration
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("receptor_mcp=info,receptor_mcp_server=info"));

    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if json_format {
        // JSON format for production/structured logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    info!("Tracing initialized");
}

/// Identifies one served byte stream in the logs
#[derive(Debug, Clone)]
pub struct McpConnectionId(pub String);

impl McpConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for McpConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for McpConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span covering the lifetime of one served stream
pub fn connection_span(connection_id: &McpConnectionId) -> Span {
    span!(Level::INFO, "mcp_connection", connection_id = %connection_id)
}

/// Span covering the processing of one frame
pub fn request_span(method: &str, request_id: Option<&str>) -> Span {
    span!(
        Level::INFO,
        "mcp_request",
        method = %method,
        request_id = request_id,
    )
}

pub fn log_frame_received(frame_size: usize) {
    trace!(frame_size = frame_size, event = "frame_received", "Received frame");
}

pub fn log_blank_line() {
    trace!(event = "blank_line", "Skipped blank input line");
}

pub fn log_read_error(error: &str, consecutive: u32) {
    error!(
        error = %error,
        consecutive = consecutive,
        event = "read_error",
        "Failed to read from input stream"
    );
}

pub fn log_parse_error(error: &str, raw_message: &[u8]) {
    // Keep the log line bounded for oversized garbage
    let preview = String::from_utf8_lossy(&raw_message[..raw_message.len().min(256)]);
    error!(
        error = %error,
        raw_message = %preview,
        event = "parse_error",
        "Failed to decode frame"
    );
}

pub fn log_frame_too_large(size: usize, max: usize) {
    warn!(
        frame_size = size,
        max_message_size = max,
        event = "frame_too_large",
        "Rejected oversized frame"
    );
}

pub fn log_unknown_method(method: &str) {
    warn!(method = %method, event = "unknown_method", "Unknown MCP method requested");
}

pub fn log_unknown_capability(kind: &str, key: &str) {
    warn!(kind = %kind, key = %key, event = "unknown_capability", "Unknown capability requested");
}

pub fn log_client_initialize(client: &str, client_version: &str, protocol_version: &str) {
    info!(
        client = %client,
        client_version = %client_version,
        protocol_version = %protocol_version,
        event = "client_initialize",
        "Initialize request received"
    );
}

pub fn log_tool_call(tool: &str) {
    info!(tool = %tool, event = "tool_call", "Tool call requested");
}

pub fn log_tool_failure(tool: &str, error: &str) {
    warn!(
        tool = %tool,
        error = %error,
        event = "tool_execution_error",
        "Tool failed, returning error content"
    );
}

pub fn log_handler_success(method: &str, duration: Duration) {
    debug!(
        method = %method,
        duration_ms = duration.as_millis(),
        event = "handler_success",
        "Successfully handled method"
    );
}

pub fn log_handler_error(method: &str, error: &str, duration: Duration) {
    error!(
        method = %method,
        error = %error,
        duration_ms = duration.as_millis(),
        event = "handler_error",
        "Failed to handle method"
    );
}

pub fn log_notification_error(method: &str, error: &str) {
    debug!(
        method = %method,
        error = %error,
        event = "notification_error",
        "Notification handler failed, no response sent"
    );
}

pub fn log_response_sent(response_size: usize) {
    trace!(response_size = response_size, event = "response_sent", "Sent response");
}

pub fn log_response_error(error: &str) {
    error!(error = %error, event = "response_error", "Failed to send response");
}

/// Server lifecycle logging
pub fn log_server_startup(name: &str, version: &str) {
    info!(
        server = %name,
        version = %version,
        event = "server_startup",
        "Starting MCP server"
    );
}

pub fn log_server_shutdown(reason: &str) {
    info!(reason = %reason, event = "server_shutdown", "MCP server shutting down");
}

pub fn log_drain_timeout(in_flight: usize, grace: Duration) {
    warn!(
        in_flight = in_flight,
        grace_ms = grace.as_millis(),
        event = "drain_timeout",
        "In-flight handlers still running after grace period"
    );
}

pub fn log_writer_stalled(grace: Duration) {
    error!(
        grace_ms = grace.as_millis(),
        event = "writer_stalled",
        "Output stream stalled, dropping unwritten responses"
    );
}
