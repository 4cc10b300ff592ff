//! Server configuration
//!
//! Limits that keep a single stdio session from exhausting the process:
//! how many frames may run at once, how large one frame may be, and how long
//! shutdown waits for handlers that are still running.

use {
    crate::error::{McpError, McpResult},
    serde::{Deserialize, Serialize},
    std::{str::FromStr, time::Duration},
};

/// Prefix shared by every environment variable the server reads
pub const ENV_PREFIX: &str = "RECEPTOR_MCP_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Frames allowed to run concurrently before the read loop waits
    pub max_in_flight: usize,

    /// Maximum frame size in bytes, newline excluded
    pub max_message_size: usize,

    /// How long shutdown waits for in-flight handlers
    pub shutdown_grace: Duration,

    /// Capacity of the queue feeding the writer task
    pub response_queue_capacity: usize,

    /// Read failures in a row before the input is considered dead
    pub max_consecutive_read_errors: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 64,
            max_message_size: 2 * 1024 * 1024, // 2MB
            shutdown_grace: Duration::from_secs(5),
            response_queue_capacity: 256,
            max_consecutive_read_errors: 16,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by any `RECEPTOR_MCP_*` variables that are set.
    ///
    /// | variable | field |
    /// |---|---|
    /// | `RECEPTOR_MCP_MAX_IN_FLIGHT` | `max_in_flight` |
    /// | `RECEPTOR_MCP_MAX_MESSAGE_SIZE` | `max_message_size` |
    /// | `RECEPTOR_MCP_SHUTDOWN_GRACE_MS` | `shutdown_grace` |
    /// | `RECEPTOR_MCP_RESPONSE_QUEUE_CAPACITY` | `response_queue_capacity` |
    /// | `RECEPTOR_MCP_MAX_CONSECUTIVE_READ_ERRORS` | `max_consecutive_read_errors` |
    pub fn from_env() -> McpResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from any source.
    pub fn from_lookup<F>(lookup: F) -> McpResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        if let Some(value) = var("MAX_IN_FLIGHT") {
            config.max_in_flight = parse("MAX_IN_FLIGHT", &value)?;
        }
        if let Some(value) = var("MAX_MESSAGE_SIZE") {
            config.max_message_size = parse("MAX_MESSAGE_SIZE", &value)?;
        }
        if let Some(value) = var("SHUTDOWN_GRACE_MS") {
            config.shutdown_grace = Duration::from_millis(parse("SHUTDOWN_GRACE_MS", &value)?);
        }
        if let Some(value) = var("RESPONSE_QUEUE_CAPACITY") {
            config.response_queue_capacity = parse("RESPONSE_QUEUE_CAPACITY", &value)?;
        }
        if let Some(value) = var("MAX_CONSECUTIVE_READ_ERRORS") {
            config.max_consecutive_read_errors = parse("MAX_CONSECUTIVE_READ_ERRORS", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Strict limits for tests
    pub fn strict() -> Self {
        Self {
            max_in_flight: 4,
            max_message_size: 64 * 1024, // 64KB
            shutdown_grace: Duration::from_millis(500),
            response_queue_capacity: 16,
            max_consecutive_read_errors: 4,
        }
    }

    pub fn validate(&self) -> McpResult<()> {
        let zero = |field: &str| McpError::Config(format!("{field} must be greater than zero"));
        if self.max_in_flight == 0 {
            return Err(zero("max_in_flight"));
        }
        if self.max_message_size == 0 {
            return Err(zero("max_message_size"));
        }
        if self.response_queue_capacity == 0 {
            return Err(zero("response_queue_capacity"));
        }
        if self.max_consecutive_read_errors == 0 {
            return Err(zero("max_consecutive_read_errors"));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(suffix: &str, value: &str) -> McpResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| McpError::Config(format!("invalid {ENV_PREFIX}{suffix}={value:?}: {e}")))
}
