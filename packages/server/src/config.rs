//! Runtime configuration of the relay server.

use thiserror::Error;

use crate::domain::DEFAULT_OUTBOUND_QUEUE_CAPACITY;

/// Default maximum size of one inbound WebSocket frame (bytes)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512 * 1024;

/// Lower bound for `max_message_size`
pub const MIN_MAX_MESSAGE_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("queue capacity must be at least 1")]
    QueueCapacityTooSmall,
    #[error("max message size must be at least {MIN_MAX_MESSAGE_SIZE} bytes (got {0})")]
    MaxMessageSizeTooSmall(usize),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port (0 picks an ephemeral port)
    pub port: u16,
    /// Bounded outbound queue length per session
    pub queue_capacity: usize,
    /// Maximum inbound WebSocket frame size (bytes)
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            queue_capacity: DEFAULT_OUTBOUND_QUEUE_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Build a validated configuration
    pub fn new(
        host: String,
        port: u16,
        queue_capacity: usize,
        max_message_size: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            host,
            port,
            queue_capacity,
            max_message_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::QueueCapacityTooSmall);
        }
        if self.max_message_size < MIN_MAX_MESSAGE_SIZE {
            return Err(ConfigError::MaxMessageSizeTooSmall(self.max_message_size));
        }
        Ok(())
    }

    /// `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
