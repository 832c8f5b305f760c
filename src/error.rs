//! Error types for switch operations.

use thiserror::Error;

/// Result type for switch operations.
pub type SwitchResult<T> = Result<T, SwitchError>;

/// Switch-specific errors.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Switch value could not be serialized for the write path
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored payload could not be parsed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Durable store failure
    #[error("store error: {0}")]
    Store(String),

    /// Store fetch exceeded the configured timeout
    #[error("store fetch timed out")]
    Timeout,

    /// Key not present in the registry (strict lookups only)
    #[error("unknown switch: {0}")]
    UnknownSwitch(String),
}
