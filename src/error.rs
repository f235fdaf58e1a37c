//! Error types for order extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading messages or extracting order items
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Message body or container could not be decoded
    #[error("Failed to decode message {message_id}: {reason}")]
    Decode { message_id: String, reason: String },

    /// Item id, name and quantity captures do not line up
    #[error(
        "Misaligned items in message {message_id}: \
         {item_ids} ids, {item_names} names, {item_quantities} quantities"
    )]
    MisalignedItems {
        message_id: String,
        item_ids: usize,
        item_names: usize,
        item_quantities: usize,
    },

    /// Scan stopped at the token budget before reaching end of stream
    #[error("Scan of message {message_id} stopped after {tokens} tokens")]
    ScanTruncated { message_id: String, tokens: usize },

    /// I/O error with the associated file path
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Template descriptor is unusable
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// No template registered under this name
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Search query could not be parsed
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Message this error belongs to, if it is scoped to a single message
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Decode { message_id, .. }
            | Self::MisalignedItems { message_id, .. }
            | Self::ScanTruncated { message_id, .. } => Some(message_id),
            _ => None,
        }
    }
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
