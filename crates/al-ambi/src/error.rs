//! Error types for ambisonic decoding

use thiserror::Error;

/// Ambisonics error type
#[derive(Error, Debug)]
pub enum AmbiError {
    /// Malformed `.ambdec` content
    #[error("Line {line}: {message}")]
    Format { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Speaker label with no output channel
    #[error("Unknown speaker: {0}")]
    UnknownSpeaker(String),

    /// Unsupported order combination
    #[error("Invalid ambisonic order: {0}")]
    InvalidOrder(String),

    /// Channel or buffer count mismatch
    #[error("Channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },
}

impl AmbiError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias
pub type AmbiResult<T> = Result<T, AmbiError>;
