//! Error types for the EAX layer

use thiserror::Error;

/// Status returned by `Eax::set`/`Eax::get` on success
pub const AL_NO_ERROR: i32 = 0;

/// Status returned by `Eax::set`/`Eax::get` on any failure
pub const AL_INVALID_OPERATION: i32 = 0xA004;

/// EAX error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EaxError {
    /// Malformed or unrecognized call shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Value out of range, or an illegal state transition
    #[error("{owner} {field} validation failed: {message}")]
    Validation {
        owner: &'static str,
        field: &'static str,
        message: String,
    },

    /// Property buffer shorter than the requested value
    #[error("Buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    /// FX-slot index has no value
    #[error("Index error: {0}")]
    Index(String),

    /// Native resource could not be created or bound
    #[error("Resource error: {0}")]
    Resource(String),

    /// Integration error: a required collaborator is missing
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EaxError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn validation(owner: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            owner,
            field,
            message: message.into(),
        }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for integration errors that bad input alone cannot cause
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Map to the single failure status of the call ABI
    pub fn al_status(&self) -> i32 {
        AL_INVALID_OPERATION
    }
}

/// Result type alias
pub type EaxResult<T> = Result<T, EaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EaxError::validation("Chorus", "Rate", "value 11 out of range [0, 10]");
        assert_eq!(err.to_string(), "Chorus Rate validation failed: value 11 out of range [0, 10]");
        let err = EaxError::BufferTooSmall { needed: 16, got: 4 };
        assert_eq!(err.to_string(), "Buffer too small: need 16 bytes, got 4");
    }

    #[test]
    fn test_fatal_and_status() {
        assert!(EaxError::internal("no slot").is_fatal());
        assert!(!EaxError::protocol("bad guid").is_fatal());
        assert_eq!(EaxError::protocol("x").al_status(), AL_INVALID_OPERATION);
    }
}
