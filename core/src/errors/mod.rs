//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{CodecError, StoreError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Shorthand for an internal error with a message
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Returns the token error if this is one
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(err) => Some(err),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_bridges_into_domain_error() {
        let err: DomainError = TokenError::TokenReuseDetected.into();
        assert!(matches!(
            err.as_token_error(),
            Some(TokenError::TokenReuseDetected)
        ));
        assert_eq!(err.to_string(), "Refresh token reuse detected");
    }

    #[test]
    fn test_store_error_is_not_a_token_error() {
        let err: DomainError = StoreError::Backend {
            message: "connection reset".to_string(),
        }
        .into();
        assert!(err.as_token_error().is_none());
        assert!(err.to_string().contains("connection reset"));
    }
}
