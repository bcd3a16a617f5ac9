//! Error types for token handling and refresh token storage
//!
//! Messages are kept short and free of token material; the presentation
//! layer maps each variant to an error code.

use thiserror::Error;

/// Token-related errors
///
/// Every variant is an authentication failure the client can act on, except
/// `TokenGenerationFailed` and `KeyLoadError` which are server faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Unknown refresh token")]
    UnknownToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Refresh token reuse detected")]
    TokenReuseDetected,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Failed to load signing key: {message}")]
    KeyLoadError { message: String },
}

impl TokenError {
    /// Whether the error is caused by the presented credential rather than the server
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            TokenError::TokenGenerationFailed | TokenError::KeyLoadError { .. }
        )
    }
}

/// Refresh token store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Refresh token {token_id} already exists")]
    DuplicateToken { token_id: String },

    #[error("Refresh token {token_id} not found")]
    NotFound { token_id: String },

    #[error("Refresh token {token_id} was already rotated")]
    AlreadyRotated { token_id: String },

    #[error("Refresh token {token_id} is revoked")]
    Revoked { token_id: String },

    #[error("Token store failure: {message}")]
    Backend { message: String },
}

/// Failures while decoding a token
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed, tampered, signed by an unknown key or for another issuer/audience
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Signature is valid but the token is past its expiry
    #[error("Token expired")]
    Expired,
}

impl From<CodecError> for TokenError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidSignature => TokenError::InvalidToken,
            CodecError::Expired => TokenError::TokenExpired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_maps_to_token_error() {
        assert_eq!(TokenError::from(CodecError::InvalidSignature), TokenError::InvalidToken);
        assert_eq!(TokenError::from(CodecError::Expired), TokenError::TokenExpired);
    }

    #[test]
    fn test_client_errors() {
        assert!(TokenError::TokenRevoked.is_client_error());
        assert!(TokenError::UnknownToken.is_client_error());
        assert!(!TokenError::TokenGenerationFailed.is_client_error());
        assert!(!TokenError::KeyLoadError {
            message: "empty".to_string()
        }
        .is_client_error());
    }

    #[test]
    fn test_store_error_messages_carry_token_id() {
        let err = StoreError::AlreadyRotated {
            token_id: "rt-1".to_string(),
        };
        assert_eq!(err.to_string(), "Refresh token rt-1 was already rotated");
    }
}
