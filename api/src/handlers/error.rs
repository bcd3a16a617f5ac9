//! Conversion of domain errors into HTTP responses
//!
//! Every token failure is answered with `401 Unauthorized` and a snake_case
//! error code. Server-side faults get `500` with a generic message so that
//! store or key details never reach the client.

use actix_web::HttpResponse;
use mc_core::errors::{DomainError, TokenError};
use mc_shared::{error_codes, ErrorResponse};

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Token(token_error) => handle_token_error(&token_error),
        DomainError::Validation { message } => {
            tracing::debug!(%message, "Rejected invalid request");
            HttpResponse::BadRequest()
                .json(ErrorResponse::new(error_codes::VALIDATION_ERROR, message))
        }
        DomainError::Store(store_error) => {
            tracing::error!(error = %store_error, "Token store failure");
            internal_error()
        }
        DomainError::Internal { message } => {
            tracing::error!(%message, "Internal error");
            internal_error()
        }
    }
}

/// Map a token error to its `401` response, or `500` for server faults
pub fn handle_token_error(error: &TokenError) -> HttpResponse {
    match token_error_code(error) {
        Some(code) => HttpResponse::Unauthorized().json(ErrorResponse::new(code, error.to_string())),
        None => {
            tracing::error!(%error, "Token handling failed on the server");
            internal_error()
        }
    }
}

/// Error code sent to clients for a token error
///
/// Returns `None` for failures that are not the client's fault.
pub fn token_error_code(error: &TokenError) -> Option<&'static str> {
    match error {
        TokenError::InvalidToken => Some(error_codes::INVALID_TOKEN),
        TokenError::UnknownToken => Some(error_codes::UNKNOWN_TOKEN),
        TokenError::TokenExpired => Some(error_codes::TOKEN_EXPIRED),
        TokenError::TokenRevoked => Some(error_codes::TOKEN_REVOKED),
        TokenError::TokenReuseDetected => Some(error_codes::TOKEN_REUSE_DETECTED),
        TokenError::TokenGenerationFailed | TokenError::KeyLoadError { .. } => None,
    }
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse::new(
        error_codes::INTERNAL_ERROR,
        "An internal error occurred",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};
    use mc_core::errors::StoreError;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_token_errors_are_unauthorized() {
        let cases = [
            (TokenError::InvalidToken, "invalid_token"),
            (TokenError::UnknownToken, "unknown_token"),
            (TokenError::TokenExpired, "token_expired"),
            (TokenError::TokenRevoked, "token_revoked"),
            (TokenError::TokenReuseDetected, "token_reuse_detected"),
        ];

        for (error, code) in cases {
            let response = handle_domain_error(DomainError::Token(error));
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(body["error"], code);
            assert_eq!(body["success"], false);
        }
    }

    #[actix_web::test]
    async fn test_server_faults_hide_details() {
        let response = handle_domain_error(DomainError::Store(StoreError::Backend {
            message: "connection refused on db-1".to_string(),
        }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert!(!body["message"].as_str().unwrap().contains("db-1"));

        let response = handle_token_error(&TokenError::KeyLoadError {
            message: "secret missing".to_string(),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_validation_error_is_bad_request() {
        let response = handle_domain_error(DomainError::Validation {
            message: "member id is empty".to_string(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation_error");
    }
}
