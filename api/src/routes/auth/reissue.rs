use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};

use mc_core::errors::TokenError;
use mc_core::repositories::TokenStore;
use mc_shared::MessageResponse;

use crate::handlers::error::{handle_domain_error, handle_token_error};

use super::AppState;

/// Handler for POST /api/v1/auth/reissue
///
/// Exchanges a refresh token for a new access token. The refresh token is
/// read from the configured refresh header (`Refresh` by default).
///
/// # Response
///
/// ## Success (201 Created)
/// Headers:
/// ```text
/// Authorization: Bearer {access_token}
/// Refresh: {refresh_token}
/// ```
/// The refresh header carries the rotated token, or the presented one when
/// rotation is disabled. Body:
/// ```json
/// {
///     "message": "Access token reissued",
///     "success": true
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: missing, invalid, unknown, expired, revoked or reused
///   refresh token; no token headers are set
/// - 500 Internal Server Error: signing or store failure
pub async fn reissue<S>(req: HttpRequest, state: web::Data<AppState<S>>) -> HttpResponse
where
    S: TokenStore + 'static,
{
    let Some(refresh_token) = state.refresh_token(&req) else {
        tracing::debug!("Reissue request without refresh token");
        return handle_token_error(&TokenError::InvalidToken);
    };

    match state.reissue_service.reissue(&refresh_token).await {
        Ok(tokens) => HttpResponse::Created()
            .insert_header((AUTHORIZATION, format!("Bearer {}", tokens.access_token)))
            .insert_header((state.refresh_header.clone(), tokens.refresh_token))
            .json(MessageResponse::success("Access token reissued")),
        Err(error) => handle_domain_error(error),
    }
}
