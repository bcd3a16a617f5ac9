use actix_web::{web, HttpRequest, HttpResponse};

use mc_core::errors::TokenError;
use mc_core::repositories::TokenStore;
use mc_shared::MessageResponse;

use crate::handlers::error::{handle_domain_error, handle_token_error};

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the refresh token from the refresh header together with every
/// token rotated from it. Expired refresh tokens are accepted so that a
/// client can always end its session; forged ones are rejected.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out successfully",
///     "success": true
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: missing or invalid refresh token
/// - 500 Internal Server Error: token store failure
pub async fn logout<S>(req: HttpRequest, state: web::Data<AppState<S>>) -> HttpResponse
where
    S: TokenStore + 'static,
{
    let Some(refresh_token) = state.refresh_token(&req) else {
        return handle_token_error(&TokenError::InvalidToken);
    };

    match state.reissue_service.revoke(&refresh_token).await {
        Ok(revoked) => {
            tracing::debug!(revoked, "Logout completed");
            HttpResponse::Ok().json(MessageResponse::success("Logged out successfully"))
        }
        Err(error) => handle_domain_error(error),
    }
}
