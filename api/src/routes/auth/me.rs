use actix_web::HttpResponse;

use crate::dto::CurrentMemberResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/me
///
/// Requires `Authorization: Bearer {access_token}`; the route is wrapped in
/// [`crate::middleware::JwtAuth`]. Returns the member id and the access
/// token's id and expiry.
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(CurrentMemberResponse::from(auth))
}
