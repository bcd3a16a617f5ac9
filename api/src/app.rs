//! Application factory
//!
//! Builds the Actix-web application from the shared state: request tracing,
//! CORS and the token routes.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use mc_core::repositories::TokenStore;
use mc_shared::config::{Environment, ServerConfig};
use mc_shared::{error_codes, ErrorResponse, HealthResponse};

use crate::middleware::{auth::JwtAuth, cors::create_cors};
use crate::routes::auth::{logout::logout, me::me, reissue::reissue, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<S>(
    app_state: web::Data<AppState<S>>,
    environment: Environment,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    S: TokenStore + 'static,
{
    let cors = create_cors(environment, server, &app_state.refresh_header);
    let jwt_auth = JwtAuth::new(app_state.codec.clone());

    App::new()
        .app_data(app_state)
        // The last wrap runs first, so CORS answers preflights outside the request span
        .wrap(TracingLogger::default())
        .wrap(cors)
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/reissue", web::post().to(reissue::<S>))
                    .route("/logout", web::post().to(logout::<S>))
                    .service(web::resource("/me").wrap(jwt_auth).route(web::get().to(me))),
            ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(
        "monthly-coffee-api",
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
