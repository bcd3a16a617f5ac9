//! CORS middleware configuration for cross-origin requests.
//!
//! Browser clients read the reissued tokens from response headers, so both
//! `Authorization` and the configured refresh header are exposed. Development
//! allows any origin; production only the origins listed in
//! `server.allowed_origins`.

use actix_cors::Cors;
use actix_web::http::{header, header::HeaderName, Method};
use mc_shared::config::{Environment, ServerConfig};

/// Max age for the preflight cache, in seconds
const PREFLIGHT_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance configured for the given environment.
pub fn create_cors(environment: Environment, server: &ServerConfig, refresh_header: &HeaderName) -> Cors {
    if environment.is_production() {
        create_production_cors(server, refresh_header)
    } else {
        create_development_cors(refresh_header)
    }
}

/// Permissive configuration for local testing
fn create_development_cors(refresh_header: &HeaderName) -> Cors {
    tracing::info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
            refresh_header.clone(),
        ])
        .expose_headers(vec![header::AUTHORIZATION, refresh_header.clone()])
        .max_age(PREFLIGHT_MAX_AGE)
}

/// Restrictive configuration; an empty origin list means same-origin only
fn create_production_cors(server: &ServerConfig, refresh_header: &HeaderName) -> Cors {
    tracing::info!("Configuring CORS for production environment");

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            refresh_header.clone(),
        ])
        .expose_headers(vec![header::AUTHORIZATION, refresh_header.clone()])
        .max_age(PREFLIGHT_MAX_AGE);

    for origin in server.allowed_origins.iter().map(|s| s.trim()) {
        if !origin.is_empty() {
            tracing::info!(origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    fn refresh() -> HeaderName {
        HeaderName::from_static("refresh")
    }

    #[actix_web::test]
    async fn test_development_cors_exposes_token_headers() {
        let cors = create_cors(Environment::Development, &ServerConfig::default(), &refresh());
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        let exposed = resp
            .headers()
            .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
            .unwrap()
            .to_str()
            .unwrap()
            .to_lowercase();
        assert!(exposed.contains("authorization"));
        assert!(exposed.contains("refresh"));
    }

    #[actix_web::test]
    async fn test_production_cors_allows_configured_origin() {
        let mut server = ServerConfig::default();
        server.allowed_origins = vec!["https://app.monthlycoffee.com".to_string()];
        let cors = create_cors(Environment::Production, &server, &refresh());
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.monthlycoffee.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.monthlycoffee.com"
        );
    }
}
