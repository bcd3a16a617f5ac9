use actix_web::{web, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use mc_api::app::create_app;
use mc_api::config::{load_config, warn_on_insecure_defaults};
use mc_api::routes::auth::AppState;
use mc_core::services::{
    ReissueService, TokenCleanupConfig, TokenCleanupService, TokenCodec, TokenServiceConfig,
};
use mc_infra::{DatabasePool, MySqlTokenStore};
use mc_shared::config::{LogFormat, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.logging);

    tracing::info!(environment = %config.environment, "Starting Monthly Coffee API server");
    warn_on_insecure_defaults(&config);

    let database = DatabasePool::new(config.database.clone()).await?;
    if config.database.run_migrations {
        database.run_migrations().await?;
    }
    tracing::info!("{}", database.get_statistics());

    let store = Arc::new(MySqlTokenStore::new(database.get_pool().clone()));
    let codec = Arc::new(TokenCodec::from_config(&config.auth.jwt)?);
    tracing::info!(key_id = codec.keys().active_key_id(), "Token signing key loaded");

    let reissue_service = Arc::new(ReissueService::new(
        Arc::clone(&codec),
        Arc::clone(&store),
        TokenServiceConfig::from(&config.auth.jwt),
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        Arc::clone(&store),
        TokenCleanupConfig::from(&config.auth.cleanup),
    ));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState::new(
        reissue_service,
        codec,
        &config.auth.jwt.refresh_header,
    )?);

    let bind_address = config.server.bind_address();
    let environment = config.environment;
    let server_config = config.server.clone();
    tracing::info!(%bind_address, "Server will bind");

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), environment, &server_config)
    })
    .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    if let Some(handle) = cleanup_task {
        handle.abort();
    }
    database.close().await;
    Ok(())
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.source_location)
        .with_line_number(logging.source_location);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
