//! Configuration loading for the API binary
//!
//! Layers, later ones win:
//! 1. Built-in defaults for the environment selected by `ENVIRONMENT`
//! 2. Optional `config/{environment}.toml`
//! 3. Environment variables prefixed with `MC_`, nested keys separated by
//!    `__` (e.g. `MC_AUTH__JWT__SECRET`, `MC_SERVER__PORT`)

use config::{Config, ConfigError, File};
use mc_shared::config::{AppConfig, Environment};
use thiserror::Error;

/// Failures while building the application configuration
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load and validate the configuration for the environment named by `ENVIRONMENT`
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    load_config_for(Environment::from_env())
}

/// Load and validate the configuration for an explicit environment
pub fn load_config_for(environment: Environment) -> Result<AppConfig, ConfigLoadError> {
    let defaults = AppConfig::for_environment(environment);

    let settings = Config::builder()
        .add_source(Config::try_from(&defaults)?)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(
            config::Environment::with_prefix("MC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins"),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate().map_err(ConfigLoadError::Invalid)?;
    Ok(app_config)
}

/// Log warnings for settings that are acceptable but unsafe outside development
pub fn warn_on_insecure_defaults(config: &AppConfig) {
    if config.auth.jwt.is_using_default_secret() && !config.environment.is_development() {
        tracing::warn!(
            environment = %config.environment,
            "Using the default JWT secret; set MC_AUTH__JWT__SECRET"
        );
    }
    if config.auth.jwt.leeway_seconds > 300 {
        tracing::warn!(
            leeway_seconds = config.auth.jwt.leeway_seconds,
            "Large clock skew leeway accepts tokens long after they expire"
        );
    }
}
