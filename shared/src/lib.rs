//! Shared utilities and common types for the Monthly Coffee server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error codes and the error response envelope
//! - Success response envelopes

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CleanupConfig, DatabaseConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, RetiredKey, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, MessageResponse};
