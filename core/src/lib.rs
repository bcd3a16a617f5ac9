//! # Monthly Coffee Core
//!
//! Core token logic for the Monthly Coffee backend.
//! This crate contains the token entities, the token services, the refresh
//! token store interface with an in-memory implementation, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, DecodedToken, RefreshRecord, RefreshState, ReissuedTokens, TokenKind, TokenPair,
};
pub use errors::{CodecError, DomainError, DomainResult, StoreError, TokenError};
pub use repositories::{InMemoryTokenStore, TokenStore};
pub use services::{
    CleanupResult, EncodedToken, KeyRing, ReissueService, TokenCleanupConfig,
    TokenCleanupService, TokenCodec, TokenIssuer, TokenServiceConfig,
};
