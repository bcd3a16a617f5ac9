//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing and verifying access and refresh tokens (`TokenCodec`, `KeyRing`)
//! - Issuing token pairs (`TokenIssuer`)
//! - Reissue with refresh token rotation and reuse detection (`ReissueService`)
//! - Background cleanup of expired refresh records

mod cleanup;
mod codec;
mod config;
mod issuer;
mod key_ring;
mod reissue;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use codec::{EncodedToken, TokenCodec};
pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use key_ring::KeyRing;
pub use reissue::ReissueService;
