//! Authentication route handlers
//!
//! This module contains the token endpoints:
//! - Access token reissue from a refresh token
//! - Logout (refresh token lineage revocation)
//! - Current member lookup for a valid access token

pub mod logout;
pub mod me;
pub mod reissue;

use actix_web::http::header::{HeaderName, InvalidHeaderName};
use actix_web::HttpRequest;
use std::sync::Arc;

use mc_core::repositories::TokenStore;
use mc_core::services::{ReissueService, TokenCodec};

/// Shared state of the token endpoints
pub struct AppState<S: TokenStore> {
    /// Reissue and logout logic
    pub reissue_service: Arc<ReissueService<S>>,
    /// Codec used by the access token middleware
    pub codec: Arc<TokenCodec>,
    /// Header carrying the refresh token in requests and responses
    pub refresh_header: HeaderName,
}

impl<S: TokenStore> AppState<S> {
    /// Create the state, parsing the configured refresh header name
    pub fn new(
        reissue_service: Arc<ReissueService<S>>,
        codec: Arc<TokenCodec>,
        refresh_header: &str,
    ) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            reissue_service,
            codec,
            refresh_header: HeaderName::from_bytes(refresh_header.trim().as_bytes())?,
        })
    }

    /// Refresh token presented with the request, if any
    ///
    /// An optional `Bearer ` prefix is accepted. Blank values count as missing.
    pub(crate) fn refresh_token(&self, req: &HttpRequest) -> Option<String> {
        let value = req.headers().get(&self.refresh_header)?.to_str().ok()?.trim();
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}
