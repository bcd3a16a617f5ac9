//! Issuance of a fresh access + refresh token pair

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshRecord, TokenKind, TokenPair};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::TokenStore;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;

/// Issues token pairs for members that were authenticated elsewhere
pub struct TokenIssuer<S: TokenStore> {
    codec: Arc<TokenCodec>,
    store: Arc<S>,
    config: TokenServiceConfig,
}

impl<S: TokenStore> TokenIssuer<S> {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<S>, config: TokenServiceConfig) -> Self {
        Self {
            codec,
            store,
            config,
        }
    }

    /// Issues an access token and a registered refresh token for `subject`
    ///
    /// Both tokens are signed before the refresh record is stored, so a signing
    /// failure leaves the store untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair
    /// * `Err(DomainError)` - Signing or storage failed
    pub async fn issue(&self, subject: &str) -> DomainResult<TokenPair> {
        let refresh_id = Uuid::new_v4().to_string();

        let refresh = self.codec.encode_with_id(
            subject,
            TokenKind::Refresh,
            &refresh_id,
            self.config.refresh_ttl(),
        )?;
        let access = self
            .codec
            .encode(subject, TokenKind::Access, self.config.access_ttl())?;

        self.store
            .register(RefreshRecord::new(
                refresh.token_id.as_str(),
                subject,
                refresh.issued_at,
                refresh.expires_at,
            ))
            .await
            .map_err(DomainError::from)?;

        info!(subject = %subject, token_id = %refresh_id, "Issued token pair");

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_in: self.config.access_token_expiry_seconds,
            refresh_expires_in: self.config.refresh_token_expiry_seconds,
        })
    }
}
