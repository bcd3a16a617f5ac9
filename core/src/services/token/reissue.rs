//! Refresh token validation, access token reissue and rotation
//!
//! A presented refresh token passes through these checks in order:
//! signature and kind, store lookup, record state, then (with rotation on)
//! an atomic swap for a new refresh token. A token that was already rotated
//! is treated as stolen: its whole lineage is revoked.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::token::{DecodedToken, RefreshRecord, RefreshState, ReissuedTokens, TokenKind};
use crate::errors::{DomainError, DomainResult, StoreError, TokenError};
use crate::repositories::TokenStore;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;

/// Exchanges refresh tokens for new access tokens
pub struct ReissueService<S: TokenStore> {
    codec: Arc<TokenCodec>,
    store: Arc<S>,
    config: TokenServiceConfig,
}

impl<S: TokenStore> ReissueService<S> {
    /// Creates a new reissue service
    ///
    /// # Arguments
    ///
    /// * `codec` - Codec shared with the issuer and the HTTP middleware
    /// * `store` - Refresh record store
    /// * `config` - Lifetimes and rotation policy
    pub fn new(codec: Arc<TokenCodec>, store: Arc<S>, config: TokenServiceConfig) -> Self {
        Self {
            codec,
            store,
            config,
        }
    }

    /// The store backing this service
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Whether reissue replaces the refresh token
    pub fn rotates_refresh_tokens(&self) -> bool {
        self.config.rotate_refresh_tokens
    }

    /// Validates a refresh token and issues a new access token
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Encoded refresh token presented by the client
    ///
    /// # Returns
    ///
    /// * `Ok(ReissuedTokens)` - New access token and the refresh token to keep
    /// * `Err(DomainError::Token)` - The refresh token cannot be used
    /// * `Err(DomainError::Store | Internal)` - Server-side failure
    ///
    /// When the same token is submitted twice at once, the losing request
    /// revokes the whole lineage, including the winner's new refresh token.
    pub async fn reissue(&self, refresh_token: &str) -> DomainResult<ReissuedTokens> {
        let decoded = self.decode_refresh(refresh_token)?;
        let record = self.load_record(&decoded).await?;

        // The record expiry tolerates the same clock skew as the codec
        let now = Utc::now();
        let checked_at = self
            .config
            .leeway()
            .and_then(|leeway| now.checked_sub_signed(leeway))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        match record.state_at(checked_at) {
            RefreshState::Active => {}
            RefreshState::Revoked => {
                warn!(
                    subject = %record.subject,
                    token_id = %record.token_id,
                    "Revoked refresh token presented"
                );
                return Err(TokenError::TokenRevoked.into());
            }
            RefreshState::Rotated => {
                return Err(self.handle_reuse(&record).await);
            }
            RefreshState::Expired => {
                debug!(token_id = %record.token_id, "Expired refresh record presented");
                return Err(TokenError::TokenExpired.into());
            }
        }

        let access = self.codec.encode(
            &record.subject,
            TokenKind::Access,
            self.config.access_ttl(),
        )?;

        if !self.config.rotate_refresh_tokens {
            info!(subject = %record.subject, token_id = %record.token_id, "Reissued access token");
            return Ok(ReissuedTokens {
                access_token: access.token,
                refresh_token: refresh_token.to_string(),
                rotated: false,
                access_expires_in: self.config.access_token_expiry_seconds,
            });
        }

        let next = self.codec.encode_with_id(
            &record.subject,
            TokenKind::Refresh,
            &Uuid::new_v4().to_string(),
            self.config.refresh_ttl(),
        )?;
        let next_record = RefreshRecord::new(
            next.token_id.as_str(),
            record.subject.as_str(),
            next.issued_at,
            next.expires_at,
        );

        match self.store.rotate(&record.token_id, next_record).await {
            Ok(()) => {}
            Err(StoreError::AlreadyRotated { .. }) => {
                return Err(self.handle_reuse(&record).await);
            }
            Err(StoreError::Revoked { token_id }) => {
                warn!(
                    subject = %record.subject,
                    token_id = %token_id,
                    "Refresh token revoked during rotation"
                );
                return Err(TokenError::TokenRevoked.into());
            }
            Err(StoreError::NotFound { .. }) => {
                return Err(TokenError::UnknownToken.into());
            }
            Err(StoreError::DuplicateToken { token_id }) => {
                error!(
                    old_token_id = %record.token_id,
                    new_token_id = %token_id,
                    "Generated refresh token id already exists"
                );
                return Err(DomainError::internal("refresh token id collision"));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            subject = %record.subject,
            old_token_id = %record.token_id,
            new_token_id = %next.token_id,
            "Rotated refresh token"
        );

        Ok(ReissuedTokens {
            access_token: access.token,
            refresh_token: next.token,
            rotated: true,
            access_expires_in: self.config.access_token_expiry_seconds,
        })
    }

    /// Revokes the lineage of a refresh token, used on logout
    ///
    /// Expired tokens are accepted so a member can always log out; forged
    /// tokens are not. A token whose record was already purged is a no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records newly revoked
    /// * `Err(DomainError::Token(TokenError::InvalidToken))` - Forged or not a refresh token
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<usize> {
        let decoded = self
            .codec
            .decode_ignoring_expiry(refresh_token)
            .map_err(TokenError::from)?;
        if decoded.kind != TokenKind::Refresh {
            return Err(TokenError::InvalidToken.into());
        }

        let record = match self.store.lookup(&decoded.token_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        if record.subject != decoded.subject {
            return Err(TokenError::InvalidToken.into());
        }

        let revoked = self.store.revoke_lineage(&record.token_id).await?;
        info!(
            subject = %record.subject,
            token_id = %record.token_id,
            revoked,
            "Refresh token lineage revoked on logout"
        );
        Ok(revoked)
    }

    fn decode_refresh(&self, refresh_token: &str) -> Result<DecodedToken, TokenError> {
        let decoded = self.codec.decode(refresh_token)?;
        if decoded.kind != TokenKind::Refresh {
            debug!(token_id = %decoded.token_id, "Access token presented for reissue");
            return Err(TokenError::InvalidToken);
        }
        Ok(decoded)
    }

    async fn load_record(&self, decoded: &DecodedToken) -> DomainResult<RefreshRecord> {
        let record = match self.store.lookup(&decoded.token_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => {
                debug!(token_id = %decoded.token_id, "Refresh token not in store");
                return Err(TokenError::UnknownToken.into());
            }
            Err(err) => return Err(err.into()),
        };

        if record.subject != decoded.subject {
            warn!(
                token_id = %decoded.token_id,
                claimed_subject = %decoded.subject,
                "Refresh token subject does not match stored record"
            );
            return Err(TokenError::InvalidToken.into());
        }
        Ok(record)
    }

    /// Revokes the lineage of a reused token and returns the error to report
    async fn handle_reuse(&self, record: &RefreshRecord) -> DomainError {
        match self.store.revoke_lineage(&record.token_id).await {
            Ok(revoked) => {
                warn!(
                    subject = %record.subject,
                    token_id = %record.token_id,
                    revoked,
                    "Refresh token reuse detected, lineage revoked"
                );
                TokenError::TokenReuseDetected.into()
            }
            Err(err) => {
                error!(
                    subject = %record.subject,
                    token_id = %record.token_id,
                    "Failed to revoke lineage after reuse: {}",
                    err
                );
                err.into()
            }
        }
    }
}
