//! JWT encoding and decoding for access and refresh tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use mc_shared::config::JwtConfig;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, DecodedToken, TokenKind};
use crate::errors::{CodecError, TokenError};

use super::config::TokenServiceConfig;
use super::key_ring::KeyRing;

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedToken {
    /// Compact JWT string
    pub token: String,
    /// The `jti` claim
    pub token_id: String,
    /// The `iat` claim
    pub issued_at: DateTime<Utc>,
    /// The `exp` claim
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies self-contained tokens
///
/// The codec has no store side effects; it only knows keys and claim policy.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: Arc<KeyRing>,
    issuer: String,
    audience: String,
    leeway_seconds: u64,
}

impl TokenCodec {
    /// Creates a codec over a key ring
    ///
    /// # Arguments
    ///
    /// * `keys` - Signing and verification keys
    /// * `config` - Issuer, audience and leeway
    pub fn new(keys: Arc<KeyRing>, config: &TokenServiceConfig) -> Self {
        Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            leeway_seconds: config.leeway_seconds,
        }
    }

    /// Builds the key ring and codec from JWT configuration
    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        let keys = KeyRing::from_config(config)?;
        Ok(Self::new(Arc::new(keys), &TokenServiceConfig::from(config)))
    }

    /// The key ring used by this codec
    pub fn keys(&self) -> &KeyRing {
        &self.keys
    }

    /// Signs a token with a fresh random id
    ///
    /// `ttl` may be zero or negative, which yields a token that is already expired.
    pub fn encode(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<EncodedToken, TokenError> {
        self.encode_with_id(subject, kind, &Uuid::new_v4().to_string(), ttl)
    }

    /// Signs a token whose `jti` is `token_id`
    ///
    /// # Returns
    ///
    /// * `Ok(EncodedToken)` - The signed token
    /// * `Err(TokenError::TokenGenerationFailed)` - Signing failed
    pub fn encode_with_id(
        &self,
        subject: &str,
        kind: TokenKind,
        token_id: &str,
        ttl: Duration,
    ) -> Result<EncodedToken, TokenError> {
        let claims = Claims::new(
            subject,
            kind,
            token_id,
            Utc::now(),
            ttl,
            self.issuer.as_str(),
            self.audience.as_str(),
        );

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.keys.active_key_id().to_string());

        let token = encode(&header, &claims, self.keys.encoding_key()).map_err(|e| {
            error!("Failed to sign {} token: {}", kind, e);
            TokenError::TokenGenerationFailed
        })?;

        Ok(EncodedToken {
            token,
            token_id: claims.jti.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        })
    }

    /// Verifies a token and returns its content
    ///
    /// # Returns
    ///
    /// * `Ok(DecodedToken)` - Signature valid and token not expired
    /// * `Err(CodecError::Expired)` - Signature valid but `exp` has passed
    /// * `Err(CodecError::InvalidSignature)` - Anything else
    pub fn decode(&self, token: &str) -> Result<DecodedToken, CodecError> {
        let decoded = self.decode_ignoring_expiry(token)?;
        if self.is_expired(&decoded, Utc::now()) {
            return Err(CodecError::Expired);
        }
        Ok(decoded)
    }

    /// Verifies the signature and claim policy but accepts expired tokens
    ///
    /// Only meant for operations where expiry does not matter, such as logout.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<DecodedToken, CodecError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Rejected token with unreadable header: {}", e);
            CodecError::InvalidSignature
        })?;

        let (key_id, key) = self
            .keys
            .decoding_key(header.kid.as_deref())
            .ok_or_else(|| {
                debug!("Rejected token signed with unknown key id {:?}", header.kid);
                CodecError::InvalidSignature
            })?;

        let data = decode::<Claims>(token, key, &self.validation()).map_err(|e| {
            debug!("Rejected token: {}", e);
            CodecError::InvalidSignature
        })?;

        Ok(DecodedToken::from_claims(data.claims, key_id.to_string()))
    }

    /// Verifies an access token
    ///
    /// Refresh tokens are rejected even when their signature is valid.
    pub fn verify_access(&self, token: &str) -> Result<DecodedToken, TokenError> {
        let decoded = self.decode(token)?;
        if decoded.kind != TokenKind::Access {
            return Err(TokenError::InvalidToken);
        }
        Ok(decoded)
    }

    fn is_expired(&self, token: &DecodedToken, now: DateTime<Utc>) -> bool {
        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        token.expires_at.timestamp().saturating_add(leeway) <= now.timestamp()
    }

    // Expiry is checked by `is_expired` so that a token expiring this very
    // second is already rejected.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;
        validation
    }
}
