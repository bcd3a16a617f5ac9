//! Token entities for JWT-based access and refresh tokens.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which credential a token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential authorizing API calls
    Access,
    /// Longer-lived credential used only to obtain new access tokens
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (member ID)
    pub sub: String,

    /// Token kind; never changes after issuance
    pub kind: TokenKind,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID; for refresh tokens this is the key of the stored record
    pub jti: String,
}

impl Claims {
    /// Creates claims that expire `ttl` after `issued_at`
    ///
    /// `ttl` may be zero or negative, producing claims that are already expired.
    pub fn new(
        subject: impl Into<String>,
        kind: TokenKind,
        token_id: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            kind,
            iat,
            nbf: iat,
            exp: (issued_at + ttl).timestamp(),
            iss: issuer.into(),
            aud: audience.into(),
            jti: token_id.into(),
        }
    }

    /// Checks whether the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Issued-at as a timestamp
    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.iat)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.exp)
    }
}

fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The verified content of a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Member identifier the token was issued to
    pub subject: String,
    /// Access or refresh
    pub kind: TokenKind,
    /// Unique token identifier (`jti`)
    pub token_id: String,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
    /// Id of the key that verified the signature
    pub key_id: String,
}

impl DecodedToken {
    pub(crate) fn from_claims(claims: Claims, key_id: String) -> Self {
        let issued_at = claims.issued_at();
        let expires_at = claims.expires_at();
        Self {
            subject: claims.sub,
            kind: claims.kind,
            token_id: claims.jti,
            issued_at,
            expires_at,
            key_id,
        }
    }
}

/// Lifecycle state of a stored refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Usable for reissue
    Active,
    /// Superseded by a newer token through rotation
    Rotated,
    /// Explicitly invalidated
    Revoked,
    /// Past its expiry timestamp
    Expired,
}

/// Persisted refresh token record, keyed by token id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    /// Token identifier (`jti` of the refresh token)
    pub token_id: String,

    /// Member the token was issued to
    pub subject: String,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub revoked: bool,

    /// Token id that replaced this one through rotation
    pub superseded_by: Option<String>,
}

impl RefreshRecord {
    /// Creates an active record
    pub fn new(
        token_id: impl Into<String>,
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            subject: subject.into(),
            issued_at,
            expires_at,
            revoked: false,
            superseded_by: None,
        }
    }

    /// State of the record at `now`
    ///
    /// Revocation wins over rotation, rotation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshState {
        if self.revoked {
            RefreshState::Revoked
        } else if self.superseded_by.is_some() {
            RefreshState::Rotated
        } else if self.is_expired_at(now) {
            RefreshState::Expired
        } else {
            RefreshState::Active
        }
    }

    /// State of the record now
    pub fn state(&self) -> RefreshState {
        self.state_at(Utc::now())
    }

    /// Checks if the record has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Revokes the record
    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}

/// Token pair returned after a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

/// Result of a successful reissue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReissuedTokens {
    /// Freshly signed access token
    pub access_token: String,

    /// Rotated refresh token, or the presented one when rotation is off
    pub refresh_token: String,

    /// Whether `refresh_token` is a new token
    pub rotated: bool,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,
}
