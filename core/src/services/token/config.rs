//! Configuration for the token services

use chrono::Duration;
use mc_shared::config::JwtConfig;

/// Lifetimes and claim policy shared by the codec, issuer and reissue service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry_seconds: i64,
    /// Value of the `iss` claim
    pub issuer: String,
    /// Value of the `aud` claim
    pub audience: String,
    /// Clock skew tolerated when checking expiry
    pub leeway_seconds: u64,
    /// Whether reissue also replaces the refresh token
    pub rotate_refresh_tokens: bool,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            access_token_expiry_seconds: jwt.access_token_expiry,
            refresh_token_expiry_seconds: jwt.refresh_token_expiry,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            leeway_seconds: jwt.leeway_seconds,
            rotate_refresh_tokens: jwt.rotate_refresh_tokens,
        }
    }
}

impl TokenServiceConfig {
    /// Access token lifetime
    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_expiry_seconds)
    }

    /// Refresh token lifetime
    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_expiry_seconds)
    }

    /// Clock skew tolerance, `None` when it does not fit a `Duration`
    pub fn leeway(&self) -> Option<Duration> {
        i64::try_from(self.leeway_seconds)
            .ok()
            .and_then(Duration::try_seconds)
    }

    /// Disable or enable refresh token rotation
    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotate_refresh_tokens = enabled;
        self
    }
}
