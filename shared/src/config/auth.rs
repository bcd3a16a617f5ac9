//! Authentication configuration: token signing, lifetimes and cleanup

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing and refresh token policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for the active HS256 signing key
    pub secret: String,

    /// Key id written to the token header; derived from the secret when unset
    #[serde(default)]
    pub key_id: Option<String>,

    /// Previous signing keys that are still accepted for verification
    #[serde(default)]
    pub retired_keys: Vec<RetiredKey>,

    /// Access token expiry time in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Tolerance for clock skew when checking expiry, in seconds
    #[serde(default)]
    pub leeway_seconds: u64,

    /// Replace the refresh token on every reissue
    #[serde(default = "default_rotate_refresh_tokens")]
    pub rotate_refresh_tokens: bool,

    /// Request/response header carrying the refresh token
    #[serde(default = "default_refresh_header")]
    pub refresh_header: String,
}

/// A signing key that is no longer used to sign but still verifies
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetiredKey {
    /// Key id as written in the token header
    pub key_id: String,

    /// HS256 secret
    pub secret: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            key_id: None,
            retired_keys: Vec::new(),
            access_token_expiry: default_access_token_expiry(),
            refresh_token_expiry: default_refresh_token_expiry(),
            issuer: default_issuer(),
            audience: default_audience(),
            leeway_seconds: 0,
            rotate_refresh_tokens: default_rotate_refresh_tokens(),
            refresh_header: default_refresh_header(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set the key id of the active signing key
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Add a retired key that remains valid for verification
    pub fn with_retired_key(mut self, key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.retired_keys.push(RetiredKey {
            key_id: key_id.into(),
            secret: secret.into(),
        });
        self
    }

    /// Enable or disable refresh token rotation
    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotate_refresh_tokens = enabled;
        self
    }

    /// Tolerate `seconds` of clock skew when checking expiry
    pub fn with_leeway_seconds(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }

    /// Validate secrets, lifetimes and header name
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("JWT secret must not be empty".to_string());
        }
        if self.retired_keys.iter().any(|k| k.key_id.is_empty() || k.secret.is_empty()) {
            return Err("retired keys need both a key id and a secret".to_string());
        }
        if self.access_token_expiry <= 0 {
            return Err("access token expiry must be positive".to_string());
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err("refresh token expiry must exceed access token expiry".to_string());
        }
        if self.refresh_header.trim().is_empty() {
            return Err("refresh header name must not be empty".to_string());
        }
        Ok(())
    }
}

/// Background purge of expired refresh records
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Whether to run the cleanup task
    #[serde(default = "default_cleanup_enabled")]
    pub enabled: bool,

    /// How often to run cleanup, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub interval_seconds: u64,

    /// Days an expired record is kept for reuse detection before deletion
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: i64,
}

impl CleanupConfig {
    /// Longest grace period accepted, ten years
    pub const MAX_GRACE_PERIOD_DAYS: i64 = 3650;

    /// Validate the interval and grace period
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.interval_seconds == 0 {
            return Err("cleanup interval must be greater than zero".to_string());
        }
        if !(0..=Self::MAX_GRACE_PERIOD_DAYS).contains(&self.grace_period_days) {
            return Err(format!(
                "cleanup grace period must be between 0 and {} days",
                Self::MAX_GRACE_PERIOD_DAYS
            ));
        }
        Ok(())
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_cleanup_enabled(),
            interval_seconds: default_cleanup_interval(),
            grace_period_days: default_grace_period_days(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Refresh record cleanup
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

fn default_access_token_expiry() -> i64 {
    1800 // 30 minutes
}

fn default_refresh_token_expiry() -> i64 {
    1_209_600 // 14 days
}

fn default_issuer() -> String {
    String::from("monthly-coffee")
}

fn default_audience() -> String {
    String::from("monthly-coffee-api")
}

fn default_rotate_refresh_tokens() -> bool {
    true
}

fn default_refresh_header() -> String {
    String::from("Refresh")
}

fn default_cleanup_enabled() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    3600
}

fn default_grace_period_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1_209_600);
        assert_eq!(config.refresh_header, "Refresh");
        assert!(config.rotate_refresh_tokens);
        assert_eq!(config.leeway_seconds, 0);
        assert!(config.is_using_default_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(10)
            .with_refresh_expiry_days(30)
            .with_key_id("2024-10")
            .with_retired_key("2024-01", "old-secret")
            .with_rotation(false)
            .with_leeway_seconds(60);

        assert_eq!(config.access_token_expiry, 600);
        assert_eq!(config.leeway_seconds, 60);
        assert_eq!(config.refresh_token_expiry, 2_592_000);
        assert_eq!(config.key_id.as_deref(), Some("2024-10"));
        assert_eq!(config.retired_keys.len(), 1);
        assert!(!config.rotate_refresh_tokens);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_validation() {
        assert!(JwtConfig::new("").validate().is_err());
        assert!(JwtConfig::new("s").with_access_expiry_minutes(0).validate().is_err());

        let mut inverted = JwtConfig::new("s");
        inverted.refresh_token_expiry = inverted.access_token_expiry;
        assert!(inverted.validate().is_err());

        assert!(JwtConfig::new("s").with_retired_key("", "x").validate().is_err());
    }

    #[test]
    fn test_auth_config_deserializes_with_defaults() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"jwt": {"secret": "from-file"}}"#).unwrap();
        assert_eq!(config.jwt.secret, "from-file");
        assert_eq!(config.jwt.issuer, "monthly-coffee");
        assert!(config.cleanup.enabled);
        assert_eq!(config.cleanup.grace_period_days, 7);
    }
}
