//! HS256 key ring for JWT signing and verification
//!
//! One active key signs every new token. Retired keys only verify, so tokens
//! issued before a key rollover stay valid until they expire.

use jsonwebtoken::{DecodingKey, EncodingKey};
use mc_shared::config::JwtConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::errors::TokenError;

/// Number of hex characters in a derived key id
const DERIVED_KEY_ID_LEN: usize = 16;

/// Active signing key plus retired verification keys, addressed by key id
#[derive(Clone)]
pub struct KeyRing {
    active_key_id: String,
    encoding_key: EncodingKey,
    active_decoding_key: DecodingKey,
    retired: HashMap<String, DecodingKey>,
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut retired: Vec<&String> = self.retired.keys().collect();
        retired.sort();
        f.debug_struct("KeyRing")
            .field("active_key_id", &self.active_key_id)
            .field("retired_key_ids", &retired)
            .finish()
    }
}

impl KeyRing {
    /// Creates a key ring with a single active key
    ///
    /// # Arguments
    ///
    /// * `key_id` - Id written to the token header; derived from the secret when `None`
    /// * `secret` - HS256 secret
    ///
    /// # Returns
    ///
    /// * `Ok(KeyRing)` - Key ring ready for signing
    /// * `Err(TokenError::KeyLoadError)` - The secret or key id is empty
    pub fn new(key_id: Option<&str>, secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::KeyLoadError {
                message: "signing secret is empty".to_string(),
            });
        }
        let active_key_id = match key_id {
            Some(id) if id.trim().is_empty() => {
                return Err(TokenError::KeyLoadError {
                    message: "key id is empty".to_string(),
                })
            }
            Some(id) => id.to_string(),
            None => Self::derive_key_id(secret),
        };

        Ok(Self {
            active_key_id,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            active_decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            retired: HashMap::new(),
        })
    }

    /// Adds a key that verifies but no longer signs
    pub fn with_retired_key(mut self, key_id: &str, secret: &str) -> Result<Self, TokenError> {
        if key_id.is_empty() || secret.is_empty() {
            return Err(TokenError::KeyLoadError {
                message: "retired key needs a key id and a secret".to_string(),
            });
        }
        if key_id == self.active_key_id || self.retired.contains_key(key_id) {
            return Err(TokenError::KeyLoadError {
                message: format!("duplicate key id {key_id}"),
            });
        }
        self.retired
            .insert(key_id.to_string(), DecodingKey::from_secret(secret.as_bytes()));
        Ok(self)
    }

    /// Builds the key ring from JWT configuration
    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        let mut ring = Self::new(config.key_id.as_deref(), &config.secret)?;
        for retired in &config.retired_keys {
            ring = ring.with_retired_key(&retired.key_id, &retired.secret)?;
        }
        Ok(ring)
    }

    /// Default key id for a secret: the first 16 hex characters of its SHA-256
    pub fn derive_key_id(secret: &str) -> String {
        let digest = hex::encode(Sha256::digest(secret.as_bytes()));
        digest[..DERIVED_KEY_ID_LEN].to_string()
    }

    /// Id of the key used for signing
    pub fn active_key_id(&self) -> &str {
        &self.active_key_id
    }

    /// Whether tokens carrying `key_id` can be verified
    pub fn accepts(&self, key_id: &str) -> bool {
        key_id == self.active_key_id || self.retired.contains_key(key_id)
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Finds the verification key for a token header's `kid`
    ///
    /// Tokens without a key id are checked against the active key.
    pub(crate) fn decoding_key(&self, key_id: Option<&str>) -> Option<(&str, &DecodingKey)> {
        match key_id {
            None => Some((self.active_key_id.as_str(), &self.active_decoding_key)),
            Some(id) if id == self.active_key_id => {
                Some((self.active_key_id.as_str(), &self.active_decoding_key))
            }
            Some(id) => self
                .retired
                .get_key_value(id)
                .map(|(id, key)| (id.as_str(), key)),
        }
    }
}
