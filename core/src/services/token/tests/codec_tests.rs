//! Unit tests for token encoding, verification and key rotation

use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;

use mc_shared::config::JwtConfig;

use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::{CodecError, TokenError};
use crate::services::token::{KeyRing, TokenCodec, TokenServiceConfig};

use super::TEST_SECRET;

fn codec() -> TokenCodec {
    TokenCodec::from_config(&JwtConfig::new(TEST_SECRET)).unwrap()
}

#[test]
fn test_encode_decode_round_trip() {
    let codec = codec();
    let encoded = codec
        .encode("member-42", TokenKind::Refresh, Duration::days(14))
        .unwrap();

    let decoded = codec.decode(&encoded.token).unwrap();
    assert_eq!(decoded.subject, "member-42");
    assert_eq!(decoded.kind, TokenKind::Refresh);
    assert_eq!(decoded.token_id, encoded.token_id);
    assert_eq!(decoded.expires_at, encoded.expires_at);
    assert_eq!(decoded.key_id, codec.keys().active_key_id());
}

#[test]
fn test_encode_with_id_keeps_id() {
    let codec = codec();
    let encoded = codec
        .encode_with_id("member-42", TokenKind::Access, "fixed-id", Duration::minutes(30))
        .unwrap();
    assert_eq!(encoded.token_id, "fixed-id");
    assert_eq!(codec.decode(&encoded.token).unwrap().token_id, "fixed-id");
}

#[test]
fn test_encode_generates_unique_ids() {
    let codec = codec();
    let a = codec.encode("m", TokenKind::Access, Duration::minutes(1)).unwrap();
    let b = codec.encode("m", TokenKind::Access, Duration::minutes(1)).unwrap();
    assert_ne!(a.token_id, b.token_id);
}

#[test]
fn test_tampered_token_is_rejected() {
    let codec = codec();
    let encoded = codec
        .encode("member-42", TokenKind::Refresh, Duration::days(1))
        .unwrap();

    // Flip one character in every segment in turn
    let segments: Vec<&str> = encoded.token.split('.').collect();
    for index in 0..segments.len() {
        let mut parts: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        let mut chars: Vec<char> = parts[index].chars().collect();
        let middle = chars.len() / 2;
        chars[middle] = if chars[middle] == 'A' { 'B' } else { 'A' };
        parts[index] = chars.into_iter().collect();
        let tampered = parts.join(".");

        assert_eq!(
            codec.decode(&tampered),
            Err(CodecError::InvalidSignature),
            "segment {index} tampering not detected"
        );
    }
}

#[test]
fn test_garbage_is_rejected() {
    let codec = codec();
    assert_eq!(codec.decode(""), Err(CodecError::InvalidSignature));
    assert_eq!(codec.decode("not-a-jwt"), Err(CodecError::InvalidSignature));
    assert_eq!(codec.decode("a.b.c"), Err(CodecError::InvalidSignature));
}

#[test]
fn test_zero_ttl_is_expired() {
    let codec = codec();
    let encoded = codec
        .encode("member-42", TokenKind::Refresh, Duration::zero())
        .unwrap();
    assert_eq!(codec.decode(&encoded.token), Err(CodecError::Expired));
}

#[test]
fn test_negative_ttl_is_expired_but_signature_still_valid() {
    let codec = codec();
    let encoded = codec
        .encode("member-42", TokenKind::Refresh, Duration::minutes(-5))
        .unwrap();
    assert_eq!(codec.decode(&encoded.token), Err(CodecError::Expired));
    assert!(codec.decode_ignoring_expiry(&encoded.token).is_ok());
}

#[test]
fn test_leeway_extends_validity() {
    let mut config = TokenServiceConfig::from(&JwtConfig::new(TEST_SECRET));
    config.leeway_seconds = 60;
    let keys = Arc::new(KeyRing::new(None, TEST_SECRET).unwrap());
    let codec = TokenCodec::new(keys, &config);

    let encoded = codec
        .encode("member-42", TokenKind::Access, Duration::seconds(-10))
        .unwrap();
    assert!(codec.decode(&encoded.token).is_ok());
}

#[test]
fn test_wrong_secret_is_rejected() {
    let codec = codec();
    let other = TokenCodec::from_config(&JwtConfig::new("another-secret").with_key_id(
        codec.keys().active_key_id(),
    ))
    .unwrap();

    let encoded = other
        .encode("member-42", TokenKind::Access, Duration::minutes(5))
        .unwrap();
    assert_eq!(codec.decode(&encoded.token), Err(CodecError::InvalidSignature));
}

#[test]
fn test_wrong_audience_is_rejected() {
    let codec = codec();
    let mut jwt = JwtConfig::new(TEST_SECRET);
    jwt.audience = "some-other-api".to_string();
    let foreign = TokenCodec::from_config(&jwt).unwrap();

    let encoded = foreign
        .encode("member-42", TokenKind::Access, Duration::minutes(5))
        .unwrap();
    assert_eq!(codec.decode(&encoded.token), Err(CodecError::InvalidSignature));
}

#[test]
fn test_verify_access_rejects_refresh_tokens() {
    let codec = codec();
    let access = codec
        .encode("member-42", TokenKind::Access, Duration::minutes(5))
        .unwrap();
    let refresh = codec
        .encode("member-42", TokenKind::Refresh, Duration::days(1))
        .unwrap();

    assert_eq!(codec.verify_access(&access.token).unwrap().subject, "member-42");
    assert_eq!(codec.verify_access(&refresh.token), Err(TokenError::InvalidToken));
}

#[test]
fn test_retired_key_still_verifies() {
    let old = TokenCodec::from_config(&JwtConfig::new("old-secret").with_key_id("2024-01")).unwrap();
    let legacy_token = old
        .encode("member-42", TokenKind::Refresh, Duration::days(1))
        .unwrap();

    let rotated = TokenCodec::from_config(
        &JwtConfig::new("new-secret")
            .with_key_id("2024-10")
            .with_retired_key("2024-01", "old-secret"),
    )
    .unwrap();

    let decoded = rotated.decode(&legacy_token.token).unwrap();
    assert_eq!(decoded.key_id, "2024-01");

    // New tokens are signed with the active key
    let fresh = rotated
        .encode("member-42", TokenKind::Access, Duration::minutes(5))
        .unwrap();
    assert_eq!(rotated.decode(&fresh.token).unwrap().key_id, "2024-10");
    assert_eq!(old.decode(&fresh.token), Err(CodecError::InvalidSignature));
}

#[test]
fn test_unknown_key_id_is_rejected() {
    let codec = codec();
    let stranger = TokenCodec::from_config(&JwtConfig::new(TEST_SECRET).with_key_id("unknown"))
        .unwrap();
    let encoded = stranger
        .encode("member-42", TokenKind::Access, Duration::minutes(5))
        .unwrap();

    // Same secret, but the ring does not know the key id
    assert_eq!(codec.decode(&encoded.token), Err(CodecError::InvalidSignature));
}

#[test]
fn test_token_without_key_id_uses_active_key() {
    let codec = codec();
    let claims = Claims::new(
        "member-42",
        TokenKind::Access,
        "no-kid",
        chrono::Utc::now(),
        Duration::minutes(5),
        "monthly-coffee",
        "monthly-coffee-api",
    );
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let decoded = codec.decode(&token).unwrap();
    assert_eq!(decoded.token_id, "no-kid");
    assert_eq!(decoded.key_id, codec.keys().active_key_id());
}

#[test]
fn test_other_algorithm_is_rejected() {
    let codec = codec();
    let claims = Claims::new(
        "member-42",
        TokenKind::Access,
        "hs512",
        chrono::Utc::now(),
        Duration::minutes(5),
        "monthly-coffee",
        "monthly-coffee-api",
    );
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(codec.decode(&token), Err(CodecError::InvalidSignature));
}

#[test]
fn test_key_ring_derived_key_id() {
    let ring = KeyRing::new(None, TEST_SECRET).unwrap();
    let id = ring.active_key_id();
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(id, KeyRing::derive_key_id(TEST_SECRET));
    assert_ne!(id, KeyRing::derive_key_id("something-else"));
}

#[test]
fn test_key_ring_rejects_bad_keys() {
    assert!(matches!(
        KeyRing::new(None, ""),
        Err(TokenError::KeyLoadError { .. })
    ));
    assert!(matches!(
        KeyRing::new(Some(" "), "secret"),
        Err(TokenError::KeyLoadError { .. })
    ));

    let ring = KeyRing::new(Some("k1"), "secret").unwrap();
    assert!(matches!(
        ring.clone().with_retired_key("k1", "other"),
        Err(TokenError::KeyLoadError { .. })
    ));
    assert!(matches!(
        ring.with_retired_key("k0", ""),
        Err(TokenError::KeyLoadError { .. })
    ));
}

#[test]
fn test_key_ring_debug_hides_secrets() {
    let ring = KeyRing::new(Some("k1"), "super-secret-value")
        .unwrap()
        .with_retired_key("k0", "older-secret-value")
        .unwrap();
    let debug = format!("{ring:?}");
    assert!(debug.contains("k1"));
    assert!(debug.contains("k0"));
    assert!(!debug.contains("secret-value"));
    assert!(ring.accepts("k0"));
    assert!(!ring.accepts("k2"));
}
