mod codec_tests;

use std::sync::Arc;

use mc_shared::config::JwtConfig;

use crate::repositories::InMemoryTokenStore;
use crate::services::token::{
    KeyRing, ReissueService, TokenCodec, TokenIssuer, TokenServiceConfig,
};

pub(super) const TEST_SECRET: &str = "test-secret-for-token-service";

/// Codec, issuer and reissue service sharing one in-memory store
pub(super) struct Fixture {
    pub codec: Arc<TokenCodec>,
    pub store: Arc<InMemoryTokenStore>,
    pub issuer: TokenIssuer<InMemoryTokenStore>,
    pub reissue: ReissueService<InMemoryTokenStore>,
}

pub(super) fn fixture_with(config: TokenServiceConfig) -> Fixture {
    let keys = KeyRing::new(None, TEST_SECRET).unwrap();
    let codec = Arc::new(TokenCodec::new(Arc::new(keys), &config));
    let store = Arc::new(InMemoryTokenStore::new());
    Fixture {
        issuer: TokenIssuer::new(Arc::clone(&codec), Arc::clone(&store), config.clone()),
        reissue: ReissueService::new(Arc::clone(&codec), Arc::clone(&store), config),
        codec,
        store,
    }
}

pub(super) fn fixture() -> Fixture {
    fixture_with(TokenServiceConfig::from(&JwtConfig::new(TEST_SECRET)))
}
