//! Token cleanup service for periodic removal of expired refresh records
//!
//! Expired records are kept for a grace period after expiry so that reuse of
//! an old token in a rotated lineage can still be recognized.

use chrono::{DateTime, Duration, Utc};
use mc_shared::config::CleanupConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenStore;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Grace period after expiry before deletion (in days)
    pub grace_period_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self::from(&CleanupConfig::default())
    }
}

impl From<&CleanupConfig> for TokenCleanupConfig {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            grace_period_days: config.grace_period_days,
            enabled: config.enabled,
        }
    }
}

/// Service for cleaning up expired refresh records
pub struct TokenCleanupService<S: TokenStore + 'static> {
    store: Arc<S>,
    config: TokenCleanupConfig,
}

impl<S: TokenStore> TokenCleanupService<S> {
    /// Create a new token cleanup service
    pub fn new(store: Arc<S>, config: TokenCleanupConfig) -> Self {
        Self { store, config }
    }

    /// Records expiring before this instant are eligible for deletion
    ///
    /// A negative grace period counts as zero, so live records are never
    /// eligible. A grace period too large to represent keeps everything.
    pub fn cutoff_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(self.config.grace_period_days.max(0))
            .and_then(|grace| now.checked_sub_signed(grace))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of cleanup operations
    /// * `Err(DomainError)` - If cleanup fails
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting token cleanup cycle");

        let cutoff = self.cutoff_at(Utc::now());
        let mut result = CleanupResult {
            cutoff: Some(cutoff),
            ..CleanupResult::default()
        };

        match self.store.purge_expired(cutoff).await {
            Ok(count) => {
                result.expired_records_deleted = count;
                info!("Deleted {} expired refresh records", count);
            }
            Err(e) => {
                error!("Failed to cleanup expired refresh records: {}", e);
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Token cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh records deleted
    pub expired_records_deleted: usize,
    /// Expiry cutoff used, `None` when cleanup is disabled
    pub cutoff: Option<DateTime<Utc>>,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
