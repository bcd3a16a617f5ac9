//! In-process implementation of TokenStore
//!
//! All records live in one map behind a `tokio::sync::RwLock`; every mutating
//! operation holds the write guard for its whole duration, which is what makes
//! `rotate` atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::RefreshRecord;
use crate::errors::StoreError;

use super::r#trait::{TokenStore, MAX_LINEAGE_DEPTH};

/// Token store backed by a shared in-memory map
///
/// Cloning yields a handle to the same records.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    records: Arc<RwLock<HashMap<String, RefreshRecord>>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, in any state
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn register(&self, record: RefreshRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.token_id) {
            return Err(StoreError::DuplicateToken {
                token_id: record.token_id,
            });
        }

        records.insert(record.token_id.clone(), record);
        Ok(())
    }

    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError> {
        let records = self.records.read().await;
        records
            .get(token_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                token_id: token_id.to_string(),
            })
    }

    async fn rotate(&self, old_id: &str, new_record: RefreshRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(&new_record.token_id) {
            return Err(StoreError::DuplicateToken {
                token_id: new_record.token_id,
            });
        }

        let old = records
            .get_mut(old_id)
            .ok_or_else(|| StoreError::NotFound {
                token_id: old_id.to_string(),
            })?;

        if old.revoked {
            return Err(StoreError::Revoked {
                token_id: old_id.to_string(),
            });
        }
        if old.superseded_by.is_some() {
            return Err(StoreError::AlreadyRotated {
                token_id: old_id.to_string(),
            });
        }

        old.superseded_by = Some(new_record.token_id.clone());
        records.insert(new_record.token_id.clone(), new_record);
        Ok(())
    }

    async fn revoke(&self, token_id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;

        let record = records
            .get_mut(token_id)
            .ok_or_else(|| StoreError::NotFound {
                token_id: token_id.to_string(),
            })?;

        if record.revoked {
            return Ok(false);
        }
        record.revoke();
        Ok(true)
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut() {
            if record.subject == subject && !record.revoked {
                record.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        records.retain(|_, record| record.expires_at >= cutoff);

        Ok(initial_count - records.len())
    }

    // Walks the chain under one guard so a concurrent rotation cannot slip in
    // between links.
    async fn revoke_lineage(&self, token_id: &str) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;

        if !records.contains_key(token_id) {
            return Err(StoreError::NotFound {
                token_id: token_id.to_string(),
            });
        }

        let mut revoked = 0;
        let mut next = Some(token_id.to_string());
        let mut steps = 0;

        while let Some(id) = next.take() {
            let Some(record) = records.get_mut(&id) else {
                break;
            };
            if !record.revoked {
                record.revoke();
                revoked += 1;
            }
            steps += 1;
            if steps >= MAX_LINEAGE_DEPTH {
                break;
            }
            next = record.superseded_by.clone();
        }

        Ok(revoked)
    }
}
