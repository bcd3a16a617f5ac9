//! Token store trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshRecord;
use crate::errors::StoreError;

/// Upper bound on lineage length walked by [`TokenStore::revoke_lineage`]
pub const MAX_LINEAGE_DEPTH: usize = 10_000;

/// Store owning refresh token records, keyed by token id
///
/// Implementations must make [`TokenStore::rotate`] atomic: when several
/// callers rotate the same record concurrently exactly one succeeds.
///
/// # Security Considerations
/// - Rotated and revoked records are kept until cleanup so that reuse can be detected
/// - Revocation is final; no operation clears the revoked flag
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a new record
    ///
    /// # Arguments
    /// * `record` - The record to persist
    ///
    /// # Returns
    /// * `Ok(())` - Record stored
    /// * `Err(StoreError::DuplicateToken)` - A record with the same id exists
    async fn register(&self, record: RefreshRecord) -> Result<(), StoreError>;

    /// Find a record by token id
    ///
    /// # Returns
    /// * `Ok(RefreshRecord)` - Record found
    /// * `Err(StoreError::NotFound)` - No record with this id
    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError>;

    /// Atomically supersede `old_id` with `new_record`
    ///
    /// Marks the old record as superseded by the new id and inserts the new
    /// record in one step. Nothing changes when an error is returned.
    ///
    /// # Returns
    /// * `Ok(())` - Rotation applied
    /// * `Err(StoreError::NotFound)` - `old_id` does not exist
    /// * `Err(StoreError::Revoked)` - `old_id` is revoked
    /// * `Err(StoreError::AlreadyRotated)` - `old_id` was superseded already
    /// * `Err(StoreError::DuplicateToken)` - the new id is taken
    async fn rotate(&self, old_id: &str, new_record: RefreshRecord) -> Result<(), StoreError>;

    /// Revoke a single record
    ///
    /// # Returns
    /// * `Ok(true)` - Record was active or rotated and is now revoked
    /// * `Ok(false)` - Record was already revoked
    /// * `Err(StoreError::NotFound)` - No record with this id
    async fn revoke(&self, token_id: &str) -> Result<bool, StoreError>;

    /// Revoke every record of a member
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records whose flag changed
    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError>;

    /// Delete records whose expiry lies before `cutoff`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Revoke `token_id` and every record that descends from it through rotation
    ///
    /// Each record is revoked before its successor link is read, so a rotation
    /// racing with the walk fails on the revoked record instead of escaping it.
    /// Missing links end the walk; records already revoked are still followed.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records whose flag changed
    /// * `Err(StoreError::NotFound)` - `token_id` itself does not exist
    async fn revoke_lineage(&self, token_id: &str) -> Result<usize, StoreError> {
        let mut revoked = 0;
        let mut current = token_id.to_string();

        for depth in 0..MAX_LINEAGE_DEPTH {
            match self.revoke(&current).await {
                Ok(true) => revoked += 1,
                Ok(false) => {}
                Err(StoreError::NotFound { .. }) if depth > 0 => break,
                Err(err) => return Err(err),
            }
            let next = match self.lookup(&current).await {
                Ok(record) => record.superseded_by,
                Err(StoreError::NotFound { .. }) => None,
                Err(err) => return Err(err),
            };
            match next {
                Some(id) => current = id,
                None => break,
            }
        }

        Ok(revoked)
    }
}
