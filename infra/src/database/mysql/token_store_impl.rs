//! MySQL implementation of the TokenStore trait.
//!
//! Records live in the `refresh_tokens` table. Rotation runs in a single
//! transaction whose conditional update decides which concurrent caller wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use mc_core::domain::entities::token::RefreshRecord;
use mc_core::errors::StoreError;
use mc_core::repositories::TokenStore;

/// MySQL implementation of TokenStore
pub struct MySqlTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenStore {
    /// Create a new MySQL token store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshRecord
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshRecord, StoreError> {
        Ok(RefreshRecord {
            token_id: row.try_get("token_id").map_err(backend("token_id"))?,
            subject: row.try_get("subject").map_err(backend("subject"))?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(backend("issued_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(backend("expires_at"))?,
            revoked: row.try_get("revoked").map_err(backend("revoked"))?,
            superseded_by: row
                .try_get("superseded_by")
                .map_err(backend("superseded_by"))?,
        })
    }

    fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}

/// Wraps a SQLx error into a backend store error, naming the failed step
fn backend(context: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| {
        tracing::error!("Refresh token store failure ({}): {}", context, e);
        StoreError::Backend {
            message: format!("{}: {}", context, e),
        }
    }
}

const INSERT_RECORD: &str = r#"
    INSERT INTO refresh_tokens (
        token_id, subject, issued_at, expires_at, revoked, superseded_by
    ) VALUES (?, ?, ?, ?, ?, ?)
"#;

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn register(&self, record: RefreshRecord) -> Result<(), StoreError> {
        let result = sqlx::query(INSERT_RECORD)
            .bind(&record.token_id)
            .bind(&record.subject)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .bind(record.revoked)
            .bind(&record.superseded_by)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if Self::is_unique_violation(&e) => Err(StoreError::DuplicateToken {
                token_id: record.token_id,
            }),
            Err(e) => Err(backend("register")(e)),
        }
    }

    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError> {
        let query = r#"
            SELECT token_id, subject, issued_at, expires_at, revoked, superseded_by
            FROM refresh_tokens
            WHERE token_id = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend("lookup"))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(StoreError::NotFound {
                token_id: token_id.to_string(),
            }),
        }
    }

    async fn rotate(&self, old_id: &str, new_record: RefreshRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend("rotate begin"))?;

        // Row lock on the old record; a concurrent rotation waits here and
        // then matches zero rows.
        let updated = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET superseded_by = ?
            WHERE token_id = ? AND superseded_by IS NULL AND revoked = FALSE
            "#,
        )
        .bind(&new_record.token_id)
        .bind(old_id)
        .execute(&mut *tx)
        .await
        .map_err(backend("rotate update"))?;

        if updated.rows_affected() == 0 {
            let state = sqlx::query("SELECT revoked FROM refresh_tokens WHERE token_id = ?")
                .bind(old_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend("rotate state"))?;
            tx.rollback().await.map_err(backend("rotate rollback"))?;

            let token_id = old_id.to_string();
            return Err(match state {
                None => StoreError::NotFound { token_id },
                Some(row) => {
                    let revoked: bool = row.try_get("revoked").map_err(backend("revoked"))?;
                    if revoked {
                        StoreError::Revoked { token_id }
                    } else {
                        StoreError::AlreadyRotated { token_id }
                    }
                }
            });
        }

        let inserted = sqlx::query(INSERT_RECORD)
            .bind(&new_record.token_id)
            .bind(&new_record.subject)
            .bind(new_record.issued_at)
            .bind(new_record.expires_at)
            .bind(new_record.revoked)
            .bind(&new_record.superseded_by)
            .execute(&mut *tx)
            .await;

        if let Err(e) = inserted {
            tx.rollback().await.map_err(backend("rotate rollback"))?;
            return Err(if Self::is_unique_violation(&e) {
                StoreError::DuplicateToken {
                    token_id: new_record.token_id,
                }
            } else {
                backend("rotate insert")(e)
            });
        }

        tx.commit().await.map_err(backend("rotate commit"))?;
        Ok(())
    }

    async fn revoke(&self, token_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token_id = ? AND revoked = FALSE
            "#,
        )
        .bind(token_id)
        .execute(&self.pool)
        .await
        .map_err(backend("revoke"))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Nothing changed: either already revoked or missing
        self.lookup(token_id).await.map(|_| false)
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE subject = ? AND revoked = FALSE
            "#,
        )
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(backend("revoke_subject"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(backend("purge_expired"))?;

        Ok(result.rows_affected() as usize)
    }
}
