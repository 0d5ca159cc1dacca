//! MySQL implementation of the TokenLedger trait.
//!
//! Rows are keyed by the refresh token's `jti`; only the SHA-256 hash of the
//! signed token is stored. Revocation is a conditional update so concurrent
//! rotations of the same token have exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use cg_core::domain::entities::token::{RefreshTokenRecord, RevocationReason, TokenStatistics};
use cg_core::errors::DomainError;
use cg_core::repositories::TokenLedger;

use super::{column_error, is_unique_violation, parse_uuid, query_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, token_hash, created_at, expires_at, last_used_at,
           is_revoked, revoked_at, revoked_reason
    FROM refresh_tokens
"#;

/// MySQL implementation of TokenLedger
pub struct MySqlTokenLedger {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenLedger {
    /// Create a new MySQL token ledger
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let user_id: String = row.try_get("user_id").map_err(|e| column_error("user_id", e))?;
        let revoked_reason: Option<String> = row
            .try_get("revoked_reason")
            .map_err(|e| column_error("revoked_reason", e))?;

        Ok(RefreshTokenRecord {
            id: row.try_get("id").map_err(|e| column_error("id", e))?,
            user_id: parse_uuid("user_id", &user_id)?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| column_error("token_hash", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column_error("expires_at", e))?,
            last_used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_used_at")
                .map_err(|e| column_error("last_used_at", e))?,
            is_revoked: row
                .try_get("is_revoked")
                .map_err(|e| column_error("is_revoked", e))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| column_error("revoked_at", e))?,
            revoked_reason: revoked_reason
                .map(|reason| reason.parse::<RevocationReason>())
                .transpose()
                .map_err(|e| column_error("revoked_reason", e))?,
        })
    }
}

#[async_trait]
impl TokenLedger for MySqlTokenLedger {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, created_at, expires_at, last_used_at,
                is_revoked, revoked_at, revoked_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&record.id)
            .bind(record.user_id.to_string())
            .bind(&record.token_hash)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.last_used_at)
            .bind(record.is_revoked)
            .bind(record.revoked_at)
            .bind(record.revoked_reason.map(|r| r.as_str()))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            // A retried insert of the same jti is a no-op
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(token_id = %record.id, "Refresh token already recorded");
                Ok(())
            }
            Err(e) => Err(query_error("Failed to insert refresh token", e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find refresh token", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn mark_revoked(
        &self,
        id: &str,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revoked_reason = ?
            WHERE id = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(at)
            .bind(reason.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_used(&self, id: &str, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE refresh_tokens SET last_used_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to update last_used_at", e))?;

        Ok(())
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_revoked = FALSE ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("Failed to list refresh tokens", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn mark_all_revoked_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revoked_reason = ?
            WHERE user_id = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(at)
            .bind(reason.as_str())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to revoke user refresh tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<TokenStatistics, DomainError> {
        let query = r#"
            SELECT
                COUNT(*) AS total,
                CAST(COALESCE(SUM(CASE WHEN is_revoked = FALSE AND expires_at > ? THEN 1 ELSE 0 END), 0) AS SIGNED) AS active,
                CAST(COALESCE(SUM(CASE WHEN is_revoked = TRUE THEN 1 ELSE 0 END), 0) AS SIGNED) AS revoked,
                CAST(COALESCE(SUM(CASE WHEN is_revoked = FALSE AND expires_at <= ? THEN 1 ELSE 0 END), 0) AS SIGNED) AS expired
            FROM refresh_tokens
        "#;

        let row = sqlx::query(query)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("Failed to compute token statistics", e))?;

        let count = |column: &str| -> Result<u64, DomainError> {
            let value: i64 = row.try_get(column).map_err(|e| column_error(column, e))?;
            Ok(value.max(0) as u64)
        };

        Ok(TokenStatistics {
            total: count("total")?,
            active: count("active")?,
            revoked: count("revoked")?,
            expired: count("expired")?,
        })
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to delete expired refresh tokens", e))?;

        let deleted = result.rows_affected() as usize;
        tracing::info!(deleted, cutoff = %before, "Deleted expired refresh tokens");

        Ok(deleted)
    }
}
