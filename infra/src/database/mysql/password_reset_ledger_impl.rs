//! MySQL implementation of the PasswordResetLedger trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use cg_core::domain::entities::password_reset::PasswordResetToken;
use cg_core::errors::DomainError;
use cg_core::repositories::PasswordResetLedger;

use super::{column_error, parse_uuid, query_error};

/// MySQL implementation of PasswordResetLedger
pub struct MySqlPasswordResetLedger {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlPasswordResetLedger {
    /// Create a new MySQL password reset ledger
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<PasswordResetToken, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| column_error("user_id", e))?;

        Ok(PasswordResetToken {
            id: parse_uuid("id", &id)?,
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
            used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("used_at")
                .map_err(|e| column_error("used_at", e))?,
        })
    }
}

#[async_trait]
impl PasswordResetLedger for MySqlPasswordResetLedger {
    async fn insert(&self, token: PasswordResetToken) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO password_reset_tokens (
                id, user_id, token_hash, created_at, expires_at, used_at
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.used_at)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to insert password reset token", e))?;

        Ok(())
    }

    async fn find_usable(
        &self,
        token_hash: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token_hash, created_at, expires_at, used_at
            FROM password_reset_tokens
            WHERE token_hash = ? AND user_id = ? AND used_at IS NULL AND expires_at > ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(token_hash)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find password reset token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = ? WHERE id = ? AND used_at IS NULL",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to consume password reset token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn invalidate_for_user(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = ? WHERE user_id = ? AND used_at IS NULL",
        )
        .bind(at)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to invalidate password reset tokens", e))?;

        Ok(result.rows_affected() as usize)
    }
}
