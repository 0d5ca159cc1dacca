//! MySQL implementation of the CredentialStore trait.
//!
//! Reads the `users` table. The auth core only ever writes new rows
//! (registration) and replaces `password_hash` on password reset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use cg_core::domain::entities::credential::{CredentialRecord, Role};
use cg_core::errors::{AuthError, DomainError};
use cg_core::repositories::CredentialStore;

use super::{column_error, is_unique_violation, parse_uuid, query_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, username, email, password_hash, role, tenant_id, is_active,
           first_name, last_name, created_at, updated_at
    FROM users
"#;

/// MySQL implementation of CredentialStore
pub struct MySqlCredentialStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlCredentialStore {
    /// Create a new MySQL credential store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to CredentialRecord entity
    fn row_to_credential(row: &sqlx::mysql::MySqlRow) -> Result<CredentialRecord, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;
        let role: String = row.try_get("role").map_err(|e| column_error("role", e))?;
        let tenant_id: Option<String> = row
            .try_get("tenant_id")
            .map_err(|e| column_error("tenant_id", e))?;

        Ok(CredentialRecord {
            id: parse_uuid("id", &id)?,
            identifier: row
                .try_get("username")
                .map_err(|e| column_error("username", e))?,
            email: row.try_get("email").map_err(|e| column_error("email", e))?,
            secret_hash: row
                .try_get("password_hash")
                .map_err(|e| column_error("password_hash", e))?,
            role: role.parse::<Role>().map_err(|e| column_error("role", e))?,
            tenant_id: tenant_id
                .as_deref()
                .map(|value| parse_uuid("tenant_id", value))
                .transpose()?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| column_error("is_active", e))?,
            first_name: row
                .try_get("first_name")
                .map_err(|e| column_error("first_name", e))?,
            last_name: row
                .try_get("last_name")
                .map_err(|e| column_error("last_name", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column_error("updated_at", e))?,
        })
    }

    async fn find_one(&self, clause: &str, value: String) -> Result<Option<CredentialRecord>, DomainError> {
        let query = format!("{} WHERE {} LIMIT 1", SELECT_COLUMNS, clause);

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find user", e))?;

        row.as_ref().map(Self::row_to_credential).transpose()
    }
}

/// Name the column behind a duplicate-key error from its message
fn conflict_field(message: &str) -> &'static str {
    if message.to_lowercase().contains("email") {
        "email"
    } else {
        "identifier"
    }
}

#[async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<CredentialRecord>, DomainError> {
        self.find_one("username = ?", identifier.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DomainError> {
        self.find_one("LOWER(email) = ?", email.to_lowercase()).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, DomainError> {
        self.find_one("id = ?", id.to_string()).await
    }

    async fn update_secret_hash(&self, id: Uuid, secret_hash: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(secret_hash)
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to update password hash", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("user {}", id),
            });
        }

        Ok(())
    }

    async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, username, email, password_hash, role, tenant_id, is_active,
                first_name, last_name, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(record.id.to_string())
            .bind(&record.identifier)
            .bind(&record.email)
            .bind(&record.secret_hash)
            .bind(record.role.as_str())
            .bind(record.tenant_id.map(|id| id.to_string()))
            .bind(record.is_active)
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::info!(user_id = %record.id, role = record.role.as_str(), "User created");
                Ok(record)
            }
            Err(e) if is_unique_violation(&e) => Err(AuthError::Conflict {
                field: conflict_field(&e.to_string()).to_string(),
            }
            .into()),
            Err(e) => Err(query_error("Failed to create user", e)),
        }
    }
}
