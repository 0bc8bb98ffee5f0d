use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::user::ports::TokenRevocationStore;
use crate::user::errors::UserError;

/// Token id denylist backed by the `revoked_tokens` table.
pub struct PostgresTokenRevocationStore {
    pool: PgPool,
}

impl PostgresTokenRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRevocationStore for PostgresTokenRevocationStore {
    async fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) -> Result<(), UserError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token_id, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token_id) DO NOTHING
            "#,
        )
        .bind(token_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, UserError> {
        let revoked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token_id = $1)
            "#,
        )
        .bind(token_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM revoked_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
