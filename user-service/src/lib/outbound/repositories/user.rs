use async_trait::async_trait;
use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, first_name, last_name, username, email, password_hash, \
                            is_active, is_verified, created_at, updated_at, last_login";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    password_hash: String,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            first_name: PersonName::new(row.first_name)?,
            last_name: PersonName::new(row.last_name)?,
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login: row.last_login,
        })
    }
}

/// Map a write failure, naming the unique constraint that was hit.
fn map_write_error(e: sqlx::Error, username: &str, email: &str) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return UserError::DuplicateUsername(username.to_string());
            }
            if db_err.constraint() == Some("users_email_key") {
                return UserError::DuplicateEmail(email.to_string());
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

/// `updated_at` after a write at `now`: never earlier than `now`, always past
/// the stored value.
const BUMP_UPDATED_AT: &str = "GREATEST($2, updated_at + interval '1 microsecond')";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, username, email, password_hash,
                               is_active, is_verified, created_at, updated_at, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.0)
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user.username.as_str(), user.email.as_str()))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        // A username match wins over an email match on another row.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE username = $1 OR email = $2 ORDER BY (username = $1) DESC LIMIT 1"
        ))
        .bind(identifier)
        .bind(identifier.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
        now: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let username = command.username.as_ref().map(Username::as_str);
        let email = command.email.as_ref().map(EmailAddress::as_str);

        // Absent fields keep the stored value.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                username = COALESCE($5, username),
                email = COALESCE($6, email),
                updated_at = {BUMP_UPDATED_AT}
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(now.trunc_subsecs(6))
        .bind(command.first_name.as_ref().map(PersonName::as_str))
        .bind(command.last_name.as_ref().map(PersonName::as_str))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, username.unwrap_or_default(), email.unwrap_or_default()))?;

        row.map(User::try_from)
            .transpose()?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET password_hash = $3, updated_at = {BUMP_UPDATED_AT}
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(now.trunc_subsecs(6))
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from)
            .transpose()?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn record_login(&self, id: &UserId, now: DateTime<Utc>) -> Result<User, UserError> {
        // Right-hand sides see the old row, so both columns get the same value.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET updated_at = {BUMP_UPDATED_AT}, last_login = {BUMP_UPDATED_AT}
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(now.trunc_subsecs(6))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from)
            .transpose()?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
