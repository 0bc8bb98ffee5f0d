use async_trait::async_trait;
use auth::Claims;
use auth::TokenKind;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Errors
    /// * `PasswordMismatch` / `WeakPassword` - Password rejected
    /// * `DuplicateUsername` - Username is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Log in with a username or email and a password.
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown identifier or wrong password (indistinguishable)
    /// * `MalformedDigest` - Stored digest unreadable
    /// * `InactiveUser` - Correct password for a deactivated account
    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, UserError>;

    /// Exchange a refresh token for a new token pair, revoking the old one.
    ///
    /// # Errors
    /// * `TokenExpired` / `TokenInvalid` / `TokenRevoked` - Token unusable
    /// * `InvalidSubject` - Subject is not a user identifier
    /// * `InactiveUser` - Account deactivated since issuance
    async fn refresh(&self, refresh_token: &str) -> Result<AuthenticatedSession, UserError>;

    /// Resolve an access token to the user it was issued for.
    ///
    /// # Errors
    /// * `TokenExpired` / `TokenInvalid` / `TokenRevoked` - Token unusable
    /// * `InvalidSubject` - Subject is not a user identifier
    /// * `InactiveUser` - Account deactivated
    async fn authorize(&self, access_token: &str) -> Result<Principal, UserError>;

    /// Revoke the principal's access token and, if given, a refresh token.
    ///
    /// # Errors
    /// * `TokenInvalid` - Refresh token belongs to another user
    async fn logout(
        &self,
        principal: &Principal,
        refresh_token: Option<&str>,
    ) -> Result<(), UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Look a user up by username, or by email when the username does not match.
    async fn find_by_username_or_email(&self, identifier: &str)
        -> Result<Option<User>, UserError>;

    /// Update profile fields. Always refreshes `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DuplicateUsername` / `DuplicateEmail` - New value already taken
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    /// * `BadCredentials` - Current password wrong
    /// * `PasswordMismatch` / `WeakPassword` - New password rejected
    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user. The row either exists with every field set or not at all.
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user whose username equals `identifier` or whose email equals
    /// its lowercase form.
    async fn find_by_username_or_email(&self, identifier: &str)
        -> Result<Option<User>, UserError>;

    /// Write only the profile fields present in `command` and bump `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DuplicateUsername` / `DuplicateEmail` - New value already taken
    async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
        now: DateTime<Utc>,
    ) -> Result<User, UserError>;

    /// Replace the stored digest and bump `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<User, UserError>;

    /// Set `last_login` to the bumped `updated_at`. No other column changes.
    ///
    /// `updated_at` becomes `max(now, updated_at + 1µs)` against the stored
    /// value, so concurrent writers never move it backwards.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn record_login(&self, id: &UserId, now: DateTime<Utc>) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Denylist of token ids that must no longer be accepted before they expire.
#[async_trait]
pub trait TokenRevocationStore: Send + Sync + 'static {
    /// Add a token id. Revoking an id twice is not an error.
    async fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) -> Result<(), UserError>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool, UserError>;

    /// Drop entries whose token would be rejected as expired anyway.
    ///
    /// # Returns
    /// Number of entries removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, UserError>;
}

/// Password hashing and token minting strategy used by the service.
pub trait CredentialAuthority: Send + Sync + 'static {
    fn hash_password(&self, password: &str) -> Result<String, UserError>;

    /// # Errors
    /// * `MalformedDigest` - Stored digest unreadable
    fn verify_password(&self, password: &str, digest: &str) -> Result<bool, UserError>;

    fn issue_tokens(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<TokenPair, UserError>;

    /// # Errors
    /// * `TokenExpired` / `TokenInvalid`
    fn decode_token(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, UserError>;
}
