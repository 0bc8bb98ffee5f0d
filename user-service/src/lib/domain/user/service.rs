use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::Clock;
use auth::TokenKind;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::CredentialAuthority;
use crate::user::ports::TokenRevocationStore;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Parse a decoded token subject into a user identifier.
///
/// Runs before any lookup so a malformed subject never reaches storage.
///
/// # Errors
/// * `InvalidSubject` - Subject is not a UUID
pub fn verify_identifier(subject: &str) -> Result<UserId, UserError> {
    UserId::from_string(subject).map_err(|_| UserError::InvalidSubject)
}

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, TR, CA>
where
    UR: UserRepository,
    TR: TokenRevocationStore,
    CA: CredentialAuthority,
{
    repository: Arc<UR>,
    revocations: Arc<TR>,
    credentials: Arc<CA>,
    clock: Arc<dyn Clock>,
}

impl<UR, TR, CA> UserService<UR, TR, CA>
where
    UR: UserRepository,
    TR: TokenRevocationStore,
    CA: CredentialAuthority,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `revocations` - Revoked token id storage
    /// * `credentials` - Password hashing and token minting
    /// * `clock` - Time source for token expiry and timestamps
    pub fn new(
        repository: Arc<UR>,
        revocations: Arc<TR>,
        credentials: Arc<CA>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            revocations,
            credentials,
            clock,
        }
    }

    async fn load(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    /// Decode a token, reject revoked ids and resolve its subject to an active user.
    async fn resolve_token(&self, token: &str, kind: TokenKind) -> Result<(Claims, User), UserError> {
        let claims = self
            .credentials
            .decode_token(token, kind, self.clock.now())?;

        if self.revocations.is_revoked(claims.token_id()).await? {
            tracing::info!(kind = %kind, "Rejected revoked token");
            return Err(UserError::TokenRevoked);
        }

        let user_id = verify_identifier(claims.subject())?;
        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(UserError::TokenInvalid)?;

        if !user.is_active {
            return Err(UserError::InactiveUser);
        }

        Ok((claims, user))
    }
}

#[async_trait]
impl<UR, TR, CA> UserServicePort for UserService<UR, TR, CA>
where
    UR: UserRepository,
    TR: TokenRevocationStore,
    CA: CredentialAuthority,
{
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError> {
        command.validate_password()?;

        let password_hash = self.credentials.hash_password(&command.password)?;

        let user = User::register(
            command.first_name,
            command.last_name,
            command.username,
            command.email,
            password_hash,
            self.clock.now(),
        );

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, UserError> {
        let Some(user) = self.repository.find_by_username_or_email(identifier).await? else {
            tracing::info!("Login rejected: unknown identifier");
            return Err(UserError::BadCredentials);
        };

        if !self
            .credentials
            .verify_password(password, &user.password_hash)?
        {
            tracing::info!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(UserError::BadCredentials);
        }

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login rejected: inactive account");
            return Err(UserError::InactiveUser);
        }

        let now = self.clock.now();
        let tokens = self.credentials.issue_tokens(&user.id, now)?;

        let user = self.repository.record_login(&user.id, now).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthenticatedSession { tokens, user })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthenticatedSession, UserError> {
        let (claims, user) = self.resolve_token(refresh_token, TokenKind::Refresh).await?;

        // Rotation: a refresh token is good for exactly one exchange.
        self.revocations
            .revoke(claims.token_id(), claims.expires_at())
            .await?;

        let tokens = self.credentials.issue_tokens(&user.id, self.clock.now())?;

        tracing::info!(user_id = %user.id, "Tokens refreshed");

        Ok(AuthenticatedSession { tokens, user })
    }

    async fn authorize(&self, access_token: &str) -> Result<Principal, UserError> {
        let (claims, user) = self.resolve_token(access_token, TokenKind::Access).await?;

        Ok(Principal {
            user,
            token_id: claims.jti.clone(),
            token_expires_at: claims.expires_at(),
        })
    }

    async fn logout(
        &self,
        principal: &Principal,
        refresh_token: Option<&str>,
    ) -> Result<(), UserError> {
        let now = self.clock.now();

        self.revocations
            .revoke(&principal.token_id, principal.token_expires_at)
            .await?;

        if let Some(token) = refresh_token {
            match self
                .credentials
                .decode_token(token, TokenKind::Refresh, now)
            {
                Ok(claims) => {
                    if verify_identifier(claims.subject())? != principal.user.id {
                        return Err(UserError::TokenInvalid);
                    }
                    self.revocations
                        .revoke(claims.token_id(), claims.expires_at())
                        .await?;
                }
                // Already unusable
                Err(UserError::TokenExpired) => {}
                Err(e) => return Err(e),
            }
        }

        let purged = self.revocations.purge_expired(now).await?;

        tracing::info!(user_id = %principal.user.id, purged, "User logged out");

        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.load(id).await
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        self.repository.find_by_username_or_email(identifier).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let updated_user = self
            .repository
            .update_profile(id, command, self.clock.now())
            .await?;

        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<User, UserError> {
        command.validate()?;

        let user = self.load(id).await?;

        if !self
            .credentials
            .verify_password(&command.current_password, &user.password_hash)?
        {
            return Err(UserError::BadCredentials);
        }

        let password_hash = self.credentials.hash_password(&command.new_password)?;

        let updated_user = self
            .repository
            .update_password(&user.id, &password_hash, self.clock.now())
            .await?;

        tracing::info!(user_id = %updated_user.id, "Password changed");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}
