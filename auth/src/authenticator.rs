use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenKind;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Credential coordinator combining password verification and token issuance.
///
/// Knows nothing about where users are stored: callers look the account up
/// and hand over the stored digest and the subject to put in the tokens.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Access and refresh token minted together on login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator from its two building blocks.
    pub fn new(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        Self {
            password_hasher,
            token_codec,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// # Errors
    /// * `MalformedDigest` - Stored digest cannot be parsed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token pair for `subject`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored digest is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.verify_password(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_tokens(subject, now)?)
    }

    /// Issue an access and a refresh token for `subject` at `now`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_tokens(&self, subject: &str, now: DateTime<Utc>) -> Result<TokenPair, JwtError> {
        let access = self.token_codec.claims_for(subject, TokenKind::Access, now);
        let refresh = self.token_codec.claims_for(subject, TokenKind::Refresh, now);

        Ok(TokenPair {
            access_token: self.token_codec.encode(&access)?,
            refresh_token: self.token_codec.encode(&refresh)?,
            token_type: "bearer".to_string(),
            expires_at: access.expires_at(),
        })
    }

    /// Validate a token of the expected kind and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` / `TokenInvalid` - See [`TokenCodec::decode`]
    pub fn validate_token(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, JwtError> {
        self.token_codec.decode(token, expected_kind, now)
    }
}
