use auth::JwtError;
use auth::PasswordError;
use auth::PasswordPolicyError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, hyphen, and dot allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for first/last name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Weak password: {0}")]
    WeakPassword(#[from] PasswordPolicyError),

    #[error("{0}")]
    PasswordMismatch(String),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("User account is inactive")]
    InactiveUser,

    // Token errors
    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Token subject is not a valid user identifier")]
    InvalidSubject,

    #[error("Stored password digest is malformed")]
    MalformedDigest,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<PasswordError> for UserError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::MalformedDigest(_) => UserError::MalformedDigest,
            other => UserError::Unknown(other.to_string()),
        }
    }
}

impl From<JwtError> for UserError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => UserError::TokenExpired,
            JwtError::TokenInvalid(_) => UserError::TokenInvalid,
            other => UserError::Unknown(other.to_string()),
        }
    }
}
