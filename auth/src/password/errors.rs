use thiserror::Error;

/// Error type for password hashing operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password digest is malformed: {0}")]
    MalformedDigest(String),

    #[error("Hash cost factor {actual} outside supported range {min}..={max}")]
    InvalidCostFactor { min: u32, max: u32, actual: u32 },
}

/// Rule violated by a candidate password.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters long")]
    TooShort { min: usize },

    #[error("Password must be at most {max} characters long")]
    TooLong { max: usize },

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one digit")]
    MissingDigit,

    #[error("Password must contain at least one special character")]
    MissingSpecial,
}
