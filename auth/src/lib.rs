//! Credential primitives for the account service.
//!
//! - Password hashing (Argon2id, configurable cost) and strength policy
//! - Access/refresh JWT issuance and validation with per-kind secrets
//! - Injectable clock
//! - Authentication coordination
//!
//! The service defines its own ports and adapts these implementations, so the
//! domain never depends on a particular hashing or signing scheme.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashCost::with_cost_factor(8)).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{TokenCodec, TokenKind, TokenSettings};
//! use chrono::Utc;
//!
//! let codec = TokenCodec::new(TokenSettings::new("access-secret", "refresh-secret")).unwrap();
//! let subject = "2f1c3c9e-6a8e-4c55-9a4a-1f8f5b1c2d3e";
//! let now = Utc::now();
//! let token = codec.issue(subject, TokenKind::Access, now).unwrap();
//! let claims = codec.decode(&token, TokenKind::Access, now).unwrap();
//! assert_eq!(claims.subject(), subject);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, HashCost, PasswordHasher, TokenCodec, TokenKind, TokenSettings};
//! use chrono::Utc;
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::new(HashCost::with_cost_factor(8)).unwrap(),
//!     TokenCodec::new(TokenSettings::new("access-secret", "refresh-secret")).unwrap(),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("Secret123!").unwrap();
//!
//! // Login: verify and mint tokens
//! let subject = "2f1c3c9e-6a8e-4c55-9a4a-1f8f5b1c2d3e";
//! let now = Utc::now();
//! let pair = auth.authenticate("Secret123!", &hash, subject, now).unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&pair.access_token, TokenKind::Access, now).unwrap();
//! assert_eq!(claims.subject(), subject);
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use jwt::TokenKind;
pub use jwt::TokenSettings;
pub use password::validate_strength;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicyError;
