use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::UserError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered account. `password_hash` is a PHC digest and is
/// never serialized into any response type.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build a freshly registered, active, unverified account.
    pub fn register(
        first_name: PersonName,
        last_name: PersonName,
        username: Username,
        email: EmailAddress,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            id: UserId::new(),
            first_name,
            last_name,
            username,
            email,
            password_hash,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// Mark the entity as mutated.
    ///
    /// `updated_at` strictly increases on every call. If the clock has not
    /// moved past the previous value, it is bumped by one microsecond, the
    /// resolution of the stored timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let now = now.trunc_subsecs(6);
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// Record a successful login at `now`.
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.touch(now);
        self.last_login = Some(self.updated_at);
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// 3-50 characters; alphanumeric, underscore, hyphen, and dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 50 characters
    /// * `InvalidCharacters` - Contains characters other than alphanumerics, `_`, `-` and `.`
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser and stored lowercase, so uniqueness and
/// lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, lowercased email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// First or last name, 1-50 characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 50;

    /// # Errors
    /// * `Empty` - Nothing left after trimming
    /// * `TooLong` - Longer than 50 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
    pub confirm_password: String,
}

impl CreateUserCommand {
    /// Check the plaintext password against the strength policy and its confirmation.
    ///
    /// # Errors
    /// * `PasswordMismatch` - Confirmation differs
    /// * `WeakPassword` - Strength rule violated
    pub fn validate_password(&self) -> Result<(), UserError> {
        if self.password != self.confirm_password {
            return Err(UserError::PasswordMismatch(
                "Passwords do not match".to_string(),
            ));
        }
        auth::validate_strength(&self.password)?;
        Ok(())
    }
}

/// Command to update profile fields.
///
/// All fields are optional to support partial updates. An empty command is
/// still a mutation and refreshes `updated_at`.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
}

impl UpdateUserCommand {
    /// Apply the present fields to `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
    }
}

/// Command to replace a user's password.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl ChangePasswordCommand {
    /// # Errors
    /// * `PasswordMismatch` - Confirmation differs, or new equals current
    /// * `WeakPassword` - Strength rule violated
    pub fn validate(&self) -> Result<(), UserError> {
        if self.new_password != self.confirm_new_password {
            return Err(UserError::PasswordMismatch(
                "New password and confirmation do not match".to_string(),
            ));
        }
        if self.current_password == self.new_password {
            return Err(UserError::PasswordMismatch(
                "New password must be different from current password".to_string(),
            ));
        }
        auth::validate_strength(&self.new_password)?;
        Ok(())
    }
}

/// Outcome of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub tokens: TokenPair,
    pub user: User,
}

/// User resolved from a valid access token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub token_id: String,
    pub token_expires_at: DateTime<Utc>,
}
