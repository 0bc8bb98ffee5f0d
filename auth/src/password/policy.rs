use super::errors::PasswordPolicyError;

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Check a candidate password against the strength rules.
///
/// Applied wherever a new password is accepted. Rules are checked in a fixed
/// order and the first violation is reported.
///
/// # Errors
/// * `TooShort` / `TooLong` - Length outside 8..=128 characters
/// * `MissingUppercase`, `MissingLowercase`, `MissingDigit`, `MissingSpecial`
pub fn validate_strength(password: &str) -> Result<(), PasswordPolicyError> {
    let length = password.chars().count();
    if length < MIN_LENGTH {
        return Err(PasswordPolicyError::TooShort { min: MIN_LENGTH });
    }
    if length > MAX_LENGTH {
        return Err(PasswordPolicyError::TooLong { max: MAX_LENGTH });
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PasswordPolicyError::MissingSpecial);
    }
    Ok(())
}
