use auth::Authenticator;
use auth::Claims;
use auth::TokenKind;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialAuthority;
use crate::user::errors::UserError;

impl CredentialAuthority for Authenticator {
    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        Ok(Authenticator::hash_password(self, password)?)
    }

    fn verify_password(&self, password: &str, digest: &str) -> Result<bool, UserError> {
        Ok(Authenticator::verify_password(self, password, digest)?)
    }

    fn issue_tokens(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<TokenPair, UserError> {
        Ok(Authenticator::issue_tokens(self, &user_id.to_string(), now)?)
    }

    fn decode_token(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, UserError> {
        self.validate_token(token, kind, now).map_err(|e| {
            tracing::debug!(kind = %kind, error = %e, "Token rejected");
            UserError::from(e)
        })
    }
}
