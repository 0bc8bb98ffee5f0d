use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use uuid::Uuid;

use super::claims::Claims;
use super::claims::TokenKind;
use super::errors::JwtError;

/// Signing configuration for access and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    /// Settings with HS256, 30 minute access tokens and 7 day refresh tokens.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            algorithm: Algorithm::HS256,
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(7),
        }
    }

    /// Set the algorithm from its JOSE name (`HS256`, `HS384`, `HS512`).
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Unknown name
    pub fn with_algorithm_name(mut self, name: &str) -> Result<Self, JwtError> {
        self.algorithm =
            Algorithm::from_str(name).map_err(|_| JwtError::UnsupportedAlgorithm(name.to_string()))?;
        Ok(self)
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Encodes and decodes access and refresh tokens.
///
/// Each kind is signed with its own secret, so a leaked access secret cannot
/// mint refresh tokens and the other way round. Expiry is checked against the
/// `now` passed by the caller; the system clock is never read here.
pub struct TokenCodec {
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from validated settings.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not an HMAC algorithm
    /// * `InvalidConfiguration` - Empty or shared secrets, non-positive TTLs
    pub fn new(settings: TokenSettings) -> Result<Self, JwtError> {
        if !matches!(
            settings.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(JwtError::UnsupportedAlgorithm(format!(
                "{:?}",
                settings.algorithm
            )));
        }
        if settings.access_secret.is_empty() || settings.refresh_secret.is_empty() {
            return Err(JwtError::InvalidConfiguration(
                "token secrets must not be empty".to_string(),
            ));
        }
        if settings.access_secret == settings.refresh_secret {
            return Err(JwtError::InvalidConfiguration(
                "access and refresh secrets must differ".to_string(),
            ));
        }
        if settings.access_ttl <= Duration::zero() || settings.refresh_ttl <= Duration::zero() {
            return Err(JwtError::InvalidConfiguration(
                "token lifetimes must be positive".to_string(),
            ));
        }

        Ok(Self {
            access_keys: KeyPair::from_secret(settings.access_secret.as_bytes()),
            refresh_keys: KeyPair::from_secret(settings.refresh_secret.as_bytes()),
            algorithm: settings.algorithm,
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        })
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Build the claims a token of `kind` issued at `now` would carry.
    ///
    /// `iat` and `exp` are whole seconds: `now` is floored, so a token issued
    /// at `x.9s` expires at `x + ttl`.
    pub fn claims_for(&self, subject: &str, kind: TokenKind, now: DateTime<Utc>) -> Claims {
        let iat = now.timestamp();
        Claims {
            sub: subject.to_string(),
            kind,
            iat,
            exp: iat + self.ttl(kind).num_seconds(),
            jti: Uuid::new_v4().simple().to_string(),
        }
    }

    /// Sign `claims` with the secret of their kind.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.keys(claims.kind).encoding)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Issue a signed token of `kind` for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<String, JwtError> {
        self.encode(&self.claims_for(subject, kind, now))
    }

    /// Decode and validate a token of `expected_kind` at instant `now`.
    ///
    /// # Errors
    /// * `TokenInvalid` - Bad signature, malformed payload, subject that is
    ///   not a UUID, or a kind other than `expected_kind`
    /// * `TokenExpired` - `now` is at or past the token's expiry
    ///
    /// Expiry has one-second resolution. A token issued at `t` is accepted
    /// exactly while `now - t < ttl` when `t` is second-aligned. Otherwise it
    /// may be rejected up to one second early, never late.
    pub fn decode(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the caller's clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.keys(expected_kind).decoding, &validation)
            .map_err(|e| JwtError::TokenInvalid(e.to_string()))?
            .claims;

        if claims.kind != expected_kind {
            return Err(JwtError::TokenInvalid(format!(
                "expected {} token, got {}",
                expected_kind, claims.kind
            )));
        }

        if Uuid::parse_str(&claims.sub).is_err() {
            return Err(JwtError::TokenInvalid(
                "subject is not a valid identifier".to_string(),
            ));
        }

        if claims.is_expired(now) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
