use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Work parameters for the password hasher.
///
/// `cost_factor` is a base-2 exponent: the hasher spends `2^(cost_factor + 2)`
/// KiB of memory per hash, so raising it by one doubles the work. The default
/// of 12 is 16 MiB with three passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub cost_factor: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashCost {
    pub const MIN_COST_FACTOR: u32 = 4;
    pub const MAX_COST_FACTOR: u32 = 20;

    /// Cost with the given exponent and default iterations/parallelism.
    pub fn with_cost_factor(cost_factor: u32) -> Self {
        Self {
            cost_factor,
            ..Self::default()
        }
    }

    /// Memory per hash in KiB.
    pub fn memory_kib(&self) -> u32 {
        1 << (self.cost_factor + 2)
    }

    fn params(&self) -> Result<Params, PasswordError> {
        if !(Self::MIN_COST_FACTOR..=Self::MAX_COST_FACTOR).contains(&self.cost_factor) {
            return Err(PasswordError::InvalidCostFactor {
                min: Self::MIN_COST_FACTOR,
                max: Self::MAX_COST_FACTOR,
                actual: self.cost_factor,
            });
        }

        Params::new(
            self.memory_kib(),
            self.iterations,
            self.parallelism,
            None,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            cost_factor: 12,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// Password hashing implementation.
///
/// Produces Argon2id digests in PHC string format. The digest carries the
/// algorithm, parameters and salt, so verification never needs the cost that
/// was configured at hashing time.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: HashCost,
}

impl PasswordHasher {
    /// Create a hasher with the given cost.
    ///
    /// # Errors
    /// * `InvalidCostFactor` - Cost factor outside the supported range
    pub fn new(cost: HashCost) -> Result<Self, PasswordError> {
        let params = cost.params()?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored digest.
    ///
    /// Re-derives the hash using the salt and parameters embedded in `digest`
    /// and compares in constant time.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `MalformedDigest` - `digest` is not a recognised PHC string
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(digest).map_err(|e| PasswordError::MalformedDigest(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedDigest(e.to_string())),
        }
    }
}
