pub mod argon2;
pub mod errors;
pub mod policy;

pub use self::argon2::HashCost;
pub use self::argon2::PasswordHasher;
pub use errors::PasswordError;
pub use errors::PasswordPolicyError;
pub use policy::validate_strength;
