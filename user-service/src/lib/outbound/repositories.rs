pub mod revoked_token;
pub mod user;

pub use revoked_token::PostgresTokenRevocationStore;
pub use user::PostgresUserRepository;
