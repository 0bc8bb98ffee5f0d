use std::env;

use auth::HashCost;
use auth::JwtError;
use auth::TokenSettings;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_hash_cost_factor")]
    pub hash_cost_factor: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            hash_cost_factor: default_hash_cost_factor(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl_minutes() -> i64 {
    30
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_hash_cost_factor() -> u32 {
    12
}

impl JwtConfig {
    /// Translate into codec settings.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Unknown algorithm name
    /// * `InvalidConfiguration` - A lifetime does not fit a duration
    pub fn token_settings(&self) -> Result<TokenSettings, JwtError> {
        let access_ttl = Duration::try_minutes(self.access_ttl_minutes).ok_or_else(|| {
            JwtError::InvalidConfiguration(format!(
                "jwt.access_ttl_minutes out of range: {}",
                self.access_ttl_minutes
            ))
        })?;
        let refresh_ttl = Duration::try_days(self.refresh_ttl_days).ok_or_else(|| {
            JwtError::InvalidConfiguration(format!(
                "jwt.refresh_ttl_days out of range: {}",
                self.refresh_ttl_days
            ))
        })?;

        Ok(
            TokenSettings::new(self.access_secret.clone(), self.refresh_secret.clone())
                .with_algorithm_name(&self.algorithm)?
                .with_access_ttl(access_ttl)
                .with_refresh_ttl(refresh_ttl),
        )
    }
}

impl PasswordConfig {
    pub fn hash_cost(&self) -> HashCost {
        HashCost::with_cost_factor(self.hash_cost_factor)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__ACCESS_TTL_MINUTES=15 overrides jwt.access_ttl_minutes
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(source: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"

            [server]
            http_port = 8080

            [jwt]
            access_secret = "access"
            refresh_secret = "refresh"
            "#,
        );

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.access_ttl_minutes, 30);
        assert_eq!(config.jwt.refresh_ttl_days, 7);
        assert_eq!(config.password.hash_cost_factor, 12);

        let settings = config.jwt.token_settings().unwrap();
        assert_eq!(settings.access_ttl, Duration::minutes(30));
        assert_eq!(settings.refresh_ttl, Duration::days(7));
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"

            [server]
            http_port = 8080

            [jwt]
            access_secret = "access"
            refresh_secret = "refresh"
            algorithm = "HS384"
            access_ttl_minutes = 5

            [password]
            hash_cost_factor = 10
            "#,
        );

        let settings = config.jwt.token_settings().unwrap();
        assert_eq!(format!("{:?}", settings.algorithm), "HS384");
        assert_eq!(settings.access_ttl, Duration::minutes(5));
        assert_eq!(config.password.hash_cost().cost_factor, 10);
    }

    #[test]
    fn test_out_of_range_ttl_rejected() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"

            [server]
            http_port = 8080

            [jwt]
            access_secret = "access"
            refresh_secret = "refresh"
            refresh_ttl_days = 9223372036854775807
            "#,
        );

        let result = config.jwt.token_settings();
        assert!(matches!(result, Err(JwtError::InvalidConfiguration(_))));

        let mut jwt = config.jwt;
        jwt.refresh_ttl_days = 7;
        jwt.access_ttl_minutes = i64::MIN;
        let result = jwt.token_settings();
        assert!(matches!(result, Err(JwtError::InvalidConfiguration(_))));
    }
}
