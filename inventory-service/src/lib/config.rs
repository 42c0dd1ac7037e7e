use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use auth::Authenticator;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::PasswordScheme;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use serde::Deserialize;

/// Placeholder signing secret for local development only.
pub const DEVELOPMENT_JWT_SECRET: &str = "insecure-development-secret-change-me";

/// Upper bound for `jwt.access_token_expire_minutes` (one year).
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(RunMode::Development),
            "production" => Ok(RunMode::Production),
            other => Err(ConfigError::Message(format!(
                "RUN_MODE must be 'development' or 'production', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => f.write_str("development"),
            RunMode::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. Without it the in-memory user directory is used.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

// Keeps the secret out of logs.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub scheme: String,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__` as separator, e.g. `JWT__SECRET` overrides
    /// `jwt.secret`. `RUN_MODE` selects development or production rules.
    pub fn load() -> Result<(Self, RunMode), ConfigError> {
        let run_mode: RunMode = env::var("RUN_MODE")
            .unwrap_or_else(|_| "development".to_string())
            .parse()?;

        let config = Self::from_environment(run_mode, Environment::default().separator("__"))?;

        Ok((config, run_mode))
    }

    /// Build configuration from an environment source and validate it.
    pub fn from_environment(run_mode: RunMode, source: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8000_i64)?
            .set_default("database.max_connections", 5_i64)?
            .set_default("jwt.secret", DEVELOPMENT_JWT_SECRET)?
            .set_default("jwt.algorithm", "HS256")?
            .set_default("jwt.access_token_expire_minutes", 30_i64)?
            .set_default("password.scheme", "bcrypt")?
            .set_default("password.bcrypt_cost", 12_i64)?
            .add_source(source)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate(run_mode)?;

        Ok(config)
    }

    fn validate(&self, run_mode: RunMode) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }

        if self.jwt.secret == DEVELOPMENT_JWT_SECRET {
            match run_mode {
                RunMode::Development => tracing::warn!(
                    "Using the built-in development JWT secret; set JWT__SECRET before deploying"
                ),
                RunMode::Production => {
                    return Err(ConfigError::Message(
                        "JWT__SECRET must be set to a private value in production".into(),
                    ))
                }
            }
        }

        self.jwt.access_token_ttl()?;

        auth::jwt::parse_algorithm(&self.jwt.algorithm)
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        self.password.scheme()?;

        Ok(())
    }

    /// Build the authenticator described by this configuration.
    pub fn authenticator(&self) -> Result<Arc<Authenticator>, ConfigError> {
        let algorithm = auth::jwt::parse_algorithm(&self.jwt.algorithm)
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        let jwt_handler = JwtHandler::new(self.jwt.secret.as_bytes())
            .with_algorithm(algorithm)
            .map_err(|e| ConfigError::Message(e.to_string()))?
            .with_default_ttl(self.jwt.access_token_ttl()?);

        let password_hasher = PasswordHasher::with_scheme(self.password.scheme()?);

        Ok(Arc::new(Authenticator::from_parts(
            password_hasher,
            jwt_handler,
        )))
    }
}

impl JwtConfig {
    /// Access token lifetime, between one minute and one year.
    pub fn access_token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        let minutes = self.access_token_expire_minutes;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.access_token_expire_minutes must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_EXPIRE_MINUTES, minutes
            )));
        }

        chrono::Duration::try_minutes(minutes).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.access_token_expire_minutes out of range: {}",
                minutes
            ))
        })
    }
}

impl PasswordConfig {
    pub fn scheme(&self) -> Result<PasswordScheme, ConfigError> {
        match self.scheme.parse().map_err(ConfigError::Message)? {
            PasswordScheme::Bcrypt { .. } => Ok(PasswordScheme::Bcrypt {
                cost: self.bcrypt_cost,
            }),
            scheme => Ok(scheme),
        }
    }
}
