use chrono::Duration;

use crate::bearer::extract_bearer_token;
use crate::jwt::ClaimSet;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext hashed once to produce the stand-in hash for unknown users.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing-equalization";

/// Authentication coordinator combining password verification and JWT handling.
///
/// Built once at startup from explicit configuration and shared by reference.
/// It holds no mutable state.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    dummy_hash: String,
}

/// Result of successful token issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Failures of the bearer-token check run before protected handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Missing Authorization header")]
    MissingAuthorization,

    #[error("Authorization header must be 'Bearer <token>'")]
    InvalidAuthorizationScheme,

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl AuthenticationError {
    /// Stable machine-readable code for clients.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthenticationError::MissingAuthorization => "missing_authorization",
            AuthenticationError::InvalidAuthorizationScheme => "invalid_authorization_scheme",
            AuthenticationError::Token(e) => e.reason_code(),
        }
    }
}

impl Authenticator {
    /// Create an authenticator with default hashing and token settings.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::from_parts(PasswordHasher::new(), JwtHandler::new(jwt_secret))
    }

    /// Create an authenticator from configured components.
    ///
    /// Hashes the dummy password up front, so every unknown-user login
    /// costs exactly one verification.
    pub fn from_parts(password_hasher: PasswordHasher, jwt_handler: JwtHandler) -> Self {
        let dummy_hash = password_hasher
            .hash(DUMMY_PASSWORD)
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to prepare dummy password hash");
                String::new()
            });

        Self {
            password_hasher,
            jwt_handler,
            dummy_hash,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.jwt_handler.default_ttl()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordTooLong` - Password exceeds 72 bytes
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a login attempt against the stored hash, if any.
    ///
    /// With no stored hash (unknown user) the password is still verified
    /// against a dummy hash, so both failure paths cost the same.
    pub fn verify_password(&self, password: &str, stored_hash: Option<&str>) -> bool {
        match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash),
            None => {
                self.password_hasher.verify(password, &self.dummy_hash);
                false
            }
        }
    }

    /// Issue an access token with the configured lifetime.
    ///
    /// # Errors
    /// * `ExpiryOutOfRange` - Lifetime pushes `exp` past the representable range
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(&self, claims: &ClaimSet) -> Result<AuthenticationResult, JwtError> {
        self.issue_token_with_ttl(claims, self.jwt_handler.default_ttl())
    }

    /// Issue an access token with an explicit lifetime.
    pub fn issue_token_with_ttl(
        &self,
        claims: &ClaimSet,
        ttl: Duration,
    ) -> Result<AuthenticationResult, JwtError> {
        let access_token = self.jwt_handler.issue_with_ttl(claims, ttl)?;
        Ok(AuthenticationResult { access_token })
    }

    /// Validate and decode a JWT token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }

    /// Authenticate a request from its raw `Authorization` header value.
    ///
    /// # Arguments
    /// * `authorization` - Header value, if the request carried one
    ///
    /// # Returns
    /// Verified claims of the presented token
    ///
    /// # Errors
    /// * `MissingAuthorization` - No header
    /// * `InvalidAuthorizationScheme` - Not a `Bearer <token>` header
    /// * `Token` - Token is malformed, forged or expired
    pub fn authenticate_bearer(
        &self,
        authorization: Option<&str>,
    ) -> Result<Claims, AuthenticationError> {
        let token = extract_bearer_token(authorization)?;
        Ok(self.validate_token(token)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;
    use crate::password::PasswordScheme;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        Authenticator::from_parts(
            PasswordHasher::with_scheme(PasswordScheme::Bcrypt { cost: 4 }),
            JwtHandler::new(SECRET),
        )
    }

    #[test]
    fn test_verify_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", Some(&hash)));
        assert!(!authenticator.verify_password("wrong_password", Some(&hash)));
    }

    #[test]
    fn test_verify_password_unknown_user() {
        let authenticator = authenticator();

        assert!(!authenticator.verify_password("my_password", None));
        assert!(!authenticator.verify_password(DUMMY_PASSWORD, None));
    }

    #[test]
    fn test_dummy_hash_prepared_at_construction() {
        let authenticator = authenticator();

        assert!(authenticator.dummy_hash.starts_with("$2b$04$"));
        assert!(authenticator
            .password_hasher
            .verify(DUMMY_PASSWORD, &authenticator.dummy_hash));
    }

    #[test]
    fn test_hash_password_too_long() {
        let result = authenticator().hash_password(&"x".repeat(73));
        assert!(matches!(result, Err(PasswordError::PasswordTooLong { .. })));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator();

        let result = authenticator
            .issue_token(&ClaimSet::new("alice"))
            .expect("Failed to issue token");

        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Failed to validate token");
        assert_eq!(decoded.sub, "alice");
    }

    #[test]
    fn test_authenticate_bearer() {
        let authenticator = authenticator();
        let token = authenticator
            .issue_token(&ClaimSet::new("alice"))
            .unwrap()
            .access_token;

        let claims = authenticator
            .authenticate_bearer(Some(&format!("Bearer {}", token)))
            .expect("Bearer authentication failed");
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_authenticate_bearer_failures() {
        let authenticator = authenticator();

        let missing = authenticator.authenticate_bearer(None).unwrap_err();
        assert_eq!(missing.reason_code(), "missing_authorization");

        let scheme = authenticator
            .authenticate_bearer(Some("Token abc"))
            .unwrap_err();
        assert_eq!(scheme.reason_code(), "invalid_authorization_scheme");

        let malformed = authenticator
            .authenticate_bearer(Some("Bearer invalid.token.here"))
            .unwrap_err();
        assert_eq!(malformed.reason_code(), "token_malformed");
    }

    #[test]
    fn test_authenticate_bearer_expired() {
        let issued_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let past = Authenticator::from_parts(
            PasswordHasher::with_scheme(PasswordScheme::Bcrypt { cost: 4 }),
            JwtHandler::new(SECRET).with_clock(Arc::new(FixedClock(issued_at))),
        );
        let token = past
            .issue_token(&ClaimSet::new("alice"))
            .unwrap()
            .access_token;

        let err = authenticator()
            .authenticate_bearer(Some(&format!("Bearer {}", token)))
            .unwrap_err();
        assert_eq!(err, AuthenticationError::Token(JwtError::TokenExpired));
        assert_eq!(err.reason_code(), "token_expired");
    }
}
