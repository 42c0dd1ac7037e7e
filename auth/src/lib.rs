//! Authentication utilities library
//!
//! Provides the authentication core of the inventory backend:
//! - Password hashing (bcrypt by default, Argon2id supported)
//! - JWT access token issuance and verification
//! - Bearer header parsing for protected routes
//!
//! Everything is configured explicitly and shared by reference; there is no
//! global state. Time is read through an injectable [`Clock`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{PasswordHasher, PasswordScheme};
//!
//! let hasher = PasswordHasher::with_scheme(PasswordScheme::Bcrypt { cost: 4 });
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{ClaimSet, JwtHandler};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.issue(&ClaimSet::new("alice")).unwrap();
//! let claims = handler.verify(&token).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```
//!
//! ## Protecting a Route
//! ```
//! use auth::{Authenticator, ClaimSet};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//! let result = auth.issue_token(&ClaimSet::new("alice")).unwrap();
//!
//! let header = format!("Bearer {}", result.access_token);
//! let claims = auth.authenticate_bearer(Some(&header)).unwrap();
//! assert_eq!(claims.sub, "alice");
//!
//! let err = auth.authenticate_bearer(None).unwrap_err();
//! assert_eq!(err.reason_code(), "missing_authorization");
//! ```

pub mod authenticator;
pub mod bearer;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use jsonwebtoken::Algorithm;
pub use jwt::ClaimSet;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordScheme;
