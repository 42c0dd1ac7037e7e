use std::fmt;
use std::str::FromStr;

use super::argon2;
use super::bcrypt;
use super::errors::PasswordError;

/// Algorithm used for newly created hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    Bcrypt { cost: u32 },
    Argon2id,
}

impl Default for PasswordScheme {
    fn default() -> Self {
        PasswordScheme::Bcrypt {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordScheme::Bcrypt { cost } => write!(f, "bcrypt(cost={})", cost),
            PasswordScheme::Argon2id => f.write_str("argon2id"),
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = String;

    /// Parse a scheme name. Bcrypt gets the default cost.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(PasswordScheme::default()),
            "argon2id" | "argon2" => Ok(PasswordScheme::Argon2id),
            other => Err(format!("unknown password scheme '{}'", other)),
        }
    }
}

/// Salted, adaptive password hashing.
///
/// New hashes use the configured [`PasswordScheme`]. Verification looks at
/// the stored hash to pick the algorithm, so hashes written under a previous
/// scheme keep working after the configuration changes.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    scheme: PasswordScheme,
}

impl PasswordHasher {
    /// Longest accepted plaintext, in bytes. bcrypt only reads 72 bytes of
    /// input, and the same cap applies to every scheme.
    pub const MAX_PASSWORD_BYTES: usize = 72;

    /// Create a hasher using bcrypt at the default cost.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher for a specific scheme.
    pub fn with_scheme(scheme: PasswordScheme) -> Self {
        Self { scheme }
    }

    /// Hash a plaintext password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Self-describing hash string (bcrypt modular crypt or Argon2 PHC format)
    ///
    /// # Errors
    /// * `PasswordTooLong` - Password exceeds [`Self::MAX_PASSWORD_BYTES`]
    /// * `HashingFailed` - Underlying hash operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Self::check_length(password)?;

        match self.scheme {
            PasswordScheme::Bcrypt { cost } => bcrypt::hash(password, cost),
            PasswordScheme::Argon2id => argon2::hash(password),
        }
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns false for mismatches, over-long input, and hashes that are
    /// corrupt or produced by an unknown algorithm.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if Self::check_length(password).is_err() {
            return false;
        }

        if bcrypt::is_bcrypt_hash(hash) {
            bcrypt::verify(password, hash)
        } else if hash.starts_with(argon2::PREFIX) {
            argon2::verify(password, hash)
        } else {
            false
        }
    }

    fn check_length(password: &str) -> Result<(), PasswordError> {
        let actual = password.len();
        if actual > Self::MAX_PASSWORD_BYTES {
            Err(PasswordError::PasswordTooLong {
                max: Self::MAX_PASSWORD_BYTES,
                actual,
            })
        } else {
            Ok(())
        }
    }
}
