use super::errors::PasswordError;

/// Cost used when none is configured.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Modular crypt prefixes emitted by bcrypt implementations.
pub const PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Hash a password with bcrypt at the given cost.
///
/// The salt is generated per call, so hashing the same password twice
/// yields different strings.
pub fn hash(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verify a password against a bcrypt hash.
///
/// `bcrypt::verify` compares digests in constant time. A malformed hash
/// is reported as a mismatch.
pub fn verify(password: &str, hash: &str) -> bool {
    // The error text embeds the stored hash, so it is dropped rather than logged.
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn is_bcrypt_hash(hash: &str) -> bool {
    PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}
