use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// PHC identifier prefix shared by every Argon2 variant.
pub const PREFIX: &str = "$argon2";

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Returns
/// PHC string format hash (includes algorithm, parameters, salt, and hash)
pub fn hash(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verify a password against an Argon2 PHC string.
///
/// Parameters are read from the stored hash, so hashes produced with
/// non-default costs still verify. A hash that does not parse never matches.
pub fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
