use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password cannot be longer than {max} bytes, got {actual}")]
    PasswordTooLong { max: usize, actual: usize },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
