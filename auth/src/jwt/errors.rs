use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token is malformed: {0}")]
    TokenMalformed(String),

    #[error("Token signature is invalid")]
    TokenSignatureInvalid,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime out of range: {0}")]
    ExpiryOutOfRange(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl JwtError {
    /// Stable machine-readable code for clients.
    pub fn reason_code(&self) -> &'static str {
        match self {
            JwtError::TokenMalformed(_) => "token_malformed",
            JwtError::TokenSignatureInvalid => "token_signature_invalid",
            JwtError::TokenExpired => "token_expired",
            JwtError::EncodingFailed(_) => "token_encoding_failed",
            JwtError::ExpiryOutOfRange(_) => "token_expiry_out_of_range",
            JwtError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
        }
    }
}
