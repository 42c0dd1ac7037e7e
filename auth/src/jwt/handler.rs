use std::str::FromStr;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::ClaimSet;
use super::claims::Claims;
use super::claims::RawClaims;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// JWT token handler for issuing and verifying access tokens.
///
/// Uses an HMAC algorithm (HS256 by default) keyed by a shared secret.
/// Expiry is checked against an injected [`Clock`] rather than inside
/// `jsonwebtoken`, so tests can control time.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Lifetime of tokens issued without an explicit TTL.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler configured with HS256, a 30 minute TTL and the system clock
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            default_ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
            clock: Arc::new(SystemClock),
        }
    }

    /// Switch the signing algorithm.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not in the HMAC family
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, JwtError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                self.algorithm = algorithm;
                Ok(self)
            }
            other => Err(JwtError::UnsupportedAlgorithm(format!("{:?}", other))),
        }
    }

    /// Set the lifetime used by [`Self::issue`].
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token that expires after the default TTL.
    pub fn issue(&self, claims: &ClaimSet) -> Result<String, JwtError> {
        self.issue_with_ttl(claims, self.default_ttl)
    }

    /// Issue a token that expires `ttl` after the current instant.
    ///
    /// # Arguments
    /// * `claims` - Subject and custom claims to sign
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// Compact JWT string (header.payload.signature)
    ///
    /// # Errors
    /// * `ExpiryOutOfRange` - `now + ttl` is not a representable instant
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_with_ttl(&self, claims: &ClaimSet, ttl: Duration) -> Result<String, JwtError> {
        let exp = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::ExpiryOutOfRange(ttl.to_string()))?;
        let header = Header::new(self.algorithm);

        let token = encode(&header, &claims.expiring_at(exp), &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        tracing::debug!(sub = %claims.sub, exp = %exp, "Issued access token");
        Ok(token)
    }

    /// Verify a token against the handler's clock.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, self.clock.now())
    }

    /// Verify a token as of `now`.
    ///
    /// # Returns
    /// Decoded claims, only if the signature is valid and `now < exp`
    ///
    /// # Errors
    /// * `TokenMalformed` - Token does not parse, or lacks `sub`/`exp`
    /// * `TokenSignatureInvalid` - Signature or algorithm does not match
    /// * `TokenExpired` - Token is past its `exp` instant
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is enforced below against the injected clock, with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let token_data =
            decode::<RawClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        JwtError::TokenSignatureInvalid
                    }
                    _ => JwtError::TokenMalformed(e.to_string()),
                }
            })?;

        let claims = Claims::try_from(token_data.claims)?;
        if claims.is_expired_at(now) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Parse an algorithm name such as `HS256`.
///
/// # Errors
/// * `UnsupportedAlgorithm` - Unknown name or not an HMAC algorithm
pub fn parse_algorithm(name: &str) -> Result<Algorithm, JwtError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| JwtError::UnsupportedAlgorithm(name.to_string()))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(JwtError::UnsupportedAlgorithm(name.to_string())),
    }
}
