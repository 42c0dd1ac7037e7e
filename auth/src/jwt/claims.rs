use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Claim names owned by the token handler. They cannot be set as extras.
pub const RESERVED_CLAIMS: [&str; 2] = ["sub", "exp"];

/// Claims supplied by the caller before a token is issued.
///
/// The handler adds `exp` at issuance time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    /// Subject (the username)
    pub sub: String,

    /// Additional custom claims
    pub extra: HashMap<String, serde_json::Value>,
}

impl ClaimSet {
    /// Create a claim set for the given subject.
    pub fn new(sub: impl ToString) -> Self {
        Self {
            sub: sub.to_string(),
            extra: HashMap::new(),
        }
    }

    /// Add a custom claim.
    ///
    /// Reserved names (`sub`, `exp`) and values that fail to serialize
    /// are ignored.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        let key = key.to_string();
        if RESERVED_CLAIMS.contains(&key.as_str()) {
            return self;
        }
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key, json_value);
        }
        self
    }

    /// Stamp the claim set with an expiration instant.
    ///
    /// Reserved names found in `extra` are dropped; the typed `sub` and
    /// `exp` always win.
    pub fn expiring_at(&self, exp: DateTime<Utc>) -> Claims {
        let extra = self
            .extra
            .iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Claims {
            sub: self.sub.clone(),
            exp,
            extra,
        }
    }
}

/// Verified token claims.
///
/// Only produced by issuing a [`ClaimSet`] or by successful verification,
/// so `sub` and `exp` are always present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (the username)
    pub sub: String,

    /// Expiration time, encoded as a Unix timestamp
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Check if the token is expired at `now`.
    ///
    /// A token is valid strictly before its `exp` instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.exp
    }

    /// Look up a custom claim.
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

/// Wire form of the payload, used to tell missing claims apart from bad ones.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: Option<String>,
    exp: Option<i64>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = JwtError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = raw
            .sub
            .ok_or_else(|| JwtError::TokenMalformed("missing 'sub' claim".to_string()))?;
        let exp = raw
            .exp
            .ok_or_else(|| JwtError::TokenMalformed("missing 'exp' claim".to_string()))?;
        let exp = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| JwtError::TokenMalformed("'exp' claim out of range".to_string()))?;

        Ok(Claims {
            sub,
            exp,
            extra: raw.extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_new_claim_set() {
        let claims = ClaimSet::new("alice");
        assert_eq!(claims.sub, "alice");
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_with_extra_skips_reserved_names() {
        let claims = ClaimSet::new("alice")
            .with_extra("scope", "inventory")
            .with_extra("exp", 1)
            .with_extra("sub", "mallory");

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.extra.len(), 1);
        assert_eq!(claims.extra["scope"], "inventory");
    }

    #[test]
    fn test_expiring_at_drops_reserved_extras() {
        let exp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut claim_set = ClaimSet::new("alice").with_extra("scope", "inventory");
        claim_set.extra.insert("exp".to_string(), serde_json::json!(1));
        claim_set
            .extra
            .insert("sub".to_string(), serde_json::json!("mallory"));

        let claims = claim_set.expiring_at(exp);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.extra.len(), 1);

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["exp"], exp.timestamp());
        assert_eq!(value["sub"], "alice");
    }

    #[test]
    fn test_is_expired_at() {
        let exp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = ClaimSet::new("alice").expiring_at(exp);

        assert!(!claims.is_expired_at(exp - chrono::Duration::seconds(1)));
        assert!(claims.is_expired_at(exp)); // Exactly at expiration
        assert!(claims.is_expired_at(exp + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_serialized_shape() {
        let exp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = ClaimSet::new("alice")
            .with_extra("scope", "inventory")
            .expiring_at(exp);

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"sub": "alice", "exp": 1_700_000_000, "scope": "inventory"})
        );
    }

    #[test]
    fn test_raw_claims_without_exp_are_malformed() {
        let raw: RawClaims = serde_json::from_value(serde_json::json!({"sub": "alice"})).unwrap();
        assert!(matches!(
            Claims::try_from(raw),
            Err(JwtError::TokenMalformed(_))
        ));
    }

    #[test]
    fn test_raw_claims_without_sub_are_malformed() {
        let raw: RawClaims = serde_json::from_value(serde_json::json!({"exp": 10})).unwrap();
        assert!(matches!(
            Claims::try_from(raw),
            Err(JwtError::TokenMalformed(_))
        ));
    }
}
