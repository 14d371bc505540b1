//! Admin JWT validation
//!
//! Admin tokens are issued by an external identity provider. Only the
//! `exp` claim is checked. Signature verification is off unless the
//! validator is built with [`AdminJwtValidator::hs256`], so by default a
//! forged or unsigned (`alg: none`) token with a future `exp` is accepted.

use crate::config::AdminJwtConfig;
use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

// Segments arrive with or without `=` padding depending on the issuer.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried by an admin token
///
/// Only `exp` is validated; everything else passes through to handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Expiration time (NumericDate, integral or fractional)
    pub exp: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AdminClaims {
    /// Whether the token is still live at `now` (`exp >= now`)
    pub fn is_live_at(&self, now: i64) -> bool {
        if let Some(exp) = self.exp.as_i64() {
            exp >= now
        } else if self.exp.is_u64() {
            // beyond i64::MAX
            true
        } else {
            self.exp.as_f64().map_or(false, |exp| exp >= now as f64)
        }
    }
}

#[derive(Debug, Error)]
pub enum AdminJwtError {
    #[error("token expired at {exp}")]
    Expired { exp: Number },

    #[error("token could not be decoded: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for AdminJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AdminJwtError::Invalid(e.to_string())
    }
}

/// Decodes admin tokens and checks expiry
#[derive(Clone)]
pub struct AdminJwtValidator {
    /// `None` means signatures are not checked
    verifier: Option<Arc<(DecodingKey, Validation)>>,
}

impl AdminJwtValidator {
    /// Expiry-only validation; headers and signatures are not checked
    pub fn unverified() -> Self {
        Self { verifier: None }
    }

    /// Expiry plus HS256 signature validation
    pub fn hs256(secret: &str) -> Self {
        // `exp` presence and type are enforced by `AdminClaims`; the
        // library's own check only understands integral timestamps.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            verifier: Some(Arc::new((
                DecodingKey::from_secret(secret.as_bytes()),
                validation,
            ))),
        }
    }

    pub fn from_config(config: &AdminJwtConfig) -> anyhow::Result<Self> {
        if !config.verify_signature {
            return Ok(Self::unverified());
        }
        match config.secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(Self::hs256(secret)),
            _ => anyhow::bail!("admin JWT signature verification enabled without a secret"),
        }
    }

    pub fn verifies_signature(&self) -> bool {
        self.verifier.is_some()
    }

    /// Validate against the current epoch time
    pub fn validate(&self, token: &str) -> Result<AdminClaims, AdminJwtError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate against a given epoch time; a token is live while `exp >= now`
    pub fn validate_at(&self, token: &str, now: i64) -> Result<AdminClaims, AdminJwtError> {
        let claims = match self.verifier.as_deref() {
            Some((key, validation)) => decode::<AdminClaims>(token, key, validation)?.claims,
            None => decode_unverified(token)?,
        };

        if claims.is_live_at(now) {
            Ok(claims)
        } else {
            Err(AdminJwtError::Expired { exp: claims.exp })
        }
    }
}

/// Decode `header.payload.signature` without looking at the algorithm or
/// the signature. The header must still be a JSON object.
fn decode_unverified(token: &str) -> Result<AdminClaims, AdminJwtError> {
    let (signing_input, _signature) = token
        .rsplit_once('.')
        .ok_or_else(|| AdminJwtError::Invalid("not enough segments".into()))?;
    let (header, payload) = signing_input
        .split_once('.')
        .ok_or_else(|| AdminJwtError::Invalid("not enough segments".into()))?;

    let header: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&decode_segment(header, "header")?)
            .map_err(|e| AdminJwtError::Invalid(format!("invalid header JSON: {}", e)))?;
    if !header.contains_key("alg") {
        return Err(AdminJwtError::Invalid("header has no alg".into()));
    }

    serde_json::from_slice(&decode_segment(payload, "payload")?)
        .map_err(|e| AdminJwtError::Invalid(format!("invalid payload JSON: {}", e)))
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, AdminJwtError> {
    SEGMENT_ENGINE
        .decode(segment)
        .map_err(|e| AdminJwtError::Invalid(format!("invalid {} base64: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn token_with(claims: serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn raw_token(header: serde_json::Value, claims: serde_json::Value, signature: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string()),
            signature
        )
    }

    fn forge_signature(token: &str) -> String {
        let (head, _sig) = token.rsplit_once('.').unwrap();
        format!("{}.bm90LWEtc2lnbmF0dXJl", head)
    }

    #[test]
    fn test_future_exp_accepted_without_signature_check() {
        let token = token_with(json!({"sub": "admin-1", "exp": NOW + 60}), "issuer-secret");
        let claims = AdminJwtValidator::unverified()
            .validate_at(&forge_signature(&token), NOW)
            .unwrap();

        assert_eq!(claims.sub.as_deref(), Some("admin-1"));
        assert_eq!(claims.exp.as_i64(), Some(NOW + 60));
    }

    #[test]
    fn test_unsigned_alg_none_token_accepted() {
        let token = raw_token(json!({"alg": "none"}), json!({"exp": NOW + 60}), "");
        let claims = AdminJwtValidator::unverified().validate_at(&token, NOW).unwrap();
        assert_eq!(claims.exp.as_i64(), Some(NOW + 60));
    }

    #[test]
    fn test_unsigned_alg_none_token_past_exp_rejected() {
        let token = raw_token(json!({"alg": "none"}), json!({"exp": NOW - 60}), "");
        let err = AdminJwtValidator::unverified()
            .validate_at(&token, NOW)
            .unwrap_err();
        assert!(matches!(err, AdminJwtError::Expired { .. }));
    }

    #[test]
    fn test_padded_segments_accepted() {
        let header = base64::engine::general_purpose::URL_SAFE.encode(r#"{"alg":"RS256"}"#);
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(format!(r#"{{"exp":{}}}"#, NOW + 1));
        let token = format!("{}.{}.sig", header, payload);
        assert!(AdminJwtValidator::unverified().validate_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_fractional_exp_compared_numerically() {
        let validator = AdminJwtValidator::unverified();
        let header = json!({"alg": "HS256"});

        let live = raw_token(header.clone(), json!({"exp": 1_700_000_060.5}), "sig");
        assert!(validator.validate_at(&live, NOW).is_ok());

        let expired = raw_token(header, json!({"exp": 1_699_999_999.5}), "sig");
        assert!(matches!(
            validator.validate_at(&expired, NOW),
            Err(AdminJwtError::Expired { .. })
        ));
    }

    #[test]
    fn test_fractional_exp_with_verified_signature() {
        let validator = AdminJwtValidator::hs256("admin-secret");
        let token = token_with(json!({"exp": 1_700_000_060.5}), "admin-secret");
        assert!(validator.validate_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_non_numeric_exp_rejected() {
        let validator = AdminJwtValidator::unverified();
        for exp in [json!("tomorrow"), json!(null), json!(true)] {
            let token = raw_token(json!({"alg": "none"}), json!({ "exp": exp }), "");
            assert!(matches!(
                validator.validate_at(&token, NOW),
                Err(AdminJwtError::Invalid(_))
            ));
        }
    }

    #[test]
    fn test_exp_equal_to_now_is_still_valid() {
        let token = token_with(json!({"exp": NOW}), "s");
        assert!(AdminJwtValidator::unverified().validate_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_past_exp_rejected() {
        let token = token_with(json!({"exp": NOW - 1}), "s");
        let err = AdminJwtValidator::unverified()
            .validate_at(&token, NOW)
            .unwrap_err();
        assert!(matches!(err, AdminJwtError::Expired { exp } if exp.as_i64() == Some(NOW - 1)));
    }

    #[test]
    fn test_missing_exp_rejected() {
        let token = token_with(json!({"sub": "admin-1"}), "s");
        let err = AdminJwtValidator::unverified()
            .validate_at(&token, NOW)
            .unwrap_err();
        assert!(matches!(err, AdminJwtError::Invalid(_)));

        let err = AdminJwtValidator::hs256("s").validate_at(&token, NOW).unwrap_err();
        assert!(matches!(err, AdminJwtError::Invalid(_)));
    }

    #[test]
    fn test_audience_is_ignored() {
        let token = token_with(json!({"aud": "some-client", "exp": NOW + 60}), "s");
        let claims = AdminJwtValidator::unverified().validate_at(&token, NOW).unwrap();
        assert_eq!(claims.extra["aud"], "some-client");
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let validator = AdminJwtValidator::unverified();
        let not_object = raw_token(json!(["alg"]), json!({"exp": NOW + 60}), "");
        let no_alg = raw_token(json!({"typ": "JWT"}), json!({"exp": NOW + 60}), "");
        for token in [
            "",
            "not-a-jwt",
            "only.two",
            "a.b.c",
            "!!!.@@@.###",
            not_object.as_str(),
            no_alg.as_str(),
        ] {
            assert!(
                matches!(validator.validate_at(token, NOW), Err(AdminJwtError::Invalid(_))),
                "token {:?} should be invalid",
                token
            );
        }
    }

    #[test]
    fn test_hs256_rejects_foreign_and_unsigned_tokens() {
        let validator = AdminJwtValidator::hs256("admin-secret");
        let foreign = token_with(json!({"exp": NOW + 60}), "someone-else");
        let unsigned = raw_token(json!({"alg": "none"}), json!({"exp": NOW + 60}), "");
        let own = token_with(json!({"exp": NOW + 60}), "admin-secret");

        assert!(validator.validate_at(&foreign, NOW).is_err());
        assert!(validator.validate_at(&unsigned, NOW).is_err());
        assert!(validator.validate_at(&own, NOW).is_ok());
    }

    #[test]
    fn test_from_config() {
        let unverified = AdminJwtValidator::from_config(&AdminJwtConfig::default()).unwrap();
        assert!(!unverified.verifies_signature());

        let verified = AdminJwtValidator::from_config(&AdminJwtConfig {
            verify_signature: true,
            secret: Some("admin-secret".to_string()),
        })
        .unwrap();
        assert!(verified.verifies_signature());

        let missing = AdminJwtValidator::from_config(&AdminJwtConfig {
            verify_signature: true,
            secret: None,
        });
        assert!(missing.is_err());
    }
}
