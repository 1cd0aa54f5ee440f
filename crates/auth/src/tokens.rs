//! HS256 access tokens.
//!
//! Expiry is checked against the injected clock rather than by
//! `jsonwebtoken`, so tests can move time forward.

use chrono::{DateTime, Utc};
use growthgrid_core::auth::{claims_for, is_token_expired, Claims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Signs a token for `user_id` issued at `now`.
pub fn issue_token(config: &AuthConfig, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AuthError> {
    let claims = claims_for(user_id, now, config.token_ttl_chrono());
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(e.to_string()))
}

/// Verifies the signature and expiry of `token` and returns its claims.
pub fn verify_token(config: &AuthConfig, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|_| AuthError::Unauthorized("Invalid token"))?
        .claims;

    if is_token_expired(&claims, now) {
        return Err(AuthError::Unauthorized("Token expired"));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let config = AuthConfig::with_secret("test-secret");
        let user_id = Uuid::new_v4();

        let token = issue_token(&config, user_id, now()).unwrap();
        let claims = verify_token(&config, &token, now() + Duration::days(1)).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = AuthConfig::with_secret("test-secret");
        let token = issue_token(&config, Uuid::new_v4(), now()).unwrap();

        let result = verify_token(&config, &token, now() + Duration::days(7));

        assert!(matches!(result, Err(AuthError::Unauthorized("Token expired"))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&AuthConfig::with_secret("one"), Uuid::new_v4(), now()).unwrap();

        let result = verify_token(&AuthConfig::with_secret("two"), &token, now());

        assert!(matches!(result, Err(AuthError::Unauthorized("Invalid token"))));
    }

    #[test]
    fn test_garbage_rejected() {
        let config = AuthConfig::with_secret("test-secret");

        assert!(verify_token(&config, "not.a.jwt", now()).is_err());
    }
}
