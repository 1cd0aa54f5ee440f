use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{Claims, CredentialError};

/// Shortest password accepted at registration or password change.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Longest password accepted; bounds the work done by the slow hash.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Trims and lowercases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes and validates an email address.
///
/// The check is deliberately shallow: one `@`, a non-empty local part, and a
/// dotted domain without whitespace.
pub fn validate_email(email: &str) -> Result<String, CredentialError> {
    let email = normalize_email(email);
    let Some((local, domain)) = email.split_once('@') else {
        return Err(CredentialError::InvalidEmail);
    };

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(CredentialError::InvalidEmail);
    }
    Ok(email)
}

/// Checks password length bounds (in characters).
pub fn validate_password(password: &str) -> Result<(), CredentialError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if len > MAX_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooLong {
            max: MAX_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Builds the claims for a token issued to `user_id` at `issued_at`.
pub fn claims_for(user_id: Uuid, issued_at: DateTime<Utc>, ttl: Duration) -> Claims {
    Claims {
        sub: user_id.to_string(),
        iat: issued_at.timestamp(),
        exp: (issued_at + ttl).timestamp(),
    }
}

/// Check if a token's claims have expired.
pub fn is_token_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    claims.exp <= now.timestamp()
}
