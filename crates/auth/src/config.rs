use std::time::Duration;

/// Secret used when `JWT_SECRET` is unset. Only suitable for local development.
const DEV_JWT_SECRET: &str = "growthgrid-dev-secret-change-me";

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for HS256 access tokens.
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: HMAC key for access tokens (default: a development key, with a warning)
    /// - `JWT_EXPIRY_DAYS`: Token and cookie lifetime in days (default: 7)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: false)
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET is not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl = std::env::var("JWT_EXPIRY_DAYS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|days| *days > 0)
            .map(|days| Duration::from_secs(days * 24 * 60 * 60))
            .unwrap_or(Duration::from_secs(7 * 24 * 60 * 60)); // 7 days default

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            jwt_secret,
            token_ttl,
            cookie_name: "access_token".to_string(),
            cookie_secure,
        }
    }

    /// Configuration with a fixed secret and the default lifetime.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_name: "access_token".to_string(),
            cookie_secure: false,
        }
    }

    /// Token lifetime as a chrono duration, for claim arithmetic.
    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl).unwrap_or(chrono::Duration::days(7))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_secret_defaults() {
        let config = AuthConfig::with_secret("s3cret");

        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.cookie_name, "access_token");
        assert_eq!(config.token_ttl_chrono(), chrono::Duration::days(7));
        assert!(!config.cookie_secure);
    }
}
