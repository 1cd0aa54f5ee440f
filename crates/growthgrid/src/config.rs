use std::{env, str::FromStr, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Analytics cache TTL in seconds (default: 60)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "growthgrid.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub sqlite_path: String,
    /// Directory holding uploaded files (default: "uploads")
    pub upload_dir: String,
    /// Base URL used to build attachment links (default: "http://localhost:3000")
    pub public_base_url: String,
    /// Offset east of UTC, in minutes, that decides what "today" is (default: 0)
    pub utc_offset_minutes: i32,
    /// Origins allowed by CORS; empty means any origin
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 60)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "growthgrid.db")
    /// - `UPLOAD_DIR` - Upload directory (default: "uploads")
    /// - `PUBLIC_BASE_URL` - Public base URL (default: "http://localhost:3000")
    /// - `UTC_OFFSET_MINUTES` - Deployment timezone offset (default: 0)
    /// - `CORS_ORIGINS` - Comma-separated allowed origins (default: any)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 30)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: parsed_var("CACHE_TTL_SECONDS", 60),
            cache_max_entries: parsed_var("CACHE_MAX_ENTRIES", 10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "growthgrid.db".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            utc_offset_minutes: parsed_var("UTC_OFFSET_MINUTES", 0),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            request_timeout_seconds: parsed_var("REQUEST_TIMEOUT_SECONDS", 30),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Get request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_conversions() {
        let config = Config {
            cache_ttl_seconds: 600,
            request_timeout_seconds: 5,
            ..Config::from_env()
        };

        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        for name in [
            "CACHE_TTL_SECONDS",
            "CACHE_MAX_ENTRIES",
            "SQLITE_PATH",
            "UPLOAD_DIR",
            "PUBLIC_BASE_URL",
            "UTC_OFFSET_MINUTES",
            "CORS_ORIGINS",
            "REQUEST_TIMEOUT_SECONDS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();

        assert_eq!(config.cache_ttl_seconds, 60);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.sqlite_path, "growthgrid.db");
        assert_eq!(config.upload_dir, "uploads");
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.utc_offset_minutes, 0);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:5173/ ,, https://app.example.com"),
            vec![
                "http://localhost:5173".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }
}
