//! Health check endpoints.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/health` - Active database and object store checks

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    Down,
}

/// Result of probing one dependency.
#[derive(Debug, Serialize)]
pub struct Check {
    pub status: CheckStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Check {
    fn from_result<E: std::fmt::Display>(started: Instant, result: Result<(), E>) -> Self {
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => Self {
                status: CheckStatus::Up,
                latency_ms,
                detail: None,
            },
            Err(e) => Self {
                status: CheckStatus::Down,
                latency_ms,
                detail: Some(e.to_string()),
            },
        }
    }

    fn is_up(&self) -> bool {
        self.status == CheckStatus::Up
    }
}

#[derive(Debug, Serialize)]
pub struct Checks {
    pub database: Check,
    pub storage: Check,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Status,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub checks: Checks,
}

/// Overall status: the database is required, storage only degrades service.
pub fn overall_status(database: &Check, storage: &Check) -> Status {
    match (database.is_up(), storage.is_up()) {
        (false, _) => Status::Unhealthy,
        (true, false) => Status::Degraded,
        (true, true) => Status::Healthy,
    }
}

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
pub async fn livez() -> &'static str {
    "OK"
}

/// GET /health - Active dependency checks.
///
/// Returns 200 when healthy or degraded, 503 when the database is down.
pub async fn health(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let database = Check::from_result(started, state.database.ping().await);

    let started = Instant::now();
    let storage = Check::from_result(started, state.objects.ping().await);

    let status = overall_status(&database, &storage);
    if status != Status::Healthy {
        tracing::warn!(
            ?status,
            database = ?database.detail,
            storage = ?storage.detail,
            "Health check failed"
        );
    }

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: state.clock.now(),
        uptime_seconds: state.uptime_seconds(),
        checks: Checks { database, storage },
    };

    let code = match status {
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        Status::Healthy | Status::Degraded => StatusCode::OK,
    };
    (code, Json(report)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(up: bool) -> Check {
        Check {
            status: if up { CheckStatus::Up } else { CheckStatus::Down },
            latency_ms: 1,
            detail: (!up).then(|| "down".to_string()),
        }
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(overall_status(&check(true), &check(true)), Status::Healthy);
        assert_eq!(overall_status(&check(true), &check(false)), Status::Degraded);
        assert_eq!(overall_status(&check(false), &check(true)), Status::Unhealthy);
        assert_eq!(overall_status(&check(false), &check(false)), Status::Unhealthy);
    }

    #[test]
    fn test_check_serializes_detail_only_when_down() {
        let up = serde_json::to_value(check(true)).unwrap();
        let down = serde_json::to_value(check(false)).unwrap();

        assert_eq!(up["status"], "up");
        assert!(up.get("detail").is_none());
        assert_eq!(down["status"], "down");
        assert_eq!(down["detail"], "down");
    }
}
