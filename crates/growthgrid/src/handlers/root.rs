//! API manifest served at the root.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Where each group of routes lives.
#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub auth: &'static str,
    pub entries: &'static str,
    pub uploads: &'static str,
    pub analytics: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Endpoints,
}

/// Handler for GET /
pub async fn manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json(Manifest {
        name: "GrowthGrid API",
        description: "A personal learning journal: track your daily growth.",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: state.clock.now(),
        endpoints: Endpoints {
            health: "/health",
            auth: "/auth",
            entries: "/entries",
            uploads: "/uploads",
            analytics: "/analytics",
        },
    })
}
