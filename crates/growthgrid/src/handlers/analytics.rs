//! Analytics handlers: contribution heatmap and summary.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use growthgrid_auth::CurrentUser;
use growthgrid_core::analytics::{HeatmapPoint, HeatmapQuery, SummaryReport};

use crate::{handlers::AppError, state::AppState};

/// Per-day entry counts (GET /analytics/heatmap?start_date=&end_date=).
///
/// A window whose start is after its end yields an empty list.
pub async fn heatmap(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> Result<Json<Vec<HeatmapPoint>>, AppError> {
    let Query(query) = query?;

    let points = state.analytics.get_heatmap(user.id, query.range()).await?;
    Ok(Json(points))
}

/// Totals, streaks and the most used tag (GET /analytics/summary).
pub async fn summary(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SummaryReport>, AppError> {
    let report = state.analytics.get_summary(user.id).await?;
    Ok(Json(report))
}
