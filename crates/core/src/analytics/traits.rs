use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::DateRange;

use super::{HeatmapPoint, Result, SummaryReport};

/// Aggregated views over a user's journal, as exposed to request handlers.
#[async_trait]
pub trait Analytics: Send + Sync {
    /// Per-date entry counts inside `range`, ascending, zero days omitted.
    async fn get_heatmap(&self, user_id: Uuid, range: DateRange) -> Result<Vec<HeatmapPoint>>;

    /// Totals, streaks and tag usage for the dashboard.
    async fn get_summary(&self, user_id: Uuid) -> Result<SummaryReport>;
}
