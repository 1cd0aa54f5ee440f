mod error;
mod heatmap;
mod streaks;
mod summary;
mod traits;
mod types;

pub use error::{AnalyticsError, Result};
pub use heatmap::aggregate_heatmap;
pub use streaks::{compute_streaks, compute_streaks_by_islands};
pub use summary::{pick_most_used_tag, tag_usage};
pub use traits::Analytics;
pub use types::{HeatmapPoint, HeatmapQuery, StreakResult, SummaryReport};
