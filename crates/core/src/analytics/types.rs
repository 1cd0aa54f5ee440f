use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::serde::deserialize_optional_date;
use crate::storage::DateRange;

/// Number of entries written on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub date: NaiveDate,
    pub count: u64,
}

impl HeatmapPoint {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }
}

/// Current and longest run of consecutive journaling days.
///
/// `longest_streak >= current_streak` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Dashboard metrics for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_entries: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub most_used_tag: Option<String>,
    pub entries_this_month: u64,
}

impl SummaryReport {
    /// The report for a user with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn assemble(
        total_entries: u64,
        streaks: StreakResult,
        most_used_tag: Option<String>,
        entries_this_month: u64,
    ) -> Self {
        Self {
            total_entries,
            current_streak: streaks.current_streak,
            longest_streak: streaks.longest_streak,
            most_used_tag,
            entries_this_month,
        }
    }
}

/// Query parameters accepted by the heatmap endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct HeatmapQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl HeatmapQuery {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}
