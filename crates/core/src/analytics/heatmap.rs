use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::storage::DateRange;

use super::HeatmapPoint;

/// Counts entries per date inside `range`.
///
/// Takes one date per entry. The result is sorted ascending and sparse: days
/// without entries are left out. A vacuous range yields an empty series.
pub fn aggregate_heatmap<I>(entry_dates: I, range: &DateRange) -> Vec<HeatmapPoint>
where
    I: IntoIterator<Item = NaiveDate>,
{
    if range.is_vacuous() {
        return Vec::new();
    }

    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for date in entry_dates.into_iter().filter(|date| range.contains(*date)) {
        *counts.entry(date).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, count)| HeatmapPoint::new(date, count))
        .collect()
}
