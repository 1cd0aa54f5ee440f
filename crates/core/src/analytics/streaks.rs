//! Consecutive-day streak detection.
//!
//! [`compute_streaks`] is the reference algorithm. [`compute_streaks_by_islands`]
//! is the "islands and gaps" formulation the SQL backend mirrors; both must
//! agree on every input.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use super::StreakResult;

/// Computes the current and longest streak over `dates` as of `today`.
///
/// Duplicates and ordering in `dates` do not matter. The current streak is
/// anchored on `today` if it carries an entry, otherwise on yesterday if that
/// does (a user who has not written yet today keeps their streak), otherwise
/// it is zero.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use growthgrid_core::analytics::compute_streaks;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let dates = [today, today.pred_opt().unwrap()];
///
/// let streaks = compute_streaks(&dates, today);
/// assert_eq!(streaks.current_streak, 2);
/// assert_eq!(streaks.longest_streak, 2);
/// ```
pub fn compute_streaks<'a, I>(dates: I, today: NaiveDate) -> StreakResult
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let dates: BTreeSet<NaiveDate> = dates.into_iter().copied().collect();

    StreakResult {
        current_streak: current_run(&dates, today),
        longest_streak: longest_run(&dates),
    }
}

/// Same contract as [`compute_streaks`], computed by grouping dates into islands.
///
/// Each distinct date, in ascending order, gets the key `day_number - rank`.
/// Consecutive dates share a key, so each key is one run.
pub fn compute_streaks_by_islands<'a, I>(dates: I, today: NaiveDate) -> StreakResult
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let dates: BTreeSet<NaiveDate> = dates.into_iter().copied().collect();

    let mut islands: BTreeMap<i64, Island> = BTreeMap::new();
    for (rank, date) in dates.iter().enumerate() {
        let key = i64::from(date.num_days_from_ce()) - rank as i64;
        islands
            .entry(key)
            .and_modify(|island| {
                island.end = *date;
                island.len += 1;
            })
            .or_insert(Island {
                start: *date,
                end: *date,
                len: 1,
            });
    }

    let longest_streak = islands.values().map(|island| island.len).max().unwrap_or(0);

    let anchor = streak_anchor(&dates, today);
    let current_streak = anchor
        .and_then(|anchor| {
            islands
                .values()
                .find(|island| island.start <= anchor && anchor <= island.end)
                .map(|island| (anchor - island.start).num_days() as u32 + 1)
        })
        .unwrap_or(0);

    StreakResult {
        current_streak,
        longest_streak,
    }
}

struct Island {
    start: NaiveDate,
    end: NaiveDate,
    len: u32,
}

/// Today if present, else yesterday if present.
fn streak_anchor(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    if dates.contains(&today) {
        return Some(today);
    }
    today.pred_opt().filter(|yesterday| dates.contains(yesterday))
}

fn current_run(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(mut day) = streak_anchor(dates, today) else {
        return 0;
    };

    let mut run = 0;
    while dates.contains(&day) {
        run += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    run
}

fn longest_run(sorted: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in sorted {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}
