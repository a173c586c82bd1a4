//! Reduces the dense 3-hourly forecast to one reading per day.
//!
//! The daily reading is whatever sample opens each 8-sample block, so it is
//! anchored to the series start time rather than to local midnight.

use crate::model::{DailyForecastEntry, ForecastSample};

/// Samples per day at a 3-hour interval.
pub const SAMPLES_PER_DAY: usize = 8;

/// Upper bound on the number of daily entries.
pub const MAX_DAYS: usize = 7;

/// Pick indices 0, 8, 16, … and keep at most [`MAX_DAYS`] of them.
///
/// The returned iterator is lazy and `Clone`, so it can be walked more than once.
pub fn sample(
    series: &[ForecastSample],
) -> impl Iterator<Item = DailyForecastEntry<'_>> + Clone + '_ {
    series.iter().step_by(SAMPLES_PER_DAY).take(MAX_DAYS)
}

/// The first `n` samples, used for the hourly strip.
pub fn next_hours(series: &[ForecastSample], n: usize) -> &[ForecastSample] {
    &series[..n.min(series.len())]
}
