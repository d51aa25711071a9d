//! Common day/number helpers for weight_core.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};

/// Number of milliseconds in one day.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days elapsed from `from` to `to` (negative when `to` is earlier).
#[inline]
pub fn fractional_days(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Round to the nearest integer with ties going up (2.5 -> 3, -2.5 -> -2).
/// Non-finite input yields None; out-of-range values saturate.
#[inline]
pub fn round_half_up(x: f64) -> Option<i64> {
    if !x.is_finite() {
        return None;
    }
    Some((x + 0.5).floor() as i64)
}

/// `date + days`, or None when the result is not representable.
#[inline]
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Arithmetic mean; None for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
