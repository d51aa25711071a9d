//! Descriptive statistics over a `Series` as of a given "now".
//!
//! Every quantity that can be missing is an `Option`: "no data" and
//! "insufficient history" are expected states, not failures. The one operation
//! that fails is [`latest`], with `NoData` on an empty series.
use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;

use crate::error::{Result, TrackerError};
use crate::series::Series;
use crate::types::Measurement;
use crate::util::{fractional_days, mean};

/// Windows used by [`StatsResult::compute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsParams {
    /// Look-back for the windowed delta and the recent mean.
    pub window: TimeDelta,
    /// Bucket width for the period change.
    pub resample: TimeDelta,
}

impl Default for StatsParams {
    fn default() -> Self {
        Self {
            window: TimeDelta::days(7),
            resample: TimeDelta::days(7),
        }
    }
}

/// Lowest and highest measurement; ties resolve to the earliest occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub min: Measurement,
    pub max: Measurement,
}

/// Change between the first and last resample bucket of a series.
///
/// Buckets are fixed-width spans anchored at the first measurement, not
/// calendar weeks or months, so the first bucket always starts with data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodChange {
    pub first_mean: f64,
    pub last_mean: f64,
    /// `first_mean - last_mean`; positive when weight was lost.
    pub lost: f64,
    /// Days between the first and last measurement.
    pub span_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResult {
    pub latest: Option<Measurement>,
    pub count: usize,
    pub average: Option<f64>,
    pub windowed_delta: Option<f64>,
    pub recent_average: Option<f64>,
    pub extremes: Option<Extremes>,
    pub period_change: Option<PeriodChange>,
}

impl StatsResult {
    /// Compute every statistic over `series` as of `now`.
    pub fn compute(series: &Series, now: DateTime<FixedOffset>, params: &StatsParams) -> Self {
        Self {
            latest: series.latest().copied(),
            count: series.len(),
            average: average(series),
            windowed_delta: windowed_delta(series, now, params.window),
            recent_average: recent_average(series, params.window),
            extremes: extremes(series),
            period_change: period_change(series, params.resample),
        }
    }
}

/// Most recent measurement.
pub fn latest(series: &Series) -> Result<Measurement> {
    series.latest().copied().ok_or(TrackerError::NoData)
}

/// Arithmetic mean of all values; None when empty.
pub fn average(series: &Series) -> Option<f64> {
    mean(series.values())
}

/// Latest value minus the value of the closest measurement at or before
/// `now - window`. None when the history does not reach back that far.
pub fn windowed_delta(
    series: &Series,
    now: DateTime<FixedOffset>,
    window: TimeDelta,
) -> Option<f64> {
    let latest = series.latest()?;
    let prior = series.at_or_before(now.checked_sub_signed(window)?)?;
    Some(latest.value - prior.value)
}

/// Mean of the measurements taken within `window` before the latest one.
/// The window follows the data, so a logging gap does not empty it.
pub fn recent_average(series: &Series, window: TimeDelta) -> Option<f64> {
    mean(series.trailing(window).values())
}

pub fn extremes(series: &Series) -> Option<Extremes> {
    let first = *series.first()?;
    let (min, max) = series.iter().fold((first, first), |(lo, hi), m| {
        (
            if m.value < lo.value { *m } else { lo },
            if m.value > hi.value { *m } else { hi },
        )
    });
    Some(Extremes { min, max })
}

/// Bucket the series into `resample`-wide bins anchored at the first
/// measurement and compare the first and last bucket means.
pub fn period_change(series: &Series, resample: TimeDelta) -> Option<PeriodChange> {
    let first = series.first()?;
    let last = series.latest()?;
    let width_days = resample.num_milliseconds() as f64 / crate::util::MILLIS_PER_DAY;
    if !(width_days > 0.0) {
        return None;
    }

    let bucket = |m: &Measurement| {
        (fractional_days(first.timestamp, m.timestamp) / width_days).floor() as i64
    };
    let last_bucket = bucket(last);

    let first_mean = mean(series.iter().filter(|m| bucket(m) == 0).map(|m| m.value))?;
    let last_mean = mean(
        series
            .iter()
            .filter(|m| bucket(m) == last_bucket)
            .map(|m| m.value),
    )?;

    Some(PeriodChange {
        first_mean,
        last_mean,
        lost: first_mean - last_mean,
        span_days: fractional_days(first.timestamp, last.timestamp),
    })
}
