//! Linear trend and goal projection.
//!
//! Fits value = intercept + slope * days (ordinary least squares, x in
//! fractional days since the first measurement) and solves the line for the
//! goal weight. Fewer than two distinct x-values means no trend at all.
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::series::Series;
use crate::stats::PeriodChange;
use crate::types::Goal;
use crate::util::{add_days, round_half_up};

/// Days per year and months per year used to turn a monthly rate into a daily one.
const DAYS_PER_YEAR: f64 = 365.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope_per_day: f64,
    /// Fitted value at day 0.
    pub intercept: f64,
    /// Timestamp of the first measurement (day 0).
    pub origin: DateTime<FixedOffset>,
}

impl LinearFit {
    /// Fit the series; None with fewer than two distinct x-values or a
    /// numerically degenerate result.
    pub fn fit(series: &Series) -> Option<Self> {
        let origin = series.first()?.timestamp;
        let pts = series.day_offsets();
        if pts.len() < 2 {
            return None;
        }

        // Centered sums in f64 keep the slope stable for long histories
        let n = pts.len() as f64;
        let mean_x = pts.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = pts.iter().map(|p| p.1).sum::<f64>() / n;
        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        for (px, py) in &pts {
            let x = px - mean_x;
            let y = py - mean_y;
            sxx += x * x;
            sxy += x * y;
        }
        if !sxx.is_finite() || sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        if !slope.is_finite() {
            return None;
        }
        Some(Self {
            slope_per_day: slope,
            intercept: mean_y - slope * mean_x,
            origin,
        })
    }

    /// Fitted value `days` after the origin.
    #[inline]
    pub fn value_at(&self, days: f64) -> f64 {
        self.intercept + self.slope_per_day * days
    }

    /// Days after the origin at which the line reaches `target`; None for a flat line.
    pub fn days_until(&self, target: f64) -> Option<f64> {
        if self.slope_per_day == 0.0 {
            return None;
        }
        let d = (target - self.intercept) / self.slope_per_day;
        d.is_finite().then_some(d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub slope_per_day: Option<f64>,
    pub eta_date: Option<NaiveDate>,
    pub feasible: bool,
    /// Daily change needed to reach the goal by its target date.
    pub required_slope_per_day: Option<f64>,
    /// Whether the projected date falls on or before the target date.
    pub on_track: Option<bool>,
}

impl ProjectionResult {
    fn unreachable() -> Self {
        Self {
            slope_per_day: None,
            eta_date: None,
            feasible: false,
            required_slope_per_day: None,
            on_track: None,
        }
    }

    /// Project when the trend of `series` reaches `goal`, as of `today`.
    pub fn compute(series: &Series, goal: &Goal, today: NaiveDate) -> Self {
        let Some(latest) = series.latest() else {
            return Self::unreachable();
        };
        let gap = goal.target_value - latest.value;
        let required_slope_per_day = goal.target_date.and_then(|d| {
            let days_left = (d - today).num_days();
            (days_left > 0).then(|| gap / days_left as f64)
        });

        let Some(fit) = LinearFit::fit(series) else {
            return Self {
                required_slope_per_day,
                ..Self::unreachable()
            };
        };
        let slope = fit.slope_per_day;

        // Already at the goal: nothing left to project.
        let (feasible, eta_date) = if gap == 0.0 {
            (true, Some(today))
        } else if slope != 0.0 && gap.signum() == slope.signum() {
            let eta = fit
                .days_until(goal.target_value)
                .and_then(round_half_up)
                .and_then(|days| add_days(fit.origin.date_naive(), days))
                .map(|d| d.max(today));
            (true, eta)
        } else {
            (false, None)
        };

        let on_track = match (eta_date, goal.target_date) {
            (Some(eta), Some(target)) => Some(eta <= target),
            _ => None,
        };

        Self {
            slope_per_day: Some(slope),
            eta_date,
            feasible,
            required_slope_per_day,
            on_track,
        }
    }
}

/// Comparison of the recent weight against a planned monthly rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanCheck {
    pub rate_per_month: f64,
    /// Weight the plan expects by the end of the period.
    pub expected: f64,
    /// Mean of the last resample bucket.
    pub actual: f64,
    /// True when the actual weight is at or below the planned line.
    pub on_plan: bool,
}

impl PlanCheck {
    pub fn evaluate(change: &PeriodChange, rate_per_month: f64) -> Self {
        let per_day = MONTHS_PER_YEAR * rate_per_month / DAYS_PER_YEAR;
        let expected = change.first_mean + per_day * change.span_days;
        Self {
            rate_per_month,
            expected,
            actual: change.last_mean,
            on_plan: change.last_mean <= expected,
        }
    }
}
