//! Conversions from `weight_config` types to `weight_core` types.

use crate::error::TrackerError;
use crate::report::ReportOptions;
use crate::stats::StatsParams;
use crate::types::{Goal, Granularity};

// ── Goal ─────────────────────────────────────────────────────────────────────

impl TryFrom<&weight_config::GoalCfg> for Goal {
    type Error = TrackerError;

    fn try_from(c: &weight_config::GoalCfg) -> Result<Self, Self::Error> {
        let mut goal = Goal::new(c.target_kg)?;
        goal.target_date = c.target_date;
        goal.rate_per_month = c.rate_per_month;
        Ok(goal)
    }
}

// ── Granularity ──────────────────────────────────────────────────────────────

impl From<weight_config::GranularityCfg> for Granularity {
    fn from(c: weight_config::GranularityCfg) -> Self {
        match c {
            weight_config::GranularityCfg::Day => Granularity::Day,
            weight_config::GranularityCfg::Instant => Granularity::Instant,
        }
    }
}

// ── StatsParams ──────────────────────────────────────────────────────────────

impl From<&weight_config::ReportCfg> for StatsParams {
    fn from(c: &weight_config::ReportCfg) -> Self {
        Self {
            window: c.recent_window,
            resample: c.resample,
        }
    }
}

// ── ReportOptions ────────────────────────────────────────────────────────────

/// Full report: whole history, trend and projection.
impl From<&weight_config::Config> for ReportOptions {
    fn from(c: &weight_config::Config) -> Self {
        Self {
            granularity: c.series.granularity.into(),
            last: None,
            stats: (&c.report).into(),
            project: true,
        }
    }
}

impl ReportOptions {
    /// Short summary printed after a weight is stored: recent history only,
    /// no projection.
    pub fn after_log(c: &weight_config::Config) -> Self {
        Self {
            granularity: c.series.granularity.into(),
            last: Some(c.report.after_log.last),
            stats: StatsParams {
                window: c.report.recent_window,
                resample: c.report.after_log.resample,
            },
            project: false,
        }
    }
}
