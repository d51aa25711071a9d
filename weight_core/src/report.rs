//! The surface exposed to transports: `append` and `get_report`.
use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;
use weight_traits::{Clock, Medium};

use crate::error::Result;
use crate::projection::{PlanCheck, ProjectionResult};
use crate::series::Series;
use crate::stats::{StatsParams, StatsResult};
use crate::store::WeightStore;
use crate::types::{Goal, Granularity, Measurement};

/// Knobs for one report request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    pub granularity: Granularity,
    /// Only history within `last` of the newest entry is shown (extremes,
    /// period change, trend). None shows everything.
    pub last: Option<TimeDelta>,
    pub stats: StatsParams,
    /// Fit the trend and project the goal date.
    pub project: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Day,
            last: None,
            stats: StatsParams::default(),
            project: true,
        }
    }
}

/// Everything a formatter needs, with explicit absent values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<FixedOffset>,
    pub target_value: f64,
    pub stats: StatsResult,
    /// Statistics restricted to the shown history when `last` is set.
    pub shown: Option<StatsResult>,
    pub projection: Option<ProjectionResult>,
    pub plan: Option<PlanCheck>,
    /// A torn trailing record was skipped while loading.
    pub skipped_torn_record: bool,
}

/// One owned store plus the clock that defines "now".
#[derive(Debug)]
pub struct Tracker<M: Medium, C: Clock> {
    store: WeightStore<M>,
    clock: C,
}

impl<M: Medium, C: Clock> Tracker<M, C> {
    pub fn new(store: WeightStore<M>, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &WeightStore<M> {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Record `value` as measured now.
    pub fn append(&self, value: f64) -> Result<Measurement> {
        self.store.append(value, self.clock.now())
    }

    /// Record `value` at an explicit time (back-dated corrections).
    pub fn append_at(&self, value: f64, at: DateTime<FixedOffset>) -> Result<Measurement> {
        self.store.append(value, at)
    }

    /// Load the store into a fresh series.
    pub fn series(&self, granularity: Granularity) -> Result<(Series, bool)> {
        let outcome = self.store.load_all()?;
        if let Some(tail) = outcome.torn_tail {
            tracing::warn!(
                store = %self.store.medium().describe(),
                line = tail.line,
                bytes = tail.bytes,
                "skipped torn trailing record"
            );
        }
        Ok((
            Series::from_write_order(outcome.measurements, granularity),
            outcome.torn_tail.is_some(),
        ))
    }

    /// Build a report against `goal`. Only store failures are errors; an
    /// empty history yields a report with absent values.
    pub fn get_report(&self, goal: &Goal, options: &ReportOptions) -> Result<Report> {
        let now = self.clock.now();
        let (series, skipped_torn_record) = self.series(options.granularity)?;

        let stats = StatsResult::compute(&series, now, &options.stats);
        let shown_series = match options.last {
            Some(w) => series.trailing(w),
            None => series.clone(),
        };
        let shown = options
            .last
            .map(|_| StatsResult::compute(&shown_series, now, &options.stats));

        let projection = options
            .project
            .then(|| ProjectionResult::compute(&shown_series, goal, now.date_naive()));

        let period = shown.as_ref().unwrap_or(&stats).period_change;
        let plan = match (options.project, goal.rate_per_month, period) {
            (true, Some(rate), Some(change)) => Some(PlanCheck::evaluate(&change, rate)),
            _ => None,
        };

        tracing::debug!(
            count = stats.count,
            shown = shown_series.len(),
            feasible = ?projection.map(|p| p.feasible),
            "report computed"
        );

        Ok(Report {
            generated_at: now,
            target_value: goal.target_value,
            stats,
            shown,
            projection,
            plan,
            skipped_torn_record,
        })
    }
}
