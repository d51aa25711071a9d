//! Value types shared by the store, the series reader and the engines.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::error::{Result, TrackerError};

/// One timestamped weight value. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub timestamp: DateTime<FixedOffset>,
    pub value: f64,
}

impl Measurement {
    /// Build a measurement, rejecting values that are not finite and > 0.
    pub fn new(timestamp: DateTime<FixedOffset>, value: f64) -> Result<Self> {
        Ok(Self {
            timestamp,
            value: validate_value(value)?,
        })
    }

    /// Calendar date in the offset the measurement was taken in.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Accept only finite, strictly positive weights.
#[inline]
pub fn validate_value(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TrackerError::InvalidValue(value))
    }
}

/// Target the projection compares against. Supplied by configuration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub target_value: f64,
    pub target_date: Option<NaiveDate>,
    /// Planned rate of change in kg per month (negative to lose weight).
    pub rate_per_month: Option<f64>,
}

impl Goal {
    pub fn new(target_value: f64) -> Result<Self> {
        Ok(Self {
            target_value: validate_value(target_value)?,
            target_date: None,
            rate_per_month: None,
        })
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    pub fn with_rate_per_month(mut self, rate: f64) -> Self {
        self.rate_per_month = Some(rate);
        self
    }
}

/// Key used when collapsing measurements that describe the same moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    /// One measurement per local calendar day.
    #[default]
    Day,
    /// One measurement per exact instant.
    Instant,
}
