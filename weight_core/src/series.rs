//! Canonical, time-ordered view of the measurement log.
//!
//! The store returns measurements in write order, possibly with several
//! entries for the same moment. `Series` sorts them by timestamp and keeps one
//! entry per reduction key, the last one written ("I corrected today's entry").
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, Utc};

use crate::types::{Granularity, Measurement};
use crate::util::fractional_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ReductionKey {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

impl ReductionKey {
    fn of(m: &Measurement, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => ReductionKey::Day(m.date()),
            Granularity::Instant => ReductionKey::Instant(m.timestamp.with_timezone(&Utc)),
        }
    }
}

/// Ordered, deduplicated measurements. Iterating borrows, so a series can be
/// walked any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<Measurement>,
}

impl Series {
    /// Reduce a write-ordered sequence: last write wins per key, then sort by timestamp.
    pub fn from_write_order<I>(measurements: I, granularity: Granularity) -> Self
    where
        I: IntoIterator<Item = Measurement>,
    {
        let mut slot: HashMap<ReductionKey, usize> = HashMap::new();
        let mut points: Vec<Measurement> = Vec::new();
        for m in measurements {
            match slot.get(&ReductionKey::of(&m, granularity)) {
                Some(&i) => points[i] = m,
                None => {
                    slot.insert(ReductionKey::of(&m, granularity), points.len());
                    points.push(m);
                }
            }
        }
        // Stable: equal instants keep their write order.
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Measurement> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&Measurement> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|m| m.value)
    }

    /// Measurements taken at or after `boundary`.
    pub fn since(&self, boundary: DateTime<FixedOffset>) -> Series {
        let start = self.points.partition_point(|m| m.timestamp < boundary);
        Series {
            points: self.points[start..].to_vec(),
        }
    }

    /// Measurements within `window` of the latest one (inclusive). Empty for
    /// an empty series; the whole series when the boundary is unrepresentable.
    pub fn trailing(&self, window: TimeDelta) -> Series {
        match self.latest().map(|m| m.timestamp.checked_sub_signed(window)) {
            Some(Some(boundary)) => self.since(boundary),
            Some(None) => self.clone(),
            None => Series::default(),
        }
    }

    /// Last measurement with timestamp `<= boundary` (closest prior).
    pub fn at_or_before(&self, boundary: DateTime<FixedOffset>) -> Option<&Measurement> {
        let end = self.points.partition_point(|m| m.timestamp <= boundary);
        end.checked_sub(1).map(|i| &self.points[i])
    }

    /// `(elapsed days since first measurement, value)` pairs.
    pub fn day_offsets(&self) -> Vec<(f64, f64)> {
        let Some(origin) = self.first().map(|m| m.timestamp) else {
            return Vec::new();
        };
        self.points
            .iter()
            .map(|m| (fractional_days(origin, m.timestamp), m.value))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(ts: &str, v: f64) -> Measurement {
        Measurement::new(DateTime::parse_from_rfc3339(ts).unwrap(), v).unwrap()
    }

    #[test]
    fn day_granularity_keeps_latest_write_for_the_day() {
        let s = Series::from_write_order(
            [
                m("2024-01-02T08:00:00+01:00", 80.0),
                m("2024-01-01T08:00:00+01:00", 81.0),
                m("2024-01-02T07:00:00+01:00", 79.5),
            ],
            Granularity::Day,
        );
        let vals: Vec<f64> = s.values().collect();
        assert_eq!(vals, vec![81.0, 79.5]);
        assert_eq!(s.latest().unwrap().timestamp.to_rfc3339(), "2024-01-02T07:00:00+01:00");
    }

    #[test]
    fn instant_granularity_matches_across_offsets() {
        let s = Series::from_write_order(
            [
                m("2024-01-02T08:00:00+01:00", 80.0),
                m("2024-01-02T07:00:00+00:00", 80.4),
                m("2024-01-02T09:00:00+01:00", 80.2),
            ],
            Granularity::Instant,
        );
        let vals: Vec<f64> = s.values().collect();
        assert_eq!(vals, vec![80.4, 80.2]);
    }

    #[test]
    fn closest_prior_lookup() {
        let s = Series::from_write_order(
            [
                m("2024-01-01T08:00:00Z", 80.0),
                m("2024-01-05T08:00:00Z", 79.0),
            ],
            Granularity::Day,
        );
        let b = DateTime::parse_from_rfc3339("2024-01-04T00:00:00Z").unwrap();
        assert_eq!(s.at_or_before(b).unwrap().value, 80.0);
        let early = DateTime::parse_from_rfc3339("2023-12-31T00:00:00Z").unwrap();
        assert!(s.at_or_before(early).is_none());
        assert_eq!(s.since(b).len(), 1);
    }

    #[test]
    fn trailing_window_ends_at_latest_entry() {
        let s = Series::from_write_order(
            [
                m("2024-01-01T08:00:00Z", 80.0),
                m("2024-01-05T08:00:00Z", 79.0),
                m("2024-01-08T08:00:00Z", 78.0),
            ],
            Granularity::Day,
        );
        let vals: Vec<f64> = s.trailing(TimeDelta::days(3)).values().collect();
        assert_eq!(vals, vec![79.0, 78.0]);
        assert_eq!(s.trailing(TimeDelta::days(30)).len(), 3);
        assert!(Series::default().trailing(TimeDelta::days(7)).is_empty());
    }
}
