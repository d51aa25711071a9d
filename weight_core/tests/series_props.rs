use chrono::{DateTime, FixedOffset, TimeDelta};
use proptest::prelude::*;
use weight_core::{Granularity, Measurement, Series};

fn base() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00+01:00").unwrap()
}

prop_compose! {
    // Write-ordered log: (minutes after base, value), minutes span a few days so keys collide.
    fn log_strategy()(
        entries in prop::collection::vec((0i64..(5 * 24 * 60), 40.0f64..200.0), 0..60),
    ) -> Vec<Measurement> {
        entries
            .into_iter()
            .map(|(min, v)| Measurement::new(base() + TimeDelta::minutes(min), v).unwrap())
            .collect()
    }
}

proptest! {
    #[test]
    fn series_is_sorted_and_unique_per_day(log in log_strategy()) {
        let s = Series::from_write_order(log.clone(), Granularity::Day);
        let pts = s.as_slice();
        prop_assert!(pts.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        prop_assert!(pts.windows(2).all(|w| w[0].date() != w[1].date()));

        // Each surviving entry is the last write for its day.
        for p in pts {
            let last_for_day = log.iter().rev().find(|m| m.date() == p.date()).unwrap();
            prop_assert_eq!(p, last_for_day);
        }
    }

    #[test]
    fn series_iteration_is_restartable(log in log_strategy()) {
        let s = Series::from_write_order(log, Granularity::Instant);
        let a: Vec<f64> = s.iter().map(|m| m.value).collect();
        let b: Vec<f64> = (&s).into_iter().map(|m| m.value).collect();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn empty_log_is_empty_series() {
    let s = Series::from_write_order(Vec::new(), Granularity::Day);
    assert!(s.is_empty());
    assert!(s.latest().is_none());
}

#[test]
fn same_timestamp_keeps_later_write() {
    let t = base();
    let s = Series::from_write_order(
        [
            Measurement::new(t, 80.0).unwrap(),
            Measurement::new(t, 79.4).unwrap(),
        ],
        Granularity::Instant,
    );
    assert_eq!(s.len(), 1);
    assert_eq!(s.latest().unwrap().value, 79.4);
}
