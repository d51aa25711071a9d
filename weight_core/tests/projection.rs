use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use proptest::prelude::*;
use rstest::rstest;
use weight_core::{Goal, Granularity, LinearFit, Measurement, ProjectionResult, Series};

fn day(n: i64) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-01T08:00:00+01:00").unwrap() + TimeDelta::days(n)
}

fn date(n: i64) -> NaiveDate {
    day(n).date_naive()
}

fn series(points: &[(i64, f64)]) -> Series {
    Series::from_write_order(
        points
            .iter()
            .map(|&(d, v)| Measurement::new(day(d), v).unwrap()),
        Granularity::Day,
    )
}

#[rstest]
fn falling_trend_projects_goal_date() {
    let s = series(&[(0, 80.0), (10, 78.0)]);
    let p = ProjectionResult::compute(&s, &Goal::new(75.0).unwrap(), date(10));
    let slope = p.slope_per_day.unwrap();
    assert!((slope + 0.2).abs() < 1e-12, "slope {slope}");
    assert!(p.feasible);
    assert_eq!(p.eta_date, Some(date(25)));
}

#[rstest]
fn rising_trend_away_from_goal_is_infeasible() {
    let s = series(&[(0, 80.0), (10, 82.0)]);
    let p = ProjectionResult::compute(&s, &Goal::new(75.0).unwrap(), date(10));
    assert!(!p.feasible);
    assert_eq!(p.eta_date, None);
    assert!(p.slope_per_day.unwrap() > 0.0);
}

#[rstest]
#[case(&[(0, 80.0)])]
#[case(&[])]
fn fewer_than_two_points_has_no_trend(#[case] points: &[(i64, f64)]) {
    let p = ProjectionResult::compute(&series(points), &Goal::new(75.0).unwrap(), date(0));
    assert_eq!(p.slope_per_day, None);
    assert_eq!(p.eta_date, None);
    assert!(!p.feasible);
}

#[rstest]
fn one_distinct_instant_after_reduction_has_no_trend() {
    let t = day(0);
    let s = Series::from_write_order(
        [
            Measurement::new(t, 80.0).unwrap(),
            Measurement::new(t, 81.0).unwrap(),
        ],
        Granularity::Instant,
    );
    assert!(LinearFit::fit(&s).is_none());
    let p = ProjectionResult::compute(&s, &Goal::new(75.0).unwrap(), date(0));
    assert!(!p.feasible);
}

#[rstest]
fn flat_trend_never_reaches_a_different_goal() {
    let s = series(&[(0, 80.0), (5, 80.0), (10, 80.0)]);
    let p = ProjectionResult::compute(&s, &Goal::new(75.0).unwrap(), date(10));
    assert_eq!(p.slope_per_day, Some(0.0));
    assert!(!p.feasible);
    assert_eq!(p.eta_date, None);
}

#[rstest]
fn eta_in_the_past_is_clamped_to_today() {
    // Noisy history: the fitted line crosses 78.5 around day 11, but today is day 20
    let s = series(&[(0, 81.0), (10, 76.0), (20, 78.9)]);
    let p = ProjectionResult::compute(&s, &Goal::new(78.5).unwrap(), date(20));
    assert!(p.feasible);
    assert_eq!(p.eta_date, Some(date(20)));
}

#[rstest]
fn eta_rounds_half_up() {
    // slope -0.5/day from 80: 78.75 is reached at day 2.5 -> day 3
    let s = series(&[(0, 80.0), (1, 79.5)]);
    let p = ProjectionResult::compute(&s, &Goal::new(78.75).unwrap(), date(1));
    assert_eq!(p.eta_date, Some(date(3)));
}

#[rstest]
fn target_date_drives_required_slope_and_on_track() {
    let s = series(&[(0, 80.0), (10, 78.0)]);
    let goal = Goal::new(75.0).unwrap().with_target_date(date(40));
    let p = ProjectionResult::compute(&s, &goal, date(10));
    assert_eq!(p.on_track, Some(true));
    let req = p.required_slope_per_day.unwrap();
    assert!((req + 0.1).abs() < 1e-12);

    let tight = Goal::new(75.0).unwrap().with_target_date(date(20));
    let p = ProjectionResult::compute(&s, &tight, date(10));
    assert_eq!(p.on_track, Some(false));

    let past = Goal::new(75.0).unwrap().with_target_date(date(5));
    let p = ProjectionResult::compute(&s, &past, date(10));
    assert_eq!(p.required_slope_per_day, None);
}

#[rstest]
fn sub_day_timestamps_use_fractional_days() {
    let base = day(0);
    let s = Series::from_write_order(
        [
            Measurement::new(base, 80.0).unwrap(),
            Measurement::new(base + TimeDelta::hours(12), 79.9).unwrap(),
        ],
        Granularity::Instant,
    );
    let fit = LinearFit::fit(&s).unwrap();
    assert!((fit.slope_per_day + 0.2).abs() < 1e-9);
}

proptest! {
    #[test]
    fn exact_line_is_recovered(
        slope in -0.5f64..-0.01,
        start in 70.0f64..120.0,
        days in prop::collection::btree_set(0i64..200, 2..30),
    ) {
        let pts: Vec<(i64, f64)> = days.iter().map(|&d| (d, start + slope * d as f64)).collect();
        prop_assume!(pts.iter().all(|p| p.1 > 0.0));
        let fit = LinearFit::fit(&series(&pts)).unwrap();
        prop_assert!((fit.slope_per_day - slope).abs() < 1e-9);
        prop_assert!((fit.intercept - start).abs() < 1e-6);
    }

    #[test]
    fn feasible_iff_moving_toward_goal(
        slope in prop_oneof![-0.5f64..-0.01, 0.01f64..0.5],
        target in 50.0f64..150.0,
    ) {
        let pts = [(0, 100.0), (10, 100.0 + slope * 10.0)];
        let s = series(&pts);
        let latest = pts[1].1;
        prop_assume!(latest != target);
        let p = ProjectionResult::compute(&s, &Goal::new(target).unwrap(), date(10));
        let toward = (target - latest).signum() == slope.signum();
        prop_assert_eq!(p.feasible, toward);
        if !toward {
            prop_assert!(p.eta_date.is_none());
        } else {
            prop_assert!(p.eta_date.map(|d| d >= date(10)).unwrap_or(false));
        }
    }
}
