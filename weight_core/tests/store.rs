use std::fs;
use std::io::Write;

use chrono::{DateTime, FixedOffset, TimeDelta};
use proptest::prelude::*;
use rstest::rstest;
use tempfile::tempdir;
use weight_core::mocks::MemoryMedium;
use weight_core::store::HEADER;
use weight_core::{TornTail, TrackerError, WeightStore};

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

#[rstest]
fn append_then_load_preserves_write_order() {
    let dir = tempdir().unwrap();
    let store = WeightStore::open(dir.path().join("weights.csv"));
    store.append(81.2, ts("2024-02-02T08:00:00+01:00")).unwrap();
    store.append(81.9, ts("2024-02-01T08:00:00+01:00")).unwrap();
    store.append(80.7, ts("2024-02-03T08:00:00+01:00")).unwrap();

    let first = store.load_all().unwrap();
    let values: Vec<f64> = first.measurements.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![81.2, 81.9, 80.7]);
    assert!(first.torn_tail.is_none());

    // Rereading is idempotent
    assert_eq!(store.load_all().unwrap(), first);

    let text = fs::read_to_string(dir.path().join("weights.csv")).unwrap();
    assert!(text.starts_with("timestamp,weight\n"));
    assert_eq!(text.lines().count(), 4);
}

#[rstest]
#[case(0.0)]
#[case(-3.2)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn invalid_values_leave_store_unchanged(#[case] value: f64) {
    let medium = MemoryMedium::with_contents(format!("{HEADER}\n2024-01-01T08:00:00Z,80\n"));
    let store = WeightStore::new(medium);
    let before = store.medium().contents();

    let err = store
        .append(value, ts("2024-01-02T08:00:00Z"))
        .expect_err("non-positive weight must be rejected");
    assert!(matches!(err, TrackerError::InvalidValue(_)));
    assert_eq!(store.medium().contents(), before);
}

#[rstest]
fn missing_file_is_unavailable_but_empty_file_is_not() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = WeightStore::open(&path).load_all().expect_err("missing store");
    assert!(matches!(err, TrackerError::StoreUnavailable(_)));

    fs::File::create(&path).unwrap();
    let out = WeightStore::open(&path).load_all().unwrap();
    assert!(out.measurements.is_empty());
}

#[rstest]
fn init_writes_header_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weights.csv");
    let store = WeightStore::open(&path);
    assert!(store.init().unwrap());
    assert!(!store.init().unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "timestamp,weight\n");
    assert_eq!(store.load_all().unwrap().measurements.len(), 0);
}

#[rstest]
fn first_append_creates_header() {
    let store = WeightStore::new(MemoryMedium::missing());
    store.append(90.0, ts("2024-01-01T08:00:00Z")).unwrap();
    let text = String::from_utf8(store.medium().contents()).unwrap();
    assert_eq!(text, "timestamp,weight\n2024-01-01T08:00:00+00:00,90\n");
}

#[rstest]
fn torn_tail_is_skipped_then_cut_on_next_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weights.csv");
    {
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "timestamp,weight").unwrap();
        writeln!(f, "2024-01-01T08:00:00+01:00,80.1").unwrap();
        write!(f, "2024-01-02T08:00:00+01:00,7").unwrap();
    }
    let store = WeightStore::open(&path);
    let out = store.load_all().unwrap();
    assert_eq!(out.measurements.len(), 1);
    assert_eq!(out.torn_tail, Some(TornTail { line: 3, bytes: 27 }));

    store.append(79.8, ts("2024-01-02T09:00:00+01:00")).unwrap();
    let out = store.load_all().unwrap();
    let values: Vec<f64> = out.measurements.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![80.1, 79.8]);
    assert!(out.torn_tail.is_none());
}

#[rstest]
fn torn_header_is_rewritten_on_append() {
    let store = WeightStore::new(MemoryMedium::with_contents("timesta"));
    store.append(80.0, ts("2024-01-01T08:00:00Z")).unwrap();
    let out = store.load_all().unwrap();
    assert_eq!(out.measurements.len(), 1);
}

#[rstest]
#[case("raw,grams\n100,0.0\n", "header")]
#[case("timestamp,weight\nyesterday,80\n2024-01-01T08:00:00Z,80\n", "line 2")]
#[case("timestamp,weight\n2024-01-01T08:00:00Z,abc\n2024-01-02T08:00:00Z,80\n", "line 2")]
#[case("timestamp,weight\n2024-01-01T08:00:00Z,-80\n", "not positive")]
fn corrupt_complete_records_are_unavailable(#[case] image: &str, #[case] needle: &str) {
    let store = WeightStore::new(MemoryMedium::with_contents(image));
    let err = store.load_all().expect_err("corrupt store must not load");
    match err {
        TrackerError::StoreUnavailable(msg) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn medium_failures_map_to_unavailable() {
    let store = WeightStore::new(MemoryMedium::new());
    store.medium().set_fail_reads(true);
    assert!(matches!(
        store.load_all(),
        Err(TrackerError::StoreUnavailable(_))
    ));
    store.medium().set_fail_reads(false);
    store.medium().set_fail_writes(true);
    assert!(matches!(
        store.append(80.0, ts("2024-01-01T08:00:00Z")),
        Err(TrackerError::StoreUnavailable(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Any finite positive value, subnormals included, survives a write and reads back bit-exact
    #[test]
    fn stored_values_read_back_exactly(
        values in prop::collection::vec(
            prop::num::f64::POSITIVE | prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL,
            1..16,
        )
    ) {
        let store = WeightStore::new(MemoryMedium::new());
        let start = ts("2024-01-01T08:00:00+01:00");
        for (i, v) in values.iter().enumerate() {
            store.append(*v, start + TimeDelta::hours(i as i64)).unwrap();
        }

        let first = store.load_all().unwrap();
        let read: Vec<u64> = first.measurements.iter().map(|m| m.value.to_bits()).collect();
        let written: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(read, written);
        prop_assert!(first.torn_tail.is_none());
        prop_assert_eq!(store.load_all().unwrap(), first);
    }
}
