#![no_main]
use libfuzzer_sys::fuzz_target;
use weight_core::{Granularity, Series, store::parse_records};

fuzz_target!(|data: &[u8]| {
    let Ok(outcome) = parse_records(data) else {
        return;
    };
    // Every value that survives parsing is a usable weight
    assert!(outcome.measurements.iter().all(|m| m.value.is_finite() && m.value > 0.0));
    if let Some(tail) = outcome.torn_tail {
        assert!(tail.bytes > 0 && !data.ends_with(b"\n"));
    }
    let series = Series::from_write_order(outcome.measurements, Granularity::Day);
    assert!(series.as_slice().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
});
