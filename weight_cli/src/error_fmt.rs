//! Human-readable error descriptions and structured JSON error formatting.

use weight_core::TrackerError;

/// Marker for a value rejected by the `[input]` plausibility band.
#[derive(Debug)]
pub struct OutOfBand {
    pub value: f64,
    pub min_kg: f64,
    pub max_kg: f64,
}

impl std::fmt::Display for OutOfBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "weight {} kg is outside the accepted range {}..{} kg",
            self.value, self.min_kg, self.max_kg
        )
    }
}

impl std::error::Error for OutOfBand {}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ob) = err.downcast_ref::<OutOfBand>() {
        return format!(
            "What happened: {ob}.\nLikely causes: A typo, or a value in another unit.\nHow to fix: Re-enter the weight in kg, pass --force to store it anyway, or widen [input] in the config."
        );
    }

    if let Some(te) = err.downcast_ref::<TrackerError>() {
        return match te {
            TrackerError::InvalidValue(v) => format!(
                "What happened: {v} is not a usable weight.\nLikely causes: Zero, a negative number, or a non-numeric value.\nHow to fix: Pass a positive weight in kg, e.g. `weightlog log 81.4`."
            ),
            TrackerError::StoreUnavailable(msg) => format!(
                "What happened: The measurement log could not be used ({msg}).\nLikely causes: The file does not exist yet, lacks permissions, or holds a damaged record.\nHow to fix: Run `weightlog init`, check store.path in the config, or repair the reported line."
            ),
            TrackerError::NoData => "What happened: Nothing has been logged yet.\nLikely causes: A fresh or empty measurement log.\nHow to fix: Log a weight first, e.g. `weightlog log 81.4`.".to_string(),
        };
    }

    // String-based heuristics for errors coming from config or argument parsing
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file. Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains("must be") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: A missing [store] or [goal] section, or an out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("invalid timestamp") {
        return format!(
            "What happened: {msg}.\nHow to fix: Use RFC 3339, e.g. 2024-05-01T07:30:00+02:00."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<OutOfBand>().is_some() {
        return 3;
    }
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::InvalidValue(_)) => 3,
        Some(TrackerError::StoreUnavailable(_)) => 4,
        Some(TrackerError::NoData) => 5,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<OutOfBand>().is_some() {
        return "OutOfRange";
    }
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::InvalidValue(_)) => "InvalidValue",
        Some(TrackerError::StoreUnavailable(_)) => "StoreUnavailable",
        Some(TrackerError::NoData) => "NoData",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    });
    if let Some(ob) = err.downcast_ref::<OutOfBand>() {
        obj["details"] = json!({ "value": ob.value, "min_kg": ob.min_kg, "max_kg": ob.max_kg });
    }
    obj.to_string()
}
