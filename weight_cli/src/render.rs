//! Text and JSON formatting of reports.

use chrono::NaiveDate;
use std::fmt::Write as _;
use weight_core::{Measurement, Report};

/// "today", "yesterday", "N days ago"; future dates as "tomorrow", "in N days".
pub fn relative_day(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        -1 => "tomorrow".to_string(),
        n if n > 1 => format!("{n} days ago"),
        n => format!("in {} days", -n),
    }
}

fn at(m: &Measurement, today: NaiveDate) -> String {
    format!("{:.1} kg ({})", m.value, relative_day(m.date(), today))
}

/// One line confirming a stored value.
pub fn stored_line(m: &Measurement) -> String {
    format!("{:.1} kg stored at {}.", m.value, m.timestamp.format("%Y-%m-%d %H:%M"))
}

/// Multi-line human summary of `report`.
pub fn report_text(report: &Report) -> String {
    let today = report.generated_at.date_naive();
    let stats = &report.stats;
    let mut out = String::new();

    let Some(latest) = stats.latest else {
        out.push_str("No measurements recorded yet.\n");
        return out;
    };

    if report.skipped_torn_record {
        out.push_str("Note: an incomplete last record in the log was ignored.\n");
    }

    let _ = writeln!(out, "Latest: {}", at(&latest, today));
    if let Some(avg) = stats.average {
        let _ = writeln!(out, "Entries: {}, mean {avg:.1} kg", stats.count);
    }
    match (stats.recent_average, stats.windowed_delta) {
        (Some(mean), Some(delta)) => {
            let _ = writeln!(
                out,
                "Recent mean {mean:.1} kg, change {delta:+.1} kg over the window"
            );
        }
        (Some(mean), None) => {
            let _ = writeln!(out, "Recent mean {mean:.1} kg");
        }
        (None, Some(delta)) => {
            let _ = writeln!(out, "Change {delta:+.1} kg over the window");
        }
        (None, None) => {}
    }

    let shown = report.shown.as_ref().unwrap_or(stats);
    if let Some(e) = shown.extremes {
        let _ = writeln!(
            out,
            "Minimum over the shown period {}, maximum {}",
            at(&e.min, today),
            at(&e.max, today)
        );
    }
    if let Some(pc) = shown.period_change {
        let verb = if pc.lost >= 0.0 { "lost" } else { "gained" };
        let _ = writeln!(
            out,
            "You have {verb} {:.1} kg in {:.0} days",
            pc.lost.abs(),
            pc.span_days
        );
    }

    if let Some(p) = report.projection {
        match p.slope_per_day {
            Some(slope) => {
                let _ = writeln!(out, "Trend: {slope:+.3} kg/day");
            }
            None => out.push_str("Trend: not enough history\n"),
        }
        match (p.feasible, p.eta_date) {
            (true, Some(eta)) => {
                let _ = writeln!(
                    out,
                    "Goal {:.1} kg: projected {eta} ({})",
                    report.target_value,
                    relative_day(eta, today)
                );
            }
            (true, None) => {
                let _ = writeln!(
                    out,
                    "Goal {:.1} kg: reachable, date too far out",
                    report.target_value
                );
            }
            (false, _) => {
                let _ = writeln!(
                    out,
                    "Goal {:.1} kg: not reachable on the current trend",
                    report.target_value
                );
            }
        }
        if let Some(required) = p.required_slope_per_day {
            let status = match p.on_track {
                Some(true) => "on track",
                Some(false) => "behind",
                None => "no projection",
            };
            let _ = writeln!(out, "Target date: {status} (needs {required:+.3} kg/day)");
        }
    }

    if let Some(plan) = report.plan {
        let _ = writeln!(
            out,
            "Plan {:+.1} kg/month: expected {:.1} kg, actual {:.1} kg ({})",
            plan.rate_per_month,
            plan.expected,
            plan.actual,
            if plan.on_plan { "on plan" } else { "off plan" }
        );
    }

    out
}

/// Report as one JSON object.
pub fn report_json(report: &Report) -> eyre::Result<String> {
    Ok(serde_json::to_string(report)?)
}

/// Stored value plus the follow-up report as one JSON object.
pub fn logged_json(stored: &Measurement, report: &Report) -> eyre::Result<String> {
    Ok(serde_json::json!({ "stored": stored, "report": report }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case("2024-05-01", "today")]
    #[case("2024-04-30", "yesterday")]
    #[case("2024-04-21", "10 days ago")]
    #[case("2024-05-02", "tomorrow")]
    #[case("2024-05-31", "in 30 days")]
    fn relative_days(#[case] date: &str, #[case] expected: &str) {
        assert_eq!(relative_day(d(date), d("2024-05-01")), expected);
    }
}
