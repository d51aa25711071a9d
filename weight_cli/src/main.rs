mod cli;
mod error_fmt;
mod logging;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use clap::Parser;
use eyre::WrapErr;
use weight_core::mocks::FixedClock;
use weight_core::{Goal, ReportOptions, Tracker, WeightStore, stats};
use weight_traits::{Clock, Medium, SystemClock};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{OutOfBand, exit_code_for_error, format_error_json, humanize};

/// Pins "now" for reproducible runs (RFC 3339).
const NOW_ENV: &str = "WEIGHTLOG_NOW";

type CliTracker = Tracker<weight_core::FileMedium, Arc<dyn Clock>>;

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = weight_config::load_path(&cli.config)?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "warn".to_string());
    logging::init(&level, cli.json, &cfg.logging);

    let store_path: PathBuf = cli.store.clone().unwrap_or_else(|| cfg.store.path.clone());
    tracing::debug!(
        config = %cli.config.display(),
        store = %store_path.display(),
        "configuration loaded"
    );

    let tracker = Tracker::new(WeightStore::open(store_path), clock()?);

    match cli.cmd {
        Commands::Init => {
            let created = tracker.store().init()?;
            let path = tracker.store().medium().describe();
            if cli.json {
                println!("{}", serde_json::json!({ "store": path, "created": created }));
            } else if created {
                println!("Created {path}");
            } else {
                println!("{path} already holds data; left untouched");
            }
            Ok(())
        }
        Commands::Log { value, at, force } => {
            if !force && !cfg.input.accepts(value) {
                return Err(OutOfBand {
                    value,
                    min_kg: cfg.input.min_kg,
                    max_kg: cfg.input.max_kg,
                }
                .into());
            }
            let stored = match at.as_deref() {
                Some(s) => tracker.append_at(value, parse_at(s, tracker.clock().now())?)?,
                None => tracker.append(value)?,
            };
            tracing::info!(value = stored.value, at = %stored.timestamp, "weight logged");

            let goal = Goal::try_from(&cfg.goal)?;
            let report = tracker
                .get_report(&goal, &ReportOptions::after_log(&cfg))
                .wrap_err("stored, but the summary could not be built")?;
            if cli.json {
                println!("{}", render::logged_json(&stored, &report)?);
            } else {
                println!("{}", render::stored_line(&stored));
                print!("{}", render::report_text(&report));
            }
            Ok(())
        }
        Commands::Latest => print_latest(&tracker, &cfg, cli.json),
        Commands::Stats {
            last,
            resample,
            no_projection,
        } => {
            let mut options = ReportOptions::from(&cfg);
            options.last = last.as_deref().map(weight_config::parse_window).transpose()?;
            if let Some(r) = resample.as_deref() {
                options.stats.resample = weight_config::parse_window(r)?;
            }
            options.project = !no_projection;

            let goal = Goal::try_from(&cfg.goal)?;
            let report = tracker.get_report(&goal, &options)?;
            if cli.json {
                println!("{}", render::report_json(&report)?);
            } else {
                print!("{}", render::report_text(&report));
            }
            Ok(())
        }
    }
}

fn print_latest(tracker: &CliTracker, cfg: &weight_config::Config, json: bool) -> eyre::Result<()> {
    let (series, _) = tracker.series(cfg.series.granularity.into())?;
    let latest = stats::latest(&series)?;
    if json {
        println!("{}", serde_json::to_string(&latest)?);
    } else {
        let today = tracker.clock().today();
        println!(
            "{:.1} kg ({})",
            latest.value,
            render::relative_day(latest.date(), today)
        );
    }
    Ok(())
}

fn clock() -> eyre::Result<Arc<dyn Clock>> {
    match std::env::var(NOW_ENV) {
        Ok(s) => {
            let fixed = FixedClock::parse(&s)
                .ok_or_else(|| eyre::eyre!("invalid timestamp in {NOW_ENV}: '{s}'"))?;
            Ok(Arc::new(fixed))
        }
        Err(_) => Ok(Arc::new(SystemClock::new())),
    }
}

/// RFC 3339, or a bare date taken as noon in the offset of `now`.
fn parse_at(s: &str, now: DateTime<FixedOffset>) -> eyre::Result<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s.trim()) {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| eyre::eyre!("invalid timestamp '{s}' for --at"))?;
    date.and_time(NaiveTime::MIN + chrono::TimeDelta::hours(12))
        .and_local_timezone(*now.offset())
        .single()
        .ok_or_else(|| eyre::eyre!("invalid timestamp '{s}' for --at"))
}
