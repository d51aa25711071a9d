#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the weight tracker.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Windows ("7d", "2w", "12h") are parsed into `chrono::TimeDelta`.
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeDelta};
use serde::Deserialize;
use serde::de::Deserializer;

/// Longest accepted window (100 years).
const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize)]
pub struct StoreCfg {
    /// CSV file holding the measurement log.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct GoalCfg {
    pub target_kg: f64,
    /// Accepts a quoted "YYYY-MM-DD" string or a bare TOML date.
    #[serde(default, deserialize_with = "de_opt_date")]
    pub target_date: Option<NaiveDate>,
    /// Planned change in kg per month (negative to lose weight).
    #[serde(default)]
    pub rate_per_month: Option<f64>,
}

/// Plausibility band the transport applies before storing a number.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    pub min_kg: f64,
    pub max_kg: f64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            min_kg: 50.0,
            max_kg: 150.0,
        }
    }
}

impl InputCfg {
    /// True when `kg` lies strictly inside the band.
    pub fn accepts(&self, kg: f64) -> bool {
        kg > self.min_kg && kg < self.max_kg
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportCfg {
    /// Window for the recent mean and the windowed delta.
    #[serde(deserialize_with = "de_window")]
    pub recent_window: TimeDelta,
    /// Bucket width for the period change.
    #[serde(deserialize_with = "de_window")]
    pub resample: TimeDelta,
    /// Short report printed after each stored weight.
    pub after_log: AfterLogCfg,
}

impl Default for ReportCfg {
    fn default() -> Self {
        Self {
            recent_window: TimeDelta::days(7),
            resample: TimeDelta::days(7),
            after_log: AfterLogCfg::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AfterLogCfg {
    /// History shown after logging.
    #[serde(deserialize_with = "de_window")]
    pub last: TimeDelta,
    #[serde(deserialize_with = "de_window")]
    pub resample: TimeDelta,
}

impl Default for AfterLogCfg {
    fn default() -> Self {
        Self {
            last: TimeDelta::days(100),
            resample: TimeDelta::days(10),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GranularityCfg {
    #[default]
    Day,
    Instant,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SeriesCfg {
    /// Entries sharing a key collapse to the last one written: "day" or "instant".
    pub granularity: GranularityCfg,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub store: StoreCfg,
    pub goal: GoalCfg,
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub report: ReportCfg,
    #[serde(default)]
    pub series: SeriesCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_path(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a window such as "7d", "2w" or "12h".
pub fn parse_window(s: &str) -> eyre::Result<TimeDelta> {
    let s = s.trim();
    let Some(unit) = s.chars().last() else {
        eyre::bail!("empty window");
    };
    let digits = &s[..s.len() - unit.len_utf8()];
    let n: i64 = digits
        .trim()
        .parse()
        .map_err(|_| eyre::eyre!("window '{s}' must look like <n>d, <n>w or <n>h"))?;
    if n <= 0 {
        eyre::bail!("window '{s}' must be > 0");
    }
    let hours = match unit.to_ascii_lowercase() {
        'h' => n,
        'd' => n.saturating_mul(24),
        'w' => n.saturating_mul(7 * 24),
        _ => eyre::bail!("window '{s}' has unknown unit '{unit}' (use d, w or h)"),
    };
    if hours > MAX_WINDOW_DAYS * 24 {
        eyre::bail!("window '{s}' is unreasonably large (>100 years)");
    }
    TimeDelta::try_hours(hours).ok_or_else(|| eyre::eyre!("window '{s}' out of range"))
}

fn de_window<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_window(&s).map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DateToml {
    Text(String),
    Native(toml::value::Datetime),
}

fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<DateToml> = Option::deserialize(deserializer)?;
    let Some(raw) = opt else {
        return Ok(None);
    };
    let date = match raw {
        DateToml::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{s}': {e}")))?,
        DateToml::Native(dt) => {
            let d = dt
                .date
                .ok_or_else(|| serde::de::Error::custom("goal.target_date needs a date part"))?;
            NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day))
                .ok_or_else(|| serde::de::Error::custom("goal.target_date is not a valid date"))?
        }
    };
    Ok(Some(date))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Store
        if self.store.path.as_os_str().is_empty() {
            eyre::bail!("store.path must not be empty");
        }

        // Goal
        if !(self.goal.target_kg.is_finite() && self.goal.target_kg > 0.0) {
            eyre::bail!("goal.target_kg must be > 0");
        }
        if let Some(rate) = self.goal.rate_per_month
            && !rate.is_finite()
        {
            eyre::bail!("goal.rate_per_month must be a finite number");
        }

        // Input band
        if !(self.input.min_kg.is_finite() && self.input.max_kg.is_finite()) {
            eyre::bail!("input.min_kg and input.max_kg must be finite");
        }
        if self.input.min_kg < 0.0 {
            eyre::bail!("input.min_kg must be >= 0");
        }
        if self.input.min_kg >= self.input.max_kg {
            eyre::bail!("input.min_kg must be < input.max_kg");
        }

        // Report windows are positive by construction; guard the defaults path too
        for (name, w) in [
            ("report.recent_window", self.report.recent_window),
            ("report.resample", self.report.resample),
            ("report.after_log.last", self.report.after_log.last),
            ("report.after_log.resample", self.report.after_log.resample),
        ] {
            if w <= TimeDelta::zero() {
                eyre::bail!("{name} must be > 0");
            }
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !matches!(
                level.to_ascii_lowercase().as_str(),
                "error" | "warn" | "info" | "debug" | "trace"
            )
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot.to_ascii_lowercase().as_str(), "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
