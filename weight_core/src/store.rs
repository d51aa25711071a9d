//! Durable, append-only measurement log.
//!
//! Records are CSV rows `timestamp,weight` under a fixed header, one row per
//! measurement, RFC 3339 timestamps with offset. Every row the store writes is
//! newline-terminated, so an unterminated final line can only come from a torn
//! write: the loader skips it and reports it, and the next append cuts it away
//! before writing.
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Deserialize;
use weight_traits::Medium;

use crate::error::{Result, TrackerError};
use crate::types::{Measurement, validate_value};

/// Header line of every store file.
pub const HEADER: &str = "timestamp,weight";

const HEADER_FIELDS: [&str; 2] = ["timestamp", "weight"];

/// Timestamp layout written by older tooling (space separator instead of `T`).
const SPACED_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Unterminated fragment found at the end of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TornTail {
    /// 1-based line number of the fragment.
    pub line: usize,
    /// Fragment length in bytes.
    pub bytes: usize,
}

/// Result of a full read: measurements in write order plus any skipped fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub measurements: Vec<Measurement>,
    pub torn_tail: Option<TornTail>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: String,
    weight: f64,
}

/// File-backed medium. Appends are flushed and `fsync`ed before returning.
///
/// Locking uses an OS advisory lock on a sibling `<file>.lock`, so separate
/// processes appending to the same log are serialized.
#[derive(Debug, Clone)]
pub struct FileMedium {
    path: PathBuf,
}

impl FileMedium {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file carrying the advisory lock.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn open_lock(&self) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
    }
}

impl Medium for FileMedium {
    fn read_all(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(bytes)?;
        f.flush()?;
        f.sync_data()
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        let f = OpenOptions::new().write(true).open(&self.path)?;
        f.set_len(len)?;
        f.sync_all()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn with_exclusive(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        let lock = self.open_lock()?;
        lock.lock()?;
        let out = f();
        lock.unlock()?;
        out
    }

    fn with_shared(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        // A never-created log stays NotFound and gets no lock file
        if !self.path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", self.path.display()),
            ));
        }
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let out = f();
        lock.unlock()?;
        out
    }
}

/// The single source of truth for measurements.
///
/// Every read-cut-append sequence runs under the medium's exclusive lock and
/// every load under its shared lock, so a load sees either the state before
/// or after an append, never half of one, across handles and processes.
pub struct WeightStore<M: Medium> {
    medium: M,
}

impl<M: Medium> std::fmt::Debug for WeightStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightStore")
            .field("medium", &self.medium.describe())
            .finish()
    }
}

impl WeightStore<FileMedium> {
    /// Store backed by the CSV file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(FileMedium::new(path))
    }
}

impl<M: Medium> WeightStore<M> {
    pub fn new(medium: M) -> Self {
        Self { medium }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Write the header when the log is missing or empty.
    /// Returns true when the header was written.
    pub fn init(&self) -> Result<bool> {
        let mut created = false;
        self.medium
            .with_exclusive(&mut || {
                if !read_or_empty(&self.medium)?.is_empty() {
                    return Ok(());
                }
                self.medium.append(format!("{HEADER}\n").as_bytes())?;
                created = true;
                Ok(())
            })
            .map_err(|e| TrackerError::unavailable(self.medium.describe(), e))?;
        if created {
            tracing::info!(store = %self.medium.describe(), "initialized measurement store");
        }
        Ok(created)
    }

    /// Durably append one measurement taken at `at`.
    ///
    /// Invalid values are rejected before the medium is touched.
    pub fn append(&self, value: f64, at: DateTime<FixedOffset>) -> Result<Measurement> {
        let measurement = Measurement::new(at, value)?;
        let row = encode_record(&measurement)?;

        self.medium
            .with_exclusive(&mut || self.append_locked(&row))
            .map_err(|e| TrackerError::unavailable(self.medium.describe(), e))?;
        tracing::debug!(
            value = measurement.value,
            at = %measurement.timestamp,
            "measurement stored"
        );
        Ok(measurement)
    }

    /// Read, cut any torn tail, then write. Caller holds the exclusive lock.
    fn append_locked(&self, row: &[u8]) -> io::Result<()> {
        let existing = read_or_empty(&self.medium)?;

        let kept = if existing.ends_with(b"\n") || existing.is_empty() {
            existing.len()
        } else {
            let keep = existing
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |i| i + 1);
            tracing::warn!(
                store = %self.medium.describe(),
                fragment_bytes = existing.len() - keep,
                "cutting torn trailing record before append"
            );
            self.medium.truncate(keep as u64)?;
            keep
        };

        let mut buf = Vec::with_capacity(HEADER.len() + row.len() + 1);
        if kept == 0 {
            buf.extend_from_slice(HEADER.as_bytes());
            buf.push(b'\n');
        }
        buf.extend_from_slice(row);
        self.medium.append(&buf)
    }

    /// Read every measurement in the order it was durably written.
    ///
    /// A missing medium is `StoreUnavailable`; an empty one is a successful,
    /// empty load.
    pub fn load_all(&self) -> Result<LoadOutcome> {
        let mut bytes = Vec::new();
        self.medium
            .with_shared(&mut || {
                bytes = self.medium.read_all()?;
                Ok(())
            })
            .map_err(|e| TrackerError::unavailable(self.medium.describe(), e))?;
        let outcome = parse_records(&bytes)?;
        tracing::debug!(
            store = %self.medium.describe(),
            records = outcome.measurements.len(),
            torn = outcome.torn_tail.is_some(),
            "store loaded"
        );
        Ok(outcome)
    }
}

/// Whole log, with a never-created log read as empty.
fn read_or_empty<M: Medium>(medium: &M) -> io::Result<Vec<u8>> {
    match medium.read_all() {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

/// Encode one measurement as a newline-terminated CSV row.
pub fn encode_record(m: &Measurement) -> Result<Vec<u8>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record([
        m.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        m.value.to_string(),
    ])
    .map_err(|e| TrackerError::unavailable("encode record", e))?;
    w.into_inner()
        .map_err(|e| TrackerError::unavailable("encode record", e.error()))
}

/// Parse a complete store image.
///
/// Enforces the exact header; any malformed complete record is
/// `StoreUnavailable`. An unterminated final line is skipped and reported.
pub fn parse_records(bytes: &[u8]) -> Result<LoadOutcome> {
    if bytes.is_empty() {
        return Ok(LoadOutcome::default());
    }

    let (complete, torn_tail) = if bytes.ends_with(b"\n") {
        (bytes, None)
    } else {
        let split = bytes
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let line = bytes[..split].iter().filter(|&&b| b == b'\n').count() + 1;
        (
            &bytes[..split],
            Some(TornTail {
                line,
                bytes: bytes.len() - split,
            }),
        )
    };

    if complete.is_empty() {
        return Ok(LoadOutcome {
            measurements: Vec::new(),
            torn_tail,
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(complete);

    let headers = rdr
        .headers()
        .map_err(|e| TrackerError::unavailable("read store header", e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != HEADER_FIELDS {
        return Err(TrackerError::StoreUnavailable(format!(
            "store must start with header '{HEADER}', got: {}",
            actual.join(",")
        )));
    }

    let mut measurements = Vec::new();
    for (idx, rec) in rdr.deserialize::<RawRecord>().enumerate() {
        let line = idx + 2;
        let raw = rec.map_err(|e| {
            TrackerError::unavailable(format!("invalid record at line {line}"), e)
        })?;
        let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
            TrackerError::StoreUnavailable(format!(
                "invalid record at line {line}: bad timestamp '{}'",
                raw.timestamp
            ))
        })?;
        let value = validate_value(raw.weight).map_err(|_| {
            TrackerError::StoreUnavailable(format!(
                "invalid record at line {line}: weight {} is not positive",
                raw.weight
            ))
        })?;
        measurements.push(Measurement { timestamp, value });
    }

    Ok(LoadOutcome {
        measurements,
        torn_tail,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, SPACED_TIMESTAMP))
        .ok()
}
