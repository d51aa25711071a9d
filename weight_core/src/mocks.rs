//! Test and helper mocks for weight_core

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, FixedOffset, TimeDelta};
use weight_traits::{Clock, Medium};

/// In-memory medium with switchable faults.
///
/// `byte_at_a_time` writes each appended byte separately (yielding in
/// between) so that unsynchronized writers would visibly interleave.
/// Handles sharing one `MemoryMedium` (e.g. via `Arc`) share its lock.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    buf: Mutex<Option<Vec<u8>>>,
    gate: RwLock<()>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    byte_at_a_time: AtomicBool,
}

impl MemoryMedium {
    /// A medium that exists and is empty.
    pub fn new() -> Self {
        Self::with_contents(Vec::new())
    }

    /// A medium that was never created (reads report NotFound).
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: Mutex::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    /// Snapshot of the current bytes (empty when missing).
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .map(|g| g.clone().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::Relaxed);
    }

    pub fn set_fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::Relaxed);
    }

    pub fn set_byte_at_a_time(&self, on: bool) {
        self.byte_at_a_time.store(on, Ordering::Relaxed);
    }

    fn guard(&self) -> io::Result<std::sync::MutexGuard<'_, Option<Vec<u8>>>> {
        self.buf
            .lock()
            .map_err(|_| io::Error::other("memory medium poisoned"))
    }
}

impl Medium for MemoryMedium {
    fn read_all(&self) -> io::Result<Vec<u8>> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(io::Error::other("injected read failure"));
        }
        self.guard()?
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "memory medium missing"))
    }

    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(io::Error::other("injected write failure"));
        }
        if self.byte_at_a_time.load(Ordering::Relaxed) {
            for &b in bytes {
                self.guard()?.get_or_insert_with(Vec::new).push(b);
                std::thread::yield_now();
            }
            return Ok(());
        }
        self.guard()?
            .get_or_insert_with(Vec::new)
            .extend_from_slice(bytes);
        Ok(())
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(io::Error::other("injected write failure"));
        }
        let mut g = self.guard()?;
        let buf = g
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "memory medium missing"))?;
        buf.truncate(usize::try_from(len).unwrap_or(usize::MAX));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn with_exclusive(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        let _g = self
            .gate
            .write()
            .map_err(|_| io::Error::other("memory medium lock poisoned"))?;
        f()
    }

    fn with_shared(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        let _g = self
            .gate
            .read()
            .map_err(|_| io::Error::other("memory medium lock poisoned"))?;
        f()
    }
}

/// Deterministic clock whose time is set or advanced manually.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Parse an RFC 3339 instant; None when malformed.
    pub fn parse(rfc3339: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(rfc3339).ok().map(Self::at)
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        if let Ok(mut g) = self.now.lock() {
            *g = now;
        }
    }

    pub fn advance(&self, d: TimeDelta) {
        if let Ok(mut g) = self.now.lock()
            && let Some(next) = g.checked_add_signed(d)
        {
            *g = next;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.now.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
