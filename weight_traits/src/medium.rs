use std::io;

/// Durable byte log backing the measurement store.
///
/// Implementations must make `append` durable before returning (flushed and
/// synced, not merely buffered). Writers are serialized by `with_exclusive`:
/// every handle to the same log, in any process, contends for one lock.
pub trait Medium: Send + Sync {
    /// Read the complete log. A log that was never created reports
    /// `io::ErrorKind::NotFound`; an existing empty log returns an empty buffer.
    fn read_all(&self) -> io::Result<Vec<u8>>;

    /// Append `bytes` at the end of the log, creating it when absent.
    fn append(&self, bytes: &[u8]) -> io::Result<()>;

    /// Shrink the log to `len` bytes. Only used to cut an unterminated
    /// trailing fragment; complete records are never rewritten.
    fn truncate(&self, len: u64) -> io::Result<()>;

    /// Human-readable location used in logs and error messages.
    fn describe(&self) -> String;

    /// Run `f` holding the log's exclusive lock. Every handle to the same
    /// log, in any process, is excluded until `f` returns.
    fn with_exclusive(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()>;

    /// Run `f` holding the log's shared lock; excludes `with_exclusive` only.
    fn with_shared(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()>;
}

impl<M: Medium + ?Sized> Medium for Box<M> {
    fn read_all(&self) -> io::Result<Vec<u8>> {
        (**self).read_all()
    }
    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).append(bytes)
    }
    fn truncate(&self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }
    fn describe(&self) -> String {
        (**self).describe()
    }
    fn with_exclusive(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        (**self).with_exclusive(f)
    }
    fn with_shared(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        (**self).with_shared(f)
    }
}

impl<M: Medium + ?Sized> Medium for std::sync::Arc<M> {
    fn read_all(&self) -> io::Result<Vec<u8>> {
        (**self).read_all()
    }
    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).append(bytes)
    }
    fn truncate(&self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }
    fn describe(&self) -> String {
        (**self).describe()
    }
    fn with_exclusive(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        (**self).with_exclusive(f)
    }
    fn with_shared(&self, f: &mut dyn FnMut() -> io::Result<()>) -> io::Result<()> {
        (**self).with_shared(f)
    }
}
