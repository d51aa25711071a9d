//! Seams between the weight tracking core and the outside world.
//!
//! - `Clock`: wall-clock source for "now" (injected so reports are reproducible)
//! - `Medium`: durable, append-only byte log backing the measurement store
pub mod clock;
pub mod medium;

pub use clock::{Clock, SystemClock};
pub use medium::Medium;
