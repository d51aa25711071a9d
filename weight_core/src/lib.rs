#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Weight tracking core (transport-agnostic).
//!
//! Persists dated weight measurements and derives statistics and a goal
//! projection from them. Storage and time go through `weight_traits::Medium`
//! and `weight_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Store**: append-only CSV log with torn-tail recovery (`store`)
//! - **Series**: sorted, last-write-wins view of the log (`series`)
//! - **Statistics**: latest, count, mean, windowed delta, extremes (`stats`)
//! - **Projection**: least-squares trend and goal ETA (`projection`)
//! - **Report**: `Tracker`, the append/report surface for transports (`report`)

pub mod conversions;
pub mod error;
pub mod mocks;
pub mod projection;
pub mod report;
pub mod series;
pub mod stats;
pub mod store;
pub mod types;
pub mod util;

pub use error::{Result, TrackerError};
pub use projection::{LinearFit, PlanCheck, ProjectionResult};
pub use report::{Report, ReportOptions, Tracker};
pub use series::Series;
pub use stats::{Extremes, PeriodChange, StatsParams, StatsResult};
pub use store::{FileMedium, LoadOutcome, TornTail, WeightStore};
pub use types::{Goal, Granularity, Measurement};
