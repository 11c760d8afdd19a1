//! marlin-core
//!
//! Core traits and pure utilities shared across the marlin workspace.
//!
//! - `types`: re-exports of the data model from `marlin-types`.
//! - `connector`: the `MarlinConnector` trait and broker role traits.
//! - `timeseries`: builders that turn sparse raw rows into gap-explicit series.
//! - `fanout`: bounded concurrent execution of per-key lookups.
//!
//! Nothing here spawns tasks or touches the network; `fanout` only drives the
//! futures it is handed, so it runs under whichever executor polls it.
#![warn(missing_docs)]

/// Connector capability traits and the primary `MarlinConnector` interface.
pub mod connector;
/// Bounded fan-out with explicit result aggregation.
pub mod fanout;
/// Time-aligned series builders.
pub mod timeseries;
pub mod types;

pub use connector::MarlinConnector;
pub use fanout::{BatchOutcome, fetch_bounded};
pub use timeseries::calendar::align_calendar_days;
pub use timeseries::fixed::align_fixed_step;
pub use types::*;
