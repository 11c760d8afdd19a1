//! Time-series builders shared by the orchestrator and connectors.
//!
//! Modules include:
//! - `fixed`: fixed-step alignment with a fixed output capacity (minute cadence)
//! - `calendar`: one-entry-per-calendar-day alignment (daily cadence)
//! - `util`: numeric field parsing shared by connector row decoders
//!
//! Builders are pure: identical inputs give identical output and the only side
//! effect is diagnostic logging.
/// Calendar-day alignment.
pub mod calendar;
/// Fixed-step alignment.
pub mod fixed;
/// Row decoding helpers.
pub mod util;
