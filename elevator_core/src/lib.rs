//! # Elevator Core
//!
//! Drives a quiz run on top of `elevator_rules` and keeps the cross-session
//! choice statistics.
//!
//! ## Core Components
//!
//! - **stats**: aggregate counter store keyed by (scenario, option), with
//!   in-memory and SQLite backends
//! - **controller**: the run lifecycle - start, choose, summary
//!
//! Session state is never held here. Callers load a `SessionState`, hand it to
//! the controller, and persist whatever comes back.

pub mod controller;
pub mod stats;

pub use controller::*;
pub use stats::*;
