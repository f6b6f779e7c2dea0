//! # Elevator Rules
//!
//! The rulebook crate - scenario definitions, trait mechanics, and per-run state.
//! This crate is the single source of truth for what a run looks like and does not
//! perform any persistence or networking.

pub mod mechanics;
pub mod run_state;
pub mod scenarios;

pub use mechanics::*;
pub use run_state::*;
pub use scenarios::*;
