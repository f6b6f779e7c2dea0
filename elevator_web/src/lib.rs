//! # Elevator Web
//!
//! Axum front end for the elevator quiz. Handlers decode the player's
//! `SessionState` from a private cookie, hand it to the `RunController`, and
//! write the updated state back on the response.

pub mod config;
pub mod error;
pub mod pages;
pub mod server;
pub mod session;

pub use config::*;
pub use error::*;
pub use server::{build_state, create_router, AppState};
