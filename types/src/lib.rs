//! Core domain types for gantry.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies: where the server lives ([`ConnectionSettings`]), how a
//! resource on it is addressed ([`Route`]), and what a finished run reports
//! back ([`Outcome`]). Everything that actually talks to the network lives
//! in `gantry-client`.

mod outcome;
mod route;
mod settings;

pub use outcome::Outcome;
pub use route::{Complete, Partial, Route};
pub use settings::ConnectionSettings;
