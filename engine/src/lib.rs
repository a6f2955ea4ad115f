//! The multi-staking engine: lock-and-convert accounting for delegations in several tokens on top
//! of a bonding engine that understands a single bond denomination.
//!
//! Requests run against a request-scoped [`tracking_copy::TrackingCopy`] and are committed to
//! [`global_state`] only when they complete.

#![doc(test(attr(forbid(warnings))))]
#![warn(missing_docs)]

pub mod config;
pub mod engine_state;
pub mod global_state;
pub mod logging;
/// System modules logic.
pub mod system;
#[cfg(test)]
pub(crate) mod testing;
pub mod tracking_copy;

pub use config::{Config, EngineConfig};
pub use engine_state::{EngineState, Error};
