//! Contains implementation of the multi-staking lock ledger types.
mod error;
pub mod genesis;
mod lock;
pub mod messages;

pub use error::{Error, InvariantViolation};
pub use lock::{weighted_average_rate, MultiStakingLock};

/// Default name of the module, mixed into intermediary account derivation.
pub const DEFAULT_MODULE_NAME: &str = "multi-staking";
