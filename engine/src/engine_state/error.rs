//! Definition of all the possible outcomes of the operation on an `EngineState` instance.
use thiserror::Error;

use multi_staking_types::{
    bytesrepr,
    multi_staking::{self, genesis::GenesisError, InvariantViolation},
};

use crate::{
    global_state,
    system::multi_staking::providers::{DistributionError, StakingError, TransferError},
};

/// Engine state errors.
#[derive(Clone, Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The request was rejected.
    #[error(transparent)]
    MultiStaking(#[from] multi_staking::Error),
    /// State that request validation should have made unreachable. Fatal for the batch.
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
    /// The bonding engine rejected the canonical request.
    #[error("staking: {0}")]
    Staking(#[from] StakingError),
    /// The distribution engine rejected the canonical request.
    #[error("distribution: {0}")]
    Distribution(#[from] DistributionError),
    /// The transfer primitive failed.
    #[error("transfer: {0}")]
    Transfer(#[from] TransferError),
    /// Storage error.
    #[error(transparent)]
    GlobalState(#[from] global_state::Error),
    /// Genesis state is inconsistent.
    #[error("invalid genesis: {0}")]
    Genesis(#[from] GenesisError),
}

impl Error {
    /// Returns `true` if processing of the current batch must stop.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }
}

impl From<bytesrepr::Error> for Error {
    fn from(_: bytesrepr::Error) -> Self {
        Error::MultiStaking(multi_staking::Error::Serialization)
    }
}
