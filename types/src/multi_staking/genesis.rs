//! Import and export format for the complete multi-staking state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MultiStakingLock;
use crate::{coin, AccountHash, Decimal, LockId, ValidatorAddr, U512};

/// Conversion weight of a denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BondWeight {
    /// The denomination.
    pub denom: String,
    /// Bond units per token.
    pub weight: Decimal,
}

/// The accepted denomination of a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorDenom {
    /// The validator.
    pub validator: ValidatorAddr,
    /// Its accepted denomination.
    pub denom: String,
}

/// The binding between a delegator and its intermediary account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntermediaryAccount {
    /// The real delegator.
    pub delegator: AccountHash,
    /// The account acting for it.
    pub intermediary: AccountHash,
}

/// A lock together with its identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockEntry {
    /// The (delegator, validator) pair.
    pub lock_id: LockId,
    /// The lock record.
    pub lock: MultiStakingLock,
}

/// A bond mirror entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BondMirrorEntry {
    /// The (delegator, validator) pair.
    pub lock_id: LockId,
    /// Bond units issued to the bonding engine for the pair.
    pub amount: U512,
}

/// Reasons a [`GenesisState`] is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenesisError {
    /// A denomination failed validation.
    #[error(transparent)]
    InvalidDenom(#[from] coin::InvalidDenom),
    /// A denomination has more than one weight.
    #[error("duplicate bond weight for {0}")]
    DuplicateBondWeight(String),
    /// A validator has more than one accepted denomination.
    #[error("duplicate denom for validator {0}")]
    DuplicateValidatorDenom(ValidatorAddr),
    /// A delegator has more than one intermediary account.
    #[error("duplicate intermediary account for delegator {0}")]
    DuplicateDelegator(AccountHash),
    /// An intermediary account is bound to more than one delegator.
    #[error("intermediary account {0} bound to more than one delegator")]
    DuplicateIntermediary(AccountHash),
    /// A lock appears more than once.
    #[error("duplicate lock {0}")]
    DuplicateLock(LockId),
    /// A lock's intermediary differs from the delegator's registered intermediary account.
    #[error("lock {0} has an intermediary account not bound to its delegator")]
    IntermediaryMismatch(LockId),
    /// A bond mirror entry appears more than once.
    #[error("duplicate bond mirror entry {0}")]
    DuplicateBondMirror(LockId),
}

/// The complete multi-staking state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenesisState {
    /// Denomination weights.
    pub bond_weights: Vec<BondWeight>,
    /// Accepted validator denominations.
    pub validator_denoms: Vec<ValidatorDenom>,
    /// Delegator to intermediary account bindings.
    pub intermediary_accounts: Vec<IntermediaryAccount>,
    /// Lock records, including empty ones.
    pub locks: Vec<LockEntry>,
    /// Bond mirror entries.
    pub bond_mirror: Vec<BondMirrorEntry>,
}

impl GenesisState {
    /// Checks the state is internally consistent.
    pub fn validate(&self) -> Result<(), GenesisError> {
        let mut weighted = BTreeSet::new();
        for BondWeight { denom, .. } in &self.bond_weights {
            coin::validate_denom(denom)?;
            if !weighted.insert(denom.as_str()) {
                return Err(GenesisError::DuplicateBondWeight(denom.clone()));
            }
        }

        let mut validators = BTreeSet::new();
        for ValidatorDenom { validator, denom } in &self.validator_denoms {
            coin::validate_denom(denom)?;
            if !validators.insert(*validator) {
                return Err(GenesisError::DuplicateValidatorDenom(*validator));
            }
        }

        let mut intermediaries = BTreeMap::new();
        let mut bound = BTreeSet::new();
        for IntermediaryAccount {
            delegator,
            intermediary,
        } in &self.intermediary_accounts
        {
            if intermediaries.insert(*delegator, *intermediary).is_some() {
                return Err(GenesisError::DuplicateDelegator(*delegator));
            }
            if !bound.insert(*intermediary) {
                return Err(GenesisError::DuplicateIntermediary(*intermediary));
            }
        }

        let mut locks = BTreeSet::new();
        for LockEntry { lock_id, lock } in &self.locks {
            if !locks.insert(*lock_id) {
                return Err(GenesisError::DuplicateLock(*lock_id));
            }
            if intermediaries.get(&lock_id.delegator) != Some(lock.intermediary_account()) {
                return Err(GenesisError::IntermediaryMismatch(*lock_id));
            }
        }

        let mut mirrored = BTreeSet::new();
        for BondMirrorEntry { lock_id, .. } in &self.bond_mirror {
            if !mirrored.insert(*lock_id) {
                return Err(GenesisError::DuplicateBondMirror(*lock_id));
            }
        }

        Ok(())
    }
}
