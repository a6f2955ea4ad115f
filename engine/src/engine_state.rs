//! Entry point of the multi-staking engine: executes requests against global state, one atomic
//! commit per successful request.
pub mod error;

use std::collections::BTreeMap;

use tracing::{debug, debug_span, error, info, warn};

use multi_staking_types::{
    multi_staking::{
        genesis::{
            BondMirrorEntry, BondWeight, GenesisState, IntermediaryAccount, LockEntry,
            ValidatorDenom,
        },
        messages::{MultiStakingRequest, MultiStakingResponse},
        MultiStakingLock,
    },
    AccountHash, Decimal, LockId, ValidatorAddr, U512,
};

pub use self::error::Error;
use crate::{
    config::EngineConfig,
    global_state::CommitProvider,
    system::multi_staking::{
        detail,
        providers::{BankProvider, DistributionProvider, StakingProvider},
        runtime_native::RuntimeNative,
        MultiStaking,
    },
    tracking_copy::TrackingCopy,
};

/// Outcome of each request of a batch that ran to completion.
pub type BatchResult = Vec<Result<MultiStakingResponse, Error>>;

/// Main implementation of the multi-staking engine.
#[derive(Debug, Clone)]
pub struct EngineState<S> {
    config: EngineConfig,
    state: S,
}

impl<S> EngineState<S>
where
    S: CommitProvider,
{
    /// Creates new engine state.
    pub fn new(state: S, config: EngineConfig) -> EngineState<S> {
        EngineState { config, state }
    }

    /// Returns engine config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the underlying global state.
    pub fn state(&self) -> &S {
        &self.state
    }

    fn tracking_copy(&self) -> TrackingCopy<&S> {
        TrackingCopy::new(&self.state)
    }

    /// Executes a single request.
    ///
    /// The ledger writes of the request are committed only if every step, including the calls
    /// into `chain`, succeeds.
    pub fn execute<C>(
        &self,
        chain: &mut C,
        request: MultiStakingRequest,
    ) -> Result<MultiStakingResponse, Error>
    where
        C: StakingProvider + DistributionProvider + BankProvider,
    {
        let span = debug_span!("execute", request = request.name());
        let _enter = span.enter();
        let mut runtime = RuntimeNative::new(&self.state, chain, &self.config);
        let result = match request {
            MultiStakingRequest::CreateValidator(msg) => runtime.create_validator(msg),
            MultiStakingRequest::EditValidator(msg) => runtime.edit_validator(msg),
            MultiStakingRequest::Delegate(msg) => runtime.delegate(msg),
            MultiStakingRequest::BeginRedelegate(msg) => runtime.begin_redelegate(msg),
            MultiStakingRequest::Undelegate(msg) => runtime.undelegate(msg),
            MultiStakingRequest::SetWithdrawAddress(msg) => runtime.set_withdraw_address(msg),
            MultiStakingRequest::WithdrawDelegatorReward(msg) => {
                runtime.withdraw_delegator_reward(msg)
            }
        };

        match result {
            Ok(response) => {
                let effects = runtime.into_tracking_copy().into_effects();
                debug!(transforms = effects.len(), "committing request");
                self.state.commit(effects)?;
                Ok(response)
            }
            Err(err) if err.is_invariant_violation() => {
                error!(%err, "invariant violated");
                Err(err)
            }
            Err(err) => {
                debug!(%err, "request rejected");
                Err(err)
            }
        }
    }

    /// Executes `requests` in order.
    ///
    /// Rejected requests are reported in place and do not stop the batch. An invariant violation
    /// stops the batch and is returned as the error; requests completed before it stay
    /// committed.
    pub fn execute_batch<C, I>(&self, chain: &mut C, requests: I) -> Result<BatchResult, Error>
    where
        C: StakingProvider + DistributionProvider + BankProvider,
        I: IntoIterator<Item = MultiStakingRequest>,
    {
        let mut results = Vec::new();
        for request in requests {
            match self.execute(chain, request) {
                Err(err) if err.is_invariant_violation() => {
                    warn!(completed = results.len(), "halting batch");
                    return Err(err);
                }
                result => results.push(result),
            }
        }
        Ok(results)
    }

    /// Sets the conversion weight of `denom`. Existing locks keep their rates.
    pub fn set_bond_token_weight(&self, denom: String, weight: Decimal) -> Result<(), Error> {
        let mut tracking_copy = self.tracking_copy();
        detail::set_bond_weight(&mut tracking_copy, denom, weight)?;
        self.state.commit(tracking_copy.into_effects())?;
        Ok(())
    }

    /// Imports `genesis` into global state in a single commit.
    pub fn commit_genesis(&self, genesis: GenesisState) -> Result<(), Error> {
        genesis.validate()?;

        let mut tracking_copy = self.tracking_copy();
        for BondWeight { denom, weight } in genesis.bond_weights {
            detail::set_bond_weight(&mut tracking_copy, denom, weight)?;
        }
        for ValidatorDenom { validator, denom } in genesis.validator_denoms {
            detail::set_validator_bond_denom(&mut tracking_copy, validator, denom)?;
        }
        for IntermediaryAccount {
            delegator,
            intermediary,
        } in genesis.intermediary_accounts
        {
            detail::set_intermediary_account(&mut tracking_copy, delegator, intermediary)?;
        }
        for LockEntry { lock_id, lock } in genesis.locks {
            detail::write_lock(&mut tracking_copy, lock_id, lock)?;
        }
        for BondMirrorEntry { lock_id, amount } in genesis.bond_mirror {
            detail::write_bond_mirror(&mut tracking_copy, lock_id, amount)?;
        }

        let effects = tracking_copy.into_effects();
        info!(transforms = effects.len(), "committing multi-staking genesis");
        self.state.commit(effects)?;
        Ok(())
    }

    /// Exports the complete multi-staking state, ordered by key.
    pub fn export_genesis(&self) -> Result<GenesisState, Error> {
        let mut tracking_copy = self.tracking_copy();
        let bond_weights = detail::read_bond_weights(&mut tracking_copy)?
            .into_iter()
            .map(|(denom, weight)| BondWeight { denom, weight })
            .collect();
        let validator_denoms = detail::read_validator_denoms(&mut tracking_copy)?
            .into_iter()
            .map(|(validator, denom)| ValidatorDenom { validator, denom })
            .collect();
        let intermediary_accounts = detail::read_intermediary_accounts(&mut tracking_copy)?
            .into_iter()
            .map(|(delegator, intermediary)| IntermediaryAccount {
                delegator,
                intermediary,
            })
            .collect();
        let locks = detail::read_locks(&mut tracking_copy)?
            .into_iter()
            .map(|(lock_id, lock)| LockEntry { lock_id, lock })
            .collect();
        let bond_mirror = detail::read_bond_mirrors(&mut tracking_copy)?
            .into_iter()
            .map(|(lock_id, amount)| BondMirrorEntry { lock_id, amount })
            .collect();
        Ok(GenesisState {
            bond_weights,
            validator_denoms,
            intermediary_accounts,
            locks,
            bond_mirror,
        })
    }

    /// Returns the conversion weight of `denom`, if it is a multi-staking token.
    pub fn bond_token_weight(&self, denom: &str) -> Result<Option<Decimal>, Error> {
        detail::read_bond_weight(&mut self.tracking_copy(), denom)
    }

    /// Returns every configured conversion weight.
    pub fn bond_token_weights(&self) -> Result<BTreeMap<String, Decimal>, Error> {
        detail::read_bond_weights(&mut self.tracking_copy())
    }

    /// Returns the accepted denomination of `validator`.
    pub fn validator_bond_denom(&self, validator: &ValidatorAddr) -> Result<Option<String>, Error> {
        detail::read_validator_denom(&mut self.tracking_copy(), validator)
    }

    /// Returns the intermediary account of `delegator`.
    pub fn intermediary_account(
        &self,
        delegator: &AccountHash,
    ) -> Result<Option<AccountHash>, Error> {
        detail::read_intermediary_account(&mut self.tracking_copy(), delegator)
    }

    /// Returns the delegator `intermediary` acts for.
    pub fn delegator_by_intermediary(
        &self,
        intermediary: &AccountHash,
    ) -> Result<Option<AccountHash>, Error> {
        detail::read_delegator_by_intermediary(&mut self.tracking_copy(), intermediary)
    }

    /// Returns the lock of the (delegator, validator) pair.
    pub fn multi_staking_lock(&self, lock_id: &LockId) -> Result<Option<MultiStakingLock>, Error> {
        detail::read_lock(&mut self.tracking_copy(), lock_id)
    }

    /// Returns every lock, including empty ones.
    pub fn multi_staking_locks(&self) -> Result<BTreeMap<LockId, MultiStakingLock>, Error> {
        detail::read_locks(&mut self.tracking_copy())
    }

    /// Returns the bond units issued to the bonding engine for the pair.
    pub fn bond_mirror(&self, lock_id: &LockId) -> Result<U512, Error> {
        detail::read_bond_mirror(&mut self.tracking_copy(), lock_id)
    }
}
