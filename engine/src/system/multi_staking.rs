//! The multi-staking module: request handlers over the lock ledger.

/// Stores and lock ledger algorithms.
pub mod detail;
/// Collaborator interfaces.
pub mod providers;
/// Native runtime implementation.
pub mod runtime_native;

use tracing::{debug, info, warn};

use multi_staking_types::{
    multi_staking::{
        messages::{
            MsgBeginRedelegate, MsgCreateValidator, MsgDelegate, MsgEditValidator,
            MsgSetWithdrawAddress, MsgUndelegate, MsgWithdrawDelegatorReward,
            MultiStakingResponse,
        },
        Error as MultiStakingError,
    },
    AccountHash, Coin, LockId, ValidatorAddr, U512,
};

use self::providers::{
    BankProvider, DistributionProvider, RuntimeProvider, StakingProvider, StorageProvider,
};
use crate::engine_state::Error;

/// Checks that `coin` carries a weighted denomination the validator accepts.
fn check_allowed_token<P>(
    provider: &mut P,
    validator: &ValidatorAddr,
    coin: &Coin,
) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    if detail::read_bond_weight(provider, &coin.denom)?.is_none() {
        return Err(MultiStakingError::NotMultiStakingToken.into());
    }
    if !detail::is_allowed_token(provider, validator, &coin.denom)? {
        return Err(MultiStakingError::NotAllowedToken.into());
    }
    Ok(())
}

fn require_intermediary<P>(provider: &mut P, delegator: &AccountHash) -> Result<AccountHash, Error>
where
    P: StorageProvider + ?Sized,
{
    detail::read_intermediary_account(provider, delegator)?
        .ok_or_else(|| MultiStakingError::IntermediaryAccountNotFound.into())
}

fn non_zero_bond(bond_amount: U512) -> Result<U512, Error> {
    if bond_amount.is_zero() {
        return Err(MultiStakingError::InvalidAmount.into());
    }
    Ok(bond_amount)
}

/// Multi-staking module interface.
///
/// Every handler stages its ledger writes through [`StorageProvider`] before calling out to the
/// bonding, distribution or transfer collaborators, so that nothing local can fail after an
/// external effect has been requested. Callers are expected to discard the staged writes when a
/// handler returns an error.
pub trait MultiStaking:
    StorageProvider
    + RuntimeProvider
    + StakingProvider
    + DistributionProvider
    + BankProvider
    + Sized
{
    /// Creates a validator whose accepted denomination is the denomination of the self
    /// delegation.
    ///
    /// The self delegation is locked for the operator, converted at the denomination's current
    /// weight, and handed to the bonding engine under the operator's intermediary account.
    fn create_validator(&mut self, msg: MsgCreateValidator) -> Result<MultiStakingResponse, Error> {
        let (delegator, validator) = msg.validate_basic()?;

        if detail::read_validator_denom(self, &validator)?.is_some() {
            return Err(MultiStakingError::ValidatorAlreadyExists.into());
        }
        check_allowed_token(self, &validator, &msg.value)?;
        detail::check_minimum_amount(self, msg.value.amount)?;

        let intermediary = detail::get_or_create_intermediary_account(self, delegator)?;
        let lock_id = LockId::new(delegator, validator);
        let bond_amount = non_zero_bond(detail::lock_multi_staking_token(
            self,
            lock_id,
            intermediary,
            &msg.value,
        )?)?;
        detail::set_validator_bond_denom(self, validator, msg.value.denom.clone())?;
        detail::increase_bond_mirror(self, lock_id, bond_amount)?;

        let bond = Coin::new(self.bond_denom(), bond_amount);
        debug!(%validator, %intermediary, %bond, "creating validator");
        self.staking_create_validator(validator, intermediary, bond, &msg)?;

        info!(%validator, denom = %msg.value.denom, "created multi-staking validator");
        Ok(MultiStakingResponse::CreateValidator)
    }

    /// Forwards validator metadata changes to the bonding engine.
    fn edit_validator(&mut self, msg: MsgEditValidator) -> Result<MultiStakingResponse, Error> {
        let validator = msg.validate_basic()?;
        self.staking_edit_validator(validator, &msg)?;
        Ok(MultiStakingResponse::EditValidator)
    }

    /// Locks `msg.amount` for the (delegator, validator) pair and delegates its bond value.
    ///
    /// The first delegation to a validator created without a denomination is accepted in any
    /// weighted denomination; afterwards only the validator's denomination is.
    fn delegate(&mut self, msg: MsgDelegate) -> Result<MultiStakingResponse, Error> {
        let (delegator, validator) = msg.validate_basic()?;

        check_allowed_token(self, &validator, &msg.amount)?;
        detail::check_minimum_amount(self, msg.amount.amount)?;

        let intermediary = detail::get_or_create_intermediary_account(self, delegator)?;
        let lock_id = LockId::new(delegator, validator);
        let bond_amount = non_zero_bond(detail::lock_multi_staking_token(
            self,
            lock_id,
            intermediary,
            &msg.amount,
        )?)?;
        detail::increase_bond_mirror(self, lock_id, bond_amount)?;

        let bond = Coin::new(self.bond_denom(), bond_amount);
        debug!(%delegator, %validator, %intermediary, %bond, "delegating");
        self.staking_delegate(intermediary, validator, bond)?;

        Ok(MultiStakingResponse::Delegate { bond_amount })
    }

    /// Moves locked tokens from the source to the destination validator.
    ///
    /// The bond units redelegated are the drop in the source lock's bond value; the tokens join
    /// the destination lock at the current weight of their denomination.
    fn begin_redelegate(&mut self, msg: MsgBeginRedelegate) -> Result<MultiStakingResponse, Error> {
        let (delegator, src, dst) = msg.validate_basic()?;

        check_allowed_token(self, &src, &msg.amount)?;
        check_allowed_token(self, &dst, &msg.amount)?;
        detail::check_minimum_amount(self, msg.amount.amount)?;

        let intermediary = require_intermediary(self, &delegator)?;
        let src_id = LockId::new(delegator, src);
        let bond_amount = non_zero_bond(detail::move_locked_multi_staking_token(
            self,
            delegator,
            src,
            dst,
            &msg.amount,
        )?)?;
        detail::decrease_bond_mirror(self, src_id, bond_amount)?;
        detail::increase_bond_mirror(self, LockId::new(delegator, dst), bond_amount)?;

        let bond = Coin::new(self.bond_denom(), bond_amount);
        debug!(%delegator, %src, %dst, %bond, "redelegating");
        let completion_time = self.staking_begin_redelegate(intermediary, src, dst, bond)?;

        Ok(MultiStakingResponse::BeginRedelegate {
            bond_amount,
            completion_time,
        })
    }

    /// Releases locked tokens and undelegates the drop in the lock's bond value.
    ///
    /// Releasing everything that is left in a lock is always allowed, even below the minimum
    /// amount. When the release is worth no bond units the bonding engine is not called.
    fn undelegate(&mut self, msg: MsgUndelegate) -> Result<MultiStakingResponse, Error> {
        let (delegator, validator) = msg.validate_basic()?;

        check_allowed_token(self, &validator, &msg.amount)?;

        let intermediary = require_intermediary(self, &delegator)?;
        let lock_id = LockId::new(delegator, validator);
        let lock = detail::read_lock(self, &lock_id)?.ok_or(MultiStakingError::LockNotFound)?;
        if msg.amount.amount != lock.locked_amount() {
            detail::check_minimum_amount(self, msg.amount.amount)?;
        }

        let (_, released) = detail::unlock_multi_staking_token(self, lock_id, msg.amount.amount)?;
        let mirrored = detail::read_bond_mirror(self, &lock_id)?;
        let bond_amount = if released > mirrored {
            warn!(%lock_id, %released, %mirrored, "lock worth more than bonded, releasing bonded");
            mirrored
        } else {
            released
        };
        detail::decrease_bond_mirror(self, lock_id, bond_amount)?;

        if bond_amount.is_zero() {
            debug!(%delegator, %validator, "released lock worth no bond units");
            return Ok(MultiStakingResponse::Undelegate {
                bond_amount,
                completion_time: None,
            });
        }

        let bond = Coin::new(self.bond_denom(), bond_amount);
        debug!(%delegator, %validator, %bond, "undelegating");
        let completion_time = self.staking_undelegate(intermediary, validator, bond)?;

        Ok(MultiStakingResponse::Undelegate {
            bond_amount,
            completion_time: Some(completion_time),
        })
    }

    /// Forwards the withdraw address change to the distribution engine.
    fn set_withdraw_address(
        &mut self,
        msg: MsgSetWithdrawAddress,
    ) -> Result<MultiStakingResponse, Error> {
        let (delegator, withdraw_address) = msg.validate_basic()?;
        self.distribution_set_withdraw_address(delegator, withdraw_address)?;
        Ok(MultiStakingResponse::SetWithdrawAddress)
    }

    /// Withdraws the rewards earned by the delegator's intermediary account and forwards the full
    /// payout to the delegator.
    fn withdraw_delegator_reward(
        &mut self,
        msg: MsgWithdrawDelegatorReward,
    ) -> Result<MultiStakingResponse, Error> {
        let (delegator, validator) = msg.validate_basic()?;
        let intermediary = require_intermediary(self, &delegator)?;

        let amount = self.distribution_withdraw_delegator_reward(intermediary, validator)?;
        if !amount.is_empty() {
            self.send_coins(intermediary, delegator, &amount)?;
        }
        debug!(%delegator, %validator, coins = amount.len(), "forwarded rewards");

        Ok(MultiStakingResponse::WithdrawDelegatorReward { amount })
    }
}
