use std::collections::BTreeSet;

use thiserror::Error;

use multi_staking_types::{
    multi_staking::{
        messages::{MsgCreateValidator, MsgEditValidator},
        Error,
    },
    AccountHash, Coin, Key, KeyTag, StoredValue, ValidatorAddr, U512,
};

/// Provider of runtime host functionality.
pub trait RuntimeProvider {
    /// Name of the module, mixed into intermediary account derivation.
    fn module_name(&self) -> &str;

    /// Smallest amount of tokens a single request may lock or release.
    fn minimum_delegation_amount(&self) -> U512;
}

/// Provides functionality of the multi-staking storage.
pub trait StorageProvider {
    /// Reads the value stored under `key`.
    fn read(&mut self, key: &Key) -> Result<Option<StoredValue>, Error>;

    /// Writes `value` under `key`.
    fn write(&mut self, key: Key, value: StoredValue) -> Result<(), Error>;

    /// Removes the value stored under `key`.
    fn prune(&mut self, key: Key);

    /// Gets keys in a given keyspace.
    fn get_keys(&mut self, key_tag: &KeyTag) -> Result<BTreeSet<Key>, Error>;
}

/// Failures reported by the bonding engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    /// The validator does not exist.
    #[error("validator not found")]
    ValidatorNotFound,
    /// The validator already exists.
    #[error("validator already exists")]
    ValidatorAlreadyExists,
    /// The acting account cannot cover the amount.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The self delegation is below the validator's minimum.
    #[error("self delegation below minimum")]
    SelfDelegationBelowMinimum,
    /// No delegation exists for the pair.
    #[error("delegation not found")]
    DelegationNotFound,
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Failures reported by the distribution engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DistributionError {
    /// No delegation exists for the pair.
    #[error("no delegation for (address, validator) tuple")]
    NoDelegation,
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Failures reported by the transfer primitive.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The source account cannot cover the transfer.
    #[error("insufficient balance")]
    InsufficientBalance,
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Provides access to the canonical bonding engine.
///
/// Amounts are always in [`StakingProvider::bond_denom`] and the acting delegator is always an
/// intermediary account.
pub trait StakingProvider {
    /// The single denomination the bonding engine understands.
    fn bond_denom(&self) -> String;

    /// Creates `validator`, self-delegated by `delegator`.
    fn staking_create_validator(
        &mut self,
        validator: ValidatorAddr,
        delegator: AccountHash,
        value: Coin,
        msg: &MsgCreateValidator,
    ) -> Result<(), StakingError>;

    /// Updates validator metadata.
    fn staking_edit_validator(
        &mut self,
        validator: ValidatorAddr,
        msg: &MsgEditValidator,
    ) -> Result<(), StakingError>;

    /// Delegates `amount` from `delegator` to `validator`.
    fn staking_delegate(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    ) -> Result<(), StakingError>;

    /// Redelegates `amount` from `src` to `dst`, returning the completion time.
    fn staking_begin_redelegate(
        &mut self,
        delegator: AccountHash,
        src: ValidatorAddr,
        dst: ValidatorAddr,
        amount: Coin,
    ) -> Result<u64, StakingError>;

    /// Starts unbonding `amount`, returning the completion time.
    fn staking_undelegate(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    ) -> Result<u64, StakingError>;
}

/// Provides access to the reward distribution engine.
pub trait DistributionProvider {
    /// Sets the account `delegator`'s rewards are paid to.
    fn distribution_set_withdraw_address(
        &mut self,
        delegator: AccountHash,
        withdraw_address: AccountHash,
    ) -> Result<(), DistributionError>;

    /// Pays out `delegator`'s rewards from `validator`, returning the exact payout.
    fn distribution_withdraw_delegator_reward(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
    ) -> Result<Vec<Coin>, DistributionError>;
}

/// Provides access to the transfer primitive.
pub trait BankProvider {
    /// Moves `amount` from `from` to `to`.
    fn send_coins(
        &mut self,
        from: AccountHash,
        to: AccountHash,
        amount: &[Coin],
    ) -> Result<(), TransferError>;
}
