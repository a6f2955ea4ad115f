use std::collections::BTreeSet;

use tracing::error;

use multi_staking_types::{
    multi_staking::{
        messages::{MsgCreateValidator, MsgEditValidator},
        Error,
    },
    AccountHash, Coin, Key, KeyTag, StoredValue, ValidatorAddr, U512,
};

use super::{
    providers::{
        BankProvider, DistributionError, DistributionProvider, RuntimeProvider, StakingError,
        StakingProvider, StorageProvider, TransferError,
    },
    MultiStaking,
};
use crate::{
    config::EngineConfig,
    global_state::{Error as GlobalStateError, StateReader},
    tracking_copy::TrackingCopy,
};

fn storage_error(context: &str, err: GlobalStateError) -> Error {
    match err {
        GlobalStateError::BytesRepr(_) => Error::Serialization,
        err => {
            error!("StorageProvider::{}: {:?}", context, err);
            Error::Storage
        }
    }
}

impl<R> StorageProvider for TrackingCopy<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    fn read(&mut self, key: &Key) -> Result<Option<StoredValue>, Error> {
        TrackingCopy::read(self, key).map_err(|err| storage_error("read", err))
    }

    fn write(&mut self, key: Key, value: StoredValue) -> Result<(), Error> {
        TrackingCopy::write(self, key, value);
        Ok(())
    }

    fn prune(&mut self, key: Key) {
        TrackingCopy::prune(self, key)
    }

    fn get_keys(&mut self, key_tag: &KeyTag) -> Result<BTreeSet<Key>, Error> {
        TrackingCopy::get_keys(self, key_tag).map_err(|err| storage_error("get_keys", err))
    }
}

/// Native runtime of a single multi-staking request.
///
/// Ledger writes go to a request-scoped [`TrackingCopy`]; canonical requests go to the `chain`
/// collaborators immediately.
pub struct RuntimeNative<'a, R, C> {
    tracking_copy: TrackingCopy<R>,
    chain: &'a mut C,
    config: &'a EngineConfig,
}

impl<'a, R, C> RuntimeNative<'a, R, C>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Creates a runtime staging its writes on top of `reader`.
    pub fn new(reader: R, chain: &'a mut C, config: &'a EngineConfig) -> Self {
        RuntimeNative {
            tracking_copy: TrackingCopy::new(reader),
            chain,
            config,
        }
    }

    /// Returns the tracking copy holding the staged writes.
    pub fn tracking_copy(&mut self) -> &mut TrackingCopy<R> {
        &mut self.tracking_copy
    }

    /// Consumes the runtime, returning the staged writes.
    pub fn into_tracking_copy(self) -> TrackingCopy<R> {
        self.tracking_copy
    }
}

impl<'a, R, C> RuntimeProvider for RuntimeNative<'a, R, C> {
    fn module_name(&self) -> &str {
        &self.config.module_name
    }

    fn minimum_delegation_amount(&self) -> U512 {
        self.config.minimum_delegation_amount
    }
}

impl<'a, R, C> StorageProvider for RuntimeNative<'a, R, C>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    fn read(&mut self, key: &Key) -> Result<Option<StoredValue>, Error> {
        StorageProvider::read(&mut self.tracking_copy, key)
    }

    fn write(&mut self, key: Key, value: StoredValue) -> Result<(), Error> {
        StorageProvider::write(&mut self.tracking_copy, key, value)
    }

    fn prune(&mut self, key: Key) {
        StorageProvider::prune(&mut self.tracking_copy, key)
    }

    fn get_keys(&mut self, key_tag: &KeyTag) -> Result<BTreeSet<Key>, Error> {
        StorageProvider::get_keys(&mut self.tracking_copy, key_tag)
    }
}

impl<'a, R, C> StakingProvider for RuntimeNative<'a, R, C>
where
    C: StakingProvider,
{
    fn bond_denom(&self) -> String {
        self.chain.bond_denom()
    }

    fn staking_create_validator(
        &mut self,
        validator: ValidatorAddr,
        delegator: AccountHash,
        value: Coin,
        msg: &MsgCreateValidator,
    ) -> Result<(), StakingError> {
        self.chain
            .staking_create_validator(validator, delegator, value, msg)
    }

    fn staking_edit_validator(
        &mut self,
        validator: ValidatorAddr,
        msg: &MsgEditValidator,
    ) -> Result<(), StakingError> {
        self.chain.staking_edit_validator(validator, msg)
    }

    fn staking_delegate(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    ) -> Result<(), StakingError> {
        self.chain.staking_delegate(delegator, validator, amount)
    }

    fn staking_begin_redelegate(
        &mut self,
        delegator: AccountHash,
        src: ValidatorAddr,
        dst: ValidatorAddr,
        amount: Coin,
    ) -> Result<u64, StakingError> {
        self.chain
            .staking_begin_redelegate(delegator, src, dst, amount)
    }

    fn staking_undelegate(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    ) -> Result<u64, StakingError> {
        self.chain.staking_undelegate(delegator, validator, amount)
    }
}

impl<'a, R, C> DistributionProvider for RuntimeNative<'a, R, C>
where
    C: DistributionProvider,
{
    fn distribution_set_withdraw_address(
        &mut self,
        delegator: AccountHash,
        withdraw_address: AccountHash,
    ) -> Result<(), DistributionError> {
        self.chain
            .distribution_set_withdraw_address(delegator, withdraw_address)
    }

    fn distribution_withdraw_delegator_reward(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
    ) -> Result<Vec<Coin>, DistributionError> {
        self.chain
            .distribution_withdraw_delegator_reward(delegator, validator)
    }
}

impl<'a, R, C> BankProvider for RuntimeNative<'a, R, C>
where
    C: BankProvider,
{
    fn send_coins(
        &mut self,
        from: AccountHash,
        to: AccountHash,
        amount: &[Coin],
    ) -> Result<(), TransferError> {
        self.chain.send_coins(from, to, amount)
    }
}

impl<'a, R, C> MultiStaking for RuntimeNative<'a, R, C>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
    C: StakingProvider + DistributionProvider + BankProvider,
{
}
