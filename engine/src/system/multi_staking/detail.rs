use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use multi_staking_types::{
    coin,
    multi_staking::{Error as MultiStakingError, InvariantViolation, MultiStakingLock},
    AccountHash, Coin, Decimal, Key, KeyTag, LockId, StoredValue, ValidatorAddr, U512,
};

use super::providers::{RuntimeProvider, StorageProvider};
use crate::engine_state::Error;

fn unexpected_value<T>(key: &Key, value: &StoredValue) -> Result<T, Error> {
    error!(%key, found = value.type_name(), "unexpected StoredValue variant");
    Err(MultiStakingError::Storage.into())
}

/// Rejects amounts below the configured minimum.
pub fn check_minimum_amount<P>(provider: &mut P, amount: U512) -> Result<(), Error>
where
    P: RuntimeProvider + ?Sized,
{
    if amount.is_zero() {
        return Err(MultiStakingError::InvalidAmount.into());
    }
    if amount < provider.minimum_delegation_amount() {
        return Err(MultiStakingError::DelegationAmountTooSmall.into());
    }
    Ok(())
}

/// Reads the conversion weight of `denom`.
pub fn read_bond_weight<P>(provider: &mut P, denom: &str) -> Result<Option<Decimal>, Error>
where
    P: StorageProvider + ?Sized,
{
    let key = Key::BondWeight(denom.to_string());
    match provider.read(&key)? {
        Some(StoredValue::Weight(weight)) => Ok(Some(weight)),
        Some(other) => unexpected_value(&key, &other),
        None => Ok(None),
    }
}

/// Overwrites the weight of `denom` unconditionally.
pub fn set_bond_weight<P>(provider: &mut P, denom: String, weight: Decimal) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    coin::validate_denom(&denom).map_err(|_| MultiStakingError::InvalidDenom)?;
    debug!(%denom, %weight, "setting bond token weight");
    provider.write(Key::BondWeight(denom), StoredValue::Weight(weight))?;
    Ok(())
}

/// Reads every conversion weight.
pub fn read_bond_weights<P>(provider: &mut P) -> Result<BTreeMap<String, Decimal>, Error>
where
    P: StorageProvider + ?Sized,
{
    let mut ret = BTreeMap::new();
    for key in provider.get_keys(&KeyTag::BondWeight)? {
        if let Some(denom) = key.as_bond_weight() {
            if let Some(weight) = read_bond_weight(provider, denom)? {
                ret.insert(denom.to_string(), weight);
            }
        }
    }
    Ok(ret)
}

/// Reads the accepted denomination of `validator`.
pub fn read_validator_denom<P>(
    provider: &mut P,
    validator: &ValidatorAddr,
) -> Result<Option<String>, Error>
where
    P: StorageProvider + ?Sized,
{
    let key = Key::ValidatorDenom(*validator);
    match provider.read(&key)? {
        Some(StoredValue::Denom(denom)) => Ok(Some(denom)),
        Some(other) => unexpected_value(&key, &other),
        None => Ok(None),
    }
}

/// Records the accepted denomination of `validator`. A second write is an invariant violation.
pub fn set_validator_bond_denom<P>(
    provider: &mut P,
    validator: ValidatorAddr,
    denom: String,
) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    if let Some(existing) = read_validator_denom(provider, &validator)? {
        error!(%validator, %existing, %denom, "validator denom already set");
        return Err(InvariantViolation::ValidatorDenomAlreadySet.into());
    }
    provider.write(Key::ValidatorDenom(validator), StoredValue::Denom(denom))?;
    Ok(())
}

/// Reads every accepted validator denomination.
pub fn read_validator_denoms<P>(provider: &mut P) -> Result<BTreeMap<ValidatorAddr, String>, Error>
where
    P: StorageProvider + ?Sized,
{
    let mut ret = BTreeMap::new();
    for key in provider.get_keys(&KeyTag::ValidatorDenom)? {
        if let Some(validator) = key.as_validator_denom() {
            if let Some(denom) = read_validator_denom(provider, validator)? {
                ret.insert(*validator, denom);
            }
        }
    }
    Ok(ret)
}

/// A validator without a denomination accepts any weighted token; afterwards only its own
/// denomination is allowed.
pub fn is_allowed_token<P>(
    provider: &mut P,
    validator: &ValidatorAddr,
    denom: &str,
) -> Result<bool, Error>
where
    P: StorageProvider + ?Sized,
{
    match read_validator_denom(provider, validator)? {
        Some(accepted) => Ok(accepted == denom),
        None => Ok(read_bond_weight(provider, denom)?.is_some()),
    }
}

fn read_account<P>(provider: &mut P, key: Key) -> Result<Option<AccountHash>, Error>
where
    P: StorageProvider + ?Sized,
{
    match provider.read(&key)? {
        Some(StoredValue::Account(account)) => Ok(Some(account)),
        Some(other) => unexpected_value(&key, &other),
        None => Ok(None),
    }
}

/// Reads the intermediary account of `delegator`.
pub fn read_intermediary_account<P>(
    provider: &mut P,
    delegator: &AccountHash,
) -> Result<Option<AccountHash>, Error>
where
    P: StorageProvider + ?Sized,
{
    read_account(provider, Key::DelegatorIntermediary(*delegator))
}

/// Reads the delegator `intermediary` acts for.
pub fn read_delegator_by_intermediary<P>(
    provider: &mut P,
    intermediary: &AccountHash,
) -> Result<Option<AccountHash>, Error>
where
    P: StorageProvider + ?Sized,
{
    read_account(provider, Key::IntermediaryDelegator(*intermediary))
}

/// Binds `intermediary` to `delegator` in both directions. Rebinding either side is an invariant
/// violation.
pub fn set_intermediary_account<P>(
    provider: &mut P,
    delegator: AccountHash,
    intermediary: AccountHash,
) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    if read_intermediary_account(provider, &delegator)?.is_some()
        || read_delegator_by_intermediary(provider, &intermediary)?.is_some()
    {
        error!(%delegator, %intermediary, "intermediary account for delegator already set");
        return Err(InvariantViolation::IntermediaryAccountAlreadySet.into());
    }
    provider.write(
        Key::DelegatorIntermediary(delegator),
        StoredValue::Account(intermediary),
    )?;
    provider.write(
        Key::IntermediaryDelegator(intermediary),
        StoredValue::Account(delegator),
    )?;
    Ok(())
}

/// Returns the intermediary account of `delegator`, deriving and binding one on first use.
pub fn get_or_create_intermediary_account<P>(
    provider: &mut P,
    delegator: AccountHash,
) -> Result<AccountHash, Error>
where
    P: StorageProvider + RuntimeProvider + ?Sized,
{
    if let Some(intermediary) = read_intermediary_account(provider, &delegator)? {
        return Ok(intermediary);
    }
    let intermediary = AccountHash::derive_intermediary(provider.module_name(), &delegator);
    set_intermediary_account(provider, delegator, intermediary)?;
    debug!(%delegator, %intermediary, "created intermediary account");
    Ok(intermediary)
}

/// Reads every delegator to intermediary account binding.
pub fn read_intermediary_accounts<P>(
    provider: &mut P,
) -> Result<BTreeMap<AccountHash, AccountHash>, Error>
where
    P: StorageProvider + ?Sized,
{
    let mut ret = BTreeMap::new();
    for key in provider.get_keys(&KeyTag::DelegatorIntermediary)? {
        if let Some(delegator) = key.as_delegator_intermediary() {
            if let Some(intermediary) = read_intermediary_account(provider, delegator)? {
                ret.insert(*delegator, intermediary);
            }
        }
    }
    Ok(ret)
}

/// Reads the lock of a (delegator, validator) pair.
pub fn read_lock<P>(provider: &mut P, lock_id: &LockId) -> Result<Option<MultiStakingLock>, Error>
where
    P: StorageProvider + ?Sized,
{
    let key = Key::Lock(*lock_id);
    match provider.read(&key)? {
        Some(StoredValue::Lock(lock)) => Ok(Some(lock)),
        Some(other) => unexpected_value(&key, &other),
        None => Ok(None),
    }
}

/// Writes the lock of a (delegator, validator) pair.
pub fn write_lock<P>(provider: &mut P, lock_id: LockId, lock: MultiStakingLock) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    provider.write(Key::Lock(lock_id), StoredValue::Lock(lock))?;
    Ok(())
}

/// Reads every lock, including empty ones.
pub fn read_locks<P>(provider: &mut P) -> Result<BTreeMap<LockId, MultiStakingLock>, Error>
where
    P: StorageProvider + ?Sized,
{
    let mut ret = BTreeMap::new();
    for key in provider.get_keys(&KeyTag::Lock)? {
        if let Some(lock_id) = key.as_lock() {
            if let Some(lock) = read_lock(provider, lock_id)? {
                ret.insert(*lock_id, lock);
            }
        }
    }
    Ok(ret)
}

/// Locks `coin` for the pair, creating the lock or re-averaging its rate, and returns the bond
/// units to request: the growth of the lock's total bond value. Summed over deposits this equals
/// the lock's bond value, so per-deposit rounding never bonds less than the lock is worth.
pub fn lock_multi_staking_token<P>(
    provider: &mut P,
    lock_id: LockId,
    intermediary: AccountHash,
    coin: &Coin,
) -> Result<U512, Error>
where
    P: StorageProvider + ?Sized,
{
    let weight = read_bond_weight(provider, &coin.denom)?
        .ok_or(MultiStakingError::NotMultiStakingToken)?;
    let (lock, value_before) = match read_lock(provider, &lock_id)? {
        Some(mut lock) => {
            let value_before = lock.bond_amount()?;
            lock.add_token(coin.amount, weight)?;
            (lock, value_before)
        }
        None => (
            MultiStakingLock::new(intermediary, coin.amount, weight),
            U512::zero(),
        ),
    };
    let bond_amount = lock.bond_amount()?.saturating_sub(value_before);
    debug!(
        %lock_id,
        locked = %lock.locked_amount(),
        rate = %lock.conversion_rate(),
        %bond_amount,
        "locked multi-staking token"
    );
    write_lock(provider, lock_id, lock)?;
    Ok(bond_amount)
}

/// Releases `amount` from the pair's lock and returns the remaining lock together with the drop
/// in its bond value. The lock is kept even when it reaches zero.
pub fn unlock_multi_staking_token<P>(
    provider: &mut P,
    lock_id: LockId,
    amount: U512,
) -> Result<(MultiStakingLock, U512), Error>
where
    P: StorageProvider + ?Sized,
{
    let mut lock = read_lock(provider, &lock_id)?.ok_or(MultiStakingError::LockNotFound)?;
    let value_before = lock.bond_amount()?;
    lock.remove_token(amount)?;
    let released = value_before.saturating_sub(lock.bond_amount()?);
    debug!(
        %lock_id,
        %amount,
        %released,
        remaining = %lock.locked_amount(),
        "unlocked multi-staking token"
    );
    write_lock(provider, lock_id, lock.clone())?;
    Ok((lock, released))
}

/// Converts `locked_amount` into bond units at the pair's current rate.
pub fn locked_amount_to_bond_amount<P>(
    provider: &mut P,
    lock_id: &LockId,
    locked_amount: U512,
) -> Result<U512, Error>
where
    P: StorageProvider + ?Sized,
{
    let lock = read_lock(provider, lock_id)?.ok_or(MultiStakingError::LockNotFound)?;
    Ok(lock.locked_amount_to_bond_amount(locked_amount)?)
}

/// Moves `coin` from the (delegator, src) lock to the (delegator, dst) lock, where it is added at
/// the current weight of its denomination. Returns the drop in the source lock's bond value.
pub fn move_locked_multi_staking_token<P>(
    provider: &mut P,
    delegator: AccountHash,
    src: ValidatorAddr,
    dst: ValidatorAddr,
    coin: &Coin,
) -> Result<U512, Error>
where
    P: StorageProvider + ?Sized,
{
    let (src_lock, released) =
        unlock_multi_staking_token(provider, LockId::new(delegator, src), coin.amount)?;

    let weight = read_bond_weight(provider, &coin.denom)?
        .ok_or(MultiStakingError::NotMultiStakingToken)?;

    let dst_id = LockId::new(delegator, dst);
    let dst_lock = match read_lock(provider, &dst_id)? {
        Some(mut lock) => {
            lock.add_token(coin.amount, weight)?;
            lock
        }
        None => MultiStakingLock::new(*src_lock.intermediary_account(), coin.amount, weight),
    };
    write_lock(provider, dst_id, dst_lock)?;
    Ok(released)
}

/// Reads the bond units issued for a pair; zero when absent.
pub fn read_bond_mirror<P>(provider: &mut P, lock_id: &LockId) -> Result<U512, Error>
where
    P: StorageProvider + ?Sized,
{
    let key = Key::BondMirror(*lock_id);
    match provider.read(&key)? {
        Some(StoredValue::Amount(amount)) => Ok(amount),
        Some(other) => unexpected_value(&key, &other),
        None => Ok(U512::zero()),
    }
}

/// Writes the bond units issued for a pair, pruning the entry at zero.
pub fn write_bond_mirror<P>(provider: &mut P, lock_id: LockId, amount: U512) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    if amount.is_zero() {
        provider.prune(Key::BondMirror(lock_id));
    } else {
        provider.write(Key::BondMirror(lock_id), StoredValue::Amount(amount))?;
    }
    Ok(())
}

/// Adds `amount` to the bond units issued for a pair.
pub fn increase_bond_mirror<P>(provider: &mut P, lock_id: LockId, amount: U512) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    let current = read_bond_mirror(provider, &lock_id)?;
    let updated = current
        .checked_add(amount)
        .ok_or(MultiStakingError::ArithmeticOverflow)?;
    write_bond_mirror(provider, lock_id, updated)
}

/// Lowers the mirrored amount, clamping at zero since the mirror is not authoritative.
pub fn decrease_bond_mirror<P>(provider: &mut P, lock_id: LockId, amount: U512) -> Result<(), Error>
where
    P: StorageProvider + ?Sized,
{
    let current = read_bond_mirror(provider, &lock_id)?;
    let updated = match current.checked_sub(amount) {
        Some(updated) => updated,
        None => {
            warn!(%lock_id, %current, %amount, "bond mirror underflow, clamping to zero");
            U512::zero()
        }
    };
    write_bond_mirror(provider, lock_id, updated)
}

/// Reads every bond mirror entry.
pub fn read_bond_mirrors<P>(provider: &mut P) -> Result<BTreeMap<LockId, U512>, Error>
where
    P: StorageProvider + ?Sized,
{
    let mut ret = BTreeMap::new();
    for key in provider.get_keys(&KeyTag::BondMirror)? {
        if let Some(lock_id) = key.as_bond_mirror() {
            ret.insert(*lock_id, read_bond_mirror(provider, lock_id)?);
        }
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use multi_staking_types::{gens, multi_staking::DEFAULT_MODULE_NAME};

    use super::*;
    use crate::{global_state::in_memory::InMemoryGlobalState, tracking_copy::TrackingCopy};

    const STAKE_A: &str = "stake-a";
    const STAKE_B: &str = "stake-b";

    fn tracking_copy() -> TrackingCopy<InMemoryGlobalState> {
        let mut tracking_copy = TrackingCopy::new(InMemoryGlobalState::empty());
        set_bond_weight(&mut tracking_copy, STAKE_A.to_string(), Decimal::one()).unwrap();
        set_bond_weight(
            &mut tracking_copy,
            STAKE_B.to_string(),
            "0.25".parse().unwrap(),
        )
        .unwrap();
        tracking_copy
    }

    fn lock_id(delegator: u8, validator: u8) -> LockId {
        LockId::new(
            AccountHash::new([delegator; 32]),
            ValidatorAddr::new([validator; 32]),
        )
    }

    #[test]
    fn should_reject_invalid_weight_denom() {
        let mut tracking_copy = tracking_copy();
        assert_matches!(
            set_bond_weight(&mut tracking_copy, "x".to_string(), Decimal::one()),
            Err(Error::MultiStaking(MultiStakingError::InvalidDenom))
        );
        assert_eq!(read_bond_weights(&mut tracking_copy).unwrap().len(), 2);
        assert_eq!(read_bond_weight(&mut tracking_copy, "stake-c").unwrap(), None);
    }

    #[test]
    fn validator_denom_should_be_write_once() {
        let mut tracking_copy = tracking_copy();
        let v1 = ValidatorAddr::new([1; 32]);
        let v2 = ValidatorAddr::new([2; 32]);

        set_validator_bond_denom(&mut tracking_copy, v1, STAKE_A.to_string()).unwrap();
        set_validator_bond_denom(&mut tracking_copy, v2, STAKE_B.to_string()).unwrap();

        let result = set_validator_bond_denom(&mut tracking_copy, v1, STAKE_B.to_string());
        assert_matches!(
            result,
            Err(Error::InvariantViolation(
                InvariantViolation::ValidatorDenomAlreadySet
            ))
        );
        assert_eq!(
            read_validator_denom(&mut tracking_copy, &v1).unwrap(),
            Some(STAKE_A.to_string())
        );
        assert_eq!(read_validator_denoms(&mut tracking_copy).unwrap().len(), 2);
    }

    #[test]
    fn intermediary_binding_should_be_write_once_in_both_directions() {
        let mut tracking_copy = tracking_copy();
        let d1 = AccountHash::new([1; 32]);
        let d2 = AccountHash::new([2; 32]);
        let i1 = AccountHash::new([11; 32]);
        let i2 = AccountHash::new([12; 32]);

        set_intermediary_account(&mut tracking_copy, d1, i1).unwrap();
        set_intermediary_account(&mut tracking_copy, d2, i2).unwrap();

        assert_matches!(
            set_intermediary_account(&mut tracking_copy, d1, AccountHash::new([13; 32])),
            Err(Error::InvariantViolation(
                InvariantViolation::IntermediaryAccountAlreadySet
            ))
        );
        assert_matches!(
            set_intermediary_account(&mut tracking_copy, AccountHash::new([3; 32]), i1),
            Err(Error::InvariantViolation(
                InvariantViolation::IntermediaryAccountAlreadySet
            ))
        );
        assert_eq!(read_intermediary_account(&mut tracking_copy, &d1).unwrap(), Some(i1));
        assert_eq!(read_delegator_by_intermediary(&mut tracking_copy, &i2).unwrap(), Some(d2));
    }

    #[test]
    fn get_or_create_should_derive_once() {
        let mut runtime = TestRuntime(tracking_copy());
        let delegator = AccountHash::new([7; 32]);

        let first = get_or_create_intermediary_account(&mut runtime, delegator).unwrap();
        let second = get_or_create_intermediary_account(&mut runtime, delegator).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            AccountHash::derive_intermediary(DEFAULT_MODULE_NAME, &delegator)
        );
        assert_eq!(
            read_delegator_by_intermediary(&mut runtime, &first).unwrap(),
            Some(delegator)
        );
    }

    #[test]
    fn should_average_rate_on_increase() {
        let mut tracking_copy = tracking_copy();
        let lock_id = lock_id(1, 1);
        let intermediary = AccountHash::new([9; 32]);

        let bond = lock_multi_staking_token(
            &mut tracking_copy,
            lock_id,
            intermediary,
            &Coin::new(STAKE_A, 100u64),
        )
        .unwrap();
        assert_eq!(bond, U512::from(100u64));

        let bond = lock_multi_staking_token(
            &mut tracking_copy,
            lock_id,
            intermediary,
            &Coin::new(STAKE_B, 100u64),
        )
        .unwrap();
        assert_eq!(bond, U512::from(25u64));

        let lock = read_lock(&mut tracking_copy, &lock_id).unwrap().unwrap();
        assert_eq!(lock.locked_amount(), U512::from(200u64));
        assert_eq!(lock.conversion_rate(), "0.625".parse().unwrap());
        assert_eq!(
            locked_amount_to_bond_amount(&mut tracking_copy, &lock_id, U512::from(200u64)).unwrap(),
            U512::from(125u64)
        );
    }

    #[test]
    fn should_reject_unweighted_token() {
        let mut tracking_copy = tracking_copy();
        let lock_id = lock_id(1, 1);
        assert_matches!(
            lock_multi_staking_token(
                &mut tracking_copy,
                lock_id,
                AccountHash::new([9; 32]),
                &Coin::new("stake-c", 100u64),
            ),
            Err(Error::MultiStaking(MultiStakingError::NotMultiStakingToken))
        );
        assert_eq!(read_lock(&mut tracking_copy, &lock_id).unwrap(), None);
    }

    #[test]
    fn should_keep_empty_lock_after_unlock() {
        let mut tracking_copy = tracking_copy();
        let lock_id = lock_id(1, 1);
        lock_multi_staking_token(
            &mut tracking_copy,
            lock_id,
            AccountHash::new([9; 32]),
            &Coin::new(STAKE_A, 10u64),
        )
        .unwrap();

        assert_matches!(
            unlock_multi_staking_token(&mut tracking_copy, lock_id, U512::from(11u64)),
            Err(Error::MultiStaking(
                MultiStakingError::InsufficientLockedAmount
            ))
        );
        let (lock, released) =
            unlock_multi_staking_token(&mut tracking_copy, lock_id, U512::from(10u64)).unwrap();
        assert!(lock.is_empty());
        assert_eq!(released, U512::from(10u64));
        assert_eq!(lock.conversion_rate(), Decimal::one());
        assert!(read_locks(&mut tracking_copy).unwrap().contains_key(&lock_id));

        assert_matches!(
            unlock_multi_staking_token(&mut tracking_copy, self::lock_id(2, 2), U512::one()),
            Err(Error::MultiStaking(MultiStakingError::LockNotFound))
        );
    }

    #[test]
    fn failed_move_should_leave_destination_untouched() {
        let mut tracking_copy = tracking_copy();
        let src = lock_id(1, 1);
        lock_multi_staking_token(
            &mut tracking_copy,
            src,
            AccountHash::new([9; 32]),
            &Coin::new(STAKE_A, 10u64),
        )
        .unwrap();

        let dst = ValidatorAddr::new([2; 32]);
        assert_matches!(
            move_locked_multi_staking_token(
                &mut tracking_copy,
                src.delegator,
                src.validator,
                dst,
                &Coin::new(STAKE_A, 20u64),
            ),
            Err(Error::MultiStaking(
                MultiStakingError::InsufficientLockedAmount
            ))
        );
        assert_eq!(
            read_lock(&mut tracking_copy, &LockId::new(src.delegator, dst)).unwrap(),
            None
        );
    }

    #[test]
    fn bond_mirror_should_saturate_and_prune() {
        let mut tracking_copy = tracking_copy();
        let lock_id = lock_id(1, 1);

        increase_bond_mirror(&mut tracking_copy, lock_id, U512::from(50u64)).unwrap();
        decrease_bond_mirror(&mut tracking_copy, lock_id, U512::from(20u64)).unwrap();
        assert_eq!(read_bond_mirror(&mut tracking_copy, &lock_id).unwrap(), U512::from(30u64));

        decrease_bond_mirror(&mut tracking_copy, lock_id, U512::from(40u64)).unwrap();
        assert_eq!(read_bond_mirror(&mut tracking_copy, &lock_id).unwrap(), U512::zero());
        assert!(read_bond_mirrors(&mut tracking_copy).unwrap().is_empty());
    }

    struct TestRuntime(TrackingCopy<InMemoryGlobalState>);

    impl RuntimeProvider for TestRuntime {
        fn module_name(&self) -> &str {
            DEFAULT_MODULE_NAME
        }

        fn minimum_delegation_amount(&self) -> U512 {
            U512::from(10u64)
        }
    }

    impl StorageProvider for TestRuntime {
        fn read(&mut self, key: &Key) -> Result<Option<StoredValue>, MultiStakingError> {
            StorageProvider::read(&mut self.0, key)
        }

        fn write(&mut self, key: Key, value: StoredValue) -> Result<(), MultiStakingError> {
            StorageProvider::write(&mut self.0, key, value)
        }

        fn prune(&mut self, key: Key) {
            StorageProvider::prune(&mut self.0, key)
        }

        fn get_keys(
            &mut self,
            key_tag: &KeyTag,
        ) -> Result<BTreeSet<Key>, MultiStakingError> {
            StorageProvider::get_keys(&mut self.0, key_tag)
        }
    }

    #[test]
    fn should_enforce_minimum_amount() {
        let mut runtime = TestRuntime(tracking_copy());
        assert_matches!(
            check_minimum_amount(&mut runtime, U512::from(9u64)),
            Err(Error::MultiStaking(
                MultiStakingError::DelegationAmountTooSmall
            ))
        );
        assert_matches!(
            check_minimum_amount(&mut runtime, U512::zero()),
            Err(Error::MultiStaking(MultiStakingError::InvalidAmount))
        );
        assert!(check_minimum_amount(&mut runtime, U512::from(10u64)).is_ok());
    }

    #[test]
    fn allowed_token_should_follow_validator_denom() {
        let mut tracking_copy = tracking_copy();
        let validator = ValidatorAddr::new([1; 32]);

        // Without a denom any weighted token is accepted.
        assert!(is_allowed_token(&mut tracking_copy, &validator, STAKE_A).unwrap());
        assert!(is_allowed_token(&mut tracking_copy, &validator, STAKE_B).unwrap());
        assert!(!is_allowed_token(&mut tracking_copy, &validator, "stake-c").unwrap());

        set_validator_bond_denom(&mut tracking_copy, validator, STAKE_B.to_string()).unwrap();
        assert!(is_allowed_token(&mut tracking_copy, &validator, STAKE_B).unwrap());
        assert!(!is_allowed_token(&mut tracking_copy, &validator, STAKE_A).unwrap());
    }

    #[test]
    fn unlock_should_release_lock_value_difference() {
        let mut tracking_copy = tracking_copy();
        let lock_id = lock_id(1, 1);
        let bond = lock_multi_staking_token(
            &mut tracking_copy,
            lock_id,
            AccountHash::new([9; 32]),
            &Coin::new(STAKE_B, 1_002u64),
        )
        .unwrap();
        assert_eq!(bond, U512::from(250u64));

        let (_, released) =
            unlock_multi_staking_token(&mut tracking_copy, lock_id, U512::from(1_000u64)).unwrap();
        assert_eq!(released, U512::from(250u64));
        let (lock, released) =
            unlock_multi_staking_token(&mut tracking_copy, lock_id, U512::from(2u64)).unwrap();
        assert!(lock.is_empty());
        assert_eq!(released, U512::zero());
    }

    proptest! {
        #[test]
        fn move_should_conserve_locked_total(
            delegator in gens::account_hash_arb(),
            src in gens::validator_addr_arb(),
            dst in gens::validator_addr_arb(),
            locked in 1u64..1_000_000_000,
            existing in 0u64..1_000_000_000,
            moved_fraction in 0u64..=100,
        ) {
            prop_assume!(src != dst);
            let mut tracking_copy = tracking_copy();
            let intermediary = AccountHash::new([9; 32]);
            let src_id = LockId::new(delegator, src);
            let dst_id = LockId::new(delegator, dst);

            let src_coin = Coin::new(STAKE_B, locked);
            lock_multi_staking_token(&mut tracking_copy, src_id, intermediary, &src_coin).unwrap();
            if existing > 0 {
                let dst_coin = Coin::new(STAKE_A, existing);
                lock_multi_staking_token(&mut tracking_copy, dst_id, intermediary, &dst_coin)
                    .unwrap();
            }

            let moved = locked / 100 * moved_fraction;
            prop_assume!(moved > 0);
            let moved_coin = Coin::new(STAKE_B, moved);
            move_locked_multi_staking_token(&mut tracking_copy, delegator, src, dst, &moved_coin)
                .unwrap();

            let src_lock = read_lock(&mut tracking_copy, &src_id).unwrap().unwrap();
            let dst_lock = read_lock(&mut tracking_copy, &dst_id).unwrap().unwrap();
            prop_assert_eq!(
                src_lock.locked_amount() + dst_lock.locked_amount(),
                U512::from(locked) + U512::from(existing)
            );
            prop_assert_eq!(src_lock.locked_amount(), U512::from(locked - moved));
            prop_assert_eq!(src_lock.conversion_rate(), "0.25".parse::<Decimal>().unwrap());
            prop_assert_eq!(dst_lock.intermediary_account(), &intermediary);
        }

        #[test]
        fn lock_value_should_never_exceed_bonded(
            numerators in proptest::collection::vec(1u64..1_000, 3),
            deposits in proptest::collection::vec((0usize..3, 1u64..10_000), 1..20),
            released in proptest::collection::vec(1u64..10_000, 0..10),
        ) {
            let mut tracking_copy = tracking_copy();
            let denoms = ["stake-x", "stake-y", "stake-z"];
            for (denom, numerator) in denoms.iter().zip(&numerators) {
                let weight = Decimal::from_parts(U512::from(*numerator), U512::from(7u64)).unwrap();
                set_bond_weight(&mut tracking_copy, denom.to_string(), weight).unwrap();
            }
            let lock_id = lock_id(1, 1);
            let intermediary = AccountHash::new([9; 32]);

            let mut bonded = U512::zero();
            for (index, amount) in deposits {
                let coin = Coin::new(denoms[index], amount);
                bonded += lock_multi_staking_token(&mut tracking_copy, lock_id, intermediary, &coin)
                    .unwrap();
                let lock = read_lock(&mut tracking_copy, &lock_id).unwrap().unwrap();
                prop_assert_eq!(lock.bond_amount().unwrap(), bonded);
            }

            for amount in released {
                let lock = read_lock(&mut tracking_copy, &lock_id).unwrap().unwrap();
                let amount = U512::from(amount).min(lock.locked_amount());
                let (lock, value) =
                    unlock_multi_staking_token(&mut tracking_copy, lock_id, amount).unwrap();
                bonded -= value;
                prop_assert_eq!(lock.bond_amount().unwrap(), bonded);
            }
        }
    }
}
