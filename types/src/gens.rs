//! Contains functions for generating arbitrary values for use by
//! [`Proptest`](https://crates.io/crates/proptest).
#![allow(missing_docs)]

use proptest::{array, prelude::*};

use crate::{
    multi_staking::MultiStakingLock, AccountHash, Coin, Decimal, LockId, ValidatorAddr, U512,
};

pub fn u512_arb() -> impl Strategy<Value = U512> {
    any::<u64>().prop_map(U512::from)
}

pub fn account_hash_arb() -> impl Strategy<Value = AccountHash> {
    array::uniform32(<u8>::arbitrary()).prop_map(AccountHash::new)
}

pub fn validator_addr_arb() -> impl Strategy<Value = ValidatorAddr> {
    array::uniform32(<u8>::arbitrary()).prop_map(ValidatorAddr::new)
}

pub fn lock_id_arb() -> impl Strategy<Value = LockId> {
    (account_hash_arb(), validator_addr_arb())
        .prop_map(|(delegator, validator)| LockId::new(delegator, validator))
}

/// Weights in `[0, 10)` with denominators up to 1000.
pub fn weight_arb() -> impl Strategy<Value = Decimal> {
    (0u64..10_000, 1u64..=1_000).prop_filter_map("weight below 10", |(numer, denom)| {
        let weight = Decimal::from_parts(numer.into(), denom.into())?;
        if weight < Decimal::from_integer(10u64) {
            Some(weight)
        } else {
            None
        }
    })
}

pub fn denom_arb() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{2,15}"
}

pub fn coin_arb() -> impl Strategy<Value = Coin> {
    (denom_arb(), 1u64..u64::MAX).prop_map(|(denom, amount)| Coin::new(denom, amount))
}

pub fn multi_staking_lock_arb() -> impl Strategy<Value = MultiStakingLock> {
    (account_hash_arb(), u512_arb(), weight_arb()).prop_map(
        |(intermediary_account, locked_amount, conversion_rate)| {
            MultiStakingLock::new(intermediary_account, locked_amount, conversion_rate)
        },
    )
}
