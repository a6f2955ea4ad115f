//! Value types, binary encoding and errors of the multi-staking lock ledger.
//!
//! A validator accepts delegations in a single denomination chosen when it is created. Delegated
//! tokens are locked per (delegator, validator) pair and converted into bond units of the
//! underlying bonding engine through per-denomination weights.

#![doc(test(attr(forbid(warnings))))]
#![warn(missing_docs)]

mod account_hash;
pub mod bytesrepr;
pub mod coin;
pub mod crypto;
mod decimal;
#[cfg(any(feature = "testing", test))]
pub mod gens;
mod key;
pub mod multi_staking;
mod stored_value;
mod uint;
mod validator_addr;

pub use account_hash::{
    AccountHash, FromStrError, ACCOUNT_HASH_FORMATTED_STRING_PREFIX, ACCOUNT_HASH_LENGTH,
};
pub use coin::Coin;
pub use decimal::{div_round_half_even, Decimal, DecimalParseError, DECIMAL_PRECISION};
pub use key::{Key, KeyTag, LockId};
pub use stored_value::StoredValue;
pub use uint::{UIntParseError, U512};
pub use validator_addr::{
    ValidatorAddr, VALIDATOR_ADDR_FORMATTED_STRING_PREFIX, VALIDATOR_ADDR_LENGTH,
};
