use serde::{Deserialize, Serialize};

use super::Error;
use crate::{
    bytesrepr::{self, FromBytes, ToBytes},
    AccountHash, Decimal, U512,
};

/// Blends an existing conversion rate with a newly added amount and weight.
///
/// Returns `(old_locked * old_rate + added * added_weight) / (old_locked + added)`, quantized to
/// [`DECIMAL_PRECISION`](crate::DECIMAL_PRECISION) digits when the exact denominator grows too
/// long. If nothing is locked afterwards the added weight is returned unchanged.
pub fn weighted_average_rate(
    old_locked: U512,
    old_rate: Decimal,
    added: U512,
    added_weight: Decimal,
) -> Result<Decimal, Error> {
    let total = old_locked
        .checked_add(added)
        .ok_or(Error::ArithmeticOverflow)?;
    if total.is_zero() {
        return Ok(added_weight);
    }
    let mul = |a: U512, b: U512| a.checked_mul(b).ok_or(Error::ArithmeticOverflow);

    let old_part = mul(mul(old_locked, old_rate.numer())?, added_weight.denom())?;
    let added_part = mul(mul(added, added_weight.numer())?, old_rate.denom())?;
    let numerator = old_part
        .checked_add(added_part)
        .ok_or(Error::ArithmeticOverflow)?;
    let denominator = mul(mul(total, old_rate.denom())?, added_weight.denom())?;

    Decimal::from_parts(numerator, denominator)
        .and_then(Decimal::quantize)
        .ok_or(Error::ArithmeticOverflow)
}

/// Tokens locked by a delegator against a validator, with the running conversion rate into bond
/// units.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MultiStakingLock {
    intermediary_account: AccountHash,
    locked_amount: U512,
    conversion_rate: Decimal,
}

impl MultiStakingLock {
    /// Creates a new lock holding `locked_amount` at `conversion_rate`.
    pub fn new(
        intermediary_account: AccountHash,
        locked_amount: U512,
        conversion_rate: Decimal,
    ) -> Self {
        MultiStakingLock {
            intermediary_account,
            locked_amount,
            conversion_rate,
        }
    }

    /// The intermediary account acting for the lock's delegator.
    pub fn intermediary_account(&self) -> &AccountHash {
        &self.intermediary_account
    }

    /// The amount locked, in the validator's accepted denomination.
    pub fn locked_amount(&self) -> U512 {
        self.locked_amount
    }

    /// Bond units per locked unit.
    pub fn conversion_rate(&self) -> Decimal {
        self.conversion_rate
    }

    /// Returns `true` if nothing remains locked.
    pub fn is_empty(&self) -> bool {
        self.locked_amount.is_zero()
    }

    /// Locks `amount` more tokens converted at `weight`, re-averaging the conversion rate.
    pub fn add_token(&mut self, amount: U512, weight: Decimal) -> Result<(), Error> {
        let rate = weighted_average_rate(self.locked_amount, self.conversion_rate, amount, weight)?;
        self.locked_amount = self
            .locked_amount
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        self.conversion_rate = rate;
        Ok(())
    }

    /// Releases `amount` tokens. The conversion rate is unchanged.
    pub fn remove_token(&mut self, amount: U512) -> Result<(), Error> {
        self.locked_amount = self
            .locked_amount
            .checked_sub(amount)
            .ok_or(Error::InsufficientLockedAmount)?;
        Ok(())
    }

    /// Converts `amount` locked tokens into bond units, rounding half to even.
    pub fn locked_amount_to_bond_amount(&self, amount: U512) -> Result<U512, Error> {
        self.conversion_rate
            .checked_mul_round_half_even(amount)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// The bond value of everything locked.
    pub fn bond_amount(&self) -> Result<U512, Error> {
        self.locked_amount_to_bond_amount(self.locked_amount)
    }
}

impl ToBytes for MultiStakingLock {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut result = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut result)?;
        Ok(result)
    }

    fn serialized_length(&self) -> usize {
        self.intermediary_account.serialized_length()
            + self.locked_amount.serialized_length()
            + self.conversion_rate.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.intermediary_account.write_bytes(writer)?;
        self.locked_amount.write_bytes(writer)?;
        self.conversion_rate.write_bytes(writer)?;
        Ok(())
    }
}

impl FromBytes for MultiStakingLock {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (intermediary_account, bytes) = AccountHash::from_bytes(bytes)?;
        let (locked_amount, bytes) = U512::from_bytes(bytes)?;
        let (conversion_rate, bytes) = Decimal::from_bytes(bytes)?;
        Ok((
            MultiStakingLock {
                intermediary_account,
                locked_amount,
                conversion_rate,
            },
            bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::{collection::vec, prelude::*};

    use super::*;
    use crate::decimal::div_round_half_even;

    fn weight(numer: u64, denom: u64) -> Decimal {
        Decimal::from_parts(numer.into(), denom.into()).unwrap()
    }

    fn lock(amount: u64, rate: Decimal) -> MultiStakingLock {
        MultiStakingLock::new(AccountHash::new([1; 32]), amount.into(), rate)
    }

    #[test]
    fn serialization_roundtrip() {
        bytesrepr::test_serialization_roundtrip(&lock(150, weight(5, 8)));
    }

    #[test]
    fn should_average_rates_by_contributed_amount() {
        let mut lock = lock(100, Decimal::one());
        lock.add_token(100.into(), weight(1, 4)).unwrap();
        assert_eq!(lock.locked_amount(), U512::from(200u64));
        assert_eq!(lock.conversion_rate(), weight(5, 8));
        assert_eq!(lock.bond_amount().unwrap(), U512::from(125u64));

        lock.add_token(50.into(), weight(5, 8)).unwrap();
        assert_eq!(lock.conversion_rate(), weight(5, 8));
    }

    #[test]
    fn should_keep_rate_on_removal() {
        let mut lock = lock(150, weight(1, 4));
        lock.remove_token(150.into()).unwrap();
        assert!(lock.is_empty());
        assert_eq!(lock.conversion_rate(), weight(1, 4));
        assert_matches!(
            lock.remove_token(1.into()),
            Err(Error::InsufficientLockedAmount)
        );
        assert!(lock.is_empty());
    }

    #[test]
    fn should_take_added_weight_for_empty_pool() {
        assert_eq!(
            weighted_average_rate(U512::zero(), weight(1, 3), U512::zero(), weight(2, 3)),
            Ok(weight(2, 3))
        );
        let mut empty = lock(0, weight(1, 3));
        empty.add_token(30.into(), weight(1, 4)).unwrap();
        assert_eq!(empty.conversion_rate(), weight(1, 4));
    }

    #[test]
    fn should_round_bond_amount_half_to_even() {
        let lock = lock(10, weight(1, 4));
        assert_eq!(lock.locked_amount_to_bond_amount(2.into()), Ok(U512::zero()));
        assert_eq!(lock.locked_amount_to_bond_amount(6.into()), Ok(U512::from(2u64)));
        assert_eq!(lock.locked_amount_to_bond_amount(10.into()), Ok(U512::from(2u64)));
        assert_eq!(lock.locked_amount_to_bond_amount(14.into()), Ok(U512::from(4u64)));
    }

    fn weights() -> impl Strategy<Value = (u64, u64)> {
        (0u64..1_000, 1u64..1_000)
    }

    proptest! {
        #[test]
        fn weighted_average_conserves_bond_value(
            deposits in vec((1u64..1_000_000_000_000, weights()), 1..8)
        ) {
            let (first_amount, (numer, denom)) = deposits[0];
            let mut lock = lock(first_amount, weight(numer, denom));
            for (amount, (numer, denom)) in &deposits[1..] {
                lock.add_token((*amount).into(), weight(*numer, *denom)).unwrap();
            }

            let total: u64 = deposits.iter().map(|(amount, _)| amount).sum();
            prop_assert_eq!(lock.locked_amount(), U512::from(total));

            let common_denom = deposits
                .iter()
                .fold(U512::one(), |acc, (_, (_, denom))| acc * U512::from(*denom));
            let exact_numer = deposits.iter().fold(U512::zero(), |acc, (amount, (numer, denom))| {
                acc + U512::from(*amount) * U512::from(*numer) * (common_denom / U512::from(*denom))
            });
            let expected = div_round_half_even(exact_numer, common_denom).unwrap();
            let actual = lock.bond_amount().unwrap();
            let difference = if actual > expected { actual - expected } else { expected - actual };
            prop_assert!(difference <= U512::one(), "{} vs {}", actual, expected);
        }

        #[test]
        fn conversion_round_trips_within_one_unit(
            locked in 1u64..1_000_000_000_000,
            fraction in 0u64..=1_000,
            (numer, denom) in (1u64..1_000, 1u64..1_000),
        ) {
            let rate = weight(numer, denom);
            let lock = lock(locked, rate);
            let amount = U512::from(locked) * U512::from(fraction) / U512::from(1_000u64);

            let bond = lock.locked_amount_to_bond_amount(amount).unwrap();
            let back = rate.checked_div_round_half_even(bond).unwrap();
            let difference = if back > amount { back - amount } else { amount - back };
            prop_assert!(
                difference <= U512::one() || difference * rate.numer() <= rate.denom(),
                "{} -> {} -> {}", amount, bond, back
            );
        }

        #[test]
        fn removing_then_adding_conserves_locked_total(
            src_amount in 0u64..1_000_000,
            dst_amount in 0u64..1_000_000,
            moved in 0u64..1_000_000,
            (numer, denom) in weights(),
        ) {
            let mut src = lock(src_amount, weight(numer, denom));
            let mut dst = lock(dst_amount, Decimal::one());
            match src.remove_token(moved.into()) {
                Ok(()) => {
                    dst.add_token(moved.into(), weight(numer, denom)).unwrap();
                    prop_assert_eq!(
                        src.locked_amount() + dst.locked_amount(),
                        U512::from(src_amount + dst_amount)
                    );
                }
                Err(error) => {
                    prop_assert_eq!(error, Error::InsufficientLockedAmount);
                    prop_assert!(moved > src_amount);
                    prop_assert_eq!(src.locked_amount(), U512::from(src_amount));
                }
            }
        }
    }
}
