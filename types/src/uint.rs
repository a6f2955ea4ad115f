//! Fixed-width unsigned integer used for locked and bonded token amounts.

use std::fmt::{self, Formatter};

use num_integer::Integer;
use num_traits::{Bounded, CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Num, One, Zero};
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};

#[allow(
    clippy::assign_op_pattern,
    clippy::ptr_offset_with_cast,
    clippy::manual_range_contains,
    clippy::range_plus_one,
    clippy::transmute_ptr_to_ptr,
    clippy::reversed_empty_ranges,
    clippy::manual_div_ceil
)]
mod macro_code {
    use uint::construct_uint;

    construct_uint! {
        /// 512-bit unsigned integer.
        pub struct U512(8);
    }
}

pub use self::macro_code::U512;

const U512_BYTE_LENGTH: usize = 64;

/// Error type for parsing [`U512`] from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UIntParseError {
    /// Contains the parsing error from the `uint` crate, which only supports base-10 parsing.
    #[error("invalid decimal integer")]
    FromDecStr,
    /// Parsing was attempted on a string representing the number in some base other than 10.
    #[error("invalid digit for radix {0}")]
    InvalidDigit(u32),
    /// The parsed value does not fit in 512 bits.
    #[error("value exceeds 512 bits")]
    Overflow,
}

impl U512 {
    /// Parses a base-10 string, e.g. `"1000000"`.
    pub fn parse_decimal(input: &str) -> Result<Self, UIntParseError> {
        U512::from_dec_str(input).map_err(|_| UIntParseError::FromDecStr)
    }
}

impl Zero for U512 {
    fn zero() -> Self {
        U512::zero()
    }

    fn is_zero(&self) -> bool {
        self.is_zero()
    }
}

impl One for U512 {
    fn one() -> Self {
        U512::one()
    }
}

impl Num for U512 {
    type FromStrRadixErr = UIntParseError;

    fn from_str_radix(input: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        if radix == 10 {
            return U512::parse_decimal(input);
        }
        if input.is_empty() {
            return Err(UIntParseError::InvalidDigit(radix));
        }
        let base = U512::from(radix);
        input.chars().try_fold(U512::zero(), |acc, ch| {
            let digit = ch
                .to_digit(radix)
                .ok_or(UIntParseError::InvalidDigit(radix))?;
            acc.checked_mul(base)
                .and_then(|value| value.checked_add(U512::from(digit)))
                .ok_or(UIntParseError::Overflow)
        })
    }
}

impl Bounded for U512 {
    fn min_value() -> Self {
        U512::zero()
    }

    fn max_value() -> Self {
        U512::max_value()
    }
}

impl CheckedAdd for U512 {
    fn checked_add(&self, v: &Self) -> Option<Self> {
        U512::checked_add(*self, *v)
    }
}

impl CheckedSub for U512 {
    fn checked_sub(&self, v: &Self) -> Option<Self> {
        U512::checked_sub(*self, *v)
    }
}

impl CheckedMul for U512 {
    fn checked_mul(&self, v: &Self) -> Option<Self> {
        U512::checked_mul(*self, *v)
    }
}

impl CheckedDiv for U512 {
    fn checked_div(&self, v: &Self) -> Option<Self> {
        U512::checked_div(*self, *v)
    }
}

impl Integer for U512 {
    fn div_floor(&self, other: &Self) -> Self {
        *self / *other
    }

    fn mod_floor(&self, other: &Self) -> Self {
        *self % *other
    }

    fn gcd(&self, other: &Self) -> Self {
        let (mut a, mut b) = (*self, *other);
        while !b.is_zero() {
            let remainder = a % b;
            a = b;
            b = remainder;
        }
        a
    }

    fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return U512::zero();
        }
        *self / self.gcd(other) * *other
    }

    fn divides(&self, other: &Self) -> bool {
        self.is_multiple_of(other)
    }

    fn is_multiple_of(&self, other: &Self) -> bool {
        if other.is_zero() {
            return self.is_zero();
        }
        (*self % *other).is_zero()
    }

    fn is_even(&self) -> bool {
        self.0[0] & 1 == 0
    }

    fn is_odd(&self) -> bool {
        !self.is_even()
    }

    fn div_rem(&self, other: &Self) -> (Self, Self) {
        self.div_mod(*other)
    }
}

impl ToBytes for U512 {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH + (self.bits() + 7) / 8
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let mut le_bytes = [0u8; U512_BYTE_LENGTH];
        self.to_little_endian(&mut le_bytes);
        let non_zero_len = (self.bits() + 7) / 8;
        writer.push(non_zero_len as u8);
        writer.extend_from_slice(&le_bytes[..non_zero_len]);
        Ok(())
    }
}

impl FromBytes for U512 {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (num_bytes, remainder) = u8::from_bytes(bytes)?;
        let num_bytes = num_bytes as usize;
        if num_bytes > U512_BYTE_LENGTH {
            return Err(bytesrepr::Error::Formatting);
        }
        let (value_bytes, remainder) = bytesrepr::safe_split_at(remainder, num_bytes)?;
        Ok((U512::from_little_endian(value_bytes), remainder))
    }
}

impl Serialize for U512 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct U512Visitor;

impl<'de> Visitor<'de> for U512Visitor {
    type Value = U512;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a base-10 unsigned integer string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<U512, E> {
        U512::parse_decimal(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<U512, E> {
        Ok(U512::from(value))
    }
}

impl<'de> Deserialize<'de> for U512 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(U512Visitor)
    }
}

impl Distribution<U512> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> U512 {
        let mut raw_bytes = [0u8; U512_BYTE_LENGTH];
        rng.fill_bytes(raw_bytes.as_mut());
        U512::from_little_endian(&raw_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytesrepr;

    #[test]
    fn should_round_trip_through_bytesrepr() {
        for value in [
            U512::zero(),
            U512::one(),
            U512::from(u64::MAX),
            U512::max_value(),
        ] {
            bytesrepr::test_serialization_roundtrip(&value);
        }
        assert_eq!(U512::zero().serialized_length(), 1);
        assert_eq!(U512::from(256u64).serialized_length(), 3);
    }

    #[test]
    fn should_parse_radix() {
        assert_eq!(<U512 as Num>::from_str_radix("ff", 16), Ok(U512::from(255u64)));
        assert_eq!(<U512 as Num>::from_str_radix("1000", 10), Ok(U512::from(1000u64)));
        assert_eq!(
            <U512 as Num>::from_str_radix("1z", 16),
            Err(UIntParseError::InvalidDigit(16))
        );
    }

    #[test]
    fn should_compute_gcd_and_lcm() {
        let a = U512::from(84u64);
        let b = U512::from(36u64);
        assert_eq!(a.gcd(&b), U512::from(12u64));
        assert_eq!(a.lcm(&b), U512::from(252u64));
        assert!(a.is_even());
        assert!(U512::from(7u64).is_odd());
        assert_eq!(a.div_rem(&b), (U512::from(2u64), U512::from(12u64)));
    }

    #[test]
    fn should_serialize_as_decimal_string() {
        let value = U512::from(123_456_789u64);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"123456789\"");
        let decoded: U512 = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, value);
    }
}
