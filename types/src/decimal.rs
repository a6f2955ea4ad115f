//! Exact non-negative decimal values used for token weights and conversion rates.

use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use num_integer::Integer;
use num_rational::Ratio;
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{
    bytesrepr::{self, FromBytes, ToBytes},
    U512,
};

/// Number of fractional digits retained when a value has to be approximated.
pub const DECIMAL_PRECISION: usize = 18;

/// Errors parsing a [`Decimal`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    /// The input was empty or had an empty integer, fractional or fraction part.
    #[error("empty decimal component in '{0}'")]
    Empty(String),
    /// A component was not made of ASCII digits or did not fit in 512 bits.
    #[error("invalid decimal '{0}'")]
    Invalid(String),
    /// The fraction had a zero denominator.
    #[error("zero denominator in '{0}'")]
    ZeroDenominator(String),
}

fn precision_scale() -> U512 {
    U512::exp10(DECIMAL_PRECISION)
}

fn parse_digits(component: &str, input: &str) -> Result<U512, DecimalParseError> {
    if component.is_empty() {
        return Err(DecimalParseError::Empty(input.to_string()));
    }
    if !component.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(DecimalParseError::Invalid(input.to_string()));
    }
    U512::parse_decimal(component).map_err(|_| DecimalParseError::Invalid(input.to_string()))
}

/// Divides `dividend` by `divisor`, rounding half to even.
///
/// Returns `None` if `divisor` is zero or the rounded quotient overflows.
pub fn div_round_half_even(dividend: U512, divisor: U512) -> Option<U512> {
    if divisor.is_zero() {
        return None;
    }
    let (quotient, remainder) = dividend.div_mod(divisor);
    let complement = divisor - remainder;
    match remainder.cmp(&complement) {
        Ordering::Less => Some(quotient),
        Ordering::Greater => quotient.checked_add(U512::one()),
        Ordering::Equal if quotient.is_even() => Some(quotient),
        Ordering::Equal => quotient.checked_add(U512::one()),
    }
}

/// A non-negative rational number.
///
/// Parsed from decimal strings (`"0.25"`) or fractions (`"1/3"`), and displayed as a decimal when
/// it has an exact representation with at most [`DECIMAL_PRECISION`] fractional digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(Ratio<U512>);

impl Decimal {
    /// Constructs a reduced `Decimal` from a numerator and denominator, or `None` if
    /// `denominator` is zero.
    pub fn from_parts(numerator: U512, denominator: U512) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(Decimal(Ratio::new(numerator, denominator)))
    }

    /// Constructs a `Decimal` representing a whole number.
    pub fn from_integer<T: Into<U512>>(value: T) -> Self {
        Decimal(Ratio::from_integer(value.into()))
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Decimal::from_integer(U512::zero())
    }

    /// Returns one.
    pub fn one() -> Self {
        Decimal::from_integer(U512::one())
    }

    /// Returns `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.numer().is_zero()
    }

    /// The reduced numerator.
    pub fn numer(&self) -> U512 {
        *self.0.numer()
    }

    /// The reduced denominator.
    pub fn denom(&self) -> U512 {
        *self.0.denom()
    }

    /// Returns the value rounded half to even to [`DECIMAL_PRECISION`] fractional digits when its
    /// denominator exceeds `10^DECIMAL_PRECISION`, otherwise the value unchanged.
    pub fn quantize(self) -> Option<Self> {
        let scale = precision_scale();
        if self.denom() <= scale {
            return Some(self);
        }
        let scaled_numer = self
            .numer()
            .checked_mul(scale)
            .and_then(|value| div_round_half_even(value, self.denom()))?;
        Decimal::from_parts(scaled_numer, scale)
    }

    /// Multiplies a whole `amount` by this value and rounds the result half to even.
    pub fn checked_mul_round_half_even(&self, amount: U512) -> Option<U512> {
        let product = amount.checked_mul(self.numer())?;
        div_round_half_even(product, self.denom())
    }

    /// Divides a whole `amount` by this value and rounds the result half to even.
    ///
    /// Returns `None` if this value is zero.
    pub fn checked_div_round_half_even(&self, amount: U512) -> Option<U512> {
        let product = amount.checked_mul(self.denom())?;
        div_round_half_even(product, self.numer())
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal::zero()
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Some((numer, denom)) = input.split_once('/') {
            let numer = parse_digits(numer, input)?;
            let denom = parse_digits(denom, input)?;
            return Decimal::from_parts(numer, denom)
                .ok_or_else(|| DecimalParseError::ZeroDenominator(input.to_string()));
        }
        let (integer, fraction) = match input.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (input, ""),
        };
        let integer = parse_digits(integer, input)?;
        if fraction.is_empty() {
            if input.ends_with('.') {
                return Err(DecimalParseError::Empty(input.to_string()));
            }
            return Ok(Decimal::from_integer(integer));
        }
        let fraction_value = parse_digits(fraction, input)?;
        let invalid = || DecimalParseError::Invalid(input.to_string());
        let scale = U512::from(10u64)
            .checked_pow(U512::from(fraction.len()))
            .ok_or_else(invalid)?;
        let numer = integer
            .checked_mul(scale)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or_else(invalid)?;
        Decimal::from_parts(numer, scale).ok_or_else(invalid)
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let scale = precision_scale();
        let (multiplier, remainder) = scale.div_mod(self.denom());
        if !remainder.is_zero() {
            return write!(f, "{}/{}", self.numer(), self.denom());
        }
        let scaled = match self.numer().checked_mul(multiplier) {
            Some(scaled) => scaled,
            None => return write!(f, "{}/{}", self.numer(), self.denom()),
        };
        let (integer, fraction) = scaled.div_mod(scale);
        if fraction.is_zero() {
            return write!(f, "{}", integer);
        }
        let digits = format!("{:0>width$}", fraction.to_string(), width = DECIMAL_PRECISION);
        write!(f, "{}.{}", integer, digits.trim_end_matches('0'))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Decimal::from_str(&value).map_err(SerdeError::custom)
    }
}

impl ToBytes for Decimal {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.numer().serialized_length() + self.denom().serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.numer().write_bytes(writer)?;
        self.denom().write_bytes(writer)
    }
}

impl FromBytes for Decimal {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (numer, remainder) = U512::from_bytes(bytes)?;
        let (denom, remainder) = U512::from_bytes(remainder)?;
        let decimal = Decimal::from_parts(numer, denom).ok_or(bytesrepr::Error::Formatting)?;
        Ok((decimal, remainder))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn dec(input: &str) -> Decimal {
        input.parse().unwrap()
    }

    #[test]
    fn should_parse_and_display() {
        assert_eq!(dec("0.25").to_string(), "0.25");
        assert_eq!(dec("1").to_string(), "1");
        assert_eq!(dec("1.000").to_string(), "1");
        assert_eq!(dec("2/4").to_string(), "0.5");
        assert_eq!(dec("1/3").to_string(), "1/3");
        assert_eq!(dec("12.5"), Decimal::from_parts(25.into(), 2.into()).unwrap());
        assert_eq!(dec("0.000000000000000001").to_string(), "0.000000000000000001");
    }

    #[test]
    fn should_reject_malformed_input() {
        assert_matches!("".parse::<Decimal>(), Err(DecimalParseError::Empty(_)));
        assert_matches!(".5".parse::<Decimal>(), Err(DecimalParseError::Empty(_)));
        assert_matches!("5.".parse::<Decimal>(), Err(DecimalParseError::Empty(_)));
        assert_matches!("-1".parse::<Decimal>(), Err(DecimalParseError::Invalid(_)));
        assert_matches!("1e5".parse::<Decimal>(), Err(DecimalParseError::Invalid(_)));
        assert_matches!(
            "1/0".parse::<Decimal>(),
            Err(DecimalParseError::ZeroDenominator(_))
        );
    }

    #[test]
    fn should_round_half_to_even() {
        let half = dec("0.5");
        assert_eq!(half.checked_mul_round_half_even(1.into()), Some(0.into()));
        assert_eq!(half.checked_mul_round_half_even(3.into()), Some(2.into()));
        assert_eq!(half.checked_mul_round_half_even(5.into()), Some(2.into()));
        assert_eq!(dec("0.25").checked_mul_round_half_even(7.into()), Some(2.into()));
        assert_eq!(dec("0.25").checked_mul_round_half_even(6.into()), Some(2.into()));
        assert_eq!(dec("0.25").checked_mul_round_half_even(10.into()), Some(2.into()));
        assert_eq!(dec("0.25").checked_div_round_half_even(25.into()), Some(100.into()));
        assert_eq!(Decimal::zero().checked_div_round_half_even(1.into()), None);
        assert_eq!(div_round_half_even(1.into(), U512::zero()), None);
    }

    #[test]
    fn should_quantize_long_denominators() {
        let third = dec("1/3");
        assert_eq!(third.quantize(), Some(third));
        let tiny = Decimal::from_parts(1.into(), precision_scale() * U512::from(3u64)).unwrap();
        assert_eq!(tiny.quantize(), Some(Decimal::zero()));
        let value = Decimal::from_parts(2.into(), precision_scale() * U512::from(3u64)).unwrap();
        assert_eq!(value.quantize().unwrap().to_string(), "0.000000000000000001");
    }

    #[test]
    fn should_encode_decimal() {
        let rate = dec("3/7");
        bytesrepr::test_serialization_roundtrip(&rate);
        assert_eq!(serde_json::to_string(&dec("0.25")).unwrap(), "\"0.25\"");
        assert_eq!(serde_json::from_str::<Decimal>("\"3/7\"").unwrap(), rate);

        let mut bytes = U512::one().to_bytes().unwrap();
        bytes.extend(U512::zero().to_bytes().unwrap());
        assert_eq!(
            Decimal::from_bytes(&bytes).unwrap_err(),
            bytesrepr::Error::Formatting
        );
    }
}
