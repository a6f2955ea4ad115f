//! Validator operator identities.

use std::{
    convert::TryFrom,
    fmt::{self, Debug, Display, Formatter},
};

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    account_hash::FromStrError,
    bytesrepr::{self, FromBytes, ToBytes},
};

/// The prefix applied to the hex-encoded `ValidatorAddr` to produce a formatted string
/// representation.
pub const VALIDATOR_ADDR_FORMATTED_STRING_PREFIX: &str = "validator-";
/// The number of bytes in a [`ValidatorAddr`].
pub const VALIDATOR_ADDR_LENGTH: usize = 32;

/// The operator address of a validator.
#[derive(Default, PartialOrd, Ord, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ValidatorAddr([u8; VALIDATOR_ADDR_LENGTH]);

impl ValidatorAddr {
    /// Constructs a new `ValidatorAddr` from raw bytes.
    pub const fn new(value: [u8; VALIDATOR_ADDR_LENGTH]) -> Self {
        ValidatorAddr(value)
    }

    /// Returns the raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Formats the address as `validator-<hex>`.
    pub fn to_formatted_string(self) -> String {
        format!(
            "{}{}",
            VALIDATOR_ADDR_FORMATTED_STRING_PREFIX,
            base16::encode_lower(&self.0)
        )
    }

    /// Parses a string formatted as per `Self::to_formatted_string()`.
    pub fn from_formatted_str(input: &str) -> Result<Self, FromStrError> {
        let remainder = input
            .strip_prefix(VALIDATOR_ADDR_FORMATTED_STRING_PREFIX)
            .ok_or(FromStrError::InvalidPrefix(
                VALIDATOR_ADDR_FORMATTED_STRING_PREFIX,
            ))?;
        let bytes =
            <[u8; VALIDATOR_ADDR_LENGTH]>::try_from(base16::decode(remainder)?.as_ref())?;
        Ok(ValidatorAddr(bytes))
    }
}

impl Serialize for ValidatorAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.to_formatted_string().serialize(serializer)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ValidatorAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let formatted_string = String::deserialize(deserializer)?;
            ValidatorAddr::from_formatted_str(&formatted_string).map_err(SerdeError::custom)
        } else {
            let bytes = <[u8; VALIDATOR_ADDR_LENGTH]>::deserialize(deserializer)?;
            Ok(ValidatorAddr(bytes))
        }
    }
}

impl Display for ValidatorAddr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", base16::encode_lower(&self.0))
    }
}

impl Debug for ValidatorAddr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ValidatorAddr({})", base16::encode_lower(&self.0))
    }
}

impl ToBytes for ValidatorAddr {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        VALIDATOR_ADDR_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.extend_from_slice(&self.0);
        Ok(())
    }
}

impl FromBytes for ValidatorAddr {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (bytes, rem) = FromBytes::from_bytes(bytes)?;
        Ok((ValidatorAddr(bytes), rem))
    }
}

impl Distribution<ValidatorAddr> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ValidatorAddr {
        ValidatorAddr(rng.gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_formatted_validator_addr() {
        let addr = ValidatorAddr::new([0xab; 32]);
        let formatted = addr.to_formatted_string();
        assert!(formatted.starts_with("validator-abab"));
        assert_eq!(ValidatorAddr::from_formatted_str(&formatted).unwrap(), addr);
        assert!(ValidatorAddr::from_formatted_str(&addr.to_string()).is_err());
        assert!(ValidatorAddr::from_formatted_str("validator-abab").is_err());
    }

    #[test]
    fn should_not_accept_account_hash_prefix() {
        let formatted = format!("account-hash-{}", base16::encode_lower(&[1u8; 32]));
        assert!(matches!(
            ValidatorAddr::from_formatted_str(&formatted),
            Err(FromStrError::InvalidPrefix(_))
        ));
    }
}
