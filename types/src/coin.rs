//! Token amounts tagged with their denomination.

use std::fmt::{self, Display, Formatter};

use rand::{
    distributions::{Alphanumeric, Distribution, Standard},
    Rng,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bytesrepr::{self, FromBytes, ToBytes},
    U512,
};

/// Minimum length of a denomination.
pub const MIN_DENOM_LENGTH: usize = 3;
/// Maximum length of a denomination.
pub const MAX_DENOM_LENGTH: usize = 128;

/// Reasons a denomination string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDenom {
    /// The denomination is shorter than [`MIN_DENOM_LENGTH`] or longer than
    /// [`MAX_DENOM_LENGTH`].
    #[error("denom '{0}' must be between 3 and 128 characters")]
    Length(String),
    /// The denomination does not start with an ASCII letter.
    #[error("denom '{0}' must start with a letter")]
    LeadingCharacter(String),
    /// The denomination contains a character outside `[a-zA-Z0-9/:._-]`.
    #[error("denom '{denom}' contains invalid character '{character}'")]
    Character {
        /// The offending denomination.
        denom: String,
        /// The first invalid character.
        character: char,
    },
}

/// Checks that `denom` matches `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), InvalidDenom> {
    if denom.len() < MIN_DENOM_LENGTH || denom.len() > MAX_DENOM_LENGTH {
        return Err(InvalidDenom::Length(denom.to_string()));
    }
    let mut chars = denom.chars();
    if !chars.next().map_or(false, |ch| ch.is_ascii_alphabetic()) {
        return Err(InvalidDenom::LeadingCharacter(denom.to_string()));
    }
    if let Some(character) =
        chars.find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '/' | ':' | '.' | '_' | '-')))
    {
        return Err(InvalidDenom::Character {
            denom: denom.to_string(),
            character,
        });
    }
    Ok(())
}

/// An amount of a single denomination.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coin {
    /// The denomination.
    pub denom: String,
    /// The amount.
    pub amount: U512,
}

impl Coin {
    /// Constructs a new `Coin`.
    pub fn new<D: Into<String>, A: Into<U512>>(denom: D, amount: A) -> Self {
        Coin {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// Validates the denomination of this coin.
    pub fn validate(&self) -> Result<(), InvalidDenom> {
        validate_denom(&self.denom)
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl ToBytes for Coin {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.denom.serialized_length() + self.amount.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.denom.write_bytes(writer)?;
        self.amount.write_bytes(writer)
    }
}

impl FromBytes for Coin {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (denom, remainder) = String::from_bytes(bytes)?;
        let (amount, remainder) = U512::from_bytes(remainder)?;
        Ok((Coin { denom, amount }, remainder))
    }
}

impl Distribution<Coin> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Coin {
        let suffix: String = (0..8).map(|_| char::from(rng.sample(Alphanumeric))).collect();
        Coin {
            denom: format!("stake{}", suffix.to_lowercase()),
            amount: U512::from(rng.gen::<u64>()),
        }
    }
}
