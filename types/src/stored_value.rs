use std::convert::TryFrom;

use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH},
    multi_staking::MultiStakingLock,
    AccountHash, Decimal, U512,
};

#[repr(u8)]
enum Tag {
    Weight = 0,
    Denom = 1,
    Account = 2,
    Lock = 3,
    Amount = 4,
}

impl TryFrom<u8> for Tag {
    type Error = bytesrepr::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            d if d == Tag::Weight as u8 => Ok(Tag::Weight),
            d if d == Tag::Denom as u8 => Ok(Tag::Denom),
            d if d == Tag::Account as u8 => Ok(Tag::Account),
            d if d == Tag::Lock as u8 => Ok(Tag::Lock),
            d if d == Tag::Amount as u8 => Ok(Tag::Amount),
            _ => Err(bytesrepr::Error::Formatting),
        }
    }
}

/// StoredValue represents all possible variants of values stored in multi-staking state.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum StoredValue {
    /// A denomination's conversion weight.
    Weight(Decimal),
    /// A validator's accepted denomination.
    Denom(String),
    /// One side of an intermediary account binding.
    Account(AccountHash),
    /// A lock record.
    Lock(MultiStakingLock),
    /// A bond mirror amount.
    Amount(U512),
}

impl StoredValue {
    /// Returns the type name of the [`StoredValue`] enum variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Weight(_) => "Weight",
            StoredValue::Denom(_) => "Denom",
            StoredValue::Account(_) => "Account",
            StoredValue::Lock(_) => "Lock",
            StoredValue::Amount(_) => "Amount",
        }
    }

    fn tag(&self) -> Tag {
        match self {
            StoredValue::Weight(_) => Tag::Weight,
            StoredValue::Denom(_) => Tag::Denom,
            StoredValue::Account(_) => Tag::Account,
            StoredValue::Lock(_) => Tag::Lock,
            StoredValue::Amount(_) => Tag::Amount,
        }
    }
}

impl ToBytes for StoredValue {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut result = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut result)?;
        Ok(result)
    }

    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                StoredValue::Weight(weight) => weight.serialized_length(),
                StoredValue::Denom(denom) => denom.serialized_length(),
                StoredValue::Account(account) => account.serialized_length(),
                StoredValue::Lock(lock) => lock.serialized_length(),
                StoredValue::Amount(amount) => amount.serialized_length(),
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.tag() as u8);
        match self {
            StoredValue::Weight(weight) => weight.write_bytes(writer),
            StoredValue::Denom(denom) => denom.write_bytes(writer),
            StoredValue::Account(account) => account.write_bytes(writer),
            StoredValue::Lock(lock) => lock.write_bytes(writer),
            StoredValue::Amount(amount) => amount.write_bytes(writer),
        }
    }
}

impl FromBytes for StoredValue {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        match Tag::try_from(tag)? {
            Tag::Weight => Decimal::from_bytes(remainder)
                .map(|(weight, remainder)| (StoredValue::Weight(weight), remainder)),
            Tag::Denom => String::from_bytes(remainder)
                .map(|(denom, remainder)| (StoredValue::Denom(denom), remainder)),
            Tag::Account => AccountHash::from_bytes(remainder)
                .map(|(account, remainder)| (StoredValue::Account(account), remainder)),
            Tag::Lock => MultiStakingLock::from_bytes(remainder)
                .map(|(lock, remainder)| (StoredValue::Lock(lock), remainder)),
            Tag::Amount => U512::from_bytes(remainder)
                .map(|(amount, remainder)| (StoredValue::Amount(amount), remainder)),
        }
    }
}
