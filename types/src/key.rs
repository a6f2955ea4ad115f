//! Keys addressing the namespaced regions of multi-staking state.

use std::{
    convert::TryFrom,
    fmt::{self, Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH},
    AccountHash, ValidatorAddr,
};

const BOND_WEIGHT_PREFIX: &str = "bond-weight-";
const VALIDATOR_DENOM_PREFIX: &str = "validator-denom-";
const INTERMEDIARY_DELEGATOR_PREFIX: &str = "intermediary-delegator-";
const DELEGATOR_INTERMEDIARY_PREFIX: &str = "delegator-intermediary-";
const LOCK_PREFIX: &str = "lock-";
const BOND_MIRROR_PREFIX: &str = "bond-mirror-";

/// The discriminant of a [`Key`], serialized as its first byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KeyTag {
    /// Denomination to conversion weight.
    BondWeight = 0,
    /// Validator to its accepted denomination.
    ValidatorDenom = 1,
    /// Intermediary account to the delegator it acts for.
    IntermediaryDelegator = 2,
    /// Delegator to its intermediary account.
    DelegatorIntermediary = 3,
    /// (delegator, validator) to a lock record.
    Lock = 4,
    /// (delegator, validator) to the bonded amount issued to the bonding engine.
    BondMirror = 5,
}

impl KeyTag {
    /// The single-byte prefix shared by every key of this tag.
    pub fn prefix(self) -> [u8; 1] {
        [self as u8]
    }
}

impl TryFrom<u8> for KeyTag {
    type Error = bytesrepr::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            d if d == KeyTag::BondWeight as u8 => Ok(KeyTag::BondWeight),
            d if d == KeyTag::ValidatorDenom as u8 => Ok(KeyTag::ValidatorDenom),
            d if d == KeyTag::IntermediaryDelegator as u8 => Ok(KeyTag::IntermediaryDelegator),
            d if d == KeyTag::DelegatorIntermediary as u8 => Ok(KeyTag::DelegatorIntermediary),
            d if d == KeyTag::Lock as u8 => Ok(KeyTag::Lock),
            d if d == KeyTag::BondMirror as u8 => Ok(KeyTag::BondMirror),
            _ => Err(bytesrepr::Error::Formatting),
        }
    }
}

/// Identifies the lock held by a delegator against a validator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockId {
    /// The real delegator.
    pub delegator: AccountHash,
    /// The validator delegated to.
    pub validator: ValidatorAddr,
}

impl LockId {
    /// Constructs a new `LockId`.
    pub fn new(delegator: AccountHash, validator: ValidatorAddr) -> Self {
        LockId {
            delegator,
            validator,
        }
    }
}

impl Display for LockId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.delegator, self.validator)
    }
}

impl ToBytes for LockId {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.delegator.serialized_length() + self.validator.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.delegator.write_bytes(writer)?;
        self.validator.write_bytes(writer)
    }
}

impl FromBytes for LockId {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (delegator, remainder) = AccountHash::from_bytes(bytes)?;
        let (validator, remainder) = ValidatorAddr::from_bytes(remainder)?;
        Ok((LockId::new(delegator, validator), remainder))
    }
}

/// The key under which a multi-staking record is stored.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Conversion weight of a denomination.
    BondWeight(String),
    /// Accepted denomination of a validator.
    ValidatorDenom(ValidatorAddr),
    /// Reverse binding from an intermediary account to its delegator.
    IntermediaryDelegator(AccountHash),
    /// Binding from a delegator to its intermediary account.
    DelegatorIntermediary(AccountHash),
    /// A lock record.
    Lock(LockId),
    /// A bond mirror entry.
    BondMirror(LockId),
}

impl Key {
    /// Returns the tag of this key.
    pub fn tag(&self) -> KeyTag {
        match self {
            Key::BondWeight(_) => KeyTag::BondWeight,
            Key::ValidatorDenom(_) => KeyTag::ValidatorDenom,
            Key::IntermediaryDelegator(_) => KeyTag::IntermediaryDelegator,
            Key::DelegatorIntermediary(_) => KeyTag::DelegatorIntermediary,
            Key::Lock(_) => KeyTag::Lock,
            Key::BondMirror(_) => KeyTag::BondMirror,
        }
    }

    /// Returns the inner denomination if `self` is of type [`Key::BondWeight`].
    pub fn as_bond_weight(&self) -> Option<&str> {
        match self {
            Key::BondWeight(denom) => Some(denom),
            _ => None,
        }
    }

    /// Returns the inner validator if `self` is of type [`Key::ValidatorDenom`].
    pub fn as_validator_denom(&self) -> Option<&ValidatorAddr> {
        match self {
            Key::ValidatorDenom(validator) => Some(validator),
            _ => None,
        }
    }

    /// Returns the inner account if `self` is of type [`Key::DelegatorIntermediary`].
    pub fn as_delegator_intermediary(&self) -> Option<&AccountHash> {
        match self {
            Key::DelegatorIntermediary(delegator) => Some(delegator),
            _ => None,
        }
    }

    /// Returns the inner lock id if `self` is of type [`Key::Lock`].
    pub fn as_lock(&self) -> Option<&LockId> {
        match self {
            Key::Lock(lock_id) => Some(lock_id),
            _ => None,
        }
    }

    /// Returns the inner lock id if `self` is of type [`Key::BondMirror`].
    pub fn as_bond_mirror(&self) -> Option<&LockId> {
        match self {
            Key::BondMirror(lock_id) => Some(lock_id),
            _ => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Key::BondWeight(denom) => write!(f, "{}{}", BOND_WEIGHT_PREFIX, denom),
            Key::ValidatorDenom(validator) => {
                write!(f, "{}{}", VALIDATOR_DENOM_PREFIX, validator)
            }
            Key::IntermediaryDelegator(intermediary) => {
                write!(f, "{}{}", INTERMEDIARY_DELEGATOR_PREFIX, intermediary)
            }
            Key::DelegatorIntermediary(delegator) => {
                write!(f, "{}{}", DELEGATOR_INTERMEDIARY_PREFIX, delegator)
            }
            Key::Lock(lock_id) => write!(f, "{}{}", LOCK_PREFIX, lock_id),
            Key::BondMirror(lock_id) => write!(f, "{}{}", BOND_MIRROR_PREFIX, lock_id),
        }
    }
}

impl ToBytes for Key {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut result = bytesrepr::unchecked_allocate_buffer(self);
        self.write_bytes(&mut result)?;
        Ok(result)
    }

    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                Key::BondWeight(denom) => denom.serialized_length(),
                Key::ValidatorDenom(validator) => validator.serialized_length(),
                Key::IntermediaryDelegator(account) | Key::DelegatorIntermediary(account) => {
                    account.serialized_length()
                }
                Key::Lock(lock_id) | Key::BondMirror(lock_id) => lock_id.serialized_length(),
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.tag() as u8);
        match self {
            Key::BondWeight(denom) => denom.write_bytes(writer),
            Key::ValidatorDenom(validator) => validator.write_bytes(writer),
            Key::IntermediaryDelegator(account) | Key::DelegatorIntermediary(account) => {
                account.write_bytes(writer)
            }
            Key::Lock(lock_id) | Key::BondMirror(lock_id) => lock_id.write_bytes(writer),
        }
    }
}

impl FromBytes for Key {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        match KeyTag::try_from(tag)? {
            KeyTag::BondWeight => {
                let (denom, rem) = String::from_bytes(remainder)?;
                Ok((Key::BondWeight(denom), rem))
            }
            KeyTag::ValidatorDenom => {
                let (validator, rem) = ValidatorAddr::from_bytes(remainder)?;
                Ok((Key::ValidatorDenom(validator), rem))
            }
            KeyTag::IntermediaryDelegator => {
                let (account, rem) = AccountHash::from_bytes(remainder)?;
                Ok((Key::IntermediaryDelegator(account), rem))
            }
            KeyTag::DelegatorIntermediary => {
                let (account, rem) = AccountHash::from_bytes(remainder)?;
                Ok((Key::DelegatorIntermediary(account), rem))
            }
            KeyTag::Lock => {
                let (lock_id, rem) = LockId::from_bytes(remainder)?;
                Ok((Key::Lock(lock_id), rem))
            }
            KeyTag::BondMirror => {
                let (lock_id, rem) = LockId::from_bytes(remainder)?;
                Ok((Key::BondMirror(lock_id), rem))
            }
        }
    }
}
