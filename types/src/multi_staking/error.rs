//! Home of the multi-staking [`Error`] and [`InvariantViolation`] types.
use std::{
    convert::{TryFrom, TryInto},
    result,
};

use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};

/// Reasons a multi-staking request is rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[repr(u8)]
pub enum Error {
    /// An account or validator address could not be decoded.
    #[error("invalid address")]
    InvalidAddress = 0,
    /// A denomination failed validation.
    #[error("invalid denom")]
    InvalidDenom = 1,
    /// The requested amount is zero or otherwise unusable.
    #[error("invalid amount")]
    InvalidAmount = 2,
    /// The token is neither the validator's accepted denomination nor, for a validator without
    /// one, a weighted denomination.
    #[error("not allowed token")]
    NotAllowedToken = 3,
    /// The denomination has no conversion weight.
    #[error("token is not multistaking token")]
    NotMultiStakingToken = 4,
    /// No lock exists for the (delegator, validator) pair.
    #[error("can't find multi staking lock")]
    LockNotFound = 5,
    /// The lock holds less than the requested amount.
    #[error("insufficient locked amount")]
    InsufficientLockedAmount = 6,
    /// No intermediary account is bound to the account.
    #[error("intermediary account not found")]
    IntermediaryAccountNotFound = 7,
    /// The validator already has an accepted denomination.
    #[error("validator already exists")]
    ValidatorAlreadyExists = 8,
    /// The requested amount is below the configured minimum.
    #[error("delegation amount too small")]
    DelegationAmountTooSmall = 9,
    /// An arithmetic overflow has occurred.
    #[error("arithmetic overflow")]
    ArithmeticOverflow = 10,
    /// Serialization issue while reading or writing state.
    #[error("serialization error")]
    Serialization = 11,
    /// Storage problem.
    #[error("storage error")]
    Storage = 12,
    /// The source and destination validators of a redelegation are the same.
    #[error("cannot redelegate to the same validator")]
    SelfRedelegation = 13,

    #[cfg(test)]
    #[doc(hidden)]
    #[error("sentinel error")]
    Sentinel,
}

/// Used for testing; this should be guaranteed to be the maximum valid value of [`Error`] enum.
#[cfg(test)]
const MAX_ERROR_VALUE: u8 = Error::Sentinel as u8;

// This error type is not intended to be used by third party crates.
#[doc(hidden)]
#[derive(Debug, PartialEq, Eq)]
pub struct TryFromU8ForError(());

// This conversion is not intended to be used by third party crates.
#[doc(hidden)]
impl TryFrom<u8> for Error {
    type Error = TryFromU8ForError;

    fn try_from(value: u8) -> result::Result<Self, Self::Error> {
        match value {
            d if d == Error::InvalidAddress as u8 => Ok(Error::InvalidAddress),
            d if d == Error::InvalidDenom as u8 => Ok(Error::InvalidDenom),
            d if d == Error::InvalidAmount as u8 => Ok(Error::InvalidAmount),
            d if d == Error::NotAllowedToken as u8 => Ok(Error::NotAllowedToken),
            d if d == Error::NotMultiStakingToken as u8 => Ok(Error::NotMultiStakingToken),
            d if d == Error::LockNotFound as u8 => Ok(Error::LockNotFound),
            d if d == Error::InsufficientLockedAmount as u8 => {
                Ok(Error::InsufficientLockedAmount)
            }
            d if d == Error::IntermediaryAccountNotFound as u8 => {
                Ok(Error::IntermediaryAccountNotFound)
            }
            d if d == Error::ValidatorAlreadyExists as u8 => Ok(Error::ValidatorAlreadyExists),
            d if d == Error::DelegationAmountTooSmall as u8 => {
                Ok(Error::DelegationAmountTooSmall)
            }
            d if d == Error::ArithmeticOverflow as u8 => Ok(Error::ArithmeticOverflow),
            d if d == Error::Serialization as u8 => Ok(Error::Serialization),
            d if d == Error::Storage as u8 => Ok(Error::Storage),
            d if d == Error::SelfRedelegation as u8 => Ok(Error::SelfRedelegation),
            _ => Err(TryFromU8ForError(())),
        }
    }
}

impl ToBytes for Error {
    fn to_bytes(&self) -> result::Result<Vec<u8>, bytesrepr::Error> {
        let value = *self as u8;
        value.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }
}

impl FromBytes for Error {
    fn from_bytes(bytes: &[u8]) -> result::Result<(Self, &[u8]), bytesrepr::Error> {
        let (value, rem): (u8, _) = FromBytes::from_bytes(bytes)?;
        let error: Error = value
            .try_into()
            .map_err(|_| bytesrepr::Error::Formatting)?;
        Ok((error, rem))
    }
}

impl From<bytesrepr::Error> for Error {
    fn from(_: bytesrepr::Error) -> Self {
        Error::Serialization
    }
}

/// State that correct request validation can never produce.
///
/// These are not rejected requests: whoever drives execution must stop processing the current
/// batch when one is raised.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A second accepted denomination was written for a validator.
    #[error("validator denom already set")]
    ValidatorDenomAlreadySet,
    /// A second intermediary account was bound for a delegator.
    #[error("intermediary account for delegator already set")]
    IntermediaryAccountAlreadySet,
}
