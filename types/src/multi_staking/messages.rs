//! Requests accepted by the multi-staking module and the responses it returns.
//!
//! Addresses arrive in their formatted string form and are decoded by `validate_basic`, which
//! every handler calls before touching state.

use serde::{Deserialize, Serialize};

use super::Error;
use crate::{AccountHash, Coin, Decimal, ValidatorAddr, U512};

fn parse_account(address: &str) -> Result<AccountHash, Error> {
    AccountHash::from_formatted_str(address).map_err(|_| Error::InvalidAddress)
}

fn parse_validator(address: &str) -> Result<ValidatorAddr, Error> {
    ValidatorAddr::from_formatted_str(address).map_err(|_| Error::InvalidAddress)
}

fn validate_coin(coin: &Coin) -> Result<(), Error> {
    coin.validate().map_err(|_| Error::InvalidDenom)?;
    if coin.is_zero() {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

/// Human-readable validator metadata, passed through to the bonding engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Description {
    /// Display name.
    pub moniker: String,
    /// Optional identity signature.
    pub identity: String,
    /// Optional website.
    pub website: String,
    /// Optional security contact.
    pub security_contact: String,
    /// Free-form details.
    pub details: String,
}

/// Commission parameters of a new validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommissionRates {
    /// Commission charged to delegators.
    pub rate: Decimal,
    /// Upper bound the validator may ever charge.
    pub max_rate: Decimal,
    /// Maximum daily increase.
    pub max_change_rate: Decimal,
}

/// Creates a validator self-delegating `value` in the denomination it will accept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgCreateValidator {
    /// Validator metadata.
    pub description: Description,
    /// Commission parameters.
    pub commission: CommissionRates,
    /// Minimum bonded amount the validator keeps self-delegated.
    pub min_self_delegation: U512,
    /// The operator's account.
    pub delegator_address: String,
    /// The new validator.
    pub validator_address: String,
    /// Consensus public key, opaque to this module.
    pub pubkey: String,
    /// Self-delegation; its denomination becomes the validator's accepted denomination.
    pub value: Coin,
}

impl MsgCreateValidator {
    /// Decodes the addresses and checks the self-delegation.
    pub fn validate_basic(&self) -> Result<(AccountHash, ValidatorAddr), Error> {
        let delegator = parse_account(&self.delegator_address)?;
        let validator = parse_validator(&self.validator_address)?;
        validate_coin(&self.value)?;
        Ok((delegator, validator))
    }
}

/// Updates validator metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgEditValidator {
    /// Replacement metadata.
    pub description: Description,
    /// The validator to edit.
    pub validator_address: String,
    /// New commission rate, if changing.
    #[serde(default)]
    pub commission_rate: Option<Decimal>,
    /// New minimum self delegation, if changing.
    #[serde(default)]
    pub min_self_delegation: Option<U512>,
}

impl MsgEditValidator {
    /// Decodes the validator address.
    pub fn validate_basic(&self) -> Result<ValidatorAddr, Error> {
        parse_validator(&self.validator_address)
    }
}

/// Delegates `amount` to a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgDelegate {
    /// The delegator.
    pub delegator_address: String,
    /// The validator delegated to.
    pub validator_address: String,
    /// Tokens to lock.
    pub amount: Coin,
}

impl MsgDelegate {
    /// Decodes the addresses and checks the amount.
    pub fn validate_basic(&self) -> Result<(AccountHash, ValidatorAddr), Error> {
        let delegator = parse_account(&self.delegator_address)?;
        let validator = parse_validator(&self.validator_address)?;
        validate_coin(&self.amount)?;
        Ok((delegator, validator))
    }
}

/// Moves locked tokens from one validator to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgBeginRedelegate {
    /// The delegator.
    pub delegator_address: String,
    /// The validator redelegated from.
    pub validator_src_address: String,
    /// The validator redelegated to.
    pub validator_dst_address: String,
    /// Locked tokens to move.
    pub amount: Coin,
}

impl MsgBeginRedelegate {
    /// Decodes the addresses and checks the amount.
    pub fn validate_basic(&self) -> Result<(AccountHash, ValidatorAddr, ValidatorAddr), Error> {
        let delegator = parse_account(&self.delegator_address)?;
        let src = parse_validator(&self.validator_src_address)?;
        let dst = parse_validator(&self.validator_dst_address)?;
        if src == dst {
            return Err(Error::SelfRedelegation);
        }
        validate_coin(&self.amount)?;
        Ok((delegator, src, dst))
    }
}

/// Undelegates locked tokens from a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgUndelegate {
    /// The delegator.
    pub delegator_address: String,
    /// The validator undelegated from.
    pub validator_address: String,
    /// Locked tokens to release.
    pub amount: Coin,
}

impl MsgUndelegate {
    /// Decodes the addresses and checks the amount.
    pub fn validate_basic(&self) -> Result<(AccountHash, ValidatorAddr), Error> {
        let delegator = parse_account(&self.delegator_address)?;
        let validator = parse_validator(&self.validator_address)?;
        validate_coin(&self.amount)?;
        Ok((delegator, validator))
    }
}

/// Sets the account rewards are withdrawn to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgSetWithdrawAddress {
    /// The delegator.
    pub delegator_address: String,
    /// The new withdraw address.
    pub withdraw_address: String,
}

impl MsgSetWithdrawAddress {
    /// Decodes both addresses.
    pub fn validate_basic(&self) -> Result<(AccountHash, AccountHash), Error> {
        Ok((
            parse_account(&self.delegator_address)?,
            parse_account(&self.withdraw_address)?,
        ))
    }
}

/// Withdraws the delegator's rewards from a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgWithdrawDelegatorReward {
    /// The delegator.
    pub delegator_address: String,
    /// The validator whose rewards are withdrawn.
    pub validator_address: String,
}

impl MsgWithdrawDelegatorReward {
    /// Decodes both addresses.
    pub fn validate_basic(&self) -> Result<(AccountHash, ValidatorAddr), Error> {
        Ok((
            parse_account(&self.delegator_address)?,
            parse_validator(&self.validator_address)?,
        ))
    }
}

/// Any request handled by the multi-staking module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiStakingRequest {
    /// See [`MsgCreateValidator`].
    CreateValidator(MsgCreateValidator),
    /// See [`MsgEditValidator`].
    EditValidator(MsgEditValidator),
    /// See [`MsgDelegate`].
    Delegate(MsgDelegate),
    /// See [`MsgBeginRedelegate`].
    BeginRedelegate(MsgBeginRedelegate),
    /// See [`MsgUndelegate`].
    Undelegate(MsgUndelegate),
    /// See [`MsgSetWithdrawAddress`].
    SetWithdrawAddress(MsgSetWithdrawAddress),
    /// See [`MsgWithdrawDelegatorReward`].
    WithdrawDelegatorReward(MsgWithdrawDelegatorReward),
}

impl MultiStakingRequest {
    /// Short name of the request, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            MultiStakingRequest::CreateValidator(_) => "create_validator",
            MultiStakingRequest::EditValidator(_) => "edit_validator",
            MultiStakingRequest::Delegate(_) => "delegate",
            MultiStakingRequest::BeginRedelegate(_) => "begin_redelegate",
            MultiStakingRequest::Undelegate(_) => "undelegate",
            MultiStakingRequest::SetWithdrawAddress(_) => "set_withdraw_address",
            MultiStakingRequest::WithdrawDelegatorReward(_) => "withdraw_delegator_reward",
        }
    }
}

/// The outcome of a successful request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiStakingResponse {
    /// A validator was created.
    CreateValidator,
    /// A validator was edited.
    EditValidator,
    /// Tokens were locked and delegated.
    Delegate {
        /// Bond units delegated under the intermediary account.
        bond_amount: U512,
    },
    /// Locked tokens were moved between validators.
    BeginRedelegate {
        /// Bond units redelegated.
        bond_amount: U512,
        /// When the redelegation completes, as reported by the bonding engine.
        completion_time: u64,
    },
    /// Locked tokens were released.
    Undelegate {
        /// Bond units undelegated.
        bond_amount: U512,
        /// When the unbonding completes, as reported by the bonding engine. `None` when no bond
        /// units were released.
        completion_time: Option<u64>,
    },
    /// The withdraw address was set.
    SetWithdrawAddress,
    /// Rewards were withdrawn and forwarded to the delegator.
    WithdrawDelegatorReward {
        /// The forwarded payout.
        amount: Vec<Coin>,
    },
}
