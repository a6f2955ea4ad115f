//! In-memory stand-ins for the bonding, distribution and transfer collaborators.

use std::collections::BTreeMap;

use multi_staking_types::{
    multi_staking::messages::{MsgCreateValidator, MsgEditValidator},
    AccountHash, Coin, ValidatorAddr, U512,
};

use crate::system::multi_staking::providers::{
    BankProvider, DistributionError, DistributionProvider, StakingError, StakingProvider,
    TransferError,
};

pub(crate) const BOND_DENOM: &str = "ubond";
pub(crate) const COMPLETION_TIME: u64 = 1_814_400;

/// A request received by [`MockChain`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChainCall {
    CreateValidator {
        validator: ValidatorAddr,
        delegator: AccountHash,
        value: Coin,
    },
    EditValidator {
        validator: ValidatorAddr,
    },
    Delegate {
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    },
    BeginRedelegate {
        delegator: AccountHash,
        src: ValidatorAddr,
        dst: ValidatorAddr,
        amount: Coin,
    },
    Undelegate {
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    },
    SetWithdrawAddress {
        delegator: AccountHash,
        withdraw_address: AccountHash,
    },
    WithdrawDelegatorReward {
        delegator: AccountHash,
        validator: ValidatorAddr,
    },
    SendCoins {
        from: AccountHash,
        to: AccountHash,
        amount: Vec<Coin>,
    },
}

/// Records every request and keeps plain balances so reward forwarding can be observed.
#[derive(Debug, Default)]
pub(crate) struct MockChain {
    pub(crate) calls: Vec<ChainCall>,
    pub(crate) staking_failure: Option<StakingError>,
    pub(crate) transfer_failure: Option<TransferError>,
    rewards: BTreeMap<(AccountHash, ValidatorAddr), Vec<Coin>>,
    balances: BTreeMap<(AccountHash, String), U512>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        MockChain::default()
    }

    /// Makes the next staking request fail with `error`.
    pub(crate) fn fail_staking(&mut self, error: StakingError) {
        self.staking_failure = Some(error);
    }

    /// Makes the next transfer fail with `error`.
    pub(crate) fn fail_transfer(&mut self, error: TransferError) {
        self.transfer_failure = Some(error);
    }

    /// Accrues `reward` for `delegator` on `validator`.
    pub(crate) fn add_reward(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        reward: Coin,
    ) {
        self.rewards
            .entry((delegator, validator))
            .or_default()
            .push(reward);
    }

    pub(crate) fn balance(&self, account: AccountHash, denom: &str) -> U512 {
        self.balances
            .get(&(account, denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn credit(&mut self, account: AccountHash, coin: &Coin) {
        *self
            .balances
            .entry((account, coin.denom.clone()))
            .or_default() += coin.amount;
    }

    fn staking(&mut self, call: ChainCall) -> Result<(), StakingError> {
        if let Some(error) = self.staking_failure.take() {
            return Err(error);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl StakingProvider for MockChain {
    fn bond_denom(&self) -> String {
        BOND_DENOM.to_string()
    }

    fn staking_create_validator(
        &mut self,
        validator: ValidatorAddr,
        delegator: AccountHash,
        value: Coin,
        _msg: &MsgCreateValidator,
    ) -> Result<(), StakingError> {
        self.staking(ChainCall::CreateValidator {
            validator,
            delegator,
            value,
        })
    }

    fn staking_edit_validator(
        &mut self,
        validator: ValidatorAddr,
        _msg: &MsgEditValidator,
    ) -> Result<(), StakingError> {
        self.staking(ChainCall::EditValidator { validator })
    }

    fn staking_delegate(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    ) -> Result<(), StakingError> {
        self.staking(ChainCall::Delegate {
            delegator,
            validator,
            amount,
        })
    }

    fn staking_begin_redelegate(
        &mut self,
        delegator: AccountHash,
        src: ValidatorAddr,
        dst: ValidatorAddr,
        amount: Coin,
    ) -> Result<u64, StakingError> {
        self.staking(ChainCall::BeginRedelegate {
            delegator,
            src,
            dst,
            amount,
        })?;
        Ok(COMPLETION_TIME)
    }

    fn staking_undelegate(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
        amount: Coin,
    ) -> Result<u64, StakingError> {
        self.staking(ChainCall::Undelegate {
            delegator,
            validator,
            amount,
        })?;
        Ok(COMPLETION_TIME)
    }
}

impl DistributionProvider for MockChain {
    fn distribution_set_withdraw_address(
        &mut self,
        delegator: AccountHash,
        withdraw_address: AccountHash,
    ) -> Result<(), DistributionError> {
        self.calls.push(ChainCall::SetWithdrawAddress {
            delegator,
            withdraw_address,
        });
        Ok(())
    }

    fn distribution_withdraw_delegator_reward(
        &mut self,
        delegator: AccountHash,
        validator: ValidatorAddr,
    ) -> Result<Vec<Coin>, DistributionError> {
        self.calls.push(ChainCall::WithdrawDelegatorReward {
            delegator,
            validator,
        });
        let payout = self
            .rewards
            .remove(&(delegator, validator))
            .ok_or(DistributionError::NoDelegation)?;
        for coin in &payout {
            self.credit(delegator, coin);
        }
        Ok(payout)
    }
}

impl BankProvider for MockChain {
    fn send_coins(
        &mut self,
        from: AccountHash,
        to: AccountHash,
        amount: &[Coin],
    ) -> Result<(), TransferError> {
        if let Some(error) = self.transfer_failure.take() {
            return Err(error);
        }
        for coin in amount {
            if self.balance(from, &coin.denom) < coin.amount {
                return Err(TransferError::InsufficientBalance);
            }
        }
        for coin in amount {
            let key = (from, coin.denom.clone());
            let remaining = self.balance(from, &coin.denom) - coin.amount;
            self.balances.insert(key, remaining);
            self.credit(to, coin);
        }
        self.calls.push(ChainCall::SendCoins {
            from,
            to,
            amount: amount.to_vec(),
        });
        Ok(())
    }
}
