//! Stake registry: which pool token each user has locked, and the
//! per-user accounting position attached to it.

use ink::primitives::AccountId;

use crate::errors::{Error, Result};
use crate::ledger::StakingLedger;
use crate::{Balance, Timestamp, TokenId};

#[derive(Debug, Default, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct StakePosition {
    /// Pool token held in custody, `None` while unstaked.
    pub token_id: Option<TokenId>,
    pub staked: bool,
    /// Deposited during the current period.
    pub deposited: bool,
    /// Ether deposited during the current period.
    pub deposit_amount: Balance,
    pub allocation: Balance,
    /// Withdrawable funds.
    pub funds: Balance,
    /// Deposited ether not yet withdrawn.
    pub principal: Balance,
    pub stake_timestamp: Timestamp,
    pub stake_period: u32,
    pub deposit_timestamp: Timestamp,
    pub deposit_period: u32,
}

impl StakingLedger {
    /// Fails with `AlreadyStaked` when `user` holds an active position.
    pub fn ensure_can_stake(&self, user: &AccountId) -> Result<()> {
        match self.positions.get(user) {
            Some(position) if position.staked => Err(Error::AlreadyStaked),
            _ => Ok(()),
        }
    }

    /// Records `token_id` as locked by `user`. Custody is moved by the
    /// caller.
    pub fn stake(&mut self, user: AccountId, token_id: TokenId, now: Timestamp) -> Result<()> {
        self.ensure_can_stake(&user)?;
        let supply = self
            .total_staked_supply
            .checked_add(1)
            .ok_or(Error::Overflow)?;
        let known = self.positions.get(user);
        let user_count = if known.is_none() {
            self.user_count.checked_add(1).ok_or(Error::Overflow)?
        } else {
            self.user_count
        };

        let mut position = known.unwrap_or_default();
        position.token_id = Some(token_id);
        position.staked = true;
        position.stake_timestamp = now;
        position.stake_period = self.period.period_id;
        self.positions.insert(user, &position);

        if user_count != self.user_count {
            self.users.insert(self.user_count, &user);
            self.user_count = user_count;
        }
        self.total_staked_supply = supply;
        Ok(())
    }

    /// Releases `token_id` from `user`'s position. Funds must be withdrawn
    /// first; allocation left over from rounding is written off.
    pub fn unstake(&mut self, user: AccountId, token_id: TokenId) -> Result<()> {
        let mut position = self.positions.get(user).ok_or(Error::NotTokenStaker)?;
        if !position.staked || position.token_id != Some(token_id) {
            return Err(Error::NotTokenStaker);
        }
        if position.funds > 0 {
            return Err(Error::OutstandingFunds);
        }

        self.period.allocation_total = self
            .period
            .allocation_total
            .saturating_sub(position.allocation);
        position.allocation = 0;
        position.principal = 0;
        position.staked = false;
        position.token_id = None;
        self.positions.insert(user, &position);
        self.total_staked_supply = self.total_staked_supply.saturating_sub(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHER: Balance = 1_000_000_000_000_000_000;

    fn user(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    #[ink::test]
    fn stake_opens_position() {
        let mut ledger = StakingLedger::default();
        ledger.stake(user(1), 7, 1_000).unwrap();

        let position = ledger.position(&user(1)).unwrap();
        assert!(position.staked);
        assert_eq!(position.token_id, Some(7));
        assert_eq!(position.stake_timestamp, 1_000);
        assert_eq!(position.allocation, 0);
        assert_eq!(ledger.total_staked_supply(), 1);
        assert_eq!(ledger.users(), ink::prelude::vec![user(1)]);
    }

    #[ink::test]
    fn second_stake_is_rejected() {
        let mut ledger = StakingLedger::default();
        ledger.stake(user(1), 7, 0).unwrap();
        assert_eq!(ledger.stake(user(1), 8, 0), Err(Error::AlreadyStaked));
        assert_eq!(ledger.total_staked_supply(), 1);
    }

    #[ink::test]
    fn unstake_checks_staker_and_token() {
        let mut ledger = StakingLedger::default();
        ledger.stake(user(1), 7, 0).unwrap();

        assert_eq!(ledger.unstake(user(2), 7), Err(Error::NotTokenStaker));
        assert_eq!(ledger.unstake(user(1), 8), Err(Error::NotTokenStaker));

        ledger.unstake(user(1), 7).unwrap();
        let position = ledger.position(&user(1)).unwrap();
        assert!(!position.staked);
        assert_eq!(position.token_id, None);
        assert_eq!(ledger.total_staked_supply(), 0);
        assert_eq!(ledger.unstake(user(1), 7), Err(Error::NotTokenStaker));
    }

    #[ink::test]
    fn unstake_requires_empty_position() {
        let mut ledger = StakingLedger::default();
        ledger.stake(user(1), 7, 0).unwrap();
        ledger.deposit(user(1), 100, 0).unwrap();
        assert_eq!(ledger.unstake(user(1), 7), Err(Error::OutstandingFunds));

        ledger.withdraw(user(1), 100).unwrap();
        ledger.unstake(user(1), 7).unwrap();
    }

    #[ink::test]
    fn unstake_after_total_loss_releases_token() {
        let mut ledger = StakingLedger::default();
        ledger.stake(user(1), 7, 0).unwrap();
        ledger.deposit(user(1), ETHER, 0).unwrap();
        ledger.distribute(1, (0, 2 * ETHER), 0, 0).unwrap();

        let position = ledger.position(&user(1)).unwrap();
        assert_eq!(position.funds, 0);
        assert_eq!(ledger.withdraw(user(1), 100), Err(Error::InsufficientFunds));

        ledger.unstake(user(1), 7).unwrap();
        let position = ledger.position(&user(1)).unwrap();
        assert!(!position.staked);
        assert_eq!(position.allocation, 0);
        assert_eq!(position.principal, 0);
        assert_eq!(ledger.period().allocation_total(), 0);
        assert_eq!(ledger.total_staked_supply(), 0);
    }

    #[ink::test]
    fn unstake_writes_off_rounding_dust() {
        let (dust, whale) = (user(1), user(2));
        let mut ledger = StakingLedger::default();
        ledger.stake(dust, 1, 0).unwrap();
        ledger.stake(whale, 2, 0).unwrap();
        ledger.deposit(dust, 1, 0).unwrap();
        ledger.deposit(whale, ETHER, 0).unwrap();
        ledger.distribute(1, (0, ETHER / 2), 0, 0).unwrap();

        let position = ledger.position(&dust).unwrap();
        assert_eq!(position.funds, 0);
        assert_eq!(position.allocation, 1);
        assert!(ledger.period().allocation_total() > 0);

        ledger.unstake(dust, 1).unwrap();
        assert_eq!(ledger.position(&dust).unwrap().allocation, 0);
        assert_eq!(ledger.period().allocation_total(), ETHER);
        assert_eq!(ledger.funds_of(&whale), ETHER / 2);
    }

    #[ink::test]
    fn restake_keeps_single_user_entry() {
        let mut ledger = StakingLedger::default();
        ledger.stake(user(1), 7, 0).unwrap();
        ledger.unstake(user(1), 7).unwrap();
        ledger.stake(user(1), 9, 5).unwrap();

        assert_eq!(ledger.users().len(), 1);
        assert_eq!(ledger.position(&user(1)).unwrap().token_id, Some(9));
    }
}
