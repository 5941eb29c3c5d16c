//! Staking ledger: the single context object owned by the staking contract.
//!
//! It groups the stake registry (one [`StakePosition`] per user) with the
//! period accounting state. Operations are implemented next to their
//! concern:
//!
//! - [`crate::registry`]: stake / unstake
//! - [`crate::period`]: deposits and reward distribution
//! - [`crate::withdrawal`]: full, partial and profit-only withdrawals
//!
//! Every operation validates before mutating, so an `Err` leaves the ledger
//! unchanged. Positions live one per storage cell; `users` indexes them in
//! first-stake order so a distribution can walk every position.

use ink::prelude::vec::Vec;
use ink::primitives::AccountId;
use ink::storage::Mapping;

use crate::errors::{Error, Result};
use crate::period::PeriodState;
use crate::registry::StakePosition;
use crate::Balance;

#[derive(Debug)]
#[ink::storage_item]
pub struct StakingLedger {
    pub(crate) positions: Mapping<AccountId, StakePosition>,
    pub(crate) users: Mapping<u32, AccountId>,
    pub(crate) user_count: u32,
    pub(crate) total_staked_supply: u32,
    pub(crate) period: PeriodState,
}

impl Default for StakingLedger {
    fn default() -> Self {
        Self {
            positions: Mapping::new(),
            users: Mapping::new(),
            user_count: 0,
            total_staked_supply: 0,
            period: PeriodState::default(),
        }
    }
}

impl StakingLedger {
    pub fn position(&self, user: &AccountId) -> Option<StakePosition> {
        self.positions.get(user)
    }

    pub fn users(&self) -> Vec<AccountId> {
        (0..self.user_count)
            .filter_map(|index| self.users.get(index))
            .collect()
    }

    pub fn total_staked_supply(&self) -> u32 {
        self.total_staked_supply
    }

    pub fn period(&self) -> &PeriodState {
        &self.period
    }

    pub fn funds_of(&self, user: &AccountId) -> Balance {
        self.positions.get(user).map(|p| p.funds).unwrap_or(0)
    }

    /// Active (staked) position of `user`.
    pub(crate) fn active_position(&self, user: &AccountId) -> Result<StakePosition> {
        match self.positions.get(user) {
            Some(position) if position.staked => Ok(position),
            _ => Err(Error::NoStake),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badger_pool::inventory::{FlipInventory, FlipNft};
    use badger_pool::treasury::Treasury;

    const ETHER: Balance = 1_000_000_000_000_000_000;
    const DAY_MS: u64 = 86_400_000;

    fn user(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    fn collection() -> AccountId {
        AccountId::from([0x77; 32])
    }

    /// Sum of `field` over every position.
    fn sum_of(ledger: &StakingLedger, field: fn(&StakePosition) -> Balance) -> Balance {
        ledger
            .users()
            .iter()
            .filter_map(|user| ledger.position(user))
            .map(|position| field(&position))
            .sum()
    }

    /// Allocation bookkeeping is exact and funds never exceed the pot.
    fn assert_consistent(ledger: &StakingLedger) {
        assert_eq!(sum_of(ledger, |p| p.allocation), ledger.period().allocation_total());
        assert!(sum_of(ledger, |p| p.funds) <= ledger.period().total_funds());
    }

    /// Pool-side bookkeeping driven alongside the ledger.
    struct PoolBooks {
        inventory: FlipInventory,
        treasury: Treasury,
    }

    impl PoolBooks {
        fn new() -> Self {
            Self {
                inventory: FlipInventory::default(),
                treasury: Treasury::default(),
            }
        }

        fn flip(&mut self, token_id: u128, price: Balance, proceeds: Balance) {
            self.inventory
                .insert(FlipNft {
                    collection: collection(),
                    token_id,
                    price,
                    metadata: "ipfs://flip".into(),
                    acquired_at: 0,
                })
                .unwrap();
            self.treasury.debit_ether(price).unwrap();
            self.treasury.credit_ether(proceeds).unwrap();
            self.inventory.remove(collection(), token_id, proceeds).unwrap();
        }
    }

    #[ink::test]
    fn two_stakers_share_flip_profit() {
        let (alice, bob) = (user(1), user(2));
        let mut ledger = StakingLedger::default();
        let mut pool = PoolBooks::new();

        ledger.stake(alice, 1, 0).unwrap();
        ledger.stake(bob, 2, 0).unwrap();
        assert_eq!(ledger.total_staked_supply(), 2);

        ledger.deposit(alice, 2 * ETHER, DAY_MS).unwrap();
        pool.treasury.credit_ether(2 * ETHER).unwrap();
        assert_eq!(ledger.period().deposit_amount_this_month(), 2 * ETHER);
        assert_eq!(ledger.period().total_funds(), 2 * ETHER);

        pool.flip(1, ETHER, ETHER * 14 / 10);

        ledger.deposit(bob, 2 * ETHER, 2 * DAY_MS).unwrap();
        pool.treasury.credit_ether(2 * ETHER).unwrap();
        assert_eq!(ledger.period().deposit_amount_this_month(), 4 * ETHER);

        pool.flip(2, 2 * ETHER, ETHER * 26 / 10);
        assert_eq!(pool.treasury.ether_balance(), 5 * ETHER);

        let distribution = ledger
            .distribute(30 * DAY_MS, pool.inventory.realized_profit(), 0, 30 * DAY_MS)
            .unwrap();
        assert_eq!(distribution.profit, ETHER);
        assert_eq!(ledger.period().total_funds(), 5 * ETHER);
        assert_eq!(ledger.funds_of(&alice), ETHER * 25 / 10);
        assert_eq!(ledger.funds_of(&bob), ETHER * 25 / 10);
        assert_eq!(ledger.period().deposit_amount_this_month(), 0);
        assert_consistent(&ledger);

        let paid = ledger.withdraw(alice, 25).unwrap();
        pool.treasury.debit_ether(paid).unwrap();
        assert_eq!(paid, ETHER * 625 / 1000);
        assert_eq!(ledger.funds_of(&alice), ETHER * 1875 / 1000);
        assert_eq!(pool.treasury.ether_balance(), ledger.period().total_funds());
        assert_consistent(&ledger);
    }

    #[ink::test]
    fn allocation_total_tracks_positions() {
        let (alice, bob) = (user(1), user(2));
        let mut ledger = StakingLedger::default();
        let mut pool = PoolBooks::new();
        pool.treasury.credit_ether(10 * ETHER).unwrap();

        ledger.stake(alice, 1, 0).unwrap();
        ledger.stake(bob, 2, 0).unwrap();
        ledger.deposit(alice, 3 * ETHER, 0).unwrap();
        ledger.deposit(bob, ETHER, 0).unwrap();
        assert_consistent(&ledger);

        pool.flip(1, ETHER, 2 * ETHER);
        ledger
            .distribute(DAY_MS, pool.inventory.realized_profit(), 0, 0)
            .unwrap();
        assert_consistent(&ledger);

        ledger.deposit(bob, ETHER, 2 * DAY_MS).unwrap();
        ledger.withdraw(alice, 40).unwrap();
        assert_consistent(&ledger);
    }

    #[ink::test]
    fn losing_period_shrinks_everyone() {
        let (alice, bob) = (user(1), user(2));
        let mut ledger = StakingLedger::default();
        let mut pool = PoolBooks::new();
        pool.treasury.credit_ether(4 * ETHER).unwrap();

        ledger.stake(alice, 1, 0).unwrap();
        ledger.stake(bob, 2, 0).unwrap();
        ledger.deposit(alice, 2 * ETHER, 0).unwrap();
        ledger.deposit(bob, 2 * ETHER, 0).unwrap();
        pool.flip(1, 2 * ETHER, ETHER);

        let distribution = ledger
            .distribute(DAY_MS, pool.inventory.realized_profit(), 0, 0)
            .unwrap();
        assert_eq!(distribution.loss, ETHER);
        assert_eq!(ledger.funds_of(&alice), ETHER * 15 / 10);
        assert_eq!(ledger.funds_of(&bob), ETHER * 15 / 10);
        assert_eq!(ledger.withdraw_profit(alice), Err(Error::NoProfit));
        assert_consistent(&ledger);
    }

    #[ink::test]
    fn depositor_after_total_loss_keeps_own_funds() {
        let (alice, bob) = (user(1), user(2));
        let mut ledger = StakingLedger::default();
        let mut pool = PoolBooks::new();
        pool.treasury.credit_ether(2 * ETHER).unwrap();

        ledger.stake(alice, 1, 0).unwrap();
        ledger.stake(bob, 2, 0).unwrap();
        ledger.deposit(alice, 2 * ETHER, 0).unwrap();
        pool.flip(1, 2 * ETHER, 0);
        ledger
            .distribute(DAY_MS, pool.inventory.realized_profit(), 0, 0)
            .unwrap();
        assert_eq!(ledger.period().allocation_total(), 0);

        ledger.deposit(bob, 2 * ETHER, 2 * DAY_MS).unwrap();
        ledger
            .distribute(3 * DAY_MS, pool.inventory.realized_profit(), 0, 0)
            .unwrap();

        assert_eq!(ledger.funds_of(&alice), 0);
        assert_eq!(ledger.funds_of(&bob), 2 * ETHER);
        assert_consistent(&ledger);
    }

    #[ink::test]
    fn many_stakers_are_all_distributed() {
        let mut ledger = StakingLedger::default();
        for byte in 1..=120u8 {
            ledger.stake(user(byte), u128::from(byte), 0).unwrap();
            ledger.deposit(user(byte), ETHER, 0).unwrap();
        }
        ledger.distribute(DAY_MS, (120 * ETHER, 0), 0, 0).unwrap();

        assert_eq!(ledger.users().len(), 120);
        assert_eq!(ledger.funds_of(&user(1)), 2 * ETHER);
        assert_eq!(ledger.funds_of(&user(120)), 2 * ETHER);
        assert_consistent(&ledger);
    }
}
