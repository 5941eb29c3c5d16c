#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! # BadgerBot Staking
//!
//! Holders lock a pool NFT here, deposit ether into the pool treasury and
//! share the bot's realised trading profit pro rata to their allocation.
//!
//! ```text
//!   stake(token) ──► custody via pool.transfer_from
//!   deposit()    ──► pool.receive_staking_deposit (value forwarded)
//!   reward_distribution()
//!       pool.realized_profit ─► delta since checkpoint ─► new ratio
//!   request_withdraw(%) / request_withdraw_profit()
//!       ──► pool.withdraw_by_staking_contract(user, amount)
//! ```
//!
//! All accounting lives in [`ledger::StakingLedger`]; the contract only
//! authorizes, updates the ledger, then talks to the pool.

pub mod errors;
pub mod ledger;
pub mod period;
pub mod registry;
pub mod withdrawal;

pub use badger_pool::{Balance, Timestamp, TokenId};

pub mod constants {
    use crate::Balance;

    /// Fixed-point scale of the funds/allocation ratio.
    pub const RATIO_PRECISION: Balance = 1_000_000_000_000;

    pub const BPS_DENOMINATOR: Balance = 10_000;
    pub const MAX_TEAM_FEE_BPS: u16 = 2_000; // 20%

    /// 30 days.
    pub const DEFAULT_DISTRIBUTION_INTERVAL_MS: u64 = 30 * 24 * 60 * 60 * 1000;
}

#[ink::contract]
mod badger_staking {
    use badger_pool::errors::Error as PoolError;
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::prelude::vec::Vec;

    use crate::constants::*;
    use crate::errors::{Error, Result};
    use crate::ledger::StakingLedger;
    use crate::registry::StakePosition;
    use crate::TokenId;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct BadgerBotStaking {
        owner: AccountId,
        pool: AccountId,
        /// Receives the team fee at each distribution.
        team: AccountId,
        team_fee_bps: u16,
        distribution_interval: u64,
        ledger: StakingLedger,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Staked {
        #[ink(topic)]
        user: AccountId,
        token_id: TokenId,
    }

    #[ink(event)]
    pub struct Unstaked {
        #[ink(topic)]
        user: AccountId,
        token_id: TokenId,
    }

    #[ink(event)]
    pub struct Deposit {
        #[ink(topic)]
        user: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct RewardsDistributed {
        timestamp: Timestamp,
        period_id: u32,
        ratio: Balance,
        team_fee: Balance,
    }

    #[ink(event)]
    pub struct WithdrawUserFunds {
        #[ink(topic)]
        user: AccountId,
        amount: Balance,
        timestamp: Timestamp,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl BadgerBotStaking {
        #[ink(constructor)]
        pub fn new(pool: AccountId, team: AccountId) -> Self {
            Self {
                owner: Self::env().caller(),
                pool,
                team,
                team_fee_bps: 0,
                distribution_interval: DEFAULT_DISTRIBUTION_INTERVAL_MS,
                ledger: StakingLedger::default(),
            }
        }

        // ── Stake registry ────────────────────────────────────────────────

        /// Lock `token_id` into the caller's position. The caller must have
        /// approved this contract on the pool collection.
        #[ink(message)]
        pub fn stake(&mut self, token_id: TokenId) -> Result<()> {
            let caller = self.env().caller();
            self.ledger.ensure_can_stake(&caller)?;

            if self.pool_owner_of(token_id)? != Some(caller) {
                return Err(Error::NotTokenOwner);
            }

            self.ledger
                .stake(caller, token_id, self.env().block_timestamp())?;
            self.pool_transfer_from(caller, self.env().account_id(), token_id)?;

            self.env().emit_event(Staked {
                user: caller,
                token_id,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn unstake(&mut self, token_id: TokenId) -> Result<()> {
            let caller = self.env().caller();
            self.ledger.unstake(caller, token_id)?;
            self.pool_transfer_from(self.env().account_id(), caller, token_id)?;

            self.env().emit_event(Unstaked {
                user: caller,
                token_id,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn get_user_stake_info(&self, user: AccountId) -> Option<StakePosition> {
            self.ledger.position(&user)
        }

        #[ink(message)]
        pub fn get_users(&self) -> Vec<AccountId> {
            self.ledger.users()
        }

        #[ink(message)]
        pub fn total_staked_supply(&self) -> u32 {
            self.ledger.total_staked_supply()
        }

        // ── Period accounting ─────────────────────────────────────────────

        /// Add the transferred value to the caller's position. The value is
        /// forwarded to the pool treasury.
        #[ink(message, payable)]
        pub fn deposit(&mut self) -> Result<()> {
            let caller = self.env().caller();
            let amount = self.env().transferred_value();

            self.ledger
                .deposit(caller, amount, self.env().block_timestamp())?;
            self.pool_receive_deposit(amount)?;

            self.env().emit_event(Deposit {
                user: caller,
                amount,
            });
            Ok(())
        }

        /// Close the current period and publish the new ratio.
        #[ink(message)]
        pub fn reward_distribution(&mut self) -> Result<()> {
            self.only_owner()?;
            let now = self.env().block_timestamp();
            self.ledger
                .ensure_distribution_due(now, self.distribution_interval)?;

            let realized = self.pool_realized_profit()?;
            let distribution = self.ledger.distribute(
                now,
                realized,
                self.team_fee_bps,
                self.distribution_interval,
            )?;

            if distribution.team_fee > 0 {
                self.pool_withdraw(self.team, distribution.team_fee)?;
            }

            ink::env::debug_println!(
                "distribution: period {} profit {} loss {} ratio {}",
                distribution.period_id,
                distribution.profit,
                distribution.loss,
                distribution.ratio
            );
            if distribution.written_off {
                ink::env::debug_println!("distribution: pool wiped out, positions written off");
            }
            self.env().emit_event(RewardsDistributed {
                timestamp: now,
                period_id: distribution.period_id,
                ratio: distribution.ratio,
                team_fee: distribution.team_fee,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn allocation_total(&self) -> Balance {
            self.ledger.period().allocation_total()
        }

        #[ink(message)]
        pub fn get_total_funds(&self) -> Balance {
            self.ledger.period().total_funds()
        }

        /// Funds per unit of allocation, scaled by `RATIO_PRECISION`.
        #[ink(message)]
        pub fn get_ratio(&self) -> Balance {
            self.ledger.period().ratio()
        }

        #[ink(message)]
        pub fn deposit_amount_this_month(&self) -> Balance {
            self.ledger.period().deposit_amount_this_month()
        }

        #[ink(message)]
        pub fn current_period(&self) -> u32 {
            self.ledger.period().period_id()
        }

        #[ink(message)]
        pub fn last_distribution(&self) -> Option<Timestamp> {
            self.ledger.period().last_distribution()
        }

        // ── Withdrawals ───────────────────────────────────────────────────

        #[ink(message)]
        pub fn request_withdraw(&mut self, percent: u32) -> Result<()> {
            let caller = self.env().caller();
            let amount = self.ledger.withdraw(caller, percent)?;
            self.pay_out(caller, amount)
        }

        #[ink(message)]
        pub fn request_withdraw_profit(&mut self) -> Result<()> {
            let caller = self.env().caller();
            let amount = self.ledger.withdraw_profit(caller)?;
            self.pay_out(caller, amount)
        }

        #[ink(message)]
        pub fn get_user_funds(&self, user: AccountId) -> Balance {
            self.ledger.funds_of(&user)
        }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn pool(&self) -> AccountId {
            self.pool
        }

        #[ink(message)]
        pub fn set_pool(&mut self, pool: AccountId) -> Result<()> {
            self.only_owner()?;
            self.pool = pool;
            Ok(())
        }

        #[ink(message)]
        pub fn team(&self) -> AccountId {
            self.team
        }

        #[ink(message)]
        pub fn set_team(&mut self, team: AccountId) -> Result<()> {
            self.only_owner()?;
            self.team = team;
            Ok(())
        }

        #[ink(message)]
        pub fn team_fee_bps(&self) -> u16 {
            self.team_fee_bps
        }

        #[ink(message)]
        pub fn set_team_fee_bps(&mut self, bps: u16) -> Result<()> {
            self.only_owner()?;
            if bps > MAX_TEAM_FEE_BPS {
                return Err(Error::InvalidRange);
            }
            self.team_fee_bps = bps;
            Ok(())
        }

        #[ink(message)]
        pub fn distribution_interval(&self) -> u64 {
            self.distribution_interval
        }

        #[ink(message)]
        pub fn set_distribution_interval(&mut self, interval: u64) -> Result<()> {
            self.only_owner()?;
            self.distribution_interval = interval;
            Ok(())
        }

        /// Wrap `amount` of the pool treasury's ether into WETH.
        #[ink(message)]
        pub fn swap_eth_to_weth(&mut self, amount: Balance) -> Result<()> {
            self.only_owner()?;
            self.pool_swap(
                Selector::new(ink::selector_bytes!("swap_eth_to_weth")),
                amount,
            )
        }

        /// Unwrap `amount` of the pool treasury's WETH back into ether.
        #[ink(message)]
        pub fn swap_weth_to_eth(&mut self, amount: Balance) -> Result<()> {
            self.only_owner()?;
            self.pool_swap(
                Selector::new(ink::selector_bytes!("swap_weth_to_eth")),
                amount,
            )
        }

        // =====================================================================
        // POOL CALLS
        // =====================================================================

        fn pay_out(&mut self, user: AccountId, amount: Balance) -> Result<()> {
            self.pool_withdraw(user, amount)?;
            self.env().emit_event(WithdrawUserFunds {
                user,
                amount,
                timestamp: self.env().block_timestamp(),
            });
            Ok(())
        }

        fn pool_owner_of(&self, token_id: TokenId) -> Result<Option<AccountId>> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.pool)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("owner_of")))
                        .push_arg(token_id),
                )
                .returns::<Option<AccountId>>()
                .try_invoke();

            match result {
                Ok(Ok(owner)) => Ok(owner),
                _ => Err(Error::PoolCallFailed),
            }
        }

        fn pool_transfer_from(&self, from: AccountId, to: AccountId, token_id: TokenId) -> Result<()> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.pool)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer_from")))
                        .push_arg(from)
                        .push_arg(to)
                        .push_arg(token_id),
                )
                .returns::<core::result::Result<(), PoolError>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::PoolCallFailed),
            }
        }

        fn pool_receive_deposit(&self, amount: Balance) -> Result<()> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.pool)
                .transferred_value(amount)
                .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                    "receive_staking_deposit"
                ))))
                .returns::<core::result::Result<(), PoolError>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::PoolCallFailed),
            }
        }

        fn pool_realized_profit(&self) -> Result<(Balance, Balance)> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.pool)
                .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                    "realized_profit"
                ))))
                .returns::<(Balance, Balance)>()
                .try_invoke();

            match result {
                Ok(Ok(profit)) => Ok(profit),
                _ => Err(Error::PoolCallFailed),
            }
        }

        fn pool_withdraw(&self, recipient: AccountId, amount: Balance) -> Result<()> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.pool)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "withdraw_by_staking_contract"
                    )))
                    .push_arg(recipient)
                    .push_arg(amount),
                )
                .returns::<core::result::Result<(), PoolError>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                Ok(Ok(Err(error))) => {
                    ink::env::debug_println!("pool rejected withdrawal: {}", error);
                    Err(Error::PoolCallFailed)
                }
                _ => Err(Error::PoolCallFailed),
            }
        }

        fn pool_swap(&self, selector: Selector, amount: Balance) -> Result<()> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.pool)
                .exec_input(ExecutionInput::new(selector).push_arg(amount))
                .returns::<core::result::Result<(), PoolError>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                Ok(Ok(Err(error))) => {
                    ink::env::debug_println!("pool rejected swap: {}", error);
                    Err(Error::PoolCallFailed)
                }
                _ => Err(Error::PoolCallFailed),
            }
        }

        // =====================================================================
        // ACCESS CONTROL
        // =====================================================================

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================
    //
    // Cross-contract calls are unavailable off-chain, so these tests cover
    // the checks that run before the contract reaches the pool. Accounting
    // itself is tested next to the ledger modules.

}
