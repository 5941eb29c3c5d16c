//! Period accounting: deposits during a period and the distribution that
//! closes it.
//!
//! Funds are tracked against allocations through a fixed-point ratio:
//!
//! ```text
//! ratio        = total_funds * RATIO_PRECISION / allocation_total
//! funds(user)  = allocation(user) * ratio / RATIO_PRECISION
//! ```
//!
//! A deposit buys allocation at the current ratio, so it never dilutes
//! existing positions. A distribution folds the period's net trading result
//! into `total_funds` and republishes the ratio; allocations stay as they
//! are unless the pool was wiped out.

use ink::prelude::vec::Vec;
use ink::primitives::AccountId;

use crate::constants::{BPS_DENOMINATOR, RATIO_PRECISION};
use crate::errors::{Error, Result};
use crate::ledger::StakingLedger;
use crate::{Balance, Timestamp};

#[derive(Debug, Default, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct PeriodState {
    pub(crate) deposit_amount_this_month: Balance,
    pub(crate) allocation_total: Balance,
    pub(crate) total_funds: Balance,
    pub(crate) ratio: Balance,
    pub(crate) period_id: u32,
    pub(crate) last_distribution: Option<Timestamp>,
    /// Pool `(gains, losses)` seen at the last distribution.
    pub(crate) profit_checkpoint: (Balance, Balance),
}

impl PeriodState {
    pub fn deposit_amount_this_month(&self) -> Balance {
        self.deposit_amount_this_month
    }

    pub fn allocation_total(&self) -> Balance {
        self.allocation_total
    }

    pub fn total_funds(&self) -> Balance {
        self.total_funds
    }

    pub fn ratio(&self) -> Balance {
        self.ratio
    }

    pub fn period_id(&self) -> u32 {
        self.period_id
    }

    pub fn last_distribution(&self) -> Option<Timestamp> {
        self.last_distribution
    }
}

/// Summary of a closed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
    /// Net gain of the period before the team fee.
    pub profit: Balance,
    /// Net loss of the period.
    pub loss: Balance,
    pub team_fee: Balance,
    pub ratio: Balance,
    /// Id of the period that was opened.
    pub period_id: u32,
    /// Every position was written off because nothing was left to share.
    pub written_off: bool,
}

impl StakingLedger {
    /// Credits `amount` deposited by `user` to the position and the period.
    pub fn deposit(&mut self, user: AccountId, amount: Balance, now: Timestamp) -> Result<()> {
        let mut position = self.active_position(&user)?;
        if amount == 0 {
            return Err(Error::InvalidRange);
        }

        let period = &self.period;
        let allocation = if period.allocation_total == 0 || period.ratio == 0 {
            amount
        } else {
            amount
                .checked_mul(RATIO_PRECISION)
                .ok_or(Error::Overflow)?
                / period.ratio
        };

        let position_allocation = add(position.allocation, allocation)?;
        let deposit_amount = add(position.deposit_amount, amount)?;
        let funds = add(position.funds, amount)?;
        let principal = add(position.principal, amount)?;
        let this_month = add(period.deposit_amount_this_month, amount)?;
        let allocation_total = add(period.allocation_total, allocation)?;
        let total_funds = add(period.total_funds, amount)?;

        position.allocation = position_allocation;
        position.deposit_amount = deposit_amount;
        position.funds = funds;
        position.principal = principal;
        position.deposited = true;
        position.deposit_timestamp = now;
        position.deposit_period = period.period_id;
        self.positions.insert(user, &position);

        self.period.deposit_amount_this_month = this_month;
        self.period.allocation_total = allocation_total;
        self.period.total_funds = total_funds;
        Ok(())
    }

    /// Fails with `TooEarly` until `interval` has passed since the previous
    /// distribution. The first distribution is always due.
    pub fn ensure_distribution_due(&self, now: Timestamp, interval: u64) -> Result<()> {
        match self.period.last_distribution {
            Some(last) if now < last.saturating_add(interval) => Err(Error::TooEarly),
            _ => Ok(()),
        }
    }

    /// Closes the current period.
    ///
    /// `realized` is the pool's cumulative `(gains, losses)`; only the delta
    /// against the previous checkpoint belongs to this period. The team fee
    /// is taken from a net gain and returned for payout.
    ///
    /// When the ratio drops to zero while allocation is outstanding, the
    /// pool has been wiped out: every position is written off and the next
    /// deposit starts again at 1:1.
    pub fn distribute(
        &mut self,
        now: Timestamp,
        realized: (Balance, Balance),
        team_fee_bps: u16,
        interval: u64,
    ) -> Result<Distribution> {
        self.ensure_distribution_due(now, interval)?;

        let (gains, losses) = realized;
        let (seen_gains, seen_losses) = self.period.profit_checkpoint;
        let gain_delta = gains.saturating_sub(seen_gains);
        let loss_delta = losses.saturating_sub(seen_losses);
        let (profit, loss) = if gain_delta >= loss_delta {
            (gain_delta - loss_delta, 0)
        } else {
            (0, loss_delta - gain_delta)
        };

        let team_fee = profit
            .checked_mul(Balance::from(team_fee_bps))
            .ok_or(Error::Overflow)?
            / BPS_DENOMINATOR;
        let total_funds = add(self.period.total_funds, profit.saturating_sub(team_fee))?
            .saturating_sub(loss);

        let allocation_total = self.period.allocation_total;
        let ratio = if allocation_total == 0 {
            0
        } else {
            total_funds
                .checked_mul(RATIO_PRECISION)
                .ok_or(Error::Overflow)?
                / allocation_total
        };
        let written_off = ratio == 0 && allocation_total > 0;

        let mut updated = Vec::with_capacity(self.user_count as usize);
        for user in self.users() {
            let Some(mut position) = self.positions.get(user) else {
                continue;
            };
            if written_off {
                position.allocation = 0;
                position.principal = 0;
                position.funds = 0;
            } else {
                position.funds = funds_at(position.allocation, ratio)?;
            }
            position.deposited = false;
            position.deposit_amount = 0;
            updated.push((user, position));
        }
        let period_id = self.period.period_id.checked_add(1).ok_or(Error::Overflow)?;

        for (user, position) in updated {
            self.positions.insert(user, &position);
        }

        let period = &mut self.period;
        if written_off {
            period.allocation_total = 0;
        }
        period.total_funds = total_funds;
        period.ratio = ratio;
        period.deposit_amount_this_month = 0;
        period.period_id = period_id;
        period.last_distribution = Some(now);
        period.profit_checkpoint = realized;

        Ok(Distribution {
            profit,
            loss,
            team_fee,
            ratio,
            period_id,
            written_off,
        })
    }
}

fn add(a: Balance, b: Balance) -> Result<Balance> {
    a.checked_add(b).ok_or(Error::Overflow)
}

fn funds_at(allocation: Balance, ratio: Balance) -> Result<Balance> {
    Ok(allocation.checked_mul(ratio).ok_or(Error::Overflow)? / RATIO_PRECISION)
}
