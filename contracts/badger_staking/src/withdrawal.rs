//! Withdrawals. Both operations return the amount the caller must pay out of
//! the pool treasury.

use ink::primitives::AccountId;

use crate::errors::{Error, Result};
use crate::ledger::StakingLedger;
use crate::Balance;

impl StakingLedger {
    /// Withdraws `percent` of `user`'s funds, burning the same share of
    /// allocation and principal.
    pub fn withdraw(&mut self, user: AccountId, percent: u32) -> Result<Balance> {
        if percent == 0 || percent > 100 {
            return Err(Error::InvalidRange);
        }
        let mut position = self.active_position(&user)?;
        if position.funds == 0 {
            return Err(Error::InsufficientFunds);
        }

        let amount = share(position.funds, percent)?;
        let (allocation_cut, principal_cut) = if percent == 100 {
            (position.allocation, position.principal)
        } else {
            (
                share(position.allocation, percent)?,
                share(position.principal, percent)?,
            )
        };

        position.funds -= amount;
        position.allocation -= allocation_cut;
        position.principal -= principal_cut;
        self.positions.insert(user, &position);

        self.period.total_funds = self.period.total_funds.saturating_sub(amount);
        self.period.allocation_total = self.period.allocation_total.saturating_sub(allocation_cut);
        Ok(amount)
    }

    /// Withdraws everything above `user`'s principal. Only allowed in a later
    /// period than both the stake and the latest deposit.
    pub fn withdraw_profit(&mut self, user: AccountId) -> Result<Balance> {
        let mut position = match self.positions.get(user) {
            Some(position) if position.staked => position,
            _ => return Err(Error::NoStakedAsset),
        };
        let locked_until = position.stake_period.max(position.deposit_period);
        if self.period.period_id <= locked_until {
            return Err(Error::TooEarly);
        }
        if position.funds <= position.principal {
            return Err(Error::NoProfit);
        }

        let profit = position.funds - position.principal;
        let burned = position
            .allocation
            .checked_mul(profit)
            .ok_or(Error::Overflow)?
            / position.funds;

        position.funds -= profit;
        position.allocation -= burned;
        self.positions.insert(user, &position);

        self.period.total_funds = self.period.total_funds.saturating_sub(profit);
        self.period.allocation_total = self.period.allocation_total.saturating_sub(burned);
        Ok(profit)
    }
}

fn share(value: Balance, percent: u32) -> Result<Balance> {
    Ok(value
        .checked_mul(Balance::from(percent))
        .ok_or(Error::Overflow)?
        / 100)
}
