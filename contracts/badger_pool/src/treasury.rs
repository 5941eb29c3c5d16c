//! Pool treasury: the tracked ether and wrapped-ether balances.
//!
//! Every operation validates first and mutates last, so a failed call leaves
//! both balances untouched.

use crate::errors::{Error, Result};
use crate::Balance;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Treasury {
    ether_balance: Balance,
    wrapped_ether_balance: Balance,
}

impl Treasury {
    pub fn ether_balance(&self) -> Balance {
        self.ether_balance
    }

    pub fn wrapped_ether_balance(&self) -> Balance {
        self.wrapped_ether_balance
    }

    pub fn credit_ether(&mut self, amount: Balance) -> Result<()> {
        self.ether_balance = self
            .ether_balance
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        Ok(())
    }

    pub fn debit_ether(&mut self, amount: Balance) -> Result<()> {
        if amount > self.ether_balance {
            return Err(Error::InsufficientFunds);
        }
        self.ether_balance -= amount;
        Ok(())
    }

    /// Moves `amount` from ether into wrapped ether.
    pub fn wrap_ether(&mut self, amount: Balance) -> Result<()> {
        if amount > self.ether_balance {
            return Err(Error::InsufficientFunds);
        }
        let wrapped = self
            .wrapped_ether_balance
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        self.ether_balance -= amount;
        self.wrapped_ether_balance = wrapped;
        Ok(())
    }

    /// Moves `amount` from wrapped ether back into ether.
    pub fn unwrap_ether(&mut self, amount: Balance) -> Result<()> {
        if amount > self.wrapped_ether_balance {
            return Err(Error::InsufficientFunds);
        }
        let ether = self
            .ether_balance
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        self.wrapped_ether_balance -= amount;
        self.ether_balance = ether;
        Ok(())
    }
}
