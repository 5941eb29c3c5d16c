//! Airdrop whitelist. Members are stored one per cell with a dense index so
//! the airdrop can walk them in insertion order.

use ink::prelude::vec::Vec;
use ink::primitives::AccountId;
use ink::storage::Mapping;

use crate::errors::{Error, Result};

#[derive(Debug)]
#[ink::storage_item]
pub struct Whitelist {
    members: Mapping<u32, AccountId>,
    slots: Mapping<AccountId, u32>,
    len: u32,
}

impl Default for Whitelist {
    fn default() -> Self {
        Self {
            members: Mapping::new(),
            slots: Mapping::new(),
            len: 0,
        }
    }
}

impl Whitelist {
    /// Adds `wallet`; returns `false` if it was already listed.
    pub fn add(&mut self, wallet: AccountId) -> Result<bool> {
        if self.slots.contains(wallet) {
            return Ok(false);
        }
        let slot = self.len;
        self.len = slot.checked_add(1).ok_or(Error::Overflow)?;
        self.members.insert(slot, &wallet);
        self.slots.insert(wallet, &slot);
        Ok(true)
    }

    /// Removes `wallet`; returns `false` if it was not listed.
    pub fn remove(&mut self, wallet: AccountId) -> bool {
        let Some(slot) = self.slots.get(wallet) else {
            return false;
        };
        let last = self.len.saturating_sub(1);
        if slot != last {
            if let Some(moved) = self.members.get(last) {
                self.members.insert(slot, &moved);
                self.slots.insert(moved, &slot);
            }
        }
        self.members.remove(last);
        self.slots.remove(wallet);
        self.len = last;
        true
    }

    pub fn contains(&self, wallet: AccountId) -> bool {
        self.slots.contains(wallet)
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn member(&self, slot: u32) -> Option<AccountId> {
        self.members.get(slot)
    }

    pub fn all(&self) -> Vec<AccountId> {
        (0..self.len).filter_map(|slot| self.members.get(slot)).collect()
    }
}
