//! Flip inventory: NFTs from other collections the bot currently holds for
//! resale, keyed by `(collection, token_id)`.
//!
//! The inventory also keeps the cumulative realised gains and losses of every
//! closed flip. The staking contract reads those counters at each reward
//! distribution and distributes the delta since its previous checkpoint.
//!
//! Entries live in their own storage cells. A dense index (`keys` / `slots`)
//! allows enumeration; removal swaps the last key into the freed slot.

use ink::prelude::string::String;
use ink::prelude::vec::Vec;
use ink::primitives::AccountId;
use ink::storage::Mapping;

use crate::constants::MAX_METADATA_LEN;
use crate::errors::{Error, Result};
use crate::{Balance, Timestamp, TokenId};

type FlipKey = (AccountId, TokenId);

#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct FlipNft {
    pub collection: AccountId,
    pub token_id: TokenId,
    /// Ether paid by the bot to acquire the asset.
    pub price: Balance,
    pub metadata: String,
    pub acquired_at: Timestamp,
}

/// Result of closing a flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleOutcome {
    pub price: Balance,
    pub proceeds: Balance,
}

impl SaleOutcome {
    pub fn gain(&self) -> Balance {
        self.proceeds.saturating_sub(self.price)
    }

    pub fn loss(&self) -> Balance {
        self.price.saturating_sub(self.proceeds)
    }
}

#[derive(Debug)]
#[ink::storage_item]
pub struct FlipInventory {
    entries: Mapping<FlipKey, FlipNft>,
    keys: Mapping<u32, FlipKey>,
    slots: Mapping<FlipKey, u32>,
    len: u32,
    /// Sum of `price` over held entries.
    total_value: Balance,
    realized_gains: Balance,
    realized_losses: Balance,
}

impl Default for FlipInventory {
    fn default() -> Self {
        Self {
            entries: Mapping::new(),
            keys: Mapping::new(),
            slots: Mapping::new(),
            len: 0,
            total_value: 0,
            realized_gains: 0,
            realized_losses: 0,
        }
    }
}

impl FlipInventory {
    /// Records a newly bought flip.
    pub fn insert(&mut self, nft: FlipNft) -> Result<()> {
        if nft.metadata.len() > MAX_METADATA_LEN {
            return Err(Error::InvalidRange);
        }
        let key = (nft.collection, nft.token_id);
        if self.entries.contains(key) {
            return Err(Error::DuplicateEntry);
        }
        let total_value = self
            .total_value
            .checked_add(nft.price)
            .ok_or(Error::Overflow)?;
        let slot = self.len;
        let len = slot.checked_add(1).ok_or(Error::Overflow)?;

        self.entries.insert(key, &nft);
        self.keys.insert(slot, &key);
        self.slots.insert(key, &slot);
        self.len = len;
        self.total_value = total_value;
        Ok(())
    }

    /// Closes a flip sold for `proceeds`, removing it from the inventory and
    /// booking the realised gain or loss.
    pub fn remove(
        &mut self,
        collection: AccountId,
        token_id: TokenId,
        proceeds: Balance,
    ) -> Result<SaleOutcome> {
        let key = (collection, token_id);
        let price = self
            .entries
            .get(key)
            .map(|nft| nft.price)
            .ok_or(Error::NotFound)?;
        let slot = self.slots.get(key).ok_or(Error::NotFound)?;

        let outcome = SaleOutcome { price, proceeds };
        let gains = self
            .realized_gains
            .checked_add(outcome.gain())
            .ok_or(Error::Overflow)?;
        let losses = self
            .realized_losses
            .checked_add(outcome.loss())
            .ok_or(Error::Overflow)?;

        let last = self.len.saturating_sub(1);
        if slot != last {
            if let Some(moved) = self.keys.get(last) {
                self.keys.insert(slot, &moved);
                self.slots.insert(moved, &slot);
            }
        }
        self.keys.remove(last);
        self.slots.remove(key);
        self.entries.remove(key);
        self.len = last;

        self.total_value = self.total_value.saturating_sub(price);
        self.realized_gains = gains;
        self.realized_losses = losses;
        Ok(outcome)
    }

    pub fn get(&self, collection: AccountId, token_id: TokenId) -> Option<FlipNft> {
        self.entries.get((collection, token_id))
    }

    pub fn contains(&self, collection: AccountId, token_id: TokenId) -> bool {
        self.entries.contains((collection, token_id))
    }

    pub fn all(&self) -> Vec<FlipNft> {
        (0..self.len)
            .filter_map(|slot| self.keys.get(slot))
            .filter_map(|key| self.entries.get(key))
            .collect()
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn total_value(&self) -> Balance {
        self.total_value
    }

    /// Cumulative `(gains, losses)` over all closed flips.
    pub fn realized_profit(&self) -> (Balance, Balance) {
        (self.realized_gains, self.realized_losses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHER: Balance = 1_000_000_000_000_000_000;

    fn collection(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    fn flip(byte: u8, token_id: TokenId, price: Balance) -> FlipNft {
        FlipNft {
            collection: collection(byte),
            token_id,
            price,
            metadata: String::from("ipfs://flip"),
            acquired_at: 0,
        }
    }

    #[ink::test]
    fn duplicate_pair_is_rejected_until_sold() {
        let mut inventory = FlipInventory::default();
        inventory.insert(flip(1, 7, ETHER)).unwrap();
        assert_eq!(inventory.insert(flip(1, 7, 2 * ETHER)), Err(Error::DuplicateEntry));
        assert_eq!(inventory.total_value(), ETHER);

        inventory.remove(collection(1), 7, ETHER).unwrap();
        inventory.insert(flip(1, 7, 2 * ETHER)).unwrap();
        assert_eq!(inventory.total_value(), 2 * ETHER);
        assert_eq!(inventory.len(), 1);
    }

    #[ink::test]
    fn same_token_id_in_other_collection_is_distinct() {
        let mut inventory = FlipInventory::default();
        inventory.insert(flip(1, 7, ETHER)).unwrap();
        inventory.insert(flip(2, 7, ETHER)).unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(inventory.contains(collection(2), 7));
        assert!(!inventory.contains(collection(3), 7));
    }

    #[ink::test]
    fn removing_unknown_pair_fails() {
        let mut inventory = FlipInventory::default();
        assert_eq!(inventory.remove(collection(1), 1, ETHER), Err(Error::NotFound));
        assert_eq!(inventory.realized_profit(), (0, 0));
    }

    #[ink::test]
    fn oversized_metadata_is_rejected() {
        let mut inventory = FlipInventory::default();
        let mut nft = flip(1, 1, ETHER);
        nft.metadata = "x".repeat(MAX_METADATA_LEN + 1);
        assert_eq!(inventory.insert(nft), Err(Error::InvalidRange));
        assert_eq!(inventory.len(), 0);
    }

    #[ink::test]
    fn sales_book_gains_and_losses() {
        let mut inventory = FlipInventory::default();
        inventory.insert(flip(1, 1, ETHER)).unwrap();
        inventory.insert(flip(1, 2, 2 * ETHER)).unwrap();
        assert_eq!(inventory.total_value(), 3 * ETHER);

        let won = inventory.remove(collection(1), 1, ETHER * 14 / 10).unwrap();
        assert_eq!(won.gain(), ETHER * 4 / 10);
        assert_eq!(won.loss(), 0);

        let lost = inventory.remove(collection(1), 2, ETHER * 15 / 10).unwrap();
        assert_eq!(lost.loss(), ETHER / 2);

        assert_eq!(inventory.realized_profit(), (ETHER * 4 / 10, ETHER / 2));
        assert_eq!(inventory.total_value(), 0);
        assert_eq!(inventory.len(), 0);
        assert!(inventory.all().is_empty());
    }

    #[ink::test]
    fn removal_keeps_remaining_entries_listed() {
        let mut inventory = FlipInventory::default();
        inventory.insert(flip(1, 1, ETHER)).unwrap();
        inventory.insert(flip(2, 5, ETHER)).unwrap();
        inventory.insert(flip(3, 9, ETHER)).unwrap();
        inventory.remove(collection(1), 1, ETHER).unwrap();

        let held: Vec<_> = inventory.all().iter().map(|nft| nft.collection).collect();
        assert_eq!(held.len(), 2);
        assert!(held.contains(&collection(2)));
        assert!(held.contains(&collection(3)));
        assert_eq!(inventory.get(collection(2), 5).map(|nft| nft.token_id), Some(5));

        // The moved key can still be removed.
        inventory.remove(collection(3), 9, ETHER).unwrap();
        assert_eq!(inventory.all().len(), 1);
    }
}
