#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! # BadgerBot Pool
//!
//! **Role:** membership collection, flip-trading desk and treasury.
//!
//! ```text
//!   holders ──safe_mint──► [Pool NFT] ──stake──► [Staking contract]
//!                              │                        │
//!   bot ──buy/sell flips──► [Flip inventory]            │ deposits, payouts
//!                              │ realised profit        ▼
//!                           [Treasury] ◄── staking-only gateway
//! ```
//!
//! The pool owns two ledgers: the flip inventory (NFTs from other
//! collections the bot holds for resale) and the treasury (tracked ether and
//! wrapped-ether balances). Only the bot account trades flips and only the
//! registered staking contract moves treasury funds.

pub mod errors;
pub mod inventory;
pub mod treasury;
pub mod whitelist;

pub type Balance = u128;
pub type Timestamp = u64;
pub type TokenId = u128;

pub mod constants {
    use crate::TokenId;

    /// Hard cap of the membership collection.
    pub const MAX_SUPPLY: TokenId = 500;

    /// Tokens minted to the owner by the first airdrop.
    pub const TEAM_RESERVE: TokenId = 5;

    pub const DEFAULT_MAX_MINT_PER_WALLET: u32 = 5;

    /// Longest accepted flip metadata string, in bytes.
    pub const MAX_METADATA_LEN: usize = 512;
}

#[ink::contract]
mod badger_pool {
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::prelude::string::String;
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;

    use crate::constants::*;
    use crate::errors::{Error, Result};
    use crate::inventory::{FlipInventory, FlipNft};
    use crate::treasury::Treasury;
    use crate::whitelist::Whitelist;
    use crate::TokenId;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct BadgerBotPool {
        // ── Roles ─────────────────────────────────────────────────────────
        owner: AccountId,
        /// Trading bot allowed to buy and sell flips.
        bot: AccountId,
        /// Wrapped-ether contract used by the swap gateway.
        weth: AccountId,
        /// Staking contract allowed to move treasury funds.
        staking_contract: Option<AccountId>,

        // ── Collection ────────────────────────────────────────────────────
        base_uri: String,
        token_owner: Mapping<TokenId, AccountId>,
        token_approvals: Mapping<TokenId, AccountId>,
        owned_tokens_count: Mapping<AccountId, u32>,
        operator_approvals: Mapping<(AccountId, AccountId), ()>,
        total_supply: TokenId,

        // ── Mint window ───────────────────────────────────────────────────
        public_mint_open: bool,
        max_mint_per_wallet: u32,
        mint_price: Balance,
        minted_per_wallet: Mapping<AccountId, u32>,
        whitelist: Whitelist,
        team_reserve_minted: bool,

        // ── Ledgers ───────────────────────────────────────────────────────
        inventory: FlipInventory,
        treasury: Treasury,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        #[ink(topic)]
        id: TokenId,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        approved: AccountId,
        #[ink(topic)]
        id: TokenId,
    }

    #[ink(event)]
    pub struct ApprovalForAll {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        operator: AccountId,
        approved: bool,
    }

    #[ink(event)]
    pub struct FlipNftBought {
        #[ink(topic)]
        collection: AccountId,
        token_id: TokenId,
        price: Balance,
    }

    #[ink(event)]
    pub struct FlipNftSold {
        #[ink(topic)]
        collection: AccountId,
        token_id: TokenId,
        price: Balance,
        proceeds: Balance,
    }

    #[ink(event)]
    pub struct TreasuryFunded {
        #[ink(topic)]
        from: AccountId,
        amount: Balance,
    }

    /// Emitted when the staking contract pays out of the treasury.
    #[ink(event)]
    pub struct TreasuryWithdrawal {
        #[ink(topic)]
        recipient: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct Swapped {
        /// `true` for ether → wrapped ether.
        wrapped: bool,
        amount: Balance,
    }

    #[ink(event)]
    pub struct StakingContractUpdated {
        #[ink(topic)]
        staking_contract: AccountId,
    }

    #[ink(event)]
    pub struct BotUpdated {
        #[ink(topic)]
        bot: AccountId,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl BadgerBotPool {
        #[ink(constructor)]
        pub fn new(bot: AccountId, weth: AccountId, base_uri: String) -> Self {
            Self {
                owner: Self::env().caller(),
                bot,
                weth,
                staking_contract: None,
                base_uri,
                token_owner: Mapping::default(),
                token_approvals: Mapping::default(),
                owned_tokens_count: Mapping::default(),
                operator_approvals: Mapping::default(),
                total_supply: 0,
                public_mint_open: false,
                max_mint_per_wallet: DEFAULT_MAX_MINT_PER_WALLET,
                mint_price: 0,
                minted_per_wallet: Mapping::default(),
                whitelist: Whitelist::default(),
                team_reserve_minted: false,
                inventory: FlipInventory::default(),
                treasury: Treasury::default(),
            }
        }

        // =====================================================================
        // FLIP INVENTORY (bot only)
        // =====================================================================

        /// Record a flip bought by the bot and release `price` from the
        /// treasury to the bot, which settles the purchase on the marketplace.
        #[ink(message)]
        pub fn buy_flip_nft(
            &mut self,
            collection: AccountId,
            token_id: TokenId,
            price: Balance,
            metadata: String,
        ) -> Result<()> {
            self.only_bot()?;

            if self.inventory.contains(collection, token_id) {
                return Err(Error::DuplicateEntry);
            }
            if price > self.treasury.ether_balance() {
                return Err(Error::InsufficientFunds);
            }

            self.inventory.insert(FlipNft {
                collection,
                token_id,
                price,
                metadata,
                acquired_at: self.env().block_timestamp(),
            })?;
            self.treasury.debit_ether(price)?;

            if price > 0 {
                self.env()
                    .transfer(self.bot, price)
                    .map_err(|_| Error::TransferFailed)?;
            }

            self.env().emit_event(FlipNftBought {
                collection,
                token_id,
                price,
            });
            Ok(())
        }

        /// Close a flip. The transferred value is the sale proceeds.
        #[ink(message, payable)]
        pub fn sell_flip_nft(&mut self, collection: AccountId, token_id: TokenId) -> Result<()> {
            self.only_bot()?;

            if !self.inventory.contains(collection, token_id) {
                return Err(Error::NotFound);
            }

            let proceeds = self.env().transferred_value();
            self.treasury.credit_ether(proceeds)?;
            let outcome = self.inventory.remove(collection, token_id, proceeds)?;

            self.env().emit_event(FlipNftSold {
                collection,
                token_id,
                price: outcome.price,
                proceeds,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn get_flip_nft(&self, collection: AccountId, token_id: TokenId) -> Option<FlipNft> {
            self.inventory.get(collection, token_id)
        }

        #[ink(message)]
        pub fn is_flip_nft_existed(&self, collection: AccountId, token_id: TokenId) -> bool {
            self.inventory.contains(collection, token_id)
        }

        #[ink(message)]
        pub fn get_all_flip_nfts(&self) -> Vec<FlipNft> {
            self.inventory.all()
        }

        #[ink(message)]
        pub fn get_flip_nft_count(&self) -> u32 {
            self.inventory.len()
        }

        /// Sum of the purchase prices of every held flip.
        #[ink(message)]
        pub fn get_total_assets_value(&self) -> Balance {
            self.inventory.total_value()
        }

        /// Cumulative `(gains, losses)` of closed flips. Read by the staking
        /// contract at every reward distribution.
        #[ink(message)]
        pub fn realized_profit(&self) -> (Balance, Balance) {
            self.inventory.realized_profit()
        }

        // =====================================================================
        // TREASURY GATEWAY (staking contract only)
        // =====================================================================

        /// Pay `amount` of treasury ether to `recipient`.
        ///
        /// The tracked balance is debited before the transfer.
        #[ink(message)]
        pub fn withdraw_by_staking_contract(
            &mut self,
            recipient: AccountId,
            amount: Balance,
        ) -> Result<()> {
            self.only_staking_contract()?;
            self.treasury.debit_ether(amount)?;

            self.env()
                .transfer(recipient, amount)
                .map_err(|_| Error::TransferFailed)?;

            ink::env::debug_println!("treasury: paid {} to {:?}", amount, recipient);
            self.env().emit_event(TreasuryWithdrawal { recipient, amount });
            Ok(())
        }

        /// Wrap `amount` of treasury ether through the WETH `deposit` entry.
        #[ink(message)]
        pub fn swap_eth_to_weth(&mut self, amount: Balance) -> Result<()> {
            self.only_staking_contract()?;
            self.treasury.wrap_ether(amount)?;

            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.weth)
                .transferred_value(amount)
                .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                    "deposit"
                ))))
                .returns::<()>()
                .try_invoke();

            match result {
                Ok(Ok(())) => {}
                _ => return Err(Error::WrappedEtherCallFailed),
            }

            self.env().emit_event(Swapped {
                wrapped: true,
                amount,
            });
            Ok(())
        }

        /// Unwrap `amount` of treasury WETH through the WETH `withdraw` entry.
        #[ink(message)]
        pub fn swap_weth_to_eth(&mut self, amount: Balance) -> Result<()> {
            self.only_staking_contract()?;
            self.treasury.unwrap_ether(amount)?;

            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.weth)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("withdraw")))
                        .push_arg(amount),
                )
                .returns::<()>()
                .try_invoke();

            match result {
                Ok(Ok(())) => {}
                _ => return Err(Error::WrappedEtherCallFailed),
            }

            self.env().emit_event(Swapped {
                wrapped: false,
                amount,
            });
            Ok(())
        }

        /// Staker deposits forwarded by the staking contract.
        #[ink(message, payable)]
        pub fn receive_staking_deposit(&mut self) -> Result<()> {
            self.only_staking_contract()?;
            let amount = self.env().transferred_value();
            self.treasury.credit_ether(amount)?;

            self.env().emit_event(TreasuryFunded {
                from: self.env().caller(),
                amount,
            });
            Ok(())
        }

        /// Add working capital to the treasury.
        #[ink(message, payable)]
        pub fn fund_treasury(&mut self) -> Result<()> {
            let amount = self.env().transferred_value();
            if amount == 0 {
                return Err(Error::InvalidRange);
            }
            self.treasury.credit_ether(amount)?;

            self.env().emit_event(TreasuryFunded {
                from: self.env().caller(),
                amount,
            });
            Ok(())
        }

        /// Tracked `(ether, wrapped_ether)` balances.
        #[ink(message)]
        pub fn get_treasury(&self) -> (Balance, Balance) {
            (
                self.treasury.ether_balance(),
                self.treasury.wrapped_ether_balance(),
            )
        }

        /// WETH balance of the pool as reported by the WETH contract.
        #[ink(message)]
        pub fn weth_balance(&self) -> Result<Balance> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.weth)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("balance_of")))
                        .push_arg(self.env().account_id()),
                )
                .returns::<Balance>()
                .try_invoke();

            match result {
                Ok(Ok(balance)) => Ok(balance),
                _ => Err(Error::WrappedEtherCallFailed),
            }
        }

        #[ink(message)]
        pub fn set_staking_contract_address(&mut self, staking_contract: AccountId) -> Result<()> {
            self.only_owner()?;
            self.staking_contract = Some(staking_contract);
            self.env()
                .emit_event(StakingContractUpdated { staking_contract });
            Ok(())
        }

        #[ink(message)]
        pub fn staking_contract(&self) -> Option<AccountId> {
            self.staking_contract
        }

        // =====================================================================
        // MINTING
        // =====================================================================

        /// Mint the next collection token to `to`, paying `mint_price`.
        #[ink(message, payable)]
        pub fn safe_mint(&mut self, to: AccountId) -> Result<TokenId> {
            if !self.public_mint_open {
                return Err(Error::PublicMintClosed);
            }
            let minted = self.minted_per_wallet.get(to).unwrap_or(0);
            if minted >= self.max_mint_per_wallet {
                return Err(Error::MaxMintPerWalletReached);
            }
            if self.total_supply >= MAX_SUPPLY {
                return Err(Error::MaxSupplyReached);
            }
            let paid = self.env().transferred_value();
            if paid != self.mint_price {
                return Err(Error::IncorrectPayment);
            }

            self.treasury.credit_ether(paid)?;
            self.minted_per_wallet.insert(to, &(minted + 1));
            self.mint_next(to)
        }

        /// Mint the team reserve to the owner (first call only) and one
        /// token to every whitelisted wallet. Returns the number minted.
        #[ink(message)]
        pub fn airdrop_nft(&mut self) -> Result<u32> {
            self.only_owner()?;

            let reserve = if self.team_reserve_minted { 0 } else { TEAM_RESERVE };
            let needed = reserve
                .checked_add(TokenId::from(self.whitelist.len()))
                .ok_or(Error::Overflow)?;
            if self.total_supply.saturating_add(needed) > MAX_SUPPLY {
                return Err(Error::MaxSupplyReached);
            }

            let owner = self.owner;
            for _ in 0..reserve {
                self.mint_next(owner)?;
            }
            self.team_reserve_minted = true;

            for slot in 0..self.whitelist.len() {
                if let Some(wallet) = self.whitelist.member(slot) {
                    self.mint_next(wallet)?;
                }
            }

            Ok(needed as u32)
        }

        #[ink(message)]
        pub fn total_supply(&self) -> TokenId {
            self.total_supply
        }

        #[ink(message)]
        pub fn edit_mint_windows(&mut self, open: bool) -> Result<()> {
            self.only_owner()?;
            self.public_mint_open = open;
            Ok(())
        }

        #[ink(message)]
        pub fn edit_max_mint_per_wallet(&mut self, max: u32) -> Result<()> {
            self.only_owner()?;
            self.max_mint_per_wallet = max;
            Ok(())
        }

        #[ink(message)]
        pub fn edit_mint_price(&mut self, price: Balance) -> Result<()> {
            self.only_owner()?;
            self.mint_price = price;
            Ok(())
        }

        #[ink(message)]
        pub fn is_public_mint_open(&self) -> bool {
            self.public_mint_open
        }

        #[ink(message)]
        pub fn max_mint_per_wallet(&self) -> u32 {
            self.max_mint_per_wallet
        }

        #[ink(message)]
        pub fn mint_price(&self) -> Balance {
            self.mint_price
        }

        // ── Whitelist ─────────────────────────────────────────────────────

        #[ink(message)]
        pub fn add_to_whitelist(&mut self, wallet: AccountId) -> Result<()> {
            self.only_owner()?;
            self.whitelist.add(wallet)?;
            Ok(())
        }

        #[ink(message)]
        pub fn remove_from_whitelist(&mut self, wallet: AccountId) -> Result<()> {
            self.only_owner()?;
            self.whitelist.remove(wallet);
            Ok(())
        }

        #[ink(message)]
        pub fn whitelist(&self, wallet: AccountId) -> bool {
            self.whitelist.contains(wallet)
        }

        #[ink(message)]
        pub fn get_whitelist(&self) -> Vec<AccountId> {
            self.whitelist.all()
        }

        // =====================================================================
        // COLLECTION (ownership and custody)
        // =====================================================================

        #[ink(message)]
        pub fn owner_of(&self, id: TokenId) -> Option<AccountId> {
            self.token_owner.get(id)
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> u32 {
            self.owned_tokens_count.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn get_approved(&self, id: TokenId) -> Option<AccountId> {
            self.token_approvals.get(id)
        }

        #[ink(message)]
        pub fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool {
            self.operator_approvals.contains((owner, operator))
        }

        #[ink(message)]
        pub fn approve(&mut self, to: AccountId, id: TokenId) -> Result<()> {
            let caller = self.env().caller();
            let owner = self.token_owner.get(id).ok_or(Error::TokenNotFound)?;
            if caller != owner && !self.is_approved_for_all(owner, caller) {
                return Err(Error::NotApproved);
            }

            self.token_approvals.insert(id, &to);
            self.env().emit_event(Approval {
                owner,
                approved: to,
                id,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_approval_for_all(&mut self, operator: AccountId, approved: bool) -> Result<()> {
            let caller = self.env().caller();
            if approved {
                self.operator_approvals.insert((caller, operator), &());
            } else {
                self.operator_approvals.remove((caller, operator));
            }

            self.env().emit_event(ApprovalForAll {
                owner: caller,
                operator,
                approved,
            });
            Ok(())
        }

        /// Move `id` from `from` to `to`. The caller must be the owner, the
        /// approved account for `id`, or an operator of `from`.
        #[ink(message)]
        pub fn transfer_from(&mut self, from: AccountId, to: AccountId, id: TokenId) -> Result<()> {
            let caller = self.env().caller();
            let owner = self.token_owner.get(id).ok_or(Error::TokenNotFound)?;
            if owner != from {
                return Err(Error::NotApproved);
            }
            let approved = self.token_approvals.get(id) == Some(caller);
            if caller != owner && !approved && !self.is_approved_for_all(owner, caller) {
                return Err(Error::NotApproved);
            }

            self.token_approvals.remove(id);
            let from_count = self.balance_of(from).saturating_sub(1);
            self.owned_tokens_count.insert(from, &from_count);
            let to_count = self.balance_of(to).saturating_add(1);
            self.owned_tokens_count.insert(to, &to_count);
            self.token_owner.insert(id, &to);

            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                id,
            });
            Ok(())
        }

        // =====================================================================
        // ADMIN & VIEWS
        // =====================================================================

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn bot(&self) -> AccountId {
            self.bot
        }

        #[ink(message)]
        pub fn set_bot(&mut self, bot: AccountId) -> Result<()> {
            self.only_owner()?;
            self.bot = bot;
            self.env().emit_event(BotUpdated { bot });
            Ok(())
        }

        #[ink(message)]
        pub fn weth(&self) -> AccountId {
            self.weth
        }

        #[ink(message)]
        pub fn get_base_uri(&self) -> String {
            self.base_uri.clone()
        }

        #[ink(message)]
        pub fn set_base_uri(&mut self, base_uri: String) -> Result<()> {
            self.only_owner()?;
            self.base_uri = base_uri;
            Ok(())
        }

        #[ink(message)]
        pub fn token_uri(&self, id: TokenId) -> Option<String> {
            self.token_owner
                .get(id)
                .map(|_| ink::prelude::format!("{}{}", self.base_uri, id))
        }

        // =====================================================================
        // INTERNAL
        // =====================================================================

        fn mint_next(&mut self, to: AccountId) -> Result<TokenId> {
            let id = self.total_supply.checked_add(1).ok_or(Error::Overflow)?;
            self.total_supply = id;
            self.token_owner.insert(id, &to);
            let count = self.balance_of(to).saturating_add(1);
            self.owned_tokens_count.insert(to, &count);

            self.env().emit_event(Transfer {
                from: None,
                to: Some(to),
                id,
            });
            Ok(id)
        }

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }

        fn only_bot(&self) -> Result<()> {
            if self.env().caller() != self.bot {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }

        fn only_staking_contract(&self) -> Result<()> {
            match self.staking_contract {
                Some(staking) if staking == self.env().caller() => Ok(()),
                _ => Err(Error::Unauthorized),
            }
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
