//! Error type shared by the pool contract and its ledgers.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Caller does not hold the role required by the message
    /// (owner, bot, or the registered staking contract).
    Unauthorized,
    /// An argument is outside its accepted domain.
    InvalidRange,
    /// The treasury balance is too low for the requested move.
    InsufficientFunds,
    /// The flip NFT is already held by the pool.
    DuplicateEntry,
    /// The flip NFT is not held by the pool.
    NotFound,
    /// Public minting is closed.
    PublicMintClosed,
    /// The recipient already minted the per-wallet maximum.
    MaxMintPerWalletReached,
    /// The collection cap is reached.
    MaxSupplyReached,
    /// Transferred value does not match the mint price.
    IncorrectPayment,
    /// The collection token does not exist.
    TokenNotFound,
    /// Caller is neither the owner nor an approved operator of the token.
    NotApproved,
    /// A native value transfer failed.
    TransferFailed,
    /// The wrapped-ether contract rejected the call.
    WrappedEtherCallFailed,
    /// An arithmetic operation overflowed.
    Overflow,
}

impl Error {
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Unauthorized => "Caller is not authorized",
            Error::InvalidRange => "Value out of range",
            Error::InsufficientFunds => "Insufficient treasury funds",
            Error::DuplicateEntry => "Flip NFT already exists",
            Error::NotFound => "Flip NFT does not exist",
            Error::PublicMintClosed => "Public Mint Closed",
            Error::MaxMintPerWalletReached => "Max Mint per wallet reached",
            Error::MaxSupplyReached => "Max supply reached",
            Error::IncorrectPayment => "Incorrect mint payment",
            Error::TokenNotFound => "Token does not exist",
            Error::NotApproved => "Caller is not token owner or approved",
            Error::TransferFailed => "Native transfer failed",
            Error::WrappedEtherCallFailed => "WETH call failed",
            Error::Overflow => "Arithmetic overflow",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
