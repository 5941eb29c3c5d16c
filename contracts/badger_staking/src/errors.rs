use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    Unauthorized,
    /// Percentage, fee or amount outside its accepted domain.
    InvalidRange,
    /// The position holds no withdrawable funds.
    InsufficientFunds,
    /// Caller has no active stake.
    NoStake,
    /// Caller never staked a pool token, or unstaked it.
    NoStakedAsset,
    /// Distribution interval not elapsed, or profit requested in the same
    /// period as the stake or the latest deposit.
    TooEarly,
    AlreadyStaked,
    NotTokenOwner,
    NotTokenStaker,
    /// The position still holds funds or allocation.
    OutstandingFunds,
    NoProfit,
    /// A call into the pool contract failed or was rejected.
    PoolCallFailed,
    Overflow,
}

impl Error {
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Unauthorized => "Caller is not authorized",
            Error::InvalidRange => "Value out of range",
            Error::InsufficientFunds => "Insufficient funds",
            Error::NoStake => "No active stake",
            Error::NoStakedAsset => "No staked asset",
            Error::TooEarly => "Too early",
            Error::AlreadyStaked => "Already staked",
            Error::NotTokenOwner => "Caller is not token owner",
            Error::NotTokenStaker => "Caller is not token staker",
            Error::OutstandingFunds => "Withdraw funds before unstaking",
            Error::NoProfit => "No profit to withdraw",
            Error::PoolCallFailed => "Pool call failed",
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
