use thiserror::Error;

/// Failures of the fixed point helpers in [`crate::logic::price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("fixed point overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderBookError {
    #[error("offers is empty")]
    EmptyOffers,
    #[error("current asset amount is 0")]
    AssetAmountIsZero,
    #[error("offer price denominator is zero")]
    OfferPriceDenominatorIsZero,
    #[error("sold more than current balance")]
    SoldTooMuch,
    #[error("cannot apply batched updates more than once")]
    BatchAlreadyApplied,
    #[error("cannot apply unexpected ledger {ledger}, graph is at ledger {last_ledger}")]
    UnexpectedLedger { ledger: u32, last_ledger: u32 },
    #[error("source assets and balances differ in length ({assets} != {balances})")]
    MismatchedBalances { assets: usize, balances: usize },
    #[error("list of assets exceeds maximum length of {0}")]
    TooManyAssets(usize),
    #[error("amount must be positive but got {0}")]
    NonPositiveAmount(i64),
    #[error("invalid asset: {0}")]
    InvalidAsset(String),
    #[error("invalid liquidity pool: {0}")]
    InvalidLiquidityPool(String),
    #[error("asset {0} is not a reserve of the liquidity pool")]
    AssetNotInPool(String),
    #[error("liquidity pool overflows from this exchange")]
    PoolOverflow,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
    #[error(transparent)]
    Price(#[from] PriceError),
}
