use super::errors::OrderBookError;
use crate::utils::Asset;
use crate::utils::constants::MAX_BASIS_POINTS;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Direction of a pool exchange, seen from the asset passed to [`LiquidityPool::make_trade`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeType {
    /// Deposit the given amount, get the payout of the other asset.
    Deposit,
    /// Get the given amount of the other asset, return what has to be deposited.
    Expectation,
}

/// Constant product liquidity pool holding two assets.
///
/// Assets are kept in canonical order, `asset_a < asset_b`. Exchanges never change the
/// reserves, a pool is updated by replacing it in the graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidityPool {
    asset_a: Asset,
    asset_b: Asset,
    fee_bips: i32,
    reserve_a: i64,
    reserve_b: i64,
}

impl LiquidityPool {
    pub fn new(asset_a: Asset, reserve_a: i64, asset_b: Asset, reserve_b: i64, fee_bips: i32) -> Result<Self, OrderBookError> {
        if asset_a == asset_b {
            return Err(OrderBookError::InvalidLiquidityPool(format!("both reserves hold {asset_a}")));
        }
        if reserve_a < 0 || reserve_b < 0 {
            return Err(OrderBookError::InvalidLiquidityPool(format!("negative reserves {reserve_a}/{reserve_b}")));
        }
        if !(0..MAX_BASIS_POINTS).contains(&fee_bips) {
            return Err(OrderBookError::InvalidLiquidityPool(format!("fee of {fee_bips} bips")));
        }

        let pool = if asset_a < asset_b {
            LiquidityPool { asset_a, asset_b, fee_bips, reserve_a, reserve_b }
        } else {
            LiquidityPool { asset_a: asset_b, asset_b: asset_a, fee_bips, reserve_a: reserve_b, reserve_b: reserve_a }
        };
        Ok(pool)
    }

    pub fn asset_a(&self) -> &Asset {
        &self.asset_a
    }

    pub fn asset_b(&self) -> &Asset {
        &self.asset_b
    }

    pub fn fee_bips(&self) -> i32 {
        self.fee_bips
    }

    pub fn reserve_a(&self) -> i64 {
        self.reserve_a
    }

    pub fn reserve_b(&self) -> i64 {
        self.reserve_b
    }

    pub fn contains(&self, asset: &Asset) -> bool {
        self.asset_a == *asset || self.asset_b == *asset
    }

    /// The reserve asset which is not `asset`, None if `asset` is not in the pool.
    pub fn other_asset(&self, asset: &Asset) -> Option<&Asset> {
        if self.asset_a == *asset {
            Some(&self.asset_b)
        } else if self.asset_b == *asset {
            Some(&self.asset_a)
        } else {
            None
        }
    }

    /// Reserve of `asset` and of the other asset.
    pub fn reserves_for(&self, asset: &Asset) -> Option<(i64, i64)> {
        if self.asset_a == *asset {
            Some((self.reserve_a, self.reserve_b))
        } else if self.asset_b == *asset {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    /// Exchange against the pool with `asset` on the deposit side.
    ///
    /// A [`TradeType::Deposit`] of `amount` returns the payout of the other asset. A
    /// [`TradeType::Expectation`] of `amount` of the other asset returns how much of `asset` has
    /// to be deposited for it.
    pub fn make_trade(&self, asset: &Asset, trade_type: TradeType, amount: i64) -> Result<i64, OrderBookError> {
        if amount <= 0 {
            return Err(OrderBookError::NonPositiveAmount(amount));
        }
        let (deposit_reserve, disburse_reserve) =
            self.reserves_for(asset).ok_or_else(|| OrderBookError::AssetNotInPool(asset.to_string()))?;

        let result = match trade_type {
            TradeType::Deposit => calculate_pool_payout(deposit_reserve, disburse_reserve, amount, self.fee_bips),
            TradeType::Expectation => calculate_pool_expectation(deposit_reserve, disburse_reserve, amount, self.fee_bips),
        };
        result.ok_or(OrderBookError::PoolOverflow)
    }
}

impl Display for LiquidityPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pool({} {} / {} {}, {} bips)", self.reserve_a, self.asset_a, self.reserve_b, self.asset_b, self.fee_bips)
    }
}

fn valid_inputs(reserve_a: i64, reserve_b: i64, amount: i64, fee_bips: i32) -> bool {
    (0..MAX_BASIS_POINTS).contains(&fee_bips) && reserve_a >= 0 && reserve_b >= 0 && amount >= 0
}

fn to_i64(value: U256) -> Option<i64> {
    if value > U256::from(i64::MAX as u64) {
        return None;
    }
    Some(value.to::<u64>() as i64)
}

/// Payout of `reserve_b` for depositing `received` into `reserve_a`:
///
/// `y = floor[(1 - F) Yx / (X + x - Fx)]`
///
/// None if the deposit overflows the reserve, the payout does not fit in an i64 or is zero.
pub fn calculate_pool_payout(reserve_a: i64, reserve_b: i64, received: i64, fee_bips: i32) -> Option<i64> {
    if !valid_inputs(reserve_a, reserve_b, received, fee_bips) || received > i64::MAX - reserve_a {
        return None;
    }

    let max_bips = U256::from(MAX_BASIS_POINTS as u64);
    let f = U256::from((MAX_BASIS_POINTS - fee_bips) as u64);
    let (x_reserve, y_reserve, x) = (U256::from(reserve_a as u64), U256::from(reserve_b as u64), U256::from(received as u64));

    let denominator = x_reserve * max_bips + x * f;
    if denominator.is_zero() {
        return None;
    }
    let numerator = y_reserve * x * f;

    to_i64(numerator / denominator).filter(|payout| *payout > 0)
}

/// Deposit into `reserve_a` needed for `disbursed` of `reserve_b`:
///
/// `x = ceil[Xy / ((Y - y)(1 - F))]`
///
/// None if the pool cannot disburse that much or the deposit would overflow `reserve_a`.
pub fn calculate_pool_expectation(reserve_a: i64, reserve_b: i64, disbursed: i64, fee_bips: i32) -> Option<i64> {
    if !valid_inputs(reserve_a, reserve_b, disbursed, fee_bips) || disbursed >= reserve_b {
        return None;
    }

    let max_bips = U256::from(MAX_BASIS_POINTS as u64);
    let f = U256::from((MAX_BASIS_POINTS - fee_bips) as u64);
    let (x_reserve, y_reserve, y) = (U256::from(reserve_a as u64), U256::from(reserve_b as u64), U256::from(disbursed as u64));

    let denominator = (y_reserve - y) * f;
    if denominator.is_zero() {
        return None;
    }
    let numerator = x_reserve * y * max_bips;
    let (quotient, remainder) = numerator.div_rem(denominator);
    let deposit = if remainder.is_zero() { quotient } else { quotient + U256::from(1u64) };

    to_i64(deposit).filter(|deposit| *deposit >= 0 && *deposit <= i64::MAX - reserve_a)
}
