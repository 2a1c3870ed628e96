use super::errors::OrderBookError;
use super::graph::OrderBookGraph;
use super::path::Path;
use crate::config::PathFinderConfigSection;
use crate::utils::{AccountId, Asset};
use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

/// Strict receive query: which paths deliver `destination_amount` of `destination_asset`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub destination_asset: Asset,
    pub destination_amount: i64,
    /// Offers of this account are not used.
    pub source_account: Option<AccountId>,
    pub source_assets: Vec<Asset>,
    pub source_asset_balances: Vec<i64>,
    /// Overrides the configured default when set.
    pub validate_source_balance: Option<bool>,
}

/// Strict send query: where can `amount_to_spend` of `source_asset` go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedQuery {
    pub source_asset: Asset,
    pub amount_to_spend: i64,
    pub destination_assets: Vec<Asset>,
}

/// Paths together with the ledger they were computed at.
pub type FoundPaths = (Vec<Path>, u32);

pub trait Finder: Send + Sync {
    fn find(&self, query: &Query) -> Result<FoundPaths, OrderBookError>;

    fn find_fixed_paths(&self, query: &FixedQuery) -> Result<FoundPaths, OrderBookError>;
}

/// Answers queries from a shared in memory [`OrderBookGraph`].
#[derive(Clone, Debug)]
pub struct InMemoryFinder {
    graph: Arc<OrderBookGraph>,
    config: PathFinderConfigSection,
}

impl InMemoryFinder {
    pub fn new(graph: Arc<OrderBookGraph>, config: PathFinderConfigSection) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &Arc<OrderBookGraph> {
        &self.graph
    }

    pub fn config(&self) -> &PathFinderConfigSection {
        &self.config
    }

    fn check_assets_len(&self, assets: &[Asset]) -> Result<(), OrderBookError> {
        if assets.len() > self.config.max_assets_param_length {
            return Err(OrderBookError::TooManyAssets(self.config.max_assets_param_length));
        }
        Ok(())
    }
}

fn check_positive(amount: i64) -> Result<(), OrderBookError> {
    if amount <= 0 {
        return Err(OrderBookError::NonPositiveAmount(amount));
    }
    Ok(())
}

impl Finder for InMemoryFinder {
    fn find(&self, query: &Query) -> Result<FoundPaths, OrderBookError> {
        self.check_assets_len(&query.source_assets)?;
        if query.source_assets.len() != query.source_asset_balances.len() {
            return Err(OrderBookError::MismatchedBalances {
                assets: query.source_assets.len(),
                balances: query.source_asset_balances.len(),
            });
        }
        check_positive(query.destination_amount)?;

        self.graph.find_paths_with_ledger(
            self.config.max_path_length,
            &query.destination_asset,
            query.destination_amount,
            query.source_account.as_ref(),
            &query.source_assets,
            &query.source_asset_balances,
            query.validate_source_balance.unwrap_or(self.config.validate_source_balance),
            self.config.include_pools,
            self.config.max_paths_per_asset,
        )
    }

    fn find_fixed_paths(&self, query: &FixedQuery) -> Result<FoundPaths, OrderBookError> {
        self.check_assets_len(&query.destination_assets)?;
        check_positive(query.amount_to_spend)?;

        self.graph.find_fixed_paths_with_ledger(
            self.config.max_path_length,
            &query.source_asset,
            query.amount_to_spend,
            &query.destination_assets,
            self.config.include_pools,
            self.config.max_paths_per_asset,
        )
    }
}

/// Token bucket in front of another [`Finder`]. Rejected calls never reach the graph.
pub struct RateLimitedFinder<F> {
    inner: F,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl<F: Finder> RateLimitedFinder<F> {
    /// A rate of 0 lets every call through.
    pub fn new(inner: F, max_requests_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(max_requests_per_second).map(|rate| DefaultDirectRateLimiter::direct(Quota::per_second(rate)));
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn check(&self) -> Result<(), OrderBookError> {
        match &self.limiter {
            Some(limiter) if limiter.check().is_err() => {
                warn!("Path finding request rejected by rate limiter");
                Err(OrderBookError::RateLimitExceeded)
            }
            _ => Ok(()),
        }
    }
}

impl<F: Finder> Finder for RateLimitedFinder<F> {
    fn find(&self, query: &Query) -> Result<FoundPaths, OrderBookError> {
        self.check()?;
        self.inner.find(query)
    }

    fn find_fixed_paths(&self, query: &FixedQuery) -> Result<FoundPaths, OrderBookError> {
        self.check()?;
        self.inner.find_fixed_paths(query)
    }
}

/// Build the finder stack described by `config`.
pub fn finder_from_config(graph: Arc<OrderBookGraph>, config: PathFinderConfigSection) -> RateLimitedFinder<InMemoryFinder> {
    let max_requests_per_second = config.max_requests_per_second;
    RateLimitedFinder::new(InMemoryFinder::new(graph, config), max_requests_per_second)
}
