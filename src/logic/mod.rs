/// Order book and path finding
///
/// - Exact fixed point price arithmetic and offer consumption
/// - Constant product liquidity pool exchanges
/// - The order book graph and its batched updates
/// - Strict receive and strict send path search
/// - Result shaping and the query facing finder service
pub mod consume;
pub mod errors;
pub mod finder;
pub mod graph;
pub mod offer;
pub mod path;
pub mod path_hash;
pub mod pathfinder;
pub mod pool;
pub mod price;

#[cfg(test)]
mod fixtures;

pub use consume::{LIQUIDITY_EXHAUSTED, consume_offers_for_buying_asset, consume_offers_for_selling_asset};
pub use errors::{OrderBookError, PriceError};
pub use finder::{Finder, FixedQuery, FoundPaths, InMemoryFinder, Query, RateLimitedFinder, finder_from_config};
pub use graph::{Batch, EdgeSet, OrderBookGraph, Operation, TradingPair};
pub use offer::Offer;
pub use path::{Path, SortBy, sort_and_filter_paths};
pub use path_hash::PathHash;
pub use pool::{LiquidityPool, TradeType, calculate_pool_expectation, calculate_pool_payout};
pub use price::Price;
