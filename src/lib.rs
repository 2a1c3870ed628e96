// Order book graph and payment path search
pub mod config; // Path finder configuration
pub mod logic; // Graph, pools, batches, path search, finder service
pub mod utils; // Assets, config loading, constants

pub use config::PathFinderConfigSection;
pub use logic::{
    Batch, EdgeSet, Finder, FixedQuery, FoundPaths, InMemoryFinder, LIQUIDITY_EXHAUSTED, LiquidityPool, Offer, Operation,
    OrderBookError, OrderBookGraph, Path, PathHash, Price, PriceError, Query, RateLimitedFinder, SortBy, TradeType, TradingPair,
    calculate_pool_expectation, calculate_pool_payout, finder_from_config, sort_and_filter_paths,
};
pub use utils::{AccountId, Asset, AssetType, ConfigLoader, ConfigLoaderSync, ConfigSection, LoadConfigError};
