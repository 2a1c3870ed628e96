/// Trades per path. A path holds at most one more asset than this, source and destination
/// included.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 3;

/// Upper bound for a configured path length: 6 trades, at most 5 interior assets. The search is
/// exponential in it.
pub const MAX_PATH_LENGTH_LIMIT: usize = 6;

pub const DEFAULT_MAX_PATHS_PER_ASSET: usize = 5;

/// Longest list of source or destination assets a single query may carry.
pub const DEFAULT_MAX_ASSETS_PARAM_LENGTH: usize = 15;

/// 0 disables rate limiting.
pub const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 0;

/// Liquidity pool fees are expressed in basis points of this.
pub const MAX_BASIS_POINTS: i32 = 10_000;

/// Fee of every constant product pool on the network, in basis points.
pub const LIQUIDITY_POOL_FEE_V18: i32 = 30;
