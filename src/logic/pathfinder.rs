use super::consume::{LIQUIDITY_EXHAUSTED, consume_offers_for_buying_asset, consume_offers_for_selling_asset};
use super::errors::OrderBookError;
use super::graph::{EdgeSet, FastHashMap, FastHashSet, OrderBookGraph};
use super::offer::Offer;
use super::path::{Path, SortBy, sort_and_filter_paths};
use super::pool::{LiquidityPool, TradeType};
use crate::utils::{AccountId, Asset};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Decides which nodes of a depth first search end a path and how a path is recorded.
trait SearchState {
    fn is_terminal_node(&self, current_asset: &str, current_asset_amount: i64) -> bool;

    fn append_to_paths(&mut self, visited: &[Asset], current_asset_amount: i64);

    /// Amount of the next asset reached by trading `current_asset_amount` over `offers`.
    fn consume_offers(&self, current_asset_amount: i64, offers: &[Offer]) -> Result<i64, OrderBookError>;

    /// The asset on the far side of `offer`.
    fn next_asset<'o>(&self, offer: &'o Offer) -> &'o Asset;

    /// Amount of `next_asset` reached by trading `current_asset_amount` of `current_asset` with
    /// `pool`.
    fn consume_pool(
        &self,
        pool: &LiquidityPool,
        current_asset: &Asset,
        next_asset: &Asset,
        current_asset_amount: i64,
    ) -> Result<i64, OrderBookError>;

    /// True if the pool's amount beats the offers'. A failed pool exchange counts as 0.
    fn pool_is_better(&self, pool_amount: i64, offers_amount: i64) -> bool;
}

/// Searches backwards from the destination over the selling index. Paths end at one of the
/// source assets.
struct SellingGraphSearchState<'a> {
    destination_asset: &'a Asset,
    destination_asset_amount: i64,
    ignore_offers_from: Option<&'a AccountId>,
    target_assets: FastHashMap<String, i64>,
    validate_source_balance: bool,
    paths: Vec<Path>,
}

impl SearchState for SellingGraphSearchState<'_> {
    fn is_terminal_node(&self, current_asset: &str, current_asset_amount: i64) -> bool {
        self.target_assets
            .get(current_asset)
            .is_some_and(|balance| !self.validate_source_balance || *balance >= current_asset_amount)
    }

    fn append_to_paths(&mut self, visited: &[Asset], current_asset_amount: i64) {
        let Some(source_asset) = visited.last() else {
            return;
        };
        // visited runs from the destination to the source, interior nodes are in trade order
        let interior_nodes =
            if visited.len() > 2 { visited[1..visited.len() - 1].iter().rev().cloned().collect() } else { Vec::new() };

        self.paths.push(Path::new(
            source_asset.clone(),
            current_asset_amount,
            self.destination_asset.clone(),
            self.destination_asset_amount,
            interior_nodes,
        ));
    }

    fn consume_offers(&self, current_asset_amount: i64, offers: &[Offer]) -> Result<i64, OrderBookError> {
        consume_offers_for_selling_asset(offers, self.ignore_offers_from, current_asset_amount)
    }

    fn next_asset<'o>(&self, offer: &'o Offer) -> &'o Asset {
        &offer.buying
    }

    // the next asset is what gets deposited into the pool
    fn consume_pool(
        &self,
        pool: &LiquidityPool,
        _current_asset: &Asset,
        next_asset: &Asset,
        current_asset_amount: i64,
    ) -> Result<i64, OrderBookError> {
        pool.make_trade(next_asset, TradeType::Expectation, current_asset_amount)
    }

    // the cheaper source amount wins
    fn pool_is_better(&self, pool_amount: i64, offers_amount: i64) -> bool {
        pool_amount > 0 && (offers_amount <= 0 || pool_amount < offers_amount)
    }
}

/// Searches forward from the source over the buying index. Paths end at one of the destination
/// assets.
struct BuyingGraphSearchState<'a> {
    source_asset: &'a Asset,
    source_asset_amount: i64,
    target_assets: FastHashSet<String>,
    paths: Vec<Path>,
}

impl SearchState for BuyingGraphSearchState<'_> {
    fn is_terminal_node(&self, current_asset: &str, _current_asset_amount: i64) -> bool {
        self.target_assets.contains(current_asset)
    }

    fn append_to_paths(&mut self, visited: &[Asset], current_asset_amount: i64) {
        let Some(destination_asset) = visited.last() else {
            return;
        };
        let interior_nodes = if visited.len() > 2 { visited[1..visited.len() - 1].to_vec() } else { Vec::new() };

        self.paths.push(Path::new(
            self.source_asset.clone(),
            self.source_asset_amount,
            destination_asset.clone(),
            current_asset_amount,
            interior_nodes,
        ));
    }

    fn consume_offers(&self, current_asset_amount: i64, offers: &[Offer]) -> Result<i64, OrderBookError> {
        consume_offers_for_buying_asset(offers, current_asset_amount)
    }

    fn next_asset<'o>(&self, offer: &'o Offer) -> &'o Asset {
        &offer.selling
    }

    fn consume_pool(
        &self,
        pool: &LiquidityPool,
        current_asset: &Asset,
        _next_asset: &Asset,
        current_asset_amount: i64,
    ) -> Result<i64, OrderBookError> {
        pool.make_trade(current_asset, TradeType::Deposit, current_asset_amount)
    }

    fn pool_is_better(&self, pool_amount: i64, offers_amount: i64) -> bool {
        pool_amount > offers_amount
    }
}

/// Offers and pool connecting the current asset to one neighbour.
#[derive(Default)]
struct Venues<'a> {
    offers: &'a [Offer],
    pool: Option<&'a LiquidityPool>,
}

type PoolIndex = FastHashMap<String, BTreeMap<String, LiquidityPool>>;

/// Bounded depth first search over one of the graph indexes, and the pools when given.
struct Search<'a, S> {
    edges: &'a BTreeMap<String, EdgeSet>,
    pools: Option<&'a PoolIndex>,
    max_path_length: usize,
    visited: Vec<Asset>,
    state: S,
}

impl<'a, S: SearchState> Search<'a, S> {
    fn new(edges: &'a BTreeMap<String, EdgeSet>, pools: Option<&'a PoolIndex>, max_path_length: usize, state: S) -> Self {
        Search { edges, pools, max_path_length, visited: Vec::new(), state }
    }

    fn dfs(
        &mut self,
        remaining_terminal_nodes: usize,
        current_asset_string: &str,
        current_asset: &Asset,
        current_asset_amount: i64,
    ) -> Result<(), OrderBookError> {
        if current_asset_amount <= 0 || self.visited.contains(current_asset) {
            return Ok(());
        }

        self.visited.push(current_asset.clone());
        let result = self.visit(remaining_terminal_nodes, current_asset_string, current_asset, current_asset_amount);
        self.visited.pop();
        result
    }

    fn visit(
        &mut self,
        remaining_terminal_nodes: usize,
        current_asset_string: &str,
        current_asset: &Asset,
        current_asset_amount: i64,
    ) -> Result<(), OrderBookError> {
        trace!(asset = current_asset_string, amount = current_asset_amount, depth = self.visited.len(), "Visiting asset");

        let mut remaining_terminal_nodes = remaining_terminal_nodes;
        if self.state.is_terminal_node(current_asset_string, current_asset_amount) {
            trace!(asset = current_asset_string, amount = current_asset_amount, "Terminal node");
            self.state.append_to_paths(&self.visited, current_asset_amount);
            remaining_terminal_nodes = remaining_terminal_nodes.saturating_sub(1);
        }

        // every target reached, or max_path_length trades already made
        if remaining_terminal_nodes == 0 || self.visited.len() > self.max_path_length {
            return Ok(());
        }

        let (edges, pools) = (self.edges, self.pools);
        let mut neighbours: BTreeMap<&'a str, Venues<'a>> = BTreeMap::new();
        if let Some(edge_set) = edges.get(current_asset_string) {
            for (next_asset_string, offers) in edge_set {
                neighbours.entry(next_asset_string.as_str()).or_default().offers = offers.as_slice();
            }
        }
        if let Some(pools) = pools.and_then(|index| index.get(current_asset_string)) {
            for (next_asset_string, pool) in pools {
                neighbours.entry(next_asset_string.as_str()).or_default().pool = Some(pool);
            }
        }

        for (next_asset_string, venues) in neighbours {
            let next_asset = match (venues.offers.first(), venues.pool) {
                (Some(offer), _) => self.state.next_asset(offer),
                (None, Some(pool)) => match pool.other_asset(current_asset) {
                    Some(asset) => asset,
                    None => continue,
                },
                (None, None) => continue,
            };
            if self.visited.contains(next_asset) {
                continue;
            }

            let next_asset_amount = self.exchange(&venues, current_asset, next_asset, current_asset_amount)?;
            if next_asset_amount <= 0 {
                trace!(from = current_asset_string, to = next_asset_string, "Not enough liquidity");
                continue;
            }

            self.dfs(remaining_terminal_nodes, next_asset_string, next_asset, next_asset_amount)?;
        }

        Ok(())
    }

    /// Best amount of `next_asset` over the offers and the pool. An offer error only surfaces
    /// when the pool cannot make the exchange either.
    fn exchange(
        &self,
        venues: &Venues<'_>,
        current_asset: &Asset,
        next_asset: &Asset,
        current_asset_amount: i64,
    ) -> Result<i64, OrderBookError> {
        let pool_amount = venues
            .pool
            .and_then(|pool| self.state.consume_pool(pool, current_asset, next_asset, current_asset_amount).ok())
            .unwrap_or(0);

        if venues.offers.is_empty() {
            return Ok(if pool_amount > 0 { pool_amount } else { LIQUIDITY_EXHAUSTED });
        }

        match self.state.consume_offers(current_asset_amount, venues.offers) {
            Ok(offers_amount) if self.state.pool_is_better(pool_amount, offers_amount) => {
                trace!(from = %current_asset, to = %next_asset, pool_amount, offers_amount, "Pool beats offers");
                Ok(pool_amount)
            }
            Ok(offers_amount) => Ok(offers_amount),
            Err(err) if pool_amount > 0 => {
                trace!(from = %current_asset, to = %next_asset, pool_amount, error = %err, "Offers failed, using pool");
                Ok(pool_amount)
            }
            Err(err) => Err(err),
        }
    }
}

impl OrderBookGraph {
    /// Paths which deliver exactly `destination_amount` of `destination_asset`, starting from any
    /// of `source_assets` the caller holds enough of.
    ///
    /// `max_path_length` bounds the number of trades, so a path holds at most
    /// `max_path_length + 1` assets, source and destination included. Offers owned by
    /// `ignore_offers_from` are never used, liquidity pools always are. At most
    /// `max_paths_per_source_asset` paths are returned per source asset, cheapest first.
    #[allow(clippy::too_many_arguments)]
    pub fn find_paths(
        &self,
        max_path_length: usize,
        destination_asset: &Asset,
        destination_amount: i64,
        ignore_offers_from: Option<&AccountId>,
        source_assets: &[Asset],
        source_asset_balances: &[i64],
        max_paths_per_source_asset: usize,
    ) -> Result<Vec<Path>, OrderBookError> {
        let (paths, _) = self.find_paths_with_ledger(
            max_path_length,
            destination_asset,
            destination_amount,
            ignore_offers_from,
            source_assets,
            source_asset_balances,
            true,
            true,
            max_paths_per_source_asset,
        )?;
        Ok(paths)
    }

    /// Like [`OrderBookGraph::find_paths`], with balance validation and liquidity pools
    /// optional. Also returns the ledger the graph was at during the search.
    #[allow(clippy::too_many_arguments)]
    pub fn find_paths_with_ledger(
        &self,
        max_path_length: usize,
        destination_asset: &Asset,
        destination_amount: i64,
        ignore_offers_from: Option<&AccountId>,
        source_assets: &[Asset],
        source_asset_balances: &[i64],
        validate_source_balance: bool,
        include_pools: bool,
        max_paths_per_source_asset: usize,
    ) -> Result<(Vec<Path>, u32), OrderBookError> {
        if source_assets.len() != source_asset_balances.len() {
            return Err(OrderBookError::MismatchedBalances { assets: source_assets.len(), balances: source_asset_balances.len() });
        }

        let target_assets: FastHashMap<String, i64> =
            source_assets.iter().map(|asset| asset.to_string()).zip(source_asset_balances.iter().copied()).collect();

        let state = SellingGraphSearchState {
            destination_asset,
            destination_asset_amount: destination_amount,
            ignore_offers_from,
            target_assets,
            validate_source_balance,
            paths: Vec::new(),
        };

        let (candidates, last_ledger) = {
            let graph = self.read();
            let pools = include_pools.then_some(&graph.liquidity_pools);
            let mut search = Search::new(&graph.edges_for_selling_asset, pools, max_path_length, state);
            search.dfs(source_assets.len(), &destination_asset.to_string(), destination_asset, destination_amount)?;
            (search.state.paths, graph.last_ledger)
        };

        let found = candidates.len();
        let paths = sort_and_filter_paths(candidates, max_paths_per_source_asset, SortBy::SourceAsset);
        debug!(
            destination = %destination_asset,
            destination_amount,
            candidates = found,
            paths = paths.len(),
            last_ledger,
            "Found paths"
        );

        Ok((paths, last_ledger))
    }

    /// Paths which spend exactly `amount_to_spend` of `source_asset` and end in one of
    /// `destination_assets`, the largest received amounts first. Offers and pools are both
    /// used, `max_path_length` bounds the number of trades.
    pub fn find_fixed_paths(
        &self,
        max_path_length: usize,
        source_asset: &Asset,
        amount_to_spend: i64,
        destination_assets: &[Asset],
        max_paths_per_destination_asset: usize,
    ) -> Result<Vec<Path>, OrderBookError> {
        let (paths, _) = self.find_fixed_paths_with_ledger(
            max_path_length,
            source_asset,
            amount_to_spend,
            destination_assets,
            true,
            max_paths_per_destination_asset,
        )?;
        Ok(paths)
    }

    /// Like [`OrderBookGraph::find_fixed_paths`], with liquidity pools optional. Also returns
    /// the ledger the graph was at during the search.
    pub fn find_fixed_paths_with_ledger(
        &self,
        max_path_length: usize,
        source_asset: &Asset,
        amount_to_spend: i64,
        destination_assets: &[Asset],
        include_pools: bool,
        max_paths_per_destination_asset: usize,
    ) -> Result<(Vec<Path>, u32), OrderBookError> {
        let state = BuyingGraphSearchState {
            source_asset,
            source_asset_amount: amount_to_spend,
            target_assets: destination_assets.iter().map(|asset| asset.to_string()).collect(),
            paths: Vec::new(),
        };

        let (candidates, last_ledger) = {
            let graph = self.read();
            let pools = include_pools.then_some(&graph.liquidity_pools);
            let mut search = Search::new(&graph.edges_for_buying_asset, pools, max_path_length, state);
            search.dfs(destination_assets.len(), &source_asset.to_string(), source_asset, amount_to_spend)?;
            (search.state.paths, graph.last_ledger)
        };

        let found = candidates.len();
        let paths = sort_and_filter_paths(candidates, max_paths_per_destination_asset, SortBy::DestinationAsset);
        debug!(source = %source_asset, amount_to_spend, candidates = found, paths = paths.len(), last_ledger, "Found fixed paths");

        Ok((paths, last_ledger))
    }
}
