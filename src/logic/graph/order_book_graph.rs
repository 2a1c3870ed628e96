use super::batch::Batch;
use super::edge_set::EdgeSet;
use crate::logic::offer::Offer;
use crate::logic::pool::LiquidityPool;
use crate::utils::Asset;
use ahash::RandomState;
use eyre::eyre;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, error};

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;
/// FastHashSet using ahash
pub type FastHashSet<K> = HashSet<K, FastHasher>;

/// The two assets exchanged by an offer, by canonical string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub selling_asset: String,
    pub buying_asset: String,
}

impl TradingPair {
    pub fn from_offer(offer: &Offer) -> Self {
        TradingPair { selling_asset: offer.selling.to_string(), buying_asset: offer.buying.to_string() }
    }
}

/// The maps behind the graph lock.
#[derive(Debug, Default)]
pub(crate) struct GraphState {
    // selling asset -> buying asset -> offers
    pub(crate) edges_for_selling_asset: BTreeMap<String, EdgeSet>,
    // buying asset -> selling asset -> offers
    pub(crate) edges_for_buying_asset: BTreeMap<String, EdgeSet>,
    // offer id -> where the offer is stored
    pub(crate) trading_pair_for_offer: FastHashMap<i64, TradingPair>,
    // reserve asset -> other reserve asset -> pool, every pool is stored under both assets
    pub(crate) liquidity_pools: FastHashMap<String, BTreeMap<String, LiquidityPool>>,
    // the graph reflects the ledger up to this sequence
    pub(crate) last_ledger: u32,
}

impl GraphState {
    pub(crate) fn add_offer(&mut self, offer: Offer) {
        let pair = TradingPair::from_offer(&offer);

        let moved = self.trading_pair_for_offer.get(&offer.offer_id).is_some_and(|existing| *existing != pair);
        if moved {
            self.remove_offer(offer.offer_id);
        }

        self.edges_for_selling_asset.entry(pair.selling_asset.clone()).or_default().add(&pair.buying_asset, offer.clone());
        self.edges_for_buying_asset.entry(pair.buying_asset.clone()).or_default().add(&pair.selling_asset, offer.clone());
        self.trading_pair_for_offer.insert(offer.offer_id, pair);
    }

    /// Returns false if the offer is not in the graph.
    pub(crate) fn remove_offer(&mut self, offer_id: i64) -> bool {
        let Some(pair) = self.trading_pair_for_offer.remove(&offer_id) else {
            return false;
        };

        let in_selling = remove_from_index(&mut self.edges_for_selling_asset, &pair.selling_asset, &pair.buying_asset, offer_id);
        let in_buying = remove_from_index(&mut self.edges_for_buying_asset, &pair.buying_asset, &pair.selling_asset, offer_id);
        if !in_selling || !in_buying {
            error!(
                offer_id,
                selling_asset = %pair.selling_asset,
                buying_asset = %pair.buying_asset,
                in_selling,
                in_buying,
                "Trading pair index points at an offer missing from the edge sets"
            );
        }

        true
    }

    /// Insert or replace the pool trading the same two assets.
    pub(crate) fn add_liquidity_pool(&mut self, pool: LiquidityPool) {
        let asset_a = pool.asset_a().to_string();
        let asset_b = pool.asset_b().to_string();
        self.liquidity_pools.entry(asset_b.clone()).or_default().insert(asset_a.clone(), pool.clone());
        self.liquidity_pools.entry(asset_a).or_default().insert(asset_b, pool);
    }

    /// Returns false if no pool trades `asset_a` against `asset_b`.
    pub(crate) fn remove_liquidity_pool(&mut self, asset_a: &Asset, asset_b: &Asset) -> bool {
        let asset_a = asset_a.to_string();
        let asset_b = asset_b.to_string();
        let removed_a = remove_pool_from_index(&mut self.liquidity_pools, &asset_a, &asset_b);
        let removed_b = remove_pool_from_index(&mut self.liquidity_pools, &asset_b, &asset_a);
        if removed_a != removed_b {
            error!(asset_a = %asset_a, asset_b = %asset_b, removed_a, removed_b, "Liquidity pool was indexed under one asset only");
        }
        removed_a || removed_b
    }

    pub(crate) fn pools_for(&self, asset: &str) -> Option<&BTreeMap<String, LiquidityPool>> {
        self.liquidity_pools.get(asset)
    }

    pub(crate) fn clear(&mut self) {
        self.edges_for_selling_asset.clear();
        self.edges_for_buying_asset.clear();
        self.trading_pair_for_offer.clear();
        self.liquidity_pools.clear();
        self.last_ledger = 0;
    }

    /// Offers selling `selling` for `buying`, cheapest first, spanning at most
    /// `max_price_levels` distinct prices.
    pub(crate) fn find_offers(&self, selling: &str, buying: &str, max_price_levels: usize) -> Vec<Offer> {
        let Some(offers) = self.edges_for_selling_asset.get(selling).and_then(|edges| edges.get(buying)) else {
            return vec![];
        };

        let mut results: Vec<Offer> = Vec::new();
        let mut remaining_levels = max_price_levels;
        for offer in offers {
            // offers are sorted, equal prices are contiguous
            if results.last().is_none_or(|last| !last.price.same_value(&offer.price)) {
                if remaining_levels == 0 {
                    break;
                }
                remaining_levels -= 1;
            }
            results.push(offer.clone());
        }
        results
    }
}

fn remove_from_index(index: &mut BTreeMap<String, EdgeSet>, outer: &str, inner: &str, offer_id: i64) -> bool {
    let Some(set) = index.get_mut(outer) else {
        return false;
    };
    let removed = set.remove(inner, offer_id);
    if set.is_empty() {
        index.remove(outer);
    }
    removed
}

fn remove_pool_from_index(index: &mut FastHashMap<String, BTreeMap<String, LiquidityPool>>, outer: &str, inner: &str) -> bool {
    let Some(pools) = index.get_mut(outer) else {
        return false;
    };
    let removed = pools.remove(inner).is_some();
    if pools.is_empty() {
        index.remove(outer);
    }
    removed
}

/// In memory graph of all offers and liquidity pools on the ledger.
///
/// Nodes are assets, every offer is a directed edge from its selling asset to its buying asset.
/// A liquidity pool connects its two assets in both directions.
/// The graph is only mutated through a [`Batch`], which applies all of its operations under the
/// write lock. Queries hold the read lock for their whole duration and therefore always observe
/// a fully applied batch.
#[derive(Debug, Default)]
pub struct OrderBookGraph {
    state: RwLock<GraphState>,
}

impl OrderBookGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new batch of updates for this graph.
    pub fn batch(&self) -> Batch<'_> {
        Batch::new(self)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, GraphState> {
        self.state.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, GraphState> {
        self.state.write()
    }

    /// True if neither offers nor pools are in the graph.
    pub fn is_empty(&self) -> bool {
        let state = self.read();
        state.edges_for_selling_asset.is_empty() && state.liquidity_pools.is_empty()
    }

    /// The ledger the graph was last brought up to, 0 if no ledger was applied yet.
    pub fn last_ledger(&self) -> u32 {
        self.read().last_ledger
    }

    pub fn offers_len(&self) -> usize {
        self.read().trading_pair_for_offer.len()
    }

    /// All offers in the graph, grouped by selling and then buying asset.
    pub fn offers(&self) -> Vec<Offer> {
        let state = self.read();
        state.edges_for_selling_asset.values().flat_map(|edges| edges.iter().flat_map(|(_, offers)| offers.iter().cloned())).collect()
    }

    /// Every liquidity pool once, ordered by its assets.
    pub fn liquidity_pools(&self) -> Vec<LiquidityPool> {
        let state = self.read();
        let mut pools: Vec<LiquidityPool> = state
            .liquidity_pools
            .iter()
            .flat_map(|(asset, pools)| {
                pools.values().filter(move |pool| pool.asset_a().to_string() == *asset).cloned()
            })
            .collect();
        pools.sort_by(|a, b| (a.asset_a(), a.asset_b()).cmp(&(b.asset_a(), b.asset_b())));
        pools
    }

    /// The pool trading `asset` against `other`, in either order.
    pub fn liquidity_pool(&self, asset: &Asset, other: &Asset) -> Option<LiquidityPool> {
        self.read().pools_for(&asset.to_string()).and_then(|pools| pools.get(&other.to_string())).cloned()
    }

    pub fn trading_pair(&self, offer_id: i64) -> Option<TradingPair> {
        self.read().trading_pair_for_offer.get(&offer_id).cloned()
    }

    /// Remove all offers and pools and reset the ledger.
    pub fn clear(&self) {
        let mut state = self.write();
        state.clear();
        debug!("Order book graph cleared");
    }

    /// Every asset which can be bought with `selling_asset` in a single trade.
    pub fn connected_assets(&self, selling_asset: &Asset) -> Vec<Asset> {
        let state = self.read();
        let Some(edges) = state.edges_for_selling_asset.get(&selling_asset.to_string()) else {
            return vec![];
        };
        edges.iter().filter_map(|(_, offers)| offers.first().map(|offer| offer.buying.clone())).collect()
    }

    /// Offers selling `selling` for `buying`, cheapest first.
    pub fn offers_for_pair(&self, selling: &Asset, buying: &Asset) -> Vec<Offer> {
        self.read().find_offers(&selling.to_string(), &buying.to_string(), usize::MAX)
    }

    /// Both sides of the `selling`/`buying` market.
    ///
    /// Asks sell `selling` for `buying`, bids sell `buying` for `selling`. Each side is sorted
    /// cheapest first and spans at most `max_price_levels` prices. The last element is the
    /// ledger the graph was at.
    pub fn find_asks_and_bids(&self, selling: &Asset, buying: &Asset, max_price_levels: usize) -> (Vec<Offer>, Vec<Offer>, u32) {
        let selling = selling.to_string();
        let buying = buying.to_string();

        let state = self.read();
        let asks = state.find_offers(&selling, &buying, max_price_levels);
        let bids = state.find_offers(&buying, &selling, max_price_levels);

        (asks, bids, state.last_ledger)
    }

    /// Check that both edge indexes and the trading pair index describe the same offers, that
    /// every bucket is sorted by price and that every pool is indexed under both of its assets.
    pub fn check_consistency(&self) -> eyre::Result<()> {
        let state = self.read();

        let mut seen = 0usize;
        for (selling, edges) in state.edges_for_selling_asset.iter() {
            for (buying, offers) in edges.iter() {
                if offers.is_empty() {
                    return Err(eyre!("Empty bucket {selling} -> {buying}"));
                }
                if offers.windows(2).any(|pair| pair[0].price.cmp_value(&pair[1].price).is_gt()) {
                    return Err(eyre!("Bucket {selling} -> {buying} is not sorted by price"));
                }
                for offer in offers {
                    seen += 1;
                    let expected = TradingPair { selling_asset: selling.clone(), buying_asset: buying.clone() };
                    if state.trading_pair_for_offer.get(&offer.offer_id) != Some(&expected) {
                        return Err(eyre!("Offer {} is stored under {selling} -> {buying} but indexed elsewhere", offer.offer_id));
                    }
                    let in_buying = state
                        .edges_for_buying_asset
                        .get(buying)
                        .and_then(|edges| edges.get(selling))
                        .is_some_and(|offers| offers.iter().any(|other| other == offer));
                    if !in_buying {
                        return Err(eyre!("Offer {} is missing from the buying index", offer.offer_id));
                    }
                }
            }
        }

        let in_buying_index: usize = state.edges_for_buying_asset.values().map(|edges| edges.offers_len()).sum();
        if seen != state.trading_pair_for_offer.len() || seen != in_buying_index {
            return Err(eyre!(
                "Index sizes differ: selling={seen}, buying={in_buying_index}, pairs={}",
                state.trading_pair_for_offer.len()
            ));
        }

        for (asset, pools) in state.liquidity_pools.iter() {
            if pools.is_empty() {
                return Err(eyre!("Empty pool bucket for {asset}"));
            }
            for (other, pool) in pools.iter() {
                let indexed_as = [pool.asset_a().to_string(), pool.asset_b().to_string()];
                if !indexed_as.contains(asset) || !indexed_as.contains(other) {
                    return Err(eyre!("{pool} is stored under {asset} -> {other}"));
                }
                let mirrored = state.liquidity_pools.get(other).and_then(|pools| pools.get(asset));
                if mirrored != Some(pool) {
                    return Err(eyre!("{pool} is missing under {other} -> {asset}"));
                }
            }
        }

        Ok(())
    }
}
