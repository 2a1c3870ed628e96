//! Shared test order book: native sold for USD and EUR at several prices, plus a USD/EUR market
//! and a EUR -> CHF -> YEN chain. Pools are kept separate.

use super::graph::OrderBookGraph;
use super::offer::Offer;
use super::pool::LiquidityPool;
use super::price::Price;
use crate::utils::constants::LIQUIDITY_POOL_FEE_V18;
use crate::utils::{AccountId, Asset};
use lazy_static::lazy_static;

fn credit(code: &str) -> Asset {
    Asset::credit(code, ISSUER.clone()).expect("valid test asset")
}

fn offer(offer_id: i64, selling: &Asset, buying: &Asset, n: i32, d: i32) -> Offer {
    Offer::new(offer_id, ISSUER.clone(), selling.clone(), buying.clone(), Price::new(n, d), 500)
}

fn pool(asset_a: &Asset, reserve_a: i64, asset_b: &Asset, reserve_b: i64) -> LiquidityPool {
    LiquidityPool::new(asset_a.clone(), reserve_a, asset_b.clone(), reserve_b, LIQUIDITY_POOL_FEE_V18).expect("valid test pool")
}

lazy_static! {
    pub static ref ISSUER: AccountId = AccountId::new("GISSUER");
    pub static ref OTHER_SELLER: AccountId = AccountId::new("GOTHERSELLER");
    pub static ref NATIVE: Asset = Asset::native();
    pub static ref USD: Asset = credit("USD");
    pub static ref EUR: Asset = credit("EUR");
    pub static ref CHF: Asset = credit("CHF");
    pub static ref YEN: Asset = credit("YEN");

    pub static ref FIFTY_CENTS_OFFER: Offer = offer(1, &NATIVE, &USD, 1, 2);
    pub static ref QUARTER_OFFER: Offer = offer(2, &NATIVE, &USD, 1, 4);
    pub static ref DOLLAR_OFFER: Offer = offer(3, &NATIVE, &USD, 1, 1);
    pub static ref EUR_OFFER: Offer = offer(4, &NATIVE, &EUR, 1, 1);
    pub static ref TWO_EUR_OFFER: Offer = offer(5, &NATIVE, &EUR, 2, 1);
    pub static ref THREE_EUR_OFFER: Offer = offer(6, &NATIVE, &EUR, 3, 1);

    pub static ref EUR_USD_OFFER: Offer = offer(9, &USD, &EUR, 1, 1);
    pub static ref OTHER_EUR_USD_OFFER: Offer = offer(10, &USD, &EUR, 2, 1);
    pub static ref USD_EUR_OFFER: Offer = offer(11, &EUR, &USD, 1, 3);
    pub static ref CHF_EUR_OFFER: Offer = offer(12, &EUR, &CHF, 1, 2);
    pub static ref YEN_CHF_OFFER: Offer = offer(13, &CHF, &YEN, 1, 2);

    pub static ref EUR_USD_POOL: LiquidityPool = pool(&EUR, 1000, &USD, 1000);
    pub static ref EUR_YEN_POOL: LiquidityPool = pool(&EUR, 1000, &YEN, 1000);
    pub static ref USD_CHF_POOL: LiquidityPool = pool(&CHF, 500, &USD, 1000);
    // 50:1 native to EUR
    pub static ref NATIVE_EUR_POOL: LiquidityPool = pool(&NATIVE, 1500, &EUR, 30);
    // 4:1 native to USD
    pub static ref NATIVE_USD_POOL: LiquidityPool = pool(&NATIVE, 120, &USD, 30);
}

pub fn native_offers() -> Vec<Offer> {
    vec![
        DOLLAR_OFFER.clone(),
        THREE_EUR_OFFER.clone(),
        EUR_OFFER.clone(),
        TWO_EUR_OFFER.clone(),
        QUARTER_OFFER.clone(),
        FIFTY_CENTS_OFFER.clone(),
    ]
}

pub fn cross_offers() -> Vec<Offer> {
    vec![
        EUR_USD_OFFER.clone(),
        OTHER_EUR_USD_OFFER.clone(),
        USD_EUR_OFFER.clone(),
        CHF_EUR_OFFER.clone(),
        YEN_CHF_OFFER.clone(),
    ]
}

/// Pools only: EUR/USD, EUR/YEN and USD/CHF, no offers.
pub fn pools_graph() -> eyre::Result<OrderBookGraph> {
    let graph = OrderBookGraph::new();
    graph
        .batch()
        .add_liquidity_pool(EUR_USD_POOL.clone())
        .add_liquidity_pool(EUR_YEN_POOL.clone())
        .add_liquidity_pool(USD_CHF_POOL.clone())
        .apply_for_ledger(1)?;
    Ok(graph)
}

/// The full fixture, applied in two ledgers (1 and 2).
pub fn populated_graph() -> eyre::Result<OrderBookGraph> {
    let graph = OrderBookGraph::new();

    let mut batch = graph.batch();
    for offer in native_offers() {
        batch.add_offer(offer);
    }
    batch.apply_for_ledger(1)?;

    let mut batch = graph.batch();
    for offer in cross_offers() {
        batch.add_offer(offer);
    }
    batch.apply_for_ledger(2)?;

    Ok(graph)
}
