use super::price::Price;
use crate::utils::{AccountId, Asset};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A standing order on the ledger: `seller_id` sells up to `amount` units of `selling` for
/// `buying` at `price` (units of `buying` per unit of `selling`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: i64,
    pub seller_id: AccountId,
    pub selling: Asset,
    pub buying: Asset,
    pub price: Price,
    pub amount: i64,
}

impl Offer {
    pub fn new(offer_id: i64, seller_id: AccountId, selling: Asset, buying: Asset, price: Price, amount: i64) -> Self {
        Offer { offer_id, seller_id, selling, buying, price, amount }
    }

    pub fn with_amount(&self, amount: i64) -> Self {
        Offer { amount, ..self.clone() }
    }

    pub fn with_price(&self, price: Price) -> Self {
        Offer { price, ..self.clone() }
    }
}

impl Display for Offer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Offer(id={}, {} {} for {} @ {})", self.offer_id, self.amount, self.selling, self.buying, self.price)
    }
}
