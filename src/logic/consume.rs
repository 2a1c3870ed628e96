use super::errors::{OrderBookError, PriceError};
use super::offer::Offer;
use super::price::{convert_to_buying_units, mul_fraction_round_down};
use crate::utils::AccountId;
use std::cmp::Ordering;

/// Returned instead of an amount when the offers cannot cover the requested amount.
pub const LIQUIDITY_EXHAUSTED: i64 = -1;

/// Cost, in units of the offers' buying asset, of taking `current_asset_amount` units of their
/// selling asset out of `offers`.
///
/// `offers` must share one trading pair and be sorted cheapest first. Offers owned by
/// `ignore_offers_from` are skipped. Returns [`LIQUIDITY_EXHAUSTED`] when the eligible offers
/// run out or the cost overflows.
pub fn consume_offers_for_selling_asset(
    offers: &[Offer],
    ignore_offers_from: Option<&AccountId>,
    current_asset_amount: i64,
) -> Result<i64, OrderBookError> {
    if offers.is_empty() {
        return Err(OrderBookError::EmptyOffers);
    }
    if current_asset_amount <= 0 {
        return Err(OrderBookError::AssetAmountIsZero);
    }

    let mut total_consumed: i64 = 0;
    let mut remaining = current_asset_amount;
    for offer in offers {
        if ignore_offers_from.is_some_and(|seller| *seller == offer.seller_id) {
            continue;
        }
        if offer.price.d == 0 {
            return Err(OrderBookError::OfferPriceDenominatorIsZero);
        }

        let (buying_units, selling_units) =
            match convert_to_buying_units(offer.amount, remaining, i64::from(offer.price.n), i64::from(offer.price.d)) {
                Ok(units) => units,
                Err(PriceError::Overflow) => return Ok(LIQUIDITY_EXHAUSTED),
                Err(err) => return Err(err.into()),
            };

        let Some(total) = total_consumed.checked_add(buying_units) else {
            return Ok(LIQUIDITY_EXHAUSTED);
        };
        total_consumed = total;
        remaining -= selling_units;

        match remaining.cmp(&0) {
            Ordering::Equal => return Ok(total_consumed),
            Ordering::Less => return Err(OrderBookError::SoldTooMuch),
            Ordering::Greater => {}
        }
    }

    Ok(LIQUIDITY_EXHAUSTED)
}

/// Amount of the offers' selling asset received for spending `current_asset_amount` units of
/// their buying asset.
///
/// `offers` must share one trading pair and be sorted cheapest first. Returns
/// [`LIQUIDITY_EXHAUSTED`] when the offers run out, the amount is too small to buy a single
/// unit, or the result overflows.
pub fn consume_offers_for_buying_asset(offers: &[Offer], current_asset_amount: i64) -> Result<i64, OrderBookError> {
    if offers.is_empty() {
        return Err(OrderBookError::EmptyOffers);
    }
    if current_asset_amount <= 0 {
        return Err(OrderBookError::AssetAmountIsZero);
    }

    let mut total_consumed: i64 = 0;
    let mut remaining = current_asset_amount;
    for offer in offers {
        let n = i64::from(offer.price.n);
        let d = i64::from(offer.price.d);

        // spend everything on this offer if it is deep enough
        match mul_fraction_round_down(remaining, d, n) {
            Ok(0) => return Ok(LIQUIDITY_EXHAUSTED),
            Ok(sold) if sold <= offer.amount => {
                return Ok(total_consumed.checked_add(sold).unwrap_or(LIQUIDITY_EXHAUSTED));
            }
            Ok(_) | Err(PriceError::Overflow) => {}
            Err(err) => return Err(err.into()),
        }

        // otherwise take the whole offer and move on
        let (buying_units, selling_units) = match convert_to_buying_units(offer.amount, offer.amount, n, d) {
            Ok(units) => units,
            Err(PriceError::Overflow) => return Ok(LIQUIDITY_EXHAUSTED),
            Err(err) => return Err(err.into()),
        };

        let Some(total) = total_consumed.checked_add(selling_units) else {
            return Ok(LIQUIDITY_EXHAUSTED);
        };
        total_consumed = total;
        remaining -= buying_units;

        match remaining.cmp(&0) {
            Ordering::Equal => return Ok(total_consumed),
            Ordering::Less => return Err(OrderBookError::SoldTooMuch),
            Ordering::Greater => {}
        }
    }

    Ok(LIQUIDITY_EXHAUSTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::*;
    use crate::logic::price::Price;

    fn eur_offers() -> Vec<Offer> {
        vec![EUR_OFFER.clone(), TWO_EUR_OFFER.clone(), THREE_EUR_OFFER.clone()]
    }

    #[test]
    fn test_selling_rejects_bad_input() {
        assert_eq!(consume_offers_for_selling_asset(&[], None, 1), Err(OrderBookError::EmptyOffers));
        assert_eq!(consume_offers_for_selling_asset(&eur_offers(), None, 0), Err(OrderBookError::AssetAmountIsZero));

        let broken = EUR_OFFER.with_price(Price::new(1, 0));
        assert_eq!(consume_offers_for_selling_asset(&[broken], None, 1), Err(OrderBookError::OfferPriceDenominatorIsZero));
    }

    #[test]
    fn test_selling_skips_ignored_seller() -> eyre::Result<()> {
        assert_eq!(consume_offers_for_selling_asset(&eur_offers(), Some(&*ISSUER), 1)?, LIQUIDITY_EXHAUSTED);

        let mut other = TWO_EUR_OFFER.clone();
        other.seller_id = OTHER_SELLER.clone();
        let offers = vec![EUR_OFFER.clone(), other];
        assert_eq!(consume_offers_for_selling_asset(&offers, Some(&*ISSUER), 100)?, 200);
        assert_eq!(consume_offers_for_selling_asset(&offers, Some(&*OTHER_SELLER), 100)?, 100);
        Ok(())
    }

    #[test]
    fn test_selling_overflow_is_exhaustion() -> eyre::Result<()> {
        let huge = EUR_OFFER.with_price(Price::new(i32::MAX, 1)).with_amount(i64::MAX);
        assert_eq!(consume_offers_for_selling_asset(&[huge], None, i64::MAX)?, LIQUIDITY_EXHAUSTED);
        Ok(())
    }

    #[test]
    fn test_selling_walks_offers_in_price_order() -> eyre::Result<()> {
        let offers = eur_offers();

        assert_eq!(consume_offers_for_selling_asset(&offers[..2], None, 1001)?, LIQUIDITY_EXHAUSTED);
        // 500 * 1 + 500 * 2 + 500 * 3
        assert_eq!(consume_offers_for_selling_asset(&offers, None, 1500)?, 3000);
        assert_eq!(consume_offers_for_selling_asset(&offers, None, 1501)?, LIQUIDITY_EXHAUSTED);
        assert_eq!(consume_offers_for_selling_asset(&offers, None, 2)?, 2);
        Ok(())
    }

    #[test]
    fn test_selling_rounds_up_in_favor_of_seller() -> eyre::Result<()> {
        // 5 native at 1/4 USD each costs 2 USD, not 1.25
        assert_eq!(consume_offers_for_selling_asset(&[QUARTER_OFFER.clone()], None, 5)?, 2);
        // 20 EUR at 1/3 USD each costs 7 USD
        assert_eq!(consume_offers_for_selling_asset(&[USD_EUR_OFFER.clone()], None, 20)?, 7);
        Ok(())
    }

    #[test]
    fn test_buying_rejects_bad_input() {
        assert_eq!(consume_offers_for_buying_asset(&[], 1), Err(OrderBookError::EmptyOffers));
        assert_eq!(consume_offers_for_buying_asset(&eur_offers(), 0), Err(OrderBookError::AssetAmountIsZero));
    }

    #[test]
    fn test_buying_exhaustion() -> eyre::Result<()> {
        let broken = EUR_OFFER.with_price(Price::new(1, 0));
        assert_eq!(consume_offers_for_buying_asset(&[broken], 10)?, LIQUIDITY_EXHAUSTED);
        // 1 EUR does not buy a whole unit at 2 EUR per native
        assert_eq!(consume_offers_for_buying_asset(&[TWO_EUR_OFFER.clone()], 1)?, LIQUIDITY_EXHAUSTED);
        assert_eq!(consume_offers_for_buying_asset(&eur_offers(), 1502)?, LIQUIDITY_EXHAUSTED);

        let huge = EUR_OFFER.with_price(Price::new(1, i32::MAX)).with_amount(i64::MAX);
        assert_eq!(consume_offers_for_buying_asset(&[huge], i64::MAX)?, LIQUIDITY_EXHAUSTED);
        Ok(())
    }

    #[test]
    fn test_buying_walks_offers_in_price_order() -> eyre::Result<()> {
        let offers = eur_offers();

        // 500 EUR + 1000 EUR + 1500 EUR buys the whole book
        assert_eq!(consume_offers_for_buying_asset(&offers, 3000)?, 1500);
        assert_eq!(consume_offers_for_buying_asset(&offers, 2)?, 2);
        // 500 from the first offer, floor(1001 / 2) from the second
        assert_eq!(consume_offers_for_buying_asset(&offers, 1501)?, 1000);
        Ok(())
    }
}
