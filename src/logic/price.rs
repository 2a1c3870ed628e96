use super::errors::PriceError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

/// Exact price of an offer: `n` units of the buying asset per `d` units of the selling asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    pub fn new(n: i32, d: i32) -> Self {
        Price { n, d }
    }

    /// Compares two prices by value (`1/2 == 2/4`) using cross multiplication.
    pub fn cmp_value(&self, other: &Price) -> Ordering {
        let left = i64::from(self.n) * i64::from(other.d);
        let right = i64::from(other.n) * i64::from(self.d);
        left.cmp(&right)
    }

    pub fn same_value(&self, other: &Price) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

/// Computes `floor(x * n / d)`.
///
/// The product is formed in 128 bits so it can never wrap. A quotient which does not fit into
/// an `i64` is reported as [`PriceError::Overflow`].
pub fn mul_fraction_round_down(x: i64, n: i64, d: i64) -> Result<i64, PriceError> {
    if d == 0 {
        return Err(PriceError::DivisionByZero);
    }

    let product = (x as u64 as u128) * (n as u64 as u128);
    let quotient = product / (d as u64 as u128);
    i64::try_from(quotient).map_err(|_| PriceError::Overflow)
}

/// Computes `ceil(x * n / d)`, i.e. `floor((x * n + d - 1) / d)`.
pub fn mul_fraction_round_up(x: i64, n: i64, d: i64) -> Result<i64, PriceError> {
    if d == 0 {
        return Err(PriceError::DivisionByZero);
    }

    let denominator = d as u64 as u128;
    let product = (x as u64 as u128) * (n as u64 as u128) + (denominator - 1);
    let quotient = product / denominator;
    i64::try_from(quotient).map_err(|_| PriceError::Overflow)
}

/// Converts an amount of the selling asset of an offer into the amount of its buying asset
/// the taker has to pay, using the rounding rules of the ledger's consensus engine:
///
/// ```text
/// offerSellingBound = n > d ? amount : ceil(floor(amount * n / d) * d / n)
/// bought            = min(offerSellingBound, sellingUnitsNeeded)
/// sold              = ceil(bought * n / d)
/// ```
///
/// Returns `(buying units paid, selling units extracted from the offer)`.
pub fn convert_to_buying_units(
    selling_offer_amount: i64,
    selling_units_needed: i64,
    price_n: i64,
    price_d: i64,
) -> Result<(i64, i64), PriceError> {
    let mut selling_bound = selling_offer_amount;
    if price_n <= price_d {
        selling_bound = mul_fraction_round_down(selling_offer_amount, price_n, price_d)?;
        selling_bound = mul_fraction_round_up(selling_bound, price_d, price_n)?;
    }

    let selling_units_extracted = selling_bound.min(selling_units_needed);
    let buying_units = mul_fraction_round_up(selling_units_extracted, price_n, price_d)?;

    Ok((buying_units, selling_units_extracted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_down_and_up() {
        assert_eq!(mul_fraction_round_down(5, 1, 4), Ok(1));
        assert_eq!(mul_fraction_round_up(5, 1, 4), Ok(2));
        assert_eq!(mul_fraction_round_up(8, 1, 4), Ok(2));
        assert_eq!(mul_fraction_round_down(0, 7, 3), Ok(0));
        assert_eq!(mul_fraction_round_up(0, 7, 3), Ok(0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(mul_fraction_round_down(1, 1, 0), Err(PriceError::DivisionByZero));
        assert_eq!(mul_fraction_round_up(1, 1, 0), Err(PriceError::DivisionByZero));
    }

    #[test]
    fn test_overflow_does_not_wrap() {
        assert_eq!(mul_fraction_round_down(i64::MAX, i32::MAX as i64, 1), Err(PriceError::Overflow));
        assert_eq!(mul_fraction_round_up(i64::MAX, 2, 1), Err(PriceError::Overflow));
        // large intermediate product, small result
        assert_eq!(mul_fraction_round_down(i64::MAX, i32::MAX as i64, i32::MAX as i64), Ok(i64::MAX));
    }

    #[test]
    fn test_convert_to_buying_units() {
        // quarter offer: 500 units of selling asset at 1/4
        assert_eq!(convert_to_buying_units(500, 5, 1, 4), Ok((2, 5)));
        assert_eq!(convert_to_buying_units(500, 1000, 1, 4), Ok((125, 500)));
        // price above one, no rounding correction of the offer amount
        assert_eq!(convert_to_buying_units(500, 100, 2, 1), Ok((200, 100)));
        // rounding correction: floor(7 * 1 / 3) = 2, ceil(2 * 3 / 1) = 6
        assert_eq!(convert_to_buying_units(7, 10, 1, 3), Ok((2, 6)));
        assert_eq!(convert_to_buying_units(i64::MAX, i64::MAX, i32::MAX as i64, 1), Err(PriceError::Overflow));
    }

    #[test]
    fn test_price_ordering() {
        assert_eq!(Price::new(1, 4).cmp_value(&Price::new(1, 2)), Ordering::Less);
        assert_eq!(Price::new(3, 1).cmp_value(&Price::new(2, 1)), Ordering::Greater);
        assert!(Price::new(1, 2).same_value(&Price::new(2, 4)));
        assert_eq!(Price::new(1, 3).to_string(), "1/3");
    }
}
