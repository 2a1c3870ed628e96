use crate::logic::offer::Offer;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

/// All offers sharing one side of a trading pair, bucketed by the asset on the other side.
///
/// In the selling index the key of a bucket is the buying asset of its offers, in the buying
/// index it is the selling asset. Buckets are kept sorted by price (cheapest first) and are
/// iterated in ascending key order, which makes graph traversal deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: BTreeMap<String, Vec<Offer>>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `offer` in the bucket `key`.
    ///
    /// An offer with the same id in that bucket is replaced. The offer lands after every offer
    /// with a lower or equal price.
    pub fn add(&mut self, key: &str, offer: Offer) {
        let offers = self.edges.entry(key.to_string()).or_default();
        if let Some(index) = offers.iter().position(|existing| existing.offer_id == offer.offer_id) {
            offers.remove(index);
        }

        let position = offers.partition_point(|existing| existing.price.cmp_value(&offer.price) != Ordering::Greater);
        offers.insert(position, offer);
    }

    /// Remove the offer from bucket `key`. Empty buckets are dropped.
    pub fn remove(&mut self, key: &str, offer_id: i64) -> bool {
        let Some(offers) = self.edges.get_mut(key) else {
            return false;
        };
        let Some(index) = offers.iter().position(|offer| offer.offer_id == offer_id) else {
            return false;
        };

        offers.remove(index);
        if offers.is_empty() {
            self.edges.remove(key);
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&[Offer]> {
        self.edges.get(key).map(|offers| offers.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.edges.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, Vec<Offer>> {
        self.edges.iter()
    }

    /// Number of buckets, not offers.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn offers_len(&self) -> usize {
        self.edges.values().map(|offers| offers.len()).sum()
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = (&'a String, &'a Vec<Offer>);
    type IntoIter = Iter<'a, String, Vec<Offer>>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}
