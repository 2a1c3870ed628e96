use super::order_book_graph::OrderBookGraph;
use crate::logic::errors::OrderBookError;
use crate::logic::offer::Offer;
use crate::logic::pool::LiquidityPool;
use crate::utils::Asset;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    AddOffer(Offer),
    RemoveOffer(i64),
    AddLiquidityPool(LiquidityPool),
    /// Remove the pool trading these two assets, in either order.
    RemoveLiquidityPool(Asset, Asset),
}

/// Staged updates for an [`OrderBookGraph`].
///
/// Operations are only recorded until [`Batch::apply`] or [`Batch::apply_for_ledger`] is called,
/// which runs all of them under the graph's write lock. A batch can be applied once.
#[derive(Debug)]
pub struct Batch<'a> {
    graph: &'a OrderBookGraph,
    operations: Vec<Operation>,
    applied: bool,
}

impl<'a> Batch<'a> {
    pub(crate) fn new(graph: &'a OrderBookGraph) -> Self {
        Batch { graph, operations: Vec::new(), applied: false }
    }

    /// Insert or update an offer.
    pub fn add_offer(&mut self, offer: Offer) -> &mut Self {
        self.operations.push(Operation::AddOffer(offer));
        self
    }

    /// Remove an offer. Unknown ids are ignored when the batch is applied.
    pub fn remove_offer(&mut self, offer_id: i64) -> &mut Self {
        self.operations.push(Operation::RemoveOffer(offer_id));
        self
    }

    /// Insert a pool or replace the reserves of the pool trading the same assets.
    pub fn add_liquidity_pool(&mut self, pool: LiquidityPool) -> &mut Self {
        self.operations.push(Operation::AddLiquidityPool(pool));
        self
    }

    /// Remove the pool trading `asset_a` against `asset_b`. Unknown pools are ignored.
    pub fn remove_liquidity_pool(&mut self, asset_a: Asset, asset_b: Asset) -> &mut Self {
        self.operations.push(Operation::RemoveLiquidityPool(asset_a, asset_b));
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Drop every staged operation.
    pub fn discard(&mut self) {
        self.operations.clear();
    }

    /// Apply all staged operations without touching the graph's ledger.
    pub fn apply(&mut self) -> Result<(), OrderBookError> {
        self.commit(None)
    }

    /// Apply all staged operations and move the graph to `ledger`.
    ///
    /// Fails without changing the graph if `ledger` is not newer than the graph's last ledger.
    pub fn apply_for_ledger(&mut self, ledger: u32) -> Result<(), OrderBookError> {
        self.commit(Some(ledger))
    }

    fn commit(&mut self, ledger: Option<u32>) -> Result<(), OrderBookError> {
        if self.applied {
            warn!(operations = self.operations.len(), "Batch was already applied");
            return Err(OrderBookError::BatchAlreadyApplied);
        }

        let graph = self.graph;
        let mut state = graph.write();
        if let Some(ledger) = ledger {
            if ledger <= state.last_ledger {
                warn!(ledger, last_ledger = state.last_ledger, "Rejecting batch for unexpected ledger");
                return Err(OrderBookError::UnexpectedLedger { ledger, last_ledger: state.last_ledger });
            }
        }

        self.applied = true;

        let mut added = 0usize;
        let mut removed = 0usize;
        let mut pools_added = 0usize;
        let mut pools_removed = 0usize;
        for operation in self.operations.drain(..) {
            match operation {
                Operation::AddOffer(offer) => {
                    state.add_offer(offer);
                    added += 1;
                }
                Operation::RemoveOffer(offer_id) => {
                    if state.remove_offer(offer_id) {
                        removed += 1;
                    }
                }
                Operation::AddLiquidityPool(pool) => {
                    state.add_liquidity_pool(pool);
                    pools_added += 1;
                }
                Operation::RemoveLiquidityPool(asset_a, asset_b) => {
                    if state.remove_liquidity_pool(&asset_a, &asset_b) {
                        pools_removed += 1;
                    }
                }
            }
        }

        if let Some(ledger) = ledger {
            state.last_ledger = ledger;
        }

        debug!(
            added,
            removed,
            pools_added,
            pools_removed,
            last_ledger = state.last_ledger,
            offers = state.trading_pair_for_offer.len(),
            "Batch applied"
        );
        Ok(())
    }
}
