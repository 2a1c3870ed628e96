pub mod batch;
pub mod edge_set;
pub mod order_book_graph;

pub use batch::{Batch, Operation};
pub use edge_set::EdgeSet;
pub use order_book_graph::{FastHashMap, FastHashSet, FastHasher, OrderBookGraph, TradingPair};
