//! Limit order book reconstruction module.
//!
//! Per-symbol books built from order events, with depth-N snapshot diffing.

pub mod book_side;
mod multi_symbol;
pub mod order_book;
pub mod order_store;
pub mod price_level;
pub mod snapshot;

pub use book_side::{BookSide, Fill};
pub use multi_symbol::{MultiSymbolBook, MultiSymbolStats};
pub use order_book::{BookConfig, BookStats, OrderBook, OverfillPolicy};
pub use order_store::OrderStore;
pub use price_level::{BestPrices, PriceLevelIndex};
pub use snapshot::{DepthSnapshot, LevelView, SnapshotUpdate};
