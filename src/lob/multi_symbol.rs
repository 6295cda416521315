//! Multi-symbol book registry.
//!
//! One [`OrderBook`] per symbol, created on first reference and kept for the
//! life of the registry. Symbols are kept in first-seen order.

use ahash::{AHashMap, RandomState};
use indexmap::IndexMap;

use super::order_book::{BookConfig, BookStats, OrderBook};
use super::snapshot::SnapshotUpdate;
use crate::error::Result;
use crate::types::{FeedMessage, Symbol};

/// Explicit symbol -> order book map.
///
/// # Example
/// ```
/// use lob_depth_replay::{BookConfig, FeedMessage, MultiSymbolBook, OrderEvent, Side, Symbol};
///
/// let mut books = MultiSymbolBook::new(BookConfig::new(5).unwrap());
/// let symbol = Symbol::new("ABC").unwrap();
///
/// let msg = FeedMessage::new(
///     1,
///     OrderEvent::add(symbol, 1, Side::Bid, 100, 10),
/// );
/// let update = books.process(&msg).unwrap().unwrap();
/// assert_eq!(update.to_string(), "1, ABC, [(10, 100)], []");
/// ```
#[derive(Debug, Clone)]
pub struct MultiSymbolBook {
    /// Applied to every book created by this registry
    config: BookConfig,

    /// Map of symbol -> book, in first-seen order
    books: IndexMap<Symbol, OrderBook, RandomState>,

    /// Statistics
    stats: MultiSymbolStats,
}

/// Statistics for multi-symbol processing.
#[derive(Debug, Clone, Default)]
pub struct MultiSymbolStats {
    /// Total symbols tracked
    pub symbol_count: usize,

    /// Total events applied across all symbols
    pub total_events: u64,

    /// Total snapshot changes reported across all symbols
    pub total_snapshots: u64,

    /// Events per symbol
    pub events_per_symbol: AHashMap<Symbol, u64>,
}

impl MultiSymbolBook {
    /// Create an empty registry; every book it creates uses `config`.
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            books: IndexMap::with_hasher(RandomState::new()),
            stats: MultiSymbolStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Book for `symbol`, inserting an empty one if absent.
    pub fn book_mut_or_insert(&mut self, symbol: Symbol) -> &mut OrderBook {
        let config = self.config;
        let stats = &mut self.stats;
        self.books.entry(symbol).or_insert_with(|| {
            log::debug!("Tracking new symbol {symbol}");
            stats.symbol_count += 1;
            OrderBook::new(config)
        })
    }

    /// Route one message to its book, apply it and check the snapshot.
    ///
    /// Errors are tagged with the message's sequence number and symbol.
    pub fn process(&mut self, msg: &FeedMessage) -> Result<Option<SnapshotUpdate>> {
        let seq_num = msg.seq_num();
        let symbol = msg.event.symbol();

        let book = self.book_mut_or_insert(symbol);
        let snapshot = book
            .process(&msg.event)
            .map_err(|e| e.at_event(seq_num, symbol))?;

        self.stats.total_events += 1;
        *self.stats.events_per_symbol.entry(symbol).or_insert(0) += 1;

        Ok(snapshot.map(|snapshot| {
            self.stats.total_snapshots += 1;
            SnapshotUpdate {
                seq_num,
                symbol,
                snapshot,
            }
        }))
    }

    /// Get the book for a symbol, if it has been seen.
    pub fn get(&self, symbol: &Symbol) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    /// Get the book for a symbol mutably, if it has been seen.
    pub fn get_mut(&mut self, symbol: &Symbol) -> Option<&mut OrderBook> {
        self.books.get_mut(symbol)
    }

    /// Iterate over (symbol, book) in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &OrderBook)> {
        self.books.iter()
    }

    /// Tracked symbols in first-seen order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.books.keys().copied().collect()
    }

    /// Get number of tracked symbols.
    pub fn symbol_count(&self) -> usize {
        self.books.len()
    }

    /// Check if a symbol is being tracked.
    pub fn has_symbol(&self, symbol: &Symbol) -> bool {
        self.books.contains_key(symbol)
    }

    /// Get statistics.
    pub fn stats(&self) -> &MultiSymbolStats {
        &self.stats
    }

    /// Get statistics for a specific symbol.
    pub fn symbol_stats(&self, symbol: &Symbol) -> Option<&BookStats> {
        self.books.get(symbol).map(OrderBook::stats)
    }

    /// Reset every book; symbols stay registered.
    pub fn reset_all(&mut self) {
        for book in self.books.values_mut() {
            book.reset();
        }

        self.stats.total_events = 0;
        self.stats.total_snapshots = 0;
        for count in self.stats.events_per_symbol.values_mut() {
            *count = 0;
        }
    }
}
