//! Sorted index of live price levels for one side of a book.
//!
//! The index only answers "which prices are live, best first"; aggregated
//! volume lives next to it in [`BookSide`](super::book_side::BookSide).
//!
//! # Invariant
//!
//! A price is present if and only if its aggregated volume is nonzero.
//! The index itself cannot check this; its owner removes a price the moment
//! the level's volume reaches zero.
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `insert` | O(log n) |
//! | `remove` | O(log n) |
//! | `best(k)` | O(log n + k) |
//! | `best_price` | O(log n) |

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::iter::{Rev, Take};

use crate::types::{Price, Side};

/// Live prices of one side, ordered for best-first retrieval.
#[derive(Debug, Clone)]
pub struct PriceLevelIndex {
    side: Side,
    prices: BTreeSet<Price>,
}

impl PriceLevelIndex {
    /// Create an empty index for `side`.
    #[inline]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            prices: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Insert a price. Returns `false` if it was already present.
    #[inline]
    pub fn insert(&mut self, price: Price) -> bool {
        self.prices.insert(price)
    }

    /// Remove a price. Returns `false` if it was absent.
    #[inline]
    pub fn remove(&mut self, price: Price) -> bool {
        self.prices.remove(&price)
    }

    #[inline]
    pub fn contains(&self, price: Price) -> bool {
        self.prices.contains(&price)
    }

    /// Number of live price levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Up to `n` prices, best first: descending for bids, ascending for asks.
    #[inline]
    pub fn best(&self, n: usize) -> BestPrices<'_> {
        match self.side {
            Side::Bid => BestPrices::Descending(self.prices.iter().rev().take(n)),
            Side::Ask => BestPrices::Ascending(self.prices.iter().take(n)),
        }
    }

    /// Top-of-book price for this side.
    #[inline]
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Bid => self.prices.last().copied(),
            Side::Ask => self.prices.first().copied(),
        }
    }

    /// Drop every price.
    #[inline]
    pub fn clear(&mut self) {
        self.prices.clear();
    }
}

/// Iterator returned by [`PriceLevelIndex::best`].
#[derive(Debug, Clone)]
pub enum BestPrices<'a> {
    Ascending(Take<btree_set::Iter<'a, Price>>),
    Descending(Take<Rev<btree_set::Iter<'a, Price>>>),
}

impl Iterator for BestPrices<'_> {
    type Item = Price;

    #[inline]
    fn next(&mut self) -> Option<Price> {
        match self {
            BestPrices::Ascending(iter) => iter.next().copied(),
            BestPrices::Descending(iter) => iter.next().copied(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            BestPrices::Ascending(iter) => iter.size_hint(),
            BestPrices::Descending(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for BestPrices<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(side: Side, prices: &[Price]) -> PriceLevelIndex {
        let mut index = PriceLevelIndex::new(side);
        for &price in prices {
            index.insert(price);
        }
        index
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = PriceLevelIndex::new(Side::Bid);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.best_price(), None);
        assert_eq!(index.best(5).count(), 0);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut index = PriceLevelIndex::new(Side::Ask);
        assert!(index.insert(10));
        assert!(!index.insert(10));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut index = index_with(Side::Ask, &[10, 11]);
        assert!(!index.remove(99));
        assert_eq!(index.len(), 2);
        assert!(index.remove(10));
        assert!(!index.contains(10));
    }

    #[test]
    fn test_bid_best_is_descending() {
        let index = index_with(Side::Bid, &[9, 12, 10, 11]);
        assert_eq!(index.best(3).collect::<Vec<_>>(), vec![12, 11, 10]);
        assert_eq!(index.best_price(), Some(12));
    }

    #[test]
    fn test_ask_best_is_ascending() {
        let index = index_with(Side::Ask, &[9, 12, 10, 11]);
        assert_eq!(index.best(3).collect::<Vec<_>>(), vec![9, 10, 11]);
        assert_eq!(index.best_price(), Some(9));
    }

    #[test]
    fn test_best_never_exceeds_available() {
        let index = index_with(Side::Bid, &[5, 6]);
        let best = index.best(10);
        assert_eq!(best.len(), 2);
        assert_eq!(best.collect::<Vec<_>>(), vec![6, 5]);
        assert_eq!(index.best(0).count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut index = index_with(Side::Ask, &[1, 2, 3]);
        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn test_stress_operations() {
        let mut index = PriceLevelIndex::new(Side::Bid);
        for price in 0..1000 {
            index.insert(price);
        }
        for price in (0..1000).step_by(2) {
            index.remove(price);
        }
        assert_eq!(index.len(), 500);
        assert_eq!(index.best(3).collect::<Vec<_>>(), vec![999, 997, 995]);
    }
}
