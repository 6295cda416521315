//! Single-symbol order book with depth-N snapshot diffing.
//!
//! Implementation:
//! - `BTreeSet` price index per side for ordered best-N retrieval
//! - ahash `HashMap` for order lookups and level volumes
//! - Change detection compares the live top-N against the last published
//!   view in place, so the no-change path does not allocate

use std::num::NonZeroUsize;

use super::book_side::{BookSide, Fill};
use super::snapshot::{view_matches, DepthSnapshot, LevelView};
use crate::error::{ReplayError, Result};
use crate::types::{Order, OrderEvent, OrderId, Price, Side, Volume};

/// Levels per side reserved up front for the published view. Deeper views
/// grow on demand, so the configured depth never drives an allocation.
const PREALLOCATED_LEVELS: usize = 64;

/// How to handle a trade whose volume exceeds the order's remaining size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverfillPolicy {
    /// Fail with `ReplayError::Overfill` and leave the book untouched (default)
    #[default]
    Reject,

    /// Fill the order completely and log a warning
    Clamp,
}

/// Configuration shared by every book of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookConfig {
    /// Number of price levels per side in published snapshots
    depth: NonZeroUsize,

    /// How to handle over-fills
    pub overfill_policy: OverfillPolicy,

    /// Whether to log warnings for tolerated anomalies
    pub log_warnings: bool,
}

impl BookConfig {
    /// Create a config publishing `depth` levels per side.
    ///
    /// # Errors
    /// `InvalidDepth` if `depth` is zero.
    pub fn new(depth: usize) -> Result<Self> {
        let depth = NonZeroUsize::new(depth).ok_or(ReplayError::InvalidDepth(depth))?;
        Ok(Self {
            depth,
            overfill_policy: OverfillPolicy::Reject,
            log_warnings: true,
        })
    }

    /// Set over-fill handling policy.
    pub fn with_overfill_policy(mut self, policy: OverfillPolicy) -> Self {
        self.overfill_policy = policy;
        self
    }

    /// Enable/disable warning logs.
    pub fn with_logging(mut self, log: bool) -> Self {
        self.log_warnings = log;
        self
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

/// Statistics for monitoring a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookStats {
    /// Events applied successfully
    pub events_processed: u64,

    /// Snapshots that differed from the previous one
    pub snapshots_published: u64,

    /// Trades clamped under `OverfillPolicy::Clamp`
    pub clamped_trades: u64,

    /// Number of live orders (both sides)
    pub active_orders: usize,

    /// Number of price levels (bid side)
    pub bid_levels: usize,

    /// Number of price levels (ask side)
    pub ask_levels: usize,
}

/// Order book for one symbol.
///
/// Owns both sides and the last published snapshot. Every event is applied
/// atomically: a failed event leaves the book as it was.
#[derive(Debug, Clone)]
pub struct OrderBook {
    config: BookConfig,
    bids: BookSide,
    asks: BookSide,
    /// Last view handed out by `check_snapshot`
    published: DepthSnapshot,
    stats: BookStats,
}

impl OrderBook {
    /// Create an empty book.
    ///
    /// # Example
    /// ```
    /// use lob_depth_replay::{BookConfig, OrderBook, Side};
    ///
    /// let mut book = OrderBook::new(BookConfig::new(1).unwrap());
    /// book.add_order(4, Side::Bid, 5, 9).unwrap();
    /// book.add_order(5, Side::Bid, 7, 10).unwrap();
    ///
    /// let snapshot = book.check_snapshot().unwrap();
    /// assert_eq!(snapshot.to_string(), "[(10, 7)], []");
    /// ```
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            bids: BookSide::new(Side::Bid),
            asks: BookSide::new(Side::Ask),
            published: DepthSnapshot::with_capacity(config.depth().min(PREALLOCATED_LEVELS)),
            stats: BookStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.config.depth()
    }

    /// Apply one event, then run the snapshot check.
    ///
    /// Returns the new snapshot if the visible depth changed.
    #[inline]
    pub fn process(&mut self, event: &OrderEvent) -> Result<Option<DepthSnapshot>> {
        self.apply(event)?;
        Ok(self.check_snapshot())
    }

    /// Apply one event without checking the snapshot.
    pub fn apply(&mut self, event: &OrderEvent) -> Result<()> {
        match *event {
            OrderEvent::Add {
                order_id,
                side,
                size,
                price,
                ..
            } => self.add_order(order_id, side, size, price),
            OrderEvent::Update {
                order_id,
                side,
                size,
                price,
                ..
            } => self.update_order(order_id, side, size, price).map(|_| ()),
            OrderEvent::Delete { order_id, side, .. } => {
                self.delete_order(order_id, side).map(|_| ())
            }
            OrderEvent::Trade {
                order_id,
                side,
                volume,
                ..
            } => self.trade_order(order_id, side, volume).map(|_| ()),
        }
    }

    /// Add a new order.
    pub fn add_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        size: Volume,
        price: Price,
    ) -> Result<()> {
        self.side_mut(side).add(order_id, size, price)?;
        self.record_event();
        Ok(())
    }

    /// Replace an order with a new size and price (delete-then-add).
    ///
    /// Returns the order as it was before the update.
    pub fn update_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        size: Volume,
        price: Price,
    ) -> Result<Order> {
        let old = self.side_mut(side).update(order_id, size, price)?;
        self.record_event();
        Ok(old)
    }

    /// Remove an order. Returns the removed order.
    pub fn delete_order(&mut self, order_id: OrderId, side: Side) -> Result<Order> {
        let order = self.side_mut(side).delete(order_id)?;
        self.record_event();
        Ok(order)
    }

    /// Execute `volume` against a resting order.
    pub fn trade_order(&mut self, order_id: OrderId, side: Side, volume: Volume) -> Result<Fill> {
        let policy = self.config.overfill_policy;
        let fill = self.side_mut(side).trade(order_id, volume, policy)?;

        if fill.clamped {
            self.stats.clamped_trades += 1;
            if self.config.log_warnings {
                log::warn!(
                    "Clamped over-fill: trade of {} against {} order {} with {} remaining",
                    volume,
                    side,
                    order_id,
                    fill.filled
                );
            }
        }

        self.record_event();
        Ok(fill)
    }

    /// Compare the live top-N view against the last published one.
    ///
    /// If either side differs, both stored sides are replaced and the new
    /// snapshot is returned. A second call with no mutation in between
    /// returns `None`.
    pub fn check_snapshot(&mut self) -> Option<DepthSnapshot> {
        let depth = self.config.depth();
        let unchanged = view_matches(&self.published.bids, self.bids.best_levels(depth))
            && view_matches(&self.published.asks, self.asks.best_levels(depth));
        if unchanged {
            return None;
        }

        self.published.bids.clear();
        self.published.bids.extend(self.bids.best_levels(depth));
        self.published.asks.clear();
        self.published.asks.extend(self.asks.best_levels(depth));
        self.stats.snapshots_published += 1;

        Some(self.published.clone())
    }

    /// Current top-N view, without touching the published state.
    pub fn depth_snapshot(&self) -> DepthSnapshot {
        let depth = self.config.depth();
        DepthSnapshot {
            bids: self.bids.best_levels(depth).collect(),
            asks: self.asks.best_levels(depth).collect(),
        }
    }

    /// The last snapshot returned by `check_snapshot`.
    #[inline]
    pub fn last_published(&self) -> &DepthSnapshot {
        &self.published
    }

    /// Up to `n` levels of one side, best first (not bounded by the depth).
    pub fn levels(&self, side: Side, n: usize) -> Vec<LevelView> {
        self.side(side).best_levels(n).collect()
    }

    #[inline]
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Aggregated volume at a price, if the level is live.
    #[inline]
    pub fn volume_at(&self, side: Side, price: Price) -> Option<Volume> {
        self.side(side).volume_at(price)
    }

    /// A live order, if present.
    #[inline]
    pub fn order(&self, side: Side, order_id: OrderId) -> Option<&Order> {
        self.side(side).order(order_id)
    }

    /// Highest bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Lowest ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Check both sides' volume/index invariants (O(n)).
    pub fn check_invariants(&self) -> Result<()> {
        self.bids.check_invariants()?;
        self.asks.check_invariants()
    }

    /// Reset the book to empty state.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.published.bids.clear();
        self.published.asks.clear();
        self.stats = BookStats::default();
    }

    /// Get current statistics.
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Get number of live orders on both sides.
    pub fn order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    /// Get number of price levels on bid side.
    pub fn bid_levels(&self) -> usize {
        self.bids.level_count()
    }

    /// Get number of price levels on ask side.
    pub fn ask_levels(&self) -> usize {
        self.asks.level_count()
    }

    #[inline]
    fn record_event(&mut self) {
        self.stats.events_processed += 1;
        self.stats.active_orders = self.order_count();
        self.stats.bid_levels = self.bids.level_count();
        self.stats.ask_levels = self.asks.level_count();
    }
}
