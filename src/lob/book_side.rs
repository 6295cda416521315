//! One side of a symbol's book: order store, price index and level volumes.
//!
//! # Invariant
//!
//! For every price `p`: `volumes[p] == sum(remaining_size)` over the live
//! orders at `p`, and `p` is in the index iff `volumes[p] > 0`. Every
//! mutation checks its preconditions before touching any of the three
//! structures, so a failed call leaves the side unchanged.

use ahash::AHashMap;

use super::order_book::OverfillPolicy;
use super::order_store::OrderStore;
use super::price_level::PriceLevelIndex;
use super::snapshot::LevelView;
use crate::error::{ReplayError, Result};
use crate::types::{Order, OrderId, Price, Side, Volume};

/// Outcome of applying a trade to a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Volume actually removed from the book
    pub filled: Volume,
    /// Order size left after the trade (0 = fully filled and removed)
    pub remaining: Volume,
    /// True if the trade volume was clamped to the remaining size
    pub clamped: bool,
}

/// Bid or ask half of an order book.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    orders: OrderStore,
    levels: PriceLevelIndex,
    /// Aggregated volume per live price
    volumes: AHashMap<Price, Volume>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            orders: OrderStore::new(side),
            levels: PriceLevelIndex::new(side),
            volumes: AHashMap::new(),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Add a new order.
    pub fn add(&mut self, order_id: OrderId, size: Volume, price: Price) -> Result<()> {
        self.check_add(order_id, size, price)?;

        self.orders.put(Order {
            order_id,
            side: self.side,
            price,
            remaining_size: size,
        });
        *self.volumes.entry(price).or_insert(0) += size;
        self.levels.insert(price);

        Ok(())
    }

    /// Remove an order, returning it as it was just before removal.
    pub fn delete(&mut self, order_id: OrderId) -> Result<Order> {
        let order = *self.orders.get(order_id)?;
        self.release(order.price, order.remaining_size)?;
        self.orders.remove(order_id)
    }

    /// Replace an order: delete at the old price/size, add at the new one.
    ///
    /// The replacement joins the back of its level; queue priority is not kept.
    pub fn update(&mut self, order_id: OrderId, size: Volume, price: Price) -> Result<Order> {
        let old = *self.orders.get(order_id)?;
        if size == 0 {
            return Err(ReplayError::InvalidSize {
                order_id,
                side: self.side,
            });
        }
        // The volume the new level will hold once the old order is gone
        let base = match self.volume_at(price) {
            Some(volume) if price == old.price => volume - old.remaining_size,
            Some(volume) => volume,
            None => 0,
        };
        if base.checked_add(size).is_none() {
            return Err(self.overflow(price, size));
        }

        self.delete(order_id)?;
        self.add(order_id, size, price)?;
        Ok(old)
    }

    /// Execute `volume` against a resting order.
    pub fn trade(
        &mut self,
        order_id: OrderId,
        volume: Volume,
        policy: OverfillPolicy,
    ) -> Result<Fill> {
        let order = *self.orders.get(order_id)?;

        let (filled, clamped) = if volume > order.remaining_size {
            match policy {
                OverfillPolicy::Reject => {
                    return Err(ReplayError::Overfill {
                        order_id,
                        side: self.side,
                        remaining: order.remaining_size,
                        volume,
                    })
                }
                OverfillPolicy::Clamp => (order.remaining_size, true),
            }
        } else {
            (volume, false)
        };

        self.release(order.price, filled)?;

        let remaining = order.remaining_size - filled;
        if remaining == 0 {
            self.orders.remove(order_id)?;
        } else {
            self.orders.get_mut(order_id)?.remaining_size = remaining;
        }

        Ok(Fill {
            filled,
            remaining,
            clamped,
        })
    }

    /// Aggregated volume at `price`, if the level is live.
    #[inline]
    pub fn volume_at(&self, price: Price) -> Option<Volume> {
        self.volumes.get(&price).copied()
    }

    /// Up to `n` levels, best first.
    #[inline]
    pub fn best_levels(&self, n: usize) -> impl Iterator<Item = LevelView> + '_ {
        self.levels.best(n).map(move |price| LevelView {
            price,
            volume: self.volumes.get(&price).copied().unwrap_or_default(),
        })
    }

    #[inline]
    pub fn best_price(&self) -> Option<Price> {
        self.levels.best_price()
    }

    #[inline]
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(order_id).ok()
    }

    #[inline]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.orders.contains(order_id)
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of live price levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.levels.clear();
        self.volumes.clear();
    }

    /// Recompute every level from the order store and compare (O(n)).
    pub fn check_invariants(&self) -> Result<()> {
        let mut actual: AHashMap<Price, Volume> = AHashMap::new();
        for order in self.orders.iter() {
            if order.remaining_size == 0 {
                return Err(ReplayError::InconsistentState(format!(
                    "{} order {} stored with zero size",
                    self.side, order.order_id
                )));
            }
            *actual.entry(order.price).or_insert(0) += order.remaining_size;
        }

        if actual.len() != self.volumes.len()
            || actual
                .iter()
                .any(|(price, volume)| self.volumes.get(price) != Some(volume))
        {
            return Err(ReplayError::InconsistentState(format!(
                "{} level volumes diverged from order store",
                self.side
            )));
        }

        if self.levels.len() != self.volumes.len()
            || self.volumes.keys().any(|&price| !self.levels.contains(price))
        {
            return Err(ReplayError::InconsistentState(format!(
                "{} price index diverged from level volumes",
                self.side
            )));
        }

        Ok(())
    }

    fn check_add(&self, order_id: OrderId, size: Volume, price: Price) -> Result<()> {
        if self.orders.contains(order_id) {
            return Err(ReplayError::DuplicateOrder {
                order_id,
                side: self.side,
            });
        }
        if size == 0 {
            return Err(ReplayError::InvalidSize {
                order_id,
                side: self.side,
            });
        }
        let current = self.volume_at(price).unwrap_or(0);
        if current.checked_add(size).is_none() {
            return Err(self.overflow(price, size));
        }
        Ok(())
    }

    /// Take `quantity` out of a level, dropping the level when it empties.
    fn release(&mut self, price: Price, quantity: Volume) -> Result<()> {
        let side = self.side;
        let volume = self.volumes.get_mut(&price).ok_or_else(|| {
            ReplayError::InconsistentState(format!("{side} level {price} not found"))
        })?;

        *volume = volume.checked_sub(quantity).ok_or_else(|| {
            ReplayError::InconsistentState(format!(
                "{side} level {price} holds less than {quantity}"
            ))
        })?;

        if *volume == 0 {
            self.volumes.remove(&price);
            self.levels.remove(price);
        }

        Ok(())
    }

    fn overflow(&self, price: Price, size: Volume) -> ReplayError {
        ReplayError::InconsistentState(format!(
            "{} level {price} overflows adding {size}",
            self.side
        ))
    }
}
