//! Live orders of one book side, keyed by order id.

use ahash::AHashMap;

use crate::error::{ReplayError, Result};
use crate::types::{Order, OrderId, Side};

/// Order id -> live order, for a single side.
///
/// Single writer: the owning [`BookSide`](super::book_side::BookSide).
#[derive(Debug, Clone)]
pub struct OrderStore {
    side: Side,
    orders: AHashMap<OrderId, Order>,
}

impl OrderStore {
    #[inline]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            orders: AHashMap::new(),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Insert or overwrite the entry for `order.order_id`.
    #[inline]
    pub fn put(&mut self, order: Order) -> Option<Order> {
        self.orders.insert(order.order_id, order)
    }

    /// Look up a live order.
    #[inline]
    pub fn get(&self, order_id: OrderId) -> Result<&Order> {
        self.orders.get(&order_id).ok_or_else(|| self.unknown(order_id))
    }

    #[inline]
    pub fn get_mut(&mut self, order_id: OrderId) -> Result<&mut Order> {
        let side = self.side;
        self.orders
            .get_mut(&order_id)
            .ok_or(ReplayError::UnknownOrder { order_id, side })
    }

    /// Remove a live order. Removing an unknown id is an error.
    #[inline]
    pub fn remove(&mut self, order_id: OrderId) -> Result<Order> {
        self.orders
            .remove(&order_id)
            .ok_or_else(|| self.unknown(order_id))
    }

    #[inline]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterate over live orders in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    #[inline]
    fn unknown(&self, order_id: OrderId) -> ReplayError {
        ReplayError::UnknownOrder {
            order_id,
            side: self.side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(order_id: OrderId, price: u32, size: u64) -> Order {
        Order {
            order_id,
            side: Side::Bid,
            price,
            remaining_size: size,
        }
    }

    #[test]
    fn test_put_and_get() {
        let mut store = OrderStore::new(Side::Bid);
        assert_eq!(store.put(order(1, 10, 100)), None);
        assert_eq!(store.get(1).unwrap().remaining_size, 100);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let mut store = OrderStore::new(Side::Bid);
        store.put(order(1, 10, 100));
        let old = store.put(order(1, 12, 30));
        assert_eq!(old.map(|o| o.price), Some(10));
        assert_eq!(store.get(1).unwrap().price, 12);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_fails() {
        let store = OrderStore::new(Side::Ask);
        assert_eq!(
            store.get(7).unwrap_err(),
            ReplayError::UnknownOrder {
                order_id: 7,
                side: Side::Ask
            }
        );
    }

    #[test]
    fn test_remove_unknown_fails() {
        let mut store = OrderStore::new(Side::Bid);
        store.put(order(1, 10, 100));
        assert!(store.remove(2).is_err());
        assert_eq!(store.remove(1).unwrap().remaining_size, 100);
        assert!(store.is_empty());
        assert!(store.remove(1).is_err());
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut store = OrderStore::new(Side::Bid);
        store.put(order(1, 10, 100));
        store.get_mut(1).unwrap().remaining_size -= 40;
        assert_eq!(store.get(1).unwrap().remaining_size, 60);
    }
}
