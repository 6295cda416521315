//! Depth-limited book views and their change reports.
//!
//! A snapshot holds, per side, the best N `(price, volume)` pairs in
//! best-first order. Two snapshots are equal only if both sides have the
//! same length, the same prices in the same positions and the same volumes.
//!
//! The text rendering matches the replay output line format:
//!
//! ```text
//! 7, ABC, [(10, 7), (9, 5)], [(11, 20)]
//! ```

use std::fmt;

use serde::Serialize;

use crate::types::{Price, Symbol, Volume};

/// Aggregated volume at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LevelView {
    pub price: Price,
    pub volume: Volume,
}

impl LevelView {
    #[inline]
    pub fn new(price: Price, volume: Volume) -> Self {
        Self { price, volume }
    }
}

impl From<(Price, Volume)> for LevelView {
    fn from((price, volume): (Price, Volume)) -> Self {
        Self { price, volume }
    }
}

impl fmt::Display for LevelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.price, self.volume)
    }
}

/// Bounded view of both sides of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepthSnapshot {
    /// Best bids, highest price first
    pub bids: Vec<LevelView>,
    /// Best asks, lowest price first
    pub asks: Vec<LevelView>,
}

impl DepthSnapshot {
    /// Create an empty snapshot with room for `depth` levels per side.
    pub fn with_capacity(depth: usize) -> Self {
        Self {
            bids: Vec::with_capacity(depth),
            asks: Vec::with_capacity(depth),
        }
    }

    /// True if neither side has a level.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    #[inline]
    pub fn best_bid(&self) -> Option<LevelView> {
        self.bids.first().copied()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<LevelView> {
        self.asks.first().copied()
    }
}

impl fmt::Display for DepthSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_levels(f, &self.bids)?;
        f.write_str(", ")?;
        write_levels(f, &self.asks)
    }
}

/// A changed snapshot, tagged with the event that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotUpdate {
    pub seq_num: u32,
    pub symbol: Symbol,
    #[serde(flatten)]
    pub snapshot: DepthSnapshot,
}

impl fmt::Display for SnapshotUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.seq_num, self.symbol, self.snapshot)
    }
}

fn write_levels(f: &mut fmt::Formatter<'_>, levels: &[LevelView]) -> fmt::Result {
    f.write_str("[")?;
    for (i, level) in levels.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{level}")?;
    }
    f.write_str("]")
}

/// Structural comparison of a stored view against freshly computed levels.
#[inline]
pub(crate) fn view_matches(stored: &[LevelView], fresh: impl Iterator<Item = LevelView>) -> bool {
    let mut fresh = fresh;
    stored.iter().all(|level| fresh.next() == Some(*level)) && fresh.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views(levels: &[(Price, Volume)]) -> Vec<LevelView> {
        levels.iter().copied().map(LevelView::from).collect()
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LevelView::new(10, 7).to_string(), "(10, 7)");
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = DepthSnapshot {
            bids: views(&[(10, 7), (9, 5)]),
            asks: vec![],
        };
        assert_eq!(snapshot.to_string(), "[(10, 7), (9, 5)], []");
    }

    #[test]
    fn test_update_display() {
        let update = SnapshotUpdate {
            seq_num: 3,
            symbol: Symbol::new("ABC").unwrap(),
            snapshot: DepthSnapshot {
                bids: views(&[(10, 150)]),
                asks: views(&[(11, 20)]),
            },
        };
        assert_eq!(update.to_string(), "3, ABC, [(10, 150)], [(11, 20)]");
    }

    #[test]
    fn test_update_json() {
        let update = SnapshotUpdate {
            seq_num: 1,
            symbol: Symbol::new("XY").unwrap(),
            snapshot: DepthSnapshot {
                bids: views(&[(10, 1)]),
                asks: vec![],
            },
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(
            json,
            r#"{"seq_num":1,"symbol":"XY","bids":[{"price":10,"volume":1}],"asks":[]}"#
        );
    }

    #[test]
    fn test_view_matches() {
        let stored = views(&[(10, 7), (9, 5)]);
        assert!(view_matches(&stored, stored.iter().copied()));
        // volume change
        assert!(!view_matches(&stored, views(&[(10, 7), (9, 6)]).into_iter()));
        // level disappears
        assert!(!view_matches(&stored, views(&[(10, 7)]).into_iter()));
        // level appears
        assert!(!view_matches(
            &stored,
            views(&[(10, 7), (9, 5), (8, 1)]).into_iter()
        ));
        // reorder
        assert!(!view_matches(&stored, views(&[(9, 5), (10, 7)]).into_iter()));
        assert!(view_matches(&[], std::iter::empty()));
    }

    #[test]
    fn test_best_levels() {
        let snapshot = DepthSnapshot {
            bids: views(&[(10, 7)]),
            asks: vec![],
        };
        assert_eq!(snapshot.best_bid(), Some(LevelView::new(10, 7)));
        assert_eq!(snapshot.best_ask(), None);
        assert!(!snapshot.is_empty());
        assert!(DepthSnapshot::with_capacity(5).is_empty());
    }
}
