//! Event dispatcher: source -> per-symbol books -> sink.
//!
//! Processing is strictly sequential, in feed order. The first error of any
//! kind stops the replay and is returned with the offending event's
//! sequence number attached.
//!
//! # Example
//!
//! ```
//! use lob_depth_replay::source::VecSource;
//! use lob_depth_replay::{
//!     BookConfig, FeedMessage, OrderEvent, Replayer, Side, SnapshotUpdate, Symbol,
//! };
//!
//! let symbol = Symbol::new("ABC").unwrap();
//! let source = VecSource::new(vec![
//!     FeedMessage::new(1, OrderEvent::add(symbol, 1, Side::Bid, 100, 10)),
//!     FeedMessage::new(2, OrderEvent::add(symbol, 2, Side::Bid, 50, 10)),
//! ]);
//!
//! let mut updates: Vec<SnapshotUpdate> = Vec::new();
//! let stats = Replayer::new(BookConfig::new(5).unwrap())
//!     .run(source, &mut updates)
//!     .unwrap();
//!
//! assert_eq!(stats.events, 2);
//! assert_eq!(updates.last().unwrap().to_string(), "2, ABC, [(10, 150)], []");
//! ```

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::lob::{BookConfig, MultiSymbolBook};
use crate::sink::SnapshotSink;
use crate::source::EventSource;

/// Summary of a finished replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayStats {
    /// Events applied
    pub events: u64,

    /// Snapshot changes reported
    pub snapshots: u64,

    /// Distinct symbols seen
    pub symbols: usize,

    /// Wall-clock time spent replaying
    pub elapsed: Duration,
}

impl ReplayStats {
    /// Events per second (0 for an instantaneous run).
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.events as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives a feed through a [`MultiSymbolBook`].
#[derive(Debug)]
pub struct Replayer {
    books: MultiSymbolBook,
}

impl Replayer {
    pub fn new(config: BookConfig) -> Self {
        Self {
            books: MultiSymbolBook::new(config),
        }
    }

    /// Books built so far.
    pub fn books(&self) -> &MultiSymbolBook {
        &self.books
    }

    /// Consume the replayer, keeping the final books.
    pub fn into_books(self) -> MultiSymbolBook {
        self.books
    }

    /// Replay every message of `source`, publishing each change to `sink`.
    pub fn run<S, K>(&mut self, source: S, sink: &mut K) -> Result<ReplayStats>
    where
        S: EventSource,
        K: SnapshotSink + ?Sized,
    {
        let description = source.metadata().describe();
        log::info!(
            "Replaying {} (depth {})",
            description,
            self.books.config().depth()
        );

        let start = Instant::now();
        let mut stats = ReplayStats::default();

        for msg in source.messages()? {
            let msg = msg.inspect_err(|e| log::error!("Aborting replay of {description}: {e}"))?;

            let update = self
                .books
                .process(&msg)
                .inspect_err(|e| log::error!("Aborting replay of {description}: {e}"))?;
            stats.events += 1;

            if let Some(update) = update {
                log::trace!("{update}");
                sink.publish(&update)?;
                stats.snapshots += 1;
            }
        }
        sink.finish()?;

        stats.symbols = self.books.symbol_count();
        stats.elapsed = start.elapsed();

        log::info!(
            "Replayed {} events across {} symbols, {} snapshot changes in {:.3}s ({:.0} events/s)",
            stats.events,
            stats.symbols,
            stats.snapshots,
            stats.elapsed.as_secs_f64(),
            stats.throughput()
        );

        Ok(stats)
    }
}
