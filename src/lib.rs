//! # lob-depth-replay
//!
//! Limit order book reconstruction from a binary order event feed, with
//! depth-N snapshot change detection.
//!
//! The feed carries four kinds of events (add, update, delete, trade), each
//! tagged with a 3-character symbol. Every symbol gets its own book. After
//! each event the top N aggregated price levels of the touched book are
//! compared with the last reported ones, and only changes are emitted.
//!
//! ## Features
//!
//! - **Per-order tracking**: every live order is kept with its side, price and
//!   remaining size, so deletes and partial trades adjust the right level
//! - **Ordered price levels**: `BTreeSet` per side, best N in O(N)
//! - **Allocation-free diffing**: unchanged snapshots are detected in place
//! - **Strict sequencing**: unknown ids, duplicate ids and over-fills are
//!   reported with the offending sequence number
//!
//! ## Quick Start
//!
//! ### Single Book
//!
//! ```rust
//! use lob_depth_replay::{BookConfig, OrderBook, OrderEvent, Side, Symbol};
//!
//! let mut book = OrderBook::new(BookConfig::new(5).unwrap());
//! let symbol = Symbol::new("ABC").unwrap();
//!
//! let event = OrderEvent::add(symbol, 1, Side::Ask, 20, 11);
//! let snapshot = book.process(&event).unwrap().expect("top of book changed");
//!
//! assert_eq!(snapshot.to_string(), "[], [(11, 20)]");
//! assert_eq!(book.best_ask(), Some(11));
//! ```
//!
//! ### Replay a Feed File
//!
//! ```ignore
//! use lob_depth_replay::{BookConfig, FileSource, Replayer, TextSink};
//!
//! let source = FileSource::new("feed.bin")?;
//! let mut sink = TextSink::new(std::io::stdout().lock());
//!
//! let stats = Replayer::new(BookConfig::new(5)?).run(source, &mut sink)?;
//! eprintln!("{} events, {} changes", stats.events, stats.snapshots);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Wire-level types: `Symbol`, `Side`, `OrderEvent`, `FeedMessage`, `Order` |
//! | [`decoder`] | Binary framing: `FeedLoader`, `FeedDecoder`, `encode_message` |
//! | [`lob`] | Books: `OrderBook`, `MultiSymbolBook`, `BookSide`, `DepthSnapshot` |
//! | [`source`] | Event sources: `EventSource`, `FileSource`, `VecSource` |
//! | [`sink`] | Snapshot sinks: `SnapshotSink`, `TextSink`, `JsonLinesSink` |
//! | [`replay`] | Dispatcher: `Replayer`, `ReplayStats` |
//! | [`error`] | `ReplayError` and `Result` |

pub mod decoder;
pub mod error;
pub mod lob;
pub mod replay;
pub mod sink;
pub mod source;
pub mod types;

// Re-exports - Core types
pub use error::{ReplayError, Result};
pub use types::{
    FeedMessage, Header, MessageType, Order, OrderEvent, OrderId, Price, Side, Symbol, Volume,
};

// Re-exports - Books
pub use lob::{
    BookConfig, BookSide, BookStats, DepthSnapshot, Fill, LevelView, MultiSymbolBook,
    MultiSymbolStats, OrderBook, OverfillPolicy, SnapshotUpdate,
};

// Re-exports - Decoding
pub use decoder::{
    decode_body, encode_feed, encode_message, FeedDecoder, FeedLoader, LoaderStats,
    IO_BUFFER_SIZE, MAX_MESSAGE_SIZE,
};

// Re-exports - Replay pipeline
pub use replay::{ReplayStats, Replayer};
pub use sink::{JsonLinesSink, SnapshotSink, TextSink};
pub use source::{EventSource, FileSource, SourceMetadata, VecSource};
