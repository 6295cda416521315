//! Error types for order book replay.
//!
//! Every error is fatal to a replay: the feed is assumed to be internally
//! consistent, so a framing or sequencing violation means the reconstructed
//! state can no longer be trusted.

use thiserror::Error;

use crate::types::{OrderId, Side, Symbol};

/// Result type alias for replay operations.
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Main error type for replay operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    // ---------------------------------------------------------------------
    // Framing
    // ---------------------------------------------------------------------
    /// Stream ended inside a message header.
    #[error("Truncated header: read {read} of {expected} bytes")]
    TruncatedHeader { read: usize, expected: usize },

    /// Stream ended before the announced body length.
    #[error("Incomplete message #{seq_num}: size({msg_size}) read({read})")]
    TruncatedMessage {
        seq_num: u32,
        msg_size: u32,
        read: usize,
    },

    /// Message type tag is not one of A/U/D/E.
    #[error("Unknown message type {tag:#04x} in message #{seq_num}")]
    UnknownMessageType { seq_num: u32, tag: u8 },

    /// Header announces a size that cannot even hold the type tag.
    #[error("Invalid message size {msg_size} in message #{seq_num}")]
    InvalidMessageSize { seq_num: u32, msg_size: u32 },

    /// Body is shorter than the layout of its message type.
    #[error("Body too short for '{msg_type}' message: need {expected} bytes, got {actual}")]
    BodyTooShort {
        msg_type: char,
        expected: usize,
        actual: usize,
    },

    /// Side byte is neither 'B' nor 'S'.
    #[error("Invalid side: {0:#04x}")]
    InvalidSide(u8),

    /// Symbol bytes are not printable ASCII.
    #[error("Invalid symbol bytes: {0:?}")]
    InvalidSymbol([u8; 3]),

    // ---------------------------------------------------------------------
    // Sequencing
    // ---------------------------------------------------------------------
    /// Delete/update/trade for an order that is not live.
    #[error("Unknown order: {side} order {order_id}")]
    UnknownOrder { order_id: OrderId, side: Side },

    /// Add for an order id that is already live on that side.
    #[error("Duplicate order: {side} order {order_id} already live")]
    DuplicateOrder { order_id: OrderId, side: Side },

    /// Add/update with a zero size would store an empty order.
    #[error("Invalid size 0 for {side} order {order_id}")]
    InvalidSize { order_id: OrderId, side: Side },

    /// Trade volume exceeds the order's remaining size.
    #[error("Overfill: trade of {volume} against {side} order {order_id} ({remaining} left)")]
    Overfill {
        order_id: OrderId,
        side: Side,
        remaining: u64,
        volume: u64,
    },

    /// Aggregated volume disagrees with the order store.
    #[error("Book inconsistency: {0}")]
    InconsistentState(String),

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------
    /// Depth must be a positive integer.
    #[error("Invalid depth: {0} (must be positive)")]
    InvalidDepth(usize),

    /// Bad command-line or builder argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ---------------------------------------------------------------------
    // Other
    // ---------------------------------------------------------------------
    /// I/O failure while reading the feed or writing output.
    #[error("IO error: {0}")]
    Io(String),

    /// Body of a specific frame could not be decoded.
    #[error("Message #{seq_num}: {source}")]
    Frame {
        seq_num: u32,
        #[source]
        source: Box<ReplayError>,
    },

    /// Failure raised while applying a specific feed event.
    #[error("Event #{seq_num} ({symbol}): {source}")]
    Event {
        seq_num: u32,
        symbol: Symbol,
        #[source]
        source: Box<ReplayError>,
    },
}

impl ReplayError {
    /// Attach the sequence number and symbol of the offending event.
    pub fn at_event(self, seq_num: u32, symbol: Symbol) -> Self {
        ReplayError::Event {
            seq_num,
            symbol,
            source: Box::new(self),
        }
    }

    /// Attach the sequence number of the frame whose body failed to decode.
    pub fn in_frame(self, seq_num: u32) -> Self {
        ReplayError::Frame {
            seq_num,
            source: Box::new(self),
        }
    }

    /// Sequence number of the offending event, if known.
    pub fn seq_num(&self) -> Option<u32> {
        match self {
            ReplayError::Event { seq_num, .. }
            | ReplayError::Frame { seq_num, .. }
            | ReplayError::TruncatedMessage { seq_num, .. }
            | ReplayError::UnknownMessageType { seq_num, .. }
            | ReplayError::InvalidMessageSize { seq_num, .. } => Some(*seq_num),
            _ => None,
        }
    }

    /// True for errors caused by the byte layout of the feed.
    pub fn is_framing(&self) -> bool {
        match self {
            ReplayError::TruncatedHeader { .. }
            | ReplayError::TruncatedMessage { .. }
            | ReplayError::UnknownMessageType { .. }
            | ReplayError::InvalidMessageSize { .. }
            | ReplayError::BodyTooShort { .. }
            | ReplayError::InvalidSide(_)
            | ReplayError::InvalidSymbol(_) => true,
            ReplayError::Frame { .. } => true,
            ReplayError::Event { source, .. } => source.is_framing(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for ReplayError {
    fn from(err: std::io::Error) -> Self {
        ReplayError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(err: serde_json::Error) -> Self {
        ReplayError::Io(format!("JSON encoding failed: {err}"))
    }
}
