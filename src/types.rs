//! Core data types for feed events and book state.
//!
//! These types are designed to be:
//! - Small and `Copy` (symbols are inline 3-byte tickers, no heap)
//! - Integer-only (prices are native feed ticks, never floats)
//! - A closed set of event kinds, decoded once at the feed boundary

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{ReplayError, Result};

/// Exchange-assigned order identifier.
pub type OrderId = u64;

/// Price in the feed's native tick units.
pub type Price = u32;

/// Order size / aggregated level volume.
pub type Volume = u64;

/// Order side (bid or ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Side {
    /// Buy order (bid)
    Bid = b'B',
    /// Sell order (ask)
    Ask = b'S',
}

impl Side {
    /// Parse side from a feed byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'B' => Some(Side::Bid),
            b'S' => Some(Side::Ask),
            _ => None,
        }
    }

    /// Convert to feed byte representation.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Check if this is a bid.
    #[inline(always)]
    pub fn is_bid(self) -> bool {
        matches!(self, Side::Bid)
    }

    /// Check if this is an ask.
    #[inline(always)]
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Ask)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}

/// Message type tag from the feed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum MessageType {
    /// New order
    Add = b'A',
    /// Replace an order's size and price
    Update = b'U',
    /// Remove an order
    Delete = b'D',
    /// Execution against a resting order
    Trade = b'E',
}

impl MessageType {
    /// Parse a message type from its tag byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(MessageType::Add),
            b'U' => Some(MessageType::Update),
            b'D' => Some(MessageType::Delete),
            b'E' => Some(MessageType::Trade),
            _ => None,
        }
    }

    /// Convert to tag byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Length of the message body for this type (excluding the tag byte).
    pub fn body_len(self) -> usize {
        match self {
            MessageType::Add | MessageType::Update => 31,
            MessageType::Delete => 15,
            MessageType::Trade => 23,
        }
    }
}

/// Ticker symbol: up to three ASCII bytes, NUL padded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol([u8; 3]);

impl Symbol {
    /// Create a symbol from a string of at most three printable ASCII characters.
    pub fn new(symbol: &str) -> Result<Self> {
        let bytes = symbol.as_bytes();
        if bytes.len() > 3 {
            return Err(ReplayError::InvalidArgument(format!(
                "symbol {symbol:?} is longer than 3 bytes"
            )));
        }

        let mut raw = [0u8; 3];
        raw[..bytes.len()].copy_from_slice(bytes);
        Self::from_bytes(raw)
    }

    /// Decode a NUL-padded wire symbol.
    ///
    /// Trailing NULs are padding; everything before them must be printable ASCII,
    /// so a NUL between two characters (`b"A\0B"`) is rejected.
    pub fn from_bytes(raw: [u8; 3]) -> Result<Self> {
        let len = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        if !raw[..len].iter().all(|&b| b == b' ' || b.is_ascii_graphic()) {
            return Err(ReplayError::InvalidSymbol(raw));
        }
        Ok(Symbol(raw))
    }

    /// The padded wire bytes.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        self.0
    }

    /// The ticker with padding stripped.
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        // from_bytes guarantees ASCII before the padding
        std::str::from_utf8(&self.0[..len]).unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fixed-size message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Feed sequence number
    pub seq_num: u32,
    /// Message length counting the type tag, excluding the two leading u32 fields
    pub msg_size: u32,
    /// Message type tag
    pub msg_type: MessageType,
}

impl Header {
    /// Wire size of a header.
    pub const SIZE: usize = 9;

    /// Build a header whose size matches the body layout of `msg_type`.
    pub fn new(seq_num: u32, msg_type: MessageType) -> Self {
        Self {
            seq_num,
            msg_size: msg_type.body_len() as u32 + 1,
            msg_type,
        }
    }
}

/// A single order book event.
///
/// Update is not an in-place edit: the book applies it as delete-then-add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    Add {
        symbol: Symbol,
        order_id: OrderId,
        side: Side,
        size: Volume,
        price: Price,
    },
    Update {
        symbol: Symbol,
        order_id: OrderId,
        side: Side,
        size: Volume,
        price: Price,
    },
    Delete {
        symbol: Symbol,
        order_id: OrderId,
        side: Side,
    },
    Trade {
        symbol: Symbol,
        order_id: OrderId,
        side: Side,
        volume: Volume,
    },
}

impl OrderEvent {
    /// New order event.
    pub fn add(symbol: Symbol, order_id: OrderId, side: Side, size: Volume, price: Price) -> Self {
        OrderEvent::Add {
            symbol,
            order_id,
            side,
            size,
            price,
        }
    }

    /// Replace event (applied as delete-then-add).
    pub fn update(
        symbol: Symbol,
        order_id: OrderId,
        side: Side,
        size: Volume,
        price: Price,
    ) -> Self {
        OrderEvent::Update {
            symbol,
            order_id,
            side,
            size,
            price,
        }
    }

    pub fn delete(symbol: Symbol, order_id: OrderId, side: Side) -> Self {
        OrderEvent::Delete {
            symbol,
            order_id,
            side,
        }
    }

    /// Execution of `volume` against a resting order.
    pub fn trade(symbol: Symbol, order_id: OrderId, side: Side, volume: Volume) -> Self {
        OrderEvent::Trade {
            symbol,
            order_id,
            side,
            volume,
        }
    }

    #[inline]
    pub fn symbol(&self) -> Symbol {
        match *self {
            OrderEvent::Add { symbol, .. }
            | OrderEvent::Update { symbol, .. }
            | OrderEvent::Delete { symbol, .. }
            | OrderEvent::Trade { symbol, .. } => symbol,
        }
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        match *self {
            OrderEvent::Add { order_id, .. }
            | OrderEvent::Update { order_id, .. }
            | OrderEvent::Delete { order_id, .. }
            | OrderEvent::Trade { order_id, .. } => order_id,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        match *self {
            OrderEvent::Add { side, .. }
            | OrderEvent::Update { side, .. }
            | OrderEvent::Delete { side, .. }
            | OrderEvent::Trade { side, .. } => side,
        }
    }

    /// The header tag this event is encoded with.
    pub fn message_type(&self) -> MessageType {
        match self {
            OrderEvent::Add { .. } => MessageType::Add,
            OrderEvent::Update { .. } => MessageType::Update,
            OrderEvent::Delete { .. } => MessageType::Delete,
            OrderEvent::Trade { .. } => MessageType::Trade,
        }
    }
}

/// A decoded feed message: header plus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedMessage {
    pub header: Header,
    pub event: OrderEvent,
}

impl FeedMessage {
    /// Wrap an event with a header sized for its layout.
    pub fn new(seq_num: u32, event: OrderEvent) -> Self {
        Self {
            header: Header::new(seq_num, event.message_type()),
            event,
        }
    }

    #[inline]
    pub fn seq_num(&self) -> u32 {
        self.header.seq_num
    }
}

/// A live resting order.
///
/// Invariant: `remaining_size > 0` while the order is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub remaining_size: Volume,
}
