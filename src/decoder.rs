//! Binary feed loader and streaming decoder.
//!
//! Wire format, all integers little-endian:
//!
//! ```text
//! header   seq_num: u32 | msg_size: u32 | msg_type: u8
//! body     msg_size - 1 bytes, keyed by msg_type:
//!   A / U  symbol[3] | order_id: u64 | side: u8 | pad[3] | size: u64 | price: u32 | pad[4]
//!   D      symbol[3] | order_id: u64 | side: u8 | pad[3]
//!   E      symbol[3] | order_id: u64 | side: u8 | pad[3] | volume: u64
//! ```
//!
//! Decoding is fail-fast: the first framing error is yielded and the
//! iterator is fused afterwards. A clean end of stream is only accepted on
//! a message boundary. Errors found inside a body are wrapped in
//! `ReplayError::Frame` with the header's sequence number.
//!
//! # Example
//!
//! ```no_run
//! use lob_depth_replay::FeedLoader;
//!
//! let loader = FeedLoader::new("feed.bin")?;
//! for msg in loader.iter_messages()? {
//!     let msg = msg?;
//!     println!("#{} {:?}", msg.seq_num(), msg.event);
//! }
//! # Ok::<(), lob_depth_replay::ReplayError>(())
//! ```

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::error::{ReplayError, Result};
use crate::types::{FeedMessage, Header, MessageType, OrderEvent, Side, Symbol};

/// I/O buffer size for feed files.
///
/// The default `BufReader` capacity is 8KB; feed messages are tiny, so a
/// larger buffer cuts the number of read syscalls per message.
pub const IO_BUFFER_SIZE: usize = 1024 * 1024; // 1 MB

/// Largest body any known message type carries.
const MAX_BODY_LEN: usize = 31;

/// Upper bound on `msg_size`.
///
/// The wire format itself puts no limit on the announced size. This decoder
/// adds one: a header announcing 0 bytes or more than this is reported as
/// `InvalidMessageSize` instead of being trusted for an allocation.
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

/// Statistics for feed decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Messages successfully decoded
    pub messages_read: u64,

    /// Bytes consumed from the stream
    pub bytes_read: u64,

    /// File size in bytes (0 for non-file readers)
    pub file_size: u64,
}

/// Feed file loader.
///
/// Checks the file up front so that an unreadable input is reported before
/// any event is processed.
#[derive(Debug)]
pub struct FeedLoader {
    path: PathBuf,
    stats: LoaderStats,
}

impl FeedLoader {
    /// Create a new loader for `path`.
    ///
    /// # Errors
    /// `Io` if the file does not exist or its metadata cannot be read.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let metadata = std::fs::metadata(&path).map_err(|e| {
            ReplayError::Io(format!("Cannot read {}: {e}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(ReplayError::Io(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        Ok(Self {
            path,
            stats: LoaderStats {
                file_size: metadata.len(),
                ..Default::default()
            },
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get statistics.
    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Open the file and return a streaming decoder over it.
    pub fn iter_messages(self) -> Result<FeedDecoder<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|e| {
            ReplayError::Io(format!("Failed to open {}: {e}", self.path.display()))
        })?;
        let reader = BufReader::with_capacity(IO_BUFFER_SIZE, file);

        log::debug!(
            "Opened feed {} ({} bytes)",
            self.path.display(),
            self.stats.file_size
        );

        Ok(FeedDecoder {
            reader,
            stats: self.stats,
            finished: false,
        })
    }

    /// Decode every message into memory.
    ///
    /// **Warning**: loads the whole feed. Prefer `iter_messages()` for large files.
    pub fn read_all(self) -> Result<Vec<FeedMessage>> {
        self.iter_messages()?.collect()
    }

    /// Count messages, failing on the first framing error.
    pub fn count_messages(self) -> Result<u64> {
        let mut count = 0u64;
        for msg in self.iter_messages()? {
            msg?;
            count += 1;
        }
        Ok(count)
    }
}

/// Streaming decoder over any byte reader.
///
/// Forward-only and not restartable: each message is read exactly once.
#[derive(Debug)]
pub struct FeedDecoder<R> {
    reader: R,
    stats: LoaderStats,
    finished: bool,
}

impl<R: Read> FeedDecoder<R> {
    /// Decode from an arbitrary reader (no file size known).
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            stats: LoaderStats::default(),
            finished: false,
        }
    }

    /// Get current statistics.
    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Progress as a percentage of the file size (0.0 to 100.0).
    pub fn progress(&self) -> f64 {
        if self.stats.file_size == 0 {
            return 100.0;
        }

        (self.stats.bytes_read as f64 / self.stats.file_size as f64) * 100.0
    }

    /// Read the next message, `Ok(None)` at a clean end of stream.
    pub fn next_message(&mut self) -> Result<Option<FeedMessage>> {
        let mut header = [0u8; Header::SIZE];
        let read = read_full(&mut self.reader, &mut header)?;
        self.stats.bytes_read += read as u64;
        if read == 0 {
            return Ok(None);
        }
        if read < Header::SIZE {
            return Err(ReplayError::TruncatedHeader {
                read,
                expected: Header::SIZE,
            });
        }

        let seq_num = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let msg_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let tag = header[8];

        if msg_size == 0 || msg_size > MAX_MESSAGE_SIZE {
            return Err(ReplayError::InvalidMessageSize { seq_num, msg_size });
        }
        let body_len = (msg_size - 1) as usize;

        // Known layouts fit on the stack; anything longer is read into a Vec
        // so that the truncation check still sees the announced length.
        let mut small = [0u8; MAX_BODY_LEN];
        let mut large = Vec::new();
        let body: &mut [u8] = if body_len <= MAX_BODY_LEN {
            &mut small[..body_len]
        } else {
            large.resize(body_len, 0);
            large.as_mut_slice()
        };

        let read = read_full(&mut self.reader, body)?;
        self.stats.bytes_read += read as u64;
        if read < body_len {
            return Err(ReplayError::TruncatedMessage {
                seq_num,
                msg_size,
                read,
            });
        }

        let msg_type = MessageType::from_byte(tag)
            .ok_or(ReplayError::UnknownMessageType { seq_num, tag })?;
        let event = decode_body(msg_type, body).map_err(|e| e.in_frame(seq_num))?;

        self.stats.messages_read += 1;
        Ok(Some(FeedMessage {
            header: Header {
                seq_num,
                msg_size,
                msg_type,
            },
            event,
        }))
    }
}

impl<R: Read> Iterator for FeedDecoder<R> {
    type Item = Result<FeedMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_message() {
            Ok(Some(msg)) => Some(Ok(msg)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                log::debug!("Feed decoding stopped after {} messages", self.stats.messages_read);
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode a message body laid out for `msg_type`.
///
/// Bytes past the end of the known layout are ignored.
pub fn decode_body(msg_type: MessageType, body: &[u8]) -> Result<OrderEvent> {
    let expected = msg_type.body_len();
    if body.len() < expected {
        return Err(ReplayError::BodyTooShort {
            msg_type: msg_type.to_byte() as char,
            expected,
            actual: body.len(),
        });
    }
    if body.len() > expected {
        log::debug!(
            "Ignoring {} trailing bytes of '{}' message",
            body.len() - expected,
            msg_type.to_byte() as char
        );
    }

    let symbol = Symbol::from_bytes([body[0], body[1], body[2]])?;
    let order_id = read_u64(body, 3);
    let side = Side::from_byte(body[11]).ok_or(ReplayError::InvalidSide(body[11]))?;

    let event = match msg_type {
        MessageType::Add => OrderEvent::Add {
            symbol,
            order_id,
            side,
            size: read_u64(body, 15),
            price: read_u32(body, 23),
        },
        MessageType::Update => OrderEvent::Update {
            symbol,
            order_id,
            side,
            size: read_u64(body, 15),
            price: read_u32(body, 23),
        },
        MessageType::Delete => OrderEvent::Delete {
            symbol,
            order_id,
            side,
        },
        MessageType::Trade => OrderEvent::Trade {
            symbol,
            order_id,
            side,
            volume: read_u64(body, 15),
        },
    };

    Ok(event)
}

/// Append the wire encoding of `msg` to `out`.
///
/// The header's `msg_size` is written as given, so fixtures can describe
/// malformed frames; `FeedMessage::new` produces a consistent one.
pub fn encode_message(msg: &FeedMessage, out: &mut Vec<u8>) {
    out.extend_from_slice(&msg.header.seq_num.to_le_bytes());
    out.extend_from_slice(&msg.header.msg_size.to_le_bytes());
    out.push(msg.header.msg_type.to_byte());

    let event = &msg.event;
    out.extend_from_slice(&event.symbol().to_bytes());
    out.extend_from_slice(&event.order_id().to_le_bytes());
    out.push(event.side().to_byte());
    out.extend_from_slice(&[0u8; 3]);

    match *event {
        OrderEvent::Add { size, price, .. } | OrderEvent::Update { size, price, .. } => {
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&price.to_le_bytes());
            out.extend_from_slice(&[0u8; 4]);
        }
        OrderEvent::Delete { .. } => {}
        OrderEvent::Trade { volume, .. } => {
            out.extend_from_slice(&volume.to_le_bytes());
        }
    }
}

/// Encode a sequence of messages into one buffer.
pub fn encode_feed<'a>(messages: impl IntoIterator<Item = &'a FeedMessage>) -> Vec<u8> {
    let mut out = Vec::new();
    for msg in messages {
        encode_message(msg, &mut out);
    }
    out
}

#[inline]
fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

#[inline]
fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(bytes)
}

/// Fill `buf` as far as the stream allows; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
