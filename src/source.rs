//! Feed source abstraction.
//!
//! A source hands the dispatcher a single forward-only stream of decoded
//! messages. Decoding failures travel through the stream as `Err` items so
//! the dispatcher can stop at the exact message that broke.
//!
//! # Example
//!
//! ```
//! use lob_depth_replay::source::{EventSource, VecSource};
//! use lob_depth_replay::{FeedMessage, OrderEvent, Side, Symbol};
//!
//! let symbol = Symbol::new("ABC").unwrap();
//! let source = VecSource::new(vec![FeedMessage::new(
//!     1,
//!     OrderEvent::add(symbol, 1, Side::Bid, 10, 100),
//! )]);
//!
//! assert_eq!(source.metadata().estimated_messages, Some(1));
//! let count = source.messages().unwrap().count();
//! assert_eq!(count, 1);
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::decoder::{FeedDecoder, FeedLoader};
use crate::error::Result;
use crate::types::FeedMessage;

// ============================================================================
// Source Metadata
// ============================================================================

/// Metadata about a feed source, used for logging.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    /// Original file path (if loaded from file)
    pub file_path: Option<PathBuf>,

    /// Provider name (e.g., "file", "memory")
    pub provider: Option<String>,

    /// Estimated message count (for progress tracking)
    pub estimated_messages: Option<u64>,

    /// File size in bytes (if applicable)
    pub file_size: Option<u64>,
}

impl SourceMetadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file path.
    pub fn with_file_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the estimated message count.
    pub fn with_estimated_messages(mut self, count: u64) -> Self {
        self.estimated_messages = Some(count);
        self
    }

    /// Set the file size.
    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }

    /// Short human-readable description for log lines.
    pub fn describe(&self) -> String {
        match (&self.file_path, &self.provider) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(provider)) => provider.clone(),
            (None, None) => "<unknown source>".to_string(),
        }
    }
}

// ============================================================================
// Event Source Trait
// ============================================================================

/// A stream of decoded feed messages.
///
/// `messages()` consumes `self`: a feed is read once, front to back.
pub trait EventSource {
    /// The iterator type for messages.
    type MessageIter: Iterator<Item = Result<FeedMessage>>;

    /// Consume the source and return an iterator over messages.
    ///
    /// # Errors
    /// Failing to open the underlying input. Per-message decode errors are
    /// yielded by the iterator instead.
    fn messages(self) -> Result<Self::MessageIter>;

    /// Get metadata about the source.
    fn metadata(&self) -> &SourceMetadata;
}

// ============================================================================
// Vector Source (for testing)
// ============================================================================

/// In-memory source of already decoded messages.
pub struct VecSource {
    messages: Vec<Result<FeedMessage>>,
    metadata: SourceMetadata,
}

impl VecSource {
    /// Create a new vector source.
    pub fn new(messages: Vec<FeedMessage>) -> Self {
        Self::from_results(messages.into_iter().map(Ok).collect())
    }

    /// Create a source that may yield decode errors mid-stream.
    pub fn from_results(messages: Vec<Result<FeedMessage>>) -> Self {
        Self {
            metadata: SourceMetadata::new()
                .with_provider("memory")
                .with_estimated_messages(messages.len() as u64),
            messages,
        }
    }

    /// Set custom metadata.
    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl EventSource for VecSource {
    type MessageIter = std::vec::IntoIter<Result<FeedMessage>>;

    fn messages(self) -> Result<Self::MessageIter> {
        Ok(self.messages.into_iter())
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

// ============================================================================
// File Source
// ============================================================================

/// Feed file on disk, decoded through [`FeedLoader`].
///
/// # Example
///
/// ```no_run
/// use lob_depth_replay::source::{EventSource, FileSource};
///
/// let source = FileSource::new("feed.bin")?;
/// println!("Reading {} bytes", source.metadata().file_size.unwrap_or(0));
/// for msg in source.messages()? {
///     let _msg = msg?;
/// }
/// # Ok::<(), lob_depth_replay::ReplayError>(())
/// ```
pub struct FileSource {
    loader: FeedLoader,
    metadata: SourceMetadata,
}

impl FileSource {
    /// Create a new file source.
    ///
    /// # Errors
    /// The file does not exist or is not a regular file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let loader = FeedLoader::new(path.as_ref())?;
        let metadata = SourceMetadata::new()
            .with_file_path(loader.path())
            .with_provider("file")
            .with_file_size(loader.stats().file_size);

        Ok(Self { loader, metadata })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        self.loader.path()
    }
}

impl EventSource for FileSource {
    type MessageIter = FeedDecoder<BufReader<File>>;

    fn messages(self) -> Result<Self::MessageIter> {
        self.loader.iter_messages()
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::encode_feed;
    use crate::types::{OrderEvent, Side, Symbol};

    fn sample() -> Vec<FeedMessage> {
        let symbol = Symbol::new("ABC").unwrap();
        (1..=3)
            .map(|i| {
                FeedMessage::new(
                    i,
                    OrderEvent::Add {
                        symbol,
                        order_id: u64::from(i),
                        side: Side::Ask,
                        size: 10,
                        price: 100 + i,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_vec_source() {
        let source = VecSource::new(sample());
        assert_eq!(source.metadata().provider.as_deref(), Some("memory"));
        assert_eq!(source.metadata().estimated_messages, Some(3));

        let messages: Vec<FeedMessage> = source
            .messages()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(messages, sample());
    }

    #[test]
    fn test_vec_source_custom_metadata() {
        let source = VecSource::new(vec![])
            .with_metadata(SourceMetadata::new().with_provider("fixture"));
        assert_eq!(source.metadata().describe(), "fixture");
    }

    #[test]
    fn test_file_source() {
        let path = std::env::temp_dir().join(format!("source_test_{}.bin", std::process::id()));
        std::fs::write(&path, encode_feed(&sample())).unwrap();

        let source = FileSource::new(&path).unwrap();
        assert_eq!(source.path(), path.as_path());
        assert_eq!(source.metadata().provider.as_deref(), Some("file"));
        assert_eq!(source.metadata().describe(), path.display().to_string());
        assert!(source.metadata().file_size.unwrap() > 0);

        let messages: Vec<FeedMessage> = source
            .messages()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(messages, sample());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_source_missing() {
        assert!(FileSource::new("/nonexistent/feed.bin").is_err());
    }
}
