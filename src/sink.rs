//! Destinations for snapshot changes.
//!
//! The replay core only decides *when* a snapshot changed; a sink decides
//! how the change is presented.

use std::io::Write;

use crate::error::Result;
use crate::lob::SnapshotUpdate;

/// Receives every snapshot change, in feed order.
pub trait SnapshotSink {
    /// Handle one change.
    fn publish(&mut self, update: &SnapshotUpdate) -> Result<()>;

    /// Flush buffered output. Called once after the last event.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects updates in memory.
impl SnapshotSink for Vec<SnapshotUpdate> {
    fn publish(&mut self, update: &SnapshotUpdate) -> Result<()> {
        self.push(update.clone());
        Ok(())
    }
}

/// Writes one text line per change:
/// `seq_num, symbol, [(price, volume), ...], [(price, volume), ...]`.
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SnapshotSink for TextSink<W> {
    fn publish(&mut self, update: &SnapshotUpdate) -> Result<()> {
        writeln!(self.writer, "{update}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes one JSON object per change (JSON Lines).
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn publish(&mut self, update: &SnapshotUpdate) -> Result<()> {
        serde_json::to_writer(&mut self.writer, update)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lob::{DepthSnapshot, LevelView};
    use crate::types::Symbol;

    fn update() -> SnapshotUpdate {
        SnapshotUpdate {
            seq_num: 9,
            symbol: Symbol::new("ABC").unwrap(),
            snapshot: DepthSnapshot {
                bids: vec![LevelView::new(10, 7), LevelView::new(9, 5)],
                asks: vec![LevelView::new(11, 20)],
            },
        }
    }

    #[test]
    fn test_text_sink() {
        let mut sink = TextSink::new(Vec::new());
        sink.publish(&update()).unwrap();
        sink.finish().unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "9, ABC, [(10, 7), (9, 5)], [(11, 20)]\n");
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.publish(&update()).unwrap();
        sink.publish(&update()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["seq_num"], 9);
        assert_eq!(value["symbol"], "ABC");
        assert_eq!(value["bids"][1]["price"], 9);
        assert_eq!(value["asks"][0]["volume"], 20);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<SnapshotUpdate> = Vec::new();
        sink.publish(&update()).unwrap();
        assert_eq!(sink, vec![update()]);
    }
}
