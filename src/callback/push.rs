//! Push primitives that tell a live view its data sources changed.

use std::io::Write;

use serde_json::json;

use crate::error::Result;
use crate::source::{read_source, SharedSource};

/// Publishes updated data sources to whatever displays them
pub trait PushHandle {
    fn push(&mut self, sources: &[SharedSource]) -> Result<()>;
}

/// Asks an egui context to repaint; the figure rereads its sources next frame
#[derive(Clone)]
pub struct RepaintHandle {
    ctx: egui::Context,
}

impl RepaintHandle {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl PushHandle for RepaintHandle {
    fn push(&mut self, _sources: &[SharedSource]) -> Result<()> {
        self.ctx.request_repaint();
        Ok(())
    }
}

/// Writes one JSON message per push: `{"seq": n, "sources": [...]}`
pub struct JsonLinesHandle<W: Write> {
    writer: W,
    seq: u64,
}

impl<W: Write> JsonLinesHandle<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, seq: 0 }
    }

    /// Number of messages written so far
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PushHandle for JsonLinesHandle<W> {
    fn push(&mut self, sources: &[SharedSource]) -> Result<()> {
        let payload = sources
            .iter()
            .map(|source| read_source(source)?.to_json())
            .collect::<Result<Vec<_>>>()?;

        let message = json!({ "seq": self.seq, "sources": payload });
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.seq += 1;
        Ok(())
    }
}
