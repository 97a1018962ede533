//! JSON lines emitter

use super::messages::Message;
use crate::error::Result;
use crate::streams::StreamDefinition;
use crate::types::Record;
use std::collections::HashSet;
use std::io::Write;

/// Writes messages one JSON document per line
pub struct Emitter<W: Write> {
    writer: W,
    announced: HashSet<String>,
    records_written: u64,
}

impl<W: Write> Emitter<W> {
    /// Create an emitter over a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            announced: HashSet::new(),
            records_written: 0,
        }
    }

    /// Write one message
    pub fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        if message.is_record() {
            self.records_written += 1;
        }
        Ok(())
    }

    /// Write the stream's schema unless it was already written
    pub fn write_schema(&mut self, stream: &StreamDefinition) -> Result<()> {
        if !self.announced.insert(stream.name.to_string()) {
            return Ok(());
        }
        let message = Message::schema(stream.name, stream.schema()?, stream.primary_keys);
        self.write(&message)
    }

    /// Write a record of a stream
    pub fn write_record(&mut self, stream: &str, record: Record) -> Result<()> {
        self.write(&Message::record(stream, record))
    }

    /// Records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush the writer
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> std::fmt::Debug for Emitter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("announced", &self.announced)
            .field("records_written", &self.records_written)
            .finish_non_exhaustive()
    }
}
