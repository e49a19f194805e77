//! Writers for converted events.

use crate::Result;
use femtoaod_core::ReconstructedEvent;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON-encoded [`ReconstructedEvent`] per line.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    written: usize,
}

impl JsonLinesWriter<BufWriter<File>> {
    /// Creates (or truncates) the output file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Appends one event.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_event(&mut self, event: &ReconstructedEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of events written so far.
    #[must_use]
    pub fn events_written(&self) -> usize {
        self.written
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use femtoaod_core::ThreeVector;
    use tempfile::NamedTempFile;

    fn event(run_number: i32) -> ReconstructedEvent {
        ReconstructedEvent {
            run_number,
            magnetic_field: 0.5,
            primary_vertex: ThreeVector::new(0.0, 0.0, 2.0),
            ..ReconstructedEvent::default()
        }
    }

    #[test]
    fn test_one_event_per_line() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        writer.write_event(&event(1)).unwrap();
        writer.write_event(&event(2)).unwrap();
        assert_eq!(writer.events_written(), 2);

        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let decoded: ReconstructedEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(decoded, event(2));
    }

    #[test]
    fn test_create_file() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = JsonLinesWriter::create(file.path()).unwrap();
        writer.write_event(&event(3)).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.ends_with('\n'));
        assert!(content.contains("\"run_number\":3"));
    }
}
