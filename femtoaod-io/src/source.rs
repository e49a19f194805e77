//! Raw event sources.

use crate::{Error, Result};
use femtoaod_core::RawEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Provider of raw events, one at a time.
pub trait EventSource {
    /// Next event, `Ok(None)` at the end of the input.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read or decoded.
    fn next_event(&mut self) -> Result<Option<RawEvent>>;

    /// Adapts the source into an iterator of events.
    fn events(self) -> Events<Self>
    where
        Self: Sized,
    {
        Events {
            source: self,
            done: false,
        }
    }
}

/// Iterator over the events of a source; stops after the first error.
pub struct Events<S> {
    source: S,
    done: bool,
}

impl<S: EventSource> Iterator for Events<S> {
    type Item = Result<RawEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Reads one JSON-encoded [`RawEvent`] per line.
///
/// Blank lines are skipped. Missing fields take their defaults.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buffer: String,
}

impl JsonLinesSource<BufReader<File>> {
    /// Opens a JSON-lines file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> EventSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buffer.trim();
            if text.is_empty() {
                continue;
            }
            let event = serde_json::from_str(text).map_err(|source| Error::Parse {
                line: self.line,
                source,
            })?;
            log::trace!("decoded event on line {}", self.line);
            return Ok(Some(event));
        }
    }
}

/// In-memory source, mostly for tests and replay.
pub struct VecSource {
    events: std::vec::IntoIter<RawEvent>,
}

impl VecSource {
    #[must_use]
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl EventSource for VecSource {
    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        Ok(self.events.next())
    }
}
