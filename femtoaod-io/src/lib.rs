//! femtoaod-io: event sources and sinks for femtoaod.
//!
//! Raw events are read one per line from JSON-lines files through the
//! [`EventSource`] contract; converted events are written back in the same
//! line-oriented format.

mod error;
pub mod source;
mod writer;

pub use error::{Error, Result};
pub use source::{EventSource, Events, JsonLinesSource, VecSource};
pub use writer::JsonLinesWriter;
