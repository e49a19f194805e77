//! femtoaod-reader: converts raw collision events into femtoscopy events.
//!
//! The [`EventReader`] decides whether an event is usable (vertex, pile-up,
//! centrality and trigger checks), then converts its tracks, V0s and
//! cascades into the analysis representation: PID, DCA, trajectory samples
//! through the TPC, correction weights and optional simulated truth.
//!
//! ```no_run
//! use femtoaod_reader::{EventReader, ReaderConfig};
//!
//! let config = ReaderConfig::new().with_filter_bit(7).with_read_v0(true);
//! let mut reader = EventReader::new(config)?;
//! # let event = femtoaod_core::RawEvent::default();
//! if let Some(converted) = reader.convert(&event).into_event() {
//!     println!("{} tracks", converted.n_tracks);
//! }
//! # Ok::<(), femtoaod_reader::Error>(())
//! ```

pub mod cascade;
pub mod config;
pub mod context;
pub mod corrections;
pub mod curves;
pub mod error;
pub mod extrapolation;
pub mod gatekeeper;
pub mod legacy;
pub mod multiplicity;
pub mod pid;
pub mod reader;
pub mod track;
pub mod truth;
pub mod v0;

pub use cascade::build_xi;
pub use config::{CentralityRange, DcaMode, EventPlaneSource, JetSelection, ReaderConfig};
pub use context::EventContext;
pub use corrections::{CorrectionSpecies, CorrectionTables, Kinematics};
pub use curves::{ParametricCurve, PileUpCurves};
pub use error::{Error, Result};
pub use gatekeeper::{Gatekeeper, Rejection};
pub use legacy::{LegacyCheck, LegacyYear};
pub use multiplicity::{MultiplicityStrategy, TrackCounts};
pub use reader::{Collaborators, Conversion, EventReader};
pub use v0::build_v0;
