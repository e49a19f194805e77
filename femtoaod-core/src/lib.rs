//! femtoaod-core: data model and collaborator traits for the femtoscopy
//! event reader.
//!
//! This crate defines the raw input event, the reconstructed output event,
//! the geometric primitives (vectors, helix) and the capability traits the
//! reader consumes (lookup tables, threshold curves, event selection,
//! pile-up utilities, PID response).

pub mod error;
pub mod event;
pub mod external;
pub mod helix;
pub mod raw;
pub mod species;
pub mod table;
pub mod vector;

pub use error::{Error, Result};
pub use event::{
    CompositeTruth, Daughter, DaughterTof, DecayOrigin, ItsQuality, NSigma, ReconstructedEvent,
    ReconstructedTrack, SimulatedTruth, TofPid, TpcQuality, TrackDca, TrackPid, TrackWeights,
    Trajectory, V0Candidate, V0Weights, XiCandidate, XiWeights, DCA_SENTINEL, TOF_SENTINEL,
    TRAJECTORY_POINTS,
};
pub use external::{
    EventSelector, PidResponse, PileUpSettings, PileUpUtils, SelectionMode, StoredPidResponse,
    VertexPileUpUtils,
};
pub use helix::{Helix, C_LIGHT, KILOGAUSS};
pub use raw::{
    CentralityEstimator, CentralityPercentiles, EventHeader, EventPlane, ItsInfo, McHeader,
    McOrigin, McParticle, RawCascade, RawEvent, RawTrack, RawV0, StoredDca, StoredPid, TofInfo,
    TpcInfo, Vertex, VzeroData, ZdcEnergies,
};
pub use species::Species;
pub use table::{Axis, BinnedTable1D, BinnedTable4D, Lookup1D, Lookup4D, ThresholdCurve};
pub use vector::{FourVector, ThreeVector};
