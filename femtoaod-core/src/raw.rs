//! Raw event model as delivered by the event source.
//!
//! These types mirror what the reconstruction stores per event. They are
//! read-only inputs: conversion borrows a [`RawEvent`] and never mutates it.

use crate::vector::{FourVector, ThreeVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Detector status bits carried by [`RawTrack::status`].
pub mod status {
    pub const ITS_REFIT: u64 = 0x4;
    pub const TPC_REFIT: u64 = 0x40;
    pub const TOF_OUT: u64 = 0x2000;
    pub const TIME: u64 = 0x8000_0000;
}

/// Reconstructed vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Vertex {
    pub position: ThreeVector,
    pub n_contributors: i32,
    /// Lower-triangular covariance `[xx, xy, yy, xz, yz, zz]`.
    pub covariance: [f64; 6],
}

impl Vertex {
    #[must_use]
    pub fn new(position: ThreeVector, n_contributors: i32) -> Self {
        Self {
            position,
            n_contributors,
            covariance: [0.0; 6],
        }
    }

    #[must_use]
    pub fn with_covariance(mut self, covariance: [f64; 6]) -> Self {
        self.covariance = covariance;
        self
    }

    /// Variance of the z coordinate.
    #[must_use]
    pub fn sigma2_z(&self) -> f64 {
        self.covariance[5]
    }
}

/// Per-event header quantities.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EventHeader {
    /// Standard reference multiplicity.
    pub ref_mult: i32,
    /// Combined reference multiplicity in |η| < 0.8.
    pub ref_mult_comb08: i32,
    /// TPC-only reference multiplicity.
    pub tpc_only_ref_mult: i32,
    /// Number of tracks in the upstream (ESD) event.
    pub n_esd_tracks: i32,
    /// Q-vector angle from the header.
    pub q_theta: f64,
    pub trigger_mask: u64,
    pub trigger_cluster: u8,
    pub daq_incomplete: bool,
}

/// Event-plane angles from the dedicated event-plane task.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EventPlane {
    /// Second-harmonic plane from the V0 scintillators.
    pub v0: f64,
    /// Plane from the TPC Q-vector.
    pub q: f64,
}

/// Forward scintillator (VZERO) amplitudes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VzeroData {
    /// Per-channel multiplicity, 64 channels.
    pub multiplicity: Vec<f64>,
    pub mtot_v0a: f64,
    pub mtot_v0c: f64,
    /// Online trigger charge, A side.
    pub trigger_charge_a: f64,
    /// Online trigger charge, C side.
    pub trigger_charge_c: f64,
}

/// Zero-degree calorimeter energies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZdcEnergies {
    pub zn1: f64,
    pub zp1: f64,
    pub zn2: f64,
    pub zp2: f64,
    pub em1: f64,
    pub em2: f64,
    pub participants: i32,
}

/// Centrality estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CentralityEstimator {
    V0M,
    V0A,
    V0C,
    ZNA,
    ZNC,
    CL1,
    CL0,
    TRK,
    TKL,
    CND,
    NPA,
    FMD,
}

/// Centrality percentiles per estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CentralityPercentiles {
    pub v0m: f64,
    pub v0a: f64,
    pub v0c: f64,
    pub zna: f64,
    pub znc: f64,
    pub cl1: f64,
    pub cl0: f64,
    pub trk: f64,
    pub tkl: f64,
    pub cnd: f64,
    pub npa: f64,
    pub fmd: f64,
}

impl CentralityPercentiles {
    #[must_use]
    pub fn get(&self, estimator: CentralityEstimator) -> f64 {
        match estimator {
            CentralityEstimator::V0M => self.v0m,
            CentralityEstimator::V0A => self.v0a,
            CentralityEstimator::V0C => self.v0c,
            CentralityEstimator::ZNA => self.zna,
            CentralityEstimator::ZNC => self.znc,
            CentralityEstimator::CL1 => self.cl1,
            CentralityEstimator::CL0 => self.cl0,
            CentralityEstimator::TRK => self.trk,
            CentralityEstimator::TKL => self.tkl,
            CentralityEstimator::CND => self.cnd,
            CentralityEstimator::NPA => self.npa,
            CentralityEstimator::FMD => self.fmd,
        }
    }
}

/// DCA values stored with the track upstream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoredDca {
    pub xy: f64,
    pub z: f64,
}

/// TPC information.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TpcInfo {
    pub chi2: f64,
    pub n_clusters: i32,
    pub n_findable: i32,
    pub n_crossed_rows: f64,
    pub signal: f64,
    pub signal_n: i32,
    /// Momentum at the TPC inner wall.
    pub inner_momentum: f64,
    /// Pad-row cluster map (159 rows, bit per row).
    pub cluster_map: [u64; 3],
    /// Pad-row shared-cluster map.
    pub shared_map: [u64; 3],
}

/// ITS information.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItsInfo {
    pub chi2: f64,
    pub n_clusters: i32,
    /// Bit `n` set when layer `n` (0..6) has a cluster.
    pub layer_hits: u8,
}

impl ItsInfo {
    #[must_use]
    pub fn has_point_on_layer(&self, layer: u8) -> bool {
        layer < 8 && self.layer_hits & (1 << layer) != 0
    }
}

/// TOF information.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TofInfo {
    /// Raw TOF signal (ps).
    pub signal: f64,
    /// Bunch crossing relative to the triggered one.
    pub bunch_crossing: i32,
    /// Integrated track length (cm).
    pub integrated_length: f64,
    /// Expected times for e, μ, π, K, p.
    pub integrated_times: [f64; 5],
}

/// PID response values stored with the track upstream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoredPid {
    /// TPC n-σ in [`Species::ALL`](crate::Species::ALL) order.
    pub n_sigma_tpc: [f64; 8],
    /// TOF n-σ in [`Species::ALL`](crate::Species::ALL) order.
    pub n_sigma_tof: [f64; 8],
    pub tof_mismatch_probability: f64,
    /// TOF event start time (ps).
    pub tof_start_time: f64,
}

/// Reconstructed charged track.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawTrack {
    /// Negative ids are TPC-only copies of global track `-1 - id`.
    pub id: i32,
    pub charge: i32,
    pub momentum: ThreeVector,
    /// Global position of the track parametrisation.
    pub position: ThreeVector,
    /// Local X of the track parametrisation (cm).
    pub local_x: f64,
    pub filter_map: u32,
    pub status: u64,
    /// Truth label, negative for fake tracks.
    pub label: i32,
    pub is_primary_candidate: bool,
    pub dca: StoredDca,
    pub chi2_per_ndf: f64,
    pub tpc: TpcInfo,
    pub its: ItsInfo,
    pub tof: TofInfo,
    /// Combined detector PID probabilities for e, μ, π, K, p.
    pub pid_probabilities: [f64; 5],
    pub stored_pid: Option<StoredPid>,
}

impl RawTrack {
    /// True when filter bit `bit` is set.
    #[must_use]
    pub fn test_filter_bit(&self, bit: u8) -> bool {
        bit < 32 && self.filter_map & (1 << bit) != 0
    }

    /// True when any bit of `mask` is set.
    #[must_use]
    pub fn test_filter_mask(&self, mask: u32) -> bool {
        self.filter_map & mask != 0
    }

    #[must_use]
    pub fn has_status(&self, flags: u64) -> bool {
        self.status & flags == flags
    }

    #[must_use]
    pub fn pt(&self) -> f64 {
        self.momentum.perp()
    }

    #[must_use]
    pub fn p(&self) -> f64 {
        self.momentum.mag()
    }

    #[must_use]
    pub fn eta(&self) -> f64 {
        self.momentum.eta()
    }

    #[must_use]
    pub fn phi(&self) -> f64 {
        self.momentum.phi()
    }
}

/// Two-prong neutral decay candidate.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawV0 {
    pub n_daughters: i32,
    pub n_prongs: i32,
    /// Net charge.
    pub charge: i32,
    pub prong_charges: [i32; 2],
    /// Daughter indices into [`RawEvent::tracks`].
    pub daughters: [Option<usize>; 2],
    pub prong_momenta: [ThreeVector; 2],
    pub prong_ids: [i32; 2],
    pub dca_prong_to_primary: [f64; 2],
    pub decay_vertex: ThreeVector,
    pub dca_daughters: f64,
    pub dca_to_primary: f64,
    pub on_fly: bool,
}

impl RawV0 {
    /// Sum of the prong momenta.
    #[must_use]
    pub fn momentum(&self) -> ThreeVector {
        self.prong_momenta[0] + self.prong_momenta[1]
    }

    /// Cosine of the angle between the momentum and the line from `point`
    /// to the decay vertex.
    #[must_use]
    pub fn cos_pointing_angle(&self, point: &ThreeVector) -> f64 {
        cos_pointing(&(self.decay_vertex - *point), &self.momentum())
    }
}

/// Cascade candidate: a V0 plus a bachelor track.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawCascade {
    pub v0: RawV0,
    pub bachelor: Option<usize>,
    pub bachelor_id: i32,
    pub bachelor_momentum: ThreeVector,
    pub dca_bachelor_to_primary: f64,
    /// Cascade decay vertex.
    pub decay_vertex: ThreeVector,
    pub dca_v0_bachelor: f64,
    pub charge: i32,
}

impl RawCascade {
    /// V0 plus bachelor momentum.
    #[must_use]
    pub fn momentum(&self) -> ThreeVector {
        self.v0.momentum() + self.bachelor_momentum
    }

    /// Pointing of the cascade momentum from `point` to the cascade vertex.
    #[must_use]
    pub fn cos_pointing_angle_xi(&self, point: &ThreeVector) -> f64 {
        cos_pointing(&(self.decay_vertex - *point), &self.momentum())
    }
}

fn cos_pointing(flight: &ThreeVector, momentum: &ThreeVector) -> f64 {
    let norm = flight.mag() * momentum.mag();
    if norm == 0.0 {
        return -1.0;
    }
    flight.dot(momentum) / norm
}

/// Origin flags of a simulated particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct McOrigin {
    pub physical_primary: bool,
    pub secondary_from_weak_decay: bool,
    pub secondary_from_material: bool,
}

/// Simulated particle from the truth table.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct McParticle {
    pub label: i32,
    pub pdg_code: i32,
    pub momentum: ThreeVector,
    pub energy: f64,
    /// Production vertex (cm, cm, cm, s).
    pub production: FourVector,
    /// Mother index, `-1` when none.
    pub mother: i32,
    pub origin: McOrigin,
}

impl McParticle {
    /// Invariant mass, clamped at zero.
    #[must_use]
    pub fn mass(&self) -> f64 {
        (self.energy * self.energy - self.momentum.mag2()).max(0.0).sqrt()
    }
}

/// Generator bookkeeping for simulated events.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct McHeader {
    /// Generator names of the cocktail, in stacking order.
    pub generators: Vec<String>,
    /// Labels `< n_signal` come from the triggered collision.
    pub n_signal: i32,
    /// Generators flagged as pile-up collisions.
    pub pileup_generators: Vec<String>,
}

/// One raw collision event.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawEvent {
    pub run_number: i32,
    /// Solenoid field (kG).
    pub magnetic_field: f64,
    pub primary_vertex: Option<Vertex>,
    /// SPD tracklet vertex.
    pub spd_vertex: Option<Vertex>,
    /// Pile-up vertices found by the SPD or multi-vertexer.
    pub pileup_vertices: Vec<Vertex>,
    pub header: EventHeader,
    pub event_plane: Option<EventPlane>,
    pub zdc: ZdcEnergies,
    pub vzero: VzeroData,
    /// ITS clusters per layer (6 layers).
    pub its_clusters: [i32; 6],
    pub spd_tracklets: i32,
    pub tracks: Vec<RawTrack>,
    pub v0s: Vec<RawV0>,
    pub cascades: Vec<RawCascade>,
    pub centrality: Option<CentralityPercentiles>,
    pub mc_particles: Option<Vec<McParticle>>,
    pub mc_header: Option<McHeader>,
}

impl RawEvent {
    /// Truth particle at `label`, if the truth table is present.
    #[must_use]
    pub fn mc_particle(&self, label: i32) -> Option<&McParticle> {
        let index = usize::try_from(label).ok()?;
        self.mc_particles.as_ref()?.get(index)
    }

    #[must_use]
    pub fn track(&self, index: Option<usize>) -> Option<&RawTrack> {
        self.tracks.get(index?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filter_bits() {
        let track = RawTrack {
            filter_map: 0b1000_0000,
            ..RawTrack::default()
        };
        assert!(track.test_filter_bit(7));
        assert!(!track.test_filter_bit(5));
        assert!(track.test_filter_mask(128));
        assert!(!track.test_filter_mask(96));
    }

    #[test]
    fn test_its_layers() {
        let its = ItsInfo {
            layer_hits: 0b10_0001,
            ..ItsInfo::default()
        };
        assert!(its.has_point_on_layer(0));
        assert!(!its.has_point_on_layer(1));
        assert!(its.has_point_on_layer(5));
    }

    #[test]
    fn test_cos_pointing() {
        let v0 = RawV0 {
            prong_momenta: [
                ThreeVector::new(0.5, 0.1, 0.0),
                ThreeVector::new(0.5, -0.1, 0.0),
            ],
            decay_vertex: ThreeVector::new(3.0, 0.0, 0.0),
            ..RawV0::default()
        };
        assert_relative_eq!(v0.cos_pointing_angle(&ThreeVector::ZERO), 1.0);
        assert_relative_eq!(
            v0.cos_pointing_angle(&ThreeVector::new(6.0, 0.0, 0.0)),
            -1.0
        );
    }

    #[test]
    fn test_mc_mass_clamped() {
        let p = McParticle {
            momentum: ThreeVector::new(1.0, 0.0, 0.0),
            energy: 0.5,
            ..McParticle::default()
        };
        assert_relative_eq!(p.mass(), 0.0);
    }
}
