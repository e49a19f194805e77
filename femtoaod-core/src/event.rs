//! Reconstructed (output) event model.

use crate::helix::Helix;
use crate::raw::{CentralityPercentiles, ZdcEnergies};
use crate::species::Species;
use crate::vector::{FourVector, ThreeVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value written into TOF-derived fields when TOF information is unusable.
pub const TOF_SENTINEL: f64 = -1000.0;

/// Value written into DCA fields that cannot be computed.
pub const DCA_SENTINEL: f64 = -999.0;

/// Number of points in the fixed-radius trajectory sample.
pub const TRAJECTORY_POINTS: usize = 9;

/// Trajectory sample at the fixed TPC radii.
pub type Trajectory = [ThreeVector; TRAJECTORY_POINTS];

/// n-σ values for every [`Species`], in [`Species::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NSigma(pub [f64; 8]);

impl NSigma {
    /// Every entry set to `value`.
    #[must_use]
    pub const fn filled(value: f64) -> Self {
        Self([value; 8])
    }

    #[must_use]
    pub fn get(&self, species: Species) -> f64 {
        self.0[species_index(species)]
    }

    pub fn set(&mut self, species: Species, value: f64) {
        self.0[species_index(species)] = value;
    }
}

impl Default for NSigma {
    fn default() -> Self {
        Self::filled(0.0)
    }
}

fn species_index(species: Species) -> usize {
    match species {
        Species::Electron => 0,
        Species::Pion => 1,
        Species::Kaon => 2,
        Species::Proton => 3,
        Species::Deuteron => 4,
        Species::Triton => 5,
        Species::He3 => 6,
        Species::Alpha => 7,
    }
}

/// TOF-derived PID quantities of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TofPid {
    pub n_sigma: NSigma,
    /// Measured minus expected time, pion hypothesis (ps).
    pub time_pion: f64,
    pub time_kaon: f64,
    pub time_proton: f64,
    /// Raw TOF signal.
    pub signal: f64,
    /// β in units of c.
    pub velocity: f64,
    /// Mass squared from β and p (GeV²/c⁴).
    pub mass2: f64,
}

impl TofPid {
    /// Block with every derived field set to [`TOF_SENTINEL`].
    #[must_use]
    pub const fn unavailable(signal: f64) -> Self {
        Self {
            n_sigma: NSigma::filled(TOF_SENTINEL),
            time_pion: TOF_SENTINEL,
            time_kaon: TOF_SENTINEL,
            time_proton: TOF_SENTINEL,
            signal,
            velocity: TOF_SENTINEL,
            mass2: TOF_SENTINEL,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.time_pion != TOF_SENTINEL
    }
}

impl Default for TofPid {
    fn default() -> Self {
        Self::unavailable(0.0)
    }
}

/// PID block of a converted track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPid {
    /// Detector probabilities for e, μ, π, K, p.
    pub probabilities: [f64; 5],
    pub n_sigma_tpc: NSigma,
    pub tpc_signal: f64,
    pub tpc_signal_n: i32,
    pub tof: TofPid,
}

/// TPC quality block.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TpcQuality {
    pub chi2: f64,
    pub n_clusters: i32,
    pub n_findable: i32,
    pub n_crossed_rows: f64,
    pub cluster_map: [u64; 3],
    pub shared_map: [u64; 3],
    pub inner_momentum: f64,
}

/// ITS quality block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItsQuality {
    pub chi2: f64,
    pub n_clusters: i32,
    pub layer_hits: u8,
}

/// Distance of closest approach to the primary vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackDca {
    pub xy: f64,
    pub z: f64,
}

/// Origin classification of a simulated particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecayOrigin {
    Primary,
    WeakDecay,
    Material,
    #[default]
    Unknown,
}

impl DecayOrigin {
    /// Numeric code used in downstream output (0, 1, 2, -1).
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            DecayOrigin::Primary => 0,
            DecayOrigin::WeakDecay => 1,
            DecayOrigin::Material => 2,
            DecayOrigin::Unknown => -1,
        }
    }
}

/// Simulated-truth annotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulatedTruth {
    pub pdg_code: i32,
    pub momentum: ThreeVector,
    /// Emission point in the event frame, scaled to fm-like units.
    pub emission_point: FourVector,
    /// Emission point relative to the primary vertex (cm, s).
    pub global_emission_point: FourVector,
    pub mass: f64,
    pub origin: DecayOrigin,
    pub mother_pdg: Option<i32>,
    pub mother_momentum: Option<ThreeVector>,
}

/// Truth for a composite candidate.
///
/// For cascades `positive` holds the V0 and `negative` the bachelor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompositeTruth {
    pub mother: SimulatedTruth,
    pub positive: SimulatedTruth,
    pub negative: SimulatedTruth,
}

/// Efficiency weights of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackWeights {
    pub pions_plus: f64,
    pub pions_minus: f64,
    pub kaons_plus: f64,
    pub kaons_minus: f64,
    pub protons_plus: f64,
    pub protons_minus: f64,
    pub deuterons_plus: f64,
    pub deuterons_minus: f64,
    pub tritons_plus: f64,
    pub tritons_minus: f64,
    pub he3_plus: f64,
    pub he3_minus: f64,
    pub alphas_plus: f64,
    pub alphas_minus: f64,
    pub all: f64,
}

impl TrackWeights {
    #[must_use]
    pub fn as_array(&self) -> [f64; 15] {
        [
            self.pions_plus,
            self.pions_minus,
            self.kaons_plus,
            self.kaons_minus,
            self.protons_plus,
            self.protons_minus,
            self.deuterons_plus,
            self.deuterons_minus,
            self.tritons_plus,
            self.tritons_minus,
            self.he3_plus,
            self.he3_minus,
            self.alphas_plus,
            self.alphas_minus,
            self.all,
        ]
    }
}

impl Default for TrackWeights {
    fn default() -> Self {
        Self {
            pions_plus: 1.0,
            pions_minus: 1.0,
            kaons_plus: 1.0,
            kaons_minus: 1.0,
            protons_plus: 1.0,
            protons_minus: 1.0,
            deuterons_plus: 1.0,
            deuterons_minus: 1.0,
            tritons_plus: 1.0,
            tritons_minus: 1.0,
            he3_plus: 1.0,
            he3_minus: 1.0,
            alphas_plus: 1.0,
            alphas_minus: 1.0,
            all: 1.0,
        }
    }
}

/// Efficiency weights of a V0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct V0Weights {
    pub lambda: f64,
    pub anti_lambda: f64,
    pub k0_short: f64,
}

impl Default for V0Weights {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            anti_lambda: 1.0,
            k0_short: 1.0,
        }
    }
}

/// Efficiency weights of a cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XiWeights {
    pub xi_plus: f64,
    pub xi_minus: f64,
}

impl Default for XiWeights {
    fn default() -> Self {
        Self {
            xi_plus: 1.0,
            xi_minus: 1.0,
        }
    }
}

/// Converted track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconstructedTrack {
    pub id: i32,
    pub charge: i32,
    pub momentum: ThreeVector,
    pub helix: Helix,
    pub status: u64,
    pub filter_map: u32,
    pub label: i32,
    pub dca: TrackDca,
    pub chi2_per_ndf: f64,
    pub tpc: TpcQuality,
    pub its: ItsQuality,
    pub pid: TrackPid,
    pub trajectory: Trajectory,
    /// Position at the shift radius relative to the primary vertex.
    pub shifted_position: Option<ThreeVector>,
    pub weights: TrackWeights,
    pub multiplicity: i32,
    pub vertex_z: f64,
    pub truth: Option<SimulatedTruth>,
}

impl ReconstructedTrack {
    #[must_use]
    pub fn pt(&self) -> f64 {
        self.momentum.perp()
    }

    #[must_use]
    pub fn tpc_entrance(&self) -> ThreeVector {
        self.trajectory[0]
    }

    #[must_use]
    pub fn tpc_exit(&self) -> ThreeVector {
        self.trajectory[TRAJECTORY_POINTS - 1]
    }
}

/// TOF block of a V0/cascade daughter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DaughterTof {
    pub n_sigma_kaon: f64,
    pub n_sigma_proton: f64,
    pub n_sigma_pion: f64,
    pub time_kaon: f64,
    pub time_proton: f64,
    pub time_pion: f64,
}

impl DaughterTof {
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            n_sigma_kaon: TOF_SENTINEL,
            n_sigma_proton: TOF_SENTINEL,
            n_sigma_pion: TOF_SENTINEL,
            time_kaon: TOF_SENTINEL,
            time_proton: TOF_SENTINEL,
            time_pion: TOF_SENTINEL,
        }
    }
}

impl Default for DaughterTof {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Daughter (or bachelor) summary of a composite candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Daughter {
    pub id: i32,
    pub eta: f64,
    pub pt: f64,
    /// Magnitude of the prong momentum at the decay vertex.
    pub p_total: f64,
    pub prong_momentum: ThreeVector,
    pub dca_to_primary: f64,
    pub tpc_clusters: i32,
    pub cluster_map: [u64; 3],
    pub shared_map: [u64; 3],
    pub chi2_per_ndf: f64,
    pub status: u64,
    pub n_sigma_tpc_kaon: f64,
    pub n_sigma_tpc_proton: f64,
    pub n_sigma_tpc_pion: f64,
    pub tof: DaughterTof,
    pub trajectory: Trajectory,
    pub shifted_position: Option<ThreeVector>,
    pub inner_momentum: f64,
    pub dedx: f64,
}

impl Daughter {
    #[must_use]
    pub fn tpc_entrance(&self) -> ThreeVector {
        self.trajectory[0]
    }

    #[must_use]
    pub fn tpc_exit(&self) -> ThreeVector {
        self.trajectory[TRAJECTORY_POINTS - 1]
    }
}

/// Converted V0.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct V0Candidate {
    pub positive: Daughter,
    pub negative: Daughter,
    pub decay_vertex: ThreeVector,
    pub decay_length: f64,
    pub radius: f64,
    pub dca_daughters: f64,
    pub dca_to_primary: f64,
    pub momentum: ThreeVector,
    pub pt: f64,
    pub p_total: f64,
    pub eta: f64,
    pub phi: f64,
    pub cos_pointing: f64,
    pub alpha_arm: f64,
    pub pt_arm: f64,
    pub energy_lambda: f64,
    pub energy_k0_short: f64,
    /// Energy of the positive daughter as a proton.
    pub energy_pos_proton: f64,
    /// Energy of the negative daughter as a proton.
    pub energy_neg_proton: f64,
    pub mass_lambda: f64,
    pub mass_anti_lambda: f64,
    pub mass_k0_short: f64,
    pub rapidity_lambda: f64,
    pub rapidity_k0_short: f64,
    pub on_fly: bool,
    pub weights: V0Weights,
    pub multiplicity: i32,
    pub vertex_z: f64,
    pub truth: Option<CompositeTruth>,
}

/// Converted cascade.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XiCandidate {
    pub v0: V0Candidate,
    pub bachelor: Daughter,
    pub decay_vertex: ThreeVector,
    /// Cascade decay length from the primary vertex.
    pub decay_length: f64,
    /// V0 decay length measured from the cascade vertex.
    pub v0_decay_length: f64,
    pub dca_to_primary: f64,
    pub dca_v0_bachelor: f64,
    pub momentum: ThreeVector,
    pub pt: f64,
    pub p_total: f64,
    pub eta: f64,
    pub phi: f64,
    pub cos_pointing: f64,
    pub cos_pointing_v0_to_xi: f64,
    pub radius: f64,
    pub charge: i32,
    pub mass_xi: f64,
    pub mass_omega: f64,
    pub weights: XiWeights,
    pub truth: Option<CompositeTruth>,
}

/// Converted event.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconstructedEvent {
    pub run_number: i32,
    /// Field in tesla.
    pub magnetic_field: f64,
    pub primary_vertex: ThreeVector,
    pub reaction_plane_angle: f64,
    pub centrality: CentralityPercentiles,
    pub normalized_multiplicity: i32,
    pub trigger_mask: u64,
    pub trigger_cluster: u8,
    pub zdc: ZdcEnergies,
    pub n_tracks: usize,
    pub tracks: Vec<ReconstructedTrack>,
    pub v0s: Vec<V0Candidate>,
    pub xis: Vec<XiCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_neutral() {
        assert!(TrackWeights::default().as_array().iter().all(|w| *w == 1.0));
        assert_eq!(V0Weights::default().k0_short, 1.0);
        assert_eq!(XiWeights::default().xi_minus, 1.0);
    }

    #[test]
    fn test_unavailable_tof() {
        let tof = TofPid::unavailable(123.0);
        assert!(!tof.is_available());
        assert!(tof.n_sigma.0.iter().all(|v| *v == TOF_SENTINEL));
        assert_eq!(tof.signal, 123.0);
    }

    #[test]
    fn test_nsigma_access() {
        let mut n = NSigma::default();
        n.set(Species::He3, 2.5);
        assert_eq!(n.get(Species::He3), 2.5);
        assert_eq!(n.0[6], 2.5);
    }

    #[test]
    fn test_decay_origin_codes() {
        assert_eq!(DecayOrigin::Primary.code(), 0);
        assert_eq!(DecayOrigin::Unknown.code(), -1);
    }
}
