//! Reader configuration.
//!
//! Built either programmatically through the `with_*` methods or from a
//! JSON document (see [`ReaderConfig::from_json`]).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use femtoaod_core::{BinnedTable1D, BinnedTable4D, PileUpSettings, Species};
use serde::{Deserialize, Serialize};

use crate::corrections::{CorrectionSpecies, CorrectionTables};
use crate::curves::{ParametricCurve, PileUpCurves};
use crate::error::{Error, Result};
use crate::legacy::LegacyYear;
use crate::multiplicity::MultiplicityStrategy;

/// Default V0M percentile ceiling of the pp high-multiplicity selection.
pub const DEFAULT_HIGH_MULTIPLICITY_THRESHOLD: f64 = 0.17;

/// How the DCA of a track to the primary vertex is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DcaMode {
    /// Values stored with the track upstream.
    #[default]
    Stored,
    /// Track reference point minus primary vertex.
    VertexRelative,
    /// Helix propagation of the track parametrisation to the vertex.
    TpcPropagated,
}

/// Source of the reaction-plane angle when the event carries an event plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPlaneSource {
    /// Second-harmonic plane from the V0 scintillators.
    #[default]
    Vzero,
    /// TPC Q-vector plane.
    Q,
}

/// V0M centrality window in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralityRange {
    pub low: f64,
    pub high: f64,
}

impl CentralityRange {
    #[must_use]
    pub fn contains(&self, percentile: f64) -> bool {
        percentile >= self.low && percentile <= self.high
    }
}

/// Jet-like event selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JetSelection {
    /// Minimum pt of the leading track (GeV/c).
    pub seed_pt: f64,
}

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Filter bit index a track must carry.
    pub filter_bit: Option<u8>,
    /// Filter mask a track must overlap, 0 for none.
    pub filter_mask: u32,
    pub read_mc: bool,
    /// Also attach truth to tracks with negative (fake) labels.
    pub read_full_mc: bool,
    pub read_v0: bool,
    pub read_cascade: bool,
    pub multiplicity: MultiplicityStrategy,
    /// V0M window used by the pre-selection and after the legacy procedure.
    pub centrality_range: Option<CentralityRange>,
    pub centrality_preselection: bool,
    /// Ask the event selector in standard mode.
    pub use_event_cuts: bool,
    pub legacy_year: Option<LegacyYear>,
    /// V0M ceiling of the pp high-multiplicity selection, `None` when off.
    pub high_multiplicity_pp: Option<f64>,
    pub reject_tpc_pileup: bool,
    pub reject_out_of_bunch_v0_tpc: bool,
    pub vertex_selection_2013_pa: bool,
    pub reject_pile_up: bool,
    pub pile_up: PileUpSettings,
    pub reject_generated_pile_up: bool,
    pub track_pile_up_removal: bool,
    pub v0_pile_up_removal: bool,
    pub cascade_pile_up_removal: bool,
    pub reject_out_of_bunch_tracks: bool,
    pub dca_mode: DcaMode,
    /// Truth species a track must match; empty disables the filter.
    pub species: Vec<Species>,
    pub corrections: CorrectionTables,
    pub jets: Option<JetSelection>,
    pub flatten_centrality: bool,
    /// Radius of the shifted projection in metres.
    pub shift_radius: Option<f64>,
    pub correct_tpc_points: bool,
    /// Polarity of the nominal field used for the TPC sample.
    pub mag_field_sign: i32,
    pub event_plane: EventPlaneSource,
    /// Re-read PID from the TPC-only track itself in filter-bit-7 mode.
    pub pid_from_tpc_only: bool,
    /// Seed of the flattening generator; entropy when `None`.
    pub seed: Option<u64>,
    pub curves_2015: PileUpCurves,
    pub curves_2018: PileUpCurves,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            filter_bit: None,
            filter_mask: 0,
            read_mc: false,
            read_full_mc: false,
            read_v0: false,
            read_cascade: false,
            multiplicity: MultiplicityStrategy::default(),
            centrality_range: None,
            centrality_preselection: false,
            use_event_cuts: false,
            legacy_year: None,
            high_multiplicity_pp: None,
            reject_tpc_pileup: false,
            reject_out_of_bunch_v0_tpc: false,
            vertex_selection_2013_pa: false,
            reject_pile_up: false,
            pile_up: PileUpSettings::default(),
            reject_generated_pile_up: false,
            track_pile_up_removal: false,
            v0_pile_up_removal: false,
            cascade_pile_up_removal: false,
            reject_out_of_bunch_tracks: false,
            dca_mode: DcaMode::default(),
            species: Vec::new(),
            corrections: CorrectionTables::default(),
            jets: None,
            flatten_centrality: false,
            shift_radius: None,
            correct_tpc_points: false,
            mag_field_sign: 1,
            event_plane: EventPlaneSource::default(),
            pid_from_tpc_only: false,
            seed: None,
            curves_2015: PileUpCurves::pass2_2015(),
            curves_2018: PileUpCurves::run2_2018(),
        }
    }
}

impl ReaderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter_bit(mut self, bit: u8) -> Self {
        self.filter_bit = Some(bit);
        self
    }

    #[must_use]
    pub fn with_filter_mask(mut self, mask: u32) -> Self {
        self.filter_mask = mask;
        self
    }

    #[must_use]
    pub fn with_read_mc(mut self, read: bool) -> Self {
        self.read_mc = read;
        self
    }

    #[must_use]
    pub fn with_read_full_mc(mut self, read: bool) -> Self {
        self.read_full_mc = read;
        self
    }

    #[must_use]
    pub fn with_read_v0(mut self, read: bool) -> Self {
        self.read_v0 = read;
        self
    }

    #[must_use]
    pub fn with_read_cascade(mut self, read: bool) -> Self {
        self.read_cascade = read;
        self
    }

    #[must_use]
    pub fn with_multiplicity(mut self, strategy: MultiplicityStrategy) -> Self {
        self.multiplicity = strategy;
        self
    }

    /// Sets the V0M window without enabling the pre-selection.
    #[must_use]
    pub fn with_centrality_range(mut self, low: f64, high: f64) -> Self {
        self.centrality_range = Some(CentralityRange { low, high });
        self
    }

    /// Enables the V0M pre-selection window; switches to V0M centrality.
    #[must_use]
    pub fn with_centrality_preselection(mut self, low: f64, high: f64) -> Self {
        self.centrality_range = Some(CentralityRange { low, high });
        self.centrality_preselection = true;
        self.multiplicity = MultiplicityStrategy::default();
        self
    }

    #[must_use]
    pub fn with_event_cuts(mut self, enabled: bool) -> Self {
        self.use_event_cuts = enabled;
        self
    }

    #[must_use]
    pub fn with_legacy_year(mut self, year: LegacyYear) -> Self {
        self.legacy_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_high_multiplicity_pp(mut self, threshold: f64) -> Self {
        self.high_multiplicity_pp = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_tpc_pileup_rejection(mut self, enabled: bool) -> Self {
        self.reject_tpc_pileup = enabled;
        self
    }

    #[must_use]
    pub fn with_out_of_bunch_v0_tpc_rejection(mut self, enabled: bool) -> Self {
        self.reject_out_of_bunch_v0_tpc = enabled;
        self
    }

    #[must_use]
    pub fn with_vertex_selection_2013_pa(mut self, enabled: bool) -> Self {
        self.vertex_selection_2013_pa = enabled;
        self
    }

    #[must_use]
    pub fn with_pile_up_rejection(mut self, settings: PileUpSettings) -> Self {
        self.reject_pile_up = true;
        self.pile_up = settings;
        self
    }

    #[must_use]
    pub fn with_generated_pile_up_rejection(mut self, enabled: bool) -> Self {
        self.reject_generated_pile_up = enabled;
        self
    }

    #[must_use]
    pub fn with_track_pile_up_removal(mut self, enabled: bool) -> Self {
        self.track_pile_up_removal = enabled;
        self
    }

    #[must_use]
    pub fn with_v0_pile_up_removal(mut self, enabled: bool) -> Self {
        self.v0_pile_up_removal = enabled;
        self
    }

    #[must_use]
    pub fn with_cascade_pile_up_removal(mut self, enabled: bool) -> Self {
        self.cascade_pile_up_removal = enabled;
        self
    }

    #[must_use]
    pub fn with_out_of_bunch_track_rejection(mut self, enabled: bool) -> Self {
        self.reject_out_of_bunch_tracks = enabled;
        self
    }

    #[must_use]
    pub fn with_dca_mode(mut self, mode: DcaMode) -> Self {
        self.dca_mode = mode;
        self
    }

    /// Keeps only tracks whose truth matches `species`.
    #[must_use]
    pub fn with_species(mut self, species: Species) -> Self {
        if !self.species.contains(&species) {
            self.species.push(species);
        }
        self
    }

    #[must_use]
    pub fn with_corrections(mut self, corrections: CorrectionTables) -> Self {
        self.corrections = corrections;
        self
    }

    #[must_use]
    pub fn with_jets(mut self, seed_pt: f64) -> Self {
        self.jets = Some(JetSelection { seed_pt });
        self
    }

    #[must_use]
    pub fn with_centrality_flattening(mut self, enabled: bool) -> Self {
        self.flatten_centrality = enabled;
        self
    }

    #[must_use]
    pub fn with_shift_radius(mut self, radius_m: f64) -> Self {
        self.shift_radius = Some(radius_m);
        self
    }

    #[must_use]
    pub fn with_tpc_point_correction(mut self, enabled: bool) -> Self {
        self.correct_tpc_points = enabled;
        self
    }

    #[must_use]
    pub fn with_mag_field_sign(mut self, sign: i32) -> Self {
        self.mag_field_sign = sign;
        self
    }

    #[must_use]
    pub fn with_event_plane(mut self, source: EventPlaneSource) -> Self {
        self.event_plane = source;
        self
    }

    #[must_use]
    pub fn with_pid_from_tpc_only(mut self, enabled: bool) -> Self {
        self.pid_from_tpc_only = enabled;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether tracks are TPC-only copies whose PID lives on the companion
    /// global track.
    #[must_use]
    pub fn tpc_only_mode(&self) -> bool {
        self.filter_bit == Some(7) || self.filter_mask == 128
    }

    /// Whether some option needs an event selector to be installed.
    #[must_use]
    pub fn needs_event_selector(&self) -> bool {
        self.use_event_cuts
            || self.high_multiplicity_pp.is_some()
            || self.reject_tpc_pileup
            || self.reject_out_of_bunch_v0_tpc
    }

    /// Curves of the legacy procedure for `year`.
    #[must_use]
    pub fn curves(&self, year: LegacyYear) -> &PileUpCurves {
        match year {
            LegacyYear::Pass2015 => &self.curves_2015,
            LegacyYear::Run2018 => &self.curves_2018,
        }
    }

    /// Checks option values for consistency.
    pub fn validate(&self) -> Result<()> {
        if let Some(bit) = self.filter_bit {
            if bit >= 32 {
                return Err(Error::ConfigError(format!(
                    "filter bit {bit} outside the 32-bit filter map"
                )));
            }
        }
        if let Some(range) = self.centrality_range {
            if !(range.low <= range.high) {
                return Err(Error::ConfigError(format!(
                    "empty centrality range [{}, {}]",
                    range.low, range.high
                )));
            }
        }
        if let Some(radius) = self.shift_radius {
            if !(radius > 0.0) {
                return Err(Error::ConfigError(format!(
                    "shift radius must be positive, got {radius}"
                )));
            }
        }
        if self.mag_field_sign == 0 {
            return Err(Error::ConfigError("magnetic field sign must be ±1".into()));
        }
        if self.species.len() > 1 {
            log::warn!(
                "{} truth species requested; a track can match only one, none will pass",
                self.species.len()
            );
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json_config: JsonConfig = serde_json::from_reader(reader)?;
        Self::from_json_config(json_config)
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let json_config: JsonConfig = serde_json::from_str(json)?;
        Self::from_json_config(json_config)
    }

    fn from_json_config(json: JsonConfig) -> Result<Self> {
        let JsonConfig {
            tracks,
            event,
            mc,
            v0,
            cascade,
            corrections,
            pileup_curves,
        } = json;

        let legacy_year = event.legacy_year.map(LegacyYear::try_from).transpose()?;

        let mut tables = CorrectionTables::new();
        for entry in corrections {
            if let Some(table) = entry.one_d {
                table.validate()?;
                tables.set_1d(entry.species, Arc::new(table));
            }
            if let Some(table) = entry.four_d {
                table.validate()?;
                tables.set_4d(entry.species, Arc::new(table))?;
            }
        }

        let config = Self {
            filter_bit: tracks.filter_bit,
            filter_mask: tracks.filter_mask,
            read_mc: mc.read,
            read_full_mc: mc.full,
            read_v0: v0.read,
            read_cascade: cascade.read,
            multiplicity: event.multiplicity,
            centrality_range: event
                .centrality_range
                .map(|[low, high]| CentralityRange { low, high }),
            centrality_preselection: event.centrality_preselection,
            use_event_cuts: event.use_event_cuts,
            legacy_year,
            high_multiplicity_pp: event.high_multiplicity_pp,
            reject_tpc_pileup: event.reject_tpc_pileup,
            reject_out_of_bunch_v0_tpc: event.reject_out_of_bunch_v0_tpc,
            vertex_selection_2013_pa: event.vertex_selection_2013_pa,
            reject_pile_up: event.reject_pile_up,
            pile_up: event.pile_up,
            reject_generated_pile_up: mc.reject_generated_pile_up,
            track_pile_up_removal: tracks.pile_up_removal,
            v0_pile_up_removal: v0.pile_up_removal,
            cascade_pile_up_removal: cascade.pile_up_removal,
            reject_out_of_bunch_tracks: mc.reject_out_of_bunch_tracks,
            dca_mode: tracks.dca_mode,
            species: mc.species,
            corrections: tables,
            jets: event.jet_seed_pt.map(|seed_pt| JetSelection { seed_pt }),
            flatten_centrality: event.flatten_centrality,
            shift_radius: tracks.shift_radius,
            correct_tpc_points: tracks.correct_tpc_points,
            mag_field_sign: tracks.mag_field_sign,
            event_plane: event.event_plane,
            pid_from_tpc_only: tracks.pid_from_tpc_only,
            seed: event.seed,
            curves_2015: pileup_curves.pass2_2015.apply(PileUpCurves::pass2_2015()),
            curves_2018: pileup_curves.run2_2018.apply(PileUpCurves::run2_2018()),
        };
        config.validate()?;
        Ok(config)
    }
}

// Intermediate structs for the JSON schema
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct JsonConfig {
    tracks: JsonTracks,
    event: JsonEvent,
    mc: JsonMc,
    v0: JsonComposite,
    cascade: JsonComposite,
    corrections: Vec<JsonCorrection>,
    pileup_curves: JsonCurveSets,
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonTracks {
    filter_bit: Option<u8>,
    filter_mask: u32,
    dca_mode: DcaMode,
    pile_up_removal: bool,
    pid_from_tpc_only: bool,
    shift_radius: Option<f64>,
    correct_tpc_points: bool,
    mag_field_sign: i32,
}

impl Default for JsonTracks {
    fn default() -> Self {
        Self {
            filter_bit: None,
            filter_mask: 0,
            dca_mode: DcaMode::Stored,
            pile_up_removal: false,
            pid_from_tpc_only: false,
            shift_radius: None,
            correct_tpc_points: false,
            mag_field_sign: 1,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonEvent {
    multiplicity: MultiplicityStrategy,
    centrality_range: Option<[f64; 2]>,
    centrality_preselection: bool,
    use_event_cuts: bool,
    legacy_year: Option<i32>,
    high_multiplicity_pp: Option<f64>,
    reject_tpc_pileup: bool,
    reject_out_of_bunch_v0_tpc: bool,
    vertex_selection_2013_pa: bool,
    reject_pile_up: bool,
    pile_up: PileUpSettings,
    jet_seed_pt: Option<f64>,
    flatten_centrality: bool,
    event_plane: EventPlaneSource,
    seed: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonMc {
    read: bool,
    full: bool,
    species: Vec<Species>,
    reject_generated_pile_up: bool,
    reject_out_of_bunch_tracks: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonComposite {
    read: bool,
    pile_up_removal: bool,
}

#[derive(Deserialize)]
struct JsonCorrection {
    species: CorrectionSpecies,
    #[serde(default)]
    one_d: Option<BinnedTable1D>,
    #[serde(default)]
    four_d: Option<BinnedTable4D>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonCurveSets {
    #[serde(rename = "2015")]
    pass2_2015: JsonCurves,
    #[serde(rename = "2018")]
    run2_2018: JsonCurves,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonCurves {
    centrality_low: Option<ParametricCurve>,
    centrality_high: Option<ParametricCurve>,
    its_clusters: Option<ParametricCurve>,
    v0_charge: Option<ParametricCurve>,
    fb32_multiplicity: Option<ParametricCurve>,
}

impl JsonCurves {
    /// Replaces the curves given in JSON, keeping the calibrated rest.
    fn apply(self, mut curves: PileUpCurves) -> PileUpCurves {
        if let Some(c) = self.centrality_low {
            curves.centrality_low = Arc::new(c);
        }
        if let Some(c) = self.centrality_high {
            curves.centrality_high = Arc::new(c);
        }
        if let Some(c) = self.its_clusters {
            curves.its_clusters = Arc::new(c);
        }
        if let Some(c) = self.v0_charge {
            curves.v0_charge = Arc::new(c);
        }
        if let Some(c) = self.fb32_multiplicity {
            curves.fb32_multiplicity = Arc::new(c);
        }
        curves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrections::Kinematics;
    use femtoaod_core::{CentralityEstimator, ThresholdCurve};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.mag_field_sign, 1);
        assert_eq!(config.event_plane, EventPlaneSource::Vzero);
        assert!(config.multiplicity.is_v0m_centrality());
        assert!(config.corrections.is_empty());
        assert!(!config.tpc_only_mode());
        assert!(!config.needs_event_selector());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = ReaderConfig::new()
            .with_filter_bit(7)
            .with_read_v0(true)
            .with_multiplicity(MultiplicityStrategy::Reference)
            .with_centrality_preselection(0.0, 10.0)
            .with_high_multiplicity_pp(DEFAULT_HIGH_MULTIPLICITY_THRESHOLD)
            .with_species(Species::Kaon)
            .with_species(Species::Kaon);
        assert!(config.tpc_only_mode());
        assert!(config.read_v0);
        assert!(config.centrality_preselection);
        assert!(config.multiplicity.is_v0m_centrality());
        assert!(config.needs_event_selector());
        assert_eq!(config.species, vec![Species::Kaon]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ReaderConfig::new().with_filter_bit(40).validate().is_err());
        assert!(ReaderConfig::new().with_shift_radius(0.0).validate().is_err());
        assert!(ReaderConfig::new().with_mag_field_sign(0).validate().is_err());
        assert!(ReaderConfig::new()
            .with_centrality_range(20.0, 10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "tracks": {
                "filter_bit": 7,
                "dca_mode": "tpc_propagated",
                "pile_up_removal": true,
                "shift_radius": 1.25,
                "mag_field_sign": -1
            },
            "event": {
                "multiplicity": {"centrality": "CL1"},
                "centrality_range": [0.0, 10.0],
                "legacy_year": 3,
                "pile_up": {"min_z_distance": 1.0},
                "reject_pile_up": true,
                "jet_seed_pt": 5.0,
                "event_plane": "q",
                "seed": 42
            },
            "mc": {"read": true, "species": ["proton"]},
            "v0": {"read": true, "pile_up_removal": true},
            "corrections": [
                {
                    "species": "lambda",
                    "four_d": {
                        "axes": [
                            {"bins": 1, "low": -1.0, "high": 1.0},
                            {"bins": 1, "low": 0.0, "high": 10.0},
                            {"bins": 1, "low": -10.0, "high": 10.0},
                            {"bins": 1, "low": 0.0, "high": 7.0}
                        ],
                        "contents": [0.25]
                    }
                },
                {
                    "species": "xi_minus",
                    "one_d": {"axis": {"bins": 2, "low": 0.0, "high": 4.0}, "contents": [0.5, 0.9]}
                }
            ],
            "pileup_curves": {
                "2018": {"its_clusters": {"kind": "linear", "intercept": 100.0, "slope": 1.0}}
            }
        }"#;
        let config = ReaderConfig::from_json(json).expect("should parse");
        assert_eq!(config.filter_bit, Some(7));
        assert_eq!(config.dca_mode, DcaMode::TpcPropagated);
        assert!(config.track_pile_up_removal);
        assert_eq!(config.shift_radius, Some(1.25));
        assert_eq!(config.mag_field_sign, -1);
        assert_eq!(
            config.multiplicity,
            MultiplicityStrategy::Centrality(CentralityEstimator::CL1)
        );
        assert_eq!(
            config.centrality_range,
            Some(CentralityRange {
                low: 0.0,
                high: 10.0
            })
        );
        assert_eq!(config.legacy_year, Some(LegacyYear::Run2018));
        assert!(config.reject_pile_up);
        assert_eq!(config.pile_up.min_z_distance, 1.0);
        assert_eq!(config.pile_up.min_pileup_contributors, 3);
        assert_eq!(config.jets, Some(JetSelection { seed_pt: 5.0 }));
        assert_eq!(config.event_plane, EventPlaneSource::Q);
        assert_eq!(config.seed, Some(42));
        assert!(config.read_mc);
        assert_eq!(config.species, vec![Species::Proton]);
        assert!(config.read_v0 && config.v0_pile_up_removal);
        assert!(!config.read_cascade);

        let kin = Kinematics {
            eta: 0.0,
            pt: 3.0,
            z: 0.0,
            phi: 1.0,
        };
        assert_eq!(config.corrections.v0_weights(&kin).lambda, 4.0);
        assert_eq!(config.corrections.xi_weights(&kin).xi_minus, 0.9);

        assert_eq!(config.curves_2018.its_clusters.eval(10.0), 110.0);
        assert_eq!(config.curves_2015.its_clusters.eval(10.0), 489.0);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = ReaderConfig::from_json("{}").expect("should parse");
        assert_eq!(config.filter_bit, None);
        assert_eq!(config.mag_field_sign, 1);
        assert!(config.legacy_year.is_none());
    }

    #[test]
    fn test_bad_legacy_year() {
        let result = ReaderConfig::from_json(r#"{"event": {"legacy_year": 5}}"#);
        assert!(matches!(result, Err(Error::CoreError(_))));
    }

    #[test]
    fn test_four_d_for_one_d_species() {
        let json = r#"{"corrections": [{"species": "k0_short", "four_d": {
            "axes": [
                {"bins": 1, "low": -1.0, "high": 1.0},
                {"bins": 1, "low": 0.0, "high": 10.0},
                {"bins": 1, "low": -10.0, "high": 10.0},
                {"bins": 1, "low": 0.0, "high": 7.0}
            ],
            "contents": [0.5]}}]}"#;
        assert!(matches!(
            ReaderConfig::from_json(json),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_table_shape_checked() {
        let json = r#"{"corrections": [{"species": "pion_plus",
            "one_d": {"axis": {"bins": 3, "low": 0.0, "high": 1.0}, "contents": [1.0]}}]}"#;
        assert!(matches!(
            ReaderConfig::from_json(json),
            Err(Error::CoreError(_))
        ));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(ReaderConfig::from_json(r#"{"trackz": {}}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"tracks": {{"filter_mask": 128}}, "mc": {{"read": true}}}}"#).unwrap();
        let config = ReaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.filter_mask, 128);
        assert!(config.tpc_only_mode());
        assert!(config.read_mc);
    }
}
