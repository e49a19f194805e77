//! Collaborator interfaces consumed by the reader.
//!
//! The reader never implements event-quality cuts or detector response
//! itself; it asks these traits. Simple implementations working from data
//! already stored in the raw event are provided for standalone use.

use std::fmt::Debug;

use crate::raw::{McHeader, McParticle, RawEvent, RawTrack, Vertex};
use crate::species::Species;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mode in which the event-quality cut object is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Standard physics selection.
    Standard,
    /// High-multiplicity trigger selection (pp).
    HighMultiplicityTrigger,
    /// TPC pile-up from the ITS-TPC cluster correlation.
    TpcPileupItsTpcClusterCorrelation,
    /// Out-of-bunch pile-up from the V0 centrality vs TPC track correlation.
    TpcPileupV0CentralityTpcTracks,
}

/// Event-quality cut evaluator.
pub trait EventSelector: Debug + Send + Sync {
    /// Whether `event` passes the selection in `mode`.
    fn accept(&self, event: &RawEvent, mode: SelectionMode) -> bool;

    /// Primary vertex as seen by the selection.
    fn primary_vertex<'a>(&self, event: &'a RawEvent) -> Option<&'a Vertex> {
        event.primary_vertex.as_ref()
    }
}

/// Settings forwarded to [`PileUpUtils::is_pile_up`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PileUpSettings {
    pub min_vertex_contributors: i32,
    pub use_multi_vertexer: bool,
    pub use_out_of_bunch: bool,
    pub min_pileup_contributors: i32,
    /// Minimum z distance between primary and pile-up vertex (cm).
    pub min_z_distance: f64,
}

impl Default for PileUpSettings {
    fn default() -> Self {
        Self {
            min_vertex_contributors: 1,
            use_multi_vertexer: false,
            use_out_of_bunch: false,
            min_pileup_contributors: 3,
            min_z_distance: 0.8,
        }
    }
}

/// Analysis-utility pile-up and vertex checks.
pub trait PileUpUtils: Debug + Send + Sync {
    fn is_pile_up(&self, event: &RawEvent, settings: &PileUpSettings) -> bool;

    fn is_vertex_selected_2013_pa(&self, event: &RawEvent) -> bool;

    /// Whether the simulated event contains more than one collision from
    /// `generator`.
    fn is_pileup_in_generated_event(&self, header: &McHeader, generator: &str) -> bool;

    /// Whether the particle at `label` was produced in a pile-up collision.
    fn is_particle_from_out_of_bunch_pileup(
        &self,
        label: i32,
        header: &McHeader,
        particles: &[McParticle],
    ) -> bool;
}

/// Detector PID response.
pub trait PidResponse: Debug + Send + Sync {
    fn n_sigma_tpc(&self, track: &RawTrack, species: Species) -> f64;

    fn n_sigma_tof(&self, track: &RawTrack, species: Species) -> f64;

    fn tof_mismatch_probability(&self, track: &RawTrack) -> f64;

    /// TOF event start time evaluated at the track momentum (ps).
    fn tof_start_time(&self, track: &RawTrack) -> f64;
}

/// PID response reading the values stored with each track.
///
/// Tracks without stored PID report n-σ of `-999` and a mismatch
/// probability of 1, so their TOF information is never used.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredPidResponse;

impl StoredPidResponse {
    const MISSING: f64 = -999.0;

    fn index(species: Species) -> usize {
        Species::ALL
            .iter()
            .position(|s| *s == species)
            .unwrap_or_default()
    }
}

impl PidResponse for StoredPidResponse {
    fn n_sigma_tpc(&self, track: &RawTrack, species: Species) -> f64 {
        track
            .stored_pid
            .map_or(Self::MISSING, |pid| pid.n_sigma_tpc[Self::index(species)])
    }

    fn n_sigma_tof(&self, track: &RawTrack, species: Species) -> f64 {
        track
            .stored_pid
            .map_or(Self::MISSING, |pid| pid.n_sigma_tof[Self::index(species)])
    }

    fn tof_mismatch_probability(&self, track: &RawTrack) -> f64 {
        track
            .stored_pid
            .map_or(1.0, |pid| pid.tof_mismatch_probability)
    }

    fn tof_start_time(&self, track: &RawTrack) -> f64 {
        track.stored_pid.map_or(0.0, |pid| pid.tof_start_time)
    }
}

/// Pile-up checks from the vertices and generator header of the event.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexPileUpUtils;

impl PileUpUtils for VertexPileUpUtils {
    fn is_pile_up(&self, event: &RawEvent, settings: &PileUpSettings) -> bool {
        let Some(primary) = event.primary_vertex.as_ref() else {
            return false;
        };
        if primary.n_contributors < settings.min_vertex_contributors {
            return false;
        }
        event.pileup_vertices.iter().any(|v| {
            v.n_contributors >= settings.min_pileup_contributors
                && (v.position.z - primary.position.z).abs() > settings.min_z_distance
        })
    }

    fn is_vertex_selected_2013_pa(&self, event: &RawEvent) -> bool {
        let (Some(primary), Some(spd)) = (event.primary_vertex.as_ref(), event.spd_vertex.as_ref())
        else {
            return false;
        };
        primary.n_contributors >= 1
            && spd.n_contributors >= 1
            && spd.sigma2_z().sqrt() < 0.25
            && (spd.position.z - primary.position.z).abs() <= 0.5
            && primary.position.z.abs() < 10.0
    }

    fn is_pileup_in_generated_event(&self, header: &McHeader, generator: &str) -> bool {
        header
            .generators
            .iter()
            .filter(|name| name.contains(generator))
            .count()
            > 1
    }

    fn is_particle_from_out_of_bunch_pileup(
        &self,
        label: i32,
        header: &McHeader,
        particles: &[McParticle],
    ) -> bool {
        let index = label.unsigned_abs() as usize;
        if index >= particles.len() || header.n_signal <= 0 {
            return false;
        }
        label.unsigned_abs() >= header.n_signal.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::StoredPid;
    use crate::vector::ThreeVector;

    #[test]
    fn test_stored_pid_response() {
        let mut pid = StoredPid::default();
        pid.n_sigma_tpc[2] = 1.5;
        pid.tof_mismatch_probability = 0.02;
        let track = RawTrack {
            stored_pid: Some(pid),
            ..RawTrack::default()
        };
        let response = StoredPidResponse;
        assert_eq!(response.n_sigma_tpc(&track, Species::Kaon), 1.5);
        assert_eq!(response.tof_mismatch_probability(&track), 0.02);
        assert_eq!(
            response.n_sigma_tof(&RawTrack::default(), Species::Pion),
            -999.0
        );
        assert_eq!(response.tof_mismatch_probability(&RawTrack::default()), 1.0);
    }

    #[test]
    fn test_vertex_pile_up() {
        let mut event = RawEvent {
            primary_vertex: Some(Vertex::new(ThreeVector::new(0.0, 0.0, 1.0), 20)),
            ..RawEvent::default()
        };
        let utils = VertexPileUpUtils;
        let settings = PileUpSettings::default();
        assert!(!utils.is_pile_up(&event, &settings));
        event
            .pileup_vertices
            .push(Vertex::new(ThreeVector::new(0.0, 0.0, 3.0), 5));
        assert!(utils.is_pile_up(&event, &settings));
    }

    #[test]
    fn test_generated_pile_up() {
        let header = McHeader {
            generators: vec!["Hijing_0".into(), "Pythia_1".into(), "Hijing_2".into()],
            ..McHeader::default()
        };
        assert!(VertexPileUpUtils.is_pileup_in_generated_event(&header, "Hijing"));
        assert!(!VertexPileUpUtils.is_pileup_in_generated_event(&header, "Pythia"));
    }
}
