//! Normalised event multiplicity.
#![allow(clippy::cast_possible_truncation)]

use femtoaod_core::{CentralityEstimator, RawEvent, RawTrack};
use serde::{Deserialize, Serialize};

/// How the normalised multiplicity of an event is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplicityStrategy {
    /// Ten times the centrality percentile of the estimator.
    Centrality(CentralityEstimator),
    /// Count of good global tracks from the first pass.
    GlobalTracks,
    /// Standard reference multiplicity.
    Reference,
    /// Combined reference multiplicity in |η| < 0.8.
    ReferenceComb08,
    /// TPC-only reference multiplicity.
    TpcOnlyReference,
    /// Summed VZERO amplitude over the 64 channels.
    Vzero,
    /// Number of tracks flagged as primary candidates.
    PrimaryCandidates,
}

impl Default for MultiplicityStrategy {
    fn default() -> Self {
        MultiplicityStrategy::Centrality(CentralityEstimator::V0M)
    }
}

impl MultiplicityStrategy {
    /// Whether this is the V0M centrality strategy the pre-selection window
    /// applies to.
    #[must_use]
    pub fn is_v0m_centrality(self) -> bool {
        self == MultiplicityStrategy::Centrality(CentralityEstimator::V0M)
    }
}

/// Counts gathered in the first pass over the tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackCounts {
    /// Tracks flagged as primary candidates (all tracks).
    pub primary_candidates: i32,
    /// Selected tracks passing the global-track quality cuts.
    pub global: i32,
}

/// Quality cuts of the global-track count.
#[must_use]
pub fn is_global_count_track(track: &RawTrack) -> bool {
    let pt = track.pt();
    track.chi2_per_ndf < 4.0
        && (0.15..20.0).contains(&pt)
        && track.tpc.n_clusters > 70
        && track.eta().abs() < 0.8
}

/// Normalised multiplicity of `event`.
///
/// Without centrality information every strategy falls back to the number
/// of primary candidates.
#[must_use]
pub fn resolve(event: &RawEvent, strategy: MultiplicityStrategy, counts: &TrackCounts) -> i32 {
    let Some(centrality) = event.centrality.as_ref() else {
        return counts.primary_candidates;
    };
    match strategy {
        MultiplicityStrategy::Centrality(estimator) => {
            round_half_even(10.0 * centrality.get(estimator))
        }
        MultiplicityStrategy::GlobalTracks => counts.global,
        MultiplicityStrategy::Reference => event.header.ref_mult,
        MultiplicityStrategy::ReferenceComb08 => event.header.ref_mult_comb08,
        MultiplicityStrategy::TpcOnlyReference => event.header.tpc_only_ref_mult,
        MultiplicityStrategy::Vzero => {
            let total: f64 = event.vzero.multiplicity.iter().take(64).sum();
            round_half_even(total)
        }
        MultiplicityStrategy::PrimaryCandidates => counts.primary_candidates,
    }
}

fn round_half_even(x: f64) -> i32 {
    x.round_ties_even() as i32
}
