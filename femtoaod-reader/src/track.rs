//! Track selection and conversion.
//!
//! An explicit first pass over the tracks builds the TPC-only to global
//! companion map, finds the jet seed, accumulates the transverse sphericity
//! and counts global tracks. The second pass converts tracks one by one.

use std::collections::HashMap;

use femtoaod_core::raw::status;
use femtoaod_core::{
    Helix, RawEvent, RawTrack, ReconstructedTrack, ThreeVector, TpcQuality, TrackDca, Vertex,
    DCA_SENTINEL,
};

use crate::config::{DcaMode, ReaderConfig};
use crate::context::EventContext;
use crate::corrections::Kinematics;
use crate::extrapolation::{correct_for_vertex, nominal_helix, shifted_position, tpc_trajectory};
use crate::multiplicity::{is_global_count_track, TrackCounts};
use crate::pid::{its_quality, track_pid};
use crate::truth::track_truth;

/// |η| acceptance of the jet seed and the sphericity tensor.
const JET_ETA: f64 = 0.8;
const SPHERICITY_MIN_PT: f64 = 0.5;
/// Accepted transverse sphericity range of jet events.
pub const SPHERICITY_RANGE: (f64, f64) = (1e-5, 0.1);

const JET_MAX_DPHI: f64 = 1.0;
const JET_MAX_DETA: f64 = 1.2;

/// Largest local X of the track parametrisation propagated to the vertex.
const MAX_PROPAGATION_LOCAL_X: f64 = 3.0;

/// Leading track of the event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JetAxis {
    pub pt: f64,
    pub phi: f64,
    pub eta: f64,
}

impl JetAxis {
    /// Whether `track` lies in the jet cone of a seed harder than `seed_pt`.
    ///
    /// The seed itself (Δφ = 0) is not part of the cone.
    #[must_use]
    pub fn selects(&self, track: &RawTrack, seed_pt: f64) -> bool {
        let dphi = (track.phi() - self.phi).abs();
        let deta = (track.eta() - self.eta).abs();
        self.pt > seed_pt && dphi < JET_MAX_DPHI && dphi != 0.0 && deta < JET_MAX_DETA
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SphericityTensor {
    sxx: f64,
    sxy: f64,
    syy: f64,
    sum_pt: f64,
    n: usize,
}

impl SphericityTensor {
    fn add(&mut self, track: &RawTrack) {
        let pt = track.pt();
        let phi = track.phi();
        let (px, py) = (pt * phi.cos(), pt * phi.sin());
        self.sxx += px * px / pt;
        self.sxy += px * py / pt;
        self.syy += py * py / pt;
        self.sum_pt += pt;
        self.n += 1;
    }

    /// 2 λ₂ / (λ₁ + λ₂) of the normalised tensor, 0 for two or fewer tracks.
    fn transverse_sphericity(&self) -> f64 {
        if self.n <= 2 || self.sum_pt == 0.0 {
            return 0.0;
        }
        let (a, b, d) = (
            self.sxx / self.sum_pt,
            self.sxy / self.sum_pt,
            self.syy / self.sum_pt,
        );
        let trace = a + d;
        if trace == 0.0 {
            return 0.0;
        }
        let half_gap = (((a - d) / 2.0).powi(2) + b * b).sqrt();
        let lambda2 = trace / 2.0 - half_gap;
        2.0 * lambda2 / trace
    }
}

/// Result of the first pass over the tracks.
#[derive(Debug, Clone, Default)]
pub struct FirstPass {
    /// Global track id to index, for tracks without the primary filter bit.
    pub companions: HashMap<i32, usize>,
    /// Jet seed, only when the jet selection is enabled.
    pub jet: Option<JetAxis>,
    pub sphericity: f64,
    pub counts: TrackCounts,
}

impl FirstPass {
    /// Whether the event survives the sphericity cut of the jet selection.
    #[must_use]
    pub fn sphericity_accepted(&self) -> bool {
        let (low, high) = SPHERICITY_RANGE;
        (low..=high).contains(&self.sphericity)
    }

    /// Global track the TPC-only track `track` was cloned from.
    #[must_use]
    pub fn companion<'e>(&self, event: &'e RawEvent, track: &RawTrack) -> Option<&'e RawTrack> {
        let key = (-1i32).checked_sub(track.id)?;
        let index = *self.companions.get(&key)?;
        event.tracks.get(index)
    }
}

/// Whether `track` carries the configured filter bit and mask.
#[must_use]
pub fn passes_filter(track: &RawTrack, config: &ReaderConfig) -> bool {
    if let Some(bit) = config.filter_bit {
        if !track.test_filter_bit(bit) {
            return false;
        }
    }
    config.filter_mask == 0 || track.test_filter_mask(config.filter_mask)
}

fn passes_jet(track: &RawTrack, config: &ReaderConfig, jet: Option<&JetAxis>) -> bool {
    match (config.jets, jet) {
        (Some(selection), Some(axis)) => axis.selects(track, selection.seed_pt),
        _ => true,
    }
}

/// Runs the first pass over the tracks of `event`.
#[must_use]
pub fn first_pass(event: &RawEvent, config: &ReaderConfig) -> FirstPass {
    let mut pass = FirstPass::default();
    let mut seed = JetAxis::default();
    let mut tensor = SphericityTensor::default();

    for (index, track) in event.tracks.iter().enumerate() {
        let bit_set = config
            .filter_bit
            .is_some_and(|bit| track.test_filter_bit(bit));
        if !bit_set && track.id >= 0 {
            pass.companions.insert(track.id, index);
        }
        if track.is_primary_candidate {
            pass.counts.primary_candidates += 1;
        }
        if config.jets.is_some() {
            let pt = track.pt();
            let eta = track.eta();
            if eta.abs() < JET_ETA {
                if pt > seed.pt {
                    seed = JetAxis {
                        pt,
                        phi: track.phi(),
                        eta,
                    };
                }
                if pt > SPHERICITY_MIN_PT {
                    tensor.add(track);
                }
            }
        }
    }

    if config.jets.is_some() {
        pass.jet = Some(seed);
        pass.sphericity = tensor.transverse_sphericity();
    }

    pass.counts.global = event
        .tracks
        .iter()
        .filter(|t| {
            passes_filter(t, config)
                && t.p() != 0.0
                && passes_jet(t, config, pass.jet.as_ref())
                && is_global_count_track(t)
        })
        .count()
        .try_into()
        .unwrap_or(i32::MAX);

    pass
}

/// Track pile-up removal: ITS refit and either an in-bunch TOF hit or an
/// ITS point on one of the two innermost layers.
#[must_use]
pub fn passes_track_pile_up(track: &RawTrack) -> bool {
    if !track.has_status(status::ITS_REFIT) {
        return false;
    }
    track.tof.bunch_crossing == 0
        || track.its.has_point_on_layer(0)
        || track.its.has_point_on_layer(1)
}

/// DCA of `source` to the primary vertex according to `mode`.
#[must_use]
pub fn track_dca(mode: DcaMode, source: &RawTrack, primary: &Vertex, field: f64) -> TrackDca {
    let unavailable = TrackDca {
        xy: DCA_SENTINEL,
        z: DCA_SENTINEL,
    };
    match mode {
        DcaMode::Stored => TrackDca {
            xy: source.dca.xy,
            z: source.dca.z,
        },
        DcaMode::VertexRelative => {
            let vertex = if primary.covariance[5] == 0.0 {
                ThreeVector::new(DCA_SENTINEL, DCA_SENTINEL, DCA_SENTINEL)
            } else {
                primary.position
            };
            let delta = source.position - vertex;
            TrackDca {
                xy: delta.perp(),
                z: delta.z,
            }
        }
        DcaMode::TpcPropagated => {
            if source.local_x > MAX_PROPAGATION_LOCAL_X {
                return unavailable;
            }
            let helix = Helix::new(source.position, source.momentum, source.charge, field);
            match helix.closest_approach(&primary.position) {
                Some(point) => {
                    let delta = point - primary.position;
                    TrackDca {
                        xy: delta.perp(),
                        z: delta.z,
                    }
                }
                None => unavailable,
            }
        }
    }
}

fn tpc_quality(track: &RawTrack) -> TpcQuality {
    TpcQuality {
        chi2: track.tpc.chi2,
        n_clusters: track.tpc.n_clusters,
        n_findable: track.tpc.n_findable,
        n_crossed_rows: track.tpc.n_crossed_rows,
        cluster_map: track.tpc.cluster_map,
        shared_map: track.tpc.shared_map,
        inner_momentum: track.tpc.inner_momentum,
    }
}

/// Converts one raw track, `None` when it is not selected.
#[must_use]
pub fn convert_track(
    ctx: &EventContext<'_>,
    pass: &FirstPass,
    raw: &RawTrack,
) -> Option<ReconstructedTrack> {
    let config = ctx.config;
    if !passes_filter(raw, config) || raw.p() == 0.0 {
        return None;
    }
    if !passes_jet(raw, config, pass.jet.as_ref()) {
        log::trace!("track {} outside the jet cone", raw.id);
        return None;
    }

    let source = if config.tpc_only_mode() {
        pass.companion(ctx.event, raw).unwrap_or_else(|| {
            log::debug!("no global companion for TPC-only track {}, using itself", raw.id);
            raw
        })
    } else {
        raw
    };

    if config.track_pile_up_removal && !passes_track_pile_up(source) {
        log::trace!("track {} removed as pile-up", raw.id);
        return None;
    }

    if config.reject_out_of_bunch_tracks {
        if let Some(mc) = ctx.mc {
            if let Some(header) = mc.header {
                if ctx
                    .pile_up
                    .is_particle_from_out_of_bunch_pileup(raw.label, header, mc.particles)
                {
                    log::trace!("track {} from out-of-bunch pile-up", raw.id);
                    return None;
                }
            }
        }
    }

    let pid_source = if config.pid_from_tpc_only && config.filter_bit == Some(7) {
        raw
    } else {
        source
    };

    let vertex = ctx.vertex();
    let truth = ctx
        .mc
        .map(|mc| track_truth(mc.particles, raw.label, config.read_full_mc, &vertex));

    if !config.species.is_empty() {
        let matches = truth.is_some_and(|t| {
            let pdg = t.pdg_code.abs();
            config.species.iter().all(|s| s.pdg_code() == pdg) && t.momentum.mag() > 0.0
        });
        if !matches {
            return None;
        }
    }

    let nominal = nominal_helix(raw, config.mag_field_sign);
    let mut trajectory = tpc_trajectory(&nominal);
    if config.correct_tpc_points {
        correct_for_vertex(&mut trajectory, &vertex);
    }
    let shifted = config
        .shift_radius
        .map(|radius| shifted_position(&nominal, radius, &vertex));

    let kinematics = Kinematics {
        eta: raw.eta(),
        pt: raw.pt(),
        z: raw.position.z,
        phi: raw.phi(),
    };

    Some(ReconstructedTrack {
        id: raw.id,
        charge: raw.charge,
        momentum: raw.momentum,
        helix: Helix::new(vertex, raw.momentum, raw.charge, ctx.field),
        status: raw.status,
        filter_map: raw.filter_map,
        label: raw.label,
        dca: track_dca(config.dca_mode, pid_source, &ctx.primary, ctx.field),
        chi2_per_ndf: raw.chi2_per_ndf,
        tpc: tpc_quality(raw),
        its: its_quality(pid_source),
        pid: track_pid(pid_source, ctx.pid, raw.p()),
        trajectory,
        shifted_position: shifted,
        weights: config.corrections.track_weights(&kinematics),
        multiplicity: ctx.multiplicity,
        vertex_z: vertex.z,
        truth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn track(id: i32, px: f64, py: f64, pz: f64) -> RawTrack {
        RawTrack {
            id,
            charge: 1,
            momentum: ThreeVector::new(px, py, pz),
            filter_map: 1 << 4,
            ..RawTrack::default()
        }
    }

    #[test]
    fn test_filter_bit_and_mask() {
        let t = track(0, 1.0, 0.0, 0.0);
        assert!(passes_filter(&t, &ReaderConfig::new()));
        assert!(passes_filter(&t, &ReaderConfig::new().with_filter_bit(4)));
        assert!(!passes_filter(&t, &ReaderConfig::new().with_filter_bit(7)));
        assert!(passes_filter(&t, &ReaderConfig::new().with_filter_mask(16 | 128)));
        assert!(!passes_filter(&t, &ReaderConfig::new().with_filter_mask(128)));
    }

    #[test]
    fn test_companion_map_skips_selected_tracks() {
        let mut tpc_only = track(-4, 1.0, 0.0, 0.0);
        tpc_only.filter_map = 1 << 7;
        let mut global = track(3, 1.0, 0.0, 0.0);
        global.filter_map = 1 << 5;
        let event = RawEvent {
            tracks: vec![tpc_only.clone(), global],
            ..RawEvent::default()
        };
        let config = ReaderConfig::new().with_filter_bit(7);
        let pass = first_pass(&event, &config);
        assert_eq!(pass.companions.get(&3), Some(&1));
        assert_eq!(pass.companions.len(), 1);
        assert_eq!(pass.companion(&event, &tpc_only).map(|t| t.id), Some(3));
        assert!(pass.companion(&event, &track(-9, 1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_counts() {
        let mut good = track(0, 0.5, 0.0, 0.1);
        good.chi2_per_ndf = 1.0;
        good.tpc.n_clusters = 100;
        good.is_primary_candidate = true;
        let zero = RawTrack {
            is_primary_candidate: true,
            ..good.clone()
        };
        let zero = RawTrack {
            momentum: ThreeVector::ZERO,
            ..zero
        };
        let event = RawEvent {
            tracks: vec![good, zero],
            ..RawEvent::default()
        };
        let pass = first_pass(&event, &ReaderConfig::new());
        assert_eq!(pass.counts.primary_candidates, 2);
        assert_eq!(pass.counts.global, 1);
        assert!(pass.jet.is_none());
    }

    #[test]
    fn test_jet_seed_and_cone() {
        let tracks = vec![
            track(0, 8.0, 0.0, 0.0),
            track(1, 1.0, 0.5, 0.0),
            track(2, -1.0, 0.0, 0.0),
            // hardest but outside |eta| < 0.8
            track(3, 10.0, 0.0, 20.0),
        ];
        let event = RawEvent {
            tracks,
            ..RawEvent::default()
        };
        let config = ReaderConfig::new().with_jets(5.0);
        let pass = first_pass(&event, &config);
        let axis = pass.jet.unwrap();
        assert_eq!(axis.pt, 8.0);
        assert!(!axis.selects(&event.tracks[0], 5.0));
        assert!(axis.selects(&event.tracks[1], 5.0));
        assert!(!axis.selects(&event.tracks[2], 5.0));
        assert!(!axis.selects(&event.tracks[1], 9.0));
    }

    #[test]
    fn test_sphericity() {
        // three back-to-back-ish tracks along x: pencil-like
        let pencil = RawEvent {
            tracks: vec![
                track(0, 3.0, 0.0, 0.0),
                track(1, -2.0, 0.0, 0.0),
                track(2, 1.0, 0.0, 0.0),
            ],
            ..RawEvent::default()
        };
        let config = ReaderConfig::new().with_jets(1.0);
        let pass = first_pass(&pencil, &config);
        assert_relative_eq!(pass.sphericity, 0.0, epsilon = 1e-12);
        assert!(!pass.sphericity_accepted());

        // isotropic in the transverse plane
        let round = RawEvent {
            tracks: vec![
                track(0, 1.0, 0.0, 0.0),
                track(1, 0.0, 1.0, 0.0),
                track(2, -1.0, 0.0, 0.0),
                track(3, 0.0, -1.0, 0.0),
            ],
            ..RawEvent::default()
        };
        let pass = first_pass(&round, &config);
        assert_relative_eq!(pass.sphericity, 1.0, epsilon = 1e-12);
        assert!(!pass.sphericity_accepted());

        // two tracks are not enough
        let pair = RawEvent {
            tracks: vec![track(0, 1.0, 0.0, 0.0), track(1, 0.0, 1.0, 0.0)],
            ..RawEvent::default()
        };
        assert_eq!(first_pass(&pair, &config).sphericity, 0.0);
    }

    #[test]
    fn test_track_pile_up() {
        let mut t = track(0, 1.0, 0.0, 0.0);
        assert!(
            !passes_track_pile_up(&t),
            "in-bunch TOF track without ITS refit must be removed"
        );
        t.tof.bunch_crossing = 2;
        assert!(!passes_track_pile_up(&t));
        t.its.layer_hits = 0b10;
        assert!(!passes_track_pile_up(&t));
        t.status |= status::ITS_REFIT;
        assert!(passes_track_pile_up(&t));
        t.its.layer_hits = 0b100;
        assert!(!passes_track_pile_up(&t));
    }

    #[test]
    fn test_track_pile_up_in_bunch_with_refit() {
        let mut t = track(0, 1.0, 0.0, 0.0);
        t.status = status::ITS_REFIT;
        assert_eq!(t.its.layer_hits, 0);
        assert!(
            passes_track_pile_up(&t),
            "in-bunch refitted track needs no inner ITS hit"
        );
        t.tof.bunch_crossing = -1;
        assert!(!passes_track_pile_up(&t));
    }

    #[test]
    fn test_dca_modes() {
        let mut t = track(0, 1.0, 0.0, 0.0);
        t.dca.xy = 0.02;
        t.dca.z = -0.01;
        t.position = ThreeVector::new(0.3, 0.4, 1.0);
        let primary = Vertex::new(ThreeVector::new(0.0, 0.0, 0.5), 10);

        let stored = track_dca(DcaMode::Stored, &t, &primary, 0.5);
        assert_eq!(stored, TrackDca { xy: 0.02, z: -0.01 });

        // zero zz covariance replaces the vertex
        let relative = track_dca(DcaMode::VertexRelative, &t, &primary, 0.5);
        assert_relative_eq!(relative.z, 1.0 + 999.0);
        let with_cov = primary.with_covariance([0.0, 0.0, 0.0, 0.0, 0.0, 1e-4]);
        let relative = track_dca(DcaMode::VertexRelative, &t, &with_cov, 0.5);
        assert_relative_eq!(relative.xy, 0.5, epsilon = 1e-12);
        assert_relative_eq!(relative.z, 0.5, epsilon = 1e-12);

        t.local_x = 3.5;
        let far = track_dca(DcaMode::TpcPropagated, &t, &primary, 0.5);
        assert_eq!(far, TrackDca { xy: -999.0, z: -999.0 });
    }

    #[test]
    fn test_propagated_dca_of_straight_track() {
        let mut t = track(0, 1.0, 0.0, 0.0);
        t.charge = 0;
        t.position = ThreeVector::new(2.0, 0.1, 0.3);
        t.local_x = 2.0;
        let primary = Vertex::new(ThreeVector::ZERO, 10);
        let dca = track_dca(DcaMode::TpcPropagated, &t, &primary, 0.5);
        assert_relative_eq!(dca.xy, 0.1, epsilon = 1e-9);
        assert_relative_eq!(dca.z, 0.3, epsilon = 1e-9);
    }
}
