//! V0 candidate reconstruction.
//!
//! Acceptance, daughter orientation, derived kinematics and truth of
//! two-prong neutral decays. The daughter block and orientation are shared
//! with the cascade builder.

use femtoaod_core::species::mass;
use femtoaod_core::{Daughter, RawEvent, RawTrack, RawV0, Species, ThreeVector, V0Candidate};

use crate::context::EventContext;
use crate::corrections::Kinematics;
use crate::extrapolation::{correct_for_vertex, nominal_helix, shifted_position, tpc_trajectory};
use crate::pid::daughter_tof;
use crate::truth::v0_truth;

/// Smallest cosine of the V0 pointing angle to the primary vertex.
pub const MIN_COS_POINTING: f64 = 0.98;

/// ITS layers accepted as in-bunch evidence for daughters.
const PILE_UP_LAYERS: [u8; 4] = [0, 1, 4, 5];

/// One daughter of a V0 or the bachelor of a cascade.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Prong<'e> {
    pub track: &'e RawTrack,
    pub momentum: ThreeVector,
    pub id: i32,
    pub dca: f64,
}

/// V0 daughters ordered positive first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrientedV0<'e> {
    pub positive: Prong<'e>,
    pub negative: Prong<'e>,
}

/// Looks up both daughter tracks and swaps the prongs when the first one
/// is negative and the second positive.
pub(crate) fn orient<'e>(event: &'e RawEvent, v0: &RawV0) -> Option<OrientedV0<'e>> {
    let first = event.track(v0.daughters[0])?;
    let second = event.track(v0.daughters[1])?;
    if first.charge == second.charge {
        return None;
    }
    let prong = |i: usize, track| Prong {
        track,
        momentum: v0.prong_momenta[i],
        id: v0.prong_ids[i],
        dca: v0.dca_prong_to_primary[i],
    };
    let (a, b) = (prong(0, first), prong(1, second));
    if first.charge < 0 && second.charge > 0 {
        Some(OrientedV0 {
            positive: b,
            negative: a,
        })
    } else {
        Some(OrientedV0 {
            positive: a,
            negative: b,
        })
    }
}

/// In-bunch evidence for a daughter: TOF in the triggered bunch or an ITS
/// point on an SPD or SSD layer.
#[must_use]
pub fn passes_daughter_pile_up(track: &RawTrack) -> bool {
    track.tof.bunch_crossing == 0
        || PILE_UP_LAYERS
            .iter()
            .any(|&layer| track.its.has_point_on_layer(layer))
}

pub(crate) fn daughter(ctx: &EventContext<'_>, prong: &Prong<'_>) -> Daughter {
    let track = prong.track;
    let config = ctx.config;
    let vertex = ctx.vertex();

    let nominal = nominal_helix(track, config.mag_field_sign);
    let mut trajectory = tpc_trajectory(&nominal);
    if config.correct_tpc_points {
        correct_for_vertex(&mut trajectory, &vertex);
    }

    Daughter {
        id: prong.id,
        eta: track.eta(),
        pt: track.pt(),
        p_total: prong.momentum.mag(),
        prong_momentum: prong.momentum,
        dca_to_primary: prong.dca,
        tpc_clusters: track.tpc.n_clusters,
        cluster_map: track.tpc.cluster_map,
        shared_map: track.tpc.shared_map,
        chi2_per_ndf: track.chi2_per_ndf,
        status: track.status,
        n_sigma_tpc_kaon: ctx.pid.n_sigma_tpc(track, Species::Kaon),
        n_sigma_tpc_proton: ctx.pid.n_sigma_tpc(track, Species::Proton),
        n_sigma_tpc_pion: ctx.pid.n_sigma_tpc(track, Species::Pion),
        tof: daughter_tof(track, ctx.pid),
        trajectory,
        shifted_position: config
            .shift_radius
            .map(|radius| shifted_position(&nominal, radius, &vertex)),
        inner_momentum: track.tpc.inner_momentum,
        dedx: track.tpc.signal,
    }
}

pub(crate) fn energy(p: &ThreeVector, m: f64) -> f64 {
    (p.mag2() + m * m).sqrt()
}

/// Invariant mass of a system with energy `e` and momentum `p`.
pub(crate) fn invariant_mass(e: f64, p: &ThreeVector) -> f64 {
    (e * e - p.mag2()).max(0.0).sqrt()
}

fn rapidity(e: f64, pz: f64) -> f64 {
    0.5 * ((e + pz) / (e - pz)).ln()
}

/// Armenteros α and qT of the positive daughter relative to `total`.
fn armenteros(pos: &ThreeVector, neg: &ThreeVector, total: &ThreeVector) -> (f64, f64) {
    let p = total.mag();
    if p == 0.0 {
        return (0.0, 0.0);
    }
    let pl_pos = pos.dot(total) / p;
    let pl_neg = neg.dot(total) / p;
    let sum = pl_pos + pl_neg;
    let alpha = if sum == 0.0 {
        0.0
    } else {
        (pl_pos - pl_neg) / sum
    };
    (alpha, pos.cross(total).mag() / p)
}

/// Derived V0 quantities for an accepted, oriented candidate.
pub(crate) fn v0_candidate(
    ctx: &EventContext<'_>,
    v0: &RawV0,
    oriented: &OrientedV0<'_>,
) -> V0Candidate {
    let vertex = ctx.vertex();
    let p_pos = oriented.positive.momentum;
    let p_neg = oriented.negative.momentum;
    let momentum = p_pos + p_neg;
    let (alpha_arm, pt_arm) = armenteros(&p_pos, &p_neg, &momentum);

    let energy_lambda = energy(&momentum, mass::LAMBDA);
    let energy_k0_short = energy(&momentum, mass::K0_SHORT);
    let mass_lambda = invariant_mass(
        energy(&p_pos, mass::PROTON) + energy(&p_neg, mass::PION),
        &momentum,
    );
    let mass_anti_lambda = invariant_mass(
        energy(&p_pos, mass::PION) + energy(&p_neg, mass::PROTON),
        &momentum,
    );
    let mass_k0_short = invariant_mass(
        energy(&p_pos, mass::PION) + energy(&p_neg, mass::PION),
        &momentum,
    );

    let kinematics = Kinematics {
        eta: momentum.eta(),
        pt: momentum.perp(),
        z: v0.decay_vertex.z,
        phi: momentum.phi(),
    };

    V0Candidate {
        positive: daughter(ctx, &oriented.positive),
        negative: daughter(ctx, &oriented.negative),
        decay_vertex: v0.decay_vertex,
        decay_length: (v0.decay_vertex - vertex).mag(),
        radius: v0.decay_vertex.perp(),
        dca_daughters: v0.dca_daughters,
        dca_to_primary: v0.dca_to_primary,
        momentum,
        pt: momentum.perp(),
        p_total: momentum.mag(),
        eta: momentum.eta(),
        phi: momentum.phi(),
        cos_pointing: v0.cos_pointing_angle(&vertex),
        alpha_arm,
        pt_arm,
        energy_lambda,
        energy_k0_short,
        energy_pos_proton: energy(&p_pos, mass::PROTON),
        energy_neg_proton: energy(&p_neg, mass::PROTON),
        mass_lambda,
        mass_anti_lambda,
        mass_k0_short,
        rapidity_lambda: rapidity(energy_lambda, momentum.z),
        rapidity_k0_short: rapidity(energy_k0_short, momentum.z),
        on_fly: v0.on_fly,
        weights: ctx.config.corrections.v0_weights(&kinematics),
        multiplicity: ctx.multiplicity,
        vertex_z: vertex.z,
        truth: ctx.mc.and_then(|mc| {
            v0_truth(
                mc.particles,
                oriented.positive.track.label,
                oriented.negative.track.label,
            )
        }),
    }
}

/// Builds a V0 candidate, `None` when the V0 is not accepted.
#[must_use]
pub fn build_v0(ctx: &EventContext<'_>, v0: &RawV0) -> Option<V0Candidate> {
    if v0.n_daughters != 2 || v0.n_prongs != 2 || v0.charge != 0 {
        return None;
    }
    if v0.prong_charges[0] == v0.prong_charges[1] {
        return None;
    }
    if v0.cos_pointing_angle(&ctx.vertex()) < MIN_COS_POINTING {
        return None;
    }
    let oriented = orient(ctx.event, v0)?;
    if ctx.config.v0_pile_up_removal
        && !(passes_daughter_pile_up(oriented.positive.track)
            && passes_daughter_pile_up(oriented.negative.track))
    {
        log::trace!("V0 removed as pile-up");
        return None;
    }
    Some(v0_candidate(ctx, v0, &oriented))
}
