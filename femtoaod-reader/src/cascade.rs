//! Cascade (Ξ, Ω) candidate reconstruction.

use std::f64::consts::PI;

use femtoaod_core::species::mass;
use femtoaod_core::{RawCascade, XiCandidate};

use crate::context::EventContext;
use crate::corrections::Kinematics;
use crate::truth::xi_truth;
use crate::v0::{
    daughter, energy, invariant_mass, orient, passes_daughter_pile_up, v0_candidate, Prong,
    MIN_COS_POINTING,
};

/// Smallest cosine of the pointing angle of the cascade's V0.
pub const MIN_V0_COS_POINTING: f64 = 0.9;

/// Builds a cascade candidate, `None` when the cascade is not accepted.
#[must_use]
pub fn build_xi(ctx: &EventContext<'_>, cascade: &RawCascade) -> Option<XiCandidate> {
    let v0 = &cascade.v0;
    let vertex = ctx.vertex();

    if v0.prong_charges[0] == v0.prong_charges[1] {
        return None;
    }
    if v0.cos_pointing_angle(&vertex) < MIN_V0_COS_POINTING
        || cascade.cos_pointing_angle_xi(&vertex) < MIN_COS_POINTING
    {
        return None;
    }
    let oriented = orient(ctx.event, v0)?;
    let bachelor_track = ctx.event.track(cascade.bachelor)?;

    if ctx.config.cascade_pile_up_removal
        && ![
            oriented.positive.track,
            oriented.negative.track,
            bachelor_track,
        ]
        .into_iter()
        .all(passes_daughter_pile_up)
    {
        log::trace!("cascade removed as pile-up");
        return None;
    }

    let bachelor = Prong {
        track: bachelor_track,
        momentum: cascade.bachelor_momentum,
        id: cascade.bachelor_id,
        dca: cascade.dca_bachelor_to_primary,
    };

    let p_v0 = v0.momentum();
    let momentum = cascade.momentum();
    let p = momentum.mag();
    let xv = cascade.decay_vertex;

    let dca_to_primary = if p == 0.0 {
        (vertex - xv).mag()
    } else {
        (vertex - xv).cross(&momentum).mag() / p
    };

    let e_lambda = energy(&p_v0, mass::LAMBDA);
    let mass_xi = invariant_mass(
        e_lambda + energy(&cascade.bachelor_momentum, mass::PION),
        &momentum,
    );
    let mass_omega = invariant_mass(
        e_lambda + energy(&cascade.bachelor_momentum, mass::KAON),
        &momentum,
    );

    let eta = 0.5 * ((p + momentum.z) / (p - momentum.z + 1e-13)).ln();
    let phi = PI + (-momentum.y).atan2(-momentum.x);

    let kinematics = Kinematics {
        eta,
        pt: momentum.perp(),
        z: xv.z,
        phi,
    };

    Some(XiCandidate {
        v0: v0_candidate(ctx, v0, &oriented),
        bachelor: daughter(ctx, &bachelor),
        decay_vertex: xv,
        decay_length: (xv - vertex).mag(),
        v0_decay_length: (v0.decay_vertex - xv).mag(),
        dca_to_primary,
        dca_v0_bachelor: cascade.dca_v0_bachelor,
        momentum,
        pt: momentum.perp(),
        p_total: p,
        eta,
        phi,
        cos_pointing: cascade.cos_pointing_angle_xi(&vertex),
        cos_pointing_v0_to_xi: v0.cos_pointing_angle(&xv),
        radius: xv.perp(),
        charge: cascade.charge,
        mass_xi,
        mass_omega,
        weights: ctx.config.corrections.xi_weights(&kinematics),
        truth: ctx.mc.and_then(|mc| {
            xi_truth(
                mc.particles,
                oriented.positive.track.label,
                oriented.negative.track.label,
                bachelor_track.label,
            )
        }),
    })
}
