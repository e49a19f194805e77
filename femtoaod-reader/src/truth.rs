//! Simulated-truth annotation of tracks, V0s and cascades.

use femtoaod_core::{
    CompositeTruth, DecayOrigin, FourVector, McOrigin, McParticle, SimulatedTruth, ThreeVector,
};

/// Scale applied to production points of track truth (cm to the
/// femtoscopy emission frame).
pub const EMISSION_SCALE: f64 = 1e13;

fn particle(particles: &[McParticle], label: i32) -> Option<&McParticle> {
    particles.get(usize::try_from(label).ok()?)
}

fn origin(flags: McOrigin) -> DecayOrigin {
    if flags.physical_primary {
        DecayOrigin::Primary
    } else if flags.secondary_from_weak_decay {
        DecayOrigin::WeakDecay
    } else if flags.secondary_from_material {
        DecayOrigin::Material
    } else {
        DecayOrigin::Unknown
    }
}

/// Truth of a reconstructed track with `label`.
///
/// Negative labels mark fake tracks and are only followed when
/// `full_mc` is set. Tracks without a particle still get an annotation
/// whose global emission point is the primary vertex.
#[must_use]
pub fn track_truth(
    particles: &[McParticle],
    label: i32,
    full_mc: bool,
    vertex: &ThreeVector,
) -> SimulatedTruth {
    let found = if label >= 0 {
        particle(particles, label)
    } else if full_mc {
        label.checked_abs().and_then(|l| particle(particles, l))
    } else {
        None
    };

    let Some(found) = found else {
        return SimulatedTruth {
            global_emission_point: FourVector::new(vertex.x, vertex.y, vertex.z, 0.0),
            ..SimulatedTruth::default()
        };
    };

    let production = found.production.spatial() - *vertex;
    let mut truth = SimulatedTruth {
        pdg_code: found.pdg_code,
        momentum: found.momentum,
        emission_point: FourVector::new(
            production.x * EMISSION_SCALE,
            production.y * EMISSION_SCALE,
            production.z * EMISSION_SCALE,
            0.0,
        ),
        global_emission_point: FourVector::new(production.x, production.y, production.z, 0.0),
        mass: found.mass(),
        origin: origin(found.origin),
        mother_pdg: None,
        mother_momentum: None,
    };

    if let Some(mother) = particle(particles, found.mother) {
        // A mother that is the same particle before a material interaction
        // carries the real emission point.
        if mother.pdg_code == found.pdg_code || mother.momentum.x == found.momentum.x {
            let p = mother.production;
            truth.emission_point = FourVector::new(
                p.x * EMISSION_SCALE,
                p.y * EMISSION_SCALE,
                p.z * EMISSION_SCALE,
                0.0,
            );
        } else {
            truth.mother_pdg = Some(mother.pdg_code);
            truth.mother_momentum = Some(mother.momentum);
        }
    }
    truth
}

/// Plain annotation of a simulated particle: emission at its production
/// vertex, untransformed.
fn particle_truth(particle: &McParticle) -> SimulatedTruth {
    SimulatedTruth {
        pdg_code: particle.pdg_code,
        momentum: particle.momentum,
        emission_point: particle.production,
        global_emission_point: particle.production,
        mass: particle.mass(),
        origin: origin(particle.origin),
        mother_pdg: None,
        mother_momentum: None,
    }
}

/// Mother annotation: the particle plus its own mother's PDG code.
fn mother_truth(particles: &[McParticle], mother: &McParticle) -> SimulatedTruth {
    SimulatedTruth {
        mother_pdg: particle(particles, mother.mother).map(|m| m.pdg_code),
        ..particle_truth(mother)
    }
}

/// Truth of a V0 from the labels of its positive and negative daughter.
///
/// Requires both daughters to exist and to share a mother.
#[must_use]
pub fn v0_truth(
    particles: &[McParticle],
    pos_label: i32,
    neg_label: i32,
) -> Option<CompositeTruth> {
    let pos = particle(particles, pos_label)?;
    let neg = particle(particles, neg_label)?;
    if pos.mother <= -1 || pos.mother != neg.mother {
        return None;
    }
    let Some(v0) = particle(particles, pos.mother) else {
        return Some(CompositeTruth::default());
    };
    Some(CompositeTruth {
        mother: mother_truth(particles, v0),
        positive: particle_truth(pos),
        negative: particle_truth(neg),
    })
}

/// Truth of a cascade.
///
/// The V0 daughters must share a mother whose own mother is also the
/// bachelor's mother. All three labels must be non-negative.
/// `positive` holds the V0 particle and `negative` the bachelor.
#[must_use]
pub fn xi_truth(
    particles: &[McParticle],
    pos_label: i32,
    neg_label: i32,
    bachelor_label: i32,
) -> Option<CompositeTruth> {
    let pos = particle(particles, pos_label)?;
    let neg = particle(particles, neg_label)?;
    if bachelor_label < 0 {
        return None;
    }
    let bachelor = particle(particles, bachelor_label)?;
    if pos.mother <= -1 || pos.mother != neg.mother {
        return None;
    }
    let v0 = particle(particles, pos.mother)?;
    if v0.mother <= -1 || v0.mother != bachelor.mother {
        return None;
    }
    let Some(xi) = particle(particles, v0.mother) else {
        return Some(CompositeTruth::default());
    };
    Some(CompositeTruth {
        mother: mother_truth(particles, xi),
        positive: particle_truth(v0),
        negative: particle_truth(bachelor),
    })
}
