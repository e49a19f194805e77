//! Spatial extrapolation of tracks through the TPC volume.

use femtoaod_core::{Helix, RawTrack, ThreeVector, Trajectory, KILOGAUSS, TRAJECTORY_POINTS};

/// Radii of the nine-point sample (cm), IROC entrance to OROC exit.
pub const TPC_RADII: [f64; TRAJECTORY_POINTS] =
    [85.0, 105.0, 125.0, 145.0, 165.0, 185.0, 205.0, 225.0, 245.0];

/// Nominal field magnitude used for the TPC sample (kG).
pub const NOMINAL_FIELD_KG: f64 = 5.0;

/// A sample point further than this from its target radius counts as a
/// failed propagation (cm).
const RADIUS_TOLERANCE: f64 = 0.5;

const SHIFT_SCAN_START: f64 = 58.0;
const SHIFT_SCAN_END: f64 = 247.0;

/// Helix of `track` starting at its reference point in the nominal field.
#[must_use]
pub fn nominal_helix(track: &RawTrack, field_sign: i32) -> Helix {
    let field = NOMINAL_FIELD_KG * f64::from(field_sign.signum()) * KILOGAUSS;
    Helix::new(track.position, track.momentum, track.charge, field)
}

/// Global positions of the helix at the nine TPC radii.
///
/// From the first radius that cannot be reached on, every entry is
/// [`ThreeVector::SENTINEL`].
#[must_use]
pub fn tpc_trajectory(helix: &Helix) -> Trajectory {
    let mut points = [ThreeVector::SENTINEL; TRAJECTORY_POINTS];
    for (point, radius) in points.iter_mut().zip(TPC_RADII) {
        match helix.position_at_radius(radius) {
            Some(p) if (p.perp() - radius).abs() <= RADIUS_TOLERANCE => *point = p,
            _ => break,
        }
    }
    points
}

/// Moves every sample point into the primary-vertex frame.
pub fn correct_for_vertex(points: &mut Trajectory, vertex: &ThreeVector) {
    for point in points.iter_mut() {
        *point = *point - *vertex;
    }
}

/// Position where the helix crosses `radius_m` metres transversely from
/// the primary vertex, expressed relative to the vertex.
///
/// The crossing is searched outwards in 1 cm steps of global radius and
/// refined inwards in 1 mm steps. Tracks that never get that far yield
/// [`ThreeVector::SENTINEL`].
#[must_use]
pub fn shifted_position(helix: &Helix, radius_m: f64, vertex: &ThreeVector) -> ThreeVector {
    let wanted2 = radius_m * radius_m * 1e4;
    let shifted2 = |p: &ThreeVector| (p.x - vertex.x).powi(2) + (p.y - vertex.y).powi(2);

    let mut r = SHIFT_SCAN_START;
    while r < SHIFT_SCAN_END {
        let Some(mut pos) = helix.position_at_radius(r) else {
            break;
        };
        if shifted2(&pos) > wanted2 {
            while shifted2(&pos) > wanted2 {
                r -= 0.1;
                match helix.position_at_radius(r) {
                    Some(p) => pos = p,
                    None => break,
                }
            }
            return pos - *vertex;
        }
        r += 1.0;
    }
    ThreeVector::SENTINEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn track(px: f64, py: f64, pz: f64, charge: i32) -> RawTrack {
        RawTrack {
            charge,
            momentum: ThreeVector::new(px, py, pz),
            ..RawTrack::default()
        }
    }

    #[test]
    fn test_stiff_track_reaches_all_radii() {
        let helix = nominal_helix(&track(5.0, 0.0, 1.0, 1), 1);
        let points = tpc_trajectory(&helix);
        assert_eq!(points.len(), TRAJECTORY_POINTS);
        for (p, r) in points.iter().zip(TPC_RADII) {
            assert!(!p.is_sentinel());
            assert_relative_eq!(p.perp(), r, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_soft_track_fills_sentinels() {
        // 0.15 GeV/c in 0.5 T: diameter ~ 200 cm
        let helix = nominal_helix(&track(0.15, 0.0, 0.0, -1), 1);
        let points = tpc_trajectory(&helix);
        let first_bad = points.iter().position(ThreeVector::is_sentinel).unwrap();
        assert_eq!(first_bad, 6);
        assert!(points[first_bad..].iter().all(ThreeVector::is_sentinel));
    }

    #[test]
    fn test_neutral_track_is_straight() {
        let helix = nominal_helix(&track(1.0, 1.0, 0.0, 0), 1);
        let points = tpc_trajectory(&helix);
        assert_relative_eq!(points[0].x, 85.0 / 2f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(points[0].y, 85.0 / 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_vertex_correction_applies_to_every_point() {
        let mut points = [ThreeVector::SENTINEL; TRAJECTORY_POINTS];
        points[0] = ThreeVector::new(85.0, 0.0, 0.0);
        correct_for_vertex(&mut points, &ThreeVector::new(1.0, 0.0, 2.0));
        assert_eq!(points[0], ThreeVector::new(84.0, 0.0, -2.0));
        assert_eq!(points[8], ThreeVector::new(-10000.0, -9999.0, -10001.0));
    }

    #[test]
    fn test_shifted_position_precision() {
        let vertex = ThreeVector::new(0.0, 0.0, 0.5);
        let helix = nominal_helix(&track(3.0, 0.5, 0.2, 1), 1);
        let p = shifted_position(&helix, 1.25, &vertex);
        assert!(!p.is_sentinel());
        assert!(p.perp() <= 125.0);
        assert!(p.perp() > 124.8);
    }

    #[test]
    fn test_shifted_position_unreachable() {
        let helix = nominal_helix(&track(0.05, 0.0, 0.0, 1), 1);
        assert!(shifted_position(&helix, 1.25, &ThreeVector::ZERO).is_sentinel());
    }
}
