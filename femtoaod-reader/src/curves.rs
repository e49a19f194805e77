//! Parametric pile-up threshold curves.
//!
//! The legacy pile-up procedures compare event-level correlations (CL0 vs
//! V0M centrality, ITS clusters vs SPD tracklets, online vs offline V0
//! amplitude, FB32 tracks vs centrality) against calibrated curves. The two
//! calibrations shipped here are kept with their published parameters.

use std::sync::Arc;

use femtoaod_core::ThresholdCurve;
use serde::{Deserialize, Serialize};

/// Closed family of curve shapes used by the pile-up checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParametricCurve {
    /// `a + b·x`
    Linear { intercept: f64, slope: f64 },
    /// `p0 + p1·x − 6·p2·(p3 + p4·√x + p5·x + p6·x·√x + p7·x²)`
    V0Amplitude { params: [f64; 8] },
    /// `p0 + p1·x + width·(p2 + p3·x + p4·x² + p5·x³)`
    ///
    /// `width` is negative for the lower edge of a band.
    CentralityBand { params: [f64; 6], width: f64 },
    /// `p0 + p1·x + p2·exp(p3 − p4·x) − 6·(p5 + p6·exp(p7 − p8·x))`
    MultiplicityExp { params: [f64; 9] },
    /// `p0 + p1·x + p2·x² + p3·x³ − 6·(p4 + p5·√x + p6·x + p7·x²)`
    MultiplicityPoly { params: [f64; 8] },
}

impl ThresholdCurve for ParametricCurve {
    fn eval(&self, x: f64) -> f64 {
        match self {
            ParametricCurve::Linear { intercept, slope } => intercept + slope * x,
            ParametricCurve::V0Amplitude { params: p } => {
                let sx = x.sqrt();
                p[0] + p[1] * x
                    - 6.0 * p[2] * (p[3] + p[4] * sx + p[5] * x + p[6] * x * sx + p[7] * x * x)
            }
            ParametricCurve::CentralityBand { params: p, width } => {
                p[0] + p[1] * x + width * (p[2] + p[3] * x + p[4] * x * x + p[5] * x * x * x)
            }
            ParametricCurve::MultiplicityExp { params: p } => {
                p[0] + p[1] * x + p[2] * (p[3] - p[4] * x).exp()
                    - 6.0 * (p[5] + p[6] * (p[7] - p[8] * x).exp())
            }
            ParametricCurve::MultiplicityPoly { params: p } => {
                p[0] + p[1] * x + p[2] * x * x + p[3] * x * x * x
                    - 6.0 * (p[4] + p[5] * x.sqrt() + p[6] * x + p[7] * x * x)
            }
        }
    }
}

const V0_2015: [f64; 8] = [
    33.4237,
    0.953_516,
    0.071_213_7,
    227.923,
    8.9239,
    -0.003_196_79,
    0.000_306_314,
    -7.6627e-07,
];
const CL0_2015: [f64; 6] = [
    0.019_358_7,
    0.975_914,
    0.675_714,
    0.029_226_3,
    -0.000_549_509,
    5.86421e-06,
];
const FB32_2015: [f64; 9] = [
    -812.822, 6.41796, 5421.83, -0.382_601, 0.029_968_6, -26.6249, 321.388, -0.82615, 0.016_782_8,
];

const V0_2018: [f64; 8] = [
    43.8011,
    0.822_574,
    8.49794e-02,
    1.34217e+02,
    7.09023e+00,
    4.99720e-02,
    -4.99051e-04,
    1.55864e-06,
];
const CL0_2018: [f64; 6] = [
    0.320_462,
    0.961_793,
    1.02278,
    0.033_005_4,
    -0.000_719_631,
    6.90312e-06,
];
const FB32_2018: [f64; 8] = [
    2093.36,
    -66.425,
    0.728_932,
    -0.002_761_1,
    1.01801e+02,
    -5.23083e+00,
    -1.03792e+00,
    5.70399e-03,
];

/// The five curves one legacy procedure evaluates.
#[derive(Debug, Clone)]
pub struct PileUpCurves {
    /// Lower CL0 bound versus V0M centrality.
    pub centrality_low: Arc<dyn ThresholdCurve>,
    /// Upper CL0 bound versus V0M centrality.
    pub centrality_high: Arc<dyn ThresholdCurve>,
    /// Maximum SPD clusters versus tracklets.
    pub its_clusters: Arc<dyn ThresholdCurve>,
    /// Minimum online V0 charge versus offline V0 amplitude.
    pub v0_charge: Arc<dyn ThresholdCurve>,
    /// Minimum FB32 track count versus V0M centrality.
    pub fb32_multiplicity: Arc<dyn ThresholdCurve>,
}

impl PileUpCurves {
    /// Calibration for the 2015 Pb-Pb pass-2 data.
    #[must_use]
    pub fn pass2_2015() -> Self {
        Self {
            centrality_low: Arc::new(ParametricCurve::CentralityBand {
                params: CL0_2015,
                width: -5.5,
            }),
            centrality_high: Arc::new(ParametricCurve::CentralityBand {
                params: CL0_2015,
                width: 5.5,
            }),
            its_clusters: Arc::new(ParametricCurve::Linear {
                intercept: 450.0,
                slope: 3.9,
            }),
            v0_charge: Arc::new(ParametricCurve::V0Amplitude { params: V0_2015 }),
            fb32_multiplicity: Arc::new(ParametricCurve::MultiplicityExp { params: FB32_2015 }),
        }
    }

    /// Calibration for the 2018 Pb-Pb data.
    #[must_use]
    pub fn run2_2018() -> Self {
        Self {
            centrality_low: Arc::new(ParametricCurve::CentralityBand {
                params: CL0_2018,
                width: -6.5,
            }),
            centrality_high: Arc::new(ParametricCurve::CentralityBand {
                params: CL0_2018,
                width: 5.5,
            }),
            its_clusters: Arc::new(ParametricCurve::Linear {
                intercept: 400.0,
                slope: 4.0,
            }),
            v0_charge: Arc::new(ParametricCurve::V0Amplitude { params: V0_2018 }),
            fb32_multiplicity: Arc::new(ParametricCurve::MultiplicityPoly { params: FB32_2018 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_curves() {
        let curves = PileUpCurves::pass2_2015();
        assert_relative_eq!(curves.its_clusters.eval(100.0), 840.0);
        let curves = PileUpCurves::run2_2018();
        assert_relative_eq!(curves.its_clusters.eval(100.0), 800.0);
    }

    #[test]
    fn test_centrality_band_brackets_diagonal() {
        for curves in [PileUpCurves::pass2_2015(), PileUpCurves::run2_2018()] {
            for cent in [5.0, 30.0, 70.0] {
                assert!(curves.centrality_low.eval(cent) < cent);
                assert!(curves.centrality_high.eval(cent) > cent);
            }
        }
    }

    #[test]
    fn test_band_width_is_asymmetric_in_2018() {
        let c = PileUpCurves::run2_2018();
        let mid = 0.320_462 + 0.961_793 * 10.0;
        let below = mid - c.centrality_low.eval(10.0);
        let above = c.centrality_high.eval(10.0) - mid;
        assert_relative_eq!(below / above, 6.5 / 5.5, epsilon = 1e-9);
    }

    #[test]
    fn test_curve_json_shape() {
        let curve: ParametricCurve =
            serde_json::from_str(r#"{"kind":"linear","intercept":1.0,"slope":2.0}"#).unwrap();
        assert_relative_eq!(curve.eval(3.0), 7.0);
    }
}
