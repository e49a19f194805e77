//! Event-level acceptance.
//!
//! Checks run in a fixed order and the first failing one rejects the event.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::fmt;

use femtoaod_core::{EventSelector, PileUpUtils, RawEvent, SelectionMode, Vertex};
use rand::Rng;

use crate::config::ReaderConfig;
use crate::legacy::{self, LegacyCheck};

/// Generator whose multiplicity marks generated pile-up.
pub const PILE_UP_GENERATOR: &str = "Hijing";

/// Centrality below which the flattening applies (percent).
pub const FLATTENING_LIMIT: f64 = 9.0;

/// Acceptance weights of the flattening per 1 % centrality bin, for
/// positive and for non-positive field.
pub const FLATTENING_WEIGHTS: [[f64; 9]; 2] = [
    [0.878, 0.876, 0.860, 0.859, 0.859, 0.880, 0.873, 0.879, 0.894],
    [0.828, 0.793, 0.776, 0.772, 0.775, 0.796, 0.788, 0.804, 0.839],
];

/// Reason an event was not converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Refused by the event selector in standard mode.
    EventCuts,
    /// Failed a check of the legacy pile-up procedure.
    Legacy(LegacyCheck),
    /// V0M outside the configured window after the legacy procedure.
    CentralityWindow,
    HighMultiplicityTrigger,
    TpcPileUp,
    OutOfBunchPileUp,
    VertexSelection2013pA,
    PileUp,
    GeneratedPileUp,
    /// No primary vertex with at least one contributor.
    NoPrimaryVertex,
    CentralityPreselection,
    CentralityFlattening,
    /// Transverse sphericity outside the jet-event range.
    JetSphericity,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EventCuts => write!(f, "rejected by event cuts"),
            Rejection::Legacy(check) => write!(f, "legacy pile-up rejection: {check}"),
            Rejection::CentralityWindow => write!(f, "V0M centrality outside window"),
            Rejection::HighMultiplicityTrigger => {
                write!(f, "high-multiplicity trigger inconsistency")
            }
            Rejection::TpcPileUp => write!(f, "TPC pile-up"),
            Rejection::OutOfBunchPileUp => write!(f, "out-of-bunch pile-up"),
            Rejection::VertexSelection2013pA => write!(f, "pA 2013 vertex selection"),
            Rejection::PileUp => write!(f, "pile-up"),
            Rejection::GeneratedPileUp => write!(f, "pile-up in generated event"),
            Rejection::NoPrimaryVertex => write!(f, "no primary vertex"),
            Rejection::CentralityPreselection => write!(f, "centrality pre-selection"),
            Rejection::CentralityFlattening => write!(f, "centrality flattening"),
            Rejection::JetSphericity => write!(f, "jet sphericity"),
        }
    }
}

/// Event gatekeeper over borrowed configuration and collaborators.
#[derive(Debug, Clone, Copy)]
pub struct Gatekeeper<'a> {
    config: &'a ReaderConfig,
    selector: Option<&'a dyn EventSelector>,
    pile_up: &'a dyn PileUpUtils,
}

impl<'a> Gatekeeper<'a> {
    #[must_use]
    pub fn new(
        config: &'a ReaderConfig,
        selector: Option<&'a dyn EventSelector>,
        pile_up: &'a dyn PileUpUtils,
    ) -> Self {
        Self {
            config,
            selector,
            pile_up,
        }
    }

    fn accepts(&self, event: &RawEvent, mode: SelectionMode) -> bool {
        self.selector.map_or(true, |s| s.accept(event, mode))
    }

    /// Runs the checks in order and returns the primary vertex of an
    /// accepted event.
    pub fn evaluate<R: Rng>(&self, event: &RawEvent, rng: &mut R) -> Result<Vertex, Rejection> {
        let config = self.config;

        if config.use_event_cuts && !self.accepts(event, SelectionMode::Standard) {
            return Err(Rejection::EventCuts);
        }

        if let Some(year) = config.legacy_year {
            legacy::apply(year, event, config.curves(year)).map_err(Rejection::Legacy)?;
            if let Some(range) = config.centrality_range {
                let inside = event
                    .centrality
                    .as_ref()
                    .is_some_and(|c| range.contains(c.v0m));
                if !inside {
                    return Err(Rejection::CentralityWindow);
                }
            }
        }

        if let Some(threshold) = config.high_multiplicity_pp {
            let v0m = event.centrality.as_ref().map_or(f64::INFINITY, |c| c.v0m);
            if !self.accepts(event, SelectionMode::HighMultiplicityTrigger) || v0m > threshold {
                return Err(Rejection::HighMultiplicityTrigger);
            }
        }

        if config.reject_tpc_pileup
            && !self.accepts(event, SelectionMode::TpcPileupItsTpcClusterCorrelation)
        {
            return Err(Rejection::TpcPileUp);
        }

        if config.reject_out_of_bunch_v0_tpc
            && !self.accepts(event, SelectionMode::TpcPileupV0CentralityTpcTracks)
        {
            return Err(Rejection::OutOfBunchPileUp);
        }

        if config.vertex_selection_2013_pa && !self.pile_up.is_vertex_selected_2013_pa(event) {
            return Err(Rejection::VertexSelection2013pA);
        }
        if config.reject_pile_up && self.pile_up.is_pile_up(event, &config.pile_up) {
            return Err(Rejection::PileUp);
        }

        if config.read_mc && config.reject_generated_pile_up {
            if let Some(header) = event.mc_header.as_ref() {
                if self
                    .pile_up
                    .is_pileup_in_generated_event(header, PILE_UP_GENERATOR)
                {
                    return Err(Rejection::GeneratedPileUp);
                }
            }
        }

        let vertex = if config.use_event_cuts {
            self.selector.and_then(|s| s.primary_vertex(event))
        } else {
            event.primary_vertex.as_ref()
        };
        let vertex = match vertex {
            Some(v) if v.n_contributors >= 1 => *v,
            _ => return Err(Rejection::NoPrimaryVertex),
        };

        if config.centrality_preselection && config.multiplicity.is_v0m_centrality() {
            if let (Some(centrality), Some(range)) =
                (event.centrality.as_ref(), config.centrality_range)
            {
                if !range.contains(centrality.v0m) {
                    return Err(Rejection::CentralityPreselection);
                }
            }
        }

        if config.flatten_centrality {
            if let Some(centrality) = event.centrality.as_ref() {
                if centrality.v0m < FLATTENING_LIMIT {
                    let weight = flattening_weight(event.magnetic_field, centrality.v0m);
                    if rng.gen::<f64>() > weight {
                        return Err(Rejection::CentralityFlattening);
                    }
                }
            }
        }

        Ok(vertex)
    }
}

/// Acceptance weight of the flattening at `v0m` percent.
#[must_use]
pub fn flattening_weight(field: f64, v0m: f64) -> f64 {
    let table = if field > 0.0 { 0 } else { 1 };
    let bin = (v0m.max(0.0) as usize).min(FLATTENING_WEIGHTS[table].len() - 1);
    FLATTENING_WEIGHTS[table][bin]
}

#[cfg(test)]
mod tests {
    use super::*;
    use femtoaod_core::{CentralityPercentiles, McHeader, ThreeVector, VertexPileUpUtils};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug)]
    struct FixedSelector {
        refuse: Option<SelectionMode>,
        vertex: Option<Vertex>,
    }

    impl EventSelector for FixedSelector {
        fn accept(&self, _event: &RawEvent, mode: SelectionMode) -> bool {
            self.refuse != Some(mode)
        }

        fn primary_vertex<'a>(&self, event: &'a RawEvent) -> Option<&'a Vertex> {
            if self.vertex.is_some() {
                event.spd_vertex.as_ref()
            } else {
                event.primary_vertex.as_ref()
            }
        }
    }

    fn event(v0m: f64) -> RawEvent {
        RawEvent {
            magnetic_field: 5.0,
            primary_vertex: Some(Vertex::new(ThreeVector::new(0.0, 0.0, 1.0), 2)),
            centrality: Some(CentralityPercentiles {
                v0m,
                ..CentralityPercentiles::default()
            }),
            ..RawEvent::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_plain_event_accepted() {
        let config = ReaderConfig::new();
        let gate = Gatekeeper::new(&config, None, &VertexPileUpUtils);
        let vertex = gate.evaluate(&event(30.0), &mut rng()).unwrap();
        assert_eq!(vertex.n_contributors, 2);
    }

    #[test]
    fn test_missing_or_empty_vertex() {
        let config = ReaderConfig::new();
        let gate = Gatekeeper::new(&config, None, &VertexPileUpUtils);
        let mut e = event(30.0);
        e.primary_vertex.as_mut().unwrap().n_contributors = 0;
        assert_eq!(gate.evaluate(&e, &mut rng()), Err(Rejection::NoPrimaryVertex));
        e.primary_vertex = None;
        assert_eq!(gate.evaluate(&e, &mut rng()), Err(Rejection::NoPrimaryVertex));
    }

    #[test]
    fn test_selector_modes_in_order() {
        let config = ReaderConfig::new()
            .with_event_cuts(true)
            .with_tpc_pileup_rejection(true)
            .with_out_of_bunch_v0_tpc_rejection(true);
        let refuse = |mode| FixedSelector {
            refuse: Some(mode),
            vertex: None,
        };

        let selector = refuse(SelectionMode::Standard);
        let gate = Gatekeeper::new(&config, Some(&selector), &VertexPileUpUtils);
        assert_eq!(gate.evaluate(&event(30.0), &mut rng()), Err(Rejection::EventCuts));

        let selector = refuse(SelectionMode::TpcPileupItsTpcClusterCorrelation);
        let gate = Gatekeeper::new(&config, Some(&selector), &VertexPileUpUtils);
        assert_eq!(gate.evaluate(&event(30.0), &mut rng()), Err(Rejection::TpcPileUp));

        let selector = refuse(SelectionMode::TpcPileupV0CentralityTpcTracks);
        let gate = Gatekeeper::new(&config, Some(&selector), &VertexPileUpUtils);
        assert_eq!(
            gate.evaluate(&event(30.0), &mut rng()),
            Err(Rejection::OutOfBunchPileUp)
        );
    }

    #[test]
    fn test_selector_supplies_vertex() {
        let config = ReaderConfig::new().with_event_cuts(true);
        let selector = FixedSelector {
            refuse: None,
            vertex: Some(Vertex::default()),
        };
        let gate = Gatekeeper::new(&config, Some(&selector), &VertexPileUpUtils);
        let mut e = event(30.0);
        assert_eq!(gate.evaluate(&e, &mut rng()), Err(Rejection::NoPrimaryVertex));
        e.spd_vertex = Some(Vertex::new(ThreeVector::new(0.0, 0.0, 2.0), 5));
        assert_eq!(gate.evaluate(&e, &mut rng()).unwrap().n_contributors, 5);
    }

    #[test]
    fn test_high_multiplicity_threshold() {
        let config = ReaderConfig::new().with_high_multiplicity_pp(0.17);
        let selector = FixedSelector {
            refuse: None,
            vertex: None,
        };
        let gate = Gatekeeper::new(&config, Some(&selector), &VertexPileUpUtils);
        assert!(gate.evaluate(&event(0.1), &mut rng()).is_ok());
        assert_eq!(
            gate.evaluate(&event(0.2), &mut rng()),
            Err(Rejection::HighMultiplicityTrigger)
        );
    }

    #[test]
    fn test_generated_pile_up_needs_mc() {
        let mut e = event(30.0);
        e.mc_header = Some(McHeader {
            generators: vec!["Hijing_0".into(), "Hijing_1".into()],
            ..McHeader::default()
        });
        let config = ReaderConfig::new().with_generated_pile_up_rejection(true);
        let gate = Gatekeeper::new(&config, None, &VertexPileUpUtils);
        assert!(gate.evaluate(&e, &mut rng()).is_ok());

        let config = config.with_read_mc(true);
        let gate = Gatekeeper::new(&config, None, &VertexPileUpUtils);
        assert_eq!(gate.evaluate(&e, &mut rng()), Err(Rejection::GeneratedPileUp));
    }

    #[test]
    fn test_preselection_window() {
        let config = ReaderConfig::new().with_centrality_preselection(0.0, 10.0);
        let gate = Gatekeeper::new(&config, None, &VertexPileUpUtils);
        assert!(gate.evaluate(&event(5.0), &mut rng()).is_ok());
        assert_eq!(
            gate.evaluate(&event(25.0), &mut rng()),
            Err(Rejection::CentralityPreselection)
        );
        // no centrality information, nothing to cut on
        let mut e = event(25.0);
        e.centrality = None;
        assert!(gate.evaluate(&e, &mut rng()).is_ok());
    }

    #[test]
    fn test_flattening_weights() {
        assert_eq!(flattening_weight(5.0, 0.3), 0.878);
        assert_eq!(flattening_weight(5.0, 8.99), 0.894);
        assert_eq!(flattening_weight(-5.0, 3.5), 0.772);
        assert_eq!(flattening_weight(0.0, 1.0), 0.793);
    }

    #[test]
    fn test_flattening_leaves_peripheral_events() {
        let config = ReaderConfig::new().with_centrality_flattening(true);
        let gate = Gatekeeper::new(&config, None, &VertexPileUpUtils);
        let mut rng = rng();
        for _ in 0..200 {
            assert!(gate.evaluate(&event(9.5), &mut rng).is_ok());
        }
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::NoPrimaryVertex.to_string(), "no primary vertex");
        assert!(Rejection::Legacy(LegacyCheck::IncompleteDaq)
            .to_string()
            .starts_with("legacy pile-up rejection"));
    }
}
