//! The event reader: gatekeeping plus conversion of one event at a time.

use std::sync::Arc;

use femtoaod_core::{
    EventSelector, PidResponse, PileUpUtils, RawEvent, ReconstructedEvent, StoredPidResponse,
    VertexPileUpUtils, KILOGAUSS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cascade::build_xi;
use crate::config::{EventPlaneSource, ReaderConfig};
use crate::context::EventContext;
use crate::error::{Error, Result};
use crate::gatekeeper::{Gatekeeper, Rejection};
use crate::multiplicity;
use crate::track::{convert_track, first_pass};
use crate::v0::build_v0;

/// External services the reader asks during conversion.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Event-quality cut object; required by the options that query it.
    pub selector: Option<Arc<dyn EventSelector>>,
    pub pile_up: Arc<dyn PileUpUtils>,
    pub pid: Arc<dyn PidResponse>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            selector: None,
            pile_up: Arc::new(VertexPileUpUtils),
            pid: Arc::new(StoredPidResponse),
        }
    }
}

impl Collaborators {
    #[must_use]
    pub fn with_selector(mut self, selector: Arc<dyn EventSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    #[must_use]
    pub fn with_pile_up(mut self, pile_up: Arc<dyn PileUpUtils>) -> Self {
        self.pile_up = pile_up;
        self
    }

    #[must_use]
    pub fn with_pid(mut self, pid: Arc<dyn PidResponse>) -> Self {
        self.pid = pid;
        self
    }
}

/// Outcome of converting one raw event.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Accepted(ReconstructedEvent),
    Rejected(Rejection),
}

impl Conversion {
    /// The converted event, `None` when it was rejected.
    #[must_use]
    pub fn into_event(self) -> Option<ReconstructedEvent> {
        match self {
            Conversion::Accepted(event) => Some(event),
            Conversion::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Conversion::Accepted(_))
    }

    /// Why the event was rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Conversion::Accepted(_) => None,
            Conversion::Rejected(reason) => Some(*reason),
        }
    }
}

/// Converts raw events into femtoscopy events.
///
/// Owns the configuration, the collaborator handles and the random
/// generator of the centrality flattening. Events are processed one at a
/// time.
#[derive(Debug)]
pub struct EventReader {
    config: ReaderConfig,
    collaborators: Collaborators,
    rng: StdRng,
}

impl EventReader {
    /// Reader with the default collaborators.
    pub fn new(config: ReaderConfig) -> Result<Self> {
        Self::with_collaborators(config, Collaborators::default())
    }

    pub fn with_collaborators(config: ReaderConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        if config.needs_event_selector() && collaborators.selector.is_none() {
            return Err(Error::ConfigError(
                "event cuts requested but no event selector installed".into(),
            ));
        }
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            config,
            collaborators,
            rng,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Converts one event.
    pub fn convert(&mut self, event: &RawEvent) -> Conversion {
        let config = &self.config;
        let gate = Gatekeeper::new(
            config,
            self.collaborators.selector.as_deref(),
            self.collaborators.pile_up.as_ref(),
        );
        let primary = match gate.evaluate(event, &mut self.rng) {
            Ok(vertex) => vertex,
            Err(reason) => {
                log::debug!("event of run {} rejected: {reason}", event.run_number);
                return Conversion::Rejected(reason);
            }
        };

        let pass = first_pass(event, config);
        if config.jets.is_some() && !pass.sphericity_accepted() {
            log::debug!(
                "event of run {} rejected: sphericity {:.3e}",
                event.run_number,
                pass.sphericity
            );
            return Conversion::Rejected(Rejection::JetSphericity);
        }

        let normalized_multiplicity =
            multiplicity::resolve(event, config.multiplicity, &pass.counts);
        let ctx = EventContext::new(
            event,
            config,
            self.collaborators.pid.as_ref(),
            self.collaborators.pile_up.as_ref(),
            primary,
        )
        .with_multiplicity(normalized_multiplicity);

        let tracks: Vec<_> = event
            .tracks
            .iter()
            .filter_map(|track| convert_track(&ctx, &pass, track))
            .collect();
        let v0s = if config.read_v0 {
            event.v0s.iter().filter_map(|v0| build_v0(&ctx, v0)).collect()
        } else {
            Vec::new()
        };
        let xis = if config.read_cascade {
            event
                .cascades
                .iter()
                .filter_map(|cascade| build_xi(&ctx, cascade))
                .collect()
        } else {
            Vec::new()
        };

        let reaction_plane_angle = match (event.event_plane.as_ref(), config.event_plane) {
            (Some(plane), EventPlaneSource::Vzero) => plane.v0,
            (Some(plane), EventPlaneSource::Q) => plane.q,
            (None, _) => event.header.q_theta / 2.0,
        };

        log::trace!(
            "run {}: {} of {} tracks, {} V0s, {} cascades",
            event.run_number,
            tracks.len(),
            event.tracks.len(),
            v0s.len(),
            xis.len()
        );

        Conversion::Accepted(ReconstructedEvent {
            run_number: event.run_number,
            magnetic_field: event.magnetic_field * KILOGAUSS,
            primary_vertex: primary.position,
            reaction_plane_angle,
            centrality: event.centrality.unwrap_or_default(),
            normalized_multiplicity,
            trigger_mask: event.header.trigger_mask,
            trigger_cluster: event.header.trigger_cluster,
            zdc: event.zdc,
            n_tracks: tracks.len(),
            tracks,
            v0s,
            xis,
        })
    }
}
