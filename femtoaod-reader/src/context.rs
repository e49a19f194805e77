//! Per-event state shared by the track, V0 and cascade converters.

use femtoaod_core::{
    McHeader, McParticle, PidResponse, PileUpUtils, RawEvent, ThreeVector, Vertex, KILOGAUSS,
};

use crate::config::ReaderConfig;

/// Truth information available to the converters.
#[derive(Debug, Clone, Copy)]
pub struct McView<'a> {
    pub header: Option<&'a McHeader>,
    pub particles: &'a [McParticle],
}

/// Everything a converter needs to know about the accepted event.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    pub event: &'a RawEvent,
    pub config: &'a ReaderConfig,
    pub pid: &'a dyn PidResponse,
    pub pile_up: &'a dyn PileUpUtils,
    pub primary: Vertex,
    /// Event field in tesla.
    pub field: f64,
    pub multiplicity: i32,
    pub mc: Option<McView<'a>>,
}

impl<'a> EventContext<'a> {
    #[must_use]
    pub fn new(
        event: &'a RawEvent,
        config: &'a ReaderConfig,
        pid: &'a dyn PidResponse,
        pile_up: &'a dyn PileUpUtils,
        primary: Vertex,
    ) -> Self {
        Self {
            event,
            config,
            pid,
            pile_up,
            primary,
            field: event.magnetic_field * KILOGAUSS,
            multiplicity: 0,
            mc: mc_view(event, config),
        }
    }

    /// Primary-vertex position.
    #[must_use]
    pub fn vertex(&self) -> ThreeVector {
        self.primary.position
    }

    #[must_use]
    pub fn with_multiplicity(mut self, multiplicity: i32) -> Self {
        self.multiplicity = multiplicity;
        self
    }
}

/// Truth view of `event` when truth reading is enabled.
#[must_use]
pub fn mc_view<'a>(event: &'a RawEvent, config: &ReaderConfig) -> Option<McView<'a>> {
    if !config.read_mc {
        return None;
    }
    let Some(particles) = event.mc_particles.as_deref() else {
        log::warn!(
            "truth reading enabled but event {} has no particle table",
            event.run_number
        );
        return None;
    };
    if event.mc_header.is_none() {
        log::warn!(
            "truth reading enabled but event {} has no generator header",
            event.run_number
        );
    }
    Some(McView {
        header: event.mc_header.as_ref(),
        particles,
    })
}
