//! Efficiency correction weights.
//!
//! Each species may have a 1-D table versus pt and, for some species, a 4-D
//! table versus (η, pt, z, φ). A configured 1-D table always wins and its
//! content is used as read. A 4-D hit of exactly zero means "no correction".

use std::collections::HashMap;
use std::sync::Arc;

use femtoaod_core::{Lookup1D, Lookup4D, TrackWeights, V0Weights, XiWeights};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Species slot of a correction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSpecies {
    PionPlus,
    PionMinus,
    KaonPlus,
    KaonMinus,
    ProtonPlus,
    ProtonMinus,
    DeuteronPlus,
    DeuteronMinus,
    TritonPlus,
    TritonMinus,
    He3Plus,
    He3Minus,
    AlphaPlus,
    AlphaMinus,
    All,
    Lambda,
    AntiLambda,
    K0Short,
    XiPlus,
    XiMinus,
}

impl CorrectionSpecies {
    /// Whether a 4-D table may be configured for this species.
    #[must_use]
    pub fn supports_4d(self) -> bool {
        matches!(
            self,
            CorrectionSpecies::PionPlus
                | CorrectionSpecies::PionMinus
                | CorrectionSpecies::KaonPlus
                | CorrectionSpecies::KaonMinus
                | CorrectionSpecies::ProtonPlus
                | CorrectionSpecies::ProtonMinus
                | CorrectionSpecies::All
                | CorrectionSpecies::Lambda
                | CorrectionSpecies::AntiLambda
        )
    }

    /// 4-D tables for these species hold efficiencies and are inverted.
    #[must_use]
    pub fn inverts_4d(self) -> bool {
        matches!(self, CorrectionSpecies::Lambda | CorrectionSpecies::AntiLambda)
    }
}

/// Coordinates of a correction lookup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub eta: f64,
    pub pt: f64,
    /// z of the object (track reference point or V0 decay vertex).
    pub z: f64,
    pub phi: f64,
}

/// Correction tables keyed by species.
#[derive(Debug, Clone, Default)]
pub struct CorrectionTables {
    one_d: HashMap<CorrectionSpecies, Arc<dyn Lookup1D>>,
    four_d: HashMap<CorrectionSpecies, Arc<dyn Lookup4D>>,
}

impl CorrectionTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a 1-D table versus pt.
    pub fn set_1d(&mut self, species: CorrectionSpecies, table: Arc<dyn Lookup1D>) {
        self.one_d.insert(species, table);
    }

    /// Installs a 4-D table versus (η, pt, z, φ).
    ///
    /// Fails for species that only take 1-D tables.
    pub fn set_4d(&mut self, species: CorrectionSpecies, table: Arc<dyn Lookup4D>) -> Result<()> {
        if !species.supports_4d() {
            return Err(Error::ConfigError(format!(
                "species {species:?} does not take a 4-D correction table"
            )));
        }
        self.four_d.insert(species, table);
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.one_d.is_empty() && self.four_d.is_empty()
    }

    /// Weight for `species` at `kin`, 1.0 when nothing applies.
    #[must_use]
    pub fn weight(&self, species: CorrectionSpecies, kin: &Kinematics) -> f64 {
        if let Some(table) = self.one_d.get(&species) {
            return table.content(kin.pt);
        }
        let Some(table) = self.four_d.get(&species) else {
            return 1.0;
        };
        let content = table.content([kin.eta, kin.pt, kin.z, kin.phi]);
        if content == 0.0 {
            1.0
        } else if species.inverts_4d() {
            1.0 / content
        } else {
            content
        }
    }

    /// Weights of a charged track.
    #[must_use]
    pub fn track_weights(&self, kin: &Kinematics) -> TrackWeights {
        use CorrectionSpecies as S;
        TrackWeights {
            pions_plus: self.weight(S::PionPlus, kin),
            pions_minus: self.weight(S::PionMinus, kin),
            kaons_plus: self.weight(S::KaonPlus, kin),
            kaons_minus: self.weight(S::KaonMinus, kin),
            protons_plus: self.weight(S::ProtonPlus, kin),
            protons_minus: self.weight(S::ProtonMinus, kin),
            deuterons_plus: self.weight(S::DeuteronPlus, kin),
            deuterons_minus: self.weight(S::DeuteronMinus, kin),
            tritons_plus: self.weight(S::TritonPlus, kin),
            tritons_minus: self.weight(S::TritonMinus, kin),
            he3_plus: self.weight(S::He3Plus, kin),
            he3_minus: self.weight(S::He3Minus, kin),
            alphas_plus: self.weight(S::AlphaPlus, kin),
            alphas_minus: self.weight(S::AlphaMinus, kin),
            all: self.weight(S::All, kin),
        }
    }

    /// Weights of a V0.
    #[must_use]
    pub fn v0_weights(&self, kin: &Kinematics) -> V0Weights {
        V0Weights {
            lambda: self.weight(CorrectionSpecies::Lambda, kin),
            anti_lambda: self.weight(CorrectionSpecies::AntiLambda, kin),
            k0_short: self.weight(CorrectionSpecies::K0Short, kin),
        }
    }

    /// Weights of a cascade.
    #[must_use]
    pub fn xi_weights(&self, kin: &Kinematics) -> XiWeights {
        XiWeights {
            xi_plus: self.weight(CorrectionSpecies::XiPlus, kin),
            xi_minus: self.weight(CorrectionSpecies::XiMinus, kin),
        }
    }
}
