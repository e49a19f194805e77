//! Particle species known to the reader.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Charged species with PID response and truth-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Species {
    Electron,
    Pion,
    Kaon,
    Proton,
    Deuteron,
    Triton,
    He3,
    Alpha,
}

impl Species {
    /// All species, in PID block order.
    pub const ALL: [Species; 8] = [
        Species::Electron,
        Species::Pion,
        Species::Kaon,
        Species::Proton,
        Species::Deuteron,
        Species::Triton,
        Species::He3,
        Species::Alpha,
    ];

    /// Absolute PDG code (light nuclei use the generator's private codes).
    #[must_use]
    pub fn pdg_code(self) -> i32 {
        match self {
            Species::Electron => 11,
            Species::Pion => 211,
            Species::Kaon => 321,
            Species::Proton => 2212,
            Species::Deuteron => 1_000_010_020,
            Species::Triton => 1_000_010_040,
            Species::He3 => 700_302,
            Species::Alpha => 700_202,
        }
    }

    /// Species for an (unsigned) PDG code.
    #[must_use]
    pub fn from_pdg(code: i32) -> Option<Self> {
        let code = code.abs();
        Self::ALL.into_iter().find(|s| s.pdg_code() == code)
    }

    /// Rest mass in GeV/c².
    #[must_use]
    pub fn mass(self) -> f64 {
        match self {
            Species::Electron => mass::ELECTRON,
            Species::Pion => mass::PION,
            Species::Kaon => mass::KAON,
            Species::Proton => mass::PROTON,
            Species::Deuteron => mass::DEUTERON,
            Species::Triton => mass::TRITON,
            Species::He3 => mass::HE3,
            Species::Alpha => mass::ALPHA,
        }
    }
}

/// Particle masses in GeV/c².
pub mod mass {
    pub const ELECTRON: f64 = 0.000_510_998_95;
    pub const PION: f64 = 0.139_570_39;
    pub const KAON: f64 = 0.493_677;
    pub const PROTON: f64 = 0.938_272_088;
    pub const DEUTERON: f64 = 1.875_612_94;
    pub const TRITON: f64 = 2.808_921_13;
    pub const HE3: f64 = 2.808_391_61;
    pub const ALPHA: f64 = 3.727_379_41;
    pub const LAMBDA: f64 = 1.115_683;
    pub const K0_SHORT: f64 = 0.497_611;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdg_lookup_ignores_sign() {
        assert_eq!(Species::from_pdg(-211), Some(Species::Pion));
        assert_eq!(Species::from_pdg(1_000_010_020), Some(Species::Deuteron));
        assert_eq!(Species::from_pdg(3122), None);
    }
}
