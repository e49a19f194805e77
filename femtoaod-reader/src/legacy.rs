//! Legacy Pb-Pb pile-up rejection procedures.
//!
//! Two fixed procedures, one per data-taking period, each a pure function of
//! the raw event and its own curve set. They report the first failing check.

use std::fmt;

use femtoaod_core::{CentralityPercentiles, RawEvent};

use crate::curves::PileUpCurves;

/// Filter bit mask of TPC-only tracks.
const MASK_TPC_ONLY: u32 = 128;
/// Filter bit mask of the FB32 global tracks.
const MASK_FB32: u32 = 32;

/// Maximum allowed |V0M − CL1| centrality difference.
const CENTRALITY_CONSISTENCY: f64 = 7.5;

/// Data-taking period selecting the legacy procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum LegacyYear {
    /// 2015 Pb-Pb pass 2 (label 2).
    Pass2015,
    /// 2018 Pb-Pb (label 3).
    Run2018,
}

impl TryFrom<i32> for LegacyYear {
    type Error = femtoaod_core::Error;

    fn try_from(label: i32) -> Result<Self, Self::Error> {
        match label {
            2 => Ok(LegacyYear::Pass2015),
            3 => Ok(LegacyYear::Run2018),
            other => Err(femtoaod_core::Error::UnknownLegacyYear(other)),
        }
    }
}

impl From<LegacyYear> for i32 {
    fn from(year: LegacyYear) -> Self {
        match year {
            LegacyYear::Pass2015 => 2,
            LegacyYear::Run2018 => 3,
        }
    }
}

/// Check that rejected an event in a legacy procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCheck {
    ReferenceMultiplicity,
    IncompleteDaq,
    /// A primary-vertex coordinate is exactly at the origin (2018).
    VertexAtOrigin,
    /// |vz| above 10 cm (2018).
    VertexZRange,
    VertexContributors,
    /// Track and SPD vertices disagree in z (2015).
    VertexMismatch,
    MissingCentrality,
    CentralityConsistency,
    CentralityBand,
    ItsClusters,
    V0Charge,
    TpcOnlyTracks,
    Fb32Multiplicity,
}

impl fmt::Display for LegacyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LegacyCheck::ReferenceMultiplicity => "negative combined reference multiplicity",
            LegacyCheck::IncompleteDaq => "incomplete DAQ",
            LegacyCheck::VertexAtOrigin => "primary vertex coordinate at origin",
            LegacyCheck::VertexZRange => "primary vertex z out of range",
            LegacyCheck::VertexContributors => "too few vertex contributors",
            LegacyCheck::VertexMismatch => "track and SPD vertex mismatch",
            LegacyCheck::MissingCentrality => "no centrality information",
            LegacyCheck::CentralityConsistency => "V0M and CL1 centrality disagree",
            LegacyCheck::CentralityBand => "CL0 centrality outside band",
            LegacyCheck::ItsClusters => "SPD cluster pile-up",
            LegacyCheck::V0Charge => "V0 online charge pile-up",
            LegacyCheck::TpcOnlyTracks => "TPC-only track pile-up",
            LegacyCheck::Fb32Multiplicity => "FB32 multiplicity pile-up",
        };
        f.write_str(text)
    }
}

/// Runs the procedure for `year`.
pub fn apply(
    year: LegacyYear,
    event: &RawEvent,
    curves: &PileUpCurves,
) -> Result<(), LegacyCheck> {
    match year {
        LegacyYear::Pass2015 => pass2_2015(event, curves),
        LegacyYear::Run2018 => run2_2018(event, curves),
    }
}

/// 2015 pass-2 procedure.
pub fn pass2_2015(event: &RawEvent, curves: &PileUpCurves) -> Result<(), LegacyCheck> {
    check_reference_multiplicity(event)?;
    check_daq(event)?;
    check_contributors(event)?;

    let (Some(primary), Some(spd)) = (event.primary_vertex.as_ref(), event.spd_vertex.as_ref())
    else {
        return Err(LegacyCheck::VertexContributors);
    };
    let dz = primary.position.z - spd.position.z;
    let err_total = (primary.sigma2_z() + spd.sigma2_z()).sqrt();
    let err_track = primary.sigma2_z().sqrt();
    if dz.abs() > 0.2 || dz.abs() / err_total > 10.0 || dz.abs() / err_track > 20.0 {
        return Err(LegacyCheck::VertexMismatch);
    }

    let centrality = check_centrality_consistency(event)?;

    check_centrality_band(&centrality, curves)?;
    check_its_clusters(event, curves)?;
    check_v0_charge(event, curves)?;

    let tpc_only = count_with_mask(event, MASK_TPC_ONLY);
    if !(f64::from(event.header.n_esd_tracks) - 3.38 * f64::from(tpc_only) < 15000.0) {
        return Err(LegacyCheck::TpcOnlyTracks);
    }

    check_fb32(event, &centrality, curves)
}

/// 2018 procedure.
pub fn run2_2018(event: &RawEvent, curves: &PileUpCurves) -> Result<(), LegacyCheck> {
    let Some(primary) = event.primary_vertex.as_ref() else {
        return Err(LegacyCheck::VertexContributors);
    };
    let v = primary.position;
    if v.x.abs() < 1e-6 || v.y.abs() < 1e-6 || v.z.abs() < 1e-6 {
        return Err(LegacyCheck::VertexAtOrigin);
    }
    if v.z.abs() > 10.0 {
        return Err(LegacyCheck::VertexZRange);
    }
    check_contributors(event)?;

    let centrality = check_centrality_consistency(event)?;

    check_centrality_band(&centrality, curves)?;
    check_its_clusters(event, curves)?;
    check_v0_charge(event, curves)?;
    check_fb32(event, &centrality, curves)?;
    check_reference_multiplicity(event)?;
    check_daq(event)
}

fn check_reference_multiplicity(event: &RawEvent) -> Result<(), LegacyCheck> {
    if event.header.ref_mult_comb08 < 0 {
        return Err(LegacyCheck::ReferenceMultiplicity);
    }
    Ok(())
}

fn check_daq(event: &RawEvent) -> Result<(), LegacyCheck> {
    if event.header.daq_incomplete {
        return Err(LegacyCheck::IncompleteDaq);
    }
    Ok(())
}

fn check_contributors(event: &RawEvent) -> Result<(), LegacyCheck> {
    let primary_ok = event
        .primary_vertex
        .as_ref()
        .is_some_and(|v| v.n_contributors >= 2);
    let spd_ok = event
        .spd_vertex
        .as_ref()
        .is_some_and(|v| v.n_contributors >= 1);
    if !primary_ok || !spd_ok {
        return Err(LegacyCheck::VertexContributors);
    }
    Ok(())
}

fn check_centrality_consistency(event: &RawEvent) -> Result<CentralityPercentiles, LegacyCheck> {
    let Some(centrality) = event.centrality else {
        return Err(LegacyCheck::MissingCentrality);
    };
    if (centrality.v0m - centrality.cl1).abs() > CENTRALITY_CONSISTENCY || centrality.v0m < 0.0 {
        return Err(LegacyCheck::CentralityConsistency);
    }
    Ok(centrality)
}

fn check_centrality_band(
    centrality: &CentralityPercentiles,
    curves: &PileUpCurves,
) -> Result<(), LegacyCheck> {
    if centrality.cl0 < curves.centrality_low.eval(centrality.v0m)
        || centrality.cl0 > curves.centrality_high.eval(centrality.v0m)
    {
        return Err(LegacyCheck::CentralityBand);
    }
    Ok(())
}

fn check_its_clusters(event: &RawEvent, curves: &PileUpCurves) -> Result<(), LegacyCheck> {
    let clusters = event.its_clusters[0] + event.its_clusters[1];
    if f64::from(clusters) > curves.its_clusters.eval(f64::from(event.spd_tracklets)) {
        return Err(LegacyCheck::ItsClusters);
    }
    Ok(())
}

fn check_v0_charge(event: &RawEvent, curves: &PileUpCurves) -> Result<(), LegacyCheck> {
    let vzero = &event.vzero;
    let online = vzero.trigger_charge_a + vzero.trigger_charge_c;
    let offline = vzero.mtot_v0a + vzero.mtot_v0c;
    if online < curves.v0_charge.eval(offline) {
        return Err(LegacyCheck::V0Charge);
    }
    Ok(())
}

fn check_fb32(
    event: &RawEvent,
    centrality: &CentralityPercentiles,
    curves: &PileUpCurves,
) -> Result<(), LegacyCheck> {
    let fb32 = count_with_mask(event, MASK_FB32);
    if f64::from(fb32) < curves.fb32_multiplicity.eval(centrality.v0m) {
        return Err(LegacyCheck::Fb32Multiplicity);
    }
    Ok(())
}

fn count_with_mask(event: &RawEvent, mask: u32) -> i32 {
    let count = event
        .tracks
        .iter()
        .filter(|t| t.test_filter_mask(mask))
        .count();
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use femtoaod_core::{RawTrack, ThreeVector, Vertex};

    /// A central-ish 2015 event that passes every check.
    fn clean_event() -> RawEvent {
        let centrality = CentralityPercentiles {
            v0m: 30.0,
            cl1: 31.0,
            cl0: 30.0,
            ..CentralityPercentiles::default()
        };
        let mut event = RawEvent {
            primary_vertex: Some(
                Vertex::new(ThreeVector::new(0.01, 0.02, 1.0), 500)
                    .with_covariance([0.0, 0.0, 0.0, 0.0, 0.0, 0.0004]),
            ),
            spd_vertex: Some(
                Vertex::new(ThreeVector::new(0.01, 0.02, 1.01), 300)
                    .with_covariance([0.0, 0.0, 0.0, 0.0, 0.0, 0.0009]),
            ),
            centrality: Some(centrality),
            spd_tracklets: 1000,
            its_clusters: [2000, 2000, 0, 0, 0, 0],
            ..RawEvent::default()
        };
        event.vzero.mtot_v0a = 5000.0;
        event.vzero.mtot_v0c = 5000.0;
        event.vzero.trigger_charge_a = 6000.0;
        event.vzero.trigger_charge_c = 6000.0;
        event.header.n_esd_tracks = 4000;
        event.tracks = (0..2500)
            .map(|i| RawTrack {
                id: i,
                filter_map: 32 | 128,
                ..RawTrack::default()
            })
            .collect();
        event
    }

    #[test]
    fn test_year_labels() {
        assert_eq!(LegacyYear::try_from(2).unwrap(), LegacyYear::Pass2015);
        assert_eq!(LegacyYear::try_from(3).unwrap(), LegacyYear::Run2018);
        assert!(LegacyYear::try_from(1).is_err());
    }

    #[test]
    fn test_clean_event_passes_2015() {
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(pass2_2015(&clean_event(), &curves), Ok(()));
    }

    #[test]
    fn test_negative_reference_multiplicity() {
        let mut event = clean_event();
        event.header.ref_mult_comb08 = -1;
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(
            pass2_2015(&event, &curves),
            Err(LegacyCheck::ReferenceMultiplicity)
        );
    }

    #[test]
    fn test_vertex_mismatch() {
        let mut event = clean_event();
        if let Some(spd) = event.spd_vertex.as_mut() {
            spd.position.z = 1.5;
        }
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(pass2_2015(&event, &curves), Err(LegacyCheck::VertexMismatch));
    }

    #[test]
    fn test_centrality_disagreement() {
        let mut event = clean_event();
        if let Some(c) = event.centrality.as_mut() {
            c.cl1 = 40.0;
        }
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(
            pass2_2015(&event, &curves),
            Err(LegacyCheck::CentralityConsistency)
        );
    }

    #[test]
    fn test_its_cluster_pile_up() {
        let mut event = clean_event();
        event.its_clusters = [5000, 5000, 0, 0, 0, 0];
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(pass2_2015(&event, &curves), Err(LegacyCheck::ItsClusters));
    }

    #[test]
    fn test_tpc_only_pile_up() {
        let mut event = clean_event();
        event.header.n_esd_tracks = 30_000;
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(pass2_2015(&event, &curves), Err(LegacyCheck::TpcOnlyTracks));
    }

    #[test]
    fn test_2018_vertex_at_origin() {
        let mut event = clean_event();
        if let Some(v) = event.primary_vertex.as_mut() {
            v.position.x = 0.0;
        }
        let curves = PileUpCurves::run2_2018();
        assert_eq!(run2_2018(&event, &curves), Err(LegacyCheck::VertexAtOrigin));
    }

    #[test]
    fn test_2018_checks_daq_last() {
        let mut event = clean_event();
        event.header.daq_incomplete = true;
        event.primary_vertex = Some(Vertex::new(ThreeVector::new(0.01, 0.02, 12.0), 500));
        let curves = PileUpCurves::run2_2018();
        assert_eq!(run2_2018(&event, &curves), Err(LegacyCheck::VertexZRange));
        // 2015 checks DAQ before anything touching the vertex
        let curves = PileUpCurves::pass2_2015();
        assert_eq!(pass2_2015(&event, &curves), Err(LegacyCheck::IncompleteDaq));
    }
}
