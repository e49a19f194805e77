//! Transfer of detector PID information onto converted tracks.

use femtoaod_core::raw::status;
use femtoaod_core::{
    DaughterTof, ItsQuality, NSigma, PidResponse, RawTrack, Species, TofPid, TrackPid,
};

/// Largest TOF mismatch probability for which TOF information is used.
pub const MAX_TOF_MISMATCH: f64 = 0.01;

/// Speed of light in cm/ps.
const C_CM_PER_PS: f64 = 0.03;

/// Whether the TOF measurement of `track` can be used.
///
/// Requires the TOF-out and time flags and a small mismatch probability.
#[must_use]
pub fn tof_usable(track: &RawTrack, response: &dyn PidResponse) -> bool {
    track.has_status(status::TOF_OUT | status::TIME)
        && response.tof_mismatch_probability(track) < MAX_TOF_MISMATCH
}

/// PID block of `source`, the track PID is read from.
///
/// `p` is the momentum of the converted track, used for the TOF mass.
#[must_use]
pub fn track_pid(source: &RawTrack, response: &dyn PidResponse, p: f64) -> TrackPid {
    let mut n_sigma_tpc = NSigma::default();
    for species in Species::ALL {
        n_sigma_tpc.set(species, response.n_sigma_tpc(source, species));
    }
    TrackPid {
        probabilities: source.pid_probabilities,
        n_sigma_tpc,
        tpc_signal: source.tpc.signal,
        tpc_signal_n: source.tpc.signal_n,
        tof: tof_pid(source, response, p),
    }
}

fn tof_pid(source: &RawTrack, response: &dyn PidResponse, p: f64) -> TofPid {
    let signal = source.tof.signal;
    if !tof_usable(source, response) {
        return TofPid::unavailable(signal);
    }

    let mut n_sigma = NSigma::default();
    for species in Species::ALL {
        n_sigma.set(species, response.n_sigma_tof(source, species));
    }

    let track_time = signal - response.tof_start_time(source);
    let times = &source.tof.integrated_times;
    let length = source.tof.integrated_length;

    let mut pid = TofPid {
        n_sigma,
        time_pion: track_time - times[2],
        time_kaon: track_time - times[3],
        time_proton: track_time - times[4],
        signal,
        ..TofPid::unavailable(signal)
    };
    if track_time > 0.0 && length > 0.0 {
        let beta = length / track_time / C_CM_PER_PS;
        pid.velocity = beta;
        pid.mass2 = p * p * (1.0 / (beta * beta) - 1.0);
    }
    pid
}

/// ITS quality block of `source`.
#[must_use]
pub fn its_quality(source: &RawTrack) -> ItsQuality {
    ItsQuality {
        chi2: source.its.chi2,
        n_clusters: source.its.n_clusters,
        layer_hits: source.its.layer_hits,
    }
}

/// TOF block of a V0 or cascade daughter.
#[must_use]
pub fn daughter_tof(track: &RawTrack, response: &dyn PidResponse) -> DaughterTof {
    if !tof_usable(track, response) {
        return DaughterTof::unavailable();
    }
    let track_time = track.tof.signal - response.tof_start_time(track);
    let times = &track.tof.integrated_times;
    DaughterTof {
        n_sigma_kaon: response.n_sigma_tof(track, Species::Kaon),
        n_sigma_proton: response.n_sigma_tof(track, Species::Proton),
        n_sigma_pion: response.n_sigma_tof(track, Species::Pion),
        time_pion: track_time - times[2],
        time_kaon: track_time - times[3],
        time_proton: track_time - times[4],
    }
}
