//! Event-locked epoching and evoked statistics.
//!
//! Slices a continuous [C, T] signal into fixed-length windows aligned to
//! event onsets. Every trial shares the channel set and time axis; a trial
//! whose window would extend past either end of the recording is dropped
//! with a warning, matching `mne.Epochs`' default behaviour.
use crate::config::EpochWindow;
use crate::error::{Error, Result};
use crate::events::Event;
use log::{debug, warn};
use ndarray::{s, Array2, Array3, Axis};

/// A collection of time-locked trials, shape `[trials, channels, samples]`.
#[derive(Debug, Clone)]
pub struct Epochs {
    pub data: Array3<f32>,
    pub sfreq: f32,
    pub window: EpochWindow,
    pub ch_names: Vec<String>,
    /// Events whose window fell outside the recording.
    pub n_dropped: usize,
}

/// Cut one epoch per event from `data` ([C, T]).
///
/// The window starts at `onset + round(tmin * sfreq)` and spans
/// `round((tmax - tmin) * sfreq) + 1` samples (both endpoints included).
///
/// # Errors
///
/// - [`Error::MetadataInconsistency`] when `ch_names` does not match the
///   channel axis of `data`.
/// - [`Error::EventOutOfBounds`] when a non-empty event list yields zero
///   trials; partial overflow only drops the offending trials.
pub fn epoch_events(
    data: &Array2<f32>,
    sfreq: f32,
    events: &[Event],
    window: EpochWindow,
    ch_names: &[String],
) -> Result<Epochs> {
    let (n_ch, n_t) = data.dim();
    if ch_names.len() != n_ch {
        return Err(Error::MetadataInconsistency(format!(
            "{} channel names for {} channels",
            ch_names.len(),
            n_ch
        )));
    }

    let n_samp = window.n_samples(sfreq);
    let offset = window.start_offset(sfreq);

    let mut kept: Vec<usize> = Vec::with_capacity(events.len());
    let mut n_dropped = 0usize;
    for (i, ev) in events.iter().enumerate() {
        let start = ev.onset as i64 + offset;
        if start < 0 || start as usize + n_samp > n_t {
            warn!(
                "dropping event {i} (onset sample {}): window [{}..{}) outside 0..{n_t}",
                ev.onset,
                start,
                start + n_samp as i64
            );
            n_dropped += 1;
            continue;
        }
        kept.push(start as usize);
    }

    if kept.is_empty() && !events.is_empty() {
        return Err(Error::EventOutOfBounds);
    }

    let mut out = Array3::<f32>::zeros((kept.len(), n_ch, n_samp));
    for (e, &start) in kept.iter().enumerate() {
        out.slice_mut(s![e, .., ..])
            .assign(&data.slice(s![.., start..start + n_samp]));
    }

    debug!(
        "epoched {} trials × {} channels × {} samples ({} dropped)",
        kept.len(),
        n_ch,
        n_samp,
        n_dropped
    );

    Ok(Epochs {
        data: out,
        sfreq,
        window,
        ch_names: ch_names.to_vec(),
        n_dropped,
    })
}

impl Epochs {
    pub fn n_trials(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn n_channels(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn n_times(&self) -> usize {
        self.data.shape()[2]
    }

    /// Time axis in seconds relative to event onset.
    pub fn times(&self) -> Vec<f64> {
        self.window.times(self.sfreq)
    }

    /// Across-trial mean and standard error, each shaped `[C, S]`.
    ///
    /// Standard error uses the sample standard deviation (ddof = 1) divided
    /// by `sqrt(trials)`; with fewer than two trials it is identically zero.
    pub fn evoked(&self) -> (Array2<f32>, Array2<f32>) {
        let n_e = self.n_trials();
        let (n_c, n_s) = (self.n_channels(), self.n_times());

        if n_e == 0 {
            return (Array2::zeros((n_c, n_s)), Array2::zeros((n_c, n_s)));
        }
        let mean = self.data.mean_axis(Axis(0)).unwrap();
        let sem = if n_e < 2 {
            Array2::zeros((n_c, n_s))
        } else {
            self.data.std_axis(Axis(0), 1.0) / (n_e as f32).sqrt()
        };
        (mean, sem)
    }
}
