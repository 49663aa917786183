//! Experimental events in sample units.
//!
//! Sidecar tables store onsets and durations in seconds; everything
//! downstream (epoching, export) works in samples. Conversion truncates
//! (`floor(t * sfreq)`), never rounds — the tutorial pipeline this crate
//! reproduces truncates, and changing the policy would shift every epoch by
//! up to one sample against existing analyses.
use crate::bids::{AnnotationSpan, EventRow};

/// A single event: onset and duration as sample indices plus an integer
/// condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// First sample of the event in the continuous recording.
    pub onset: usize,
    /// Event duration in samples (0 for instantaneous markers).
    pub duration: usize,
    /// Condition code from the `value` column of `events.tsv`.
    pub value: i64,
}

/// Truncating seconds → sample-index conversion.
///
/// Negative times clamp to sample 0; event tables describe onsets within the
/// recording, so a negative onset is already malformed upstream.
pub fn sample_index(t_sec: f64, sfreq: f32) -> usize {
    (t_sec * sfreq as f64).max(0.0) as usize
}

/// Convert `events.tsv` rows to sample-domain events.
pub fn from_rows(rows: &[EventRow], sfreq: f32) -> Vec<Event> {
    rows.iter()
        .map(|r| Event {
            onset: sample_index(r.onset, sfreq),
            duration: sample_index(r.duration, sfreq),
            value: r.value,
        })
        .collect()
}

/// Convert annotation spans (onset/offset pairs, e.g. word-level timing) to
/// events, all sharing the caller-supplied condition code.
pub fn from_annotations(spans: &[AnnotationSpan], sfreq: f32, value: i64) -> Vec<Event> {
    spans
        .iter()
        .map(|s| {
            let onset = sample_index(s.onset, sfreq);
            let offset = sample_index(s.offset, sfreq);
            Event {
                onset,
                duration: offset.saturating_sub(onset),
                value,
            }
        })
        .collect()
}

/// Keep only events with the given condition code.
pub fn select(events: &[Event], value: i64) -> Vec<Event> {
    events.iter().copied().filter(|e| e.value == value).collect()
}
