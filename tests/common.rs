/// Shared synthetic-signal builders for integration tests.
///
/// No recorded ground-truth vectors: every fixture is generated with a known
/// analytic answer (tone amplitudes, burst times) the tests check against.
use ndarray::Array2;
use std::f32::consts::TAU;

#[allow(unused)]
/// Sinusoid of `freq` Hz sampled at `sfreq`.
pub fn sine_wave(n: usize, sfreq: f32, freq: f32, amp: f32, phase: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amp * (TAU * freq * i as f32 / sfreq + phase).sin())
        .collect()
}

#[allow(unused)]
/// Deterministic pseudo-noise (xorshift), zero-mean.
pub fn white_noise(n: usize, amp: f32, seed: u64) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let u = (state >> 11) as f32 / (1u64 << 53) as f32;
            amp * (2.0 * u - 1.0)
        })
        .collect()
}

#[allow(unused)]
/// Multi-channel recording with 110 Hz bursts of `burst_len` samples
/// starting at each onset, on top of a low-frequency background.
///
/// Bursts appear only on `burst_chans` (responsive electrodes); the common
/// average reference would cancel a burst present identically on every
/// channel. Burst amplitude is large against the background so the envelope
/// response is unambiguous.
pub fn recording_with_bursts(
    n_ch: usize,
    n_t: usize,
    sfreq: f32,
    onsets: &[usize],
    burst_len: usize,
    burst_chans: &[usize],
) -> Array2<f32> {
    let mut data = Array2::<f32>::zeros((n_ch, n_t));
    for ch in 0..n_ch {
        let slow = sine_wave(n_t, sfreq, 3.0, 1.0, ch as f32 * 0.4);
        let noise = white_noise(n_t, 0.1, 7 + ch as u64);
        for t in 0..n_t {
            data[[ch, t]] = slow[t] + noise[t];
        }
        if burst_chans.contains(&ch) {
            let amp = 4.0 + ch as f32;
            for &onset in onsets {
                for t in onset..(onset + burst_len).min(n_t) {
                    data[[ch, t]] += amp * (TAU * 110.0 * t as f32 / sfreq).sin();
                }
            }
        }
    }
    data
}
