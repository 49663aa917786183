//! Windowed-sinc FIR bandpass design, matching `scipy.signal.firwin` /
//! `mne.filter.create_filter(fir_window='hamming', fir_design='firwin')`.
//!
//! For a passband `l_freq..h_freq` at sampling rate `sfreq`:
//!   • transition bandwidth per edge = min(max(0.25 * f, 2.0), f)
//!   • filter length N = ceil(3.3 / min(trans_bw) * sfreq), rounded to odd
//!   • kernel = lowpass(upper cutoff) − lowpass(lower cutoff)
use std::f64::consts::PI;

/// MNE-compatible transition bandwidth for a band edge at `freq` Hz.
///
/// Rule: `min(max(0.25 * freq, 2.0), freq)`
pub fn auto_trans_bandwidth(freq: f32) -> f32 {
    (0.25 * freq).max(2.0).min(freq)
}

/// Number of FIR taps for a given transition bandwidth.
/// Returns an odd integer (required for zero-phase linear-phase FIR).
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f32, sfreq: f32) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 {
        n_raw + 1
    } else {
        n_raw
    }
}

/// Design a zero-phase bandpass FIR for `l_freq..h_freq` Hz.
///
/// Both cutoffs sit at the midpoint of their transition bands (the firwin
/// −6 dB convention); the upper transition is clipped so the stopband edge
/// stays below Nyquist. The tap count comes from the narrower transition
/// band, so the lower edge (sharper in Hz terms) governs the length.
///
/// Returns the impulse response `h[N]` as `Vec<f32>`, symmetric, with zero
/// DC gain.
pub fn design_bandpass(l_freq: f32, h_freq: f32, sfreq: f32) -> Vec<f32> {
    let nyq = sfreq / 2.0;
    let tb_lo = auto_trans_bandwidth(l_freq);
    let tb_hi = auto_trans_bandwidth(h_freq).min(2.0 * (nyq - h_freq));
    let n = auto_filter_length(tb_lo.min(tb_hi), sfreq);

    // firwin cutoffs at the midpoints of the transition bands.
    let cut_lo = l_freq - tb_lo / 2.0;
    let cut_hi = (h_freq + tb_hi / 2.0).min(nyq * 0.999);

    let h_upper = firwin(n, cut_hi, sfreq);
    let h_lower = firwin(n, cut_lo, sfreq);

    h_upper
        .iter()
        .zip(h_lower.iter())
        .map(|(&u, &l)| (u - l) as f32)
        .collect()
}

/// Hamming-windowed sinc lowpass of odd length `n`, unit DC gain.
///
/// `cutoff_hz` is the −6 dB point.
pub fn firwin(n: usize, cutoff_hz: f32, sfreq: f32) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let nyq = sfreq as f64 / 2.0;
    let fc = cutoff_hz as f64 / nyq; // normalised [0, 1]

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // f(x) = sin(π·fc·x) / (π·x);  lim_{x→0} f(x) = fc
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    // Normalise so sum = 1 (unit DC gain).
    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);
    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}
