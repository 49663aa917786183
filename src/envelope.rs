//! Analytic-amplitude envelope via the FFT Hilbert transform.
//!
//! Matches `scipy.signal.hilbert` followed by `abs()`: the full-length FFT
//! of each channel has its negative frequencies zeroed and its positive
//! frequencies doubled (DC and Nyquist kept as-is); the magnitude of the
//! inverse transform is the instantaneous amplitude.
use crate::error::Result;
use ndarray::Array2;
use rustfft::{num_complex::Complex, FftPlanner};

/// Per-sample instantaneous amplitude of each channel, returned as a new
/// `[C, T]` array.
///
/// The input is expected to be a band-limited (already bandpass-filtered)
/// signal; the envelope of a broadband signal is not meaningful.
pub fn analytic_amplitude(data: &Array2<f32>) -> Result<Array2<f32>> {
    let (n_ch, n_t) = data.dim();
    let mut out = Array2::<f32>::zeros((n_ch, n_t));
    if n_t == 0 {
        return Ok(out);
    }

    let mut planner: FftPlanner<f32> = FftPlanner::new();
    let fft_fwd = planner.plan_fft_forward(n_t);
    let fft_inv = planner.plan_fft_inverse(n_t);
    let inv_scale = 1.0 / n_t as f32;

    for (ch, row) in data.rows().into_iter().enumerate() {
        let mut buf: Vec<Complex<f32>> =
            row.iter().map(|&v| Complex { re: v, im: 0.0 }).collect();
        fft_fwd.process(&mut buf);

        // Analytic-signal weights: keep DC (and Nyquist for even T),
        // double the positive frequencies, zero the negative ones.
        let half = n_t / 2;
        if n_t % 2 == 0 {
            for b in buf[1..half].iter_mut() {
                *b *= 2.0;
            }
            for b in buf[half + 1..].iter_mut() {
                *b = Complex::default();
            }
        } else {
            for b in buf[1..=half].iter_mut() {
                *b *= 2.0;
            }
            for b in buf[half + 1..].iter_mut() {
                *b = Complex::default();
            }
        }

        fft_inv.process(&mut buf);
        for (t, c) in buf.iter().enumerate() {
            out[[ch, t]] = c.norm() * inv_scale;
        }
    }
    Ok(out)
}
