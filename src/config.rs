//! Pipeline configuration.
//!
//! [`HighGammaConfig`] holds every tunable parameter of the high-gamma
//! transform; [`EpochWindow`] describes the time window cut around each
//! event. Both have defaults matching the published tutorial pipeline.
use crate::error::{Error, Result};

/// Configuration for the high-gamma analytic-amplitude transform.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use hga::HighGammaConfig;
///
/// let cfg = HighGammaConfig {
///     n_bands: 4,            // coarser sub-band stack
///     target_sfreq: 200.0,   // keep more temporal resolution
///     ..HighGammaConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HighGammaConfig {
    /// Lower edge of the high-gamma range in Hz.
    ///
    /// Default: `70.0` Hz.
    pub band_lo: f32,

    /// Upper edge of the high-gamma range in Hz. Must stay below the
    /// Nyquist frequency of the recording being transformed.
    ///
    /// Default: `150.0` Hz.
    pub band_hi: f32,

    /// Number of equal-width sub-bands the range is split into.
    ///
    /// Each sub-band is bandpass-filtered and enveloped separately; the
    /// envelopes are then averaged. More bands flatten the 1/f amplitude
    /// bias across the range at the cost of proportionally more FFTs.
    ///
    /// Default: `8`.
    pub n_bands: usize,

    /// Sampling rate in Hz the envelope is resampled to at the end of the
    /// transform. The envelope of a 70–150 Hz band varies slowly, so 100 Hz
    /// loses nothing of interest while shrinking every downstream array.
    ///
    /// Default: `100.0` Hz.
    pub target_sfreq: f32,
}

impl Default for HighGammaConfig {
    /// Tutorial settings: 70–150 Hz, 8 sub-bands, 100 Hz output.
    fn default() -> Self {
        Self {
            band_lo: 70.0,
            band_hi: 150.0,
            n_bands: 8,
            target_sfreq: 100.0,
        }
    }
}

impl HighGammaConfig {
    /// Edges `(lo, hi)` of each equal-width sub-band.
    ///
    /// ```
    /// use hga::HighGammaConfig;
    /// let cfg = HighGammaConfig { n_bands: 4, ..HighGammaConfig::default() };
    /// let edges = cfg.band_edges();
    /// assert_eq!(edges.len(), 4);
    /// assert_eq!(edges[0], (70.0, 90.0));
    /// assert_eq!(edges[3], (130.0, 150.0));
    /// ```
    pub fn band_edges(&self) -> Vec<(f32, f32)> {
        let width = (self.band_hi - self.band_lo) / self.n_bands as f32;
        (0..self.n_bands)
            .map(|i| {
                let lo = self.band_lo + i as f32 * width;
                (lo, lo + width)
            })
            .collect()
    }

    /// Check the band against a recording's sampling rate.
    pub fn validate(&self, sfreq: f32) -> Result<()> {
        if self.n_bands == 0 {
            return Err(Error::MetadataInconsistency("n_bands must be >= 1".into()));
        }
        if self.band_lo <= 0.0 || self.band_hi <= self.band_lo {
            return Err(Error::MetadataInconsistency(format!(
                "invalid band {}..{} Hz",
                self.band_lo, self.band_hi
            )));
        }
        if self.band_hi >= sfreq / 2.0 {
            return Err(Error::MetadataInconsistency(format!(
                "band edge {} Hz is at or above Nyquist ({} Hz)",
                self.band_hi,
                sfreq / 2.0
            )));
        }
        Ok(())
    }
}

/// Symmetric time window cut around each event onset.
///
/// `tmin` is in seconds relative to the onset (typically negative), `tmax`
/// positive; the window always contains the onset itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochWindow {
    pub tmin: f64,
    pub tmax: f64,
}

impl EpochWindow {
    /// Construct a window, rejecting `tmin > 0`, `tmax < 0` or a
    /// non-finite bound.
    pub fn new(tmin: f64, tmax: f64) -> Result<Self> {
        if !tmin.is_finite() || !tmax.is_finite() || tmin > 0.0 || tmax < 0.0 {
            return Err(Error::MetadataInconsistency(format!(
                "epoch window must satisfy tmin <= 0 <= tmax, got ({tmin}, {tmax})"
            )));
        }
        Ok(Self { tmin, tmax })
    }

    /// Samples per epoch, inclusive of both endpoints:
    /// `round((tmax - tmin) * sfreq) + 1`.
    ///
    /// ```
    /// use hga::EpochWindow;
    /// let w = EpochWindow::new(-0.2, 0.5).unwrap();
    /// assert_eq!(w.n_samples(100.0), 71);
    /// ```
    pub fn n_samples(&self, sfreq: f32) -> usize {
        ((self.tmax - self.tmin) * sfreq as f64).round() as usize + 1
    }

    /// Offset in samples from the event onset to the first window sample
    /// (negative for a pre-onset baseline).
    pub fn start_offset(&self, sfreq: f32) -> i64 {
        (self.tmin * sfreq as f64).round() as i64
    }

    /// Time axis in seconds, one entry per window sample.
    pub fn times(&self, sfreq: f32) -> Vec<f64> {
        let n = self.n_samples(sfreq);
        (0..n).map(|i| self.tmin + i as f64 / sfreq as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_band_edges_cover_range() {
        let cfg = HighGammaConfig::default();
        let edges = cfg.band_edges();
        assert_eq!(edges.len(), 8);
        approx::assert_abs_diff_eq!(edges[0].0, 70.0);
        approx::assert_abs_diff_eq!(edges[7].1, 150.0);
        // Contiguous, no gaps.
        for w in edges.windows(2) {
            approx::assert_abs_diff_eq!(w[0].1, w[1].0, epsilon = 1e-4);
        }
    }

    #[test]
    fn validate_rejects_band_above_nyquist() {
        let cfg = HighGammaConfig::default();
        assert!(cfg.validate(1000.0).is_ok());
        assert!(cfg.validate(250.0).is_err()); // Nyquist 125 < 150
    }

    #[test]
    fn window_sample_counts() {
        let w = EpochWindow::new(-0.2, 0.5).unwrap();
        assert_eq!(w.n_samples(100.0), 71);
        assert_eq!(w.start_offset(100.0), -20);
        let w = EpochWindow::new(-1.0, 1.0).unwrap();
        assert_eq!(w.n_samples(256.0), 513);
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(EpochWindow::new(0.1, 0.5).is_err());
        assert!(EpochWindow::new(-0.5, -0.1).is_err());
        assert!(EpochWindow::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn window_time_axis_endpoints() {
        let w = EpochWindow::new(-0.2, 0.5).unwrap();
        let t = w.times(100.0);
        assert_eq!(t.len(), 71);
        approx::assert_abs_diff_eq!(t[0], -0.2, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(*t.last().unwrap(), 0.5, epsilon = 1e-9);
    }
}
