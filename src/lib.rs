//! # hga — event-locked high-gamma analysis for intracranial EEG
//!
//! `hga` loads an iEEG recording and its BIDS-style sidecar tables, computes
//! the high-gamma analytic-amplitude transform, cuts time-locked epochs
//! around experimental events, and renders per-channel evoked responses with
//! standard-error bands.
//!
//! ## Pipeline overview
//!
//! ```text
//! sub-XX_..._ieeg.safetensors + events.tsv
//!   │
//!   ├─ io::Recording::load()       [C, T] f32 + sfreq, channel names
//!   ├─ high_gamma()                8× bandpass (70–150 Hz) → Hilbert
//!   │                              envelope → band average → CAR →
//!   │                              per-channel z-score → 100 Hz
//!   ├─ events::from_rows()         seconds → samples (truncating)
//!   ├─ epochs::epoch_events()      [E, C, S] around each onset
//!   ├─ plot::EvokedGrid            per-channel mean ± SEM grid (PNG)
//!   └─ io::export_epochs()         dense tensor + time axis for other tools
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use hga::{
//!     epoch_events, high_gamma, BidsPath, ColorSpec, EpochWindow,
//!     EvokedGrid, HighGammaConfig, Recording, TraceStyle,
//! };
//!
//! let bids = BidsPath::new("/data/bids", "06", "listen").acquisition("clinical");
//! let rec = Recording::load(&bids.recording_path())?;
//!
//! let cfg = HighGammaConfig::default();
//! let hg = high_gamma(&rec.data, rec.sfreq, &cfg)?;
//!
//! let rows = hga::bids::read_events(&bids.events_path())?;
//! let events = hga::events::from_rows(&rows, cfg.target_sfreq);
//!
//! let window = EpochWindow::new(-0.5, 1.0)?;
//! let epochs = epoch_events(&hg, cfg.target_sfreq, &events, window, &rec.ch_names)?;
//!
//! let mut grid = EvokedGrid::new(epochs.n_channels(), &rec.ch_names)?;
//! grid.add(&epochs, TraceStyle { color: ColorSpec::Named("red".into()), label: "speech".into() })?;
//! grid.save_png(std::path::Path::new("evoked.png"), (1600, 1000))?;
//! # Ok::<(), hga::Error>(())
//! ```

pub mod bids;
pub mod config;
pub mod envelope;
pub mod epochs;
pub mod error;
pub mod events;
pub mod filter;
pub mod io;
pub mod normalize;
mod pad;
pub mod plot;
pub mod reference;
pub mod resample;

use log::{debug, info};
use ndarray::Array2;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `hga::Foo` without having to know the internal module layout.

pub use bids::{AnnotationSpan, BidsPath, ChannelRecord, EventRow};
pub use config::{EpochWindow, HighGammaConfig};
pub use envelope::analytic_amplitude;
pub use epochs::{epoch_events, Epochs};
pub use error::{Error, Result};
pub use events::Event;
pub use filter::{apply_fir_zero_phase, design_bandpass, filter_1d};
pub use io::{export_epochs, write_recording, Recording, TensorWriter};
pub use normalize::zscore_channels_inplace;
pub use plot::{grid_dims, ColorSpec, EvokedGrid, TraceStyle};
pub use reference::common_average_reference_inplace;
pub use resample::resample;

/// Run the **high-gamma transform** on a continuous recording.
///
/// # Pipeline steps
///
/// 1. Split [`HighGammaConfig::band_lo`]`..`[`HighGammaConfig::band_hi`]
///    into [`HighGammaConfig::n_bands`] equal-width sub-bands.
/// 2. For each sub-band: zero-phase FIR bandpass, then the FFT Hilbert
///    analytic-amplitude envelope.
/// 3. Average the envelopes across sub-bands.
/// 4. Common-average re-reference.
/// 5. Per-channel z-score.
/// 6. Resample to [`HighGammaConfig::target_sfreq`].
///
/// # Arguments
///
/// * `data`  – Continuous signal, shape `[C, T]`, at the acquisition rate.
/// * `sfreq` – Sampling rate of `data` in Hz.
/// * `cfg`   – Transform configuration (see [`HighGammaConfig`]).
///
/// # Returns
///
/// The standardized high-gamma amplitude, shape
/// `[C, round(T * target_sfreq / sfreq)]`.
///
/// # Errors
///
/// [`Error::MetadataInconsistency`] when the band does not fit under the
/// Nyquist frequency; FFT-stage failures are propagated.
pub fn high_gamma(
    data: &Array2<f32>,
    sfreq: f32,
    cfg: &HighGammaConfig,
) -> Result<Array2<f32>> {
    cfg.validate(sfreq)?;
    let (n_ch, n_t) = data.dim();
    info!(
        "high-gamma transform: {n_ch} ch × {n_t} samples @ {sfreq} Hz, {} bands {}–{} Hz",
        cfg.n_bands, cfg.band_lo, cfg.band_hi
    );

    let mut acc = Array2::<f32>::zeros((n_ch, n_t));
    for (lo, hi) in cfg.band_edges() {
        debug!("sub-band {lo:.1}–{hi:.1} Hz");
        let h = filter::design_bandpass(lo, hi, sfreq);
        let mut band = data.clone();
        filter::apply_fir_zero_phase(&mut band, &h)?;
        let env = envelope::analytic_amplitude(&band)?;
        acc += &env;
    }
    acc.mapv_inplace(|v| v / cfg.n_bands as f32);

    reference::common_average_reference_inplace(&mut acc);
    normalize::zscore_channels_inplace(&mut acc);

    if (sfreq - cfg.target_sfreq).abs() > 1e-3 {
        debug!("resampling {sfreq} Hz → {} Hz", cfg.target_sfreq);
        acc = resample::resample(&acc, sfreq, cfg.target_sfreq)?;
    }
    Ok(acc)
}
