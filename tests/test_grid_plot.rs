mod common;

use common::sine_wave;
use hga::{epoch_events, ColorSpec, EpochWindow, Event, EvokedGrid, TraceStyle};
use ndarray::{Array2, Axis};

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("G{i}")).collect()
}

fn style(color: &str, label: &str) -> TraceStyle {
    TraceStyle {
        color: ColorSpec::Named(color.into()),
        label: label.into(),
    }
}

/// Epochs with a known evoked shape: every trial of channel `c` is a sine
/// with amplitude `c + 1` plus trial-dependent jitter.
fn jittered_epochs(n_ch: usize, n_trials: usize) -> hga::Epochs {
    let sfreq = 100.0_f32;
    let trial_len = 120;
    let n_t = (n_trials + 1) * trial_len;
    let mut data = Array2::<f32>::zeros((n_ch, n_t));
    for ch in 0..n_ch {
        for trial in 0..n_trials {
            let wave = sine_wave(trial_len, sfreq, 5.0, (ch + 1) as f32, 0.0);
            for (i, &v) in wave.iter().enumerate() {
                // Deterministic per-trial jitter so the SEM is nonzero.
                data[[ch, trial * trial_len + i]] = v + 0.1 * trial as f32;
            }
        }
    }
    let events: Vec<Event> = (0..n_trials)
        .map(|trial| Event { onset: trial * trial_len + 40, duration: 0, value: 1 })
        .collect();
    let window = EpochWindow::new(-0.2, 0.5).unwrap();
    epoch_events(&data, sfreq, &events, window, &names(n_ch)).unwrap()
}

#[test]
fn auto_y_limit_is_1_5_times_peak_average() {
    let epochs = jittered_epochs(3, 4);
    let mut grid = EvokedGrid::new(3, &names(3)).unwrap();
    grid.add(&epochs, style("red", "a")).unwrap();

    let (mean, _) = epochs.evoked();
    let max_abs = mean.iter().fold(0.0_f64, |m, &v| m.max((v as f64).abs()));
    let (lo, hi) = grid.effective_y_limits();
    approx::assert_abs_diff_eq!(hi, 1.5 * max_abs, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(lo, -1.5 * max_abs, epsilon = 1e-9);
}

#[test]
fn explicit_y_range_is_used_verbatim() {
    let epochs = jittered_epochs(2, 3);
    let mut grid = EvokedGrid::new(2, &names(2)).unwrap().with_y_range(-0.5, 2.0);
    grid.add(&epochs, style("blue", "a")).unwrap();
    assert_eq!(grid.effective_y_limits(), (-0.5, 2.0));
}

#[test]
fn sem_band_contains_the_mean() {
    let epochs = jittered_epochs(2, 5);
    let (mean, sem) = epochs.evoked();
    assert!(sem.iter().any(|&v| v > 0.0), "fixture should have spread");
    for ch in 0..mean.len_of(Axis(0)) {
        for t in 0..mean.len_of(Axis(1)) {
            let (m, s) = (mean[[ch, t]], sem[[ch, t]]);
            assert!(s >= 0.0);
            assert!(m - s <= m && m <= m + s);
        }
    }
}

#[test]
fn two_conditions_render_to_png() {
    let a = jittered_epochs(5, 4);
    let b = jittered_epochs(5, 3);

    let mut grid = EvokedGrid::new(5, &names(5)).unwrap();
    grid.add(&a, style("red", "speech")).unwrap();
    grid.add(&b, style("blue", "music")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.png");
    grid.save_png(&path, (900, 600)).unwrap();

    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0, "empty PNG written");
}

#[test]
fn x_axis_labels_sit_at_window_endpoints() {
    use plotters::prelude::*;

    let epochs = jittered_epochs(2, 3); // window -0.2 .. 0.5
    let mut grid = EvokedGrid::new(2, &names(2)).unwrap();
    grid.add(&epochs, style("red", "a")).unwrap();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (800, 500)).into_drawing_area();
        root.fill(&WHITE).unwrap();
        grid.render(&root).unwrap();
        root.present().unwrap();
    }
    // Ticks are pinned to tmin, 0 and tmax, not to "nice" positions.
    assert!(svg.contains("-0.20"), "missing tmin tick label");
    assert!(svg.contains("0.00"), "missing zero tick label");
    assert!(svg.contains("0.50"), "missing tmax tick label");
}

#[test]
fn mismatched_time_axes_are_rejected() {
    let a = jittered_epochs(2, 3);

    // Same data, different window → different time axis.
    let sfreq = 100.0;
    let data = Array2::<f32>::zeros((2, 500));
    let events = vec![Event { onset: 250, duration: 0, value: 1 }];
    let window = EpochWindow::new(-0.1, 0.1).unwrap();
    let b = epoch_events(&data, sfreq, &events, window, &names(2)).unwrap();

    let mut grid = EvokedGrid::new(2, &names(2)).unwrap();
    grid.add(&a, style("red", "a")).unwrap();
    let err = grid.add(&b, style("blue", "b")).unwrap_err();
    assert!(matches!(err, hga::Error::MetadataInconsistency(_)));
}

#[test]
fn grid_wanting_more_channels_than_data_is_rejected() {
    let epochs = jittered_epochs(2, 3);
    let mut grid = EvokedGrid::new(4, &names(4)).unwrap();
    let err = grid.add(&epochs, style("red", "a")).unwrap_err();
    assert!(matches!(err, hga::Error::PlotConfiguration(_)));
}

#[test]
fn rendering_an_empty_grid_is_rejected() {
    let grid = EvokedGrid::new(2, &names(2)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = grid
        .save_png(&dir.path().join("empty.png"), (400, 300))
        .unwrap_err();
    assert!(matches!(err, hga::Error::PlotConfiguration(_)));
}
