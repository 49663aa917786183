mod common;

use common::recording_with_bursts;
use hga::{epoch_events, grid_dims, high_gamma, EpochWindow, Event, HighGammaConfig};
use ndarray::Array2;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("G{i}")).collect()
}

#[test]
fn epoching_and_grid_layout_end_to_end() {
    // 2-channel, 1000-sample recording at 100 Hz; two in-bounds events.
    let data = Array2::from_shape_fn((2, 1000), |(c, t)| ((c * 1000 + t) as f32).sin());
    let events = vec![
        Event { onset: 500, duration: 50, value: 1 },
        Event { onset: 700, duration: 50, value: 1 },
    ];
    let window = EpochWindow::new(-0.2, 0.5).unwrap();
    let epochs = epoch_events(&data, 100.0, &events, window, &names(2)).unwrap();

    assert_eq!(epochs.data.dim(), (2, 2, 71));
    assert_eq!(grid_dims(2), (1, 2));
}

#[test]
fn high_gamma_bursts_raise_the_envelope_at_event_times() {
    // 4 s at 1000 Hz, bursts of 300 ms at two onsets on two of the four
    // electrodes.
    let sfreq = 1000.0;
    let onsets = [1000_usize, 2500];
    let data = recording_with_bursts(4, 4000, sfreq, &onsets, 300, &[0, 1]);

    let cfg = HighGammaConfig::default();
    let hg = high_gamma(&data, sfreq, &cfg).unwrap();

    // Resampled to 100 Hz: 4000 samples → 400.
    assert_eq!(hg.dim(), (4, 400));

    // The z-scored envelope must be clearly higher inside the bursts than
    // in quiet stretches on the responsive channels.
    for ch in [0_usize, 1] {
        let burst_mean: f32 = (105..125).map(|t| hg[[ch, t]]).sum::<f32>() / 20.0;
        let quiet_mean: f32 = (50..70).map(|t| hg[[ch, t]]).sum::<f32>() / 20.0;
        assert!(
            burst_mean > quiet_mean + 1.0,
            "ch{ch}: burst {burst_mean:.2} vs quiet {quiet_mean:.2}"
        );
    }
}

#[test]
fn transform_epoch_average_recovers_the_response() {
    // Full chain: transform, epoch around both bursts, average. The evoked
    // mean should peak after onset on the responsive channel.
    let sfreq = 1000.0;
    let onsets = [1000_usize, 2500];
    let data = recording_with_bursts(4, 4000, sfreq, &onsets, 300, &[0]);

    let cfg = HighGammaConfig::default();
    let hg = high_gamma(&data, sfreq, &cfg).unwrap();

    // Onsets land at 1/10 the sample index after the 1000 → 100 Hz resample.
    let events: Vec<Event> = onsets
        .iter()
        .map(|&o| Event { onset: o / 10, duration: 30, value: 1 })
        .collect();
    let window = EpochWindow::new(-0.5, 0.5).unwrap();
    let epochs = epoch_events(&hg, cfg.target_sfreq, &events, window, &names(4)).unwrap();
    assert_eq!(epochs.n_trials(), 2);
    assert_eq!(epochs.n_times(), 101);

    let (mean, _) = epochs.evoked();
    // Pre-onset baseline: samples 0..40 (−0.5..−0.1 s); response window:
    // 55..85 (0.05..0.35 s).
    let pre: f32 = (0..40).map(|t| mean[[0, t]]).sum::<f32>() / 40.0;
    let post: f32 = (55..85).map(|t| mean[[0, t]]).sum::<f32>() / 30.0;
    assert!(post > pre + 1.0, "post {post:.2} vs pre {pre:.2}");

    // A silent electrode shows no such rise.
    let pre_q: f32 = (0..40).map(|t| mean[[2, t]]).sum::<f32>() / 40.0;
    let post_q: f32 = (55..85).map(|t| mean[[2, t]]).sum::<f32>() / 30.0;
    assert!(post_q < pre_q + 1.0, "quiet channel rose: {pre_q:.2} → {post_q:.2}");
}

#[test]
fn band_above_nyquist_is_rejected() {
    let data = Array2::<f32>::zeros((1, 1000));
    let cfg = HighGammaConfig::default();
    let err = high_gamma(&data, 100.0, &cfg).unwrap_err();
    assert!(matches!(err, hga::Error::MetadataInconsistency(_)));
}
