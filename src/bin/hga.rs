use anyhow::{bail, Context, Result};
use clap::Parser;
use hga::{
    epoch_events, high_gamma, BidsPath, ColorSpec, EpochWindow, EvokedGrid, HighGammaConfig,
    Recording, TraceStyle,
};
use ndarray::Axis;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hga", about = "Event-locked high-gamma analysis for iEEG")]
struct Args {
    /// BIDS dataset root
    #[arg(long)]
    bids_root: PathBuf,

    /// Subject label (without the sub- prefix)
    #[arg(long)]
    subject: String,

    /// Task label
    #[arg(long)]
    task: String,

    /// Session label
    #[arg(long)]
    session: Option<String>,

    /// Acquisition label
    #[arg(long)]
    acquisition: Option<String>,

    /// Run label
    #[arg(long)]
    run: Option<String>,

    /// Epoch window start in seconds relative to onset (default: -0.5)
    #[arg(long, default_value_t = -0.5, allow_hyphen_values = true)]
    tmin: f64,

    /// Epoch window end in seconds relative to onset (default: 1.0)
    #[arg(long, default_value_t = 1.0)]
    tmax: f64,

    /// Condition to plot as CODE:LABEL:COLOR (repeatable), e.g. 1:speech:red
    #[arg(long = "condition", required = true)]
    conditions: Vec<String>,

    /// High-gamma band lower edge in Hz (default: 70)
    #[arg(long, default_value_t = 70.0)]
    band_lo: f32,

    /// High-gamma band upper edge in Hz (default: 150)
    #[arg(long, default_value_t = 150.0)]
    band_hi: f32,

    /// Number of sub-bands (default: 8)
    #[arg(long, default_value_t = 8)]
    n_bands: usize,

    /// Output sampling rate in Hz (default: 100)
    #[arg(long, default_value_t = 100.0)]
    target_sfreq: f32,

    /// Fixed y range LO:HI instead of auto scaling
    #[arg(long, allow_hyphen_values = true)]
    y_range: Option<String>,

    /// Evoked-grid PNG output path
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Epoch tensor output path (safetensors)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Plot width in pixels
    #[arg(long, default_value_t = 1600)]
    width: u32,

    /// Plot height in pixels
    #[arg(long, default_value_t = 1000)]
    height: u32,
}

/// Parse `CODE:LABEL:COLOR` where COLOR is a palette name or #rrggbb hex.
fn parse_condition(s: &str) -> Result<(i64, TraceStyle)> {
    let parts: Vec<&str> = s.splitn(3, ':').collect();
    if parts.len() != 3 {
        bail!("condition '{s}' is not CODE:LABEL:COLOR");
    }
    let code: i64 = parts[0]
        .parse()
        .with_context(|| format!("condition code '{}' is not an integer", parts[0]))?;
    let color = if parts[2].starts_with('#') {
        ColorSpec::Hex(parts[2].to_string())
    } else {
        ColorSpec::Named(parts[2].to_string())
    };
    Ok((code, TraceStyle { color, label: parts[1].to_string() }))
}

fn parse_y_range(s: &str) -> Result<(f64, f64)> {
    let (lo, hi) = s
        .split_once(':')
        .with_context(|| format!("y range '{s}' is not LO:HI"))?;
    Ok((lo.parse()?, hi.parse()?))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut bids = BidsPath::new(&args.bids_root, &args.subject, &args.task);
    if let Some(s) = &args.session {
        bids = bids.session(s);
    }
    if let Some(a) = &args.acquisition {
        bids = bids.acquisition(a);
    }
    if let Some(r) = &args.run {
        bids = bids.run(r);
    }

    let rec = Recording::load(&bids.recording_path())?;
    println!(
        "Loaded {} ch × {} samples @ {} Hz",
        rec.n_channels(),
        rec.n_samples(),
        rec.sfreq
    );

    // Keep only channels marked good in channels.tsv, when present.
    let (data, ch_names) = match hga::bids::read_channels(&bids.channels_path()) {
        Ok(records) => {
            let good = hga::bids::good_channel_indices(&records, rec.n_channels())?;
            if good.len() != rec.n_channels() {
                println!(
                    "Excluding {} bad channel(s)",
                    rec.n_channels() - good.len()
                );
            }
            let data = rec.data.select(Axis(0), &good);
            let names: Vec<String> = good.iter().map(|&i| rec.ch_names[i].clone()).collect();
            (data, names)
        }
        Err(hga::Error::DataNotFound(_)) => (rec.data.clone(), rec.ch_names.clone()),
        Err(e) => return Err(e.into()),
    };

    let cfg = HighGammaConfig {
        band_lo: args.band_lo,
        band_hi: args.band_hi,
        n_bands: args.n_bands,
        target_sfreq: args.target_sfreq,
    };
    let hg = high_gamma(&data, rec.sfreq, &cfg)?;
    println!(
        "High-gamma envelope: {} ch × {} samples @ {} Hz",
        hg.nrows(),
        hg.ncols(),
        cfg.target_sfreq
    );

    let rows = hga::bids::read_events(&bids.events_path())?;
    let events = hga::events::from_rows(&rows, cfg.target_sfreq);
    println!("Read {} events", events.len());

    let window = EpochWindow::new(args.tmin, args.tmax)?;

    let mut grid = EvokedGrid::new(hg.nrows(), &ch_names)?;
    if let Some(r) = &args.y_range {
        let (lo, hi) = parse_y_range(r)?;
        grid = grid.with_y_range(lo, hi);
    }

    let mut first_epochs = None;
    for spec in &args.conditions {
        let (code, style) = parse_condition(spec)?;
        let selected = hga::events::select(&events, code);
        let epochs = epoch_events(&hg, cfg.target_sfreq, &selected, window, &ch_names)?;
        println!(
            "Condition {code} ('{}'): {} trials ({} dropped)",
            style.label,
            epochs.n_trials(),
            epochs.n_dropped
        );
        grid.add(&epochs, style)?;
        if first_epochs.is_none() {
            first_epochs = Some(epochs);
        }
    }

    if let Some(path) = &args.export {
        let epochs = first_epochs
            .as_ref()
            .context("no condition produced epochs to export")?;
        hga::export_epochs(epochs, path)?;
        println!("Epoch tensor → {}", path.display());
    }

    if let Some(path) = &args.plot {
        grid.save_png(path, (args.width, args.height))?;
        println!("Evoked grid → {}", path.display());
    }

    Ok(())
}
