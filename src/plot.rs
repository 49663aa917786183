//! Grid rendering of evoked responses.
//!
//! One subplot per channel, each showing the trial-averaged waveform with a
//! shaded ±SEM band, a vertical reference at t = 0 and a horizontal one at
//! amplitude 0. The figure is an explicit [`EvokedGrid`] owned by the
//! caller: conditions are added one by one (speech vs. music, say), then the
//! grid is rendered once to a drawing area or saved as a PNG. No ambient
//! plotting state is touched.
use crate::epochs::Epochs;
use crate::error::{Error, Result};
use log::debug;
use ndarray::Array2;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

/// `WithKeyPoints<RangedCoordf64>` has no `ValueFormatter` impl in plotters
/// 0.3.7, which `configure_mesh` requires; this wrapper delegates everything
/// and forwards formatting to `RangedCoordf64`.
struct KeyPointsF64(WithKeyPoints<RangedCoordf64>);

impl Ranged for KeyPointsF64 {
    type ValueType = f64;
    type FormatOption = NoDefaultFormatting;

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

impl ValueFormatter<f64> for KeyPointsF64 {
    fn format(value: &f64) -> String {
        <RangedCoordf64 as ValueFormatter<f64>>::format(value)
    }
}

/// Grid layout for `n` channels: `rows = floor(sqrt(n))` (min 1),
/// `cols = ceil(n / rows)`. Favors more columns than rows when `n` is not a
/// perfect square; simple and reproducible rather than optimal.
pub fn grid_dims(n: usize) -> (usize, usize) {
    let rows = ((n as f64).sqrt().floor() as usize).max(1);
    let cols = n.div_ceil(rows);
    (rows, cols)
}

/// Color of a rendered condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    /// Palette entry: `red`, `green`, `blue`, `orange`, `purple`, `cyan`,
    /// `magenta`, `gray`, `black`.
    Named(String),
    /// Explicit RGB triple.
    Rgb(u8, u8, u8),
    /// `#rrggbb` hex string.
    Hex(String),
}

impl ColorSpec {
    pub fn to_rgb(&self) -> Result<RGBColor> {
        match self {
            ColorSpec::Rgb(r, g, b) => Ok(RGBColor(*r, *g, *b)),
            ColorSpec::Named(name) => match name.as_str() {
                "red" => Ok(RGBColor(220, 50, 50)),
                "green" => Ok(RGBColor(50, 150, 50)),
                "blue" => Ok(RGBColor(50, 100, 220)),
                "orange" => Ok(RGBColor(220, 150, 50)),
                "purple" => Ok(RGBColor(150, 50, 220)),
                "cyan" => Ok(RGBColor(50, 200, 200)),
                "magenta" => Ok(RGBColor(220, 50, 150)),
                "gray" => Ok(RGBColor(100, 100, 100)),
                "black" => Ok(RGBColor(0, 0, 0)),
                other => Err(Error::PlotConfiguration(format!(
                    "unknown color name '{other}'"
                ))),
            },
            ColorSpec::Hex(s) => {
                let hex = s.strip_prefix('#').unwrap_or(s);
                if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::PlotConfiguration(format!(
                        "malformed hex color '{s}'"
                    )));
                }
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap();
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap();
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap();
                Ok(RGBColor(r, g, b))
            }
        }
    }
}

/// Line color and legend label for one condition.
#[derive(Debug, Clone)]
pub struct TraceStyle {
    pub color: ColorSpec,
    pub label: String,
}

struct Condition {
    mean: Array2<f32>,
    sem: Array2<f32>,
    color: RGBColor,
    label: String,
}

/// A grid of per-channel evoked responses, one or more conditions overlaid.
pub struct EvokedGrid {
    n_channels: usize,
    ch_names: Vec<String>,
    times: Option<Vec<f64>>,
    y_range: Option<(f64, f64)>,
    conditions: Vec<Condition>,
}

impl EvokedGrid {
    /// A grid showing the first `n_channels` channels, labelled from
    /// `ch_names` (which must be indexable up to `n_channels - 1`).
    pub fn new(n_channels: usize, ch_names: &[String]) -> Result<Self> {
        if n_channels == 0 {
            return Err(Error::PlotConfiguration("grid needs >= 1 channel".into()));
        }
        if ch_names.len() < n_channels {
            return Err(Error::PlotConfiguration(format!(
                "{} channel names for {} grid cells",
                ch_names.len(),
                n_channels
            )));
        }
        Ok(Self {
            n_channels,
            ch_names: ch_names[..n_channels].to_vec(),
            times: None,
            y_range: None,
            conditions: Vec::new(),
        })
    }

    /// Use a fixed symmetric-or-not y range for every subplot instead of the
    /// auto scale, so repeated figures stay visually comparable.
    pub fn with_y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }

    /// Add one condition's epochs. All conditions in a grid must share the
    /// time axis; the epochs must carry at least `n_channels` channels.
    pub fn add(&mut self, epochs: &Epochs, style: TraceStyle) -> Result<()> {
        if epochs.n_channels() < self.n_channels {
            return Err(Error::PlotConfiguration(format!(
                "epochs carry {} channels, grid wants {}",
                epochs.n_channels(),
                self.n_channels
            )));
        }
        let times = epochs.times();
        match &self.times {
            None => self.times = Some(times),
            Some(existing) if *existing == times => {}
            Some(_) => {
                return Err(Error::MetadataInconsistency(
                    "conditions with different time axes in one grid".into(),
                ))
            }
        }
        let (mean, sem) = epochs.evoked();
        self.conditions.push(Condition {
            mean,
            sem,
            color: style.color.to_rgb()?,
            label: style.label,
        });
        Ok(())
    }

    /// Auto y limit: `1.5 × max |trial-average|` over all rendered channels
    /// and conditions, symmetric about zero.
    fn auto_y_limit(&self) -> f64 {
        let mut max_abs = 0.0_f64;
        for cond in &self.conditions {
            for ch in 0..self.n_channels {
                for &v in cond.mean.row(ch).iter() {
                    max_abs = max_abs.max((v as f64).abs());
                }
            }
        }
        1.5 * max_abs
    }

    fn y_limits(&self) -> (f64, f64) {
        match self.y_range {
            Some(r) => r,
            None => {
                let lim = self.auto_y_limit();
                // Degenerate all-zero data still needs a drawable range.
                if lim > 0.0 {
                    (-lim, lim)
                } else {
                    (-1.0, 1.0)
                }
            }
        }
    }

    /// Render into a caller-owned drawing area.
    pub fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        if self.conditions.is_empty() {
            return Err(Error::PlotConfiguration("no conditions added".into()));
        }
        let times = self.times.as_ref().unwrap();
        let (t0, t1) = (times[0], *times.last().unwrap());
        let (y_lo, y_hi) = self.y_limits();
        let (rows, cols) = grid_dims(self.n_channels);
        debug!("rendering {}x{} grid, y in [{y_lo}, {y_hi}]", rows, cols);

        let cells = root.split_evenly((rows, cols));

        for ch in 0..self.n_channels {
            let first = ch == 0;
            let cell = &cells[ch];

            let mut chart = ChartBuilder::on(cell)
                .margin(4)
                .x_label_area_size(if first { 22 } else { 0 })
                .y_label_area_size(if first { 40 } else { 0 })
                .build_cartesian_2d(
                    KeyPointsF64((t0..t1).with_key_points(vec![t0, 0.0, t1])),
                    y_lo..y_hi,
                )
                .map_err(|e| Error::Render(e.to_string()))?;

            // Ticks only on the first subplot: x labels pinned to tmin, 0
            // and tmax, plus the shared amplitude axis.
            if first {
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .disable_y_mesh()
                    .x_labels(3)
                    .x_label_formatter(&|v| format!("{v:.2}"))
                    .y_labels(3)
                    .y_desc("amplitude (z)")
                    .label_style(("sans-serif", 11))
                    .draw()
                    .map_err(|e| Error::Render(e.to_string()))?;
            }

            // Reference lines at t = 0 and amplitude = 0.
            chart
                .draw_series(LineSeries::new(
                    [(0.0, y_lo), (0.0, y_hi)],
                    BLACK.mix(0.4),
                ))
                .map_err(|e| Error::Render(e.to_string()))?;
            chart
                .draw_series(LineSeries::new([(t0, 0.0), (t1, 0.0)], BLACK.mix(0.4)))
                .map_err(|e| Error::Render(e.to_string()))?;

            for cond in &self.conditions {
                let mean = cond.mean.row(ch);
                let sem = cond.sem.row(ch);

                // SEM band: upper edge forward, then lower edge backward.
                let mut band: Vec<(f64, f64)> = Vec::with_capacity(2 * times.len());
                for (i, &t) in times.iter().enumerate() {
                    band.push((t, (mean[i] + sem[i]) as f64));
                }
                for (i, &t) in times.iter().enumerate().rev() {
                    band.push((t, (mean[i] - sem[i]) as f64));
                }
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        band,
                        cond.color.mix(0.25).filled(),
                    )))
                    .map_err(|e| Error::Render(e.to_string()))?;

                let color = cond.color;
                let series = chart
                    .draw_series(LineSeries::new(
                        times
                            .iter()
                            .zip(mean.iter())
                            .map(|(&t, &m)| (t, m as f64)),
                        color.stroke_width(2),
                    ))
                    .map_err(|e| Error::Render(e.to_string()))?;
                if first {
                    series.label(cond.label.clone()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 16, y)], color)
                    });
                }
            }

            if first {
                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK.mix(0.5))
                    .position(SeriesLabelPosition::UpperRight)
                    .label_font(("sans-serif", 11))
                    .draw()
                    .map_err(|e| Error::Render(e.to_string()))?;
            }

            // Channel name as in-plot text, top-left corner.
            chart
                .draw_series(std::iter::once(Text::new(
                    self.ch_names[ch].clone(),
                    (t0 + 0.02 * (t1 - t0), y_hi - 0.1 * (y_hi - y_lo)),
                    ("sans-serif", 12),
                )))
                .map_err(|e| Error::Render(e.to_string()))?;
        }
        Ok(())
    }

    /// Render to a PNG file of the given pixel size.
    pub fn save_png(&self, path: &std::path::Path, size: (u32, u32)) -> Result<()> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| Error::Render(e.to_string()))?;
        self.render(&root)?;
        root.present().map_err(|e| Error::Render(e.to_string()))?;
        Ok(())
    }

    /// Exposed for scale checks: the limits the next `render` will use.
    pub fn effective_y_limits(&self) -> (f64, f64) {
        self.y_limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dims_follow_floor_sqrt_rule() {
        for n in 1..=144usize {
            let (rows, cols) = grid_dims(n);
            assert_eq!(rows, ((n as f64).sqrt().floor() as usize).max(1));
            assert!(rows * cols >= n, "n={n}: {rows}x{cols}");
            assert!(rows >= 1);
        }
        assert_eq!(grid_dims(2), (1, 2));
        assert_eq!(grid_dims(9), (3, 3));
        assert_eq!(grid_dims(10), (3, 4));
    }

    #[test]
    fn named_colors_resolve() {
        assert_eq!(
            ColorSpec::Named("red".into()).to_rgb().unwrap(),
            RGBColor(220, 50, 50)
        );
        assert!(ColorSpec::Named("chartreuse".into()).to_rgb().is_err());
    }

    #[test]
    fn hex_colors_resolve() {
        assert_eq!(
            ColorSpec::Hex("#ff8000".into()).to_rgb().unwrap(),
            RGBColor(255, 128, 0)
        );
        assert_eq!(
            ColorSpec::Hex("00ff00".into()).to_rgb().unwrap(),
            RGBColor(0, 255, 0)
        );
        assert!(ColorSpec::Hex("#12345".into()).to_rgb().is_err());
        assert!(ColorSpec::Hex("zzzzzz".into()).to_rgb().is_err());
    }

    #[test]
    fn grid_rejects_short_name_list() {
        let names = vec!["a".to_string()];
        assert!(EvokedGrid::new(2, &names).is_err());
        assert!(EvokedGrid::new(0, &names).is_err());
        assert!(EvokedGrid::new(1, &names).is_ok());
    }
}
