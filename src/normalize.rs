//! Per-channel z-scoring.
//!
//! After envelope averaging the channels carry wildly different absolute
//! amplitudes (electrode impedance, distance to cortex); standardising each
//! channel against its own statistics makes responses comparable across the
//! grid.
//!
//!   for each channel c:  data[c, :] = (data[c, :] − μ_c) / σ_c   (ddof = 0)
//!
//! Channels with zero variance are left centred but unscaled.
use ndarray::Array2;

/// Z-score every channel in place. Returns the per-channel `(mean, std)`
/// pairs used for the transform.
pub fn zscore_channels_inplace(data: &mut Array2<f32>) -> Vec<(f32, f32)> {
    let n_t = data.ncols();
    let mut stats = Vec::with_capacity(data.nrows());
    if n_t == 0 {
        return stats;
    }

    for mut row in data.rows_mut() {
        let n = n_t as f64;
        let mean = row.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = row
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let std = var.sqrt() as f32;
        let mean = mean as f32;

        if std > 0.0 {
            row.mapv_inplace(|v| (v - mean) / std);
        } else {
            row.mapv_inplace(|v| v - mean);
        }
        stats.push((mean, std));
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_channel_has_zero_mean_unit_std() {
        let mut data = Array2::from_shape_fn((8, 512), |(c, t)| {
            (c as f32 * 3.7 + t as f32 * 0.1).sin() * 50.0 + c as f32 * 100.0
        });
        zscore_channels_inplace(&mut data);

        for row in data.rows() {
            let n = row.len() as f64;
            let mean = row.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = row
                .iter()
                .map(|&v| (v as f64 - mean).powi(2))
                .sum::<f64>()
                / n;
            approx::assert_abs_diff_eq!(mean as f32, 0.0, epsilon = 1e-4_f32);
            approx::assert_abs_diff_eq!(var.sqrt() as f32, 1.0, epsilon = 1e-3_f32);
        }
    }

    #[test]
    fn constant_channel_is_centred_not_scaled() {
        let mut data = Array2::from_elem((2, 128), 7.0_f32);
        let stats = zscore_channels_inplace(&mut data);
        assert_eq!(stats[0].1, 0.0);
        for &v in data.iter() {
            approx::assert_abs_diff_eq!(v, 0.0, epsilon = 1e-6_f32);
        }
    }

    #[test]
    fn returned_stats_match_input() {
        let mut data = Array2::from_shape_fn((1, 4), |(_, t)| t as f32); // 0,1,2,3
        let stats = zscore_channels_inplace(&mut data);
        approx::assert_abs_diff_eq!(stats[0].0, 1.5, epsilon = 1e-6_f32);
        // population std of {0,1,2,3} = sqrt(1.25)
        approx::assert_abs_diff_eq!(stats[0].1, 1.25_f32.sqrt(), epsilon = 1e-6_f32);
    }
}
