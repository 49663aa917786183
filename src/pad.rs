//! Reflect-limited edge padding shared by the FIR and resampling stages.
//!
//! Odd reflection around the edge sample:
//!   left:  `pad[i] = 2*x[0]  - x[n_l - i]`
//!   right: `pad[i] = 2*x[-1] - x[-(i+1)]`
//! Padding requests longer than the signal are filled with zeros.

/// Pad `x` with `n_l` samples on the left and `n_r` on the right.
pub(crate) fn reflect_limited(x: &[f32], n_l: usize, n_r: usize) -> Vec<f32> {
    let n = x.len();
    debug_assert!(n > 0);
    let actual_l = n_l.min(n - 1);
    let actual_r = n_r.min(n - 1);

    let mut out = Vec::with_capacity(n_l + n + n_r);

    // Zero-fill for requests longer than the signal allows.
    out.resize(n_l - actual_l, 0.0);
    for i in (1..=actual_l).rev() {
        out.push(2.0 * x[0] - x[i]);
    }

    out.extend_from_slice(x);

    let last = x[n - 1];
    for i in 1..=actual_r {
        out.push(2.0 * last - x[n - 1 - i]);
    }
    out.resize(n_l + n + n_r, 0.0);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_pad_reflects_around_first_sample() {
        let x = [1.0_f32, 2.0, 3.0, 4.0, 5.0];
        let padded = reflect_limited(&x, 3, 0);
        // 2*1 - x[3] = -2,  2*1 - x[2] = -1,  2*1 - x[1] = 0
        assert_eq!(&padded[..3], &[-2.0_f32, -1.0, 0.0]);
        assert_eq!(&padded[3..], &x[..]);
    }

    #[test]
    fn right_pad_reflects_around_last_sample() {
        let x = [1.0_f32, 2.0, 3.0];
        let padded = reflect_limited(&x, 0, 2);
        // 2*3 - x[1] = 4,  2*3 - x[0] = 5
        assert_eq!(&padded[3..], &[4.0_f32, 5.0]);
    }

    #[test]
    fn oversized_request_zero_fills() {
        let x = [1.0_f32, 2.0];
        let padded = reflect_limited(&x, 4, 4);
        assert_eq!(padded.len(), 10);
        assert_eq!(padded[0], 0.0);
        assert_eq!(*padded.last().unwrap(), 0.0);
    }
}
