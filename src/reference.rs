//! Common-average re-referencing.
//!
//! iEEG amplifiers record against an arbitrary hardware reference; the
//! common-average reference (CAR) subtracts the across-channel mean at each
//! time point, matching `raw.set_eeg_reference('average', projection=False)`.
//!
//! `data`: [C, T]  →  `data[c, t] -= mean(data[:, t])`
use ndarray::{Array2, Axis};

pub fn common_average_reference_inplace(data: &mut Array2<f32>) {
    if data.nrows() == 0 {
        return;
    }
    let means = data.mean_axis(Axis(0)).unwrap(); // shape [T]
    for mut row in data.rows_mut() {
        row -= &means;
    }
}
