//! Gaussian neighborhood weighting and the online update rule.

use ndarray::{s, Array2, Array3, ArrayView1};

use crate::error::{Result, SomError};

/// Squared Euclidean grid distance from the BMU to every cell.
///
/// Recomputed per sample; the BMU moves, so there is nothing to cache.
pub fn grid_distances_sq(bmu: (usize, usize), rows: usize, cols: usize) -> Array2<f64> {
    let (br, bc) = (bmu.0 as f64, bmu.1 as f64);
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let dr = br - r as f64;
        let dc = bc - c as f64;
        dr * dr + dc * dc
    })
}

/// Gaussian neighborhood weights `exp(-d / (2 sigma^2))` over a squared
/// grid-distance map. Equal to 1 at the BMU, decaying with grid distance.
pub fn gaussian(grid_dist_sq: &Array2<f64>, sigma: f64) -> Result<Array2<f64>> {
    if sigma <= 0.0 {
        return Err(SomError::Numeric(format!(
            "Neighborhood radius must be positive, got {}",
            sigma
        )));
    }
    let denom = 2.0 * sigma * sigma;
    Ok(grid_dist_sq.mapv(|d| (-d / denom).exp()))
}

/// Applies the online update `w += lr * h * (x - w)` to the whole grid,
/// broadcast over the feature axis.
pub fn apply_update(
    weights: &mut Array3<f64>,
    x: ArrayView1<'_, f64>,
    h: &Array2<f64>,
    learning_rate: f64,
) {
    for ((r, c), &h_rc) in h.indexed_iter() {
        let influence = learning_rate * h_rc;
        let mut cell = weights.slice_mut(s![r, c, ..]);
        cell.zip_mut_with(&x, |w, &xi| *w += influence * (xi - *w));
    }
}
