//! Weight grid initialization strategies.

use ndarray::{s, Array1, Array3, ArrayView2};
use ndarray_rand::RandomExt;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::error::{Result, SomError};
use crate::pca;

/// Creates a `(rows, cols, input_dim)` grid of independent standard-normal
/// draws from the supplied generator.
pub fn random_grid(rows: usize, cols: usize, input_dim: usize, rng: &mut ChaCha8Rng) -> Array3<f64> {
    Array3::random_using((rows, cols, input_dim), StandardNormal, rng)
}

/// Seeds the grid from the top-2 principal components of `data`.
///
/// Two coordinate axes are spaced linearly in `[-1, 1]` (one of length
/// `rows`, one of length `cols`, so non-square grids are well-defined),
/// each scaled by the square root of the matching explained variance. Cell
/// `(r, c)` becomes `alpha[r] * PC1 + beta[c] * PC2`, aligning the initial
/// topology with the data's dominant variance directions.
pub fn pca_grid(
    rows: usize,
    cols: usize,
    input_dim: usize,
    data: Option<ArrayView2<'_, f64>>,
) -> Result<Array3<f64>> {
    let data = data.ok_or_else(|| {
        SomError::InvalidArgument("PCA initialization requires training data".to_string())
    })?;
    if data.ncols() != input_dim {
        return Err(SomError::DimensionMismatch {
            expected: input_dim,
            actual: data.ncols(),
        });
    }

    let pca = pca::fit(data, 2)?;
    let scale_1 = pca.explained_variance[0].max(0.0).sqrt();
    let scale_2 = pca.explained_variance[1].max(0.0).sqrt();

    let alpha = Array1::linspace(-1.0, 1.0, rows) * scale_1;
    let beta = Array1::linspace(-1.0, 1.0, cols) * scale_2;
    let pc1 = pca.components.row(0);
    let pc2 = pca.components.row(1);

    let mut grid = Array3::zeros((rows, cols, input_dim));
    for r in 0..rows {
        for c in 0..cols {
            let cell = &pc1 * alpha[r] + &pc2 * beta[c];
            grid.slice_mut(s![r, c, ..]).assign(&cell);
        }
    }

    Ok(grid)
}
