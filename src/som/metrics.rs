//! Map quality metrics: quantization error, topographic error, U-matrix.

use ndarray::{s, Array2, ArrayView2};
use rayon::prelude::*;

use crate::error::{Result, SomError};
use crate::som::Som;

/// Lattice adjacency: both coordinates within one cell of each other.
#[inline]
fn adjacent(a: (usize, usize), b: (usize, usize)) -> bool {
    let dr = (a.0 as i64 - b.0 as i64).abs();
    let dc = (a.1 as i64 - b.1 as i64).abs();
    dr <= 1 && dc <= 1
}

impl Som {
    /// Mean distance from each sample to its nearest reference vector.
    ///
    /// Lower is better; this measures how faithfully the grid represents
    /// the data.
    pub fn quantization_error(&self, data: ArrayView2<'_, f64>) -> Result<f64> {
        if data.nrows() == 0 {
            return Err(SomError::EmptyInput(
                "Quantization error over zero samples".to_string(),
            ));
        }

        // Per-sample minima in parallel, summed in sample order so repeated
        // runs produce bit-identical results.
        let minima: Vec<f64> = (0..data.nrows())
            .into_par_iter()
            .map(|i| {
                let map = self.distance_map(data.row(i))?;
                Ok(map.iter().copied().fold(f64::INFINITY, f64::min))
            })
            .collect::<Result<_>>()?;

        Ok(minima.iter().sum::<f64>() / minima.len() as f64)
    }

    /// Percentage of samples whose two closest reference vectors are not
    /// lattice-adjacent, in `[0, 100]`.
    ///
    /// A grid with fewer than two cells has no distinct runner-up; its
    /// topographic error is defined as zero.
    pub fn topographic_error(&self, data: ArrayView2<'_, f64>) -> Result<f64> {
        if data.nrows() == 0 {
            return Err(SomError::EmptyInput(
                "Topographic error over zero samples".to_string(),
            ));
        }
        if self.rows() * self.cols() < 2 {
            // Touch the grid anyway so an uninitialized map still errors.
            self.distance_map(data.row(0))?;
            return Ok(0.0);
        }

        let folds: Vec<bool> = (0..data.nrows())
            .into_par_iter()
            .map(|i| {
                let (first, second) = self.find_two_bmus(data.row(i))?;
                Ok(!adjacent(first, second))
            })
            .collect::<Result<_>>()?;

        let folded = folds.iter().filter(|&&f| f).count();
        Ok(100.0 * folded as f64 / folds.len() as f64)
    }

    /// The U-matrix: per cell, the inverse-grid-distance-weighted average
    /// input-space distance to its existing lattice neighbors.
    ///
    /// Up to 8 neighbors per cell, clipped at the grid edges; diagonal
    /// neighbors weigh `1/sqrt(2)` of orthogonal ones. High values mark
    /// cluster boundaries.
    pub fn umatrix(&self) -> Result<Array2<f64>> {
        let weights = self.weights().ok_or(SomError::NotInitialized)?;
        let (rows, cols) = (self.rows(), self.cols());

        let mut umatrix = Array2::zeros((rows, cols));
        for r in 0..rows {
            for c in 0..cols {
                let cell = weights.slice(s![r, c, ..]);
                let map = self.distance_map(cell)?;

                let mut weighted_sum = 0.0;
                let mut weight_total = 0.0;
                for dr in -1i64..=1 {
                    for dc in -1i64..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = r as i64 + dr;
                        let nc = c as i64 + dc;
                        if nr < 0 || nr >= rows as i64 || nc < 0 || nc >= cols as i64 {
                            continue;
                        }
                        let w = 1.0 / ((dr * dr + dc * dc) as f64).sqrt();
                        weighted_sum += w * map[[nr as usize, nc as usize]];
                        weight_total += w;
                    }
                }

                umatrix[[r, c]] = if weight_total > 0.0 {
                    weighted_sum / weight_total
                } else {
                    0.0
                };
            }
        }

        Ok(umatrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SomConfig;
    use ndarray::{array, Array3};

    fn som_with_weights(rows: usize, cols: usize, input_dim: usize, weights: Array3<f64>) -> Som {
        let config = SomConfig {
            rows,
            cols,
            input_dim,
            ..Default::default()
        };
        let mut som = Som::new(&config).unwrap();
        som.set_weights(weights).unwrap();
        som
    }

    #[test]
    fn test_adjacency() {
        assert!(adjacent((2, 2), (2, 2)));
        assert!(adjacent((2, 2), (3, 3)));
        assert!(adjacent((2, 2), (1, 2)));
        assert!(!adjacent((2, 2), (4, 2)));
        assert!(!adjacent((0, 0), (0, 2)));
    }

    #[test]
    fn test_quantization_error_single_cell() {
        // One reference vector at the origin: the error is the mean norm.
        let som = som_with_weights(1, 1, 2, Array3::zeros((1, 1, 2)));
        let data = array![[3.0, 4.0], [0.0, 0.0], [6.0, 8.0]];

        let qe = som.quantization_error(data.view()).unwrap();
        assert!((qe - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_topographic_error_single_cell_is_zero() {
        let som = som_with_weights(1, 1, 2, Array3::zeros((1, 1, 2)));
        let data = array![[3.0, 4.0], [1.0, 1.0]];
        assert_eq!(som.topographic_error(data.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_topographic_error_detects_folds() {
        // Two closest vectors at opposite grid corners: every sample folds.
        let mut weights = Array3::from_elem((3, 3, 1), 100.0);
        weights[[0, 0, 0]] = 0.0;
        weights[[2, 2, 0]] = 0.1;
        let som = som_with_weights(3, 3, 1, weights);

        let data = array![[0.0], [0.05]];
        assert_eq!(som.topographic_error(data.view()).unwrap(), 100.0);

        // Move the runner-up next to the winner: no folds.
        let mut weights = Array3::from_elem((3, 3, 1), 100.0);
        weights[[0, 0, 0]] = 0.0;
        weights[[0, 1, 0]] = 0.1;
        let som = som_with_weights(3, 3, 1, weights);
        assert_eq!(som.topographic_error(data.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_umatrix_shape_and_uniform_grid() {
        let som = som_with_weights(4, 6, 3, Array3::from_elem((4, 6, 3), 0.5));
        let umatrix = som.umatrix().unwrap();

        assert_eq!(umatrix.shape(), &[4, 6]);
        // Identical reference vectors everywhere: no boundaries anywhere.
        assert!(umatrix.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn test_umatrix_marks_boundary() {
        // Left half at 0, right half at 1: the seam columns stand out.
        let mut weights = Array3::zeros((3, 4, 1));
        weights.slice_mut(s![.., 2.., ..]).fill(1.0);
        let som = som_with_weights(3, 4, 1, weights);

        let umatrix = som.umatrix().unwrap();
        assert!(umatrix[[1, 1]] > umatrix[[1, 0]]);
        assert!(umatrix[[1, 2]] > umatrix[[1, 3]]);
    }
}
