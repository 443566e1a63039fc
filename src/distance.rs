//! Distance metrics between an input vector and the weight grid.

use ndarray::{Array2, ArrayView1, ArrayView3, Axis};

/// A metric producing the distance from one input vector to every cell of
/// the weight grid.
///
/// Implementations receive the full `(rows, cols, input_dim)` grid and
/// return a `(rows, cols)` distance map. The map is consumed by BMU search
/// and by the quality metrics, so a custom metric changes both consistently.
pub trait DistanceFunction: Send + Sync {
    /// Computes the distance from `x` to every reference vector in `grid`.
    fn distances(&self, x: ArrayView1<'_, f64>, grid: ArrayView3<'_, f64>) -> Array2<f64>;
}

/// Euclidean norm, broadcast over the grid. The default metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceFunction for EuclideanDistance {
    fn distances(&self, x: ArrayView1<'_, f64>, grid: ArrayView3<'_, f64>) -> Array2<f64> {
        let diff = &grid - &x;
        diff.map_axis(Axis(2), |lane| lane.dot(&lane).sqrt())
    }
}
