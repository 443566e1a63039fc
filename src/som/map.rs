//! The Self-Organizing Map model.

use ndarray::{Array2, Array3, ArrayView1, ArrayView2};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::{InitMethod, SomConfig};
use crate::distance::{DistanceFunction, EuclideanDistance};
use crate::error::{Result, SomError};
use crate::som::init;

/// A Self-Organizing Map: a 2D lattice of reference vectors trained to
/// approximate the input distribution while preserving neighborhood
/// topology.
///
/// The map owns its weight grid exclusively; queries borrow the model
/// immutably and never mutate it, while training mutates the grid in place
/// through [`SomTrainer`](crate::som::SomTrainer).
pub struct Som {
    rows: usize,
    cols: usize,
    input_dim: usize,
    init: InitMethod,
    distance: Box<dyn DistanceFunction>,
    weights: Option<Array3<f64>>,
}

impl Som {
    /// Creates an uninitialized map with the default Euclidean metric.
    pub fn new(config: &SomConfig) -> Result<Self> {
        Self::with_distance(config, Box::new(EuclideanDistance))
    }

    /// Creates an uninitialized map with an injected distance metric.
    pub fn with_distance(config: &SomConfig, distance: Box<dyn DistanceFunction>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rows: config.rows,
            cols: config.cols,
            input_dim: config.input_dim,
            init: config.init,
            distance,
            weights: None,
        })
    }

    /// Number of grid rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Weight vector dimensionality.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Whether the weight grid has been created.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.weights.is_some()
    }

    /// The weight grid, if initialized.
    pub fn weights(&self) -> Option<&Array3<f64>> {
        self.weights.as_ref()
    }

    pub(crate) fn weights_mut(&mut self) -> Option<&mut Array3<f64>> {
        self.weights.as_mut()
    }

    /// Replaces the weight grid with an externally built one.
    pub fn set_weights(&mut self, weights: Array3<f64>) -> Result<()> {
        let expected = [self.rows, self.cols, self.input_dim];
        if weights.shape() != expected {
            return Err(SomError::InvalidArgument(format!(
                "Weight grid shape {:?} does not match map shape {:?}",
                weights.shape(),
                expected
            )));
        }
        self.weights = Some(weights);
        Ok(())
    }

    /// Creates the weight grid using the configured initialization method.
    ///
    /// PCA initialization needs `data`; random initialization ignores it.
    pub fn initialize(
        &mut self,
        rng: &mut ChaCha8Rng,
        data: Option<ArrayView2<'_, f64>>,
    ) -> Result<()> {
        let weights = match self.init {
            InitMethod::Random => init::random_grid(self.rows, self.cols, self.input_dim, rng),
            InitMethod::Pca => init::pca_grid(self.rows, self.cols, self.input_dim, data)?,
        };
        self.weights = Some(weights);
        Ok(())
    }

    /// Distance from `x` to every reference vector, via the configured
    /// metric.
    pub(crate) fn distance_map(&self, x: ArrayView1<'_, f64>) -> Result<Array2<f64>> {
        if x.len() != self.input_dim {
            return Err(SomError::DimensionMismatch {
                expected: self.input_dim,
                actual: x.len(),
            });
        }
        let weights = self.weights.as_ref().ok_or(SomError::NotInitialized)?;
        Ok(self.distance.distances(x, weights.view()))
    }

    /// Finds the Best Matching Unit for an input vector.
    ///
    /// Ties break to the first cell in row-major flattened order.
    pub fn find_bmu(&self, x: ArrayView1<'_, f64>) -> Result<(usize, usize)> {
        let map = self.distance_map(x)?;

        let mut best = (0, 0);
        let mut best_dist = f64::INFINITY;
        for ((r, c), &dist) in map.indexed_iter() {
            if dist < best_dist {
                best_dist = dist;
                best = (r, c);
            }
        }
        Ok(best)
    }

    /// Finds the two closest cells for an input vector, closest first.
    ///
    /// On a single-cell grid there is no distinct runner-up and both
    /// coordinates are `(0, 0)`.
    pub fn find_two_bmus(&self, x: ArrayView1<'_, f64>) -> Result<((usize, usize), (usize, usize))> {
        let map = self.distance_map(x)?;

        let mut best = (0, 0);
        let mut best_dist = f64::INFINITY;
        let mut second = (0, 0);
        let mut second_dist = f64::INFINITY;
        for ((r, c), &dist) in map.indexed_iter() {
            if dist < best_dist {
                second = best;
                second_dist = best_dist;
                best = (r, c);
                best_dist = dist;
            } else if dist < second_dist {
                second = (r, c);
                second_dist = dist;
            }
        }
        if second_dist.is_infinite() {
            second = best;
        }
        Ok((best, second))
    }

    /// Maps every sample to its BMU coordinate.
    ///
    /// Read-only; calling it twice on the same data yields identical
    /// coordinates.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Vec<(usize, usize)>> {
        if data.ncols() != self.input_dim {
            return Err(SomError::DimensionMismatch {
                expected: self.input_dim,
                actual: data.ncols(),
            });
        }
        if !self.is_initialized() {
            return Err(SomError::NotInitialized);
        }

        (0..data.nrows())
            .into_par_iter()
            .map(|i| self.find_bmu(data.row(i)))
            .collect()
    }

    /// Alias of [`transform`](Som::transform) for estimator-style callers.
    pub fn predict(&self, data: ArrayView2<'_, f64>) -> Result<Vec<(usize, usize)>> {
        self.transform(data)
    }
}
