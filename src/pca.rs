//! Principal component analysis via power iteration.
//!
//! This is the linear-algebra collaborator behind PCA-seeded weight
//! initialization. Only the top-k eigenpairs of the covariance matrix are
//! extracted, which keeps the routine dependency-free and cheap for the
//! small `k` the map needs.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{Result, SomError};

/// Maximum power-iteration steps per eigenpair.
const MAX_ITERATIONS: usize = 100;

/// Convergence tolerance on the Rayleigh quotient.
const TOLERANCE: f64 = 1e-10;

/// Top-k principal components of a data matrix.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Principal components, one per row, each of length `n_features`.
    pub components: Array2<f64>,
    /// Variance explained by each component, in matching order.
    pub explained_variance: Array1<f64>,
}

/// Computes the sample covariance matrix of `data` (samples x features).
pub fn covariance(data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    let n = data.nrows();
    if n < 2 {
        return Err(SomError::InvalidArgument(format!(
            "Covariance requires at least 2 samples, got {}",
            n
        )));
    }

    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| SomError::EmptyInput("Cannot average an empty matrix".to_string()))?;
    let centered = &data - &mean;

    Ok(centered.t().dot(&centered) / (n - 1) as f64)
}

/// Extracts the top-k principal components and their explained variances.
///
/// Eigenpairs are found one at a time by power iteration, deflating the
/// covariance matrix after each extraction. Components come out ordered by
/// decreasing variance because each deflation removes the current dominant
/// direction.
pub fn fit(data: ArrayView2<'_, f64>, k: usize) -> Result<Pca> {
    let n_features = data.ncols();
    if k == 0 || k > n_features {
        return Err(SomError::InvalidArgument(format!(
            "Cannot extract {} components from {}-dimensional data",
            k, n_features
        )));
    }

    let mut deflated = covariance(data)?;
    let mut components = Array2::zeros((k, n_features));
    let mut explained_variance = Array1::zeros(k);

    for i in 0..k {
        let (value, vector) = dominant_eigenpair(&deflated);
        components.row_mut(i).assign(&vector);
        explained_variance[i] = value;

        // Deflate: A -= lambda * v * v^T
        for a in 0..n_features {
            for b in 0..n_features {
                deflated[[a, b]] -= value * vector[a] * vector[b];
            }
        }
    }

    Ok(Pca {
        components,
        explained_variance,
    })
}

/// Power iteration for the dominant eigenpair of a symmetric matrix.
///
/// If the current iterate lands in the null space (which happens when the
/// starting vector was exactly the direction deflated away), iteration
/// restarts from standard basis vectors before giving up with a zero
/// eigenvalue.
fn dominant_eigenpair(matrix: &Array2<f64>) -> (f64, Array1<f64>) {
    let n = matrix.nrows();
    let mut vector = Array1::from_elem(n, 1.0 / (n as f64).sqrt());
    let mut value = 0.0;
    let mut restarts = 0;

    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        let product = matrix.dot(&vector);

        let norm = product.dot(&product).sqrt();
        if norm < 1e-12 {
            if restarts < n {
                vector = Array1::zeros(n);
                vector[restarts] = 1.0;
                restarts += 1;
                value = 0.0;
                iterations += 1;
                continue;
            }
            // Numerically zero in every direction; remaining variance is
            // zero.
            return (0.0, vector);
        }

        // Rayleigh quotient with the previous (unit-norm) vector.
        let next_value: f64 = vector.dot(&product);

        let next_vector = product / norm;
        let converged = (next_value - value).abs() < TOLERANCE;
        value = next_value;
        vector = next_vector;
        iterations += 1;

        if converged {
            break;
        }
    }

    (value, vector)
}
