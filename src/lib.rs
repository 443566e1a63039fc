//! # Topos - Self-Organizing Map engine
//!
//! Topos trains Kohonen Self-Organizing Maps: 2D lattices of reference
//! vectors that approximate a high-dimensional input distribution while
//! preserving its neighborhood topology. Trained maps are used for
//! dimensionality reduction, clustering and visualization.
//!
//! ## Overview
//!
//! Training is online: for every sample, the best-matching unit (BMU) is
//! located on the grid and the whole grid is pulled toward the sample,
//! weighted by a Gaussian neighborhood around the BMU. Both the learning
//! rate and the neighborhood radius anneal over training via stateful
//! exponential schedules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use topos::{Som, SomConfig, SomTrainer};
//!
//! let config = SomConfig {
//!     rows: 12,
//!     cols: 12,
//!     input_dim: 4,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut som = Som::new(&config)?;
//! let mut trainer = SomTrainer::new(config);
//! let metrics = trainer.fit(&mut som, data.view())?;
//!
//! let cells = som.transform(data.view())?;
//! let umatrix = som.umatrix()?;
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - map and training configuration
//! - [`distance`] - pluggable input-space metrics
//! - [`pca`] - power-iteration PCA for seeded initialization
//! - [`som`] - the map, schedules, training loop and quality metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod distance;
pub mod error;
pub mod pca;
pub mod som;

// Re-export commonly used types
pub use config::{InitMethod, SomConfig};
pub use distance::{DistanceFunction, EuclideanDistance};
pub use error::{Result, SomError};
pub use som::{exponential_decay, DecayFn, Scheduler, Som, SomTrainer, TrainingMetrics};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
