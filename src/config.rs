//! Configuration for the Topos SOM engine.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SomError};

/// Strategy used to create the initial weight grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitMethod {
    /// Every weight component is an independent standard-normal draw.
    Random,
    /// Seed the grid from the top-2 principal components of the data.
    Pca,
}

/// Self-Organizing Map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Number of grid rows.
    /// Default: 10.
    pub rows: usize,

    /// Number of grid columns.
    /// Default: 10.
    pub cols: usize,

    /// Dimensionality of the weight vectors, matching the data features.
    /// Default: 3.
    pub input_dim: usize,

    /// Weight initialization strategy.
    /// Default: random.
    pub init: InitMethod,

    /// Number of training epochs (full passes over the data).
    /// Default: 20.
    pub n_epochs: usize,

    /// Reshuffle the sample order independently every epoch.
    /// Default: true.
    pub shuffle: bool,

    /// Log one progress line per epoch.
    /// Default: true.
    pub verbose: bool,

    /// Initial learning rate.
    /// Default: 1.0.
    pub initial_learning_rate: f64,

    /// Final learning rate.
    /// Default: 0.01.
    pub final_learning_rate: f64,

    /// Initial neighborhood radius.
    /// Default: None, meaning `max(rows, cols) / 2`.
    pub initial_radius: Option<f64>,

    /// Final neighborhood radius.
    /// Default: 1.0.
    pub final_radius: f64,

    /// Number of samples consumed between scheduler advances.
    /// Default: 100.
    pub schedule_step: usize,

    /// Random seed for reproducibility.
    /// Default: None (random).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            input_dim: 3,
            init: InitMethod::Random,
            n_epochs: 20,
            shuffle: true,
            verbose: true,
            initial_learning_rate: 1.0,
            final_learning_rate: 0.01,
            initial_radius: None,
            final_radius: 1.0,
            schedule_step: 100,
            seed: None,
        }
    }
}

impl SomConfig {
    /// Returns the total number of grid cells.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns the configured initial radius, or the `max(rows, cols) / 2`
    /// default when unset.
    #[inline]
    pub fn initial_radius_or_default(&self) -> f64 {
        self.initial_radius
            .unwrap_or_else(|| self.rows.max(self.cols) as f64 / 2.0)
    }

    /// Checks the configuration for values that would make training
    /// undefined.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SomError::Config(format!(
                "Grid size must be non-zero, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.input_dim == 0 {
            return Err(SomError::Config(
                "Input dimension must be non-zero".to_string(),
            ));
        }
        if self.schedule_step == 0 {
            return Err(SomError::Config(
                "Schedule step size must be non-zero".to_string(),
            ));
        }
        if self.initial_learning_rate <= 0.0 || self.final_learning_rate <= 0.0 {
            return Err(SomError::Config(format!(
                "Learning rates must be positive, got {} -> {}",
                self.initial_learning_rate, self.final_learning_rate
            )));
        }
        let initial_radius = self.initial_radius_or_default();
        if initial_radius <= 0.0 || self.final_radius <= 0.0 {
            return Err(SomError::Config(format!(
                "Neighborhood radii must be positive, got {} -> {}",
                initial_radius, self.final_radius
            )));
        }
        Ok(())
    }
}
