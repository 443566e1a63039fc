//! The online training loop.

use log::info;
use ndarray::ArrayView2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SomConfig;
use crate::error::{Result, SomError};
use crate::som::neighborhood;
use crate::som::{Scheduler, Som};

/// Per-epoch metric series recorded during a fit.
///
/// Returned to the caller and not retained by the trainer.
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Quantization error after each epoch.
    pub quantization_errors: Vec<f64>,
    /// Topographic error after each epoch, as a percentage.
    pub topographic_errors: Vec<f64>,
    /// Learning rate in effect at the end of each epoch.
    pub learning_rates: Vec<f64>,
    /// Neighborhood radius in effect at the end of each epoch.
    pub radii: Vec<f64>,
}

/// SOM trainer with configurable hyperparameters.
///
/// Training is strictly online: the grid is mutated after every single
/// sample, so the learned map depends on sample order and shuffling changes
/// the result even under a fixed seed elsewhere.
pub struct SomTrainer {
    config: SomConfig,
    rng: ChaCha8Rng,
}

impl SomTrainer {
    /// Creates a new trainer with the given configuration.
    pub fn new(config: SomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    /// The default learning-rate schedule for a dataset of `n_samples`.
    pub fn default_lr_scheduler(&self, n_samples: usize) -> Result<Scheduler> {
        Scheduler::new(
            self.config.initial_learning_rate,
            self.config.final_learning_rate,
            self.config.schedule_step,
            n_samples,
            self.config.n_epochs,
        )
    }

    /// The default neighborhood-radius schedule for a dataset of
    /// `n_samples`.
    pub fn default_radius_scheduler(&self, n_samples: usize) -> Result<Scheduler> {
        Scheduler::new(
            self.config.initial_radius_or_default(),
            self.config.final_radius,
            self.config.schedule_step,
            n_samples,
            self.config.n_epochs,
        )
    }

    /// Fits the map to `data` using the default annealing schedules.
    ///
    /// Initializes the weight grid on first use (PCA initialization reads
    /// `data`). The trained grid stays in the [`Som`]; the per-epoch metric
    /// series are returned.
    pub fn fit(&mut self, som: &mut Som, data: ArrayView2<'_, f64>) -> Result<TrainingMetrics> {
        let lr = self.default_lr_scheduler(data.nrows())?;
        let radius = self.default_radius_scheduler(data.nrows())?;
        self.fit_with_schedulers(som, data, lr, radius)
    }

    /// Fits the map with caller-supplied learning-rate and radius
    /// schedules.
    pub fn fit_with_schedulers(
        &mut self,
        som: &mut Som,
        data: ArrayView2<'_, f64>,
        mut lr_scheduler: Scheduler,
        mut radius_scheduler: Scheduler,
    ) -> Result<TrainingMetrics> {
        let n_samples = data.nrows();
        if n_samples == 0 {
            return Err(SomError::EmptyInput(
                "Cannot fit on zero samples".to_string(),
            ));
        }
        if data.ncols() != som.input_dim() {
            return Err(SomError::DimensionMismatch {
                expected: som.input_dim(),
                actual: data.ncols(),
            });
        }

        if !som.is_initialized() {
            som.initialize(&mut self.rng, Some(data))?;
        }

        let (rows, cols) = (som.rows(), som.cols());
        let n_epochs = self.config.n_epochs;
        let mut metrics = TrainingMetrics::default();

        let mut order: Vec<usize> = (0..n_samples).collect();
        for epoch in 0..n_epochs {
            if self.config.shuffle {
                order.shuffle(&mut self.rng);
            }

            for (i, &sample_idx) in order.iter().enumerate() {
                let total = epoch * n_samples + i;
                let lr = lr_scheduler.step(total);
                let sigma = radius_scheduler.step(total);

                let x = data.row(sample_idx);
                let bmu = som.find_bmu(x)?;

                let grid_dist = neighborhood::grid_distances_sq(bmu, rows, cols);
                let h = neighborhood::gaussian(&grid_dist, sigma)?;
                let weights = som.weights_mut().ok_or(SomError::NotInitialized)?;
                neighborhood::apply_update(weights, x, &h, lr);
            }

            // Epoch metrics always run over the original data order.
            let qe = som.quantization_error(data)?;
            let te = som.topographic_error(data)?;
            metrics.quantization_errors.push(qe);
            metrics.topographic_errors.push(te);
            metrics.learning_rates.push(lr_scheduler.current_value());
            metrics.radii.push(radius_scheduler.current_value());

            if self.config.verbose {
                info!(
                    "Epoch {}/{}: quantization error {:.6}, topographic error {:.3}%",
                    epoch + 1,
                    n_epochs,
                    qe,
                    te
                );
            }
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn test_config() -> SomConfig {
        SomConfig {
            rows: 4,
            cols: 4,
            input_dim: 2,
            n_epochs: 10,
            seed: Some(42),
            verbose: false,
            ..Default::default()
        }
    }

    fn corners() -> ndarray::Array2<f64> {
        array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
    }

    #[test]
    fn test_fit_records_one_entry_per_epoch() {
        let config = test_config();
        let mut som = Som::new(&config).unwrap();
        let mut trainer = SomTrainer::new(config);

        let data = corners();
        let metrics = trainer.fit(&mut som, data.view()).unwrap();

        assert!(som.is_initialized());
        assert_eq!(metrics.quantization_errors.len(), 10);
        assert_eq!(metrics.topographic_errors.len(), 10);
        assert_eq!(metrics.learning_rates.len(), 10);
        assert_eq!(metrics.radii.len(), 10);
        assert!(metrics
            .topographic_errors
            .iter()
            .all(|&te| (0.0..=100.0).contains(&te)));
    }

    #[test]
    fn test_fit_is_deterministic_under_seed() {
        let run = || {
            let config = test_config();
            let mut som = Som::new(&config).unwrap();
            let mut trainer = SomTrainer::new(config);
            let data = corners();
            let metrics = trainer.fit(&mut som, data.view()).unwrap();
            (som.weights().unwrap().clone(), metrics)
        };

        let (weights_a, metrics_a) = run();
        let (weights_b, metrics_b) = run();

        assert_eq!(weights_a, weights_b);
        assert_eq!(metrics_a.quantization_errors, metrics_b.quantization_errors);
        assert_eq!(metrics_a.topographic_errors, metrics_b.topographic_errors);
    }

    #[test]
    fn test_shuffling_changes_the_learned_map() {
        let fit_with_shuffle = |shuffle: bool| {
            let config = SomConfig {
                shuffle,
                ..test_config()
            };
            let mut som = Som::new(&config).unwrap();
            let mut trainer = SomTrainer::new(config);
            trainer.fit(&mut som, corners().view()).unwrap();
            som.weights().unwrap().clone()
        };

        // Same seed, different sample order: online updates do not commute.
        assert_ne!(fit_with_shuffle(true), fit_with_shuffle(false));
    }

    #[test]
    fn test_fit_improves_quantization_error() {
        let config = SomConfig {
            n_epochs: 30,
            ..test_config()
        };
        let mut som = Som::new(&config).unwrap();
        let mut trainer = SomTrainer::new(config.clone());

        let data = corners();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        som.initialize(&mut rng, None).unwrap();
        let initial_qe = som.quantization_error(data.view()).unwrap();

        // Step every sample so both schedules anneal smoothly.
        let lr = Scheduler::new(0.5, 0.01, 1, data.nrows(), config.n_epochs).unwrap();
        let radius = Scheduler::new(2.0, 0.5, 1, data.nrows(), config.n_epochs).unwrap();
        let metrics = trainer
            .fit_with_schedulers(&mut som, data.view(), lr, radius)
            .unwrap();

        let final_qe = metrics.quantization_errors.last().copied().unwrap();
        assert!(final_qe < initial_qe);
    }

    #[test]
    fn test_fit_rejects_empty_and_mismatched_data() {
        let config = test_config();
        let mut som = Som::new(&config).unwrap();
        let mut trainer = SomTrainer::new(config);

        let empty = ndarray::Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            trainer.fit(&mut som, empty.view()),
            Err(SomError::EmptyInput(_))
        ));

        let wrong = ndarray::Array2::<f64>::zeros((3, 5));
        assert!(matches!(
            trainer.fit(&mut som, wrong.view()),
            Err(SomError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_schedulers() {
        let config = test_config();
        let mut som = Som::new(&config).unwrap();
        let mut trainer = SomTrainer::new(config);

        let data = corners();
        let lr = Scheduler::new(0.5, 0.05, 1, data.nrows(), 10).unwrap();
        let radius = Scheduler::new(2.0, 1.0, 1, data.nrows(), 10).unwrap();
        let metrics = trainer
            .fit_with_schedulers(&mut som, data.view(), lr, radius)
            .unwrap();

        // Stepping every sample drives the rate all the way down.
        let final_lr = metrics.learning_rates.last().copied().unwrap();
        assert!(final_lr < 0.06);
    }
}
