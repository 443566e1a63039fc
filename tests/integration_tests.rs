//! Integration tests for the Topos SOM engine.

use ndarray::{array, Array2};
use topos::{InitMethod, Som, SomConfig, SomTrainer};

/// Two tight, well-separated clusters in 2D.
fn two_clusters() -> Array2<f64> {
    let mut rows = Vec::new();
    for i in 0..20 {
        rows.push([0.0 + i as f64 * 0.01, 0.0 + i as f64 * 0.015]);
    }
    for i in 0..20 {
        rows.push([10.0 + i as f64 * 0.01, 10.0 + i as f64 * 0.015]);
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((40, 2), flat).unwrap()
}

fn mode(cells: &[(usize, usize)]) -> (usize, usize) {
    let mut counts = std::collections::HashMap::new();
    for &cell in cells {
        *counts.entry(cell).or_insert(0usize) += 1;
    }
    counts.into_iter().max_by_key(|&(_, n)| n).map(|(c, _)| c).unwrap()
}

#[test]
fn test_separated_clusters_map_to_separated_cells() {
    let config = SomConfig {
        rows: 6,
        cols: 6,
        input_dim: 2,
        n_epochs: 20,
        seed: Some(42),
        verbose: false,
        ..Default::default()
    };

    let data = two_clusters();
    let mut som = Som::new(&config).unwrap();
    let mut trainer = SomTrainer::new(config);
    trainer.fit(&mut som, data.view()).unwrap();

    let cells = som.transform(data.view()).unwrap();
    assert_eq!(cells.len(), 40);

    let mode_a = mode(&cells[..20]);
    let mode_b = mode(&cells[20..]);
    assert_ne!(mode_a, mode_b, "clusters should land on different cells");
}

#[test]
fn test_training_is_bit_reproducible() {
    let run = || {
        let config = SomConfig {
            rows: 5,
            cols: 7,
            input_dim: 2,
            n_epochs: 8,
            seed: Some(1234),
            verbose: false,
            ..Default::default()
        };
        let data = two_clusters();
        let mut som = Som::new(&config).unwrap();
        let mut trainer = SomTrainer::new(config);
        let metrics = trainer.fit(&mut som, data.view()).unwrap();
        (
            som.weights().unwrap().clone(),
            metrics.quantization_errors,
            metrics.topographic_errors,
        )
    };

    let (weights_a, qe_a, te_a) = run();
    let (weights_b, qe_b, te_b) = run();

    assert_eq!(weights_a, weights_b);
    assert_eq!(qe_a, qe_b);
    assert_eq!(te_a, te_b);
}

#[test]
fn test_single_cell_map() {
    let config = SomConfig {
        rows: 1,
        cols: 1,
        input_dim: 3,
        n_epochs: 3,
        seed: Some(42),
        verbose: false,
        ..Default::default()
    };

    let data = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut som = Som::new(&config).unwrap();
    let mut trainer = SomTrainer::new(config);
    let metrics = trainer.fit(&mut som, data.view()).unwrap();

    // Every sample maps to the only cell; topology is trivially preserved.
    for cell in som.transform(data.view()).unwrap() {
        assert_eq!(cell, (0, 0));
    }
    assert!(metrics.topographic_errors.iter().all(|&te| te == 0.0));

    // The quantization error is the mean distance to the single vector.
    let weights = som.weights().unwrap();
    let expected = data
        .rows()
        .into_iter()
        .map(|row| {
            (0..3)
                .map(|k| (row[k] - weights[[0, 0, k]]).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .sum::<f64>()
        / 3.0;
    let qe = som.quantization_error(data.view()).unwrap();
    assert!((qe - expected).abs() < 1e-12);
}

#[test]
fn test_unit_square_corners_stay_separated() {
    let config = SomConfig {
        rows: 4,
        cols: 4,
        input_dim: 2,
        n_epochs: 50,
        shuffle: false,
        seed: Some(42),
        verbose: false,
        ..Default::default()
    };

    let data = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let mut som = Som::new(&config).unwrap();
    let mut trainer = SomTrainer::new(config);
    trainer.fit(&mut som, data.view()).unwrap();

    // Each corner of the square claims its own cell on the trained map.
    let cells = som.transform(data.view()).unwrap();
    for i in 0..cells.len() {
        for j in (i + 1)..cells.len() {
            assert_ne!(
                cells[i], cells[j],
                "corners {} and {} share a cell",
                i, j
            );
        }
    }
}

#[test]
fn test_pca_initialization_end_to_end() {
    let config = SomConfig {
        rows: 5,
        cols: 5,
        input_dim: 2,
        init: InitMethod::Pca,
        n_epochs: 10,
        seed: Some(42),
        verbose: false,
        ..Default::default()
    };

    let data = two_clusters();
    let mut som = Som::new(&config).unwrap();
    let mut trainer = SomTrainer::new(config);
    let metrics = trainer.fit(&mut som, data.view()).unwrap();

    assert_eq!(som.weights().unwrap().shape(), &[5, 5, 2]);
    assert_eq!(metrics.quantization_errors.len(), 10);

    let umatrix = som.umatrix().unwrap();
    assert_eq!(umatrix.shape(), &[5, 5]);
}

#[test]
fn test_umatrix_requires_initialized_map() {
    let config = SomConfig {
        rows: 3,
        cols: 3,
        input_dim: 2,
        ..Default::default()
    };
    let som = Som::new(&config).unwrap();
    assert!(som.umatrix().is_err());
}
