//! Topos CLI - Self-Organizing Map trainer
//!
//! Loads a numeric matrix from a text file, trains a map on it, reports
//! per-epoch quality metrics and optionally renders the U-matrix or writes
//! per-sample BMU assignments.

use clap::Parser;
use image::{ImageBuffer, Rgb};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::error;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use topos::{InitMethod, Result, Som, SomConfig, SomError, SomTrainer};

#[derive(Parser)]
#[command(name = "topos")]
#[command(version)]
#[command(about = "Self-Organizing Map trainer", long_about = None)]
struct Cli {
    /// Input matrix file (one sample per line, comma or whitespace
    /// separated; lines starting with '#' are skipped)
    #[arg(short, long)]
    input: PathBuf,

    /// Grid rows
    #[arg(long, default_value = "10")]
    rows: usize,

    /// Grid columns
    #[arg(long, default_value = "10")]
    cols: usize,

    /// Number of training epochs
    #[arg(short = 'e', long, default_value = "20")]
    epochs: usize,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Seed the grid from the top-2 principal components of the data
    #[arg(long)]
    pca: bool,

    /// Process samples in file order instead of reshuffling every epoch
    #[arg(long)]
    no_shuffle: bool,

    /// Render the trained U-matrix to this PNG path
    #[arg(long)]
    umatrix: Option<PathBuf>,

    /// Pixel scale for the U-matrix image
    #[arg(long, default_value = "16")]
    scale: u32,

    /// Write per-sample BMU coordinates to this file
    #[arg(long)]
    assignments: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();

    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap();

    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style.clone());
    pb.set_message("Loading data...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let data = load_matrix(&cli.input)?;

    pb.finish_and_clear();
    println!(
        "Loaded {} samples x {} features from {}",
        data.nrows(),
        data.ncols(),
        cli.input.display()
    );

    let config = SomConfig {
        rows: cli.rows,
        cols: cli.cols,
        input_dim: data.ncols(),
        init: if cli.pca {
            InitMethod::Pca
        } else {
            InitMethod::Random
        },
        n_epochs: cli.epochs,
        shuffle: !cli.no_shuffle,
        verbose: cli.verbose,
        seed: cli.seed,
        ..Default::default()
    };

    let mut som = Som::new(&config)?;
    let mut trainer = SomTrainer::new(config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style);
    pb.set_message(format!(
        "Training {}x{} map for {} epochs...",
        cli.rows, cli.cols, cli.epochs
    ));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let metrics = trainer.fit(&mut som, data.view())?;

    pb.finish_and_clear();

    println!("Training complete in {}", HumanDuration(start_time.elapsed()));
    if let (Some(qe), Some(te)) = (
        metrics.quantization_errors.last(),
        metrics.topographic_errors.last(),
    ) {
        println!("   Quantization error: {:.6}", qe);
        println!("   Topographic error:  {:.3}%", te);
    }

    if let Some(path) = &cli.umatrix {
        let umatrix = som.umatrix()?;
        let img = umatrix_to_image(&umatrix, cli.scale.max(1));
        img.save(path).map_err(|e| {
            SomError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;
        println!("   U-matrix: {}", path.display());
    }

    if let Some(path) = &cli.assignments {
        let cells = som.transform(data.view())?;
        let mut writer = BufWriter::new(File::create(path)?);
        for (row, col) in cells {
            writeln!(writer, "{},{}", row, col)?;
        }
        println!("   Assignments: {}", path.display());
    }

    Ok(())
}

/// Reads a samples-by-features matrix from a text file.
fn load_matrix(path: &Path) -> Result<Array2<f64>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut values: Vec<f64> = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row: Vec<f64> = line
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|e| {
                    SomError::InvalidArgument(format!(
                        "Line {}: bad value {:?}: {}",
                        line_no + 1,
                        token,
                        e
                    ))
                })
            })
            .collect::<Result<_>>()?;

        match n_cols {
            None => n_cols = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(SomError::InvalidArgument(format!(
                    "Line {}: expected {} values, got {}",
                    line_no + 1,
                    expected,
                    row.len()
                )));
            }
            Some(_) => {}
        }

        values.extend(row);
        n_rows += 1;
    }

    let n_cols = n_cols.ok_or_else(|| {
        SomError::EmptyInput(format!("No samples in {}", path.display()))
    })?;

    Array2::from_shape_vec((n_rows, n_cols), values)
        .map_err(|e| SomError::InvalidArgument(e.to_string()))
}

/// Renders a U-matrix as a min-max normalized grayscale image; bright
/// pixels mark cluster boundaries.
fn umatrix_to_image(umatrix: &Array2<f64>, scale: u32) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    let (rows, cols) = umatrix.dim();

    let min = umatrix.iter().copied().fold(f64::INFINITY, f64::min);
    let max = umatrix.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(1e-12);

    ImageBuffer::from_fn(cols as u32 * scale, rows as u32 * scale, |x, y| {
        let r = (y / scale) as usize;
        let c = (x / scale) as usize;
        let level = ((umatrix[[r, c]] - min) / range * 255.0).round() as u8;
        Rgb([level, level, level])
    })
}
