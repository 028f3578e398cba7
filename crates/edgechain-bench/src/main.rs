//! edgechain-bench: run the edge pipeline on an image file and report
//! per-stage diagnostics.
//!
//! Decodes the input image, runs grayscale, Gaussian blur and Sobel on the
//! flat form, the chained form, or both, and optionally writes the edge map
//! as a grayscale PNG. Useful for:
//!
//! - Comparing the flat and chained storage forms
//! - Tuning the Sobel threshold
//! - Checking that both forms agree on real images
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin edgechain-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use edgechain_pipeline::diagnostics::{Clock, PipelineDiagnostics, StorageKind};
use edgechain_pipeline::{ChainedImage, EdgeConfig, FlatImage, PipelineError, codec};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sobel edge detection over flat and chained pixel storage.
///
/// Runs the pipeline on a given image and prints per-stage timing and edge
/// counts.
#[derive(Parser)]
#[command(name = "edgechain-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP).
    image_path: PathBuf,

    /// Write the edge map to this PNG file.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pixel storage form to run.
    #[arg(long, value_enum, default_value_t = Storage::Both)]
    storage: Storage,

    /// Sobel gradient magnitude threshold.
    #[arg(long, default_value_t = EdgeConfig::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full edge config as a JSON string.
    ///
    /// When provided, `--threshold` is ignored. Missing fields take their
    /// default values.
    #[arg(long)]
    config_json: Option<String>,
}

/// Storage form selection.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Storage {
    /// Contiguous buffer.
    Flat,
    /// Linked chain of pixel nodes.
    Chained,
    /// Both forms, failing if their edge maps differ.
    Both,
}

impl Storage {
    const fn runs_flat(self) -> bool {
        matches!(self, Self::Flat | Self::Both)
    }

    const fn runs_chained(self) -> bool {
        matches!(self, Self::Chained | Self::Both)
    }
}

/// Build an [`EdgeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and
/// `--threshold` is ignored.
fn config_from_cli(cli: &Cli) -> Result<EdgeConfig, String> {
    let config: EdgeConfig = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        EdgeConfig {
            threshold: cli.threshold,
            ..EdgeConfig::default()
        }
    };
    config
        .validate()
        .map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let flat_input = match codec::decode_rgb(&image_bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let chained_input = cli
        .storage
        .runs_chained()
        .then(|| ChainedImage::from_flat(&flat_input));

    info!(
        path = %cli.image_path.display(),
        bytes = image_bytes.len(),
        width = flat_input.width(),
        height = flat_input.height(),
        "decoded input"
    );
    info!(threshold = config.threshold, runs = cli.runs, "config");

    let mut all_diagnostics = Vec::with_capacity(cli.runs * 2);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let flat = if cli.storage.runs_flat() {
            match run_flat(&flat_input, &config) {
                Ok(result) => Some(result),
                Err(e) => {
                    eprintln!("Pipeline error (flat): {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            None
        };

        let chained = match chained_input.as_ref().map(|input| run_chained(input, &config)) {
            Some(Ok(result)) => Some(result),
            Some(Err(e)) => {
                eprintln!("Pipeline error (chained): {e}");
                return ExitCode::FAILURE;
            }
            None => None,
        };

        if let (Some((flat_edges, _)), Some((chained_edges, _))) = (&flat, &chained)
            && flat_edges != chained_edges
        {
            let differing = flat_edges
                .data()
                .iter()
                .zip(chained_edges.data())
                .filter(|(a, b)| a != b)
                .count();
            eprintln!("Flat and chained edge maps differ in {differing} pixels");
            return ExitCode::FAILURE;
        }

        // Write the edge map on the first run only.
        if run == 0
            && let Some(ref output) = cli.output
            && let Some((edges, _)) = flat.as_ref().or(chained.as_ref())
        {
            write_png(output, edges);
        }

        for (_, diagnostics) in flat.into_iter().chain(chained) {
            if cli.json {
                match serde_json::to_string_pretty(&diagnostics) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error serializing diagnostics: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("{}", diagnostics.report());
            }
            all_diagnostics.push(diagnostics);
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

fn run_flat(
    input: &FlatImage,
    config: &EdgeConfig,
) -> Result<(FlatImage, PipelineDiagnostics), PipelineError> {
    let (staged, diagnostics) =
        edgechain_pipeline::process_staged_with_diagnostics(input, config, &StdClock)?;
    Ok((staged.edges, diagnostics))
}

fn run_chained(
    input: &ChainedImage,
    config: &EdgeConfig,
) -> Result<(FlatImage, PipelineDiagnostics), PipelineError> {
    let (staged, diagnostics) =
        edgechain_pipeline::process_staged_with_diagnostics(input, config, &StdClock)?;
    Ok((staged.edges.to_flat(), diagnostics))
}

/// Encode `edges` as PNG and write it. Failures are reported, not fatal.
fn write_png(path: &std::path::Path, edges: &FlatImage) {
    let png = match codec::encode_png(edges) {
        Ok(png) => png,
        Err(e) => {
            eprintln!("Error encoding edge map: {e}");
            return;
        }
    };
    match std::fs::write(path, &png) {
        Ok(()) => info!(path = %path.display(), bytes = png.len(), "edge map written"),
        Err(e) => eprintln!("Error writing PNG to {}: {e}", path.display()),
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs, one block per storage
/// form.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Grayscale", |d| d.grayscale.duration),
        ("Blur", |d| d.blur.duration),
        ("Sobel", |d| d.sobel.duration),
        ("Total", |d| d.total_duration),
    ];

    for kind in [StorageKind::Flat, StorageKind::Chained] {
        let runs: Vec<&PipelineDiagnostics> = all_diagnostics
            .iter()
            .filter(|d| d.storage == kind)
            .collect();
        if runs.is_empty() {
            continue;
        }

        println!();
        println!("Summary: {kind} ({} runs)\n{}", runs.len(), "=".repeat(60));

        let totals: Vec<f64> = runs
            .iter()
            .map(|d| d.total_duration.as_secs_f64() * 1000.0)
            .collect();
        let min = totals.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max = totals.iter().copied().reduce(f64::max).unwrap_or(0.0);
        println!("Total duration: min={min:.3}ms  max={max:.3}ms");

        println!("{:<24} {:>12}", "Stage", "Mean (ms)");
        println!("{}", "-".repeat(40));
        for (name, extractor) in stage_extractors {
            let sum: f64 = runs
                .iter()
                .map(|d| extractor(d).as_secs_f64() * 1000.0)
                .sum();
            let mean = sum / runs.len() as f64;
            println!("{name:<24} {mean:>10.3}ms");
        }
    }
}
