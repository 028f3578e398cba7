//! edgechain-pipeline: Sobel edge detection over two pixel storage models
//! (sans-IO).
//!
//! Converts a raster image into a binary edge map through:
//! grayscale -> 3×3 Gaussian blur -> 3×3 Sobel + threshold.
//!
//! The same pipeline runs on a contiguous [`FlatImage`] (neighbors by
//! index offset) and on a [`ChainedImage`] (a singly linked chain of
//! pixel nodes, neighbors by a three-lane sliding window). Both produce
//! identical output for pixel-equivalent input.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory images
//! and byte slices. File handling lives in `edgechain-bench`.

pub mod blur;
pub mod chain;
pub mod codec;
pub mod diagnostics;
pub mod edge;
pub mod filter;
pub mod flat;
pub mod grayscale;
pub mod kernel;
pub mod raster;
pub mod types;
pub mod window;

use tracing::debug;

pub use blur::GaussianFilter;
pub use chain::{ChainedImage, PixelNode};
pub use diagnostics::{Clock, PipelineDiagnostics, StorageKind};
pub use edge::SobelFilter;
pub use filter::NeighborhoodFilter;
pub use flat::FlatImage;
pub use kernel::{Kernel3x3, Neighborhood};
pub use raster::Raster;
pub use types::{
    COMPONENT_GRAYSCALE, COMPONENT_RGB, Dimensions, EdgeConfig, GRAYSCALE_BLACK, GRAYSCALE_WHITE,
    LumaWeights, PipelineError,
};

use diagnostics::{
    PipelineSummary, StageDiagnostics, StageMetrics, count_edge_pixels, mean_sample,
};

/// Run the full edge detection pipeline on either storage form.
///
/// Allocates two grayscale working images `a` and `b`, then runs
/// grayscale (input -> `a`), Gaussian blur (`a` -> `b`) and Sobel
/// (`b` -> `a`). `b` is dropped and `a` is returned as the edge map.
///
/// Border pixels of the result carry the blurred grayscale values; interior
/// pixels are [`GRAYSCALE_WHITE`] or [`GRAYSCALE_BLACK`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`EdgeConfig::validate`].
pub fn edge_detection<R: Raster>(input: &R, config: &EdgeConfig) -> Result<R, PipelineError> {
    config.validate()?;
    let dimensions = input.dimensions();
    debug!(
        storage = %R::STORAGE,
        width = dimensions.width,
        height = dimensions.height,
        components = input.components(),
        "edge detection"
    );

    let mut a = R::allocate(dimensions, COMPONENT_GRAYSCALE)?;
    let mut b = R::allocate(dimensions, COMPONENT_GRAYSCALE)?;

    input.grayscale_into(&mut a, &config.luma);
    a.filter_into(&GaussianFilter::new(config.gaussian), &mut b);
    b.filter_into(&SobelFilter::from_config(config), &mut a);
    drop(b);

    Ok(a)
}

/// [`edge_detection`] on the contiguous form.
///
/// # Errors
///
/// See [`edge_detection`].
pub fn edge_detection_flat(
    input: &FlatImage,
    config: &EdgeConfig,
) -> Result<FlatImage, PipelineError> {
    edge_detection(input, config)
}

/// [`edge_detection`] on the chained form.
///
/// # Errors
///
/// See [`edge_detection`].
pub fn edge_detection_chained(
    input: &ChainedImage,
    config: &EdgeConfig,
) -> Result<ChainedImage, PipelineError> {
    edge_detection(input, config)
}

/// Output of every pipeline stage, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedResult<R> {
    /// Stage 1: grayscale conversion.
    pub grayscale: R,
    /// Stage 2: Gaussian blur.
    pub blurred: R,
    /// Stage 3: Sobel edge map.
    pub edges: R,
}

/// Run the pipeline keeping every intermediate image and timing each stage.
///
/// Produces the same edge map as [`edge_detection`], but allocates a
/// separate image per stage instead of reusing the first working buffer.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`EdgeConfig::validate`].
pub fn process_staged_with_diagnostics<R: Raster, C: Clock>(
    input: &R,
    config: &EdgeConfig,
    clock: &C,
) -> Result<(StagedResult<R>, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let dimensions = input.dimensions();
    let interior_pixels = dimensions.width.saturating_sub(2) * dimensions.height.saturating_sub(2);
    let total_start = clock.now();

    let start = clock.now();
    let mut grayscale = R::allocate(dimensions, COMPONENT_GRAYSCALE)?;
    input.grayscale_into(&mut grayscale, &config.luma);
    let grayscale_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Grayscale {
            input_components: input.components(),
            mean_luma: mean_sample(grayscale.luma_samples()),
        },
    };
    debug!(storage = %R::STORAGE, elapsed = ?grayscale_diag.duration, "grayscale done");

    let start = clock.now();
    let mut blurred = R::allocate(dimensions, COMPONENT_GRAYSCALE)?;
    grayscale.filter_into(&GaussianFilter::new(config.gaussian), &mut blurred);
    let blur_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Blur {
            divisor: config.gaussian.divisor,
            interior_pixels,
        },
    };
    debug!(storage = %R::STORAGE, elapsed = ?blur_diag.duration, "blur done");

    let start = clock.now();
    let mut edges = R::allocate(dimensions, COMPONENT_GRAYSCALE)?;
    blurred.filter_into(&SobelFilter::from_config(config), &mut edges);
    let sobel_duration = clock.elapsed(&start);
    let edge_pixel_count = count_interior_edges(&edges);
    let sobel_diag = StageDiagnostics {
        duration: sobel_duration,
        metrics: StageMetrics::Sobel {
            threshold: config.threshold,
            edge_pixel_count,
            interior_pixels,
        },
    };
    debug!(
        storage = %R::STORAGE,
        elapsed = ?sobel_diag.duration,
        edge_pixel_count,
        "sobel done"
    );

    let diagnostics = PipelineDiagnostics {
        storage: R::STORAGE,
        grayscale: grayscale_diag,
        blur: blur_diag,
        sobel: sobel_diag,
        total_duration: clock.elapsed(&total_start),
        summary: PipelineSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
            edge_pixel_count,
        },
    };

    Ok((
        StagedResult {
            grayscale,
            blurred,
            edges,
        },
        diagnostics,
    ))
}

/// White pixels off the border. Border pixels are copied from the blurred
/// image and may be white without being edges.
fn count_interior_edges<R: Raster>(edges: &R) -> usize {
    let dimensions = edges.dimensions();
    count_edge_pixels(
        edges
            .luma_samples()
            .enumerate()
            .filter(|&(i, _)| !window::is_border(i, dimensions))
            .map(|(_, s)| s),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;

    /// Clock that advances one millisecond per reading.
    struct TickClock(Cell<u64>);

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.0.get() - since)
        }
    }

    /// RGB image, left half black and right half white.
    fn sharp_edge_rgb(width: usize, height: usize) -> FlatImage {
        FlatImage::from_fn(Dimensions::new(width, height), 3, |x, _y| {
            if x < width / 2 {
                vec![0, 0, 0]
            } else {
                vec![255, 255, 255]
            }
        })
        .unwrap()
    }

    #[test]
    fn flat_pipeline_finds_vertical_edge() {
        let edges = edge_detection_flat(&sharp_edge_rgb(20, 20), &EdgeConfig::default()).unwrap();
        assert_eq!(edges.components(), 1);
        assert_eq!(edges.dimensions(), Dimensions::new(20, 20));
        let row = 10 * 20;
        assert_eq!(edges.data()[row + 10], GRAYSCALE_WHITE);
        assert_eq!(edges.data()[row + 3], GRAYSCALE_BLACK);
        assert_eq!(edges.data()[row + 16], GRAYSCALE_BLACK);
    }

    #[test]
    fn chained_pipeline_matches_flat() {
        let input = sharp_edge_rgb(13, 9);
        let flat = edge_detection_flat(&input, &EdgeConfig::default()).unwrap();
        let chained =
            edge_detection_chained(&ChainedImage::from_flat(&input), &EdgeConfig::default())
                .unwrap();
        assert_eq!(chained.to_flat(), flat);
        assert_eq!(chained.node_count(), 13 * 9);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EdgeConfig {
            threshold: f64::INFINITY,
            ..EdgeConfig::default()
        };
        let result = edge_detection_flat(&sharp_edge_rgb(5, 5), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn staged_edges_match_single_pass() {
        let input = sharp_edge_rgb(16, 12);
        let config = EdgeConfig::default();
        let clock = TickClock(Cell::new(0));
        let (staged, _) = process_staged_with_diagnostics(&input, &config, &clock).unwrap();
        assert_eq!(staged.edges, edge_detection_flat(&input, &config).unwrap());
        assert_eq!(staged.grayscale.components(), 1);
    }

    #[test]
    fn diagnostics_record_stages_and_counts() {
        let input = ChainedImage::from_flat(&sharp_edge_rgb(10, 6));
        let clock = TickClock(Cell::new(0));
        let (staged, diag) =
            process_staged_with_diagnostics(&input, &EdgeConfig::default(), &clock).unwrap();

        assert_eq!(diag.storage, StorageKind::Chained);
        assert_eq!(diag.summary.pixel_count, 60);
        assert!(diag.total_duration >= diag.sobel.duration);
        assert!(diag.sobel.duration > Duration::ZERO);

        let white_inside = staged
            .edges
            .iter()
            .enumerate()
            .filter(|(i, n)| {
                !window::is_border(*i, Dimensions::new(10, 6)) && n.sample() == GRAYSCALE_WHITE
            })
            .count();
        assert_eq!(diag.summary.edge_pixel_count, white_inside);
        assert!(white_inside > 0);
        assert!(matches!(
            diag.sobel.metrics,
            StageMetrics::Sobel {
                interior_pixels: 32,
                ..
            }
        ));
    }
}
