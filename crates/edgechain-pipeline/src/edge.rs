//! Sobel gradient edge detection with binary thresholding.
//!
//! For every interior pixel the horizontal and vertical Sobel responses
//! `gx` and `gy` are combined into a gradient magnitude
//! `sqrt(gx² + gy²)`. Magnitudes strictly above the threshold become
//! [`GRAYSCALE_WHITE`]; everything else becomes [`GRAYSCALE_BLACK`].
//! Border pixels are copied unchanged, as in the blur stage.
//!
//! This is the last step of the pipeline, after Gaussian smoothing.

use crate::chain::ChainedImage;
use crate::filter::{NeighborhoodFilter, filter_chained, filter_flat};
use crate::flat::FlatImage;
use crate::kernel::{Kernel3x3, Neighborhood};
use crate::types::{EdgeConfig, GRAYSCALE_BLACK, GRAYSCALE_WHITE};

/// Gradient-magnitude thresholding filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SobelFilter {
    horizontal: Kernel3x3,
    vertical: Kernel3x3,
    threshold: f64,
}

impl SobelFilter {
    /// Create a filter from the two gradient kernels and the threshold.
    #[must_use]
    pub const fn new(horizontal: Kernel3x3, vertical: Kernel3x3, threshold: f64) -> Self {
        Self {
            horizontal,
            vertical,
            threshold,
        }
    }

    /// Build the filter described by `config`.
    #[must_use]
    pub const fn from_config(config: &EdgeConfig) -> Self {
        Self::new(
            config.sobel_horizontal,
            config.sobel_vertical,
            config.threshold,
        )
    }

    /// `(gx, gy)` for the pixel at the center of `window`.
    #[must_use]
    pub fn gradients(&self, window: &Neighborhood) -> (i32, i32) {
        (
            self.horizontal.convolve(window),
            self.vertical.convolve(window),
        )
    }
}

impl Default for SobelFilter {
    fn default() -> Self {
        Self::new(
            Kernel3x3::SOBEL_HORIZONTAL,
            Kernel3x3::SOBEL_VERTICAL,
            EdgeConfig::DEFAULT_THRESHOLD,
        )
    }
}

impl NeighborhoodFilter for SobelFilter {
    fn interior(&self, window: &Neighborhood) -> u8 {
        let (gx, gy) = self.gradients(window);
        if gradient_magnitude(gx, gy) > self.threshold {
            GRAYSCALE_WHITE
        } else {
            GRAYSCALE_BLACK
        }
    }
}

/// Euclidean magnitude of a gradient, `sqrt(gx² + gy²)`.
#[must_use]
pub fn gradient_magnitude(gx: i32, gy: i32) -> f64 {
    f64::from(gx).hypot(f64::from(gy))
}

/// Detect edges in a single-component contiguous image using direct
/// indexing.
pub fn sobel_filter_flat(
    input: &FlatImage,
    output: &mut FlatImage,
    vertical: &Kernel3x3,
    horizontal: &Kernel3x3,
    threshold: f64,
) {
    filter_flat(
        &SobelFilter::new(*horizontal, *vertical, threshold),
        input,
        output,
    );
}

/// Detect edges in a single-component chained image using the three-lane
/// window.
pub fn sobel_filter_chained(
    input: &ChainedImage,
    output: &mut ChainedImage,
    vertical: &Kernel3x3,
    horizontal: &Kernel3x3,
    threshold: f64,
) {
    filter_chained(
        &SobelFilter::new(*horizontal, *vertical, threshold),
        input,
        output,
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Dimensions;
    use crate::window::is_border;

    fn sobel_flat(input: &FlatImage) -> FlatImage {
        let mut output = FlatImage::new(input.dimensions(), 1).unwrap();
        sobel_filter_flat(
            input,
            &mut output,
            &Kernel3x3::SOBEL_VERTICAL,
            &Kernel3x3::SOBEL_HORIZONTAL,
            EdgeConfig::DEFAULT_THRESHOLD,
        );
        output
    }

    /// 5x5: columns 0-1 black, columns 2-4 white.
    fn vertical_edge_5x5() -> FlatImage {
        FlatImage::from_fn(Dimensions::new(5, 5), 1, |x, _y| {
            vec![if x < 2 { 0 } else { 255 }]
        })
        .unwrap()
    }

    #[test]
    fn magnitude_is_euclidean() {
        assert!((gradient_magnitude(3, 4) - 5.0).abs() < f64::EPSILON);
        assert!((gradient_magnitude(-1020, 0) - 1020.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vertical_edge_renders_white_where_window_straddles_it() {
        let edges = sobel_flat(&vertical_edge_5x5());
        for y in 1..4 {
            let row = y * 5;
            // Windows centered on columns 1 and 2 span the 0 -> 255 step.
            assert_eq!(edges.data()[row + 1], GRAYSCALE_WHITE, "(1, {y})");
            assert_eq!(edges.data()[row + 2], GRAYSCALE_WHITE, "(2, {y})");
            // Column 3 sees only 255s.
            assert_eq!(edges.data()[row + 3], GRAYSCALE_BLACK, "(3, {y})");
        }
    }

    #[test]
    fn vertical_edge_gradient_exceeds_threshold() {
        let input = vertical_edge_5x5();
        let filter = SobelFilter::default();
        let window = crate::window::flat_neighborhood(input.data(), 5, 6);
        let (gx, gy) = filter.gradients(&window);
        assert_eq!((gx, gy), (1020, 0));
        assert!(gradient_magnitude(gx, gy) > EdgeConfig::DEFAULT_THRESHOLD);
    }

    #[test]
    fn flat_field_is_black_inside() {
        let input = FlatImage::from_raw(Dimensions::new(8, 6), 1, vec![201; 48]).unwrap();
        let edges = sobel_flat(&input);
        let dims = input.dimensions();
        for i in (0..48).filter(|&i| !is_border(i, dims)) {
            assert_eq!(edges.data()[i], GRAYSCALE_BLACK);
        }
    }

    #[test]
    fn border_copied_unchanged() {
        let input = vertical_edge_5x5();
        let edges = sobel_flat(&input);
        let dims = input.dimensions();
        for i in (0..25).filter(|&i| is_border(i, dims)) {
            assert_eq!(edges.data()[i], input.data()[i]);
        }
    }

    #[test]
    fn threshold_is_strict() {
        // A probe kernel whose response is the center sample, so the
        // magnitude can be set to exactly the threshold.
        let probe = Kernel3x3::new([0, 0, 0, 0, 1, 0, 0, 0, 0], 1);
        let zero = Kernel3x3::new([0; 9], 1);
        let at = SobelFilter::new(probe, zero, 150.0);
        let mut samples = [0; 9];
        samples[4] = 150;
        assert_eq!(at.interior(&Neighborhood(samples)), GRAYSCALE_BLACK);
        samples[4] = 151;
        assert_eq!(at.interior(&Neighborhood(samples)), GRAYSCALE_WHITE);
    }

    #[test]
    fn diagonal_gradient_combines_both_axes() {
        // gx = gy = 120: neither alone exceeds 150, the magnitude (~169.7) does.
        let filter = SobelFilter::default();
        let window = Neighborhood::from_rows([0, 0, 0], [0, 0, 40], [0, 40, 40]);
        let (gx, gy) = filter.gradients(&window);
        assert_eq!(gx, gy);
        assert!(f64::from(gx) < 150.0);
        assert_eq!(filter.interior(&window), GRAYSCALE_WHITE);
    }

    #[test]
    fn output_is_binary() {
        let input = FlatImage::from_fn(Dimensions::new(9, 9), 1, |x, y| {
            vec![u8::try_from((x * 31 + y * 17) % 256).unwrap()]
        })
        .unwrap();
        let edges = sobel_flat(&input);
        let dims = input.dimensions();
        for i in (0..81).filter(|&i| !is_border(i, dims)) {
            let v = edges.data()[i];
            assert!(v == GRAYSCALE_WHITE || v == GRAYSCALE_BLACK, "pixel {i} = {v}");
        }
    }

    #[test]
    fn chained_matches_flat() {
        let input = FlatImage::from_fn(Dimensions::new(7, 6), 1, |x, y| {
            vec![if (x + y) % 3 == 0 { 250 } else { 10 }]
        })
        .unwrap();
        let expected = sobel_flat(&input);

        let chained_in = ChainedImage::from_flat(&input);
        let mut chained_out = ChainedImage::new(input.dimensions(), 1).unwrap();
        sobel_filter_chained(
            &chained_in,
            &mut chained_out,
            &Kernel3x3::SOBEL_VERTICAL,
            &Kernel3x3::SOBEL_HORIZONTAL,
            EdgeConfig::DEFAULT_THRESHOLD,
        );
        assert_eq!(chained_out.to_flat(), expected);
    }
}
