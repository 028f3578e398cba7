//! Gaussian smoothing for noise reduction before edge detection.
//!
//! Convolves every interior pixel with a 3×3 kernel (by default
//! `1 2 1 / 2 4 2 / 1 2 1`, divided by 16) and copies border pixels
//! unchanged. [`gaussian_filter_flat`] and [`gaussian_filter_chained`]
//! share [`GaussianFilter`] and differ only in how they reach neighbors.

use crate::chain::ChainedImage;
use crate::filter::{NeighborhoodFilter, filter_chained, filter_flat};
use crate::flat::FlatImage;
use crate::kernel::{Kernel3x3, Neighborhood};

/// Weighted-average smoothing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaussianFilter {
    kernel: Kernel3x3,
}

impl GaussianFilter {
    /// Create a filter from a smoothing kernel.
    #[must_use]
    pub const fn new(kernel: Kernel3x3) -> Self {
        Self { kernel }
    }
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self::new(Kernel3x3::GAUSSIAN)
    }
}

impl NeighborhoodFilter for GaussianFilter {
    fn interior(&self, window: &Neighborhood) -> u8 {
        saturate(self.kernel.convolve(window))
    }
}

/// Clamp a convolution result into the 8-bit sample range.
pub(crate) fn saturate(value: i32) -> u8 {
    u8::try_from(value.clamp(0, i32::from(u8::MAX))).unwrap_or(u8::MAX)
}

/// Blur a single-component contiguous image using direct indexing.
pub fn gaussian_filter_flat(input: &FlatImage, output: &mut FlatImage, kernel: &Kernel3x3) {
    filter_flat(&GaussianFilter::new(*kernel), input, output);
}

/// Blur a single-component chained image using the three-lane window.
pub fn gaussian_filter_chained(
    input: &ChainedImage,
    output: &mut ChainedImage,
    kernel: &Kernel3x3,
) {
    filter_chained(&GaussianFilter::new(*kernel), input, output);
}
