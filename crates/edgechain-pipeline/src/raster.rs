//! The storage abstraction the pipeline is generic over.
//!
//! [`Raster`] is implemented by [`FlatImage`] and [`ChainedImage`]. Each
//! implementation routes the stages to its own traversal strategy, so
//! [`edge_detection`](crate::edge_detection) is written once and runs on
//! either form.

use crate::chain::{ChainedImage, PixelNode};
use crate::diagnostics::StorageKind;
use crate::filter::{NeighborhoodFilter, filter_chained, filter_flat};
use crate::flat::FlatImage;
use crate::grayscale::{rgb_to_grayscale_chained, rgb_to_grayscale_flat};
use crate::types::{Dimensions, LumaWeights, PipelineError};

/// An image storage model the pipeline can run on.
pub trait Raster: Sized {
    /// Which storage model this is, for diagnostics.
    const STORAGE: StorageKind;

    /// Allocate a zero-filled image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] for degenerate sizes.
    fn allocate(dimensions: Dimensions, components: usize) -> Result<Self, PipelineError>;

    /// Image dimensions.
    fn dimensions(&self) -> Dimensions;

    /// Samples per pixel.
    fn components(&self) -> usize;

    /// First sample of every pixel, in row-major order.
    fn luma_samples(&self) -> impl Iterator<Item = u8> + '_;

    /// Convert to grayscale into `output`.
    fn grayscale_into(&self, output: &mut Self, weights: &LumaWeights);

    /// Apply a neighborhood filter into `output`.
    fn filter_into<F: NeighborhoodFilter + ?Sized>(&self, filter: &F, output: &mut Self);
}

impl Raster for FlatImage {
    const STORAGE: StorageKind = StorageKind::Flat;

    fn allocate(dimensions: Dimensions, components: usize) -> Result<Self, PipelineError> {
        Self::new(dimensions, components)
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions()
    }

    fn components(&self) -> usize {
        self.components()
    }

    fn luma_samples(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels().map(|pixel| pixel[0])
    }

    fn grayscale_into(&self, output: &mut Self, weights: &LumaWeights) {
        rgb_to_grayscale_flat(self, output, weights);
    }

    fn filter_into<F: NeighborhoodFilter + ?Sized>(&self, filter: &F, output: &mut Self) {
        filter_flat(filter, self, output);
    }
}

impl Raster for ChainedImage {
    const STORAGE: StorageKind = StorageKind::Chained;

    fn allocate(dimensions: Dimensions, components: usize) -> Result<Self, PipelineError> {
        Self::new(dimensions, components)
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions()
    }

    fn components(&self) -> usize {
        self.components()
    }

    fn luma_samples(&self) -> impl Iterator<Item = u8> + '_ {
        self.iter().map(PixelNode::sample)
    }

    fn grayscale_into(&self, output: &mut Self, weights: &LumaWeights) {
        rgb_to_grayscale_chained(self, output, weights);
    }

    fn filter_into<F: NeighborhoodFilter + ?Sized>(&self, filter: &F, output: &mut Self) {
        filter_chained(filter, self, output);
    }
}
