//! Contiguous image storage.
//!
//! A [`FlatImage`] holds `width * height * components` samples in one
//! row-major buffer. Pixel `i` lives at `(i % width, i / width)` and its
//! samples occupy `data[i * components..(i + 1) * components]`.

use crate::types::{Dimensions, PipelineError};

/// An image backed by a single contiguous sample buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatImage {
    dimensions: Dimensions,
    components: usize,
    data: Vec<u8>,
}

impl FlatImage {
    /// Allocate a zero-filled image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if width, height, or
    /// `components` is zero, or the sample count overflows `usize`.
    pub fn new(dimensions: Dimensions, components: usize) -> Result<Self, PipelineError> {
        let len = sample_count(dimensions, components)?;
        Ok(Self {
            dimensions,
            components,
            data: vec![0; len],
        })
    }

    /// Wrap an existing row-major sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] for degenerate
    /// dimensions and [`PipelineError::BufferLength`] if `data` does not
    /// hold exactly `width * height * components` samples.
    pub fn from_raw(
        dimensions: Dimensions,
        components: usize,
        data: Vec<u8>,
    ) -> Result<Self, PipelineError> {
        let expected = sample_count(dimensions, components)?;
        if data.len() != expected {
            return Err(PipelineError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            dimensions,
            components,
            data,
        })
    }

    /// Wrap a buffer whose length the caller already knows to be correct.
    pub(crate) fn from_trusted(dimensions: Dimensions, components: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), dimensions.pixel_count() * components);
        Self {
            dimensions,
            components,
            data,
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    ///
    /// Same as [`FlatImage::new`]. Also returns
    /// [`PipelineError::BufferLength`] if `f` yields a pixel whose length
    /// differs from `components`.
    pub fn from_fn<F>(
        dimensions: Dimensions,
        components: usize,
        mut f: F,
    ) -> Result<Self, PipelineError>
    where
        F: FnMut(usize, usize) -> Vec<u8>,
    {
        let mut image = Self::new(dimensions, components)?;
        let width = dimensions.width;
        for (i, pixel) in image.data.chunks_exact_mut(components).enumerate() {
            let samples = f(i % width, i / width);
            if samples.len() != components {
                return Err(PipelineError::BufferLength {
                    expected: components,
                    actual: samples.len(),
                });
            }
            pixel.copy_from_slice(&samples);
        }
        Ok(image)
    }

    /// Image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.dimensions.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.dimensions.height
    }

    /// Samples per pixel.
    #[must_use]
    pub const fn components(&self) -> usize {
        self.components
    }

    /// All samples, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to all samples.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Samples of the pixel at flat index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= width * height`.
    #[must_use]
    pub fn pixel(&self, index: usize) -> &[u8] {
        let start = index * self.components;
        &self.data[start..start + self.components]
    }

    /// Iterate over pixels as sample slices.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.data.chunks_exact(self.components)
    }

    /// Consume the image and return its sample buffer.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// `width * height * components`, rejecting zero and overflow.
pub(crate) fn sample_count(
    dimensions: Dimensions,
    components: usize,
) -> Result<usize, PipelineError> {
    let invalid = || PipelineError::InvalidDimensions {
        width: dimensions.width,
        height: dimensions.height,
        components,
    };
    if dimensions.width == 0 || dimensions.height == 0 || components == 0 {
        return Err(invalid());
    }
    dimensions
        .width
        .checked_mul(dimensions.height)
        .and_then(|n| n.checked_mul(components))
        .ok_or_else(invalid)
}
