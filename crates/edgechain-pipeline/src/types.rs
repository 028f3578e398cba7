//! Shared types for the edgechain pipeline.

use serde::{Deserialize, Serialize};

use crate::kernel::Kernel3x3;

/// Samples per pixel in an RGB image.
pub const COMPONENT_RGB: usize = 3;

/// Samples per pixel in a grayscale image.
pub const COMPONENT_GRAYSCALE: usize = 1;

/// Offset of the red sample within a pixel.
pub const R_OFFSET: usize = 0;
/// Offset of the green sample within a pixel.
pub const G_OFFSET: usize = 1;
/// Offset of the blue sample within a pixel.
pub const B_OFFSET: usize = 2;

/// Binarized output value for edge pixels.
pub const GRAYSCALE_WHITE: u8 = 255;
/// Binarized output value for non-edge pixels.
pub const GRAYSCALE_BLACK: u8 = 0;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width * self.height
    }

    /// Whether the image has at least one pixel that is not on the border.
    #[must_use]
    pub const fn has_interior(self) -> bool {
        self.width >= 3 && self.height >= 3
    }
}

/// Per-channel weights for RGB to luminance conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumaWeights {
    /// Red weight.
    pub r: f64,
    /// Green weight.
    pub g: f64,
    /// Blue weight.
    pub b: f64,
}

impl LumaWeights {
    /// ITU-R BT.601 luma weights.
    pub const BT601: Self = Self {
        r: 0.299,
        g: 0.587,
        b: 0.114,
    };
}

impl Default for LumaWeights {
    fn default() -> Self {
        Self::BT601
    }
}

/// Configuration for the edge detection pipeline.
///
/// Kernel weights and the binarization threshold are plain values so that
/// alternative kernels can be substituted without touching the filters.
/// The kernel extent is always 3×3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Weights used by the grayscale converter.
    pub luma: LumaWeights,

    /// Smoothing kernel applied before gradient computation.
    pub gaussian: Kernel3x3,

    /// Kernel producing the horizontal gradient `gx`.
    pub sobel_horizontal: Kernel3x3,

    /// Kernel producing the vertical gradient `gy`.
    pub sobel_vertical: Kernel3x3,

    /// Gradient magnitudes strictly above this value become edges.
    pub threshold: f64,
}

impl EdgeConfig {
    /// Default binarization threshold, on the 8-bit scale.
    pub const DEFAULT_THRESHOLD: f64 = 150.0;

    /// Check the configuration for values the filters cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if any kernel divisor is
    /// zero or a weight is outside the `i16` range, the threshold is negative or not finite, or a luma weight is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, kernel) in [
            ("gaussian", &self.gaussian),
            ("sobel_horizontal", &self.sobel_horizontal),
            ("sobel_vertical", &self.sobel_vertical),
        ] {
            if kernel.divisor == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} kernel divisor must be non-zero"
                )));
            }
            if kernel.weights.iter().any(|w| i16::try_from(*w).is_err()) {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} kernel weights must fit in i16"
                )));
            }
        }

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "threshold must be finite and non-negative, got {}",
                self.threshold
            )));
        }

        let LumaWeights { r, g, b } = self.luma;
        if [r, g, b].iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "luma weights must be finite and non-negative, got ({r}, {g}, {b})"
            )));
        }

        Ok(())
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            luma: LumaWeights::default(),
            gaussian: Kernel3x3::GAUSSIAN,
            sobel_horizontal: Kernel3x3::SOBEL_HORIZONTAL,
            sobel_vertical: Kernel3x3::SOBEL_VERTICAL,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

/// Errors raised by the allocation, codec, and configuration layers.
///
/// The filters themselves never fail: they assume well-formed input,
/// which the constructors of [`FlatImage`](crate::FlatImage) and
/// [`ChainedImage`](crate::ChainedImage) guarantee.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Failed to encode the output image.
    #[error("failed to encode image: {0}")]
    ImageEncode(String),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Width, height, or component count is zero, or the sample count
    /// does not fit in memory.
    #[error("invalid image dimensions {width}x{height} with {components} components")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Requested component count.
        components: usize,
    },

    /// A raw sample buffer does not match the declared dimensions.
    #[error("sample buffer has {actual} bytes, expected {expected}")]
    BufferLength {
        /// `width * height * components`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// The operation does not support this component count.
    #[error("unsupported component count: {0}")]
    UnsupportedComponents(usize),

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
