//! Fixed 3×3 convolution kernels and the neighborhood they are applied to.

use serde::{Deserialize, Serialize};

/// The nine samples of a 3×3 window, in row-major order.
///
/// Index 4 is the center pixel; 0..3 is the row above and 6..9 the row
/// below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood(pub [u8; 9]);

impl Neighborhood {
    /// The center sample.
    #[must_use]
    pub const fn center(&self) -> u8 {
        self.0[4]
    }

    /// Build a neighborhood from three rows of three samples.
    #[must_use]
    pub const fn from_rows(top: [u8; 3], middle: [u8; 3], bottom: [u8; 3]) -> Self {
        Self([
            top[0], top[1], top[2], middle[0], middle[1], middle[2], bottom[0], bottom[1],
            bottom[2],
        ])
    }
}

/// A 3×3 integer kernel with a normalization divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel3x3 {
    /// Weights in row-major order, matching [`Neighborhood`] layout.
    pub weights: [i32; 9],
    /// Divisor applied to the weighted sum. Must be non-zero.
    pub divisor: i32,
}

impl Kernel3x3 {
    /// Gaussian smoothing kernel; the divisor is the weight sum.
    pub const GAUSSIAN: Self = Self::new([1, 2, 1, 2, 4, 2, 1, 2, 1], 16);

    /// Sobel kernel responding to horizontal intensity change (`gx`).
    pub const SOBEL_HORIZONTAL: Self = Self::new([-1, 0, 1, -2, 0, 2, -1, 0, 1], 1);

    /// Sobel kernel responding to vertical intensity change (`gy`).
    pub const SOBEL_VERTICAL: Self = Self::new([-1, -2, -1, 0, 0, 0, 1, 2, 1], 1);

    /// Create a kernel.
    #[must_use]
    pub const fn new(weights: [i32; 9], divisor: i32) -> Self {
        Self { weights, divisor }
    }

    /// Weighted sum of `window` divided by the divisor.
    ///
    /// The sum is accumulated in `i32`, wide enough for any 8-bit window
    /// against `i16`-range weights. Division truncates toward zero.
    #[must_use]
    pub fn convolve(&self, window: &Neighborhood) -> i32 {
        let sum: i32 = self
            .weights
            .iter()
            .zip(window.0.iter())
            .map(|(&w, &s)| w * i32::from(s))
            .sum();
        sum / self.divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_of_flat_field_is_identity() {
        let window = Neighborhood([77; 9]);
        assert_eq!(Kernel3x3::GAUSSIAN.convolve(&window), 77);
    }

    #[test]
    fn gaussian_truncates() {
        // Only the center is set: 4 * 3 / 16 = 0.75 -> 0.
        let mut samples = [0; 9];
        samples[4] = 3;
        assert_eq!(Kernel3x3::GAUSSIAN.convolve(&Neighborhood(samples)), 0);
    }

    #[test]
    fn sobel_of_flat_field_is_zero() {
        let window = Neighborhood([200; 9]);
        assert_eq!(Kernel3x3::SOBEL_HORIZONTAL.convolve(&window), 0);
        assert_eq!(Kernel3x3::SOBEL_VERTICAL.convolve(&window), 0);
    }

    #[test]
    fn sobel_extremes_do_not_wrap() {
        let window = Neighborhood::from_rows([0, 0, 255], [0, 0, 255], [0, 0, 255]);
        assert_eq!(Kernel3x3::SOBEL_HORIZONTAL.convolve(&window), 1020);
        let window = Neighborhood::from_rows([255, 0, 0], [255, 0, 0], [255, 0, 0]);
        assert_eq!(Kernel3x3::SOBEL_HORIZONTAL.convolve(&window), -1020);
    }

    #[test]
    fn from_rows_lays_out_row_major() {
        let n = Neighborhood::from_rows([1, 2, 3], [4, 5, 6], [7, 8, 9]);
        assert_eq!(n.0, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(n.center(), 5);
    }
}
