//! RGB to grayscale conversion.
//!
//! First step of the pipeline: a multi-component image in, a
//! single-component luminance image of the same size out.

use crate::chain::ChainedImage;
use crate::flat::FlatImage;
use crate::types::{B_OFFSET, COMPONENT_GRAYSCALE, COMPONENT_RGB, G_OFFSET, LumaWeights, R_OFFSET};

/// Luminance of one pixel's samples.
///
/// Pixels with at least three components are read as RGB (anything past
/// blue, such as alpha, is ignored) and weighted by `weights`, rounded to
/// the nearest integer and clamped to `0..=255`. Pixels with fewer
/// components are already luminance; the first sample is returned.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn luma(samples: &[u8], weights: &LumaWeights) -> u8 {
    if samples.len() < COMPONENT_RGB {
        return samples[0];
    }
    let value = f64::from(samples[B_OFFSET]).mul_add(
        weights.b,
        f64::from(samples[G_OFFSET]).mul_add(weights.g, f64::from(samples[R_OFFSET]) * weights.r),
    );
    // Clamped to the u8 range first, so the cast cannot truncate.
    value.round().clamp(0.0, 255.0) as u8
}

/// Convert a contiguous image into a single-component `output`.
pub fn rgb_to_grayscale_flat(input: &FlatImage, output: &mut FlatImage, weights: &LumaWeights) {
    debug_assert_eq!(input.dimensions(), output.dimensions());
    debug_assert_eq!(output.components(), COMPONENT_GRAYSCALE);

    for (pixel, out) in input.pixels().zip(output.data_mut()) {
        *out = luma(pixel, weights);
    }
}

/// Convert a chained image into a single-component `output`, walking both
/// chains in lockstep.
pub fn rgb_to_grayscale_chained(
    input: &ChainedImage,
    output: &mut ChainedImage,
    weights: &LumaWeights,
) {
    debug_assert_eq!(input.dimensions(), output.dimensions());
    debug_assert_eq!(output.components(), COMPONENT_GRAYSCALE);

    for (node, out) in input.iter().zip(output.iter_mut()) {
        out[0] = luma(node.samples(), weights);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Dimensions;

    fn uniform_rgb(width: usize, height: usize, rgb: [u8; 3]) -> FlatImage {
        FlatImage::from_fn(Dimensions::new(width, height), 3, |_, _| rgb.to_vec()).unwrap()
    }

    #[test]
    fn white_and_black_are_preserved() {
        let w = LumaWeights::default();
        assert_eq!(luma(&[255, 255, 255], &w), 255);
        assert_eq!(luma(&[0, 0, 0], &w), 0);
    }

    #[test]
    fn green_is_brightest_channel() {
        let w = LumaWeights::default();
        let r = luma(&[255, 0, 0], &w);
        let g = luma(&[0, 255, 0], &w);
        let b = luma(&[0, 0, 255], &w);
        assert!(
            g > r && r > b,
            "expected green > red > blue luminance, got R={r} G={g} B={b}",
        );
        // 0.299 * 255 = 76.245, 0.587 * 255 = 149.685, 0.114 * 255 = 29.07
        assert_eq!((r, g, b), (76, 150, 29));
    }

    #[test]
    fn result_is_rounded() {
        // 0.299*100 + 0.587*100 + 0.114*101 = 100.114 -> 100
        assert_eq!(luma(&[100, 100, 101], &LumaWeights::default()), 100);
        // 0.5 * 3 = 1.5 rounds away from zero.
        let half = LumaWeights {
            r: 0.5,
            g: 0.0,
            b: 0.0,
        };
        assert_eq!(luma(&[3, 0, 0], &half), 2);
    }

    #[test]
    fn oversized_weights_clamp() {
        let heavy = LumaWeights {
            r: 2.0,
            g: 2.0,
            b: 2.0,
        };
        assert_eq!(luma(&[200, 200, 200], &heavy), 255);
    }

    #[test]
    fn alpha_is_ignored() {
        let w = LumaWeights::default();
        assert_eq!(luma(&[10, 20, 30, 0], &w), luma(&[10, 20, 30], &w));
    }

    #[test]
    fn grayscale_input_passes_through() {
        assert_eq!(luma(&[42], &LumaWeights::default()), 42);
    }

    #[test]
    fn uniform_image_yields_uniform_luma() {
        let rgb = [12, 200, 90];
        let input = uniform_rgb(5, 4, rgb);
        let mut output = FlatImage::new(input.dimensions(), 1).unwrap();
        rgb_to_grayscale_flat(&input, &mut output, &LumaWeights::default());
        let expected = luma(&rgb, &LumaWeights::default());
        assert!(output.data().iter().all(|&s| s == expected));
    }

    #[test]
    fn chained_matches_flat() {
        let input = FlatImage::from_fn(Dimensions::new(6, 3), 3, |x, y| {
            vec![
                u8::try_from(x * 40).unwrap(),
                u8::try_from(y * 80).unwrap(),
                u8::try_from((x + y) * 20).unwrap(),
            ]
        })
        .unwrap();
        let weights = LumaWeights::default();

        let mut flat_out = FlatImage::new(input.dimensions(), 1).unwrap();
        rgb_to_grayscale_flat(&input, &mut flat_out, &weights);

        let chained_in = ChainedImage::from_flat(&input);
        let mut chained_out = ChainedImage::new(input.dimensions(), 1).unwrap();
        rgb_to_grayscale_chained(&chained_in, &mut chained_out, &weights);

        assert_eq!(chained_out.to_flat(), flat_out);
    }
}
