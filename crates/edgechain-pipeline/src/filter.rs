//! Neighborhood filters and the two traversal drivers that apply them.
//!
//! A [`NeighborhoodFilter`] only says what an interior pixel becomes given
//! its 3×3 window. The drivers own traversal and the border policy: every
//! border pixel is copied unchanged, every interior pixel is replaced by
//! the filter's output. [`filter_flat`] reads windows by direct indexing;
//! [`filter_chained`] reads them through a [`LaneWindow`].

use crate::chain::ChainedImage;
use crate::flat::FlatImage;
use crate::kernel::Neighborhood;
use crate::types::COMPONENT_GRAYSCALE;
use crate::window::{LaneWindow, flat_neighborhood, is_border};

/// Computes the output sample of an interior pixel from its neighborhood.
pub trait NeighborhoodFilter {
    /// Output value for the pixel at the center of `window`.
    fn interior(&self, window: &Neighborhood) -> u8;
}

/// Apply `filter` to a single-component contiguous image.
///
/// `output` must have the same dimensions as `input` and one component.
pub fn filter_flat<F: NeighborhoodFilter + ?Sized>(
    filter: &F,
    input: &FlatImage,
    output: &mut FlatImage,
) {
    debug_assert_eq!(input.components(), COMPONENT_GRAYSCALE);
    debug_assert_eq!(output.components(), COMPONENT_GRAYSCALE);
    debug_assert_eq!(input.dimensions(), output.dimensions());

    let dimensions = input.dimensions();
    let width = dimensions.width;
    let source = input.data();
    for (i, out) in output.data_mut().iter_mut().enumerate() {
        *out = if is_border(i, dimensions) {
            source[i]
        } else {
            filter.interior(&flat_neighborhood(source, width, i))
        };
    }
}

/// Apply `filter` to a single-component chained image.
///
/// Walks input and output chains in lockstep. Interior windows come from a
/// [`LaneWindow`] over `input`, which produces them in the same row-major
/// order the walk visits interior pixels.
pub fn filter_chained<F: NeighborhoodFilter + ?Sized>(
    filter: &F,
    input: &ChainedImage,
    output: &mut ChainedImage,
) {
    debug_assert_eq!(input.components(), COMPONENT_GRAYSCALE);
    debug_assert_eq!(output.components(), COMPONENT_GRAYSCALE);
    debug_assert_eq!(input.dimensions(), output.dimensions());

    let dimensions = input.dimensions();
    let mut windows = LaneWindow::new(input);
    for (i, (source, out)) in input.iter().zip(output.iter_mut()).enumerate() {
        let interior = if is_border(i, dimensions) {
            None
        } else {
            windows.as_mut().and_then(Iterator::next)
        };
        debug_assert!(
            is_border(i, dimensions) || interior.is_some(),
            "lane window exhausted before pixel {i}",
        );
        out[0] = interior.map_or_else(|| source.sample(), |window| filter.interior(&window));
    }
}
