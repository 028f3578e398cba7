//! 3×3 neighborhood access for both storage forms.
//!
//! The flat form reads a neighborhood by fixed index offsets around the
//! center pixel. The chained form cannot index, so [`LaneWindow`] keeps
//! three cursors ("lanes") one row apart and slides them forward in
//! lockstep. Each lane remembers the last three nodes it passed, which is
//! exactly one row of the window.
//!
//! Both yield the same [`Neighborhood`] for the same interior pixel, so a
//! filter written against [`Neighborhood`] behaves identically on either
//! form.

use crate::chain::{ChainedImage, PixelNode};
use crate::kernel::Neighborhood;
use crate::types::Dimensions;

/// Whether flat pixel index `index` lies on the image border.
///
/// Border pixels are the first and last row and the first and last
/// column. Images narrower or shorter than three pixels are all border.
#[must_use]
pub const fn is_border(index: usize, dimensions: Dimensions) -> bool {
    let Dimensions { width, height } = dimensions;
    let column = index % width;
    index < width || column == 0 || column == width - 1 || index >= width * height - width
}

/// Read the neighborhood of interior pixel `index` from a single-component
/// row-major buffer of the given `width`.
///
/// # Panics
///
/// Panics if `index` is on the top or bottom border, since the row above
/// or below would be out of bounds.
#[must_use]
pub fn flat_neighborhood(data: &[u8], width: usize, index: usize) -> Neighborhood {
    let above = index - width;
    let below = index + width;
    Neighborhood([
        data[above - 1],
        data[above],
        data[above + 1],
        data[index - 1],
        data[index],
        data[index + 1],
        data[below - 1],
        data[below],
        data[below + 1],
    ])
}

/// Three consecutive nodes of one row.
#[derive(Clone, Copy)]
struct Lane<'a> {
    nodes: [&'a PixelNode; 3],
}

impl<'a> Lane<'a> {
    fn starting_at(node: &'a PixelNode) -> Option<Self> {
        let second = node.next()?;
        let third = second.next()?;
        Some(Self {
            nodes: [node, second, third],
        })
    }

    fn samples(&self) -> [u8; 3] {
        [
            self.nodes[0].sample(),
            self.nodes[1].sample(),
            self.nodes[2].sample(),
        ]
    }

    /// Move one node forward. `None` if the lane is at the end of the chain.
    fn step(&mut self) -> Option<()> {
        let [_, second, third] = self.nodes;
        self.nodes = [second, third, third.next()?];
        Some(())
    }
}

/// Sliding 3×3 window over a chained image, driven by forward links only.
///
/// Iterating yields one [`Neighborhood`] per interior pixel, in row-major
/// order: `(width - 2) * (height - 2)` items in total. Within a row the
/// three lanes advance by one node per pixel. At the end of a row they are
/// resynchronized by stepping over the right border column and the left
/// border column of the next row, so the lanes never drift apart.
pub struct LaneWindow<'a> {
    top: Lane<'a>,
    middle: Lane<'a>,
    bottom: Lane<'a>,
    /// Column of the center pixel, `1..=width - 2`.
    column: usize,
    width: usize,
    /// Interior rows not yet finished, including the current one.
    rows_left: usize,
}

impl<'a> LaneWindow<'a> {
    /// Position the window on the first interior pixel, `(1, 1)`.
    ///
    /// Returns `None` if the image has no interior pixels.
    #[must_use]
    pub fn new(image: &'a ChainedImage) -> Option<Self> {
        let dimensions = image.dimensions();
        if !dimensions.has_interior() {
            return None;
        }
        let width = dimensions.width;
        let top_start = image.first()?;
        let middle_start = nth_successor(top_start, width)?;
        let bottom_start = nth_successor(middle_start, width)?;
        Some(Self {
            top: Lane::starting_at(top_start)?,
            middle: Lane::starting_at(middle_start)?,
            bottom: Lane::starting_at(bottom_start)?,
            column: 1,
            width,
            rows_left: dimensions.height - 2,
        })
    }

    /// Column of the pixel the next neighborhood is centered on.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    fn neighborhood(&self) -> Neighborhood {
        Neighborhood::from_rows(
            self.top.samples(),
            self.middle.samples(),
            self.bottom.samples(),
        )
    }

    fn step_all(&mut self) -> Option<()> {
        self.top.step()?;
        self.middle.step()?;
        self.bottom.step()
    }

    /// Move to the next interior pixel, resynchronizing at row ends.
    fn advance(&mut self) -> Option<()> {
        if self.column + 1 < self.width - 1 {
            self.column += 1;
            return self.step_all();
        }
        self.rows_left -= 1;
        if self.rows_left == 0 {
            return None;
        }
        // Center moves from width-2 past width-1 and the next row's column
        // 0 to land on column 1: three steps.
        for _ in 0..3 {
            self.step_all()?;
        }
        self.column = 1;
        Some(())
    }
}

impl Iterator for LaneWindow<'_> {
    type Item = Neighborhood;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rows_left == 0 {
            return None;
        }
        let window = self.neighborhood();
        if self.advance().is_none() {
            self.rows_left = 0;
        }
        Some(window)
    }
}

fn nth_successor(node: &PixelNode, n: usize) -> Option<&PixelNode> {
    let mut current = node;
    for _ in 0..n {
        current = current.next()?;
    }
    Some(current)
}
