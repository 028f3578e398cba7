//! Linked-chain image storage.
//!
//! A [`ChainedImage`] owns a singly linked sequence of [`PixelNode`]s in
//! row-major order. There is no index arithmetic: the only way to reach a
//! pixel is to follow `next` links from the head. Filters over this form
//! use [`LaneWindow`](crate::window::LaneWindow) to reconstruct 3×3
//! neighborhoods from forward traversal alone.
//!
//! The chain always holds exactly `width * height` nodes and every node
//! holds exactly `components` samples. Both constructors establish this
//! and nothing in the public API can change the chain's shape.

use std::fmt;

use crate::flat::{FlatImage, sample_count};
use crate::types::{Dimensions, PipelineError};

/// One pixel in a [`ChainedImage`].
pub struct PixelNode {
    samples: Box<[u8]>,
    next: Option<Box<Self>>,
}

impl PixelNode {
    /// All samples of this pixel.
    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// The first sample; the luminance of a grayscale pixel.
    #[must_use]
    pub fn sample(&self) -> u8 {
        self.samples[0]
    }

    /// The following pixel in row-major order, `None` for the last pixel.
    #[must_use]
    pub fn next(&self) -> Option<&Self> {
        self.next.as_deref()
    }
}

/// An image stored as a singly linked chain of pixel nodes.
pub struct ChainedImage {
    dimensions: Dimensions,
    components: usize,
    head: Option<Box<PixelNode>>,
}

impl ChainedImage {
    /// Allocate a chain of `width * height` zero-filled nodes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if width, height, or
    /// `components` is zero, or the sample count overflows `usize`.
    pub fn new(dimensions: Dimensions, components: usize) -> Result<Self, PipelineError> {
        sample_count(dimensions, components)?;
        let mut head = None;
        for _ in 0..dimensions.pixel_count() {
            head = Some(Box::new(PixelNode {
                samples: vec![0; components].into_boxed_slice(),
                next: head,
            }));
        }
        Ok(Self {
            dimensions,
            components,
            head,
        })
    }

    /// Copy a contiguous image node-for-node into chained form.
    #[must_use]
    pub fn from_flat(image: &FlatImage) -> Self {
        let mut head = None;
        for pixel in image.data().chunks_exact(image.components()).rev() {
            head = Some(Box::new(PixelNode {
                samples: pixel.into(),
                next: head,
            }));
        }
        Self {
            dimensions: image.dimensions(),
            components: image.components(),
            head,
        }
    }

    /// Copy the chain back into a contiguous image.
    #[must_use]
    pub fn to_flat(&self) -> FlatImage {
        let mut data = Vec::with_capacity(self.dimensions.pixel_count() * self.components);
        for node in self.iter() {
            data.extend_from_slice(node.samples());
        }
        FlatImage::from_trusted(self.dimensions, self.components, data)
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

    /// The top-left pixel.
    #[must_use]
    pub fn first(&self) -> Option<&PixelNode> {
        self.head.as_deref()
    }

    /// Walk the chain and count its nodes.
    ///
    /// Always equals `width * height`; this walks the links rather than
    /// trusting the dimensions, so tests use it to check the invariant.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Iterate over the nodes in row-major order.
    #[must_use]
    pub fn iter(&self) -> Nodes<'_> {
        Nodes {
            next: self.head.as_deref(),
        }
    }

    /// Iterate mutably over each node's samples in row-major order.
    pub fn iter_mut(&mut self) -> SamplesMut<'_> {
        SamplesMut {
            next: self.head.as_deref_mut(),
        }
    }
}

impl Drop for ChainedImage {
    // Unlink node by node; the default recursive drop would use stack
    // proportional to the pixel count.
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl Clone for ChainedImage {
    fn clone(&self) -> Self {
        let mut copy = Self {
            dimensions: self.dimensions,
            components: self.components,
            head: None,
        };
        let pixels: Vec<&[u8]> = self.iter().map(PixelNode::samples).collect();
        for samples in pixels.into_iter().rev() {
            copy.head = Some(Box::new(PixelNode {
                samples: samples.into(),
                next: copy.head.take(),
            }));
        }
        copy
    }
}

impl PartialEq for ChainedImage {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions == other.dimensions
            && self.components == other.components
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.samples() == b.samples())
    }
}

impl Eq for ChainedImage {}

impl fmt::Debug for ChainedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedImage")
            .field("dimensions", &self.dimensions)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a ChainedImage {
    type Item = &'a PixelNode;
    type IntoIter = Nodes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Shared iterator over the nodes of a [`ChainedImage`].
#[derive(Clone)]
pub struct Nodes<'a> {
    next: Option<&'a PixelNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a PixelNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next();
            node
        })
    }
}

/// Mutable iterator over the sample arrays of a [`ChainedImage`].
pub struct SamplesMut<'a> {
    next: Option<&'a mut PixelNode>,
}

impl<'a> Iterator for SamplesMut<'a> {
    type Item = &'a mut [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            let PixelNode { samples, next } = node;
            self.next = next.as_deref_mut();
            &mut samples[..]
        })
    }
}
