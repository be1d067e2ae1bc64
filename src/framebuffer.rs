// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The shared image the workers paint into.  Each pixel is a packed
//! RGB word in an atomic cell, so workers can write through a shared
//! reference without any locking.  Workers only ever touch the pixels
//! of the chunk they claimed, and chunks never overlap, so no cell is
//! ever written by two threads in the same frame.

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::colors::Rgb;
use crate::planes::IntegralPlane;

/// A fixed-size, row-major grid of colors.  Never resized.
pub struct Framebuffer {
    plane: IntegralPlane,
    pixels: Vec<AtomicU32>,
}

impl Framebuffer {
    /// A black image of the given size.
    pub fn new(plane: IntegralPlane) -> Self {
        let pixels = (0..plane.len()).map(|_| AtomicU32::new(0)).collect();
        Framebuffer { plane, pixels }
    }

    /// The dimensions of the image.
    pub fn plane(&self) -> IntegralPlane {
        self.plane
    }

    /// The number of pixels in the image.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True for a zero-area image.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Write every pixel whose linear offset lies in `range`, asking
    /// `paint` for the color at each offset.
    pub fn fill<F>(&self, range: Range<usize>, mut paint: F)
    where
        F: FnMut(usize) -> Rgb,
    {
        for (offset, cell) in self.pixels[range.clone()].iter().enumerate() {
            cell.store(paint(range.start + offset).pack(), Ordering::Relaxed);
        }
    }

    /// The color currently stored at `offset`.
    pub fn get(&self, offset: usize) -> Rgb {
        Rgb::unpack(self.pixels[offset].load(Ordering::Relaxed))
    }

    /// Copy the current contents out.  Only meaningful once the frame
    /// that wrote them has completed; the scheduler's lock orders the
    /// workers' stores before this read.
    pub fn snapshot(&self) -> Frame {
        Frame {
            plane: self.plane,
            pixels: self.pixels.iter().map(|p| Rgb::unpack(p.load(Ordering::Relaxed))).collect(),
        }
    }
}

/// A finished, immutable copy of the framebuffer, handed to the
/// presentation sink and to the image writer.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// The dimensions of the image.
    pub plane: IntegralPlane,
    /// Row-major colors, `plane.len()` of them.
    pub pixels: Vec<Rgb>,
}

impl Frame {
    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.plane.0
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.plane.1
    }

    /// The color at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.plane.0 + x]
    }

    /// Interleaved `r, g, b` bytes, the layout image encoders expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            bytes.extend_from_slice(&[p.0, p.1, p.2]);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_framebuffer_is_black() {
        let fb = Framebuffer::new(IntegralPlane(3, 2));
        assert_eq!(fb.len(), 6);
        assert!(fb.snapshot().pixels.iter().all(|p| *p == Rgb(0, 0, 0)));
    }

    #[test]
    fn fill_writes_only_its_range() {
        let fb = Framebuffer::new(IntegralPlane(4, 2));
        fb.fill(2..5, |i| Rgb(i as u8, 0, 0));
        let frame = fb.snapshot();
        assert_eq!(frame.pixels[1], Rgb(0, 0, 0));
        assert_eq!(frame.pixels[2], Rgb(2, 0, 0));
        assert_eq!(frame.at(0, 1), Rgb(4, 0, 0));
        assert_eq!(frame.pixels[5], Rgb(0, 0, 0));
    }

    #[test]
    fn empty_range_is_a_no_op() {
        let fb = Framebuffer::new(IntegralPlane(2, 2));
        fb.fill(4..4, |_| Rgb(9, 9, 9));
        assert_eq!(fb.get(3), Rgb(0, 0, 0));
    }

    #[test]
    fn rgb_bytes_are_interleaved() {
        let fb = Framebuffer::new(IntegralPlane(2, 1));
        fb.fill(0..2, |i| if i == 0 { Rgb(1, 2, 3) } else { Rgb(4, 5, 6) });
        assert_eq!(fb.snapshot().to_rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }
}
