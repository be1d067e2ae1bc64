// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes the relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and the visible rectangle of the complex plane.  Unlike a fixed
//! mapping, the viewport can be panned and zoomed between frames.
use num::Complex;

use crate::errors::{Error, Result};

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

impl IntegralPlane {
    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.0 * self.1
    }

    /// True if either side of the plane is zero.
    pub fn is_empty(&self) -> bool {
        self.0 == 0 || self.1 == 0
    }

    /// Maps a row-major linear offset back to the pixel it names.
    pub fn offset_to_pixel(&self, offset: usize) -> Pixel {
        Pixel(offset % self.0, offset / self.0)
    }
}

/// Describes the x, y of a point in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// One of the four directions the viewport can be panned in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Towards smaller real values.
    Left,
    /// Towards larger real values.
    Right,
    /// Towards smaller imaginary values (the top of the image).
    Up,
    /// Towards larger imaginary values.
    Down,
}

/// The visible part of the complex plane.  The four limits describe
/// the rectangle before zooming; `zoom` scales it around the origin
/// and the pan offsets shift the result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Real value at the left edge of the image.
    pub left: f64,
    /// Real value at the right edge of the image.
    pub right: f64,
    /// Imaginary value at the top row of the image.
    pub top: f64,
    /// Imaginary value at the bottom row of the image.
    pub bottom: f64,
    /// Scale factor applied to the limits.  Smaller is closer.
    pub zoom: f64,
    /// Horizontal offset, applied after zooming.
    pub pan_x: f64,
    /// Vertical offset, applied after zooming.
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            left: -1.0,
            right: 1.0,
            top: -1.0,
            bottom: 1.0,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Constructor.  Takes the four limits of the unzoomed rectangle,
    /// which must have a positive width and height.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Result<Viewport> {
        if !(left < right) {
            return Err(Error::BadViewport(
                "The left limit is not to the left of the right limit".to_string(),
            ));
        }

        if !(top < bottom) {
            return Err(Error::BadViewport(
                "The top limit is not above the bottom limit".to_string(),
            ));
        }

        Ok(Viewport {
            left,
            right,
            top,
            bottom,
            ..Viewport::default()
        })
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// complex number it corresponds to under the current zoom and pan.
    pub fn pixel_to_point(&self, pixel: &Pixel, plane: &IntegralPlane) -> Complex<f64> {
        let x = (pixel.0 as f64) / (plane.0 as f64);
        let y = (pixel.1 as f64) / (plane.1 as f64);
        Complex::new(
            (x * (self.right - self.left) + self.left) * self.zoom + self.pan_x,
            (y * (self.bottom - self.top) + self.top) * self.zoom + self.pan_y,
        )
    }

    /// Shift the view by `step` in `direction`.  The step is scaled by
    /// the zoom so a pan moves the same share of the image at any depth.
    pub fn pan(&mut self, direction: Direction, step: f64) {
        let step = step * self.zoom;
        match direction {
            Direction::Left => self.pan_x -= step,
            Direction::Right => self.pan_x += step,
            Direction::Up => self.pan_y -= step,
            Direction::Down => self.pan_y += step,
        }
    }

    /// Halve the visible area's side lengths.
    pub fn zoom_in(&mut self) {
        self.zoom *= 0.5;
    }

    /// Double the visible area's side lengths.
    pub fn zoom_out(&mut self) {
        self.zoom /= 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    const EPSILON: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        assert!(Viewport::new(1.0, -1.0, -1.0, 1.0).is_err());
        assert!(Viewport::new(-1.0, 1.0, 1.0, -1.0).is_err());
        assert!(Viewport::new(0.0, 0.0, -1.0, 1.0).is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        let vp = Viewport::new(-2.0, 1.0, -1.5, 1.5).unwrap();
        assert_eq!(vp.zoom, 1.0);
        assert_eq!(vp.pan_x, 0.0);
    }

    #[test]
    fn pixel_to_point_on_default_viewport() {
        let vp = Viewport::default();
        let plane = IntegralPlane(4, 4);
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0), &plane), Complex::new(-1.0, -1.0));
        assert_eq!(vp.pixel_to_point(&Pixel(2, 2), &plane), Complex::new(0.0, 0.0));
        assert_eq!(vp.pixel_to_point(&Pixel(3, 1), &plane), Complex::new(0.5, -0.5));
    }

    #[test]
    fn pixel_to_point_follows_zoom_and_pan() {
        let mut vp = Viewport::new(-2.0, 2.0, -1.0, 1.0).unwrap();
        vp.zoom = 0.5;
        vp.pan_x = 0.25;
        vp.pan_y = -0.75;
        let plane = IntegralPlane(8, 4);
        for (x, y) in iproduct!(0..8, 0..4) {
            let p = vp.pixel_to_point(&Pixel(x, y), &plane);
            let re = ((x as f64 / 8.0) * 4.0 - 2.0) * 0.5 + 0.25;
            let im = ((y as f64 / 4.0) * 2.0 - 1.0) * 0.5 - 0.75;
            assert!(close(p.re, re), "re at {},{}: {} != {}", x, y, p.re, re);
            assert!(close(p.im, im), "im at {},{}: {} != {}", x, y, p.im, im);
        }
    }

    #[test]
    fn pan_there_and_back_is_identity() {
        let original = Viewport::default();
        let mut vp = original;
        vp.zoom_in();
        let zoomed = vp;
        vp.pan(Direction::Left, 0.1);
        vp.pan(Direction::Up, 0.1);
        assert!(close(vp.pan_x, -0.05));
        assert!(close(vp.pan_y, -0.05));
        vp.pan(Direction::Right, 0.1);
        vp.pan(Direction::Down, 0.1);
        assert!(close(vp.pan_x, zoomed.pan_x));
        assert!(close(vp.pan_y, zoomed.pan_y));
        vp.zoom_out();
        assert!(close(vp.zoom, original.zoom));
    }

    #[test]
    fn offsets_map_to_row_major_pixels() {
        let plane = IntegralPlane(5, 3);
        assert_eq!(plane.len(), 15);
        assert_eq!(plane.offset_to_pixel(0), Pixel(0, 0));
        assert_eq!(plane.offset_to_pixel(7), Pixel(2, 1));
        assert_eq!(plane.offset_to_pixel(14), Pixel(4, 2));
        assert!(IntegralPlane(0, 3).is_empty());
    }
}
