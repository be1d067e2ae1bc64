// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time function at the heart of the Julia set.  A Julia
//! set fixes the constant `c` and varies the starting point `z`,
//! which is the reverse of the Mandelbrot set: every pixel starts
//! its orbit at its own location on the complex plane, and we
//! measure how quickly `z*z + c` runs off towards infinity.

use num::Complex;

use crate::errors::{Error, Result};

/// The two knobs that bound the escape-time loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Limits {
    /// The most iterations any single point gets.
    pub max_iterations: u32,
    /// An orbit has escaped once `|z|^2` exceeds this.
    pub threshold_squared: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_iterations: 300,
            threshold_squared: 4.0,
        }
    }
}

impl Limits {
    /// Constructor.  Both limits must be positive.
    pub fn new(max_iterations: u32, threshold_squared: f64) -> Result<Limits> {
        if max_iterations == 0 {
            return Err(Error::NoIterations);
        }
        if !(threshold_squared > 0.0) {
            return Err(Error::BadThreshold(threshold_squared));
        }
        Ok(Limits {
            max_iterations,
            threshold_squared,
        })
    }
}

/// Iterate `z = z*z + c` from `point` and report how long the orbit
/// took to escape, scaled to `0..=255`.  An orbit that escapes on the
/// first step scores 0; one that never escapes scores 255.
pub fn escape_value(point: Complex<f64>, c: Complex<f64>, limits: &Limits) -> u8 {
    let mut z = point;
    let mut i = 0;
    while i < limits.max_iterations {
        z = z * z + c;
        if z.norm_sqr() > limits.threshold_squared {
            break;
        }
        i += 1;
    }
    (u64::from(i) * 255 / u64::from(limits.max_iterations)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_iterations: u32) -> Limits {
        Limits::new(max_iterations, 4.0).unwrap()
    }

    #[test]
    fn origin_never_escapes_without_a_constant() {
        let zero = Complex::new(0.0, 0.0);
        assert_eq!(escape_value(zero, zero, &limits(300)), 255);
    }

    #[test]
    fn distant_points_escape_immediately() {
        let zero = Complex::new(0.0, 0.0);
        assert_eq!(escape_value(Complex::new(2.5, 0.0), zero, &limits(300)), 0);
        assert_eq!(escape_value(Complex::new(-1.5, 1.5), zero, &limits(300)), 0);
    }

    #[test]
    fn escape_count_is_scaled_by_the_cap() {
        // z: 1.5 -> 2.25 (|z|^2 = 5.06), escapes on the first update.
        let zero = Complex::new(0.0, 0.0);
        assert_eq!(escape_value(Complex::new(1.5, 0.0), zero, &limits(10)), 0);

        // z: 1.2 -> 1.44 -> 2.0736 (|z|^2 = 4.29), escapes at i = 1.
        assert_eq!(escape_value(Complex::new(1.2, 0.0), zero, &limits(10)), 25);
        assert_eq!(escape_value(Complex::new(1.2, 0.0), zero, &limits(3)), 85);
    }

    #[test]
    fn values_stay_in_range_for_large_caps() {
        let c = Complex::new(-0.8, 0.156);
        let limits = limits(u32::max_value());
        let v = escape_value(Complex::new(1.0, 1.0), c, &limits);
        assert_eq!(v, 0);
    }

    #[test]
    fn limits_reject_nonsense() {
        assert!(Limits::new(0, 4.0).is_err());
        assert!(Limits::new(10, 0.0).is_err());
        assert!(Limits::new(10, -1.0).is_err());
        assert!(Limits::new(10, ::std::f64::NAN).is_err());
    }
}
