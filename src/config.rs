// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Startup configuration.  Everything here is fixed for the life of
//! the process; only the session parameters built from it change.

use num::Complex;
use std::path::PathBuf;

use crate::colors::ColorScheme;
use crate::errors::{Error, Result};
use crate::escape::Limits;
use crate::planes::{IntegralPlane, Viewport};
use crate::session::{Session, Steps};

/// The constant the renderer opens with.
pub const DEFAULT_CONSTANT: Complex<f64> = Complex {
    re: -1.417_022_856_18,
    im: 0.0,
};

/// Everything the engine and the driver need to get going.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of worker threads.
    pub workers: usize,
    /// Chunks per worker in each frame.
    pub parts_per_worker: usize,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// The starting value of `c`.
    pub constant: Complex<f64>,
    /// The starting iteration cap.
    pub max_iterations: u32,
    /// Squared escape radius.
    pub threshold_squared: f64,
    /// The starting color scheme.
    pub scheme: ColorScheme,
    /// Starting view.
    pub viewport: Viewport,
    /// How far each command moves its parameter.
    pub steps: Steps,
    /// Where saved frames go.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: num_cpus::get(),
            parts_per_worker: 1,
            width: 1024,
            height: 1024,
            constant: DEFAULT_CONSTANT,
            max_iterations: 300,
            threshold_squared: 4.0,
            scheme: ColorScheme::default(),
            viewport: Viewport::default(),
            steps: Steps::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Checks every precondition the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::NoWorkers);
        }
        if self.parts_per_worker == 0 {
            return Err(Error::NoParts);
        }
        if self.plane().is_empty() {
            return Err(Error::EmptyImage(self.width, self.height));
        }
        self.limits()?;
        Viewport::new(
            self.viewport.left,
            self.viewport.right,
            self.viewport.top,
            self.viewport.bottom,
        )?;
        Ok(())
    }

    /// The image dimensions.
    pub fn plane(&self) -> IntegralPlane {
        IntegralPlane(self.width, self.height)
    }

    /// Total chunks per frame.
    pub fn chunk_count(&self) -> usize {
        self.workers * self.parts_per_worker
    }

    /// The starting escape limits.
    pub fn limits(&self) -> Result<Limits> {
        Limits::new(self.max_iterations, self.threshold_squared)
    }

    /// A fresh session holding the starting parameters.
    pub fn session(&self) -> Result<Session> {
        Ok(Session::new(
            self.viewport,
            self.constant,
            self.limits()?,
            self.scheme,
            self.steps,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.plane(), IntegralPlane(1024, 1024));
        assert_eq!(config.session().unwrap().params().limits.max_iterations, 300);
    }

    fn invalid<F: FnOnce(&mut Config)>(tweak: F) -> bool {
        let mut config = Config::default();
        tweak(&mut config);
        config.validate().is_err()
    }

    #[test]
    fn contract_violations_are_caught() {
        assert!(invalid(|c| c.workers = 0));
        assert!(invalid(|c| c.parts_per_worker = 0));
        assert!(invalid(|c| c.width = 0));
        assert!(invalid(|c| c.height = 0));
        assert!(invalid(|c| c.max_iterations = 0));
        assert!(invalid(|c| c.threshold_squared = 0.0));
        assert!(invalid(|c| c.viewport.left = 2.0));
    }

    #[test]
    fn chunks_scale_with_workers() {
        let config = Config {
            workers: 4,
            parts_per_worker: 8,
            ..Config::default()
        };
        assert_eq!(config.chunk_count(), 32);
    }
}
