#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Julia set renderer
//!
//! A Julia set is drawn by picking a fixed complex constant `c` and,
//! for every point `z` on the complex plane, repeatedly replacing `z`
//! with `z*z + c`.  Some starting points orbit forever; most run off
//! to infinity, and how many steps they take to do so is the number
//! we turn into a color.
//!
//! The expensive part is doing that for every pixel, every time the
//! user nudges the constant or moves the view.  This crate keeps a
//! fixed pool of worker threads alive for the whole session.  Each
//! frame, the image is cut into chunks that the workers pull from a
//! shared counter, so the same threads are reused frame after frame
//! and no two of them ever write the same pixel.

extern crate failure;
extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod colors;
pub mod config;
pub mod driver;
pub mod errors;
pub mod escape;
pub mod framebuffer;
pub mod output;
pub mod planes;
pub mod pool;
pub mod scheduler;
pub mod session;

pub use colors::{ColorMapper, ColorScheme, Palette, Rgb};
pub use config::Config;
pub use errors::{Error, Result};
pub use escape::{escape_value, Limits};
pub use framebuffer::{Frame, Framebuffer};
pub use planes::{Direction, IntegralPlane, Pixel, Viewport};
pub use pool::{render_single, WorkerPool};
pub use scheduler::{Partition, Phase, WorkScheduler};
pub use session::{Action, Command, RenderParams, Session, Steps};
