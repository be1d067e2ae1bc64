// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type shared by the library and its binaries.  Almost
//! everything here is a configuration problem caught at startup; the
//! rendering engine itself cannot fail once it is running.

use failure::Fail;
use std::io;

/// Everything that can go wrong while setting up or driving a render.
#[derive(Debug, Fail)]
pub enum Error {
    /// The pool must have at least one worker thread.
    #[fail(display = "Worker count must be at least 1")]
    NoWorkers,

    /// Each worker must get at least one part of the image.
    #[fail(display = "Parts per worker must be at least 1")]
    NoParts,

    /// Width or height was zero.
    #[fail(display = "Image must not be empty, got {}x{}", _0, _1)]
    EmptyImage(usize, usize),

    /// The iteration cap was zero.
    #[fail(display = "Iteration count must be at least 1")]
    NoIterations,

    /// The divergence threshold was zero, negative or not a number.
    #[fail(display = "Divergence threshold must be positive, got {}", _0)]
    BadThreshold(f64),

    /// The viewport's corners were the wrong way round.
    #[fail(display = "Bad viewport: {}", _0)]
    BadViewport(String),

    /// A token on the input channel did not name a command.
    #[fail(display = "Unknown command: {:?}", _0)]
    UnknownCommand(String),

    /// A frame was requested after the pool was shut down.
    #[fail(display = "The worker pool has been shut down")]
    Stopped,

    /// A worker thread died instead of exiting cleanly.
    #[fail(display = "A worker thread panicked")]
    WorkerPanicked,

    /// Writing an image or reading input failed.
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;
