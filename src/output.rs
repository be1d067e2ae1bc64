// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writes finished frames to disk.

use image::ColorType;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::framebuffer::Frame;

/// Encode `frame` to `path`; the format follows the file extension.
pub fn write_image(path: &Path, frame: &Frame) -> Result<()> {
    image::save_buffer(
        path,
        &frame.to_rgb_bytes(),
        frame.width() as u32,
        frame.height() as u32,
        ColorType::RGB(8),
    )?;
    Ok(())
}

/// Saves frames into a directory under consecutive numbered names.
pub struct FrameSaver {
    dir: PathBuf,
    counter: usize,
}

impl FrameSaver {
    /// A saver writing into `dir`, which must already exist.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        FrameSaver {
            dir: dir.as_ref().to_path_buf(),
            counter: 0,
        }
    }

    /// Writes `frame` as the next `julia-NNNN.png` and returns its path.
    pub fn save(&mut self, frame: &Frame) -> Result<PathBuf> {
        self.counter += 1;
        let path = self.dir.join(format!("julia-{:04}.png", self.counter));
        write_image(&path, frame)?;
        Ok(path)
    }
}
