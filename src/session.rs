// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The driver's view of the world: the parameters the user can change,
//! the commands that change them, and the immutable snapshot of those
//! parameters a frame is rendered under.

use num::Complex;
use std::str::FromStr;

use crate::colors::ColorScheme;
use crate::errors::Error;
use crate::escape::Limits;
use crate::planes::{Direction, Viewport};

/// Everything a worker needs to compute a pixel.  A new snapshot is
/// made for every frame and never changes afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderParams {
    /// The visible part of the complex plane.
    pub viewport: Viewport,
    /// The constant `c` in `z*z + c`.
    pub constant: Complex<f64>,
    /// Iteration cap and divergence threshold.
    pub limits: Limits,
    /// How escape values become colors.
    pub scheme: ColorScheme,
}

/// How far each command moves its parameter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Steps {
    /// Pan distance, before scaling by the zoom.
    pub pan: f64,
    /// Change to the iteration cap.
    pub iterations: u32,
    /// Change to either part of the constant.
    pub constant: f64,
    /// Change to the hue rotation, in degrees.
    pub hue: u16,
}

impl Default for Steps {
    fn default() -> Self {
        Steps {
            pan: 0.1,
            iterations: 10,
            constant: 0.1,
            hue: 10,
        }
    }
}

/// One discrete request from the input channel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// Move the view.
    Pan(Direction),
    /// Halve the visible area.
    ZoomIn,
    /// Double the visible area.
    ZoomOut,
    /// Raise the iteration cap.
    MoreIterations,
    /// Lower the iteration cap, never below 1.
    FewerIterations,
    /// Nudge the real part of the constant up.
    RealUp,
    /// Nudge the real part of the constant down.
    RealDown,
    /// Nudge the imaginary part of the constant up.
    ImaginaryUp,
    /// Nudge the imaginary part of the constant down.
    ImaginaryDown,
    /// Rotate the hue wheel forwards.
    HueUp,
    /// Rotate the hue wheel backwards.
    HueDown,
    /// Switch to the next color scheme.
    CycleScheme,
    /// Write the current frame to disk.
    Save,
    /// Stop the program.
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s {
            "left" => Command::Pan(Direction::Left),
            "right" => Command::Pan(Direction::Right),
            "up" => Command::Pan(Direction::Up),
            "down" => Command::Pan(Direction::Down),
            "zoom-in" | "a" => Command::ZoomIn,
            "zoom-out" | "e" => Command::ZoomOut,
            "more" | "f" => Command::MoreIterations,
            "less" | "r" => Command::FewerIterations,
            "re+" | "d" => Command::RealUp,
            "re-" | "q" => Command::RealDown,
            "im+" | "z" => Command::ImaginaryUp,
            "im-" | "s" => Command::ImaginaryDown,
            "hue+" | "p" => Command::HueUp,
            "hue-" | "o" => Command::HueDown,
            "cycle" | "c" => Command::CycleScheme,
            "save" | "w" => Command::Save,
            "quit" | "esc" | "x" => Command::Quit,
            _ => return Err(Error::UnknownCommand(s.to_string())),
        };
        Ok(command)
    }
}

/// What the driver has to do after a command has been applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Parameters changed; render a new frame.
    Render,
    /// Write out the frame already on screen.
    Save,
    /// Shut down.
    Quit,
}

/// The mutable parameter set, owned by the driver thread.
#[derive(Clone, Debug)]
pub struct Session {
    viewport: Viewport,
    constant: Complex<f64>,
    limits: Limits,
    scheme: ColorScheme,
    hue_offset: u16,
    steps: Steps,
}

impl Session {
    /// A session starting from the given parameters.
    pub fn new(
        viewport: Viewport,
        constant: Complex<f64>,
        limits: Limits,
        scheme: ColorScheme,
        steps: Steps,
    ) -> Self {
        let hue_offset = match scheme {
            ColorScheme::HueCycle(offset) => offset % 360,
            _ => 0,
        };
        Session {
            viewport,
            constant,
            limits,
            scheme,
            hue_offset,
            steps,
        }
    }

    /// The snapshot to render the next frame under.
    pub fn params(&self) -> RenderParams {
        RenderParams {
            viewport: self.viewport,
            constant: self.constant,
            limits: self.limits,
            scheme: self.scheme,
        }
    }

    /// Applies `command` and says what should happen next.
    pub fn apply(&mut self, command: Command) -> Action {
        match command {
            Command::Pan(direction) => self.viewport.pan(direction, self.steps.pan),
            Command::ZoomIn => self.viewport.zoom_in(),
            Command::ZoomOut => self.viewport.zoom_out(),
            Command::MoreIterations => {
                self.limits.max_iterations = self
                    .limits
                    .max_iterations
                    .saturating_add(self.steps.iterations)
            }
            Command::FewerIterations => {
                self.limits.max_iterations = self
                    .limits
                    .max_iterations
                    .saturating_sub(self.steps.iterations)
                    .max(1)
            }
            Command::RealUp => self.constant.re += self.steps.constant,
            Command::RealDown => self.constant.re -= self.steps.constant,
            Command::ImaginaryUp => self.constant.im += self.steps.constant,
            Command::ImaginaryDown => self.constant.im -= self.steps.constant,
            Command::HueUp => self.rotate_hue(self.steps.hue % 360),
            Command::HueDown => self.rotate_hue(360 - self.steps.hue % 360),
            Command::CycleScheme => self.scheme = self.scheme.cycle(self.hue_offset),
            Command::Save => return Action::Save,
            Command::Quit => return Action::Quit,
        }
        Action::Render
    }

    fn rotate_hue(&mut self, degrees: u16) {
        self.hue_offset = (self.hue_offset + degrees) % 360;
        if let ColorScheme::HueCycle(_) = self.scheme {
            self.scheme = ColorScheme::HueCycle(self.hue_offset);
        }
    }
}
