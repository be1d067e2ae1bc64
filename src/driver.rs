// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The driver loop.  It owns the session, starts a frame whenever a
//! command changes the parameters, and hands each finished frame to a
//! presentation sink.  Commands arrive on a channel, so the source of
//! input (a terminal, a script, a test) is someone else's problem.

use crossbeam::channel::{self, Receiver};
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crate::config::Config;
use crate::errors::Result;
use crate::framebuffer::Frame;
use crate::output::{write_image, FrameSaver};
use crate::pool::WorkerPool;
use crate::session::{Action, Command, Session};

/// Somewhere finished frames are shown.
pub trait Presenter {
    /// Display `frame`.  Called once per completed frame.
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// A sink that only logs what it was given.
#[derive(Default)]
pub struct LogPresenter {
    frames: usize,
}

impl LogPresenter {
    /// A fresh sink.
    pub fn new() -> Self {
        LogPresenter::default()
    }

    /// How many frames have been presented so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames += 1;
        info!(
            "frame {} ready ({}x{})",
            self.frames,
            frame.width(),
            frame.height()
        );
        Ok(())
    }
}

/// A sink that overwrites one image file with every frame, for
/// viewers that reload on change.
pub struct PreviewFile {
    path: PathBuf,
}

impl PreviewFile {
    /// Previews go to `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        PreviewFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Presenter for PreviewFile {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        write_image(&self.path, frame)?;
        debug!("preview written to {}", self.path.display());
        Ok(())
    }
}

/// Reads commands from `reader` on a background thread.  Tokens are
/// separated by whitespace; ones that do not parse are logged and
/// skipped.  The channel closes when the reader runs dry.
pub fn spawn_input<R>(reader: R) -> Receiver<Command>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = channel::unbounded();
    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("input failed: {}", err);
                    return;
                }
            };
            for token in line.split_whitespace() {
                match token.parse::<Command>() {
                    Ok(command) => {
                        if tx.send(command).is_err() {
                            return;
                        }
                    }
                    Err(err) => warn!("{}", err),
                }
            }
        }
    });
    rx
}

/// What a driver run did.
#[derive(Debug, Default)]
pub struct Summary {
    /// Frames rendered, including the first.
    pub frames: usize,
    /// Every file written by a save command.
    pub saved: Vec<PathBuf>,
}

fn render(pool: &WorkerPool, session: &Session) -> Result<Frame> {
    let started = Instant::now();
    let frame = pool.render(session.params())?;
    debug!("frame rendered in {:?}", started.elapsed());
    Ok(frame)
}

/// Runs the interactive loop until a quit command arrives or the
/// channel closes.  Renders one frame before reading any input.
pub fn run(
    config: &Config,
    commands: Receiver<Command>,
    presenter: &mut dyn Presenter,
) -> Result<Summary> {
    config.validate()?;
    info!(
        "rendering {}x{} with {} workers, {} parts each, c = {}",
        config.width, config.height, config.workers, config.parts_per_worker, config.constant
    );

    let pool = WorkerPool::new(config.workers, config.parts_per_worker, config.plane())?;
    let mut session = config.session()?;
    let mut saver = FrameSaver::new(&config.output_dir);
    let mut summary = Summary::default();

    let mut frame = render(&pool, &session)?;
    summary.frames += 1;
    presenter.present(&frame)?;

    for command in commands.iter() {
        debug!("command: {:?}", command);
        match session.apply(command) {
            Action::Render => {
                frame = render(&pool, &session)?;
                summary.frames += 1;
                presenter.present(&frame)?;
            }
            Action::Save => {
                let path = saver.save(&frame)?;
                info!("saved {}", path.display());
                summary.saved.push(path);
            }
            Action::Quit => break,
        }
    }

    pool.shutdown()?;
    Ok(summary)
}
