// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The persistent worker pool.  The threads are started once, sleep
//! between frames, and are reused for every frame until the pool is
//! shut down; nothing is respawned when the parameters change.

use log::{debug, error, info};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::colors::{ColorMapper, Rgb};
use crate::errors::{Error, Result};
use crate::escape::escape_value;
use crate::framebuffer::{Frame, Framebuffer};
use crate::planes::IntegralPlane;
use crate::scheduler::{Phase, WorkScheduler};
use crate::session::RenderParams;

/// The color of the pixel at `offset` under `params`.
pub fn paint(
    params: &RenderParams,
    plane: &IntegralPlane,
    colors: &ColorMapper,
    offset: usize,
) -> Rgb {
    let point = params
        .viewport
        .pixel_to_point(&plane.offset_to_pixel(offset), plane);
    colors.map(escape_value(point, params.constant, &params.limits), params.scheme)
}

/// Renders a whole frame on the calling thread.  Mostly useful as a
/// reference for the threaded renderer.
pub fn render_single(params: &RenderParams, plane: IntegralPlane, colors: &ColorMapper) -> Frame {
    Frame {
        plane,
        pixels: (0..plane.len())
            .map(|offset| paint(params, &plane, colors, offset))
            .collect(),
    }
}

struct Shared {
    scheduler: WorkScheduler<RenderParams>,
    framebuffer: Framebuffer,
    colors: ColorMapper,
}

// If a worker dies mid-chunk the frame it was working on can never
// finish; stop the whole pool so the driver is not left waiting.
struct PanicGuard<'a>(&'a WorkScheduler<RenderParams>);

impl<'a> Drop for PanicGuard<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.shutdown();
        }
    }
}

fn work(shared: &Shared) {
    let _guard = PanicGuard(&shared.scheduler);
    let plane = shared.framebuffer.plane();
    while let Some(claim) = shared.scheduler.claim() {
        let params = &*claim.params;
        shared.framebuffer.fill(claim.range.clone(), |offset| {
            paint(params, &plane, &shared.colors, offset)
        });
        shared.scheduler.complete(&claim);
    }
}

/// A fixed set of worker threads sharing one framebuffer.
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
    parts: usize,
}

impl WorkerPool {
    /// Starts `workers` threads for an image the size of `plane`.  Each
    /// frame is cut into `workers * parts_per_worker` chunks.
    pub fn new(workers: usize, parts_per_worker: usize, plane: IntegralPlane) -> Result<WorkerPool> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        if parts_per_worker == 0 {
            return Err(Error::NoParts);
        }
        if plane.is_empty() {
            return Err(Error::EmptyImage(plane.0, plane.1));
        }

        let shared = Arc::new(Shared {
            scheduler: WorkScheduler::new(plane.len()),
            framebuffer: Framebuffer::new(plane),
            colors: ColorMapper::new(),
        });
        shared.scheduler.register_workers(workers);

        let mut pool = WorkerPool {
            shared,
            handles: Vec::with_capacity(workers),
            parts: workers * parts_per_worker,
        };
        for id in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(format!("julia-worker-{}", id))
                .spawn(move || work(&shared));
            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(err) => {
                    let _ = pool.stop();
                    return Err(Error::Io(err));
                }
            }
        }
        info!(
            "started {} workers, {} chunks of at most {} pixels",
            workers,
            pool.parts,
            (plane.len() + pool.parts - 1) / pool.parts
        );
        Ok(pool)
    }

    /// How many chunks each frame is cut into.
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// The size of the image being rendered.
    pub fn plane(&self) -> IntegralPlane {
        self.shared.framebuffer.plane()
    }

    /// Where the scheduler is in its life.
    pub fn phase(&self) -> Phase {
        self.shared.scheduler.phase()
    }

    /// Starts a frame under `params` and returns at once.  Waits first
    /// for any frame already running to finish.
    pub fn start(&self, params: RenderParams) -> Result<u64> {
        let generation = self.shared.scheduler.start_frame(self.parts, Arc::new(params))?;
        debug!("frame {} started: {:?}", generation, params);
        Ok(generation)
    }

    /// Blocks until the current frame is complete.
    pub fn wait(&self) -> Result<()> {
        self.shared.scheduler.wait_frame()
    }

    /// A copy of the framebuffer as it stands.
    pub fn snapshot(&self) -> Frame {
        self.shared.framebuffer.snapshot()
    }

    /// Renders one complete frame under `params` and returns a copy.
    pub fn render(&self, params: RenderParams) -> Result<Frame> {
        self.start(params)?;
        self.wait()?;
        Ok(self.snapshot())
    }

    fn stop(&mut self) -> Result<()> {
        self.shared.scheduler.shutdown();
        let mut panicked = false;
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                error!("{} panicked", name);
                panicked = true;
            }
        }
        if panicked {
            Err(Error::WorkerPanicked)
        } else {
            Ok(())
        }
    }

    /// Stops every worker and waits for them to exit.  Chunks already
    /// claimed are finished first.
    pub fn shutdown(mut self) -> Result<()> {
        let result = self.stop();
        info!("worker pool stopped");
        result
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            let _ = self.stop();
        }
    }
}
