// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hands out work to the pool.  The image is flattened into a single
//! run of pixel offsets and cut into a fixed number of chunks; the
//! workers take turns pulling the next chunk off a shared counter
//! until none are left, then go to sleep until the driver starts
//! another frame.
//!
//! All of the bookkeeping lives behind one mutex.  A pair of
//! condition variables wakes the workers when a frame starts (or the
//! pool is shutting down) and wakes the driver when the last chunk of
//! a frame has been written.
//!
//! A new frame is never allowed to stomp on one in progress:
//! `start_frame` first waits for every chunk of the previous frame to
//! be written.  Together with the per-frame parameter snapshot, that
//! means a frame is always computed under exactly one set of
//! parameters.

use log::trace;
use std::ops::Range;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::errors::{Error, Result};

/// Divides `0..len` into `parts` contiguous ranges of
/// `ceil(len / parts)` offsets.  The last few ranges may be short, or
/// even empty when there are more parts than offsets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Partition {
    len: usize,
    parts: usize,
    part_size: usize,
}

impl Partition {
    /// `parts` must be at least 1.
    pub fn new(len: usize, parts: usize) -> Partition {
        assert!(parts > 0, "a partition needs at least one part");
        let part_size = (len + parts - 1) / parts;
        Partition {
            len,
            parts,
            part_size,
        }
    }

    /// How many chunks there are.
    pub fn count(&self) -> usize {
        self.parts
    }

    /// The largest size any chunk can have.
    pub fn part_size(&self) -> usize {
        self.part_size
    }

    /// The offsets covered by chunk `index`.
    pub fn chunk(&self, index: usize) -> Range<usize> {
        let start = (index * self.part_size).min(self.len);
        let end = (start + self.part_size).min(self.len);
        start..end
    }

    /// Every chunk, in order.
    pub fn chunks<'a>(&'a self) -> impl Iterator<Item = Range<usize>> + 'a {
        (0..self.parts).map(move |i| self.chunk(i))
    }
}

/// Where the scheduler is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No frame has been started, or the last one is finished.
    Idle,
    /// Chunks remain to be claimed or written.
    FrameInProgress,
    /// Shutdown was requested and some workers have not yet noticed.
    Draining,
    /// Shutdown was requested and every worker has left.
    Stopped,
}

/// One chunk of one frame, owned by whichever worker claimed it.
#[derive(Debug)]
pub struct Claim<P> {
    /// The frame this chunk belongs to.
    pub generation: u64,
    /// Which chunk of the partition this is.
    pub index: usize,
    /// The pixel offsets to compute.
    pub range: Range<usize>,
    /// The parameters the frame was started with.
    pub params: Arc<P>,
}

struct State<P> {
    partition: Partition,
    next_chunk: usize,
    total_chunks: usize,
    completed: usize,
    generation: u64,
    params: Option<Arc<P>>,
    shutdown: bool,
    workers: usize,
}

impl<P> State<P> {
    fn frame_done(&self) -> bool {
        self.completed >= self.total_chunks
    }
}

/// The shared work queue.  `P` is the immutable parameter snapshot a
/// frame is computed under.
pub struct WorkScheduler<P> {
    len: usize,
    state: Mutex<State<P>>,
    work_ready: Condvar,
    frame_done: Condvar,
}

impl<P> WorkScheduler<P> {
    /// A scheduler for an image of `len` pixels.  No frame is running.
    pub fn new(len: usize) -> Self {
        WorkScheduler {
            len,
            state: Mutex::new(State {
                partition: Partition::new(len, 1),
                next_chunk: 0,
                total_chunks: 0,
                completed: 0,
                generation: 0,
                params: None,
                shutdown: false,
                workers: 0,
            }),
            work_ready: Condvar::new(),
            frame_done: Condvar::new(),
        }
    }

    // The state is a handful of counters that are never left half
    // updated, so a panic elsewhere does not make it unusable.
    fn lock(&self) -> MutexGuard<State<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records that `count` more workers will be calling `claim`.
    pub fn register_workers(&self, count: usize) {
        self.lock().workers += count;
    }

    /// Begin a new frame of `parts` chunks under `params`, waking every
    /// idle worker.  Blocks until the previous frame has been fully
    /// written.  Returns the new frame's generation number.
    pub fn start_frame(&self, parts: usize, params: Arc<P>) -> Result<u64> {
        let mut state = self.lock();
        while !state.shutdown && !state.frame_done() {
            state = self
                .frame_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.shutdown {
            return Err(Error::Stopped);
        }
        state.partition = Partition::new(self.len, parts);
        state.next_chunk = 0;
        state.total_chunks = parts;
        state.completed = 0;
        state.generation += 1;
        state.params = Some(params);
        self.work_ready.notify_all();
        Ok(state.generation)
    }

    /// Called by workers.  Blocks until there is a chunk to take, and
    /// returns it; returns `None` once shutdown has been requested,
    /// after which the worker must exit.
    pub fn claim(&self) -> Option<Claim<P>> {
        let mut state = self.lock();
        while state.next_chunk >= state.total_chunks && !state.shutdown {
            state = self
                .work_ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.shutdown {
            state.workers = state.workers.saturating_sub(1);
            return None;
        }
        let index = state.next_chunk;
        state.next_chunk += 1;
        let params = match state.params {
            Some(ref params) => Arc::clone(params),
            None => unreachable!("chunks are only handed out after a frame starts"),
        };
        trace!("claimed chunk {} of frame {}", index, state.generation);
        Some(Claim {
            generation: state.generation,
            index,
            range: state.partition.chunk(index),
            params,
        })
    }

    /// Called by workers once every pixel of `claim` has been written.
    pub fn complete(&self, claim: &Claim<P>) {
        let mut state = self.lock();
        if claim.generation != state.generation {
            return;
        }
        state.completed += 1;
        if state.frame_done() {
            self.frame_done.notify_all();
        }
    }

    /// Blocks until the current frame has been fully written.  Fails
    /// if the pool shuts down first.
    pub fn wait_frame(&self) -> Result<()> {
        let mut state = self.lock();
        while !state.shutdown && !state.frame_done() {
            state = self
                .frame_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.frame_done() {
            Ok(())
        } else {
            Err(Error::Stopped)
        }
    }

    /// Asks every worker to exit.  Chunks not yet claimed are
    /// abandoned; chunks already claimed are finished.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.shutdown = true;
        self.work_ready.notify_all();
        self.frame_done.notify_all();
    }

    /// The current state of the machine.
    pub fn phase(&self) -> Phase {
        let state = self.lock();
        if state.shutdown {
            if state.workers > 0 {
                Phase::Draining
            } else {
                Phase::Stopped
            }
        } else if state.frame_done() {
            Phase::Idle
        } else {
            Phase::FrameInProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;
    use rand::Rng;
    use std::thread;
    use std::time::Duration;

    fn check_partition(len: usize, parts: usize) {
        let partition = Partition::new(len, parts);
        let limit = (len + parts - 1) / parts;
        let mut expected_start = 0;
        for range in partition.chunks() {
            assert_eq!(range.start, expected_start, "gap or overlap in {}/{}", len, parts);
            assert!(range.end >= range.start);
            assert!(range.end - range.start <= limit);
            expected_start = range.end;
        }
        assert_eq!(expected_start, len);
        assert_eq!(partition.chunks().count(), parts);
    }

    #[test]
    fn partitions_cover_exactly() {
        check_partition(16, 1);
        check_partition(16, 4);
        check_partition(17, 4);
        check_partition(1024 * 1024, 24);
    }

    #[test]
    fn more_parts_than_pixels_leaves_empty_chunks() {
        let partition = Partition::new(10, 8);
        assert_eq!(partition.part_size(), 2);
        assert_eq!(partition.chunk(4), 8..10);
        assert_eq!(partition.chunk(5), 10..10);
        assert_eq!(partition.chunk(7), 10..10);
        check_partition(10, 8);
        check_partition(3, 100);
    }

    #[test]
    fn random_partitions_cover_exactly() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let len = rng.gen_range(0, 5000);
            let parts = rng.gen_range(1, 300);
            check_partition(len, parts);
        }
    }

    #[test]
    fn a_frame_moves_through_the_phases() {
        let sched: WorkScheduler<u32> = WorkScheduler::new(10);
        assert_eq!(sched.phase(), Phase::Idle);

        let generation = sched.start_frame(3, Arc::new(7)).unwrap();
        assert_eq!(generation, 1);
        assert_eq!(sched.phase(), Phase::FrameInProgress);

        let claims: Vec<_> = (0..3).map(|_| sched.claim().unwrap()).collect();
        assert_eq!(claims[0].range, 0..4);
        assert_eq!(claims[2].range, 8..10);
        assert!(claims.iter().all(|c| *c.params == 7));
        assert_eq!(sched.phase(), Phase::FrameInProgress);

        for claim in &claims {
            sched.complete(claim);
        }
        assert_eq!(sched.phase(), Phase::Idle);
        assert!(sched.wait_frame().is_ok());
    }

    #[test]
    fn each_chunk_is_claimed_once() {
        let sched: WorkScheduler<()> = WorkScheduler::new(100);
        sched.start_frame(7, Arc::new(())).unwrap();
        let mut indices: Vec<usize> = (0..7).map(|_| sched.claim().unwrap().index).collect();
        indices.sort();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_wakes_idle_workers() {
        let sched: Arc<WorkScheduler<()>> = Arc::new(WorkScheduler::new(4));
        sched.register_workers(1);
        let worker = {
            let sched = Arc::clone(&sched);
            thread::spawn(move || sched.claim().is_none())
        };
        thread::sleep(Duration::from_millis(20));
        sched.shutdown();
        assert!(worker.join().unwrap());
        assert_eq!(sched.phase(), Phase::Stopped);
    }

    #[test]
    fn shutdown_with_workers_outstanding_is_draining() {
        let sched: WorkScheduler<()> = WorkScheduler::new(4);
        sched.register_workers(2);
        sched.shutdown();
        assert_eq!(sched.phase(), Phase::Draining);
        assert!(sched.claim().is_none());
        assert!(sched.claim().is_none());
        assert_eq!(sched.phase(), Phase::Stopped);
    }

    #[test]
    fn no_frames_after_shutdown() {
        let sched: WorkScheduler<()> = WorkScheduler::new(4);
        sched.shutdown();
        assert!(sched.start_frame(1, Arc::new(())).is_err());
    }

    #[test]
    fn start_frame_waits_for_the_previous_frame() {
        let sched: Arc<WorkScheduler<u8>> = Arc::new(WorkScheduler::new(4));
        sched.start_frame(1, Arc::new(1)).unwrap();
        let claim = sched.claim().unwrap();

        let (tx, rx) = channel::unbounded();
        let driver = {
            let sched = Arc::clone(&sched);
            thread::spawn(move || {
                let generation = sched.start_frame(1, Arc::new(2)).unwrap();
                tx.send(generation).unwrap();
            })
        };
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        sched.complete(&claim);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        driver.join().unwrap();
        assert_eq!(*sched.claim().unwrap().params, 2);
    }
}
