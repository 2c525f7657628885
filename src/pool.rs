/*
 * // Copyright (c) the parfft contributors 2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::config::{Concurrency, hardware_workers, prev_pow2};
use crate::err::FftError;
use crate::util::{RawParts, chunk_ranges};
use crossbeam_channel::{Receiver, Sender};
use num_complex::Complex;
use std::cell::Cell;
use std::ops::Range;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

struct Job {
    run: Box<dyn FnOnce() + Send + 'static>,
    done: Sender<Result<(), ()>>,
}

/// Join handle for a task submitted to the [WorkerPool].
pub struct TaskHandle {
    waiter: Option<Receiver<Result<(), ()>>>,
    ready: Option<Result<(), ()>>,
}

impl TaskHandle {
    /// Blocks until the task has finished. Returns [FftError::WorkerFailure]
    /// if the task panicked or the worker went away before completing it.
    pub fn wait(self) -> Result<(), FftError> {
        let outcome = match (self.ready, self.waiter) {
            (Some(outcome), _) => outcome,
            (None, Some(rx)) => rx.recv().unwrap_or(Err(())),
            (None, None) => Err(()),
        };
        outcome.map_err(|_| FftError::WorkerFailure)
    }
}

/// Fixed-size pool of worker threads driving data-parallel transform
/// decomposition.
///
/// The cardinality is always a power of two; the decomposition fan-out is 2
/// or 4, and power-of-two worker counts keep the chunks balanced. Tasks run
/// first-come-first-served, and a panicking task neither poisons the pool
/// nor kills its worker.
pub struct WorkerPool {
    queue: Sender<Job>,
    cardinality: usize,
}

thread_local! {
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

fn worker_loop(jobs: Receiver<Job>) {
    ON_WORKER.with(|flag| flag.set(true));
    for job in jobs.iter() {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(job.run));
        if let Err(payload) = &outcome {
            let message = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("opaque panic payload");
            log::error!("pool task panicked: {message}");
        }
        // The submitter may have stopped waiting already.
        let _ = job.done.send(outcome.map_err(|_| ()));
    }
}

impl WorkerPool {
    /// Builds a pool with `workers` threads, rounded down to a power of two
    /// (minimum one).
    pub fn new(workers: usize) -> WorkerPool {
        let workers = prev_pow2(workers.max(1));
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let mut spawned = 0usize;
        for i in 0..workers {
            let jobs = rx.clone();
            let builder = std::thread::Builder::new().name(format!("parfft-worker-{i}"));
            match builder.spawn(move || worker_loop(jobs)) {
                Ok(_) => spawned += 1,
                Err(e) => log::error!("failed to spawn pool worker {i}: {e}"),
            }
        }
        log::debug!("worker pool up with {spawned} thread(s)");
        WorkerPool {
            queue: tx,
            cardinality: spawned,
        }
    }

    /// The process-wide pool, sized to the largest power of two not
    /// exceeding the available hardware parallelism. Built on first use and
    /// alive until process teardown.
    pub fn global() -> Arc<WorkerPool> {
        static GLOBAL: OnceLock<Arc<WorkerPool>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(WorkerPool::new(hardware_workers())))
            .clone()
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// True when the calling thread is one of this process' pool workers.
    /// Transforms already running on a worker must not fan out again: with a
    /// fixed pool, a worker blocking on work that can only run on the same
    /// pool never makes progress.
    pub fn on_worker_thread() -> bool {
        ON_WORKER.with(|flag| flag.get())
    }

    /// Submits a task and returns a handle that blocks until it finished.
    pub fn submit<F: FnOnce() + Send + 'static>(&self, task: F) -> TaskHandle {
        if self.cardinality == 0 {
            // No worker ever came up; degrade to caller-thread execution.
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(task));
            return TaskHandle {
                waiter: None,
                ready: Some(outcome.map_err(|_| ())),
            };
        }
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let job = Job {
            run: Box::new(task),
            done: done_tx,
        };
        if let Err(rejected) = self.queue.send(job) {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(rejected.0.run));
            return TaskHandle {
                waiter: None,
                ready: Some(outcome.map_err(|_| ())),
            };
        }
        TaskHandle {
            waiter: Some(done_rx),
            ready: None,
        }
    }

    /// Runs `task(part)` for every `part` in `0..parts` on the pool and
    /// waits for all of them: the barrier between decomposition passes.
    pub(crate) fn broadcast<F>(&self, parts: usize, task: F) -> Result<(), FftError>
    where
        F: Fn(usize) + Send + Sync,
    {
        if parts <= 1 {
            task(0);
            return Ok(());
        }
        let task: &(dyn Fn(usize) + Send + Sync) = &task;
        // Every handle is waited on below before `task` goes out of scope,
        // which is what makes the borrow extension sound.
        let task: &'static (dyn Fn(usize) + Send + Sync) = unsafe { std::mem::transmute(task) };
        let handles: Vec<TaskHandle> = (0..parts).map(|p| self.submit(move || task(p))).collect();
        let mut failed = false;
        for handle in handles {
            if handle.wait().is_err() {
                failed = true;
            }
        }
        if failed {
            return Err(FftError::WorkerFailure);
        }
        Ok(())
    }
}

/// Fan-out for a one-dimensional pass: 4 workers past the four-thread
/// threshold, 2 past the two-thread threshold, otherwise serial. Transforms
/// already running on a pool worker never fan out again.
pub(crate) fn fan_out_1d(n: usize, config: &Concurrency, pool: &WorkerPool) -> usize {
    if WorkerPool::on_worker_thread() {
        return 1;
    }
    let workers = config.worker_count().min(pool.cardinality());
    if workers >= 4 && n > config.threads_begin_1d_4() {
        4
    } else if workers >= 2 && n > config.threads_begin_1d_2() {
        2
    } else {
        1
    }
}

/// Runs one butterfly pass, either inline or split into `fan_out` disjoint
/// contiguous ranges on the pool. The split is over blocks when there are
/// enough of them, over butterfly columns inside the blocks otherwise (the
/// late passes of a transform have few, wide blocks).
pub(crate) fn run_pass<F>(
    pool: &WorkerPool,
    fan_out: usize,
    blocks: usize,
    columns: usize,
    data: &mut [Complex<f64>],
    body: F,
) -> Result<(), FftError>
where
    F: Fn(&mut [Complex<f64>], Range<usize>, Range<usize>) + Send + Sync,
{
    if fan_out <= 1 {
        body(data, 0..blocks, 0..columns);
        return Ok(());
    }
    let raw = RawParts::new(data);
    if blocks >= fan_out {
        let ranges = chunk_ranges(blocks, fan_out);
        pool.broadcast(fan_out, |part| {
            let chunk = unsafe { raw.slice() };
            body(chunk, ranges[part].clone(), 0..columns);
        })
    } else {
        let ranges = chunk_ranges(columns, fan_out);
        pool.broadcast(fan_out, |part| {
            let chunk = unsafe { raw.slice() };
            body(chunk, 0..blocks, ranges[part].clone());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_submit_and_wait() {
        let pool = WorkerPool::new(2);
        assert_eq!(pool.cardinality(), 2);
        let counter = Arc::new(AtomicUsize::new(0));
        let handles: Vec<TaskHandle> = (0..16)
            .map(|_| {
                let counter = counter.clone();
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.wait().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_panic_does_not_poison_the_pool() {
        let pool = WorkerPool::new(1);
        let failing = pool.submit(|| panic!("boom"));
        assert_eq!(failing.wait(), Err(FftError::WorkerFailure));
        // The single worker must still be alive to run this.
        let ok = pool.submit(|| {});
        assert!(ok.wait().is_ok());
    }

    #[test]
    fn test_cardinality_rounds_down() {
        let pool = WorkerPool::new(3);
        assert_eq!(pool.cardinality(), 2);
        let pool = WorkerPool::new(0);
        assert_eq!(pool.cardinality(), 1);
    }

    #[test]
    fn test_broadcast_runs_every_part() {
        let pool = WorkerPool::new(4);
        let hits = AtomicUsize::new(0);
        pool.broadcast(4, |part| {
            hits.fetch_add(1 << part, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0b1111);
    }

    #[test]
    fn test_worker_flag() {
        assert!(!WorkerPool::on_worker_thread());
        let pool = WorkerPool::new(1);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        pool.submit(move || {
            if WorkerPool::on_worker_thread() {
                seen_clone.store(1, Ordering::SeqCst);
            }
        })
        .wait()
        .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
