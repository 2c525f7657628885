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
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

const DEFAULT_THREADS_BEGIN_1D_2: usize = 8192;
const DEFAULT_THREADS_BEGIN_1D_4: usize = 65536;
const DEFAULT_THREADS_BEGIN_2D: usize = 65536;
const DEFAULT_THREADS_BEGIN_3D: usize = 65536;

/// The smallest value the one-dimensional thresholds may be set to.
const MIN_1D_THRESHOLD: usize = 512;

/// Process-wide concurrency tunables: how many workers a transform may fan
/// out to, and from which buffer sizes fanning out pays off at all.
///
/// Plans read these values when they are built and at the threshold check of
/// each transform call; changing them never affects a transform that is
/// already running.
pub struct Concurrency {
    workers: AtomicUsize,
    threads_begin_1d_2: AtomicUsize,
    threads_begin_1d_4: AtomicUsize,
    threads_begin_2d: AtomicUsize,
    // Retained for the higher-dimensional drivers; nothing reads it yet.
    threads_begin_3d: AtomicUsize,
}

impl Concurrency {
    pub fn new() -> Concurrency {
        Concurrency {
            workers: AtomicUsize::new(hardware_workers()),
            threads_begin_1d_2: AtomicUsize::new(DEFAULT_THREADS_BEGIN_1D_2),
            threads_begin_1d_4: AtomicUsize::new(DEFAULT_THREADS_BEGIN_1D_4),
            threads_begin_2d: AtomicUsize::new(DEFAULT_THREADS_BEGIN_2D),
            threads_begin_3d: AtomicUsize::new(DEFAULT_THREADS_BEGIN_3D),
        }
    }

    /// The process-wide instance used by [`crate::Fft1D::new`] and
    /// [`crate::Fft2D::new`].
    pub fn global() -> Arc<Concurrency> {
        static GLOBAL: OnceLock<Arc<Concurrency>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Concurrency::new())).clone()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.load(Ordering::Relaxed)
    }

    /// Sets the number of workers a transform may occupy. Values that are
    /// not a power of two are rounded down; zero is treated as one.
    pub fn set_worker_count(&self, n: usize) {
        self.workers.store(prev_pow2(n.max(1)), Ordering::Relaxed);
    }

    pub fn threads_begin_1d_2(&self) -> usize {
        self.threads_begin_1d_2.load(Ordering::Relaxed)
    }

    pub fn set_threads_begin_1d_2(&self, n: usize) {
        self.threads_begin_1d_2
            .store(n.max(MIN_1D_THRESHOLD), Ordering::Relaxed);
    }

    pub fn threads_begin_1d_4(&self) -> usize {
        self.threads_begin_1d_4.load(Ordering::Relaxed)
    }

    pub fn set_threads_begin_1d_4(&self, n: usize) {
        self.threads_begin_1d_4
            .store(n.max(MIN_1D_THRESHOLD), Ordering::Relaxed);
    }

    pub fn threads_begin_2d(&self) -> usize {
        self.threads_begin_2d.load(Ordering::Relaxed)
    }

    pub fn set_threads_begin_2d(&self, n: usize) {
        self.threads_begin_2d.store(n, Ordering::Relaxed);
    }

    pub fn threads_begin_3d(&self) -> usize {
        self.threads_begin_3d.load(Ordering::Relaxed)
    }

    pub fn set_threads_begin_3d(&self, n: usize) {
        self.threads_begin_3d.store(n, Ordering::Relaxed);
    }

    /// Restores the one-dimensional thresholds to their defaults.
    pub fn reset_threads_begin_1d(&self) {
        self.threads_begin_1d_2
            .store(DEFAULT_THREADS_BEGIN_1D_2, Ordering::Relaxed);
        self.threads_begin_1d_4
            .store(DEFAULT_THREADS_BEGIN_1D_4, Ordering::Relaxed);
    }

    /// Restores the 2-D and 3-D thresholds to their defaults.
    pub fn reset_threads_begin_nd(&self) {
        self.threads_begin_2d
            .store(DEFAULT_THREADS_BEGIN_2D, Ordering::Relaxed);
        self.threads_begin_3d
            .store(DEFAULT_THREADS_BEGIN_3D, Ordering::Relaxed);
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Concurrency::new()
    }
}

/// Largest power of two not exceeding the available hardware parallelism.
pub(crate) fn hardware_workers() -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    prev_pow2(available)
}

/// Smallest power of two greater than or equal to `x`.
pub fn next_pow2(x: usize) -> usize {
    x.max(1).next_power_of_two()
}

/// Largest power of two less than or equal to `x`.
pub fn prev_pow2(x: usize) -> usize {
    if x == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - x.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow2_helpers() {
        assert_eq!(prev_pow2(1), 1);
        assert_eq!(prev_pow2(2), 2);
        assert_eq!(prev_pow2(3), 2);
        assert_eq!(prev_pow2(6), 4);
        assert_eq!(prev_pow2(8), 8);
        assert_eq!(prev_pow2(1023), 512);
        assert_eq!(next_pow2(0), 1);
        assert_eq!(next_pow2(1), 1);
        assert_eq!(next_pow2(5), 8);
        assert_eq!(next_pow2(64), 64);
    }

    #[test]
    fn test_worker_count_rounds_down() {
        let config = Concurrency::new();
        config.set_worker_count(6);
        assert_eq!(config.worker_count(), 4);
        config.set_worker_count(0);
        assert_eq!(config.worker_count(), 1);
        config.set_worker_count(16);
        assert_eq!(config.worker_count(), 16);
    }

    #[test]
    fn test_1d_thresholds_clamp() {
        let config = Concurrency::new();
        config.set_threads_begin_1d_2(100);
        assert_eq!(config.threads_begin_1d_2(), 512);
        config.set_threads_begin_1d_4(0);
        assert_eq!(config.threads_begin_1d_4(), 512);
        config.set_threads_begin_1d_2(4096);
        assert_eq!(config.threads_begin_1d_2(), 4096);
        config.reset_threads_begin_1d();
        assert_eq!(config.threads_begin_1d_2(), 8192);
        assert_eq!(config.threads_begin_1d_4(), 65536);
    }

    #[test]
    fn test_nd_thresholds_unclamped() {
        let config = Concurrency::new();
        config.set_threads_begin_2d(4);
        assert_eq!(config.threads_begin_2d(), 4);
        config.set_threads_begin_3d(0);
        assert_eq!(config.threads_begin_3d(), 0);
        config.reset_threads_begin_nd();
        assert_eq!(config.threads_begin_2d(), 65536);
        assert_eq!(config.threads_begin_3d(), 65536);
    }
}
