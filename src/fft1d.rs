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
use crate::bluestein::BluesteinFft;
use crate::butterflies::{Butterfly1, Butterfly2};
use crate::config::Concurrency;
use crate::err::{FftError, try_vec};
use crate::mixed_radix::{MixedRadixFft, is_smooth_235};
use crate::pool::WorkerPool;
use crate::split_radix::SplitRadixFft;
use crate::twiddles::compute_twiddle;
use crate::util::as_complex_mut;
use crate::{FftDirection, FftExecutor};
use num_complex::Complex;
use num_traits::Zero;
use std::sync::Arc;

/// Which kernel a [Fft1D] plan selected for its length.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FftAlgorithm {
    /// Power-of-two lengths: combined radix-2/4 passes.
    SplitRadix,
    /// {2,3,5}-smooth composite lengths.
    MixedRadix,
    /// Everything else, via the chirp-z convolution embedding.
    Bluestein,
}

/// One-dimensional double-precision FFT plan, bound to a single length.
///
/// All operations are in place on tightly packed buffers: interleaved
/// complex data (`2 * n` values, real parts at even indices) or plain real
/// data (`n` values). A plan is immutable once built and can be shared
/// across threads as long as concurrent calls use distinct buffers.
pub struct Fft1D {
    n: usize,
    algorithm: FftAlgorithm,
    forward: Arc<dyn FftExecutor + Send + Sync>,
    inverse: Arc<dyn FftExecutor + Send + Sync>,
    half_forward: Option<Arc<dyn FftExecutor + Send + Sync>>,
    half_inverse: Option<Arc<dyn FftExecutor + Send + Sync>>,
    // w(n)^k for k in 1..ceil(n/4): the untangling twiddles of the even-length
    // real path, forward orientation; the inverse conjugates on the fly.
    real_twiddles: Vec<Complex<f64>>,
}

pub(crate) fn strategy(
    n: usize,
    direction: FftDirection,
    config: &Arc<Concurrency>,
    pool: &Arc<WorkerPool>,
) -> Result<Arc<dyn FftExecutor + Send + Sync>, FftError> {
    match n {
        0 => Err(FftError::InvalidLength(0)),
        1 => Ok(Arc::new(Butterfly1::new(direction))),
        2 => Ok(Arc::new(Butterfly2::new(direction))),
        _ => {
            if n.is_power_of_two() {
                Ok(Arc::new(SplitRadixFft::new(
                    n,
                    direction,
                    config.clone(),
                    pool.clone(),
                )?))
            } else if is_smooth_235(n) {
                Ok(Arc::new(MixedRadixFft::new(
                    n,
                    direction,
                    config.clone(),
                    pool.clone(),
                )?))
            } else {
                let m = (2 * n - 1).next_power_of_two();
                let convolve = SplitRadixFft::new(m, direction, config.clone(), pool.clone())?;
                Ok(Arc::new(BluesteinFft::new(n, Arc::new(convolve), direction)?))
            }
        }
    }
}

fn algorithm_for(n: usize) -> FftAlgorithm {
    if n.is_power_of_two() {
        FftAlgorithm::SplitRadix
    } else if is_smooth_235(n) {
        FftAlgorithm::MixedRadix
    } else {
        FftAlgorithm::Bluestein
    }
}

#[inline]
fn scale_complex(buf: &mut [Complex<f64>], factor: f64) {
    for v in buf.iter_mut() {
        *v = *v * factor;
    }
}

impl Fft1D {
    /// Builds a plan for length `n`, using the process-wide concurrency
    /// configuration and worker pool.
    pub fn new(n: usize) -> Result<Fft1D, FftError> {
        Fft1D::with_tuning(n, Concurrency::global(), WorkerPool::global())
    }

    /// Builds a plan against an explicit configuration and pool. The
    /// configuration is re-read at the parallel-threshold check of each
    /// transform call.
    pub fn with_tuning(
        n: usize,
        config: Arc<Concurrency>,
        pool: Arc<WorkerPool>,
    ) -> Result<Fft1D, FftError> {
        if n == 0 {
            return Err(FftError::InvalidLength(0));
        }
        let algorithm = algorithm_for(n);
        log::debug!("planning length {n} transform via {algorithm:?}");

        let forward = strategy(n, FftDirection::Forward, &config, &pool)?;
        let inverse = strategy(n, FftDirection::Inverse, &config, &pool)?;

        let (half_forward, half_inverse, real_twiddles) = if n % 2 == 0 {
            let half = n / 2;
            let mut real_twiddles = Vec::new();
            let count = half.div_ceil(2).saturating_sub(1);
            real_twiddles
                .try_reserve_exact(count)
                .map_err(|_| FftError::OutOfMemory(count))?;
            for k in 1..half.div_ceil(2) {
                real_twiddles.push(compute_twiddle(k, n, FftDirection::Forward));
            }
            (
                Some(strategy(half, FftDirection::Forward, &config, &pool)?),
                Some(strategy(half, FftDirection::Inverse, &config, &pool)?),
                real_twiddles,
            )
        } else {
            (None, None, Vec::new())
        };

        Ok(Fft1D {
            n,
            algorithm,
            forward,
            inverse,
            half_forward,
            half_inverse,
            real_twiddles,
        })
    }

    pub fn length(&self) -> usize {
        self.n
    }

    pub fn algorithm(&self) -> FftAlgorithm {
        self.algorithm
    }

    pub(crate) fn execute_complex(
        &self,
        buf: &mut [Complex<f64>],
        direction: FftDirection,
    ) -> Result<(), FftError> {
        match direction {
            FftDirection::Forward => self.forward.execute(buf),
            FftDirection::Inverse => self.inverse.execute(buf),
        }
    }

    /// Forward DFT of `n` interleaved complex values; `x.len()` must be
    /// `2 * n`.
    pub fn complex_forward(&self, x: &mut [f64]) -> Result<(), FftError> {
        if x.len() != 2 * self.n {
            return Err(FftError::DimensionMismatch(2 * self.n, x.len()));
        }
        self.forward.execute(as_complex_mut(x))
    }

    /// Inverse DFT of `n` interleaved complex values, divided by `n` iff
    /// `scale` is set.
    pub fn complex_inverse(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        if x.len() != 2 * self.n {
            return Err(FftError::DimensionMismatch(2 * self.n, x.len()));
        }
        let buf = as_complex_mut(x);
        self.inverse.execute(buf)?;
        if scale {
            scale_complex(buf, 1.0 / self.n as f64);
        }
        Ok(())
    }

    /// Forward DFT of `n` real values, leaving the packed half spectrum in
    /// place.
    ///
    /// For even `n`: `x[0] = Re X[0]`, `x[1] = Re X[n/2]`, and
    /// `x[2k], x[2k+1] = Re X[k], Im X[k]` for `0 < k < n/2`.
    /// For odd `n`: `x[0] = Re X[0]`, `x[2k-1], x[2k] = Re X[k], Im X[k]`
    /// for `0 < k < (n+1)/2`.
    pub fn real_forward(&self, x: &mut [f64]) -> Result<(), FftError> {
        if x.len() != self.n {
            return Err(FftError::DimensionMismatch(self.n, x.len()));
        }
        if self.n == 1 {
            return Ok(());
        }
        if self.n % 2 == 0 {
            self.real_forward_even(x)
        } else {
            self.real_forward_odd(x)
        }
    }

    /// Inverse of [Fft1D::real_forward], divided by `n` iff `scale` is set.
    pub fn real_inverse(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        if x.len() != self.n {
            return Err(FftError::DimensionMismatch(self.n, x.len()));
        }
        if self.n == 1 {
            return Ok(());
        }
        if self.n % 2 == 0 {
            self.real_inverse_even(x, scale)
        } else {
            self.real_inverse_odd(x, scale)
        }
    }

    /// Forward DFT of `n` real values stored in `x[..n]`, producing the
    /// full complex spectrum; `x.len()` must be `2 * n`.
    pub fn real_forward_full(&self, x: &mut [f64]) -> Result<(), FftError> {
        if x.len() != 2 * self.n {
            return Err(FftError::DimensionMismatch(2 * self.n, x.len()));
        }
        expand_reals_in_place(x, self.n);
        self.forward.execute(as_complex_mut(x))
    }

    /// Inverse DFT of the real spectrum stored in `x[..n]`, producing the
    /// full complex result; `x.len()` must be `2 * n`. Divides by `n` iff
    /// `scale` is set.
    pub fn real_inverse_full(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        if x.len() != 2 * self.n {
            return Err(FftError::DimensionMismatch(2 * self.n, x.len()));
        }
        expand_reals_in_place(x, self.n);
        let buf = as_complex_mut(x);
        self.inverse.execute(buf)?;
        if scale {
            scale_complex(buf, 1.0 / self.n as f64);
        }
        Ok(())
    }

    // Even length: transform the buffer as n/2 interleaved complex values,
    // then untangle the half spectrum with one pairwise sweep.
    fn real_forward_even(&self, x: &mut [f64]) -> Result<(), FftError> {
        let z = as_complex_mut(x);
        let half = z.len();
        let half_executor = self
            .half_forward
            .as_ref()
            .ok_or(FftError::InvalidLength(self.n))?;
        half_executor.execute(z)?;

        let z0 = z[0];
        for k in 1..half.div_ceil(2) {
            let w = self.real_twiddles[k - 1];
            let zk = z[k];
            let zmk = z[half - k].conj();
            let even = 0.5 * (zk + zmk);
            let odd = (zk - zmk) * Complex::new(0.0, -0.5);
            let t = w * odd;
            z[k] = even + t;
            z[half - k] = (even - t).conj();
        }
        if half % 2 == 0 && half >= 2 {
            z[half / 2] = z[half / 2].conj();
        }
        z[0] = Complex::new(z0.re + z0.im, z0.re - z0.im);
        Ok(())
    }

    fn real_inverse_even(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        let z = as_complex_mut(x);
        let half = z.len();
        let half_executor = self
            .half_inverse
            .as_ref()
            .ok_or(FftError::InvalidLength(self.n))?;

        // Retangle the packed spectrum back into the half-length transform
        // of the interleaved input. Without scaling the reconstruction is
        // doubled, which together with the unscaled inner inverse yields the
        // n * x convention.
        let edge = if scale { 0.5 } else { 1.0 };
        let z0 = z[0];
        z[0] = Complex::new(edge * (z0.re + z0.im), edge * (z0.re - z0.im));
        for k in 1..half.div_ceil(2) {
            let w = self.real_twiddles[k - 1].conj();
            let xk = z[k];
            let xmk = z[half - k].conj();
            let even = edge * (xk + xmk);
            let t = edge * (xk - xmk);
            let odd = w * t;
            let rotated = Complex::new(-odd.im, odd.re);
            z[k] = even + rotated;
            z[half - k] = (even - rotated).conj();
        }
        if half % 2 == 0 && half >= 2 {
            let center = z[half / 2].conj();
            z[half / 2] = if scale { center } else { 2.0 * center };
        }

        half_executor.execute(z)?;
        if scale {
            scale_complex(z, 1.0 / half as f64);
        }
        Ok(())
    }

    // Odd length: no half-length shortcut exists, run the full complex
    // transform through scratch and fold the Hermitian spectrum down.
    fn real_forward_odd(&self, x: &mut [f64]) -> Result<(), FftError> {
        let n = self.n;
        let mut scratch = try_vec![Complex::zero(); n];
        for (dst, &src) in scratch.iter_mut().zip(x.iter()) {
            *dst = Complex::new(src, 0.0);
        }
        self.forward.execute(&mut scratch)?;
        x[0] = scratch[0].re;
        for k in 1..n.div_ceil(2) {
            x[2 * k - 1] = scratch[k].re;
            x[2 * k] = scratch[k].im;
        }
        Ok(())
    }

    fn real_inverse_odd(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        let n = self.n;
        let mut scratch = try_vec![Complex::zero(); n];
        scratch[0] = Complex::new(x[0], 0.0);
        for k in 1..n.div_ceil(2) {
            let v = Complex::new(x[2 * k - 1], x[2 * k]);
            scratch[k] = v;
            scratch[n - k] = v.conj();
        }
        self.inverse.execute(&mut scratch)?;
        if scale {
            let factor = 1.0 / n as f64;
            for (dst, src) in x.iter_mut().zip(scratch.iter()) {
                *dst = src.re * factor;
            }
        } else {
            for (dst, src) in x.iter_mut().zip(scratch.iter()) {
                *dst = src.re;
            }
        }
        Ok(())
    }
}

/// Spreads `x[..n]` over the whole buffer as complex values with zero
/// imaginary parts. Walking indices downward keeps every source slot intact
/// until it has been consumed.
pub(crate) fn expand_reals_in_place(x: &mut [f64], n: usize) {
    for k in (0..n).rev() {
        x[2 * k] = x[k];
        x[2 * k + 1] = 0.0;
    }
}
