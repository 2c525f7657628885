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
use crate::err::{FftError, try_vec};
use crate::twiddles::compute_twiddle;
use crate::{FftDirection, FftExecutor};
use num_complex::Complex;
use num_traits::Zero;
use std::sync::Arc;
use strength_reduce::StrengthReducedU64;

/// Arbitrary-length fallback: embeds the transform into a circular
/// convolution of power-of-two length, computed with two inner FFTs against
/// a kernel spectrum prepared once at construction time.
pub(crate) struct BluesteinFft {
    convolve_fft: Arc<dyn FftExecutor + Send + Sync>,
    kernel_spectrum: Vec<Complex<f64>>,
    chirp: Vec<Complex<f64>>,
    execution_length: usize,
    direction: FftDirection,
}

/// Fills `destination` with `exp(-+i*pi*k^2/n)` where `n = destination.len()`.
///
/// The index must be squared before the twiddle lookup, and twiddles are
/// cyclic, so reducing `k^2 mod 2n` first keeps the angle computation in a
/// range where the conversion to floating point stays exact. The reduction
/// runs once per element, hence the strength-reduced divisor.
fn make_chirp(destination: &mut [Complex<f64>], direction: FftDirection) {
    let twice_len = destination.len() * 2;
    let twice_len_reduced = StrengthReducedU64::new(twice_len as u64);
    for (i, e) in destination.iter_mut().enumerate() {
        let i_squared = i as u64 * i as u64;
        let i_mod = i_squared % twice_len_reduced;
        *e = compute_twiddle(i_mod as usize, twice_len, direction);
    }
}

impl BluesteinFft {
    /// `convolve_fft` must be a same-direction kernel of length at least
    /// `2 * size - 1`.
    pub(crate) fn new(
        size: usize,
        convolve_fft: Arc<dyn FftExecutor + Send + Sync>,
        direction: FftDirection,
    ) -> Result<BluesteinFft, FftError> {
        let convolve_len = convolve_fft.length();
        assert!(
            size * 2 - 1 <= convolve_len,
            "convolution length {convolve_len} is too short for a transform of {size}"
        );
        assert_eq!(convolve_fft.direction(), direction);

        // The second inner FFT is folded into the kernel: its 1/m scale and
        // the conjugation trick both get baked in here.
        let inner_scale = 1.0 / convolve_len as f64;

        let mut kernel_spectrum = try_vec![Complex::zero(); convolve_len];
        make_chirp(&mut kernel_spectrum[..size], direction.inverse());

        kernel_spectrum[0] = kernel_spectrum[0] * inner_scale;
        for i in 1..size {
            let twiddle = kernel_spectrum[i] * inner_scale;
            kernel_spectrum[i] = twiddle;
            kernel_spectrum[convolve_len - i] = twiddle;
        }
        convolve_fft.execute(&mut kernel_spectrum)?;

        let mut chirp = try_vec![Complex::zero(); size];
        make_chirp(&mut chirp, direction);

        Ok(BluesteinFft {
            convolve_fft,
            kernel_spectrum,
            chirp,
            execution_length: size,
            direction,
        })
    }
}

impl FftExecutor for BluesteinFft {
    fn execute(&self, in_place: &mut [Complex<f64>]) -> Result<(), FftError> {
        let n = self.execution_length;
        if in_place.len() != n {
            return Err(FftError::DimensionMismatch(n, in_place.len()));
        }

        let m = self.kernel_spectrum.len();
        let mut scratch = try_vec![Complex::zero(); m];

        // Chirp-modulate into the zero-padded convolution input.
        for ((dst, &src), &w) in scratch.iter_mut().zip(in_place.iter()).zip(self.chirp.iter()) {
            *dst = src * w;
        }

        self.convolve_fft.execute(&mut scratch)?;

        // Pointwise multiply by the kernel spectrum, conjugating to turn the
        // next same-direction FFT into the inverse of the first one.
        for (dst, &k) in scratch.iter_mut().zip(self.kernel_spectrum.iter()) {
            *dst = (*dst * k).conj();
        }

        self.convolve_fft.execute(&mut scratch)?;

        // Undo the conjugation and demodulate the leading n samples.
        for ((dst, &src), &w) in in_place.iter_mut().zip(scratch.iter()).zip(self.chirp.iter()) {
            *dst = src.conj() * w;
        }
        Ok(())
    }

    fn direction(&self) -> FftDirection {
        self.direction
    }

    fn length(&self) -> usize {
        self.execution_length
    }
}
