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

//! In-place FFTs for 1-D and 2-D double-precision data of arbitrary length,
//! with threshold-gated parallel decomposition over a fixed worker pool.

mod bluestein;
mod butterflies;
mod config;
#[cfg(test)]
mod dft;
mod err;
mod fft1d;
mod fft2d;
mod mixed_radix;
mod packed2d;
mod pool;
mod split_radix;
mod twiddles;
mod util;

pub use config::{Concurrency, next_pow2, prev_pow2};
pub use err::FftError;
pub use fft1d::{Fft1D, FftAlgorithm};
pub use fft2d::Fft2D;
pub use packed2d::PackedHermitian2D;
pub use pool::{TaskHandle, WorkerPool};

use num_complex::Complex;
use std::fmt::{Display, Formatter};

/// A planned transform kernel operating in place on interleaved complex
/// buffers of one fixed length.
pub trait FftExecutor {
    fn execute(&self, in_place: &mut [Complex<f64>]) -> Result<(), FftError>;
    fn direction(&self) -> FftDirection;
    fn length(&self) -> usize;
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum FftDirection {
    Forward,
    Inverse,
}

impl FftDirection {
    pub fn inverse(self) -> FftDirection {
        match self {
            FftDirection::Forward => FftDirection::Inverse,
            FftDirection::Inverse => FftDirection::Forward,
        }
    }
}

impl Display for FftDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FftDirection::Forward => f.write_str("FftDirection::Forward"),
            FftDirection::Inverse => f.write_str("FftDirection::Inverse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_direction_inverse() {
        assert_eq!(FftDirection::Forward.inverse(), FftDirection::Inverse);
        assert_eq!(FftDirection::Inverse.inverse(), FftDirection::Forward);
    }

    // Every length from 1 to 600 goes through planning and a scaled round
    // trip, covering the split-radix, mixed-radix, and chirp-z selections
    // together with both parities of the real path.
    #[test]
    fn test_every_length_round_trips() {
        for n in 1..600usize {
            let fft = Fft1D::new(n).expect("planning failed");
            let mut complex_data = vec![0.0f64; 2 * n];
            for (i, v) in complex_data.iter_mut().enumerate() {
                *v = -0.19528865 + i as f64 * 0.001;
            }
            let complex_src = complex_data.clone();
            fft.complex_forward(&mut complex_data).unwrap();
            fft.complex_inverse(&mut complex_data, true).unwrap();
            for (idx, (a, b)) in complex_data.iter().zip(complex_src.iter()).enumerate() {
                assert!(
                    (a - b).abs() < 1e-9,
                    "complex {a} != {b} at {idx} for size {n}"
                );
            }

            let mut real_data: Vec<f64> = (0..n)
                .map(|_| rand::rng().random_range(-1.0..1.0))
                .collect();
            let real_src = real_data.clone();
            fft.real_forward(&mut real_data).unwrap();
            fft.real_inverse(&mut real_data, true).unwrap();
            for (idx, (a, b)) in real_data.iter().zip(real_src.iter()).enumerate() {
                assert!((a - b).abs() < 1e-9, "real {a} != {b} at {idx} for size {n}");
            }
        }
    }
}
