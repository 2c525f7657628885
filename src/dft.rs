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

//! Naive O(n²) DFT, kept as the reference the kernel tests compare against.

use crate::FftDirection;
use crate::twiddles::compute_twiddle;
use num_complex::Complex;

pub(crate) struct Dft {
    twiddles: Vec<Complex<f64>>,
    execution_length: usize,
}

impl Dft {
    pub(crate) fn new(size: usize, direction: FftDirection) -> Dft {
        Dft {
            twiddles: (0..size)
                .map(|k| compute_twiddle(k, size, direction))
                .collect(),
            execution_length: size,
        }
    }

    pub(crate) fn execute(&self, in_place: &mut [Complex<f64>]) {
        assert_eq!(in_place.len(), self.execution_length);
        let n = self.execution_length;
        let mut output = vec![Complex::new(0.0, 0.0); n];
        for (k, dst) in output.iter_mut().enumerate() {
            let mut sum = Complex::new(0.0, 0.0);
            let mut twiddle_idx = 0usize;
            for src in in_place.iter() {
                sum += *src * self.twiddles[twiddle_idx];
                twiddle_idx += k;
                if twiddle_idx >= n {
                    twiddle_idx -= n;
                }
            }
            *dst = sum;
        }
        in_place.copy_from_slice(&output);
    }
}
