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
use crate::FftDirection;
use crate::err::{FftError, try_vec};
use num_complex::Complex;

pub(crate) fn compute_twiddle(
    index: usize,
    fft_len: usize,
    direction: FftDirection,
) -> Complex<f64> {
    let angle = -2.0 * std::f64::consts::PI * index as f64 / fft_len as f64;
    let (v_sin, v_cos) = angle.sin_cos();
    let result = Complex {
        re: v_cos,
        im: v_sin,
    };
    match direction {
        FftDirection::Forward => result,
        FftDirection::Inverse => result.conj(),
    }
}

/// Digit-reversal permutation for a decimation-in-time factorization.
///
/// `factors` is the stage order: `factors[0]` is the first butterfly pass
/// (smallest span). The value at `table[j]` is the position input element
/// `j` must occupy before the passes run. For `factors = [2, 2, ..., 2]`
/// this is the classic bit reversal.
pub(crate) fn digit_reverse_indices(n: usize, factors: &[usize]) -> Result<Vec<usize>, FftError> {
    debug_assert_eq!(factors.iter().product::<usize>(), n);
    let mut table = try_vec![0usize; n];
    for (j, slot) in table.iter_mut().enumerate() {
        let mut x = j;
        let mut rev = 0usize;
        for &radix in factors.iter().rev() {
            rev = rev * radix + x % radix;
            x /= radix;
        }
        *slot = rev;
    }
    Ok(table)
}

/// Reorders `data` so that element `j` lands at `table[j]`, through
/// `scratch`. The general mixed-radix reversal is not an involution, so the
/// pairwise-swap shortcut of the pure radix-2/4 case does not apply.
pub(crate) fn apply_digit_reversal(
    data: &mut [Complex<f64>],
    table: &[usize],
    scratch: &mut [Complex<f64>],
) {
    debug_assert_eq!(data.len(), table.len());
    debug_assert_eq!(data.len(), scratch.len());
    for (&value, &position) in data.iter().zip(table.iter()) {
        unsafe {
            *scratch.get_unchecked_mut(position) = value;
        }
    }
    data.copy_from_slice(scratch);
}

/// Flat per-stage twiddle tables for a decimation-in-time stage sequence.
///
/// For every stage of radix `r` growing the span from `columns` to
/// `columns * r`, the table stores `w(cross)^(j*k)` for `j in 0..columns`,
/// `k in 1..r`, in that order, so the stage loops can walk it linearly.
pub(crate) fn stage_twiddles(
    factors: &[usize],
    direction: FftDirection,
) -> Result<Vec<Complex<f64>>, FftError> {
    let n: usize = factors.iter().product();
    let mut twiddles = Vec::new();
    twiddles
        .try_reserve_exact(n)
        .map_err(|_| FftError::OutOfMemory(n))?;

    let mut cross_fft_len = 1usize;
    for &radix in factors {
        let num_columns = cross_fft_len;
        cross_fft_len *= radix;
        for j in 0..num_columns {
            for k in 1..radix {
                twiddles.push(compute_twiddle(j * k, cross_fft_len, direction));
            }
        }
    }
    Ok(twiddles)
}
