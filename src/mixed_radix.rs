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
use crate::butterflies::{butterfly2, butterfly3, butterfly4, butterfly5};
use crate::config::Concurrency;
use crate::err::{FftError, try_vec};
use crate::pool::{WorkerPool, fan_out_1d, run_pass};
use crate::twiddles::{
    apply_digit_reversal, compute_twiddle, digit_reverse_indices, stage_twiddles,
};
use crate::{FftDirection, FftExecutor};
use num_complex::Complex;
use std::ops::Range;
use std::sync::Arc;

/// Decimation-in-time kernel for lengths whose prime factors are all in
/// {2, 3, 5}. Pairs of 2s are fused into radix-4 stages; the factorization
/// is stored largest radix first, so the smallest radices run last.
pub(crate) struct MixedRadixFft {
    factors: Vec<usize>,
    twiddles: Vec<Complex<f64>>,
    permutation: Vec<usize>,
    execution_length: usize,
    direction: FftDirection,
    tw3: Complex<f64>,
    tw5_1: Complex<f64>,
    tw5_2: Complex<f64>,
    config: Arc<Concurrency>,
    pool: Arc<WorkerPool>,
}

/// Radix stages for a {2,3,5}-smooth length, descending.
fn factorize(mut n: usize) -> Option<Vec<usize>> {
    let mut twos = 0usize;
    let mut threes = 0usize;
    let mut fives = 0usize;
    while n % 2 == 0 {
        twos += 1;
        n /= 2;
    }
    while n % 3 == 0 {
        threes += 1;
        n /= 3;
    }
    while n % 5 == 0 {
        fives += 1;
        n /= 5;
    }
    if n != 1 {
        return None;
    }
    let mut factors = Vec::new();
    factors.extend(std::iter::repeat_n(5, fives));
    factors.extend(std::iter::repeat_n(4, twos / 2));
    factors.extend(std::iter::repeat_n(3, threes));
    factors.extend(std::iter::repeat_n(2, twos % 2));
    Some(factors)
}

pub(crate) fn is_smooth_235(n: usize) -> bool {
    factorize(n).is_some()
}

impl MixedRadixFft {
    pub(crate) fn new(
        size: usize,
        direction: FftDirection,
        config: Arc<Concurrency>,
        pool: Arc<WorkerPool>,
    ) -> Result<MixedRadixFft, FftError> {
        let factors = match factorize(size) {
            Some(factors) if size > 1 => factors,
            _ => return Err(FftError::InvalidLength(size)),
        };
        Ok(MixedRadixFft {
            twiddles: stage_twiddles(&factors, direction)?,
            permutation: digit_reverse_indices(size, &factors)?,
            factors,
            execution_length: size,
            direction,
            tw3: compute_twiddle(1, 3, direction),
            tw5_1: compute_twiddle(1, 5, direction),
            tw5_2: compute_twiddle(2, 5, direction),
            config,
            pool,
        })
    }

    fn stage_pass(
        &self,
        data: &mut [Complex<f64>],
        radix: usize,
        len: usize,
        twiddles: &[Complex<f64>],
        blocks: Range<usize>,
        columns: Range<usize>,
    ) {
        let span = len / radix;
        match radix {
            2 => stage2(data, len, span, twiddles, blocks, columns),
            3 => stage3(data, len, span, twiddles, self.tw3, blocks, columns),
            4 => stage4(data, len, span, twiddles, self.direction, blocks, columns),
            5 => stage5(
                data, len, span, twiddles, self.tw5_1, self.tw5_2, blocks, columns,
            ),
            _ => unreachable!("radix {radix} has no butterfly"),
        }
    }
}

fn stage2(
    data: &mut [Complex<f64>],
    len: usize,
    span: usize,
    twiddles: &[Complex<f64>],
    blocks: Range<usize>,
    columns: Range<usize>,
) {
    unsafe {
        for block in blocks {
            let base = block * len;
            for j in columns.clone() {
                let a = *data.get_unchecked(base + j);
                let b = *data.get_unchecked(base + j + span) * *twiddles.get_unchecked(j);
                let (y0, y1) = butterfly2(a, b);
                *data.get_unchecked_mut(base + j) = y0;
                *data.get_unchecked_mut(base + j + span) = y1;
            }
        }
    }
}

fn stage3(
    data: &mut [Complex<f64>],
    len: usize,
    span: usize,
    twiddles: &[Complex<f64>],
    tw3: Complex<f64>,
    blocks: Range<usize>,
    columns: Range<usize>,
) {
    unsafe {
        for block in blocks {
            let base = block * len;
            for j in columns.clone() {
                let u0 = *data.get_unchecked(base + j);
                let u1 = *data.get_unchecked(base + j + span) * *twiddles.get_unchecked(2 * j);
                let u2 =
                    *data.get_unchecked(base + j + 2 * span) * *twiddles.get_unchecked(2 * j + 1);
                let (y0, y1, y2) = butterfly3(u0, u1, u2, tw3);
                *data.get_unchecked_mut(base + j) = y0;
                *data.get_unchecked_mut(base + j + span) = y1;
                *data.get_unchecked_mut(base + j + 2 * span) = y2;
            }
        }
    }
}

fn stage4(
    data: &mut [Complex<f64>],
    len: usize,
    span: usize,
    twiddles: &[Complex<f64>],
    direction: FftDirection,
    blocks: Range<usize>,
    columns: Range<usize>,
) {
    unsafe {
        for block in blocks {
            let base = block * len;
            for j in columns.clone() {
                let a = *data.get_unchecked(base + j);
                let b = *data.get_unchecked(base + j + span) * *twiddles.get_unchecked(3 * j);
                let c =
                    *data.get_unchecked(base + j + 2 * span) * *twiddles.get_unchecked(3 * j + 1);
                let d =
                    *data.get_unchecked(base + j + 3 * span) * *twiddles.get_unchecked(3 * j + 2);
                let (y0, y1, y2, y3) = butterfly4(a, b, c, d, direction);
                *data.get_unchecked_mut(base + j) = y0;
                *data.get_unchecked_mut(base + j + span) = y1;
                *data.get_unchecked_mut(base + j + 2 * span) = y2;
                *data.get_unchecked_mut(base + j + 3 * span) = y3;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn stage5(
    data: &mut [Complex<f64>],
    len: usize,
    span: usize,
    twiddles: &[Complex<f64>],
    tw5_1: Complex<f64>,
    tw5_2: Complex<f64>,
    blocks: Range<usize>,
    columns: Range<usize>,
) {
    unsafe {
        for block in blocks {
            let base = block * len;
            for j in columns.clone() {
                let u0 = *data.get_unchecked(base + j);
                let u1 = *data.get_unchecked(base + j + span) * *twiddles.get_unchecked(4 * j);
                let u2 =
                    *data.get_unchecked(base + j + 2 * span) * *twiddles.get_unchecked(4 * j + 1);
                let u3 =
                    *data.get_unchecked(base + j + 3 * span) * *twiddles.get_unchecked(4 * j + 2);
                let u4 =
                    *data.get_unchecked(base + j + 4 * span) * *twiddles.get_unchecked(4 * j + 3);
                let (y0, y1, y2, y3, y4) = butterfly5(u0, u1, u2, u3, u4, tw5_1, tw5_2);
                *data.get_unchecked_mut(base + j) = y0;
                *data.get_unchecked_mut(base + j + span) = y1;
                *data.get_unchecked_mut(base + j + 2 * span) = y2;
                *data.get_unchecked_mut(base + j + 3 * span) = y3;
                *data.get_unchecked_mut(base + j + 4 * span) = y4;
            }
        }
    }
}

impl FftExecutor for MixedRadixFft {
    fn execute(&self, in_place: &mut [Complex<f64>]) -> Result<(), FftError> {
        let n = self.execution_length;
        if in_place.len() != n {
            return Err(FftError::DimensionMismatch(n, in_place.len()));
        }

        {
            let mut scratch = try_vec![Complex::new(0.0, 0.0); n];
            apply_digit_reversal(in_place, &self.permutation, &mut scratch);
        }

        let fan_out = fan_out_1d(n, &self.config, &self.pool);
        let mut m_twiddles = self.twiddles.as_slice();
        let mut len = 1usize;

        for &radix in self.factors.iter() {
            let columns = len;
            len *= radix;
            let stage = &m_twiddles[..columns * (radix - 1)];
            run_pass(
                &self.pool,
                fan_out,
                n / len,
                columns,
                in_place,
                move |data, blocks, cols| self.stage_pass(data, radix, len, stage, blocks, cols),
            )?;
            m_twiddles = &m_twiddles[columns * (radix - 1)..];
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::Dft;
    use rand::Rng;

    fn make_kernel(size: usize, direction: FftDirection) -> MixedRadixFft {
        MixedRadixFft::new(size, direction, Concurrency::global(), WorkerPool::global()).unwrap()
    }

    #[test]
    fn test_factorize() {
        assert_eq!(factorize(6), Some(vec![3, 2]));
        assert_eq!(factorize(8), Some(vec![4, 2]));
        assert_eq!(factorize(45), Some(vec![5, 3, 3]));
        assert_eq!(factorize(60), Some(vec![5, 4, 3]));
        assert_eq!(factorize(100), Some(vec![5, 5, 4]));
        assert_eq!(factorize(7), None);
        assert_eq!(factorize(22), None);
        assert!(is_smooth_235(720));
        assert!(!is_smooth_235(77));
    }

    #[test]
    fn test_matches_naive_dft() {
        for size in [
            3usize, 5, 6, 9, 10, 12, 15, 18, 20, 25, 27, 30, 45, 48, 60, 75, 80, 90, 100, 120,
            125, 135, 144, 150, 160, 180, 200, 225, 240, 250, 270, 300, 360, 375, 400, 405, 450,
            480, 500, 540, 600, 625, 640, 675, 720, 750, 800, 810, 900, 960, 1000,
        ] {
            let mut input = vec![Complex::<f64>::default(); size];
            for z in input.iter_mut() {
                *z = Complex {
                    re: rand::rng().random(),
                    im: rand::rng().random(),
                };
            }
            let mut reference = input.clone();
            Dft::new(size, FftDirection::Forward).execute(&mut reference);

            let forward = make_kernel(size, FftDirection::Forward);
            forward.execute(&mut input).unwrap();

            input
                .iter()
                .zip(reference.iter())
                .enumerate()
                .for_each(|(idx, (a, b))| {
                    assert!(
                        (a.re - b.re).abs() < 1e-8,
                        "a_re {} != b_re {} for size {size} at {idx}",
                        a.re,
                        b.re
                    );
                    assert!(
                        (a.im - b.im).abs() < 1e-8,
                        "a_im {} != b_im {} for size {size} at {idx}",
                        a.im,
                        b.im
                    );
                });
        }
    }

    #[test]
    fn test_round_trip() {
        for size in [3usize, 6, 12, 15, 36, 50, 96, 108, 180, 225, 480, 729, 1920] {
            let mut input = vec![Complex::<f64>::default(); size];
            for z in input.iter_mut() {
                *z = Complex {
                    re: rand::rng().random(),
                    im: rand::rng().random(),
                };
            }
            let src = input.clone();
            let forward = make_kernel(size, FftDirection::Forward);
            let inverse = make_kernel(size, FftDirection::Inverse);
            forward.execute(&mut input).unwrap();
            inverse.execute(&mut input).unwrap();
            let scale = 1.0 / size as f64;
            for (a, b) in input.iter().zip(src.iter()) {
                assert!((a.re * scale - b.re).abs() < 1e-10);
                assert!((a.im * scale - b.im).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_rejects_rough_lengths() {
        assert!(matches!(
            MixedRadixFft::new(
                14,
                FftDirection::Forward,
                Concurrency::global(),
                WorkerPool::global()
            ),
            Err(FftError::InvalidLength(14))
        ));
    }
}
