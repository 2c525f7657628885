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
use crate::butterflies::butterfly4;
use crate::config::Concurrency;
use crate::err::{FftError, try_vec};
use crate::pool::{WorkerPool, fan_out_1d, run_pass};
use crate::twiddles::{apply_digit_reversal, digit_reverse_indices, stage_twiddles};
use crate::{FftDirection, FftExecutor};
use num_complex::Complex;
use std::ops::Range;
use std::sync::Arc;

/// Power-of-two kernel: digit-reversal permutation followed by combined
/// radix-2/radix-4 butterfly passes, in place. A single radix-2 pass runs
/// first when log2(n) is odd; everything else is radix-4.
pub(crate) struct SplitRadixFft {
    twiddles: Vec<Complex<f64>>,
    permutation: Vec<usize>,
    execution_length: usize,
    base_radix: usize,
    direction: FftDirection,
    config: Arc<Concurrency>,
    pool: Arc<WorkerPool>,
}

impl SplitRadixFft {
    pub(crate) fn new(
        size: usize,
        direction: FftDirection,
        config: Arc<Concurrency>,
        pool: Arc<WorkerPool>,
    ) -> Result<SplitRadixFft, FftError> {
        assert!(
            size.is_power_of_two() && size >= 4,
            "split-radix kernel needs a power of two >= 4, got {size}"
        );
        let log2 = size.trailing_zeros();
        let base_radix = if log2 % 2 == 1 { 2 } else { 1 };

        let mut factors = Vec::new();
        if base_radix == 2 {
            factors.push(2);
        }
        factors.extend(std::iter::repeat_n(4, log2 as usize / 2));

        Ok(SplitRadixFft {
            twiddles: stage_twiddles(&factors, direction)?,
            permutation: digit_reverse_indices(size, &factors)?,
            execution_length: size,
            base_radix,
            direction,
            config,
            pool,
        })
    }
}

fn radix2_pass(data: &mut [Complex<f64>], pairs: Range<usize>) {
    for p in pairs {
        let i = p * 2;
        unsafe {
            let a = *data.get_unchecked(i);
            let b = *data.get_unchecked(i + 1);
            *data.get_unchecked_mut(i) = a + b;
            *data.get_unchecked_mut(i + 1) = a - b;
        }
    }
}

fn radix4_pass(
    data: &mut [Complex<f64>],
    len: usize,
    twiddles: &[Complex<f64>],
    direction: FftDirection,
    blocks: Range<usize>,
    columns: Range<usize>,
) {
    let quarter = len / 4;
    unsafe {
        for block in blocks {
            let base = block * len;
            for j in columns.clone() {
                let a = *data.get_unchecked(base + j);
                let b = *data.get_unchecked(base + j + quarter) * *twiddles.get_unchecked(3 * j);
                let c =
                    *data.get_unchecked(base + j + 2 * quarter) * *twiddles.get_unchecked(3 * j + 1);
                let d =
                    *data.get_unchecked(base + j + 3 * quarter) * *twiddles.get_unchecked(3 * j + 2);

                let (y0, y1, y2, y3) = butterfly4(a, b, c, d, direction);

                *data.get_unchecked_mut(base + j) = y0;
                *data.get_unchecked_mut(base + j + quarter) = y1;
                *data.get_unchecked_mut(base + j + 2 * quarter) = y2;
                *data.get_unchecked_mut(base + j + 3 * quarter) = y3;
            }
        }
    }
}

impl FftExecutor for SplitRadixFft {
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
        let mut len = 4usize;

        if self.base_radix == 2 {
            run_pass(&self.pool, fan_out, n / 2, 1, in_place, |data, blocks, _| {
                radix2_pass(data, blocks)
            })?;
            m_twiddles = &m_twiddles[1..];
            len = 8;
        }

        while len <= n {
            let quarter = len / 4;
            let stage = &m_twiddles[..quarter * 3];
            let direction = self.direction;
            run_pass(
                &self.pool,
                fan_out,
                n / len,
                quarter,
                in_place,
                move |data, blocks, columns| {
                    radix4_pass(data, len, stage, direction, blocks, columns)
                },
            )?;
            m_twiddles = &m_twiddles[quarter * 3..];
            len *= 4;
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

    fn make_kernel(size: usize, direction: FftDirection) -> SplitRadixFft {
        SplitRadixFft::new(size, direction, Concurrency::global(), WorkerPool::global()).unwrap()
    }

    #[test]
    fn test_matches_naive_dft() {
        for exp in 2..13u32 {
            let size = 1usize << exp;
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
                        (a.re - b.re).abs() < 1e-9,
                        "a_re {} != b_re {} for size {size} at {idx}",
                        a.re,
                        b.re
                    );
                    assert!(
                        (a.im - b.im).abs() < 1e-9,
                        "a_im {} != b_im {} for size {size} at {idx}",
                        a.im,
                        b.im
                    );
                });
        }
    }

    #[test]
    fn test_round_trip() {
        for exp in 2..12u32 {
            let size = 1usize << exp;
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
                assert!((a.re * scale - b.re).abs() < 1e-11);
                assert!((a.im * scale - b.im).abs() < 1e-11);
            }
        }
    }

    #[test]
    fn test_fan_out_does_not_change_results() {
        // Splitting a pass into contiguous ranges performs the exact same
        // arithmetic per butterfly, so the output is bit-identical.
        let size = 2048usize;
        let config = Arc::new(Concurrency::new());
        config.set_threads_begin_1d_2(512);
        config.set_threads_begin_1d_4(512);
        let pool = Arc::new(WorkerPool::new(4));

        let mut input = vec![Complex::<f64>::default(); size];
        for z in input.iter_mut() {
            *z = Complex {
                re: rand::rng().random(),
                im: rand::rng().random(),
            };
        }
        let mut serial = input.clone();
        make_kernel(size, FftDirection::Forward)
            .execute(&mut serial)
            .unwrap();

        for workers in [1usize, 2, 4] {
            config.set_worker_count(workers);
            let kernel =
                SplitRadixFft::new(size, FftDirection::Forward, config.clone(), pool.clone())
                    .unwrap();
            let mut data = input.clone();
            kernel.execute(&mut data).unwrap();
            assert_eq!(data, serial, "fan-out with {workers} workers diverged");
        }
    }

    #[test]
    fn test_rejects_wrong_length() {
        let kernel = make_kernel(16, FftDirection::Forward);
        let mut data = vec![Complex::<f64>::default(); 8];
        assert_eq!(
            kernel.execute(&mut data),
            Err(FftError::DimensionMismatch(16, 8))
        );
    }
}
