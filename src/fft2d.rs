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
use crate::config::Concurrency;
use crate::err::{FftError, try_vec};
use crate::fft1d::{Fft1D, expand_reals_in_place};
use crate::pool::WorkerPool;
use crate::util::{RawParts, RawRealParts, as_complex_mut, chunk_ranges};
use crate::FftDirection;
use num_complex::Complex;
use num_traits::Zero;
use std::sync::Arc;

/// Two-dimensional double-precision FFT plan over a row-major
/// `rows x cols` grid.
///
/// The driver runs one-dimensional transforms along each axis: a pass over
/// the rows through the `cols`-length plan and a pass over the columns
/// through the `rows`-length plan, gathering each column into contiguous
/// scratch. When the grid reaches the 2-D threshold and more than one worker
/// is configured, the row/column index ranges are partitioned across the
/// pool, one barrier per pass.
pub struct Fft2D {
    rows: usize,
    cols: usize,
    row_plan: Arc<Fft1D>,
    col_plan: Arc<Fft1D>,
    use_parallel: bool,
    config: Arc<Concurrency>,
    pool: Arc<WorkerPool>,
}

impl Fft2D {
    /// Builds a plan for a `rows x cols` grid against the process-wide
    /// configuration and worker pool.
    pub fn new(rows: usize, cols: usize) -> Result<Fft2D, FftError> {
        Fft2D::with_tuning(rows, cols, Concurrency::global(), WorkerPool::global())
    }

    pub fn with_tuning(
        rows: usize,
        cols: usize,
        config: Arc<Concurrency>,
        pool: Arc<WorkerPool>,
    ) -> Result<Fft2D, FftError> {
        if rows == 0 {
            return Err(FftError::InvalidLength(0));
        }
        if cols == 0 {
            return Err(FftError::InvalidLength(0));
        }
        let row_plan = Arc::new(Fft1D::with_tuning(cols, config.clone(), pool.clone())?);
        let col_plan = if rows == cols {
            row_plan.clone()
        } else {
            Arc::new(Fft1D::with_tuning(rows, config.clone(), pool.clone())?)
        };
        let use_parallel = rows * cols >= config.threads_begin_2d();
        Ok(Fft2D {
            rows,
            cols,
            row_plan,
            col_plan,
            use_parallel,
            config,
            pool,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn fan_out(&self) -> usize {
        if WorkerPool::on_worker_thread() {
            return 1;
        }
        let workers = self.config.worker_count().min(self.pool.cardinality());
        if workers > 1 && self.use_parallel {
            workers
        } else {
            1
        }
    }

    /// Forward DFT of the `rows x cols` interleaved complex grid;
    /// `x.len()` must be `2 * rows * cols`.
    pub fn complex_forward(&self, x: &mut [f64]) -> Result<(), FftError> {
        let expected = 2 * self.rows * self.cols;
        if x.len() != expected {
            return Err(FftError::DimensionMismatch(expected, x.len()));
        }
        let data = as_complex_mut(x);
        self.complex_row_pass(data, FftDirection::Forward)?;
        self.complex_col_pass(data, FftDirection::Forward)
    }

    /// Inverse DFT of the grid, divided by `rows * cols` iff `scale` is set.
    pub fn complex_inverse(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        let expected = 2 * self.rows * self.cols;
        if x.len() != expected {
            return Err(FftError::DimensionMismatch(expected, x.len()));
        }
        let data = as_complex_mut(x);
        self.complex_col_pass(data, FftDirection::Inverse)?;
        self.complex_row_pass(data, FftDirection::Inverse)?;
        if scale {
            let factor = 1.0 / (self.rows * self.cols) as f64;
            for v in data.iter_mut() {
                *v = *v * factor;
            }
        }
        Ok(())
    }

    /// Forward DFT of `rows x cols` real values, leaving the packed
    /// Hermitian spectrum in the same buffer. Both dimensions must be even;
    /// odd sizes are served by [Fft2D::real_forward_full], which produces
    /// the full spectrum instead.
    pub fn real_forward(&self, x: &mut [f64]) -> Result<(), FftError> {
        let expected = self.rows * self.cols;
        if x.len() != expected {
            return Err(FftError::DimensionMismatch(expected, x.len()));
        }
        if self.rows % 2 != 0 {
            return Err(FftError::InvalidLength(self.rows));
        }
        if self.cols % 2 != 0 {
            return Err(FftError::InvalidLength(self.cols));
        }
        self.real_row_pass(x, FftDirection::Forward, false)?;
        self.packed_complex_col_pass(x, FftDirection::Forward, false)?;
        self.packed_edge_col_pass_forward(x)
    }

    /// Inverse of [Fft2D::real_forward], divided by `rows * cols` iff
    /// `scale` is set.
    pub fn real_inverse(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        let expected = self.rows * self.cols;
        if x.len() != expected {
            return Err(FftError::DimensionMismatch(expected, x.len()));
        }
        if self.rows % 2 != 0 {
            return Err(FftError::InvalidLength(self.rows));
        }
        if self.cols % 2 != 0 {
            return Err(FftError::InvalidLength(self.cols));
        }
        self.packed_edge_col_pass_inverse(x, scale)?;
        self.packed_complex_col_pass(x, FftDirection::Inverse, scale)?;
        self.real_row_pass(x, FftDirection::Inverse, scale)
    }

    /// Forward DFT of `rows * cols` real values stored in the leading half
    /// of `x`, producing the full complex spectrum; `x.len()` must be
    /// `2 * rows * cols`.
    pub fn real_forward_full(&self, x: &mut [f64]) -> Result<(), FftError> {
        let expected = 2 * self.rows * self.cols;
        if x.len() != expected {
            return Err(FftError::DimensionMismatch(expected, x.len()));
        }
        expand_reals_in_place(x, self.rows * self.cols);
        let data = as_complex_mut(x);
        self.complex_row_pass(data, FftDirection::Forward)?;
        self.complex_col_pass(data, FftDirection::Forward)
    }

    /// Inverse DFT of the real spectrum stored in the leading half of `x`,
    /// producing the full complex result. Divides by `rows * cols` iff
    /// `scale` is set.
    pub fn real_inverse_full(&self, x: &mut [f64], scale: bool) -> Result<(), FftError> {
        let expected = 2 * self.rows * self.cols;
        if x.len() != expected {
            return Err(FftError::DimensionMismatch(expected, x.len()));
        }
        expand_reals_in_place(x, self.rows * self.cols);
        let data = as_complex_mut(x);
        self.complex_col_pass(data, FftDirection::Inverse)?;
        self.complex_row_pass(data, FftDirection::Inverse)?;
        if scale {
            let factor = 1.0 / (self.rows * self.cols) as f64;
            for v in data.iter_mut() {
                *v = *v * factor;
            }
        }
        Ok(())
    }

    fn complex_row_pass(
        &self,
        data: &mut [Complex<f64>],
        direction: FftDirection,
    ) -> Result<(), FftError> {
        let parts = self.fan_out().min(self.rows);
        if parts <= 1 {
            for row in data.chunks_exact_mut(self.cols) {
                self.row_plan.execute_complex(row, direction)?;
            }
            return Ok(());
        }
        let ranges = chunk_ranges(self.rows, parts);
        let raw = RawParts::new(data);
        self.pool.broadcast(parts, |part| {
            let chunk = unsafe { raw.slice() };
            for r in ranges[part].clone() {
                let row = &mut chunk[r * self.cols..(r + 1) * self.cols];
                _ = self.row_plan.execute_complex(row, direction);
            }
        })
    }

    fn complex_col_pass(
        &self,
        data: &mut [Complex<f64>],
        direction: FftDirection,
    ) -> Result<(), FftError> {
        let rows = self.rows;
        let cols = self.cols;
        let parts = self.fan_out().min(cols);
        if parts <= 1 {
            let mut scratch = try_vec![Complex::zero(); rows];
            for c in 0..cols {
                for r in 0..rows {
                    scratch[r] = data[r * cols + c];
                }
                self.col_plan.execute_complex(&mut scratch, direction)?;
                for r in 0..rows {
                    data[r * cols + c] = scratch[r];
                }
            }
            return Ok(());
        }
        let ranges = chunk_ranges(cols, parts);
        let raw = RawParts::new(data);
        self.pool.broadcast(parts, |part| {
            let chunk = unsafe { raw.slice() };
            let mut scratch = vec![Complex::zero(); rows];
            for c in ranges[part].clone() {
                for r in 0..rows {
                    scratch[r] = chunk[r * cols + c];
                }
                _ = self.col_plan.execute_complex(&mut scratch, direction);
                for r in 0..rows {
                    chunk[r * cols + c] = scratch[r];
                }
            }
        })
    }

    fn real_row_pass(
        &self,
        data: &mut [f64],
        direction: FftDirection,
        scale: bool,
    ) -> Result<(), FftError> {
        let cols = self.cols;
        let parts = self.fan_out().min(self.rows);
        if parts <= 1 {
            for row in data.chunks_exact_mut(cols) {
                match direction {
                    FftDirection::Forward => self.row_plan.real_forward(row)?,
                    FftDirection::Inverse => self.row_plan.real_inverse(row, scale)?,
                }
            }
            return Ok(());
        }
        let ranges = chunk_ranges(self.rows, parts);
        let raw = RawRealParts::new(data);
        self.pool.broadcast(parts, |part| {
            let chunk = unsafe { raw.slice() };
            for r in ranges[part].clone() {
                let row = &mut chunk[r * cols..(r + 1) * cols];
                _ = match direction {
                    FftDirection::Forward => self.row_plan.real_forward(row),
                    FftDirection::Inverse => self.row_plan.real_inverse(row, scale),
                };
            }
        })
    }

    // Column transforms over the independent complex frequency columns of
    // the packed grid, i.e. physical column pairs (2c, 2c+1) for
    // c in 1..cols/2. Physical columns 0 and 1 hold the packed real columns
    // and are handled by the edge pass.
    fn packed_complex_col_pass(
        &self,
        data: &mut [f64],
        direction: FftDirection,
        scale_by_rows: bool,
    ) -> Result<(), FftError> {
        let rows = self.rows;
        let cols = self.cols;
        let half_cols = cols / 2;
        if half_cols <= 1 {
            return Ok(());
        }
        let factor = 1.0 / rows as f64;
        let columns = half_cols - 1;
        let parts = self.fan_out().min(columns);
        if parts <= 1 {
            let mut scratch = try_vec![Complex::zero(); rows];
            for c in 1..half_cols {
                for r in 0..rows {
                    scratch[r] = Complex::new(data[r * cols + 2 * c], data[r * cols + 2 * c + 1]);
                }
                self.col_plan.execute_complex(&mut scratch, direction)?;
                if scale_by_rows {
                    for v in scratch.iter_mut() {
                        *v = *v * factor;
                    }
                }
                for r in 0..rows {
                    data[r * cols + 2 * c] = scratch[r].re;
                    data[r * cols + 2 * c + 1] = scratch[r].im;
                }
            }
            return Ok(());
        }
        let ranges = chunk_ranges(columns, parts);
        let raw = RawRealParts::new(data);
        self.pool.broadcast(parts, |part| {
            let chunk = unsafe { raw.slice() };
            let mut scratch = vec![Complex::zero(); rows];
            for offset in ranges[part].clone() {
                let c = offset + 1;
                for r in 0..rows {
                    scratch[r] =
                        Complex::new(chunk[r * cols + 2 * c], chunk[r * cols + 2 * c + 1]);
                }
                _ = self.col_plan.execute_complex(&mut scratch, direction);
                if scale_by_rows {
                    for v in scratch.iter_mut() {
                        *v = *v * factor;
                    }
                }
                for r in 0..rows {
                    chunk[r * cols + 2 * c] = scratch[r].re;
                    chunk[r * cols + 2 * c + 1] = scratch[r].im;
                }
            }
        })
    }

    // After the forward row pass, physical columns 0 and 1 carry the real
    // sequences Re X_row[0] and Re X_row[cols/2]. Their length-`rows` real
    // transforms land in the grid corners and the DC/Nyquist column cells of
    // the packed layout.
    fn packed_edge_col_pass_forward(&self, data: &mut [f64]) -> Result<(), FftError> {
        let rows = self.rows;
        let cols = self.cols;
        let half_rows = rows / 2;

        let mut c0 = try_vec![0.0f64; rows];
        let mut c1 = try_vec![0.0f64; rows];
        for r in 0..rows {
            c0[r] = data[r * cols];
            c1[r] = data[r * cols + 1];
        }
        self.col_plan.real_forward(&mut c0)?;
        self.col_plan.real_forward(&mut c1)?;

        data[0] = c0[0];
        data[half_rows * cols] = c0[1];
        for r in 1..half_rows {
            data[r * cols] = c0[2 * r];
            data[r * cols + 1] = c0[2 * r + 1];
        }
        data[1] = c1[0];
        data[half_rows * cols + 1] = c1[1];
        for r in 1..half_rows {
            data[(rows - r) * cols] = c1[2 * r];
            data[(rows - r) * cols + 1] = c1[2 * r + 1];
        }
        Ok(())
    }

    fn packed_edge_col_pass_inverse(&self, data: &mut [f64], scale: bool) -> Result<(), FftError> {
        let rows = self.rows;
        let cols = self.cols;
        let half_rows = rows / 2;

        let mut c0 = try_vec![0.0f64; rows];
        let mut c1 = try_vec![0.0f64; rows];
        c0[0] = data[0];
        c0[1] = data[half_rows * cols];
        for r in 1..half_rows {
            c0[2 * r] = data[r * cols];
            c0[2 * r + 1] = data[r * cols + 1];
        }
        c1[0] = data[1];
        c1[1] = data[half_rows * cols + 1];
        for r in 1..half_rows {
            c1[2 * r] = data[(rows - r) * cols];
            c1[2 * r + 1] = data[(rows - r) * cols + 1];
        }
        self.col_plan.real_inverse(&mut c0, scale)?;
        self.col_plan.real_inverse(&mut c1, scale)?;
        for r in 0..rows {
            data[r * cols] = c0[r];
            data[r * cols + 1] = c1[r];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::Dft;
    use rand::Rng;

    fn random_reals(n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| rand::rng().random_range(-1.0..1.0))
            .collect()
    }

    // Reference 2-D transform: naive DFT along every row, then along every
    // column.
    fn naive_2d(data: &mut [Complex<f64>], rows: usize, cols: usize, direction: FftDirection) {
        let row_dft = Dft::new(cols, direction);
        for row in data.chunks_exact_mut(cols) {
            row_dft.execute(row);
        }
        let col_dft = Dft::new(rows, direction);
        let mut scratch = vec![Complex::new(0.0, 0.0); rows];
        for c in 0..cols {
            for r in 0..rows {
                scratch[r] = data[r * cols + c];
            }
            col_dft.execute(&mut scratch);
            for r in 0..rows {
                data[r * cols + c] = scratch[r];
            }
        }
    }

    #[test]
    fn test_complex_forward_matches_naive() {
        for (rows, cols) in [(2usize, 2usize), (4, 4), (4, 6), (3, 5), (8, 10), (7, 16)] {
            let fft = Fft2D::new(rows, cols).unwrap();
            let src = random_reals(2 * rows * cols);

            let mut actual = src.clone();
            fft.complex_forward(&mut actual).unwrap();

            let mut expected: Vec<Complex<f64>> = src
                .chunks_exact(2)
                .map(|p| Complex::new(p[0], p[1]))
                .collect();
            naive_2d(&mut expected, rows, cols, FftDirection::Forward);

            for (pair, e) in actual.chunks_exact(2).zip(expected.iter()) {
                assert!(
                    (pair[0] - e.re).abs() < 1e-9 && (pair[1] - e.im).abs() < 1e-9,
                    "{rows}x{cols} mismatch"
                );
            }
        }
    }

    #[test]
    fn test_complex_round_trip() {
        for (rows, cols) in [(4usize, 4usize), (8, 6), (5, 9), (16, 16)] {
            let fft = Fft2D::new(rows, cols).unwrap();
            let src = random_reals(2 * rows * cols);

            let mut data = src.clone();
            fft.complex_forward(&mut data).unwrap();
            fft.complex_inverse(&mut data, true).unwrap();
            for (a, b) in data.iter().zip(src.iter()) {
                assert!((a - b).abs() < 1e-10);
            }

            let mut unscaled = src.clone();
            fft.complex_forward(&mut unscaled).unwrap();
            fft.complex_inverse(&mut unscaled, false).unwrap();
            let n = (rows * cols) as f64;
            for (a, b) in unscaled.iter().zip(src.iter()) {
                assert!((a - b * n).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_real_forward_all_ones_dc_only() {
        let fft = Fft2D::new(4, 4).unwrap();
        let mut data = vec![1.0f64; 16];
        fft.real_forward(&mut data).unwrap();
        assert!((data[0] - 16.0).abs() < 1e-12);
        for v in data.iter().skip(1) {
            assert!(v.abs() < 1e-12, "{data:?}");
        }
    }

    #[test]
    fn test_real_round_trip() {
        for (rows, cols) in [
            (2usize, 2usize),
            (2, 4),
            (4, 2),
            (4, 4),
            (4, 8),
            (6, 10),
            (8, 6),
            (16, 16),
            (10, 12),
        ] {
            let fft = Fft2D::new(rows, cols).unwrap();
            let src = random_reals(rows * cols);

            let mut data = src.clone();
            fft.real_forward(&mut data).unwrap();
            fft.real_inverse(&mut data, true).unwrap();
            for (i, (a, b)) in data.iter().zip(src.iter()).enumerate() {
                assert!(
                    (a - b).abs() < 1e-10,
                    "{rows}x{cols} diverged at {i}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn test_real_forward_odd_dimensions_rejected() {
        let fft = Fft2D::new(3, 4).unwrap();
        let mut data = vec![0.0f64; 12];
        assert_eq!(
            fft.real_forward(&mut data),
            Err(FftError::InvalidLength(3))
        );
        let fft = Fft2D::new(4, 5).unwrap();
        let mut data = vec![0.0f64; 20];
        assert_eq!(
            fft.real_inverse(&mut data, true),
            Err(FftError::InvalidLength(5))
        );
    }

    #[test]
    fn test_real_forward_full_matches_complex() {
        for (rows, cols) in [(2usize, 3usize), (3, 3), (4, 6), (5, 8)] {
            let fft = Fft2D::new(rows, cols).unwrap();
            let reals = random_reals(rows * cols);

            let mut expected = vec![0.0f64; 2 * rows * cols];
            for (i, &v) in reals.iter().enumerate() {
                expected[2 * i] = v;
            }
            fft.complex_forward(&mut expected).unwrap();

            let mut actual = vec![0.0f64; 2 * rows * cols];
            actual[..rows * cols].copy_from_slice(&reals);
            fft.real_forward_full(&mut actual).unwrap();

            for (a, b) in actual.iter().zip(expected.iter()) {
                assert!((a - b).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_real_inverse_full_round_trip() {
        let (rows, cols) = (3usize, 5usize);
        let fft = Fft2D::new(rows, cols).unwrap();
        let reals = random_reals(rows * cols);

        let mut expected = vec![0.0f64; 2 * rows * cols];
        for (i, &v) in reals.iter().enumerate() {
            expected[2 * i] = v;
        }
        fft.complex_inverse(&mut expected, true).unwrap();

        let mut actual = vec![0.0f64; 2 * rows * cols];
        actual[..rows * cols].copy_from_slice(&reals);
        fft.real_inverse_full(&mut actual, true).unwrap();

        for (a, b) in actual.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let (rows, cols) = (32usize, 24usize);
        let src = random_reals(2 * rows * cols);

        let mut serial = src.clone();
        Fft2D::new(rows, cols)
            .unwrap()
            .complex_forward(&mut serial)
            .unwrap();

        let config = Arc::new(Concurrency::new());
        config.set_threads_begin_2d(16);
        let pool = Arc::new(WorkerPool::new(4));
        for workers in [1usize, 2, 4] {
            config.set_worker_count(workers);
            let fft = Fft2D::with_tuning(rows, cols, config.clone(), pool.clone()).unwrap();
            let mut data = src.clone();
            fft.complex_forward(&mut data).unwrap();
            assert_eq!(data, serial, "parallel 2-D diverged with {workers} workers");
        }
    }

    #[test]
    fn test_parallel_real_round_trip() {
        let (rows, cols) = (16usize, 20usize);
        let config = Arc::new(Concurrency::new());
        config.set_threads_begin_2d(64);
        config.set_worker_count(4);
        let pool = Arc::new(WorkerPool::new(4));
        let fft = Fft2D::with_tuning(rows, cols, config, pool).unwrap();

        let src = random_reals(rows * cols);
        let mut data = src.clone();
        fft.real_forward(&mut data).unwrap();
        fft.real_inverse(&mut data, true).unwrap();
        for (a, b) in data.iter().zip(src.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }
}
