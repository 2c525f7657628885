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
use crate::err::FftError;

/// Where a logical spectrum coordinate lives in the packed buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Slot {
    /// A stored value, possibly negated (mirrored imaginary parts).
    Cell { index: usize, negate: bool },
    /// Structurally zero: the imaginary parts of the four purely real
    /// corner samples.
    Zero,
}

/// Address map between the packed output of [crate::Fft2D::real_forward]
/// and logical `(row, col)` coordinates of the full `rows x 2*cols` complex
/// spectrum.
///
/// The map is pure index algebra on `(row, col, rows, cols)`; it never
/// inspects buffer contents. Coordinates beyond the stored half spectrum
/// resolve through the conjugate symmetry
/// `X[r][c] = conj(X[(rows - r) % rows][cols - c])`.
pub struct PackedHermitian2D {
    rows: usize,
    cols: usize,
}

impl PackedHermitian2D {
    /// Both dimensions must be even and nonzero, matching what the packed
    /// real transform itself accepts.
    pub fn new(rows: usize, cols: usize) -> Result<PackedHermitian2D, FftError> {
        if rows == 0 || rows % 2 != 0 {
            return Err(FftError::InvalidLength(rows));
        }
        if cols == 0 || cols % 2 != 0 {
            return Err(FftError::InvalidLength(cols));
        }
        Ok(PackedHermitian2D { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn locate(&self, row: usize, col: usize) -> Result<Slot, FftError> {
        let rows = self.rows;
        let cols = self.cols;
        if row >= rows || col >= 2 * cols {
            return Err(FftError::InvalidPackedCoordinate(row, col));
        }
        let half_rows = rows / 2;
        let half_cols = cols / 2;
        let imag = col % 2 == 1;
        let c = col / 2;

        if c > half_cols {
            // Mirror into the stored half; lands strictly inside the
            // interior column range.
            let rm = if row == 0 { 0 } else { rows - row };
            let cm = cols - c;
            return Ok(Slot::Cell {
                index: rm * cols + 2 * cm + usize::from(imag),
                negate: imag,
            });
        }
        if c >= 1 && c < half_cols {
            return Ok(Slot::Cell {
                index: row * cols + 2 * c + usize::from(imag),
                negate: false,
            });
        }
        if c == 0 {
            // DC column: a length-`rows` real transform packed down the
            // first physical column.
            return Ok(if row == 0 {
                if imag {
                    Slot::Zero
                } else {
                    Slot::Cell {
                        index: 0,
                        negate: false,
                    }
                }
            } else if row == half_rows {
                if imag {
                    Slot::Zero
                } else {
                    Slot::Cell {
                        index: half_rows * cols,
                        negate: false,
                    }
                }
            } else if row < half_rows {
                Slot::Cell {
                    index: row * cols + usize::from(imag),
                    negate: false,
                }
            } else {
                Slot::Cell {
                    index: (rows - row) * cols + usize::from(imag),
                    negate: imag,
                }
            });
        }
        // Nyquist column, stored mirrored in the second physical column.
        Ok(if row == 0 {
            if imag {
                Slot::Zero
            } else {
                Slot::Cell {
                    index: 1,
                    negate: false,
                }
            }
        } else if row == half_rows {
            if imag {
                Slot::Zero
            } else {
                Slot::Cell {
                    index: half_rows * cols + 1,
                    negate: false,
                }
            }
        } else if row < half_rows {
            Slot::Cell {
                index: (rows - row) * cols + usize::from(imag),
                negate: false,
            }
        } else {
            Slot::Cell {
                index: row * cols + usize::from(imag),
                negate: imag,
            }
        })
    }

    /// Reads the value logically at `(row, col)` of the full complex
    /// spectrum out of the packed buffer.
    pub fn unpack(&self, row: usize, col: usize, buf: &[f64]) -> Result<f64, FftError> {
        if buf.len() != self.rows * self.cols {
            return Err(FftError::DimensionMismatch(self.rows * self.cols, buf.len()));
        }
        Ok(match self.locate(row, col)? {
            Slot::Cell { index, negate } => {
                if negate {
                    -buf[index]
                } else {
                    buf[index]
                }
            }
            Slot::Zero => 0.0,
        })
    }

    /// Writes `value` into the packed cell backing logical `(row, col)`.
    ///
    /// Structurally zero cells accept only `0.0`; any other value would
    /// break the Hermitian symmetry and is rejected.
    pub fn pack(
        &self,
        value: f64,
        row: usize,
        col: usize,
        buf: &mut [f64],
    ) -> Result<(), FftError> {
        if buf.len() != self.rows * self.cols {
            return Err(FftError::DimensionMismatch(self.rows * self.cols, buf.len()));
        }
        match self.locate(row, col)? {
            Slot::Cell { index, negate } => {
                buf[index] = if negate { -value } else { value };
                Ok(())
            }
            Slot::Zero => {
                if value == 0.0 {
                    Ok(())
                } else {
                    Err(FftError::InvalidPackedCoordinate(row, col))
                }
            }
        }
    }
}
