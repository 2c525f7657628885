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
use num_complex::Complex;
use std::ops::Range;

/// Reinterprets an interleaved buffer as complex values. `Complex<f64>` is
/// `repr(C)` with `re` first, matching the `[re, im]` pair layout exactly;
/// the length must be even.
#[inline]
pub(crate) fn as_complex_mut(buf: &mut [f64]) -> &mut [Complex<f64>] {
    debug_assert!(buf.len() & 1 == 0);
    unsafe {
        std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut Complex<f64>, buf.len() / 2)
    }
}

/// Shared view of a buffer handed to pool workers during a decomposition
/// pass. Each worker reconstructs the full slice and touches only its own
/// index range; the pass structure guarantees the ranges are disjoint.
#[derive(Clone, Copy)]
pub(crate) struct RawParts {
    ptr: *mut Complex<f64>,
    len: usize,
}

unsafe impl Send for RawParts {}
unsafe impl Sync for RawParts {}

impl RawParts {
    pub(crate) fn new(slice: &mut [Complex<f64>]) -> RawParts {
        RawParts {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    /// # Safety
    /// Concurrent holders must write to disjoint index ranges, and the
    /// borrow this was created from must outlive every use.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slice(&self) -> &mut [Complex<f64>] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

/// Same as [RawParts] for plain real buffers.
#[derive(Clone, Copy)]
pub(crate) struct RawRealParts {
    ptr: *mut f64,
    len: usize,
}

unsafe impl Send for RawRealParts {}
unsafe impl Sync for RawRealParts {}

impl RawRealParts {
    pub(crate) fn new(slice: &mut [f64]) -> RawRealParts {
        RawRealParts {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    /// # Safety
    /// Same contract as [RawParts::slice].
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slice(&self) -> &mut [f64] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

/// Splits `0..total` into `parts` contiguous ranges whose lengths differ by
/// at most one. Trailing ranges may be empty when `total < parts`.
pub(crate) fn chunk_ranges(total: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let base = total / parts;
    let remainder = total % parts;
    let mut start = 0usize;
    (0..parts)
        .map(|p| {
            let len = base + usize::from(p < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_complex_mut() {
        let mut buf = [1.0f64, 2.0, 3.0, 4.0];
        let z = as_complex_mut(&mut buf);
        assert_eq!(z.len(), 2);
        assert_eq!(z[0], Complex::new(1.0, 2.0));
        z[1] = Complex::new(-1.0, -2.0);
        assert_eq!(buf, [1.0, 2.0, -1.0, -2.0]);
    }

    #[test]
    fn test_chunk_ranges() {
        assert_eq!(chunk_ranges(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
        assert_eq!(chunk_ranges(4, 4), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(chunk_ranges(2, 4), vec![0..1, 1..2, 2..2, 2..2]);
        assert_eq!(chunk_ranges(7, 1), vec![0..7]);
        let total: usize = chunk_ranges(1023, 8).iter().map(|r| r.len()).sum();
        assert_eq!(total, 1023);
    }
}
