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
use crate::{FftDirection, FftExecutor};
use num_complex::Complex;

/// Multiplies by `-i` (forward) or `i` (inverse): the fourth root of unity
/// every radix-4 butterfly needs.
#[inline(always)]
pub(crate) fn rotate_90(value: Complex<f64>, direction: FftDirection) -> Complex<f64> {
    match direction {
        FftDirection::Forward => Complex {
            re: value.im,
            im: -value.re,
        },
        FftDirection::Inverse => Complex {
            re: -value.im,
            im: value.re,
        },
    }
}

#[inline(always)]
pub(crate) fn butterfly2(a: Complex<f64>, b: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
    (a + b, a - b)
}

/// Radix-3 kernel. `tw` is `w(3)^1` for the transform direction.
#[inline(always)]
pub(crate) fn butterfly3(
    u0: Complex<f64>,
    u1: Complex<f64>,
    u2: Complex<f64>,
    tw: Complex<f64>,
) -> (Complex<f64>, Complex<f64>, Complex<f64>) {
    let xp = u1 + u2;
    let xn = u1 - u2;
    let sum = u0 + xp;

    let w_1 = Complex {
        re: tw.re * xp.re + u0.re,
        im: tw.re * xp.im + u0.im,
    };

    let y1 = Complex {
        re: w_1.re - tw.im * xn.im,
        im: w_1.im + tw.im * xn.re,
    };
    let y2 = Complex {
        re: w_1.re + tw.im * xn.im,
        im: w_1.im - tw.im * xn.re,
    };
    (sum, y1, y2)
}

#[inline(always)]
pub(crate) fn butterfly4(
    a: Complex<f64>,
    b: Complex<f64>,
    c: Complex<f64>,
    d: Complex<f64>,
    direction: FftDirection,
) -> (Complex<f64>, Complex<f64>, Complex<f64>, Complex<f64>) {
    let t0 = a + c;
    let t1 = a - c;
    let t2 = b + d;
    let t3 = rotate_90(b - d, direction);
    (t0 + t2, t1 + t3, t0 - t2, t1 - t3)
}

/// Radix-5 kernel. `tw1`/`tw2` are `w(5)^1` and `w(5)^2` for the transform
/// direction; the conjugate roots fall out of the +/- symmetry below.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub(crate) fn butterfly5(
    u0: Complex<f64>,
    u1: Complex<f64>,
    u2: Complex<f64>,
    u3: Complex<f64>,
    u4: Complex<f64>,
    tw1: Complex<f64>,
    tw2: Complex<f64>,
) -> (
    Complex<f64>,
    Complex<f64>,
    Complex<f64>,
    Complex<f64>,
    Complex<f64>,
) {
    let x14p = u1 + u4;
    let x14n = u1 - u4;
    let x23p = u2 + u3;
    let x23n = u2 - u3;
    let y0 = u0 + x14p + x23p;

    let b14re_a = u0.re + tw1.re * x14p.re + tw2.re * x23p.re;
    let b14re_b = tw1.im * x14n.im + tw2.im * x23n.im;
    let b23re_a = u0.re + tw2.re * x14p.re + tw1.re * x23p.re;
    let b23re_b = tw2.im * x14n.im - tw1.im * x23n.im;

    let b14im_a = u0.im + tw1.re * x14p.im + tw2.re * x23p.im;
    let b14im_b = tw1.im * x14n.re + tw2.im * x23n.re;
    let b23im_a = u0.im + tw2.re * x14p.im + tw1.re * x23p.im;
    let b23im_b = tw2.im * x14n.re - tw1.im * x23n.re;

    let y1 = Complex {
        re: b14re_a - b14re_b,
        im: b14im_a + b14im_b,
    };
    let y2 = Complex {
        re: b23re_a - b23re_b,
        im: b23im_a + b23im_b,
    };
    let y3 = Complex {
        re: b23re_a + b23re_b,
        im: b23im_a - b23im_b,
    };
    let y4 = Complex {
        re: b14re_a + b14re_b,
        im: b14im_a - b14im_b,
    };
    (y0, y1, y2, y3, y4)
}

/// Length-1 transform: the identity.
pub(crate) struct Butterfly1 {
    direction: FftDirection,
}

impl Butterfly1 {
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly1 { direction }
    }
}

impl FftExecutor for Butterfly1 {
    fn execute(&self, in_place: &mut [Complex<f64>]) -> Result<(), FftError> {
        if in_place.len() != 1 {
            return Err(FftError::DimensionMismatch(1, in_place.len()));
        }
        Ok(())
    }

    fn direction(&self) -> FftDirection {
        self.direction
    }

    fn length(&self) -> usize {
        1
    }
}

pub(crate) struct Butterfly2 {
    direction: FftDirection,
}

impl Butterfly2 {
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly2 { direction }
    }
}

impl FftExecutor for Butterfly2 {
    fn execute(&self, in_place: &mut [Complex<f64>]) -> Result<(), FftError> {
        if in_place.len() != 2 {
            return Err(FftError::DimensionMismatch(2, in_place.len()));
        }
        let (y0, y1) = butterfly2(in_place[0], in_place[1]);
        in_place[0] = y0;
        in_place[1] = y1;
        Ok(())
    }

    fn direction(&self) -> FftDirection {
        self.direction
    }

    fn length(&self) -> usize {
        2
    }
}
