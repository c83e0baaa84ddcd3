// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use scilib::math::bessel;

use crate::{c64, constants::TAU};

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// The visibility attenuation of a uniformly-bright elliptical disc, `2 J1(x) /
/// x`. `u` and `v` are in wavelengths; `a1` and `a2` are the angular radii
/// \[radians\] along the axes rotated by `th` \[radians\].
pub(crate) fn disc_attenuation(u: f64, v: f64, a1: f64, a2: f64, th: f64) -> f64 {
    let (s_th, c_th) = th.sin_cos();
    let ru = a1 * (u * c_th - v * s_th);
    let rv = a2 * (u * s_th + v * c_th);
    let x = TAU * (ru * ru + rv * rv).sqrt();
    if x == 0.0 {
        1.0
    } else {
        2.0 * bessel::j_n(1, x) / x
    }
}

/// Linearly interpolate evenly-spaced `knots` onto `num_points` evenly-spaced
/// points spanning the same range. A single knot is a constant.
pub(crate) fn interp_knots(knots: &[f64], num_points: usize) -> Vec<f64> {
    match (knots.len(), num_points) {
        (_, 0) => vec![],
        (0, n) => vec![0.0; n],
        (1, n) => vec![knots[0]; n],
        (_, 1) => vec![knots[0]],
        (num_knots, n) => {
            let scale = (num_knots - 1) as f64 / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let pos = i as f64 * scale;
                    let lower = (pos.floor() as usize).min(num_knots - 2);
                    let frac = pos - lower as f64;
                    // Landing exactly on a knot returns that knot untouched.
                    if frac == 0.0 {
                        knots[lower]
                    } else if frac == 1.0 {
                        knots[lower + 1]
                    } else {
                        knots[lower] * (1.0 - frac) + knots[lower + 1] * frac
                    }
                })
                .collect()
        }
    }
}
