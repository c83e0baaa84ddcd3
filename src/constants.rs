// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Frequencies are in \[Hz\] and
positions in \[metres\] unless otherwise stated.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

pub use marlu::constants::VEL_C;

/// The reference frequency used for ionospheric refraction when a source
/// doesn't specify one \[Hz\].
pub const DEFAULT_REFRACTION_FREQ_HZ: f64 = 150e6;

/// The spectral index given to sources that don't specify one.
pub const DEFAULT_SPEC_INDEX: f64 = -0.8;

/// The number of distinct timestamps between scored timestamps, if the user
/// doesn't specify otherwise. 1 means every timestamp is scored.
pub const DEFAULT_DECIMATION: usize = 1;

/// The maximum number of objective-function evaluations performed by the
/// simplex minimiser per fitted parameter.
pub const DEFAULT_MAX_EVALS_PER_PARAM: usize = 200;

/// The tolerance on parameter changes between simplex iterations.
pub const DEFAULT_XTOL: f64 = 1e-4;

/// The tolerance on score changes between simplex iterations.
pub const DEFAULT_FTOL: f64 = 1e-4;

/// Hz per GHz. Phase offsets are polynomials of frequency in GHz.
pub(crate) const HZ_PER_GHZ: f64 = 1e9;
