// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with fit parameters.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Got {got} parameter values, but the key list describes {expected}")]
    LengthMismatch { got: usize, expected: usize },

    #[error("'{unit}' doesn't have a parameter called '{name}'")]
    Unknown { unit: String, name: String },

    #[error("Parameter '{name}' of '{unit}' must be a single number")]
    NotScalar { unit: String, name: String },

    #[error("Parameter '{name}' of '{unit}' must have at least one value")]
    Empty { unit: String, name: String },

    #[error("Couldn't parse '{0}' as a source=parameter pair")]
    BadOtherParam(String),

    #[error("Parameter '{name}' of '{unit}': {err}")]
    Beam {
        unit: String,
        name: String,
        err: crate::beam::BeamError,
    },
}
