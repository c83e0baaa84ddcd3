// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam calculations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Beam widths must be finite and non-zero, but got {0}")]
    BadWidth(f64),

    #[error("The {beam} beam doesn't have a parameter called '{name}'")]
    UnknownParam { beam: &'static str, name: String },
}
