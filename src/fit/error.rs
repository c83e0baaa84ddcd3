// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all fit-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitError {
    #[error("The decimation factor must be at least 1")]
    BadDecimation,

    #[error("No parameters were selected for fitting")]
    NoParams,

    #[error("No visibility datasets were given")]
    NoDatasets,

    #[error("Dataset {dataset} has {got} channels, but the array has {expected}")]
    ChannelMismatch {
        dataset: usize,
        got: usize,
        expected: usize,
    },

    #[error("No antennas matched the antenna selection {0:?}")]
    NoAntennas(Vec<usize>),

    #[error("The selected baselines, channels and timestamps leave no samples to score")]
    NoSamples,

    #[error("The starting parameters fit the data perfectly (score 0); there is nothing to normalise the score by")]
    ZeroBaseScore,

    #[error(transparent)]
    Param(#[from] crate::params::ParamError),

    #[error(transparent)]
    Array(#[from] crate::array::ArrayError),

    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),

    #[error(transparent)]
    VisRead(#[from] crate::vis::VisReadError),
}
