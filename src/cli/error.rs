// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all polcal-related errors. This should be the *only* error
//! enum that is publicly visible from the binary's point of view.

use thiserror::Error;

use super::{common::ModelArgsError, fit::FitArgsError, simulate::SimulateArgsError};
use crate::{
    array::ArrayError, beam::BeamError, catalog::CatalogError, fit::FitError,
    params::ParamError, vis::VisReadError,
};

#[derive(Error, Debug)]
pub enum PolcalError {
    /// An error related to fitting.
    #[error("{0}")]
    Fit(String),

    /// An error related to simulating.
    #[error("{0}")]
    Simulate(String),

    /// An error related to array layouts or the array model.
    #[error("{0}\n\nCheck the array layout file.")]
    Array(String),

    /// An error related to source catalogs.
    #[error("{0}\n\nCheck the source catalog file.")]
    Catalog(String),

    /// An error related to fit parameters.
    #[error("{0}")]
    Param(String),

    /// An error related to beam code.
    #[error("{0}")]
    Beam(String),

    /// An error related to reading or writing visibilities.
    #[error("{0}")]
    Vis(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<FitArgsError> for PolcalError {
    fn from(e: FitArgsError) -> Self {
        Self::Fit(e.to_string())
    }
}

impl From<SimulateArgsError> for PolcalError {
    fn from(e: SimulateArgsError) -> Self {
        Self::Simulate(e.to_string())
    }
}

impl From<ModelArgsError> for PolcalError {
    fn from(e: ModelArgsError) -> Self {
        let s = e.to_string();
        match e {
            ModelArgsError::NoLayout => Self::Array(s),
            ModelArgsError::NoCatalog | ModelArgsError::NoSources => Self::Catalog(s),
        }
    }
}

impl From<FitError> for PolcalError {
    fn from(e: FitError) -> Self {
        let s = e.to_string();
        match e {
            FitError::Param(e) => Self::from(e),
            FitError::Array(e) => Self::from(e),
            FitError::Catalog(e) => Self::from(e),
            FitError::VisRead(e) => Self::from(e),
            FitError::BadDecimation
            | FitError::NoParams
            | FitError::NoDatasets
            | FitError::ChannelMismatch { .. }
            | FitError::NoAntennas(_)
            | FitError::NoSamples
            | FitError::ZeroBaseScore => Self::Fit(s),
        }
    }
}

impl From<ArrayError> for PolcalError {
    fn from(e: ArrayError) -> Self {
        let s = e.to_string();
        match e {
            ArrayError::Beam(e) => Self::from(e),
            ArrayError::Param(e) => Self::from(e),
            ArrayError::IO(e) => Self::from(e),
            _ => Self::Array(s),
        }
    }
}

impl From<CatalogError> for PolcalError {
    fn from(e: CatalogError) -> Self {
        let s = e.to_string();
        match e {
            CatalogError::Param(e) => Self::from(e),
            CatalogError::IO(e) => Self::from(e),
            _ => Self::Catalog(s),
        }
    }
}

impl From<ParamError> for PolcalError {
    fn from(e: ParamError) -> Self {
        Self::Param(e.to_string())
    }
}

impl From<BeamError> for PolcalError {
    fn from(e: BeamError) -> Self {
        Self::Beam(e.to_string())
    }
}

impl From<VisReadError> for PolcalError {
    fn from(e: VisReadError) -> Self {
        let s = e.to_string();
        match e {
            VisReadError::IO(e) => Self::from(e),
            _ => Self::Vis(s),
        }
    }
}

impl From<std::io::Error> for PolcalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
