// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

/// Errors associated with source catalogs.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Source '{0}' isn't in the catalog")]
    UnknownSource(String),

    #[error("Source '{name}': RA {ra}° is out of range (0° <= RA < 360°)")]
    InvalidRa { name: String, ra: f64 },

    #[error("Source '{name}': Dec {dec}° is out of range (-90° <= Dec <= 90°)")]
    InvalidDec { name: String, dec: f64 },

    #[error("Source '{name}': the reference frequency must be positive, got {mfreq} Hz")]
    InvalidRefFreq { name: String, mfreq: f64 },

    #[error("The catalog's source positions haven't been computed for the current time")]
    NotComputed,

    #[error("Catalog file '{0}' doesn't have a recognised extension (yaml, yml, json, toml)")]
    UnknownFileType(PathBuf),

    #[error(transparent)]
    Param(#[from] crate::params::ParamError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
