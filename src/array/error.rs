// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::pol::{Feed, Pol};

/// Errors associated with antenna arrays and simulating their visibilities.
#[derive(Error, Debug)]
pub enum ArrayError {
    #[error("The simulation cache must be built for the current time before simulating visibilities")]
    CacheUninitialized,

    #[error("The simulation cache is stale; it was not built for the array's current time and channels")]
    StaleCache,

    #[error("Cannot simulate polarisation '{0}'; only xx, yy, xy and yx are supported")]
    UnsupportedPol(Pol),

    #[error("Antenna {0} isn't in the array")]
    UnknownAntenna(usize),

    #[error("There's no antenna labelled '{0}' in the array")]
    UnknownLabel(String),

    #[error("Antenna {number}{} appears more than once in the array", .feed.map(|f| f.to_string()).unwrap_or_default())]
    DuplicateAntenna { number: usize, feed: Option<Feed> },

    #[error("The array has no antennas")]
    NoAntennas,

    #[error("The array has no frequency channels")]
    NoChannels,

    #[error("No channels were selected")]
    NoActiveChannels,

    #[error("Channel {chan} was selected, but there are only {num_chans} channels")]
    BadChannel { chan: usize, num_chans: usize },

    #[error("Array layout file '{0}' doesn't have a recognised extension (yaml, yml, json, toml)")]
    UnknownFileType(PathBuf),

    #[error(transparent)]
    Beam(#[from] crate::beam::BeamError),

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
