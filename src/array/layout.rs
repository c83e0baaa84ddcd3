// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Array layout files. These describe where the antennas are, which feeds
//! they have, their beams and their starting parameters.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use log::debug;
use marlu::ENH;
use serde::{Deserialize, Serialize};

use super::{AntennaArray, ArrayError};
use crate::{
    antenna::Antenna,
    beam::{create_beam_object, BeamConfig},
    params::UnitParams,
    pol::Feed,
};

pub const LAYOUT_FILE_TYPES_COMMA_SEPARATED: &str = "yaml, yml, json, toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLayout {
    /// The longitude of the array \[degrees\].
    pub longitude_deg: f64,

    /// The latitude of the array \[degrees\].
    pub latitude_deg: f64,

    /// The beam used by antennas that don't specify their own.
    #[serde(default)]
    pub beam: BeamConfig,

    pub antennas: Vec<AntennaLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntennaLayout {
    pub number: usize,

    /// The feeds of this antenna. If there are none, the antenna has no
    /// polarisation information.
    #[serde(default)]
    pub feeds: Vec<Feed>,

    /// East, north and up position relative to the array centre \[metres\].
    pub position: [f64; 3],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beam: Option<BeamConfig>,

    /// Starting parameters applied to every feed of this antenna.
    #[serde(default, skip_serializing_if = "UnitParams::is_empty")]
    pub params: UnitParams,
}

impl ArrayLayout {
    /// Create the array described by this layout, with channels at `freqs_hz`.
    pub fn build(&self, freqs_hz: Vec<f64>) -> Result<AntennaArray, ArrayError> {
        let latitude_rad = self.latitude_deg.to_radians();
        let mut antennas = vec![];
        for ant in &self.antennas {
            let beam = create_beam_object(ant.beam.unwrap_or(self.beam))?;
            let [e, n, h] = ant.position;
            let position = ENH { e, n, h }.to_xyz(latitude_rad);
            let feeds: Vec<Option<Feed>> = if ant.feeds.is_empty() {
                vec![None]
            } else {
                ant.feeds.iter().copied().map(Some).collect()
            };
            for feed in feeds {
                let mut antenna = Antenna::new(ant.number, feed, position, beam.clone());
                antenna.set_params(&ant.params)?;
                antennas.push(antenna);
            }
        }

        AntennaArray::new(
            antennas,
            self.longitude_deg.to_radians(),
            latitude_rad,
            freqs_hz,
        )
    }
}

/// Read an [`ArrayLayout`] from a yaml, json or toml file. The file type is
/// determined by the extension.
pub fn read_layout<P: AsRef<Path>>(path: P) -> Result<ArrayLayout, ArrayError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    let mut buf = BufReader::new(File::open(path)?);
    let layout: ArrayLayout = match ext.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_reader(&mut buf)?,
        Some("json") => serde_json::from_reader(&mut buf)?,
        Some("toml") => {
            let mut s = String::new();
            buf.read_to_string(&mut s)?;
            toml::from_str(&s)?
        }
        _ => return Err(ArrayError::UnknownFileType(path.to_path_buf())),
    };
    debug!(
        "Read a layout of {} antennas from {}",
        layout.antennas.len(),
        path.display()
    );
    Ok(layout)
}
