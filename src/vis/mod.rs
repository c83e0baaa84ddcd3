// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract the visibilities being calibrated.
//!
//! The fitter doesn't care where visibilities come from; anything that
//! implements [`VisSource`] will do. [`MemoryVis`] keeps everything in memory
//! and can be dumped to (and read from) json.

mod error;
mod memory;
mod selection;

pub use error::VisReadError;
pub use memory::MemoryVis;
pub use selection::{BaselineSelection, ChannelSelection, ChannelSpan};

use hifitime::Epoch;
use marlu::UVW;
use serde::{Deserialize, Serialize};

use crate::{
    c64,
    pol::{read_pol, Pol},
};

/// Metadata describing a set of visibilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisMeta {
    pub num_chans: usize,

    /// The centre frequency of the first channel \[Hz\].
    pub start_freq_hz: f64,

    /// \[Hz\]
    pub chan_width_hz: f64,

    pub num_ants: usize,

    /// The MIRIAD-style polarisation code of all visibilities.
    pub pol_code: i32,
}

impl VisMeta {
    /// The centre frequency of every channel \[Hz\].
    pub fn freqs_hz(&self) -> Vec<f64> {
        (0..self.num_chans)
            .map(|i| self.start_freq_hz + i as f64 * self.chan_width_hz)
            .collect()
    }

    /// The polarisation of the visibilities. If the code isn't recognised,
    /// this is reported and `None` is returned.
    pub fn pol(&self) -> Option<Pol> {
        read_pol(self.pol_code)
    }
}

/// The visibilities of a single baseline at a single time.
#[derive(Debug, Clone, PartialEq)]
pub struct VisRecord {
    /// The baseline coordinates \[metres\].
    pub uvw: UVW,

    pub timestamp: Epoch,

    pub ant1: usize,

    pub ant2: usize,

    /// One value per channel.
    pub data: Vec<c64>,

    /// One value per channel; `true` means flagged.
    pub flags: Vec<bool>,
}

impl VisRecord {
    pub fn is_auto(&self) -> bool {
        self.ant1 == self.ant2
    }
}

/// A trait abstracting sources of visibilities.
pub trait VisSource {
    fn meta(&self) -> &VisMeta;

    /// Iterate over all visibility records of the selected baselines, in time
    /// order. Records with the same timestamp are adjacent.
    fn read<'a>(
        &'a self,
        selection: &'a BaselineSelection,
    ) -> Box<dyn Iterator<Item = Result<VisRecord, VisReadError>> + 'a>;
}
