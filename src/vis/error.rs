// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors associated with reading visibilities.
#[derive(Error, Debug)]
pub enum VisReadError {
    #[error("Couldn't parse '{0}' as a baseline selection; expected 'all', 'auto', 'cross', '<ant1>_<ant2>,...' or '<ant1>,...'")]
    BadBaselineSelection(String),

    #[error("Couldn't parse '{0}' as a channel selection; expected 'all', '<chan1>,...' or '<chan1>_<chan2>'")]
    BadChannelSelection(String),

    #[error("Channel {chan} was selected, but there are only {num_chans} channels")]
    ChannelOutOfRange { chan: usize, num_chans: usize },

    #[error("The channel selection '{0}' doesn't select any channels")]
    NoChannels(String),

    #[error("A visibility record for baseline {ant1}-{ant2} has {got} {what}, but there are {expected} channels")]
    BadRecordLength {
        ant1: usize,
        ant2: usize,
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("The visibility metadata says there are no channels")]
    NoChannelsInData,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
