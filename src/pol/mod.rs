// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Feeds, polarisation products and their integer metadata codes.
//!
//! Visibility containers label their polarisation with the MIRIAD integer
//! codes (e.g. -5 for XX). Unknown labels are an input-validation problem: they
//! are reported and skipped, and the caller carries on.

#[cfg(test)]
mod tests;

use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A single antenna feed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
}

/// The polarisation a single antenna's beam is evaluated for. The Stokes
/// variants combine the responses of the X and Y feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum BeamPol {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
    I,
    Q,
    U,
    V,
}

impl From<Feed> for BeamPol {
    fn from(f: Feed) -> BeamPol {
        match f {
            Feed::X => BeamPol::X,
            Feed::Y => BeamPol::Y,
        }
    }
}

/// A polarisation product of a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
pub enum Pol {
    #[strum(serialize = "xx")]
    #[serde(rename = "xx")]
    XX,
    #[strum(serialize = "yy")]
    #[serde(rename = "yy")]
    YY,
    #[strum(serialize = "xy")]
    #[serde(rename = "xy")]
    XY,
    #[strum(serialize = "yx")]
    #[serde(rename = "yx")]
    YX,
    I,
    Q,
    U,
    V,
}

impl Pol {
    /// The feeds of the first and second antenna of a baseline, if this is a
    /// feed product rather than a Stokes parameter.
    pub fn feeds(self) -> Option<(Feed, Feed)> {
        match self {
            Pol::XX => Some((Feed::X, Feed::X)),
            Pol::YY => Some((Feed::Y, Feed::Y)),
            Pol::XY => Some((Feed::X, Feed::Y)),
            Pol::YX => Some((Feed::Y, Feed::X)),
            Pol::I | Pol::Q | Pol::U | Pol::V => None,
        }
    }

    /// Is this a product of like feeds (XX or YY)?
    pub fn is_co_pol(self) -> bool {
        matches!(self, Pol::XX | Pol::YY)
    }

    /// The MIRIAD-style integer code for this polarisation.
    pub fn code(self) -> i32 {
        match self {
            Pol::I => 1,
            Pol::Q => 2,
            Pol::U => 3,
            Pol::V => 4,
            Pol::XX => -5,
            Pol::YY => -6,
            Pol::XY => -7,
            Pol::YX => -8,
        }
    }

    pub fn from_code(code: i32) -> Option<Pol> {
        match code {
            1 => Some(Pol::I),
            2 => Some(Pol::Q),
            3 => Some(Pol::U),
            4 => Some(Pol::V),
            -5 => Some(Pol::XX),
            -6 => Some(Pol::YY),
            -7 => Some(Pol::XY),
            -8 => Some(Pol::YX),
            _ => None,
        }
    }
}

/// Read a polarisation from integer metadata. An unrecognised code is
/// reported and `None` is returned; the caller should skip whatever needed the
/// polarisation.
pub fn read_pol(code: i32) -> Option<Pol> {
    let pol = Pol::from_code(code);
    if pol.is_none() {
        warn!("{code} is not a reasonable polarisation code; skipping");
    }
    pol
}

/// Get the integer code to write for a polarisation label. An unrecognised
/// label is reported and `None` is returned, meaning nothing should be
/// written.
pub fn write_pol(label: &str) -> Option<i32> {
    match Pol::from_str(label) {
        Ok(p) => Some(p.code()),
        Err(_) => {
            warn!("{label} is not a reasonable polarisation value!");
            None
        }
    }
}
