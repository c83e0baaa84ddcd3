// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Baseline and channel selections, parsed from user strings.

use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use vec1::Vec1;

use super::VisReadError;

/// Which baselines to use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BaselineSelection {
    /// Auto- and cross-correlations.
    All,

    /// Only auto-correlations.
    Auto,

    /// Only cross-correlations.
    #[default]
    Cross,

    /// Only these baselines. The order of the antennas doesn't matter.
    Pairs(Vec<(usize, usize)>),

    /// Only baselines involving any of these antennas.
    Antennas(Vec<usize>),
}

impl BaselineSelection {
    pub fn includes(&self, ant1: usize, ant2: usize) -> bool {
        match self {
            BaselineSelection::All => true,
            BaselineSelection::Auto => ant1 == ant2,
            BaselineSelection::Cross => ant1 != ant2,
            BaselineSelection::Pairs(pairs) => pairs
                .iter()
                .any(|&(i, j)| (i, j) == (ant1, ant2) || (j, i) == (ant1, ant2)),
            BaselineSelection::Antennas(ants) => ants.contains(&ant1) || ants.contains(&ant2),
        }
    }
}

impl FromStr for BaselineSelection {
    type Err = VisReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || VisReadError::BadBaselineSelection(s.to_string());
        let s = s.trim();
        match s {
            "all" => return Ok(BaselineSelection::All),
            "auto" => return Ok(BaselineSelection::Auto),
            "cross" => return Ok(BaselineSelection::Cross),
            "" => return Err(bad()),
            _ => (),
        }

        let items: Vec<&str> = s.split(',').map(|i| i.trim()).collect();
        if items.iter().all(|i| i.contains('_')) {
            let pairs = items
                .iter()
                .map(|i| {
                    let (a, b) = i.split_once('_').ok_or_else(bad)?;
                    Ok((
                        a.parse().map_err(|_| bad())?,
                        b.parse().map_err(|_| bad())?,
                    ))
                })
                .collect::<Result<_, VisReadError>>()?;
            Ok(BaselineSelection::Pairs(pairs))
        } else {
            let ants = items
                .iter()
                .map(|i| i.parse().map_err(|_| bad()))
                .collect::<Result<_, VisReadError>>()?;
            Ok(BaselineSelection::Antennas(ants))
        }
    }
}

impl Display for BaselineSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineSelection::All => write!(f, "all"),
            BaselineSelection::Auto => write!(f, "auto"),
            BaselineSelection::Cross => write!(f, "cross"),
            BaselineSelection::Pairs(pairs) => {
                write!(f, "{}", pairs.iter().map(|(i, j)| format!("{i}_{j}")).join(","))
            }
            BaselineSelection::Antennas(ants) => write!(f, "{}", ants.iter().join(",")),
        }
    }
}

/// Which channels to use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    #[default]
    All,

    /// Individual channels and half-open ranges of channels, in order.
    Chans(Vec<ChannelSpan>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSpan {
    Single(usize),

    /// From the first channel up to, but not including, the second.
    Range(usize, usize),
}

impl ChannelSelection {
    /// The selected channel indices, given the total number of channels.
    pub fn resolve(&self, num_chans: usize) -> Result<Vec1<usize>, VisReadError> {
        let chans: Vec<usize> = match self {
            ChannelSelection::All => (0..num_chans).collect(),
            ChannelSelection::Chans(spans) => spans
                .iter()
                .flat_map(|span| match *span {
                    ChannelSpan::Single(c) => c..c + 1,
                    ChannelSpan::Range(start, end) => start..end,
                })
                .collect(),
        };
        if let Some(&chan) = chans.iter().find(|&&c| c >= num_chans) {
            return Err(VisReadError::ChannelOutOfRange { chan, num_chans });
        }
        Vec1::try_from_vec(chans).map_err(|_| VisReadError::NoChannels(self.to_string()))
    }
}

impl FromStr for ChannelSelection {
    type Err = VisReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || VisReadError::BadChannelSelection(s.to_string());
        let s = s.trim();
        if s == "all" {
            return Ok(ChannelSelection::All);
        }
        if s.is_empty() {
            return Err(bad());
        }
        let spans = s
            .split(',')
            .map(|i| {
                let i = i.trim();
                match i.split_once('_') {
                    Some((a, b)) => Ok(ChannelSpan::Range(
                        a.parse().map_err(|_| bad())?,
                        b.parse().map_err(|_| bad())?,
                    )),
                    None => Ok(ChannelSpan::Single(i.parse().map_err(|_| bad())?)),
                }
            })
            .collect::<Result<_, VisReadError>>()?;
        Ok(ChannelSelection::Chans(spans))
    }
}

impl Display for ChannelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelSelection::All => write!(f, "all"),
            ChannelSelection::Chans(spans) => write!(
                f,
                "{}",
                spans
                    .iter()
                    .map(|span| match span {
                        ChannelSpan::Single(c) => c.to_string(),
                        ChannelSpan::Range(a, b) => format!("{a}_{b}"),
                    })
                    .join(",")
            ),
        }
    }
}
