// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An array of (possibly dual-polarisation) antennas, and the code to simulate
//! its visibilities.
//!
//! Antennas are addressed by their number; the polarisation of a request picks
//! the feed. Arrays without polarisation information have one [`Antenna`] per
//! number, and any feed request falls back to it.

mod cache;
mod error;
mod layout;

pub use cache::{SimCache, SimCacheData};
pub use error::ArrayError;
pub use layout::{
    read_layout, AntennaLayout, ArrayLayout, LAYOUT_FILE_TYPES_COMMA_SEPARATED,
};

use std::collections::HashMap;

use hifitime::{Duration, Epoch};
use log::debug;
use marlu::{precession::get_lmst, HADec};
use ndarray::prelude::*;

use crate::{
    antenna::Antenna,
    c64,
    catalog::{CatalogVecs, IonRef, RadioSource, SourceShape},
    constants::{DEFAULT_REFRACTION_FREQ_HZ, TAU, VEL_C},
    coord::{baseline_uvw, xyz_diff, TopoDir},
    math::{cexp, disc_attenuation},
    params::{ParamSelection, Params},
    pol::{BeamPol, Feed, Pol},
};

/// Everything needed to compute the phase toward a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTarget {
    pub hadec: HADec,

    /// The frequency at which the refraction offsets apply \[Hz\].
    pub mfreq_hz: f64,

    pub ionref: Option<IonRef>,

    pub shape: Option<SourceShape>,
}

impl PhaseTarget {
    /// A target with no refraction and no extent.
    pub fn new(hadec: HADec) -> PhaseTarget {
        PhaseTarget {
            hadec,
            mfreq_hz: DEFAULT_REFRACTION_FREQ_HZ,
            ionref: None,
            shape: None,
        }
    }
}

/// Per-channel baseline coordinates \[wavelengths\].
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelUvws {
    pub u: Array1<f64>,
    pub v: Array1<f64>,
    pub w: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct AntennaArray {
    antennas: Vec<Antenna>,

    /// (antenna number, feed) to index into `antennas`.
    index: HashMap<(usize, Option<Feed>), usize>,

    /// Antenna number to the index of the first antenna with that number. This
    /// is used when a feed-specific antenna isn't available.
    number_index: HashMap<usize, usize>,

    /// The longitude of the array \[radians\].
    longitude_rad: f64,

    /// The latitude of the array \[radians\].
    latitude_rad: f64,

    /// The UT1 - UTC offset.
    dut1: Duration,

    /// The frequencies of all channels \[Hz\].
    freqs_hz: Vec<f64>,

    /// The indices of the active channels.
    chans: Vec<usize>,

    /// The frequencies of the active channels \[Hz\].
    active_freqs_hz: Vec<f64>,

    epoch: Option<Epoch>,

    /// The local sidereal time at `epoch` \[radians\].
    lst_rad: f64,
}

impl AntennaArray {
    /// Create a new array. All channels start active, and the LST is 0 until
    /// [`AntennaArray::set_time`] is called.
    pub fn new(
        antennas: Vec<Antenna>,
        longitude_rad: f64,
        latitude_rad: f64,
        freqs_hz: Vec<f64>,
    ) -> Result<AntennaArray, ArrayError> {
        if antennas.is_empty() {
            return Err(ArrayError::NoAntennas);
        }
        if freqs_hz.is_empty() {
            return Err(ArrayError::NoChannels);
        }

        let mut index = HashMap::with_capacity(antennas.len());
        let mut number_index = HashMap::new();
        for (i, ant) in antennas.iter().enumerate() {
            if index.insert((ant.number, ant.feed), i).is_some() {
                return Err(ArrayError::DuplicateAntenna {
                    number: ant.number,
                    feed: ant.feed,
                });
            }
            number_index.entry(ant.number).or_insert(i);
        }
        debug!(
            "Created an array with {} antennas ({} feeds)",
            number_index.len(),
            antennas.len()
        );

        Ok(AntennaArray {
            antennas,
            index,
            number_index,
            longitude_rad,
            latitude_rad,
            dut1: Duration::default(),
            chans: (0..freqs_hz.len()).collect(),
            active_freqs_hz: freqs_hz.clone(),
            freqs_hz,
            epoch: None,
            lst_rad: 0.0,
        })
    }

    pub fn antennas(&self) -> &[Antenna] {
        &self.antennas
    }

    /// The distinct antenna numbers of this array, in ascending order.
    pub fn antenna_numbers(&self) -> Vec<usize> {
        let mut numbers: Vec<usize> = self.number_index.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    /// Get the antenna with this number and feed. If there's no antenna for
    /// this feed, the first antenna with this number is used.
    pub fn antenna(&self, number: usize, feed: Option<Feed>) -> Result<&Antenna, ArrayError> {
        self.slot(number, feed).map(|i| &self.antennas[i])
    }

    /// Get an antenna by its label, e.g. "3x". Like [`AntennaArray::antenna`],
    /// a feed that the array doesn't have falls back to the antenna number.
    pub fn antenna_by_label(&self, label: &str) -> Result<&Antenna, ArrayError> {
        let (number, feed) =
            parse_label(label).ok_or_else(|| ArrayError::UnknownLabel(label.to_string()))?;
        self.slot(number, feed)
            .map(|i| &self.antennas[i])
            .map_err(|_| ArrayError::UnknownLabel(label.to_string()))
    }

    fn slot(&self, number: usize, feed: Option<Feed>) -> Result<usize, ArrayError> {
        self.index
            .get(&(number, feed))
            .or_else(|| self.number_index.get(&number))
            .copied()
            .ok_or(ArrayError::UnknownAntenna(number))
    }

    /// The antennas of a baseline for a polarisation product. Without a
    /// polarisation, the first antenna of each number is used.
    fn pair(
        &self,
        i: usize,
        j: usize,
        pol: Option<Pol>,
    ) -> Result<(&Antenna, &Antenna), ArrayError> {
        let (f1, f2) = match pol.and_then(Pol::feeds) {
            Some((f1, f2)) => (Some(f1), Some(f2)),
            None => (None, None),
        };
        Ok((self.antenna(i, f1)?, self.antenna(j, f2)?))
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude_rad
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude_rad
    }

    pub fn set_dut1(&mut self, dut1: Duration) {
        self.dut1 = dut1;
    }

    /// The frequencies of all channels \[Hz\].
    pub fn freqs_hz(&self) -> &[f64] {
        &self.freqs_hz
    }

    pub fn active_chans(&self) -> &[usize] {
        &self.chans
    }

    /// The frequencies of the active channels \[Hz\].
    pub fn active_freqs_hz(&self) -> &[f64] {
        &self.active_freqs_hz
    }

    /// Restrict all per-channel outputs to these channels.
    pub fn select_chans(&mut self, chans: &[usize]) -> Result<(), ArrayError> {
        if chans.is_empty() {
            return Err(ArrayError::NoActiveChannels);
        }
        let num_chans = self.freqs_hz.len();
        if let Some(&chan) = chans.iter().find(|&&c| c >= num_chans) {
            return Err(ArrayError::BadChannel { chan, num_chans });
        }
        self.chans = chans.to_vec();
        self.active_freqs_hz = chans.iter().map(|&c| self.freqs_hz[c]).collect();
        Ok(())
    }

    /// Set the time of the array, which sets the LST used for all source
    /// positions.
    pub fn set_time(&mut self, epoch: Epoch) {
        self.lst_rad = get_lmst(self.longitude_rad, epoch, self.dut1);
        self.epoch = Some(epoch);
    }

    pub fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }

    /// The local sidereal time \[radians\].
    pub fn lst_rad(&self) -> f64 {
        self.lst_rad
    }

    /// Build a [`SimCache`] from the catalog's vectors at the current time.
    pub fn sim_cache(&self, vecs: &CatalogVecs) -> SimCache {
        SimCache::new(self, vecs)
    }

    /// The phase target of a source at the current time.
    pub fn phase_target(&self, source: &RadioSource) -> PhaseTarget {
        PhaseTarget {
            hadec: source.position.hadec(self.lst_rad, self.latitude_rad),
            mfreq_hz: source.mfreq,
            ionref: source.ionref,
            shape: source.shape,
        }
    }

    /// The phase offset of baseline (i, j) \[turns\] for each active channel.
    /// This is the offset of antenna `j` minus that of antenna `i`. If either
    /// antenna doesn't have the requested feed, its unpolarised offset is used
    /// instead.
    pub fn phase_offset(
        &self,
        i: usize,
        j: usize,
        pol: Option<Pol>,
    ) -> Result<Array1<f64>, ArrayError> {
        let (ant_i, ant_j) = self.pair(i, j, pol)?;
        let freqs = &self.active_freqs_hz;
        Ok(ant_j.phase_offset(freqs) - ant_i.phase_offset(freqs))
    }

    /// The coordinates of baseline (i, j) toward `hadec` at each active
    /// channel.
    pub fn gen_uvw(
        &self,
        i: usize,
        j: usize,
        pol: Option<Pol>,
        hadec: HADec,
    ) -> Result<ChannelUvws, ArrayError> {
        let (ant_i, ant_j) = self.pair(i, j, pol)?;
        let uvw = baseline_uvw(xyz_diff(ant_i.position, ant_j.position), hadec);
        let per_chan = |x: f64| -> Array1<f64> {
            self.active_freqs_hz
                .iter()
                .map(|f| x * f / VEL_C)
                .collect()
        };
        Ok(ChannelUvws {
            u: per_chan(uvw.u),
            v: per_chan(uvw.v),
            w: per_chan(uvw.w),
        })
    }

    /// The extra path length \[wavelengths\] caused by ionospheric refraction.
    /// The offsets are given at `mfreq_hz` and scale with the inverse square
    /// of frequency.
    pub fn refract(
        &self,
        u: &Array1<f64>,
        v: &Array1<f64>,
        mfreq_hz: f64,
        ionref: IonRef,
    ) -> Array1<f64> {
        ndarray::Zip::from(u)
            .and(v)
            .and(ArrayView1::from(self.active_freqs_hz.as_slice()))
            .map_collect(|&u, &v, &f| {
                let scale = mfreq_hz / f;
                (ionref.dra * u + ionref.ddec * v) * scale * scale
            })
    }

    /// The phase that points zenith-phased data of baseline (i, j) toward
    /// `target`. If `resolve_src` is true and the target has a shape, the
    /// phase is attenuated by the resolution of the source.
    pub fn gen_phs(
        &self,
        target: &PhaseTarget,
        i: usize,
        j: usize,
        pol: Option<Pol>,
        resolve_src: bool,
    ) -> Result<Array1<c64>, ArrayError> {
        let ChannelUvws { u, v, mut w } = self.gen_uvw(i, j, pol, target.hadec)?;
        if let Some(ionref) = target.ionref {
            w += &self.refract(&u, &v, target.mfreq_hz, ionref);
        }
        let offset = self.phase_offset(i, j, pol)?;

        let mut phs: Array1<c64> = ndarray::Zip::from(&w)
            .and(&offset)
            .map_collect(|&w, &o| cexp(-TAU * (w + o)));
        if let (true, Some(SourceShape { a1, a2, th })) = (resolve_src, target.shape) {
            ndarray::Zip::from(&mut phs)
                .and(&u)
                .and(&v)
                .for_each(|p, &u, &v| *p *= disc_attenuation(u, v, a1, a2, th));
        }
        Ok(phs)
    }

    /// Phase zenith-phased data toward `target`.
    pub fn phs2src(
        &self,
        data: ArrayView1<c64>,
        target: &PhaseTarget,
        i: usize,
        j: usize,
        pol: Option<Pol>,
    ) -> Result<Array1<c64>, ArrayError> {
        Ok(&data * &self.gen_phs(target, i, j, pol, false)?)
    }

    /// Undo [`AntennaArray::phs2src`]; the result is phased to zenith.
    pub fn unphs2src(
        &self,
        data: ArrayView1<c64>,
        target: &PhaseTarget,
        i: usize,
        j: usize,
        pol: Option<Pol>,
    ) -> Result<Array1<c64>, ArrayError> {
        Ok(&data / &self.gen_phs(target, i, j, pol, false)?)
    }

    /// The complex gain of baseline (i, j) at each active channel.
    pub fn passband(
        &self,
        i: usize,
        j: usize,
        pol: Option<Pol>,
    ) -> Result<Array1<c64>, ArrayError> {
        let (ant_i, ant_j) = self.pair(i, j, pol)?;
        let n = self.active_freqs_hz.len();
        Ok(ant_i.passband(n) * ant_j.passband(n).mapv(|g| g.conj()))
    }

    /// The beam response of baseline (i, j) toward `dir` at each active
    /// channel. For Stokes polarisations, I and Q are the mean of the XX and YY
    /// responses, and U and V are the XY response.
    pub fn bm_response(
        &self,
        i: usize,
        j: usize,
        pol: Pol,
        dir: TopoDir,
    ) -> Result<Array1<f64>, ArrayError> {
        match pol.feeds() {
            Some((f1, f2)) => {
                let freqs = &self.active_freqs_hz;
                let ant_i = self.antenna(i, Some(f1))?;
                let ant_j = self.antenna(j, Some(f2))?;
                Ok(ant_i.bm_response(dir, BeamPol::from(f1), freqs)
                    * ant_j.bm_response(dir, BeamPol::from(f2), freqs))
            }
            None => match pol {
                Pol::I | Pol::Q => {
                    let xx = self.bm_response(i, j, Pol::XX, dir)?;
                    let yy = self.bm_response(i, j, Pol::YY, dir)?;
                    Ok((xx + yy) / 2.0)
                }
                _ => self.bm_response(i, j, Pol::XY, dir),
            },
        }
    }

    /// Simulate the visibilities of baseline (i, j) for a polarisation at each
    /// active channel.
    ///
    /// The sky is assumed to be unpolarised: flux is only injected into the XX
    /// and YY products, and XY and YX are zero. `cache` must have been built
    /// for the array's current time and channels. If `resolve_src` is true,
    /// sources with shapes are attenuated by their resolution.
    pub fn sim(
        &self,
        cache: &SimCache,
        i: usize,
        j: usize,
        pol: Pol,
        resolve_src: bool,
    ) -> Result<Array1<c64>, ArrayError> {
        if pol.feeds().is_none() {
            return Err(ArrayError::UnsupportedPol(pol));
        }
        if !cache.is_initialized() {
            return Err(ArrayError::CacheUninitialized);
        }
        let num_chans = self.active_freqs_hz.len();
        if !cache.is_current(self.lst_rad, num_chans) {
            return Err(ArrayError::StaleCache);
        }
        let data = match cache {
            SimCache::Ready(data) if pol.is_co_pol() => data,
            _ => {
                // Make sure the antennas exist, even when the answer is zeros.
                self.pair(i, j, Some(pol))?;
                return Ok(Array1::zeros(num_chans));
            }
        };

        let gains = self.passband(i, j, Some(pol))?;
        let mut vis = Array1::zeros(num_chans);
        for (i_src, fluxes) in data.fluxes.outer_iter().enumerate() {
            let target = PhaseTarget {
                hadec: data.positions[i_src],
                mfreq_hz: data.mfreqs[i_src],
                ionref: data.ionrefs[i_src],
                shape: data.shapes[i_src],
            };
            let beam = self.bm_response(i, j, pol, data.dirs[i_src])?;
            let phs = self.gen_phs(&target, i, j, Some(pol), resolve_src)?;
            ndarray::Zip::from(&mut vis)
                .and(&gains)
                .and(&beam)
                .and(&fluxes)
                .and(&phs)
                .for_each(|v, g, b, f, p| *v += g * *b * *f * p.conj());
        }
        Ok(vis)
    }

    /// Resample every antenna's passband to `num_knots` knots.
    pub fn resample_passbands(&mut self, num_knots: usize) {
        for ant in &mut self.antennas {
            ant.resample_passband(num_knots);
        }
    }

    /// Get the selected parameters of the selected antennas (by label, e.g.
    /// "3x"). The label "*" selects all antennas.
    pub fn get_params(&self, selection: &ParamSelection) -> Result<Params, ArrayError> {
        let mut params = Params::new();
        for (label, names) in selection {
            if label == "*" {
                for ant in &self.antennas {
                    params.insert(ant.label(), ant.get_params(names)?);
                }
            } else {
                let ant = self.antenna_by_label(label)?;
                params.insert(label.clone(), ant.get_params(names)?);
            }
        }
        Ok(params)
    }

    /// Set antenna parameters. Labels resolve the same way as in
    /// [`AntennaArray::get_params`]; units that aren't antennas in this array
    /// are ignored.
    pub fn set_params(&mut self, params: &Params) -> Result<(), ArrayError> {
        for (label, p) in params {
            let slot = match parse_label(label) {
                Some((number, feed)) => self.slot(number, feed).ok(),
                None => None,
            };
            if let Some(i) = slot {
                self.antennas[i].set_params(p)?;
            }
        }
        Ok(())
    }
}

/// Split an antenna label like "3x" into its number and feed.
fn parse_label(label: &str) -> Option<(usize, Option<Feed>)> {
    let split = label
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(label.len());
    let (number, feed) = label.split_at(split);
    let number = number.parse().ok()?;
    if feed.is_empty() {
        Some((number, None))
    } else {
        feed.parse().ok().map(|f| (number, Some(f)))
    }
}
