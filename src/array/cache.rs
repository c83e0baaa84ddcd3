// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-timestamp bundle of source information used when simulating
//! visibilities.

use log::trace;
use marlu::HADec;
use ndarray::prelude::*;

use super::AntennaArray;
use crate::{
    catalog::{flux_density, CatalogVecs, IonRef, SourceShape},
    coord::TopoDir,
};

/// Source geometry and fluxes for a single time. Every baseline simulated at
/// this time uses the same cache.
///
/// A cache is only ever replaced wholesale (with [`AntennaArray::sim_cache`] or
/// [`SimCache::refresh`]); simulating never changes it.
#[derive(Debug, Clone, Default)]
pub enum SimCache {
    /// Never built. Simulating with this is an error.
    #[default]
    Uninitialized,

    /// Built, but there are no sources. Simulations are all zeros.
    Empty { lst_rad: f64, num_chans: usize },

    /// Built with at least one source.
    Ready(SimCacheData),
}

#[derive(Debug, Clone)]
pub struct SimCacheData {
    /// The LST this cache was built for \[radians\].
    pub(super) lst_rad: f64,

    pub(super) positions: Vec<HADec>,

    pub(super) dirs: Vec<TopoDir>,

    /// The flux density of each source at each active channel \[Jy\]. The
    /// first dimension is source, the second is channel.
    pub(super) fluxes: Array2<f64>,

    /// Reference frequencies of each source \[Hz\].
    pub(super) mfreqs: Vec<f64>,

    pub(super) shapes: Vec<Option<SourceShape>>,

    pub(super) ionrefs: Vec<Option<IonRef>>,
}

impl SimCache {
    /// Build a cache from the catalog's vectors at the array's current time.
    pub fn new(array: &AntennaArray, vecs: &CatalogVecs) -> SimCache {
        let lst_rad = array.lst_rad();
        let freqs = array.active_freqs_hz();
        trace!(
            "Building the simulation cache for {} sources at LST {lst_rad:.6} rad",
            vecs.len()
        );
        if vecs.is_empty() {
            return SimCache::Empty {
                lst_rad,
                num_chans: freqs.len(),
            };
        }

        let mut fluxes = Array2::zeros((vecs.len(), freqs.len()));
        for (mut fluxes, ((&jys, &index), &mfreq)) in fluxes
            .outer_iter_mut()
            .zip(vecs.jys.iter().zip(&vecs.indices).zip(&vecs.mfreqs))
        {
            fluxes
                .iter_mut()
                .zip(freqs)
                .for_each(|(flux, &f)| *flux = flux_density(jys, index, mfreq, f));
        }

        SimCache::Ready(SimCacheData {
            lst_rad,
            positions: vecs.positions.clone(),
            dirs: vecs.dirs.clone(),
            fluxes,
            mfreqs: vecs.mfreqs.clone(),
            shapes: vecs.shapes.clone(),
            ionrefs: vecs.ionrefs.clone(),
        })
    }

    /// Replace this cache with one built at the array's current time.
    pub fn refresh(&mut self, array: &AntennaArray, vecs: &CatalogVecs) {
        *self = SimCache::new(array, vecs);
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self, SimCache::Uninitialized)
    }

    /// Is this cache valid for the given LST and number of active channels?
    pub(super) fn is_current(&self, lst_rad: f64, num_chans: usize) -> bool {
        match self {
            SimCache::Uninitialized => false,
            SimCache::Empty {
                lst_rad: l,
                num_chans: n,
            } => *l == lst_rad && *n == num_chans,
            SimCache::Ready(data) => {
                data.lst_rad == lst_rad && data.fluxes.len_of(Axis(1)) == num_chans
            }
        }
    }
}
