// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code surrounding the [`IndexMap`] used to contain all sky-model sources.

mod error;
mod read;
mod source;
#[cfg(test)]
mod tests;

pub use error::CatalogError;
pub use read::{read_catalog, CATALOG_FILE_TYPES_COMMA_SEPARATED};
pub use source::{flux_density, IonRef, RadioSource, SourcePosition, SourceShape};

use std::ops::Deref;

use indexmap::IndexMap;
use log::trace;
use marlu::HADec;
use serde::{Deserialize, Serialize};

use crate::{
    array::AntennaArray,
    coord::TopoDir,
    params::{ParamSelection, Params},
};

/// The position of a source at the array's current time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceGeometry {
    pub hadec: HADec,
    pub dir: TopoDir,
}

/// Everything the simulator needs to know about the catalog's sources, one
/// element per source, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CatalogVecs {
    pub positions: Vec<HADec>,
    pub dirs: Vec<TopoDir>,
    pub jys: Vec<f64>,
    pub indices: Vec<f64>,
    pub mfreqs: Vec<f64>,
    pub shapes: Vec<Option<SourceShape>>,
    pub ionrefs: Vec<Option<IonRef>>,
}

impl CatalogVecs {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A [`IndexMap`] of source names for keys and [`RadioSource`] structs for
/// values, along with the sources' positions at the last computed time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCatalog {
    sources: IndexMap<String, RadioSource>,

    #[serde(skip)]
    geometry: Option<Vec<SourceGeometry>>,
}

impl SourceCatalog {
    pub fn new() -> SourceCatalog {
        SourceCatalog::default()
    }

    /// Add a source. Any previously computed positions are discarded.
    pub fn insert(&mut self, name: String, source: RadioSource) -> Option<RadioSource> {
        self.geometry = None;
        self.sources.insert(name, source)
    }

    /// Get a new catalog containing only the named sources, in the order
    /// given.
    pub fn get_catalog(&self, names: &[String]) -> Result<SourceCatalog, CatalogError> {
        let sources = names
            .iter()
            .map(|name| {
                self.sources
                    .get(name)
                    .map(|src| (name.clone(), src.clone()))
                    .ok_or_else(|| CatalogError::UnknownSource(name.clone()))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;
        Ok(SourceCatalog::from(sources))
    }

    /// Compute the position of each source at the array's current time.
    pub fn compute(&mut self, array: &AntennaArray) {
        let lst = array.lst_rad();
        let lat = array.latitude_rad();
        trace!("Computing source positions at LST {lst:.6} rad");
        self.geometry = Some(
            self.sources
                .values()
                .map(|src| SourceGeometry {
                    hadec: src.position.hadec(lst, lat),
                    dir: TopoDir::from_azel(src.position.azel(lst, lat)),
                })
                .collect(),
        );
    }

    /// Get the source properties needed for simulation. The positions must
    /// have been computed since the catalog last changed.
    pub fn get_vecs(&self) -> Result<CatalogVecs, CatalogError> {
        let geometry = self.geometry.as_ref().ok_or(CatalogError::NotComputed)?;
        let mut vecs = CatalogVecs::default();
        for (src, geom) in self.sources.values().zip(geometry) {
            vecs.positions.push(geom.hadec);
            vecs.dirs.push(geom.dir);
            vecs.jys.push(src.jys);
            vecs.indices.push(src.index);
            vecs.mfreqs.push(src.mfreq);
            vecs.shapes.push(src.shape);
            vecs.ionrefs.push(src.ionref);
        }
        Ok(vecs)
    }

    /// Get the selected parameters of the selected sources. The source name
    /// "*" selects all sources.
    pub fn get_params(&self, selection: &ParamSelection) -> Result<Params, CatalogError> {
        let mut params = Params::new();
        for (name, prm_names) in selection {
            if name == "*" {
                for (name, src) in &self.sources {
                    params.insert(name.clone(), src.get_params(name, prm_names)?);
                }
            } else {
                let src = self
                    .sources
                    .get(name)
                    .ok_or_else(|| CatalogError::UnknownSource(name.clone()))?;
                params.insert(name.clone(), src.get_params(name, prm_names)?);
            }
        }
        Ok(params)
    }

    /// Set source parameters. Units that aren't sources in this catalog are
    /// ignored. Any previously computed positions are discarded.
    pub fn set_params(&mut self, params: &Params) -> Result<(), CatalogError> {
        for (name, src) in self.sources.iter_mut() {
            if let Some(p) = params.get(name) {
                src.set_params(name, p)?;
            }
        }
        self.geometry = None;
        Ok(())
    }
}

impl From<IndexMap<String, RadioSource>> for SourceCatalog {
    fn from(sources: IndexMap<String, RadioSource>) -> Self {
        Self {
            sources,
            geometry: None,
        }
    }
}

impl<const N: usize> From<[(String, RadioSource); N]> for SourceCatalog {
    fn from(value: [(String, RadioSource); N]) -> Self {
        Self::from(IndexMap::from(value))
    }
}

impl FromIterator<(String, RadioSource)> for SourceCatalog {
    fn from_iter<I: IntoIterator<Item = (String, RadioSource)>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<IndexMap<_, _>>())
    }
}

impl Deref for SourceCatalog {
    type Target = IndexMap<String, RadioSource>;

    fn deref(&self) -> &Self::Target {
        &self.sources
    }
}
