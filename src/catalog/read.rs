// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read in source catalogs.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use log::debug;

use super::{CatalogError, SourceCatalog, SourcePosition};
use crate::constants::{FRAC_PI_2, TAU};

pub const CATALOG_FILE_TYPES_COMMA_SEPARATED: &str = "yaml, yml, json, toml";

/// Read a [`SourceCatalog`] from a yaml, json or toml file. The file type is
/// determined by the extension.
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<SourceCatalog, CatalogError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    let mut buf = BufReader::new(File::open(path)?);
    let catalog: SourceCatalog = match ext.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_reader(&mut buf)?,
        Some("json") => serde_json::from_reader(&mut buf)?,
        Some("toml") => {
            let mut s = String::new();
            buf.read_to_string(&mut s)?;
            toml::from_str(&s)?
        }
        _ => return Err(CatalogError::UnknownFileType(path.to_path_buf())),
    };
    validate(&catalog)?;
    debug!("Read {} sources from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Complain if we spot something wrong.
fn validate(catalog: &SourceCatalog) -> Result<(), CatalogError> {
    for (name, src) in catalog.iter() {
        if let SourcePosition::Fixed { ra, dec } = src.position {
            if !(0.0..TAU).contains(&ra) {
                return Err(CatalogError::InvalidRa {
                    name: name.clone(),
                    ra: ra.to_degrees(),
                });
            }
            if !(-FRAC_PI_2..=FRAC_PI_2).contains(&dec) {
                return Err(CatalogError::InvalidDec {
                    name: name.clone(),
                    dec: dec.to_degrees(),
                });
            }
        }
        if src.mfreq.is_nan() || src.mfreq <= 0.0 {
            return Err(CatalogError::InvalidRefFreq {
                name: name.clone(),
                mfreq: src.mfreq,
            });
        }
    }
    Ok(())
}
