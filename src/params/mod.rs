// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flattening nested fit parameters into a vector of numbers, and back again.
//!
//! Parameters are kept per "unit" (an antenna like "3x", or a source name),
//! and each unit has named values, e.g. `{"3x": {"amp": 1.0}}`. Minimisers
//! only understand a flat vector of numbers; [`flatten`] produces that vector
//! along with a [`KeyList`], which [`reconstruct`] uses to rebuild the nested
//! structure exactly.
//!
//! Ordering is deterministic: units and names are visited in lexical order
//! (the mappings are [`BTreeMap`]s), and vector values are expanded in place.

mod error;

pub use error::ParamError;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, log_enabled, Level::Debug};
use serde::{Deserialize, Serialize};

/// The value of a single named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl ParamValue {
    /// How many numbers this value occupies when flattened.
    pub fn len(&self) -> usize {
        match self {
            ParamValue::Scalar(_) => 1,
            ParamValue::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get this value as a scalar. A single-element vector counts as a
    /// scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(s) => Some(*s),
            ParamValue::Vector(v) if v.len() == 1 => Some(v[0]),
            ParamValue::Vector(_) => None,
        }
    }

    /// Get this value as a vector. A scalar becomes a single-element vector.
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            ParamValue::Scalar(s) => vec![*s],
            ParamValue::Vector(v) => v.clone(),
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Scalar(s) => write!(f, "{s}"),
            ParamValue::Vector(v) => write!(f, "[{}]", v.iter().join(", ")),
        }
    }
}

/// Named parameter values of a single unit.
pub type UnitParams = BTreeMap<String, ParamValue>;

/// Parameters of many units, keyed by unit name.
pub type Params = BTreeMap<String, UnitParams>;

/// Which parameter names to get from which units. The unit "*" means all
/// units.
pub type ParamSelection = IndexMap<String, Vec<String>>;

/// Where a parameter lives in a flattened vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamKey {
    pub unit: String,
    pub name: String,
    /// The index of this parameter's first number in the flattened vector.
    pub offset: usize,
    pub shape: ParamShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamShape {
    Scalar,
    Vector(usize),
}

impl ParamShape {
    fn len(self) -> usize {
        match self {
            ParamShape::Scalar => 1,
            ParamShape::Vector(n) => n,
        }
    }
}

/// The structure of a flattened parameter vector. This is needed to turn a
/// vector back into [`Params`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyList {
    pub keys: Vec<ParamKey>,

    /// Every unit that was flattened, including those without parameters.
    pub units: Vec<String>,
}

impl KeyList {
    /// The total number of values described by this key list.
    pub fn num_values(&self) -> usize {
        self.keys.iter().map(|k| k.shape.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<ParamKey> {
        self.keys.iter()
    }
}

/// Flatten `params` into a vector of numbers and the [`KeyList`] needed to undo
/// the flattening.
pub fn flatten(params: &Params) -> (Vec<f64>, KeyList) {
    let mut values = vec![];
    let mut keys = vec![];
    let mut units = Vec::with_capacity(params.len());
    for (unit, unit_params) in params {
        units.push(unit.clone());
        for (name, value) in unit_params {
            let shape = match value {
                ParamValue::Scalar(s) => {
                    values.push(*s);
                    ParamShape::Scalar
                }
                ParamValue::Vector(v) => {
                    values.extend_from_slice(v);
                    ParamShape::Vector(v.len())
                }
            };
            keys.push(ParamKey {
                unit: unit.clone(),
                name: name.clone(),
                offset: values.len() - shape.len(),
                shape,
            });
        }
    }
    (values, KeyList { keys, units })
}

/// Rebuild [`Params`] from a flattened vector and its [`KeyList`].
pub fn reconstruct(values: &[f64], key_list: &KeyList) -> Result<Params, ParamError> {
    let expected = key_list.num_values();
    if values.len() != expected {
        return Err(ParamError::LengthMismatch {
            got: values.len(),
            expected,
        });
    }

    let mut params: Params = key_list
        .units
        .iter()
        .map(|u| (u.clone(), UnitParams::new()))
        .collect();
    for ParamKey {
        unit,
        name,
        offset,
        shape,
    } in key_list.iter()
    {
        let value = match shape {
            ParamShape::Scalar => ParamValue::Scalar(values[*offset]),
            ParamShape::Vector(n) => ParamValue::Vector(values[*offset..*offset + n].to_vec()),
        };
        params
            .entry(unit.clone())
            .or_default()
            .insert(name.clone(), value);
    }
    Ok(params)
}

/// Merge `other` into `params`. Values in `other` win.
pub fn merge_params(params: &mut Params, other: Params) {
    for (unit, unit_params) in other {
        params.entry(unit).or_default().extend(unit_params);
    }
}

/// For each of the `shared` parameter names, copy the value held by the first
/// of `units` onto all of the other units. The first unit is the authority;
/// the other units' values (if any) are overwritten.
pub fn broadcast_shared(params: &mut Params, units: &[String], shared: &[String]) {
    let Some((first, others)) = units.split_first() else {
        return;
    };
    for name in shared {
        let Some(value) = params.get(first).and_then(|p| p.get(name)).cloned() else {
            continue;
        };
        for unit in others {
            params
                .entry(unit.clone())
                .or_default()
                .insert(name.clone(), value.clone());
        }
    }
}

/// Parse "source=param" pairs (comma separated) into a [`ParamSelection`].
/// e.g. "cyg=jys,cyg=index,cas=jys".
pub fn parse_other_params(s: &str) -> Result<ParamSelection, ParamError> {
    let mut selection = ParamSelection::new();
    for pair in s.split(',').map(|p| p.trim()).filter(|p| !p.is_empty()) {
        let Some((src, prm)) = pair.split_once('=') else {
            return Err(ParamError::BadOtherParam(pair.to_string()));
        };
        let (src, prm) = (src.trim(), prm.trim());
        if src.is_empty() || prm.is_empty() {
            return Err(ParamError::BadOtherParam(pair.to_string()));
        }
        selection
            .entry(src.to_string())
            .or_default()
            .push(prm.to_string());
    }
    Ok(selection)
}

/// Log all parameters at the debug level; one line per unit.
pub fn print_params(params: &Params) {
    if !log_enabled!(Debug) {
        return;
    }
    for (unit, unit_params) in params {
        debug!(
            "{unit}: {}",
            unit_params
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .join(", ")
        );
    }
}
