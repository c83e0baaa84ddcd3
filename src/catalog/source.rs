// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A single radio source.

use marlu::{AzEl, HADec, RADec};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_REFRACTION_FREQ_HZ, DEFAULT_SPEC_INDEX},
    params::{ParamError, ParamValue, UnitParams},
};

/// Where a source is on the sky. All angles are in \[radians\].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourcePosition {
    /// Fixed in the equatorial frame.
    Fixed { ra: f64, dec: f64 },

    /// Fixed in the topocentric frame, i.e. it moves across the sky with
    /// time.
    Topocentric { az: f64, el: f64 },
}

impl SourcePosition {
    /// The hour angle and declination of this position at a local sidereal
    /// time and array latitude.
    pub fn hadec(self, lst_rad: f64, latitude_rad: f64) -> HADec {
        match self {
            SourcePosition::Fixed { ra, dec } => RADec::from_radians(ra, dec).to_hadec(lst_rad),
            SourcePosition::Topocentric { az, el } => {
                AzEl::from_radians(az, el).to_hadec(latitude_rad)
            }
        }
    }

    /// The horizon coordinates of this position at a local sidereal time and
    /// array latitude.
    pub fn azel(self, lst_rad: f64, latitude_rad: f64) -> AzEl {
        match self {
            SourcePosition::Fixed { .. } => self.hadec(lst_rad, latitude_rad).to_azel(latitude_rad),
            SourcePosition::Topocentric { az, el } => AzEl::from_radians(az, el),
        }
    }
}

/// The angular extent of a source, modelled as a uniformly-bright elliptical
/// disc. `a1` and `a2` are angular radii \[radians\], and `th` \[radians\] is
/// the rotation of the `a1` axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceShape {
    pub a1: f64,
    pub a2: f64,
    pub th: f64,
}

/// Ionospheric refraction offsets \[radians\] at a source's reference
/// frequency. The offsets scale with the inverse square of frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IonRef {
    pub dra: f64,
    pub ddec: f64,
}

fn default_index() -> f64 {
    DEFAULT_SPEC_INDEX
}

fn default_mfreq() -> f64 {
    DEFAULT_REFRACTION_FREQ_HZ
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioSource {
    pub position: SourcePosition,

    /// The flux density at the reference frequency \[Jy\].
    pub jys: f64,

    /// The spectral index.
    #[serde(default = "default_index")]
    pub index: f64,

    /// The reference frequency \[Hz\].
    #[serde(default = "default_mfreq")]
    pub mfreq: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<SourceShape>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ionref: Option<IonRef>,
}

/// The flux density \[Jy\] at `freq_hz` of a power-law spectrum that is
/// `jys` at `mfreq_hz`.
#[inline]
pub fn flux_density(jys: f64, index: f64, mfreq_hz: f64, freq_hz: f64) -> f64 {
    jys * (freq_hz / mfreq_hz).powf(index)
}

impl RadioSource {
    /// An unresolved source with no refraction.
    pub fn new(position: SourcePosition, jys: f64, index: f64, mfreq: f64) -> RadioSource {
        RadioSource {
            position,
            jys,
            index,
            mfreq,
            shape: None,
            ionref: None,
        }
    }

    fn param_names(&self) -> Vec<&'static str> {
        let mut names = vec!["jys", "index", "mfreq"];
        match self.position {
            SourcePosition::Fixed { .. } => names.extend(["ra", "dec"]),
            SourcePosition::Topocentric { .. } => names.extend(["az", "el"]),
        }
        if self.shape.is_some() {
            names.extend(["a1", "a2", "th"]);
        }
        if self.ionref.is_some() {
            names.extend(["dra", "ddec"]);
        }
        names
    }

    fn get_param(&self, name: &str) -> Option<f64> {
        let value = match (name, self.position) {
            ("jys", _) => self.jys,
            ("index", _) => self.index,
            ("mfreq", _) => self.mfreq,
            ("ra", SourcePosition::Fixed { ra, .. }) => ra,
            ("dec", SourcePosition::Fixed { dec, .. }) => dec,
            ("az", SourcePosition::Topocentric { az, .. }) => az,
            ("el", SourcePosition::Topocentric { el, .. }) => el,
            ("a1", _) => self.shape?.a1,
            ("a2", _) => self.shape?.a2,
            ("th", _) => self.shape?.th,
            ("dra", _) => self.ionref?.dra,
            ("ddec", _) => self.ionref?.ddec,
            _ => return None,
        };
        Some(value)
    }

    /// Get the requested parameters. "*" selects all of them. `unit` is the
    /// name of this source, used for error reporting.
    pub fn get_params(&self, unit: &str, names: &[String]) -> Result<UnitParams, ParamError> {
        let mut params = UnitParams::new();
        for name in names {
            let names = if name == "*" {
                self.param_names()
                    .into_iter()
                    .map(|n| n.to_string())
                    .collect()
            } else {
                vec![name.clone()]
            };
            for name in names {
                let value = self
                    .get_param(&name)
                    .ok_or_else(|| ParamError::Unknown {
                        unit: unit.to_string(),
                        name: name.clone(),
                    })?;
                params.insert(name, ParamValue::Scalar(value));
            }
        }
        Ok(params)
    }

    /// Set parameters. Setting a shape or refraction parameter on a source
    /// without one gives it one (with the other values zero). Nothing is
    /// changed if any parameter is bad.
    pub fn set_params(&mut self, unit: &str, params: &UnitParams) -> Result<(), ParamError> {
        let mut new = self.clone();
        for (name, value) in params {
            let v = value.as_scalar().ok_or_else(|| ParamError::NotScalar {
                unit: unit.to_string(),
                name: name.clone(),
            })?;
            let shape = || SourceShape {
                a1: 0.0,
                a2: 0.0,
                th: 0.0,
            };
            let ionref = || IonRef {
                dra: 0.0,
                ddec: 0.0,
            };
            match (name.as_str(), &mut new.position) {
                ("jys", _) => new.jys = v,
                ("index", _) => new.index = v,
                ("mfreq", _) => new.mfreq = v,
                ("ra", SourcePosition::Fixed { ra, .. }) => *ra = v,
                ("dec", SourcePosition::Fixed { dec, .. }) => *dec = v,
                ("az", SourcePosition::Topocentric { az, .. }) => *az = v,
                ("el", SourcePosition::Topocentric { el, .. }) => *el = v,
                ("a1", _) => new.shape.get_or_insert_with(shape).a1 = v,
                ("a2", _) => new.shape.get_or_insert_with(shape).a2 = v,
                ("th", _) => new.shape.get_or_insert_with(shape).th = v,
                ("dra", _) => new.ionref.get_or_insert_with(ionref).dra = v,
                ("ddec", _) => new.ionref.get_or_insert_with(ionref).ddec = v,
                _ => {
                    return Err(ParamError::Unknown {
                        unit: unit.to_string(),
                        name: name.clone(),
                    })
                }
            }
        }
        *self = new;
        Ok(())
    }
}
