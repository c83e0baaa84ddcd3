// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A single antenna (or a single feed of a dual-polarisation antenna).

#[cfg(test)]
mod tests;

use marlu::XyzGeodetic;
use ndarray::prelude::*;

use crate::{
    beam::Beam,
    c64,
    constants::HZ_PER_GHZ,
    coord::TopoDir,
    math::interp_knots,
    params::{ParamError, ParamValue, UnitParams},
    pol::{BeamPol, Feed},
};

/// The names of the fittable parameters every antenna has (the beam may add
/// more).
pub const ANTENNA_PARAMS: [&str; 8] = ["x", "y", "z", "dly", "off", "amp", "bp_r", "bp_i"];

#[derive(Debug, Clone)]
pub struct Antenna {
    /// The antenna number. The two feeds of a dual-polarisation antenna share
    /// a number.
    pub number: usize,

    /// The feed this antenna represents. `None` for arrays without
    /// polarisation information.
    pub feed: Option<Feed>,

    /// The position of the antenna relative to the array centre \[metres\].
    pub position: XyzGeodetic,

    pub beam: Box<dyn Beam>,

    /// Scalar gain.
    pub amp: f64,

    /// Real parts of the passband knots. These are linearly interpolated over
    /// the active channels.
    pub bp_r: Vec<f64>,

    /// Imaginary parts of the passband knots.
    pub bp_i: Vec<f64>,

    /// Delay \[ns\].
    pub dly: f64,

    /// Phase offset \[turns\].
    pub off: f64,
}

impl Antenna {
    /// A new antenna with a flat, unit passband and no phase offset.
    pub fn new(
        number: usize,
        feed: Option<Feed>,
        position: XyzGeodetic,
        beam: Box<dyn Beam>,
    ) -> Antenna {
        Antenna {
            number,
            feed,
            position,
            beam,
            amp: 1.0,
            bp_r: vec![1.0],
            bp_i: vec![0.0],
            dly: 0.0,
            off: 0.0,
        }
    }

    /// The name of this antenna in parameter mappings, e.g. "3x", or "3" if it
    /// has no feed.
    pub fn label(&self) -> String {
        match self.feed {
            Some(f) => format!("{}{f}", self.number),
            None => self.number.to_string(),
        }
    }

    /// The complex gain of this antenna for each of `num_chans` active
    /// channels.
    pub fn passband(&self, num_chans: usize) -> Array1<c64> {
        let re = interp_knots(&self.bp_r, num_chans);
        let im = interp_knots(&self.bp_i, num_chans);
        re.into_iter()
            .zip(im)
            .map(|(re, im)| c64::new(re, im) * self.amp)
            .collect()
    }

    /// The phase offset of this antenna \[turns\] at each frequency.
    pub fn phase_offset(&self, freqs_hz: &[f64]) -> Array1<f64> {
        freqs_hz
            .iter()
            .map(|&f| self.dly * f / HZ_PER_GHZ + self.off)
            .collect()
    }

    /// The beam response of this antenna toward `dir`.
    ///
    /// The beam is defined for an X feed; the Y feed's response is the same
    /// beam rotated by 90 degrees. The Stokes "polarisations" approximate the
    /// beam by combining the two feeds: I and Q use the quadrature mean, U and
    /// V use the geometric mean. All of these are 1 at zenith for a normalised
    /// beam.
    pub fn bm_response(&self, dir: TopoDir, pol: BeamPol, freqs_hz: &[f64]) -> Array1<f64> {
        let x_resp = || self.beam.response(dir, freqs_hz);
        let y_resp = || {
            let rotated = TopoDir {
                x: dir.y,
                y: -dir.x,
                z: dir.z,
            };
            self.beam.response(rotated, freqs_hz)
        };
        match pol {
            BeamPol::X => x_resp(),
            BeamPol::Y => y_resp(),
            BeamPol::I | BeamPol::Q => {
                let (bx, by) = (x_resp(), y_resp());
                ndarray::Zip::from(&bx)
                    .and(&by)
                    .map_collect(|x, y| ((x * x + y * y) / 2.0).sqrt())
            }
            BeamPol::U | BeamPol::V => {
                let (bx, by) = (x_resp(), y_resp());
                ndarray::Zip::from(&bx)
                    .and(&by)
                    .map_collect(|x, y| (x * y).sqrt())
            }
        }
    }

    /// Resample the passband knots to `num_knots` knots, keeping the shape of
    /// the passband.
    pub fn resample_passband(&mut self, num_knots: usize) {
        if num_knots == 0 || (num_knots == self.bp_r.len() && num_knots == self.bp_i.len()) {
            return;
        }
        self.bp_r = interp_knots(&self.bp_r, num_knots);
        self.bp_i = interp_knots(&self.bp_i, num_knots);
    }

    /// Every parameter name this antenna responds to.
    pub fn param_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        ANTENNA_PARAMS
            .iter()
            .copied()
            .chain(self.beam.param_names().iter().copied())
    }

    /// Get the requested parameters. "*" selects all parameters, and
    /// "passband" is shorthand for both "bp_r" and "bp_i".
    pub fn get_params(&self, names: &[String]) -> Result<UnitParams, ParamError> {
        let mut params = UnitParams::new();
        for name in names {
            match name.as_str() {
                "*" => {
                    for n in self.param_names() {
                        params.insert(n.to_string(), self.get_param(n)?);
                    }
                }
                "passband" => {
                    params.insert("bp_r".to_string(), self.get_param("bp_r")?);
                    params.insert("bp_i".to_string(), self.get_param("bp_i")?);
                }
                n => {
                    params.insert(n.to_string(), self.get_param(n)?);
                }
            }
        }
        Ok(params)
    }

    fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
        let value = match name {
            "x" => ParamValue::Scalar(self.position.x),
            "y" => ParamValue::Scalar(self.position.y),
            "z" => ParamValue::Scalar(self.position.z),
            "dly" => ParamValue::Scalar(self.dly),
            "off" => ParamValue::Scalar(self.off),
            "amp" => ParamValue::Scalar(self.amp),
            "bp_r" => ParamValue::Vector(self.bp_r.clone()),
            "bp_i" => ParamValue::Vector(self.bp_i.clone()),
            _ => match self.beam.get_param(name) {
                Some(v) => ParamValue::Scalar(v),
                None => {
                    return Err(ParamError::Unknown {
                        unit: self.label(),
                        name: name.to_string(),
                    })
                }
            },
        };
        Ok(value)
    }

    /// Set parameters. Nothing is changed if any parameter is bad.
    pub fn set_params(&mut self, params: &UnitParams) -> Result<(), ParamError> {
        // Validate everything first.
        let mut beam = self.beam.clone();
        for (name, value) in params {
            match name.as_str() {
                "bp_r" | "bp_i" => {
                    if value.is_empty() {
                        return Err(ParamError::Empty {
                            unit: self.label(),
                            name: name.clone(),
                        });
                    }
                }
                n if ANTENNA_PARAMS.contains(&n) => {
                    self.scalar(name, value)?;
                }
                n => {
                    let v = self.scalar(name, value)?;
                    beam.set_param(n, v).map_err(|err| ParamError::Beam {
                        unit: self.label(),
                        name: name.clone(),
                        err,
                    })?;
                }
            }
        }

        for (name, value) in params {
            match name.as_str() {
                "bp_r" => self.bp_r = value.to_vec(),
                "bp_i" => self.bp_i = value.to_vec(),
                n => {
                    let v = self.scalar(n, value)?;
                    match n {
                        "x" => self.position.x = v,
                        "y" => self.position.y = v,
                        "z" => self.position.z = v,
                        "dly" => self.dly = v,
                        "off" => self.off = v,
                        "amp" => self.amp = v,
                        _ => (),
                    }
                }
            }
        }
        self.beam = beam;
        Ok(())
    }

    fn scalar(&self, name: &str, value: &ParamValue) -> Result<f64, ParamError> {
        value.as_scalar().ok_or_else(|| ParamError::NotScalar {
            unit: self.label(),
            name: name.to_string(),
        })
    }
}
