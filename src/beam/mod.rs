// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract beam calculations.
//!
//! [`Beam`] is a trait detailing how to get the directional response of a
//! single feed. By making this trait, we can neatly abstract over multiple beam
//! shapes, including a simple [`NoBeam`] type (which just returns ones).
//!
//! All beams are evaluated for an X-oriented feed; the Y feed response is
//! obtained by rotating the direction by 90 degrees (see
//! [`crate::antenna::Antenna::bm_response`]). Beams are always normalised such
//! that the response at zenith is 1.

mod error;
#[cfg(test)]
mod tests;

pub use error::BeamError;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coord::TopoDir;

/// A trait abstracting beam code functions.
pub trait Beam: Sync + Send + std::fmt::Debug {
    /// Calculate the response of an X-oriented feed toward `dir` for each of
    /// the frequencies `freqs_hz`.
    fn response(&self, dir: TopoDir, freqs_hz: &[f64]) -> Array1<f64>;

    /// The names of the fittable parameters of this beam.
    fn param_names(&self) -> &'static [&'static str];

    /// Get the value of a beam parameter, or `None` if this beam doesn't have
    /// a parameter with this name.
    fn get_param(&self, name: &str) -> Option<f64>;

    /// Set the value of a beam parameter.
    fn set_param(&mut self, name: &str, value: f64) -> Result<(), BeamError>;

    /// Clone this beam into a new trait object.
    fn clone_box(&self) -> Box<dyn Beam>;
}

impl Clone for Box<dyn Beam> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A beam that is 1 in all directions at all frequencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBeam;

impl Beam for NoBeam {
    fn response(&self, _dir: TopoDir, freqs_hz: &[f64]) -> Array1<f64> {
        Array1::ones(freqs_hz.len())
    }

    fn param_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn get_param(&self, _name: &str) -> Option<f64> {
        None
    }

    fn set_param(&mut self, name: &str, _value: f64) -> Result<(), BeamError> {
        Err(BeamError::UnknownParam {
            beam: "none",
            name: name.to_string(),
        })
    }

    fn clone_box(&self) -> Box<dyn Beam> {
        Box::new(*self)
    }
}

/// A frequency-independent two-dimensional Gaussian:
///
/// `sqrt(exp(-((x / xwidth)^2 + (y / ywidth)^2)))`
///
/// where `x` and `y` are direction cosines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian2DBeam {
    /// The width along the feed's direction \[direction cosine\].
    pub xwidth: f64,
    /// The width perpendicular to the feed's direction \[direction cosine\].
    pub ywidth: f64,
}

impl Gaussian2DBeam {
    pub fn new(xwidth: f64, ywidth: f64) -> Result<Gaussian2DBeam, BeamError> {
        for width in [xwidth, ywidth] {
            if width == 0.0 || !width.is_finite() {
                return Err(BeamError::BadWidth(width));
            }
        }
        Ok(Gaussian2DBeam { xwidth, ywidth })
    }
}

impl Beam for Gaussian2DBeam {
    fn response(&self, dir: TopoDir, freqs_hz: &[f64]) -> Array1<f64> {
        let x = dir.x / self.xwidth;
        let y = dir.y / self.ywidth;
        let resp = (-(x * x + y * y)).exp().sqrt();
        Array1::from_elem(freqs_hz.len(), resp)
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["bm_xwidth", "bm_ywidth"]
    }

    fn get_param(&self, name: &str) -> Option<f64> {
        match name {
            "bm_xwidth" => Some(self.xwidth),
            "bm_ywidth" => Some(self.ywidth),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<(), BeamError> {
        let width = match name {
            "bm_xwidth" => &mut self.xwidth,
            "bm_ywidth" => &mut self.ywidth,
            _ => {
                return Err(BeamError::UnknownParam {
                    beam: "gaussian",
                    name: name.to_string(),
                })
            }
        };
        if value == 0.0 || !value.is_finite() {
            return Err(BeamError::BadWidth(value));
        }
        *width = value;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Beam> {
        Box::new(*self)
    }
}

/// The beam description used in array layout files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeamConfig {
    /// No beam; all responses are 1.
    #[default]
    None,

    /// A [`Gaussian2DBeam`].
    Gaussian { xwidth: f64, ywidth: f64 },
}

/// Create a [`Beam`] trait object from its description.
pub fn create_beam_object(config: BeamConfig) -> Result<Box<dyn Beam>, BeamError> {
    match config {
        BeamConfig::None => Ok(Box::new(NoBeam)),
        BeamConfig::Gaussian { xwidth, ywidth } => {
            Ok(Box::new(Gaussian2DBeam::new(xwidth, ywidth)?))
        }
    }
}
