// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Coordinate helpers shared by the array and the source catalog.

use marlu::{AzEl, HADec, XyzGeodetic, UVW};
use serde::{Deserialize, Serialize};

/// A direction expressed as topocentric direction cosines: `x` points East, `y`
/// points North and `z` points to zenith. Beam responses are functions of
/// these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopoDir {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TopoDir {
    /// Zenith.
    pub const ZENITH: TopoDir = TopoDir {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub fn from_azel(azel: AzEl) -> TopoDir {
        let (s_az, c_az) = azel.az.sin_cos();
        let (s_el, c_el) = azel.el.sin_cos();
        TopoDir {
            x: c_el * s_az,
            y: c_el * c_az,
            z: s_el,
        }
    }
}

/// The [`UVW`] of a baseline \[metres\], given its [`XyzGeodetic`] difference
/// and the direction of interest.
///
/// This is Equation 4.1 of: Interferometry and Synthesis in Radio Astronomy,
/// Third Edition, Section 4: Geometrical Relationships, Polarimetry, and the
/// Measurement Equation.
pub(crate) fn baseline_uvw(xyz: XyzGeodetic, hadec: HADec) -> UVW {
    let (s_ha, c_ha) = hadec.ha.sin_cos();
    let (s_dec, c_dec) = hadec.dec.sin_cos();
    UVW {
        u: s_ha * xyz.x + c_ha * xyz.y,
        v: -s_dec * c_ha * xyz.x + s_dec * s_ha * xyz.y + c_dec * xyz.z,
        w: c_dec * c_ha * xyz.x - c_dec * s_ha * xyz.y + s_dec * xyz.z,
    }
}

/// The difference `b - a` of two [`XyzGeodetic`] positions.
#[inline]
pub(crate) fn xyz_diff(a: XyzGeodetic, b: XyzGeodetic) -> XyzGeodetic {
    XyzGeodetic {
        x: b.x - a.x,
        y: b.y - a.y,
        z: b.z - a.z,
    }
}
