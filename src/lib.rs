// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Visibility simulation for dual-polarisation antenna arrays, and the
amplitude/passband calibration fitter built on top of it.
 */

pub mod antenna;
pub mod array;
pub mod beam;
pub mod catalog;
mod cli;
pub mod constants;
pub mod coord;
pub mod fit;
pub(crate) mod math;
pub mod params;
pub mod pol;
pub mod vis;

// Re-exports.
pub use antenna::Antenna;
pub use array::{AntennaArray, ArrayError, SimCache};
pub use catalog::{RadioSource, SourceCatalog};
pub use coord::TopoDir;
pub use cli::{Polcal, PolcalError};
pub use fit::{CalibrationFit, FitError, FitSetup};
pub use params::{flatten, reconstruct, KeyList, ParamValue, Params};
pub use pol::{Feed, Pol};
pub use vis::{MemoryVis, VisSource};

// External re-exports.
pub use marlu::c64;
