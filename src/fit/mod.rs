// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fitting antenna and source parameters to measured visibilities.
//!
//! A [`CalibrationFit`] owns an [`AntennaArray`] and a [`SourceCatalog`] and
//! turns a flat vector of parameter values into a score: the sum of
//! |measured - simulated|² over all selected samples, normalised by the same
//! sum for the first vector it was asked to score. A [`Minimiser`] proposes
//! the vectors.

mod error;
mod simplex;

pub use error::FitError;
pub use simplex::NelderMead;

use hifitime::Epoch;
use log::{debug, info, warn};

use crate::{
    array::{AntennaArray, SimCache},
    c64,
    catalog::SourceCatalog,
    constants::DEFAULT_DECIMATION,
    params::{
        broadcast_shared, flatten, merge_params, print_params, reconstruct, KeyList,
        ParamSelection, Params,
    },
    pol::Pol,
    vis::{BaselineSelection, ChannelSelection, VisRecord, VisSource},
};

/// The function being minimised. It maps a parameter vector to a score.
pub type Objective<'a> = &'a mut dyn FnMut(&[f64]) -> Result<f64, FitError>;

/// Something that can find the minimum of an [`Objective`].
pub trait Minimiser {
    fn minimise(&mut self, objective: Objective, x0: &[f64]) -> Result<Minimum, FitError>;
}

/// The best point found by a [`Minimiser`].
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub score: f64,
    pub num_evals: usize,
    pub converged: bool,
}

/// What to fit, and against which samples.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSetup {
    /// The numbers of the antennas to fit. `None` means all antennas.
    pub ants: Option<Vec<usize>>,

    /// Parameters fit independently for every selected antenna.
    pub prms: Vec<String>,

    /// Parameters fit once and shared by every selected antenna. The first
    /// selected antenna holds the value.
    pub shared_prms: Vec<String>,

    /// Source parameters to fit.
    pub other_prms: ParamSelection,

    /// If set, passbands are resampled to this many knots before fitting.
    pub num_knots: Option<usize>,

    /// Only every Nth distinct timestamp is scored.
    pub decimate: usize,

    pub baselines: BaselineSelection,

    pub chans: ChannelSelection,

    /// Attenuate resolved sources in simulations?
    pub resolve_src: bool,
}

impl Default for FitSetup {
    fn default() -> Self {
        FitSetup {
            ants: None,
            prms: vec![],
            shared_prms: vec![],
            other_prms: ParamSelection::new(),
            num_knots: None,
            decimate: DEFAULT_DECIMATION,
            baselines: BaselineSelection::default(),
            chans: ChannelSelection::default(),
            resolve_src: false,
        }
    }
}

/// The outcome of [`CalibrationFit::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// The best parameters. These have been applied to the array and
    /// catalog.
    pub params: Params,

    /// The normalised score of the best parameters.
    pub score: f64,

    /// The raw score of the starting parameters.
    pub base_score: f64,

    pub num_evals: usize,

    pub converged: bool,
}

pub struct CalibrationFit<'a> {
    array: AntennaArray,
    catalog: SourceCatalog,

    /// Datasets with a usable polarisation.
    datasets: Vec<(&'a dyn VisSource, Pol)>,

    baselines: BaselineSelection,
    decimate: usize,
    resolve_src: bool,

    /// The labels of the fitted antennas. The first is the authority for
    /// shared parameters.
    units: Vec<String>,

    /// Shared parameter names, with shorthands (e.g. "passband") expanded.
    shared_prms: Vec<String>,

    start: Vec<f64>,
    key_list: KeyList,
    num_samples: usize,

    base_score: Option<f64>,
    num_evals: usize,
    cache: SimCache,
}

impl<'a> CalibrationFit<'a> {
    /// Set up a fit. This fails if the set-up can't produce a meaningful
    /// score, e.g. when no samples survive the baseline, channel and
    /// timestamp selections.
    pub fn new(
        mut array: AntennaArray,
        catalog: SourceCatalog,
        datasets: &[&'a dyn VisSource],
        setup: FitSetup,
    ) -> Result<CalibrationFit<'a>, FitError> {
        if setup.decimate == 0 {
            return Err(FitError::BadDecimation);
        }
        if datasets.is_empty() {
            return Err(FitError::NoDatasets);
        }

        let num_chans = array.freqs_hz().len();
        for (i, vis) in datasets.iter().enumerate() {
            let got = vis.meta().num_chans;
            if got != num_chans {
                return Err(FitError::ChannelMismatch {
                    dataset: i,
                    got,
                    expected: num_chans,
                });
            }
        }
        let chans = setup.chans.resolve(num_chans)?;
        array.select_chans(&chans)?;
        if let Some(num_knots) = setup.num_knots.filter(|&n| n > 0) {
            debug!("Resampling passbands to {num_knots} knots");
            array.resample_passbands(num_knots);
        }

        let units: Vec<String> = array
            .antennas()
            .iter()
            .filter(|ant| match &setup.ants {
                Some(ants) => ants.contains(&ant.number),
                None => true,
            })
            .map(|ant| ant.label())
            .collect();
        if units.is_empty() {
            return Err(FitError::NoAntennas(setup.ants.unwrap_or_default()));
        }

        // Shared parameters are only requested from the first unit.
        let mut selection = ParamSelection::new();
        for (i, unit) in units.iter().enumerate() {
            let mut names = setup.prms.clone();
            if i == 0 {
                names.extend(setup.shared_prms.iter().cloned());
            }
            if !names.is_empty() {
                selection.insert(unit.clone(), names);
            }
        }
        let mut start_params = array.get_params(&selection)?;
        merge_params(&mut start_params, catalog.get_params(&setup.other_prms)?);
        let shared_prms: Vec<String> = if setup.shared_prms.is_empty() {
            vec![]
        } else {
            let selection =
                ParamSelection::from([(units[0].clone(), setup.shared_prms.clone())]);
            array
                .get_params(&selection)?
                .remove(&units[0])
                .unwrap_or_default()
                .into_keys()
                .collect()
        };
        let (start, key_list) = flatten(&start_params);
        if start.is_empty() {
            return Err(FitError::NoParams);
        }

        let datasets: Vec<(&dyn VisSource, Pol)> = datasets
            .iter()
            .enumerate()
            .filter_map(|(i, vis)| match vis.meta().pol() {
                Some(pol) => Some((*vis, pol)),
                None => {
                    warn!("Ignoring dataset {i}; its polarisation is unknown");
                    None
                }
            })
            .collect();

        let mut fit = CalibrationFit {
            array,
            catalog,
            datasets,
            baselines: setup.baselines,
            decimate: setup.decimate,
            resolve_src: setup.resolve_src,
            units,
            shared_prms,
            start,
            key_list,
            num_samples: 0,
            base_score: None,
            num_evals: 0,
            cache: SimCache::default(),
        };
        fit.num_samples = fit.count_samples()?;
        if fit.num_samples == 0 {
            return Err(FitError::NoSamples);
        }
        debug!(
            "Fitting {} values of {} units against {} samples",
            fit.start.len(),
            fit.key_list.units.len(),
            fit.num_samples
        );
        Ok(fit)
    }

    /// Score a parameter vector. The first call of a fit always yields 1.0;
    /// later calls are relative to the first.
    pub fn evaluate(&mut self, x: &[f64]) -> Result<f64, FitError> {
        self.num_evals += 1;
        self.apply(x)?;
        let score = self.residual_sum()?;
        let base_score = match self.base_score {
            Some(b) => b,
            None => {
                if score == 0.0 {
                    return Err(FitError::ZeroBaseScore);
                }
                self.base_score = Some(score);
                score
            }
        };
        let normalised = score / base_score;
        info!(
            "Evaluation {:>4}: score {normalised:.8} (base: {base_score:.6e})",
            self.num_evals
        );
        Ok(normalised)
    }

    /// Minimise the score, then apply the best parameters to the array and
    /// catalog.
    pub fn run(&mut self, minimiser: &mut dyn Minimiser) -> Result<FitResult, FitError> {
        let x0 = self.start.clone();
        let minimum = minimiser.minimise(&mut |x: &[f64]| self.evaluate(x), &x0)?;
        if !minimum.converged {
            warn!(
                "The fit did not converge after {} evaluations",
                minimum.num_evals
            );
        }
        let params = self.apply(&minimum.x)?;
        info!(
            "Best score {:.8} after {} evaluations",
            minimum.score, minimum.num_evals
        );
        Ok(FitResult {
            params,
            score: minimum.score,
            base_score: self.base_score.unwrap_or_default(),
            num_evals: minimum.num_evals,
            converged: minimum.converged,
        })
    }

    /// Reconstruct the parameters in `x`, share the shared ones and apply
    /// them all.
    fn apply(&mut self, x: &[f64]) -> Result<Params, FitError> {
        let mut params = reconstruct(x, &self.key_list)?;
        broadcast_shared(&mut params, &self.units, &self.shared_prms);
        print_params(&params);
        self.array.set_params(&params)?;
        self.catalog.set_params(&params)?;
        Ok(params)
    }

    /// The sum of |measured - simulated|² over all scored samples with the
    /// current parameters.
    fn residual_sum(&mut self) -> Result<f64, FitError> {
        let mut decimator = Decimator::new(self.decimate);
        let mut score = 0.0;
        for &(vis, pol) in &self.datasets {
            for record in vis.read(&self.baselines) {
                let record = record?;
                match decimator.step(record.timestamp) {
                    Step::Skip => continue,
                    Step::NewTime => {
                        self.array.set_time(record.timestamp);
                        self.catalog.compute(&self.array);
                        let vecs = self.catalog.get_vecs()?;
                        self.cache.refresh(&self.array, &vecs);
                    }
                    Step::SameTime => (),
                }

                let sim = self.array.sim(
                    &self.cache,
                    record.ant1,
                    record.ant2,
                    pol,
                    self.resolve_src,
                )?;
                for (i_chan, d) in unflagged(&record, self.array.active_chans()) {
                    score += (d - sim[i_chan]).norm_sqr();
                }
            }
        }
        Ok(score)
    }

    fn count_samples(&self) -> Result<usize, FitError> {
        let mut decimator = Decimator::new(self.decimate);
        let mut num_samples = 0;
        for &(vis, _) in &self.datasets {
            for record in vis.read(&self.baselines) {
                let record = record?;
                if decimator.step(record.timestamp) != Step::Skip {
                    num_samples += unflagged(&record, self.array.active_chans()).count();
                }
            }
        }
        Ok(num_samples)
    }

    /// The starting parameters.
    pub fn start_params(&self) -> Result<Params, FitError> {
        Ok(reconstruct(&self.start, &self.key_list)?)
    }

    pub fn key_list(&self) -> &KeyList {
        &self.key_list
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// The number of (unflagged) channel samples contributing to each score.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// The raw score of the first evaluation, if there has been one.
    pub fn base_score(&self) -> Option<f64> {
        self.base_score
    }

    pub fn array(&self) -> &AntennaArray {
        &self.array
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    /// Give back the array and catalog, with whatever parameters were last
    /// applied.
    pub fn into_parts(self) -> (AntennaArray, SourceCatalog) {
        (self.array, self.catalog)
    }
}

/// The unflagged active channels of a record, as (index into the active
/// channels, measured value).
fn unflagged<'r>(
    record: &'r VisRecord,
    active_chans: &'r [usize],
) -> impl Iterator<Item = (usize, c64)> + 'r {
    active_chans
        .iter()
        .enumerate()
        .filter_map(|(i_chan, &chan)| {
            match (record.data.get(chan), record.flags.get(chan)) {
                (Some(d), Some(false)) => Some((i_chan, *d)),
                _ => None,
            }
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The first sample of a scored timestamp.
    NewTime,
    /// Another sample of the current scored timestamp.
    SameTime,
    Skip,
}

/// Tracks distinct timestamps as samples stream past, and decides which
/// timestamps are scored. The first distinct timestamp is always scored, then
/// every `factor`th after it.
struct Decimator {
    factor: usize,
    cur_time: Option<Epoch>,
    num_times: usize,
}

impl Decimator {
    fn new(factor: usize) -> Decimator {
        Decimator {
            factor,
            cur_time: None,
            num_times: 0,
        }
    }

    fn step(&mut self, timestamp: Epoch) -> Step {
        let new = self.cur_time != Some(timestamp);
        if new {
            self.cur_time = Some(timestamp);
            self.num_times += 1;
        }
        let scored = (self.num_times - 1) % self.factor == 0;
        match (new, scored) {
            (_, false) => Step::Skip,
            (true, true) => Step::NewTime,
            (false, true) => Step::SameTime,
        }
    }
}
