// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A downhill-simplex (Nelder-Mead) minimiser.

use log::{debug, trace};
use ndarray::prelude::*;

use super::{FitError, Minimiser, Minimum, Objective};
use crate::constants::{DEFAULT_FTOL, DEFAULT_MAX_EVALS_PER_PARAM, DEFAULT_XTOL};

/// Reflection, expansion, contraction and shrink coefficients.
const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// The relative size of the initial simplex around the starting point.
const NONZERO_DELTA: f64 = 0.05;
/// The initial simplex step for parameters that start at zero.
const ZERO_DELTA: f64 = 0.00025;

/// Nelder-Mead minimisation without derivatives.
///
/// Convergence is declared when every vertex of the simplex is within `xtol`
/// of the best vertex (in every dimension) *and* every vertex's score is
/// within `ftol` of the best score.
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    pub xtol: f64,
    pub ftol: f64,

    /// The maximum number of objective-function evaluations. If this is
    /// `None`, [`DEFAULT_MAX_EVALS_PER_PARAM`] times the number of parameters
    /// is used.
    pub max_evals: Option<usize>,
}

impl Default for NelderMead {
    fn default() -> Self {
        NelderMead {
            xtol: DEFAULT_XTOL,
            ftol: DEFAULT_FTOL,
            max_evals: None,
        }
    }
}

/// Keeps count of evaluations. Non-finite scores are treated as infinitely
/// bad, so that the simplex moves away from them.
struct Counted<'a> {
    objective: Objective<'a>,
    num_evals: usize,
}

impl Counted<'_> {
    fn call(&mut self, x: ArrayView1<f64>) -> Result<f64, FitError> {
        self.num_evals += 1;
        let score = match x.as_slice() {
            Some(x) => (self.objective)(x)?,
            None => (self.objective)(&x.to_vec())?,
        };
        Ok(if score.is_finite() {
            score
        } else {
            f64::INFINITY
        })
    }
}

impl Minimiser for NelderMead {
    fn minimise(&mut self, objective: Objective, x0: &[f64]) -> Result<Minimum, FitError> {
        let n = x0.len();
        if n == 0 {
            return Err(FitError::NoParams);
        }
        let max_evals = self.max_evals.unwrap_or(DEFAULT_MAX_EVALS_PER_PARAM * n);
        let mut f = Counted {
            objective,
            num_evals: 0,
        };

        // Vertices are rows.
        let mut sim = Array2::zeros((n + 1, n));
        sim.row_mut(0).assign(&ArrayView1::from(x0));
        for k in 0..n {
            let mut row = sim.row_mut(k + 1);
            row.assign(&ArrayView1::from(x0));
            row[k] = if row[k] == 0.0 {
                ZERO_DELTA
            } else {
                row[k] * (1.0 + NONZERO_DELTA)
            };
        }
        let mut fsim = Array1::zeros(n + 1);
        for (row, fs) in sim.outer_iter().zip(fsim.iter_mut()) {
            *fs = f.call(row)?;
        }
        sort_simplex(&mut sim, &mut fsim);

        let mut converged = false;
        let mut num_iterations = 0;
        while f.num_evals < max_evals {
            let best = sim.row(0);
            let x_spread = sim
                .outer_iter()
                .skip(1)
                .map(|row| (&row - &best).fold(0.0, |acc: f64, d| acc.max(d.abs())))
                .fold(0.0, f64::max);
            let f_spread = fsim
                .iter()
                .skip(1)
                .map(|fs| (fs - fsim[0]).abs())
                .fold(0.0, f64::max);
            if x_spread <= self.xtol && f_spread <= self.ftol {
                converged = true;
                break;
            }
            num_iterations += 1;

            // The centroid of all but the worst vertex.
            let xbar = sim.slice(s![..n, ..]).sum_axis(Axis(0)) / n as f64;
            let worst = sim.row(n).to_owned();

            let xr = &xbar * (1.0 + RHO) - &worst * RHO;
            let fxr = f.call(xr.view())?;
            let mut shrink = false;

            if fxr < fsim[0] {
                let xe = &xbar * (1.0 + RHO * CHI) - &worst * (RHO * CHI);
                let fxe = f.call(xe.view())?;
                if fxe < fxr {
                    trace!("expand");
                    sim.row_mut(n).assign(&xe);
                    fsim[n] = fxe;
                } else {
                    trace!("reflect");
                    sim.row_mut(n).assign(&xr);
                    fsim[n] = fxr;
                }
            } else if fxr < fsim[n - 1] {
                trace!("reflect");
                sim.row_mut(n).assign(&xr);
                fsim[n] = fxr;
            } else if fxr < fsim[n] {
                let xc = &xbar * (1.0 + PSI * RHO) - &worst * (PSI * RHO);
                let fxc = f.call(xc.view())?;
                if fxc <= fxr {
                    trace!("contract outside");
                    sim.row_mut(n).assign(&xc);
                    fsim[n] = fxc;
                } else {
                    shrink = true;
                }
            } else {
                let xcc = &xbar * (1.0 - PSI) + &worst * PSI;
                let fxcc = f.call(xcc.view())?;
                if fxcc < fsim[n] {
                    trace!("contract inside");
                    sim.row_mut(n).assign(&xcc);
                    fsim[n] = fxcc;
                } else {
                    shrink = true;
                }
            }

            if shrink {
                trace!("shrink");
                let best = sim.row(0).to_owned();
                for j in 1..=n {
                    let shrunk = &best + &((&sim.row(j) - &best) * SIGMA);
                    sim.row_mut(j).assign(&shrunk);
                    fsim[j] = f.call(sim.row(j))?;
                }
            }

            sort_simplex(&mut sim, &mut fsim);
        }

        debug!(
            "Simplex finished after {num_iterations} iterations and {} evaluations (converged: {converged})",
            f.num_evals
        );
        Ok(Minimum {
            x: sim.row(0).to_vec(),
            score: fsim[0],
            num_evals: f.num_evals,
            converged,
        })
    }
}

/// Order the vertices of the simplex from best to worst score.
fn sort_simplex(sim: &mut Array2<f64>, fsim: &mut Array1<f64>) {
    let mut order: Vec<usize> = (0..fsim.len()).collect();
    order.sort_by(|&a, &b| fsim[a].total_cmp(&fsim[b]));
    *sim = sim.select(Axis(0), &order);
    *fsim = fsim.select(Axis(0), &order);
}
