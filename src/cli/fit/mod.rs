// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fit antenna and source parameters against measured visibilities.


use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use hifitime::Duration;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{
    display_warnings, read_arg_file, split_list, InfoPrinter, ModelArgs, Warn, ARG_FILE_HELP,
};
use crate::{
    array::AntennaArray,
    catalog::SourceCatalog,
    constants::{DEFAULT_DECIMATION, DEFAULT_FTOL, DEFAULT_XTOL},
    fit::{CalibrationFit, FitSetup, NelderMead},
    params::{parse_other_params, Params},
    vis::{BaselineSelection, ChannelSelection, MemoryVis, VisSource},
    PolcalError,
};

lazy_static::lazy_static! {
    static ref DECIMATE_HELP: String =
        format!("Only use every Nth distinct timestamp when scoring. Default: {DEFAULT_DECIMATION}");

    static ref XTOL_HELP: String =
        format!("Stop when the simplex's vertices are all this close to the best vertex. Default: {DEFAULT_XTOL:e}");

    static ref FTOL_HELP: String =
        format!("Stop when the simplex's scores are all this close to the best score. Default: {DEFAULT_FTOL:e}");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct FitCliArgs {
    /// Paths to the visibility files to fit against.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT DATA")]
    pub(super) data: Option<Vec<PathBuf>>,

    /// Which baselines to use. Options are "all", "auto", "cross", a list of
    /// pairs (e.g. "0_1,2_3") or a list of antennas (e.g. "0,4"). Default:
    /// cross
    #[clap(long, help_heading = "INPUT DATA")]
    pub(super) baselines: Option<String>,

    /// Which channels to use. Options are "all", a list (e.g. "3,4,10") or a
    /// range (e.g. "10_20", which doesn't include 20). Default: all
    #[clap(long, help_heading = "INPUT DATA")]
    pub(super) chans: Option<String>,

    #[clap(short = 'x', long, help = DECIMATE_HELP.as_str(), help_heading = "INPUT DATA")]
    pub(super) decimate: Option<usize>,

    /// Comma-separated numbers of the antennas to fit, or "*" for all of
    /// them. Default: *
    #[clap(short, long, help_heading = "FITTING")]
    pub(super) ants: Option<String>,

    /// Comma-separated parameters to fit independently for each antenna, e.g.
    /// "amp,passband,bm_xwidth".
    #[clap(short, long, help_heading = "FITTING")]
    pub(super) prms: Option<String>,

    /// Comma-separated parameters to fit once for all antennas. The first
    /// antenna's value is used for the others.
    #[clap(short, long, help_heading = "FITTING")]
    pub(super) shared_prms: Option<String>,

    /// Comma-separated source=parameter pairs to fit, e.g. "cyg=jys,cyg=index".
    #[clap(short, long, help_heading = "FITTING")]
    pub(super) other_prms: Option<String>,

    /// The number of points along each passband that are fit; the passband is
    /// interpolated between them. The default is to keep the layout's
    /// passbands as they are.
    #[clap(long, help_heading = "FITTING")]
    pub(super) num_knots: Option<usize>,

    /// Attenuate sources by their resolution when simulating.
    #[clap(long, help_heading = "FITTING")]
    #[serde(default)]
    pub(super) resolve_src: bool,

    /// The maximum number of times the score is evaluated. The default scales
    /// with the number of fitted values.
    #[clap(long, help_heading = "MINIMISER")]
    pub(super) max_evals: Option<usize>,

    #[clap(long, help = XTOL_HELP.as_str(), help_heading = "MINIMISER")]
    pub(super) xtol: Option<f64>,

    #[clap(long, help = FTOL_HELP.as_str(), help_heading = "MINIMISER")]
    pub(super) ftol: Option<f64>,

    /// Write the fitted parameters to this file. Supported formats: toml,
    /// json, yaml
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) output_params: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct FitArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "model")]
    #[serde(default)]
    pub(super) model_args: ModelArgs,

    #[clap(flatten)]
    #[serde(rename = "fit")]
    #[serde(default)]
    pub(super) fit_args: FitCliArgs,
}

/// Everything needed to run a fit.
pub(super) struct FitParams {
    pub(super) array: AntennaArray,
    pub(super) catalog: SourceCatalog,
    pub(super) datasets: Vec<MemoryVis>,
    pub(super) setup: FitSetup,
    pub(super) minimiser: NelderMead,
    pub(super) output_params: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub(super) enum FitArgsError {
    #[error("No visibility files were supplied")]
    NoData,

    #[error("Couldn't parse antenna '{0}' as a number")]
    BadAnt(String),

    #[error("The output parameters file '{}' doesn't have a recognised extension (toml, json, yaml)", .0.display())]
    OutputParamsFileType(PathBuf),
}

impl FitArgs {
    /// Fill in anything not given on the command line from the arguments file,
    /// if there is one.
    pub(super) fn merge(self) -> Result<FitArgs, PolcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Destructure so that no file argument is forgotten.
            let FitArgs {
                args_file: _,
                model_args,
                fit_args,
            } = read_arg_file::<FitArgs>(&arg_file)?;

            Ok(FitArgs {
                args_file: None,
                model_args: cli_args.model_args.merge(model_args),
                fit_args: cli_args.fit_args.merge(fit_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<FitParams, PolcalError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let FitArgs {
            args_file: _,
            model_args,
            fit_args:
                FitCliArgs {
                    data,
                    baselines,
                    chans,
                    decimate,
                    ants,
                    prms,
                    shared_prms,
                    other_prms,
                    num_knots,
                    resolve_src,
                    max_evals,
                    xtol,
                    ftol,
                    output_params,
                },
        } = self;

        let model = model_args.parse()?;

        let data = match data {
            Some(d) if !d.is_empty() => d,
            _ => return Err(FitArgsError::NoData.into()),
        };
        let mut data_printer = InfoPrinter::new("Input data".into());
        let mut datasets = Vec::with_capacity(data.len());
        for path in &data {
            let vis = MemoryVis::from_json(path)?;
            let meta = vis.meta();
            data_printer.push_block(vec![
                format!("{}", path.display()).into(),
                format!(
                    "{} records, {} channels from {:.3} MHz, pol code {}",
                    vis.records().len(),
                    meta.num_chans,
                    meta.start_freq_hz / 1e6,
                    meta.pol_code
                )
                .into(),
            ]);
            datasets.push(vis);
        }
        data_printer.display();

        // The first dataset decides the channel frequencies.
        let freqs_hz = datasets[0].meta().freqs_hz();
        for (path, vis) in data.iter().zip(&datasets).skip(1) {
            if vis.meta().freqs_hz() != freqs_hz {
                format!(
                    "The channel frequencies of {} differ from those of {}; using the latter",
                    path.display(),
                    data[0].display()
                )
                .warn();
            }
        }
        let mut array = model.layout.build(freqs_hz)?;
        array.set_dut1(Duration::from_seconds(model.dut1));

        let ants = match ants.as_deref().map(str::trim) {
            None | Some("*") => None,
            Some(s) => Some(
                split_list(s)
                    .into_iter()
                    .map(|a| a.parse().map_err(|_| FitArgsError::BadAnt(a)))
                    .collect::<Result<Vec<usize>, _>>()?,
            ),
        };
        let setup = FitSetup {
            ants,
            prms: prms.as_deref().map(split_list).unwrap_or_default(),
            shared_prms: shared_prms.as_deref().map(split_list).unwrap_or_default(),
            other_prms: match other_prms {
                Some(s) => parse_other_params(&s)?,
                None => Default::default(),
            },
            num_knots,
            decimate: decimate.unwrap_or(DEFAULT_DECIMATION),
            baselines: match baselines {
                Some(s) => s.parse()?,
                None => BaselineSelection::default(),
            },
            chans: match chans {
                Some(s) => s.parse()?,
                None => ChannelSelection::default(),
            },
            resolve_src,
        };
        let minimiser = NelderMead {
            xtol: xtol.unwrap_or(DEFAULT_XTOL),
            ftol: ftol.unwrap_or(DEFAULT_FTOL),
            max_evals,
        };

        let mut fit_printer = InfoPrinter::new("Fit set-up".into());
        fit_printer.push_block(vec![
            format!(
                "Antennas: {}",
                match &setup.ants {
                    Some(ants) => ants.iter().join(", "),
                    None => "all".to_string(),
                }
            )
            .into(),
            format!("Independent parameters: {}", setup.prms.join(", ")).into(),
            format!("Shared parameters: {}", setup.shared_prms.join(", ")).into(),
            format!(
                "Source parameters: {}",
                setup
                    .other_prms
                    .iter()
                    .map(|(src, prms)| format!("{src}={}", prms.join("/")))
                    .join(", ")
            )
            .into(),
        ]);
        fit_printer.push_block(vec![
            format!("Baselines: {}", setup.baselines).into(),
            format!("Channels: {}", setup.chans).into(),
            format!("Decimation: {}", setup.decimate).into(),
        ]);
        fit_printer.display();

        if let Some(path) = &output_params {
            params_file_type(path)?;
        }

        display_warnings();

        Ok(FitParams {
            array,
            catalog: model.catalog,
            datasets,
            setup,
            minimiser,
            output_params,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), PolcalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()
    }
}

impl FitParams {
    pub(super) fn run(self) -> Result<(), PolcalError> {
        let FitParams {
            array,
            catalog,
            datasets,
            setup,
            mut minimiser,
            output_params,
        } = self;

        let datasets: Vec<&dyn VisSource> = datasets.iter().map(|d| d as &dyn VisSource).collect();
        let mut fit = CalibrationFit::new(array, catalog, &datasets, setup)?;
        info!(
            "Fitting {} values against {} samples",
            fit.key_list().num_values(),
            fit.num_samples()
        );
        let result = fit.run(&mut minimiser)?;

        let mut printer = InfoPrinter::new("Fit results".into());
        printer.push_block(vec![
            format!("Score: {:.8} (base: {:.6e})", result.score, result.base_score).into(),
            format!(
                "{} evaluations, {}",
                result.num_evals,
                if result.converged {
                    "converged"
                } else {
                    "did not converge"
                }
            )
            .into(),
        ]);
        printer.push_block(
            result
                .params
                .iter()
                .map(|(unit, prms)| {
                    format!(
                        "{unit}: {}",
                        prms.iter()
                            .map(|(name, value)| format!("{name}={value}"))
                            .join(", ")
                    )
                    .into()
                })
                .collect(),
        );
        printer.display();

        if let Some(path) = output_params {
            write_params(&path, &result.params)?;
            info!("Wrote the fitted parameters to {}", path.display());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamsFileType {
    Toml,
    Json,
    Yaml,
}

fn params_file_type(path: &Path) -> Result<ParamsFileType, FitArgsError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("toml") => Ok(ParamsFileType::Toml),
        Some("json") => Ok(ParamsFileType::Json),
        Some("yaml" | "yml") => Ok(ParamsFileType::Yaml),
        _ => Err(FitArgsError::OutputParamsFileType(path.to_path_buf())),
    }
}

fn write_params(path: &Path, params: &Params) -> Result<(), PolcalError> {
    let s = match params_file_type(path)? {
        ParamsFileType::Toml => toml::to_string(params).map_err(|e| e.to_string()),
        ParamsFileType::Json => serde_json::to_string_pretty(params).map_err(|e| e.to_string()),
        ParamsFileType::Yaml => serde_yaml::to_string(params).map_err(|e| e.to_string()),
    }
    .map_err(PolcalError::Generic)?;
    let mut f = BufWriter::new(File::create(path)?);
    f.write_all(s.as_bytes())?;
    f.flush()?;
    Ok(())
}

impl FitCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            data: self.data.or(other.data),
            baselines: self.baselines.or(other.baselines),
            chans: self.chans.or(other.chans),
            decimate: self.decimate.or(other.decimate),
            ants: self.ants.or(other.ants),
            prms: self.prms.or(other.prms),
            shared_prms: self.shared_prms.or(other.shared_prms),
            other_prms: self.other_prms.or(other.other_prms),
            num_knots: self.num_knots.or(other.num_knots),
            resolve_src: self.resolve_src || other.resolve_src,
            max_evals: self.max_evals.or(other.max_evals),
            xtol: self.xtol.or(other.xtol),
            ftol: self.ftol.or(other.ftol),
            output_params: self.output_params.or(other.output_params),
        }
    }
}
