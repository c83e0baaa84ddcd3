// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate visibilities of an array layout observing a source catalog.


use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use hifitime::{Duration, Epoch};
use log::{debug, info, trace};
use marlu::HADec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, read_arg_file, InfoPrinter, ModelArgs, ARG_FILE_HELP};
use crate::{
    array::AntennaArray,
    catalog::SourceCatalog,
    coord::{baseline_uvw, xyz_diff},
    pol::Pol,
    vis::{MemoryVis, VisMeta, VisRecord},
    PolcalError,
};

const DEFAULT_OUTPUT_VIS_FILENAME: &str = "polcal_simulation.json";
const DEFAULT_NUM_CHANS: usize = 16;
const DEFAULT_START_FREQ_MHZ: f64 = 100.0;
const DEFAULT_CHAN_WIDTH_KHZ: f64 = 1000.0;
const DEFAULT_NUM_TIMESTEPS: usize = 10;
const DEFAULT_TIME_RES_SECONDS: f64 = 8.0;
const DEFAULT_START_GPS: f64 = 1090008640.0;
const DEFAULT_POL: &str = "xx";

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("Path to the output visibilities (json). Default: {DEFAULT_OUTPUT_VIS_FILENAME}");

    static ref NUM_CHANS_HELP: String =
        format!("The number of frequency channels. Default: {DEFAULT_NUM_CHANS}");

    static ref START_FREQ_HELP: String =
        format!("The centre frequency of the first channel [MHz]. Default: {DEFAULT_START_FREQ_MHZ}");

    static ref CHAN_WIDTH_HELP: String =
        format!("The channel width [kHz]. Default: {DEFAULT_CHAN_WIDTH_KHZ}");

    static ref NUM_TIMESTEPS_HELP: String =
        format!("The number of timesteps. Default: {DEFAULT_NUM_TIMESTEPS}");

    static ref TIME_RES_HELP: String =
        format!("The time between timesteps [seconds]. Default: {DEFAULT_TIME_RES_SECONDS}");

    static ref START_GPS_HELP: String =
        format!("The GPS time of the first timestep. Default: {DEFAULT_START_GPS}");

    static ref POL_HELP: String =
        format!("The instrumental polarisation to simulate (xx, yy, xy or yx). Default: {DEFAULT_POL}");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct SimulateCliArgs {
    #[clap(short = 'o', long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    #[clap(long, help = NUM_CHANS_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) num_chans: Option<usize>,

    #[clap(long, help = START_FREQ_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) start_freq: Option<f64>,

    #[clap(long, help = CHAN_WIDTH_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) chan_width: Option<f64>,

    #[clap(short = 't', long, help = NUM_TIMESTEPS_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) num_timesteps: Option<usize>,

    #[clap(long, help = TIME_RES_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) time_res: Option<f64>,

    #[clap(long, help = START_GPS_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) start_gps: Option<f64>,

    #[clap(long, help = POL_HELP.as_str(), help_heading = "OBSERVATION")]
    pub(super) pol: Option<String>,

    /// Attenuate sources by their resolution.
    #[clap(long, help_heading = "MODEL")]
    #[serde(default)]
    pub(super) resolve_src: bool,

    /// Don't write auto-correlations.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) no_autos: bool,
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct SimulateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "model")]
    #[serde(default)]
    pub(super) model_args: ModelArgs,

    #[clap(flatten)]
    #[serde(rename = "simulate")]
    #[serde(default)]
    pub(super) simulate_args: SimulateCliArgs,
}

/// Parameters needed to do a simulation.
struct SimulateParams {
    array: AntennaArray,
    catalog: SourceCatalog,
    timestamps: Vec<Epoch>,
    meta: VisMeta,
    pol: Pol,
    resolve_src: bool,
    autos: bool,
    output: PathBuf,
}

#[derive(Error, Debug)]
pub(super) enum SimulateArgsError {
    #[error("Number of channels cannot be 0")]
    ZeroChannels,

    #[error("The channel width must be positive; got {0} kHz")]
    BadChannelWidth(f64),

    #[error("The start frequency must be positive; got {0} MHz")]
    BadStartFreq(f64),

    #[error("Number of timesteps cannot be 0")]
    ZeroTimeSteps,

    #[error("The time resolution must be positive; got {0} s")]
    BadTimeRes(f64),

    #[error("'{0}' is not a polarisation")]
    BadPol(String),

    #[error("Can't simulate the Stokes polarisation '{0}'; use an instrumental one (xx, yy, xy, yx)")]
    StokesPol(Pol),
}

impl SimulateArgs {
    /// Fill in anything not given on the command line from the arguments file,
    /// if there is one.
    pub(super) fn merge(self) -> Result<SimulateArgs, PolcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let SimulateArgs {
                args_file: _,
                model_args,
                simulate_args,
            } = read_arg_file::<SimulateArgs>(&arg_file)?;

            Ok(SimulateArgs {
                args_file: None,
                model_args: cli_args.model_args.merge(model_args),
                simulate_args: cli_args.simulate_args.merge(simulate_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SimulateParams, PolcalError> {
        debug!("{:#?}", self);

        let SimulateArgs {
            args_file: _,
            model_args,
            simulate_args:
                SimulateCliArgs {
                    output,
                    num_chans,
                    start_freq,
                    chan_width,
                    num_timesteps,
                    time_res,
                    start_gps,
                    pol,
                    resolve_src,
                    no_autos,
                },
        } = self;

        let model = model_args.parse()?;

        let num_chans = num_chans.unwrap_or(DEFAULT_NUM_CHANS);
        if num_chans == 0 {
            return Err(SimulateArgsError::ZeroChannels.into());
        }
        let start_freq = start_freq.unwrap_or(DEFAULT_START_FREQ_MHZ);
        if !(start_freq > 0.0) {
            return Err(SimulateArgsError::BadStartFreq(start_freq).into());
        }
        let chan_width = chan_width.unwrap_or(DEFAULT_CHAN_WIDTH_KHZ);
        if !(chan_width > 0.0) {
            return Err(SimulateArgsError::BadChannelWidth(chan_width).into());
        }
        let num_timesteps = num_timesteps.unwrap_or(DEFAULT_NUM_TIMESTEPS);
        if num_timesteps == 0 {
            return Err(SimulateArgsError::ZeroTimeSteps.into());
        }
        let time_res = time_res.unwrap_or(DEFAULT_TIME_RES_SECONDS);
        if !(time_res > 0.0) {
            return Err(SimulateArgsError::BadTimeRes(time_res).into());
        }
        let pol = pol.unwrap_or_else(|| DEFAULT_POL.to_string());
        let pol = Pol::from_str(pol.trim()).map_err(|_| SimulateArgsError::BadPol(pol.clone()))?;
        if pol.feeds().is_none() {
            return Err(SimulateArgsError::StokesPol(pol).into());
        }

        let start = Epoch::from_gpst_seconds(start_gps.unwrap_or(DEFAULT_START_GPS));
        let timestamps: Vec<Epoch> = (0..num_timesteps)
            .map(|i| start + Duration::from_seconds(i as f64 * time_res))
            .collect();

        let meta = VisMeta {
            num_chans,
            start_freq_hz: start_freq * 1e6,
            chan_width_hz: chan_width * 1e3,
            num_ants: model.layout.antennas.len(),
            pol_code: pol.code(),
        };
        let mut array = model.layout.build(meta.freqs_hz())?;
        array.set_dut1(Duration::from_seconds(model.dut1));
        let num_ants = array.antenna_numbers().len();

        let mut printer = InfoPrinter::new("Simulation set-up".into());
        printer.push_block(vec![
            format!(
                "{num_chans} channels from {start_freq} MHz, {chan_width} kHz apart"
            )
            .into(),
            format!(
                "{num_timesteps} timesteps from GPS {:.2}, {time_res} s apart",
                start.to_gpst_seconds()
            )
            .into(),
            format!("Polarisation: {pol}").into(),
        ]);
        printer.push_block(vec![
            format!(
                "{} baselines{}",
                if no_autos {
                    num_ants * (num_ants.saturating_sub(1)) / 2
                } else {
                    num_ants * (num_ants + 1) / 2
                },
                if no_autos { " (no autos)" } else { "" }
            )
            .into(),
            format!("Resolving sources: {resolve_src}").into(),
        ]);
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_VIS_FILENAME));
        printer.push_line(format!("Output: {}", output.display()).into());
        printer.display();

        display_warnings();

        Ok(SimulateParams {
            array,
            catalog: model.catalog,
            timestamps,
            meta: VisMeta { num_ants, ..meta },
            pol,
            resolve_src,
            autos: !no_autos,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), PolcalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let mut params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let vis = params.simulate()?;
        vis.to_json(&params.output)?;
        info!("Wrote simulated visibilities to {}", params.output.display());
        Ok(())
    }
}

impl SimulateParams {
    fn simulate(&mut self) -> Result<MemoryVis, PolcalError> {
        let SimulateParams {
            array,
            catalog,
            timestamps,
            meta,
            pol,
            resolve_src,
            autos,
            output: _,
        } = self;

        let numbers = array.antenna_numbers();
        let (feed1, feed2) = match pol.feeds() {
            Some(feeds) => feeds,
            None => return Err(SimulateArgsError::StokesPol(*pol).into()),
        };
        let mut vis = MemoryVis::new(meta.clone())?;
        for (i_time, &timestamp) in timestamps.iter().enumerate() {
            debug!("Simulating timestep {i_time}");
            array.set_time(timestamp);
            catalog.compute(&array);
            let vecs = catalog.get_vecs()?;
            let cache = array.sim_cache(&vecs);
            let zenith = HADec::from_radians(0.0, array.latitude_rad());

            for (i_ant1, &ant1) in numbers.iter().enumerate() {
                for &ant2 in &numbers[i_ant1..] {
                    if ant1 == ant2 && !*autos {
                        continue;
                    }
                    let data = array.sim(&cache, ant1, ant2, *pol, *resolve_src)?;
                    let pos1 = array.antenna(ant1, Some(feed1))?.position;
                    let pos2 = array.antenna(ant2, Some(feed2))?.position;
                    vis.push(VisRecord {
                        uvw: baseline_uvw(xyz_diff(pos1, pos2), zenith),
                        timestamp,
                        ant1,
                        ant2,
                        flags: vec![false; data.len()],
                        data: data.to_vec(),
                    })?;
                }
            }
        }
        Ok(vis)
    }
}

impl SimulateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            output: self.output.or(other.output),
            num_chans: self.num_chans.or(other.num_chans),
            start_freq: self.start_freq.or(other.start_freq),
            chan_width: self.chan_width.or(other.chan_width),
            num_timesteps: self.num_timesteps.or(other.num_timesteps),
            time_res: self.time_res.or(other.time_res),
            start_gps: self.start_gps.or(other.start_gps),
            pol: self.pol.or(other.pol),
            resolve_src: self.resolve_src || other.resolve_src,
            no_autos: self.no_autos || other.no_autos,
        }
    }
}
