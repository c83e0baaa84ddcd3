// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The `polcal` command line. Each subcommand has its own module.
//!
//! Every argument is either optional or a boolean with `#[serde(default)]`, so
//! that any subset of them can come from an arguments file.
//!
//! Only `Polcal`, `Polcal::run` and `PolcalError` are public.

mod common;
mod error;
mod fit;
mod simulate;
#[cfg(test)]
mod tests;

pub use error::PolcalError;

use std::path::PathBuf;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

use common::InfoPrinter;

// GIT_COMMIT_HASH_SHORT, RUSTC_VERSION etc.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Simulate and calibrate the visibilities of dual-polarisation antenna arrays"
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct Polcal {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Print more information; -v for debug messages, -vv for trace messages
    /// and -vvv to also show where each message came from.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    /// Check the arguments and report the set-up, but don't simulate or fit
    /// anything.
    #[clap(long)]
    #[clap(global = true)]
    dry_run: bool,

    /// Write the merged arguments to this TOML file. It can be given back to
    /// polcal as an arguments file.
    #[clap(long)]
    #[clap(global = true)]
    save_toml: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(alias = "calibrate")]
    #[clap(about = "Fit antenna and source parameters to measured visibilities.")]
    Fit(fit::FitArgs),

    #[clap(alias = "simulate-vis")]
    #[clap(about = "Simulate the visibilities of an array observing a source catalog.")]
    Simulate(simulate::SimulateArgs),
}

impl Polcal {
    pub fn run(self) -> Result<(), PolcalError> {
        let GlobalArgs {
            verbosity,
            dry_run,
            save_toml,
        } = self.global_opts;
        setup_logging(verbosity).map_err(|e| PolcalError::Generic(e.to_string()))?;

        let sub_command = match &self.command {
            Command::Fit(_) => "fit",
            Command::Simulate(_) => "simulate",
        };
        info!("polcal {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        macro_rules! merge_save_run {
            ($args:expr) => {{
                let args = $args.merge()?;
                if let Some(toml) = save_toml {
                    use std::{
                        fs::File,
                        io::{BufWriter, Write},
                    };

                    let mut f = BufWriter::new(File::create(toml)?);
                    let toml_str = toml::to_string(&args)
                        .map_err(|e| PolcalError::ArgFile(e.to_string()))?;
                    f.write_all(toml_str.as_bytes())?;
                    f.flush()?;
                }
                args.run(dry_run)?;
            }};
        }

        match self.command {
            Command::Fit(args) => merge_save_run!(args),
            Command::Simulate(args) => merge_save_run!(args),
        }

        info!("polcal {} complete.", sub_command);
        Ok(())
    }
}

/// Send log messages to stdout. Colours are only used on a tty. From a
/// verbosity of 3, each message carries its source location.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .target(env_logger::Target::Stdout)
        .format_target(false)
        .filter_level(level);
    if verbosity >= 3 {
        builder.format(|buf, record| {
            use std::io::Write;

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or_default(),
                record.line().unwrap_or_default(),
                record.args()
            )
        });
    }
    builder.try_init()
}

/// Report the git revision and compiler this binary was built with.
fn display_build_info() {
    let mut printer = InfoPrinter::new("Build".into());
    let revision = match (GIT_COMMIT_HASH_SHORT, GIT_DIRTY) {
        (Some(hash), Some(true)) => format!("{hash} (dirty)"),
        (Some(hash), _) => hash.to_string(),
        (None, _) => "<no git info>".to_string(),
    };
    let mut block = vec![format!("git revision: {revision}").into()];
    if let Some(head) = GIT_HEAD_REF {
        block.push(format!("git head ref: {head}").into());
    }
    block.push(format!("built {BUILT_TIME_UTC} with {RUSTC_VERSION}").into());
    printer.push_block(block);
    printer.display();
}
