// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `fit` and
//! `simulate` subcommands need an array layout and a source catalog, so those
//! arguments are shared between them.

mod printers;

pub(super) use printers::{display_warnings, InfoPrinter, Warn};

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use super::PolcalError;
use crate::{
    array::{read_layout, ArrayLayout, LAYOUT_FILE_TYPES_COMMA_SEPARATED},
    catalog::{read_catalog, SourceCatalog, CATALOG_FILE_TYPES_COMMA_SEPARATED},
};

lazy_static::lazy_static! {
    static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("A file holding any of the arguments below. Arguments given on the command line take precedence. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref CATALOG_HELP: String =
        format!("Path to the source catalog. Supported formats: {CATALOG_FILE_TYPES_COMMA_SEPARATED}");

    static ref LAYOUT_HELP: String =
        format!("Path to the array layout. Supported formats: {LAYOUT_FILE_TYPES_COMMA_SEPARATED}");
}

#[derive(Debug, Clone, Copy, Display, EnumIter, EnumString)]
enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Read arguments from a toml or json file; the type is picked by the
/// extension.
pub(super) fn read_arg_file<T: DeserializeOwned>(arg_file: &Path) -> Result<T, PolcalError> {
    debug!("Reading arguments from {}", arg_file.display());
    let file_type = arg_file
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| ArgFileTypes::from_str(&e.to_lowercase()).ok())
        .ok_or_else(|| {
            PolcalError::ArgFile(format!(
                "Arguments file {} doesn't have a supported extension ({})",
                arg_file.display(),
                *ARG_FILE_TYPES_COMMA_SEPARATED
            ))
        })?;
    let contents = std::fs::read_to_string(arg_file)?;
    let decoded = match file_type {
        ArgFileTypes::Toml => toml::from_str(&contents).map_err(|e| e.to_string()),
        ArgFileTypes::Json => serde_json::from_str(&contents).map_err(|e| e.to_string()),
    };
    decoded.map_err(|e| {
        PolcalError::ArgFile(format!(
            "Couldn't read {file_type} arguments from {}:\n{e}",
            arg_file.display()
        ))
    })
}

/// The array and the sky it observes.
#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct ModelArgs {
    #[clap(short, long, help = LAYOUT_HELP.as_str(), help_heading = "MODEL")]
    pub(super) layout: Option<PathBuf>,

    #[clap(short, long, help = CATALOG_HELP.as_str(), help_heading = "MODEL")]
    pub(super) catalog: Option<PathBuf>,

    /// The names of the catalog sources to use. The default is to use all of
    /// them.
    #[clap(long, multiple_values(true), help_heading = "MODEL")]
    pub(super) sources: Option<Vec<String>>,

    /// Use this value as the DUT1 [seconds]. Default: 0
    #[clap(long, allow_hyphen_values = true, help_heading = "MODEL")]
    pub(super) dut1: Option<f64>,
}

/// Parsed [`ModelArgs`].
pub(super) struct Model {
    pub(super) layout: ArrayLayout,
    pub(super) catalog: SourceCatalog,
    pub(super) dut1: f64,
}

#[derive(Error, Debug)]
pub(super) enum ModelArgsError {
    #[error("No array layout was supplied")]
    NoLayout,

    #[error("No source catalog was supplied")]
    NoCatalog,

    #[error("No sources were selected from the catalog")]
    NoSources,
}

impl ModelArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            layout: self.layout.or(other.layout),
            catalog: self.catalog.or(other.catalog),
            sources: self.sources.or(other.sources),
            dut1: self.dut1.or(other.dut1),
        }
    }

    pub(super) fn parse(self) -> Result<Model, PolcalError> {
        let ModelArgs {
            layout,
            catalog,
            sources,
            dut1,
        } = self;

        let layout_file = layout.ok_or(ModelArgsError::NoLayout)?;
        let layout = read_layout(&layout_file)?;
        let catalog_file = catalog.ok_or(ModelArgsError::NoCatalog)?;
        let mut catalog = read_catalog(&catalog_file)?;
        if let Some(sources) = sources {
            debug!("Selecting sources {sources:?}");
            catalog = catalog.get_catalog(&sources)?;
        }
        if catalog.is_empty() {
            return Err(ModelArgsError::NoSources.into());
        }

        let mut printer = InfoPrinter::new("Model".into());
        printer.push_block(vec![
            format!("Array layout: {}", layout_file.display()).into(),
            format!(
                "{} antennas at {:.4}° {:.4}°",
                layout.antennas.len(),
                layout.longitude_deg,
                layout.latitude_deg
            )
            .into(),
        ]);
        printer.push_block(vec![
            format!("Source catalog: {}", catalog_file.display()).into(),
            format!("Sources: {}", catalog.keys().join(", ")).into(),
        ]);
        printer.display();

        Ok(Model {
            layout,
            catalog,
            dut1: dut1.unwrap_or_default(),
        })
    }
}

/// Split a comma-separated list into its trimmed, non-empty items.
pub(super) fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}
