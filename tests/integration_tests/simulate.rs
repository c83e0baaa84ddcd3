// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, path_string, polcal, simulate_data, write_model, Files};
use polcal::{MemoryVis, Pol, VisSource};

#[test]
fn test_simulate_cross_pol() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = simulate_data(tmp_dir.path(), "xy");
    let vis = MemoryVis::from_json(output).unwrap();
    assert_eq!(vis.meta().pol(), Some(Pol::XY));
    assert_eq!(vis.meta().num_ants, 4);
    // 10 baselines (including autos) over 3 timesteps.
    assert_eq!(vis.records().len(), 30);
    // The sky is unpolarised, so there's nothing in the cross pols.
    for record in vis.records() {
        for d in &record.data {
            assert_abs_diff_eq!(d.norm(), 0.0);
        }
    }
}

#[test]
fn test_simulate_co_pol() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = simulate_data(tmp_dir.path(), "yy");
    let vis = MemoryVis::from_json(output).unwrap();
    assert_eq!(vis.meta().pol(), Some(Pol::YY));
    assert!(vis
        .records()
        .iter()
        .all(|r| r.data.iter().all(|d| d.norm() > 0.0)));
}

#[test]
fn stokes_pols_are_rejected() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { layout, catalog } = write_model(tmp_dir.path(), 1.0);
    let output = tmp_dir.path().join("out.json");

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "simulate",
            "--layout", &layout,
            "--catalog", &catalog,
            "--pol", "I",
            "--output", &path_string(&output),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Stokes"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn arguments_can_be_saved_and_reused() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { layout, catalog } = write_model(tmp_dir.path(), 1.0);
    let args_file = tmp_dir.path().join("args.toml");
    let output = tmp_dir.path().join("out.json");

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "simulate",
            "--layout", &layout,
            "--catalog", &catalog,
            "--num-chans", "2",
            "--num-timesteps", "1",
            "--no-autos",
            "--output", &path_string(&output),
            "--save-toml", &path_string(&args_file),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    assert!(args_file.exists());
    assert!(!output.exists());

    let cmd = polcal()
        .args(["simulate", &path_string(&args_file)])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let vis = MemoryVis::from_json(&output).unwrap();
    assert_eq!(vis.meta().num_chans, 2);
    assert_eq!(vis.records().len(), 6);
}
