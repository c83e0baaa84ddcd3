// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, path_string, polcal, simulate_data, write_model, Files};

#[test]
fn test_fit_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let xx = simulate_data(tmp_dir.path(), "xx");
    let Files { layout, catalog } = write_model(tmp_dir.path(), 1.1);

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "fit",
            "--layout", &layout,
            "--catalog", &catalog,
            "--data", &path_string(&xx),
            "--ants", "0,1",
            "--prms", "amp",
            "--decimate", "2",
            "--max-evals", "50",
        ])
        .ok();
    assert!(cmd.is_ok(), "fit failed on simple test data: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_simulate_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { layout, catalog } = write_model(tmp_dir.path(), 1.0);

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "simulate",
            "--layout", &layout,
            "--catalog", &catalog,
            "--num-timesteps", "2",
            "--output", &path_string(&tmp_dir.path().join("sim.json")),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed on simple test data: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
