// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, path_string, polcal, simulate_data, write_model, Files};
use polcal::Params;

#[test]
fn test_fit_amplitudes() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let xx = simulate_data(tmp_dir.path(), "xx");
    let yy = simulate_data(tmp_dir.path(), "yy");
    let Files { layout, catalog } = write_model(tmp_dir.path(), 0.9);
    let fitted = tmp_dir.path().join("fitted.toml");

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "fit",
            "--layout", &layout,
            "--catalog", &catalog,
            "--data", &path_string(&xx), &path_string(&yy),
            "--prms", "amp",
            "--output-params", &path_string(&fitted),
        ])
        .ok();
    assert!(cmd.is_ok(), "fit failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Fit results"), "{stdout}");

    let params: Params = toml::from_str(&std::fs::read_to_string(&fitted).unwrap()).unwrap();
    assert_eq!(params.len(), 8);
    for (unit, prms) in params {
        let amp = prms["amp"].as_scalar().unwrap();
        assert_abs_diff_eq!(amp, 1.0, epsilon = 0.05);
        assert!(unit.ends_with('x') || unit.ends_with('y'));
    }
}

#[test]
fn fit_needs_data() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { layout, catalog } = write_model(tmp_dir.path(), 1.0);

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "fit",
            "--layout", &layout,
            "--catalog", &catalog,
            "--prms", "amp",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("No visibility files"), "{stderr}");
}
