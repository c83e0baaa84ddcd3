// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod fit;
mod no_stderr;
mod simulate;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::formatdoc;

fn polcal() -> Command {
    Command::cargo_bin("polcal").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

struct Files {
    layout: String,
    catalog: String,
}

/// Write a dual-polarisation, four-antenna layout with gains of `amp` and a
/// two-source catalog into `dir`.
fn write_model(dir: &Path, amp: f64) -> Files {
    let layout = dir.join(format!("layout_{amp}.yaml"));
    let mut antennas = String::new();
    for (number, (e, n)) in [(0.0, 0.0), (12.0, 0.0), (0.0, 9.0), (-7.0, 5.0)]
        .into_iter()
        .enumerate()
    {
        antennas.push_str(&formatdoc! {"
            - number: {number}
              feeds: [x, y]
              position: [{e}, {n}, 0.0]
              params:
                amp: {amp}
        "});
    }
    let mut f = File::create(&layout).unwrap();
    write!(
        f,
        "{}",
        formatdoc! {"
            longitude_deg: 116.67
            latitude_deg: -26.7
            beam:
              type: gaussian
              xwidth: 0.6
              ywidth: 0.5
            antennas:
        "}
    )
    .unwrap();
    for line in antennas.lines() {
        writeln!(f, "  {line}").unwrap();
    }

    let catalog = dir.join("catalog.yaml");
    let mut f = File::create(&catalog).unwrap();
    f.write_all(
        formatdoc! {"
            overhead:
              position:
                az: 0.0
                el: 1.5707963267948966
              jys: 100
            nearby:
              position:
                az: 1.0
                el: 1.3
              jys: 40
              index: -0.5
        "}
        .as_bytes(),
    )
    .unwrap();

    Files {
        layout: path_string(&layout),
        catalog: path_string(&catalog),
    }
}

fn path_string(p: &Path) -> String {
    format!("{}", p.display())
}

/// Simulate visibilities from a model with gains of 1 into `dir`.
fn simulate_data(dir: &Path, pol: &str) -> PathBuf {
    let Files { layout, catalog } = write_model(dir, 1.0);
    let output = dir.join(format!("{pol}.json"));

    #[rustfmt::skip]
    let cmd = polcal()
        .args([
            "simulate",
            "--layout", &layout,
            "--catalog", &catalog,
            "--num-chans", "4",
            "--num-timesteps", "3",
            "--pol", pol,
            "--output", &path_string(&output),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    output
}
