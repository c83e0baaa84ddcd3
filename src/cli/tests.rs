// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpers for CLI tests.

use std::{fs::File, io::Write, path::Path};

use indoc::formatdoc;

use super::common::ModelArgs;

/// Write a three-antenna layout, with every antenna's gain set to `amp`, and a
/// single-source catalog into `dir`.
pub(super) fn write_model(dir: &Path, amp: f64) -> ModelArgs {
    let layout = dir.join(format!("layout_{amp}.yaml"));
    let mut f = File::create(&layout).unwrap();
    f.write_all(
        formatdoc! {"
            longitude_deg: 116.67
            latitude_deg: -26.7
            antennas:
              - number: 0
                position: [0.0, 0.0, 0.0]
                params:
                  amp: {amp}
              - number: 1
                position: [10.0, 0.0, 0.0]
                params:
                  amp: {amp}
              - number: 2
                position: [0.0, 14.0, 0.0]
                params:
                  amp: {amp}
        "}
        .as_bytes(),
    )
    .unwrap();

    let catalog = dir.join("catalog.yaml");
    let mut f = File::create(&catalog).unwrap();
    f.write_all(
        formatdoc! {"
            overhead:
              position:
                az: 0.0
                el: 1.5707963267948966
              jys: 100
            "}
        .as_bytes(),
    )
    .unwrap();

    ModelArgs {
        layout: Some(layout),
        catalog: Some(catalog),
        sources: None,
        dut1: None,
    }
}
