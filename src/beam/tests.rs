// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;

fn freqs() -> Vec<f64> {
    (0..10).map(|i| 100e6 + i as f64 * 10e6).collect()
}

#[test]
fn no_beam_means_no_beam() {
    let freqs = freqs();
    let beam = create_beam_object(BeamConfig::None).unwrap();
    for dir in [
        TopoDir::ZENITH,
        TopoDir {
            x: 0.1,
            y: 0.2,
            z: 0.97,
        },
        TopoDir {
            x: 0.0,
            y: -1.0,
            z: 0.0,
        },
    ] {
        assert_eq!(beam.response(dir, &freqs), Array1::<f64>::ones(freqs.len()));
    }
    assert!(beam.param_names().is_empty());
    assert!(beam.get_param("bm_xwidth").is_none());
}

#[test]
fn gaussian_beam_is_one_at_zenith() {
    let freqs = freqs();
    let beam = Gaussian2DBeam::new(0.05, 0.025).unwrap();
    assert_eq!(
        beam.response(TopoDir::ZENITH, &freqs),
        Array1::<f64>::ones(freqs.len())
    );
}

#[test]
fn gaussian_beam_values() {
    let freqs = [150e6];
    let beam = Gaussian2DBeam::new(0.05, 0.025).unwrap();
    let resp = beam.response(
        TopoDir {
            x: 0.05,
            y: 0.0,
            z: 1.0,
        },
        &freqs,
    );
    assert_abs_diff_eq!(resp[0], (-1.0_f64).exp().sqrt(), epsilon = 1e-12);
    let resp = beam.response(
        TopoDir {
            x: 0.0,
            y: 0.05,
            z: 1.0,
        },
        &freqs,
    );
    assert_abs_diff_eq!(resp[0], (-4.0_f64).exp().sqrt(), epsilon = 1e-12);
}

#[test]
fn gaussian_beam_params() {
    let mut beam = create_beam_object(BeamConfig::Gaussian {
        xwidth: 0.1,
        ywidth: 0.2,
    })
    .unwrap();
    assert_eq!(beam.get_param("bm_xwidth"), Some(0.1));
    assert_eq!(beam.get_param("bm_ywidth"), Some(0.2));

    beam.set_param("bm_ywidth", 0.3).unwrap();
    assert_eq!(beam.get_param("bm_ywidth"), Some(0.3));

    assert!(matches!(
        beam.set_param("bm_xwidth", 0.0),
        Err(BeamError::BadWidth(_))
    ));
    assert_eq!(beam.get_param("bm_xwidth"), Some(0.1));
    assert!(matches!(
        beam.set_param("amp", 1.0),
        Err(BeamError::UnknownParam { .. })
    ));
}

#[test]
fn bad_gaussian_widths_are_rejected() {
    assert!(Gaussian2DBeam::new(0.0, 0.1).is_err());
    assert!(Gaussian2DBeam::new(0.1, f64::NAN).is_err());
}
