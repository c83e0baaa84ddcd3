// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use strum::IntoEnumIterator;

use super::*;
use crate::beam::{Gaussian2DBeam, NoBeam};

fn get_antenna() -> Antenna {
    Antenna::new(
        3,
        Some(Feed::Y),
        XyzGeodetic {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        },
        Box::new(Gaussian2DBeam::new(0.5, 0.25).unwrap()),
    )
}

#[test]
fn test_label() {
    let mut ant = get_antenna();
    assert_eq!(ant.label(), "3y");
    ant.feed = None;
    assert_eq!(ant.label(), "3");
}

#[test]
fn default_passband_is_unity() {
    let ant = get_antenna();
    let bp = ant.passband(10);
    assert_eq!(bp.len(), 10);
    for g in bp {
        assert_eq!(g, c64::new(1.0, 0.0));
    }
}

#[test]
fn passband_interpolates_knots() {
    let mut ant = get_antenna();
    ant.amp = 2.0;
    ant.bp_r = vec![1.0, 0.0];
    ant.bp_i = vec![0.0, 1.0];
    let bp = ant.passband(5);
    let expected = [
        c64::new(2.0, 0.0),
        c64::new(1.5, 0.5),
        c64::new(1.0, 1.0),
        c64::new(0.5, 1.5),
        c64::new(0.0, 2.0),
    ];
    for (g, e) in bp.iter().zip(expected) {
        assert_abs_diff_eq!(*g, e, epsilon = 1e-15);
    }
}

#[test]
fn test_phase_offset() {
    let mut ant = get_antenna();
    ant.dly = 2.0;
    ant.off = 0.25;
    let offsets = ant.phase_offset(&[100e6, 150e6]);
    assert_abs_diff_eq!(offsets, array![0.45, 0.55], epsilon = 1e-15);
}

#[test]
fn beams_are_one_at_zenith_for_all_pols() {
    let freqs = [100e6, 200e6];
    let ant = get_antenna();
    for pol in BeamPol::iter() {
        let resp = ant.bm_response(TopoDir::ZENITH, pol, &freqs);
        assert_abs_diff_eq!(resp, array![1.0, 1.0], epsilon = 1e-15);
    }
}

#[test]
fn y_feed_is_rotated() {
    let freqs = [150e6];
    let ant = get_antenna();
    // Half an x-width east.
    let dir = TopoDir {
        x: 0.25,
        y: 0.0,
        z: (1.0_f64 - 0.25 * 0.25).sqrt(),
    };
    let x = ant.bm_response(dir, BeamPol::X, &freqs);
    assert_abs_diff_eq!(x[0], (-0.25_f64).exp().sqrt(), epsilon = 1e-15);
    // For the y feed, east is along its y-width.
    let y = ant.bm_response(dir, BeamPol::Y, &freqs);
    assert_abs_diff_eq!(y[0], (-1.0_f64).exp().sqrt(), epsilon = 1e-15);

    let i = ant.bm_response(dir, BeamPol::I, &freqs);
    assert_abs_diff_eq!(
        i[0],
        ((x[0] * x[0] + y[0] * y[0]) / 2.0).sqrt(),
        epsilon = 1e-15
    );
    let q = ant.bm_response(dir, BeamPol::Q, &freqs);
    assert_eq!(i, q);
    let u = ant.bm_response(dir, BeamPol::U, &freqs);
    assert_abs_diff_eq!(u[0], (x[0] * y[0]).sqrt(), epsilon = 1e-15);
    let v = ant.bm_response(dir, BeamPol::V, &freqs);
    assert_eq!(u, v);
}

#[test]
fn get_params_expands_names() {
    let ant = get_antenna();
    let params = ant.get_params(&["passband".to_string()]).unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params["bp_r"], ParamValue::Vector(vec![1.0]));
    assert_eq!(params["bp_i"], ParamValue::Vector(vec![0.0]));

    let params = ant.get_params(&["*".to_string()]).unwrap();
    assert_eq!(params.len(), ANTENNA_PARAMS.len() + 2);
    assert_eq!(params["bm_xwidth"], ParamValue::Scalar(0.5));
    assert_eq!(params["z"], ParamValue::Scalar(3.0));

    let result = ant.get_params(&["bogus".to_string()]);
    assert!(matches!(result, Err(ParamError::Unknown { .. })));
}

#[test]
fn no_beam_has_no_beam_params() {
    let mut ant = get_antenna();
    ant.beam = Box::new(NoBeam);
    let params = ant.get_params(&["*".to_string()]).unwrap();
    assert_eq!(params.len(), ANTENNA_PARAMS.len());
    assert!(ant.get_params(&["bm_xwidth".to_string()]).is_err());
}

#[test]
fn set_params_round_trip() {
    let mut ant = get_antenna();
    let mut params = ant.get_params(&["*".to_string()]).unwrap();
    params.insert("amp".to_string(), ParamValue::Scalar(0.7));
    params.insert("bp_r".to_string(), ParamValue::Vector(vec![0.9, 1.1]));
    params.insert("bm_ywidth".to_string(), ParamValue::Scalar(0.3));
    params.insert("dly".to_string(), ParamValue::Vector(vec![1.5]));
    ant.set_params(&params).unwrap();

    assert_eq!(ant.amp, 0.7);
    assert_eq!(ant.bp_r, vec![0.9, 1.1]);
    assert_eq!(ant.dly, 1.5);
    assert_eq!(ant.beam.get_param("bm_ywidth"), Some(0.3));
    // Single-element vectors are accepted for scalars, but read back as
    // scalars.
    params.insert("dly".to_string(), ParamValue::Scalar(1.5));
    assert_eq!(ant.get_params(&["*".to_string()]).unwrap(), params);
}

#[test]
fn bad_set_params_changes_nothing() {
    let mut ant = get_antenna();
    let params = UnitParams::from([
        ("amp".to_string(), ParamValue::Scalar(5.0)),
        ("bm_xwidth".to_string(), ParamValue::Scalar(0.0)),
    ]);
    let result = ant.set_params(&params);
    assert!(matches!(result, Err(ParamError::Beam { .. })));
    assert_eq!(ant.amp, 1.0);
    assert_eq!(ant.beam.get_param("bm_xwidth"), Some(0.5));

    let params = UnitParams::from([("off".to_string(), ParamValue::Vector(vec![1.0, 2.0]))]);
    assert!(matches!(
        ant.set_params(&params),
        Err(ParamError::NotScalar { .. })
    ));
    let params = UnitParams::from([("bp_i".to_string(), ParamValue::Vector(vec![]))]);
    assert!(matches!(
        ant.set_params(&params),
        Err(ParamError::Empty { .. })
    ));
}

#[test]
fn test_resample_passband() {
    let mut ant = get_antenna();
    ant.resample_passband(4);
    assert_eq!(ant.bp_r, vec![1.0; 4]);
    assert_eq!(ant.bp_i, vec![0.0; 4]);

    ant.bp_r = vec![0.0, 1.0, 2.0, 3.0];
    ant.resample_passband(7);
    assert_abs_diff_eq!(
        ant.bp_r.as_slice(),
        [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0].as_slice(),
        epsilon = 1e-15
    );
}
