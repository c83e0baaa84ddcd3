// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use marlu::XyzGeodetic;

use super::*;
use crate::{
    antenna::Antenna,
    beam::NoBeam,
    constants::FRAC_PI_2,
    params::{ParamError, ParamValue, UnitParams},
};

fn get_catalog() -> SourceCatalog {
    let mut cyg = RadioSource::new(
        SourcePosition::Fixed {
            ra: 5.233,
            dec: 0.711,
        },
        10500.0,
        -0.69,
        150e6,
    );
    cyg.shape = Some(SourceShape {
        a1: 1e-4,
        a2: 2e-4,
        th: 0.5,
    });
    let zen = RadioSource::new(
        SourcePosition::Topocentric {
            az: 0.0,
            el: FRAC_PI_2,
        },
        5.0,
        0.0,
        100e6,
    );
    let cas = RadioSource::new(
        SourcePosition::Fixed {
            ra: 6.124,
            dec: 1.026,
        },
        9000.0,
        -0.8,
        150e6,
    );
    SourceCatalog::from([
        ("cyg".to_string(), cyg),
        ("zen".to_string(), zen),
        ("cas".to_string(), cas),
    ])
}

fn get_array() -> AntennaArray {
    let antennas = vec![Antenna::new(
        0,
        None,
        XyzGeodetic {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
        Box::new(NoBeam),
    )];
    AntennaArray::new(antennas, 2.0, -0.47, vec![150e6]).unwrap()
}

#[test]
fn test_flux() {
    let src = RadioSource::new(
        SourcePosition::Fixed { ra: 0.0, dec: 0.0 },
        100.0,
        -2.0,
        100e6,
    );
    for (f, expected) in [(100e6, 100.0), (200e6, 25.0), (50e6, 400.0)] {
        let flux = flux_density(src.jys, src.index, src.mfreq, f);
        assert_abs_diff_eq!(flux, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_get_catalog() {
    let catalog = get_catalog();
    let subset = catalog
        .get_catalog(&["cas".to_string(), "cyg".to_string()])
        .unwrap();
    assert_eq!(subset.keys().collect::<Vec<_>>(), vec!["cas", "cyg"]);
    assert_eq!(subset["cyg"], catalog["cyg"]);

    let result = catalog.get_catalog(&["vir".to_string()]);
    assert!(matches!(result, Err(CatalogError::UnknownSource(s)) if s == "vir"));
}

#[test]
fn vecs_need_computing() {
    let mut catalog = get_catalog();
    assert!(matches!(catalog.get_vecs(), Err(CatalogError::NotComputed)));

    let array = get_array();
    catalog.compute(&array);
    let vecs = catalog.get_vecs().unwrap();
    assert_eq!(vecs.len(), 3);
    assert_eq!(vecs.jys, vec![10500.0, 5.0, 9000.0]);
    assert_eq!(vecs.indices, vec![-0.69, 0.0, -0.8]);
    assert_eq!(vecs.mfreqs, vec![150e6, 100e6, 150e6]);
    assert!(vecs.shapes[0].is_some());
    assert!(vecs.shapes[1].is_none());

    // A fixed source's hour angle is LST - RA.
    let lst = array.lst_rad();
    let ha = vecs.positions[0].ha;
    let expected = (lst - 5.233).rem_euclid(crate::constants::TAU);
    assert_abs_diff_eq!(ha.rem_euclid(crate::constants::TAU), expected, epsilon = 1e-10);
    assert_abs_diff_eq!(vecs.positions[0].dec, 0.711, epsilon = 1e-10);

    // A source at zenith has its hour angle at zero and its declination at
    // the array latitude.
    assert_abs_diff_eq!(vecs.dirs[1].z, 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(vecs.positions[1].dec, -0.47, epsilon = 1e-10);

    // Changing parameters invalidates the positions.
    let params = Params::from([(
        "zen".to_string(),
        UnitParams::from([("jys".to_string(), ParamValue::Scalar(6.0))]),
    )]);
    catalog.set_params(&params).unwrap();
    assert!(matches!(catalog.get_vecs(), Err(CatalogError::NotComputed)));
}

#[test]
fn test_get_params() {
    let catalog = get_catalog();
    let selection = ParamSelection::from([
        ("cyg".to_string(), vec!["jys".to_string(), "a2".to_string()]),
        ("zen".to_string(), vec!["*".to_string()]),
    ]);
    let params = catalog.get_params(&selection).unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params["cyg"]["jys"], ParamValue::Scalar(10500.0));
    assert_eq!(params["cyg"]["a2"], ParamValue::Scalar(2e-4));
    assert_eq!(
        params["zen"].keys().collect::<Vec<_>>(),
        vec!["az", "el", "index", "jys", "mfreq"]
    );

    let selection = ParamSelection::from([("*".to_string(), vec!["index".to_string()])]);
    let params = catalog.get_params(&selection).unwrap();
    assert_eq!(params.len(), 3);

    // "ra" isn't a parameter of topocentric sources, and "a1" isn't a
    // parameter of unresolved sources.
    for (src, name) in [("zen", "ra"), ("cas", "a1")] {
        let selection = ParamSelection::from([(src.to_string(), vec![name.to_string()])]);
        assert!(matches!(
            catalog.get_params(&selection),
            Err(CatalogError::Param(ParamError::Unknown { .. }))
        ));
    }
}

#[test]
fn test_set_params() {
    let mut catalog = get_catalog();
    let params = Params::from([
        (
            "cas".to_string(),
            UnitParams::from([
                ("ra".to_string(), ParamValue::Scalar(6.0)),
                ("dra".to_string(), ParamValue::Scalar(0.001)),
            ]),
        ),
        (
            "0x".to_string(),
            UnitParams::from([("amp".to_string(), ParamValue::Scalar(2.0))]),
        ),
    ]);
    catalog.set_params(&params).unwrap();
    let cas = &catalog["cas"];
    assert_eq!(
        cas.position,
        SourcePosition::Fixed {
            ra: 6.0,
            dec: 1.026
        }
    );
    assert_eq!(
        cas.ionref,
        Some(IonRef {
            dra: 0.001,
            ddec: 0.0
        })
    );

    // A bad parameter changes nothing.
    let params = Params::from([(
        "cyg".to_string(),
        UnitParams::from([
            ("jys".to_string(), ParamValue::Scalar(1.0)),
            ("bogus".to_string(), ParamValue::Scalar(1.0)),
        ]),
    )]);
    assert!(catalog.set_params(&params).is_err());
    assert_eq!(catalog["cyg"].jys, 10500.0);
}

#[test]
fn test_read_catalog() {
    let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    yaml.write_all(
        indoc! {"
        cyg:
          position:
            ra: 5.233
            dec: 0.711
          jys: 10500
          index: -0.69
          shape:
            a1: 0.0001
            a2: 0.0002
            th: 0.5
        sun:
          position:
            az: 1.0
            el: 0.5
          jys: 50000
        "}
        .as_bytes(),
    )
    .unwrap();
    let catalog = read_catalog(yaml.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog["cyg"].mfreq, 150e6);
    assert_eq!(catalog["sun"].index, -0.8);
    assert_eq!(
        catalog["sun"].position,
        SourcePosition::Topocentric { az: 1.0, el: 0.5 }
    );
    assert!(catalog["sun"].shape.is_none());

    let mut toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    toml.write_all(
        indoc! {"
        [cas]
        jys = 9000.0
        position = { ra = 6.124, dec = 1.026 }
        "}
        .as_bytes(),
    )
    .unwrap();
    let catalog = read_catalog(toml.path()).unwrap();
    assert_eq!(catalog["cas"].jys, 9000.0);

    let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    json.write_all(br#"{"bad": {"position": {"ra": 7.0, "dec": 0.0}, "jys": 1.0}}"#)
        .unwrap();
    assert!(matches!(
        read_catalog(json.path()),
        Err(CatalogError::InvalidRa { .. })
    ));

    let txt = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    assert!(matches!(
        read_catalog(txt.path()),
        Err(CatalogError::UnknownFileType(_))
    ));
}
