// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use strum::IntoEnumIterator;

use super::*;

#[test]
fn codes_are_consistent() {
    for pol in Pol::iter() {
        assert_eq!(Pol::from_code(pol.code()), Some(pol));
        assert_eq!(read_pol(pol.code()), Some(pol));
        assert_eq!(write_pol(&pol.to_string()), Some(pol.code()));
    }
}

#[test]
fn unknown_codes_are_skipped() {
    assert_eq!(read_pol(0), None);
    // RR isn't handled.
    assert_eq!(read_pol(-1), None);
    assert_eq!(write_pol("rr"), None);
    assert_eq!(write_pol("xz"), None);
}

#[test]
fn labels_parse() {
    assert_eq!(Pol::from_str("xy").unwrap(), Pol::XY);
    assert_eq!(Pol::from_str("I").unwrap(), Pol::I);
    assert_eq!(Feed::from_str("y").unwrap(), Feed::Y);
    assert_eq!(BeamPol::from_str("V").unwrap(), BeamPol::V);
    assert!(Pol::from_str("XX").is_err());
}

#[test]
fn feed_products() {
    for (pol, f1, f2) in [
        (Pol::XX, Feed::X, Feed::X),
        (Pol::YY, Feed::Y, Feed::Y),
        (Pol::XY, Feed::X, Feed::Y),
        (Pol::YX, Feed::Y, Feed::X),
    ] {
        assert_eq!(pol.feeds(), Some((f1, f2)));
        assert_eq!(pol.is_co_pol(), f1 == f2);
    }
    for pol in [Pol::I, Pol::Q, Pol::U, Pol::V] {
        assert!(pol.feeds().is_none());
        assert!(!pol.is_co_pol());
    }
}
