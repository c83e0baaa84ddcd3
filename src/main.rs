// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;
use log::info;

fn main() {
    // Run polcal, only performing extra steps if it returns an error.
    //
    // In nearly all cases, polcal's errors are handled by the error's Display
    // impl; the message is printed and we exit with a non-zero code.
    if let Err(e) = polcal::Polcal::parse().run() {
        eprintln!("polcal error: {e}");
        info!("polcal failed.");
        std::process::exit(1);
    }
}
