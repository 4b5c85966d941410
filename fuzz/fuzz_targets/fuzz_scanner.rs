// ts1510-rom - Converts ZX81 .P program snapshots into TS1510 cartridge ROMs
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Fuzz target for the BASIC line scanner and lister.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_scanner

#![no_main]

use libfuzzer_sys::fuzz_target;
use ts1510_rom::basic::{listing, LineScanner};

fuzz_target!(|data: &[u8]| {
    let scanner = LineScanner::new(data, data.len());

    for line in scanner.lines() {
        let _ = listing::list(&scanner, &line);
        let _ = scanner.line_ending_at(line.end());
    }

    if let Some(found) = scanner.find_first_line_at_or_after(1000) {
        assert!(found.line.offset < data.len());
    }
});
