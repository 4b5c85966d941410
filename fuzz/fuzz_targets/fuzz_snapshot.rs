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

//! Fuzz target for the snapshot reader and the conversion pipeline.
//!
//! Random bytes are read as a .P file and, when that succeeds, converted
//! with options picked by the fuzzer.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_snapshot
//!
//! Run for a specific duration:
//!   cargo +nightly fuzz run fuzz_snapshot -- -max_total_time=60

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ts1510_rom::output::NullSink;
use ts1510_rom::{AutorunRequest, Conversion, ConvertOptions, Snapshot};

#[derive(Arbitrary, Debug)]
struct Input {
    include_variables: bool,
    whole_snapshot: bool,
    short_output: bool,
    autorun: Option<i16>,
    image: Vec<u8>,
}

fuzz_target!(|input: Input| {
    // Reading should never panic, only return Ok or Err
    let Ok(snapshot) = Snapshot::from_bytes(input.image) else {
        return;
    };

    let autorun = match input.autorun {
        None => AutorunRequest::SnapshotDefault,
        Some(n) => AutorunRequest::from_number(n.into()).unwrap_or(AutorunRequest::Disable),
    };
    let options = ConvertOptions {
        include_variables: input.include_variables,
        autorun,
        short_output: input.short_output,
        whole_snapshot: input.whole_snapshot,
        ..ConvertOptions::default()
    };

    if let Ok(conversion) = Conversion::prepare(snapshot, &options) {
        let mut sink = NullSink::new();
        let _ = conversion.write(&mut sink);
    }
});
