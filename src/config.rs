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

//! Conversion options.
//!
//! The binary fills these in from the command line; library users build them
//! directly.

use crate::rom::bootstrap::Bootstrap;

/// Highest line number the ZX81 editor accepts.
pub const MAX_LINE_NUMBER: u16 = 9999;

/// How the autorun line should be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutorunRequest {
    /// Use the resume point recorded in the snapshot.
    #[default]
    SnapshotDefault,
    /// Start at this line, or the first line after it.
    Line(u16),
    /// Do not autorun.
    Disable,
}

impl AutorunRequest {
    /// Interpret a numeric autorun argument.
    ///
    /// Negative values disable autorun. Returns `None` for line numbers
    /// above [`MAX_LINE_NUMBER`].
    pub fn from_number(value: i64) -> Option<Self> {
        if value < 0 {
            Some(AutorunRequest::Disable)
        } else if value <= MAX_LINE_NUMBER as i64 {
            Some(AutorunRequest::Line(value as u16))
        } else {
            None
        }
    }
}

/// Options for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Copy the BASIC variables into the cartridge as well.
    pub include_variables: bool,
    /// Autorun selection.
    pub autorun: AutorunRequest,
    /// Write only the used prefix of the last bank.
    pub short_output: bool,
    /// Write bank A only, even when the image needs two banks.
    pub single_file: bool,
    /// Copy the whole snapshot, system variables included.
    pub whole_snapshot: bool,
    /// Report what would be written without writing anything.
    pub info_only: bool,
}

impl ConvertOptions {
    /// The bootstrap variant these options select.
    pub fn bootstrap(&self) -> Bootstrap {
        if self.whole_snapshot {
            Bootstrap::WholeSnapshot
        } else {
            Bootstrap::Segment
        }
    }

    /// Whether the variables region takes part in the layout.
    ///
    /// Whole-snapshot images already carry the variables.
    pub fn copies_variables(&self) -> bool {
        self.include_variables && !self.whole_snapshot
    }
}
