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

//! ZX81 system variable addresses used by the converter.
//!
//! A .P file is a dump of RAM starting at `VERSN`, so the file offset of a
//! system variable is its address minus [`VERSN`].

/// First byte of a .P file. Always zero for a ZX81 BASIC snapshot.
pub const VERSN: u16 = 0x4009;

/// Address of the display file.
pub const D_FILE: u16 = 0x400C;

/// Address of the variables area.
pub const VARS: u16 = 0x4010;

/// Address of the line being edited. Marks the end of the variables.
pub const E_LINE: u16 = 0x4014;

/// Address of the next character to interpret.
pub const CH_ADD: u16 = 0x4016;

/// Address of the next program line to run.
pub const NXTLIN: u16 = 0x4029;

/// Display/interrupt flags.
pub const CDFLAG: u16 = 0x403B;

/// Start of the BASIC program.
pub const PROGRAM_BASE: u16 = 0x407D;

/// Number of system variable bytes stored in front of the program.
pub const HEADER_LEN: usize = (PROGRAM_BASE - VERSN) as usize;

/// File offset of a system variable.
pub const fn offset_of(address: u16) -> usize {
    (address - VERSN) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(offset_of(D_FILE), 3);
        assert_eq!(offset_of(VARS), 7);
        assert_eq!(offset_of(E_LINE), 11);
        assert_eq!(offset_of(CH_ADD), 13);
        assert_eq!(offset_of(NXTLIN), 32);
        assert_eq!(offset_of(CDFLAG), 50);
        assert_eq!(HEADER_LEN, 116);
    }
}
