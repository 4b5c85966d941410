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

//! Snapshot reader for ZX81 .P files.
//!
//! A .P file holds the system variables from `VERSN` onward, followed by the
//! BASIC program, the display file and the variables. The reader keeps the
//! whole file in memory and decodes the handful of system variables the
//! converter needs.

pub mod sysvars;

use std::io::Read;

use crate::error::{ConvertError, ErrorCode, Result};
use sysvars::{
    offset_of, CDFLAG, CH_ADD, D_FILE, E_LINE, HEADER_LEN, NXTLIN, PROGRAM_BASE, VARS, VERSN,
};

/// Value of `VERSN` in a ZX81 BASIC snapshot.
pub const SIGNATURE: u8 = 0x00;

/// A decoded .P file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Start of the display file (`D_FILE`).
    pub display_file_addr: u16,
    /// Start of the variables area (`VARS`).
    pub variables_addr: u16,
    /// Start of the edit line (`E_LINE`).
    pub edit_line_addr: u16,
    /// Interpreter character pointer (`CH_ADD`).
    pub char_add_addr: u16,
    /// Next line to run (`NXTLIN`).
    pub next_line_addr: u16,
    /// Display flags (`CDFLAG`).
    pub cd_flag: u8,
    /// The raw file, starting at `VERSN`.
    image: Vec<u8>,
}

impl Snapshot {
    /// Read a snapshot from a byte source.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|e| {
            ConvertError::new(
                ErrorCode::TruncatedInput,
                format!("Cannot read snapshot: {}", e),
            )
        })?;
        Self::from_bytes(bytes)
    }

    /// Decode a snapshot held in memory.
    pub fn from_bytes(image: Vec<u8>) -> Result<Self> {
        match image.first() {
            None => {
                return Err(ConvertError::new(
                    ErrorCode::TruncatedInput,
                    "Snapshot is empty",
                ))
            }
            Some(&SIGNATURE) => {}
            Some(&other) => {
                return Err(ConvertError::new(
                    ErrorCode::MalformedInput,
                    format!(
                        "Not a ZX81 program snapshot (first byte is ${:02X}, expected ${:02X})",
                        other, SIGNATURE
                    ),
                )
                .with_hint("The input must be a .P file saved by a ZX81 or TS1000/TS1500"))
            }
        }

        if image.len() < HEADER_LEN {
            return Err(ConvertError::new(
                ErrorCode::TruncatedInput,
                format!(
                    "Snapshot ends inside the system variables ({} of {} bytes)",
                    image.len(),
                    HEADER_LEN
                ),
            ));
        }

        let word = |address: u16| {
            let offset = offset_of(address);
            u16::from_le_bytes([image[offset], image[offset + 1]])
        };

        let snapshot = Self {
            display_file_addr: word(D_FILE),
            variables_addr: word(VARS),
            edit_line_addr: word(E_LINE),
            char_add_addr: word(CH_ADD),
            next_line_addr: word(NXTLIN),
            cd_flag: image[offset_of(CDFLAG)],
            image,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<()> {
        let ordered = PROGRAM_BASE <= self.display_file_addr
            && self.display_file_addr <= self.variables_addr
            && self.variables_addr < self.edit_line_addr;

        if ordered {
            Ok(())
        } else {
            Err(ConvertError::new(
                ErrorCode::MalformedInput,
                format!(
                    "System variables are out of order (D_FILE={}, VARS={}, E_LINE={})",
                    self.display_file_addr, self.variables_addr, self.edit_line_addr
                ),
            ))
        }
    }

    /// Fixed address of the first program byte.
    pub fn program_base(&self) -> u16 {
        PROGRAM_BASE
    }

    /// Size of the BASIC program in bytes.
    pub fn program_size(&self) -> usize {
        (self.display_file_addr - PROGRAM_BASE) as usize
    }

    /// Size of the display file in bytes.
    pub fn display_file_size(&self) -> usize {
        (self.variables_addr - self.display_file_addr) as usize
    }

    /// Size of the variables, excluding their end marker.
    pub fn variables_size(&self) -> usize {
        (self.edit_line_addr - self.variables_addr - 1) as usize
    }

    /// Size of everything from `VERSN` up to `E_LINE`.
    pub fn whole_size(&self) -> usize {
        (self.edit_line_addr - VERSN) as usize
    }

    /// The raw file as read.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// The program bytes.
    pub fn program(&self) -> Result<&[u8]> {
        self.region("program", self.program_base(), self.program_size())
    }

    /// The variable bytes, without the end marker.
    pub fn variables(&self) -> Result<&[u8]> {
        self.region("variables", self.variables_addr, self.variables_size())
    }

    /// Everything from `VERSN` up to `E_LINE`.
    pub fn whole(&self) -> Result<&[u8]> {
        self.region("snapshot", VERSN, self.whole_size())
    }

    fn region(&self, name: &str, address: u16, len: usize) -> Result<&[u8]> {
        let start = offset_of(address);
        self.image.get(start..start + len).ok_or_else(|| {
            ConvertError::new(
                ErrorCode::TruncatedInput,
                format!(
                    "Snapshot ends inside the {} ({} bytes at {} need {} file bytes, file has {})",
                    name,
                    len,
                    address,
                    start + len,
                    self.image.len()
                ),
            )
        })
    }

    /// Byte at a ZX81 address, if the file covers it.
    pub fn peek(&self, address: u16) -> Option<u8> {
        let offset = address.checked_sub(VERSN)? as usize;
        self.image.get(offset).copied()
    }

    /// Copy of this snapshot that resumes at `address`.
    ///
    /// Sets `NXTLIN` to the address and `CH_ADD` one below it, in the decoded
    /// fields and in the image.
    pub fn with_resume_point(&self, address: u16) -> Self {
        let mut patched = self.clone();
        let char_add = address.wrapping_sub(1);

        patched.next_line_addr = address;
        patched.char_add_addr = char_add;
        patched.put_word(NXTLIN, address);
        patched.put_word(CH_ADD, char_add);
        patched
    }

    fn put_word(&mut self, address: u16, value: u16) {
        let offset = offset_of(address);
        self.image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }
}
