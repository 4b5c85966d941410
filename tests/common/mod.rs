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

//! Synthetic .P files for the integration tests.

#![allow(dead_code)]

pub const VERSN: u16 = 0x4009;
pub const PROGRAM_BASE: u16 = 0x407D;
pub const HEADER_LEN: usize = (PROGRAM_BASE - VERSN) as usize;

pub const NEWLINE: u8 = 0x76;
pub const QUOTE: u8 = 0x0B;
pub const REM: u8 = 0xEA;
pub const SAVE: u8 = 0xF8;
pub const PRINT: u8 = 0xF5;

/// Offset of `NXTLIN` in a .P file.
pub const NXTLIN_OFFSET: usize = 0x20;
/// Offset of `CH_ADD` in a .P file.
pub const CH_ADD_OFFSET: usize = 0x0D;

/// One program line.
pub fn line(number: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = number.to_be_bytes().to_vec();
    bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// `PRINT` on its own.
pub fn print_line(number: u16) -> Vec<u8> {
    line(number, &[PRINT, NEWLINE])
}

/// `SAVE "AB"`, with the B inverted when `autorun` is set.
pub fn save_line(number: u16, autorun: bool) -> Vec<u8> {
    let last = if autorun { 0x27 | 0x80 } else { 0x27 };
    line(number, &[SAVE, QUOTE, 0x26, last, QUOTE, NEWLINE])
}

/// A program of exactly `size` bytes made of REM lines with a running
/// byte pattern.
pub fn program_of_size(size: usize) -> Vec<u8> {
    assert!(size >= 6, "a line needs at least 6 bytes");
    let mut program = Vec::with_capacity(size);
    let mut number = 1u16;
    while program.len() < size {
        let left = size - program.len();
        let chunk = if left > 1000 && left - 1000 >= 6 { 1000 } else { left };
        let mut payload = vec![REM];
        payload.extend((0..chunk - 6).map(|i| (i % 63) as u8));
        payload.push(NEWLINE);
        program.extend(line(number, &payload));
        number += 1;
    }
    program
}

/// Lines with the given numbers.
pub fn program_with_lines(numbers: &[u16]) -> Vec<u8> {
    numbers.iter().flat_map(|&n| print_line(n)).collect()
}

/// Builder for .P files.
#[derive(Debug, Clone)]
pub struct PFile {
    pub program: Vec<u8>,
    pub variables: Vec<u8>,
    pub display_size: usize,
    /// `NXTLIN` as an offset into the program. `None` means no autorun.
    pub autorun_offset: Option<usize>,
    pub next_line: Option<u16>,
    pub cd_flag: u8,
}

impl PFile {
    pub fn new(program: Vec<u8>) -> Self {
        Self {
            program,
            variables: Vec::new(),
            display_size: 25,
            autorun_offset: None,
            next_line: None,
            cd_flag: 0x40,
        }
    }

    pub fn variables(mut self, variables: Vec<u8>) -> Self {
        self.variables = variables;
        self
    }

    pub fn autorun_at(mut self, offset: usize) -> Self {
        self.autorun_offset = Some(offset);
        self
    }

    pub fn next_line(mut self, address: u16) -> Self {
        self.next_line = Some(address);
        self
    }

    pub fn d_file(&self) -> u16 {
        PROGRAM_BASE + self.program.len() as u16
    }

    pub fn vars(&self) -> u16 {
        self.d_file() + self.display_size as u16
    }

    pub fn e_line(&self) -> u16 {
        self.vars() + self.variables.len() as u16 + 1
    }

    pub fn build(&self) -> Vec<u8> {
        let mut image = vec![0u8; HEADER_LEN];
        let next_line = match (self.next_line, self.autorun_offset) {
            (Some(address), _) => address,
            (None, Some(offset)) => PROGRAM_BASE + offset as u16,
            (None, None) => self.d_file(),
        };
        put_word(&mut image, 3, self.d_file());
        put_word(&mut image, 7, self.vars());
        put_word(&mut image, 11, self.e_line());
        put_word(&mut image, CH_ADD_OFFSET, next_line.wrapping_sub(1));
        put_word(&mut image, NXTLIN_OFFSET, next_line);
        image[0x32] = self.cd_flag;

        image.extend_from_slice(&self.program);
        image.extend(std::iter::repeat(NEWLINE).take(self.display_size));
        image.extend_from_slice(&self.variables);
        image.push(0x80);
        image
    }
}

fn put_word(image: &mut [u8], offset: usize, value: u16) {
    image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Little-endian word at `offset`.
pub fn word(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}
