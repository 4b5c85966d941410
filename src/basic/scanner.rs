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

//! Line scanner for tokenized ZX81 BASIC.
//!
//! Each program line is stored as:
//!
//! | bytes | field |
//! |-------|-------|
//! | 2 | line number, big-endian |
//! | 2 | payload length, little-endian |
//! | n | payload, ending in NEWLINE |
//!
//! The scanner only reads the four header bytes of each record and jumps over
//! the payload. It never looks inside it, so machine code hidden in REM lines
//! cannot throw it off.

use std::iter::FusedIterator;

/// Size of a line header.
pub const HEADER_LEN: usize = 4;

/// Header of one program line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHeader {
    /// Offset of the line from the start of the program.
    pub offset: usize,
    /// The BASIC line number.
    pub number: u16,
    /// Length of the payload in bytes.
    pub length: u16,
}

impl LineHeader {
    /// The two line number bytes in program order.
    pub fn number_bytes(&self) -> [u8; 2] {
        self.number.to_be_bytes()
    }

    /// Offset of the first payload byte.
    pub fn payload_start(&self) -> usize {
        self.offset + HEADER_LEN
    }

    /// Offset just past this line.
    pub fn end(&self) -> usize {
        self.payload_start() + self.length as usize
    }
}

/// Result of looking up a requested line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch {
    /// The line number that was asked for.
    pub requested: u16,
    /// The line that was picked.
    pub line: LineHeader,
}

impl LineMatch {
    /// Whether the picked line has exactly the requested number.
    pub fn is_exact(&self) -> bool {
        self.line.number == self.requested
    }
}

/// Forward-only iterator over the lines of a program.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    program: &'a [u8],
    extent: usize,
    position: usize,
}

impl Iterator for Lines<'_> {
    type Item = LineHeader;

    fn next(&mut self) -> Option<LineHeader> {
        if self.position >= self.extent {
            return None;
        }

        let header = decode_header(self.program, self.position);
        match header {
            Some(line) => self.position = line.end(),
            None => self.position = self.extent,
        }
        header
    }
}

impl FusedIterator for Lines<'_> {}

/// Line lookups over a program buffer.
#[derive(Debug, Clone, Copy)]
pub struct LineScanner<'a> {
    program: &'a [u8],
    extent: usize,
}

impl<'a> LineScanner<'a> {
    /// Create a scanner covering the first `program_size` bytes of `program`.
    pub fn new(program: &'a [u8], program_size: usize) -> Self {
        Self {
            program,
            extent: program_size.min(program.len()),
        }
    }

    /// Iterate over the line headers in program order.
    pub fn lines(&self) -> Lines<'a> {
        Lines {
            program: self.program,
            extent: self.extent,
            position: 0,
        }
    }

    /// Find the first line numbered `number` or higher.
    ///
    /// Falls back to the last line when every line is lower. Returns `None`
    /// only for a program without lines.
    pub fn find_first_line_at_or_after(&self, number: u16) -> Option<LineMatch> {
        let mut last = None;
        for line in self.lines() {
            if line.number >= number {
                return Some(LineMatch {
                    requested: number,
                    line,
                });
            }
            last = Some(line);
        }
        last.map(|line| LineMatch {
            requested: number,
            line,
        })
    }

    /// Decode the line header stored at `offset`.
    pub fn line_at(&self, offset: usize) -> Option<LineHeader> {
        if offset >= self.extent {
            return None;
        }
        decode_header(self.program, offset)
    }

    /// The line whose record ends exactly at `offset`.
    pub fn line_ending_at(&self, offset: usize) -> Option<LineHeader> {
        self.lines()
            .take_while(|line| line.offset < offset)
            .find(|line| line.end() == offset)
    }

    /// Payload bytes of a line, clipped to the buffer.
    pub fn payload(&self, line: &LineHeader) -> &'a [u8] {
        let start = line.payload_start().min(self.program.len());
        let end = line.end().min(self.program.len());
        &self.program[start..end]
    }
}

fn decode_header(program: &[u8], offset: usize) -> Option<LineHeader> {
    let bytes = program.get(offset..offset + HEADER_LEN)?;
    Some(LineHeader {
        offset,
        number: u16::from_be_bytes([bytes[0], bytes[1]]),
        length: u16::from_le_bytes([bytes[2], bytes[3]]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::tokens::{NEWLINE, NUMBER, REM};

    fn line(number: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = number.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn program(numbers: &[u16]) -> Vec<u8> {
        numbers
            .iter()
            .flat_map(|&n| line(n, &[0xE3, NEWLINE]))
            .collect()
    }

    #[test]
    fn test_lines_in_order() {
        let bytes = program(&[10, 20, 30]);
        let scanner = LineScanner::new(&bytes, bytes.len());
        let numbers: Vec<u16> = scanner.lines().map(|l| l.number).collect();
        assert_eq!(numbers, vec![10, 20, 30]);
    }

    #[test]
    fn test_find_exact_and_following() {
        let bytes = program(&[10, 20, 30]);
        let scanner = LineScanner::new(&bytes, bytes.len());

        let found = scanner.find_first_line_at_or_after(20).unwrap();
        assert_eq!(found.line.offset, 6);
        assert!(found.is_exact());

        let found = scanner.find_first_line_at_or_after(25).unwrap();
        assert_eq!(found.line.number, 30);
        assert_eq!(found.line.offset, 12);
        assert!(!found.is_exact());
    }

    #[test]
    fn test_find_past_end_uses_last_line() {
        let bytes = program(&[10, 20, 30]);
        let scanner = LineScanner::new(&bytes, bytes.len());
        let found = scanner.find_first_line_at_or_after(31).unwrap();
        assert_eq!(found.line.number, 30);
        assert_eq!(found.line.offset, 12);
        assert!(!found.is_exact());
    }

    #[test]
    fn test_empty_program_has_no_match() {
        let scanner = LineScanner::new(&[], 0);
        assert!(scanner.find_first_line_at_or_after(0).is_none());
    }

    #[test]
    fn test_rem_with_marker_bytes_is_skipped_whole() {
        // A machine code REM that happens to contain NUMBER and NEWLINE.
        let mut bytes = line(1, &[REM, NUMBER, NEWLINE, 0x00, NUMBER, NEWLINE]);
        bytes.extend(line(10, &[0xE3, NEWLINE]));
        let scanner = LineScanner::new(&bytes, bytes.len());
        let numbers: Vec<u16> = scanner.lines().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 10]);
    }

    #[test]
    fn test_line_ending_at() {
        let bytes = program(&[10, 20, 30]);
        let scanner = LineScanner::new(&bytes, bytes.len());
        assert_eq!(scanner.line_ending_at(12).unwrap().number, 20);
        assert!(scanner.line_ending_at(11).is_none());
        assert!(scanner.line_ending_at(0).is_none());
    }

    #[test]
    fn test_truncated_header_stops_scan() {
        let mut bytes = program(&[10]);
        bytes.extend_from_slice(&[0x00, 0x14]);
        let scanner = LineScanner::new(&bytes, bytes.len());
        assert_eq!(scanner.lines().count(), 1);
        assert!(scanner.line_at(6).is_none());
    }
}
