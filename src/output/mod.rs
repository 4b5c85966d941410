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

//! Output module for the converter.
//!
//! Finished banks are handed to a [`BankSink`]:
//! - [`FileSink`] writes ROM files, one per bank
//! - [`WriterSink`] streams banks to any writer, usually stdout
//! - [`NullSink`] only records what would have been written

mod rom;

pub use rom::{write_rom, FileSink};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ErrorCode, Result};
use crate::layout::Bank;

/// Extension of generated ROM files.
pub const ROM_EXTENSION: &str = "rom";

/// Path that selects standard input or output.
pub const STDIO_PATH: &str = "-";

/// Receives finished bank images in bank order.
pub trait BankSink {
    /// Store one bank image.
    fn write_bank(&mut self, bank: Bank, bytes: &[u8]) -> Result<()>;

    /// Undo everything written so far. Called when a later step fails.
    fn discard(&mut self) {}
}

/// Where the banks end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// ROM file(s) based on this path.
    File(PathBuf),
    /// Standard output.
    Stdout,
}

impl Destination {
    /// Pick the destination from the input and output arguments.
    ///
    /// An explicit `-` or a missing output for stdin input selects stdout.
    pub fn resolve(input: Option<&Path>, output: Option<&Path>) -> Self {
        match output {
            Some(path) if path == Path::new(STDIO_PATH) => Destination::Stdout,
            Some(path) if path.extension().is_none() => {
                Destination::File(path.with_extension(ROM_EXTENSION))
            }
            Some(path) => Destination::File(path.to_path_buf()),
            None => match input {
                Some(path) if path != Path::new(STDIO_PATH) => {
                    Destination::File(path.with_extension(ROM_EXTENSION))
                }
                _ => Destination::Stdout,
            },
        }
    }

    /// Whether only one bank can be written here.
    pub fn forces_single_file(&self) -> bool {
        matches!(self, Destination::Stdout)
    }

    /// Human readable name of the place `bank` goes to.
    pub fn describe(&self, bank: Bank, split: bool) -> String {
        match self {
            Destination::File(path) => bank_path(path, bank, split).display().to_string(),
            Destination::Stdout => "<stdout>".to_string(),
        }
    }
}

/// File name for one bank.
///
/// With `split` set, `_A` or `_B` is inserted in front of the extension.
pub fn bank_path(path: &Path, bank: Bank, split: bool) -> PathBuf {
    if !split {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, bank.name(), ext.to_string_lossy()),
        None => format!("{}_{}", stem, bank.name()),
    };
    path.with_file_name(name)
}

/// Streams banks to a writer.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give the writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> BankSink for WriterSink<W> {
    fn write_bank(&mut self, bank: Bank, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|e| {
                ConvertError::new(
                    ErrorCode::OutputUnavailable,
                    format!("Cannot write bank {}: {}", bank.name(), e),
                )
            })
    }
}

/// Records bank sizes without writing anything.
#[derive(Debug, Default)]
pub struct NullSink {
    /// Banks that were offered, with their lengths.
    pub banks: Vec<(Bank, usize)>,
}

impl NullSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BankSink for NullSink {
    fn write_bank(&mut self, bank: Bank, bytes: &[u8]) -> Result<()> {
        self.banks.push((bank, bytes.len()));
        Ok(())
    }

    fn discard(&mut self) {
        self.banks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_from_input() {
        assert_eq!(
            Destination::resolve(Some(Path::new("games/maze.p")), None),
            Destination::File(PathBuf::from("games/maze.rom"))
        );
        assert_eq!(Destination::resolve(None, None), Destination::Stdout);
        assert_eq!(
            Destination::resolve(Some(Path::new("-")), None),
            Destination::Stdout
        );
    }

    #[test]
    fn test_destination_from_output() {
        assert_eq!(
            Destination::resolve(Some(Path::new("maze.p")), Some(Path::new("out.bin"))),
            Destination::File(PathBuf::from("out.bin"))
        );
        assert_eq!(
            Destination::resolve(None, Some(Path::new("cart"))),
            Destination::File(PathBuf::from("cart.rom"))
        );
        assert_eq!(
            Destination::resolve(Some(Path::new("maze.p")), Some(Path::new("-"))),
            Destination::Stdout
        );
        assert!(Destination::Stdout.forces_single_file());
    }

    #[test]
    fn test_bank_path() {
        let path = Path::new("dir/maze.rom");
        assert_eq!(bank_path(path, Bank::A, false), PathBuf::from("dir/maze.rom"));
        assert_eq!(bank_path(path, Bank::A, true), PathBuf::from("dir/maze_A.rom"));
        assert_eq!(bank_path(path, Bank::B, true), PathBuf::from("dir/maze_B.rom"));
        assert_eq!(bank_path(Path::new("maze"), Bank::B, true), PathBuf::from("maze_B"));
    }

    #[test]
    fn test_writer_sink_concatenates() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_bank(Bank::A, &[1, 2]).unwrap();
        sink.write_bank(Bank::B, &[3]).unwrap();
        assert_eq!(sink.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_null_sink_records() {
        let mut sink = NullSink::new();
        sink.write_bank(Bank::A, &[0; 10]).unwrap();
        assert_eq!(sink.banks, vec![(Bank::A, 10)]);
        sink.discard();
        assert!(sink.banks.is_empty());
    }
}
