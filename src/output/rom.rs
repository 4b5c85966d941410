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

//! ROM file writer.
//!
//! A ROM file is the raw bank image with no header.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{bank_path, BankSink};
use crate::error::{ConvertError, ErrorCode, Result};
use crate::layout::Bank;

/// Write a ROM file.
///
/// The bytes go to a sibling `.part` file first, which is renamed once it is
/// complete. On failure the `.part` file is removed and `path` is untouched.
pub fn write_rom(bytes: &[u8], path: &Path) -> io::Result<()> {
    let partial = partial_path(path);
    let result = write_file(bytes, &partial).and_then(|_| fs::rename(&partial, path));
    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            log::warn!("Cannot remove '{}': {}", partial.display(), e);
        }
    }
    result
}

fn write_file(bytes: &[u8], path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Temporary name used while `path` is being written.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}

/// Writes each bank to its own file.
#[derive(Debug)]
pub struct FileSink {
    base: PathBuf,
    split: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Sink for files named after `base`. With `split` set, bank names are
    /// added to the file names.
    pub fn new(base: impl Into<PathBuf>, split: bool) -> Self {
        Self {
            base: base.into(),
            split,
            written: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl BankSink for FileSink {
    fn write_bank(&mut self, bank: Bank, bytes: &[u8]) -> Result<()> {
        let path = bank_path(&self.base, bank, self.split);
        write_rom(bytes, &path).map_err(|e| {
            ConvertError::new(
                ErrorCode::OutputUnavailable,
                format!("Cannot write '{}': {}", path.display(), e),
            )
        })?;
        log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        self.written.push(path);
        Ok(())
    }

    fn discard(&mut self) {
        for path in self.written.drain(..) {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Cannot remove '{}': {}", path.display(), e);
            }
        }
    }
}
