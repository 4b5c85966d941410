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

//! Autorun resolver.
//!
//! Works out which line the cartridge starts after loading, and where that
//! line lives in memory. The answer comes from the command line or from the
//! `NXTLIN` system variable saved in the snapshot.

pub mod checks;

use crate::basic::LineScanner;
use crate::config::AutorunRequest;
use crate::error::{ConvertError, ErrorCode, Result, Warning, WarningCode};
use crate::snapshot::sysvars::PROGRAM_BASE;
use crate::snapshot::Snapshot;

/// Line number bytes that tell the bootstrap not to run anything.
pub const NO_AUTORUN: [u8; 2] = [254, 255];

/// How the autorun target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Switched off on request.
    Disabled,
    /// The snapshot carries no autorun line.
    NotRecorded,
    /// Unusable address in the snapshot.
    Unreadable,
    /// Line requested on the command line.
    Requested(u16),
    /// Address saved in the snapshot.
    Recorded,
}

/// The resolved autorun target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autorun {
    /// Line number bytes, high byte first.
    pub line_bytes: [u8; 2],
    /// Address execution resumes at.
    pub address: u16,
    /// How the target was chosen.
    pub origin: Origin,
    /// Whether the sanity checks ran.
    pub checked: bool,
    /// Warnings raised while resolving.
    pub warnings: Vec<Warning>,
}

impl Autorun {
    fn disabled(snapshot: &Snapshot, origin: Origin, warnings: Vec<Warning>) -> Self {
        Self {
            line_bytes: NO_AUTORUN,
            address: snapshot.display_file_addr,
            origin,
            checked: false,
            warnings,
        }
    }

    /// Whether the cartridge boots without running a line.
    pub fn is_disabled(&self) -> bool {
        self.line_bytes == NO_AUTORUN
    }

    /// The line number that will run, if any.
    pub fn line_number(&self) -> Option<u16> {
        if self.is_disabled() {
            None
        } else {
            Some(u16::from_be_bytes(self.line_bytes))
        }
    }

    /// Whether any check or lookup raised a warning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Requested and actual line when a requested line does not exist.
    pub fn mismatch(&self) -> Option<(u16, u16)> {
        match (self.origin, self.line_number()) {
            (Origin::Requested(requested), Some(found)) if requested != found => {
                Some((requested, found))
            }
            _ => None,
        }
    }
}

/// Result of resolving the autorun target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The target.
    pub autorun: Autorun,
    /// Snapshot with `NXTLIN` and `CH_ADD` rewritten, for whole-snapshot
    /// images whose resume point changed.
    pub patched: Option<Snapshot>,
}

/// Resolve the autorun target for a snapshot.
pub fn resolve(
    request: AutorunRequest,
    snapshot: &Snapshot,
    whole_snapshot: bool,
) -> Result<Resolution> {
    let program = snapshot.program()?;
    let scanner = LineScanner::new(program, program.len());

    let autorun = match request {
        AutorunRequest::Disable => Autorun::disabled(snapshot, Origin::Disabled, Vec::new()),
        AutorunRequest::Line(number) => resolve_line(number, snapshot, scanner)?,
        AutorunRequest::SnapshotDefault => resolve_recorded(snapshot, scanner, whole_snapshot),
    };

    let patched = match autorun.origin {
        Origin::Recorded | Origin::NotRecorded => None,
        _ if whole_snapshot => Some(snapshot.with_resume_point(autorun.address)),
        _ => None,
    };

    Ok(Resolution { autorun, patched })
}

fn resolve_line(number: u16, snapshot: &Snapshot, scanner: LineScanner<'_>) -> Result<Autorun> {
    let found = scanner.find_first_line_at_or_after(number).ok_or_else(|| {
        ConvertError::new(
            ErrorCode::AutorunLineNotFound,
            format!("Cannot autorun line {}: the program has no lines", number),
        )
    })?;

    if !found.is_exact() {
        log::info!(
            "Line {} does not exist, autorun uses line {} instead",
            number,
            found.line.number
        );
    }

    let address = PROGRAM_BASE + found.line.offset as u16;
    let target = checks::Target {
        snapshot,
        scanner,
        address,
        line_number: found.line.number,
    };

    Ok(Autorun {
        line_bytes: found.line.number_bytes(),
        address,
        origin: Origin::Requested(number),
        checked: true,
        warnings: checks::run(&target),
    })
}

fn resolve_recorded(
    snapshot: &Snapshot,
    scanner: LineScanner<'_>,
    whole_snapshot: bool,
) -> Autorun {
    let address = snapshot.next_line_addr;
    let display_file = snapshot.display_file_addr;

    if address == display_file {
        return Autorun::disabled(snapshot, Origin::NotRecorded, Vec::new());
    }

    let mut warnings = Vec::new();
    let run_checks = if address < PROGRAM_BASE {
        warnings.push(Warning::new(
            WarningCode::AddressBeforeProgram,
            format!(
                "Autorun address {} is outside the program area; \
                 result may be unreliable without whole-snapshot mode",
                address
            ),
        ));
        whole_snapshot
    } else if address > display_file {
        warnings.push(Warning::new(
            WarningCode::AddressPastProgram,
            format!("Autorun address {} lies past the end of the program", address),
        ));
        true
    } else {
        true
    };

    let bytes = snapshot
        .peek(address)
        .zip(address.checked_add(1).and_then(|a| snapshot.peek(a)));
    let Some((high, low)) = bytes else {
        warnings.push(Warning::new(
            WarningCode::AddressUnreadable,
            format!(
                "Autorun address {} is not covered by the snapshot; autorun is disabled",
                address
            ),
        ));
        return Autorun::disabled(snapshot, Origin::Unreadable, warnings);
    };

    let line_bytes = [high, low];
    if run_checks {
        let target = checks::Target {
            snapshot,
            scanner,
            address,
            line_number: u16::from_be_bytes(line_bytes),
        };
        warnings.extend(checks::run(&target));
    }

    Autorun {
        line_bytes,
        address,
        origin: Origin::Recorded,
        checked: run_checks,
        warnings,
    }
}
