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

//! Sanity checks for an autorun target.
//!
//! A program normally autoruns because it was saved by a `SAVE "NAME"` line
//! whose name ends in an inverted character. The line after that `SAVE` is
//! where execution resumes. The checks below look for that pattern and report
//! anything unusual as a warning. None of them stop the conversion.

use crate::basic::tokens::{is_inverted, NEWLINE, QUOTE, SAVE};
use crate::basic::{LineHeader, LineScanner};
use crate::config::MAX_LINE_NUMBER;
use crate::error::{Warning, WarningCode};
use crate::snapshot::sysvars::PROGRAM_BASE;
use crate::snapshot::Snapshot;

/// The address being checked, with the memory around it.
pub struct Target<'a> {
    /// Snapshot memory, used for bytes outside the program lines.
    pub snapshot: &'a Snapshot,
    /// Scanner over the program.
    pub scanner: LineScanner<'a>,
    /// Resolved autorun address.
    pub address: u16,
    /// Line number decoded at the address.
    pub line_number: u16,
}

impl Target<'_> {
    fn program_offset(&self) -> Option<usize> {
        self.address.checked_sub(PROGRAM_BASE).map(usize::from)
    }
}

/// One check in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    LineNumberInRange,
    NotFirstLine,
    LineBoundary,
    PrecedingSave,
    InvertedSaveName,
}

/// All checks in evaluation order.
pub const PIPELINE: [Check; 5] = [
    Check::LineNumberInRange,
    Check::NotFirstLine,
    Check::LineBoundary,
    Check::PrecedingSave,
    Check::InvertedSaveName,
];

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Passed,
    Failed(Warning),
    Skipped,
}

#[derive(Default)]
struct Context {
    save_line: Option<LineHeader>,
}

impl Check {
    fn evaluate(&self, target: &Target<'_>, context: &mut Context) -> Outcome {
        match self {
            Check::LineNumberInRange => {
                if target.line_number > MAX_LINE_NUMBER {
                    fail(
                        WarningCode::LineNumberOutOfRange,
                        format!("Autorun line number {} is out of range", target.line_number),
                    )
                } else {
                    Outcome::Passed
                }
            }
            Check::NotFirstLine => {
                if target.address == PROGRAM_BASE {
                    fail(
                        WarningCode::FirstLineTarget,
                        "First line as autorun target is not normally possible",
                    )
                } else {
                    Outcome::Passed
                }
            }
            Check::LineBoundary => {
                let previous = target.address.checked_sub(1).and_then(|a| target.snapshot.peek(a));
                if previous == Some(NEWLINE) {
                    Outcome::Passed
                } else {
                    fail(
                        WarningCode::NotLineBoundary,
                        format!(
                            "Autorun address {} may be corrupt; expected a line boundary",
                            target.address
                        ),
                    )
                }
            }
            Check::PrecedingSave => {
                let line = target
                    .program_offset()
                    .and_then(|offset| target.scanner.line_ending_at(offset));
                match line {
                    Some(line) if target.scanner.payload(&line).first() == Some(&SAVE) => {
                        context.save_line = Some(line);
                        Outcome::Passed
                    }
                    _ => fail(
                        WarningCode::PrecedingLineNotSave,
                        "Preceding line is not a SAVE statement",
                    ),
                }
            }
            Check::InvertedSaveName => {
                let Some(line) = context.save_line else {
                    return Outcome::Skipped;
                };
                let payload = target.scanner.payload(&line);
                let len = payload.len();
                let ok = len >= 3 && payload[len - 2] == QUOTE && is_inverted(payload[len - 3]);
                if ok {
                    Outcome::Passed
                } else {
                    fail(
                        WarningCode::SaveNameNotInverted,
                        format!(
                            "SAVE filename in line {} does not end with an inverted character",
                            line.number
                        ),
                    )
                }
            }
        }
    }
}

fn fail(code: WarningCode, message: impl Into<String>) -> Outcome {
    Outcome::Failed(Warning::new(code, message))
}

/// Run every check and collect the warnings.
pub fn run(target: &Target<'_>) -> Vec<Warning> {
    let mut context = Context::default();
    let mut warnings = Vec::new();

    for check in PIPELINE {
        let outcome = check.evaluate(target, &mut context);
        log::debug!("autorun check {:?}: {:?}", check, outcome);
        if let Outcome::Failed(warning) = outcome {
            warnings.push(warning);
        }
    }
    warnings
}
