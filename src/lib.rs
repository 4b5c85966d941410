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

//! TS1510 ROM Converter Library
//!
//! Turns a ZX81 .P snapshot into one or two 8K cartridge banks that restore
//! the program on power up.
//!
//! # Modules
//!
//! - [`error`] - Error and warning types
//! - [`config`] - Conversion options
//! - [`snapshot`] - .P file reader
//! - [`basic`] - Tokenized BASIC line scanner and lister
//! - [`layout`] - Distribution of program and variables over the banks
//! - [`autorun`] - Autorun target resolution and sanity checks
//! - [`rom`] - Bootstrap code and bank assembly
//! - [`output`] - Bank sinks and file naming
//!
//! # Example
//!
//! ```no_run
//! use ts1510_rom::{config::ConvertOptions, output::FileSink, snapshot::Snapshot, Conversion};
//!
//! fn convert(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshot = Snapshot::from_bytes(bytes)?;
//!     let conversion = Conversion::prepare(snapshot, &ConvertOptions::default())?;
//!
//!     let mut sink = FileSink::new("game.rom", conversion.is_split_output());
//!     conversion.write(&mut sink)?;
//!     Ok(())
//! }
//! ```

pub mod autorun;
pub mod basic;
pub mod config;
pub mod error;
pub mod layout;
pub mod output;
pub mod rom;
pub mod snapshot;

// Re-export commonly used types
pub use autorun::Autorun;
pub use config::{AutorunRequest, ConvertOptions};
pub use error::{format_error, ConvertError, ErrorCode, Result, Warning};
pub use layout::{Bank, LayoutPlan};
pub use snapshot::Snapshot;

use basic::{listing, LineScanner};
use output::BankSink;
use rom::{Assembler, AssemblyReport};
use snapshot::sysvars::PROGRAM_BASE;

/// The version of the converter.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the converter.
pub const NAME: &str = "ts1510-rom";

/// A snapshot with its layout and autorun target worked out.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Options used for the run.
    pub options: ConvertOptions,
    /// The snapshot as read.
    pub snapshot: Snapshot,
    /// Copy with a rewritten resume point, in whole-snapshot mode.
    pub patched: Option<Snapshot>,
    /// Bank layout.
    pub plan: LayoutPlan,
    /// Autorun target.
    pub autorun: Autorun,
}

impl Conversion {
    /// Plan a conversion.
    ///
    /// Fails before anything is written when the snapshot is truncated, too
    /// large for two banks, or when a requested autorun line cannot be found.
    /// Autorun doubts are logged as warnings and kept in [`Autorun::warnings`].
    pub fn prepare(snapshot: Snapshot, options: &ConvertOptions) -> Result<Self> {
        report_snapshot(&snapshot);

        snapshot.program()?;
        if options.copies_variables() {
            snapshot.variables()?;
        }
        if options.whole_snapshot {
            snapshot.whole()?;
        }

        let request = layout::LayoutRequest::for_snapshot(&snapshot, options);
        let plan = layout::plan(&request)?;
        report_plan(&plan);

        let resolution = autorun::resolve(options.autorun, &snapshot, options.whole_snapshot)?;
        report_autorun(&resolution.autorun, &snapshot);

        Ok(Self {
            options: options.clone(),
            snapshot,
            patched: resolution.patched,
            plan,
            autorun: resolution.autorun,
        })
    }

    /// The snapshot the banks are built from.
    pub fn source(&self) -> &Snapshot {
        self.patched.as_ref().unwrap_or(&self.snapshot)
    }

    /// An assembler configured for this conversion.
    pub fn assembler(&self) -> Assembler<'_> {
        Assembler::new(&self.plan, &self.autorun, self.source(), self.options.bootstrap())
            .short_output(self.options.short_output)
            .single_file(self.options.single_file)
    }

    /// Banks that [`Conversion::write`] will produce.
    pub fn banks(&self) -> Vec<Bank> {
        self.assembler().banks()
    }

    /// Whether more than one output file is produced.
    pub fn is_split_output(&self) -> bool {
        self.banks().len() > 1
    }

    /// Assemble the banks and hand them to `sink`.
    pub fn write(&self, sink: &mut dyn BankSink) -> Result<AssemblyReport> {
        self.assembler().write(sink)
    }
}

/// Read, plan and write in one go.
pub fn convert(
    bytes: Vec<u8>,
    options: &ConvertOptions,
    sink: &mut dyn BankSink,
) -> Result<AssemblyReport> {
    let snapshot = Snapshot::from_bytes(bytes)?;
    Conversion::prepare(snapshot, options)?.write(sink)
}

fn report_snapshot(snapshot: &Snapshot) {
    log::info!("Program:      {:5} ({} bytes)", PROGRAM_BASE, snapshot.program_size());
    log::info!(
        "Display file: {:5} ({} bytes)",
        snapshot.display_file_addr,
        snapshot.display_file_size()
    );
    log::info!(
        "Variables:    {:5} ({} bytes)",
        snapshot.variables_addr,
        snapshot.variables_size()
    );
    log::info!("E_LINE:       {:5}", snapshot.edit_line_addr);
    log::info!("CH_ADD:       {:5}", snapshot.char_add_addr);
    log::info!("NXTLIN:       {:5}", snapshot.next_line_addr);
    log::info!("CDFLAG:       {:5}", snapshot.cd_flag);
}

fn report_plan(plan: &LayoutPlan) {
    for (name, partition) in ["prog1", "prog2", "vars1", "vars2"].iter().zip(plan.partitions()) {
        if partition.placement.is_none() {
            continue;
        }
        log::debug!(
            "{}: {} bytes at ${:04X}",
            name,
            partition.length,
            partition.dest_address()
        );
    }
    if plan.split_across_banks() {
        log::info!("Image needs both banks");
    }
}

fn report_autorun(autorun: &Autorun, snapshot: &Snapshot) {
    match autorun.line_number() {
        None => log::info!("No autorun"),
        Some(number) => {
            log::info!("Autorun line {} at {}", number, autorun.address);
            if let Some((requested, found)) = autorun.mismatch() {
                log::info!("{} not found, using {}", requested, found);
            }
            list_around(autorun.address, snapshot);
        }
    }

    for warning in &autorun.warnings {
        log::warn!("{}", warning);
    }
}

/// Echo the autorun line and the line before it.
fn list_around(address: u16, snapshot: &Snapshot) {
    let Ok(program) = snapshot.program() else {
        return;
    };
    let Some(offset) = address.checked_sub(PROGRAM_BASE).map(usize::from) else {
        return;
    };

    let scanner = LineScanner::new(program, program.len());
    if let Some(previous) = scanner.line_ending_at(offset) {
        log::info!("  {}", listing::list(&scanner, &previous));
    }
    if let Some(line) = scanner.line_at(offset) {
        log::info!("> {}", listing::list(&scanner, &line));
    }
}
