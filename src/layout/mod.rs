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

//! Layout planner.
//!
//! Decides how the program and variable bytes are spread over the 8K banks of
//! the cartridge. Bank A starts with the bootstrap, so only the space behind
//! it is free for data. Anything that does not fit continues at the start of
//! bank B.
//!
//! The result is an immutable [`LayoutPlan`] with up to four partitions:
//!
//! | partition | holds |
//! |-----------|-------|
//! | `prog1` | program bytes in bank A (or the whole image in whole-snapshot mode) |
//! | `prog2` | the rest of the program in bank B |
//! | `vars1` | variables, directly behind the last program block |
//! | `vars2` | the rest of the variables in bank B |

use std::ops::Range;

use crate::config::ConvertOptions;
use crate::error::{ConvertError, ErrorCode, Result};
use crate::snapshot::Snapshot;

/// Size of one cartridge bank.
pub const BANK_SIZE: usize = 8192;

/// A cartridge bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bank {
    /// First 8K, mapped at $2000.
    A,
    /// Second 8K, mapped at $8000.
    B,
}

impl Bank {
    /// All banks in output order.
    pub const ALL: [Bank; 2] = [Bank::A, Bank::B];

    /// Address the bank is mapped at.
    pub fn base_address(&self) -> u16 {
        match self {
            Bank::A => 0x2000,
            Bank::B => 0x8000,
        }
    }

    /// Letter used in file names and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Bank::A => "A",
            Bank::B => "B",
        }
    }
}

/// Where a partition's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The BASIC program.
    Program,
    /// The variables area.
    Variables,
    /// The whole .P image from `VERSN` to `E_LINE`.
    Snapshot,
}

/// Position of a partition inside a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The bank holding the bytes.
    pub bank: Bank,
    /// Offset from the start of the bank.
    pub offset: usize,
}

/// One contiguous run of source bytes stored in one bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Where the bytes come from.
    pub source: Source,
    /// Offset into the source region.
    pub source_offset: usize,
    /// Number of bytes.
    pub length: usize,
    /// Where the bytes go. `None` for partitions that are not used.
    pub placement: Option<Placement>,
}

impl Partition {
    fn placed(
        source: Source,
        source_offset: usize,
        length: usize,
        bank: Bank,
        offset: usize,
    ) -> Self {
        Self {
            source,
            source_offset,
            length,
            placement: Some(Placement { bank, offset }),
        }
    }

    fn unused(source: Source) -> Self {
        Self {
            source,
            source_offset: 0,
            length: 0,
            placement: None,
        }
    }

    /// Whether this partition holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The bank the partition is stored in.
    pub fn bank(&self) -> Option<Bank> {
        self.placement.map(|p| p.bank)
    }

    /// Address the bytes appear at while the cartridge is mapped, or zero
    /// for an unused partition.
    pub fn dest_address(&self) -> u16 {
        match self.placement {
            Some(p) => p.bank.base_address() + p.offset as u16,
            None => 0,
        }
    }

    /// Range of source bytes.
    pub fn source_range(&self) -> Range<usize> {
        self.source_offset..self.source_offset + self.length
    }

    /// Range of bank bytes, if placed.
    pub fn bank_range(&self) -> Option<Range<usize>> {
        self.placement.map(|p| p.offset..p.offset + self.length)
    }
}

/// Inputs of the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRequest {
    /// Program size, or the whole image size in whole-snapshot mode.
    pub program_size: usize,
    /// Variables size, without the end marker.
    pub variables_size: usize,
    /// Capacity of one bank.
    pub bank_capacity: usize,
    /// Bytes at the start of bank A taken by the bootstrap.
    pub reserved: usize,
    /// Place the variables too.
    pub include_variables: bool,
    /// Treat `program_size` as one opaque image.
    pub whole_snapshot: bool,
}

impl LayoutRequest {
    /// Build the request for a snapshot and a set of options.
    pub fn for_snapshot(snapshot: &Snapshot, options: &ConvertOptions) -> Self {
        let program_size = if options.whole_snapshot {
            snapshot.whole_size()
        } else {
            snapshot.program_size()
        };
        let variables_size = if options.copies_variables() {
            snapshot.variables_size()
        } else {
            0
        };

        Self {
            program_size,
            variables_size,
            bank_capacity: BANK_SIZE,
            reserved: options.bootstrap().reserved_size(),
            include_variables: options.copies_variables(),
            whole_snapshot: options.whole_snapshot,
        }
    }

    /// Data space left in bank A.
    pub fn free_space(&self) -> usize {
        self.bank_capacity.saturating_sub(self.reserved)
    }
}

/// The finished layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    /// First program block, always in bank A.
    pub prog1: Partition,
    /// Second program block, in bank B.
    pub prog2: Partition,
    /// First variables block.
    pub vars1: Partition,
    /// Second variables block, in bank B.
    pub vars2: Partition,
    /// Capacity of one bank.
    pub bank_capacity: usize,
    /// Bytes reserved for the bootstrap in bank A.
    pub reserved: usize,
}

impl LayoutPlan {
    /// All four partitions in table order.
    pub fn partitions(&self) -> [&Partition; 4] {
        [&self.prog1, &self.prog2, &self.vars1, &self.vars2]
    }

    /// Whether any data lives in bank B.
    pub fn split_across_banks(&self) -> bool {
        self.partitions()
            .iter()
            .any(|p| !p.is_empty() && p.bank() == Some(Bank::B))
    }

    /// Number of banks the image needs.
    pub fn bank_count(&self) -> usize {
        if self.split_across_banks() {
            2
        } else {
            1
        }
    }

    /// Non-empty partitions stored in `bank`.
    pub fn placed_in(&self, bank: Bank) -> impl Iterator<Item = &Partition> + '_ {
        self.partitions()
            .into_iter()
            .filter(move |p| !p.is_empty() && p.bank() == Some(bank))
    }

    /// Bytes of `bank` in use, counted from its start.
    pub fn bank_used(&self, bank: Bank) -> usize {
        let floor = if bank == Bank::A { self.reserved } else { 0 };
        self.placed_in(bank)
            .filter_map(|p| p.bank_range())
            .map(|r| r.end)
            .fold(floor, usize::max)
    }
}

/// Plan the layout for a request.
pub fn plan(request: &LayoutRequest) -> Result<LayoutPlan> {
    if request.whole_snapshot {
        plan_whole_snapshot(request)
    } else {
        plan_segments(request)
    }
}

fn plan_whole_snapshot(request: &LayoutRequest) -> Result<LayoutPlan> {
    let free = request.free_space();
    let size = request.program_size;
    let first = size.min(free);
    let rest = size - first;

    let prog2 = if rest > 0 {
        check_bank_b("snapshot image", rest, request.bank_capacity)?;
        Partition::placed(Source::Snapshot, first, rest, Bank::B, 0)
    } else {
        Partition::unused(Source::Snapshot)
    };

    Ok(LayoutPlan {
        prog1: Partition::placed(Source::Snapshot, 0, first, Bank::A, request.reserved),
        prog2,
        vars1: Partition::unused(Source::Variables),
        vars2: Partition::unused(Source::Variables),
        bank_capacity: request.bank_capacity,
        reserved: request.reserved,
    })
}

fn plan_segments(request: &LayoutRequest) -> Result<LayoutPlan> {
    let free = request.free_space();
    let program_size = request.program_size;
    let variables_size = request.variables_size;
    let reserved = request.reserved;

    let mut plan = LayoutPlan {
        prog1: Partition::unused(Source::Program),
        prog2: Partition::unused(Source::Program),
        vars1: Partition::unused(Source::Variables),
        vars2: Partition::unused(Source::Variables),
        bank_capacity: request.bank_capacity,
        reserved,
    };

    if program_size > free {
        let rest = program_size - free;
        plan.prog1 = Partition::placed(Source::Program, 0, free, Bank::A, reserved);
        plan.prog2 = Partition::placed(Source::Program, free, rest, Bank::B, 0);

        if request.include_variables {
            check_bank_b(
                "program remainder and variables",
                rest + variables_size,
                request.bank_capacity,
            )?;
            plan.vars1 = Partition::placed(Source::Variables, 0, variables_size, Bank::B, rest);
        } else {
            check_bank_b("program remainder", rest, request.bank_capacity)?;
        }
        return Ok(plan);
    }

    plan.prog1 = Partition::placed(Source::Program, 0, program_size, Bank::A, reserved);
    if !request.include_variables {
        return Ok(plan);
    }

    let remaining = free - program_size;
    let vars_offset = reserved + program_size;
    if variables_size <= remaining {
        plan.vars1 = Partition::placed(Source::Variables, 0, variables_size, Bank::A, vars_offset);
    } else if remaining == 0 {
        // The loader skips all variables when block 1 is empty, so a full
        // bank A moves them to bank B in one piece.
        check_bank_b("variables", variables_size, request.bank_capacity)?;
        plan.vars1 = Partition::placed(Source::Variables, 0, variables_size, Bank::B, 0);
    } else {
        let rest = variables_size - remaining;
        check_bank_b("variables remainder", rest, request.bank_capacity)?;
        plan.vars1 = Partition::placed(Source::Variables, 0, remaining, Bank::A, vars_offset);
        plan.vars2 = Partition::placed(Source::Variables, remaining, rest, Bank::B, 0);
    }
    Ok(plan)
}

fn check_bank_b(what: &str, needed: usize, capacity: usize) -> Result<()> {
    if needed <= capacity {
        return Ok(());
    }
    Err(ConvertError::new(
        ErrorCode::ImageTooLarge,
        format!(
            "The {} needs {} bytes in bank B, but a bank holds only {}",
            what, needed, capacity
        ),
    )
    .with_hint("Only two 8K banks are supported; try leaving out the variables"))
}
