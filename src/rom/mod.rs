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

//! ROM assembler.
//!
//! Fills one bank buffer at a time and hands it to a [`BankSink`]. Bank A
//! gets the bootstrap, the descriptor table (segment loader only) and its
//! partitions. Bank B gets whatever the layout placed there. Unused bytes
//! keep the erased-EPROM value [`FILL`].

pub mod bootstrap;

use crate::autorun::Autorun;
use crate::error::{ConvertError, ErrorCode, Result};
use crate::layout::{Bank, LayoutPlan, Partition, Source};
use crate::output::BankSink;
use crate::snapshot::Snapshot;
use bootstrap::{table, Bootstrap};

/// Value of unused ROM bytes.
pub const FILL: u8 = 0xFF;

/// Scratch buffer for one bank.
#[derive(Debug, Clone)]
pub struct RomBank {
    bytes: Vec<u8>,
}

impl RomBank {
    /// A blank bank of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![FILL; capacity],
        }
    }

    /// Blank the whole bank.
    pub fn reset(&mut self) {
        self.bytes.fill(FILL);
    }

    /// Copy `data` to `offset`.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let capacity = self.bytes.len();
        let target = self.bytes.get_mut(offset..offset + data.len()).ok_or_else(|| {
            ConvertError::new(
                ErrorCode::ImageTooLarge,
                format!(
                    "{} bytes at offset {} do not fit a {} byte bank",
                    data.len(),
                    offset,
                    capacity
                ),
            )
        })?;
        target.copy_from_slice(data);
        Ok(())
    }

    /// Store a little-endian word at `offset`.
    pub fn write_word(&mut self, offset: usize, value: u16) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    /// The whole bank.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// What was written for one bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankReport {
    pub bank: Bank,
    /// Bytes handed to the sink.
    pub written: usize,
    /// Bytes holding loader or data.
    pub used: usize,
}

/// What [`Assembler::write`] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub banks: Vec<BankReport>,
}

impl AssemblyReport {
    /// Total bytes written.
    pub fn total_written(&self) -> usize {
        self.banks.iter().map(|b| b.written).sum()
    }
}

/// Builds the bank images for a finished plan.
pub struct Assembler<'a> {
    plan: &'a LayoutPlan,
    autorun: &'a Autorun,
    snapshot: &'a Snapshot,
    bootstrap: Bootstrap,
    short_output: bool,
    single_file: bool,
}

impl<'a> Assembler<'a> {
    /// Create an assembler. `snapshot` must be the patched copy when the
    /// autorun resolver produced one.
    pub fn new(
        plan: &'a LayoutPlan,
        autorun: &'a Autorun,
        snapshot: &'a Snapshot,
        bootstrap: Bootstrap,
    ) -> Self {
        Self {
            plan,
            autorun,
            snapshot,
            bootstrap,
            short_output: false,
            single_file: false,
        }
    }

    /// Truncate the last bank to its used bytes.
    pub fn short_output(mut self, short: bool) -> Self {
        self.short_output = short;
        self
    }

    /// Write bank A only.
    pub fn single_file(mut self, single: bool) -> Self {
        self.single_file = single;
        self
    }

    /// Banks that will be handed to the sink.
    pub fn banks(&self) -> Vec<Bank> {
        if self.single_file || !self.plan.split_across_banks() {
            vec![Bank::A]
        } else {
            vec![Bank::A, Bank::B]
        }
    }

    /// Fill `rom` with the image of `bank`.
    pub fn build_bank(&self, bank: Bank, rom: &mut RomBank) -> Result<()> {
        rom.reset();

        if bank == Bank::A {
            rom.write_at(0, self.bootstrap.code())?;
            if self.bootstrap.uses_table() {
                self.write_table(rom)?;
            }
        }

        for partition in self.plan.placed_in(bank) {
            let Some(range) = partition.bank_range() else {
                continue;
            };
            let data = self.source(partition)?;
            log::debug!(
                "bank {}: {:?} bytes {}..{} at ${:04X}",
                bank.name(),
                partition.source,
                partition.source_offset,
                partition.source_offset + partition.length,
                partition.dest_address()
            );
            rom.write_at(range.start, data)?;
        }
        Ok(())
    }

    fn write_table(&self, rom: &mut RomBank) -> Result<()> {
        let plan = self.plan;
        rom.write_at(table::CD_FLAG, &[self.snapshot.cd_flag])?;

        let slots = [
            (&plan.prog1, table::PROG1_LEN, table::PROG1_SRC),
            (&plan.prog2, table::PROG2_LEN, table::PROG2_SRC),
            (&plan.vars1, table::VARS1_LEN, table::VARS1_SRC),
            (&plan.vars2, table::VARS2_LEN, table::VARS2_SRC),
        ];
        for (partition, len_slot, src_slot) in slots {
            let address = if partition.is_empty() {
                0
            } else {
                partition.dest_address()
            };
            rom.write_word(len_slot, partition.length as u16)?;
            rom.write_word(src_slot, address)?;
        }

        rom.write_at(table::AUTO_LINE, &self.autorun.line_bytes)?;
        rom.write_word(table::AUTO_ADDR, self.autorun.address)
    }

    fn source(&self, partition: &Partition) -> Result<&'a [u8]> {
        let region = match partition.source {
            Source::Program => self.snapshot.program()?,
            Source::Variables => self.snapshot.variables()?,
            Source::Snapshot => self.snapshot.whole()?,
        };
        region.get(partition.source_range()).ok_or_else(|| {
            ConvertError::new(
                ErrorCode::TruncatedInput,
                format!(
                    "Snapshot has no bytes {:?} for {:?}",
                    partition.source_range(),
                    partition.source
                ),
            )
        })
    }

    /// Build every bank and pass it to `sink`.
    ///
    /// On failure the sink is asked to discard what it already stored.
    pub fn write(&self, sink: &mut dyn BankSink) -> Result<AssemblyReport> {
        match self.write_banks(sink) {
            Ok(report) => Ok(report),
            Err(e) => {
                sink.discard();
                Err(e)
            }
        }
    }

    fn write_banks(&self, sink: &mut dyn BankSink) -> Result<AssemblyReport> {
        let banks = self.banks();
        if self.single_file && self.plan.split_across_banks() {
            log::warn!(
                "Single file output requested; bank B is not written and the image is incomplete"
            );
        }

        let mut rom = RomBank::new(self.plan.bank_capacity);
        let mut report = AssemblyReport::default();

        for (index, &bank) in banks.iter().enumerate() {
            self.build_bank(bank, &mut rom)?;

            let used = self.plan.bank_used(bank);
            let last = index + 1 == banks.len();
            let written = if self.short_output && last {
                used
            } else {
                self.plan.bank_capacity
            };

            log::info!("Bank {}: {} bytes used, {} bytes written", bank.name(), used, written);
            sink.write_bank(bank, &rom.as_bytes()[..written])?;
            report.banks.push(BankReport { bank, written, used });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autorun::{Origin, NO_AUTORUN};
    use crate::layout::{plan, LayoutRequest, BANK_SIZE};
    use crate::output::NullSink;
    use crate::snapshot::sysvars::{offset_of, PROGRAM_BASE};

    fn snapshot(program: &[u8], variables: &[u8]) -> Snapshot {
        let d_file = PROGRAM_BASE + program.len() as u16;
        let vars = d_file + 1;
        let e_line = vars + variables.len() as u16 + 1;
        let mut image = vec![0u8; offset_of(PROGRAM_BASE)];
        image[3..5].copy_from_slice(&d_file.to_le_bytes());
        image[7..9].copy_from_slice(&vars.to_le_bytes());
        image[11..13].copy_from_slice(&e_line.to_le_bytes());
        image[32..34].copy_from_slice(&d_file.to_le_bytes());
        image[50] = 0x40;
        image.extend_from_slice(program);
        image.push(0x76);
        image.extend_from_slice(variables);
        image.push(0x80);
        Snapshot::from_bytes(image).unwrap()
    }

    fn no_autorun(snapshot: &Snapshot) -> Autorun {
        Autorun {
            line_bytes: NO_AUTORUN,
            address: snapshot.display_file_addr,
            origin: Origin::Disabled,
            checked: false,
            warnings: Vec::new(),
        }
    }

    fn request(snapshot: &Snapshot, include_variables: bool) -> LayoutRequest {
        LayoutRequest {
            program_size: snapshot.program_size(),
            variables_size: snapshot.variables_size(),
            bank_capacity: BANK_SIZE,
            reserved: Bootstrap::Segment.reserved_size(),
            include_variables,
            whole_snapshot: false,
        }
    }

    fn word(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn test_rom_bank_bounds() {
        let mut rom = RomBank::new(4);
        rom.write_at(2, &[1, 2]).unwrap();
        assert_eq!(rom.as_bytes(), &[FILL, FILL, 1, 2]);
        assert!(rom.write_at(3, &[1, 2]).is_err());
        rom.reset();
        assert_eq!(rom.as_bytes(), &[FILL; 4]);
    }

    #[test]
    fn test_single_bank_image() {
        let snap = snapshot(&[0x00, 0x0A, 0x02, 0x00, 0xF5, 0x76], &[0x61, 0x62]);
        let plan = plan(&request(&snap, true)).unwrap();
        let autorun = no_autorun(&snap);
        let assembler = Assembler::new(&plan, &autorun, &snap, Bootstrap::Segment);

        let mut rom = RomBank::new(BANK_SIZE);
        assembler.build_bank(Bank::A, &mut rom).unwrap();
        let bytes = rom.as_bytes();

        assert_eq!(&bytes[..bootstrap::SEGMENT_LOADER.len()], bootstrap::SEGMENT_LOADER);
        assert_eq!(bytes[table::CD_FLAG], 0x40);
        assert_eq!(word(bytes, table::PROG1_LEN), 6);
        assert_eq!(word(bytes, table::PROG1_SRC), 0x2100);
        assert_eq!(word(bytes, table::VARS1_LEN), 2);
        assert_eq!(word(bytes, table::VARS1_SRC), 0x2106);
        assert_eq!(word(bytes, table::PROG2_LEN), 0);
        assert_eq!(word(bytes, table::PROG2_SRC), 0);
        assert_eq!(&bytes[table::AUTO_LINE..table::AUTO_LINE + 2], &NO_AUTORUN);
        assert_eq!(word(bytes, table::AUTO_ADDR), snap.display_file_addr);
        assert_eq!(&bytes[0x100..0x108], &[0x00, 0x0A, 0x02, 0x00, 0xF5, 0x76, 0x61, 0x62]);
        assert_eq!(bytes[0x108], FILL);
    }

    #[test]
    fn test_empty_partition_has_zero_address() {
        let snap = snapshot(&[0x00, 0x0A, 0x02, 0x00, 0xF5, 0x76], &[]);
        let plan = plan(&request(&snap, true)).unwrap();
        assert!(plan.vars1.placement.is_some());
        let autorun = no_autorun(&snap);

        let mut rom = RomBank::new(BANK_SIZE);
        Assembler::new(&plan, &autorun, &snap, Bootstrap::Segment)
            .build_bank(Bank::A, &mut rom)
            .unwrap();
        let bytes = rom.as_bytes();

        assert_eq!(word(bytes, table::VARS1_LEN), 0);
        assert_eq!(word(bytes, table::VARS1_SRC), 0);
        assert_eq!(word(bytes, table::PROG1_SRC), 0x2100);
    }

    #[test]
    fn test_short_output_truncates_last_bank() {
        let snap = snapshot(&[0x00, 0x0A, 0x02, 0x00, 0xF5, 0x76], &[]);
        let plan = plan(&request(&snap, false)).unwrap();
        let autorun = no_autorun(&snap);
        let mut sink = NullSink::new();

        let report = Assembler::new(&plan, &autorun, &snap, Bootstrap::Segment)
            .short_output(true)
            .write(&mut sink)
            .unwrap();

        assert_eq!(sink.banks, vec![(Bank::A, 0x106)]);
        assert_eq!(report.total_written(), 0x106);
    }

    #[test]
    fn test_split_writes_two_banks() {
        let program = vec![0x11; 8000];
        let snap = snapshot(&program, &[]);
        let plan = plan(&request(&snap, false)).unwrap();
        let autorun = no_autorun(&snap);

        let assembler = Assembler::new(&plan, &autorun, &snap, Bootstrap::Segment);
        assert_eq!(assembler.banks(), vec![Bank::A, Bank::B]);

        let mut sink = NullSink::new();
        assembler.short_output(true).write(&mut sink).unwrap();
        assert_eq!(sink.banks, vec![(Bank::A, BANK_SIZE), (Bank::B, 8000 - 7936)]);
    }

    #[test]
    fn test_single_file_writes_bank_a_only() {
        let program = vec![0x11; 8000];
        let snap = snapshot(&program, &[]);
        let plan = plan(&request(&snap, false)).unwrap();
        let autorun = no_autorun(&snap);

        let mut sink = NullSink::new();
        Assembler::new(&plan, &autorun, &snap, Bootstrap::Segment)
            .single_file(true)
            .write(&mut sink)
            .unwrap();
        assert_eq!(sink.banks, vec![(Bank::A, BANK_SIZE)]);
    }
}
