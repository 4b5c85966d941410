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

//! Z80 bootstrap loaders placed at the start of bank A.
//!
//! The TS1510 maps bank A at $2000 and bank B at $8000. On power up the
//! loader clears BASIC RAM, rebuilds the stack, copies the ROM-resident data
//! back to RAM and resumes the interpreter.
//!
//! Two loaders exist:
//!
//! - [`Bootstrap::Segment`] copies program and variables as separate blocks
//!   described by a table at the end of the reserved area and rebuilds the
//!   display file itself.
//! - [`Bootstrap::WholeSnapshot`] copies the whole .P image back to `VERSN`
//!   and reads the copy length from the `E_LINE` it just placed in ROM.

/// Table slot offsets in bank A used by the segment loader.
pub mod table {
    /// `CDFLAG` from the snapshot (byte).
    pub const CD_FLAG: usize = 0xEB;
    /// Length of variables block 2.
    pub const VARS2_LEN: usize = 0xEC;
    /// ROM address of variables block 2.
    pub const VARS2_SRC: usize = 0xEE;
    /// Length of variables block 1.
    pub const VARS1_LEN: usize = 0xF0;
    /// ROM address of variables block 1.
    pub const VARS1_SRC: usize = 0xF2;
    /// Length of program block 2.
    pub const PROG2_LEN: usize = 0xF4;
    /// ROM address of program block 2.
    pub const PROG2_SRC: usize = 0xF6;
    /// Autorun line number bytes, high byte first.
    pub const AUTO_LINE: usize = 0xF8;
    /// Length of program block 1.
    pub const PROG1_LEN: usize = 0xFA;
    /// Autorun line address.
    pub const AUTO_ADDR: usize = 0xFC;
    /// ROM address of program block 1.
    pub const PROG1_SRC: usize = 0xFE;

    /// First table byte.
    pub const START: usize = CD_FLAG;
}

/// Segment loader. Reads its parameters from [`table`].
pub const SEGMENT_LOADER: &[u8] = &[
    0x01, 0x00, 0x00, //       ld bc,$0000
    0xD3, 0xFD, //             out ($FD),a
    0xF3, //                   di
    0x2A, 0x04, 0x40, //       ld hl,(RAMTOP)
    0x54, //                   ld d,h
    0x5D, //                   ld e,l
    0x2B, //                   dec hl
    0x3E, 0x3F, //             ld a,$3F
    0x36, 0x00, //       clr:  ld (hl),$00
    0x2B, //                   dec hl
    0xBC, //                   cp h
    0x20, 0xFA, //             jr nz,clr
    0xEB, //                   ex de,hl
    0x22, 0x04, 0x40, //       ld (RAMTOP),hl
    0x2B, //                   dec hl
    0x36, 0x3E, //             ld (hl),$3E
    0x2B, //                   dec hl
    0xF9, //                   ld sp,hl
    0x2B, //                   dec hl
    0x2B, //                   dec hl
    0x22, 0x02, 0x40, //       ld (ERR_SP),hl
    0x3E, 0x1E, //             ld a,$1E
    0xED, 0x47, //             ld i,a
    0xED, 0x56, //             im 1
    0xFD, 0x21, 0x00, 0x40, // ld iy,$4000
    0x3A, 0xEB, 0x20, //       ld a,(CD_FLAG)
    0xFD, 0x77, 0x3B, //       ld (iy+$3B),a
    0x2A, 0xFE, 0x20, //       ld hl,(PROG1_SRC)
    0x11, 0x7D, 0x40, //       ld de,$407D
    0xED, 0x4B, 0xFA, 0x20, // ld bc,(PROG1_LEN)
    0xED, 0xB0, //             ldir
    0xED, 0x4B, 0xF4, 0x20, // ld bc,(PROG2_LEN)
    0x78, //                   ld a,b
    0xB1, //                   or c
    0x28, 0x05, //             jr z,dfile
    0x2A, 0xF6, 0x20, //       ld hl,(PROG2_SRC)
    0xED, 0xB0, //             ldir
    0xEB, //           dfile:  ex de,hl
    0x22, 0x0C, 0x40, //       ld (D_FILE),hl
    0x06, 0x19, //             ld b,25
    0x3E, 0x76, //             ld a,NEWLINE
    0x77, //           nl:     ld (hl),a
    0x23, //                   inc hl
    0x10, 0xFC, //             djnz nl
    0x22, 0x10, 0x40, //       ld (VARS),hl
    0xCD, 0x9A, 0x14, //       call $149A
    0xCD, 0xAD, 0x14, //       call $14AD
    0xCD, 0x07, 0x02, //       call $0207
    0xCD, 0x2A, 0x0A, //       call $0A2A
    0xED, 0x4B, 0xF0, 0x20, // ld bc,(VARS1_LEN)
    0x78, //                   ld a,b
    0xB1, //                   or c
    0x28, 0x25, //             jr z,auto
    0x2A, 0xEC, 0x20, //       ld hl,(VARS2_LEN)
    0x09, //                   add hl,bc
    0x44, //                   ld b,h
    0x4D, //                   ld c,l
    0x2A, 0x14, 0x40, //       ld hl,(E_LINE)
    0x2B, //                   dec hl
    0xCD, 0x9E, 0x09, //       call $099E
    0x23, //                   inc hl
    0xEB, //                   ex de,hl
    0x2A, 0xF2, 0x20, //       ld hl,(VARS1_SRC)
    0xED, 0x4B, 0xF0, 0x20, // ld bc,(VARS1_LEN)
    0xED, 0xB0, //             ldir
    0xED, 0x4B, 0xEC, 0x20, // ld bc,(VARS2_LEN)
    0x78, //                   ld a,b
    0xB1, //                   or c
    0x28, 0x05, //             jr z,auto
    0x2A, 0xEE, 0x20, //       ld hl,(VARS2_SRC)
    0xED, 0xB0, //             ldir
    0xED, 0x4B, 0xF8, 0x20, // auto: ld bc,(AUTO_LINE)
    0xED, 0x5B, 0xFC, 0x20, // ld de,(AUTO_ADDR)
    0x62, //                   ld h,d
    0x6B, //                   ld l,e
    0x1B, //                   dec de
    0xED, 0x53, 0x16, 0x40, // ld (CH_ADD),de
    0xED, 0x43, 0x07, 0x40, // ld (PPC),bc
    0xFD, 0x36, 0x22, 0x02, // ld (iy+$22),$02
    0xFD, 0x36, 0x01, 0x80, // ld (iy+$01),$80
    0x3E, 0xFF, //             ld a,$FF
    0x32, 0x7C, 0x40, //       ld ($407C),a
    0xC3, 0x6C, 0x06, //       jp $066C
];

/// Whole-snapshot loader. Data starts at $2080.
pub const WHOLE_SNAPSHOT_LOADER: &[u8] = &[
    0x01, 0x00, 0x00, //       ld bc,$0000
    0xD3, 0xFD, //             out ($FD),a
    0xF3, //                   di
    0x2A, 0x04, 0x40, //       ld hl,(RAMTOP)
    0x54, //                   ld d,h
    0x5D, //                   ld e,l
    0x2B, //                   dec hl
    0x3E, 0x3F, //             ld a,$3F
    0x36, 0x00, //       clr:  ld (hl),$00
    0x2B, //                   dec hl
    0xBC, //                   cp h
    0x20, 0xFA, //             jr nz,clr
    0xEB, //                   ex de,hl
    0x22, 0x04, 0x40, //       ld (RAMTOP),hl
    0x2B, //                   dec hl
    0x36, 0x3E, //             ld (hl),$3E
    0x2B, //                   dec hl
    0xF9, //                   ld sp,hl
    0x2B, //                   dec hl
    0x2B, //                   dec hl
    0x22, 0x02, 0x40, //       ld (ERR_SP),hl
    0x3E, 0x1E, //             ld a,$1E
    0xED, 0x47, //             ld i,a
    0xED, 0x56, //             im 1
    0xFD, 0x21, 0x00, 0x40, // ld iy,$4000
    0x2A, 0x8B, 0x20, //       ld hl,($208B)      E_LINE in the ROM copy
    0x01, 0xF7, 0xBF, //       ld bc,-$4009
    0x09, //                   add hl,bc
    0x11, 0x80, 0x1F, //       ld de,$1F80        bank A free space
    0xB7, //                   or a
    0xED, 0x52, //             sbc hl,de
    0x30, 0x08, //             jr nc,split
    0x19, //                   add hl,de
    0x44, //                   ld b,h
    0x4D, //                   ld c,l
    0x21, 0x00, 0x00, //       ld hl,$0000
    0x18, 0x02, //             jr copy
    0x42, //           split:  ld b,d
    0x4B, //                   ld c,e
    0xE5, //           copy:   push hl
    0x21, 0x80, 0x20, //       ld hl,$2080
    0x11, 0x09, 0x40, //       ld de,$4009
    0xED, 0xB0, //             ldir
    0xC1, //                   pop bc
    0x78, //                   ld a,b
    0xB1, //                   or c
    0x28, 0x05, //             jr z,run
    0x21, 0x00, 0x80, //       ld hl,$8000
    0xED, 0xB0, //             ldir
    0x2A, 0x29, 0x40, //  run: ld hl,(NXTLIN)
    0xC3, 0x6C, 0x06, //       jp $066C
];

/// Bootstrap variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Program and variables copied as separate blocks.
    Segment,
    /// The whole .P image copied back verbatim.
    WholeSnapshot,
}

impl Bootstrap {
    /// The loader machine code.
    pub fn code(&self) -> &'static [u8] {
        match self {
            Bootstrap::Segment => SEGMENT_LOADER,
            Bootstrap::WholeSnapshot => WHOLE_SNAPSHOT_LOADER,
        }
    }

    /// Bytes at the start of bank A reserved for the loader and its table.
    pub fn reserved_size(&self) -> usize {
        match self {
            Bootstrap::Segment => 0x0100,
            Bootstrap::WholeSnapshot => 0x0080,
        }
    }

    /// Whether the loader reads the descriptor table.
    pub fn uses_table(&self) -> bool {
        matches!(self, Bootstrap::Segment)
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Bootstrap::Segment => "segment",
            Bootstrap::WholeSnapshot => "whole-snapshot",
        }
    }
}
