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

//! ZX81 character and token codes.

/// End of a program line.
pub const NEWLINE: u8 = 0x76;

/// Marks a hidden five byte floating point number after a numeric literal.
pub const NUMBER: u8 = 0x7E;

/// Bytes that follow [`NUMBER`].
pub const NUMBER_LEN: usize = 5;

/// The `"` character.
pub const QUOTE: u8 = 0x0B;

/// The `REM` keyword.
pub const REM: u8 = 0xEA;

/// The `SAVE` keyword.
pub const SAVE: u8 = 0xF8;

/// Whether `code` is an inverse video character.
pub fn is_inverted(code: u8) -> bool {
    (0x80..=0xBF).contains(&code)
}

const GRAPHICS: [&str; 11] = [
    " ", "▘", "▝", "▀", "▖", "▌", "▞", "▛", "▒", "\\,,", "\\~~",
];

const INVERSE_GRAPHICS: [&str; 11] = [
    "█", "▟", "▙", "▄", "▜", "▐", "▚", "▗", "[▒]", "[,,]", "[~~]",
];

const PUNCTUATION: &[u8; 17] = b"\"#$:?()><=+-*/;,.";

const KEYWORDS: [&str; 64] = [
    "\"\"", "AT ", "TAB ", "#", "CODE ", "VAL ", "LEN ", "SIN ",
    "COS ", "TAN ", "ASN ", "ACS ", "ATN ", "LN ", "EXP ", "INT ",
    "SQR ", "SGN ", "ABS ", "PEEK ", "USR ", "STR$ ", "CHR$ ", "NOT ",
    "**", " OR ", " AND ", "<=", ">=", "<>", " THEN", " TO ",
    " STEP ", " LPRINT ", " LLIST ", " STOP", " SLOW", " FAST", " NEW", " SCROLL",
    " CONT ", " DIM ", " REM ", " FOR ", " GOTO ", " GOSUB ", " INPUT ", " LOAD ",
    " LIST ", " LET ", " PAUSE ", " NEXT ", " POKE ", " PRINT ", " PLOT ", " RUN ",
    " SAVE ", " RAND ", " IF ", " CLS", " UNPLOT ", " CLEAR", " RETURN", " COPY",
];

/// Readable text for a character or token code.
///
/// Inverse characters are wrapped in square brackets. Codes with no printable
/// form come out as `#`.
pub fn glyph(code: u8) -> String {
    match code {
        0x00..=0x0A => GRAPHICS[code as usize].to_string(),
        0x0C => "£".to_string(),
        0x0B..=0x1B => char::from(PUNCTUATION[(code - 0x0B) as usize]).to_string(),
        0x1C..=0x25 => char::from(b'0' + (code - 0x1C)).to_string(),
        0x26..=0x3F => char::from(b'A' + (code - 0x26)).to_string(),
        0x40 => "RND".to_string(),
        0x41 => "INKEY$ ".to_string(),
        0x42 => "PI".to_string(),
        0x80..=0x8A => INVERSE_GRAPHICS[(code - 0x80) as usize].to_string(),
        0x8B..=0xBF => format!("[{}]", glyph(code - 0x80)),
        0xC0..=0xFF => KEYWORDS[(code - 0xC0) as usize].to_string(),
        _ => "#".to_string(),
    }
}
