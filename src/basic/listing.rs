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

//! Readable listing of single program lines, used to echo the autorun target.

use super::scanner::{LineHeader, LineScanner};
use super::tokens::{glyph, NEWLINE, NUMBER, NUMBER_LEN, REM};

/// Render a line as text, e.g. `  10 SAVE "AUT[O]"`.
///
/// The hidden float after a numeric literal is skipped, except in REM lines
/// where the bytes may be machine code.
pub fn list_line(number: u16, payload: &[u8]) -> String {
    let mut text = format!("{:4}", number);
    let is_rem = payload.first() == Some(&REM);
    let body = match payload.last() {
        Some(&NEWLINE) => &payload[..payload.len() - 1],
        _ => payload,
    };

    let mut index = 0;
    while index < body.len() {
        let code = body[index];
        if code == NUMBER && !is_rem {
            index += NUMBER_LEN + 1;
            continue;
        }
        text.push_str(&glyph(code));
        index += 1;
    }
    text
}

/// Render the line described by `line`.
pub fn list(scanner: &LineScanner<'_>, line: &LineHeader) -> String {
    list_line(line.number, scanner.payload(line))
}
