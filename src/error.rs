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

//! Error and warning types for the ROM converter.
//!
//! Fatal conditions are [`ConvertError`]s and abort the run. Heuristic
//! findings about the autorun target are [`Warning`]s; they are reported but
//! never stop a ROM image from being produced.

use thiserror::Error;

/// Error codes for fatal conversion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Input errors (E001-E009)
    MalformedInput,
    TruncatedInput,

    // Layout errors (E010-E019)
    ImageTooLarge,

    // Autorun errors (E020-E029)
    AutorunLineNotFound,

    // Output errors (E030-E039)
    OutputUnavailable,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedInput => "E001",
            ErrorCode::TruncatedInput => "E002",
            ErrorCode::ImageTooLarge => "E010",
            ErrorCode::AutorunLineNotFound => "E020",
            ErrorCode::OutputUnavailable => "E030",
        }
    }
}

/// A fatal conversion error.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct ConvertError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl ConvertError {
    /// Create a new conversion error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    /// Add a hint to this error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the error code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }
}

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Codes for autorun sanity warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    AddressBeforeProgram,
    AddressPastProgram,
    AddressUnreadable,
    LineNumberOutOfRange,
    FirstLineTarget,
    NotLineBoundary,
    PrecedingLineNotSave,
    SaveNameNotInverted,
}

impl WarningCode {
    /// Get the numeric code for this warning.
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::AddressBeforeProgram => "W001",
            WarningCode::AddressPastProgram => "W002",
            WarningCode::AddressUnreadable => "W003",
            WarningCode::LineNumberOutOfRange => "W004",
            WarningCode::FirstLineTarget => "W005",
            WarningCode::NotLineBoundary => "W006",
            WarningCode::PrecedingLineNotSave => "W007",
            WarningCode::SaveNameNotInverted => "W008",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A non-fatal finding about the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The warning code.
    pub code: WarningCode,
    /// The warning message.
    pub message: String,
}

impl Warning {
    /// Create a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "warning[{}]: {}", self.code, self.message)
    }
}

/// Format an error for the terminal.
pub fn format_error(error: &ConvertError) -> String {
    let mut output = format!("error[{}]: {}\n", error.code_str(), error.message);

    if let Some(hint) = &error.hint {
        output.push_str(&format!("  = hint: {}\n", hint));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(ErrorCode::MalformedInput.code(), "E001");
        assert_eq!(ErrorCode::ImageTooLarge.code(), "E010");
        assert_eq!(ErrorCode::OutputUnavailable.code(), "E030");
    }

    #[test]
    fn test_convert_error_display() {
        let error = ConvertError::new(ErrorCode::TruncatedInput, "snapshot ends early")
            .with_hint("Was the file saved completely?");

        assert_eq!(error.to_string(), "[E002] snapshot ends early");
        assert_eq!(error.code_str(), "E002");
        assert!(error.hint.is_some());
    }

    #[test]
    fn test_format_error_with_hint() {
        let error = ConvertError::new(ErrorCode::ImageTooLarge, "too big").with_hint("drop -v");
        let text = format_error(&error);
        assert_eq!(text, "error[E010]: too big\n  = hint: drop -v\n");
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::new(WarningCode::FirstLineTarget, "first line");
        assert_eq!(warning.to_string(), "warning[W005]: first line");
    }
}
