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

//! End-to-end CLI integration tests.

mod common;

use common::*;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ts1510-rom"))
}

fn run(args: &[&str], dir: &Path) -> Output {
    cargo_bin()
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute command")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Test --help flag.
#[test]
fn test_help_flag() {
    let output = cargo_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ts1510-rom"));
    assert!(stdout.contains("--vars"));
    assert!(stdout.contains("--autorun"));
    assert!(stdout.contains("--whole"));
}

/// Test --version flag.
#[test]
fn test_version_flag() {
    let output = cargo_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ts1510-rom"));
    assert!(stdout.contains("0.1.0"));
}

/// Test converting a small program to one ROM file.
#[test]
fn test_convert_single_bank() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("maze.p");
    std::fs::write(&input, PFile::new(program_with_lines(&[10, 20])).build()).unwrap();

    let output = run(&["maze.p"], dir.path());
    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));

    let rom = std::fs::read(dir.path().join("maze.rom")).unwrap();
    assert_eq!(rom.len(), 8192);
    assert_eq!(rom[0], 0x01);
    assert!(!dir.path().join("maze_A.rom").exists());
}

/// Test a large program producing two files.
#[test]
fn test_convert_two_banks() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("big.p");
    std::fs::write(&input, PFile::new(program_of_size(9000)).build()).unwrap();

    let output = run(&["big.p", "--short"], dir.path());
    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));

    let a = std::fs::read(dir.path().join("big_A.rom")).unwrap();
    let b = std::fs::read(dir.path().join("big_B.rom")).unwrap();
    assert_eq!(a.len(), 8192);
    assert_eq!(b.len(), 9000 - 7936);
    assert!(!dir.path().join("big.rom").exists());
}

/// Test single file output for a two bank image.
#[test]
fn test_single_file_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("big.p"), PFile::new(program_of_size(9000)).build()).unwrap();

    let output = run(&["big.p", "-1", "-o", "cart.rom"], dir.path());
    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));

    assert!(dir.path().join("cart.rom").exists());
    assert!(!dir.path().join("cart_B.rom").exists());
    assert!(stderr(&output).contains("bank B is not written"));
}

/// Test that an oversized program leaves no files behind.
#[test]
fn test_oversize_creates_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let huge = PFile::new(program_of_size(2 * 8192 + 1)).build();
    std::fs::write(dir.path().join("huge.p"), huge).unwrap();

    let output = run(&["huge.p"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E010]"));

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the input should remain");
}

/// Test info mode writes nothing.
#[test]
fn test_info_only() {
    let dir = tempfile::tempdir().unwrap();
    let maze = PFile::new(program_with_lines(&[10])).build();
    std::fs::write(dir.path().join("maze.p"), maze).unwrap();

    let output = run(&["maze.p", "-i"], dir.path());
    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));
    assert!(stderr(&output).contains("Would write 8192 bytes to maze.rom"));
    assert!(!dir.path().join("maze.rom").exists());
}

/// Test reading stdin and writing stdout.
#[test]
fn test_stdin_to_stdout() {
    let mut child = cargo_bin()
        .arg("-s")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");

    let input = PFile::new(program_with_lines(&[10, 20])).build();
    child.stdin.take().unwrap().write_all(&input).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));
    assert_eq!(output.stdout.len(), 0x100 + 12);
    assert_eq!(&output.stdout[0x100..], &program_with_lines(&[10, 20])[..]);
}

/// Test a file that is not a .P snapshot.
#[test]
fn test_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("text.p"), b"10 PRINT \"HELLO\"\n").unwrap();

    let output = run(&["text.p"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E001]"));
    assert!(!dir.path().join("text.rom").exists());
}

/// Test a missing input file.
#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["nothing.p"], dir.path());
    assert_eq!(output.status.code(), Some(3));
}

/// Test an autorun line above 9999.
#[test]
fn test_autorun_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let maze = PFile::new(program_with_lines(&[10])).build();
    std::fs::write(dir.path().join("maze.p"), maze).unwrap();

    let output = run(&["maze.p", "-a", "10000"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

/// Test autorun options reach the table.
#[test]
fn test_autorun_options() {
    let dir = tempfile::tempdir().unwrap();
    let maze = PFile::new(program_with_lines(&[10, 400, 600])).build();
    std::fs::write(dir.path().join("maze.p"), maze).unwrap();

    let output = run(&["maze.p", "-a", "500"], dir.path());
    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));
    assert!(stderr(&output).contains("500 not found, using 600"));
    assert!(stderr(&output).contains("warning[W007]"));
    let rom = std::fs::read(dir.path().join("maze.rom")).unwrap();
    assert_eq!(&rom[0xF8..0xFA], &[0x02, 0x58]);

    let output = run(&["maze.p", "--autorun=-1"], dir.path());
    assert!(output.status.success(), "Conversion failed: {}", stderr(&output));
    let rom = std::fs::read(dir.path().join("maze.rom")).unwrap();
    assert_eq!(&rom[0xF8..0xFA], &[254, 255]);
}
