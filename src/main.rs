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

//! TS1510 ROM Converter CLI
//!
//! Converts a ZX81 .P snapshot into TS1510 cartridge ROM images.

use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ts1510_rom::config::{AutorunRequest, ConvertOptions, MAX_LINE_NUMBER};
use ts1510_rom::error::format_error;
use ts1510_rom::output::{BankSink, Destination, FileSink, NullSink, WriterSink, STDIO_PATH};
use ts1510_rom::{Conversion, Snapshot};

/// ts1510-rom - Converts ZX81 .P files into TS1510 cartridge ROMs
#[derive(Parser, Debug)]
#[command(name = "ts1510-rom")]
#[command(version)]
#[command(about = "Converts ZX81 .P program snapshots into TS1510 cartridge ROM images")]
#[command(long_about = r#"
ts1510-rom packs a ZX81 BASIC program saved as a .P file into 8K ROM banks
for the TS1510 cartridge slot. A small loader at the start of bank A copies
the program back into RAM on power up and resumes it.

Programs larger than one bank continue in a second bank, written as
NAME_A.rom and NAME_B.rom.

Example usage:
  ts1510-rom maze.p
  ts1510-rom maze.p -v -a 100 -o maze.rom
  ts1510-rom -w demo.p
  cat maze.p | ts1510-rom -s > maze.rom
"#)]
struct Cli {
    /// Input .P file. Reads standard input when missing or '-'.
    input: Option<PathBuf>,

    /// Output file ('-' for standard output). Defaults to the input name with .rom.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Copy the BASIC variables as well
    #[arg(short = 'v', long = "vars")]
    vars: bool,

    /// Autorun line. A negative number disables autorun.
    #[arg(short, long, value_name = "LINE", allow_negative_numbers = true)]
    autorun: Option<i64>,

    /// Only write the used part of the last bank
    #[arg(short, long)]
    short: bool,

    /// Write bank A only
    #[arg(short = '1', long)]
    single: bool,

    /// Copy the whole snapshot including the system variables
    #[arg(short, long)]
    whole: bool,

    /// Show what would be written without writing anything
    #[arg(short, long)]
    info: bool,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let autorun = match cli.autorun.map(AutorunRequest::from_number) {
        None => AutorunRequest::SnapshotDefault,
        Some(Some(request)) => request,
        Some(None) => {
            eprintln!(
                "Error: Autorun line must be at most {} (or negative to disable)",
                MAX_LINE_NUMBER
            );
            return ExitCode::from(2);
        }
    };

    let destination = Destination::resolve(cli.input.as_deref(), cli.output.as_deref());
    let options = ConvertOptions {
        include_variables: cli.vars,
        autorun,
        short_output: cli.short,
        single_file: cli.single || destination.forces_single_file(),
        whole_snapshot: cli.whole,
        info_only: cli.info,
    };

    if options.include_variables && options.whole_snapshot {
        log::info!("Variables are part of the whole snapshot, -v has no extra effect");
    }

    let bytes = match read_input(cli.input.as_deref()) {
        Ok(bytes) => bytes,
        Err(e) => {
            let name = cli.input.as_deref().unwrap_or(Path::new(STDIO_PATH));
            eprintln!("Error: Cannot read {}: {}", name.display(), e);
            return ExitCode::from(3);
        }
    };

    let prepared = Snapshot::from_bytes(bytes).and_then(|s| Conversion::prepare(s, &options));
    let conversion = match prepared {
        Ok(conversion) => conversion,
        Err(e) => {
            eprint!("{}", format_error(&e));
            return ExitCode::from(1);
        }
    };

    let split = conversion.is_split_output();
    let result = if options.info_only {
        let mut sink = NullSink::new();
        conversion.write(&mut sink).map(|report| {
            for bank in &report.banks {
                log::info!(
                    "Would write {} bytes to {}",
                    bank.written,
                    destination.describe(bank.bank, split)
                );
            }
        })
    } else {
        let mut sink: Box<dyn BankSink> = match &destination {
            Destination::File(path) => Box::new(FileSink::new(path.clone(), split)),
            Destination::Stdout => Box::new(WriterSink::new(io::stdout().lock())),
        };
        conversion.write(sink.as_mut()).map(|report| {
            for bank in &report.banks {
                log::info!(
                    "Wrote {} bytes to {}",
                    bank.written,
                    destination.describe(bank.bank, split)
                );
            }
        })
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", format_error(&e));
            ExitCode::from(1)
        }
    }
}

/// Route log output to stderr as plain lines.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default()
        .filter_or("TS1510_LOG", level)
        .write_style_or("TS1510_LOG_STYLE", "never");
    env_logger::Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn read_input(input: Option<&Path>) -> io::Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new(STDIO_PATH) => std::fs::read(path),
        _ => {
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}
