//! logrot CLI binary.
//!
//! Entry point for the `logrot` command-line tool.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use logrot::exit::{codes, exit_code};
use logrot::{
    execute_rotate, execute_watch, Cli, Command, CommandError, RealSleeper, RotateArgs,
    RotationSummary, ShutdownFlag, StderrLogger, WatchArgs,
};
use logrot_clock::SystemClock;
use logrot_fs::{GzipCodec, RealFilesystem};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => codes::SUCCESS,
                _ => codes::INVALID_ARGS,
            };
            return ExitCode::from(code as u8);
        }
    };

    let result = match cli.command {
        Command::Rotate(args) => run_rotate(args),
        Command::Watch(args) => run_watch(args),
    };

    match result {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Print a pass summary as one JSON line on stdout.
fn print_summary(summary: &RotationSummary) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string(summary)?);
    Ok(())
}

/// Run the rotate command.
fn run_rotate(args: RotateArgs) -> Result<(), CommandError> {
    let logger = StderrLogger::from_count(args.rotation.verbose);
    let codec = GzipCodec::new(args.rotation.level);

    let summary = execute_rotate(&args, &RealFilesystem, &codec, &SystemClock, &logger)?;

    if args.rotation.json {
        print_summary(&summary)?;
    }

    Ok(())
}

/// Run the watch command until Ctrl+C or `--max-passes`.
fn run_watch(args: WatchArgs) -> Result<(), CommandError> {
    let logger = StderrLogger::from_count(args.rotation.verbose);
    let codec = GzipCodec::new(args.rotation.level);
    let shutdown = ShutdownFlag::new();
    let json = args.rotation.json;

    let result = execute_watch(
        &args,
        &RealFilesystem,
        &codec,
        &SystemClock,
        &logger,
        &RealSleeper::new(),
        &shutdown,
        |summary| {
            if json {
                print_summary(summary)?;
            }
            Ok(())
        },
    )?;

    if result.interrupted {
        eprintln!(
            "Stopped after {} passes ({} rotated, {} failed)",
            result.passes, result.rotated, result.failed
        );
    }

    Ok(())
}
