// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   Backup | BackupSingle | Restore | Snapshot | Version
//! ```

use std::process::ExitCode;

use repovault::cli::global::GlobalOptions;
use repovault::cli::snapshot::SnapshotCommand;
use repovault::cli::{self, Command};
use repovault::cmd::backup::{run_backup_command, run_backup_single_command};
use repovault::cmd::restore::run_restore_command;
use repovault::cmd::snapshot::run_snapshot_list_command;
use repovault::config::Config;
use repovault::error::VaultError;
use repovault::logging::init_logging;
use repovault::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli)
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Backup(args)) => {
            load_config(&cli.global).and_then(|config| run_backup_command(args, &config))
        }
        Some(Command::BackupSingle(args)) => {
            load_config(&cli.global).and_then(|config| run_backup_single_command(args, &config))
        }
        Some(Command::Restore(args)) => {
            load_config(&cli.global).and_then(|config| run_restore_command(args, &config))
        }
        Some(Command::Snapshot(SnapshotCommand::List(args))) => {
            load_config(&cli.global).and_then(|config| run_snapshot_list_command(args, &config))
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code_for(&e)
        }
    }
}

/// Maps an error to the process exit code, echoing git's own exit code when
/// the failure carries one.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    error
        .downcast_ref::<VaultError>()
        .and_then(VaultError::exit_code)
        .and_then(|code| u8::try_from(code.clamp(1, 255)).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from)
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn load_config(global: &GlobalOptions) -> repovault::error::Result<Config> {
    Config::load(&global.configs).map_err(|e| {
        eprintln!("Failed to load config: {e}");
        e
    })
}
