// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for repovault using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! repovault [global options] <command>
//! backup <source-dir> <backup-root>
//! backup-single <repository> <backup-url>
//! restore <backup-path> [restore-to]
//! snapshot list [source-dir]
//! version
//! ```

pub mod backup;
pub mod global;
pub mod restore;
pub mod snapshot;

#[cfg(test)]
mod tests;

use crate::cli::backup::{BackupArgs, BackupSingleArgs};
use crate::cli::global::GlobalOptions;
use crate::cli::restore::RestoreArgs;
use crate::cli::snapshot::SnapshotCommand;
use crate::git::DirectoryFilter;
use clap::{Parser, Subcommand};

/// Git Working-State Backup Tool
///
/// Backs up git repositories including their uncommitted changes.
#[derive(Debug, Parser)]
#[command(
    name = "repovault",
    author,
    version,
    about = "Git working-state backup tool",
    long_about = "repovault Copyright (C) 2026 The repovault authors\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Backs up git repositories together with their uncommitted\n\
                  state: staged files, unstaged edits, and any path whose\n\
                  `repovault-snapshot` attribute forces it into the snapshot.\n\n\
                  Invoking `repovault backup ~/projects /mnt/backups` backs up\n\
                  every repository under ~/projects. See `repovault <command>\n\
                  --help` for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  By default, repovault will look for `repovault.toml` in the\n\
                  current directory. Additional files can be specified with\n\
                  --config, those will be loaded after the default one and\n\
                  override it. Environment variables prefixed with REPOVAULT_\n\
                  (for example REPOVAULT_GIT_EXECUTABLE) override both."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Backs up every git repository found under a directory.
    Backup(BackupArgs),

    /// Backs up a single repository to any URL git can push to.
    BackupSingle(BackupSingleArgs),

    /// Restores a backed-up repository into a fresh working directory.
    Restore(RestoreArgs),

    /// Commands regarding snapshot marks.
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

/// Long help shared by the `--ignore-dir` flags.
pub(crate) const IGNORE_DIR_LONG_HELP: &str =
    "Directories whose path matches this regex are skipped, along with their \
     descendants. Paths are separated with '/' and are relative to the \
     starting directory. For example, '.*/target' skips every directory named \
     target, whereas 'target' only skips the top-level target directory.";

/// clap value parser turning a regex pattern into a [`DirectoryFilter`].
pub(crate) fn parse_directory_filter(pattern: &str) -> Result<DirectoryFilter, String> {
    DirectoryFilter::new(pattern).map_err(|error| format!("invalid directory regex: {error}"))
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
