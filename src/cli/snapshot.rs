// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot command arguments.
//!
//! repovault saves any path whose `repovault-snapshot` git attribute is set
//! to `force` exactly as it is on disk, even when gitignored. See
//! `git help attributes` for where attribute files live.

use crate::cli::{IGNORE_DIR_LONG_HELP, parse_directory_filter};
use crate::git::DirectoryFilter;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Subcommands under `snapshot`.
#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Lists every path carrying the snapshot attribute, with its value.
    List(SnapshotListArgs),
}

/// Arguments for the `snapshot list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct SnapshotListArgs {
    /// Directory whose repositories are inspected.
    #[arg(value_name = "SOURCE_DIR", default_value = ".")]
    pub source_directory: PathBuf,

    /// Skips directories whose relative path matches this regex.
    #[arg(
        long = "ignore-dir",
        value_name = "REGEX",
        long_help = IGNORE_DIR_LONG_HELP,
        value_parser = parse_directory_filter
    )]
    pub ignore_dir: Option<DirectoryFilter>,
}
