// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup command arguments.
//!
//! # Two Forms
//!
//! ```text
//! backup <SOURCE_DIR> <BACKUP_ROOT>
//!   scans for repositories, mirrors the directory layout on the remote,
//!   creates missing bare repositories, records restore state
//!
//! backup-single <REPOSITORY> <BACKUP_URL>
//!   one repository, URL handed to git verbatim (any push scheme works),
//!   remote must already exist
//! ```

use crate::cli::{IGNORE_DIR_LONG_HELP, parse_directory_filter};
use crate::git::DirectoryFilter;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `backup` command.
#[derive(Debug, Clone, Default, Args)]
pub struct BackupArgs {
    /// Directory searched recursively for git repositories to back up,
    /// except those excluded by --ignore-dir.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_directory: PathBuf,

    /// Local path or file:// URL to back up to.
    /// Subdirectories are created as necessary.
    #[arg(value_name = "BACKUP_ROOT")]
    pub backup_root: String,

    /// Skips directories whose relative path matches this regex.
    #[arg(
        long = "ignore-dir",
        value_name = "REGEX",
        long_help = IGNORE_DIR_LONG_HELP,
        value_parser = parse_directory_filter
    )]
    pub ignore_dir: Option<DirectoryFilter>,

    /// Pushes committed history only, without capturing uncommitted state.
    #[arg(long = "no-snapshot")]
    pub no_snapshot: bool,
}

/// Arguments for the `backup-single` command.
#[derive(Debug, Clone, Default, Args)]
pub struct BackupSingleArgs {
    /// The git repository to back up.
    #[arg(value_name = "REPOSITORY")]
    pub repository: PathBuf,

    /// URL to back up to, in any format `git push` understands.
    /// See `git help push`, section GIT URLS. The remote repository must
    /// already exist.
    #[arg(value_name = "BACKUP_URL")]
    pub backup_url: String,

    /// Pushes committed history only, without capturing uncommitted state.
    #[arg(long = "no-snapshot")]
    pub no_snapshot: bool,
}
