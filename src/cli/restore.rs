// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Restore command arguments.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `restore` command.
#[derive(Debug, Clone, Default, Args)]
pub struct RestoreArgs {
    /// Local path or file:// URL of the backup to restore from.
    #[arg(value_name = "BACKUP_PATH")]
    pub backup_path: String,

    /// Directory to restore into; a subdirectory named after the backup is
    /// created inside it.
    #[arg(value_name = "RESTORE_TO", default_value = ".")]
    pub restore_to: PathBuf,

    /// Keeps the snapshot commits as ordinary history instead of unwinding
    /// them back into staged and unstaged changes.
    #[arg(long = "drop-snapshot")]
    pub drop_snapshot: bool,
}
