// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Restore command handler.

use crate::cli::restore::RestoreArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::GitContext;
use crate::ops::restore;
use crate::remote::RemoteUrl;

/// Runs the `restore` command: clones the backup and unwinds the snapshot
/// back into a checkout with staged and unstaged changes.
///
/// # Errors
///
/// Returns an error if git is not installed, the backup path cannot be
/// parsed, the destination already holds files, or the clone or unwind
/// fails.
pub fn run_restore_command(args: &RestoreArgs, config: &Config) -> Result<()> {
    let context = GitContext::new(&config.git)?;
    let remote = RemoteUrl::parse(&args.backup_path)?;
    restore::restore_single(&context, &remote, &args.restore_to, args.drop_snapshot)
}
