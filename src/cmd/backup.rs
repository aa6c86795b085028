// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup command handlers.

use crate::cli::backup::{BackupArgs, BackupSingleArgs};
use crate::config::Config;
use crate::error::{RemoteError, Result, VaultError};
use crate::git::GitContext;
use crate::ops::backup::{self, BackupOptions};
use crate::remote::RemoteUrl;
use anyhow::anyhow;

/// Runs the `backup` command: scans for repositories under the source
/// directory and backs each one up under the backup root.
///
/// # Errors
///
/// Returns an error if git is not installed, the backup root cannot be
/// parsed, no repositories are found, or a repository fails for a reason
/// that is not skippable.
pub fn run_backup_command(args: &BackupArgs, config: &Config) -> Result<()> {
    let context = GitContext::new(&config.git)?;
    let backup_root = parse_backup_root(&args.backup_root)?;
    let options = BackupOptions::builder()
        .snapshot(!args.no_snapshot)
        .maybe_filter(args.ignore_dir.clone())
        .build();
    backup::backup_tree(&context, &args.source_directory, &backup_root, &options)
}

/// Runs the `backup-single` command: one repository, destination URL handed
/// to git verbatim.
///
/// # Errors
///
/// Returns an error if git is not installed, the destination is unreachable,
/// or the snapshot or push fails.
pub fn run_backup_single_command(args: &BackupSingleArgs, config: &Config) -> Result<()> {
    let context = GitContext::new(&config.git)?;
    let options = BackupOptions::builder().snapshot(!args.no_snapshot).build();
    backup::backup_single(&context, &args.repository, &args.backup_url, true, &options)
}

/// Parses the backup root, pointing at `backup-single` when the scheme is
/// one only git itself understands.
fn parse_backup_root(spec: &str) -> Result<RemoteUrl> {
    RemoteUrl::parse(spec).map_err(|error| {
        if matches!(
            &error,
            VaultError::Remote(inner) if matches!(**inner, RemoteError::UnsupportedScheme { .. })
        ) {
            anyhow!("{error}. Tip: `backup-single` accepts any URL scheme your git does.")
        } else {
            error.into()
        }
    })
}
