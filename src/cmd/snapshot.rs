// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot command handlers.

use crate::cli::snapshot::SnapshotListArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::GitContext;
use crate::git::attributes::collect_snapshot_paths;
use crate::git::discovery::scan_repositories;

/// Runs `snapshot list`: prints every marked path with its attribute value,
/// one `<path> - <value>` line per mark, followed by a total.
///
/// Listing goes to stdout; logs stay on stderr.
///
/// # Errors
///
/// Returns an error if git is not installed, the directory walk fails, or a
/// mark carries an unsupported attribute value.
pub fn run_snapshot_list_command(args: &SnapshotListArgs, config: &Config) -> Result<()> {
    let context = GitContext::new(&config.git)?;
    let mut count = 0usize;
    for repository in scan_repositories(
        &args.source_directory,
        context.dirname(),
        args.ignore_dir.as_ref(),
    ) {
        let repository = repository?;
        let repo = context.open(&repository);
        for (path, behavior) in collect_snapshot_paths(&repo, args.ignore_dir.as_ref())? {
            println!(
                "{} - {behavior}",
                repository.join(path.trim_end_matches('/')).display()
            );
            count += 1;
        }
    }
    println!("{count} files total.");
    Ok(())
}
