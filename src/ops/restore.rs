// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Restore orchestration.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::error::{Result, bail_out};
use crate::git::GitContext;
use crate::git::snapshot::{RESTORE_REMOTE, unwind_clone};
use crate::remote::RemoteUrl;

use super::state;

/// Restores a backup into `<restore_to>/<backup name>`.
///
/// Clones without hardlinks, recreates every backed-up branch as a local
/// tracking branch, then unwinds the snapshot commits so the working
/// directory, index, and HEAD come back exactly as captured. With
/// `drop_snapshot` the unwind is skipped and the snapshot commits stay as
/// plain history on the scratch branch.
///
/// The transport remote is removed at the end and unreachable objects are
/// pruned, so the restored repository stands alone.
///
/// # Errors
///
/// Returns an error when the destination exists non-empty, the clone fails,
/// or the unwind fails.
pub fn restore_single(
    context: &GitContext,
    remote: &RemoteUrl,
    restore_to: &Path,
    drop_snapshot: bool,
) -> Result<()> {
    let name = remote
        .name()
        .ok_or_else(|| bail_out(format!("cannot derive a repository name from '{remote}'")))?;
    let destination = restore_to.join(&name);
    if destination.exists() {
        let mut entries = std::fs::read_dir(&destination)
            .with_context(|| format!("cannot access '{}'", destination.display()))?;
        if entries.next().is_some() {
            return Err(bail_out(format!(
                "destination '{}' already exists and is not empty",
                destination.display()
            ))
            .into());
        }
    }
    info!(remote = %remote, destination = %destination.display(), "restoring");
    context.clone_no_hardlinks(remote.as_git_url(), RESTORE_REMOTE, &destination)?;
    let repo = context.open(&destination);

    match state::read_from(remote) {
        Ok(Some(persisted)) => {
            if let Some(branch) = persisted.current_branch {
                info!("the backed-up checkout was on branch '{branch}'");
            }
        }
        Ok(None) => {}
        Err(error) => warn!("could not read the state file: {error}"),
    }

    // Local tracking branches must exist before the unwind moves HEAD back
    // to the origin branch.
    let current = repo.current_branch()?;
    for branch in repo.remote_branches(RESTORE_REMOTE)? {
        if current.as_deref() == Some(branch.as_str()) {
            continue;
        }
        repo.track_branch(&branch, &format!("{RESTORE_REMOTE}/{branch}"))?;
    }

    if drop_snapshot {
        info!("keeping the snapshot commits as plain history");
    } else {
        unwind_clone(&repo)?;
    }

    repo.remove_remote(RESTORE_REMOTE)?;
    // With the transport refs gone the synthetic commits become unreachable
    // and can be dropped for real.
    if let Err(error) = repo.expire_reflogs() {
        warn!("failed to expire reflogs: {error}");
    }
    if let Err(error) = repo.prune_now() {
        warn!("failed to prune unreachable objects: {error}");
    }
    Ok(())
}
