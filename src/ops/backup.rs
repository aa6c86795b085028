// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup orchestration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bon::Builder;
use tracing::{info, warn};

use crate::error::{AbortError, Result, VaultError, VaultResult, bail_out};
use crate::git::snapshot::{SNAPSHOT_BRANCH, with_snapshot};
use crate::git::{DirectoryFilter, GitContext, GitRepo, discovery};
use crate::remote::RemoteUrl;

use super::state::{self, PersistedState};

/// Knobs shared by both backup commands.
#[derive(Debug, Clone, Builder)]
pub struct BackupOptions {
    /// Capture uncommitted state too (the default), or push plain history
    /// only.
    #[builder(default = true)]
    pub snapshot: bool,
    /// Subtrees to skip while scanning for repositories and walking for
    /// snapshot marks.
    pub filter: Option<DirectoryFilter>,
}

/// Local and remote branch names, compared during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSets {
    pub local: BTreeSet<String>,
    pub remote: BTreeSet<String>,
}

impl BranchSets {
    /// Remote branches with no local counterpart; force-push cannot remove
    /// them, so reconciliation deletes them explicitly.
    pub fn stale(&self) -> impl Iterator<Item = &str> {
        self.remote.difference(&self.local).map(String::as_str)
    }
}

/// Backs up every repository under `source_root` into `backup_root`.
///
/// Each repository lands under the remote at its path relative to the source
/// root (the root itself under its own name). Bare repositories and missing
/// directories are created on demand; after a successful push the persisted
/// state file is refreshed.
///
/// Abort-class failures skip the repository with a warning and the run
/// continues; anything else halts it.
///
/// # Errors
///
/// Returns an error when the source root is inaccessible, contains no
/// repositories at all, or a repository fails with a non-abort error.
pub fn backup_tree(
    context: &GitContext,
    source_root: &Path,
    backup_root: &RemoteUrl,
    options: &BackupOptions,
) -> Result<()> {
    let source_root = source_root
        .canonicalize()
        .with_context(|| format!("cannot access '{}'", source_root.display()))?;
    let repositories =
        discovery::find_repositories(&source_root, context.dirname(), options.filter.as_ref())?;
    for repository in repositories {
        let destination = backup_root.join_path(&remote_subpath(&repository, &source_root)?)?;
        destination.ensure_directories(permission_bits(&repository))?;
        destination.init_bare_if_empty(context, SNAPSHOT_BRANCH)?;
        if let Err(error) = backup_single(
            context,
            &repository,
            destination.as_git_url(),
            false,
            options,
        ) {
            match error.downcast_ref::<VaultError>().and_then(VaultError::abort_reason) {
                Some(reason) => {
                    warn!("{reason}. Skipping '{}'.", repository.display());
                    continue;
                }
                None => return Err(error),
            }
        }
        record_state(context.open(&repository), &destination);
    }
    Ok(())
}

/// Backs up one repository to `remote_spec`.
///
/// The destination is handed to git verbatim, so any URL scheme the
/// installed git supports works here; no directories are created and no
/// state file is written.
///
/// # Errors
///
/// Rejects a destination starting with `-`. With `test_connectivity` set, an
/// unreachable remote is an abort-class error and nothing is pushed.
pub fn backup_single(
    context: &GitContext,
    repository: &Path,
    remote_spec: &str,
    test_connectivity: bool,
    options: &BackupOptions,
) -> Result<()> {
    if remote_spec.starts_with('-') {
        return Err(bail_out(format!(
            "destination '{remote_spec}' begins with '-'; prefix it with './' if it is a local path"
        ))
        .into());
    }
    info!(repo = %repository.display(), remote = %remote_spec, "backing up");
    let repo = context.open(repository);
    if test_connectivity && let Err(error) = repo.remote_heads(remote_spec) {
        return Err(VaultError::from(AbortError::RemoteUnreachable {
            url: remote_spec.to_string(),
            message: error.to_string(),
        })
        .into());
    }
    if options.snapshot {
        with_snapshot(&repo, options.filter.as_ref(), || {
            push_and_reconcile(&repo, remote_spec)
        })?;
    } else {
        push_and_reconcile(&repo, remote_spec)?;
    }
    Ok(())
}

/// Pushes all branches, then deletes remote branches that no longer exist
/// locally. Runs while the scratch branch exists, so a snapshot backup keeps
/// its remote scratch branch and a plain backup reconciles a stale one away.
fn push_and_reconcile(repo: &GitRepo, url: &str) -> VaultResult<()> {
    repo.push_all_force(url)?;
    let sets = BranchSets {
        local: repo.local_branches()?,
        remote: repo.remote_heads(url)?,
    };
    for branch in sets.stale() {
        info!(branch, "deleting stale remote branch");
        repo.delete_remote_branch(url, branch)?;
    }
    Ok(())
}

/// Remote directory for one repository: its name when it IS the source root,
/// its relative path otherwise.
pub(super) fn remote_subpath(repository: &Path, source_root: &Path) -> Result<PathBuf> {
    if repository == source_root {
        let name = repository
            .file_name()
            .ok_or_else(|| bail_out(format!("cannot derive a name for '{}'", repository.display())))?;
        return Ok(PathBuf::from(name));
    }
    let relative = repository
        .strip_prefix(source_root)
        .with_context(|| format!("'{}' is outside the source root", repository.display()))?;
    Ok(relative.to_path_buf())
}

/// Refreshes the persisted state beside a successfully pushed backup.
/// Advisory, so failures only warn.
fn record_state(repo: GitRepo, destination: &RemoteUrl) {
    let current_branch = match repo.current_branch() {
        Ok(branch) => branch,
        Err(error) => {
            warn!("could not determine the current branch: {error}");
            None
        }
    };
    let state = PersistedState { current_branch };
    if let Err(error) = state::write_to(destination, &state) {
        warn!("could not write the state file: {error}");
    }
}

#[cfg(unix)]
fn permission_bits(path: &Path) -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path).ok().map(|meta| meta.mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(_path: &Path) -> Option<u32> {
    None
}
