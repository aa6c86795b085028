// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot capture and unwind.
//!
//! ```text
//!                         repovault/snapshot
//!                                  v
//!   ... --- H --- [staged@m] --- [unstaged@m]
//!            ^
//!       origin (branch "m",
//!       or detached at H)
//! ```
//!
//! A snapshot parks the uncommitted working state on a scratch branch: one
//! commit holding exactly what was staged, a second holding everything else
//! (plus force-marked files), with the origin encoded in the subjects. The
//! worktree is never checked out away from, so capture is safe to run on a
//! dirty tree. After the caller is done with the branch the original HEAD,
//! index, and worktree are exactly as before.
//!
//! Restore reverses the trick on a fresh clone whose tip is an `unstaged@`
//! commit: peel the two commits off, re-stage the first, and point HEAD back
//! at the recorded origin.

use tracing::{info, warn};

use crate::error::{AbortError, GitError, VaultResult};

use super::attributes::collect_snapshot_paths;
use super::discovery::DirectoryFilter;
use super::plan::{AddBatch, force_add_batches};
use super::repo::GitRepo;

/// Scratch branch the capture commits live on. Reserved: snapshots refuse
/// to run while it is checked out.
pub const SNAPSHOT_BRANCH: &str = "repovault/snapshot";

/// Remote alias used for restore clones, removed again before finishing.
pub const RESTORE_REMOTE: &str = "repovault-restore";

const STAGED_PREFIX: &str = "staged@";
const UNSTAGED_PREFIX: &str = "unstaged@";

/// Where HEAD pointed when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Branch(String),
    Detached(String),
}

impl Origin {
    /// Renders the origin for a commit subject.
    ///
    /// Branch names cannot contain `:`, so a `:` prefix unambiguously marks
    /// a detached-HEAD commit hash.
    #[must_use]
    pub fn token(&self) -> String {
        match self {
            Self::Branch(name) => name.clone(),
            Self::Detached(commit) => format!(":{commit}"),
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.strip_prefix(':') {
            Some(commit) => Self::Detached(commit.to_string()),
            None => Self::Branch(token.to_string()),
        }
    }
}

/// Extracts the origin from the subject of a snapshot tip commit.
///
/// Returns `None` when the subject is not an `unstaged@` marker. Only the
/// prefix is inspected, so branch names containing `@` survive.
#[must_use]
pub fn origin_from_subject(subject: &str) -> Option<Origin> {
    subject.strip_prefix(UNSTAGED_PREFIX).map(Origin::from_token)
}

/// Everything needed to put the repository back mid-capture.
struct Capture {
    origin: Origin,
    origin_commit: String,
    staged_commit: Option<String>,
    branch_created: bool,
    head_moved: bool,
}

/// Captures the working state onto [`SNAPSHOT_BRANCH`], runs `use_phase`
/// while the branch exists, then deletes the branch and returns the phase
/// result.
///
/// The repository is left untouched: HEAD, index, and worktree are restored
/// before `use_phase` runs, and a mid-capture failure unwinds whatever had
/// already been done.
///
/// # Errors
///
/// Aborts (without touching anything) when a merge, rebase, cherry-pick, or
/// revert is in progress or when the scratch branch itself is checked out.
/// Capture and phase errors are returned as-is.
pub fn with_snapshot<T>(
    repo: &GitRepo,
    filter: Option<&DirectoryFilter>,
    use_phase: impl FnOnce() -> VaultResult<T>,
) -> VaultResult<T> {
    if let Some(operation) = repo.in_progress_operation()? {
        return Err(AbortError::OperationInProgress {
            operation: operation.to_string(),
        }
        .into());
    }
    let branch = repo.current_branch()?;
    if branch.as_deref() == Some(SNAPSHOT_BRANCH) {
        return Err(AbortError::SnapshotBranchCheckedOut {
            branch: SNAPSHOT_BRANCH.to_string(),
        }
        .into());
    }

    // Resolved before any mutation so a failure here aborts cleanly.
    let marks = collect_snapshot_paths(repo, filter)?;
    let batches = force_add_batches(&marks);
    let origin_commit = repo.head_commit()?;
    let origin = match branch {
        Some(name) => Origin::Branch(name),
        None => Origin::Detached(origin_commit.clone()),
    };
    info!(origin = %origin.token(), "creating snapshot commits");

    let mut capture = Capture {
        origin,
        origin_commit,
        staged_commit: None,
        branch_created: false,
        head_moved: false,
    };
    let result = match run_capture(repo, &mut capture, &batches) {
        Ok(()) => use_phase(),
        Err(error) => {
            unwind_capture(repo, &capture);
            Err(error)
        }
    };
    if capture.branch_created
        && let Err(error) = repo.delete_branch(SNAPSHOT_BRANCH)
    {
        warn!("failed to delete branch '{SNAPSHOT_BRANCH}': {error}");
    }
    result
}

fn run_capture(repo: &GitRepo, capture: &mut Capture, batches: &[AddBatch]) -> VaultResult<()> {
    repo.force_create_branch(SNAPSHOT_BRANCH)?;
    capture.branch_created = true;
    // symbolic-ref attaches HEAD without touching index or worktree.
    repo.set_head_branch(SNAPSHOT_BRANCH)?;
    capture.head_moved = true;

    repo.commit_marker(&format!("{STAGED_PREFIX}{}", capture.origin.token()))?;
    capture.staged_commit = Some(repo.head_commit()?);
    repo.add_all()?;
    for batch in batches {
        repo.add_force(&batch.includes, &batch.excludes)?;
    }
    repo.commit_marker(&format!("{UNSTAGED_PREFIX}{}", capture.origin.token()))?;

    // Leave the scratch branch. The mixed reset rebuilds the index from the
    // staged commit, the soft reset walks the ref back to the origin commit
    // without touching that index; the worktree is never involved.
    match &capture.origin {
        Origin::Branch(name) => repo.set_head_branch(name)?,
        Origin::Detached(_) => repo.detach_head()?,
    }
    repo.reset_mixed(&format!("{SNAPSHOT_BRANCH}^"))?;
    repo.reset_soft(&format!("{SNAPSHOT_BRANCH}^^"))?;
    Ok(())
}

/// Best-effort rollback after a mid-capture failure. Every step logs instead
/// of erroring so the original failure stays the one reported.
fn unwind_capture(repo: &GitRepo, capture: &Capture) {
    if !capture.head_moved {
        return;
    }
    warn!("snapshot failed midway; restoring the original repository state");
    let restored = match &capture.origin {
        Origin::Branch(name) => repo.set_head_branch(name),
        Origin::Detached(_) => repo.detach_head(),
    };
    if let Err(error) = restored {
        warn!("failed to restore HEAD: {error}");
    }
    if let Some(staged) = &capture.staged_commit {
        if let Err(error) = repo.reset_mixed(staged) {
            warn!("failed to restore the index: {error}");
            return;
        }
        if let Err(error) = repo.reset_soft(&capture.origin_commit) {
            warn!("failed to restore the original commit: {error}");
        }
    }
}

/// Peels the snapshot commits off a fresh restore clone.
///
/// Afterwards HEAD points at the recorded origin, the index holds what was
/// staged, the worktree holds the full captured state, and the scratch
/// branch is gone.
///
/// Clones whose tip is not a snapshot (no scratch branch checked out, or an
/// empty repository) are left as-is with a warning; a scratch branch whose
/// tip subject is not an `unstaged@` marker is an error.
///
/// # Errors
///
/// Returns [`GitError::SnapshotTip`] for an unrecognized tip subject and any
/// git failure while unwinding.
pub fn unwind_clone(repo: &GitRepo) -> VaultResult<()> {
    if repo.current_branch()?.as_deref() != Some(SNAPSHOT_BRANCH) {
        warn!("'{SNAPSHOT_BRANCH}' is not checked out; leaving the clone as-is");
        return Ok(());
    }
    if repo.head_commit().is_err() {
        warn!("the cloned repository has no commits; leaving the clone as-is");
        return Ok(());
    }
    let subject = repo.tip_subject()?;
    let Some(origin) = origin_from_subject(&subject) else {
        return Err(GitError::SnapshotTip { message: subject }.into());
    };
    info!(origin = %origin.token(), "unwinding snapshot commits");

    match &origin {
        Origin::Branch(name) => repo.set_head_branch(name)?,
        Origin::Detached(_) => repo.detach_head()?,
    }
    repo.reset_mixed(&format!("{SNAPSHOT_BRANCH}^"))?;
    repo.reset_soft(&format!("{SNAPSHOT_BRANCH}^^"))?;
    repo.delete_branch(SNAPSHOT_BRANCH)?;
    Ok(())
}
