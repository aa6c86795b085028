// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! A git context bound to one working directory.
//!
//! Thin verbs over the external tool plus two gix-backed read-only queries.
//! Each method runs exactly one git command; sequencing lives in
//! [`super::snapshot`] and the orchestrators.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{GitError, GixError, VaultResult};

use super::context::GitContext;

/// State files inside the git directory that mark a half-finished operation.
const IN_PROGRESS_MARKERS: [(&str, &str); 5] = [
    ("CHERRY_PICK_HEAD", "cherry pick"),
    ("MERGE_HEAD", "merge"),
    ("rebase-apply", "rebase"),
    ("rebase-merge", "rebase"),
    ("REVERT_HEAD", "revert"),
];

/// One repository working directory plus the context to operate on it.
#[derive(Debug, Clone)]
pub struct GitRepo {
    context: GitContext,
    workdir: PathBuf,
}

impl GitRepo {
    pub(super) fn new(context: GitContext, workdir: PathBuf) -> Self {
        Self { context, workdir }
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Name of the metadata directory that marks a repository root.
    #[must_use]
    pub fn dirname(&self) -> &str {
        self.context.dirname()
    }

    /// Runs git in this working directory and returns trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Spawn` or `GitError::Exit`.
    pub fn run(&self, args: &[&str]) -> VaultResult<String> {
        self.context.run_in(&self.workdir, args)
    }

    /// Runs git feeding `stdin`, returning raw stdout bytes.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Spawn` or `GitError::Exit`.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &[u8]) -> VaultResult<Vec<u8>> {
        self.context.run_in_with_stdin(&self.workdir, args, stdin)
    }

    // --- Read-only queries ---

    /// Current branch name, `None` when HEAD is detached.
    ///
    /// Goes through gix; no subprocess. An unborn branch still reports its
    /// name, matching `git branch --show-current`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    pub fn current_branch(&self) -> VaultResult<Option<String>> {
        let repo = gix::discover(&self.workdir)
            .map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    /// Hash of the commit HEAD points at.
    ///
    /// # Errors
    ///
    /// Fails on an unborn branch (no commits yet).
    pub fn head_commit(&self) -> VaultResult<String> {
        self.run(&["rev-parse", "HEAD"])
    }

    /// Subject line of the commit HEAD points at.
    ///
    /// # Errors
    ///
    /// Fails on an unborn branch.
    pub fn tip_subject(&self) -> VaultResult<String> {
        self.run(&["log", "-1", "--format=%s"])
    }

    /// The in-progress operation ("merge", "rebase", ...) if the repository
    /// is in the middle of one, detected from the git directory's state
    /// files.
    ///
    /// # Errors
    ///
    /// Returns an error if the git directory cannot be resolved.
    pub fn in_progress_operation(&self) -> VaultResult<Option<&'static str>> {
        let git_dir = PathBuf::from(self.run(&["rev-parse", "--absolute-git-dir"])?);
        for (marker, operation) in IN_PROGRESS_MARKERS {
            if git_dir.join(marker).exists() {
                return Ok(Some(operation));
            }
        }
        Ok(None)
    }

    /// All local branch names.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the ref enumeration fails.
    pub fn local_branches(&self) -> VaultResult<BTreeSet<String>> {
        let stdout = self.run(&["for-each-ref", "refs/heads", "--format=%(refname:short)"])?;
        Ok(stdout.lines().map(str::to_string).collect())
    }

    /// Branch names known under the given remote alias, without the alias
    /// prefix. The symbolic `HEAD` entry is filtered out.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the ref enumeration fails.
    pub fn remote_branches(&self, alias: &str) -> VaultResult<Vec<String>> {
        let refs = format!("refs/remotes/{alias}");
        let stdout = self.run(&["for-each-ref", &refs, "--format=%(refname:short)"])?;
        let prefix = format!("{alias}/");
        Ok(stdout
            .lines()
            .filter_map(|line| line.strip_prefix(&prefix))
            .filter(|name| *name != "HEAD")
            .map(str::to_string)
            .collect())
    }

    /// Branch heads advertised by the remote at `url`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` when the remote cannot be reached.
    pub fn remote_heads(&self, url: &str) -> VaultResult<BTreeSet<String>> {
        let stdout = self.run(&["ls-remote", "--heads", url])?;
        Ok(parse_remote_heads(&stdout))
    }

    // --- Ref and worktree mutations ---

    /// `branch --force --no-track <name>`: (re)points `name` at HEAD without
    /// touching the checkout.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    pub fn force_create_branch(&self, name: &str) -> VaultResult<()> {
        self.run(&["branch", "--force", "--no-track", name])?;
        Ok(())
    }

    /// `branch --delete --force <name>`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be deleted.
    pub fn delete_branch(&self, name: &str) -> VaultResult<()> {
        self.run(&["branch", "--delete", "--force", name])?;
        Ok(())
    }

    /// Points HEAD at `refs/heads/<branch>` without touching index or
    /// worktree (`symbolic-ref`, not `checkout`).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the ref update fails.
    pub fn set_head_branch(&self, branch: &str) -> VaultResult<()> {
        let target = format!("refs/heads/{branch}");
        self.run(&["symbolic-ref", "HEAD", &target])?;
        Ok(())
    }

    /// Detaches HEAD at the current commit. The working tree is untouched
    /// because the checkout target is the commit already checked out.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    pub fn detach_head(&self) -> VaultResult<()> {
        self.run(&[
            "-c",
            "advice.detachedHead=false",
            "checkout",
            "-q",
            "--detach",
        ])?;
        Ok(())
    }

    /// `commit --no-verify --allow-empty -m <message>`: records a marker
    /// commit even when nothing changed, bypassing hooks.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails (for example, no committer
    /// identity is configured).
    pub fn commit_marker(&self, message: &str) -> VaultResult<()> {
        self.run(&["commit", "--no-verify", "--allow-empty", "-m", message])?;
        Ok(())
    }

    /// Stages everything `git add .` would stage (gitignore still applies).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the add fails.
    pub fn add_all(&self) -> VaultResult<()> {
        self.run(&["add", "."])?;
        Ok(())
    }

    /// Force-stages `includes` while excluding the `excludes` subtrees, in a
    /// single invocation.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the add fails.
    pub fn add_force(&self, includes: &[String], excludes: &[String]) -> VaultResult<()> {
        let rendered: Vec<String> = excludes
            .iter()
            .map(|path| format!(":(exclude){path}"))
            .collect();
        let mut args: Vec<&str> = vec!["add", "--force", "--"];
        args.extend(includes.iter().map(String::as_str));
        args.extend(rendered.iter().map(String::as_str));
        self.run(&args)?;
        Ok(())
    }

    /// Mixed reset: moves the current ref to `target` and resets the index,
    /// leaving the working tree alone.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reset fails.
    pub fn reset_mixed(&self, target: &str) -> VaultResult<()> {
        self.run(&["reset", "-q", target])?;
        Ok(())
    }

    /// Soft reset: moves the current ref to `target` only.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reset fails.
    pub fn reset_soft(&self, target: &str) -> VaultResult<()> {
        self.run(&["reset", "-q", "--soft", target])?;
        Ok(())
    }

    // --- Remote interaction ---

    /// `push --all --force <url>`: every local branch, overwriting remote
    /// history. Backups mirror the source, they do not merge with it.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the push fails.
    pub fn push_all_force(&self, url: &str) -> VaultResult<()> {
        self.run(&["push", "--all", "--force", url])?;
        Ok(())
    }

    /// Deletes one branch on the remote at `url`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the deletion fails.
    pub fn delete_remote_branch(&self, url: &str, branch: &str) -> VaultResult<()> {
        self.run(&["push", url, "--delete", branch])?;
        Ok(())
    }

    /// Creates local branch `name` tracking `upstream` without checking it
    /// out.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    pub fn track_branch(&self, name: &str, upstream: &str) -> VaultResult<()> {
        self.run(&["branch", "--track", name, upstream])?;
        Ok(())
    }

    /// Removes a configured remote and its remote-tracking refs.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the removal fails.
    pub fn remove_remote(&self, alias: &str) -> VaultResult<()> {
        self.run(&["remote", "remove", alias])?;
        Ok(())
    }

    // --- Housekeeping ---

    /// Expires every reflog entry that references unreachable commits.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the expiry fails.
    pub fn expire_reflogs(&self) -> VaultResult<()> {
        self.run(&["reflog", "expire", "--expire-unreachable=now", "--all"])?;
        Ok(())
    }

    /// `gc --prune=now --quiet`: drops unreachable objects immediately.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the collection fails.
    pub fn prune_now(&self) -> VaultResult<()> {
        self.run(&["gc", "--prune=now", "--quiet"])?;
        Ok(())
    }
}

/// Parses `ls-remote --heads` output into branch names.
///
/// Each line is `<hash>\t<ref>`; anything else is skipped.
pub(super) fn parse_remote_heads(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .filter_map(|line| line.split('\t').nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/heads/"))
        .map(str::to_string)
        .collect()
}
