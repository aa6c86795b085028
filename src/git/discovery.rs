// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git repository discovery.
//!
//! ```text
//! source_root/
//!   projects/
//!     app/              .git      --> yielded, not descended into
//!     app/vendor/x/     .git      --> never reached (inner repo)
//!     scratch/          (ignored) --> subtree skipped by --ignore-dir
//!   notes/                        --> descended, nothing found
//! ```
//!
//! Breadth-first, lazy; a directory is a repository as soon as
//! `<dir>/<git-dirname>` exists (a plain file counts, covering worktree and
//! submodule pointers). Symlinked directories are not followed.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::{VaultError, VaultResult};

/// Start-anchored directory exclusion predicate.
///
/// Matches against forward-slash, root-relative paths, from the beginning of
/// the path: `.*/foo` excludes every directory named `foo`, while `foo`
/// excludes only the top-level one.
#[derive(Debug, Clone)]
pub struct DirectoryFilter {
    pattern: Regex,
}

impl DirectoryFilter {
    /// Compiles the user pattern, anchored at the start of the path.
    ///
    /// # Errors
    ///
    /// Returns the regex error for an invalid pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{pattern})"))?,
        })
    }

    /// Whether the root-relative `path` is excluded.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        let normalized = path
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        self.pattern.is_match(&normalized)
    }
}

/// Lazy breadth-first scan for repository roots.
pub struct RepoScan {
    root: PathBuf,
    dirname: String,
    filter: Option<DirectoryFilter>,
    queue: VecDeque<PathBuf>,
}

impl RepoScan {
    fn is_ignored(&self, directory: &Path) -> bool {
        let Some(filter) = &self.filter else {
            return false;
        };
        let relative = directory.strip_prefix(&self.root).unwrap_or(directory);
        filter.is_ignored(relative)
    }

    fn enqueue_children(&mut self, directory: &Path) -> VaultResult<()> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            // DirEntry::file_type does not follow symlinks.
            if entry.file_type()?.is_dir() {
                children.push(entry.path());
            }
        }
        children.sort();
        self.queue.extend(children);
        Ok(())
    }
}

impl Iterator for RepoScan {
    type Item = VaultResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(directory) = self.queue.pop_front() {
            if self.is_ignored(&directory) {
                debug!("skipping directory {}", directory.display());
                continue;
            }
            if directory.join(&self.dirname).exists() {
                return Some(Ok(directory));
            }
            if let Err(error) = self.enqueue_children(&directory) {
                return Some(Err(error));
            }
        }
        None
    }
}

/// Scans `root` (inclusive) breadth-first for git repositories.
///
/// The filter is consulted for every directory, the root included, before
/// any recursion; a match skips the whole subtree. A repository is yielded
/// and never descended into.
pub fn scan_repositories(
    root: &Path,
    dirname: &str,
    filter: Option<&DirectoryFilter>,
) -> RepoScan {
    RepoScan {
        root: root.to_path_buf(),
        dirname: dirname.to_string(),
        filter: filter.cloned(),
        queue: VecDeque::from([root.to_path_buf()]),
    }
}

/// Collects every repository under `root`, erroring when there are none.
///
/// # Errors
///
/// Returns [`VaultError::NoRepositories`] for an empty result and any
/// traversal error as-is.
pub fn find_repositories(
    root: &Path,
    dirname: &str,
    filter: Option<&DirectoryFilter>,
) -> VaultResult<Vec<PathBuf>> {
    let repositories =
        scan_repositories(root, dirname, filter).collect::<VaultResult<Vec<_>>>()?;
    if repositories.is_empty() {
        return Err(VaultError::NoRepositories(
            root.display().to_string().into_boxed_str(),
        ));
    }
    Ok(repositories)
}
