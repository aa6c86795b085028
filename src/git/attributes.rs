// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot attribute resolution.
//!
//! ```text
//! worktree walk                      git check-attr --stdin -z
//!   "src/"                           "src/" NUL attr NUL "unspecified" NUL
//!   "src/main.c"          ---->      "secrets.env" NUL attr NUL "force" NUL
//!   "secrets.env"         stdin      ...
//!   "build/"              NUL-joined
//! ```
//!
//! Files carrying the `repovault-snapshot` attribute opt into (or out of)
//! being captured by a snapshot even when gitignored. The whole repository
//! is resolved with a single `check-attr` invocation; stdin framing means
//! the path count is unbounded.

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::error::{GitError, VaultResult, bail_out};

use super::discovery::DirectoryFilter;
use super::repo::GitRepo;

/// The attribute users set in `.gitattributes` to mark paths for snapshots.
pub const SNAPSHOT_ATTRIBUTE: &str = "repovault-snapshot";

/// How a marked path participates in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotBehavior {
    /// Capture exactly as on disk, even when gitignored.
    Force,
    /// Capture only what is already staged (the default for unmarked paths).
    OnlyIfStaged,
    /// Like `OnlyIfStaged`, and additionally opt out of a force-marked
    /// ancestor directory.
    OnlyIfStagedIgnoreParent,
}

impl SnapshotBehavior {
    /// Parses a `check-attr` value.
    ///
    /// The bare-set sentinel maps to `Force` and the unset sentinel to
    /// `OnlyIfStaged`, so `pattern repovault-snapshot` alone force-marks a
    /// path.
    ///
    /// # Errors
    ///
    /// Returns `GitError::AttributeValue` naming the path for any other
    /// value.
    pub fn from_attr_value(path: &str, value: &str) -> VaultResult<Self> {
        match value {
            "force" | "set" => Ok(Self::Force),
            "only-if-staged" | "unset" => Ok(Self::OnlyIfStaged),
            "only-if-staged-ignore-parent" => Ok(Self::OnlyIfStagedIgnoreParent),
            other => Err(GitError::AttributeValue {
                path: path.to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for SnapshotBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Force => "force",
            Self::OnlyIfStaged => "only-if-staged",
            Self::OnlyIfStagedIgnoreParent => "only-if-staged-ignore-parent",
        })
    }
}

/// Resolves the snapshot attribute for every path in the repository.
///
/// Returns repo-relative forward-slash paths (directories with a trailing
/// `/`) paired with their parsed behavior; paths without the attribute are
/// omitted.
///
/// # Errors
///
/// Returns an error if the walk fails, the `check-attr` invocation fails, or
/// a path carries an unsupported attribute value.
pub fn collect_snapshot_paths(
    repo: &GitRepo,
    filter: Option<&DirectoryFilter>,
) -> VaultResult<Vec<(String, SnapshotBehavior)>> {
    info!(repo = %repo.workdir().display(), "searching for snapshot files");
    let paths = candidate_paths(repo.workdir(), repo.dirname(), filter)?;
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let stdin = paths.join("\0").into_bytes();
    let stdout = repo.run_with_stdin(&["check-attr", "--stdin", "-z", SNAPSHOT_ATTRIBUTE], &stdin)?;
    let mut marks = Vec::new();
    for (path, value) in parse_check_attr(&stdout)? {
        if value == "unspecified" {
            continue;
        }
        let behavior = SnapshotBehavior::from_attr_value(&path, &value)?;
        marks.push((path, behavior));
    }
    Ok(marks)
}

/// Walks the worktree collecting candidate paths for the attribute query.
///
/// The metadata directory and filter-excluded subtrees are pruned entirely;
/// gitignore and hidden-file filtering are disabled on purpose, ignored
/// files are exactly the ones force marks exist for.
pub(super) fn candidate_paths(
    root: &Path,
    dirname: &str,
    filter: Option<&DirectoryFilter>,
) -> VaultResult<Vec<String>> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(std::ffi::OsStr::cmp);

    let dirname_os = std::ffi::OsString::from(dirname);
    let filter_root = root.to_path_buf();
    let filter = filter.cloned();
    builder.filter_entry(move |entry| {
        if entry.file_name() == dirname_os {
            return false;
        }
        if entry.file_type().is_some_and(|kind| kind.is_dir())
            && let Some(filter) = &filter
        {
            let relative = entry.path().strip_prefix(&filter_root).unwrap_or(entry.path());
            if filter.is_ignored(relative) {
                return false;
            }
        }
        true
    });

    let mut paths = Vec::new();
    for entry in builder.build() {
        let entry =
            entry.map_err(|error| bail_out(format!("failed to walk '{}': {error}", root.display())))?;
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let Some(relative) = relative.to_str() else {
            return Err(bail_out(format!(
                "path '{}' is not valid UTF-8",
                entry.path().display()
            )));
        };
        let mut encoded = relative.replace(std::path::MAIN_SEPARATOR, "/");
        if entry.file_type().is_some_and(|kind| kind.is_dir()) && !encoded.ends_with('/') {
            encoded.push('/');
        }
        paths.push(encoded);
    }
    Ok(paths)
}

/// Decodes a `check-attr -z` reply into (path, value) pairs.
///
/// The reply is a flat sequence of NUL-separated fields, three per record:
/// path, attribute name, value.
pub(super) fn parse_check_attr(stdout: &[u8]) -> VaultResult<Vec<(String, String)>> {
    fn decode(field: &[u8], what: &str) -> VaultResult<String> {
        String::from_utf8(field.to_vec()).map_err(|_| {
            GitError::AttributeResponse {
                detail: format!("non-UTF-8 {what} field"),
            }
            .into()
        })
    }

    let mut records = Vec::new();
    let mut fields = stdout.split(|byte| *byte == 0);
    loop {
        let Some(path) = fields.next() else { break };
        if path.is_empty() {
            // Terminator after the last record.
            break;
        }
        let (Some(_attribute), Some(value)) = (fields.next(), fields.next()) else {
            return Err(GitError::AttributeResponse {
                detail: "truncated record".to_string(),
            }
            .into());
        };
        records.push((decode(path, "path")?, decode(value, "value")?));
    }
    Ok(records)
}
