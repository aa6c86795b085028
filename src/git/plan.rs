// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Force-add planning.
//!
//! ```text
//! marks                          batches
//!   vendor/        force           add --force -- vendor/ secrets.env
//!   vendor/big/    ignore-parent       ':(exclude)vendor/big/'
//!   vendor/big/k   force           add --force -- vendor/big/k
//!   secrets.env    force
//! ```
//!
//! Marks form a nesting hierarchy: a force mark includes a subtree, an
//! `ignore-parent` mark carves a hole in an enclosing include, a deeper
//! force mark fills part of the hole back in. Only marks that flip the
//! effective state of their nearest marked ancestor matter; the rest are
//! redundant and dropped. The surviving marks are grouped by nesting depth,
//! included depths pair with the exclusions one level below, and each group
//! is chunked to keep `git add` invocations within a bounded argument list.

use super::attributes::SnapshotBehavior;

/// Upper bound on pathspecs per `git add` invocation, keeping command lines
/// well under platform argument limits.
pub const MAX_ADD_PATHSPECS: usize = 32;

/// One `git add --force` invocation: paths to add and subtrees to hold out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddBatch {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// A mark that survived redundancy elimination, at its nesting level.
struct Flip {
    path: String,
    include: bool,
    level: usize,
}

/// Whether `path` lies inside the `ancestor` directory.
///
/// Directories carry a trailing `/`, so plain prefix matching cannot confuse
/// `doc/` with `docs`.
fn is_under(path: &str, ancestor: &str) -> bool {
    ancestor.ends_with('/') && path.starts_with(ancestor)
}

fn depth(path: &str) -> usize {
    path.trim_end_matches('/').split('/').count()
}

/// Plans the `git add --force` invocations realizing the given marks.
///
/// `only-if-staged` marks are inert here (they describe the default) and are
/// ignored. The result is deterministic for a given mark order.
pub fn force_add_batches(marks: &[(String, SnapshotBehavior)]) -> Vec<AddBatch> {
    let mut candidates: Vec<(String, bool)> = marks
        .iter()
        .filter_map(|(path, behavior)| match behavior {
            SnapshotBehavior::Force => Some((path.clone(), true)),
            SnapshotBehavior::OnlyIfStagedIgnoreParent => Some((path.clone(), false)),
            SnapshotBehavior::OnlyIfStaged => None,
        })
        .collect();
    // Ancestors have fewer components, so sorting by depth inserts them
    // before their descendants.
    candidates.sort_by_key(|(path, _)| depth(path));

    let mut flips: Vec<Flip> = Vec::new();
    for (path, include) in candidates {
        let ancestor = flips
            .iter()
            .filter(|flip| is_under(&path, &flip.path))
            .max_by_key(|flip| flip.path.len());
        let (inherited, level) = match ancestor {
            Some(flip) => (flip.include, flip.level + 1),
            // The repository root is an implicit exclude.
            None => (false, 0),
        };
        if include != inherited {
            flips.push(Flip { path, include, level });
        }
    }

    let level_count = flips.iter().map(|flip| flip.level + 1).max().unwrap_or(0);
    let mut levels: Vec<Vec<String>> = vec![Vec::new(); level_count];
    for flip in flips {
        levels[flip.level].push(flip.path);
    }

    // Even levels are includes, odd levels the exclusions carved out of
    // them; a deeper include level re-adds its subtree in a later batch.
    let mut batches = Vec::new();
    for index in (0..levels.len()).step_by(2) {
        let includes = &levels[index];
        let excludes = levels.get(index + 1).cloned().unwrap_or_default();
        let chunk_size = MAX_ADD_PATHSPECS.saturating_sub(excludes.len()).max(1);
        for chunk in includes.chunks(chunk_size) {
            batches.push(AddBatch {
                includes: chunk.to_vec(),
                excludes: excludes.clone(),
            });
        }
    }
    batches
}
