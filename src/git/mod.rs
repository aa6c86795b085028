// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!           Public API
//!  discovery  attributes  snapshot
//!      \          |          /
//!       v         v         v
//!   ,---------------------------,
//!   |  GitRepo (one worktree)   |
//!   '-----+---------------+-----'
//!         |               |
//!         v               v
//!     GitContext        gix
//!    (CLI, write)    (read-only)
//!     .run           .discover
//!     .clone         .head_name
//!     .init_bare
//! ```
//!
//! [`GitContext`] holds the resolved executable and metadata dirname,
//! validated once at startup. [`GitRepo`] binds a context to one working
//! directory; every mutation goes through the external tool, cheap read-only
//! queries go through gix.

pub mod attributes;
pub mod context;
pub mod discovery;
pub mod plan;
pub mod repo;
pub mod snapshot;


pub use context::GitContext;
pub use discovery::DirectoryFilter;
pub use repo::GitRepo;
