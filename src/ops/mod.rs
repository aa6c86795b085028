// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! High-level backup and restore flows.
//!
//! ```text
//!   backup            repo --> snapshot --> push --all --force --> remote
//!                                 |              reconcile stale heads
//!                                 '--> state file (bulk mode)
//!
//!   restore           remote --> clone --> tracking branches --> unwind
//!                                              remote removed, gc
//! ```
//!
//! One repository is processed start-to-finish before the next; a bulk run
//! decides per repository whether a failure skips it or halts everything.

pub mod backup;
pub mod restore;
pub mod state;
