// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   backup, backup-single, restore, snapshot list
//! ```

pub mod backup;
pub mod restore;
pub mod snapshot;
