// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        backup / restore / snapshot
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |            ops            |
//!              |  backup, restore, state   |
//!              '-------+-----------+-------'
//!                      |           |
//!                      v           v
//!                     git        remote
//!               snapshot engine  file:// URLs
//!               discovery, plan  reader/writer
//!               attributes
//!
//!   +-----------------------------------------+
//!   |  foundation   config, error, logging    |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod ops;
pub mod remote;
