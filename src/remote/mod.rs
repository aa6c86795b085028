// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote location addressing.
//!
//! ```text
//!   "file:///mnt/backups"    -->  RemoteUrl::File
//!   "/mnt/backups"           -->  absolutized, same thing
//!   "ssh://host/backups"     -->  unsupported scheme error
//! ```
//!
//! A remote is where backups live: a URL git can push to and clone from,
//! plus the little byte-level surface (directory creation, small file reads
//! and writes) needed for layout and bookkeeping. Operations dispatch on the
//! scheme; `file` is the only backend today, further schemes slot in as
//! variants here.

mod file;


use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

pub use file::FileRemote;

use crate::error::{RemoteError, VaultResult};
use crate::git::GitContext;

/// A parsed, scheme-dispatched remote location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteUrl {
    File(FileRemote),
}

impl RemoteUrl {
    /// Parses user input into a remote.
    ///
    /// Input without a scheme is taken as a local path, relative ones
    /// resolved against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::UnsupportedScheme`] for any scheme other than
    /// `file`, and the backend's errors for unusable URLs.
    pub fn parse(input: &str) -> VaultResult<Self> {
        if let Some(index) = input.find("://") {
            return match input[..index].to_ascii_lowercase().as_str() {
                "file" => Ok(Self::File(FileRemote::from_url(input)?)),
                other => Err(RemoteError::UnsupportedScheme {
                    scheme: other.to_string(),
                }
                .into()),
            };
        }
        Ok(Self::File(FileRemote::from_local_path(Path::new(input))?))
    }

    /// The URL to hand to git for push, fetch, and clone.
    #[must_use]
    pub fn as_git_url(&self) -> &str {
        match self {
            Self::File(remote) => remote.as_git_url(),
        }
    }

    /// The final path segment, used to name restore destinations.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        match self {
            Self::File(remote) => remote.name(),
        }
    }

    /// A new remote addressing `tail` under this one.
    ///
    /// # Errors
    ///
    /// Returns an error for path components that cannot be expressed in a
    /// URL (relative steps, non-UTF-8).
    pub fn join_path(&self, tail: &Path) -> VaultResult<Self> {
        match self {
            Self::File(remote) => Ok(Self::File(remote.join_path(tail)?)),
        }
    }

    /// Creates the addressed directory and any missing ancestors.
    ///
    /// `mode` is applied to every directory created (Unix only).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::CreateDir`] naming the directory that failed.
    pub fn ensure_directories(&self, mode: Option<u32>) -> VaultResult<()> {
        match self {
            Self::File(remote) => remote.ensure_directories(mode),
        }
    }

    /// Initializes a bare repository at the addressed directory when it is
    /// empty; an already-populated directory is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be read or the init fails.
    pub fn init_bare_if_empty(
        &self,
        context: &GitContext,
        initial_branch: &str,
    ) -> VaultResult<()> {
        match self {
            Self::File(remote) => remote.init_bare_if_empty(context, initial_branch),
        }
    }

    /// Opens the addressed file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Io`]; a `NotFound` source means the file does
    /// not exist at the remote.
    pub fn reader(&self) -> VaultResult<Box<dyn Read>> {
        match self {
            Self::File(remote) => remote.reader(),
        }
    }

    /// Opens the addressed file for writing, truncating an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Io`] when the file cannot be created.
    pub fn writer(&self) -> VaultResult<Box<dyn Write>> {
        match self {
            Self::File(remote) => remote.writer(),
        }
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(remote) => remote.fmt(f),
        }
    }
}
