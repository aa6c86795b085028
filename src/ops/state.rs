// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bookkeeping stored next to a backup.
//!
//! A small JSON file kept beside the bare repository at the remote. It is
//! advisory: backups never read it and restore only surfaces it to the user,
//! so a missing or stale file is harmless.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, VaultError, VaultResult};
use crate::remote::RemoteUrl;

pub const STATE_FILE_NAME: &str = "repovault-state.json";

/// What the working directory looked like when the backup ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// The checked-out branch, `None` for a detached HEAD.
    pub current_branch: Option<String>,
}

/// Writes the state file beside the backup.
///
/// # Errors
///
/// Returns an error when the remote cannot be written or the state cannot be
/// encoded.
pub fn write_to(remote: &RemoteUrl, state: &PersistedState) -> VaultResult<()> {
    let target = remote.join_path(Path::new(STATE_FILE_NAME))?;
    let writer = target.writer()?;
    serde_json::to_writer_pretty(writer, state).map_err(|error| {
        VaultError::Other(format!("failed to encode {STATE_FILE_NAME}: {error}").into_boxed_str())
    })?;
    Ok(())
}

/// Reads the state file beside the backup, `None` when there is none.
///
/// # Errors
///
/// Returns an error for unreadable remotes and undecodable files; a missing
/// file is not an error.
pub fn read_from(remote: &RemoteUrl) -> VaultResult<Option<PersistedState>> {
    let source = remote.join_path(Path::new(STATE_FILE_NAME))?;
    let reader = match source.reader() {
        Ok(reader) => reader,
        Err(error) if is_not_found(&error) => return Ok(None),
        Err(error) => return Err(error),
    };
    let state = serde_json::from_reader(reader).map_err(|error| {
        VaultError::Other(format!("failed to decode {STATE_FILE_NAME}: {error}").into_boxed_str())
    })?;
    Ok(Some(state))
}

fn is_not_found(error: &VaultError) -> bool {
    let VaultError::Remote(remote) = error else {
        return false;
    };
    matches!(
        remote.as_ref(),
        RemoteError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
    )
}
