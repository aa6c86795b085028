// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The `file://` remote backend.

use std::fmt;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::error::{RemoteError, VaultResult};
use crate::git::GitContext;

/// A remote on a locally mounted filesystem.
///
/// Keeps the URL form (for git) and the decoded path (for direct I/O) in
/// lockstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRemote {
    url: Url,
    path: PathBuf,
}

impl FileRemote {
    /// Parses a `file://` URL.
    ///
    /// # Errors
    ///
    /// Rejects URLs with a host component; `file://backups/x` names a host
    /// `backups`, which is almost never what was meant.
    pub fn from_url(input: &str) -> VaultResult<Self> {
        let url = Url::parse(input).map_err(|error| RemoteError::Parse {
            url: input.to_string(),
            message: error.to_string(),
        })?;
        if let Some(host) = url.host_str()
            && !host.is_empty()
        {
            return Err(RemoteError::HostNotAllowed {
                host: host.to_string(),
            }
            .into());
        }
        let path = url.to_file_path().map_err(|()| RemoteError::InvalidPath {
            path: input.to_string(),
        })?;
        Ok(Self { url, path })
    }

    /// Builds a remote from a plain local path.
    ///
    /// The path is absolutized lexically; it does not have to exist and
    /// symlinks are not resolved.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPath`] when the path cannot be
    /// absolutized or expressed as a URL.
    pub fn from_local_path(path: &Path) -> VaultResult<Self> {
        let absolute = std::path::absolute(path).map_err(|_| RemoteError::InvalidPath {
            path: path.display().to_string(),
        })?;
        let url = Url::from_file_path(&absolute).map_err(|()| RemoteError::InvalidPath {
            path: absolute.display().to_string(),
        })?;
        Ok(Self {
            url,
            path: absolute,
        })
    }

    pub(super) fn as_git_url(&self) -> &str {
        self.url.as_str()
    }

    pub(super) fn name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    pub(super) fn join_path(&self, tail: &Path) -> VaultResult<Self> {
        let mut url = self.url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| RemoteError::InvalidPath {
                        path: self.url.as_str().to_string(),
                    })?;
            segments.pop_if_empty();
            for component in tail.components() {
                let Component::Normal(segment) = component else {
                    return Err(RemoteError::InvalidPath {
                        path: tail.display().to_string(),
                    }
                    .into());
                };
                let Some(segment) = segment.to_str() else {
                    return Err(RemoteError::InvalidPath {
                        path: tail.display().to_string(),
                    }
                    .into());
                };
                segments.push(segment);
            }
        }
        let path = url.to_file_path().map_err(|()| RemoteError::InvalidPath {
            path: url.as_str().to_string(),
        })?;
        Ok(Self { url, path })
    }

    pub(super) fn ensure_directories(&self, mode: Option<u32>) -> VaultResult<()> {
        let mut missing = Vec::new();
        let mut cursor = self.path.as_path();
        while !cursor.exists() {
            missing.push(cursor.to_path_buf());
            let Some(parent) = cursor.parent() else { break };
            cursor = parent;
        }
        if missing.is_empty() {
            return Ok(());
        }
        let mut builder = std::fs::DirBuilder::new();
        #[cfg(unix)]
        if let Some(mode) = mode {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        for directory in missing.iter().rev() {
            debug!("creating remote directory {}", directory.display());
            builder
                .create(directory)
                .map_err(|source| RemoteError::CreateDir {
                    path: directory.display().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    pub(super) fn init_bare_if_empty(
        &self,
        context: &GitContext,
        initial_branch: &str,
    ) -> VaultResult<()> {
        let mut entries = std::fs::read_dir(&self.path).map_err(|source| RemoteError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        if entries.next().is_some() {
            return Ok(());
        }
        info!("initializing bare repository at {}", self.path.display());
        context.init_bare(&self.path, initial_branch)
    }

    pub(super) fn reader(&self) -> VaultResult<Box<dyn Read>> {
        let file = std::fs::File::open(&self.path).map_err(|source| RemoteError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }

    pub(super) fn writer(&self) -> VaultResult<Box<dyn Write>> {
        let file = std::fs::File::create(&self.path).map_err(|source| RemoteError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

impl fmt::Display for FileRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
