// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!             VaultError (~24 bytes)
//!                     |
//!     +--------+------+------+--------+
//!     |        |      |      |        |
//!     v        v      v      v        v
//!   Abort    Git   Remote  Config  Io/Other
//!    Box     Box    Box     Box    Box/Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Abort   OperationInProgress, SnapshotBranchCheckedOut, RemoteUnreachable
//!   Git     NotInstalled, Spawn, Exit, Gix, attribute/snapshot decoding
//!   Remote  UnsupportedScheme, HostNotAllowed, InvalidPath, CreateDir
//!   Config  InvalidValue, Load
//! ```
//!
//! Abort means "skip this repository, keep the bulk run going"; everything
//! else halts the current operation. `Exit` carries the external tool's exit
//! code so the process can terminate with the same status.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`VaultError`].
pub type VaultResult<T> = std::result::Result<T, VaultError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Repository-scoped condition: skip this repository, continue the run.
    #[error("{0}")]
    Abort(#[from] Box<AbortError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Remote location error.
    #[error("remote error: {0}")]
    Remote(#[from] Box<RemoteError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Nothing to back up under the scanned root. Halts the whole run.
    #[error("No git repositories were found under '{0}'.")]
    NoRepositories(Box<str>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl VaultError {
    /// Returns the abort reason when this error only condemns one repository.
    ///
    /// The orchestrator uses this to decide between "warn and continue with
    /// the next repository" and "halt the run".
    #[must_use]
    pub fn abort_reason(&self) -> Option<&AbortError> {
        match self {
            Self::Abort(reason) => Some(reason),
            _ => None,
        }
    }

    /// Returns the external tool's exit code when the failure came from a
    /// non-zero git exit.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Git(err) => match **err {
                GitError::Exit { code, .. } => Some(code),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Create a fatal [`VaultError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> VaultError {
    VaultError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for VaultError {
                fn from(err: $error) -> Self {
                    VaultError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    AbortError => Abort,
    GitError => Git,
    RemoteError => Remote,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Abort Errors ---

/// Conditions under which one repository is skipped while a bulk run
/// continues with its siblings.
#[derive(Debug, Error)]
pub enum AbortError {
    /// The repository is in the middle of a merge, rebase, cherry-pick or
    /// revert; snapshotting now would capture half-finished state.
    #[error("cannot snapshot during an in-progress {operation}")]
    OperationInProgress { operation: String },

    /// The reserved scratch branch is the currently checked-out branch.
    #[error("the snapshot branch '{branch}' is currently checked out; refusing to snapshot a snapshot")]
    SnapshotBranchCheckedOut { branch: String },

    /// The connectivity probe could not reach the remote.
    #[error("remote '{url}' is not reachable: {message}")]
    RemoteUnreachable { url: String, message: String },
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),
}

// --- Git Errors ---

/// Git plumbing errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// The configured executable could not be located or probed.
    #[error(
        "failed to run '{executable} --version'; check that git is installed and on your PATH, \
         or set REPOVAULT_GIT_EXECUTABLE"
    )]
    NotInstalled { executable: String },

    /// Spawning the external process failed outright.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Git exited non-zero. `code` is echoed as the process exit status.
    #[error("'{command}' exited with code {code}: {stderr}")]
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Error from the gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// A path carries a snapshot attribute value this tool does not know.
    #[error("unsupported snapshot attribute value '{value}' on '{path}'")]
    AttributeValue { path: String, value: String },

    /// The bulk attribute query reply could not be decoded.
    #[error("malformed attribute query response: {detail}")]
    AttributeResponse { detail: String },

    /// The tip commit of a cloned backup does not carry a snapshot marker.
    #[error("tip commit message '{message}' is not a snapshot marker")]
    SnapshotTip { message: String },
}

// --- Remote Errors ---

/// Remote location addressing and preparation errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The URL's scheme has no backend.
    #[error("unsupported remote scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    /// file:// URLs must not carry a host component.
    #[error("unexpected host '{host}' in file URL. Did you mean file:/// (with 3 slashes)?")]
    HostNotAllowed { host: String },

    /// The URL could not be parsed at all.
    #[error("invalid remote URL '{url}': {message}")]
    Parse { url: String, message: String },

    /// A local path could not be expressed as a file URL (or vice versa).
    #[error("cannot convert between path and URL: '{path}'")]
    InvalidPath { path: String },

    /// Directory creation at the remote failed.
    #[error("failed to create remote directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Raw byte I/O against the remote failed.
    #[error("remote I/O on '{path}' failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Layered configuration could not be loaded or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<config::ConfigError>),
}
