// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The external git tool handle.
//!
//! ```text
//! GitContext::new(&config.git)
//!     which(executable)  --> resolved path
//!     `git --version`    --> probe, fails early with a hint
//!          |
//!          v
//!     .open(workdir) --> GitRepo
//!     .clone_no_hardlinks / .init_bare (no existing repo required)
//! ```
//!
//! Every invocation sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`
//! so a missing credential can never hang a bulk backup on a prompt.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};

use crate::config::GitConfig;
use crate::error::{GitError, VaultResult, bail_out};

use super::repo::GitRepo;

/// Validated handle to the external git tool.
///
/// Holds the resolved executable path and the metadata directory name that
/// marks a repository root. Plain value, cheap to clone, passed down
/// explicitly; there is no process-wide instance.
#[derive(Debug, Clone)]
pub struct GitContext {
    executable: PathBuf,
    dirname: String,
}

impl GitContext {
    /// Resolves the configured executable and probes it with `--version`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::NotInstalled` when the executable cannot be found
    /// on the PATH or the probe fails to run.
    pub fn new(config: &GitConfig) -> VaultResult<Self> {
        let configured = &config.executable;
        let executable = which::which(configured).map_err(|_| GitError::NotInstalled {
            executable: configured.clone(),
        })?;
        let context = Self {
            executable,
            dirname: config.dirname.clone(),
        };
        match context.run_in(Path::new("."), &["--version"]) {
            Ok(version) => debug!("using {version}"),
            Err(_) => {
                return Err(GitError::NotInstalled {
                    executable: configured.clone(),
                }
                .into());
            }
        }
        Ok(context)
    }

    /// Name of the metadata directory that marks a repository root.
    #[must_use]
    pub fn dirname(&self) -> &str {
        &self.dirname
    }

    /// Binds this context to one working directory.
    #[must_use]
    pub fn open<P: Into<PathBuf>>(&self, workdir: P) -> GitRepo {
        GitRepo::new(self.clone(), workdir.into())
    }

    /// Clones `url` into `destination` without hardlinks, naming the remote
    /// `origin_alias` instead of `origin`.
    ///
    /// `--no-hardlinks` keeps the clone independent of a local backup
    /// directory; deleting the backup later must not corrupt the restored
    /// repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails or the destination path is not
    /// valid UTF-8.
    pub fn clone_no_hardlinks(
        &self,
        url: &str,
        origin_alias: &str,
        destination: &Path,
    ) -> VaultResult<()> {
        let dest = destination.to_str().ok_or_else(|| {
            bail_out(format!(
                "destination path '{}' is not valid UTF-8",
                destination.display()
            ))
        })?;
        self.run_in(
            Path::new("."),
            &[
                "clone",
                "--no-hardlinks",
                "--origin",
                origin_alias,
                url,
                dest,
            ],
        )?;
        Ok(())
    }

    /// Initializes a bare repository at `directory` with its HEAD pointing at
    /// `initial_branch`. The directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the init fails.
    pub fn init_bare(&self, directory: &Path, initial_branch: &str) -> VaultResult<()> {
        let initial = format!("--initial-branch={initial_branch}");
        self.run_in(directory, &["init", "--bare", "--quiet", &initial])?;
        Ok(())
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0");
        command
    }

    /// Runs git in `cwd` and returns trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Spawn` when the process cannot start and
    /// `GitError::Exit` (carrying the exit code and trimmed stderr) when git
    /// exits non-zero.
    pub(crate) fn run_in(&self, cwd: &Path, args: &[&str]) -> VaultResult<String> {
        let rendered = render(args);
        trace!(cwd = %cwd.display(), "running `{rendered}`");
        let output = self
            .command(cwd)
            .args(args)
            .output()
            .map_err(|source| GitError::Spawn {
                command: rendered.clone(),
                source,
            })?;
        check_status(&rendered, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Runs git in `cwd` feeding `stdin`, returning raw stdout bytes.
    ///
    /// The input is fed from a scoped thread while stdout drains, so neither
    /// pipe can fill up and deadlock on a large repository.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::run_in`], plus a failure to feed stdin.
    pub(crate) fn run_in_with_stdin(
        &self,
        cwd: &Path,
        args: &[&str],
        stdin: &[u8],
    ) -> VaultResult<Vec<u8>> {
        use std::io::Write;

        let rendered = render(args);
        trace!(cwd = %cwd.display(), bytes = stdin.len(), "running `{rendered}` with stdin");
        let mut child = self
            .command(cwd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GitError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        let sink = child.stdin.take();
        let (output, fed) = std::thread::scope(|scope| {
            let feeder = scope.spawn(move || match sink {
                Some(mut sink) => sink.write_all(stdin),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, feeder.join().unwrap_or(Ok(())))
        });

        let output = output.map_err(|source| GitError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        check_status(&rendered, &output)?;
        // An early exit surfaces as a non-zero status above; a feed failure
        // with a clean exit is still an error.
        fed.map_err(|source| GitError::Spawn {
            command: rendered,
            source,
        })?;
        Ok(output.stdout)
    }
}

fn render(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn check_status(rendered: &str, output: &Output) -> VaultResult<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(GitError::Exit {
        command: rendered.to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
    .into())
}
