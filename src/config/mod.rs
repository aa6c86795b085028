// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for repovault.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. local repovault.toml (cwd)
//! 3. --config files
//! 4. REPOVAULT_* env vars
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! REPOVAULT_GIT_EXECUTABLE=/opt/git/bin/git → git.executable
//! REPOVAULT_GIT_DIRNAME=.git                → git.dirname
//! ```
//!
//! The merged [`Config`] is built exactly once at process start and handed to
//! every component that needs it; nothing reads the environment afterwards.

pub mod loader;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;

/// Default configuration file searched in the current directory.
pub const CONFIG_FILE_NAME: &str = "repovault.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "REPOVAULT";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// External git tool options.
    pub git: GitConfig,
}

/// How to reach and recognize git.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Executable name or path used for every external invocation.
    pub executable: String,
    /// Name of the metadata directory that marks a repository root.
    pub dirname: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            dirname: ".git".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repovault::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("repovault.toml")
    ///     .with_env_prefix("REPOVAULT")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match
    /// the `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Standard startup loading: optional `repovault.toml` in the current
    /// directory, then any explicitly requested files, then `REPOVAULT_*`
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file is missing or
    /// invalid, or if the merged result does not deserialize.
    pub fn load<P: AsRef<Path>>(extra_files: &[P]) -> Result<Self> {
        let mut loader = Self::builder().add_toml_file_optional(CONFIG_FILE_NAME);
        for file in extra_files {
            loader = loader.add_toml_file(file);
        }
        for (source, path) in loader.loaded_files() {
            tracing::debug!("config source [{source}]: {}", path.display());
        }
        loader.with_env_prefix(ENV_PREFIX).build()
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty executable or a
    /// dirname that is not a single path component.
    pub(crate) fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.git.executable.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "git.executable".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let dirname = &self.git.dirname;
        if dirname.is_empty() || dirname.contains('/') || dirname.contains('\\') {
            return Err(ConfigError::InvalidValue {
                key: "git.dirname".to_string(),
                message: format!("'{dirname}' must be a bare directory name"),
            });
        }
        Ok(())
    }
}
