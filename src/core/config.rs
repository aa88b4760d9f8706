//! Configuration: TOML file + environment variable override + CLI flags.
//!
//! Resolution order, highest priority last: built-in defaults, then the
//! TOML config file (if present), then CLI flags (applied by the caller
//! after [`Config::load`] returns, via [`Config::merge_cli`]).

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PdumpfsError, Result};

/// Exclusion and logging knobs as declared in a config file; mirrors the
/// matching CLI flags of the same name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Full-path regex patterns to exclude.
    pub exclude: Vec<String>,
    /// Basename glob patterns to exclude (regular files only).
    pub exclude_glob: Vec<String>,
    /// Minimum size, e.g. `"10M"`, above which regular files are excluded.
    pub exclude_by_size: Option<String>,
    /// Append-mode log file destination.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Default configuration file path: `$XDG_CONFIG_HOME/pdumpfs/config.toml`,
    /// falling back to `~/.config/pdumpfs/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("pdumpfs").join("config.toml");
        }
        let home = env::var_os("HOME").map_or_else(|| PathBuf::from("/"), PathBuf::from);
        home.join(".config").join("pdumpfs").join("config.toml")
    }

    /// Load config from an explicit path, `PDUMPFS_CONFIG`, or the default
    /// path, in that order. A missing file at the default (non-explicit)
    /// path is not an error — defaults are used instead.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let env_path = if explicit_path.is_none() {
            env::var_os("PDUMPFS_CONFIG").map(PathBuf::from)
        } else {
            None
        };
        let is_explicit = explicit_path.is_some() || env_path.is_some();
        let effective_path = explicit_path.map_or_else(
            || env_path.unwrap_or_else(Self::default_path),
            Path::to_path_buf,
        );

        if !effective_path.exists() {
            if is_explicit {
                return Err(PdumpfsError::configuration(format!(
                    "config file not found: {}",
                    effective_path.display()
                )));
            }
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&effective_path)
            .map_err(|source| PdumpfsError::io(&effective_path, source))?;
        let parsed: Self = toml::from_str(&raw)?;
        Ok(parsed)
    }

    /// Merge CLI-supplied overrides on top of a loaded config. CLI flags
    /// always win over file-scalars; list-valued excludes are concatenated
    /// so CLI patterns add to, rather than replace, config-file patterns.
    #[must_use]
    pub fn merge_cli(mut self, cli: CliOverrides) -> Self {
        self.exclude.extend(cli.exclude);
        self.exclude_glob.extend(cli.exclude_glob);
        if let Some(size) = cli.exclude_by_size {
            self.exclude_by_size = Some(size);
        }
        if let Some(log_file) = cli.log_file {
            self.log_file = Some(log_file);
        }
        self
    }
}

/// CLI-flag values that may override or extend a loaded [`Config`].
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub exclude: Vec<String>,
    pub exclude_glob: Vec<String>,
    pub exclude_by_size: Option<String>,
    pub log_file: Option<PathBuf>,
}
