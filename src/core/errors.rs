//! pdumpfs-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the engine and CLI.
pub type Result<T> = std::result::Result<T, PdumpfsError>;

/// Top-level error type for pdumpfs.
///
/// There are exactly three fatal families (preflight, configuration,
/// materialization) plus a generic IO wrapper for conversions at call
/// sites that do not fit one of those three. Per-entry recoverable
/// failures never become a `PdumpfsError` — they are reported through
/// `Reporter::warning` and the walk continues.
#[derive(Debug, Error)]
pub enum PdumpfsError {
    #[error("[PDF-1001] {reason}")]
    Preflight { reason: String },

    #[error("[PDF-1002] configuration error: {reason}")]
    Configuration { reason: String },

    #[error("[PDF-2001] failed to materialize {path}: {source}")]
    Materialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[PDF-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PdumpfsError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Preflight { .. } => "PDF-1001",
            Self::Configuration { .. } => "PDF-1002",
            Self::Materialization { .. } => "PDF-2001",
            Self::Io { .. } => "PDF-3001",
        }
    }

    /// Convenience constructor for preflight failures.
    #[must_use]
    pub fn preflight(reason: impl Into<String>) -> Self {
        Self::Preflight {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration failures.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for materialization failures with a known path.
    #[must_use]
    pub fn materialization(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Materialization {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for PdumpfsError {
    fn from(value: toml::de::Error) -> Self {
        Self::Configuration {
            reason: format!("toml: {value}"),
        }
    }
}

impl From<regex::Error> for PdumpfsError {
    fn from(value: regex::Error) -> Self {
        Self::Configuration {
            reason: format!("invalid regex: {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_unique() {
        let errors: Vec<PdumpfsError> = vec![
            PdumpfsError::preflight("x"),
            PdumpfsError::configuration("x"),
            PdumpfsError::materialization(
                "/tmp/x",
                std::io::Error::new(std::io::ErrorKind::Other, "test"),
            ),
            PdumpfsError::io(
                "/tmp/x",
                std::io::Error::new(std::io::ErrorKind::Other, "test"),
            ),
        ];
        let codes: Vec<&str> = errors.iter().map(PdumpfsError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn error_codes_have_pdf_prefix() {
        for err in [
            PdumpfsError::preflight("x"),
            PdumpfsError::configuration("x"),
        ] {
            assert!(err.code().starts_with("PDF-"));
        }
    }

    #[test]
    fn error_display_includes_code_and_reason() {
        let err = PdumpfsError::preflight("source is an ancestor of destination");
        let msg = err.to_string();
        assert!(msg.contains("PDF-1001"));
        assert!(msg.contains("ancestor"));
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: PdumpfsError = toml_err.into();
        assert_eq!(err.code(), "PDF-1002");
    }

    #[test]
    fn from_regex_error() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: PdumpfsError = regex_err.into();
        assert_eq!(err.code(), "PDF-1002");
    }
}
