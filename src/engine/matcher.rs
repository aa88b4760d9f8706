//! Exclusion matcher: decides, for each encountered path, whether to skip
//! it (and, for directories, whether to prune descent).
//!
//! Two variants: [`NullMatcher`], which never excludes anything, and
//! [`ConfiguredMatcher`], combining full-path regex patterns, basename
//! shell-style globs (regular files only), and a minimum-size threshold
//! (regular files only). The matcher must `lstat` — never follow
//! symlinks — when inspecting the candidate; callers are expected to pass
//! metadata obtained the same way.

#![allow(missing_docs)]

use std::path::Path;

use regex::Regex;

use crate::core::errors::{PdumpfsError, Result};
use crate::engine::platform::EntryKind;

/// Decides whether a path should be skipped during the walk.
pub trait Matcher: Send + Sync {
    /// True iff `path` (of the given kind and, for regular files, size)
    /// should be excluded.
    fn excludes(&self, path: &Path, kind: EntryKind, size: u64) -> bool;
}

/// Matcher that never excludes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMatcher;

impl Matcher for NullMatcher {
    fn excludes(&self, _path: &Path, _kind: EntryKind, _size: u64) -> bool {
        false
    }
}

/// Matcher combining regex patterns on the full path, basename globs on
/// regular files, and a byte-size threshold on regular files.
#[derive(Debug, Clone)]
pub struct ConfiguredMatcher {
    patterns: Vec<Regex>,
    globs: Vec<Regex>,
    size_threshold: Option<u64>,
}

impl ConfiguredMatcher {
    /// Build a matcher from raw pattern strings, glob strings, and an
    /// optional size-suffix string (see [`parse_size`]).
    pub fn new(patterns: &[String], globs: &[String], size: Option<&str>) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| Regex::new(pattern).map_err(PdumpfsError::from))
            .collect::<Result<Vec<_>>>()?;
        let globs = globs
            .iter()
            .map(|glob| glob_to_regex(glob))
            .collect::<Result<Vec<_>>>()?;
        let size_threshold = size.map(parse_size).transpose()?;
        Ok(Self {
            patterns,
            globs,
            size_threshold,
        })
    }
}

impl Matcher for ConfiguredMatcher {
    fn excludes(&self, path: &Path, kind: EntryKind, size: u64) -> bool {
        if kind == EntryKind::File {
            if let Some(threshold) = self.size_threshold
                && size >= threshold
            {
                return true;
            }
        }

        let path_str = path.to_string_lossy();
        if self.patterns.iter().any(|pattern| pattern.is_match(&path_str)) {
            return true;
        }

        if kind == EntryKind::File
            && let Some(name) = path.file_name()
        {
            let name = name.to_string_lossy();
            if self.globs.iter().any(|glob| glob.is_match(&name)) {
                return true;
            }
        }

        false
    }
}

/// Parse a size string of the form `\d+[KMGTP]?` (case-insensitive
/// suffix), interpreting suffixes as powers of 1024. No suffix means a
/// multiplier of 1.
pub fn parse_size(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let (digits, multiplier) = match trimmed.chars().last() {
        Some(last) if last.is_ascii_alphabetic() => {
            let multiplier = match last.to_ascii_uppercase() {
                'K' => 1024u64,
                'M' => 1024u64.pow(2),
                'G' => 1024u64.pow(3),
                'T' => 1024u64.pow(4),
                'P' => 1024u64.pow(5),
                other => {
                    return Err(PdumpfsError::configuration(format!(
                        "invalid size suffix {other:?} in {raw:?}"
                    )));
                }
            };
            (&trimmed[..trimmed.len() - 1], multiplier)
        }
        _ => (trimmed, 1),
    };
    let base: u64 = digits
        .parse()
        .map_err(|_| PdumpfsError::configuration(format!("invalid size {raw:?}")))?;
    Ok(base.saturating_mul(multiplier))
}

/// Convert a shell-style glob pattern to a regex anchored on the whole
/// string. Supports `*` (anything except `/`), `?` (one character except
/// `/`), and literal everything else; basenames never contain `/`, so `**`
/// degenerates to the same behavior as `*` here.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex_str = String::with_capacity(pattern.len() * 2);
    regex_str.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex_str.push_str("[^/]*"),
            '?' => regex_str.push_str("[^/]"),
            '.' | '+' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '$' | '|' | '\\' => {
                regex_str.push('\\');
                regex_str.push(ch);
            }
            c => regex_str.push(c),
        }
    }
    regex_str.push('$');
    Regex::new(&regex_str).map_err(|err| {
        PdumpfsError::configuration(format!("invalid glob pattern {pattern:?}: {err}"))
    })
}
