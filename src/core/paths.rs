//! PathOps: pure helpers for date-directory names, relative-path stripping,
//! path containment, and date parsing from directory components.

use std::env;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;

/// Resolve a path to an absolute, normalized path.
///
/// If `fs::canonicalize` succeeds (path exists), it is used to resolve
/// symlinks and normalize components. If it fails (path does not exist yet,
/// e.g. the destination's date directory before it is created), the path is
/// made absolute relative to CWD and `..`/`.` components are resolved
/// syntactically.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    // Try filesystem resolution first (handles symlinks).
    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    // Fallback: syntactic normalization.
    normalize_syntactic(&absolute)
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

/// Build the `YYYY/MM/DD` path segment for a calendar date, using the
/// native path separator and exactly 4/2/2 zero-padded components.
#[must_use]
pub fn date_dir(year: i32, month: u32, day: u32) -> PathBuf {
    PathBuf::from(format!("{year:04}"))
        .join(format!("{month:02}"))
        .join(format!("{day:02}"))
}

/// Strip one leading `base` (plus its separator) from `child`.
///
/// The result never starts with a separator and is empty iff
/// `child == base`.
#[must_use]
pub fn make_relative(child: &Path, base: &Path) -> PathBuf {
    match child.strip_prefix(base) {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => child.to_path_buf(),
    }
}

/// True iff the canonicalized `candidate` equals `ancestor` or begins with
/// `ancestor` followed by a path separator.
#[must_use]
pub fn is_same_or_below(candidate: &Path, ancestor: &Path) -> bool {
    let candidate = resolve_absolute_path(candidate);
    let ancestor = resolve_absolute_path(ancestor);
    candidate == ancestor || candidate.starts_with(&ancestor)
}

/// Ordered list of path components from root to leaf, excluding any
/// drive/root prefix element. Used by the snapshot locator to recover
/// `(year, month, day)` from the final three components of a candidate path.
#[must_use]
pub fn split_all(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Parse `(year, month, day)` from three zero-padded directory-name
/// components, requiring they form a valid calendar date.
#[must_use]
pub fn parse_date_components(year: &str, month: &str, day: &str) -> Option<(i32, u32, u32)> {
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    let year_value: i32 = year.parse().ok()?;
    let month_value: u32 = month.parse().ok()?;
    let day_value: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year_value, month_value, day_value)?;
    Some((year_value, month_value, day_value))
}
