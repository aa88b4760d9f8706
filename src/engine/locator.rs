//! Snapshot locator: finds the most recent `D/YYYY/MM/DD/<base>` strictly
//! before today.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use crate::core::paths::parse_date_components;

/// Finds the most recent prior snapshot under a destination root.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotLocator;

impl SnapshotLocator {
    /// Search `dest_root` for date directories strictly before `today`
    /// whose `base_name` subdirectory exists, returning the full path to
    /// that subdirectory (the previous snapshot root) for the most recent
    /// survivor, or `None` if there isn't one.
    #[must_use]
    pub fn locate(dest_root: &Path, base_name: &str, today: (i32, u32, u32)) -> Option<PathBuf> {
        let mut candidates = Self::candidate_date_dirs(dest_root);
        candidates.sort_unstable_by(|a, b| b.cmp(a));

        for (year, month, day) in candidates {
            let Some(parsed) = parse_date_components(&year, &month, &day) else {
                continue;
            };
            if parsed >= today {
                continue;
            }
            let candidate = dest_root.join(&year).join(&month).join(&day);
            let snapshot = candidate.join(base_name);
            if snapshot.is_dir() {
                return Some(snapshot);
            }
        }
        None
    }

    fn candidate_date_dirs(dest_root: &Path) -> Vec<(String, String, String)> {
        let mut out = Vec::new();
        let Ok(years) = std::fs::read_dir(dest_root) else {
            return out;
        };
        for year_entry in years.flatten() {
            let year = year_entry.file_name().to_string_lossy().into_owned();
            if !is_digit_run(&year, 4) || !year_entry.path().is_dir() {
                continue;
            }
            let Ok(months) = std::fs::read_dir(year_entry.path()) else {
                continue;
            };
            for month_entry in months.flatten() {
                let month = month_entry.file_name().to_string_lossy().into_owned();
                if !is_digit_run(&month, 2) || !month_entry.path().is_dir() {
                    continue;
                }
                let Ok(days) = std::fs::read_dir(month_entry.path()) else {
                    continue;
                };
                for day_entry in days.flatten() {
                    let day = day_entry.file_name().to_string_lossy().into_owned();
                    if !is_digit_run(&day, 2) || !day_entry.path().is_dir() {
                        continue;
                    }
                    out.push((year.clone(), month.clone(), day));
                }
            }
        }
        out
    }
}

fn is_digit_run(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|byte| byte.is_ascii_digit())
}
