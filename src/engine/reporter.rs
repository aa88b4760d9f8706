//! Reporter: the callback surface through which the engine emits per-entry
//! progress, warnings, and interval ticks (per §5's interval-callback
//! contract) without depending on any particular output sink.

#![allow(missing_docs)]

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::engine::classifier::Classification;

/// Receives progress from a run: one `entry` call per visited path, one
/// `warning` call per recoverable per-entry failure, and one `tick` call
/// at each interval-callback suspension point (copy-loop block boundary
/// and per-entry report site).
pub trait Reporter: Send + Sync {
    /// A path was visited and classified.
    fn entry(&self, classification: Classification, relative_path: &Path);
    /// A recoverable per-entry error occurred; the walk continues.
    fn warning(&self, path: &Path, message: &str);
    /// Interval callback suspension point; must be non-blocking and must
    /// not re-enter the engine.
    fn tick(&self) {}
}

/// Writes human-readable progress lines to a configurable sink; used for
/// `-q`/`--quiet` by swapping the sink for [`std::io::sink`].
pub struct HumanReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl HumanReporter {
    /// Report to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    /// Report to the host's null device, i.e. discard everything. Used
    /// for `-q`/`--quiet`.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            out: Mutex::new(Box::new(std::io::sink())),
        }
    }
}

impl Reporter for HumanReporter {
    fn entry(&self, classification: Classification, relative_path: &Path) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{classification} {}", relative_path.display());
        }
    }

    fn warning(&self, path: &Path, message: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "warning: {}: {message}", path.display());
        }
    }
}

/// Discards all progress. Used by embedders that poll [`crate::engine::RunSummary`]
/// instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn entry(&self, _classification: Classification, _relative_path: &Path) {}
    fn warning(&self, _path: &Path, _message: &str) {}
}

#[cfg(test)]
pub struct RecordingReporter {
    pub entries: Mutex<Vec<(Classification, std::path::PathBuf)>>,
    pub warnings: Mutex<Vec<(std::path::PathBuf, String)>>,
    pub ticks: Mutex<u64>,
}

#[cfg(test)]
impl Default for RecordingReporter {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
            ticks: Mutex::new(0),
        }
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn entry(&self, classification: Classification, relative_path: &Path) {
        self.entries
            .lock()
            .unwrap()
            .push((classification, relative_path.to_path_buf()));
    }

    fn warning(&self, path: &Path, message: &str) {
        self.warnings
            .lock()
            .unwrap()
            .push((path.to_path_buf(), message.to_string()));
    }

    fn tick(&self) {
        *self.ticks.lock().unwrap() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_captures_entries_and_warnings() {
        let reporter = RecordingReporter::default();
        reporter.entry(Classification::NewFile, Path::new("a.txt"));
        reporter.warning(Path::new("b.txt"), "permission denied");
        reporter.tick();

        assert_eq!(reporter.entries.lock().unwrap().len(), 1);
        assert_eq!(reporter.warnings.lock().unwrap().len(), 1);
        assert_eq!(*reporter.ticks.lock().unwrap(), 1);
    }

    #[test]
    fn null_reporter_discards_everything() {
        let reporter = NullReporter;
        reporter.entry(Classification::Directory, Path::new("."));
        reporter.warning(Path::new("."), "ignored");
        reporter.tick();
    }

    #[test]
    fn classification_tag_is_fixed_width() {
        for tag in [
            Classification::Directory,
            Classification::Unchanged,
            Classification::Updated,
            Classification::NewFile,
            Classification::Symlink,
            Classification::Unsupported,
        ] {
            assert_eq!(format!("{tag}").len(), 11);
        }
    }
}
