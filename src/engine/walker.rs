//! Walker / orchestrator: drives the recursive walk over the source tree,
//! composing matcher, classifier, and materializer, restoring directory
//! metadata post-walk, and updating the `latest` pointer.

#![allow(missing_docs)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local};

use crate::core::errors::{PdumpfsError, Result};
use crate::core::paths::{date_dir, is_same_or_below, make_relative, resolve_absolute_path};
use crate::engine::classifier::{Classification, Classifier};
use crate::engine::locator::SnapshotLocator;
use crate::engine::matcher::Matcher;
use crate::engine::materializer::Materializer;
use crate::engine::platform::{Metadata, MetadataAdapter};
use crate::engine::reporter::Reporter;

/// Options a caller supplies for a single run, on top of the required
/// source/destination paths.
#[derive(Debug, Clone, Default)]
pub struct WalkerOptions {
    /// Final path segment under each date directory; defaults to the
    /// basename of the source path.
    pub base_name: Option<String>,
    /// Perform classification and reporting but no writes, no `latest`
    /// update, and no log entry.
    pub dry_run: bool,
    /// Append-mode log file destination.
    pub log_file: Option<PathBuf>,
}

/// Aggregated outcome of a completed (or dry-run) walk.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Root of today's snapshot (`D/YYYY/MM/DD/BaseName`).
    pub today: PathBuf,
    /// Total bytes written by copy actions this run.
    pub bytes_written: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Count of recoverable per-entry warnings emitted.
    pub warnings: usize,
}

/// Drives one source-to-destination snapshot run.
pub struct Walker {
    platform: Arc<dyn MetadataAdapter>,
    matcher: Arc<dyn Matcher>,
    reporter: Arc<dyn Reporter>,
}

/// Forces the process umask to `0077` for the lifetime of a run and restores
/// the previous mask on drop, so it is released on every return path
/// (success, preflight rejection, or mid-walk error) without duplicating
/// restore logic at each `?`.
#[cfg(unix)]
struct UmaskGuard(nix::sys::stat::Mode);

#[cfg(unix)]
impl UmaskGuard {
    fn forced_to_0077() -> Self {
        let previous = nix::sys::stat::umask(nix::sys::stat::Mode::from_bits_truncate(0o077));
        Self(previous)
    }
}

#[cfg(unix)]
impl Drop for UmaskGuard {
    fn drop(&mut self) {
        let _ = nix::sys::stat::umask(self.0);
    }
}

#[cfg(not(unix))]
struct UmaskGuard;

#[cfg(not(unix))]
impl UmaskGuard {
    fn forced_to_0077() -> Self {
        Self
    }
}

struct WalkState<'a> {
    source_root: &'a Path,
    latest: Option<&'a Path>,
    today_root: &'a Path,
    classifier: &'a Classifier<'a>,
    materializer: &'a Materializer<'a>,
    bytes_written: u64,
    warnings: usize,
    pending_dirs: Vec<(PathBuf, Metadata)>,
}

impl Walker {
    #[must_use]
    pub fn new(
        platform: Arc<dyn MetadataAdapter>,
        matcher: Arc<dyn Matcher>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            platform,
            matcher,
            reporter,
        }
    }

    /// Run one snapshot: walk `source`, locate the most recent prior
    /// snapshot under `dest`, and materialize today's snapshot.
    pub fn run(&self, source: &Path, dest: &Path, options: &WalkerOptions) -> Result<RunSummary> {
        let start = Instant::now();
        let _umask_guard = UmaskGuard::forced_to_0077();

        let source = resolve_absolute_path(source);
        let dest = resolve_absolute_path(dest);

        if source == dest || is_same_or_below(&dest, &source) {
            return Err(PdumpfsError::preflight(
                "source must not equal, nor be an ancestor of, destination",
            ));
        }
        if !dest.is_dir() {
            return Err(PdumpfsError::preflight(format!(
                "destination does not exist: {}",
                dest.display()
            )));
        }
        if !self.platform.supports_hard_links(&dest).unwrap_or(false) {
            return Err(PdumpfsError::preflight(
                "destination filesystem does not support hard links",
            ));
        }

        let base_name = options.base_name.clone().unwrap_or_else(|| {
            source
                .file_name()
                .map_or_else(|| "root".to_string(), |name| name.to_string_lossy().into_owned())
        });

        let now = Local::now();
        let today_triple = (now.year(), now.month(), now.day());
        let today_dir_segment = date_dir(today_triple.0, today_triple.1, today_triple.2);
        let today = dest.join(&today_dir_segment).join(&base_name);

        let latest = SnapshotLocator::locate(&dest, &base_name, today_triple);

        if !options.dry_run {
            self.create_dated_tree(&dest, &today_dir_segment, &base_name)?;
        }

        let classifier = Classifier::new(self.platform.as_ref());
        let materializer = Materializer::new(self.platform.as_ref(), options.dry_run);

        let mut state = WalkState {
            source_root: &source,
            latest: latest.as_deref(),
            today_root: &today,
            classifier: &classifier,
            materializer: &materializer,
            bytes_written: 0,
            warnings: 0,
            pending_dirs: Vec::new(),
        };

        self.walk(&source, &mut state)?;

        if !options.dry_run {
            for (path, meta) in &state.pending_dirs {
                self.platform
                    .utime(path, meta.atime, meta.mtime)
                    .map_err(|err| PdumpfsError::materialization(path, err))?;
                self.platform
                    .chmod(path, meta.mode)
                    .map_err(|err| PdumpfsError::materialization(path, err))?;
            }

            let latest_link = dest.join("latest");
            self.platform
                .force_symlink(&today_dir_segment.join(&base_name), &latest_link)
                .map_err(|err| PdumpfsError::materialization(&latest_link, err))?;
        }

        let elapsed = start.elapsed();

        if !options.dry_run
            && let Some(log_file) = &options.log_file
        {
            append_log_line(log_file, &source, &today, elapsed, state.bytes_written)?;
        }

        Ok(RunSummary {
            today,
            bytes_written: state.bytes_written,
            elapsed,
            warnings: state.warnings,
        })
    }

    /// Create every path component from `YYYY` down through `BaseName` under
    /// `dest`, explicitly setting mode `0770` on each newly-created (or
    /// already-present) component. Intermediate date directories are
    /// created one at a time, rather than via `create_dir_all`, so each one
    /// gets its own `chmod` — the forced process umask narrows the
    /// transient window before that `chmod` lands, but does not replace it.
    fn create_dated_tree(&self, dest: &Path, date_segment: &Path, base_name: &str) -> Result<()> {
        let mut current = dest.to_path_buf();
        let base_component = std::ffi::OsStr::new(base_name);
        for part in date_segment
            .components()
            .map(|component| component.as_os_str())
            .chain(std::iter::once(base_component))
        {
            current.push(part);
            match std::fs::create_dir(&current) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(err) => return Err(PdumpfsError::materialization(&current, err)),
            }
            self.platform
                .chmod(&current, 0o770)
                .map_err(|err| PdumpfsError::materialization(&current, err))?;
        }
        Ok(())
    }

    fn walk(&self, current: &Path, state: &mut WalkState<'_>) -> Result<()> {
        let source_meta = match self.platform.lstat(current) {
            Ok(meta) => meta,
            Err(err) if is_recoverable(&err) => {
                self.reporter.warning(current, &err.to_string());
                state.warnings += 1;
                return Ok(());
            }
            Err(err) => return Err(PdumpfsError::io(current, err)),
        };

        if self
            .matcher
            .excludes(current, source_meta.kind, source_meta.size)
        {
            return Ok(());
        }

        let relative = make_relative(current, state.source_root);
        let target = state.today_root.join(&relative);
        let prior = state.latest.map(|latest| latest.join(&relative));

        let classification = state.classifier.classify(&source_meta, prior.as_deref());
        self.reporter.entry(classification, &relative);

        let link_source = if classification == Classification::Unchanged {
            prior.as_deref()
        } else {
            None
        };

        state.materializer.materialize(
            classification,
            current,
            link_source,
            &target,
            &mut state.bytes_written,
            || self.reporter.tick(),
        )?;

        if classification == Classification::Directory {
            state.pending_dirs.push((target.clone(), source_meta));

            let entries = match std::fs::read_dir(current) {
                Ok(entries) => entries,
                Err(err) if is_recoverable(&err) => {
                    self.reporter.warning(current, &err.to_string());
                    state.warnings += 1;
                    return Ok(());
                }
                Err(err) => return Err(PdumpfsError::io(current, err)),
            };

            for entry in entries {
                match entry {
                    Ok(entry) => self.walk(&entry.path(), state)?,
                    Err(err) if is_recoverable(&err) => {
                        self.reporter.warning(current, &err.to_string());
                        state.warnings += 1;
                    }
                    Err(err) => return Err(PdumpfsError::io(current, err)),
                }
            }
        }

        Ok(())
    }
}

fn is_recoverable(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
    )
}

fn append_log_line(
    log_file: &Path,
    source: &Path,
    today: &Path,
    elapsed: Duration,
    bytes_written: u64,
) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|err| PdumpfsError::io(log_file, err))?;
    let line = format!(
        "{}: {} -> {} (in {:.2} sec, {} written)\n",
        Local::now().format("%Y-%m-%dT%H:%M:%S"),
        source.display(),
        today.display(),
        elapsed.as_secs_f64(),
        human_bytes(bytes_written),
    );
    file.write_all(line.as_bytes())
        .map_err(|err| PdumpfsError::io(log_file, err))
}

/// Format a byte count using the nearest of `B`, `KB`, `MB`, `GB`, with
/// thresholds `1024`, `1024*1000`, `1024*1024*1000`.
#[must_use]
pub fn human_bytes(bytes: u64) -> String {
    const KB_THRESHOLD: u64 = 1024;
    const MB_THRESHOLD: u64 = 1024 * 1000;
    const GB_THRESHOLD: u64 = 1024 * 1024 * 1000;

    if bytes < KB_THRESHOLD {
        format!("{bytes}B")
    } else if bytes < MB_THRESHOLD {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else if bytes < GB_THRESHOLD {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1}GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
