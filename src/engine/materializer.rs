//! Materializer: turns a classification into the corresponding filesystem
//! action on a target path, preserving metadata and accounting bytes
//! written.

#![allow(missing_docs)]

use std::io::{Read, Write};
use std::path::Path;

use crate::core::errors::{PdumpfsError, Result};
use crate::engine::classifier::Classification;
use crate::engine::platform::{EntryKind, MetadataAdapter};

/// Number of copy-loop blocks between interval-callback invocations.
pub const TICK_INTERVAL_BLOCKS: u32 = 10;
const FALLBACK_BLOCK_SIZE: usize = 8192;
const DIRECTORY_MODE: u32 = 0o770;

/// Performs the filesystem action a [`Classification`] calls for.
pub struct Materializer<'a> {
    platform: &'a dyn MetadataAdapter,
    dry_run: bool,
}

impl<'a> Materializer<'a> {
    #[must_use]
    pub const fn new(platform: &'a dyn MetadataAdapter, dry_run: bool) -> Self {
        Self { platform, dry_run }
    }

    /// Materialize `source` at `target` per `classification`. `prior` is
    /// the prior-snapshot counterpart, required only for `Unchanged`.
    /// `on_tick` is invoked every [`TICK_INTERVAL_BLOCKS`] blocks during a
    /// copy, and must be non-blocking.
    pub fn materialize(
        &self,
        classification: Classification,
        source: &Path,
        prior: Option<&Path>,
        target: &Path,
        bytes_written: &mut u64,
        mut on_tick: impl FnMut(),
    ) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }

        match classification {
            Classification::Directory => self.materialize_directory(target),
            Classification::Unchanged => {
                let prior = prior.ok_or_else(|| {
                    PdumpfsError::materialization(
                        target,
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "unchanged classification requires a prior-snapshot path",
                        ),
                    )
                })?;
                self.platform
                    .force_link(prior, target)
                    .map_err(|source| PdumpfsError::materialization(target, source))
            }
            Classification::Updated | Classification::NewFile => {
                self.copy_and_restore(source, target, bytes_written, &mut on_tick)
            }
            Classification::Symlink => self.materialize_symlink(source, target),
            Classification::Unsupported => Ok(()),
        }?;

        if !matches!(classification, Classification::Unsupported) {
            self.restore_owner(source, target);
        }
        Ok(())
    }

    fn materialize_directory(&self, target: &Path) -> Result<()> {
        std::fs::create_dir_all(target)
            .map_err(|source| PdumpfsError::materialization(target, source))?;
        self.platform
            .chmod(target, DIRECTORY_MODE)
            .map_err(|source| PdumpfsError::materialization(target, source))
    }

    fn materialize_symlink(&self, source: &Path, target: &Path) -> Result<()> {
        let link_target = self
            .platform
            .read_link(source)
            .map_err(|source_err| PdumpfsError::materialization(source, source_err))?;
        self.platform
            .force_symlink(&link_target, target)
            .map_err(|source| PdumpfsError::materialization(target, source))
    }

    fn copy_and_restore(
        &self,
        source: &Path,
        target: &Path,
        bytes_written: &mut u64,
        on_tick: &mut impl FnMut(),
    ) -> Result<()> {
        let meta = self
            .platform
            .stat(source)
            .map_err(|source_err| PdumpfsError::materialization(source, source_err))?;
        let block_size = if meta.block_size == 0 {
            FALLBACK_BLOCK_SIZE
        } else {
            usize::try_from(meta.block_size).unwrap_or(FALLBACK_BLOCK_SIZE)
        };

        let mut reader = std::fs::File::open(source)
            .map_err(|source_err| PdumpfsError::materialization(source, source_err))?;
        let mut writer = std::fs::File::create(target)
            .map_err(|source_err| PdumpfsError::materialization(target, source_err))?;

        let mut buf = vec![0u8; block_size];
        let mut blocks = 0u32;
        loop {
            let read = reader
                .read(&mut buf)
                .map_err(|source_err| PdumpfsError::materialization(source, source_err))?;
            if read == 0 {
                break;
            }
            writer
                .write_all(&buf[..read])
                .map_err(|source_err| PdumpfsError::materialization(target, source_err))?;
            *bytes_written += read as u64;
            blocks += 1;
            if blocks % TICK_INTERVAL_BLOCKS == 0 {
                on_tick();
            }
        }
        drop(writer);

        self.platform
            .utime(target, meta.atime, meta.mtime)
            .map_err(|source_err| PdumpfsError::materialization(target, source_err))?;
        self.platform
            .chmod(target, meta.mode)
            .map_err(|source_err| PdumpfsError::materialization(target, source_err))
    }

    fn restore_owner(&self, source: &Path, target: &Path) {
        if let Ok(meta) = self.platform.lstat(source) {
            let is_symlink = meta.kind == EntryKind::Symlink;
            let _ = self
                .platform
                .chown_if_root(target, meta.uid, meta.gid, is_symlink);
        }
    }
}
