//! Metadata adapter: the platform-specific capability set the engine needs
//! (`stat`/`lstat`, file-type discrimination, hard-link creation, symlink
//! read/create, `utime`, `chmod`, `chown`/`lchown`, filesystem-type query).
//!
//! Modeled as a single trait with two implementations selected at startup
//! — a Unix implementation backed by `nix`/`filetime`, and a stub for any
//! other target — so the engine itself depends only on the capability set,
//! never on `cfg(unix)` directly.

#![allow(missing_docs)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::FileTime;

use crate::core::errors::{PdumpfsError, Result};

/// Coarse classification of a filesystem entry, as seen by `lstat`/`stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// Metadata captured from `stat`/`lstat`, sufficient for the classifier's
/// `same_file?` check and the materializer's metadata restoration.
#[derive(Debug, Clone, Copy)]
pub struct Metadata {
    pub kind: EntryKind,
    pub size: u64,
    pub mtime: FileTime,
    pub atime: FileTime,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub block_size: u64,
}

/// Platform capability set used by the snapshot engine.
pub trait MetadataAdapter: Send + Sync {
    /// `lstat` — never follows symlinks.
    fn lstat(&self, path: &Path) -> io::Result<Metadata>;
    /// `stat` — follows symlinks.
    fn stat(&self, path: &Path) -> io::Result<Metadata>;
    /// Read a symlink's target text.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
    /// Unlink any existing object at `dest`, then hard-link it to the same
    /// inode as `src`.
    fn force_link(&self, src: &Path, dest: &Path) -> io::Result<()>;
    /// Unlink any existing object at `dest`, then create a symlink at
    /// `dest` with link text `target`. Returns `Ok(())` even when the
    /// platform cannot create symlinks, doing nothing in that case — the
    /// counterpart in the snapshot is then absent, per spec.
    fn force_symlink(&self, target: &Path, dest: &Path) -> io::Result<()>;
    /// Set access and modification time on `path`.
    fn utime(&self, path: &Path, atime: FileTime, mtime: FileTime) -> io::Result<()>;
    /// Set mode bits on `path`.
    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()>;
    /// No-op unless the process effective UID is 0. `is_symlink` selects
    /// `lchown` semantics (does not follow the link) vs. plain `chown`.
    fn chown_if_root(&self, path: &Path, uid: u32, gid: u32, is_symlink: bool) -> io::Result<()>;
    /// True iff the filesystem backing `path` supports POSIX hard links.
    fn supports_hard_links(&self, path: &Path) -> io::Result<bool>;
}

/// Detect the platform-appropriate metadata adapter.
pub fn detect() -> Result<Arc<dyn MetadataAdapter>> {
    #[cfg(unix)]
    {
        Ok(Arc::new(UnixMetadataAdapter))
    }
    #[cfg(not(unix))]
    {
        Err(PdumpfsError::preflight(
            "only POSIX-like (hard-link-capable) platforms are currently supported",
        ))
    }
}

#[cfg(unix)]
#[derive(Debug, Default)]
pub struct UnixMetadataAdapter;

#[cfg(unix)]
impl UnixMetadataAdapter {
    fn metadata_to_entry(meta: &std::fs::Metadata) -> Metadata {
        use std::os::unix::fs::MetadataExt;
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.file_type().is_symlink() {
            EntryKind::Symlink
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Metadata {
            kind,
            size: meta.len(),
            mtime: FileTime::from_last_modification_time(meta),
            atime: FileTime::from_last_access_time(meta),
            mode: meta.mode(),
            uid: meta.uid(),
            gid: meta.gid(),
            block_size: meta.blksize(),
        }
    }
}

#[cfg(unix)]
impl MetadataAdapter for UnixMetadataAdapter {
    fn lstat(&self, path: &Path) -> io::Result<Metadata> {
        std::fs::symlink_metadata(path).map(|meta| Self::metadata_to_entry(&meta))
    }

    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        std::fs::metadata(path).map(|meta| Self::metadata_to_entry(&meta))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn force_link(&self, src: &Path, dest: &Path) -> io::Result<()> {
        remove_existing(dest)?;
        std::fs::hard_link(src, dest)
    }

    fn force_symlink(&self, target: &Path, dest: &Path) -> io::Result<()> {
        remove_existing(dest)?;
        std::os::unix::fs::symlink(target, dest)
    }

    fn utime(&self, path: &Path, atime: FileTime, mtime: FileTime) -> io::Result<()> {
        filetime::set_file_times(path, atime, mtime)
    }

    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    fn chown_if_root(&self, path: &Path, uid: u32, gid: u32, is_symlink: bool) -> io::Result<()> {
        if !is_effective_root() {
            return Ok(());
        }
        let owner = nix::unistd::Uid::from_raw(uid);
        let group = nix::unistd::Gid::from_raw(gid);
        let flag = if is_symlink {
            nix::unistd::FchownatFlags::NoFollowSymlink
        } else {
            nix::unistd::FchownatFlags::FollowSymlink
        };
        nix::unistd::fchownat(None, path, Some(owner), Some(group), flag)
            .map_err(|errno| io::Error::from_raw_os_error(errno as i32))
    }

    fn supports_hard_links(&self, path: &Path) -> io::Result<bool> {
        // POSIX filesystems support hard links unconditionally; the engine
        // only needs to veto the one platform family that cannot (handled
        // by never compiling `UnixMetadataAdapter` there).
        let _ = nix::sys::statvfs::statvfs(path)
            .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
        Ok(true)
    }
}

#[cfg(unix)]
fn is_effective_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(unix)]
fn remove_existing(path: &Path) -> io::Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
