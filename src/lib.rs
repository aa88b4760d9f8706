#![forbid(unsafe_code)]

//! pdumpfs — daily snapshot backup tool that hard-links unchanged files
//! into prior snapshots, inspired by Plan 9's dumpfs.
//!
//! The engine walks a source tree, locates the most recent prior snapshot,
//! and for every entry either hard-links (unchanged regular file),
//! recreates (symlink) or copies (new/updated regular file) it into
//! today's snapshot directory, restoring metadata as it goes.

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod engine;
pub mod prelude;
