//! Integration coverage for the concrete backup scenarios and universal
//! invariants the snapshot engine must satisfy.

use std::os::unix::fs::MetadataExt;
use std::sync::Arc;

use filetime::FileTime;
use pdumpfs::prelude::*;

fn walker() -> Walker {
    Walker::new(
        detect_platform().unwrap(),
        Arc::new(NullMatcher),
        Arc::new(NullReporter),
    )
}

fn seed_day(dest: &std::path::Path, year: &str, month: &str, day: &str, base: &str) -> std::path::PathBuf {
    let root = dest.join(year).join(month).join(day).join(base);
    std::fs::create_dir_all(&root).unwrap();
    root
}

#[test]
fn type_change_replaces_regular_file_with_symlink_without_disturbing_prior_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    std::fs::create_dir(&source).unwrap();
    std::fs::write(source.join("b.txt"), b"unrelated").unwrap();

    let dest = tmp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();
    let prior = seed_day(&dest, "2026", "01", "01", "src");
    std::fs::write(prior.join("a.txt"), b"original content").unwrap();
    std::fs::write(prior.join("b.txt"), b"unrelated").unwrap();

    // a.txt is replaced by a symlink pointing at b.txt in the source tree.
    std::os::unix::fs::symlink("b.txt", source.join("a.txt")).unwrap();

    let options = WalkerOptions::default();
    let summary = walker().run(&source, &dest, &options).unwrap();

    let today_a = summary.today.join("a.txt");
    let meta = std::fs::symlink_metadata(&today_a).unwrap();
    assert!(meta.file_type().is_symlink());
    assert_eq!(std::fs::read_link(&today_a).unwrap(), std::path::Path::new("b.txt"));

    // The prior day's a.txt is untouched: still a regular file.
    let prior_meta = std::fs::symlink_metadata(prior.join("a.txt")).unwrap();
    assert!(prior_meta.is_file());
}

#[test]
fn unrelated_files_keep_sharing_inodes_when_a_sibling_is_modified() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    std::fs::create_dir(&source).unwrap();

    let stamp = FileTime::from_unix_time(1_700_000_000, 0);
    std::fs::write(source.join("a.txt"), b"changed").unwrap();
    std::fs::write(source.join("b.txt"), b"stable").unwrap();
    filetime::set_file_mtime(source.join("b.txt"), stamp).unwrap();

    let dest = tmp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();
    let prior = seed_day(&dest, "2026", "01", "01", "src");
    std::fs::write(prior.join("a.txt"), b"original").unwrap();
    std::fs::write(prior.join("b.txt"), b"stable").unwrap();
    filetime::set_file_mtime(prior.join("b.txt"), stamp).unwrap();

    let summary = walker()
        .run(&source, &dest, &WalkerOptions::default())
        .unwrap();

    let prior_a_ino = std::fs::metadata(prior.join("a.txt")).unwrap().ino();
    let today_a_ino = std::fs::metadata(summary.today.join("a.txt")).unwrap().ino();
    assert_ne!(prior_a_ino, today_a_ino);

    let prior_b_ino = std::fs::metadata(prior.join("b.txt")).unwrap().ino();
    let today_b_ino = std::fs::metadata(summary.today.join("b.txt")).unwrap().ino();
    assert_eq!(prior_b_ino, today_b_ino);
}

#[test]
fn directory_metadata_is_restored_after_its_subtree_is_populated() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    std::fs::create_dir_all(source.join("sub")).unwrap();
    std::fs::write(source.join("sub/f.txt"), b"x").unwrap();

    let source_meta = std::fs::metadata(source.join("sub")).unwrap();
    let source_mtime = FileTime::from_last_modification_time(&source_meta);

    let dest = tmp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();

    let summary = walker()
        .run(&source, &dest, &WalkerOptions::default())
        .unwrap();

    let today_sub_meta = std::fs::metadata(summary.today.join("sub")).unwrap();
    let today_mtime = FileTime::from_last_modification_time(&today_sub_meta);
    assert_eq!(today_mtime, source_mtime);
}

#[test]
fn latest_pointer_resolves_to_an_extant_snapshot_after_a_successful_run() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    std::fs::create_dir(&source).unwrap();
    std::fs::write(source.join("a.txt"), b"hello").unwrap();

    let dest = tmp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();

    let summary = walker()
        .run(&source, &dest, &WalkerOptions::default())
        .unwrap();

    let latest = dest.join("latest");
    assert!(latest.is_symlink());
    let resolved = dest.join(std::fs::read_link(&latest).unwrap());
    assert!(resolved.is_dir());
    assert_eq!(std::fs::canonicalize(&resolved).unwrap(), std::fs::canonicalize(&summary.today).unwrap());
}

#[test]
fn dry_run_never_touches_latest_or_writes_any_file() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    std::fs::create_dir(&source).unwrap();
    std::fs::write(source.join("a.txt"), b"hello").unwrap();

    let dest = tmp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();

    let options = WalkerOptions {
        dry_run: true,
        ..Default::default()
    };
    walker().run(&source, &dest, &options).unwrap();

    assert!(!dest.join("latest").exists());
    let mut entries = std::fs::read_dir(&dest).unwrap();
    assert!(entries.next().is_none());
}

#[test]
fn additional_exclusion_only_shrinks_the_materialized_set() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    std::fs::create_dir(&source).unwrap();
    std::fs::write(source.join("keep.txt"), b"keep").unwrap();
    std::fs::write(source.join("drop.log"), b"drop").unwrap();

    let dest_unfiltered = tmp.path().join("dest_unfiltered");
    std::fs::create_dir(&dest_unfiltered).unwrap();
    let summary_unfiltered = walker()
        .run(&source, &dest_unfiltered, &WalkerOptions::default())
        .unwrap();
    let unfiltered_entries: std::collections::HashSet<_> = std::fs::read_dir(&summary_unfiltered.today)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    let dest_filtered = tmp.path().join("dest_filtered");
    std::fs::create_dir(&dest_filtered).unwrap();
    let matcher = ConfiguredMatcher::new(&[], &["*.log".to_string()], None).unwrap();
    let filtered_walker = Walker::new(detect_platform().unwrap(), Arc::new(matcher), Arc::new(NullReporter));
    let summary_filtered = filtered_walker
        .run(&source, &dest_filtered, &WalkerOptions::default())
        .unwrap();
    let filtered_entries: std::collections::HashSet<_> = std::fs::read_dir(&summary_filtered.today)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    assert!(filtered_entries.is_subset(&unfiltered_entries));
    assert!(!filtered_entries.contains(std::ffi::OsStr::new("drop.log")));
    assert!(filtered_entries.contains(std::ffi::OsStr::new("keep.txt")));
}
