//! End-to-end cache behavior across analysis runs.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use pretty_assertions::assert_eq;
use rayon::prelude::*;
use siftlint_cache::{CacheDir, Snapshot};
use siftlint_integration_tests::{Finding, analyze};
use siftlint_options::{OptionMap, OptionValue};
use tempfile::tempdir;

fn select(codes: &[&str]) -> OptionMap {
    let mut options = OptionMap::new();
    options.insert("select".to_string(), OptionValue::set(codes.iter().copied()));
    options
}

/// One full check of a single file, the way a worker drives the cache:
/// hit serves the stored findings, miss runs the analysis and persists.
fn check_file(
    cache: &CacheDir,
    options: &OptionMap,
    target: &Path,
    analyses: &AtomicUsize,
) -> Vec<Finding> {
    let mut snapshot = Snapshot::derive(cache, options, target);
    if snapshot.exists().unwrap() {
        return snapshot.results().unwrap();
    }

    analyses.fetch_add(1, Ordering::SeqCst);
    let findings = analyze(&fs::read_to_string(target).unwrap());
    snapshot.save(findings.clone()).unwrap();
    findings
}

#[test]
fn second_run_hits_without_recomputation() {
    let temp = tempdir().unwrap();
    let cache = CacheDir::new(temp.path().join("cache"), Duration::from_secs(3600));
    cache.prepare().unwrap();

    let target = temp.path().join("a.py");
    fs::write(&target, "def f():\n\treturn 1\n").unwrap();
    let options = select(&["E1"]);
    let analyses = AtomicUsize::new(0);

    let first = check_file(&cache, &options, &target, &analyses);
    assert_eq!(analyses.load(Ordering::SeqCst), 1);

    let second = check_file(&cache, &options, &target, &analyses);
    assert_eq!(analyses.load(Ordering::SeqCst), 1);
    assert_eq!(second, first);
}

#[test]
fn changed_options_invalidate_regardless_of_content() {
    let temp = tempdir().unwrap();
    let cache = CacheDir::new(temp.path().join("cache"), Duration::from_secs(3600));
    cache.prepare().unwrap();

    let target = temp.path().join("a.py");
    fs::write(&target, "def f():\n\treturn 1\n").unwrap();
    let analyses = AtomicUsize::new(0);

    check_file(&cache, &select(&["E1"]), &target, &analyses);
    check_file(&cache, &select(&["E1", "E2"]), &target, &analyses);

    assert_eq!(analyses.load(Ordering::SeqCst), 2);
}

#[test]
fn changed_file_content_invalidates() {
    let temp = tempdir().unwrap();
    let cache = CacheDir::new(temp.path().join("cache"), Duration::from_secs(3600));
    cache.prepare().unwrap();

    let target = temp.path().join("a.py");
    let options = select(&["E1"]);
    let analyses = AtomicUsize::new(0);

    fs::write(&target, "x = 1\n").unwrap();
    let before = check_file(&cache, &options, &target, &analyses);

    fs::write(&target, format!("x = {:>90}\n", "'long'")).unwrap();
    let after = check_file(&cache, &options, &target, &analyses);

    assert_eq!(analyses.load(Ordering::SeqCst), 2);
    assert!(before.is_empty());
    assert_eq!(after[0].code, "E501");
}

#[test]
fn parallel_workers_fill_and_hit_independently() {
    let temp = tempdir().unwrap();
    let cache = CacheDir::new(temp.path().join("cache"), Duration::from_secs(3600));
    cache.prepare().unwrap();

    let targets: Vec<_> = (0..8)
        .map(|index| {
            let target = temp.path().join(format!("file_{index}.py"));
            fs::write(&target, format!("v{index} =\t{index}\n")).unwrap();
            target
        })
        .collect();
    let options = select(&["E1", "W1"]);
    let analyses = AtomicUsize::new(0);

    // First pass: every worker misses its own file and fills the cache.
    targets.par_iter().for_each(|target| {
        let findings = check_file(&cache, &options, target, &analyses);
        assert_eq!(findings, analyze(&fs::read_to_string(target).unwrap()));
    });
    assert_eq!(analyses.load(Ordering::SeqCst), targets.len());

    // Second pass: all hits, nothing recomputed.
    targets.par_iter().for_each(|target| {
        let findings = check_file(&cache, &options, target, &analyses);
        assert_eq!(findings, analyze(&fs::read_to_string(target).unwrap()));
    });
    assert_eq!(analyses.load(Ordering::SeqCst), targets.len());
}

#[test]
fn startup_sweep_evicts_only_cold_entries() {
    let temp = tempdir().unwrap();
    let threshold = Duration::from_secs(3600);
    let cache = CacheDir::new(temp.path().join("cache"), threshold);
    cache.prepare().unwrap();

    let options = select(&["E1"]);
    let cold_target = temp.path().join("cold.py");
    let warm_target = temp.path().join("warm.py");
    fs::write(&cold_target, "a = 1\n").unwrap();
    fs::write(&warm_target, "b = 2\n").unwrap();

    let analyses = AtomicUsize::new(0);
    check_file(&cache, &options, &cold_target, &analyses);
    check_file(&cache, &options, &warm_target, &analyses);

    let cold_entry = Snapshot::<Finding>::derive(&cache, &options, &cold_target)
        .cache_path()
        .to_path_buf();
    let warm_entry = Snapshot::<Finding>::derive(&cache, &options, &warm_target)
        .cache_path()
        .to_path_buf();
    let stale = FileTime::from_system_time(SystemTime::now() - threshold - Duration::from_secs(60));
    filetime::set_file_atime(&cold_entry, stale).unwrap();

    // Next process startup.
    cache.prepare().unwrap();

    assert!(!cold_entry.exists());
    assert!(warm_entry.exists());
}

#[test]
fn corrupted_entry_surfaces_then_recovers_by_overwrite() {
    let temp = tempdir().unwrap();
    let cache = CacheDir::new(temp.path().join("cache"), Duration::from_secs(3600));
    cache.prepare().unwrap();

    let target = temp.path().join("a.py");
    fs::write(&target, "x = 1\n").unwrap();
    let options = select(&["E1"]);

    let mut writer = Snapshot::derive(&cache, &options, &target);
    writer.save(vec![Finding::new("E101", "mixed indentation", 1, 1)]).unwrap();
    fs::write(writer.cache_path(), "definitely not json").unwrap();

    // The damaged entry is a distinct failure, not a silent miss.
    let mut snapshot = Snapshot::<Finding>::derive(&cache, &options, &target);
    let err = snapshot.exists().unwrap_err();
    assert!(err.is_corrupted());

    // Caller policy: recompute and overwrite, after which the cache heals.
    let mut rewriter = Snapshot::derive(&cache, &options, &target);
    rewriter.save(analyze(&fs::read_to_string(&target).unwrap())).unwrap();
    let mut healed = Snapshot::<Finding>::derive(&cache, &options, &target);
    assert!(healed.exists().unwrap());
}
