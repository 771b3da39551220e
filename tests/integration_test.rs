use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use namescout::{
    search, Inventory, Locator, Probe, ProgressCounters, Resolution, ScoutError, SearchEvent, SearchTarget,
    TargetKind,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create the scenario used by most tests.
///
/// Structure:
/// ```
/// tmp/
///   target/
///     A/
///     B/
///     x.txt
///   r1/
///     unrelated/
///       other.txt
///   r2/
///     deep/
///       A/
///     x.txt
/// ```
fn setup_scenario() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let target = root.join("target");
    fs::create_dir_all(target.join("A")).unwrap();
    fs::create_dir_all(target.join("B")).unwrap();
    fs::write(target.join("x.txt"), "payload").unwrap();

    fs::create_dir_all(root.join("r1").join("unrelated")).unwrap();
    fs::write(root.join("r1").join("unrelated").join("other.txt"), "").unwrap();

    fs::create_dir_all(root.join("r2").join("deep").join("A")).unwrap();
    fs::write(root.join("r2").join("x.txt"), "").unwrap();

    dir
}

fn names(found: &[(String, PathBuf)]) -> Vec<&str> {
    found.iter().map(|(n, _)| n.as_str()).collect()
}

/// Locator that fails for one name and panics for another.
struct Faulty;

impl Locator for Faulty {
    fn probe(&self, root: &Path, target: &SearchTarget, _cancel: &AtomicBool) -> Result<Probe, ScoutError> {
        match target.name.as_str() {
            "explode" => panic!("locator bug"),
            "refuse" => Err(ScoutError::Locator { root: root.to_path_buf(), message: "backend offline".into() }),
            "here" => Ok(Probe::found(root.join("here"))),
            _ => Ok(Probe::not_found()),
        }
    }
}

/// Locator that requests cancellation when it sees the name `stop`.
struct StopOn(Arc<AtomicBool>);

impl Locator for StopOn {
    fn probe(&self, _root: &Path, target: &SearchTarget, _cancel: &AtomicBool) -> Result<Probe, ScoutError> {
        if target.name == "stop" {
            self.0.store(true, Ordering::SeqCst);
            return Ok(Probe { cancelled: true, ..Probe::default() });
        }
        Ok(Probe::not_found())
    }
}

/// Locator that gives up on `flaky` without the run being cancelled.
struct GivesUp;

impl Locator for GivesUp {
    fn probe(&self, _root: &Path, target: &SearchTarget, _cancel: &AtomicBool) -> Result<Probe, ScoutError> {
        if target.name == "flaky" {
            return Ok(Probe { cancelled: true, ..Probe::default() });
        }
        Ok(Probe::not_found())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn example_scenario() {
    let dir = setup_scenario();
    let root = dir.path();
    let inventory = Inventory::collect(root.join("target")).unwrap();

    let results = search()
        .roots([root.join("r1"), root.join("r2")])
        .targets(inventory.folder_targets())
        .targets(inventory.file_targets())
        .threads(4)
        .run()
        .unwrap();

    assert_eq!(results.folders.found, vec![("A".to_string(), root.join("r2").join("deep").join("A"))]);
    assert_eq!(results.folders.not_found, vec!["B".to_string()]);
    assert_eq!(results.files.found, vec![("x.txt".to_string(), root.join("r2").join("x.txt"))]);
    assert!(results.files.not_found.is_empty());
    assert!(!results.cancelled);
    assert!(!results.has_failures());
}

#[test]
fn earlier_root_wins() {
    let dir = tempfile::tempdir().unwrap();
    let (r1, r2) = (dir.path().join("r1"), dir.path().join("r2"));
    fs::create_dir_all(r1.join("nested").join("more")).unwrap();
    fs::create_dir_all(&r2).unwrap();
    // The match under r2 is shallower, but r1 comes first.
    fs::write(r1.join("nested").join("more").join("X"), "").unwrap();
    fs::write(r2.join("X"), "").unwrap();

    for _ in 0..5 {
        let results = search().roots([&r1, &r2]).files(["X"]).threads(3).run().unwrap();
        assert_eq!(results.files.found[0].1, r1.join("nested").join("more").join("X"));
    }
}

#[test]
fn shallow_match_is_preferred_over_deeper_sibling_match() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("aaa").join("Y")).unwrap();
    fs::create_dir_all(root.join("bbb").join("Y")).unwrap();
    fs::create_dir_all(root.join("level").join("Y")).unwrap();
    fs::create_dir(root.join("Y")).unwrap();

    for native in [false, true] {
        let results = search().root(root).folders(["Y"]).native_order(native).run().unwrap();
        assert_eq!(results.folders.found, vec![("Y".to_string(), root.join("Y"))]);
    }
}

#[test]
fn missing_roots_are_skipped() {
    let dir = setup_scenario();
    let root = dir.path();

    let results = search()
        .roots([root.join("does-not-exist"), root.join("r2"), root.join("also-missing")])
        .files(["x.txt", "nope.txt"])
        .run()
        .unwrap();

    assert_eq!(names(&results.files.found), vec!["x.txt"]);
    assert_eq!(results.files.not_found, vec!["nope.txt".to_string()]);
    assert!(!results.has_failures());
}

#[cfg(unix)]
#[test]
fn unreadable_subtree_does_not_stop_the_walk() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let locked = root.join("a_locked");
    fs::create_dir_all(locked.join("inside")).unwrap();
    fs::create_dir_all(root.join("b_open")).unwrap();
    fs::write(root.join("b_open").join("wanted.txt"), "").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users can read it anyway; only assert on the skip when it applies.
    let really_locked = fs::read_dir(&locked).is_err();

    let results = search()
        .root(root)
        .files(["wanted.txt", "absent.txt"])
        .collect_errors(true)
        .threads(2)
        .run();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let results = results.unwrap();

    assert_eq!(results.files.found, vec![("wanted.txt".to_string(), root.join("b_open").join("wanted.txt"))]);
    assert_eq!(results.files.not_found, vec!["absent.txt".to_string()]);
    if really_locked {
        assert!(!results.skipped.is_empty());
        assert!(results.skipped.iter().all(|e| e.path == locked && e.is_permission_denied()));
    }
}

#[test]
fn concurrent_runs_resolve_every_target_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for i in 0..20 {
        let sub = root.join(format!("d{}", i % 4));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("present_{i}.dat")), "").unwrap();
    }

    let mut expected: Vec<String> = (0..20).map(|i| format!("present_{i}.dat")).collect();
    expected.extend((0..20).map(|i| format!("absent_{i}.dat")));

    for threads in [2, 8, 32] {
        for concurrent in [false, true] {
            let results = search()
                .root(root)
                .files(expected.clone())
                .folders(["d0", "d3", "missing"])
                .threads(threads)
                .concurrent_kinds(concurrent)
                .run()
                .unwrap();

            let files = results.files.stats();
            assert_eq!(files.found + files.not_found + files.failed, expected.len());
            assert_eq!((files.found, files.not_found, files.pending), (20, 20, 0));

            let mut seen: Vec<&str> = names(&results.files.found);
            seen.extend(results.files.not_found.iter().map(String::as_str));
            let unique: HashSet<&str> = seen.iter().copied().collect();
            assert_eq!(unique.len(), expected.len(), "no duplicates or gaps");

            let folders = results.folders.stats();
            assert_eq!((folders.found, folders.not_found), (2, 1));
        }
    }
}

#[test]
fn duplicate_names_are_searched_independently() {
    let dir = setup_scenario();
    let results = search()
        .root(dir.path().join("r2"))
        .files(["x.txt", "x.txt", "x.txt"])
        .threads(3)
        .run()
        .unwrap();

    assert_eq!(results.files.found.len(), 3);
}

#[test]
fn empty_target_set_reports_zero_percent() {
    let dir = tempfile::tempdir().unwrap();
    let results = search().root(dir.path()).run().unwrap();

    let overall = results.overall();
    assert_eq!(overall.total, 0);
    assert_eq!(overall.found_pct(), 0.0);
    assert_eq!(overall.not_found_pct(), 0.0);
    assert!(!results.cancelled);
}

#[test]
fn task_failures_are_surfaced_not_merged() {
    let dir = tempfile::tempdir().unwrap();
    let results = search()
        .root(dir.path())
        .with_locator(Faulty)
        .files(["explode", "refuse", "here", "nowhere"])
        .threads(2)
        .run()
        .unwrap();

    let stats = results.files.stats();
    assert_eq!((stats.found, stats.not_found, stats.failed, stats.total), (1, 1, 2, 4));

    let failed: HashSet<&str> = results.files.failed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(failed, HashSet::from(["explode", "refuse"]));
    let refuse = results.files.failed.iter().find(|(n, _)| n == "refuse").unwrap();
    assert!(refuse.1.contains("backend offline"));
    assert!(results.has_failures());
}

#[test]
fn cancellation_returns_a_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = Arc::new(AtomicBool::new(false));
    let counters = ProgressCounters::new();

    let results = search()
        .root(dir.path())
        .with_locator(StopOn(Arc::clone(&cancel)))
        .cancel_flag(Arc::clone(&cancel))
        .progress(counters.clone())
        .files(["first", "stop", "third", "fourth"])
        .threads(1)
        .run()
        .unwrap();

    assert!(results.cancelled);
    assert_eq!(results.files.not_found, vec!["first".to_string()]);
    let stats = results.files.stats();
    assert_eq!((stats.total, stats.pending), (4, 3));
    assert_eq!(counters.completed(TargetKind::File), 1);
}

#[test]
fn locator_stopping_on_its_own_is_a_failure_not_a_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let results = search()
        .root(dir.path())
        .with_locator(GivesUp)
        .files(["first", "flaky", "third", "fourth"])
        .threads(1)
        .run()
        .unwrap();

    assert!(!results.cancelled);
    let stats = results.files.stats();
    assert_eq!((stats.not_found, stats.failed, stats.pending), (3, 1, 0));
    assert_eq!(results.files.failed[0].0, "flaky");
}

#[test]
fn cancelled_before_start_dispatches_nothing() {
    let dir = setup_scenario();
    let results = search()
        .root(dir.path())
        .files(["x.txt"])
        .folders(["A"])
        .cancel_flag(Arc::new(AtomicBool::new(true)))
        .run()
        .unwrap();

    assert!(results.cancelled);
    assert_eq!(results.overall().pending, 2);
}

#[test]
fn progress_and_events_track_every_target() {
    let dir = setup_scenario();
    let root = dir.path();
    let counters = ProgressCounters::new();
    let (tx, rx) = crossbeam_channel::unbounded();

    let results = search()
        .roots([root.join("r1"), root.join("r2")])
        .folders(["A", "B"])
        .files(["x.txt"])
        .progress(counters.clone())
        .events(tx)
        .threads(2)
        .run()
        .unwrap();

    let snap = counters.snapshot();
    assert_eq!((snap.folders_done, snap.folders_total), (2, 2));
    assert_eq!((snap.files_done, snap.files_total), (1, 1));

    let events: Vec<SearchEvent> = rx.try_iter().collect();
    let resolved = events.iter().filter(|e| matches!(e, SearchEvent::Resolved { .. })).count();
    assert_eq!(resolved, 3);

    // x.txt is found in r2, so it was probed in r1 first.
    let x_roots: Vec<&PathBuf> = events
        .iter()
        .filter_map(|e| match e {
            SearchEvent::Probing { target, root, .. } if target.name == "x.txt" => Some(root),
            _ => None,
        })
        .collect();
    assert_eq!(x_roots, vec![&root.join("r1"), &root.join("r2")]);
    assert_eq!(results.overall().found, 2);
}

#[test]
fn reused_counters_stay_bounded_across_runs() {
    let dir = setup_scenario();
    let counters = ProgressCounters::new();

    for _ in 0..2 {
        search()
            .root(dir.path())
            .files(["x.txt", "missing.txt"])
            .progress(counters.clone())
            .run()
            .unwrap();
        assert!(counters.completed(TargetKind::File) <= counters.total(TargetKind::File));
    }

    assert_eq!(counters.completed(TargetKind::File), 4);
    assert_eq!(counters.total(TargetKind::File), 4);
    assert_eq!(counters.total(TargetKind::Folder), 0);
}

#[test]
fn resolution_reports_matched_path() {
    let dir = setup_scenario();
    let (tx, rx) = crossbeam_channel::unbounded();
    search().root(dir.path().join("r2")).folders(["A"]).events(tx).run().unwrap();

    let outcome = rx
        .try_iter()
        .find_map(|e| match e {
            SearchEvent::Resolved { outcome, .. } => Some(outcome),
            _ => None,
        })
        .unwrap();
    assert!(outcome.found());
    assert_eq!(outcome.matched_path(), Some(dir.path().join("r2").join("deep").join("A").as_path()));
    assert_eq!(outcome.resolution, Resolution::Found(dir.path().join("r2").join("deep").join("A")));
}

#[test]
fn max_depth_limits_each_root() {
    let dir = setup_scenario();
    let results = search().root(dir.path().join("r2")).folders(["A"]).max_depth(1).run().unwrap();
    assert_eq!(results.folders.not_found, vec!["A".to_string()]);

    let results = search().root(dir.path().join("r2")).folders(["A"]).max_depth(2).run().unwrap();
    assert_eq!(results.folders.found.len(), 1);
}

#[test]
fn config_errors_are_rejected_before_searching() {
    assert!(matches!(search().files(["x"]).run(), Err(ScoutError::NoRoots)));
    assert!(matches!(
        search().root("/").files(["x"]).threads(0).run(),
        Err(ScoutError::InvalidThreadCount(0))
    ));
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[test]
fn inventory_splits_folders_and_files() {
    let dir = setup_scenario();
    let inventory = Inventory::collect(dir.path().join("target")).unwrap();

    let folders: HashSet<&str> = inventory.folders.iter().map(String::as_str).collect();
    assert_eq!(folders, HashSet::from(["A", "B"]));
    assert_eq!(inventory.files, vec!["x.txt".to_string()]);
    assert_eq!(inventory.len(), 3);
    assert!(inventory.folder_targets().iter().all(|t| t.kind == TargetKind::Folder));
    assert_eq!(inventory.file_targets(), vec![SearchTarget::file("x.txt")]);
}

#[test]
fn inventory_only_lists_immediate_children() {
    let dir = setup_scenario();
    let inventory = Inventory::collect(dir.path().join("r2")).unwrap();
    assert_eq!(inventory.folders, vec!["deep".to_string()]);
    assert_eq!(inventory.files, vec!["x.txt".to_string()]);
}

#[test]
fn inventory_of_empty_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = Inventory::collect(dir.path()).unwrap();
    assert!(inventory.is_empty());
}

#[test]
fn inventory_input_errors() {
    let dir = setup_scenario();

    let missing = dir.path().join("missing");
    assert!(matches!(Inventory::collect(&missing), Err(ScoutError::NotFound(p)) if p == missing));

    let file = dir.path().join("target").join("x.txt");
    let err = Inventory::collect(&file).unwrap_err();
    assert!(matches!(err, ScoutError::NotADirectory(_)));
    assert!(!err.is_recoverable());
    assert_eq!(err.path(), Some(&file));
}
