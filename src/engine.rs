use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Sender};
use tracing::{debug, error, info};

use crate::error::TraversalError;
use crate::progress::{ProgressCounters, SearchEvent};
use crate::results::{KindResults, ResultSet, ScanStats};
use crate::target::{Resolution, SearchOutcome, SearchTarget, TargetKind};
use crate::traits::Locator;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Everything a run needs, assembled by `SearchBuilder::run()`.
/// Read-only for the duration of the run.
pub(crate) struct EngineOptions {
    pub roots:            Vec<PathBuf>,
    pub threads:          usize,
    pub locator:          Arc<dyn Locator>,
    pub counters:         ProgressCounters,
    pub cancel:           Arc<AtomicBool>,
    pub events:           Option<Sender<SearchEvent>>,
    pub collect_errors:   bool,
    pub concurrent_kinds: bool,
}

impl EngineOptions {
    fn emit(&self, event: SearchEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening any more.
            let _ = tx.send(event);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Resolve every folder and file target against `opts.roots`.
///
/// Blocks until all tasks have finished or the run was cancelled. Folder
/// targets run first, then file targets, unless `concurrent_kinds` is set,
/// in which case both pools run side by side with `threads` workers each.
pub(crate) fn run(folders: &[SearchTarget], files: &[SearchTarget], opts: &EngineOptions) -> ResultSet {
    opts.counters.add_total(TargetKind::Folder, folders.len());
    opts.counters.add_total(TargetKind::File, files.len());

    info!(
        folders = folders.len(),
        files = files.len(),
        roots = opts.roots.len(),
        threads = opts.threads,
        "search started"
    );
    let start = Instant::now();

    let (folder_run, file_run) = if opts.concurrent_kinds {
        thread::scope(|s| {
            let folder_handle = s.spawn(|| run_kind(TargetKind::Folder, folders, opts));
            let file_run = run_kind(TargetKind::File, files, opts);
            let folder_run = folder_handle
                .join()
                .unwrap_or_else(|_| KindRun::aborted(folders.len()));
            (folder_run, file_run)
        })
    } else {
        let folder_run = run_kind(TargetKind::Folder, folders, opts);
        let file_run = run_kind(TargetKind::File, files, opts);
        (folder_run, file_run)
    };

    let duration = start.elapsed();

    let mut set = ResultSet::default();
    for (kind, kind_run) in [(TargetKind::Folder, folder_run), (TargetKind::File, file_run)] {
        *set.kind_mut(kind) = kind_run.results;
        set.skipped.extend(kind_run.skipped);
    }
    set.cancelled = set.folders.resolved() < set.folders.submitted || set.files.resolved() < set.files.submitted;
    set.stats = ScanStats::compute(set.folders.resolved() + set.files.resolved(), duration);

    info!(
        found = set.overall().found,
        not_found = set.overall().not_found,
        failed = set.overall().failed,
        cancelled = set.cancelled,
        elapsed_ms = duration.as_millis() as u64,
        "search finished"
    );
    set
}

// ---------------------------------------------------------------------------
// One kind: dispatcher + fixed worker pool
// ---------------------------------------------------------------------------

struct KindRun {
    results: KindResults,
    skipped: Vec<TraversalError>,
}

impl KindRun {
    fn aborted(submitted: usize) -> Self {
        Self { results: KindResults::new(submitted), skipped: Vec::new() }
    }
}

/// What a finished task hands back to the collector.
struct Finished {
    outcome: SearchOutcome,
    skipped: Vec<TraversalError>,
}

fn run_kind(kind: TargetKind, targets: &[SearchTarget], opts: &EngineOptions) -> KindRun {
    let mut run = KindRun::aborted(targets.len());
    if targets.is_empty() {
        return run;
    }

    let workers = opts.threads.clamp(1, targets.len());
    let (job_tx, job_rx) = bounded::<&SearchTarget>(workers);
    let (done_tx, done_rx) = unbounded::<Finished>();

    thread::scope(|s| {
        // Dispatcher: stops handing out work as soon as cancellation is seen.
        s.spawn(move || {
            for target in targets {
                if opts.cancelled() || job_tx.send(target).is_err() {
                    break;
                }
            }
        });

        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            s.spawn(move || {
                for target in job_rx.iter() {
                    if opts.cancelled() {
                        break;
                    }

                    let finished = match panic::catch_unwind(AssertUnwindSafe(|| resolve(worker, target, opts))) {
                        Ok(Some(f)) => f,
                        // Abandoned mid-traversal because the run was cancelled:
                        // leave the target unresolved.
                        Ok(None) => break,
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            error!(worker, item = %target, "search task panicked: {message}");
                            Finished {
                                outcome: SearchOutcome {
                                    target:     target.clone(),
                                    resolution: Resolution::Failed(format!("task panicked: {message}")),
                                },
                                skipped: Vec::new(),
                            }
                        }
                    };

                    opts.counters.complete(kind);
                    opts.emit(SearchEvent::Resolved { worker, outcome: finished.outcome.clone() });
                    if done_tx.send(finished).is_err() {
                        break;
                    }
                }
            });
        }

        drop(job_rx);
        drop(done_tx);

        // Collector: outcomes land in completion order.
        for finished in done_rx.iter() {
            run.results.record(finished.outcome);
            run.skipped.extend(finished.skipped);
        }
    });

    run
}

// ---------------------------------------------------------------------------
// One target
// ---------------------------------------------------------------------------

/// Try each root in order; the first root with a match wins.
/// Returns `None` if the run was cancelled before the target was resolved.
fn resolve(worker: usize, target: &SearchTarget, opts: &EngineOptions) -> Option<Finished> {
    let mut skipped = Vec::new();

    for root in &opts.roots {
        if opts.cancelled() {
            return None;
        }
        if !root.exists() {
            debug!(root = %root.display(), "search root does not exist, skipping");
            continue;
        }

        opts.emit(SearchEvent::Probing { worker, target: target.clone(), root: root.clone() });

        let probe = match opts.locator.probe(root, target, &opts.cancel) {
            Ok(p) => p,
            Err(e) => {
                error!(worker, item = %target, "search task failed: {e}");
                return Some(Finished {
                    outcome: SearchOutcome { target: target.clone(), resolution: Resolution::Failed(e.to_string()) },
                    skipped,
                });
            }
        };

        if opts.collect_errors {
            skipped.extend(probe.skipped);
        }
        if probe.cancelled {
            if opts.cancelled() {
                return None;
            }
            // A locator gave up on its own; only the run's flag may abandon a target.
            let message = format!("search under {} stopped without a cancellation request", root.display());
            error!(worker, item = %target, "{message}");
            return Some(Finished {
                outcome: SearchOutcome { target: target.clone(), resolution: Resolution::Failed(message) },
                skipped,
            });
        }
        if let Some(path) = probe.matched {
            return Some(Finished {
                outcome: SearchOutcome { target: target.clone(), resolution: Resolution::Found(path) },
                skipped,
            });
        }
    }

    Some(Finished {
        outcome: SearchOutcome { target: target.clone(), resolution: Resolution::NotFound },
        skipped,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
