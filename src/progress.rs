//! Live progress for a running search.
//!
//! Two ways to follow a run:
//! - [`ProgressCounters`]: cheap atomic counters, safe to poll from any
//!   thread at any cadence. Values only grow and never exceed the target
//!   count of their kind. A handle reused across runs accumulates both.
//! - [`SearchEvent`]: an optional channel the workers push into, for
//!   callers that want per-target detail.
//!
//! [`ProgressReporter`] renders the counters as terminal progress bars.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::target::{SearchOutcome, SearchTarget, TargetKind};

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct KindCounter {
    total:     AtomicUsize,
    completed: AtomicUsize,
}

/// Completed-target counters, one pair per kind. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounters {
    folders: Arc<KindCounter>,
    files:   Arc<KindCounter>,
}

/// A point-in-time read of [`ProgressCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub folders_done:  usize,
    pub folders_total: usize,
    pub files_done:    usize,
    pub files_total:   usize,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: TargetKind) -> &KindCounter {
        match kind {
            TargetKind::Folder => &self.folders,
            TargetKind::File => &self.files,
        }
    }

    /// Announce how many more targets of `kind` a run will submit.
    /// Adds to the existing total so `completed <= total` holds across runs.
    pub(crate) fn add_total(&self, kind: TargetKind, total: usize) {
        self.counter(kind).total.fetch_add(total, Ordering::Relaxed);
    }

    /// Called exactly once per finished task, whatever its outcome.
    pub(crate) fn complete(&self, kind: TargetKind) {
        self.counter(kind).completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self, kind: TargetKind) -> usize {
        self.counter(kind).completed.load(Ordering::Relaxed)
    }

    pub fn total(&self, kind: TargetKind) -> usize {
        self.counter(kind).total.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            folders_done:  self.completed(TargetKind::Folder),
            folders_total: self.total(TargetKind::Folder),
            files_done:    self.completed(TargetKind::File),
            files_total:   self.total(TargetKind::File),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Per-target activity pushed by workers when an event channel is attached.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// Worker `worker` started searching `root` for `target`.
    Probing {
        worker: usize,
        target: SearchTarget,
        root:   PathBuf,
    },

    /// Worker `worker` finished a target.
    Resolved {
        worker:  usize,
        outcome: SearchOutcome,
    },
}

// ---------------------------------------------------------------------------
// Terminal reporter
// ---------------------------------------------------------------------------

/// Progress bars for folder and file searches, refreshed by polling
/// [`ProgressCounters`] from a background thread.
pub struct ProgressReporter {
    bars:   MultiProgress,
    stop:   Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Start polling `counters` every 100ms.
    pub fn start(counters: ProgressCounters) -> Self {
        let bars = MultiProgress::new();
        let folders = bars.add(kind_bar(TargetKind::Folder));
        let files = bars.add(kind_bar(TargetKind::File));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                loop {
                    let done = stop.load(Ordering::SeqCst);
                    let snap = counters.snapshot();
                    folders.set_length(snap.folders_total as u64);
                    folders.set_position(snap.folders_done as u64);
                    files.set_length(snap.files_total as u64);
                    files.set_position(snap.files_done as u64);
                    if done {
                        folders.finish();
                        files.finish();
                        break;
                    }
                    thread::sleep(Duration::from_millis(100));
                }
            })
        };

        Self { bars, stop, handle: Some(handle) }
    }

    /// Print a line above the bars without tearing them.
    pub fn println(&self, line: impl AsRef<str>) {
        let _ = self.bars.println(line);
    }

    /// Do a final refresh and stop polling.
    pub fn finish(mut self) {
        self.stop_polling();
    }

    fn stop_polling(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

fn kind_bar(kind: TargetKind) -> ProgressBar {
    let (prefix, color) = match kind {
        TargetKind::Folder => ("folders", "cyan"),
        TargetKind::File => ("files  ", "yellow"),
    };
    let template = format!(
        "{{prefix:.bold}} [{{bar:40.{color}/blue}}] {{percent:>3}}% ({{pos}}/{{len}}) {{elapsed_precise}}"
    );
    let style = ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░ ");
    let bar = ProgressBar::new(0).with_style(style);
    bar.set_prefix(prefix);
    bar
}
