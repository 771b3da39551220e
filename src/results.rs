use std::path::PathBuf;
use std::time::Duration;

use crate::error::TraversalError;
use crate::target::{Resolution, SearchOutcome, TargetKind};

/// Outcomes of one kind, bucketed. Each bucket is in completion order,
/// which varies between runs.
#[derive(Debug, Default)]
pub struct KindResults {
    /// Number of targets submitted for this kind.
    pub submitted: usize,

    pub found: Vec<(String, PathBuf)>,

    pub not_found: Vec<String>,

    /// Targets whose task failed, with the failure message.
    pub failed: Vec<(String, String)>,
}

impl KindResults {
    pub(crate) fn new(submitted: usize) -> Self {
        Self { submitted, ..Self::default() }
    }

    pub(crate) fn record(&mut self, outcome: SearchOutcome) {
        let name = outcome.target.name;
        match outcome.resolution {
            Resolution::Found(path) => self.found.push((name, path)),
            Resolution::NotFound => self.not_found.push(name),
            Resolution::Failed(msg) => self.failed.push((name, msg)),
        }
    }

    pub fn resolved(&self) -> usize {
        self.found.len() + self.not_found.len() + self.failed.len()
    }

    pub fn stats(&self) -> KindStats {
        KindStats {
            total:     self.submitted,
            found:     self.found.len(),
            not_found: self.not_found.len(),
            failed:    self.failed.len(),
            pending:   self.submitted.saturating_sub(self.resolved()),
        }
    }
}

/// The output of a search run.
///
/// Only complete once the run returns; while it runs, observe
/// [`ProgressCounters`](crate::ProgressCounters) instead.
#[derive(Debug, Default)]
pub struct ResultSet {
    pub folders: KindResults,

    pub files: KindResults,

    /// Subtrees skipped during traversal. Only populated if
    /// `.collect_errors(true)` was set on the builder.
    pub skipped: Vec<TraversalError>,

    /// The run was interrupted; some targets may be unresolved.
    pub cancelled: bool,

    pub stats: ScanStats,
}

impl ResultSet {
    pub fn kind(&self, kind: TargetKind) -> &KindResults {
        match kind {
            TargetKind::Folder => &self.folders,
            TargetKind::File => &self.files,
        }
    }

    pub(crate) fn kind_mut(&mut self, kind: TargetKind) -> &mut KindResults {
        match kind {
            TargetKind::Folder => &mut self.folders,
            TargetKind::File => &mut self.files,
        }
    }

    /// Folder and file stats added together.
    pub fn overall(&self) -> KindStats {
        self.folders.stats() + self.files.stats()
    }

    pub fn has_failures(&self) -> bool {
        !self.folders.failed.is_empty() || !self.files.failed.is_empty()
    }
}

/// Counts for one kind (or both, via [`ResultSet::overall`]).
///
/// For a run that was not cancelled,
/// `found + not_found + failed == total` and `pending == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    pub total:     usize,
    pub found:     usize,
    pub not_found: usize,
    pub failed:    usize,
    pub pending:   usize,
}

impl KindStats {
    pub fn found_pct(&self) -> f64 {
        percent(self.found, self.total)
    }

    pub fn not_found_pct(&self) -> f64 {
        percent(self.not_found, self.total)
    }

    pub fn failed_pct(&self) -> f64 {
        percent(self.failed, self.total)
    }
}

impl std::ops::Add for KindStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total:     self.total + rhs.total,
            found:     self.found + rhs.found,
            not_found: self.not_found + rhs.not_found,
            failed:    self.failed + rhs.failed,
            pending:   self.pending + rhs.pending,
        }
    }
}

/// `part / total` as a percentage. An empty total is 0%, not NaN.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Timing for a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    /// Wall-clock time from search start to completion.
    pub duration: Duration,

    /// Resolved targets per second, 0 on zero-duration runs.
    pub targets_per_sec: f64,
}

impl ScanStats {
    pub(crate) fn compute(resolved: usize, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        let tps = if secs > 0.0 { resolved as f64 / secs } else { 0.0 };
        Self { duration, targets_per_sec: tps }
    }
}
