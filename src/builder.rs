use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::engine::{EngineOptions, run};
use crate::error::ScoutError;
use crate::progress::{ProgressCounters, SearchEvent};
use crate::results::ResultSet;
use crate::target::{SearchTarget, TargetKind};
use crate::traits::Locator;
use crate::tree::FsLocator;

/// Worker count used when `.threads()` is not called.
pub const DEFAULT_THREADS: usize = 4;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a presence search.
///
/// Created via [`namescout::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let results = namescout::search()
///     .roots(["/srv/backup", "/mnt/archive"])
///     .targets(inventory.folder_targets())
///     .targets(inventory.file_targets())
///     .threads(8)
///     .run()?;
/// ```
pub struct SearchBuilder {
    roots:            Vec<PathBuf>,
    targets:          Vec<SearchTarget>,
    threads:          usize,
    locator:          Option<Arc<dyn Locator>>,
    max_depth:        Option<usize>,
    native_order:     bool,
    counters:         ProgressCounters,
    cancel:           Arc<AtomicBool>,
    events:           Option<Sender<SearchEvent>>,
    collect_errors:   bool,
    concurrent_kinds: bool,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            roots:            Vec::new(),
            targets:          Vec::new(),
            threads:          DEFAULT_THREADS,
            locator:          None,
            max_depth:        None,
            native_order:     false,
            counters:         ProgressCounters::new(),
            cancel:           Arc::new(AtomicBool::new(false)),
            events:           None,
            collect_errors:   false,
            concurrent_kinds: false,
        }
    }
}

impl SearchBuilder {
    // ── Roots ─────────────────────────────────────────────────────────────

    /// Append one search root. Order is priority: earlier roots win.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Append several search roots, keeping their order.
    pub fn roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    // ── Targets ───────────────────────────────────────────────────────────

    /// Add one target.
    pub fn target(mut self, target: SearchTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Add several targets. Duplicates are kept and searched independently.
    pub fn targets(mut self, targets: impl IntoIterator<Item = SearchTarget>) -> Self {
        self.targets.extend(targets);
        self
    }

    /// Shorthand for adding folder targets by name.
    pub fn folders<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets(names.into_iter().map(SearchTarget::folder))
    }

    /// Shorthand for adding file targets by name.
    pub fn files<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets(names.into_iter().map(SearchTarget::file))
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of worker threads per target kind. Defaults to
    /// [`DEFAULT_THREADS`]; the pool never grows past the number of targets.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Maximum depth below each root. Unlimited by default.
    /// Ignored when a custom locator is set.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// Keep the OS directory listing order instead of sorting by name.
    ///
    /// Faster on very large directories, but which path is reported when a
    /// name occurs twice at the same depth may then change between runs.
    /// Ignored when a custom locator is set.
    pub fn native_order(mut self, yes: bool) -> Self {
        self.native_order = yes;
        self
    }

    /// Replace the filesystem walk with a custom [`Locator`].
    pub fn with_locator(mut self, l: impl Locator + 'static) -> Self {
        self.locator = Some(Arc::new(l));
        self
    }

    /// Use these counters so another thread can poll progress.
    pub fn progress(mut self, counters: ProgressCounters) -> Self {
        self.counters = counters;
        self
    }

    /// Share a cancellation flag. Setting it stops dispatch; the run
    /// returns a partial [`ResultSet`] with `cancelled` set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Stream [`SearchEvent`]s into `tx` while the search runs.
    pub fn events(mut self, tx: Sender<SearchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Collect skipped subtrees into [`ResultSet::skipped`].
    ///
    /// Disabled by default; a system-wide search can skip thousands of
    /// protected directories per target. They are logged at debug level
    /// either way.
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    /// Search folders and files at the same time instead of one after
    /// the other. Each kind gets its own pool of `threads` workers.
    pub fn concurrent_kinds(mut self, yes: bool) -> Self {
        self.concurrent_kinds = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search and return results.
    ///
    /// Blocks until every target is resolved or the cancel flag is set.
    ///
    /// # Errors
    ///
    /// Returns `Err` for configuration errors only (no roots, zero threads).
    /// Per-target failures are recorded in the [`ResultSet`].
    pub fn run(self) -> Result<ResultSet, ScoutError> {
        if self.roots.is_empty() {
            return Err(ScoutError::NoRoots);
        }
        if self.threads == 0 {
            return Err(ScoutError::InvalidThreadCount(self.threads));
        }

        let locator: Arc<dyn Locator> = match self.locator {
            Some(l) => l,
            None    => Arc::new(
                FsLocator::new()
                    .max_depth(self.max_depth)
                    .native_order(self.native_order),
            ),
        };

        let (folders, files): (Vec<SearchTarget>, Vec<SearchTarget>) = self
            .targets
            .into_iter()
            .partition(|t| t.kind == TargetKind::Folder);

        let opts = EngineOptions {
            roots:            self.roots,
            threads:          self.threads,
            locator,
            counters:         self.counters,
            cancel:           self.cancel,
            events:           self.events,
            collect_errors:   self.collect_errors,
            concurrent_kinds: self.concurrent_kinds,
        };

        Ok(run(&folders, &files, &opts))
    }
}
