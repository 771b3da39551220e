//! # namescout
//!
//! Parallel presence check: does an entry with this name exist anywhere
//! under these roots?
//!
//! namescout takes a list of names (usually the immediate children of one
//! directory, see [`Inventory`]) and, for each name, searches an ordered list
//! of roots for a folder or file with exactly that name. It reports where the
//! first match is, or that there is none. It does not compare contents.
//!
//! # Resolution rules
//!
//! - Roots are tried in the order given. The first root with a match wins
//!   and later roots are not searched for that name.
//! - Inside a root the walk is breadth-first, so a shallower match always
//!   wins over a deeper one (see [`FsLocator`]).
//! - Roots that do not exist are skipped. Unreadable subtrees are skipped
//!   without aborting the walk.
//! - A target whose task fails is reported as [`Resolution::Failed`], never
//!   silently merged into "not found".
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let root = dir.path();
//! fs::create_dir_all(root.join("photos").join("2021")).unwrap();
//! fs::write(root.join("photos").join("notes.txt"), "").unwrap();
//!
//! let results = namescout::search()
//!     .root(root)
//!     .folders(["2021", "2022"])
//!     .files(["notes.txt"])
//!     .threads(2)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(results.folders.found.len(), 1);
//! assert_eq!(results.folders.not_found, vec!["2022".to_string()]);
//! assert_eq!(results.files.found[0].1, root.join("photos").join("notes.txt"));
//! println!("Resolved {} names in {:.3}s",
//!     results.overall().total,
//!     results.stats.duration.as_secs_f64()
//! );
//! ```
//!
//! # Following a run
//!
//! Pass [`ProgressCounters`] to [`SearchBuilder::progress`] and poll them from
//! another thread, or attach a channel with [`SearchBuilder::events`] to get
//! a [`SearchEvent`] per probed root and per resolved target. A shared flag
//! given to [`SearchBuilder::cancel_flag`] stops the run early; the returned
//! [`ResultSet`] is then partial, with `cancelled` set.

#![forbid(unsafe_code)]

pub mod config;
pub mod report;

mod builder;
mod engine;
mod error;
mod inventory;
mod progress;
mod results;
mod target;
mod traits;
mod tree;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{SearchBuilder, DEFAULT_THREADS};
pub use error::{ConfigError, ScoutError, TraversalError};
pub use inventory::Inventory;
pub use progress::{ProgressCounters, ProgressReporter, ProgressSnapshot, SearchEvent};
pub use results::{percent, KindResults, KindStats, ResultSet, ScanStats};
pub use target::{Resolution, SearchOutcome, SearchTarget, TargetKind};
pub use traits::{Locator, Probe};
pub use tree::FsLocator;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("invoice.txt"), "").unwrap();
///
/// let results = namescout::search()
///     .root(dir.path())
///     .files(["invoice.txt", "report.txt"])
///     .run()
///     .unwrap();
///
/// assert_eq!(results.files.found.len(), 1);
/// assert_eq!(results.files.not_found, vec!["report.txt".to_string()]);
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
