//! Filesystem tree search: one root, one name, first match wins.
//!
//! Directories are visited breadth-first. Each directory is listed in full
//! and its entries are checked against the target before any of its
//! subdirectories are queued, so a match at depth `n` is always returned
//! ahead of any match at depth `n + 1`, and nothing below the matching
//! level is read.
//!
//! Within a level the order is the directory listing order. Listings are
//! sorted by file name unless [`FsLocator::native_order`] is used, in which
//! case the order is whatever the OS returns and may differ between runs
//! and platforms.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ScoutError, TraversalError};
use crate::target::SearchTarget;
use crate::traits::{Locator, Probe};

/// The default [`Locator`]: a breadth-first walk of the real filesystem.
#[derive(Debug, Clone)]
pub struct FsLocator {
    max_depth: Option<usize>,
    sorted:    bool,
}

impl Default for FsLocator {
    fn default() -> Self {
        Self { max_depth: None, sorted: true }
    }
}

impl FsLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only consider entries at most `depth` levels below the root.
    /// `1` means the root's immediate children.
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Keep the OS directory listing order instead of sorting by name.
    pub fn native_order(mut self, yes: bool) -> Self {
        self.sorted = !yes;
        self
    }

    /// Search `root` for `target`. Never fails: unreadable subtrees are
    /// skipped and reported in [`Probe::skipped`].
    pub fn search(&self, root: &Path, target: &SearchTarget, cancel: &AtomicBool) -> Probe {
        let mut probe = Probe::default();
        let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
        queue.push_back((root.to_path_buf(), 0));

        while let Some((dir, depth)) = queue.pop_front() {
            if cancel.load(Ordering::Relaxed) {
                probe.cancelled = true;
                return probe;
            }
            if self.max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            let mut subdirs = Vec::new();
            for res in self.listing(&dir) {
                let entry = match res {
                    Ok(e) => e,
                    Err(e) => {
                        let err = TraversalError::from_walkdir(e, &dir);
                        debug!(target_name = %target.name, "{err}");
                        probe.skipped.push(err);
                        continue;
                    }
                };

                if entry.file_name() == target.name.as_str()
                    && target.kind.accepts(entry.file_type(), entry.path())
                {
                    probe.matched = Some(entry.into_path());
                    return probe;
                }

                // Symlinked directories are matched but never descended into.
                if entry.file_type().is_dir() {
                    subdirs.push(entry.into_path());
                }
            }

            queue.extend(subdirs.into_iter().map(|p| (p, depth + 1)));
        }

        probe
    }

    fn listing(&self, dir: &Path) -> walkdir::IntoIter {
        let walk = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);
        if self.sorted {
            walk.sort_by_file_name().into_iter()
        } else {
            walk.into_iter()
        }
    }
}

impl Locator for FsLocator {
    fn probe(&self, root: &Path, target: &SearchTarget, cancel: &AtomicBool) -> Result<Probe, ScoutError> {
        Ok(self.search(root, target, cancel))
    }
}
