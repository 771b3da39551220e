use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use crate::error::{ScoutError, TraversalError};
use crate::target::SearchTarget;

/// What one root contributed for one target.
#[derive(Debug, Default)]
pub struct Probe {
    /// First match in traversal order, if any.
    pub matched: Option<PathBuf>,

    /// Subtrees that were skipped because they could not be read.
    pub skipped: Vec<TraversalError>,

    /// Traversal stopped early because cancellation was requested.
    /// `matched` is `None` whenever this is set. If the run's flag is not
    /// actually set, the engine records the target as failed.
    pub cancelled: bool,
}

impl Probe {
    pub fn found(path: impl Into<PathBuf>) -> Self {
        Self { matched: Some(path.into()), ..Self::default() }
    }

    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Searches one root for one target.
///
/// The engine calls `probe` once per existing root, in configured root order,
/// until a probe reports a match. Implementations must contain per-subtree
/// failures themselves and report them through [`Probe::skipped`]; an `Err`
/// means the whole target could not be resolved and is recorded as a
/// task failure, distinct from "not found".
///
/// # Thread Safety
///
/// `Send + Sync` are required: one locator is shared by every worker.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use std::sync::atomic::AtomicBool;
/// use namescout::{Locator, Probe, ScoutError, SearchTarget};
///
/// /// Only ever "finds" targets called `README.md`, directly under the root.
/// struct ReadmeOnly;
///
/// impl Locator for ReadmeOnly {
///     fn probe(&self, root: &Path, target: &SearchTarget, _cancel: &AtomicBool) -> Result<Probe, ScoutError> {
///         if target.name == "README.md" {
///             Ok(Probe::found(root.join("README.md")))
///         } else {
///             Ok(Probe::not_found())
///         }
///     }
/// }
/// ```
pub trait Locator: Send + Sync {
    /// Look for `target` under `root`.
    ///
    /// `cancel` is the run's cancellation flag; long traversals should
    /// check it between directories and return with `cancelled` set.
    fn probe(&self, root: &Path, target: &SearchTarget, cancel: &AtomicBool) -> Result<Probe, ScoutError>;
}
