use std::fmt;
use std::fs::FileType;
use std::path::{Path, PathBuf};

/// Which kind of filesystem entry a target must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A directory, or a symlink resolving to one.
    Folder,

    /// Anything that is not a directory.
    File,
}

impl TargetKind {
    /// Whether an entry of type `ft` at `path` satisfies this kind.
    ///
    /// Symlinks are classified by what they point at, without being followed
    /// during traversal. A dangling link counts as a file.
    pub(crate) fn accepts(self, ft: FileType, path: &Path) -> bool {
        let is_dir = ft.is_dir() || (ft.is_symlink() && path.is_dir());
        match self {
            Self::Folder => is_dir,
            Self::File => !is_dir,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One name to locate. Duplicates are searched independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTarget {
    pub name: String,
    pub kind: TargetKind,
}

impl SearchTarget {
    pub fn folder(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: TargetKind::Folder }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: TargetKind::File }
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// Terminal state of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First match in root order, then traversal order.
    Found(PathBuf),

    /// Every root was searched (or skipped) without a match.
    NotFound,

    /// The task failed; distinct from a clean negative.
    Failed(String),
}

/// The result of resolving a single target. Created once, never revised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub target: SearchTarget,
    pub resolution: Resolution,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        matches!(self.resolution, Resolution::Found(_))
    }

    pub fn matched_path(&self) -> Option<&Path> {
        match &self.resolution {
            Resolution::Found(p) => Some(p),
            _ => None,
        }
    }
}
