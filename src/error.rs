use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    // Input
    #[error("target directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    // Config
    #[error("invalid thread count: {0}")]
    InvalidThreadCount(usize),

    #[error("no search roots configured")]
    NoRoots,

    // Runtime
    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("locator failed under {}: {message}", root.display())]
    Locator { root: PathBuf, message: String },

    #[error("failed to write report {}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScoutError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::Io { path: p, .. }
            | Self::Locator { root: p, .. }
            | Self::Report { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Input and config errors end the run before any search starts.
    /// Everything else is scoped to one target or one artifact.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Locator { .. } | Self::Report { .. })
    }
}

/// A subtree the tree search could not read and therefore skipped.
#[derive(Error, Debug)]
#[error("skipped {}: {cause}", path.display())]
pub struct TraversalError {
    pub path: PathBuf,
    #[source]
    pub cause: io::Error,
}

impl TraversalError {
    pub fn new(path: impl Into<PathBuf>, cause: io::Error) -> Self {
        Self { path: path.into(), cause }
    }

    /// Convert a `walkdir` failure. `fallback` is the directory being listed,
    /// used when walkdir cannot attribute the error to a path.
    pub(crate) fn from_walkdir(err: walkdir::Error, fallback: &Path) -> Self {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback.to_path_buf());
        let cause = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "directory walk error"));
        Self { path, cause }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.cause.kind() == io::ErrorKind::PermissionDenied
    }
}

/// Errors raised while turning command-line arguments into a run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("worker count must be between 1 and {max}, got {got}")]
    Workers { got: usize, max: usize },

    #[error("scope 'custom' needs at least one --root")]
    EmptyCustomScope,

    #[error("cannot determine current directory")]
    CurrentDir(#[source] io::Error),
}
