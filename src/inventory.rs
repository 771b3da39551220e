use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::error::ScoutError;
use crate::target::{SearchTarget, TargetKind};

/// Names of the immediate children of a directory, split by kind.
///
/// Both lists keep the order the OS listed the entries in. Entries that are
/// neither a directory nor a regular file (after following symlinks) are
/// left out, as are dangling symlinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub root: PathBuf,
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

impl Inventory {
    /// Read the immediate children of `dir`.
    ///
    /// # Errors
    ///
    /// [`ScoutError::NotFound`] if `dir` does not exist,
    /// [`ScoutError::NotADirectory`] if it is not a directory, and
    /// [`ScoutError::Io`] if the listing itself fails.
    pub fn collect(dir: impl AsRef<Path>) -> Result<Self, ScoutError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ScoutError::NotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(ScoutError::NotADirectory(dir.to_path_buf()));
        }

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .max_depth(Some(1))
            .build();

        let mut inventory = Self { root: dir.to_path_buf(), ..Self::default() };

        for res in walker {
            let entry = res.map_err(|e| map_ignore_error(e, dir))?;
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                inventory.folders.push(name);
            } else if path.is_file() {
                inventory.files.push(name);
            } else {
                debug!(path = %path.display(), "inventory: skipping special or dangling entry");
            }
        }

        Ok(inventory)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    pub fn folder_targets(&self) -> Vec<SearchTarget> {
        self.folders.iter().map(SearchTarget::folder).collect()
    }

    pub fn file_targets(&self) -> Vec<SearchTarget> {
        self.files.iter().map(SearchTarget::file).collect()
    }

    pub fn names(&self, kind: TargetKind) -> &[String] {
        match kind {
            TargetKind::Folder => &self.folders,
            TargetKind::File => &self.files,
        }
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to ScoutError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error, dir: &Path) -> ScoutError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(source) => ScoutError::Io { path, source },
            other => ScoutError::Io { path, source: io::Error::new(io::ErrorKind::Other, other.to_string()) },
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err, dir),
        ignore::Error::Io(source) => ScoutError::Io { path: dir.to_path_buf(), source },
        other => ScoutError::Io {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, other.to_string()),
        },
    }
}
