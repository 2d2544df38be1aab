//! File storage behind the `/files/` routes
//!
//! A thin seam over a directory on disk. Handlers only ever see file names;
//! turning a name into a path (and refusing names that would leave the root)
//! happens here.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// Name is empty or would resolve outside the root
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    /// Nothing readable exists under that name
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other filesystem failure
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Storage used by the file handlers.
pub trait FileStore: Send + Sync {
    /// Reads the whole file stored under `name`.
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError>;

    /// Creates or truncates the file under `name` and writes `contents`.
    fn write(&self, name: &str, contents: &[u8]) -> Result<(), FileError>;
}

/// Files stored in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `name` onto the root.
    ///
    /// Only plain path segments are accepted: `..`, `.`, absolute paths and
    /// drive prefixes are all rejected.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        let candidate = Path::new(name);

        let plain = !name.is_empty()
            && candidate
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !plain {
            return Err(FileError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(candidate))
    }
}

impl FileStore for DiskStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(name)?;

        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if is_absent(&e) => Err(FileError::NotFound(path)),
            Err(source) => Err(FileError::Io { path, source }),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(name)?;

        fs::write(&path, contents).map_err(|source| FileError::Io { path, source })
    }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::NotFound | ErrorKind::IsADirectory | ErrorKind::NotADirectory
    )
}
