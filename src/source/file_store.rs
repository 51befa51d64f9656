//! Filesystem-backed document store
//!
//! Locations are relative paths under a root directory. Absolute paths and
//! `..` components are rejected before touching the disk.

use std::path::{Component, Path, PathBuf};

use crate::error::SourceError;

pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a location to a path inside the root
    fn path_for_location(&self, location: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(location.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if location.is_empty() || escapes {
            return Err(SourceError::InvalidLocation(location.to_string()));
        }
        Ok(self.base_path.join(relative))
    }

    /// Read a document; a missing file is `None`, not an error.
    pub async fn read(&self, location: &str) -> Result<Option<String>, SourceError> {
        let path = self.path_for_location(location)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
