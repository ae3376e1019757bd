//! Durable storage of the [`Snapshot`] as a single JSON file.
//!
//! Loading never fails: a missing file is created from the default, and a
//! file that cannot be read or decoded is left untouched on disk while the
//! default is used in memory. The next successful save replaces it.
//!
//! Saves go to a sibling temporary file that is then renamed over the
//! target, so a reader sees either the old or the new document.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::snapshot::Snapshot;

/// Suffix appended to the state file name for in-progress writes.
const TEMP_SUFFIX: &str = ".tmp";

/// Errors that can occur while persisting the snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the state file failed.
    #[error("state file I/O error at {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The snapshot could not be encoded, or the file could not be decoded.
    #[error("state file {path} is not a valid snapshot: {source}")]
    Corrupt {
        /// The file being decoded.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Where a loaded snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Decoded from the existing state file.
    Existing,
    /// The file was missing and has been created from the default.
    Created,
    /// The file could not be read or decoded. It was left untouched and
    /// must not be overwritten until the state actually changes.
    Fallback,
}

/// JSON file store for the rotation snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, falling back to `default`.
    ///
    /// Only a missing file is replaced by `default` on disk.
    pub async fn load(&self, default: Snapshot) -> (Snapshot, LoadOrigin) {
        match self.read().await {
            Ok(Some(snapshot)) => {
                info!(
                    path = %self.path.display(),
                    participants = snapshot.participants.len(),
                    categories = snapshot.message_queues.len(),
                    "state loaded"
                );
                (snapshot, LoadOrigin::Existing)
            }
            Ok(None) => {
                warn!(path = %self.path.display(), "state file not found, creating it from defaults");
                if let Err(e) = self.save(&default).await {
                    warn!(error = %e, "failed to write default state");
                }
                (default, LoadOrigin::Created)
            }
            Err(e) => {
                warn!(error = %e, "state file unusable, continuing with defaults and leaving it untouched");
                (default, LoadOrigin::Fallback)
            }
        }
    }

    /// Read and decode the state file. `Ok(None)` means it does not exist.
    pub async fn read(&self) -> Result<Option<Snapshot>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Atomically replace the state file with `snapshot`.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(snapshot).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body)
            .await
            .map_err(|source| self.io_error(source))?;
        if let Err(source) = tokio::fs::rename(&temp, &self.path).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(self.io_error(source));
        }

        debug!(path = %self.path.display(), bytes = body.len(), "state saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(TEMP_SUFFIX);
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
