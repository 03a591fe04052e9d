//! On-disk cache of the last successful location.

use std::path::{Path, PathBuf};

use chrono::Utc;
use pawalert_core::types::Timestamp;
use pawalert_core::LocationResult;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// A cached result and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub result: LocationResult,
    pub saved_at: Timestamp,
}

/// JSON file holding at most one [`CachedLocation`].
pub struct LocationCache {
    path: PathBuf,
}

impl LocationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached location.
    ///
    /// A missing file is `None`. An unreadable or corrupt file is also
    /// `None`, with a warning, so a bad cache never blocks lookup.
    pub async fn load(&self) -> Option<CachedLocation> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read location cache");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(cached) => Some(cached),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt location cache");
                None
            }
        }
    }

    /// Persist `result` if it carries coordinates.
    ///
    /// Returns `Ok(false)` without touching the file for failed lookups.
    pub async fn store(&self, result: &LocationResult) -> Result<bool, CacheError> {
        if result.coordinates().is_none() {
            return Ok(false);
        }

        let cached = CachedLocation {
            result: result.clone(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&cached)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;

        tracing::debug!(path = %self.path.display(), source = ?result.source, "Location cached");
        Ok(true)
    }
}
