//! Content-addressed on-disk cache for travel matrices.
//!
//! Entries are write-once JSON files named by a SHA-256 digest of the
//! ordered coordinate sequence, so identical location sets hit the same
//! file regardless of which solve produced it. Writers go through a
//! temp-file + atomic rename; readers skip and remove corrupted or expired
//! entries. TTL expiry is advisory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::matrix::{Matrix, TravelMatrix};
use crate::models::GeoPoint;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    distance_matrix: Vec<Vec<f64>>,
    duration_matrix: Vec<Vec<f64>>,
    cached_at: DateTime<Utc>,
    ttl_hours: u64,
}

/// Disk cache keyed by the coordinate sequence.
#[derive(Debug, Clone)]
pub struct MatrixCache {
    directory: PathBuf,
    ttl_hours: u64,
    enabled: bool,
}

impl MatrixCache {
    pub fn new(directory: impl Into<PathBuf>, ttl_hours: u64, enabled: bool) -> Self {
        Self {
            directory: directory.into(),
            ttl_hours,
            enabled,
        }
    }

    /// A cache that never hits and never writes.
    pub fn disabled() -> Self {
        Self::new(".cache", 0, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Order-dependent content key over the coordinate sequence.
    pub fn key_for(points: &[GeoPoint]) -> String {
        let joined: Vec<String> = points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lat(), p.lng()))
            .collect();
        let mut hasher = Sha256::new();
        hasher.update(joined.join(";").as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("matrix_{key}.json"))
    }

    /// Loads a cached matrix pair, or `None` on miss, expiry, or a
    /// corrupted entry (which is removed).
    pub fn load(&self, key: &str) -> Option<TravelMatrix> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(key);
        let text = fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&text) {
            Ok(e) => e,
            Err(err) => {
                warn!(path = %path.display(), %err, "removing corrupted matrix cache entry");
                remove_quietly(&path);
                return None;
            }
        };

        let age = Utc::now().signed_duration_since(entry.cached_at);
        if age.num_hours() >= entry.ttl_hours as i64 {
            debug!(path = %path.display(), "matrix cache entry expired");
            remove_quietly(&path);
            return None;
        }

        let distance = Matrix::from_rows(&entry.distance_matrix)?;
        let duration = Matrix::from_rows(&entry.duration_matrix)?;
        TravelMatrix::new(distance, duration)
    }

    /// Persists a matrix pair. Failures are logged, never fatal: the run
    /// simply continues without caching.
    pub fn store(&self, key: &str, matrices: &TravelMatrix) {
        if !self.enabled {
            return;
        }
        if let Err(err) = self.try_store(key, matrices) {
            warn!(%err, "matrix cache write failed, continuing uncached");
        }
    }

    fn try_store(&self, key: &str, matrices: &TravelMatrix) -> std::io::Result<()> {
        fs::create_dir_all(&self.directory)?;
        let entry = CacheEntry {
            distance_matrix: matrices.distance().rows(),
            duration_matrix: matrices.duration().rows(),
            cached_at: Utc::now(),
            ttl_hours: self.ttl_hours,
        };
        let text = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // Write-once under a content key: stage then atomically rename so
        // concurrent solves never observe a partial entry.
        let final_path = self.path_for(key);
        let tmp_path = self
            .directory
            .join(format!("matrix_{key}.{}.tmp", std::process::id()));
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

fn remove_quietly(path: &Path) {
    let _ = fs::remove_file(path);
}
