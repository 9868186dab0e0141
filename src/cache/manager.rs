//! Cache manager for persisting shaped responses to disk
//!
//! Entries are plain JSON files. Freshness comes from the file's modification
//! time compared against the query's TTL, so there is no metadata to parse
//! and a cached body can be served back byte for byte.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use directories::ProjectDirs;
use serde::de::IgnoredAny;
use tracing::{debug, warn};

use crate::error::{ProxyError, Result};

/// How many times a write may recreate missing parent directories
pub const MAX_DIR_CREATE_ATTEMPTS: u32 = 3;

/// Filesystem operations used by the cache
///
/// Abstracted so that failing filesystems can be simulated in tests.
pub trait CacheFs: Send + Sync {
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl CacheFs for DiskFs {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

/// Whether an entry last modified at `modified` is still fresh at `now`
///
/// Entries stamped in the future count as fresh.
pub fn is_fresh(now: SystemTime, modified: SystemTime, ttl: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age < ttl,
        Err(_) => true,
    }
}

/// Sibling path an entry is staged at before being renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Manages reading and writing cached responses
///
/// The default cache directory is XDG-compliant (`~/.cache/tflproxy/` on
/// Linux). Stale entries are treated exactly like missing ones.
#[derive(Debug, Clone)]
pub struct CacheManager<F = DiskFs> {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    fs: F,
}

impl CacheManager<DiskFs> {
    /// The XDG cache directory for the proxy
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn default_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "tflproxy")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self::with_fs(cache_dir, DiskFs)
    }
}

impl<F: CacheFs> CacheManager<F> {
    /// Creates a new CacheManager over the given filesystem
    pub fn with_fs(cache_dir: PathBuf, fs: F) -> Self {
        Self { cache_dir, fs }
    }

    /// Root directory of all cache entries
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Reads a cache entry if it is still fresh
    ///
    /// # Arguments
    /// * `path` - Full path of the entry
    /// * `ttl` - How long the entry stays fresh after its last write
    ///
    /// # Returns
    /// * `Ok(Some(String))` - The cached body, unchanged
    /// * `Ok(None)` - The entry is missing, stale, empty or not valid JSON
    /// * `Err(ProxyError::CacheReadFailure)` - The entry exists but cannot be read
    pub fn read(&self, path: &Path, ttl: Duration) -> Result<Option<String>> {
        self.read_at(path, ttl, SystemTime::now())
    }

    /// Same as [`CacheManager::read`], evaluated at a fixed instant
    pub fn read_at(&self, path: &Path, ttl: Duration, now: SystemTime) -> Result<Option<String>> {
        let modified = match self.fs.modified(path) {
            Ok(modified) => modified,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(ProxyError::CacheReadFailure(e)),
        };

        if !is_fresh(now, modified, ttl) {
            debug!(path = %path.display(), "cache entry is stale");
            return Ok(None);
        }

        match self.fs.read_to_string(path) {
            Ok(content) if serde_json::from_str::<IgnoredAny>(&content).is_err() => {
                debug!(path = %path.display(), bytes = content.len(), "cache entry is unusable");
                Ok(None)
            }
            Ok(content) => {
                debug!(path = %path.display(), "cache hit");
                Ok(Some(content))
            }
            // Removed between the metadata call and the read
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProxyError::CacheReadFailure(e)),
        }
    }

    /// Writes a cache entry, creating missing directories as needed
    ///
    /// The body is staged in a sibling file and renamed over the entry, so
    /// readers see either the previous entry or the complete new one.
    /// Directory creation is retried at most `MAX_DIR_CREATE_ATTEMPTS` times.
    /// Creation errors are ignored since another process may be creating the
    /// same directory; only the final write error is reported.
    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        let staging = staging_path(path);
        self.write_staged(&staging, content)?;

        if let Err(e) = self.fs.rename(&staging, path) {
            warn!(path = %path.display(), error = %e, "could not replace cache entry");
            if let Err(e) = self.fs.remove_file(&staging) {
                debug!(path = %staging.display(), error = %e, "could not remove staged cache entry");
            }
            return Err(ProxyError::CachePersistFailure(e));
        }
        Ok(())
    }

    fn write_staged(&self, staging: &Path, content: &str) -> Result<()> {
        let mut attempts = 0;
        loop {
            match self.fs.write(staging, content) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound && attempts < MAX_DIR_CREATE_ATTEMPTS => {
                    attempts += 1;
                    if let Some(parent) = staging.parent() {
                        if let Err(e) = self.fs.create_dir_all(parent) {
                            debug!(dir = %parent.display(), attempt = attempts, error = %e, "could not create cache directory");
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %staging.display(), error = %e, "could not write cache entry");
                    return Err(ProxyError::CachePersistFailure(e));
                }
            }
        }
    }
}
