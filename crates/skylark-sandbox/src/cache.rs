use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::SandboxError;

/// TTL for sandbox result cache entries.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// File-backed result cache with a one-hour TTL.
///
/// Keys are opaque byte strings (typically a hash of tool name + input);
/// this cache only owns the on-disk representation, not the hashing.
#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
    enabled: bool,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.cache"))
    }

    /// Return cached bytes for `key` if present and younger than `CACHE_TTL`.
    ///
    /// Expired entries are removed lazily on the next `get`, matching the
    /// documented behavior (no background sweeper).
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SandboxError> {
        if !self.enabled {
            return Ok(None);
        }

        let path = self.entry_path(key);
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SandboxError::Cache(e)),
        };

        let modified = metadata.modified().map_err(SandboxError::Cache)?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age > CACHE_TTL {
            let _ = std::fs::remove_file(&path);
            return Ok(None);
        }

        std::fs::read(&path).map(Some).map_err(SandboxError::Cache)
    }

    /// Write `bytes` under `key`, atomically via a temp-file rename.
    ///
    /// No-op returning success when the cache is disabled.
    pub fn set(&self, key: &str, bytes: &[u8]) -> Result<(), SandboxError> {
        if !self.enabled {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir).map_err(SandboxError::Cache)?;
        let final_path = self.entry_path(key);
        let tmp_path = self.dir.join(format!("tmp.{key}.cache"));
        std::fs::write(&tmp_path, bytes).map_err(SandboxError::Cache)?;
        std::fs::rename(&tmp_path, &final_path).map_err(SandboxError::Cache)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn set_then_get_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(tmp.path(), true);
        cache.set("k1", b"hello").unwrap();
        assert_eq!(cache.get("k1").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn disabled_cache_is_always_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(tmp.path(), false);
        cache.set("k1", b"hello").unwrap();
        assert_eq!(cache.get("k1").unwrap(), None);
    }

    #[test]
    fn expired_entry_is_removed_and_misses() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(tmp.path(), true);
        cache.set("k1", b"hello").unwrap();

        let path = cache.entry_path("k1");
        let stale = SystemTime::now() - CACHE_TTL - StdDuration::from_secs(1);
        let file = std::fs::File::open(&path).unwrap();
        file.set_modified(stale).unwrap();

        assert_eq!(cache.get("k1").unwrap(), None);
        assert!(!path.exists());
    }
}
