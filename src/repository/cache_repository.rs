use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::error;

use crate::repository::storage::get_cache_file_path;
use crate::utils::file_utils::write_atomically;
use crate::utils::{debug_if_enabled, sanitize_sensitive_info};

const SECONDS_PER_HOUR: u64 = 3_600;

/// Time based byte cache stored as one file per source identifier.
///
/// An entry is served while `now - stored_at < lifespan`; older entries behave as if
/// they had never been written. Reads and writes never fail, I/O problems are treated
/// as a cache miss or a skipped write.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, key: &str, lifespan_hours: u64) -> Option<Vec<u8>> {
        let path = get_cache_file_path(&self.root, key);
        let stored_at = match std::fs::metadata(&path).and_then(|md| md.modified()) {
            Ok(modified) => modified,
            Err(_) => {
                debug_if_enabled!("cache miss for {}", sanitize_sensitive_info(key));
                return None;
            }
        };
        if is_expired(stored_at, SystemTime::now(), lifespan_hours) {
            debug_if_enabled!("cache entry expired for {}", sanitize_sensitive_info(key));
            return None;
        }
        match std::fs::read(&path) {
            Ok(content) => {
                debug_if_enabled!("cache hit for {}", sanitize_sensitive_info(key));
                Some(content)
            }
            Err(err) => {
                debug_if_enabled!("cant read cache file {}: {}", path.display(), err);
                None
            }
        }
    }

    pub fn set(&self, key: &str, content: &[u8]) {
        let path = get_cache_file_path(&self.root, key);
        if let Err(err) = write_atomically(&path, content) {
            error!("cant write cache file {}: {}", path.display(), err);
        }
    }
}

fn is_expired(stored_at: SystemTime, now: SystemTime, lifespan_hours: u64) -> bool {
    let lifespan = Duration::from_secs(lifespan_hours.saturating_mul(SECONDS_PER_HOUR));
    // mtime in the future counts as fresh
    now.duration_since(stored_at).map_or(false, |age| age >= lifespan)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};
    use filetime::FileTime;
    use crate::repository::cache_repository::{is_expired, FileCache};
    use crate::repository::storage::get_cache_file_path;

    const HOUR: u64 = 3_600;

    fn age_entry(cache: &FileCache, key: &str, age: Duration) {
        let path = get_cache_file_path(cache.root(), key);
        let stored_at = SystemTime::now() - age;
        filetime::set_file_mtime(&path, FileTime::from_system_time(stored_at)).unwrap();
    }

    #[test]
    fn test_get_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert_eq!(cache.get("http://host/list.m3u", 25), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(&dir.path().join("cache"));
        cache.set("http://host/list.m3u", b"#EXTM3U");
        assert_eq!(cache.get("http://host/list.m3u", 1), Some(b"#EXTM3U".to_vec()));
        assert_eq!(cache.get("http://host/other.m3u", 1), None);
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.set("key", b"old");
        cache.set("key", b"new");
        assert_eq!(cache.get("key", 1), Some(b"new".to_vec()));
    }

    #[test]
    fn test_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.set("key", b"content");

        age_entry(&cache, "key", Duration::from_secs(2 * HOUR - 60));
        assert!(cache.get("key", 2).is_some());

        age_entry(&cache, "key", Duration::from_secs(2 * HOUR + 60));
        assert!(cache.get("key", 2).is_none());
        assert!(cache.get("key", 3).is_some());
    }

    #[test]
    fn test_zero_lifespan_is_always_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.set("key", b"content");
        assert!(cache.get("key", 0).is_none());
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = SystemTime::now();
        assert!(!is_expired(now - Duration::from_secs(HOUR - 1), now, 1));
        assert!(is_expired(now - Duration::from_secs(HOUR), now, 1));
        assert!(!is_expired(now + Duration::from_secs(10), now, 1));
    }

    #[test]
    fn test_unwritable_root_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // the cache root is a regular file, so writes cannot succeed
        let cache = FileCache::new(&blocker);
        cache.set("key", b"content");
        assert!(cache.get("key", 1).is_none());
    }
}
