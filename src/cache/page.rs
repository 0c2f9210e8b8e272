//! Single-document page cache
//!
//! Holds one file's content in memory together with the modification time it
//! was read at. A read whose observed modification time is strictly newer than
//! the cached one reloads the file; everything else is served from memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::fs;
use tokio::sync::Mutex;

use crate::error::PageError;

/// Cached copy of the page source
#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub content: Arc<str>,
    pub source_modified_at: SystemTime,
}

/// Page cache service
///
/// The check-and-reload sequence runs under one async mutex, so concurrent
/// readers never see a half-loaded document and a burst of stale reads
/// triggers a single reload.
pub struct PageCache {
    path: PathBuf,
    document: Mutex<Option<CachedDocument>>,
    reloads: AtomicU64,
}

impl PageCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            document: Mutex::new(None),
            reloads: AtomicU64::new(0),
        }
    }

    /// Number of times the source file has been (re)loaded
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Return the current page content, reloading it if the source changed.
    pub async fn get(&self) -> Result<Arc<str>, PageError> {
        let modified = self.source_modified_at().await?;

        let mut document = self.document.lock().await;
        if let Some(cached) = document.as_ref() {
            if modified <= cached.source_modified_at {
                return Ok(Arc::clone(&cached.content));
            }
        }

        // Lock stays held across the read; waiters re-check against the new timestamp
        let content: Arc<str> = match fs::read_to_string(&self.path).await {
            Ok(text) => Arc::from(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PageError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(PageError::Io(e)),
        };

        let reloads = self.reloads.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            path = %self.path.display(),
            bytes = content.len(),
            reloads,
            "page cache reloaded"
        );

        *document = Some(CachedDocument {
            content: Arc::clone(&content),
            source_modified_at: modified,
        });
        Ok(content)
    }

    /// Snapshot of the cached document, if any, without touching the disk
    pub async fn cached(&self) -> Option<CachedDocument> {
        self.document.lock().await.clone()
    }

    async fn source_modified_at(&self) -> Result<SystemTime, PageError> {
        let metadata = match fs::metadata(&self.path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PageError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(PageError::Io(e)),
        };
        Ok(metadata.modified()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Replace the page atomically with a fixed mtime
    fn write_page(path: &Path, content: &str, modified: SystemTime) {
        let staging = path.with_extension("staging");
        std::fs::write(&staging, content).unwrap();
        let file = std::fs::File::options().write(true).open(&staging).unwrap();
        file.set_modified(modified).unwrap();
        drop(file);
        std::fs::rename(&staging, path).unwrap();
    }

    fn t0() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[tokio::test]
    async fn test_first_read_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        write_page(&path, "<h1>v1</h1>", t0());

        let cache = PageCache::new(&path);
        assert!(cache.cached().await.is_none());

        assert_eq!(&*cache.get().await.unwrap(), "<h1>v1</h1>");
        assert_eq!(cache.reload_count(), 1);

        let cached = cache.cached().await.unwrap();
        assert_eq!(cached.source_modified_at, t0());
    }

    #[tokio::test]
    async fn test_unchanged_file_served_from_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        write_page(&path, "<h1>v1</h1>", t0());

        let cache = PageCache::new(&path);
        cache.get().await.unwrap();

        // Same mtime, different bytes: must not be picked up
        write_page(&path, "<h1>sneaky</h1>", t0());
        assert_eq!(&*cache.get().await.unwrap(), "<h1>v1</h1>");
        assert_eq!(cache.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_newer_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        write_page(&path, "<h1>v1</h1>", t0());

        let cache = PageCache::new(&path);
        assert_eq!(&*cache.get().await.unwrap(), "<h1>v1</h1>");

        let t1 = t0() + Duration::from_secs(60);
        write_page(&path, "<h1>v2</h1>", t1);
        assert_eq!(&*cache.get().await.unwrap(), "<h1>v2</h1>");
        assert_eq!(cache.reload_count(), 2);
        assert_eq!(cache.cached().await.unwrap().source_modified_at, t1);
    }

    #[tokio::test]
    async fn test_older_mtime_does_not_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        write_page(&path, "<h1>v1</h1>", t0());

        let cache = PageCache::new(&path);
        cache.get().await.unwrap();

        write_page(&path, "<h1>restored</h1>", t0() - Duration::from_secs(3600));
        assert_eq!(&*cache.get().await.unwrap(), "<h1>v1</h1>");
        assert_eq!(cache.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path().join("missing.html"));

        assert!(matches!(cache.get().await, Err(PageError::NotFound(_))));
        assert!(cache.cached().await.is_none());
        assert_eq!(cache.reload_count(), 0);
    }

    #[tokio::test]
    async fn test_deleted_file_keeps_cached_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        write_page(&path, "<h1>v1</h1>", t0());

        let cache = PageCache::new(&path);
        cache.get().await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(cache.get().await, Err(PageError::NotFound(_))));
        let cached = cache.cached().await.unwrap();
        assert_eq!(&*cached.content, "<h1>v1</h1>");
        assert_eq!(cached.source_modified_at, t0());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stale_reads_reload_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        let v1 = "a".repeat(64 * 1024);
        let v2 = "b".repeat(64 * 1024);
        write_page(&path, &v1, t0());

        let cache = Arc::new(PageCache::new(&path));
        cache.get().await.unwrap();

        write_page(&path, &v2, t0() + Duration::from_secs(5));

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move { cache.get().await.unwrap() }));
        }

        for task in tasks {
            let content = task.await.unwrap();
            assert_eq!(&*content, v2.as_str());
        }
        assert_eq!(cache.reload_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_spanning_reload_are_never_torn() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        let v1 = "a".repeat(256 * 1024);
        let v2 = "b".repeat(256 * 1024);
        write_page(&path, &v1, t0());

        let cache = Arc::new(PageCache::new(&path));
        cache.get().await.unwrap();

        let readers: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    for _ in 0..20 {
                        seen.push(cache.get().await.unwrap());
                        tokio::task::yield_now().await;
                    }
                    seen
                })
            })
            .collect();

        write_page(&path, &v2, t0() + Duration::from_secs(5));

        for reader in readers {
            for content in reader.await.unwrap() {
                assert!(&*content == v1.as_str() || &*content == v2.as_str());
            }
        }
        assert_eq!(&*cache.get().await.unwrap(), v2.as_str());
    }
}
