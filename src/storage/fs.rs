// Filesystem object store
// Maps bucket/key onto `{root}/{bucket}/{key}`

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{validate_key, ObjectStore};
use crate::error::StorageError;

/// Object store backed by a local directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        validate_key(bucket)?;
        validate_key(key)?;

        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir).await?;

        // Write beside the target and rename so readers never see a partial object
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let staging = dir.join(format!(".{key}.{nanos}.part"));

        if let Err(e) = publish(&staging, &dir.join(key), data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

async fn publish(staging: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(staging).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(staging, target).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store
            .put_object("received-data", "2024-03-09-14-05.i16", "application/octet-stream", &[1, 2, 3])
            .await
            .unwrap();

        let path = store.object_path("received-data", "2024-03-09-14-05.i16");
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);

        // No staging files left behind
        let entries = std::fs::read_dir(dir.path().join("received-data")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.put_object("b", "k.i16", "application/octet-stream", b"first").await.unwrap();
        store.put_object("b", "k.i16", "application/octet-stream", b"second").await.unwrap();

        assert_eq!(std::fs::read(store.object_path("b", "k.i16")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        // A non-empty directory squatting on the key makes the final rename fail
        let target = store.object_path("b", "k.i16");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("occupied"), b"x").unwrap();

        let result = store.put_object("b", "k.i16", "application/octet-stream", b"data").await;
        assert!(matches!(result, Err(StorageError::Io(_))));

        let names: Vec<_> = std::fs::read_dir(dir.path().join("b"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("k.i16")]);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.put_object("b", "../escape", "application/octet-stream", b"x").await;
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
