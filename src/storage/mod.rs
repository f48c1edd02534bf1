//! Bucketed object storage on the local filesystem.
//!
//! Objects live at `{root}/{bucket}/{path}` and are served publicly under
//! [`PUBLIC_PREFIX`], so a stored object's URL has the same shape the post
//! editor has always embedded in post content.

mod paths;

pub use paths::*;

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const MEDIA_BUCKET: &str = "media";
pub const AVATARS_BUCKET: &str = "avatars";
pub const BUCKETS: [&str; 2] = [MEDIA_BUCKET, AVATARS_BUCKET];

/// Route prefix under which bucket objects are publicly readable.
pub const PUBLIC_PREFIX: &str = "/storage/v1/object/public";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket '{0}' does not exist")]
    BucketNotFound(String),
    #[error("object '{0}' not found")]
    ObjectNotFound(String),
    #[error("object '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid object path '{0}'")]
    InvalidPath(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    pub size: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every known bucket directory.
    pub async fn ensure_buckets(&self) -> Result<(), StorageError> {
        for bucket in BUCKETS {
            tokio::fs::create_dir_all(self.root.join(bucket)).await?;
        }
        Ok(())
    }

    pub async fn bucket_exists(&self, bucket: &str) -> bool {
        BUCKETS.contains(&bucket)
            && tokio::fs::metadata(self.root.join(bucket))
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false)
    }

    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        upsert: bool,
    ) -> Result<String, StorageError> {
        let target = self.object_path(bucket, path).await?;
        if !upsert && tokio::fs::try_exists(&target).await? {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::debug!(bucket, path, size = bytes.len(), "Stored object");
        Ok(path.to_string())
    }

    /// List objects below `prefix` (the whole bucket when `None`), sorted by name.
    pub async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        let bucket_root = self.bucket_root(bucket).await?;
        let start = match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
            Some(prefix) => bucket_root.join(validate_object_path(prefix)?),
            None => bucket_root.clone(),
        };

        let mut objects = Vec::new();
        if !tokio::fs::try_exists(&start).await? {
            return Ok(objects);
        }

        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let meta = entry.metadata().await?;
                if meta.is_dir() {
                    pending.push(entry.path());
                    continue;
                }
                let name = entry
                    .path()
                    .strip_prefix(&bucket_root)
                    .map(|relative| {
                        relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy().into_owned())
                            .collect::<Vec<_>>()
                            .join("/")
                    })
                    .unwrap_or_default();
                objects.push(ObjectInfo {
                    name,
                    size: meta.len(),
                    updated_at: meta.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    pub async fn remove(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let target = self.object_path(bucket, path).await?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::ObjectNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{PUBLIC_PREFIX}/{bucket}/{path}", self.public_base_url)
    }

    /// Check that a bucket exists, can be listed and accepts writes by
    /// round-tripping a small test object.
    pub async fn probe(&self, bucket: &str) -> Result<(), StorageError> {
        if !self.bucket_exists(bucket).await {
            return Err(StorageError::BucketNotFound(bucket.to_string()));
        }
        self.list(bucket, None).await?;

        let test_path = format!("test-permissions-{}.txt", uuid::Uuid::new_v4());
        let uploaded = self.upload(bucket, &test_path, b"test", true).await;
        if let Err(e) = self.remove(bucket, &test_path).await {
            tracing::debug!(error = %e, "Could not remove probe object");
        }
        uploaded.map(|_| ())
    }

    async fn bucket_root(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        if !self.bucket_exists(bucket).await {
            return Err(StorageError::BucketNotFound(bucket.to_string()));
        }
        Ok(self.root.join(bucket))
    }

    async fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, StorageError> {
        let relative = validate_object_path(path)?;
        Ok(self.bucket_root(bucket).await?.join(relative))
    }
}

/// Object keys are relative `/`-separated paths with no empty, `.` or `..`
/// segments.
pub fn validate_object_path(path: &str) -> Result<PathBuf, StorageError> {
    let invalid = || StorageError::InvalidPath(path.to_string());
    if path.is_empty() || path.starts_with('/') || path.contains('\\') || path.contains('\0') {
        return Err(invalid());
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(invalid());
    }
    let relative = PathBuf::from(path);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid());
    }
    Ok(relative)
}

/// Reduce an uploaded file name to characters that are safe in an object key.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '-');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Lowercased extension of `name`, if it has a plausible one.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> MediaStore {
        MediaStore::new(dir.path(), "http://blog.test/")
    }

    #[tokio::test]
    async fn upload_list_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.ensure_buckets().await.unwrap();

        store
            .upload(MEDIA_BUCKET, "content/a.png", b"png", false)
            .await
            .unwrap();
        store
            .upload(MEDIA_BUCKET, "featured/b.png", b"png!", false)
            .await
            .unwrap();

        let all = store.list(MEDIA_BUCKET, None).await.unwrap();
        let names: Vec<_> = all.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["content/a.png", "featured/b.png"]);
        assert_eq!(all[1].size, 4);

        let content = store.list(MEDIA_BUCKET, Some("content")).await.unwrap();
        assert_eq!(content.len(), 1);

        store.remove(MEDIA_BUCKET, "content/a.png").await.unwrap();
        assert!(matches!(
            store.remove(MEDIA_BUCKET, "content/a.png").await,
            Err(StorageError::ObjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn upload_without_upsert_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.ensure_buckets().await.unwrap();

        store.upload(AVATARS_BUCKET, "1/x.jpg", b"a", false).await.unwrap();
        assert!(matches!(
            store.upload(AVATARS_BUCKET, "1/x.jpg", b"b", false).await,
            Err(StorageError::AlreadyExists(_))
        ));
        store.upload(AVATARS_BUCKET, "1/x.jpg", b"b", true).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_bucket_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.ensure_buckets().await.unwrap();

        assert!(matches!(
            store.upload("secrets", "x", b"", true).await,
            Err(StorageError::BucketNotFound(_))
        ));
        assert!(matches!(
            store.probe("secrets").await,
            Err(StorageError::BucketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn probe_leaves_no_objects_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.ensure_buckets().await.unwrap();

        store.probe(MEDIA_BUCKET).await.unwrap();
        assert!(store.list(MEDIA_BUCKET, None).await.unwrap().is_empty());
    }

    #[test]
    fn public_url_shape() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            store(&dir).public_url(MEDIA_BUCKET, "featured/x.png"),
            "http://blog.test/storage/v1/object/public/media/featured/x.png"
        );
    }

    #[test]
    fn object_paths_cannot_escape_the_bucket() {
        assert!(validate_object_path("content/a.png").is_ok());
        for bad in ["", "/etc/passwd", "../x", "a/../b", "a//b", "a/./b", "a\\b"] {
            assert!(validate_object_path(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("My Photo (1).PNG"), "My-Photo--1-.PNG");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(file_extension("cat.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("noext"), None);
    }
}
