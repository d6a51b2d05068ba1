//! Avatar file storage.
//!
//! Files live under `{root}/avatars/` and are referenced publicly as
//! `/uploads/avatars/{file}`. Removal only ever touches that directory.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::{AVATAR_SUBDIR, UPLOADS_MOUNT};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write an avatar and return its public reference.
    async fn save_avatar(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// Remove the file behind a public reference. A missing file is not
    /// an error.
    async fn remove(&self, reference: &str) -> AppResult<()>;
}

/// Local filesystem storage rooted at the upload directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the avatar directory if it does not exist.
    pub async fn ensure_dirs(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(self.avatar_dir()).await?;
        Ok(())
    }

    fn avatar_dir(&self) -> PathBuf {
        self.root.join(AVATAR_SUBDIR)
    }

    /// Resolve a public reference to a path inside the avatar directory.
    fn resolve(&self, reference: &str) -> io::Result<PathBuf> {
        let prefix = format!("{}/{}/", UPLOADS_MOUNT, AVATAR_SUBDIR);
        let file_name = reference
            .strip_prefix(&prefix)
            .filter(|name| is_plain_file_name(name))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("'{}' is not an avatar reference", reference),
                )
            })?;

        Ok(self.avatar_dir().join(file_name))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save_avatar(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        if !is_plain_file_name(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name '{}'", file_name),
            )
            .into());
        }

        let dir = self.avatar_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;

        let reference = format!("{}/{}/{}", UPLOADS_MOUNT, AVATAR_SUBDIR, file_name);
        tracing::debug!(%reference, "Avatar stored");
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> AppResult<()> {
        let path = self.resolve(reference)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(%reference, "Avatar removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let reference = storage
            .save_avatar("abc_1700000000000.png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(reference, "/uploads/avatars/abc_1700000000000.png");

        let path = dir.path().join("avatars").join("abc_1700000000000.png");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1, 2, 3]);

        storage.remove(&reference).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        storage
            .remove("/uploads/avatars/never_written.jpg")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_rejects_foreign_references() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.txt");
        tokio::fs::write(&outside, b"x").await.unwrap();

        let storage = LocalFileStorage::new(dir.path().join("uploads"));
        for reference in [
            "/uploads/avatars/../../keep.txt",
            "/uploads/avatars/",
            "/etc/passwd",
            "https://cdn.example.com/a.png",
        ] {
            assert!(storage.remove(reference).await.is_err(), "{}", reference);
        }
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_save_rejects_path_segments() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        assert!(storage.save_avatar("../x.png", vec![1]).await.is_err());
    }
}
