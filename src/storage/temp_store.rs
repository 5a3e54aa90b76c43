use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Scratch directory for uploaded media that only lives for one request.
#[derive(Debug, Clone)]
pub struct TempFileStore {
    dir: PathBuf,
}

impl TempFileStore {
    /// Opens the store, creating the scratch directory if it is absent.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::storage(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        info!("Upload directory ready: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under a request-unique name derived from `filename`.
    ///
    /// Every stored file gets a fresh UUID prefix, so two uploads carrying the
    /// same client filename never share a path.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredUpload> {
        let name = sanitize_filename(filename)
            .ok_or_else(|| Error::validation("The uploaded file has no filename"))?;
        let path = self.dir.join(format!("{}-{}", Uuid::new_v4(), name));

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            Error::storage(format!("Failed to save file {}: {}", path.display(), e))
        })?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(StoredUpload {
            path,
            released: false,
        })
    }
}

/// A stored upload. The file is removed by [`StoredUpload::release`], or on
/// drop if it was never released.
#[derive(Debug)]
pub struct StoredUpload {
    path: PathBuf,
    released: bool,
}

impl StoredUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file. A file that is already gone is not an error.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Released temporary file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!(
                "Failed to delete temporary file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to delete abandoned temporary file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Keeps only the final path component of a client-supplied filename.
fn sanitize_filename(filename: &str) -> Option<String> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("clip.mp4"), Some("clip.mp4".to_string()));
        assert_eq!(
            sanitize_filename("../../etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(
            sanitize_filename("C:\\videos\\clip.webm"),
            Some("clip.webm".to_string())
        );
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("   "), None);
        assert_eq!(sanitize_filename("videos/"), None);
        assert_eq!(sanitize_filename(".."), None);
    }

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("uploads");

        let store = TempFileStore::new(&dir).await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn test_store_and_release() {
        let temp_dir = TempDir::new().unwrap();
        let store = TempFileStore::new(temp_dir.path()).await.unwrap();

        let upload = store.store("clip.mp4", b"video-bytes").await.unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.starts_with(temp_dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("-clip.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"video-bytes");

        upload.release().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_is_idempotent_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = TempFileStore::new(temp_dir.path()).await.unwrap();

        let upload = store.store("clip.mp4", b"x").await.unwrap();
        std::fs::remove_file(upload.path()).unwrap();

        assert!(upload.release().await.is_ok());
    }

    #[tokio::test]
    async fn test_drop_removes_unreleased_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = TempFileStore::new(temp_dir.path()).await.unwrap();

        let upload = store.store("clip.mp4", b"x").await.unwrap();
        let path = upload.path().to_path_buf();
        drop(upload);

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_filename_gets_distinct_paths() {
        let temp_dir = TempDir::new().unwrap();
        let store = TempFileStore::new(temp_dir.path()).await.unwrap();

        let first = store.store("clip.mp4", b"first").await.unwrap();
        let second = store.store("clip.mp4", b"second").await.unwrap();
        assert_ne!(first.path(), second.path());

        // Releasing one upload must leave the other intact.
        let second_path = second.path().to_path_buf();
        first.release().await.unwrap();
        assert_eq!(std::fs::read(&second_path).unwrap(), b"second");
        second.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_filename_is_rejected_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let store = TempFileStore::new(temp_dir.path()).await.unwrap();

        let result = store.store("", b"x").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
