use crate::path::normalize_path;
use crate::traits::{BackupStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem backup storage rooted at a vault directory
#[derive(Clone, Debug)]
pub struct LocalBackupStorage {
    base_path: PathBuf,
}

impl LocalBackupStorage {
    /// Create a new LocalBackupStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Vault root every backup path is resolved against
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create vault directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBackupStorage { base_path })
    }

    /// Convert a vault-relative path to a filesystem path
    ///
    /// Rejects anything that could resolve outside the vault root.
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let normalized = normalize_path(path);

        if normalized.split('/').any(|segment| segment == "..") {
            return Err(StorageError::InvalidPath(format!(
                "Path escapes the vault: {}",
                path
            )));
        }
        if Path::new(&normalized).is_absolute() || normalized.contains(':') {
            return Err(StorageError::InvalidPath(format!(
                "Path must be vault-relative: {}",
                path
            )));
        }

        Ok(self.base_path.join(normalized))
    }
}

#[async_trait]
impl BackupStorage for LocalBackupStorage {
    async fn ensure_directory(&self, path: &str) -> StorageResult<()> {
        let dir = self.resolve(path)?;
        fs::create_dir_all(&dir).await?;
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> StorageResult<bool> {
        let path = self.resolve(path)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn write_file(&self, path: &str, data: Bytes) -> StorageResult<()> {
        let target = self.resolve(path)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&target).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", target.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", target.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", target.display(), e))
        })?;

        tracing::info!(
            path = %target.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local backup write successful"
        );

        Ok(())
    }
}
