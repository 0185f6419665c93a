//! Storage abstraction trait
//!
//! This module defines the BackupStorage trait that backup sinks must implement.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where local backup copies of uploaded images go
///
/// Paths are vault-relative; implementations normalize them with
/// [`normalize_path`](crate::normalize_path) before touching anything.
#[async_trait]
pub trait BackupStorage: Send + Sync {
    /// Create the directory (and parents) if it does not exist yet
    async fn ensure_directory(&self, path: &str) -> StorageResult<()>;

    /// Check if a file or directory exists
    async fn file_exists(&self, path: &str) -> StorageResult<bool>;

    /// Write a file, replacing any existing file at the same path
    async fn write_file(&self, path: &str, data: Bytes) -> StorageResult<()>;
}
