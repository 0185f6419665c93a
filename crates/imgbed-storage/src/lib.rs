//! imgbed Storage Library
//!
//! Abstraction over the place local backup copies of uploaded images are kept.
//!
//! # Path format
//!
//! Paths are vault-relative and normalized before use: backslashes become `/`,
//! repeated separators collapse, and leading/trailing separators are dropped
//! (`attachments//backup/` → `attachments/backup`). Paths must not contain `..`.

#[cfg(feature = "storage-local")]
pub mod local;
pub mod path;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use local::LocalBackupStorage;
pub use path::{join_path, normalize_path};
pub use traits::{BackupStorage, StorageError, StorageResult};
