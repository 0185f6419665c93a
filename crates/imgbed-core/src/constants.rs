//! Shared constants.

/// Bytes per megabyte as used by every size setting (binary megabyte).
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Multipart field name the image host reads the file from.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Prefix for environment variable configuration.
pub const ENV_PREFIX: &str = "IMGBED_";
