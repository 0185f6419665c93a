//! Error types module
//!
//! `UploadError` is the terminal failure returned by an upload call. Processing
//! failures inside the watermark and compression stages never reach this type:
//! they are recovered where they happen and the unmodified file is uploaded.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like remote rejections
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    #[error("Unsupported file type: {extension} (allowed: {allowed:?})")]
    UnsupportedType {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Upload failed: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Unexpected server response: {0}")]
    BadResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Result of a single upload call: the canonical URL or a typed failure.
pub type UploadResult = Result<String, UploadError>;

impl UploadError {
    /// Machine-readable error code (e.g., "HTTP_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::ConfigMissing(_) => "CONFIG_MISSING",
            UploadError::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            UploadError::TooLarge { .. } => "TOO_LARGE",
            UploadError::Http { .. } => "HTTP_ERROR",
            UploadError::BadResponse(_) => "BAD_RESPONSE",
            UploadError::Network(_) => "NETWORK_ERROR",
        }
    }

    /// Whether repeating the same call could succeed without the user changing anything.
    pub fn is_recoverable(&self) -> bool {
        match self {
            UploadError::Http { status, .. } => *status >= 500 || *status == 429,
            UploadError::Network(_) => true,
            _ => false,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            UploadError::ConfigMissing(_)
            | UploadError::UnsupportedType { .. }
            | UploadError::TooLarge { .. } => LogLevel::Debug,
            UploadError::Http { .. } => LogLevel::Warn,
            UploadError::BadResponse(_) | UploadError::Network(_) => LogLevel::Error,
        }
    }
}
