//! imgbed Core Library
//!
//! This crate provides the configuration snapshot, the source file model and the
//! error taxonomy shared by every imgbed component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    ConfigError, ReturnFormat, UploadChannel, UploadConfiguration, UploadNameType,
    WatermarkPosition,
};
pub use error::{LogLevel, UploadError, UploadResult};
pub use models::SourceFile;
