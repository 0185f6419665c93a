//! Configuration module
//!
//! `UploadConfiguration` is the flat settings object the uploader reads once per
//! call. It can be deserialized from the plugin-style camelCase JSON settings
//! file (missing keys fall back to defaults) or built from `IMGBED_*` environment
//! variables. The pipeline never validates it; `validate` is for settings screens
//! and the CLI `check-config` command.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use crate::constants::{BYTES_PER_MB, ENV_PREFIX};

// Defaults
const MAX_FILE_SIZE_MB: f64 = 10.0;
const WATERMARK_SIZE_PX: f32 = 24.0;
const WATERMARK_OPACITY: f32 = 0.7;
const COMPRESS_THRESHOLD_MB: f64 = 2.0;
const TARGET_SIZE_MB: f64 = 1.0;
const NOTIFICATION_DURATION_SECS: u64 = 5;
const BACKUP_PATH: &str = "attachments/backup";
const ALLOWED_FILE_TYPES: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {message}")]
    Env { key: String, message: String },

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Storage channel the image host writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadChannel {
    #[default]
    Telegram,
    Cfr2,
    S3,
}

impl UploadChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadChannel::Telegram => "telegram",
            UploadChannel::Cfr2 => "cfr2",
            UploadChannel::S3 => "s3",
        }
    }
}

impl FromStr for UploadChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" => Ok(UploadChannel::Telegram),
            "cfr2" => Ok(UploadChannel::Cfr2),
            "s3" => Ok(UploadChannel::S3),
            _ => Err(format!("unknown upload channel '{}'", s)),
        }
    }
}

/// How the server names stored files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadNameType {
    #[default]
    Default,
    Index,
    Origin,
    Short,
}

impl UploadNameType {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadNameType::Default => "default",
            UploadNameType::Index => "index",
            UploadNameType::Origin => "origin",
            UploadNameType::Short => "short",
        }
    }
}

impl FromStr for UploadNameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(UploadNameType::Default),
            "index" => Ok(UploadNameType::Index),
            "origin" => Ok(UploadNameType::Origin),
            "short" => Ok(UploadNameType::Short),
            _ => Err(format!("unknown upload name type '{}'", s)),
        }
    }
}

/// Shape of the `src` the server returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFormat {
    /// Path relative to the API host
    #[default]
    Default,
    /// Absolute URL
    Full,
}

impl ReturnFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnFormat::Default => "default",
            ReturnFormat::Full => "full",
        }
    }
}

impl FromStr for ReturnFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(ReturnFormat::Default),
            "full" => Ok(ReturnFormat::Full),
            _ => Err(format!("unknown return format '{}'", s)),
        }
    }
}

/// Watermark anchor
///
/// Any unrecognized value reads as `BottomRight`, so a stale or hand-edited
/// settings file never fails to load because of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl WatermarkPosition {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "top-left" => WatermarkPosition::TopLeft,
            "top-right" => WatermarkPosition::TopRight,
            "bottom-left" => WatermarkPosition::BottomLeft,
            "center" => WatermarkPosition::Center,
            _ => WatermarkPosition::BottomRight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WatermarkPosition::TopLeft => "top-left",
            WatermarkPosition::TopRight => "top-right",
            WatermarkPosition::BottomLeft => "bottom-left",
            WatermarkPosition::BottomRight => "bottom-right",
            WatermarkPosition::Center => "center",
        }
    }
}

impl From<String> for WatermarkPosition {
    fn from(value: String) -> Self {
        WatermarkPosition::parse(&value)
    }
}

impl From<WatermarkPosition> for String {
    fn from(value: WatermarkPosition) -> Self {
        value.as_str().to_string()
    }
}

impl Display for WatermarkPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Per-call snapshot of every option the uploader recognizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfiguration {
    // Basic
    pub api_url: String,
    pub auth_code: String,
    pub upload_channel: UploadChannel,
    pub upload_name_type: UploadNameType,
    pub return_format: ReturnFormat,
    pub upload_folder: Option<String>,
    pub server_compress: bool,
    pub auto_retry: bool,

    // Advanced
    /// MB
    pub max_file_size: f64,
    /// Lowercase extensions without the dot
    pub allowed_file_types: Vec<String>,
    pub enable_watermark: bool,
    pub watermark_text: String,
    pub watermark_position: WatermarkPosition,
    /// Font size in px
    pub watermark_size: f32,
    /// 0-1
    pub watermark_opacity: f32,
    pub watermark_font_path: Option<String>,

    // Client compression
    pub enable_client_compress: bool,
    /// MB
    pub compress_threshold: f64,
    /// MB
    pub target_size: f64,

    // Notifications
    pub show_upload_progress: bool,
    pub show_success_notification: bool,
    pub show_error_notification: bool,
    /// Seconds
    pub notification_duration: u64,

    // Backup
    pub enable_local_backup: bool,
    pub backup_path: Option<String>,
}

impl Default for UploadConfiguration {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            auth_code: String::new(),
            upload_channel: UploadChannel::default(),
            upload_name_type: UploadNameType::default(),
            return_format: ReturnFormat::default(),
            upload_folder: None,
            server_compress: true,
            auto_retry: true,
            max_file_size: MAX_FILE_SIZE_MB,
            allowed_file_types: ALLOWED_FILE_TYPES.iter().map(|s| s.to_string()).collect(),
            enable_watermark: false,
            watermark_text: String::new(),
            watermark_position: WatermarkPosition::default(),
            watermark_size: WATERMARK_SIZE_PX,
            watermark_opacity: WATERMARK_OPACITY,
            watermark_font_path: None,
            enable_client_compress: false,
            compress_threshold: COMPRESS_THRESHOLD_MB,
            target_size: TARGET_SIZE_MB,
            show_upload_progress: true,
            show_success_notification: true,
            show_error_notification: true,
            notification_duration: NOTIFICATION_DURATION_SECS,
            enable_local_backup: false,
            backup_path: Some(BACKUP_PATH.to_string()),
        }
    }
}

impl UploadConfiguration {
    /// Load a JSON settings file over the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build from `IMGBED_*` environment variables (and a `.env` file when present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let allowed_file_types = env_var("ALLOWED_FILE_TYPES")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_file_types);

        Ok(Self {
            api_url: env_var("API_URL").unwrap_or_default(),
            auth_code: env_var("AUTH_CODE").unwrap_or_default(),
            upload_channel: env_parse("UPLOAD_CHANNEL", defaults.upload_channel)?,
            upload_name_type: env_parse("UPLOAD_NAME_TYPE", defaults.upload_name_type)?,
            return_format: env_parse("RETURN_FORMAT", defaults.return_format)?,
            upload_folder: env_var("UPLOAD_FOLDER"),
            server_compress: env_parse("SERVER_COMPRESS", defaults.server_compress)?,
            auto_retry: env_parse("AUTO_RETRY", defaults.auto_retry)?,
            max_file_size: env_parse("MAX_FILE_SIZE_MB", defaults.max_file_size)?,
            allowed_file_types,
            enable_watermark: env_parse("ENABLE_WATERMARK", defaults.enable_watermark)?,
            watermark_text: env_var("WATERMARK_TEXT").unwrap_or_default(),
            watermark_position: env_var("WATERMARK_POSITION")
                .map(|s| WatermarkPosition::parse(&s))
                .unwrap_or(defaults.watermark_position),
            watermark_size: env_parse("WATERMARK_SIZE", defaults.watermark_size)?,
            watermark_opacity: env_parse("WATERMARK_OPACITY", defaults.watermark_opacity)?,
            watermark_font_path: env_var("WATERMARK_FONT_PATH"),
            enable_client_compress: env_parse(
                "ENABLE_CLIENT_COMPRESS",
                defaults.enable_client_compress,
            )?,
            compress_threshold: env_parse("COMPRESS_THRESHOLD_MB", defaults.compress_threshold)?,
            target_size: env_parse("TARGET_SIZE_MB", defaults.target_size)?,
            show_upload_progress: env_parse(
                "SHOW_UPLOAD_PROGRESS",
                defaults.show_upload_progress,
            )?,
            show_success_notification: env_parse(
                "SHOW_SUCCESS_NOTIFICATION",
                defaults.show_success_notification,
            )?,
            show_error_notification: env_parse(
                "SHOW_ERROR_NOTIFICATION",
                defaults.show_error_notification,
            )?,
            notification_duration: env_parse(
                "NOTIFICATION_DURATION_SECS",
                defaults.notification_duration,
            )?,
            enable_local_backup: env_parse("ENABLE_LOCAL_BACKUP", defaults.enable_local_backup)?,
            backup_path: env_var("BACKUP_PATH").or(defaults.backup_path),
        })
    }

    /// Check every settings rule and report all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.api_url.trim().is_empty() {
            errors.push("API URL must not be empty".to_string());
        } else if url::Url::parse(&self.api_url).is_err() {
            errors.push("API URL is not a valid URL".to_string());
        }

        if self.auth_code.trim().is_empty() {
            errors.push("Auth code must not be empty".to_string());
        }

        if !(1.0..=100.0).contains(&self.max_file_size) {
            errors.push("Max file size must be between 1 and 100 MB".to_string());
        }

        if self.enable_client_compress {
            if !(0.1..=20.0).contains(&self.compress_threshold) {
                errors.push("Compression threshold must be between 0.1 and 20 MB".to_string());
            }
            if !(0.1..=10.0).contains(&self.target_size) {
                errors.push("Target size must be between 0.1 and 10 MB".to_string());
            }
            if self.target_size >= self.compress_threshold {
                errors.push("Target size must be smaller than the compression threshold".to_string());
            }
        }

        if !(1..=30).contains(&self.notification_duration) {
            errors.push("Notification duration must be between 1 and 30 seconds".to_string());
        }

        if self.allowed_file_types.is_empty() {
            errors.push("At least one allowed file type is required".to_string());
        }

        if self.enable_watermark {
            if self.watermark_text.trim().is_empty() {
                errors.push("Watermark text is required when watermarking is enabled".to_string());
            }
            if !(8.0..=100.0).contains(&self.watermark_size) {
                errors.push("Watermark font size must be between 8 and 100 px".to_string());
            }
            if !(0.1..=1.0).contains(&self.watermark_opacity) {
                errors.push("Watermark opacity must be between 0.1 and 1".to_string());
            }
        }

        if self.enable_local_backup && self.backup_path().is_none() {
            errors.push("Backup path is required when local backup is enabled".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size * BYTES_PER_MB as f64) as u64
    }

    pub fn upload_folder(&self) -> Option<&str> {
        non_blank(self.upload_folder.as_deref())
    }

    pub fn backup_path(&self) -> Option<&str> {
        non_blank(self.backup_path.as_deref())
    }

    pub fn watermark_font_path(&self) -> Option<&str> {
        non_blank(self.watermark_font_path.as_deref())
    }

    pub fn is_allowed_type(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.allowed_file_types
            .iter()
            .any(|allowed| allowed.to_lowercase() == extension)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(key: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, key)).ok()
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
            key: format!("{}{}", ENV_PREFIX, key),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
