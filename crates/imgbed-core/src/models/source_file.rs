use bytes::Bytes;
use std::path::Path;

use crate::constants::BYTES_PER_MB;

/// An immutable image blob flowing through the upload pipeline.
///
/// Stages never mutate a `SourceFile`; they either hand it back or build a new one.
/// Cloning is cheap since the payload is reference counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    mime_type: String,
    data: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let mime_type = mime_type_for_name(&name).to_string();
        Ok(Self::new(name, mime_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn size_mb(&self) -> f64 {
        self.byte_size() as f64 / BYTES_PER_MB as f64
    }

    /// Lowercased text after the last `.` of the name (the whole name when there is none).
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Same name, new payload and media type.
    pub fn with_contents(&self, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(self.name.clone(), mime_type, data)
    }
}

/// Media type for a file name, `application/octet-stream` when unknown.
pub fn mime_type_for_name(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Human readable size with a 1024 base, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_after_last_dot() {
        let file = SourceFile::new("holiday.final.PNG", "image/png", vec![1, 2, 3]);
        assert_eq!(file.extension(), "png");
    }

    #[test]
    fn test_extension_without_dot_is_whole_name() {
        let file = SourceFile::new("README", "text/plain", Vec::new());
        assert_eq!(file.extension(), "readme");
    }

    #[test]
    fn test_sizes() {
        let file = SourceFile::new("a.png", "image/png", vec![0u8; 512 * 1024]);
        assert_eq!(file.byte_size(), 512 * 1024);
        assert!((file.size_mb() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_contents_keeps_name() {
        let file = SourceFile::new("a.png", "image/png", vec![1]);
        let replaced = file.with_contents("image/jpeg", vec![2, 3]);
        assert_eq!(replaced.name(), "a.png");
        assert_eq!(replaced.mime_type(), "image/jpeg");
        assert_eq!(replaced.byte_size(), 2);
        assert_eq!(file.byte_size(), 1);
    }

    #[test]
    fn test_mime_type_for_name() {
        assert_eq!(mime_type_for_name("x.JPG"), "image/jpeg");
        assert_eq!(mime_type_for_name("x.webp"), "image/webp");
        assert_eq!(mime_type_for_name("x.exe"), "application/octet-stream");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.webp");
        tokio::fs::write(&path, b"riff").await.unwrap();

        let file = SourceFile::from_path(&path).await.unwrap();
        assert_eq!(file.name(), "photo.webp");
        assert_eq!(file.mime_type(), "image/webp");
        assert_eq!(file.data().as_ref(), b"riff");
    }
}
