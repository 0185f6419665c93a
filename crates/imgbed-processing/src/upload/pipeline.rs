use ab_glyph::FontArc;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use imgbed_api_client::{resolve_url, ImageHost, UploadQuery};
use imgbed_core::models::format_file_size;
use imgbed_core::{LogLevel, SourceFile, UploadConfiguration, UploadResult};
use imgbed_storage::{join_path, BackupStorage, StorageResult};

use super::notify::{Notice, Notifier};
use crate::compression::CompressionStage;
use crate::error::ProcessingError;
use crate::image::{discover_font, WatermarkStage};
use crate::stage::StageOutcome;
use crate::validator::FileValidator;

/// Where an upload call currently is. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Validating,
    Watermarking,
    Compressing,
    Encoding,
    Transmitting,
    Interpreting,
    Success,
    Failed,
}

impl UploadState {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadState::Validating => "validating",
            UploadState::Watermarking => "watermarking",
            UploadState::Compressing => "compressing",
            UploadState::Encoding => "encoding",
            UploadState::Transmitting => "transmitting",
            UploadState::Interpreting => "interpreting",
            UploadState::Success => "success",
            UploadState::Failed => "failed",
        }
    }
}

impl Display for UploadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Uploads one image per call.
///
/// Holds only shared collaborators, so a single pipeline can serve concurrent
/// calls. Every call works on its own configuration snapshot.
pub struct UploadPipeline {
    host: Arc<dyn ImageHost>,
    notifier: Arc<dyn Notifier>,
    backup: Option<Arc<dyn BackupStorage>>,
    font: Option<FontArc>,
}

impl UploadPipeline {
    pub fn new(host: Arc<dyn ImageHost>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            host,
            notifier,
            backup: None,
            font: None,
        }
    }

    /// Storage that receives a copy of each successfully uploaded file.
    pub fn with_backup(mut self, storage: Arc<dyn BackupStorage>) -> Self {
        self.backup = Some(storage);
        self
    }

    /// Watermark font. Without one, the font is looked up on every watermarked upload.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Validate, process, upload and back up `file`, returning its public URL.
    pub async fn upload(&self, file: SourceFile, config: &UploadConfiguration) -> UploadResult {
        let file_name = file.name().to_string();
        let start = std::time::Instant::now();

        tracing::info!(
            file_name = %file_name,
            size = %format_file_size(file.byte_size()),
            mime_type = %file.mime_type(),
            "Starting image upload"
        );

        let result = self.run(file, config).await;
        let display_duration = Duration::from_secs(config.notification_duration);

        match &result {
            Ok(url) => {
                self.transition(UploadState::Success, &file_name);
                tracing::info!(
                    file_name = %file_name,
                    url = %url,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Image upload successful"
                );
                if config.show_success_notification {
                    self.notifier.notify(Notice::success(
                        format!("Uploaded {}", file_name),
                        display_duration,
                    ));
                }
            }
            Err(e) => {
                self.transition(UploadState::Failed, &file_name);
                match e.log_level() {
                    LogLevel::Debug => {
                        tracing::debug!(file_name = %file_name, error_code = e.error_code(), error = %e, "Image upload rejected")
                    }
                    LogLevel::Warn => {
                        tracing::warn!(
                            file_name = %file_name,
                            error_code = e.error_code(),
                            recoverable = e.is_recoverable(),
                            error = %e,
                            "Image upload failed"
                        )
                    }
                    LogLevel::Error => {
                        tracing::error!(
                            file_name = %file_name,
                            error_code = e.error_code(),
                            recoverable = e.is_recoverable(),
                            error = %e,
                            "Image upload failed"
                        )
                    }
                }
                if config.show_error_notification {
                    self.notifier
                        .notify(Notice::error(e.to_string(), display_duration));
                }
            }
        }

        result
    }

    async fn run(&self, file: SourceFile, config: &UploadConfiguration) -> UploadResult {
        self.transition(UploadState::Validating, file.name());
        FileValidator::validate(&file, config)?;

        if config.show_upload_progress {
            self.notifier
                .notify(Notice::info(format!("Uploading {}...", file.name())));
        }

        let file = self.process(file, config).await;

        self.transition(UploadState::Encoding, file.name());
        let query = UploadQuery::from_config(config);

        self.transition(UploadState::Transmitting, file.name());
        let body = self.host.upload(&query, &file).await?;

        self.transition(UploadState::Interpreting, file.name());
        let url = resolve_url(&body, &config.api_url, config.return_format)?;

        self.back_up(&file, config).await;

        Ok(url)
    }

    /// Run the enabled processing stages: watermark first, then compression.
    ///
    /// Never fails; a stage that errors hands back its input.
    pub async fn process(&self, file: SourceFile, config: &UploadConfiguration) -> SourceFile {
        let mut file = file;

        if config.enable_watermark {
            self.transition(UploadState::Watermarking, file.name());
            let outcome = self.watermark(file.clone(), config).await;
            file = self.settle("Watermark", outcome);
        }

        if config.enable_client_compress {
            self.transition(UploadState::Compressing, file.name());
            let outcome = Self::compress(file.clone(), config).await;
            file = self.settle("Compression", outcome);
        }

        file
    }

    async fn watermark(&self, file: SourceFile, config: &UploadConfiguration) -> StageOutcome {
        let font = self.font.clone();
        let font_path = config.watermark_font_path().map(String::from);
        let text = config.watermark_text.clone();
        let position = config.watermark_position;
        let font_px = config.watermark_size;
        let opacity = config.watermark_opacity;
        let fallback = file.clone();

        // Decode, font lookup and encode are blocking work.
        let task = tokio::task::spawn_blocking(move || {
            let font = font.or_else(|| discover_font(font_path.as_deref()));
            WatermarkStage::new(font).add_watermark(&file, &text, position, font_px, opacity)
        });

        task.await.unwrap_or_else(|e| StageOutcome::Recovered {
            file: fallback,
            error: ProcessingError::Task(e.to_string()),
        })
    }

    async fn compress(file: SourceFile, config: &UploadConfiguration) -> StageOutcome {
        let target_mb = config.target_size;
        let threshold_mb = config.compress_threshold;
        let fallback = file.clone();

        let task = tokio::task::spawn_blocking(move || {
            CompressionStage::compress_image(&file, target_mb, threshold_mb)
        });

        task.await.unwrap_or_else(|e| StageOutcome::Recovered {
            file: fallback,
            error: ProcessingError::Task(e.to_string()),
        })
    }

    fn settle(&self, stage: &str, outcome: StageOutcome) -> SourceFile {
        match outcome {
            StageOutcome::Skipped(file) => {
                tracing::debug!(stage, file_name = %file.name(), "Stage skipped");
                file
            }
            StageOutcome::Transformed(file) => {
                tracing::debug!(
                    stage,
                    file_name = %file.name(),
                    size = %format_file_size(file.byte_size()),
                    "Stage applied"
                );
                file
            }
            StageOutcome::Recovered { file, error } => {
                tracing::warn!(
                    stage,
                    file_name = %file.name(),
                    error = %error,
                    "Stage failed, continuing with unmodified file"
                );
                self.notifier.notify(Notice::warning(format!(
                    "{} failed, uploading the original image",
                    stage
                )));
                file
            }
        }
    }

    /// Write the uploaded bytes to `backupPath/<file name>`. Failures are only logged.
    async fn back_up(&self, file: &SourceFile, config: &UploadConfiguration) {
        if !config.enable_local_backup {
            return;
        }
        let Some(storage) = &self.backup else {
            tracing::debug!("Local backup enabled but no backup storage attached");
            return;
        };
        let Some(dir) = config.backup_path() else {
            tracing::warn!("Local backup enabled but backupPath is blank");
            return;
        };

        let name = file
            .name()
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        let path = join_path(dir, name);

        if let Err(e) = write_backup(storage.as_ref(), dir, &path, file).await {
            tracing::error!(path = %path, error = %e, "Local backup failed");
        }
    }

    fn transition(&self, state: UploadState, file_name: &str) {
        tracing::debug!(state = %state, file_name = %file_name, "Upload state changed");
    }
}

async fn write_backup(
    storage: &dyn BackupStorage,
    dir: &str,
    path: &str,
    file: &SourceFile,
) -> StorageResult<()> {
    storage.ensure_directory(dir).await?;
    storage.write_file(path, file.data().clone()).await
}
