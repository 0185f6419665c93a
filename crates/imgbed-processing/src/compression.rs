//! Size-targeted client-side compression.

use image::imageops::FilterType;
use image::GenericImageView;

use imgbed_core::models::format_file_size;
use imgbed_core::SourceFile;

use crate::error::ProcessingError;
use crate::image::{is_compressible, ImageMediaType, Raster, SizeCalculator};
use crate::stage::StageOutcome;

/// Re-encode quality for compressed images.
pub const COMPRESSION_QUALITY: f32 = 0.8;

/// Downscales large images and re-encodes them as JPEG.
pub struct CompressionStage;

impl CompressionStage {
    /// Compress `file` toward `target_mb` when it is larger than `threshold_mb`.
    ///
    /// Output is always `image/jpeg`, whatever the input format; the name is kept.
    pub fn compress_image(file: &SourceFile, target_mb: f64, threshold_mb: f64) -> StageOutcome {
        let current_mb = file.size_mb();
        if current_mb <= threshold_mb {
            return StageOutcome::Skipped(file.clone());
        }
        if !is_compressible(file.mime_type()) {
            return StageOutcome::Skipped(file.clone());
        }

        match Self::resample(file, target_mb, current_mb) {
            Ok(data) => {
                let compressed = file.with_contents(ImageMediaType::Jpeg.mime(), data);
                tracing::info!(
                    file_name = %file.name(),
                    original_size = %format_file_size(file.byte_size()),
                    compressed_size = %format_file_size(compressed.byte_size()),
                    "Image compressed"
                );
                StageOutcome::Transformed(compressed)
            }
            Err(error) => StageOutcome::Recovered {
                file: file.clone(),
                error,
            },
        }
    }

    fn resample(
        file: &SourceFile,
        target_mb: f64,
        current_mb: f64,
    ) -> Result<Vec<u8>, ProcessingError> {
        let img = Raster::decode(file.data())?;
        let (width, height) = img.dimensions();
        let (new_width, new_height) =
            SizeCalculator::compute_dimensions(width, height, target_mb, current_mb);

        tracing::debug!(
            width,
            height,
            new_width,
            new_height,
            "Resampling image for compression"
        );

        let resized = if (new_width, new_height) == (width, height) {
            img
        } else {
            img.resize_exact(new_width, new_height, FilterType::Triangle)
        };

        Raster::encode(&resized, ImageMediaType::Jpeg, COMPRESSION_QUALITY)
    }
}
