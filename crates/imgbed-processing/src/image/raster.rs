//! Decode and encode image payloads.

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::ProcessingError;

/// Media types the processing stages can re-encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Webp,
}

impl ImageMediaType {
    /// `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageMediaType::Jpeg),
            "image/png" => Some(ImageMediaType::Png),
            "image/webp" => Some(ImageMediaType::Webp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Webp => "image/webp",
        }
    }
}

pub fn is_watermarkable(mime: &str) -> bool {
    ImageMediaType::from_mime(mime).is_some()
}

pub fn is_compressible(mime: &str) -> bool {
    ImageMediaType::from_mime(mime).is_some()
}

/// Codec over the `image` crate, mozjpeg and libwebp.
pub struct Raster;

impl Raster {
    /// Decode any supported image, guessing the format from its magic bytes.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))
    }

    /// Encode `img` as `media_type`. `quality` is in `0.0..=1.0` and ignored for PNG.
    pub fn encode(
        img: &DynamicImage,
        media_type: ImageMediaType,
        quality: f32,
    ) -> Result<Vec<u8>, ProcessingError> {
        let quality = (quality.clamp(0.0, 1.0) * 100.0).round();
        let encoded = match media_type {
            ImageMediaType::Jpeg => Self::encode_jpeg(img, quality),
            ImageMediaType::Png => Self::encode_png(img),
            ImageMediaType::Webp => Self::encode_webp(img, quality),
        };
        encoded.map_err(|e| ProcessingError::Encode(format!("{:#}", e)))
    }

    fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        // JPEG has no alpha; channels are flattened.
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality);
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .context("Failed to start JPEG compression")?;
        comp.write_scanlines(&rgb_img)
            .context("Failed to write JPEG scanlines")?;
        let jpeg_data = comp.finish().context("Failed to finish JPEG compression")?;

        Ok(jpeg_data)
    }

    fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .context("Failed to write PNG")?;
        Ok(buffer)
    }

    fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        let webp_data = if img.color().has_alpha() {
            let rgba_img = img.to_rgba8();
            let (width, height) = rgba_img.dimensions();
            webp::Encoder::from_rgba(&rgba_img, width, height).encode(quality)
        } else {
            let rgb_img = img.to_rgb8();
            let (width, height) = rgb_img.dimensions();
            webp::Encoder::from_rgb(&rgb_img, width, height).encode(quality)
        };

        Ok(webp_data.to_vec())
    }
}
