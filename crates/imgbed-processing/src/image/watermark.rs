use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use imgbed_core::{SourceFile, WatermarkPosition};

use super::raster::{is_watermarkable, ImageMediaType, Raster};
use crate::error::ProcessingError;
use crate::stage::StageOutcome;

/// Re-encode quality for watermarked images.
pub const WATERMARK_QUALITY: f32 = 0.9;

/// Estimated glyph width as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.6;

const FILL_COLOR: [u8; 3] = [255, 255, 255];
const OUTLINE_COLOR: [u8; 3] = [0, 0, 0];

// A 2px stroke centred on the glyph edges reaches one pixel outward.
const OUTLINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Draws a bold text watermark with a dark outline.
#[derive(Clone, Default)]
pub struct WatermarkStage {
    font: Option<FontArc>,
}

impl WatermarkStage {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    /// Watermark `file`, keeping its name and media type.
    ///
    /// Skipped for blank text and for media types other than JPEG, PNG and WebP.
    pub fn add_watermark(
        &self,
        file: &SourceFile,
        text: &str,
        position: WatermarkPosition,
        font_px: f32,
        opacity: f32,
    ) -> StageOutcome {
        if text.trim().is_empty() {
            return StageOutcome::Skipped(file.clone());
        }
        if !is_watermarkable(file.mime_type()) {
            return StageOutcome::Skipped(file.clone());
        }

        match self.render(file, text, position, font_px, opacity) {
            Ok(data) => StageOutcome::Transformed(file.with_contents(file.mime_type(), data)),
            Err(error) => StageOutcome::Recovered {
                file: file.clone(),
                error,
            },
        }
    }

    fn render(
        &self,
        file: &SourceFile,
        text: &str,
        position: WatermarkPosition,
        font_px: f32,
        opacity: f32,
    ) -> Result<Vec<u8>, ProcessingError> {
        let media_type = ImageMediaType::from_mime(file.mime_type()).ok_or_else(|| {
            ProcessingError::Encode(format!("unsupported media type {}", file.mime_type()))
        })?;
        let font = self.font.as_ref().ok_or(ProcessingError::FontUnavailable)?;
        let img = Raster::decode(file.data())?;

        let mut canvas = img.to_rgba8();
        draw_watermark(&mut canvas, font, text, position, font_px, opacity);

        let output = restore_color_type(img.color().has_alpha(), canvas);
        Raster::encode(&output, media_type, WATERMARK_QUALITY)
    }
}

/// Drop the alpha channel again when the source image had none.
fn restore_color_type(had_alpha: bool, canvas: RgbaImage) -> DynamicImage {
    let canvas = DynamicImage::ImageRgba8(canvas);
    if had_alpha {
        canvas
    } else {
        DynamicImage::ImageRgb8(canvas.to_rgb8())
    }
}

/// Centre point of the watermark text for an image of `width` x `height`.
///
/// Padding from the edges equals the font size; the text box is estimated as
/// `chars * font_px * 0.6` wide and `font_px` tall.
pub fn anchor(
    width: u32,
    height: u32,
    position: WatermarkPosition,
    font_px: f32,
    text: &str,
) -> (f32, f32) {
    let padding = font_px;
    let text_width = text.chars().count() as f32 * font_px * CHAR_WIDTH_FACTOR;
    let text_height = font_px;
    let (width, height) = (width as f32, height as f32);

    let left = padding + text_width / 2.0;
    let right = width - padding - text_width / 2.0;
    let top = padding + text_height / 2.0;
    let bottom = height - padding - text_height / 2.0;

    match position {
        WatermarkPosition::TopLeft => (left, top),
        WatermarkPosition::TopRight => (right, top),
        WatermarkPosition::BottomLeft => (left, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
        WatermarkPosition::Center => (width / 2.0, height / 2.0),
    }
}

/// Draw `text` centred on its anchor: black outline at half opacity, white fill on top.
pub fn draw_watermark(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    position: WatermarkPosition,
    font_px: f32,
    opacity: f32,
) {
    let scale = PxScale::from(font_px);
    let opacity = opacity.clamp(0.0, 1.0);
    let (text_width, text_height) = text_size(scale, font, text);
    let (anchor_x, anchor_y) = anchor(canvas.width(), canvas.height(), position, font_px, text);

    let x = (anchor_x - text_width as f32 / 2.0).round() as i32;
    let y = (anchor_y - text_height as f32 / 2.0).round() as i32;

    // Masks only cover the text box plus room for overhanging glyphs and the stroke.
    let margin = (font_px / 4.0).ceil() as u32 + 2;
    let mask_width = text_width + margin * 2;
    let mask_height = text_height + margin * 2;
    let inset = margin as i32;
    let origin = (x - inset, y - inset);

    let mut outline = GrayImage::new(mask_width, mask_height);
    for (dx, dy) in OUTLINE_OFFSETS {
        draw_text_mut(&mut outline, Luma([255u8]), inset + dx, inset + dy, scale, font, text);
    }

    let mut fill = GrayImage::new(mask_width, mask_height);
    draw_text_mut(&mut fill, Luma([255u8]), inset, inset, scale, font, text);

    blend_mask(canvas, &outline, origin, OUTLINE_COLOR, opacity * 0.5);
    blend_mask(canvas, &fill, origin, FILL_COLOR, opacity);
}

/// Source-over composite of a solid colour through a coverage mask placed at `origin`.
fn blend_mask(
    canvas: &mut RgbaImage,
    mask: &GrayImage,
    origin: (i32, i32),
    color: [u8; 3],
    opacity: f32,
) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);

    for (mx, my, coverage) in mask.enumerate_pixels() {
        let alpha = coverage[0] as f32 / 255.0 * opacity;
        if alpha <= 0.0 {
            continue;
        }

        let cx = origin.0 + mx as i32;
        let cy = origin.1 + my as i32;
        if cx < 0 || cy < 0 || cx >= width || cy >= height {
            continue;
        }

        let pixel = canvas.get_pixel_mut(cx as u32, cy as u32);
        for (channel, value) in color.iter().enumerate() {
            pixel[channel] =
                (pixel[channel] as f32 * (1.0 - alpha) + *value as f32 * alpha).round() as u8;
        }
        pixel[3] = (pixel[3] as f32 + (255.0 - pixel[3] as f32) * alpha).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::font::discover_font;
    use image::{ColorType, GenericImageView, Rgb, RgbImage, Rgba};

    fn png_file(width: u32, height: u32) -> SourceFile {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([90, 120, 150, 255]),
        ));
        let data = Raster::encode(&img, ImageMediaType::Png, 1.0).unwrap();
        SourceFile::new("photo.png", "image/png", data)
    }

    fn rgb_png_file(width: u32, height: u32) -> SourceFile {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 150])));
        let data = Raster::encode(&img, ImageMediaType::Png, 1.0).unwrap();
        SourceFile::new("photo.png", "image/png", data)
    }

    fn approx(actual: (f32, f32), expected: (f32, f32)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-3 && (actual.1 - expected.1).abs() < 1e-3,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_anchor_positions() {
        // text box 4 * 24 * 0.6 = 57.6 wide, 24 tall, padding 24
        let at = |position| anchor(1000, 800, position, 24.0, "abcd");
        approx(at(WatermarkPosition::TopLeft), (52.8, 36.0));
        approx(at(WatermarkPosition::TopRight), (947.2, 36.0));
        approx(at(WatermarkPosition::BottomLeft), (52.8, 764.0));
        approx(at(WatermarkPosition::BottomRight), (947.2, 764.0));
        approx(at(WatermarkPosition::Center), (500.0, 400.0));
    }

    #[test]
    fn test_unknown_position_uses_bottom_right() {
        let position = WatermarkPosition::parse("somewhere");
        assert_eq!(
            anchor(1000, 800, position, 24.0, "abcd"),
            anchor(1000, 800, WatermarkPosition::BottomRight, 24.0, "abcd")
        );
    }

    #[test]
    fn test_blank_text_is_skipped() {
        let file = png_file(50, 50);
        let stage = WatermarkStage::new(None);

        for text in ["", "   ", "\t\n"] {
            let outcome =
                stage.add_watermark(&file, text, WatermarkPosition::BottomRight, 24.0, 0.7);
            assert!(matches!(outcome, StageOutcome::Skipped(_)));
            assert_eq!(outcome.into_file(), file);
        }
    }

    #[test]
    fn test_unsupported_type_is_skipped() {
        let file = SourceFile::new("anim.gif", "image/gif", b"GIF89a".to_vec());
        let outcome = WatermarkStage::new(None).add_watermark(
            &file,
            "(c) me",
            WatermarkPosition::Center,
            24.0,
            0.7,
        );
        assert!(matches!(outcome, StageOutcome::Skipped(_)));
    }

    #[test]
    fn test_missing_font_recovers_with_original() {
        let file = png_file(50, 50);
        let outcome = WatermarkStage::new(None).add_watermark(
            &file,
            "(c) me",
            WatermarkPosition::BottomRight,
            24.0,
            0.7,
        );
        assert!(matches!(outcome.error(), Some(ProcessingError::FontUnavailable)));
        assert_eq!(outcome.into_file(), file);
    }

    #[test]
    fn test_blend_mask_source_over() {
        let mut canvas = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        let mask = GrayImage::from_pixel(1, 1, Luma([255]));

        blend_mask(&mut canvas, &mask, (1, 0), [0, 0, 0], 0.5);

        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(1, 0), &Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_blend_mask_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]));
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));

        blend_mask(&mut canvas, &mask, (-3, -3), [200, 200, 200], 1.0);

        assert_eq!(canvas.get_pixel(0, 0), &Rgba([200, 200, 200, 255]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn test_opaque_source_stays_rgb() {
        let canvas = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));

        let restored = restore_color_type(false, canvas.clone());
        assert_eq!(restored.color(), ColorType::Rgb8);
        assert_eq!(restored.to_rgb8().get_pixel(2, 1), &Rgb([10, 20, 30]));

        let kept = restore_color_type(true, canvas);
        assert_eq!(kept.color(), ColorType::Rgba8);
    }

    #[test]
    fn test_rgb_png_keeps_color_type() {
        let font = discover_font(None).expect("a bold sans-serif system font is required");
        let file = rgb_png_file(200, 100);
        assert_eq!(Raster::decode(file.data()).unwrap().color(), ColorType::Rgb8);

        let outcome = WatermarkStage::new(Some(font)).add_watermark(
            &file,
            "imgbed",
            WatermarkPosition::Center,
            24.0,
            1.0,
        );
        assert!(outcome.is_transformed());

        let decoded = Raster::decode(outcome.into_file().data()).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!(decoded.dimensions(), (200, 100));
    }

    #[test]
    fn test_renders_with_system_font() {
        let font = discover_font(None).expect("a bold sans-serif system font is required");

        let file = png_file(400, 200);
        let outcome = WatermarkStage::new(Some(font)).add_watermark(
            &file,
            "imgbed",
            WatermarkPosition::BottomRight,
            32.0,
            1.0,
        );
        assert!(outcome.is_transformed());

        let watermarked = outcome.into_file();
        assert_eq!(watermarked.name(), "photo.png");
        assert_eq!(watermarked.mime_type(), "image/png");

        let decoded = Raster::decode(watermarked.data()).unwrap();
        assert_eq!(decoded.dimensions(), (400, 200));

        let rgba = decoded.to_rgba8();
        let background = Rgba([90, 120, 150, 255]);
        let changed_bottom_right = rgba
            .enumerate_pixels()
            .filter(|(x, y, p)| *x >= 200 && *y >= 100 && **p != background)
            .count();
        let changed_top_left = rgba
            .enumerate_pixels()
            .filter(|(x, y, p)| *x < 100 && *y < 50 && **p != background)
            .count();
        assert!(changed_bottom_right > 0);
        assert_eq!(changed_top_left, 0);
    }
}
