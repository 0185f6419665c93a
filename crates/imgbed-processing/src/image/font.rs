//! Watermark font lookup.

use ab_glyph::FontArc;
use std::path::Path;

use crate::error::ProcessingError;

/// Bold sans-serif faces tried when no font path is configured, in order.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: impl AsRef<Path>) -> Result<FontArc, ProcessingError> {
    let path = path.as_ref();
    let font_error = |message: String| ProcessingError::Font {
        path: path.display().to_string(),
        message,
    };

    let data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
    FontArc::try_from_vec(data).map_err(|e| font_error(e.to_string()))
}

/// The configured font when it loads, otherwise the first available system font.
pub fn discover_font(configured: Option<&str>) -> Option<FontArc> {
    if let Some(path) = configured {
        match load_font(path) {
            Ok(font) => return Some(font),
            Err(e) => {
                tracing::warn!(error = %e, "Configured watermark font unusable, probing system fonts");
            }
        }
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .filter(|path| path.is_file())
        .find_map(|path| match load_font(path) {
            Ok(font) => {
                tracing::debug!(path = %path.display(), "Using system watermark font");
                Some(font)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Skipping system font");
                None
            }
        })
}
