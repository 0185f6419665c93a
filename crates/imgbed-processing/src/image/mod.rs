pub mod font;
pub mod raster;
pub mod sizing;
pub mod watermark;

pub use font::{discover_font, load_font};
pub use raster::{is_compressible, is_watermarkable, ImageMediaType, Raster};
pub use sizing::SizeCalculator;
pub use watermark::{WatermarkStage, WATERMARK_QUALITY};
