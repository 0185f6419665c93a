//! Client-side image processing and the upload pipeline.
//!
//! Images are validated, optionally watermarked and compressed, then handed to an
//! [`ImageHost`](imgbed_api_client::ImageHost). Processing stages never fail an
//! upload: on error they report a [`ProcessingError`] and the previous file
//! continues down the pipeline.

pub mod compression;
pub mod error;
pub mod image;
pub mod stage;
pub mod upload;
pub mod validator;

pub use compression::CompressionStage;
pub use error::ProcessingError;
pub use crate::image::{
    discover_font, is_compressible, is_watermarkable, load_font, ImageMediaType, Raster,
    SizeCalculator, WatermarkStage,
};
pub use stage::StageOutcome;
pub use upload::{Notice, NoticeLevel, Notifier, NullNotifier, UploadPipeline, UploadState};
pub use validator::FileValidator;
