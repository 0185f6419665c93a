//! Upload pipeline: validate → watermark → compress → transmit → interpret → back up.

pub mod notify;
pub mod pipeline;

pub use notify::{Notice, NoticeLevel, Notifier, NullNotifier, PROCESSING_WARNING_DURATION};
pub use pipeline::{UploadPipeline, UploadState};
