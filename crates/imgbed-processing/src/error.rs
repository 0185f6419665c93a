/// A processing stage failure.
///
/// Always recovered inside the pipeline: the stage logs it, a warning notice is
/// shown and the unmodified file keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("No watermark font available")]
    FontUnavailable,

    #[error("Failed to load font {path}: {message}")]
    Font { path: String, message: String },

    #[error("Processing task failed: {0}")]
    Task(String),
}
