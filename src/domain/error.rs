use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not a recognizable YouTube URL or video ID")]
    InvalidInput,

    #[error("Video lookup failed: {0}")]
    Provider(String),

    #[error("No suitable video or audio stream is available")]
    StreamsUnavailable,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Could not decode thumbnail image")]
    ThumbnailDecode,

    #[error("Merge failed: {0}")]
    Merge(String),
}
