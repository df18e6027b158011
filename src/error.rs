use thiserror::Error;

#[derive(Error, Debug)]
pub enum PiiLensError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Failed to write image: {0}")]
    ImageWrite(String),

    #[error(transparent)]
    Service(#[from] pii_lens_common::Error),

    #[error("Processing failed: {0}")]
    ApiCall(String),

    #[error("Detection index {index} out of range ({count} detections)")]
    InvalidDetectionIndex { index: usize, count: usize },

    #[error("Detection file has no detection list: {0}")]
    InvalidDetections(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PiiLensError>;
