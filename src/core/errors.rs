// Custom error types for better error handling and debugging
//
// Using thiserror for ergonomic error definitions with:
// - Context preservation
// - Type-safe error matching
// - Source error chaining

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Hosting upload URL must not be empty")]
    MissingHostingUrl,

    #[error("Hosting API key must not be empty")]
    MissingApiKey,

    #[error("Transform endpoint URL must not be empty")]
    MissingTransformUrl,

    #[error("Transform timeout must be >= 1 second, got {0}")]
    InvalidTimeout(u64),

    #[error("Retry attempts must be >= 1, got {0}")]
    InvalidRetryAttempts(u32),
}

/// Hosting-provider upload errors. Uploads are not retried.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Hosting provider rejected the upload")]
    Rejected,

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid hosting provider response: {0}")]
    InvalidResponse(String),
}

/// Transformation-provider errors. Surfaced after retry exhaustion.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Transform request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transform API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Empty response from transformation API")]
    EmptyBody,
}

/// Result payload validation errors, surfaced post-hoc when a byte payload
/// is about to be treated as image data.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Result payload is empty")]
    Empty,

    #[error("Result payload is not a decodable image: {0}")]
    Undecodable(#[from] image::ImageError),
}

/// Cycle-level errors: the orchestrator is the single point that converts
/// these into user-visible messages.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Transformation failed: {0}")]
    Transform(#[from] TransformError),

    #[error("{0}")]
    Payload(#[from] PayloadError),
}
