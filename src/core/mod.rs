pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::Config;
pub use errors::{ConfigError, CycleError, PayloadError, TransformError, UploadError};
pub use types::{CycleOutcome, CyclePhase, ResultReference, TransformRequest, UploadResult};
