// Library exports for the image transformation service

pub mod core;
pub mod middleware;
pub mod orchestration;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions
pub use self::core::{
    config::Config,
    errors::{ConfigError, CycleError, PayloadError, TransformError, UploadError},
    types::{CycleOutcome, CyclePhase, ResultReference, TransformRequest, UploadResult},
};

pub use middleware::with_retry;

pub use orchestration::TransformOrchestrator;

pub use server::{router, AppState};

pub use services::{HostingClient, TransformClient};

pub use utils::{validate_image_payload, Metrics};
