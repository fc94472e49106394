// Transform cycle orchestrator: sequences the hosting upload and the
// retry-wrapped transformation call for one user submission.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::core::config::Config;
use crate::core::errors::{CycleError, TransformError};
use crate::core::types::{CycleOutcome, CyclePhase, ResultReference};
use crate::middleware::retry::with_retry;
use crate::services::hosting::HostingClient;
use crate::services::transform::TransformClient;
use crate::utils::image_ops::validate_image_payload;
use crate::utils::metrics::Metrics;

/// Per-cycle state machine. Constructed fresh for every submission, so a
/// new cycle never observes leftovers from a previous one.
struct CycleState {
    phase: CyclePhase,
}

impl CycleState {
    fn new() -> Self {
        Self {
            phase: CyclePhase::Idle,
        }
    }

    fn advance(&mut self, next: CyclePhase) {
        debug!(from = ?self.phase, to = ?next, "Cycle transition");
        self.phase = next;
    }

    // Validation failures never leave Idle.
    fn validation_failure(self, message: &str) -> CycleOutcome {
        CycleOutcome {
            phase: CyclePhase::Idle,
            result: None,
            error: Some(CycleError::Validation {
                message: message.to_string(),
            }),
        }
    }

    fn failure(mut self, error: CycleError) -> CycleOutcome {
        self.advance(CyclePhase::Failed);
        CycleOutcome {
            phase: CyclePhase::Failed,
            result: None,
            error: Some(error),
        }
    }

    fn success(mut self, reference: ResultReference) -> CycleOutcome {
        self.advance(CyclePhase::Succeeded);
        CycleOutcome {
            phase: CyclePhase::Succeeded,
            result: Some(reference),
            error: None,
        }
    }
}

/// Orchestrates one full transformation cycle: upload to the hosting
/// provider, then transform via the AI provider with bounded retry.
/// Uploads are deliberately not retried; only the transform step is.
pub struct TransformOrchestrator {
    config: Arc<Config>,
    hosting: HostingClient,
    transform: TransformClient,
    metrics: Option<Metrics>,
}

impl TransformOrchestrator {
    pub fn new(config: Arc<Config>, metrics: Option<Metrics>) -> Result<Self> {
        // Shared client with connection pooling. The transform call narrows
        // the request timeout at its call site.
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            hosting: HostingClient::new(config.clone(), http_client.clone(), metrics.clone()),
            transform: TransformClient::new(config.clone(), http_client, metrics.clone()),
            config,
            metrics,
        })
    }

    /// Transform an already-hosted image, with bounded backoff retry.
    /// This is the proxy path: the upload happened client-side.
    pub async fn transform_hosted(
        &self,
        prompt: &str,
        image_url: &str,
    ) -> Result<ResultReference, TransformError> {
        with_retry(self.config.max_retry_attempts(), || {
            self.transform.transform(prompt, image_url)
        })
        .await
    }

    /// Run one full cycle from raw image bytes. Each call owns fresh state.
    #[instrument(skip(self, prompt, image_bytes), fields(size = image_bytes.len()))]
    pub async fn run_cycle(
        &self,
        prompt: &str,
        image_bytes: Vec<u8>,
        filename: &str,
    ) -> CycleOutcome {
        let state = CycleState::new();

        // Guard: both inputs must be present before any network call.
        if image_bytes.is_empty() {
            self.record_validation_rejection();
            return state.validation_failure("Please select an image file first.");
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.record_validation_rejection();
            return state.validation_failure("Please enter a transformation prompt.");
        }

        if let Some(ref m) = self.metrics {
            m.record_cycle_started();
        }
        let mut state = state;

        state.advance(CyclePhase::Uploading);
        info!("1/2: Uploading image to hosting provider");
        let upload = match self.hosting.upload(image_bytes, filename).await {
            Ok(result) => result,
            Err(err) => {
                warn!("Upload failed: {}", err);
                self.record_cycle_failed();
                return state.failure(CycleError::Upload(err));
            }
        };
        info!("Upload complete: {}", upload.public_url);

        state.advance(CyclePhase::Transforming);
        info!("2/2: Requesting AI transformation");
        let reference = match self.transform_hosted(prompt, &upload.public_url).await {
            Ok(reference) => reference,
            Err(err) => {
                warn!("Transformation failed: {}", err);
                self.record_cycle_failed();
                return state.failure(CycleError::Transform(err));
            }
        };

        // Byte payloads are checked before being offered as image data;
        // URL references pass through untouched.
        if let ResultReference::Bytes(bytes) = &reference {
            if let Err(err) = validate_image_payload(bytes) {
                warn!("Result payload rejected: {}", err);
                self.record_cycle_failed();
                return state.failure(CycleError::Payload(err));
            }
        }

        if let Some(ref m) = self.metrics {
            m.record_cycle_succeeded();
        }
        info!("Transformation completed ({} bytes)", reference.len());
        state.success(reference)
    }

    fn record_cycle_failed(&self) {
        if let Some(ref m) = self.metrics {
            m.record_cycle_failed();
        }
    }

    fn record_validation_rejection(&self) {
        if let Some(ref m) = self.metrics {
            m.record_validation_rejection();
        }
    }
}
