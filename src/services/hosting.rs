use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::core::config::Config;
use crate::core::errors::UploadError;
use crate::core::types::UploadResult;
use crate::utils::metrics::Metrics;

/// Client for the image-hosting provider.
///
/// Performs a single multipart upload and extracts the public URL from the
/// provider's JSON envelope. Uploads are not retried; a failure here is
/// surfaced to the orchestrator immediately.
pub struct HostingClient {
    config: Arc<Config>,
    http_client: reqwest::Client,
    metrics: Option<Metrics>,
}

#[derive(Debug, Deserialize)]
struct HostingResponse {
    #[serde(default)]
    success: bool,
    data: Option<HostingData>,
}

#[derive(Debug, Deserialize)]
struct HostingData {
    url: String,
}

impl HostingClient {
    pub fn new(config: Arc<Config>, http_client: reqwest::Client, metrics: Option<Metrics>) -> Self {
        Self {
            config,
            http_client,
            metrics,
        }
    }

    /// Upload raw image bytes, returning the provider-assigned public URL.
    #[instrument(skip(self, image_bytes), fields(size = image_bytes.len(), filename = filename))]
    pub async fn upload(
        &self,
        image_bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadResult, UploadError> {
        let start = Instant::now();
        let result = self.upload_inner(image_bytes, filename).await;

        if let Some(ref m) = self.metrics {
            m.record_upload_call(result.is_ok(), start.elapsed());
        }
        result
    }

    async fn upload_inner(
        &self,
        image_bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadResult, UploadError> {
        let part = reqwest::multipart::Part::bytes(image_bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http_client
            .post(self.config.hosting_upload_url())
            .query(&[("key", self.config.hosting_api_key())])
            .multipart(form)
            .send()
            .await?;

        // The provider reports rejection through its success flag, not the
        // HTTP status, so the envelope is parsed unconditionally.
        let payload: HostingResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        match payload {
            HostingResponse {
                success: true,
                data: Some(data),
            } => {
                debug!("Upload accepted, public URL: {}", data.url);
                Ok(UploadResult {
                    public_url: data.url,
                })
            }
            _ => Err(UploadError::Rejected),
        }
    }
}
