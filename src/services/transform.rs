use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::core::config::Config;
use crate::core::errors::TransformError;
use crate::core::types::ResultReference;
use crate::utils::metrics::Metrics;

/// Client for the AI transformation provider.
///
/// Sends prompt and public image URL as query parameters and returns the
/// response body as a result reference. The provider answers with either a
/// URL string or raw image bytes; neither shape is assumed. A single call
/// represents one attempt; retrying is the caller's concern.
pub struct TransformClient {
    config: Arc<Config>,
    http_client: reqwest::Client,
    metrics: Option<Metrics>,
}

impl TransformClient {
    pub fn new(config: Arc<Config>, http_client: reqwest::Client, metrics: Option<Metrics>) -> Self {
        Self {
            config,
            http_client,
            metrics,
        }
    }

    /// Request a transformation of an already-hosted image.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn transform(
        &self,
        prompt: &str,
        public_url: &str,
    ) -> Result<ResultReference, TransformError> {
        let start = Instant::now();
        let result = self.transform_inner(prompt, public_url).await;

        if let Some(ref m) = self.metrics {
            m.record_transform_call(result.is_ok(), start.elapsed());
        }
        result
    }

    async fn transform_inner(
        &self,
        prompt: &str,
        public_url: &str,
    ) -> Result<ResultReference, TransformError> {
        let response = self
            .http_client
            .get(self.config.transform_url())
            .query(&[("prompt", prompt), ("imageUrl", public_url)])
            .timeout(Duration::from_secs(self.config.transform_timeout_seconds()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(TransformError::EmptyBody);
        }

        let reference = ResultReference::from_body(body.to_vec());
        debug!(
            "Transform result: {} ({} bytes)",
            match &reference {
                ResultReference::Url(_) => "url",
                ResultReference::Bytes(_) => "bytes",
            },
            reference.len()
        );
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{HostingConfig, ServerConfig, TransformConfig};
    use tracing::Level;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(endpoint: String) -> Arc<Config> {
        Arc::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                log_level: Level::INFO,
            },
            hosting: HostingConfig {
                upload_url: "http://unused.invalid".to_string(),
                api_key: "test-key".to_string(),
            },
            transform: TransformConfig {
                endpoint,
                timeout_seconds: 5,
                max_attempts: 1,
            },
        })
    }

    #[tokio::test]
    async fn url_body_is_returned_as_url_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img2img"))
            .and(query_param("prompt", "cyberpunk city"))
            .and(query_param("imageUrl", "https://i.ibb.co/abc123/x.png"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("https://cdn.example/result.png"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(format!("{}/img2img", server.uri()));
        let client = TransformClient::new(config, reqwest::Client::new(), None);

        let reference = client
            .transform("cyberpunk city", "https://i.ibb.co/abc123/x.png")
            .await
            .unwrap();
        assert_eq!(reference.as_url(), Some("https://cdn.example/result.png"));
    }

    #[tokio::test]
    async fn binary_body_is_returned_as_bytes_reference() {
        let payload = vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0x01];
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let config = config_for(format!("{}/img2img", server.uri()));
        let client = TransformClient::new(config, reqwest::Client::new(), None);

        let reference = client.transform("p", "https://a.example/x.png").await.unwrap();
        assert_eq!(reference, ResultReference::Bytes(payload));
    }

    #[tokio::test]
    async fn non_2xx_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let config = config_for(format!("{}/img2img", server.uri()));
        let client = TransformClient::new(config, reqwest::Client::new(), None);

        let err = client.transform("p", "https://a.example/x.png").await.unwrap_err();
        match err {
            TransformError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = config_for(format!("{}/img2img", server.uri()));
        let client = TransformClient::new(config, reqwest::Client::new(), None);

        let err = client.transform("p", "https://a.example/x.png").await.unwrap_err();
        assert!(matches!(err, TransformError::EmptyBody));
    }
}
