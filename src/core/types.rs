// Request-scoped types for the transformation pipeline
//
// Nothing here outlives a single user-initiated cycle; there is no shared
// mutable state across requests.

use serde::{Deserialize, Serialize};

use crate::core::errors::CycleError;

/// Inbound body for the transform proxy endpoint.
///
/// Missing fields deserialize to empty strings so validation can answer
/// with the fixed message instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_url: String,
}

/// Successful hosting-provider upload.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub public_url: String,
}

/// What the transformation provider handed back: either a URL pointing at
/// the transformed image, or the raw transformed bytes. Callers must
/// handle both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultReference {
    Url(String),
    Bytes(Vec<u8>),
}

impl ResultReference {
    /// Sniff a non-empty response body. A body that is UTF-8 text forming a
    /// single http(s) URL becomes `Url`; anything else is raw bytes.
    pub fn from_body(body: Vec<u8>) -> Self {
        if let Ok(text) = std::str::from_utf8(&body) {
            let trimmed = text.trim();
            if (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
                && !trimmed.contains(char::is_whitespace)
            {
                return ResultReference::Url(trimmed.to_string());
            }
        }
        ResultReference::Bytes(body)
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            ResultReference::Url(url) => Some(url),
            ResultReference::Bytes(_) => None,
        }
    }

    /// Text rendition of the reference, as the proxy endpoint reports it.
    pub fn into_text(self) -> String {
        match self {
            ResultReference::Url(url) => url,
            ResultReference::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultReference::Url(url) => url.len(),
            ResultReference::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Phases of one transformation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Idle,
    Uploading,
    Transforming,
    Succeeded,
    Failed,
}

/// Terminal state of a cycle, handed to the serving layer so it can render
/// progress and bind the download action without ambient globals.
#[derive(Debug)]
pub struct CycleOutcome {
    pub phase: CyclePhase,
    pub result: Option<ResultReference>,
    pub error: Option<CycleError>,
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        self.phase == CyclePhase::Succeeded
    }
}
