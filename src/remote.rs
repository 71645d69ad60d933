//! Client for the extraction service's two endpoints.
//!
//! * `POST /api/upload`: multipart form with a single `file` part.
//! * `POST /api/extract`: JSON body naming a previously uploaded asset.

use crate::media::MediaDescriptor;
use crate::roi::Rectangle;
use crate::workflow::{Operation, SelectedFile};
use anyhow::Context;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// Server-assigned name of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadHandle(String);

impl UploadHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub handle: UploadHandle,
    pub media: MediaDescriptor,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    filename: String,
    duration: f64,
    width: u32,
    height: u32,
}

/// ROI as sent on the wire: whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoiBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl From<Rectangle> for RoiBox {
    fn from(rect: Rectangle) -> Self {
        let (x, y, width, height) = rect.rounded();
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractRequest {
    #[serde(rename = "filename")]
    pub asset_handle: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(rename = "frame_interval")]
    pub sampling_interval_seconds: f64,
    pub roi: RoiBox,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "success")]
    pub succeeded: bool,
    #[serde(rename = "srt_content", default)]
    pub text_payload: Option<String>,
    #[serde(rename = "processing_time", default)]
    pub elapsed_seconds: Option<f64>,
    #[serde(rename = "error", default)]
    pub failure_reason: Option<String>,
}

impl ExtractionResult {
    /// The subtitle text, or `None` when nothing was extracted.
    pub fn subtitles(&self) -> Option<&str> {
        self.text_payload.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// A remote call failed. `reason` is meant to be shown to the user as is.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub operation: Operation,
    pub reason: String,
}

impl RemoteError {
    pub fn new(operation: Operation, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for RemoteError {}

/// The collaborator service. Calls block; callers run them off the UI thread.
pub trait RemoteService: Send + Sync {
    fn upload(&self, file: &SelectedFile) -> Result<UploadReceipt, RemoteError>;
    fn extract(&self, request: &ExtractRequest) -> Result<ExtractionResult, RemoteError>;
}

const UPLOAD_FAILED: &str = "Upload failed";
const EXTRACT_FAILED: &str = "Extraction failed";

pub struct HttpRemote {
    client: Client,
    base: Url,
}

impl HttpRemote {
    pub fn new(api_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("subtitle-extractor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base: normalize_base(api_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        // `path` is a fixed relative path, joining onto a parsed base cannot fail.
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}

/// Parse the configured API URL so relative endpoint joins append to it.
pub fn normalize_base(api_url: &str) -> anyhow::Result<Url> {
    let mut url =
        Url::parse(api_url.trim()).with_context(|| format!("invalid API url '{api_url}'"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Human readable reason for a non-success response. FastAPI style
/// `{"detail": ...}` bodies are preferred over the bare status.
fn failure_reason(resp: Response, fallback: &str) -> String {
    let status = resp.status();
    let detail = resp
        .json::<ErrorBody>()
        .ok()
        .and_then(|body| match body.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });
    detail.unwrap_or_else(|| format!("{fallback} (HTTP {})", status.as_u16()))
}

impl RemoteService for HttpRemote {
    fn upload(&self, file: &SelectedFile) -> Result<UploadReceipt, RemoteError> {
        let fail = |reason: String| RemoteError::new(Operation::Upload, reason);
        let started = Instant::now();

        let part = Part::file(&file.path)
            .map_err(|e| fail(format!("{UPLOAD_FAILED}: cannot read {}: {e}", file.name)))?
            .file_name(file.name.clone())
            .mime_str(file.mime)
            .map_err(|e| fail(format!("{UPLOAD_FAILED}: {e}")))?;
        let form = Form::new().part("file", part);

        let url = self.endpoint("api/upload");
        tracing::info!(%url, file = %file.name, "uploading video");
        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|e| fail(format!("{UPLOAD_FAILED}: {e}")))?;
        if !resp.status().is_success() {
            return Err(fail(failure_reason(resp, UPLOAD_FAILED)));
        }
        let body: UploadResponse = resp
            .json()
            .map_err(|e| fail(format!("{UPLOAD_FAILED}: unexpected response: {e}")))?;
        let media = MediaDescriptor::new(body.duration, body.width, body.height).ok_or_else(|| {
            fail(format!(
                "{UPLOAD_FAILED}: server reported invalid video info {}x{} ({}s)",
                body.width, body.height, body.duration
            ))
        })?;
        tracing::info!(
            handle = %body.filename,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upload complete"
        );
        Ok(UploadReceipt {
            handle: UploadHandle::new(body.filename),
            media,
        })
    }

    fn extract(&self, request: &ExtractRequest) -> Result<ExtractionResult, RemoteError> {
        let fail = |reason: String| RemoteError::new(Operation::Extract, reason);
        let started = Instant::now();
        let url = self.endpoint("api/extract");
        tracing::info!(
            %url,
            handle = %request.asset_handle,
            start = request.start_time,
            end = request.end_time,
            interval = request.sampling_interval_seconds,
            roi = ?request.roi,
            "requesting extraction"
        );
        let resp = self
            .client
            .post(url)
            .json(request)
            .send()
            .map_err(|e| fail(format!("{EXTRACT_FAILED}: {e}")))?;
        if !resp.status().is_success() {
            return Err(fail(failure_reason(resp, EXTRACT_FAILED)));
        }
        let result: ExtractionResult = resp
            .json()
            .map_err(|e| fail(format!("{EXTRACT_FAILED}: unexpected response: {e}")))?;
        tracing::info!(
            succeeded = result.succeeded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "extraction response received"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_payload_has_no_subtitles() {
        let mut result = ExtractionResult {
            succeeded: true,
            text_payload: None,
            elapsed_seconds: None,
            failure_reason: None,
        };
        assert_eq!(result.subtitles(), None);
        result.text_payload = Some(" \n".into());
        assert_eq!(result.subtitles(), None);
        result.text_payload = Some("1\n".into());
        assert_eq!(result.subtitles(), Some("1\n"));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = normalize_base("http://localhost:8000").unwrap();
        assert_eq!(url.join("api/upload").unwrap().as_str(), "http://localhost:8000/api/upload");
        let url = normalize_base("https://example.com/subs").unwrap();
        assert_eq!(
            url.join("api/extract").unwrap().as_str(),
            "https://example.com/subs/api/extract"
        );
        assert!(normalize_base("not a url").is_err());
    }

    #[test]
    fn extract_request_uses_service_field_names() {
        let request = ExtractRequest {
            asset_handle: "abc123".into(),
            start_time: 0.0,
            end_time: 10.0,
            sampling_interval_seconds: 1.0,
            roi: Rectangle::new(100.4, 49.6, 200.0, 100.0).into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "abc123",
                "start_time": 0.0,
                "end_time": 10.0,
                "frame_interval": 1.0,
                "roi": {"x": 100, "y": 50, "width": 200, "height": 100}
            })
        );
    }

    #[test]
    fn extraction_result_tolerates_missing_optionals() {
        let result: ExtractionResult =
            serde_json::from_str(r#"{"success": false, "error": "Video file not found"}"#).unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.text_payload, None);
        assert_eq!(result.failure_reason.as_deref(), Some("Video file not found"));
    }
}
