//! Object detection over an inference server
//!
//! Detection itself is off-the-shelf capability; the crate talks to a
//! YOLO-style inference server through a narrow HTTP interface: `GET /labels`
//! once at startup to seed the catalog, `POST /detect` with a JPEG frame per
//! loop iteration.

use async_trait::async_trait;

use crate::video::Frame;
use crate::{Error, Result};

/// Axis-aligned box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One detected object
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Model confidence in `[0, 1]`
    pub confidence: f32,
    /// Label drawn from the detector's fixed vocabulary
    pub label: String,
}

/// Detects objects in frames
#[async_trait]
pub trait Detector: Send + Sync {
    /// The detector's full label vocabulary, fetched once at startup
    ///
    /// # Errors
    ///
    /// Returns error if the vocabulary cannot be obtained
    async fn labels(&self) -> Result<Vec<String>>;

    /// Run detection on one frame
    ///
    /// # Errors
    ///
    /// Returns error if inference fails; the render loop treats this as
    /// "skip annotation this frame", not as fatal.
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// Response schema of the inference server's `/detect` endpoint
#[derive(serde::Deserialize)]
struct DetectResponse {
    detections: Vec<DetectionJson>,
}

#[derive(serde::Deserialize)]
struct DetectionJson {
    #[serde(rename = "box")]
    bbox: BoundingBox,
    confidence: f32,
    label: String,
}

/// Response schema of the `/labels` endpoint
#[derive(serde::Deserialize)]
struct LabelsResponse {
    labels: Vec<String>,
}

/// HTTP client for a YOLO-style inference server
pub struct HttpDetector {
    client: reqwest::Client,
    base_url: String,
    min_confidence: f32,
}

impl HttpDetector {
    /// Create a detector client
    ///
    /// # Errors
    ///
    /// Returns error if `base_url` is empty
    pub fn new(base_url: &str, min_confidence: f32) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::Config("detector URL required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            min_confidence,
        })
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn labels(&self) -> Result<Vec<String>> {
        let url = format!("{}/labels", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(error = %e, "labels request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Detector(format!(
                "labels endpoint error {status}: {body}"
            )));
        }

        let result: LabelsResponse = response.json().await?;
        tracing::debug!(count = result.labels.len(), "fetched detector labels");
        Ok(result.labels)
    }

    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>> {
        let jpeg = frame.to_jpeg()?;
        let url = format!("{}/detect", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "image/jpeg")
            .body(jpeg)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Detector(format!(
                "detect endpoint error {status}: {body}"
            )));
        }

        let result: DetectResponse = response.json().await?;

        let detections = result
            .detections
            .into_iter()
            .filter(|d| d.confidence >= self.min_confidence)
            .map(|d| Detection {
                bbox: d.bbox,
                confidence: d.confidence,
                label: d.label,
            })
            .collect();

        Ok(detections)
    }
}
