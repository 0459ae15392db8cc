use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

use super::remote::classify_ureq_error;
use crate::error::ScorerError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub label: String,
    #[serde(alias = "score")]
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Classifier labels often list synonyms (`tabby, tabby cat`); the
    /// first one is the label.
    pub fn primary_label(&self) -> &str {
        self.label.split(',').next().unwrap_or(&self.label).trim()
    }
}

/// An image classifier returning labels with confidences in `0.0..=1.0`.
pub trait LocalClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ScorerError>;
}

/// Classifier served over HTTP on the local network. The image is POSTed
/// as PNG and the reply is `[{"label": ..., "score": ...}]`.
pub struct HttpClassifier {
    agent: ureq::Agent,
    url: String,
}

impl HttpClassifier {
    pub fn connect(url: impl Into<String>) -> Result<Self, ScorerError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ScorerError::unavailable(format!(
                "classifier URL must be http(s): {url}"
            )));
        }
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        debug!(url = %url, "local classifier ready");
        Ok(Self { agent, url })
    }
}

impl LocalClassifier for HttpClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ScorerError> {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| ScorerError::malformed(format!("cannot encode image: {e}")))?;

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "image/png")
            .send_bytes(png.get_ref())
            .map_err(classify_ureq_error)?;

        response
            .into_json::<Vec<Prediction>>()
            .map_err(|e| ScorerError::malformed(e.to_string()))
    }
}
