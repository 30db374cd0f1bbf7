//! # Vision Module
//!
//! Image-based dimension estimation backed by the Gemini API.
//!
//! This is the app-side implementation of the core's
//! [`DimensionEstimator`] port: it reads the image file, ships it to
//! Gemini with a strict JSON-only prompt, and parses the reply into a
//! dimension triple. The contract with the core is all-or-nothing --
//! either all three dimensions come back usable, or the call fails with
//! an [`EstimationError`]; a partial or dubious estimate is never
//! passed on.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use sortline_core::{DimensionEstimator, Dimensions, EstimationError, ImageRef};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::secrets::CredentialProvider;

/// Gemini model used for estimation.
const MODEL: &str = "gemini-2.5-flash";

/// Base URL of the Gemini REST API.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-request deadline for the Gemini call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Instruction prompt sent alongside the image.
///
/// Gemini is told to refuse rather than guess: a blurry, dark, or
/// ambiguous image must come back as a JSON error object, which this
/// adapter surfaces as an estimation failure.
const PROMPT: &str = "\
You are analyzing an image of a shipping package or box. Estimate the \
width, height, and length of the package in centimeters.\n\n\
IMPORTANT RULES:\n\
- Only estimate dimensions if you can clearly see a single package and \
can reasonably judge its size.\n\
- Do NOT guess or make up numbers. If the image is blurry, too dark, \
taken from an angle that hides a dimension, or otherwise unclear, \
return an error.\n\
- If there are multiple packages, return an error.\n\
- If the object is not a shipping package or box, return an error.\n\n\
RESPONSE FORMAT - respond with ONLY a JSON object, no other text:\n\n\
On success:\n\
{\"width\": <number>, \"height\": <number>, \"length\": <number>}\n\n\
On failure (use the most specific reason):\n\
{\"error\": \"no package detected\"}\n\
{\"error\": \"image too blurry\"}\n\
{\"error\": \"image too dark\"}\n\
{\"error\": \"multiple packages detected\"}\n\
{\"error\": \"cannot determine dimensions from this angle\"}\n";

// =============================================================================
// ERRORS
// =============================================================================

/// Failures internal to the vision adapter.
///
/// These never cross the estimator port directly; they are flattened
/// into [`EstimationError`] so the core sees a single failure type.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The image path does not name a readable file.
    #[error("image file not found: {0}")]
    ImageNotFound(String),

    /// The file extension is not a supported image format.
    #[error("unsupported image format '{0}'. Supported: bmp, gif, jpeg, jpg, png, webp")]
    UnsupportedFormat(String),

    /// The image file could not be read.
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No API key could be resolved.
    #[error(transparent)]
    Credentials(#[from] crate::secrets::CredentialError),

    /// The HTTP call to Gemini failed.
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini answered with a non-success status.
    #[error("Gemini returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The reply could not be parsed into a dimension triple.
    #[error("{0}")]
    BadResponse(String),
}

impl From<VisionError> for EstimationError {
    fn from(err: VisionError) -> Self {
        EstimationError::new(err.to_string())
    }
}

// =============================================================================
// GEMINI ESTIMATOR
// =============================================================================

/// [`DimensionEstimator`] implementation over the Gemini REST API.
///
/// Interprets the core's opaque image reference as a filesystem path
/// (the sorting line drops camera captures into a shared directory).
pub struct GeminiEstimator {
    client: reqwest::blocking::Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
}

impl GeminiEstimator {
    /// Build an estimator around the given credential provider.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            credentials,
            base_url: API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn estimate_from_path(&self, path: &Path) -> Result<Dimensions, VisionError> {
        let (mime_type, data) = load_image(path)?;
        let api_key = self.credentials.api_key()?;

        debug!(path = %path.display(), mime_type, "sending image to Gemini");

        let body = json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": mime_type, "data": data } },
                    { "text": PROMPT },
                ],
            }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(VisionError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply = extract_reply_text(&text)?;
        parse_dimensions(&reply)
    }
}

impl DimensionEstimator for GeminiEstimator {
    fn estimate_dimensions(&self, image: &ImageRef) -> Result<Dimensions, EstimationError> {
        info!(image = %image, "estimating dimensions from image");
        self.estimate_from_path(Path::new(image.as_str()))
            .map_err(|err| {
                error!(%err, "dimension estimation failed");
                err.into()
            })
    }
}

// =============================================================================
// IMAGE LOADING
// =============================================================================

/// Map a supported file extension to its MIME type.
fn mime_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Validate the image path and return (mime type, base64 data).
fn load_image(path: &Path) -> Result<(&'static str, String), VisionError> {
    if !path.is_file() {
        return Err(VisionError::ImageNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime_type = mime_type_for(&extension)
        .ok_or_else(|| VisionError::UnsupportedFormat(extension.clone()))?;

    let bytes = std::fs::read(path).map_err(|source| VisionError::ImageRead {
        path: path.display().to_string(),
        source,
    })?;

    Ok((mime_type, BASE64.encode(bytes)))
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Pull the model's text reply out of a generateContent response body.
fn extract_reply_text(body: &str) -> Result<String, VisionError> {
    let value: Value = serde_json::from_str(body).map_err(|_| {
        VisionError::BadResponse(format!("could not parse Gemini response as JSON: {body:?}"))
    })?;

    value["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            VisionError::BadResponse(format!("no text candidate in Gemini response: {body:?}"))
        })
}

/// Strip optional markdown code fences around a JSON reply.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the model's JSON reply into a dimension triple.
///
/// Rejects error replies, missing fields, non-numeric values, and
/// non-positive values; there is no partial-success mode.
fn parse_dimensions(reply: &str) -> Result<Dimensions, VisionError> {
    let cleaned = strip_code_fences(reply);
    let value: Value = serde_json::from_str(cleaned).map_err(|_| {
        VisionError::BadResponse(format!("could not parse Gemini reply as JSON: {reply:?}"))
    })?;

    if let Some(reason) = value.get("error").and_then(Value::as_str) {
        return Err(VisionError::BadResponse(format!(
            "Gemini could not estimate dimensions: {reason}"
        )));
    }

    let mut axes = [0.0f64; 3];
    for (slot, key) in axes.iter_mut().zip(["width", "height", "length"]) {
        let Some(field) = value.get(key) else {
            return Err(VisionError::BadResponse(format!(
                "missing '{key}' in Gemini reply: {reply:?}"
            )));
        };
        let Some(number) = field.as_f64() else {
            return Err(VisionError::BadResponse(format!(
                "'{key}' must be a number, got {field}"
            )));
        };
        if number <= 0.0 {
            return Err(VisionError::BadResponse(format!(
                "'{key}' must be positive, got {number}"
            )));
        }
        *slot = number;
    }

    Ok(Dimensions::new(axes[0], axes[1], axes[2]))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    // =========================================================================
    // REPLY PARSING
    // =========================================================================

    #[test]
    fn parses_plain_json_reply() {
        let dims = parse_dimensions(r#"{"width": 45, "height": 30.5, "length": 60}"#).unwrap();
        assert_eq!(dims, Dimensions::new(45.0, 30.5, 60.0));
    }

    #[test]
    fn parses_code_fenced_reply() {
        let reply = "```json\n{\"width\": 45, \"height\": 30, \"length\": 60}\n```";
        let dims = parse_dimensions(reply).unwrap();
        assert_eq!(dims, Dimensions::new(45.0, 30.0, 60.0));
    }

    #[test]
    fn parses_unlabeled_code_fence() {
        let reply = "```\n{\"width\": 1, \"height\": 2, \"length\": 3}\n```";
        assert!(parse_dimensions(reply).is_ok());
    }

    #[test]
    fn error_reply_is_a_failure() {
        let err = parse_dimensions(r#"{"error": "image too blurry"}"#).unwrap_err();
        assert!(err.to_string().contains("image too blurry"));
    }

    #[test]
    fn missing_dimension_is_a_failure() {
        let err = parse_dimensions(r#"{"width": 45, "height": 30}"#).unwrap_err();
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn non_numeric_dimension_is_a_failure() {
        let err =
            parse_dimensions(r#"{"width": "big", "height": 30, "length": 60}"#).unwrap_err();
        assert!(err.to_string().contains("width"));
    }

    #[test]
    fn non_positive_dimension_is_a_failure() {
        assert!(parse_dimensions(r#"{"width": 0, "height": 30, "length": 60}"#).is_err());
        assert!(parse_dimensions(r#"{"width": -4, "height": 30, "length": 60}"#).is_err());
    }

    #[test]
    fn non_json_reply_is_a_failure() {
        assert!(parse_dimensions("about 45 by 30 by 60 cm").is_err());
    }

    #[test]
    fn extracts_text_from_generate_content_envelope() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"width\": 1, \"height\": 2, \"length\": 3}"}]}}
            ]
        }"#;
        let text = extract_reply_text(body).unwrap();
        assert!(text.contains("width"));
    }

    #[test]
    fn empty_envelope_is_a_failure() {
        assert!(extract_reply_text(r#"{"candidates": []}"#).is_err());
    }

    // =========================================================================
    // IMAGE LOADING
    // =========================================================================

    #[test]
    fn missing_image_file_is_a_failure() {
        let err = load_image(Path::new("/nonexistent/box.jpg")).unwrap_err();
        assert!(matches!(err, VisionError::ImageNotFound(_)));
    }

    #[test]
    fn unsupported_extension_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.tiff");
        std::fs::write(&path, b"not really an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, VisionError::UnsupportedFormat(_)));
    }

    #[test]
    fn supported_image_is_read_and_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.PNG"); // extension check is case-insensitive
        std::fs::write(&path, b"fake png bytes").unwrap();

        let (mime_type, data) = load_image(&path).unwrap();
        assert_eq!(mime_type, "image/png");
        assert_eq!(data, BASE64.encode(b"fake png bytes"));
    }
}
