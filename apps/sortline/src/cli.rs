//! # CLI Module
//!
//! Command implementations for the `sortline` binary.
//!
//! Each `cmd_*` function is a thin adapter: it calls a core entry
//! point and renders the result as a human-readable report or as JSON.
//! The functions return the rendered output instead of printing so the
//! integration tests can assert on it; `main` does the printing.

use sortline_core::{
    Classification, FallbackRequest, ImageRef, InvalidInputError, ResolveError,
    ResolvedClassification, Resolver, classify_with_details,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::api::SharedEstimator;
use crate::secrets::CredentialChain;
use crate::vision::GeminiEstimator;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// A failed CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid measurements on the manual path.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// Resolution failure on the fallback path.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The result could not be rendered as JSON.
    #[error("failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

// =============================================================================
// COMMANDS
// =============================================================================

/// `sortline classify`: classify from explicit dimensions and mass.
pub fn cmd_classify(
    width: f64,
    height: f64,
    length: f64,
    mass: f64,
    format: OutputFormat,
) -> Result<String, CliError> {
    debug!(width, height, length, mass, "classifying manual measurements");
    let details = classify_with_details(width, height, length, mass)?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&details)?),
        OutputFormat::Text => Ok(render_text(&details, None)),
    }
}

/// `sortline estimate`: classify with the image-based fallback.
///
/// All three dimensions given -> manual path, estimator untouched.
/// Anything less -> the image is handed to the Gemini estimator.
pub fn cmd_estimate(
    mass: f64,
    width: Option<f64>,
    height: Option<f64>,
    length: Option<f64>,
    image: Option<String>,
    format: OutputFormat,
) -> Result<String, CliError> {
    let estimator: SharedEstimator =
        Arc::new(GeminiEstimator::new(Arc::new(CredentialChain::default())));
    cmd_estimate_with(estimator, mass, width, height, length, image, format)
}

/// Like [`cmd_estimate`] but with an injected estimator (tests).
pub fn cmd_estimate_with(
    estimator: SharedEstimator,
    mass: f64,
    width: Option<f64>,
    height: Option<f64>,
    length: Option<f64>,
    image: Option<String>,
    format: OutputFormat,
) -> Result<String, CliError> {
    let resolver = Resolver::new(estimator);
    let request = FallbackRequest {
        mass_kg: mass,
        width,
        height,
        length,
        image: image.map(ImageRef::new),
    };

    let resolved = resolver.classify_with_fallback(&request)?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&resolved)?),
        OutputFormat::Text => Ok(render_resolved_text(&resolved)),
    }
}

// =============================================================================
// RENDERING
// =============================================================================

fn render_text(details: &Classification, source: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!("stack:      {}\n", details.stack));
    if let Some(source) = source {
        out.push_str(&format!("source:     {source}\n"));
    }
    out.push_str(&format!(
        "dimensions: {} x {} x {} cm\n",
        details.dimensions.width, details.dimensions.height, details.dimensions.length
    ));
    out.push_str(&format!("volume:     {} cm3\n", details.volume_cm3));
    out.push_str(&format!("mass:       {} kg\n", details.mass_kg));
    out.push_str(&format!("bulky:      {}\n", details.is_bulky));
    out.push_str(&format!("heavy:      {}", details.is_heavy));
    out
}

fn render_resolved_text(resolved: &ResolvedClassification) -> String {
    let source = match resolved.source {
        sortline_core::DimensionSource::Manual => "manual",
        sortline_core::DimensionSource::Estimated => "estimated",
    };
    render_text(&resolved.classification, Some(source))
}
