//! Integration tests for Sortline CLI commands.
//!
//! The estimator is replaced with a deterministic stub; no network.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use sortline::cli::{OutputFormat, cmd_classify, cmd_estimate_with};
use sortline_core::{DimensionEstimator, Dimensions, EstimationError, ImageRef, ResolveError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Estimator stub returning a fixed triple, counting invocations.
struct FixedEstimator {
    dimensions: Dimensions,
    calls: Arc<AtomicU32>,
}

impl DimensionEstimator for FixedEstimator {
    fn estimate_dimensions(&self, _image: &ImageRef) -> Result<Dimensions, EstimationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.dimensions)
    }
}

fn fixed_estimator(width: f64, height: f64, length: f64) -> (Arc<FixedEstimator>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let estimator = Arc::new(FixedEstimator {
        dimensions: Dimensions::new(width, height, length),
        calls: calls.clone(),
    });
    (estimator, calls)
}

// =============================================================================
// CLASSIFY COMMAND TESTS
// =============================================================================

#[test]
fn test_classify_standard_text_report() {
    let report = cmd_classify(10.0, 10.0, 10.0, 5.0, OutputFormat::Text).unwrap();
    assert!(report.contains("stack:      STANDARD"));
    assert!(report.contains("bulky:      false"));
    assert!(report.contains("heavy:      false"));
}

#[test]
fn test_classify_rejected_json_report() {
    let report = cmd_classify(100.0, 100.0, 100.0, 25.0, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    assert_eq!(value["stack"], "REJECTED");
    assert_eq!(value["volume_cm3"], 1_000_000.0);
    assert_eq!(value["is_bulky"], true);
    assert_eq!(value["is_heavy"], true);
}

#[test]
fn test_classify_rejects_invalid_measurements() {
    let result = cmd_classify(-1.0, 10.0, 10.0, 5.0, OutputFormat::Text);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("width"));
}

// =============================================================================
// ESTIMATE COMMAND TESTS
// =============================================================================

#[test]
fn test_estimate_manual_path_skips_estimator() {
    let (estimator, calls) = fixed_estimator(999.0, 999.0, 999.0);

    let report = cmd_estimate_with(
        estimator,
        12.5,
        Some(45.0),
        Some(30.0),
        Some(60.0),
        Some("box.jpg".to_string()),
        OutputFormat::Json,
    )
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["source"], "manual");
    assert_eq!(value["stack"], "STANDARD");
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn test_estimate_falls_back_to_image() {
    let (estimator, calls) = fixed_estimator(45.0, 30.0, 60.0);

    let report = cmd_estimate_with(
        estimator,
        12.5,
        None,
        None,
        None,
        Some("box.jpg".to_string()),
        OutputFormat::Json,
    )
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["source"], "estimated");
    assert_eq!(value["stack"], "STANDARD");
    assert_eq!(value["volume_cm3"], 81_000.0);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_estimate_without_input_fails() {
    let (estimator, _) = fixed_estimator(1.0, 1.0, 1.0);

    let err = cmd_estimate_with(
        estimator,
        12.5,
        None,
        None,
        None,
        None,
        OutputFormat::Text,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        sortline::cli::CliError::Resolve(ResolveError::MissingInput)
    ));
}

#[test]
fn test_estimate_text_report_carries_source() {
    let (estimator, _) = fixed_estimator(45.0, 30.0, 60.0);

    let report = cmd_estimate_with(
        estimator,
        12.5,
        None,
        None,
        None,
        Some("box.jpg".to_string()),
        OutputFormat::Text,
    )
    .unwrap();

    assert!(report.contains("source:     estimated"));
    assert!(report.contains("stack:      STANDARD"));
}
