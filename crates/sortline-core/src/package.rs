//! # Package Module
//!
//! Domain types for package classification.
//!
//! Everything here is a plain immutable value: constructed once per
//! classification call, never mutated, never cached. Serde derives exist
//! for the app-layer surfaces (CLI JSON output, HTTP API); the core
//! itself never serializes anything.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// DIMENSIONS
// =============================================================================

/// Package dimensions in centimeters.
///
/// The three axes are symmetric: no ordering constraint holds between
/// them, and the classification rule treats them interchangeably.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in centimeters.
    pub width: f64,
    /// Height in centimeters.
    pub height: f64,
    /// Length in centimeters.
    pub length: f64,
}

impl Dimensions {
    /// Create dimensions from the three axis measurements.
    #[must_use]
    pub fn new(width: f64, height: f64, length: f64) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    /// Volume in cubic centimeters.
    #[must_use]
    pub fn volume_cm3(&self) -> f64 {
        self.width * self.height * self.length
    }

    /// The largest single axis measurement.
    #[must_use]
    pub fn longest_side(&self) -> f64 {
        self.width.max(self.height).max(self.length)
    }
}

// =============================================================================
// STACK
// =============================================================================

/// The destination stack for a classified package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stack {
    /// Neither bulky nor heavy: normal automated handling.
    #[serde(rename = "STANDARD")]
    Standard,
    /// Bulky or heavy (but not both): special handling equipment.
    #[serde(rename = "SPECIAL")]
    Special,
    /// Both bulky and heavy: cannot be handled by the line.
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl Stack {
    /// The canonical uppercase label for this stack.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stack::Standard => "STANDARD",
            Stack::Special => "SPECIAL",
            Stack::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// A full classification decision with its audit breakdown.
///
/// Callers get the complete reasoning (volume, bulky/heavy flags), not
/// just the stack label, so every routing decision can be audited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The destination stack.
    pub stack: Stack,
    /// The resolved dimensions the decision was made from.
    pub dimensions: Dimensions,
    /// Computed volume in cubic centimeters.
    pub volume_cm3: f64,
    /// Mass in kilograms, as supplied by the caller.
    pub mass_kg: f64,
    /// Whether the package crossed a bulk threshold.
    pub is_bulky: bool,
    /// Whether the package crossed the mass threshold.
    pub is_heavy: bool,
}

/// Where resolved dimensions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionSource {
    /// All three dimensions were supplied explicitly by the caller.
    Manual,
    /// Dimensions were estimated from an image by the external estimator.
    Estimated,
}

/// A classification tagged with the provenance of its dimensions.
///
/// Produced by the input resolver; identical to [`Classification`] apart
/// from the `source` tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedClassification {
    /// Dimension provenance: manual input or external estimate.
    pub source: DimensionSource,
    /// The classification decision and its breakdown.
    #[serde(flatten)]
    pub classification: Classification,
}

// =============================================================================
// IMAGE REFERENCE
// =============================================================================

/// An opaque reference to a package image.
///
/// The core never interprets this value; it is handed unchanged to the
/// estimator port, which decides whether it names a file, a URL, or
/// something else entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a raw image reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The raw reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn volume_is_product_of_axes() {
        let dims = Dimensions::new(10.0, 20.0, 30.0);
        assert_eq!(dims.volume_cm3(), 6000.0);
    }

    #[test]
    fn longest_side_ignores_axis_order() {
        assert_eq!(Dimensions::new(5.0, 170.0, 30.0).longest_side(), 170.0);
        assert_eq!(Dimensions::new(170.0, 5.0, 30.0).longest_side(), 170.0);
        assert_eq!(Dimensions::new(5.0, 30.0, 170.0).longest_side(), 170.0);
    }

    #[test]
    fn stack_labels_are_uppercase() {
        assert_eq!(Stack::Standard.to_string(), "STANDARD");
        assert_eq!(Stack::Special.to_string(), "SPECIAL");
        assert_eq!(Stack::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn stack_serializes_to_canonical_label() {
        let json = serde_json::to_string(&Stack::Rejected).unwrap();
        assert_eq!(json, "\"REJECTED\"");
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DimensionSource::Manual).unwrap(),
            "\"manual\""
        );
        assert_eq!(
            serde_json::to_string(&DimensionSource::Estimated).unwrap(),
            "\"estimated\""
        );
    }
}
