//! # Rules Module
//!
//! The classification rule evaluator.
//!
//! A package is *bulky* when its volume reaches 1,000,000 cm3 or any
//! single side reaches 150 cm, and *heavy* when its mass reaches 20 kg.
//! All threshold comparisons are inclusive; exactly-at-threshold values
//! count. Stack assignment is exhaustive and exclusive:
//!
//! - bulky AND heavy  -> REJECTED
//! - bulky XOR heavy  -> SPECIAL
//! - neither          -> STANDARD
//!
//! Evaluation itself is a pure function and cannot fail. The public
//! entry points validate that every measurement is a finite,
//! non-negative number before evaluating; invalid physical quantities
//! are rejected at the boundary rather than silently classified.

use crate::package::{Classification, Dimensions, Stack};
use thiserror::Error;

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Volume threshold for bulkiness, in cubic centimeters (inclusive).
pub const BULKY_VOLUME_CM3: f64 = 1_000_000.0;

/// Single-side threshold for bulkiness, in centimeters (inclusive).
pub const BULKY_SIDE_CM: f64 = 150.0;

/// Mass threshold for heaviness, in kilograms (inclusive).
pub const HEAVY_MASS_KG: f64 = 20.0;

// =============================================================================
// INPUT VALIDATION
// =============================================================================

/// A measurement that is not a usable physical quantity.
///
/// Raised at the public entry points for NaN, infinite, or negative
/// values. Zero is accepted: the rule itself is defined over all
/// non-negative reals.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} must be a finite, non-negative number, got {value}")]
pub struct InvalidInputError {
    /// Which measurement was invalid.
    pub field: &'static str,
    /// The offending value.
    pub value: f64,
}

fn check_measurement(field: &'static str, value: f64) -> Result<(), InvalidInputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidInputError { field, value })
    }
}

/// Validate a full (dimensions, mass) measurement set.
///
/// Shared by every public entry point, including the resolver's
/// estimated path.
pub(crate) fn validate(dimensions: &Dimensions, mass_kg: f64) -> Result<(), InvalidInputError> {
    check_measurement("width", dimensions.width)?;
    check_measurement("height", dimensions.height)?;
    check_measurement("length", dimensions.length)?;
    check_measurement("mass", mass_kg)?;
    Ok(())
}

// =============================================================================
// RULE EVALUATOR
// =============================================================================

/// Whether the given dimensions make a package bulky.
#[must_use]
pub fn is_bulky(dimensions: &Dimensions) -> bool {
    dimensions.volume_cm3() >= BULKY_VOLUME_CM3 || dimensions.longest_side() >= BULKY_SIDE_CM
}

/// Whether the given mass makes a package heavy.
#[must_use]
pub fn is_heavy(mass_kg: f64) -> bool {
    mass_kg >= HEAVY_MASS_KG
}

/// Evaluate the classification rule on already-validated measurements.
///
/// Pure and total: no validation, no I/O, no failure mode. The caller
/// is responsible for rejecting non-finite or negative inputs first.
pub(crate) fn evaluate(dimensions: Dimensions, mass_kg: f64) -> Classification {
    let bulky = is_bulky(&dimensions);
    let heavy = is_heavy(mass_kg);

    let stack = match (bulky, heavy) {
        (true, true) => Stack::Rejected,
        (true, false) | (false, true) => Stack::Special,
        (false, false) => Stack::Standard,
    };

    Classification {
        stack,
        dimensions,
        volume_cm3: dimensions.volume_cm3(),
        mass_kg,
        is_bulky: bulky,
        is_heavy: heavy,
    }
}

// =============================================================================
// PUBLIC ENTRY POINTS
// =============================================================================

/// Classify a package, returning only the destination stack.
pub fn classify(
    width: f64,
    height: f64,
    length: f64,
    mass: f64,
) -> Result<Stack, InvalidInputError> {
    classify_with_details(width, height, length, mass).map(|c| c.stack)
}

/// Classify a package, returning the full decision breakdown.
pub fn classify_with_details(
    width: f64,
    height: f64,
    length: f64,
    mass: f64,
) -> Result<Classification, InvalidInputError> {
    let dimensions = Dimensions::new(width, height, length);
    validate(&dimensions, mass)?;
    Ok(evaluate(dimensions, mass))
}
