//! # Resolve Module
//!
//! The input resolver: decides which measurement source to trust and
//! delegates the resolved measurements to the rule evaluator.
//!
//! Resolution is two-stage:
//! 1. If all three dimensions are supplied explicitly, use them
//!    (`source = manual`). The estimator is never invoked on this path.
//! 2. Otherwise, ask the injected [`DimensionEstimator`] to estimate
//!    dimensions from the supplied image reference
//!    (`source = estimated`).
//!
//! Mass is always the caller's value; the estimator never supplies it.
//! There is no partial-success mode: resolution either yields all three
//! dimensions or the call fails. An estimator failure is surfaced
//! verbatim, never defaulted to a guessed classification. Retry,
//! timeout, and manual-review routing belong to upstream orchestration.

use crate::package::{Dimensions, DimensionSource, ImageRef, ResolvedClassification};
use crate::rules::{self, InvalidInputError};
use thiserror::Error;

// =============================================================================
// ESTIMATOR PORT
// =============================================================================

/// The external dimension estimator, as the core sees it.
///
/// One operation: estimate a full dimension triple from an opaque image
/// reference, or fail. How the estimate is produced (which vision
/// service, which model, which credentials) is entirely the adapter's
/// concern. Tests substitute a deterministic stub.
pub trait DimensionEstimator: Send + Sync {
    /// Estimate package dimensions from an image reference.
    ///
    /// Must return either all three dimensions or an error; a partial
    /// estimate is a contract violation on the adapter side.
    fn estimate_dimensions(&self, image: &ImageRef) -> Result<Dimensions, EstimationError>;
}

impl<E: DimensionEstimator + ?Sized> DimensionEstimator for std::sync::Arc<E> {
    fn estimate_dimensions(&self, image: &ImageRef) -> Result<Dimensions, EstimationError> {
        (**self).estimate_dimensions(image)
    }
}

/// Failure of the external dimension estimator.
///
/// Covers an unreachable service, a malformed response, and estimates
/// that are missing, non-numeric, or otherwise unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dimension estimation failed: {0}")]
pub struct EstimationError(String);

impl EstimationError {
    /// Create an estimation error with the given description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// RESOLVER ERRORS
// =============================================================================

/// Failure of dimension resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A resolved measurement was not a usable physical quantity.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// Neither full manual dimensions nor an image reference were
    /// supplied; resolution is impossible.
    #[error("no dimensions and no image reference supplied")]
    MissingInput,

    /// The external estimator failed or returned unusable data.
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

// =============================================================================
// RESOLVER
// =============================================================================

/// A classification request with optional manual dimensions.
///
/// `mass_kg` is always required. Dimensions are manual only when all
/// three are present; anything less falls back to the image.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRequest {
    /// Package mass in kilograms (always caller-supplied).
    pub mass_kg: f64,
    /// Manually measured width in centimeters, if available.
    pub width: Option<f64>,
    /// Manually measured height in centimeters, if available.
    pub height: Option<f64>,
    /// Manually measured length in centimeters, if available.
    pub length: Option<f64>,
    /// Reference to a package image for the estimator fallback.
    pub image: Option<ImageRef>,
}

impl FallbackRequest {
    /// A request with mass only; dimensions and image can be added
    /// with the builder methods.
    #[must_use]
    pub fn new(mass_kg: f64) -> Self {
        Self {
            mass_kg,
            width: None,
            height: None,
            length: None,
            image: None,
        }
    }

    /// Supply all three manual dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: f64, height: f64, length: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self.length = Some(length);
        self
    }

    /// Supply an image reference for the estimator fallback.
    #[must_use]
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    fn manual_dimensions(&self) -> Option<Dimensions> {
        match (self.width, self.height, self.length) {
            (Some(w), Some(h), Some(l)) => Some(Dimensions::new(w, h, l)),
            _ => None,
        }
    }
}

/// The input resolver.
///
/// Owns one injected estimator and nothing else: no caching, no state
/// across calls. Synchronous by design; callers needing concurrency
/// invoke it from independent contexts, there is no shared mutable
/// state to serialize.
#[derive(Debug, Clone)]
pub struct Resolver<E: DimensionEstimator> {
    estimator: E,
}

impl<E: DimensionEstimator> Resolver<E> {
    /// Create a resolver around the given estimator.
    #[must_use]
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }

    /// Resolve dimensions and classify, tagging the result with its
    /// dimension source.
    ///
    /// Manual dimensions (all three present) win unconditionally and
    /// the estimator is not called; otherwise the image reference is
    /// handed to the estimator. With neither, resolution fails with
    /// [`ResolveError::MissingInput`].
    pub fn classify_with_fallback(
        &self,
        request: &FallbackRequest,
    ) -> Result<ResolvedClassification, ResolveError> {
        let (dimensions, source) = match request.manual_dimensions() {
            Some(dimensions) => (dimensions, DimensionSource::Manual),
            None => {
                let image = request.image.as_ref().ok_or(ResolveError::MissingInput)?;
                let estimated = self.estimator.estimate_dimensions(image)?;
                (estimated, DimensionSource::Estimated)
            }
        };

        rules::validate(&dimensions, request.mass_kg)?;
        Ok(ResolvedClassification {
            source,
            classification: rules::evaluate(dimensions, request.mass_kg),
        })
    }
}
