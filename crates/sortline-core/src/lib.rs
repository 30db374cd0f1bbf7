//! # Sortline Core
//!
//! Deterministic package classification engine - THE LOGIC.
//!
//! Classifies packages into one of three handling stacks from their
//! dimensions (cm) and mass (kg):
//!
//! - **STANDARD**: neither bulky nor heavy
//! - **SPECIAL**: bulky or heavy, but not both
//! - **REJECTED**: bulky and heavy
//!
//! A package is bulky at 1,000,000 cm3 of volume or 150 cm on any
//! single side, and heavy at 20 kg; all thresholds are inclusive.
//!
//! ## Modules
//!
//! - **package**: domain types (Dimensions, Stack, Classification, ...)
//! - **rules**: the rule evaluator and the `classify` /
//!   `classify_with_details` entry points
//! - **resolve**: the input resolver (`classify_with_fallback`) and the
//!   [`DimensionEstimator`] port for image-based estimation
//!
//! ## Architectural constraints
//!
//! This crate is pure and synchronous: no async, no network, no file
//! I/O, no state across calls. The only external collaborator is the
//! [`DimensionEstimator`] port, injected by the caller; image handling,
//! HTTP, and credential resolution live in the app layer.

pub mod package;
pub mod resolve;
pub mod rules;

pub use package::{
    Classification, DimensionSource, Dimensions, ImageRef, ResolvedClassification, Stack,
};
pub use resolve::{
    DimensionEstimator, EstimationError, FallbackRequest, ResolveError, Resolver,
};
pub use rules::{
    BULKY_SIDE_CM, BULKY_VOLUME_CM3, HEAVY_MASS_KG, InvalidInputError, classify,
    classify_with_details, is_bulky, is_heavy,
};
