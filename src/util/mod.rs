//! Utility types and functions for c3d-anim.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`Axis`] / [`AxisConvention`] - Axis identifiers and coordinate conventions
//! - [`LengthUnit`] - Spatial unit conversion
//! - Math type re-exports from glam

mod error;
mod math;
mod units;

pub use error::*;
pub use math::*;
pub use units::*;
