//! Fourier epicycle pipeline - from closed polygons to rotating-circle chains
//!
//! The stages run strictly in order, each consuming the previous stage's
//! output with no feedback:
//! - polygon: random or explicit closed polygons on the complex plane
//! - resample: uniform arc-length samples along the boundary
//! - spectrum: DFT decomposition into ranked rotating vectors
//! - epicycle: per-frame chain geometry and the traced curve

pub mod epicycle;
pub mod polygon;
pub mod resample;
pub mod spectrum;

use num_complex::Complex64;
use thiserror::Error;

/// A 2-D location on the complex plane (re = x, im = y).
///
/// Used uniformly for polygon vertices, circle centers and trace points.
pub type Point = Complex64;

#[derive(Error, Debug)]
pub enum EpicycleError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Degenerate polygon: {0}")]
    DegeneratePolygon(String),
}
