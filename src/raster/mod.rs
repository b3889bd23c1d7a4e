//! Geometry to pixels: path flattening, stroking, coverage and paint.
//!
//! Nothing in here knows about the scene graph; [`crate::drawing_ctx`] walks the
//! scene and calls into these functions for each shape.

mod coverage;
mod flatten;
mod paint;
mod stroke;

pub use coverage::fill;
pub use flatten::{flatten, Point, Polyline};
pub use paint::PaintSource;
pub use stroke::{dash, stroke, StrokeStyle};

/// Maximum distance in device pixels between a curve and its flattened polyline.
pub const FLATTEN_TOLERANCE: f64 = 0.1;
