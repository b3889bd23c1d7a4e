//! Convert SVG images to PNG, without system graphics libraries.
//!
//! This crate parses an SVG document into a scene graph, rasterizes it with an
//! anti-aliased coverage renderer, and encodes the pixels as a PNG file.  Each
//! conversion is a pure function of the SVG markup and the requested size; there is
//! no global state, so conversions can run in parallel on any number of threads.
//!
//! The SVG support covers SVG's [static mode]: shapes, paths, groups, nested `<svg>`
//! viewports, `<use>` and `<symbol>`, solid colors, linear and radial gradients,
//! clip paths, opacity, strokes with dashes, caps and joins.  Text content is parsed
//! but not drawn.  Filters, masks, patterns, markers and raster images are
//! recognized and skipped; see [`SvgDocument::unsupported_features`].  External
//! resources are never loaded.
//!
//! # Converting
//!
//! For the common cases, use one of the functions [`convert_to_png`],
//! [`convert_to_png_with_scale`] or [`svg_to_png`].  To configure the conversion,
//! create a [`Converter`] and call its builder methods.
//!
//! ```
//! let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">
//!                <rect width="100" height="50" fill="red"/>
//!              </svg>"#;
//!
//! // The document's own size: 100×50 pixels
//! let png = svg2png::svg_to_png(svg).unwrap();
//!
//! // Twice as large: 200×100 pixels
//! let png = svg2png::convert_to_png_with_scale(svg, 2.0).unwrap();
//!
//! // 200 pixels wide; the height follows the aspect ratio
//! let png = svg2png::convert_to_png(svg, Some(200), None).unwrap();
//! ```
//!
//! # Output size
//!
//! The size of a document is the size of its `viewBox`, or otherwise its `width`
//! and `height`.  When those are missing, the size defaults to 300×150.  The output
//! is never smaller than 1×1 pixels, and never larger than the pixel budget in
//! [`ConvertOptions::max_pixels`]; larger requests are scaled down uniformly.
//!
//! # Logging
//!
//! Problems in the SVG that do not stop the conversion, like invalid attribute values
//! or unsupported elements, are only reported in the log.  Set the `SVG2PNG_LOG`
//! environment variable to print it to standard output.
//!
//! [static mode]: https://www.w3.org/TR/SVG2/conform.html#static-mode

#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![allow(rustdoc::private_intra_doc_links)]
#![allow(clippy::too_many_arguments)]

pub use crate::api::*;

#[macro_use]
mod log;

#[macro_use]
mod property_macros;

mod api;
mod aspect_ratio;
mod clip_path;
mod color;
mod coord_units;
mod css;
mod dasharray;
mod document;
mod drawing_ctx;
mod element;
mod encoder;
mod error;
mod gradient;
mod href;
mod iri;
mod layout;
mod length;
mod limits;
mod node;
mod paint_server;
mod parsers;
mod path_builder;
mod path_parser;
mod properties;
mod property_defs;
mod raster;
mod rect;
mod scene;
mod session;
mod shapes;
mod structure;
mod surface_utils;
mod text;
mod transform;
mod unit_interval;
mod viewbox;
mod xml;

#[doc(hidden)]
pub mod bench_only {
    pub use crate::path_builder::PathBuilder;
    pub use crate::path_parser::Lexer;
}

#[doc(hidden)]
pub mod doctest_only {
    pub use crate::aspect_ratio::AspectRatio;
    pub use crate::href::Href;
    pub use crate::length::{Both, Horizontal, Length, LengthUnit, ULength, Vertical};
    pub use crate::parsers::Parse;
}

#[doc(hidden)]
pub mod tests_only {
    pub use crate::encoder::{chunk_crc, MAX_IDAT_SIZE, SIGNATURE};
}
