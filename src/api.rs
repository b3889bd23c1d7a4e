//! Public Rust API for svg2png.
//!
//! This gets re-exported from the toplevel `lib.rs`.

#![warn(missing_docs)]

pub use crate::{
    encoder::{Compression, FilterStrategy},
    error::{
        ConversionError, EncodingError, ImplementationLimit, InvalidSizingError, LoadingError,
        UnsupportedFeatureError,
    },
    layout::{IntrinsicDimensions, Size, SizingRequest},
    session::Session,
};

use crate::document::Document;
use crate::drawing_ctx;
use crate::encoder::{self, EncodeOptions, PixelBuffer};
use crate::layout;
use crate::limits;
use crate::svg2png_log;

/// Options that control a conversion.
///
/// The defaults are a budget of [`limits::DEFAULT_MAX_PIXELS`] output pixels,
/// [`FilterStrategy::Adaptive`] row filtering, and the default zlib compression level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Maximum number of pixels in the output image.
    ///
    /// Larger requests are scaled down, keeping the aspect ratio, until they fit.
    pub max_pixels: u64,

    /// How PNG rows are filtered before compression.
    pub filter_strategy: FilterStrategy,

    /// zlib compression level for the pixel data.
    pub compression: Compression,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            max_pixels: limits::DEFAULT_MAX_PIXELS,
            filter_strategy: FilterStrategy::default(),
            compression: Compression::default(),
        }
    }
}

/// A parsed SVG document, ready to be converted any number of times.
///
/// Created with [`Converter::parse`].
pub struct SvgDocument(Document);

impl SvgDocument {
    /// The `width`, `height` and `viewBox` of the toplevel `<svg>` element.
    pub fn intrinsic_dimensions(&self) -> IntrinsicDimensions {
        *self.0.intrinsic_dimensions()
    }

    /// The size of the document in user units.
    ///
    /// This is the size of the `viewBox` if there is one, otherwise the `width` and
    /// `height`; missing values default to 300×150.  It is also the size of the PNG
    /// produced with [`SizingRequest::Intrinsic`].
    pub fn size(&self) -> Size {
        self.0.base_size()
    }

    /// Constructs that were found in the document but that are not rendered.
    pub fn unsupported_features(&self) -> &[UnsupportedFeatureError] {
        self.0.unsupported()
    }
}

/// Builder for SVG to PNG conversions.
///
/// This struct carries the [`ConvertOptions`] and the [`Session`] used for logging.  You
/// can call its `with_*` methods in sequence to configure it, and then convert any
/// number of documents with it.
///
/// # Example:
///
/// ```
/// use svg2png::{Converter, FilterStrategy, SizingRequest};
///
/// let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">
///                <rect width="100" height="50" fill="red"/>
///              </svg>"#;
///
/// let png = Converter::new()
///     .with_filter_strategy(FilterStrategy::Paeth)
///     .with_pixel_budget(1_000_000)
///     .convert(svg, SizingRequest::Width(200.0))?;
///
/// assert_eq!(&png[1..4], b"PNG");
/// # Ok::<(), svg2png::ConversionError>(())
/// ```
#[derive(Default, Clone)]
pub struct Converter {
    session: Session,
    options: ConvertOptions,
}

impl Converter {
    /// Creates a `Converter` with the default options.
    ///
    /// Logging is enabled if the `SVG2PNG_LOG` environment variable is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all the options at once.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the maximum number of pixels of the output image.
    pub fn with_pixel_budget(mut self, max_pixels: u64) -> Self {
        self.options.max_pixels = max_pixels;
        self
    }

    /// Sets how PNG rows are filtered.
    pub fn with_filter_strategy(mut self, strategy: FilterStrategy) -> Self {
        self.options.filter_strategy = strategy;
        self
    }

    /// Sets the zlib compression level.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.options.compression = compression;
        self
    }

    /// Uses `session` for logging instead of the default one.
    ///
    /// # Example:
    ///
    /// ```
    /// use svg2png::{Converter, Session};
    ///
    /// let converter = Converter::new().with_session(Session::new_with_logging(false));
    /// let size = converter.dimensions(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#)?;
    /// assert_eq!((size.width, size.height), (300.0, 150.0));
    /// # Ok::<(), svg2png::ConversionError>(())
    /// ```
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// The options this converter uses.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Parses an SVG document.
    pub fn parse(&self, svg: &str) -> Result<SvgDocument, LoadingError> {
        let document = Document::load_from_str(&self.session, svg)?;

        for feature in document.unsupported() {
            svg2png_log!(self.session, "ignoring: {}", feature);
        }

        Ok(SvgDocument(document))
    }

    /// Returns the size in pixels of the PNG that [`SizingRequest::Intrinsic`] produces.
    pub fn dimensions(&self, svg: &str) -> Result<Size, ConversionError> {
        Ok(self.parse(svg)?.size())
    }

    /// Renders an already-parsed document to PNG.
    pub fn render(
        &self,
        document: &SvgDocument,
        request: SizingRequest,
    ) -> Result<Vec<u8>, ConversionError> {
        let document = &document.0;

        let canvas = layout::resolve(
            document.intrinsic_dimensions(),
            request,
            self.options.max_pixels,
            &self.session,
        );

        svg2png_log!(
            self.session,
            "rendering {:?} into {}x{} pixels",
            request,
            canvas.width,
            canvas.height
        );

        let surface = drawing_ctx::rasterize(document.root(), &canvas, &self.session);

        let options = EncodeOptions {
            filter_strategy: self.options.filter_strategy,
            compression: self.options.compression,
        };

        Ok(encoder::encode(PixelBuffer::from(surface), &options)?)
    }

    /// Parses `svg` and renders it to PNG at the size given by `request`.
    pub fn convert(&self, svg: &str, request: SizingRequest) -> Result<Vec<u8>, ConversionError> {
        let document = self.parse(svg)?;
        self.render(&document, request)
    }
}

/// Converts an SVG document to PNG.
///
/// With both `width` and `height`, the image is stretched to that size.  With only
/// one of them, the other one follows the document's aspect ratio.  With neither, the
/// document's own size is used.
///
/// # Example:
///
/// ```
/// let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"/>"#;
///
/// let png = svg2png::convert_to_png(svg, Some(200), None)?;
/// assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
/// # Ok::<(), svg2png::ConversionError>(())
/// ```
pub fn convert_to_png(
    svg: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Vec<u8>, ConversionError> {
    Converter::new().convert(svg, SizingRequest::from_params(width, height, None))
}

/// Converts an SVG document to PNG, multiplying its size by `scale`.
pub fn convert_to_png_with_scale(svg: &str, scale: f64) -> Result<Vec<u8>, ConversionError> {
    Converter::new().convert(svg, SizingRequest::Scale(scale))
}

/// Converts an SVG document to PNG at its own size.
pub fn svg_to_png(svg: &str) -> Result<Vec<u8>, ConversionError> {
    Converter::new().convert(svg, SizingRequest::Intrinsic)
}

/// Returns the size of an SVG document without rendering it.
///
/// # Example:
///
/// ```
/// let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 50 40"/>"#;
///
/// let size = svg2png::svg_dimensions(svg)?;
/// assert_eq!((size.width, size.height), (50.0, 40.0));
/// # Ok::<(), svg2png::ConversionError>(())
/// ```
pub fn svg_dimensions(svg: &str) -> Result<Size, ConversionError> {
    Converter::new().dimensions(svg)
}
