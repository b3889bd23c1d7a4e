//! Error types.

use std::fmt;

use cssparser::{BasicParseError, BasicParseErrorKind, ParseErrorKind, ToCss};
use markup5ever::QualName;
use thiserror::Error;

use crate::document::NodeId;
use crate::limits;
use crate::node::Node;

/// Error from parsing a value, tied to the lifetime of the text being parsed.
///
/// [`AttributeResultExt::attribute`] turns it into an owned [`ElementError`].
pub type ParseError<'i> = cssparser::ParseError<'i, ValueErrorKind>;

/// Why a single value was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueErrorKind {
    /// The name is not a property that is known here.
    #[error("unknown property name")]
    UnknownProperty,

    /// Syntax error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Well-formed, but out of range or otherwise unusable.
    #[error("invalid value: {0}")]
    Value(String),
}

impl ValueErrorKind {
    pub fn parse_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Parse(s.to_string())
    }

    pub fn value_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Value(s.to_string())
    }
}

fn describe_basic_error(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(tok) => {
            let mut s = String::from("unexpected token '");
            // a String sink never fails
            let _ = tok.to_css(&mut s);
            s.push('\'');
            s
        }
        BasicParseErrorKind::EndOfInput => "unexpected end of input".to_string(),
        BasicParseErrorKind::AtRuleInvalid(_) | BasicParseErrorKind::AtRuleBodyInvalid => {
            "at-rules are not allowed here".to_string()
        }
        BasicParseErrorKind::QualifiedRuleInvalid => "invalid syntax".to_string(),
    }
}

impl<'i> From<BasicParseError<'i>> for ValueErrorKind {
    fn from(e: BasicParseError<'i>) -> ValueErrorKind {
        ValueErrorKind::Parse(describe_basic_error(&e.kind))
    }
}

/// A rejected attribute value, with the name of the attribute.
#[derive(Debug, Clone, Error)]
#[error("{:?}: {err}", .attr.expanded())]
pub struct ElementError {
    pub attr: QualName,
    pub err: ValueErrorKind,
}

impl ElementError {
    /// Keeps the message of a parse error but drops its borrow of the input.
    pub fn from_parse_error(e: ParseError<'_>, attr: QualName) -> ElementError {
        let err = match e.kind {
            ParseErrorKind::Basic(ref kind) => ValueErrorKind::Parse(describe_basic_error(kind)),
            ParseErrorKind::Custom(err) => err,
        };

        ElementError { attr, err }
    }
}

/// Errors from [`crate::document::AcquiredNodes`].
pub enum AcquireError {
    /// No element has the referenced id.
    LinkNotFound(NodeId),

    /// The element exists but cannot be used for this kind of reference, like a
    /// `clip-path` that points to a `<rect>`.
    InvalidLinkType(NodeId),

    /// The reference leads back to a node that is already being resolved, as in
    /// `<clipPath id="c" clip-path="url(#c)">`.  The referencing element is treated
    /// as invalid; the document still renders.
    CircularReference(Node),

    /// [`limits::MAX_REFERENCED_ELEMENTS`] was reached.
    MaxReferencesExceeded,
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::LinkNotFound(id) => write!(f, "no element for reference {id}"),
            AcquireError::InvalidLinkType(id) => write!(f, "{id} cannot be used here"),
            AcquireError::CircularReference(node) => {
                write!(f, "circular reference through {}", node.borrow())
            }
            AcquireError::MaxReferencesExceeded => f.write_str("too many references resolved"),
        }
    }
}

/// Attaches an attribute name to the error of a parsing function.
///
/// Implemented for results whose error converts into a [`ValueErrorKind`], and for
/// the short-lived [`ParseError`].
pub trait AttributeResultExt<O> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError>;
}

impl<O, E: Into<ValueErrorKind>> AttributeResultExt<O> for Result<O, E> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError> {
        self.map_err(|e| ElementError {
            attr,
            err: e.into(),
        })
    }
}

impl<'i, O> AttributeResultExt<O> for Result<O, ParseError<'i>> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError> {
        self.map_err(|e| ElementError::from_parse_error(e, attr))
    }
}

/// Why an `href` or IRI cannot be turned into a [`NodeId`].
#[derive(Debug, Clone, Error)]
pub enum NodeIdError {
    #[error("fragment identifier required")]
    NodeIdRequired,

    /// Only same-document references like `#foo` are supported.
    #[error("references to other documents are not supported")]
    ExternalReference,
}

impl From<NodeIdError> for ValueErrorKind {
    fn from(e: NodeIdError) -> ValueErrorKind {
        ValueErrorKind::Value(e.to_string())
    }
}

/// A limit that keeps hostile documents from using unbounded time or memory.
///
/// Reported as [`LoadingError::LimitExceeded`].
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ImplementationLimit {
    /// See [`limits::MAX_LOADED_ELEMENTS`].
    #[error("documents may not have more than {} elements", limits::MAX_LOADED_ELEMENTS)]
    TooManyLoadedElements,

    /// See [`limits::MAX_DRAW_NODES`].
    #[error("documents may not expand to more than {} drawable nodes", limits::MAX_DRAW_NODES)]
    TooManyDrawNodes,
}

/// Errors that can happen while loading an SVG document.
///
/// All of these are unrecoverable errors that keep an SVG document from being
/// parsed.  SVG is very lenient with respect to document structure and the syntax of
/// property values; most errors there will not lead to a `LoadingError`.  To see
/// those errors, set the `SVG2PNG_LOG=1` environment variable.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum LoadingError {
    /// XML syntax error.
    #[error("XML parse error: {0}")]
    XmlParseError(String),

    /// There is no `<svg>` root element in the XML.
    #[error("XML does not have <svg> root")]
    NoSvgRoot,

    /// A particular implementation-defined limit was exceeded.
    #[error("{0}")]
    LimitExceeded(ImplementationLimit),
}

/// A construct that is recognized but that the renderer does not draw.
///
/// These are never fatal.  They get logged and recorded in
/// [`crate::document::Document::unsupported`], and the affected node
/// turns into a placeholder that draws nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedFeatureError {
    #[error("unsupported element <{0}>")]
    Element(String),

    #[error("unsupported property {name}: {value}")]
    Property { name: String, value: String },

    #[error("unsupported paint server <{0}>, using fallback")]
    PaintServer(String),

    #[error("text is parsed but not rendered: {0:?}")]
    Text(String),
}

/// A sizing request or document size that could not be used as-is.
///
/// The layout resolver never fails; it clamps the offending value and logs one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidSizingError {
    #[error("requested width {0} is not a positive finite number")]
    Width(f64),

    #[error("requested height {0} is not a positive finite number")]
    Height(f64),

    #[error("requested scale {0} is not a positive finite number")]
    Scale(f64),

    #[error("document size {0}x{1} is degenerate")]
    DocumentSize(f64, f64),

    #[error("{width}x{height} exceeds the budget of {budget} pixels")]
    ExceedsPixelBudget { width: u32, height: u32, budget: u64 },
}

/// Errors from the PNG encoder.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("image of {width}x{height} pixels cannot be encoded as PNG")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("compression error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the public conversion functions.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Parse(#[from] LoadingError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
