//! The value types of the supported CSS properties.
//!
//! These are re-exported from [`crate::properties`], which is where the rest of the
//! crate should get them from.
//!
//! Each property has a Rust type that holds its values.  Most of them are generated with
//! the [`make_property`] macro, which provides the initial value through [`Default`],
//! whether the property inherits through [`Property`], and a [`Parse`] implementation.
//! Properties whose computed value depends on the parent element, like `font-size`,
//! implement [`Property::compute`] by hand.

use cssparser::{Parser, Token, RGBA};

use crate::dasharray::Dasharray;
use crate::error::*;
use crate::iri::Iri;
use crate::length::*;
use crate::paint_server::PaintServer;
use crate::parse_identifiers;
use crate::parsers::Parse;
use crate::properties::ComputedValues;
use crate::property_macros::Property;
use crate::unit_interval::UnitInterval;

#[cfg(doc)]
use crate::make_property;

make_property!(
    /// Reference to the `<clipPath>` that an element is clipped with.
    ClipPath,
    default: Iri::None,
    inherits_automatically: false,
    newtype_parse: Iri,
);

make_property!(
    /// Winding rule for the shapes inside a `<clipPath>`.
    ClipRule,
    default: NonZero,
    inherits_automatically: true,

    identifiers:
    "nonzero" => NonZero,
    "evenodd" => EvenOdd,
);

make_property!(
    /// Value that `currentColor` resolves to.
    Color,
    default: RGBA::new(0, 0, 0, 255),
    inherits_automatically: true,
    newtype_parse: RGBA,
);

make_property!(
    /// Only `display: none` has an effect: it keeps the element and its children from
    /// being rendered.
    Display,
    default: Inline,
    inherits_automatically: false,

    identifiers:
    "inline" => Inline,
    "block" => Block,
    "list-item" => ListItem,
    "run-in" => RunIn,
    "compact" => Compact,
    "marker" => Marker,
    "table" => Table,
    "inline-table" => InlineTable,
    "table-row-group" => TableRowGroup,
    "table-header-group" => TableHeaderGroup,
    "table-footer-group" => TableFooterGroup,
    "table-row" => TableRow,
    "table-column-group" => TableColumnGroup,
    "table-column" => TableColumn,
    "table-cell" => TableCell,
    "table-caption" => TableCaption,
    "none" => None,
);

make_property!(
    /// Paint for the interior of shapes.
    Fill,
    default: PaintServer::SolidColor(cssparser::Color::RGBA(RGBA::new(0, 0, 0, 255))),
    inherits_automatically: true,
    newtype_parse: PaintServer,
);

make_property!(
    /// Opacity of the fill paint alone.
    FillOpacity,
    default: UnitInterval(1.0),
    inherits_automatically: true,
    newtype_parse: UnitInterval,
);

make_property!(
    /// Winding rule that decides which parts of a shape are inside.
    FillRule,
    default: NonZero,
    inherits_automatically: true,

    identifiers:
    "nonzero" => NonZero,
    "evenodd" => EvenOdd,
);

/// Value of properties that are parsed but not rendered, like `filter`.
///
/// Anything other than `none` is kept verbatim so that it can be reported.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum UnsupportedValue {
    #[default]
    None,
    Value(String),
}

impl Parse for UnsupportedValue {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<UnsupportedValue, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("none"))
            .is_ok()
        {
            return Ok(UnsupportedValue::None);
        }

        let start = parser.position();
        parser.next()?;
        while parser.next().is_ok() {}

        Ok(UnsupportedValue::Value(parser.slice_from(start).trim().to_string()))
    }
}

impl UnsupportedValue {
    pub fn get(&self) -> Option<&str> {
        match *self {
            UnsupportedValue::None => None,
            UnsupportedValue::Value(ref s) => Some(s),
        }
    }
}

make_property!(
    /// Filters are not rendered; a value other than `none` is reported as an
    /// unsupported feature and the element is drawn unfiltered.
    Filter,
    default: UnsupportedValue::None,
    inherits_automatically: false,
    newtype_parse: UnsupportedValue,
);

/// `font-size` property.
///
/// The computed value is always an absolute length in pixels, so that `em` and `ex`
/// units on other properties can be resolved without looking at the parent.
///
/// SVG1.1: <https://www.w3.org/TR/SVG11/text.html#FontSizeProperty>
#[derive(Debug, Clone, PartialEq)]
pub enum FontSize {
    Smaller,
    Larger,
    XXSmall,
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
    XXLarge,
    Value(Length<Both>),
}

impl FontSize {
    /// Returns the font size in pixels.
    ///
    /// Only meaningful on computed values; relative sizes resolve against the
    /// default font size.
    pub fn to_px(&self) -> f64 {
        self.resolve(DEFAULT_FONT_SIZE)
    }

    fn resolve(&self, parent_px: f64) -> f64 {
        use FontSize::*;

        // CSS 2.1 suggests a scaling factor of 1.2 between adjacent keywords.
        let scale = |steps: i32| DEFAULT_FONT_SIZE * 1.2f64.powi(steps);

        match *self {
            Smaller => parent_px / 1.2,
            Larger => parent_px * 1.2,
            XXSmall => scale(-3),
            XSmall => scale(-2),
            Small => scale(-1),
            Medium => scale(0),
            Large => scale(1),
            XLarge => scale(2),
            XXLarge => scale(3),

            Value(l) => match l.unit {
                LengthUnit::Percent | LengthUnit::Em => l.length * parent_px,
                LengthUnit::Ex => l.length * parent_px / 2.0,
                _ => l.to_absolute_px().unwrap_or(parent_px),
            },
        }
    }
}

impl Parse for FontSize {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FontSize, ParseError<'i>> {
        parser
            .try_parse(|p| {
                Ok(parse_identifiers!(
                    p,
                    "smaller" => FontSize::Smaller,
                    "larger" => FontSize::Larger,
                    "xx-small" => FontSize::XXSmall,
                    "x-small" => FontSize::XSmall,
                    "small" => FontSize::Small,
                    "medium" => FontSize::Medium,
                    "large" => FontSize::Large,
                    "x-large" => FontSize::XLarge,
                    "xx-large" => FontSize::XXLarge,
                )?)
            })
            .or_else(|_: ParseError<'i>| {
                let l = ULength::<Both>::parse(parser)?;
                Ok(FontSize::Value(Length::new(l.length, l.unit)))
            })
    }
}

make_property!(
    FontSize,
    default: FontSize::Value(Length::new(DEFAULT_FONT_SIZE, LengthUnit::Px)),
    property_impl: {
        impl Property for FontSize {
            fn inherits_automatically() -> bool {
                true
            }

            fn compute(&self, v: &ComputedValues) -> Self {
                let parent_px = v.font_size().to_px();
                FontSize::Value(Length::new(self.resolve(parent_px), LengthUnit::Px))
            }
        }
    }
);

make_property!(
    /// Shorthand that sets all three marker properties.
    ///
    /// Expands to `marker-start`, `marker-mid` and `marker-end`.
    Marker,
    default: Iri::None,
    inherits_automatically: true,
    newtype_parse: Iri,
);

make_property!(
    /// Marker for the last vertex of a path.
    MarkerEnd,
    default: Iri::None,
    inherits_automatically: true,
    newtype_parse: Iri,
);

make_property!(
    /// Marker for the vertices between the first and the last.
    MarkerMid,
    default: Iri::None,
    inherits_automatically: true,
    newtype_parse: Iri,
);

make_property!(
    /// Marker for the first vertex of a path.
    MarkerStart,
    default: Iri::None,
    inherits_automatically: true,
    newtype_parse: Iri,
);

make_property!(
    /// Reference to a `<mask>`, which is not rendered.
    Mask,
    default: Iri::None,
    inherits_automatically: false,
    newtype_parse: Iri,
);

make_property!(
    /// Group opacity: the element and its children are composited at once.
    Opacity,
    default: UnitInterval(1.0),
    inherits_automatically: false,
    newtype_parse: UnitInterval,
);

make_property!(
    /// Nested `<svg>` and `<symbol>` elements clip their contents to their viewport
    /// unless this is `visible` or `auto`.
    Overflow,
    default: Visible,
    inherits_automatically: false,

    identifiers:
    "visible" => Visible,
    "hidden" => Hidden,
    "scroll" => Scroll,
    "auto" => Auto,
);

/// One of the operations for the `paint-order` property; see [`PaintOrder`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaintTarget {
    Fill,
    Stroke,
    Markers,
}

make_property!(
    /// Order in which fill, stroke and markers are painted.
    ///
    /// Markers are not rendered, but they take part in the parsed order.
    PaintOrder,
    inherits_automatically: true,
    fields: {
        targets: [PaintTarget; 3], default: [PaintTarget::Fill, PaintTarget::Stroke, PaintTarget::Markers],
    }

    parse_impl: {
        impl Parse for PaintOrder {
            fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<PaintOrder, ParseError<'i>> {
                if parser.try_parse(|p| p.expect_ident_matching("normal")).is_ok() {
                    return Ok(PaintOrder::default());
                }

                let mut targets = Vec::with_capacity(3);

                while !parser.is_exhausted() {
                    let loc = parser.current_source_location();
                    let token = parser.next()?;

                    let value = match token {
                        Token::Ident(ref cow) if cow.eq_ignore_ascii_case("fill") => PaintTarget::Fill,
                        Token::Ident(ref cow) if cow.eq_ignore_ascii_case("stroke") => PaintTarget::Stroke,
                        Token::Ident(ref cow) if cow.eq_ignore_ascii_case("markers") => PaintTarget::Markers,
                        _ => return Err(loc.new_basic_unexpected_token_error(token.clone()).into()),
                    };

                    if targets.contains(&value) {
                        return Err(loc.new_custom_error(ValueErrorKind::value_error(
                            "paint-order targets must not repeat",
                        )));
                    }

                    targets.push(value);
                }

                if targets.is_empty() {
                    return Err(parser.new_custom_error(ValueErrorKind::parse_error(
                        "expected paint-order targets",
                    )));
                }

                // unspecified targets follow in their default order
                for target in [PaintTarget::Fill, PaintTarget::Stroke, PaintTarget::Markers] {
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }

                Ok(PaintOrder {
                    targets: [targets[0], targets[1], targets[2]],
                })
            }
        }
    }
);

make_property!(
    /// Color of a gradient `<stop>`.
    StopColor,
    default: cssparser::Color::RGBA(RGBA::new(0, 0, 0, 255)),
    inherits_automatically: false,
    newtype_parse: cssparser::Color,
);

make_property!(
    /// Opacity that multiplies the alpha of `stop-color`.
    StopOpacity,
    default: UnitInterval(1.0),
    inherits_automatically: false,
    newtype_parse: UnitInterval,
);

make_property!(
    /// Paint for the outline of shapes.
    Stroke,
    default: PaintServer::None,
    inherits_automatically: true,
    newtype_parse: PaintServer,
);

make_property!(
    /// Lengths of alternating dashes and gaps along the stroke.
    StrokeDasharray,
    default: Dasharray::None,
    inherits_automatically: true,
    newtype_parse: Dasharray,
);

make_property!(
    /// Distance into the dash pattern at which the stroke starts.
    StrokeDashoffset,
    default: Length::new(0.0, LengthUnit::Px),
    inherits_automatically: true,
    newtype_parse: Length<Both>,
);

make_property!(
    /// Shape of the ends of open subpaths and dashes.
    StrokeLinecap,
    default: Butt,
    inherits_automatically: true,

    identifiers:
    "butt" => Butt,
    "round" => Round,
    "square" => Square,
);

make_property!(
    /// Shape of the corners between stroked segments.
    StrokeLinejoin,
    default: Miter,
    inherits_automatically: true,

    identifiers:
    "miter" => Miter,
    "round" => Round,
    "bevel" => Bevel,
);

/// Miter limit; values below 1 are invalid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MiterLimit(pub f64);

impl Parse for MiterLimit {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<MiterLimit, ParseError<'i>> {
        let loc = parser.current_source_location();
        let v = f64::parse(parser)?;

        if v >= 1.0 {
            Ok(MiterLimit(v))
        } else {
            Err(loc.new_custom_error(ValueErrorKind::value_error(
                "stroke-miterlimit must be at least 1",
            )))
        }
    }
}

make_property!(
    /// Ratio of miter length to stroke width above which miters become bevels.
    StrokeMiterlimit,
    default: MiterLimit(4.0),
    inherits_automatically: true,
    newtype_parse: MiterLimit,
);

make_property!(
    /// Opacity of the stroke paint alone.
    StrokeOpacity,
    default: UnitInterval(1.0),
    inherits_automatically: true,
    newtype_parse: UnitInterval,
);

make_property!(
    /// Width of the stroke, in the element's user space.
    StrokeWidth,
    default: ULength::new(1.0, LengthUnit::Px),
    inherits_automatically: true,
    newtype_parse: ULength<Both>,
);

make_property!(
    /// Unlike `display: none`, hidden elements let their children override it.
    Visibility,
    default: Visible,
    inherits_automatically: true,

    identifiers:
    "visible" => Visible,
    "hidden" => Hidden,
    "collapse" => Collapse,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paint_order() {
        assert_eq!(
            PaintOrder::parse_str("normal").unwrap(),
            PaintOrder {
                targets: [PaintTarget::Fill, PaintTarget::Stroke, PaintTarget::Markers]
            }
        );

        assert_eq!(
            PaintOrder::parse_str("markers fill").unwrap(),
            PaintOrder {
                targets: [PaintTarget::Markers, PaintTarget::Fill, PaintTarget::Stroke]
            }
        );

        assert_eq!(
            PaintOrder::parse_str("stroke").unwrap(),
            PaintOrder {
                targets: [PaintTarget::Stroke, PaintTarget::Fill, PaintTarget::Markers]
            }
        );

        assert!(PaintOrder::parse_str("stroke stroke").is_err());
        assert!(PaintOrder::parse_str("markers stroke fill hello").is_err());
    }

    #[test]
    fn keeps_unsupported_values_verbatim() {
        assert_eq!(Filter::parse_str("none").unwrap(), Filter(UnsupportedValue::None));
        assert_eq!(
            Filter::parse_str("url(#blur)").unwrap().0.get(),
            Some("url(#blur)")
        );
        assert_eq!(
            Filter::parse_str("blur(5px) grayscale(1)").unwrap().0.get(),
            Some("blur(5px) grayscale(1)")
        );
    }

    #[test]
    fn miter_limit_must_be_at_least_one() {
        assert_eq!(
            StrokeMiterlimit::parse_str("10").unwrap(),
            StrokeMiterlimit(MiterLimit(10.0))
        );
        assert!(StrokeMiterlimit::parse_str("0.5").is_err());
    }

    #[test]
    fn font_size_resolves_against_parent() {
        let parent_px = 20.0;

        assert_eq!(FontSize::parse_str("2em").unwrap().resolve(parent_px), 40.0);
        assert_eq!(FontSize::parse_str("50%").unwrap().resolve(parent_px), 10.0);
        assert_eq!(FontSize::parse_str("1ex").unwrap().resolve(parent_px), 10.0);
        assert_eq!(FontSize::parse_str("1in").unwrap().resolve(parent_px), 96.0);
        assert_eq!(FontSize::parse_str("medium").unwrap().resolve(parent_px), 12.0);
        assert!(FontSize::parse_str("-1px").is_err());
    }
}
