//! CSS lengths.
//!
//! A [`CssLength`] carries two marker type parameters.  The first, a [`Normalize`], says
//! which viewport dimension percentages refer to: [`Horizontal`] lengths like `x` use the
//! width, [`Vertical`] lengths like `y` use the height, and [`Both`] lengths like a
//! circle's `r` use the [normalized diagonal][diag].  The second, a [`Validate`], says
//! whether negative values are allowed; [`Length`] and [`ULength`] are the signed and
//! unsigned aliases.
//!
//! [diag]: https://www.w3.org/TR/SVG/coords.html#Units

use cssparser::{Parser, Token};
use std::f64::consts::SQRT_2;
use std::marker::PhantomData;

use crate::error::*;
use crate::layout::Viewport;
use crate::parsers::{finite_f32, Parse};
use crate::properties::ComputedValues;

/// CSS pixels per inch.
pub const DPI: f64 = 96.0;

/// Font size when nothing specifies one, in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LengthUnit {
    /// `1.0` means 100%
    Percent,
    Px,
    Em,
    /// Taken as half an `em`
    Ex,
    In,
    Cm,
    Mm,
    Pt,
    Pc,
}

/// Dimension units and their size in pixels, or `None` when that depends on the font.
const DIMENSIONS: [(&str, LengthUnit, Option<f64>); 8] = [
    ("px", LengthUnit::Px, Some(1.0)),
    ("in", LengthUnit::In, Some(DPI)),
    ("cm", LengthUnit::Cm, Some(DPI / 2.54)),
    ("mm", LengthUnit::Mm, Some(DPI / 25.4)),
    ("pt", LengthUnit::Pt, Some(DPI / 72.0)),
    ("pc", LengthUnit::Pc, Some(DPI / 6.0)),
    ("em", LengthUnit::Em, None),
    ("ex", LengthUnit::Ex, None),
];

impl LengthUnit {
    fn from_dimension(name: &str) -> Option<LengthUnit> {
        DIMENSIONS
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, unit, _)| unit)
    }

    /// Pixels per unit, for units that do not depend on a viewport or a font.
    fn px_per_unit(self) -> Option<f64> {
        DIMENSIONS
            .iter()
            .find(|(_, u, _)| *u == self)
            .and_then(|&(_, _, px)| px)
    }
}

/// Which viewport dimension a percentage refers to.
pub trait Normalize {
    fn normalize(width: f64, height: f64) -> f64;
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Horizontal;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Vertical;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Both;

impl Normalize for Horizontal {
    fn normalize(width: f64, _: f64) -> f64 {
        width
    }
}

impl Normalize for Vertical {
    fn normalize(_: f64, height: f64) -> f64 {
        height
    }
}

impl Normalize for Both {
    fn normalize(width: f64, height: f64) -> f64 {
        width.hypot(height) / SQRT_2
    }
}

/// Which values are acceptable when parsing.
pub trait Validate {
    fn validate(v: f64) -> Result<f64, ValueErrorKind>;
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Signed;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Unsigned;

impl Validate for Signed {
    fn validate(v: f64) -> Result<f64, ValueErrorKind> {
        Ok(v)
    }
}

impl Validate for Unsigned {
    fn validate(v: f64) -> Result<f64, ValueErrorKind> {
        if v < 0.0 {
            Err(ValueErrorKind::value_error("value must be non-negative"))
        } else {
            Ok(v)
        }
    }
}

/// A number with a unit, as in `width="2cm"`.
///
/// ```
/// # use svg2png::doctest_only::{Length, ULength, LengthUnit, Horizontal, Vertical, Both};
/// # use svg2png::doctest_only::Parse;
/// let width: Length<Horizontal> = Length::new(42.0, LengthUnit::Cm);
/// let height = Length::<Vertical>::parse_str("50%").unwrap();
/// assert_eq!(height, Length::new(0.5, LengthUnit::Percent));
///
/// assert!(ULength::<Both>::parse_str("-5px").is_err());
/// ```
///
/// Lengths are resolved into user units with [`CssLength::to_user`] while the scene is
/// built.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CssLength<N: Normalize, V: Validate> {
    pub length: f64,
    pub unit: LengthUnit,
    marker: PhantomData<(N, V)>,
}

pub type Length<N> = CssLength<N, Signed>;

pub type ULength<N> = CssLength<N, Unsigned>;

impl<N: Normalize, V: Validate> Default for CssLength<N, V> {
    fn default() -> Self {
        CssLength::new(0.0, LengthUnit::Px)
    }
}

impl<N: Normalize, V: Validate> Parse for CssLength<N, V> {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<CssLength<N, V>, ParseError<'i>> {
        let loc = parser.current_source_location();

        let token = parser.next()?.clone();

        let (value, unit) = match token {
            Token::Number { value, .. } => (value, LengthUnit::Px),

            Token::Percentage { unit_value, .. } => (unit_value, LengthUnit::Percent),

            Token::Dimension {
                value, ref unit, ..
            } => match LengthUnit::from_dimension(unit) {
                Some(unit) => (value, unit),
                None => return Err(loc.new_unexpected_token_error(token.clone())),
            },

            _ => return Err(loc.new_unexpected_token_error(token)),
        };

        finite_f32(value)
            .and_then(|v| V::validate(f64::from(v)))
            .map(|v| CssLength::new(v, unit))
            .map_err(|e| loc.new_custom_error(e))
    }
}

/// What lengths need to know to be resolved: the viewport and the font size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NormalizeParams {
    vbox_width: f64,
    vbox_height: f64,
    font_size: f64,
}

impl NormalizeParams {
    pub fn new(values: &ComputedValues, viewport: &Viewport) -> NormalizeParams {
        NormalizeParams {
            vbox_width: viewport.vbox.width(),
            vbox_height: viewport.vbox.height(),
            font_size: values.font_size().to_px(),
        }
    }

    /// For lengths outside of any viewport, like the toplevel `width` and `height`.
    pub fn from_size(vbox_width: f64, vbox_height: f64) -> NormalizeParams {
        NormalizeParams {
            vbox_width,
            vbox_height,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl<N: Normalize, V: Validate> CssLength<N, V> {
    pub fn new(length: f64, unit: LengthUnit) -> CssLength<N, V> {
        CssLength {
            length,
            unit,
            marker: PhantomData,
        }
    }

    /// The length in user units.
    pub fn to_user(&self, params: &NormalizeParams) -> f64 {
        let factor = match self.unit {
            LengthUnit::Percent => N::normalize(params.vbox_width, params.vbox_height),
            LengthUnit::Em => params.font_size,
            LengthUnit::Ex => params.font_size / 2.0,
            unit => unit.px_per_unit().unwrap_or(1.0),
        };

        self.length * factor
    }

    /// The length in pixels, or `None` for percentages and font-relative units.
    pub fn to_absolute_px(&self) -> Option<f64> {
        self.unit.px_per_unit().map(|px| self.length * px)
    }
}
