//! The `preserveAspectRatio` attribute.
//!
//! ```
//! # use svg2png::doctest_only::AspectRatio;
//! # use svg2png::doctest_only::Parse;
//! assert_eq!(
//!     AspectRatio::parse_str("xMidYMid").unwrap(),
//!     AspectRatio::default()
//! );
//! ```
//!
//! See <https://www.w3.org/TR/SVG/coords.html#PreserveAspectRatioAttribute>

use cssparser::{BasicParseError, Parser, Token};

use crate::error::*;
use crate::parse_identifiers;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;
use crate::viewbox::ViewBox;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
enum Fit {
    #[default]
    Meet,
    Slice,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
enum Align1D {
    Min,
    #[default]
    Mid,
    Max,
}

impl Align1D {
    fn from_name(name: &str) -> Option<Align1D> {
        match name {
            "Min" => Some(Align1D::Min),
            "Mid" => Some(Align1D::Mid),
            "Max" => Some(Align1D::Max),
            _ => None,
        }
    }

    /// Start of a box of `size` placed inside `[start, start + available]`.
    fn place(self, start: f64, available: f64, size: f64) -> f64 {
        match self {
            Align1D::Min => start,
            Align1D::Mid => start + (available - size) / 2.0,
            Align1D::Max => start + available - size,
        }
    }
}

/// A parsed `preserveAspectRatio`.
///
/// `align` is `None` for `none`, which stretches the viewBox to fill the viewport.  The
/// `defer` keyword is accepted and ignored, as SVG 2 specifies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    align: Option<(Align1D, Align1D)>,
    fit: Fit,
}

impl Default for AspectRatio {
    /// `xMidYMid meet`
    fn default() -> AspectRatio {
        AspectRatio {
            align: Some((Align1D::default(), Align1D::default())),
            fit: Fit::default(),
        }
    }
}

impl AspectRatio {
    /// The rectangle inside `viewport` that `vbox` gets mapped onto.
    fn fit_rect(&self, vbox: &ViewBox, viewport: &Rect) -> Rect {
        let Some((x_align, y_align)) = self.align else {
            return *viewport;
        };

        let sx = viewport.width() / vbox.width();
        let sy = viewport.height() / vbox.height();

        let scale = match self.fit {
            Fit::Meet => sx.min(sy),
            Fit::Slice => sx.max(sy),
        };

        let w = vbox.width() * scale;
        let h = vbox.height() * scale;

        let x = x_align.place(viewport.x0, viewport.width(), w);
        let y = y_align.place(viewport.y0, viewport.height(), h);

        Rect::new(x, y, x + w, y + h)
    }

    /// The transform from the viewBox's coordinates to the viewport's.
    ///
    /// Without a viewBox, this just moves the origin to the viewport's corner.  Returns
    /// `None` when nothing should be drawn: the viewport or the viewBox is empty, or the
    /// transform cannot be inverted.
    pub fn viewport_to_viewbox_transform(
        &self,
        vbox: Option<ViewBox>,
        viewport: &Rect,
    ) -> Option<Transform> {
        if viewport.is_empty() {
            return None;
        }

        let transform = match vbox {
            None => Transform::new_translate(viewport.x0, viewport.y0),

            Some(vbox) if vbox.is_empty() => return None,

            Some(vbox) => {
                let r = self.fit_rect(&vbox, viewport);

                Transform::new_translate(r.x0, r.y0)
                    .pre_scale(r.width() / vbox.width(), r.height() / vbox.height())
                    .pre_translate(-vbox.x0, -vbox.y0)
            }
        };

        Some(transform).filter(Transform::is_invertible)
    }
}

/// Parses `none` or one of the nine `xMinYMin` to `xMaxYMax` keywords.
fn parse_align<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Option<(Align1D, Align1D)>, BasicParseError<'i>> {
    let loc = parser.current_source_location();
    let token = parser.next()?;

    if let Token::Ident(ref name) = *token {
        if &**name == "none" {
            return Ok(None);
        }

        let parts = name
            .strip_prefix('x')
            .and_then(|rest| rest.split_once('Y'))
            .and_then(|(x, y)| Some((Align1D::from_name(x)?, Align1D::from_name(y)?)));

        if let Some(align) = parts {
            return Ok(Some(align));
        }
    }

    Err(loc.new_basic_unexpected_token_error(token.clone()))
}

fn parse_fit<'i>(parser: &mut Parser<'i, '_>) -> Result<Fit, BasicParseError<'i>> {
    parse_identifiers!(
        parser,
        "meet" => Fit::Meet,
        "slice" => Fit::Slice,
    )
}

impl Parse for AspectRatio {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<AspectRatio, ParseError<'i>> {
        let _defer = parser.try_parse(|p| p.expect_ident_matching("defer"));

        let align = parse_align(parser)?;

        let fit = parser.try_parse(parse_fit).unwrap_or_default();

        Ok(AspectRatio { align, fit })
    }
}
