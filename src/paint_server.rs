//! Values of the `fill` and `stroke` properties, and how they become paints.

use cssparser::Parser;

use crate::color::resolve_color;
use crate::document::NodeId;
use crate::error::*;
use crate::gradient::resolve_gradient;
use crate::layout::Viewport;
use crate::node::NodeBorrow;
use crate::parsers::Parse;
use crate::properties::ComputedValues;
use crate::scene::{Paint, SceneBuilder};
use crate::svg2png_log;
use crate::unit_interval::UnitInterval;

use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintServer {
    None,

    /// `url(#id)`, optionally followed by a color to use when the reference
    /// cannot be resolved.  `url(#id) none` has no such color.
    Iri {
        iri: Box<NodeId>,
        alternate: Option<cssparser::Color>,
    },

    SolidColor(cssparser::Color),
}

impl Parse for PaintServer {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<PaintServer, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("none"))
            .is_ok()
        {
            return Ok(PaintServer::None);
        }

        let Ok(url) = parser.try_parse(|p| p.expect_url()) else {
            return Ok(PaintServer::SolidColor(cssparser::Color::parse(parser)?));
        };

        let loc = parser.current_source_location();
        let iri = NodeId::parse(&url).map_err(|e| loc.new_custom_error(ValueErrorKind::from(e)))?;

        let alternate = if parser.is_exhausted()
            || parser
                .try_parse(|p| p.expect_ident_matching("none"))
                .is_ok()
        {
            None
        } else {
            Some(cssparser::Color::parse(parser)?)
        };

        Ok(PaintServer::Iri {
            iri: Box::new(iri),
            alternate,
        })
    }
}

impl PaintServer {
    /// Resolves the paint server to something that the rasterizer can use.
    ///
    /// References that cannot be resolved fall back to the alternate color if there is
    /// one, or to no paint at all.  Gradients without stops paint nothing, and gradients
    /// with a single stop paint a solid color.
    pub fn resolve(
        &self,
        builder: &mut SceneBuilder<'_>,
        values: &ComputedValues,
        viewport: &Viewport,
    ) -> Paint {
        let current_color = values.color().0;

        match *self {
            PaintServer::None => Paint::None,

            PaintServer::SolidColor(ref color) => {
                Paint::Solid(resolve_color(color, UnitInterval(1.0), current_color))
            }

            PaintServer::Iri {
                ref iri,
                ref alternate,
            } => {
                let fallback = || match alternate {
                    Some(color) => {
                        Paint::Solid(resolve_color(color, UnitInterval(1.0), current_color))
                    }
                    None => Paint::None,
                };

                let acquired = match builder.acquired_nodes().acquire(iri) {
                    Ok(acquired) => acquired,
                    Err(e) => {
                        svg2png_log!(
                            builder.session(),
                            "could not resolve paint server \"{}\": {}",
                            iri,
                            e
                        );
                        return fallback();
                    }
                };

                let node = acquired.get().clone();

                if let Some(e) = node.borrow_element().unsupported_feature() {
                    let name = node.borrow_element().element_name().local.to_string();
                    svg2png_log!(builder.session(), "paint server \"{}\": {}", iri, e);
                    builder.record_unsupported(UnsupportedFeatureError::PaintServer(name));
                    return fallback();
                }

                let resolved = resolve_gradient(&node, builder, values, viewport);

                match resolved {
                    Ok(gradient) => match gradient.stops.len() {
                        0 => Paint::None,
                        1 => Paint::Solid(gradient.stops[0].color),
                        _ => Paint::Gradient(Rc::new(gradient)),
                    },

                    Err(e) => {
                        svg2png_log!(
                            builder.session(),
                            "could not resolve paint server \"{}\": {}",
                            iri,
                            e
                        );
                        fallback()
                    }
                }
            }
        }
    }
}
