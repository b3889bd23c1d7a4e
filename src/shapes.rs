//! The basic shapes: `path`, `rect`, `circle`, `ellipse`, `line`, `polyline`
//! and `polygon`.
//!
//! Shapes keep their attributes as lengths until they are lowered, because
//! percentages and font-relative units need the viewport and the cascade.

use cssparser::{Parser, Token};
use markup5ever::{expanded_name, local_name, namespace_url, ns};

use crate::element::{read_attributes, ElementTrait};
use crate::error::*;
use crate::layout::Viewport;
use crate::length::*;
use crate::node::{CascadedValues, Node};
use crate::parsers::{optional_comma, Parse};
use crate::path_builder::{Path as SvgPath, PathBuilder};
use crate::scene::{
    CircleGeometry, DrawNode, EllipseGeometry, LineGeometry, PolyGeometry, RectGeometry,
    SceneBuilder, Shape,
};
use crate::session::Session;
use crate::svg2png_log;
use crate::xml::Attributes;

/// Resolves the geometry of a shape against the viewport and wraps it in a scene node.
fn lower_shape<G>(
    node: &Node,
    builder: &mut SceneBuilder<'_>,
    cascaded: &CascadedValues<'_>,
    viewport: &Viewport,
    geometry: impl FnOnce(&NormalizeParams) -> G,
    wrap: impl FnOnce(Box<Shape<G>>) -> DrawNode,
) -> Option<DrawNode> {
    let values = cascaded.get();
    let params = NormalizeParams::new(values, viewport);
    let shape = builder.shape(node, geometry(&params), values, viewport);

    Some(wrap(Box::new(shape)))
}

#[derive(Default)]
pub struct Path {
    path: SvgPath,
}

impl ElementTrait for Path {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        let Some((_, d)) = attrs
            .iter()
            .find(|(attr, _)| attr.expanded() == expanded_name!("", "d"))
        else {
            return;
        };

        let mut builder = PathBuilder::default();

        // everything up to the error is kept
        if let Err(e) = builder.parse(d) {
            svg2png_log!(session, "error in path data: {}", e);
        }

        self.path = builder.into_path();
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        lower_shape(node, builder, cascaded, viewport, |_| self.path.clone(), DrawNode::Path)
    }
}

/// The `points` attribute of `polyline` and `polygon`.
///
/// Coordinates within a pair may be separated by a comma or whitespace; pairs are
/// separated by whitespace, a comma, or both.
///
/// <https://www.w3.org/TR/SVG/shapes.html#PointsBNF>
#[derive(Debug, Default, PartialEq)]
struct Points(Vec<(f64, f64)>);

impl Parse for Points {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Points, ParseError<'i>> {
        let mut points = Vec::new();

        loop {
            let x = f64::parse(parser)?;
            optional_comma(parser);
            let y = f64::parse(parser)?;
            points.push((x, y));

            if parser.is_exhausted() {
                return Ok(Points(points));
            }

            let loc = parser.current_source_location();

            match *parser.next_including_whitespace()? {
                Token::WhiteSpace(_) => optional_comma(parser),
                Token::Comma => (),
                ref t => return Err(loc.new_unexpected_token_error(t.clone())),
            }
        }
    }
}

#[derive(Default)]
pub struct Polyline {
    points: Points,
}

#[derive(Default)]
pub struct Polygon {
    points: Points,
}

impl ElementTrait for Polyline {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, { "points" => self.points, });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let geometry = |_: &NormalizeParams| PolyGeometry {
            points: self.points.0.clone(),
            closed: false,
        };

        lower_shape(node, builder, cascaded, viewport, geometry, DrawNode::Polyline)
    }
}

impl ElementTrait for Polygon {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, { "points" => self.points, });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let geometry = |_: &NormalizeParams| PolyGeometry {
            points: self.points.0.clone(),
            closed: true,
        };

        lower_shape(node, builder, cascaded, viewport, geometry, DrawNode::Polygon)
    }
}

#[derive(Default)]
pub struct Line {
    x1: Length<Horizontal>,
    y1: Length<Vertical>,
    x2: Length<Horizontal>,
    y2: Length<Vertical>,
}

impl ElementTrait for Line {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "x1" => self.x1,
            "y1" => self.y1,
            "x2" => self.x2,
            "y2" => self.y2,
        });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let geometry = |params: &NormalizeParams| LineGeometry {
            x1: self.x1.to_user(params),
            y1: self.y1.to_user(params),
            x2: self.x2.to_user(params),
            y2: self.y2.to_user(params),
        };

        lower_shape(node, builder, cascaded, viewport, geometry, DrawNode::Line)
    }
}

/// `rx` and `ry` stay `None` when absent; [`RectGeometry::new`] then takes one from
/// the other.
#[derive(Default)]
pub struct Rect {
    x: Length<Horizontal>,
    y: Length<Vertical>,
    width: ULength<Horizontal>,
    height: ULength<Vertical>,
    rx: Option<ULength<Horizontal>>,
    ry: Option<ULength<Vertical>>,
}

impl ElementTrait for Rect {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "x" => self.x,
            "y" => self.y,
            "width" => self.width,
            "height" => self.height,
            "rx" => self.rx,
            "ry" => self.ry,
        });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let geometry = |params: &NormalizeParams| {
            RectGeometry::new(
                self.x.to_user(params),
                self.y.to_user(params),
                self.width.to_user(params),
                self.height.to_user(params),
                self.rx.map(|rx| rx.to_user(params)),
                self.ry.map(|ry| ry.to_user(params)),
            )
        };

        lower_shape(node, builder, cascaded, viewport, geometry, DrawNode::Rect)
    }
}

#[derive(Default)]
pub struct Circle {
    cx: Length<Horizontal>,
    cy: Length<Vertical>,
    r: ULength<Both>,
}

impl ElementTrait for Circle {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "cx" => self.cx,
            "cy" => self.cy,
            "r" => self.r,
        });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let geometry = |params: &NormalizeParams| CircleGeometry {
            cx: self.cx.to_user(params),
            cy: self.cy.to_user(params),
            r: self.r.to_user(params),
        };

        lower_shape(node, builder, cascaded, viewport, geometry, DrawNode::Circle)
    }
}

#[derive(Default)]
pub struct Ellipse {
    cx: Length<Horizontal>,
    cy: Length<Vertical>,
    rx: ULength<Horizontal>,
    ry: ULength<Vertical>,
}

impl ElementTrait for Ellipse {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "cx" => self.cx,
            "cy" => self.cy,
            "rx" => self.rx,
            "ry" => self.ry,
        });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let geometry = |params: &NormalizeParams| EllipseGeometry {
            cx: self.cx.to_user(params),
            cy: self.cy.to_user(params),
            rx: self.rx.to_user(params),
            ry: self.ry.to_user(params),
        };

        lower_shape(node, builder, cascaded, viewport, geometry, DrawNode::Ellipse)
    }
}
