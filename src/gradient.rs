//! `linearGradient` and `radialGradient`, and the `stop` elements inside them.
//!
//! A gradient may leave out any of its attributes, or all of its stops, and take
//! them from the gradient its `href` points to, recursively.  Whatever is still
//! missing at the end of the chain gets the initial value.

use cssparser::Parser;

use crate::color::resolve_color;
use crate::coord_units;
use crate::coord_units::CoordUnits;
use crate::document::{NodeId, NodeStack};
use crate::element::{read_attributes, ElementData, ElementTrait};
use crate::error::*;
use crate::href::Href;
use crate::layout::Viewport;
use crate::length::*;
use crate::node::{CascadedValues, Node, NodeBorrow};
use crate::parse_identifiers;
use crate::parsers::Parse;
use crate::properties::ComputedValues;
use crate::scene::{self, ColorStop, GradientVariant, SceneBuilder};
use crate::session::Session;
use crate::transform::Transform;
use crate::unit_interval::UnitInterval;
use crate::xml::Attributes;

coord_units!(GradientUnits, CoordUnits::ObjectBoundingBox);

/// What a gradient paints outside of the `[0, 1]` range of offsets.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl Parse for SpreadMethod {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<SpreadMethod, ParseError<'i>> {
        let spread = parse_identifiers!(
            parser,
            "pad" => SpreadMethod::Pad,
            "reflect" => SpreadMethod::Reflect,
            "repeat" => SpreadMethod::Repeat,
        )?;

        Ok(spread)
    }
}

/// The `<stop>` element.  Its color comes from the `stop-color` and `stop-opacity`
/// properties.
#[derive(Default)]
pub struct Stop {
    offset: UnitInterval,
}

impl ElementTrait for Stop {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, { "offset" => self.offset, });
    }
}

/// Endpoints of a linear gradient, as given on one element.
#[derive(Default, Copy, Clone)]
struct LinearCoords {
    x1: Option<Length<Horizontal>>,
    y1: Option<Length<Vertical>>,
    x2: Option<Length<Horizontal>>,
    y2: Option<Length<Vertical>>,
}

impl LinearCoords {
    fn is_complete(&self) -> bool {
        self.x1.is_some() && self.y1.is_some() && self.x2.is_some() && self.y2.is_some()
    }

    fn or(self, fallback: LinearCoords) -> LinearCoords {
        LinearCoords {
            x1: self.x1.or(fallback.x1),
            y1: self.y1.or(fallback.y1),
            x2: self.x2.or(fallback.x2),
            y2: self.y2.or(fallback.y2),
        }
    }

    /// <https://www.w3.org/TR/SVG/pservers.html#LinearGradients>
    fn to_user(self, params: &NormalizeParams) -> GradientVariant {
        GradientVariant::Linear {
            x1: self.x1.unwrap_or(Length::new(0.0, LengthUnit::Percent)).to_user(params),
            y1: self.y1.unwrap_or(Length::new(0.0, LengthUnit::Percent)).to_user(params),
            x2: self.x2.unwrap_or(Length::new(1.0, LengthUnit::Percent)).to_user(params),
            y2: self.y2.unwrap_or(Length::new(0.0, LengthUnit::Percent)).to_user(params),
        }
    }
}

/// End circle and focal circle of a radial gradient, as given on one element.
#[derive(Default, Copy, Clone)]
struct RadialCoords {
    cx: Option<Length<Horizontal>>,
    cy: Option<Length<Vertical>>,
    r: Option<Length<Both>>,
    fx: Option<Length<Horizontal>>,
    fy: Option<Length<Vertical>>,
    fr: Option<Length<Both>>,
}

impl RadialCoords {
    fn is_complete(&self) -> bool {
        self.cx.is_some()
            && self.cy.is_some()
            && self.r.is_some()
            && self.fx.is_some()
            && self.fy.is_some()
            && self.fr.is_some()
    }

    fn or(self, fallback: RadialCoords) -> RadialCoords {
        RadialCoords {
            cx: self.cx.or(fallback.cx),
            cy: self.cy.or(fallback.cy),
            r: self.r.or(fallback.r),
            fx: self.fx.or(fallback.fx),
            fy: self.fy.or(fallback.fy),
            fr: self.fr.or(fallback.fr),
        }
    }

    /// <https://www.w3.org/TR/SVG/pservers.html#RadialGradients>
    fn to_user(self, params: &NormalizeParams) -> GradientVariant {
        let cx = self.cx.unwrap_or(Length::new(0.5, LengthUnit::Percent));
        let cy = self.cy.unwrap_or(Length::new(0.5, LengthUnit::Percent));
        let r = self.r.unwrap_or(Length::new(0.5, LengthUnit::Percent));
        let fr = self.fr.unwrap_or(Length::new(0.0, LengthUnit::Percent));

        // an unspecified focus sits on the resolved center
        let fx = self.fx.unwrap_or(cx);
        let fy = self.fy.unwrap_or(cy);

        GradientVariant::Radial {
            cx: cx.to_user(params),
            cy: cy.to_user(params),
            r: r.to_user(params),
            fx: fx.to_user(params),
            fy: fy.to_user(params),
            fr: fr.to_user(params),
        }
    }
}

#[derive(Copy, Clone)]
enum Geometry {
    Linear(LinearCoords),
    Radial(RadialCoords),
}

impl Geometry {
    fn is_complete(&self) -> bool {
        match self {
            Geometry::Linear(c) => c.is_complete(),
            Geometry::Radial(c) => c.is_complete(),
        }
    }

    /// Geometry only carries over between gradients of the same kind.
    fn or(self, fallback: Geometry) -> Geometry {
        match (self, fallback) {
            (Geometry::Linear(c), Geometry::Linear(f)) => Geometry::Linear(c.or(f)),
            (Geometry::Radial(c), Geometry::Radial(f)) => Geometry::Radial(c.or(f)),
            (geometry, _) => geometry,
        }
    }

    fn to_user(self, params: &NormalizeParams) -> GradientVariant {
        match self {
            Geometry::Linear(c) => c.to_user(params),
            Geometry::Radial(c) => c.to_user(params),
        }
    }
}

/// Attributes that both kinds of gradient have.
#[derive(Default)]
struct Common {
    units: Option<GradientUnits>,
    transform: Option<Transform>,
    spread: Option<SpreadMethod>,
    href: Href,
}

impl Common {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "gradientUnits" => self.units,
            "gradientTransform" => self.transform,
            "spreadMethod" => self.spread,
        });

        self.href = Href::from_attributes(attrs);
    }

    /// The gradient as given on `node`, before looking at its `href`.
    fn partial(&self, node: &Node, geometry: Geometry, session: &Session) -> PartialGradient {
        PartialGradient {
            units: self.units,
            transform: self.transform,
            spread: self.spread,
            stops: stops_of(node),
            geometry,
            href: self.href.node_id(session),
        }
    }
}

/// The `<linearGradient>` element.
#[derive(Default)]
pub struct LinearGradient {
    common: Common,
    coords: LinearCoords,
}

impl ElementTrait for LinearGradient {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.common.set_attributes(attrs, session);

        let c = &mut self.coords;

        read_attributes!(attrs, session, {
            "x1" => c.x1,
            "y1" => c.y1,
            "x2" => c.x2,
            "y2" => c.y2,
        });
    }
}

/// The `<radialGradient>` element.
#[derive(Default)]
pub struct RadialGradient {
    common: Common,
    coords: RadialCoords,
}

impl ElementTrait for RadialGradient {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        self.common.set_attributes(attrs, session);

        let c = &mut self.coords;

        read_attributes!(attrs, session, {
            "cx" => c.cx,
            "cy" => c.cy,
            "r" => c.r,
            "fx" => c.fx,
            "fy" => c.fy,
            "fr" => c.fr,
        });
    }
}

/// The color stops from the `<stop>` children of `node`, or `None` if there are
/// none.  Offsets are clamped so that they never decrease.
fn stops_of(node: &Node) -> Option<Vec<ColorStop>> {
    let mut stops: Vec<ColorStop> = Vec::new();

    for child in node.children().filter(|c| c.is_element()) {
        let offset = match *child.borrow_element_data() {
            ElementData::Stop(ref stop) => stop.offset.0,
            _ => continue,
        };

        let cascaded = CascadedValues::new_from_node(&child);
        let values = cascaded.get();

        let color = resolve_color(
            &values.stop_color().0,
            values.stop_opacity().0,
            values.color().0,
        );

        let previous = stops.last().map_or(0.0, |s| s.offset);

        stops.push(ColorStop {
            offset: offset.max(previous),
            color,
        });
    }

    (!stops.is_empty()).then_some(stops)
}

/// A gradient with some of its parts still unknown.
struct PartialGradient {
    units: Option<GradientUnits>,
    transform: Option<Transform>,
    spread: Option<SpreadMethod>,
    stops: Option<Vec<ColorStop>>,
    geometry: Geometry,
    href: Option<NodeId>,
}

impl PartialGradient {
    /// Reads the gradient element in `node`, or returns `None` if it is some other
    /// kind of element.
    fn from_node(node: &Node, session: &Session) -> Option<PartialGradient> {
        match *node.borrow_element_data() {
            ElementData::LinearGradient(ref g) => {
                Some(g.common.partial(node, Geometry::Linear(g.coords), session))
            }
            ElementData::RadialGradient(ref g) => {
                Some(g.common.partial(node, Geometry::Radial(g.coords), session))
            }
            _ => None,
        }
    }

    fn is_complete(&self) -> bool {
        self.units.is_some()
            && self.transform.is_some()
            && self.spread.is_some()
            && self.stops.is_some()
            && self.geometry.is_complete()
    }

    /// Fills the missing parts from `fallback` and continues the chain with its `href`.
    fn inherit_from(self, fallback: PartialGradient) -> PartialGradient {
        PartialGradient {
            units: self.units.or(fallback.units),
            transform: self.transform.or(fallback.transform),
            spread: self.spread.or(fallback.spread),
            stops: self.stops.or(fallback.stops),
            geometry: self.geometry.or(fallback.geometry),
            href: fallback.href,
        }
    }

    /// Applies the initial values and converts lengths to user units.
    ///
    /// `values` and `viewport` belong to the element being painted.
    fn finish(self, values: &ComputedValues, viewport: &Viewport) -> scene::Gradient {
        let units = CoordUnits::from(self.units.unwrap_or_default());
        let params = NormalizeParams::new(values, &viewport.with_units(units));

        scene::Gradient {
            variant: self.geometry.to_user(&params),
            stops: self.stops.unwrap_or_default(),
            spread: self.spread.unwrap_or_default(),
            units,
            transform: self.transform.unwrap_or_default(),
        }
    }
}

/// Resolves the gradient element in `node` along its chain of `href` references.
///
/// It is an error if `node` or anything in the chain is not a gradient, or if the
/// chain comes back to a gradient already in it.
pub fn resolve_gradient(
    node: &Node,
    builder: &mut SceneBuilder<'_>,
    values: &ComputedValues,
    viewport: &Viewport,
) -> Result<scene::Gradient, AcquireError> {
    let session = builder.session().clone();

    let not_a_gradient = || {
        let id = node.borrow_element().get_id().unwrap_or_default().to_string();
        AcquireError::InvalidLinkType(NodeId::new(&id))
    };

    let mut gradient = PartialGradient::from_node(node, &session).ok_or_else(not_a_gradient)?;

    let mut chain = NodeStack::default();
    chain.push(node);

    while !gradient.is_complete() {
        let Some(node_id) = gradient.href.clone() else {
            break;
        };

        let acquired = builder.acquired_nodes().acquire(&node_id)?;
        let next = acquired.get();

        if chain.contains(next) {
            return Err(AcquireError::CircularReference(next.clone()));
        }

        let fallback = PartialGradient::from_node(next, &session)
            .ok_or(AcquireError::InvalidLinkType(node_id))?;

        gradient = gradient.inherit_from(fallback);
        chain.push(next);
    }

    Ok(gradient.finish(values, viewport))
}
