//! The scene graph: a tree of drawable nodes with resolved styling.
//!
//! The element tree from the XML document is lowered into a tree of [`DrawNode`] by
//! [`SceneBuilder`].  By then, all lengths are in user units, all properties have been
//! computed, and all references to other elements have been resolved; the rasterizer
//! only needs to walk the tree.
//!
//! The tree cannot have cycles.  References that would create one are rejected while
//! lowering.

use rgb::RGBA8;
use std::rc::Rc;

use crate::coord_units::CoordUnits;
use crate::error::UnsupportedFeatureError;
use crate::gradient::SpreadMethod;
use crate::path_builder::Path;
use crate::properties::{ClipRule, FillRule, PaintOrder, StrokeLinecap, StrokeLinejoin};
use crate::rect::Rect;
use crate::transform::Transform;
use crate::unit_interval::UnitInterval;

mod builder;
mod geometry;

pub use builder::SceneBuilder;
pub use geometry::{
    CircleGeometry, EllipseGeometry, Geometry, LineGeometry, PolyGeometry, RectGeometry,
};

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub enum DrawNode {
    Group(Box<Group>),
    Path(Box<Shape<Path>>),
    Rect(Box<Shape<RectGeometry>>),
    Circle(Box<Shape<CircleGeometry>>),
    Ellipse(Box<Shape<EllipseGeometry>>),
    Line(Box<Shape<LineGeometry>>),
    Polyline(Box<Shape<PolyGeometry>>),
    Polygon(Box<Shape<PolyGeometry>>),
    Text(Box<TextNode>),

    /// Placeholder for something that was recognized but is not rendered.
    Unsupported(UnsupportedFeatureError),
}

/// Properties that every rendered node has.
#[derive(Debug, Clone)]
pub struct NodeCommon {
    /// Transform from this node's user space to its parent's.
    pub transform: Transform,
    pub opacity: UnitInterval,
    pub clip: Option<Rc<ClipPath>>,
}

impl Default for NodeCommon {
    fn default() -> NodeCommon {
        NodeCommon {
            transform: Transform::identity(),
            opacity: UnitInterval(1.0),
            clip: None,
        }
    }
}

impl NodeCommon {
    /// Whether the node needs an offscreen layer to be composited.
    pub fn needs_layer(&self) -> bool {
        !self.opacity.is_opaque() || self.clip.is_some()
    }
}

/// A container of nodes, drawn in order.
#[derive(Debug, Default, Clone)]
pub struct Group {
    pub common: NodeCommon,

    /// Rectangle in this group's user space outside of which nothing is drawn.
    ///
    /// This is the viewport of nested `<svg>` elements and of instanced symbols.
    pub clip_rect: Option<Rect>,

    pub children: Vec<DrawNode>,
}

/// A shape with its geometry in user units, ready for rendering.
#[derive(Debug, Clone)]
pub struct Shape<G> {
    pub geometry: G,
    pub common: NodeCommon,

    /// Invisible shapes still take part in clip paths; they just don't paint.
    pub is_visible: bool,

    /// Fill rule when the shape is a child of a clip path.
    pub clip_rule: ClipRule,

    pub paint_order: PaintOrder,
    pub fill: Fill,
    pub stroke: Stroke,
}

impl<G: Geometry> Shape<G> {
    pub fn to_path(&self) -> Path {
        self.geometry.to_path()
    }
}

#[derive(Debug, Clone)]
pub struct Fill {
    pub paint: Paint,
    pub opacity: UnitInterval,
    pub rule: FillRule,
}

/// Stroke parameters in user-space coordinates.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub paint: Paint,
    pub opacity: UnitInterval,
    pub width: f64,
    pub line_cap: StrokeLinecap,
    pub line_join: StrokeLinejoin,
    pub miter_limit: f64,

    /// Dash lengths; empty for a solid stroke, otherwise of even length.
    pub dashes: Box<[f64]>,
    pub dash_offset: f64,
}

impl Stroke {
    /// Whether the stroke paints anything at all.
    pub fn is_painted(&self) -> bool {
        !matches!(self.paint, Paint::None) && self.width > 0.0 && self.opacity.0 > 0.0
    }
}

/// What to fill or stroke a shape with.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,

    /// Straight-alpha color.
    Solid(RGBA8),

    Gradient(Rc<Gradient>),
}

/// A gradient with all of its `href` fallbacks and defaults resolved.
///
/// For `objectBoundingBox` units, coordinates are fractions of the bounding box of
/// the painted shape; that box is only known at rendering time.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub variant: GradientVariant,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMethod,
    pub units: CoordUnits,
    pub transform: Transform,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GradientVariant {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    Radial {
        cx: f64,
        cy: f64,
        r: f64,
        fx: f64,
        fy: f64,
        fr: f64,
    },
}

/// Gradient stop; offsets are non-decreasing within a gradient.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub offset: f64,

    /// Straight-alpha color, with `stop-opacity` already applied.
    pub color: RGBA8,
}

/// A resolved `<clipPath>`.
#[derive(Debug, Clone)]
pub struct ClipPath {
    pub units: CoordUnits,

    /// The `transform` of the `<clipPath>` element itself.
    pub transform: Transform,

    pub shapes: Vec<ClipShape>,

    /// Clip path referenced by the `<clipPath>` element; both are intersected.
    pub clip: Option<Rc<ClipPath>>,
}

/// One of the children of a clip path, flattened to its outline.
#[derive(Debug, Clone)]
pub struct ClipShape {
    pub path: Path,

    /// Transform from the shape's space to the clip path's space.
    pub transform: Transform,

    pub rule: FillRule,
}

/// Text content; it is recorded but produces no pixels.
#[derive(Debug, Clone)]
pub struct TextNode {
    pub common: NodeCommon,
    pub content: String,
}
