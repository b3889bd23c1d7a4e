//! The `clipPath` element.

use crate::coord_units;
use crate::coord_units::CoordUnits;
use crate::element::{read_attributes, ElementTrait};
use crate::layout::Viewport;
use crate::node::{CascadedValues, Node, NodeBorrow, NodeLower};
use crate::properties::{ClipRule, FillRule};
use crate::scene::{self, ClipShape, DrawNode, Geometry, SceneBuilder, Shape};
use crate::session::Session;
use crate::transform::Transform;
use crate::xml::Attributes;

coord_units!(ClipPathUnits, CoordUnits::UserSpaceOnUse);

#[derive(Default)]
pub struct ClipPath {
    units: ClipPathUnits,
}

impl ClipPath {
    pub fn get_units(&self) -> CoordUnits {
        CoordUnits::from(self.units)
    }

    /// Lowers the clip path's children into outlines.
    ///
    /// Children take their styles from the place where the `<clipPath>` is defined,
    /// not from the element that references it.  Invisible children do not contribute
    /// to the clip region.
    pub fn lower_clip(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        viewport: &Viewport,
    ) -> scene::ClipPath {
        let units = self.get_units();
        let viewport = viewport.with_units(units);

        let cascaded = CascadedValues::new_from_node(node);
        let values = cascaded.get();

        let clip = builder.resolve_clip_path(node, values, &viewport);

        let mut shapes = Vec::new();

        for child in node.children().filter(|c| c.is_element()) {
            let lowered = child.lower(builder, &CascadedValues::new_from_node(&child), &viewport);

            if let Some(draw_node) = lowered {
                collect_shapes(&draw_node, Transform::identity(), &mut shapes);
            }
        }

        scene::ClipPath {
            units,
            transform: values.transform(),
            shapes,
            clip,
        }
    }
}

impl ElementTrait for ClipPath {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, { "clipPathUnits" => self.units, });
    }
}

fn collect_shapes(node: &DrawNode, transform: Transform, shapes: &mut Vec<ClipShape>) {
    match *node {
        DrawNode::Group(ref group) => {
            let transform = transform.pre_transform(&group.common.transform);

            for child in &group.children {
                collect_shapes(child, transform, shapes);
            }
        }

        DrawNode::Path(ref s) => push_shape(s, transform, shapes),
        DrawNode::Rect(ref s) => push_shape(s, transform, shapes),
        DrawNode::Circle(ref s) => push_shape(s, transform, shapes),
        DrawNode::Ellipse(ref s) => push_shape(s, transform, shapes),
        DrawNode::Line(ref s) => push_shape(s, transform, shapes),
        DrawNode::Polyline(ref s) => push_shape(s, transform, shapes),
        DrawNode::Polygon(ref s) => push_shape(s, transform, shapes),

        DrawNode::Text(_) | DrawNode::Unsupported(_) => (),
    }
}

fn push_shape<G: Geometry>(shape: &Shape<G>, transform: Transform, shapes: &mut Vec<ClipShape>) {
    if !shape.is_visible {
        return;
    }

    let rule = match shape.clip_rule {
        ClipRule::NonZero => FillRule::NonZero,
        ClipRule::EvenOdd => FillRule::EvenOdd,
    };

    shapes.push(ClipShape {
        path: shape.to_path(),
        transform: transform.pre_transform(&shape.common.transform),
        rule,
    });
}
