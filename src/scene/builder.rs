//! Lowering state shared by all the elements while the scene graph is built.

use std::rc::Rc;

use crate::document::AcquiredNodes;
use crate::error::{AcquireError, ImplementationLimit, LoadingError, UnsupportedFeatureError};
use crate::layout::Viewport;
use crate::length::NormalizeParams;
use crate::limits::MAX_DRAW_NODES;
use crate::node::{Node, NodeBorrow};
use crate::properties::ComputedValues;
use crate::session::Session;
use crate::svg2png_log;
use crate::{borrow_element_as, is_element_of_type};

use super::{ClipPath, Fill, NodeCommon, Shape, Stroke};

/// Carries the state needed to lower elements into [`super::DrawNode`]s.
///
/// Elements get a `&mut SceneBuilder` in their lowering functions.  It resolves
/// references to other elements through [`AcquiredNodes`], and it collects the
/// unsupported features that were found along the way.
///
/// It also counts the nodes that have been lowered.  Once there are
/// [`MAX_DRAW_NODES`] of them, lowering stops and the document fails to load.
pub struct SceneBuilder<'i> {
    session: Session,
    acquired_nodes: AcquiredNodes<'i>,
    unsupported: Vec<UnsupportedFeatureError>,
    num_draw_nodes: usize,
    overflowed: bool,
}

impl<'i> SceneBuilder<'i> {
    pub fn new(session: &Session, acquired_nodes: AcquiredNodes<'i>) -> SceneBuilder<'i> {
        SceneBuilder {
            session: session.clone(),
            acquired_nodes,
            unsupported: Vec::new(),
            num_draw_nodes: 0,
            overflowed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn acquired_nodes(&mut self) -> &mut AcquiredNodes<'i> {
        &mut self.acquired_nodes
    }

    /// Logs an unsupported feature and remembers it for [`crate::document::Document::unsupported`].
    pub fn record_unsupported(&mut self, error: UnsupportedFeatureError) {
        svg2png_log!(self.session, "{}", error);
        self.unsupported.push(error);
    }

    /// Whether another node may be lowered; once this returns `false`, the scene is
    /// incomplete and [`SceneBuilder::finish`] fails.
    pub fn has_room_for_node(&mut self) -> bool {
        if self.num_draw_nodes < MAX_DRAW_NODES {
            true
        } else {
            self.overflowed = true;
            false
        }
    }

    pub fn count_draw_node(&mut self) {
        self.num_draw_nodes += 1;
    }

    /// Returns the unsupported features, or an error if the scene got too large.
    pub fn finish(self) -> Result<Vec<UnsupportedFeatureError>, LoadingError> {
        if self.overflowed {
            Err(LoadingError::LimitExceeded(
                ImplementationLimit::TooManyDrawNodes,
            ))
        } else {
            Ok(self.unsupported)
        }
    }

    /// Resolves the properties that apply to every rendered element.
    ///
    /// Also reports `filter` and `mask`, which are parsed but not rendered; the element
    /// is drawn as if they were not there.
    pub fn node_common(
        &mut self,
        node: &Node,
        values: &ComputedValues,
        viewport: &Viewport,
    ) -> NodeCommon {
        if let Some(filter) = values.filter().0.get() {
            self.record_unsupported(UnsupportedFeatureError::Property {
                name: "filter".to_string(),
                value: filter.to_string(),
            });
        }

        if let Some(mask) = values.mask().0.get() {
            self.record_unsupported(UnsupportedFeatureError::Property {
                name: "mask".to_string(),
                value: format!("url({mask})"),
            });
        }

        NodeCommon {
            transform: values.transform(),
            opacity: values.opacity().0,
            clip: self.resolve_clip_path(node, values, viewport),
        }
    }

    /// Resolves the `clip-path` property of an element.
    ///
    /// Invalid references are logged and ignored, so the element is drawn unclipped.
    pub fn resolve_clip_path(
        &mut self,
        node: &Node,
        values: &ComputedValues,
        viewport: &Viewport,
    ) -> Option<Rc<ClipPath>> {
        let clip_path = values.clip_path();
        let node_id = clip_path.0.get()?;

        let acquired = match self.acquired_nodes.acquire(node_id) {
            Ok(acquired) => acquired,

            Err(AcquireError::CircularReference(_)) => {
                svg2png_log!(
                    self.session,
                    "element {} has a circular reference in clip-path=\"{}\"; ignoring it",
                    node.borrow_element(),
                    node_id
                );
                return None;
            }

            Err(e) => {
                svg2png_log!(
                    self.session,
                    "element {} has an invalid clip-path: {}",
                    node.borrow_element(),
                    e
                );
                return None;
            }
        };

        let clip_node = acquired.get().clone();

        if !is_element_of_type!(clip_node, ClipPath) {
            svg2png_log!(
                self.session,
                "element {} references \"{}\" which is not a clipPath",
                node.borrow_element(),
                node_id
            );
            return None;
        }

        let clip = borrow_element_as!(clip_node, ClipPath).lower_clip(&clip_node, self, viewport);
        Some(Rc::new(clip))
    }

    /// Builds a shape with the fill and stroke from its computed values.
    pub fn shape<G>(
        &mut self,
        node: &Node,
        geometry: G,
        values: &ComputedValues,
        viewport: &Viewport,
    ) -> Shape<G> {
        for (name, marker) in [
            ("marker-start", values.marker_start().0),
            ("marker-mid", values.marker_mid().0),
            ("marker-end", values.marker_end().0),
        ] {
            if let Some(id) = marker.get() {
                self.record_unsupported(UnsupportedFeatureError::Property {
                    name: name.to_string(),
                    value: format!("url({id})"),
                });
            }
        }

        let common = self.node_common(node, values, viewport);
        let params = NormalizeParams::new(values, viewport);

        let fill = Fill {
            paint: values.fill().0.resolve(self, values, viewport),
            opacity: values.fill_opacity().0,
            rule: values.fill_rule(),
        };

        let stroke = Stroke {
            paint: values.stroke().0.resolve(self, values, viewport),
            opacity: values.stroke_opacity().0,
            width: values.stroke_width().0.to_user(&params),
            line_cap: values.stroke_line_cap(),
            line_join: values.stroke_line_join(),
            miter_limit: values.stroke_miterlimit().0 .0,
            dashes: values
                .stroke_dasharray()
                .0
                .to_user(&params)
                .into_boxed_slice(),
            dash_offset: values.stroke_dashoffset().0.to_user(&params),
        };

        Shape {
            geometry,
            common,
            is_visible: values.is_visible(),
            clip_rule: values.clip_rule(),
            paint_order: values.paint_order(),
            fill,
            stroke,
        }
    }
}
