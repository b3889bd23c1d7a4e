//! Structural elements in SVG: the `g`, `switch`, `svg`, `use`, `symbol`, `a` elements.

use crate::aspect_ratio::*;
use crate::element::{read_attributes, ElementTrait};
use crate::error::AcquireError;
use crate::href::Href;
use crate::layout::{IntrinsicDimensions, Viewport};
use crate::length::*;
use crate::node::{CascadedValues, Node, NodeBorrow, NodeLower};
use crate::rect::Rect;
use crate::scene::{self, DrawNode, NodeCommon, SceneBuilder};
use crate::session::Session;
use crate::svg2png_log;
use crate::transform::Transform;
use crate::viewbox::*;
use crate::xml::Attributes;
use crate::{borrow_element_as, is_element_of_type};

/// Lowers a container whose children are drawn in its own user space.
fn lower_group(
    node: &Node,
    builder: &mut SceneBuilder<'_>,
    cascaded: &CascadedValues<'_>,
    viewport: &Viewport,
) -> Option<DrawNode> {
    let values = cascaded.get();

    let common = builder.node_common(node, values, viewport);
    let children = node.lower_children(builder, cascaded, viewport);

    Some(DrawNode::Group(Box::new(scene::Group {
        common,
        clip_rect: None,
        children,
    })))
}

/// Wraps the contents of a new viewport.
///
/// The outer group clips to `rect`; the inner one maps the viewBox onto it.
fn viewport_group(
    common: NodeCommon,
    clip_rect: Option<Rect>,
    vbox_transform: Transform,
    children: Vec<DrawNode>,
) -> DrawNode {
    let inner = scene::Group {
        common: NodeCommon {
            transform: vbox_transform,
            ..Default::default()
        },
        clip_rect: None,
        children,
    };

    DrawNode::Group(Box::new(scene::Group {
        common,
        clip_rect,
        children: vec![DrawNode::Group(Box::new(inner))],
    }))
}

#[derive(Default)]
pub struct Group();

impl ElementTrait for Group {
    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        lower_group(node, builder, cascaded, viewport)
    }
}

/// A no-op node that does not render anything
///
/// Sometimes we just need a node that can contain children, but doesn't
/// render itself or its children.  This is just that kind of node.
#[derive(Default)]
pub struct NonRendering;

impl ElementTrait for NonRendering {}

/// The `<switch>` element; only its first child that produces something is drawn.
#[derive(Default)]
pub struct Switch();

impl ElementTrait for Switch {
    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let values = cascaded.get();
        let common = builder.node_common(node, values, viewport);

        let chosen = node.children().filter(|c| c.is_element()).find_map(|child| {
            child.lower(
                builder,
                &CascadedValues::clone_with_node(cascaded, &child),
                viewport,
            )
        });

        Some(DrawNode::Group(Box::new(scene::Group {
            common,
            clip_rect: None,
            children: chosen.into_iter().collect(),
        })))
    }
}

/// The `<svg>` element.
#[derive(Default)]
pub struct Svg {
    x: Length<Horizontal>,
    y: Length<Vertical>,
    width: Option<ULength<Horizontal>>,
    height: Option<ULength<Vertical>>,
    vbox: Option<ViewBox>,
    preserve_aspect_ratio: AspectRatio,
}

impl Svg {
    /// The size that the toplevel `<svg>` declares for itself.
    ///
    /// Lengths that need a viewport to be resolved, like percentages, are treated as
    /// missing.
    pub fn get_intrinsic_dimensions(&self) -> IntrinsicDimensions {
        IntrinsicDimensions {
            width: self.width.and_then(|l| l.to_absolute_px()),
            height: self.height.and_then(|l| l.to_absolute_px()),
            vbox: self.vbox,
        }
    }

    fn get_viewport_rect(&self, params: &NormalizeParams) -> Rect {
        let x = self.x.to_user(params);
        let y = self.y.to_user(params);
        let w = self
            .width
            .unwrap_or_else(|| ULength::new(1.0, LengthUnit::Percent))
            .to_user(params);
        let h = self
            .height
            .unwrap_or_else(|| ULength::new(1.0, LengthUnit::Percent))
            .to_user(params);

        Rect::new(x, y, x + w, y + h)
    }
}

impl ElementTrait for Svg {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "x" => self.x,
            "y" => self.y,
            "width" => self.width,
            "height" => self.height,
            "viewBox" => self.vbox,
            "preserveAspectRatio" => self.preserve_aspect_ratio,
        });
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        // The toplevel viewport is set up by the layout resolver.
        if node.parent().is_none() {
            return lower_group(node, builder, cascaded, viewport);
        }

        let values = cascaded.get();
        let params = NormalizeParams::new(values, viewport);
        let rect = self.get_viewport_rect(&params);

        let Some(vbox_transform) = self
            .preserve_aspect_ratio
            .viewport_to_viewbox_transform(self.vbox, &rect)
        else {
            svg2png_log!(
                builder.session(),
                "{} has an empty viewport or viewBox; not drawing it",
                node.borrow_element()
            );
            return None;
        };

        let common = builder.node_common(node, values, viewport);

        let inner_viewport = Viewport::new(
            self.vbox
                .map(|v| v.rect())
                .unwrap_or_else(|| Rect::from_size(rect.width(), rect.height())),
        );
        let children = node.lower_children(builder, cascaded, &inner_viewport);

        let clip_rect = if values.is_overflow() { None } else { Some(rect) };

        Some(viewport_group(common, clip_rect, vbox_transform, children))
    }
}

/// The `<symbol>` element; it is only drawn when instanced by a `<use>`.
#[derive(Default)]
pub struct Symbol {
    preserve_aspect_ratio: AspectRatio,
    vbox: Option<ViewBox>,
}

impl Symbol {
    /// Lowers the symbol's contents into a viewport of `width`×`height` at the origin.
    fn lower_instance(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
        width: f64,
        height: f64,
    ) -> Option<DrawNode> {
        let values = cascaded.get();
        let rect = Rect::from_size(width, height);

        let vbox_transform = self
            .preserve_aspect_ratio
            .viewport_to_viewbox_transform(self.vbox, &rect)?;

        let common = builder.node_common(node, values, viewport);

        let inner_viewport = Viewport::new(self.vbox.map(|v| v.rect()).unwrap_or(rect));
        let children = node.lower_children(builder, cascaded, &inner_viewport);

        let clip_rect = if values.is_overflow() { None } else { Some(rect) };

        Some(viewport_group(common, clip_rect, vbox_transform, children))
    }
}

impl ElementTrait for Symbol {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "viewBox" => self.vbox,
            "preserveAspectRatio" => self.preserve_aspect_ratio,
        });
    }
}

#[derive(Default)]
pub struct Use {
    link: Href,
    x: Length<Horizontal>,
    y: Length<Vertical>,
    width: Option<ULength<Horizontal>>,
    height: Option<ULength<Vertical>>,
}

impl ElementTrait for Use {
    fn set_attributes(&mut self, attrs: &Attributes, session: &Session) {
        read_attributes!(attrs, session, {
            "x" => self.x,
            "y" => self.y,
            "width" => self.width,
            "height" => self.height,
        });

        self.link = Href::from_attributes(attrs);
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let node_id = self.link.node_id(builder.session())?;

        let target = match builder.acquired_nodes().acquire(&node_id) {
            Ok(acquired) => acquired.get().clone(),
            Err(e) => {
                svg2png_log!(
                    builder.session(),
                    "element {} could not reference \"{}\": {}",
                    node.borrow_element(),
                    node_id,
                    e
                );
                return None;
            }
        };

        if node.ancestors().any(|ancestor| ancestor == target) {
            svg2png_log!(
                builder.session(),
                "{} references its own ancestor {}; not drawing it",
                node.borrow_element(),
                node_id
            );
            return None;
        }

        // Held while the instance is lowered, so a <use> inside it cannot instance it again.
        let _guard = match builder.acquired_nodes().acquire_ref(&target) {
            Ok(guard) => guard,
            Err(AcquireError::CircularReference(_)) => {
                svg2png_log!(
                    builder.session(),
                    "circular reference through {}; not drawing {}",
                    node_id,
                    node.borrow_element()
                );
                return None;
            }
            Err(e) => {
                svg2png_log!(builder.session(), "{}", e);
                return None;
            }
        };

        let values = cascaded.get();
        let params = NormalizeParams::new(values, viewport);
        let x = self.x.to_user(&params);
        let y = self.y.to_user(&params);

        let target_cascaded = CascadedValues::new_from_values(&target, values);

        let instance = if is_element_of_type!(target, Symbol) {
            let width = self
                .width
                .unwrap_or_else(|| ULength::new(1.0, LengthUnit::Percent))
                .to_user(&params);
            let height = self
                .height
                .unwrap_or_else(|| ULength::new(1.0, LengthUnit::Percent))
                .to_user(&params);

            if !target_cascaded.get().is_displayed() {
                None
            } else {
                borrow_element_as!(target, Symbol).lower_instance(
                    &target,
                    builder,
                    &target_cascaded,
                    viewport,
                    width,
                    height,
                )
            }
        } else {
            target.lower(builder, &target_cascaded, viewport)
        };

        let mut common = builder.node_common(node, values, viewport);
        common.transform = common.transform.pre_translate(x, y);

        Some(DrawNode::Group(Box::new(scene::Group {
            common,
            clip_rect: None,
            children: instance.into_iter().collect(),
        })))
    }
}

/// The `<a>` element; it is drawn like a group.
#[derive(Default)]
pub struct Link {
    link: Href,
}

impl ElementTrait for Link {
    fn set_attributes(&mut self, attrs: &Attributes, _session: &Session) {
        self.link = Href::from_attributes(attrs);
    }

    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        if let Some(link) = self.link.get() {
            svg2png_log!(builder.session(), "drawing link to {} as a group", link);
        }

        lower_group(node, builder, cascaded, viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::Document;
    use crate::scene::Paint;

    fn load(markup: &str) -> Document {
        Document::load_from_str(&Session::new_for_test_suite(), markup).unwrap()
    }

    fn only_group(node: &DrawNode) -> &scene::Group {
        match node {
            DrawNode::Group(g) => g,
            _ => panic!("expected a group, got {node:?}"),
        }
    }

    #[test]
    fn intrinsic_dimensions_ignore_percentages() {
        let doc = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="50%" height="1in" viewBox="0 0 10 20"/>"#,
        );

        let dims = doc.intrinsic_dimensions();
        assert_eq!(dims.width, None);
        assert_eq!(dims.height, Some(96.0));
        assert_eq!(dims.vbox.unwrap().rect(), Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn nested_svg_clips_and_maps_its_viewbox() {
        let doc = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <svg x="10" y="10" width="20" height="20" viewBox="0 0 10 10">
                   <rect width="10" height="10"/>
                 </svg>
               </svg>"#,
        );

        let outer = only_group(&doc.root().children[0]);
        assert_eq!(outer.clip_rect, Some(Rect::new(10.0, 10.0, 30.0, 30.0)));

        let inner = only_group(&outer.children[0]);
        assert_eq!(
            inner.common.transform,
            Transform::new_translate(10.0, 10.0).pre_scale(2.0, 2.0)
        );
    }

    #[test]
    fn nested_svg_with_visible_overflow_does_not_clip() {
        let doc = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <svg width="20" height="20" overflow="visible"/>
               </svg>"#,
        );

        assert_eq!(only_group(&doc.root().children[0]).clip_rect, None);
    }

    #[test]
    fn switch_draws_only_the_first_child() {
        let doc = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <switch>
                   <g display="none"/>
                   <rect width="1" height="1"/>
                   <circle r="5"/>
                 </switch>
               </svg>"#,
        );

        let switch = only_group(&doc.root().children[0]);
        assert_eq!(switch.children.len(), 1);
        assert!(matches!(switch.children[0], DrawNode::Rect(_)));
    }

    #[test]
    fn symbol_is_only_drawn_through_use() {
        let doc = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <symbol id="s" viewBox="0 0 1 1"><rect width="1" height="1"/></symbol>
                 <use href="#s" x="5" y="6" width="10" height="10"/>
               </svg>"##,
        );

        assert_eq!(doc.root().children.len(), 1);

        let use_group = only_group(&doc.root().children[0]);
        assert_eq!(use_group.common.transform, Transform::new_translate(5.0, 6.0));

        let symbol = only_group(&use_group.children[0]);
        assert_eq!(symbol.clip_rect, Some(Rect::from_size(10.0, 10.0)));

        let contents = only_group(&symbol.children[0]);
        assert_eq!(contents.common.transform, Transform::new_scale(10.0, 10.0));
    }

    #[test]
    fn use_instances_with_its_own_cascade() {
        let doc = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <defs><rect id="r" width="10" height="10"/></defs>
                 <use xlink:href="#r" fill="lime" xmlns:xlink="http://www.w3.org/1999/xlink"/>
               </svg>"##,
        );

        let use_group = only_group(&doc.root().children[0]);
        match &use_group.children[0] {
            DrawNode::Rect(r) => {
                assert_eq!(r.fill.paint, Paint::Solid(rgb::RGBA8::new(0, 255, 0, 255)))
            }
            other => panic!("expected a rect, got {other:?}"),
        }
    }

    #[test]
    fn use_cycles_are_ignored() {
        let doc = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <g id="a"><use href="#b"/></g>
                 <g id="b"><use href="#a"/></g>
                 <g id="c"><use href="#c"/></g>
               </svg>"##,
        );

        // each <g> still draws, but the instance that closes the loop does not
        let a = only_group(&doc.root().children[0]);
        let use_b = only_group(&a.children[0]);
        let b = only_group(&use_b.children[0]);
        let use_a = only_group(&b.children[0]);
        let a_again = only_group(&use_a.children[0]);
        assert!(a_again.children.is_empty());

        let c = only_group(&doc.root().children[2]);
        assert!(c.children.is_empty());
    }

    #[test]
    fn use_with_missing_target_draws_nothing() {
        let doc = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                 <use href="#nope"/>
               </svg>"##,
        );

        assert!(doc.root().children.is_empty());
    }
}
