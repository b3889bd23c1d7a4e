//! Nodes of the document tree.
//!
//! The tree is an [`rctree`] tree of [`NodeData`].  Elements carry their attributes,
//! their cascade state and their element-specific data; text nodes carry character
//! data, which only `<text>` elements look at.

use markup5ever::QualName;
use std::cell::{Ref, RefMut};
use std::fmt;

use crate::element::*;
use crate::layout::Viewport;
use crate::properties::ComputedValues;
use crate::scene::{DrawNode, SceneBuilder};
use crate::session::Session;
use crate::svg2png_log;
use crate::text::Chars;
use crate::xml::Attributes;

/// A strong reference to a node; cloning it is cheap.
pub type Node = rctree::Node<NodeData>;

pub enum NodeData {
    Element(Box<Element>),
    Text(Box<Chars>),
}

impl NodeData {
    pub fn new_element(session: &Session, name: &QualName, attrs: Attributes) -> NodeData {
        NodeData::Element(Box::new(Element::new(session, name, attrs)))
    }

    pub fn new_chars(initial_text: &str) -> NodeData {
        NodeData::Text(Box::new(Chars::new(initial_text)))
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeData::Element(e) => fmt::Display::fmt(e, f),
            NodeData::Text(_) => f.write_str("#text"),
        }
    }
}

/// The computed values to lower an element with.
///
/// Normally these are the ones stored in the element by the document-wide cascade.
/// Content instantiated by `<use>` is cascaded again from the `<use>` element, so it
/// carries its own values instead.
pub enum CascadedValues<'a> {
    FromNode(Ref<'a, Element>),
    FromValues(Box<ComputedValues>),
}

impl<'a> CascadedValues<'a> {
    /// The values stored in `node`; for the root, and for elements like `<clipPath>`
    /// whose content cascades from where it is defined.
    pub fn new_from_node(node: &Node) -> CascadedValues<'_> {
        CascadedValues::FromNode(node.borrow_element())
    }

    /// Cascades `node` again with `values` as its parent's computed values.
    pub fn new_from_values(node: &'a Node, values: &ComputedValues) -> CascadedValues<'a> {
        let mut computed = Box::new(values.clone());
        node.borrow_element()
            .get_specified_values()
            .to_computed_values(&mut computed);

        CascadedValues::FromValues(computed)
    }

    /// The values for a child of the element that `self` belongs to, in the same mode.
    pub fn clone_with_node(&self, node: &'a Node) -> CascadedValues<'a> {
        match self {
            CascadedValues::FromNode(_) => CascadedValues::new_from_node(node),
            CascadedValues::FromValues(values) => CascadedValues::new_from_values(node, values),
        }
    }

    pub fn get(&'a self) -> &'a ComputedValues {
        match self {
            CascadedValues::FromNode(e) => e.get_computed_values(),
            CascadedValues::FromValues(values) => values,
        }
    }
}

/// Typed access to the contents of a [`Node`].
///
/// The `borrow_*` methods panic when the node is of the other kind; check with
/// `is_element` or `is_chars` first.
pub trait NodeBorrow {
    fn is_element(&self) -> bool;

    fn is_chars(&self) -> bool;

    fn borrow_chars(&self) -> Ref<'_, Chars>;

    fn borrow_element(&self) -> Ref<'_, Element>;

    fn borrow_element_mut(&self) -> RefMut<'_, Element>;

    /// Shortcut to the element-specific data, for matching on the element's kind.
    fn borrow_element_data(&self) -> Ref<'_, ElementData>;
}

impl NodeBorrow for Node {
    fn is_element(&self) -> bool {
        matches!(*self.borrow(), NodeData::Element(_))
    }

    fn is_chars(&self) -> bool {
        matches!(*self.borrow(), NodeData::Text(_))
    }

    fn borrow_chars(&self) -> Ref<'_, Chars> {
        Ref::map(self.borrow(), |data| match data {
            NodeData::Text(chars) => &**chars,
            NodeData::Element(_) => panic!("borrow_chars() called on an element"),
        })
    }

    fn borrow_element(&self) -> Ref<'_, Element> {
        Ref::map(self.borrow(), |data| match data {
            NodeData::Element(e) => &**e,
            NodeData::Text(_) => panic!("borrow_element() called on a text node"),
        })
    }

    fn borrow_element_mut(&self) -> RefMut<'_, Element> {
        RefMut::map(self.borrow_mut(), |data| match data {
            NodeData::Element(e) => &mut **e,
            NodeData::Text(_) => panic!("borrow_element_mut() called on a text node"),
        })
    }

    fn borrow_element_data(&self) -> Ref<'_, ElementData> {
        Ref::map(self.borrow_element(), |e| &e.element_data)
    }
}

/// `is_element_of_type!(node, Stop)` is true if `node` is a `<stop>`.
#[doc(hidden)]
#[macro_export]
macro_rules! is_element_of_type {
    ($node:expr, $element_type:ident) => {
        matches!(
            *$node.borrow_element_data(),
            $crate::element::ElementData::$element_type(_)
        )
    };
}

/// Borrows the data of an element whose kind is already known, like
/// `borrow_element_as!(node, Svg)`.
#[doc(hidden)]
#[macro_export]
macro_rules! borrow_element_as {
    ($node:expr, $element_type:ident) => {
        std::cell::Ref::map($node.borrow_element_data(), |data| match data {
            $crate::element::ElementData::$element_type(e) => &**e,
            _ => panic!("element is not a {}", stringify!($element_type)),
        })
    };
}

pub trait NodeCascade {
    /// Stores computed values in this element and all its descendants, starting from
    /// the parent's `values`.
    fn cascade(&self, values: &ComputedValues);
}

impl NodeCascade for Node {
    fn cascade(&self, values: &ComputedValues) {
        // boxed to keep the frames of this recursion small
        let mut computed = Box::new(values.clone());

        {
            let mut element = self.borrow_element_mut();
            element.get_specified_values().to_computed_values(&mut computed);
            element.set_computed_values(&computed);
        }

        for child in self.children().filter(Node::is_element) {
            child.cascade(&computed);
        }
    }
}

/// Turning elements into scene nodes.
pub trait NodeLower {
    /// Returns `None` for nodes that draw nothing, like hidden elements or elements
    /// that are only used by reference.
    fn lower(
        &self,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode>;

    /// Lowers the element children in document order.
    fn lower_children(
        &self,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Vec<DrawNode>;
}

impl NodeLower for Node {
    fn lower(
        &self,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        if !self.is_element() || !builder.has_room_for_node() {
            return None;
        }

        let element = self.borrow_element();
        let lowered = element.lower(self, builder, cascaded, viewport);

        if lowered.is_some() {
            builder.count_draw_node();
        } else {
            svg2png_log!(builder.session(), "({} draws nothing)", element);
        }

        lowered
    }

    fn lower_children(
        &self,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Vec<DrawNode> {
        let mut lowered = Vec::new();

        for child in self.children().filter(Node::is_element) {
            let child_cascaded = cascaded.clone_with_node(&child);

            if let Some(node) = child.lower(builder, &child_cascaded, viewport) {
                lowered.push(node);
            }
        }

        lowered
    }
}
