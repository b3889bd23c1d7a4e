//! Loaded documents, and resolution of references between their elements.

use markup5ever::QualName;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{AcquireError, LoadingError, NodeIdError, UnsupportedFeatureError};
use crate::layout::{IntrinsicDimensions, Size, Viewport};
use crate::limits;
use crate::node::{CascadedValues, Node, NodeBorrow, NodeCascade, NodeData, NodeLower};
use crate::properties::ComputedValues;
use crate::scene::{self, DrawNode, SceneBuilder};
use crate::session::Session;
use crate::svg2png_log;
use crate::xml::{xml_load_from_str, Attributes};
use crate::{borrow_element_as, is_element_of_type};

/// The target of a reference like `url(#foo)`.
///
/// Only references within the same document are supported, so this is just the
/// fragment part of a URL like `#foo`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: &str) -> NodeId {
        NodeId(id.to_string())
    }

    pub fn parse(href: &str) -> Result<NodeId, NodeIdError> {
        match href.rfind('#') {
            Some(0) if href.len() > 1 => Ok(NodeId(href[1..].to_string())),
            Some(p) if p > 0 && p + 1 < href.len() => Err(NodeIdError::ExternalReference),
            None if !href.is_empty() => Err(NodeIdError::ExternalReference),
            _ => Err(NodeIdError::NodeIdRequired),
        }
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A parsed SVG document, already lowered into a scene graph.
///
/// The tree of elements only lives while the document is being loaded; once the
/// scene graph is built, nothing refers to it anymore.
pub struct Document {
    /// Root of the scene graph; its children are those of the toplevel `<svg>`.
    root: scene::Group,

    /// The toplevel `<svg>` element's width, height and viewBox.
    dimensions: IntrinsicDimensions,

    /// Recognized constructs that do not render.
    unsupported: Vec<UnsupportedFeatureError>,
}

impl Document {
    /// Parses SVG markup into a `Document`.
    pub fn load_from_str(session: &Session, markup: &str) -> Result<Document, LoadingError> {
        xml_load_from_str(DocumentBuilder::new(session.clone()), markup)
    }

    /// The root group of the scene graph.
    pub fn root(&self) -> &scene::Group {
        &self.root
    }

    pub fn intrinsic_dimensions(&self) -> &IntrinsicDimensions {
        &self.dimensions
    }

    /// Size of the document in user units; see [`IntrinsicDimensions::base_size`].
    pub fn base_size(&self) -> Size {
        self.dimensions.base_size()
    }

    /// Features that were found in the document but that will not be rendered.
    pub fn unsupported(&self) -> &[UnsupportedFeatureError] {
        &self.unsupported
    }
}

/// Guard for a node obtained through [`AcquiredNodes`].
///
/// While it is alive, elements that are accessed by reference stay on the stack of
/// nodes being resolved.
pub struct AcquiredNode {
    node: Node,
    on_stack: Option<Rc<RefCell<NodeStack>>>,
}

impl AcquiredNode {
    pub fn get(&self) -> &Node {
        &self.node
    }
}

impl Drop for AcquiredNode {
    fn drop(&mut self) {
        if let Some(stack) = self.on_stack.take() {
            let popped = stack.borrow_mut().pop();
            debug_assert!(popped.as_ref() == Some(&self.node));
        }
    }
}

/// Resolves references by id while a scene is built.
///
/// Reference cycles like a clip path whose `clip-path` points to itself are detected
/// with a stack of the elements currently being resolved.  The total number of
/// resolved references is capped at [`limits::MAX_REFERENCED_ELEMENTS`], so that
/// documents which nest `<use>` elements to multiply their content run in bounded
/// time.
pub struct AcquiredNodes<'i> {
    ids: &'i HashMap<String, Node>,
    resolved: usize,
    stack: Rc<RefCell<NodeStack>>,
}

impl<'i> AcquiredNodes<'i> {
    pub fn new(ids: &'i HashMap<String, Node>) -> AcquiredNodes<'i> {
        AcquiredNodes {
            ids,
            resolved: 0,
            stack: Rc::default(),
        }
    }

    /// Looks up an element by its id.
    ///
    /// Elements for which [`is_accessed_by_reference`] is true go on the stack until
    /// the returned guard is dropped; acquiring one of them again in the meantime is
    /// a circular reference.
    ///
    /// [`is_accessed_by_reference`]: crate::element::Element::is_accessed_by_reference
    pub fn acquire(&mut self, node_id: &NodeId) -> Result<AcquiredNode, AcquireError> {
        self.resolved += 1;

        if self.resolved > limits::MAX_REFERENCED_ELEMENTS {
            return Err(AcquireError::MaxReferencesExceeded);
        }

        let Some(node) = self.ids.get(node_id.id()) else {
            return Err(AcquireError::LinkNotFound(node_id.clone()));
        };

        if !node.is_element() {
            return Err(AcquireError::InvalidLinkType(node_id.clone()));
        }

        if node.borrow_element().is_accessed_by_reference() {
            self.acquire_ref(node)
        } else {
            Ok(AcquiredNode {
                node: node.clone(),
                on_stack: None,
            })
        }
    }

    /// Pushes `node` on the stack unconditionally of its kind.
    ///
    /// `<use>` does this with its target, so that the instanced content cannot
    /// instance the same element again.
    pub fn acquire_ref(&self, node: &Node) -> Result<AcquiredNode, AcquireError> {
        if self.stack.borrow().contains(node) {
            return Err(AcquireError::CircularReference(node.clone()));
        }

        self.stack.borrow_mut().push(node);

        Ok(AcquiredNode {
            node: node.clone(),
            on_stack: Some(Rc::clone(&self.stack)),
        })
    }
}

/// Nodes in the order they were entered.
#[derive(Default)]
pub struct NodeStack {
    nodes: Vec<Node>,
}

impl NodeStack {
    pub fn push(&mut self, node: &Node) {
        self.nodes.push(node.clone());
    }

    pub fn pop(&mut self) -> Option<Node> {
        self.nodes.pop()
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }
}

/// Receives elements and text from the XML reader and assembles the [`Document`].
pub struct DocumentBuilder {
    session: Session,

    /// The first element; it must turn out to be an `<svg>`.
    tree: Option<Node>,

    ids: HashMap<String, Node>,

    /// Unsupported elements, in document order.
    unsupported: Vec<UnsupportedFeatureError>,
}

impl DocumentBuilder {
    pub fn new(session: Session) -> DocumentBuilder {
        DocumentBuilder {
            session,
            tree: None,
            ids: HashMap::new(),
            unsupported: Vec::new(),
        }
    }

    /// Creates an element and appends it to `parent`, or makes it the root when there
    /// is no parent.
    pub fn append_element(
        &mut self,
        name: &QualName,
        attrs: Attributes,
        parent: Option<Node>,
    ) -> Node {
        let node = Node::new(NodeData::new_element(&self.session, name, attrs));

        {
            let element = node.borrow_element();

            // an id keeps pointing to the first element that declared it
            if let Some(id) = element.get_id() {
                if !self.ids.contains_key(id) {
                    self.ids.insert(id.to_string(), node.clone());
                }
            }

            if let Some(e) = element.unsupported_feature() {
                svg2png_log!(self.session, "{}", e);
                self.unsupported.push(e.clone());
            }
        }

        match parent {
            Some(parent) => parent.append(node.clone()),
            None if self.tree.is_none() => self.tree = Some(node.clone()),
            None => (),
        }

        node
    }

    /// Appends character data to `parent`, merging it with a preceding text node.
    pub fn append_characters(&mut self, text: &str, parent: &mut Node) {
        if text.is_empty() {
            return;
        }

        match parent.last_child() {
            Some(last) if last.is_chars() => last.borrow_chars().append(text),
            _ => parent.append(Node::new(NodeData::new_chars(text))),
        }
    }

    /// Checks for an `<svg>` root, runs the cascade and lowers the tree into a scene.
    pub fn build(self) -> Result<Document, LoadingError> {
        let DocumentBuilder {
            session,
            tree,
            ids,
            mut unsupported,
        } = self;

        let root = match tree {
            Some(root) if root.is_element() && is_element_of_type!(root, Svg) => root,
            _ => return Err(LoadingError::NoSvgRoot),
        };

        root.cascade(&ComputedValues::default());

        let dimensions = borrow_element_as!(root, Svg).get_intrinsic_dimensions();
        let viewport = Viewport::new(dimensions.root_viewbox());

        let scene_root = {
            let mut builder = SceneBuilder::new(&session, AcquiredNodes::new(&ids));

            let lowered = root.lower(
                &mut builder,
                &CascadedValues::new_from_node(&root),
                &viewport,
            );

            unsupported.extend(builder.finish()?);

            match lowered {
                Some(DrawNode::Group(group)) => *group,
                _ => scene::Group::default(),
            }
        };

        Ok(Document {
            root: scene_root,
            dimensions,
            unsupported,
        })
    }
}
