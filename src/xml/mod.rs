//! The main XML parser.
//!
//! The markup is parsed into a [`roxmltree::Document`] first, and then its nodes are
//! replayed as a stream of start-element / characters / end-element events into an
//! [`XmlState`], which creates our own tree of nodes through a [`DocumentBuilder`].

use markup5ever::{LocalName, Namespace, QualName};
use std::str;

use crate::document::{Document, DocumentBuilder};
use crate::error::{ImplementationLimit, LoadingError};
use crate::limits::MAX_LOADED_ELEMENTS;
use crate::node::Node;

mod attributes;

pub use attributes::Attributes;

#[derive(Clone)]
enum Context {
    // Starting state
    Start,

    // Creating nodes for elements under the current node
    ElementCreation,

    // An XML parsing error was found.  We will no-op upon any further XML events.
    FatalError(LoadingError),
}

/// Holds the state used for XML processing
///
/// These methods are called when an XML event is parsed out of the XML stream:
/// `start_element`, `end_element`, `characters`.
///
/// When an element starts, we push a corresponding `Context` into the `context_stack`.
/// Within that context, all XML events will be forwarded to it.
struct XmlState {
    document_builder: DocumentBuilder,
    num_loaded_elements: usize,
    context_stack: Vec<Context>,
    current_node: Option<Node>,
}

impl XmlState {
    fn new(document_builder: DocumentBuilder) -> XmlState {
        XmlState {
            document_builder,
            num_loaded_elements: 0,
            context_stack: vec![Context::Start],
            current_node: None,
        }
    }

    fn context(&self) -> Context {
        self.context_stack
            .last()
            .cloned()
            .unwrap_or(Context::Start)
    }

    fn check_last_error(&self) -> Result<(), LoadingError> {
        match self.context() {
            Context::FatalError(e) => Err(e),
            _ => Ok(()),
        }
    }

    fn error(&mut self, e: LoadingError) {
        self.context_stack.push(Context::FatalError(e));
    }

    fn check_limits(&mut self) -> Result<(), ()> {
        if self.num_loaded_elements >= MAX_LOADED_ELEMENTS {
            self.error(LoadingError::LimitExceeded(
                ImplementationLimit::TooManyLoadedElements,
            ));
            Err(())
        } else {
            Ok(())
        }
    }

    fn start_element(&mut self, name: QualName, attrs: Attributes) -> Result<(), ()> {
        if let Context::FatalError(_) = self.context() {
            return Err(());
        }

        self.check_limits()?;

        self.num_loaded_elements += 1;

        let parent = self.current_node.clone();
        let node = self.document_builder.append_element(&name, attrs, parent);
        self.current_node = Some(node);

        self.context_stack.push(Context::ElementCreation);

        Ok(())
    }

    fn end_element(&mut self) {
        match self.context() {
            Context::ElementCreation => {
                self.current_node = self.current_node.take().and_then(|node| node.parent());
                self.context_stack.pop();
            }

            Context::Start | Context::FatalError(_) => (),
        }
    }

    fn characters(&mut self, text: &str) {
        match self.context() {
            Context::ElementCreation => {
                if let Some(mut parent) = self.current_node.clone() {
                    self.document_builder.append_characters(text, &mut parent);
                }
            }

            // Character data before the root element or after an error is ignored.
            Context::Start | Context::FatalError(_) => (),
        }
    }

    /// Replays the nodes of a parsed XML document as a stream of events.
    ///
    /// The walk uses sibling and parent links instead of recursion, so deeply nested
    /// markup does not grow the call stack.
    fn load(&mut self, doc: &roxmltree::Document<'_>) {
        let root = doc.root();
        let mut current = root.first_child();

        while let Some(node) = current {
            if node.is_element() {
                let tag = node.tag_name();
                let name = QualName::new(
                    None,
                    Namespace::from(tag.namespace().unwrap_or("")),
                    LocalName::from(tag.name()),
                );

                let attrs = Attributes::new_from_roxmltree(&node);

                if self.start_element(name, attrs).is_err() {
                    return;
                }

                if let Some(child) = node.first_child() {
                    current = Some(child);
                    continue;
                }

                self.end_element();
            } else if node.is_text() {
                if let Some(text) = node.text() {
                    self.characters(text);
                }
            }

            current = self.next_in_document_order(node, root);
        }
    }

    /// Finds the node after the subtree of `node`, closing the elements that end
    /// on the way up.
    fn next_in_document_order<'a, 'input>(
        &mut self,
        mut node: roxmltree::Node<'a, 'input>,
        root: roxmltree::Node<'a, 'input>,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        loop {
            if let Some(sibling) = node.next_sibling() {
                return Some(sibling);
            }

            match node.parent() {
                Some(parent) if parent != root => {
                    self.end_element();
                    node = parent;
                }

                _ => return None,
            }
        }
    }

    fn build_document(self) -> Result<Document, LoadingError> {
        self.check_last_error()?;
        self.document_builder.build()
    }
}

/// Parses SVG markup and builds a [`Document`] from it.
///
/// DTDs are allowed, so that entities declared in the internal subset work as
/// people expect.  Entity expansion is bounded by roxmltree itself.
pub fn xml_load_from_str(
    document_builder: DocumentBuilder,
    markup: &str,
) -> Result<Document, LoadingError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };

    let doc = roxmltree::Document::parse_with_options(markup, options)
        .map_err(|e| LoadingError::XmlParseError(e.to_string()))?;

    let mut state = XmlState::new(document_builder);
    state.load(&doc);
    state.build_document()
}
