//! Text elements: `text`, `tspan`.
//!
//! Text content is collected into the scene graph so that callers can see it, but no
//! glyphs are drawn.

use itertools::Itertools;
use std::cell::RefCell;

use crate::element::ElementTrait;
use crate::error::UnsupportedFeatureError;
use crate::layout::Viewport;
use crate::node::{CascadedValues, Node, NodeBorrow};
use crate::scene::{DrawNode, SceneBuilder, TextNode};

/// Character data inside an element.
pub struct Chars {
    string: RefCell<String>,
}

impl Chars {
    pub fn new(initial_text: &str) -> Chars {
        Chars {
            string: RefCell::new(String::from(initial_text)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.string.borrow().is_empty()
    }

    pub fn append(&self, s: &str) {
        self.string.borrow_mut().push_str(s);
    }

    pub fn get_string(&self) -> String {
        self.string.borrow().clone()
    }
}

/// Collects the text of all the character nodes under `node`, with runs of
/// whitespace collapsed to a single space.
fn collapsed_content(node: &Node) -> String {
    let raw = node
        .descendants()
        .filter(|n| n.is_chars())
        .map(|n| n.borrow_chars().get_string())
        .collect::<String>();

    raw.split_whitespace().join(" ")
}

#[derive(Default)]
pub struct Text;

impl ElementTrait for Text {
    fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        let content = collapsed_content(node);
        builder.record_unsupported(UnsupportedFeatureError::Text(content.clone()));

        let common = builder.node_common(node, cascaded.get(), viewport);

        Some(DrawNode::Text(Box::new(TextNode { common, content })))
    }
}

/// `<tspan>` only contributes its characters to the enclosing `<text>`.
#[derive(Default)]
pub struct TSpan;

impl ElementTrait for TSpan {}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::Document;
    use crate::session::Session;

    #[test]
    fn chars_append() {
        let chars = Chars::new("");
        assert!(chars.is_empty());

        chars.append("hello ");
        chars.append("world");
        assert_eq!(chars.get_string(), "hello world");
    }

    #[test]
    fn text_collects_collapsed_content() {
        let doc = Document::load_from_str(
            &Session::new_for_test_suite(),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
                 <text x="1" y="5">  Hello
                   <tspan>big</tspan>   world </text>
               </svg>"#,
        )
        .unwrap();

        match &doc.root().children[0] {
            DrawNode::Text(t) => assert_eq!(t.content, "Hello big world"),
            other => panic!("expected text, got {other:?}"),
        }

        assert_eq!(
            doc.unsupported(),
            &[UnsupportedFeatureError::Text("Hello big world".to_string())]
        );
    }

    #[test]
    fn tspan_outside_text_draws_nothing() {
        let doc = Document::load_from_str(
            &Session::new_for_test_suite(),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><tspan>x</tspan></svg>"#,
        )
        .unwrap();

        assert!(doc.root().children.is_empty());
    }
}
