//! Attributes of XML elements.

use std::slice;

use markup5ever::{expanded_name, local_name, namespace_url, ns, LocalName, Namespace, QualName};
use string_cache::DefaultAtom;

/// Interned attribute value; SVG files repeat the same values a lot.
pub type AttributeValue = DefaultAtom;

/// The attributes of one element, in document order.
#[derive(Clone, Default)]
pub struct Attributes {
    attrs: Box<[(QualName, AttributeValue)]>,
}

impl FromIterator<(QualName, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (QualName, AttributeValue)>>(iter: I) -> Self {
        Attributes {
            attrs: iter.into_iter().collect(),
        }
    }
}

impl Attributes {
    /// The attributes of a roxmltree element.  Namespace declarations are not
    /// included; roxmltree keeps them apart.
    pub fn new_from_roxmltree(node: &roxmltree::Node<'_, '_>) -> Attributes {
        node.attributes()
            .map(|attr| {
                let ns = attr.namespace().map_or_else(|| ns!(), Namespace::from);
                let name = QualName::new(None, ns, LocalName::from(attr.name()));

                (name, AttributeValue::from(attr.value()))
            })
            .collect()
    }

    /// Attributes without a namespace, for tests.
    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|&(name, value)| {
                (
                    QualName::new(None, ns!(), LocalName::from(name)),
                    AttributeValue::from(value),
                )
            })
            .collect()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> AttributesIter<'_> {
        AttributesIter(self.attrs.iter())
    }

    /// The value of the `id` attribute.
    pub fn get_id(&self) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.expanded() == expanded_name!("", "id"))
            .map(|(_, value)| &**value)
    }
}

pub struct AttributesIter<'a>(slice::Iter<'a, (QualName, AttributeValue)>);

impl<'a> Iterator for AttributesIter<'a> {
    type Item = (QualName, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (name, value) = self.0.next()?;
        Some((name.clone(), &**value))
    }
}
