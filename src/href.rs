//! Links from one element to another.
//!
//! SVG 1.1 only has `xlink:href`; SVG 2 adds a plain `href`
//! (<https://svgwg.org/svg2-draft/linking.html#XLinkRefAttrs>).  Documents written for
//! both have the two attributes, and then the plain one is used no matter the order.

use markup5ever::{expanded_name, local_name, namespace_url, ns, ExpandedName};

use crate::document::NodeId;
use crate::session::Session;
use crate::svg2png_log;
use crate::xml::Attributes;

/// Returns whether the attribute is either of `xlink:href` or `href`.
fn is_href(name: &ExpandedName<'_>) -> bool {
    matches!(
        *name,
        expanded_name!(xlink "href") | expanded_name!("", "href")
    )
}

/// Collects the `href` of an element while its attributes are being read.
///
/// # Example
///
/// ```
/// # use markup5ever::{expanded_name, local_name, namespace_url, ns};
/// # use svg2png::doctest_only::Href;
/// let mut href = Href::default();
///
/// href.set(&expanded_name!("", "href"), "#plain");
/// href.set(&expanded_name!(xlink "href"), "#xlink");
///
/// assert_eq!(href.get(), Some("#plain"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Href {
    value: Option<String>,
    is_plain: bool,
}

impl Href {
    /// Stores the value of an `href` or `xlink:href` attribute.
    ///
    /// A plain `href` always wins; an `xlink:href` only fills in a missing value.
    pub fn set(&mut self, name: &ExpandedName<'_>, value: &str) {
        let plain = *name == expanded_name!("", "href");

        if plain || !self.is_plain {
            self.value = Some(value.to_string());
            self.is_plain = plain;
        }
    }

    /// The link among `attrs`, if they have one.
    pub fn from_attributes(attrs: &Attributes) -> Href {
        let mut href = Href::default();

        for (attr, value) in attrs.iter() {
            let name = attr.expanded();
            if is_href(&name) {
                href.set(&name, value);
            }
        }

        href
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Parses the stored link as a same-document fragment reference.
    ///
    /// References that cannot be used, like `foo.svg#bar`, are logged and ignored.
    pub fn node_id(&self, session: &Session) -> Option<NodeId> {
        let value = self.value.as_ref()?;

        match NodeId::parse(value) {
            Ok(id) => Some(id),
            Err(e) => {
                svg2png_log!(session, "ignoring href=\"{}\": {:?}", value, e);
                None
            }
        }
    }
}
