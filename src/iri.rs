//! `url(#id)` references in property values, as in `clip-path="url(#c)"`.
//!
//! Plain links in attributes like `href` are handled by [`crate::href`] instead.

use cssparser::Parser;

use crate::document::NodeId;
use crate::error::*;
use crate::parsers::Parse;

/// `none`, or a same-document reference.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Iri {
    #[default]
    None,
    Resource(Box<NodeId>),
}

impl Iri {
    pub fn get(&self) -> Option<&NodeId> {
        match self {
            Iri::Resource(id) => Some(id),
            Iri::None => None,
        }
    }
}

impl Parse for Iri {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Iri, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("none"))
            .is_ok()
        {
            return Ok(Iri::None);
        }

        let loc = parser.current_source_location();
        let url = parser.expect_url()?;

        NodeId::parse(&url)
            .map(|id| Iri::Resource(Box::new(id)))
            .map_err(|e| loc.new_custom_error(ValueErrorKind::from(e)))
    }
}
