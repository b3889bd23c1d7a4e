//! Declarations of `style` attributes.
//!
//! Stylesheets are not supported, so the only CSS here is the declaration list
//! inside `style="..."`.  Property values go through [`parse_value`], just like
//! presentation attributes do.

use cssparser::{parse_important, AtRuleParser, CowRcStr, DeclarationParser, Parser};
use markup5ever::{namespace_url, ns, LocalName, QualName};

use crate::error::*;
use crate::properties::{parse_value, ParseAs, ParsedProperty};

/// One `name: value [!important]` declaration.
pub struct Declaration {
    pub prop_name: QualName,
    pub property: ParsedProperty,
    pub important: bool,
}

/// Hooks for `cssparser::DeclarationListParser`.
pub struct DeclParser;

impl<'i> DeclarationParser<'i> for DeclParser {
    type Declaration = Declaration;
    type Error = ValueErrorKind;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Declaration, ParseError<'i>> {
        let prop_name = QualName::new(None, ns!(), LocalName::from(&*name));
        let property = parse_value(&prop_name, input, ParseAs::Property)?;
        let important = input.try_parse(parse_important).is_ok();

        Ok(Declaration {
            prop_name,
            property,
            important,
        })
    }
}

// At-rules are rejected with the default methods.
impl<'i> AtRuleParser<'i> for DeclParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ValueErrorKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    use cssparser::{DeclarationListParser, ParserInput};

    fn parse_declarations(s: &str) -> Vec<Result<Declaration, ()>> {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        DeclarationListParser::new(&mut parser, DeclParser)
            .map(|r| r.map_err(|_| ()))
            .collect()
    }

    #[test]
    fn parses_important() {
        let decls = parse_declarations("fill: red !important; stroke: blue");
        assert_eq!(decls.len(), 2);

        let first = decls[0].as_ref().unwrap();
        assert_eq!(&*first.prop_name.local, "fill");
        assert!(first.important);

        let second = decls[1].as_ref().unwrap();
        assert_eq!(&*second.prop_name.local, "stroke");
        assert!(!second.important);
    }

    #[test]
    fn reports_unknown_properties_and_continues() {
        let decls = parse_declarations("foo: bar; opacity: 0.5; @media print {}");
        assert!(decls[0].is_err());
        assert!(decls[1].is_ok());
    }
}
