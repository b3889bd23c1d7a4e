//! The `Parse` trait for attribute and property values, and the small parsers that
//! everything else is built from.

use cssparser::{Parser, ParserInput, Token};
use markup5ever::QualName;

use crate::error::*;

/// Values that can be read from a `cssparser::Parser`.
///
/// Implementations consume only their own tokens; callers decide whether trailing input
/// is an error.
pub trait Parse: Sized {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>>;

    /// Parses the whole of `s`, which is mostly useful in tests.
    fn parse_str(s: &str) -> Result<Self, ParseError<'_>> {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        parser.parse_entirely(Self::parse)
    }
}

/// Skips a comma if there is one.
pub fn optional_comma(parser: &mut Parser<'_, '_>) {
    let _ = parser.try_parse(|p| p.expect_comma());
}

/// Rejects infinities and NaN, which cssparser produces for out-of-range numbers.
pub fn finite_f32(n: f32) -> Result<f32, ValueErrorKind> {
    n.is_finite()
        .then_some(n)
        .ok_or_else(|| ValueErrorKind::value_error("expected finite number"))
}

/// Parses an attribute's value, tagging errors with the attribute's name.
pub trait ParseValue<T: Parse> {
    fn parse(&self, value: &str) -> Result<T, ElementError>;
}

impl<T: Parse> ParseValue<T> for QualName {
    /// The whole value must be consumed, so `width="10 20"` is an error.
    fn parse(&self, value: &str) -> Result<T, ElementError> {
        let mut input = ParserInput::new(value);
        let mut parser = Parser::new(&mut input);

        parser.parse_entirely(T::parse).attribute(self.clone())
    }
}

impl<T: Parse> Parse for Option<T> {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        T::parse(parser).map(Some)
    }
}

impl Parse for f64 {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();
        let n = parser.expect_number()?;

        finite_f32(n)
            .map(f64::from)
            .map_err(|e| loc.new_custom_error(e))
    }
}

/// A `<number>` or a `<percentage>`, with percentages divided by 100.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NumberOrPercentage {
    pub value: f64,
}

impl Parse for NumberOrPercentage {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();

        let value = match *parser.next()? {
            Token::Number { value, .. } => value,
            Token::Percentage { unit_value, .. } => unit_value,
            ref tok => return Err(loc.new_unexpected_token_error(tok.clone())),
        };

        finite_f32(value)
            .map(|v| NumberOrPercentage {
                value: f64::from(v),
            })
            .map_err(|e| loc.new_custom_error(e))
    }
}

/// Between `REQUIRED` and `MAX` values, separated by whitespace or by commas.
#[derive(Clone, Debug, PartialEq)]
pub struct CommaSeparatedList<T: Parse, const REQUIRED: usize, const MAX: usize>(pub Vec<T>);

impl<T: Parse, const REQUIRED: usize, const MAX: usize> Parse
    for CommaSeparatedList<T, REQUIRED, MAX>
{
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();

        let mut items = vec![T::parse(parser)?];

        while items.len() < MAX && !parser.is_exhausted() {
            optional_comma(parser);
            items.push(T::parse(parser)?);
        }

        if items.len() < REQUIRED {
            return Err(loc.new_custom_error(ValueErrorKind::value_error(&format!(
                "expected {} values, found {}",
                REQUIRED,
                items.len()
            ))));
        }

        Ok(CommaSeparatedList(items))
    }
}

/// Matches the next token against keywords, ignoring ASCII case.
///
/// Evaluates to a `Result<T, BasicParseError>` with the value paired with the keyword
/// that matched.  It uses `?` on the token, so it must be used in a function that
/// returns a cssparser error.
///
/// ```
/// # use cssparser::{ParserInput, Parser};
/// # use svg2png::parse_identifiers;
/// # fn run() -> Result<(), cssparser::BasicParseError<'static>> {
/// # let mut input = ParserInput::new("Round");
/// # let mut parser = Parser::new(&mut input);
/// let rounded = parse_identifiers!(
///     parser,
///     "round" => true,
///     "square" => false,
/// )?;
/// assert!(rounded);
/// # Ok(())
/// # }
/// # run().unwrap();
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! parse_identifiers {
    ($parser:expr, $($keyword:expr => $value:expr,)+) => {{
        let loc = $parser.current_source_location();

        match $parser.next()? {
            $(::cssparser::Token::Ident(ref ident) if ident.eq_ignore_ascii_case($keyword) => Ok($value),)+
            token => Err(loc.new_basic_unexpected_token_error(token.clone())),
        }
    }};
}
