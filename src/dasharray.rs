//! The `stroke-dasharray` property.

use cssparser::Parser;

use crate::error::*;
use crate::length::*;
use crate::parsers::{optional_comma, Parse};

/// `none`, or dash and gap lengths separated by commas or whitespace.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum Dasharray {
    #[default]
    None,
    Array(Box<[ULength<Both>]>),
}

impl Parse for Dasharray {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Dasharray, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("none"))
            .is_ok()
        {
            return Ok(Dasharray::None);
        }

        let mut lengths = vec![ULength::<Both>::parse(parser)?];

        while !parser.is_exhausted() {
            optional_comma(parser);
            lengths.push(ULength::parse(parser)?);
        }

        Ok(Dasharray::Array(lengths.into()))
    }
}

impl Dasharray {
    /// The dash pattern in user units, always with an even number of entries.
    ///
    /// An empty pattern means a solid stroke, which is what `none` and patterns
    /// that add up to zero draw.
    pub fn to_user(&self, params: &NormalizeParams) -> Vec<f64> {
        let Dasharray::Array(lengths) = self else {
            return Vec::new();
        };

        let mut pattern: Vec<f64> = lengths.iter().map(|l| l.to_user(params)).collect();

        let usable = pattern.iter().all(|d| d.is_finite() && *d >= 0.0);
        if !usable || pattern.iter().sum::<f64>() <= 0.0 {
            return Vec::new();
        }

        // "5 3 2" means "5 3 2 5 3 2"
        if pattern.len() % 2 == 1 {
            pattern.extend_from_within(..);
        }

        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dasharray(l: &[&str]) -> Dasharray {
        Dasharray::Array(
            l.iter()
                .map(|s| ULength::<Both>::parse_str(s).unwrap())
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        )
    }

    #[test]
    fn parses_dash_array() {
        assert_eq!(
            Dasharray::parse_str("1 2in,3 4%").unwrap(),
            dasharray(&["1", "2in", "3", "4%"])
        );
        assert_eq!(Dasharray::parse_str("10,6").unwrap(), dasharray(&["10", "6"]));
        assert_eq!(
            Dasharray::parse_str("5, 5, 20").unwrap(),
            dasharray(&["5", "5", "20"])
        );
        assert_eq!(Dasharray::parse_str("none").unwrap(), Dasharray::None);
    }

    #[test]
    fn errors_on_invalid_dash_array() {
        assert!(Dasharray::parse_str("").is_err());
        assert!(Dasharray::parse_str("-1 2").is_err());
        assert!(Dasharray::parse_str("1,,2").is_err());
        assert!(Dasharray::parse_str("foo").is_err());
    }

    #[test]
    fn odd_dash_count_is_repeated() {
        let params = NormalizeParams::from_size(100.0, 100.0);
        assert_eq!(
            dasharray(&["1", "2", "3"]).to_user(&params),
            vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn all_zero_dashes_are_ignored() {
        let params = NormalizeParams::from_size(100.0, 100.0);
        assert!(dasharray(&["0", "0"]).to_user(&params).is_empty());
        assert!(Dasharray::None.to_user(&params).is_empty());
    }
}
