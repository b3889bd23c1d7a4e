//! Opacity-like values in the [0.0, 1.0] range.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::{NumberOrPercentage, Parse};

/// A number clamped to [0.0, 1.0].
///
/// Out-of-range values are not errors; `opacity="2"` is the same as `opacity="1"`.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
pub struct UnitInterval(pub f64);

impl UnitInterval {
    pub fn clamp(val: f64) -> UnitInterval {
        UnitInterval(val.clamp(0.0, 1.0))
    }

    pub fn is_opaque(self) -> bool {
        self.0 >= 1.0
    }
}

impl Parse for UnitInterval {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<UnitInterval, ParseError<'i>> {
        NumberOrPercentage::parse(parser).map(|n| UnitInterval::clamp(n.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_percentages_are_clamped() {
        for (input, expected) in [
            ("0", 0.0),
            ("0.5", 0.5),
            ("25%", 0.25),
            ("-10", 0.0),
            ("10", 1.0),
            ("150%", 1.0),
        ] {
            assert_eq!(UnitInterval::parse_str(input), Ok(UnitInterval(expected)));
        }
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(UnitInterval::parse_str("").is_err());
        assert!(UnitInterval::parse_str("foo").is_err());
        assert!(UnitInterval::parse_str("0.0foo").is_err());
    }

    #[test]
    fn only_one_is_opaque() {
        assert!(UnitInterval(1.0).is_opaque());
        assert!(!UnitInterval(0.999).is_opaque());
        assert!(!UnitInterval::default().is_opaque());
    }
}
