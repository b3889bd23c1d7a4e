//! `clipPathUnits` and `gradientUnits`.

use cssparser::Parser;

use crate::error::*;
use crate::parse_identifiers;
use crate::parsers::Parse;

/// Whether coordinates are in the user space of the referencing element, or fractions
/// of its bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordUnits {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Parse for CoordUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "userSpaceOnUse" => CoordUnits::UserSpaceOnUse,
            "objectBoundingBox" => CoordUnits::ObjectBoundingBox,
        )?)
    }
}

/// Declares a newtype over [`CoordUnits`] for an attribute with its own default.
///
/// `coord_units!(ClipPathUnits, CoordUnits::UserSpaceOnUse)` gives a `ClipPathUnits`
/// that parses like `CoordUnits` and converts into it.
#[doc(hidden)]
#[macro_export]
macro_rules! coord_units {
    ($name:ident, $default:expr) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $name(pub $crate::coord_units::CoordUnits);

        impl Default for $name {
            fn default() -> Self {
                $name($default)
            }
        }

        impl From<$name> for $crate::coord_units::CoordUnits {
            fn from(units: $name) -> Self {
                units.0
            }
        }

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(
                parser: &mut ::cssparser::Parser<'i, '_>,
            ) -> Result<Self, $crate::error::ParseError<'i>> {
                <$crate::coord_units::CoordUnits as $crate::parsers::Parse>::parse(parser).map($name)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    coord_units!(BoxUnits, CoordUnits::ObjectBoundingBox);

    #[test]
    fn newtype_parses_both_keywords() {
        assert_eq!(
            BoxUnits::parse_str("userSpaceOnUse"),
            Ok(BoxUnits(CoordUnits::UserSpaceOnUse))
        );
        assert_eq!(
            BoxUnits::parse_str("objectBoundingBox"),
            Ok(BoxUnits(CoordUnits::ObjectBoundingBox))
        );

        assert!(BoxUnits::parse_str("").is_err());
        assert!(BoxUnits::parse_str("userSpace").is_err());
    }

    #[test]
    fn newtype_has_its_own_default() {
        assert_eq!(CoordUnits::from(BoxUnits::default()), CoordUnits::ObjectBoundingBox);
    }
}
