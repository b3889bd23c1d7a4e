//! The [`Property`] trait and the [`make_property`] macro that implements it.

use crate::properties::ComputedValues;

/// Behavior shared by the value types of all CSS properties.
pub trait Property {
    /// Whether an element without a value for this property takes its parent's value
    /// (`true`) or the initial value, which is the type's [`Default`] (`false`).
    fn inherits_automatically() -> bool;

    /// The computed value, given the parent element's computed values.
    fn compute(&self, _: &ComputedValues) -> Self;
}

/// Declares the value type of a property.
///
/// Every form implements [`Default`] with the initial value.  All forms except
/// `property_impl` also implement [`Property`] with a `compute` that returns the
/// value unchanged, which is right for anything that does not depend on the parent.
///
/// Keywords become a field-less enum with a [`Parse`] implementation:
///
/// ```text
/// make_property!(
///     FillRule,
///     default: NonZero,
///     inherits_automatically: true,
///
///     identifiers:
///     "nonzero" => NonZero,
///     "evenodd" => EvenOdd,
/// );
/// ```
///
/// `newtype_parse` wraps a type that already implements [`Parse`]:
///
/// ```text
/// make_property!(
///     StrokeOpacity,
///     default: UnitInterval(1.0),
///     inherits_automatically: true,
///     newtype_parse: UnitInterval,
/// );
/// ```
///
/// `fields` declares a struct and takes the `Parse` implementation as an item, and
/// `property_impl` is for hand-written types that only need the [`Default`].
///
/// [`Parse`]: crate::parsers::Parse
/// [`Property`]: crate::property_macros::Property
#[doc(hidden)]
#[macro_export]
macro_rules! make_property {
    ($(#[$attr:meta])*
     $name:ident,
     default: $default:ident,
     inherits_automatically: $inherits:expr,

     identifiers:
     $($keyword:expr => $variant:ident,)+
    ) => {
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        $crate::make_property!(@default $name, $name::$default);
        $crate::make_property!(@property $name, $inherits);

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(
                parser: &mut ::cssparser::Parser<'i, '_>,
            ) -> Result<$name, $crate::error::ParseError<'i>> {
                let keyword = $crate::parse_identifiers!(parser, $($keyword => $name::$variant,)+)?;
                Ok(keyword)
            }
        }
    };

    ($(#[$attr:meta])*
     $name:ident,
     default: $default:expr,
     inherits_automatically: $inherits:expr,
     newtype_parse: $inner:ty,
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub $inner);

        $crate::make_property!(@default $name, $name($default));
        $crate::make_property!(@property $name, $inherits);

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(
                parser: &mut ::cssparser::Parser<'i, '_>,
            ) -> Result<$name, $crate::error::ParseError<'i>> {
                <$inner as $crate::parsers::Parse>::parse(parser).map($name)
            }
        }
    };

    ($(#[$attr:meta])*
     $name:ident,
     default: $default:expr,
     property_impl: { $prop:item }
    ) => {
        $crate::make_property!(@default $name, $default);

        $prop
    };

    ($(#[$attr:meta])*
     $name:ident,
     inherits_automatically: $inherits:expr,
     fields: {
         $($field:ident : $field_ty:ty, default: $field_default:expr,)+
     }
     parse_impl: { $parse:item }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: $field_ty),+
        }

        $crate::make_property!(@default $name, $name { $($field: $field_default),+ });
        $crate::make_property!(@property $name, $inherits);

        $parse
    };

    (@default $name:ident, $default:expr) => {
        impl Default for $name {
            fn default() -> $name {
                $default
            }
        }
    };

    (@property $name:ident, $inherits:expr) => {
        impl $crate::property_macros::Property for $name {
            fn inherits_automatically() -> bool {
                $inherits
            }

            fn compute(&self, _: &$crate::properties::ComputedValues) -> Self {
                self.clone()
            }
        }
    };
}
