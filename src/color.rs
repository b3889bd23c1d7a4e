//! CSS color values.

use cssparser::{Parser, RGBA};
use rgb::RGBA8;

use crate::error::*;
use crate::parsers::Parse;
use crate::unit_interval::UnitInterval;

pub use cssparser::Color;

impl Parse for Color {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Color, ParseError<'i>> {
        Ok(Color::parse(parser)?)
    }
}

impl Parse for RGBA {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<RGBA, ParseError<'i>> {
        let loc = parser.current_source_location();

        match Color::parse(parser)? {
            Color::RGBA(rgba) => Ok(rgba),
            Color::CurrentColor => Err(loc.new_custom_error(ValueErrorKind::value_error(
                "currentColor is not allowed here",
            ))),
        }
    }
}

/// Turns a specified color into straight-alpha RGBA8, resolving `currentColor` and
/// folding in an extra opacity.
pub fn resolve_color(color: &Color, opacity: UnitInterval, current_color: RGBA) -> RGBA8 {
    let rgba = match *color {
        Color::RGBA(rgba) => rgba,
        Color::CurrentColor => current_color,
    };

    let UnitInterval(o) = opacity;
    let alpha = (f64::from(rgba.alpha) * o + 0.5).floor() as u8;

    RGBA8::new(rgba.red, rgba.green, rgba.blue, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_hex_colors() {
        assert_eq!(
            Color::parse_str("red").unwrap(),
            Color::RGBA(RGBA::new(255, 0, 0, 255))
        );
        assert_eq!(
            Color::parse_str("#00ff0080").unwrap(),
            Color::RGBA(RGBA::new(0, 255, 0, 128))
        );
        assert_eq!(Color::parse_str("currentColor").unwrap(), Color::CurrentColor);
    }

    #[test]
    fn rgba_rejects_current_color() {
        assert!(RGBA::parse_str("currentColor").is_err());
        assert!(RGBA::parse_str("blue").is_ok());
    }

    #[test]
    fn resolves_current_color_and_opacity() {
        let current = RGBA::new(10, 20, 30, 255);

        assert_eq!(
            resolve_color(&Color::CurrentColor, UnitInterval(1.0), current),
            RGBA8::new(10, 20, 30, 255)
        );

        assert_eq!(
            resolve_color(
                &Color::RGBA(RGBA::new(255, 0, 0, 255)),
                UnitInterval(0.5),
                current
            ),
            RGBA8::new(255, 0, 0, 128)
        );
    }
}
