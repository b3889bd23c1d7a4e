//! The `viewBox` attribute.

use cssparser::Parser;
use std::ops::Deref;

use crate::error::*;
use crate::parsers::{CommaSeparatedList, Parse};
use crate::rect::Rect;

/// The rectangle of user space that gets mapped onto a viewport.
///
/// Written as `min-x min-y width height`; it derefs to the corresponding [`Rect`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewBox(Rect);

impl ViewBox {
    pub fn rect(&self) -> Rect {
        self.0
    }
}

impl Deref for ViewBox {
    type Target = Rect;

    fn deref(&self) -> &Rect {
        &self.0
    }
}

impl From<Rect> for ViewBox {
    fn from(r: Rect) -> ViewBox {
        ViewBox(r)
    }
}

impl Parse for ViewBox {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<ViewBox, ParseError<'i>> {
        let loc = parser.current_source_location();

        let CommaSeparatedList(numbers) = CommaSeparatedList::<f64, 4, 4>::parse(parser)?;

        match numbers[..] {
            [x, y, w, h] if w >= 0.0 && h >= 0.0 => Ok(ViewBox(Rect::new(x, y, x + w, y + h))),
            _ => Err(loc.new_custom_error(ValueErrorKind::value_error(
                "viewBox width and height must not be negative",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_origin_plus_size() {
        assert_eq!(
            ViewBox::parse_str("  1 2 3 4").unwrap().rect(),
            Rect::new(1.0, 2.0, 4.0, 6.0)
        );

        let vbox = ViewBox::parse_str(" -1.5 -2.5e1,34,56e2  ").unwrap();
        assert_eq!(vbox.x0, -1.5);
        assert_eq!(vbox.height(), 5600.0);
    }

    #[test]
    fn zero_size_is_allowed() {
        assert!(ViewBox::parse_str("0 0 0 0").unwrap().is_empty());
    }

    #[test]
    fn invalid_viewboxes() {
        for s in [
            "",
            " 1,2,-3,-4 ",
            "0 0 10 -1",
            "qwerasdfzxcv",
            " 1 2 3 4   5",
            " 1 2 foo 3 4",
            "1 2 3",
            "0 0 9E80.7",
        ] {
            assert!(ViewBox::parse_str(s).is_err(), "{s:?} should not parse");
        }
    }
}
