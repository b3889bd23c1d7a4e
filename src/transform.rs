//! Affine transformations and the `transform` attribute.
//!
//! A [`Transform`] maps `(x, y)` to `(xx*x + xy*y + x0, yx*x + yy*y + y0)`.  The syntax
//! of the attribute is described in [SVG 1.1][attr].
//!
//! [attr]: https://www.w3.org/TR/SVG11/coords.html#TransformAttribute

use cssparser::{Parser, Token};
use tinyvec::ArrayVec;

use crate::error::*;
use crate::parsers::{optional_comma, Parse};
use crate::rect::Rect;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::identity()
    }
}

impl Transform {
    /// Builds a matrix from its six coefficients, in the order of SVG's `matrix(a b c d e f)`.
    pub fn new_unchecked(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Transform {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    pub fn identity() -> Self {
        Transform::new_scale(1.0, 1.0)
    }

    pub fn new_translate(tx: f64, ty: f64) -> Self {
        Transform::new_unchecked(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Transform::new_unchecked(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Positive angles turn the x axis towards the y axis, which is clockwise on screen.
    pub fn new_rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Transform::new_unchecked(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn new_skew(x_radians: f64, y_radians: f64) -> Self {
        Transform::new_unchecked(1.0, y_radians.tan(), x_radians.tan(), 1.0, 0.0, 0.0)
    }

    /// Returns the transform that applies `first` and then `self`.
    #[must_use]
    pub fn pre_transform(&self, first: &Transform) -> Self {
        let a = self;
        let b = first;

        Transform {
            xx: a.xx * b.xx + a.xy * b.yx,
            yx: a.yx * b.xx + a.yy * b.yx,
            xy: a.xx * b.xy + a.xy * b.yy,
            yy: a.yx * b.xy + a.yy * b.yy,
            x0: a.xx * b.x0 + a.xy * b.y0 + a.x0,
            y0: a.yx * b.x0 + a.yy * b.y0 + a.y0,
        }
    }

    #[must_use]
    pub fn pre_translate(&self, tx: f64, ty: f64) -> Self {
        self.pre_transform(&Transform::new_translate(tx, ty))
    }

    #[must_use]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Self {
        self.pre_transform(&Transform::new_scale(sx, sy))
    }

    #[must_use]
    pub fn pre_rotate(&self, radians: f64) -> Self {
        self.pre_transform(&Transform::new_rotate(radians))
    }

    #[cfg(test)]
    pub fn is_identity(&self) -> bool {
        *self == Transform::identity()
    }

    fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0
    }

    /// Geometric mean of the scale factors along both axes.
    ///
    /// Converts a tolerance in device pixels into user space units.
    pub fn average_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    pub fn invert(&self) -> Option<Self> {
        if !self.is_invertible() {
            return None;
        }

        let inv = 1.0 / self.determinant();

        let xx = self.yy * inv;
        let yx = -self.yx * inv;
        let xy = -self.xy * inv;
        let yy = self.xx * inv;

        Some(Transform {
            xx,
            yx,
            xy,
            yy,
            x0: -(xx * self.x0 + xy * self.y0),
            y0: -(yx * self.x0 + yy * self.y0),
        })
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    /// Bounding box of the transformed corners of `rect`.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.x0, rect.y0),
            self.transform_point(rect.x1, rect.y0),
            self.transform_point(rect.x1, rect.y1),
            self.transform_point(rect.x0, rect.y1),
        ];

        corners.iter().skip(1).fold(
            Rect::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1),
            |r, &(x, y)| Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y)),
        )
    }
}

impl Parse for Transform {
    /// Parses a transform list; a singular matrix is a value error.
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
        let loc = parser.current_source_location();

        let mut transform = Transform::identity();

        while !parser.is_exhausted() {
            let step = parse_function(parser)?;
            transform = transform.pre_transform(&step);
            optional_comma(parser);
        }

        if !transform.is_invertible() {
            return Err(loc.new_custom_error(ValueErrorKind::value_error(
                "transform is not invertible",
            )));
        }

        Ok(transform)
    }
}

/// Arguments of a single transform function; `matrix()` has the most, with six.
type Args = ArrayVec<[f64; 6]>;

fn parse_function<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    let loc = parser.current_source_location();

    let name = match parser.next()?.clone() {
        Token::Function(name) => name,

        // SVG allows whitespace between the function name and the parenthesis
        Token::Ident(name) => {
            parser.expect_parenthesis_block()?;
            name
        }

        tok => return Err(loc.new_unexpected_token_error(tok)),
    };

    let args = parser.parse_nested_block(parse_args)?;

    let transform = match (&*name, args.as_slice()) {
        ("matrix", &[a, b, c, d, e, f]) => Transform::new_unchecked(a, b, c, d, e, f),

        ("translate", &[tx]) => Transform::new_translate(tx, 0.0),
        ("translate", &[tx, ty]) => Transform::new_translate(tx, ty),

        ("scale", &[s]) => Transform::new_scale(s, s),
        ("scale", &[sx, sy]) => Transform::new_scale(sx, sy),

        ("rotate", &[deg]) => Transform::new_rotate(deg.to_radians()),
        ("rotate", &[deg, cx, cy]) => Transform::new_translate(cx, cy)
            .pre_rotate(deg.to_radians())
            .pre_translate(-cx, -cy),

        ("skewX", &[deg]) => Transform::new_skew(deg.to_radians(), 0.0),
        ("skewY", &[deg]) => Transform::new_skew(0.0, deg.to_radians()),

        ("matrix" | "translate" | "scale" | "rotate" | "skewX" | "skewY", _) => {
            return Err(loc.new_custom_error(ValueErrorKind::parse_error(&format!(
                "wrong number of arguments for {}()",
                name
            ))));
        }

        _ => {
            return Err(loc.new_custom_error(ValueErrorKind::parse_error(
                "expected matrix, translate, scale, rotate, skewX or skewY",
            )));
        }
    };

    Ok(transform)
}

fn parse_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Args, ParseError<'i>> {
    let mut args = Args::new();

    while !parser.is_exhausted() {
        // commas only go between numbers
        if !args.is_empty() {
            optional_comma(parser);
        }

        let loc = parser.current_source_location();
        let n = f64::parse(parser)?;

        if args.try_push(n).is_some() {
            return Err(loc.new_custom_error(ValueErrorKind::parse_error("too many arguments")));
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: &Transform, b: &Transform) {
        let pairs = [
            (a.xx, b.xx),
            (a.yx, b.yx),
            (a.xy, b.xy),
            (a.yy, b.yy),
            (a.x0, b.x0),
            (a.y0, b.y0),
        ];

        for (x, y) in pairs {
            assert!(approx_eq!(f64, x, y, epsilon = 1e-12), "{a:?} != {b:?}");
        }
    }

    fn parse(s: &str) -> Transform {
        Transform::parse_str(s).unwrap()
    }

    #[test]
    fn pre_transform_applies_the_argument_first() {
        let scale_then_move = Transform::new_translate(10.0, 0.0).pre_scale(2.0, 2.0);
        assert_eq!(scale_then_move.transform_point(1.0, 1.0), (12.0, 2.0));

        let move_then_scale = Transform::new_scale(2.0, 2.0).pre_translate(10.0, 0.0);
        assert_eq!(move_then_scale.transform_point(1.0, 1.0), (22.0, 2.0));

        assert_close(
            &scale_then_move,
            &Transform::new_translate(10.0, 0.0).pre_transform(&Transform::new_scale(2.0, 2.0)),
        );
    }

    #[test]
    fn inverse_undoes_the_transform() {
        let t = Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let inv = t.invert().unwrap();

        assert_close(&t.pre_transform(&inv), &Transform::identity());
        assert_close(&inv.pre_transform(&t), &Transform::identity());

        let (x, y) = t.transform_point(-7.0, 0.5);
        let (bx, by) = inv.transform_point(x, y);
        assert!(approx_eq!(f64, bx, -7.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, by, 0.5, epsilon = 1e-12));
    }

    #[test]
    fn singular_matrices_have_no_inverse() {
        assert!(Transform::new_scale(2.0, 0.0).invert().is_none());
        assert!(!Transform::new_unchecked(1.0, 2.0, 2.0, 4.0, 0.0, 0.0).is_invertible());
        assert!(!Transform::new_scale(f64::INFINITY, 1.0).is_invertible());
    }

    #[test]
    fn average_scale_is_the_geometric_mean() {
        assert_eq!(Transform::new_scale(2.0, 8.0).average_scale(), 4.0);
        assert!(approx_eq!(
            f64,
            Transform::new_rotate(0.3).pre_scale(3.0, 3.0).average_scale(),
            3.0,
            epsilon = 1e-12
        ));
    }

    #[test]
    fn transformed_rect_is_a_bounding_box() {
        let t = Transform::new_rotate(FRAC_PI_2);
        let r = t.transform_rect(&Rect::new(0.0, 0.0, 10.0, 20.0));
        assert!(r.approx_eq(&Rect::new(-20.0, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn parses_each_function() {
        assert_close(
            &parse("matrix(1,2.25,-3.25e2,4 5 6)"),
            &Transform::new_unchecked(1.0, 2.25, -325.0, 4.0, 5.0, 6.0),
        );

        assert_close(&parse("translate(-1)"), &Transform::new_translate(-1.0, 0.0));
        assert_close(&parse("translate(-1 -2)"), &Transform::new_translate(-1.0, -2.0));

        assert_close(&parse("scale (-1)"), &Transform::new_scale(-1.0, -1.0));
        assert_close(&parse("scale(2, 3)"), &Transform::new_scale(2.0, 3.0));

        assert_close(&parse("rotate(90)"), &Transform::new_rotate(FRAC_PI_2));
        assert_close(&parse("skewX(30)"), &Transform::new_skew(30f64.to_radians(), 0.0));
        assert_close(&parse("skewY(30)"), &Transform::new_skew(0.0, 30f64.to_radians()));
    }

    #[test]
    fn rotation_about_a_center_keeps_it_fixed() {
        let t = parse("rotate(90, 10, 20)");
        let (x, y) = t.transform_point(10.0, 20.0);
        assert!(approx_eq!(f64, x, 10.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, y, 20.0, epsilon = 1e-12));

        let (x, y) = t.transform_point(11.0, 20.0);
        assert!(approx_eq!(f64, x, 10.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, y, 21.0, epsilon = 1e-12));
    }

    #[test]
    fn lists_apply_the_leftmost_function_last() {
        let t = parse("translate(20, 30), scale (10)");
        assert_eq!(t.transform_point(1.0, 1.0), (30.0, 40.0));

        let t = parse("scale(10)translate(20,30)");
        assert_eq!(t.transform_point(1.0, 1.0), (210.0, 310.0));

        assert!(parse("").is_identity());
    }

    #[test]
    fn syntax_errors() {
        for s in [
            "foo",
            "foo(1)",
            "matrix (1 2 3 4 5)",
            "translate(1 2 3 4 5)",
            "translate (1,)",
            "scale (1,)",
            "rotate(1, 2)",
            "skewX (1,2)",
            "skewY ()",
            "skewY",
            "matrix(1 2 3 4 5 6 7)",
        ] {
            assert!(Transform::parse_str(s).is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn singular_results_are_rejected() {
        assert!(Transform::parse_str("matrix (0 0 0 0 0 0)").is_err());
        assert!(Transform::parse_str("scale (0), translate (10, 10)").is_err());
        assert!(Transform::parse_str("scale (0), skewX (90)").is_err());
    }
}
