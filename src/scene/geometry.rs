//! Resolved geometry of the basic shapes, and its conversion to paths.
//!
//! All values are in user units; lengths and percentages have already been resolved
//! against the viewport by the time one of these structs exists.

use crate::path_builder::{LargeArc, Path, PathBuilder, Sweep};

/// Geometry that can be turned into a path outline for rendering.
pub trait Geometry {
    fn to_path(&self) -> Path;
}

impl Geometry for Path {
    fn to_path(&self) -> Path {
        self.clone()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RectGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rx: f64,
    pub ry: f64,
}

impl RectGeometry {
    /// Builds a rectangle, applying the rules for missing and oversized corner radii.
    ///
    /// A missing `rx` takes the value of `ry` and vice versa; radii are clamped to half
    /// the width or height.
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: Option<f64>,
        ry: Option<f64>,
    ) -> RectGeometry {
        let (rx, ry) = match (rx, ry) {
            (None, None) => (0.0, 0.0),
            (Some(rx), None) => (rx, rx),
            (None, Some(ry)) => (ry, ry),
            (Some(rx), Some(ry)) => (rx, ry),
        };

        let rx = rx.max(0.0).min(width / 2.0);
        let ry = ry.max(0.0).min(height / 2.0);

        // a corner needs both radii to be rounded
        let (rx, ry) = if rx == 0.0 || ry == 0.0 {
            (0.0, 0.0)
        } else {
            (rx, ry)
        };

        RectGeometry {
            x,
            y,
            width,
            height,
            rx,
            ry,
        }
    }
}

impl Geometry for RectGeometry {
    fn to_path(&self) -> Path {
        let RectGeometry {
            x,
            y,
            width: w,
            height: h,
            rx,
            ry,
        } = *self;

        let mut builder = PathBuilder::default();

        // zero or negative sizes disable rendering
        if !(w > 0.0 && h > 0.0) {
            return builder.into_path();
        }

        if rx == 0.0 {
            builder.move_to(x, y);
            builder.line_to(x + w, y);
            builder.line_to(x + w, y + h);
            builder.line_to(x, y + h);
            builder.close_path();
        } else {
            // clockwise from the start of the top edge; each corner is a quarter ellipse
            let corner = |b: &mut PathBuilder, to_x, to_y| {
                b.arc(rx, ry, 0.0, LargeArc(false), Sweep::Positive, to_x, to_y);
            };

            builder.move_to(x + rx, y);
            builder.line_to(x + w - rx, y);
            corner(&mut builder, x + w, y + ry);
            builder.line_to(x + w, y + h - ry);
            corner(&mut builder, x + w - rx, y + h);
            builder.line_to(x + rx, y + h);
            corner(&mut builder, x, y + h - ry);
            builder.line_to(x, y + ry);
            corner(&mut builder, x + rx, y);
            builder.close_path();
        }

        builder.into_path()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircleGeometry {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl Geometry for CircleGeometry {
    fn to_path(&self) -> Path {
        make_ellipse(self.cx, self.cy, self.r, self.r)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EllipseGeometry {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Geometry for EllipseGeometry {
    fn to_path(&self) -> Path {
        make_ellipse(self.cx, self.cy, self.rx, self.ry)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineGeometry {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Geometry for LineGeometry {
    fn to_path(&self) -> Path {
        let mut builder = PathBuilder::default();

        builder.move_to(self.x1, self.y1);
        builder.line_to(self.x2, self.y2);

        builder.into_path()
    }
}

/// Points of a `<polyline>` or a `<polygon>`; the latter is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyGeometry {
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

impl Geometry for PolyGeometry {
    fn to_path(&self) -> Path {
        let mut builder = PathBuilder::default();

        for (i, &(x, y)) in self.points.iter().enumerate() {
            if i == 0 {
                builder.move_to(x, y);
            } else {
                builder.line_to(x, y);
            }
        }

        if self.closed && !self.points.is_empty() {
            builder.close_path();
        }

        builder.into_path()
    }
}

/// Approximates an ellipse with four cubic Bézier curves.
fn make_ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Path {
    let mut builder = PathBuilder::default();

    // zero or negative radii disable rendering
    if !(rx > 0.0 && ry > 0.0) {
        return builder.into_path();
    }

    // 4/3 * (1-cos 45°)/sin 45° = 4/3 * sqrt(2) - 1
    let k: f64 = 0.5522847498;

    builder.move_to(cx + rx, cy);
    builder.curve_to(cx + rx, cy + k * ry, cx + k * rx, cy + ry, cx, cy + ry);
    builder.curve_to(cx - k * rx, cy + ry, cx - rx, cy + k * ry, cx - rx, cy);
    builder.curve_to(cx - rx, cy - k * ry, cx - k * rx, cy - ry, cx, cy - ry);
    builder.curve_to(cx + k * rx, cy - ry, cx + rx, cy - k * ry, cx + rx, cy);
    builder.close_path();

    builder.into_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::path_builder::PathCommand;
    use crate::rect::Rect;

    #[test]
    fn rect_radii_follow_each_other_and_clamp() {
        let r = RectGeometry::new(0.0, 0.0, 10.0, 20.0, Some(3.0), None);
        assert_eq!((r.rx, r.ry), (3.0, 3.0));

        let r = RectGeometry::new(0.0, 0.0, 10.0, 20.0, None, Some(30.0));
        assert_eq!((r.rx, r.ry), (5.0, 10.0));

        let r = RectGeometry::new(0.0, 0.0, 10.0, 20.0, Some(0.0), Some(4.0));
        assert_eq!((r.rx, r.ry), (0.0, 0.0));
    }

    #[test]
    fn empty_shapes_have_empty_paths() {
        assert!(RectGeometry::new(0.0, 0.0, 0.0, 10.0, None, None)
            .to_path()
            .is_empty());
        assert!(CircleGeometry {
            cx: 0.0,
            cy: 0.0,
            r: 0.0
        }
        .to_path()
        .is_empty());
        assert!(PolyGeometry {
            points: vec![],
            closed: true
        }
        .to_path()
        .is_empty());
    }

    #[test]
    fn plain_rect_is_a_closed_square_path() {
        let path = RectGeometry::new(1.0, 2.0, 3.0, 4.0, None, None).to_path();
        let cmds: Vec<_> = path.iter().collect();

        assert_eq!(
            cmds,
            vec![
                PathCommand::MoveTo(1.0, 2.0),
                PathCommand::LineTo(4.0, 2.0),
                PathCommand::LineTo(4.0, 6.0),
                PathCommand::LineTo(1.0, 6.0),
                PathCommand::ClosePath,
            ]
        );
    }

    #[test]
    fn rounded_rect_stays_within_bounds() {
        let path = RectGeometry::new(0.0, 0.0, 10.0, 10.0, Some(2.0), Some(2.0)).to_path();
        let bounds = path.control_bounds().unwrap();
        assert!(bounds.approx_eq(&Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn ellipse_bounds_are_exact() {
        let path = EllipseGeometry {
            cx: 10.0,
            cy: 20.0,
            rx: 5.0,
            ry: 2.0,
        }
        .to_path();

        let bounds = path.control_bounds().unwrap();
        assert!(bounds.approx_eq(&Rect::new(5.0, 18.0, 15.0, 22.0)));
    }
}
