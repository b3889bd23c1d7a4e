//! Turning paths into polylines.

use crate::path_builder::{CubicBezierCurve, Path, PathCommand};
use crate::transform::Transform;

pub type Point = (f64, f64);

/// A connected run of line segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    fn new(start: Point) -> Polyline {
        Polyline {
            points: vec![start],
            closed: false,
        }
    }

    fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn transform(&mut self, t: &Transform) {
        for p in self.points.iter_mut() {
            *p = t.transform_point(p.0, p.1);
        }
    }
}

/// Number of line segments needed so that a cubic deviates from them by at most
/// `tolerance`.
fn cubic_segments(p0: Point, curve: &CubicBezierCurve, tolerance: f64) -> usize {
    let (p1, p2, p3) = (curve.pt1, curve.pt2, curve.to);

    let ddx = (p0.0 - 2.0 * p1.0 + p2.0)
        .abs()
        .max((p1.0 - 2.0 * p2.0 + p3.0).abs());
    let ddy = (p0.1 - 2.0 * p1.1 + p2.1)
        .abs()
        .max((p1.1 - 2.0 * p2.1 + p3.1).abs());
    let dd = ddx.hypot(ddy);

    let n = (0.75 * dd / tolerance).sqrt().ceil();

    if n.is_finite() {
        (n as usize).clamp(1, 1000)
    } else {
        1
    }
}

fn flatten_cubic(line: &mut Polyline, p0: Point, curve: &CubicBezierCurve, tolerance: f64) {
    let n = cubic_segments(p0, curve, tolerance);
    let (p1, p2, p3) = (curve.pt1, curve.pt2, curve.to);

    for i in 1..n {
        let t = i as f64 / n as f64;
        let mt = 1.0 - t;

        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        line.push((
            a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
            a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
        ));
    }

    line.push(p3);
}

/// Flattens `path` after mapping it through `transform`.
///
/// `tolerance` is the maximum distance between a curve and its polyline, in the
/// coordinates after the transform.
pub fn flatten(path: &Path, transform: &Transform, tolerance: f64) -> Vec<Polyline> {
    let mut lines: Vec<Polyline> = Vec::new();
    let mut current: Option<Polyline> = None;
    let mut last = (0.0, 0.0);
    let mut start = (0.0, 0.0);

    for cmd in path.iter() {
        match cmd {
            PathCommand::MoveTo(x, y) => {
                lines.extend(current.take());

                last = transform.transform_point(x, y);
                start = last;
                current = Some(Polyline::new(last));
            }

            PathCommand::LineTo(x, y) => {
                last = transform.transform_point(x, y);
                current.get_or_insert_with(|| Polyline::new(start)).push(last);
            }

            PathCommand::CurveTo(curve) => {
                let curve = CubicBezierCurve {
                    pt1: transform.transform_point(curve.pt1.0, curve.pt1.1),
                    pt2: transform.transform_point(curve.pt2.0, curve.pt2.1),
                    to: transform.transform_point(curve.to.0, curve.to.1),
                };

                let line = current.get_or_insert_with(|| Polyline::new(start));
                flatten_cubic(line, last, &curve, tolerance);
                last = curve.to;
            }

            PathCommand::ClosePath => {
                if let Some(mut line) = current.take() {
                    line.closed = true;
                    lines.push(line);
                }

                // A command after a close starts at the same point
                last = start;
            }
        }
    }

    lines.extend(current);
    lines
}
