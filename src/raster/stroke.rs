//! Dashing and stroke expansion.
//!
//! A stroke is turned into a set of polygons that are all wound the same way, so
//! that filling them with the nonzero rule gives their union.

use std::f64::consts::PI;

use crate::limits::MAX_DASH_COUNT;
use crate::properties::{StrokeLinecap, StrokeLinejoin};

use super::flatten::{Point, Polyline};

/// Stroke parameters, in the same coordinates as the polylines.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub width: f64,
    pub line_cap: StrokeLinecap,
    pub line_join: StrokeLinejoin,
    pub miter_limit: f64,

    /// Maximum deviation for the polygons that approximate round caps and joins.
    pub tolerance: f64,
}

fn sub(a: Point, b: Point) -> Point {
    (a.0 - b.0, a.1 - b.1)
}

fn add(a: Point, b: Point) -> Point {
    (a.0 + b.0, a.1 + b.1)
}

fn scale(a: Point, s: f64) -> Point {
    (a.0 * s, a.1 * s)
}

fn length(a: Point) -> f64 {
    a.0.hypot(a.1)
}

fn normalize(a: Point) -> Option<Point> {
    let len = length(a);
    if len > 0.0 && len.is_finite() {
        Some(scale(a, 1.0 / len))
    } else {
        None
    }
}

/// Perpendicular of a direction.
fn perp(d: Point) -> Point {
    (-d.1, d.0)
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum::<f64>()
        / 2.0
}

/// Collects polygons, all with a positive winding.
#[derive(Default)]
struct Outline {
    polygons: Vec<Polyline>,
}

impl Outline {
    fn push(&mut self, mut points: Vec<Point>) {
        let area = signed_area(&points);
        if area == 0.0 || !area.is_finite() {
            return;
        }

        if area < 0.0 {
            points.reverse();
        }

        self.polygons.push(Polyline {
            points,
            closed: true,
        });
    }

    fn circle(&mut self, center: Point, radius: f64, tolerance: f64) {
        let n = circle_segments(radius, tolerance);
        let points = (0..n)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / n as f64;
                (center.0 + radius * a.cos(), center.1 + radius * a.sin())
            })
            .collect();

        self.push(points);
    }
}

fn circle_segments(radius: f64, tolerance: f64) -> usize {
    if radius <= tolerance {
        return 8;
    }

    let step = 2.0 * (1.0 - tolerance / radius).acos();
    let n = (2.0 * PI / step).ceil();

    if n.is_finite() {
        (n as usize).clamp(8, 1024)
    } else {
        8
    }
}

/// Removes consecutive duplicate points; a closed polyline also loses a last point
/// equal to its first one.
fn dedup(line: &Polyline) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::with_capacity(line.points.len());

    for &p in &line.points {
        if points.last() != Some(&p) {
            points.push(p);
        }
    }

    if line.closed && points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    points
}

fn polyline_length(line: &Polyline) -> f64 {
    let open: f64 = line.points.windows(2).map(|s| length(sub(s[1], s[0]))).sum();

    match (line.closed, line.points.first(), line.points.last()) {
        (true, Some(&first), Some(&last)) => open + length(sub(first, last)),
        _ => open,
    }
}

/// Splits polylines into dashes.
///
/// `dashes` alternates between "on" and "off" lengths and must be of even length.
///
/// Returns `None` if the pattern would produce more than [`MAX_DASH_COUNT`] dashes.
pub fn dash(lines: &[Polyline], dashes: &[f64], offset: f64) -> Option<Vec<Polyline>> {
    let total: f64 = dashes.iter().sum();

    if dashes.is_empty() || total <= 0.0 || !total.is_finite() {
        return Some(lines.to_vec());
    }

    let path_length: f64 = lines.iter().map(polyline_length).sum();
    let num_dashes = (path_length / total).ceil() * (dashes.len() / 2) as f64 + lines.len() as f64;

    if num_dashes.is_nan() || num_dashes > MAX_DASH_COUNT as f64 {
        return None;
    }

    let mut out = Vec::new();

    for line in lines {
        let mut points = line.points.clone();
        if line.closed {
            if let Some(&first) = points.first() {
                points.push(first);
            }
        }

        // position in the pattern
        let mut index = 0;
        let mut remaining = dashes[0];
        let mut phase = offset.rem_euclid(total);

        while phase > 0.0 {
            if phase >= remaining {
                phase -= remaining;
                index = (index + 1) % dashes.len();
                remaining = dashes[index];
            } else {
                remaining -= phase;
                phase = 0.0;
            }
        }

        let mut current: Option<Polyline> = None;

        if index % 2 == 0 {
            if let Some(&first) = points.first() {
                current = Some(Polyline {
                    points: vec![first],
                    closed: false,
                });
            }
        }

        for seg in points.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            let seg_len = length(sub(b, a));
            let mut pos = 0.0;

            while seg_len - pos > remaining {
                pos += remaining;
                let p = add(a, scale(sub(b, a), pos / seg_len));

                if index % 2 == 0 {
                    if let Some(mut dash) = current.take() {
                        dash.points.push(p);
                        out.push(dash);
                    }
                } else {
                    current = Some(Polyline {
                        points: vec![p],
                        closed: false,
                    });
                }

                index = (index + 1) % dashes.len();
                remaining = dashes[index];
            }

            remaining -= seg_len - pos;

            if let Some(ref mut dash) = current {
                dash.points.push(b);
            }
        }

        out.extend(current);
    }

    Some(out)
}

fn cap(outline: &mut Outline, p: Point, dir: Point, style: &StrokeStyle) {
    let hw = style.width / 2.0;

    match style.line_cap {
        StrokeLinecap::Butt => (),
        StrokeLinecap::Round => outline.circle(p, hw, style.tolerance),
        StrokeLinecap::Square => {
            let n = scale(perp(dir), hw);
            let ext = scale(dir, hw);
            outline.push(vec![add(p, n), add(add(p, n), ext), add(sub(p, n), ext), sub(p, n)]);
        }
    }
}

fn join(outline: &mut Outline, p: Point, d0: Point, d1: Point, style: &StrokeStyle) {
    let hw = style.width / 2.0;
    let cross = d0.0 * d1.1 - d0.1 * d1.0;
    let dot = d0.0 * d1.0 + d0.1 * d1.1;

    if cross == 0.0 && dot > 0.0 {
        // collinear; the segment bodies already meet
        return;
    }

    if style.line_join == StrokeLinejoin::Round {
        outline.circle(p, hw, style.tolerance);
        return;
    }

    // the outer side of the corner
    let side = if cross > 0.0 { -1.0 } else { 1.0 };
    let n0 = scale(perp(d0), hw * side);
    let n1 = scale(perp(d1), hw * side);
    let a = add(p, n0);
    let b = add(p, n1);

    if style.line_join == StrokeLinejoin::Miter {
        // miter length / stroke width = 1 / sin(theta / 2)
        let cos_half = ((1.0 + dot) / 2.0).max(0.0).sqrt();

        if cos_half > 0.0 && 1.0 / cos_half <= style.miter_limit {
            if let Some(bisector) = normalize(add(n0, n1)) {
                let tip = add(p, scale(bisector, hw / cos_half));
                outline.push(vec![p, a, tip, b]);
                return;
            }
        }
    }

    outline.push(vec![p, a, b]);
}

fn stroke_polyline(outline: &mut Outline, line: &Polyline, style: &StrokeStyle) {
    let points = dedup(line);
    let hw = style.width / 2.0;

    match points.len() {
        0 => return,

        1 => {
            // zero-length subpaths get their caps as dots
            let p = points[0];
            match style.line_cap {
                StrokeLinecap::Butt => (),
                StrokeLinecap::Round => outline.circle(p, hw, style.tolerance),
                StrokeLinecap::Square => outline.push(vec![
                    (p.0 - hw, p.1 - hw),
                    (p.0 + hw, p.1 - hw),
                    (p.0 + hw, p.1 + hw),
                    (p.0 - hw, p.1 + hw),
                ]),
            }
            return;
        }

        _ => (),
    }

    let closed = line.closed && points.len() > 2;
    let n = points.len();
    let num_segments = if closed { n } else { n - 1 };

    let dirs: Vec<Option<Point>> = (0..num_segments)
        .map(|i| normalize(sub(points[(i + 1) % n], points[i])))
        .collect();

    for (i, dir) in dirs.iter().enumerate() {
        let Some(d) = *dir else { continue };
        let (a, b) = (points[i], points[(i + 1) % n]);
        let nrm = scale(perp(d), hw);

        outline.push(vec![add(a, nrm), add(b, nrm), sub(b, nrm), sub(a, nrm)]);
    }

    let num_joins = if closed { n } else { n - 2 };
    for j in 0..num_joins {
        // join between segment j and the next one, at its end point
        let next = (j + 1) % num_segments;
        if let (Some(d0), Some(d1)) = (dirs[j], dirs[next]) {
            join(outline, points[(j + 1) % n], d0, d1, style);
        }
    }

    if !closed {
        if let Some(d) = dirs[0] {
            cap(outline, points[0], scale(d, -1.0), style);
        }

        if let Some(d) = dirs[num_segments - 1] {
            cap(outline, points[n - 1], d, style);
        }
    }
}

/// Expands polylines into the polygons that make up their stroke.
pub fn stroke(lines: &[Polyline], style: &StrokeStyle) -> Vec<Polyline> {
    let mut outline = Outline::default();

    if style.width > 0.0 && style.width.is_finite() {
        for line in lines {
            stroke_polyline(&mut outline, line, style);
        }
    }

    outline.polygons
}
