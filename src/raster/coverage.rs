//! Scanline coverage computation for filled polygons.

use crate::properties::FillRule;
use crate::rect::{IRect, Rect};
use crate::surface_utils::Coverage;

use super::flatten::Polyline;

/// Vertical sub-samples per pixel row.
const SUBSAMPLES: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    winding: i32,
}

impl Edge {
    fn new(a: (f64, f64), b: (f64, f64)) -> Option<Edge> {
        if a.1 == b.1 {
            // horizontal edges never cross a scanline
            return None;
        }

        let edge = if a.1 < b.1 {
            Edge {
                x0: a.0,
                y0: a.1,
                x1: b.0,
                y1: b.1,
                winding: 1,
            }
        } else {
            Edge {
                x0: b.0,
                y0: b.1,
                x1: a.0,
                y1: a.1,
                winding: -1,
            }
        };

        Some(edge)
    }

    #[inline]
    fn x_at(&self, y: f64) -> f64 {
        self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0)
    }
}

fn is_inside(winding: i32, rule: FillRule) -> bool {
    match rule {
        FillRule::NonZero => winding != 0,
        FillRule::EvenOdd => winding % 2 != 0,
    }
}

/// Adds the part of `[xa, xb)` that falls on each pixel of `row`.
fn add_span(row: &mut [f32], x_origin: i32, xa: f64, xb: f64, weight: f32) {
    let left = f64::from(x_origin);
    let right = left + row.len() as f64;

    let xa = xa.max(left);
    let xb = xb.min(right);
    if xb <= xa {
        return;
    }

    let ia = xa.floor();
    let ib = xb.floor();
    let idx = |x: f64| (x - left) as usize;

    if ia == ib {
        row[idx(ia)] += (xb - xa) as f32 * weight;
        return;
    }

    row[idx(ia)] += (ia + 1.0 - xa) as f32 * weight;

    for i in idx(ia) + 1..idx(ib).min(row.len()) {
        row[i] += weight;
    }

    if ib < right {
        row[idx(ib)] += (xb - ib) as f32 * weight;
    }
}

fn bounds(polygons: &[Polyline]) -> Option<Rect> {
    let mut points = polygons.iter().flat_map(|p| p.points.iter());
    let &(x, y) = points.next()?;

    Some(points.fold(Rect::new(x, y, x, y), |r, &(x, y)| {
        Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y))
    }))
}

/// Computes the coverage of `polygons` filled with `rule`, limited to `clip`.
///
/// Every polyline is treated as closed.  Each pixel row is sampled at
/// [`SUBSAMPLES`] heights, and the horizontal coverage of each sample is exact.
pub fn fill(polygons: &[Polyline], rule: FillRule, clip: IRect) -> Coverage {
    let extents = bounds(polygons)
        .filter(|r| r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite())
        .and_then(|r| IRect::from(r).intersection(&clip));

    let Some(extents) = extents else {
        return Coverage::new(IRect::default());
    };

    let mut edges: Vec<Edge> = polygons
        .iter()
        .filter(|p| p.points.len() > 1)
        .flat_map(|p| {
            let n = p.points.len();
            (0..n).filter_map(move |i| Edge::new(p.points[i], p.points[(i + 1) % n]))
        })
        .collect();

    edges.sort_by(|a, b| a.y0.total_cmp(&b.y0));

    let mut coverage = Coverage::new(extents);
    let mut active: Vec<Edge> = Vec::new();
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    let mut next_edge = 0;
    let weight = 1.0 / SUBSAMPLES as f32;

    for y in extents.y0..extents.y1 {
        let Some(row) = coverage.row_mut(y) else {
            continue;
        };

        for s in 0..SUBSAMPLES {
            let sy = f64::from(y) + (s as f64 + 0.5) / SUBSAMPLES as f64;

            while next_edge < edges.len() && edges[next_edge].y0 <= sy {
                active.push(edges[next_edge]);
                next_edge += 1;
            }

            active.retain(|e| e.y1 > sy);

            crossings.clear();
            crossings.extend(
                active
                    .iter()
                    .filter(|e| e.y0 <= sy)
                    .map(|e| (e.x_at(sy), e.winding)),
            );
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            let mut span_start = 0.0;

            for &(x, w) in crossings.iter() {
                let was_inside = is_inside(winding, rule);
                winding += w;
                let now_inside = is_inside(winding, rule);

                if !was_inside && now_inside {
                    span_start = x;
                } else if was_inside && !now_inside {
                    add_span(row, extents.x0, span_start, x, weight);
                }
            }
        }

        row.iter_mut().for_each(|v| *v = v.min(1.0));
    }

    coverage
}

#[cfg(test)]
mod tests {
    use super::*;

    use float_cmp::approx_eq;

    fn polygon(points: &[(f64, f64)]) -> Polyline {
        Polyline {
            points: points.to_vec(),
            closed: true,
        }
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polyline {
        polygon(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    const CANVAS: IRect = IRect {
        x0: 0,
        y0: 0,
        x1: 10,
        y1: 10,
    };

    #[test]
    fn pixel_aligned_square_is_fully_covered() {
        let c = fill(&[square(2.0, 2.0, 5.0, 5.0)], FillRule::NonZero, CANVAS);

        assert_eq!(c.get(2, 2), 1.0);
        assert_eq!(c.get(4, 4), 1.0);
        assert_eq!(c.get(5, 5), 0.0);
        assert_eq!(c.get(1, 2), 0.0);
    }

    #[test]
    fn fractional_edges_give_partial_coverage() {
        let c = fill(&[square(0.25, 0.0, 1.0, 1.0)], FillRule::NonZero, CANVAS);
        assert!(approx_eq!(f32, c.get(0, 0), 0.75, epsilon = 1e-6));

        let c = fill(&[square(0.0, 0.0, 1.0, 0.5)], FillRule::NonZero, CANVAS);
        assert!(approx_eq!(f32, c.get(0, 0), 0.5, epsilon = 1e-6));
    }

    #[test]
    fn fill_rules_differ_on_overlaps() {
        // two squares with the same orientation
        let shapes = [square(0.0, 0.0, 6.0, 6.0), square(2.0, 2.0, 4.0, 4.0)];

        let nonzero = fill(&shapes, FillRule::NonZero, CANVAS);
        assert_eq!(nonzero.get(3, 3), 1.0);

        let evenodd = fill(&shapes, FillRule::EvenOdd, CANVAS);
        assert_eq!(evenodd.get(3, 3), 0.0);
        assert_eq!(evenodd.get(1, 1), 1.0);
    }

    #[test]
    fn opposite_windings_cancel_with_nonzero() {
        let outer = square(0.0, 0.0, 6.0, 6.0);
        let inner = polygon(&[(2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0)]);

        let c = fill(&[outer, inner], FillRule::NonZero, CANVAS);
        assert_eq!(c.get(3, 3), 0.0);
        assert_eq!(c.get(1, 1), 1.0);
    }

    #[test]
    fn coverage_is_clipped_to_the_canvas() {
        let c = fill(&[square(-5.0, -5.0, 20.0, 20.0)], FillRule::NonZero, CANVAS);
        assert_eq!(c.extents(), CANVAS);
        assert_eq!(c.get(9, 9), 1.0);
    }

    #[test]
    fn empty_input_covers_nothing() {
        let c = fill(&[], FillRule::NonZero, CANVAS);
        assert!(c.extents().is_empty());
    }

    #[test]
    fn span_accumulation() {
        let mut row = vec![0.0; 4];
        add_span(&mut row, 10, 10.5, 12.25, 1.0);
        assert_eq!(row, vec![0.5, 1.0, 0.25, 0.0]);
    }
}
