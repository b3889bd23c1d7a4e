//! Per-pixel colors for solid colors and gradients.

use crate::coord_units::CoordUnits;
use crate::gradient::SpreadMethod;
use crate::rect::Rect;
use crate::scene::{ColorStop, Gradient, GradientVariant, Paint};
use crate::surface_utils::{Pixel, PixelOps};
use crate::transform::Transform;

const LUT_SIZE: usize = 256;

/// Something that can give a premultiplied color for each pixel.
pub enum PaintSource {
    Solid(Pixel),
    Gradient(Box<GradientSource>),
}

impl PaintSource {
    /// Prepares `paint` for a shape drawn with `ctm`, whose user-space bounding box
    /// is `bbox`.
    ///
    /// Returns `None` when nothing should be painted, like for gradients in
    /// `objectBoundingBox` units on a shape without area.
    pub fn new(paint: &Paint, ctm: &Transform, bbox: Option<Rect>) -> Option<PaintSource> {
        match *paint {
            Paint::None => None,
            Paint::Solid(color) => Some(PaintSource::Solid(color.premultiply())),
            Paint::Gradient(ref gradient) => {
                GradientSource::new(gradient, ctm, bbox).map(|g| PaintSource::Gradient(Box::new(g)))
            }
        }
    }

    /// Color at the center of the pixel `(x, y)`.
    #[inline]
    pub fn color_at(&self, x: i32, y: i32) -> Pixel {
        match *self {
            PaintSource::Solid(p) => p,
            PaintSource::Gradient(ref g) => g.color_at(f64::from(x) + 0.5, f64::from(y) + 0.5),
        }
    }
}

pub struct GradientSource {
    /// Device space to gradient space.
    inverse: Transform,
    variant: GradientVariant,
    spread: SpreadMethod,
    lut: Vec<Pixel>,
}

impl GradientSource {
    fn new(gradient: &Gradient, ctm: &Transform, bbox: Option<Rect>) -> Option<GradientSource> {
        let units_transform = match gradient.units {
            CoordUnits::UserSpaceOnUse => Transform::identity(),
            CoordUnits::ObjectBoundingBox => {
                let bbox = bbox?;
                if bbox.is_empty() {
                    return None;
                }

                Transform::new_translate(bbox.x0, bbox.y0).pre_scale(bbox.width(), bbox.height())
            }
        };

        let inverse = ctm
            .pre_transform(&units_transform)
            .pre_transform(&gradient.transform)
            .invert()?;

        Some(GradientSource {
            inverse,
            variant: clamp_focus(gradient.variant),
            spread: gradient.spread,
            lut: build_lut(&gradient.stops),
        })
    }

    fn color_at(&self, x: f64, y: f64) -> Pixel {
        let (gx, gy) = self.inverse.transform_point(x, y);

        let Some(t) = gradient_parameter(&self.variant, gx, gy) else {
            return Pixel::default();
        };

        let t = apply_spread(t, self.spread);
        let index = (t * (LUT_SIZE - 1) as f64).round() as usize;
        self.lut[index.min(LUT_SIZE - 1)]
    }
}

/// Moves a focal point that lies outside the end circle to just inside of it.
fn clamp_focus(variant: GradientVariant) -> GradientVariant {
    match variant {
        GradientVariant::Radial {
            cx,
            cy,
            r,
            fx,
            fy,
            fr,
        } => {
            let (dx, dy) = (fx - cx, fy - cy);
            let d = dx.hypot(dy);
            let max = r * 0.999;

            let (fx, fy) = if d > max && d > 0.0 {
                (cx + dx * max / d, cy + dy * max / d)
            } else {
                (fx, fy)
            };

            GradientVariant::Radial {
                cx,
                cy,
                r,
                fx,
                fy,
                fr,
            }
        }

        linear => linear,
    }
}

/// Position of a point along the gradient, where 0 is the start and 1 the end.
///
/// `None` means that the point is not covered by the gradient.
fn gradient_parameter(variant: &GradientVariant, x: f64, y: f64) -> Option<f64> {
    match *variant {
        GradientVariant::Linear { x1, y1, x2, y2 } => {
            let (dx, dy) = (x2 - x1, y2 - y1);
            let len2 = dx * dx + dy * dy;

            if len2 == 0.0 {
                // degenerate gradients paint with the last stop
                Some(1.0)
            } else {
                Some(((x - x1) * dx + (y - y1) * dy) / len2)
            }
        }

        GradientVariant::Radial {
            cx,
            cy,
            r,
            fx,
            fy,
            fr,
        } => {
            // Find the largest t for which the point lies on the circle that
            // interpolates between the focal circle (t = 0) and the end circle (t = 1).
            let (cdx, cdy) = (cx - fx, cy - fy);
            let (pdx, pdy) = (x - fx, y - fy);
            let dr = r - fr;

            let a = cdx * cdx + cdy * cdy - dr * dr;
            let b = pdx * cdx + pdy * cdy + fr * dr;
            let c = pdx * pdx + pdy * pdy - fr * fr;

            let radius_ok = |t: f64| fr + t * dr >= 0.0;

            if a.abs() < 1e-12 {
                if b == 0.0 {
                    return None;
                }
                let t = c / (2.0 * b);
                return Some(t).filter(|&t| radius_ok(t));
            }

            let disc = b * b - a * c;
            if disc < 0.0 {
                return None;
            }

            let sq = disc.sqrt();
            let t1 = (b + sq) / a;
            let t2 = (b - sq) / a;
            let (hi, lo) = if t1 >= t2 { (t1, t2) } else { (t2, t1) };

            if radius_ok(hi) {
                Some(hi)
            } else if radius_ok(lo) {
                Some(lo)
            } else {
                None
            }
        }
    }
}

fn apply_spread(t: f64, spread: SpreadMethod) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }

    match spread {
        SpreadMethod::Pad => t.clamp(0.0, 1.0),
        SpreadMethod::Repeat => t - t.floor(),
        SpreadMethod::Reflect => {
            let t = t.rem_euclid(2.0);
            if t > 1.0 {
                2.0 - t
            } else {
                t
            }
        }
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

/// Straight-alpha color of the stops at `t`.
fn stop_color(stops: &[ColorStop], t: f64) -> Pixel {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Pixel::default();
    };

    if t <= first.offset {
        return first.color;
    }

    if t >= last.offset {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (s0, s1) = (pair[0], pair[1]);

        if t >= s0.offset && t < s1.offset {
            let f = (t - s0.offset) / (s1.offset - s0.offset);

            return Pixel {
                r: lerp(s0.color.r, s1.color.r, f),
                g: lerp(s0.color.g, s1.color.g, f),
                b: lerp(s0.color.b, s1.color.b, f),
                a: lerp(s0.color.a, s1.color.a, f),
            };
        }
    }

    last.color
}

fn build_lut(stops: &[ColorStop]) -> Vec<Pixel> {
    (0..LUT_SIZE)
        .map(|i| stop_color(stops, i as f64 / (LUT_SIZE - 1) as f64).premultiply())
        .collect()
}
