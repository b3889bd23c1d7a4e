//! Pixel buffers and the compositing operations on them.
//!
//! Surfaces hold premultiplied RGBA8 pixels.  Everything that blends pixels goes
//! through here, so the rounding rules are the same for every drawing operation.

use rgb::ColorComponentMap;

use crate::rect::IRect;

/// A pixel consisting of R, G, B and A values.
pub type Pixel = rgb::RGBA8;

pub trait PixelOps {
    fn premultiply(self) -> Self;
    fn unpremultiply(self) -> Self;
    fn diff(&self, other: &Self) -> Self;
}

impl PixelOps for Pixel {
    /// Returns an unpremultiplied value of this pixel.
    ///
    /// For a fully transparent pixel, a transparent black pixel will be returned.
    #[inline]
    fn unpremultiply(self) -> Self {
        if self.a == 0 {
            Self {
                r: 0,
                g: 0,
                b: 0,
                a: 0,
            }
        } else {
            let alpha = f32::from(self.a) / 255.0;
            self.map_colors(|x| ((f32::from(x) / alpha) + 0.5).min(255.0) as u8)
        }
    }

    /// Returns a premultiplied value of this pixel.
    #[inline]
    fn premultiply(self) -> Self {
        let a = self.a as u32;
        self.map_colors(|x| (((x as u32) * a + 127) / 255) as u8)
    }

    #[inline]
    fn diff(&self, other: &Pixel) -> Pixel {
        Pixel {
            r: self.r.abs_diff(other.r),
            g: self.g.abs_diff(other.g),
            b: self.b.abs_diff(other.b),
            a: self.a.abs_diff(other.a),
        }
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v + 0.5).clamp(0.0, 255.0) as u8
}

/// Composites `src` over `dst` after scaling `src` by `alpha`.
///
/// Both pixels are premultiplied; `alpha` is in `[0, 1]`.
#[inline]
pub fn source_over(dst: Pixel, src: Pixel, alpha: f32) -> Pixel {
    if alpha <= 0.0 || src.a == 0 {
        return dst;
    }

    let inv = 1.0 - f32::from(src.a) * alpha / 255.0;

    Pixel {
        r: to_u8(f32::from(src.r) * alpha + f32::from(dst.r) * inv),
        g: to_u8(f32::from(src.g) * alpha + f32::from(dst.g) * inv),
        b: to_u8(f32::from(src.b) * alpha + f32::from(dst.b) * inv),
        a: to_u8(f32::from(src.a) * alpha + f32::from(dst.a) * inv),
    }
}

/// A grid of coverage values in `[0, 1]`, positioned somewhere on a surface.
///
/// Only the area in `extents` is stored; everything outside it has zero coverage.
#[derive(Debug, Clone)]
pub struct Coverage {
    extents: IRect,
    data: Vec<f32>,
}

impl Coverage {
    pub fn new(extents: IRect) -> Coverage {
        let extents = if extents.is_empty() {
            IRect::default()
        } else {
            extents
        };

        let len = extents.width() as usize * extents.height() as usize;

        Coverage {
            extents,
            data: vec![0.0; len],
        }
    }

    /// Full coverage over `extents`.
    pub fn filled(extents: IRect) -> Coverage {
        let mut c = Coverage::new(extents);
        c.data.iter_mut().for_each(|v| *v = 1.0);
        c
    }

    pub fn extents(&self) -> IRect {
        self.extents
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let e = &self.extents;
        if x >= e.x0 && x < e.x1 && y >= e.y0 && y < e.y1 {
            Some((y - e.y0) as usize * e.width() as usize + (x - e.x0) as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map(|i| self.data[i]).unwrap_or(0.0)
    }

    /// Mutable access to one row, starting at `extents.x0`.
    pub fn row_mut(&mut self, y: i32) -> Option<&mut [f32]> {
        let e = self.extents;
        if y < e.y0 || y >= e.y1 {
            return None;
        }

        let w = e.width() as usize;
        let start = (y - e.y0) as usize * w;
        Some(&mut self.data[start..start + w])
    }

    /// Accumulates `other` into this coverage, as if drawing one over the other.
    ///
    /// Only the part of `other` inside this coverage's extents is kept.
    pub fn union(&mut self, other: &Coverage) {
        let Some(area) = self.extents.intersection(&other.extents) else {
            return;
        };

        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                if let Some(i) = self.index(x, y) {
                    let a = self.data[i];
                    let b = other.get(x, y);
                    self.data[i] = a + b - a * b;
                }
            }
        }
    }

    /// Keeps only what is covered both here and in `other`.
    pub fn intersect(&mut self, other: &Coverage) {
        let e = self.extents;
        for y in e.y0..e.y1 {
            for x in e.x0..e.x1 {
                if let Some(i) = self.index(x, y) {
                    self.data[i] *= other.get(x, y);
                }
            }
        }
    }
}

/// An image with premultiplied RGBA8 pixels.
///
/// A surface covers the pixel area in its extents.  Output images start at the
/// origin; offscreen layers only cover the area that their contents can touch.
#[derive(Clone)]
pub struct Surface {
    extents: IRect,
    data: Vec<Pixel>,
}

impl Surface {
    /// Creates a fully transparent surface at the origin.
    pub fn new(width: u32, height: u32) -> Surface {
        Surface::with_extents(IRect::new(0, 0, width as i32, height as i32))
    }

    /// Creates a fully transparent surface over an arbitrary pixel area.
    pub fn with_extents(extents: IRect) -> Surface {
        let extents = if extents.is_empty() {
            IRect::default()
        } else {
            extents
        };

        let len = extents.width() as usize * extents.height() as usize;

        Surface {
            extents,
            data: vec![Pixel::default(); len],
        }
    }

    pub fn width(&self) -> u32 {
        self.extents.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.extents.height() as u32
    }

    pub fn extents(&self) -> IRect {
        self.extents
    }

    /// Index of a pixel that is known to be inside the extents.
    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        let e = &self.extents;
        (y - e.y0) as usize * e.width() as usize + (x - e.x0) as usize
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.data[self.index(x as i32, y as i32)]
    }

    /// Blends a color over the pixels where `coverage` is nonzero.
    ///
    /// `paint` returns the premultiplied color for the center of a pixel.
    pub fn paint_coverage<F>(&mut self, coverage: &Coverage, opacity: f32, mut paint: F)
    where
        F: FnMut(i32, i32) -> Pixel,
    {
        let Some(area) = coverage.extents().intersection(&self.extents()) else {
            return;
        };

        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let c = coverage.get(x, y) * opacity;
                if c <= 0.0 {
                    continue;
                }

                let i = self.index(x, y);
                self.data[i] = source_over(self.data[i], paint(x, y), c.min(1.0));
            }
        }
    }

    /// Draws `layer` over this surface, scaled by `opacity` and by an optional mask.
    ///
    /// Only the area where both surfaces overlap is touched.
    pub fn composite_layer(&mut self, layer: &Surface, opacity: f32, mask: Option<&Coverage>) {
        let Some(area) = layer.extents.intersection(&self.extents) else {
            return;
        };

        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let src = layer.data[layer.index(x, y)];
                if src.a == 0 {
                    continue;
                }

                let alpha = match mask {
                    Some(m) => opacity * m.get(x, y),
                    None => opacity,
                };

                let i = self.index(x, y);
                self.data[i] = source_over(self.data[i], src, alpha);
            }
        }
    }

    /// Converts the surface into straight-alpha RGBA8 bytes, row by row.
    pub fn into_straight_rgba(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);

        for p in self.data {
            let p = p.unpremultiply();
            bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }

        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pixel_diff() {
        let a = Pixel::new(0x10, 0x20, 0xf0, 0x40);
        assert_eq!(a, a.diff(&Pixel::default()));
        let b = Pixel::new(0x50, 0xff, 0x20, 0x10);
        assert_eq!(a.diff(&b), Pixel::new(0x40, 0xdf, 0xd0, 0x30));
    }

    #[test]
    fn source_over_opaque_replaces() {
        let dst = Pixel::new(0, 0, 255, 255);
        let src = Pixel::new(255, 0, 0, 255);
        assert_eq!(source_over(dst, src, 1.0), src);
        assert_eq!(source_over(dst, src, 0.0), dst);
    }

    #[test]
    fn source_over_half_coverage_blends() {
        let dst = Pixel::new(0, 0, 0, 0);
        let src = Pixel::new(255, 0, 0, 255);
        assert_eq!(source_over(dst, src, 0.5), Pixel::new(128, 0, 0, 128));
    }

    #[test]
    fn coverage_is_zero_outside_extents() {
        let mut c = Coverage::filled(IRect::new(2, 2, 4, 4));
        assert_eq!(c.get(2, 2), 1.0);
        assert_eq!(c.get(4, 4), 0.0);
        assert_eq!(c.get(-1, 0), 0.0);

        let half = {
            let mut h = Coverage::new(IRect::new(0, 0, 3, 3));
            for y in 0..3 {
                h.row_mut(y).unwrap().iter_mut().for_each(|v| *v = 0.5);
            }
            h
        };

        c.intersect(&half);
        assert_eq!(c.get(2, 2), 0.5);
        assert_eq!(c.get(3, 3), 0.0);
    }

    #[test]
    fn coverage_union_accumulates() {
        let mut c = Coverage::new(IRect::new(0, 0, 2, 1));
        c.row_mut(0).unwrap()[0] = 0.5;

        let mut other = Coverage::new(IRect::new(0, 0, 2, 1));
        other.row_mut(0).unwrap().copy_from_slice(&[0.5, 1.0]);

        c.union(&other);
        assert_eq!(c.get(0, 0), 0.75);
        assert_eq!(c.get(1, 0), 1.0);
    }

    #[test]
    fn composite_layer_with_mask() {
        let mut surface = Surface::new(2, 1);
        let mut layer = Surface::new(2, 1);
        let full = Coverage::filled(IRect::new(0, 0, 2, 1));
        layer.paint_coverage(&full, 1.0, |_, _| Pixel::new(0, 255, 0, 255));

        let mask = Coverage::filled(IRect::new(0, 0, 1, 1));
        surface.composite_layer(&layer, 1.0, Some(&mask));

        assert_eq!(surface.pixel(0, 0), Pixel::new(0, 255, 0, 255));
        assert_eq!(surface.pixel(1, 0), Pixel::default());
    }

    #[test]
    fn layers_composite_at_their_position() {
        let mut surface = Surface::new(4, 4);
        let mut layer = Surface::with_extents(IRect::new(2, 1, 6, 3));
        assert_eq!((layer.width(), layer.height()), (4, 2));

        let full = Coverage::filled(IRect::new(0, 0, 8, 8));
        layer.paint_coverage(&full, 1.0, |_, _| Pixel::new(0, 0, 255, 255));
        assert_eq!(layer.pixel(5, 2), Pixel::new(0, 0, 255, 255));

        surface.composite_layer(&layer, 1.0, None);

        assert_eq!(surface.pixel(2, 1), Pixel::new(0, 0, 255, 255));
        assert_eq!(surface.pixel(3, 2), Pixel::new(0, 0, 255, 255));
        assert_eq!(surface.pixel(1, 1), Pixel::default());
        assert_eq!(surface.pixel(2, 3), Pixel::default());
    }

    #[test]
    fn straight_alpha_output() {
        let mut surface = Surface::new(1, 1);
        let full = Coverage::filled(surface.extents());
        surface.paint_coverage(&full, 0.5, |_, _| Pixel::new(255, 255, 255, 255));

        assert_eq!(surface.into_straight_rgba(), vec![255, 255, 255, 128]);
    }

    // Floating-point reference implementation
    fn premultiply_float(pixel: Pixel) -> Pixel {
        let alpha = f64::from(pixel.a) / 255.0;
        pixel.map_colors(|x| ((f64::from(x) * alpha) + 0.5) as u8)
    }

    prop_compose! {
        fn arbitrary_pixel()(a: u8, r: u8, g: u8, b: u8) -> Pixel {
            Pixel { r, g, b, a }
        }
    }

    proptest! {
        #[test]
        fn pixel_premultiply(pixel in arbitrary_pixel()) {
            prop_assert_eq!(pixel.premultiply(), premultiply_float(pixel));
        }

        #[test]
        fn pixel_unpremultiply(pixel in arbitrary_pixel()) {
            let roundtrip = pixel.premultiply().unpremultiply();
            if pixel.a == 0 {
                prop_assert_eq!(roundtrip, Pixel::default());
            } else {
                // roundtrip can't be perfect, the accepted error depends on alpha
                let tolerance = 0xff / pixel.a;
                let diff = roundtrip.diff(&pixel);
                prop_assert!(diff.r <= tolerance, "red component value differs by more than {}: {:?}", tolerance, roundtrip);
                prop_assert!(diff.g <= tolerance, "green component value differs by more than {}: {:?}", tolerance, roundtrip);
                prop_assert!(diff.b <= tolerance, "blue component value differs by more than {}: {:?}", tolerance, roundtrip);

                prop_assert_eq!(pixel.a, roundtrip.a);
            }
       }
    }
}
