//! The main context structure which drives the drawing process.
//!
//! [`rasterize`] walks the scene graph depth-first.  The current transform is passed
//! down the recursion; opacity and clipping are handled by drawing into an offscreen
//! [`Surface`] and compositing it back with a mask.  Offscreen surfaces only cover
//! the pixels that their node can paint.

use std::f64::consts::SQRT_2;

use crate::coord_units::CoordUnits;
use crate::layout::Canvas;
use crate::limits::{MAX_DASH_COUNT, MAX_LAYER_PIXELS};
use crate::path_builder::{Path, PathBuilder};
use crate::properties::{FillRule, PaintTarget, StrokeLinejoin};
use crate::raster::{self, PaintSource, StrokeStyle, FLATTEN_TOLERANCE};
use crate::rect::{IRect, Rect};
use crate::scene::{ClipPath, DrawNode, Geometry, Group, NodeCommon, Shape};
use crate::session::Session;
use crate::surface_utils::{Coverage, Surface};
use crate::svg2png_log;
use crate::transform::Transform;

/// Renders the scene rooted at `root` into a new surface of the canvas' size.
///
/// The returned surface has premultiplied pixels.
pub fn rasterize(root: &Group, canvas: &Canvas, session: &Session) -> Surface {
    let mut surface = Surface::new(canvas.width, canvas.height);

    let mut draw_ctx = DrawingCtx::new(session);
    draw_ctx.draw_group(&mut surface, root, &canvas.transform);

    surface
}

struct DrawingCtx<'a> {
    session: &'a Session,

    /// Pixels in the offscreen layers that are currently alive.
    layer_pixels: u64,
}

impl<'a> DrawingCtx<'a> {
    fn new(session: &'a Session) -> DrawingCtx<'a> {
        DrawingCtx {
            session,
            layer_pixels: 0,
        }
    }

    fn draw_node(&mut self, surface: &mut Surface, node: &DrawNode, transform: &Transform) {
        match *node {
            DrawNode::Group(ref group) => self.draw_group(surface, group, transform),
            DrawNode::Path(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Rect(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Circle(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Ellipse(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Line(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Polyline(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Polygon(ref shape) => self.draw_shape(surface, shape.as_ref(), transform),
            DrawNode::Text(_) | DrawNode::Unsupported(_) => (),
        }
    }

    fn draw_group(&mut self, surface: &mut Surface, group: &Group, transform: &Transform) {
        let transform = transform.pre_transform(&group.common.transform);

        let bbox = if group.common.clip.is_some() {
            group_bbox(group)
        } else {
            None
        };

        self.with_discrete_layer(
            surface,
            &group.common,
            &transform,
            group.clip_rect,
            bbox,
            || group_paint_bounds(group),
            &mut |draw_ctx, surface| {
                for child in &group.children {
                    draw_ctx.draw_node(surface, child, &transform);
                }
            },
        );
    }

    fn draw_shape<G: Geometry>(
        &mut self,
        surface: &mut Surface,
        shape: &Shape<G>,
        transform: &Transform,
    ) {
        if !shape.is_visible {
            return;
        }

        let transform = transform.pre_transform(&shape.common.transform);
        let path = shape.to_path();
        if path.is_empty() {
            return;
        }

        let bbox = path.control_bounds();

        self.with_discrete_layer(
            surface,
            &shape.common,
            &transform,
            None,
            bbox,
            || bbox.map(|b| inflate(&b, stroke_extent(shape))),
            &mut |draw_ctx, surface| {
                for target in shape.paint_order.targets {
                    match target {
                        PaintTarget::Fill => {
                            draw_ctx.fill_path(surface, shape, &path, &transform, bbox)
                        }
                        PaintTarget::Stroke => {
                            draw_ctx.stroke_path(surface, shape, &path, &transform, bbox)
                        }
                        // markers are not rendered
                        PaintTarget::Markers => (),
                    }
                }
            },
        );
    }

    fn fill_path<G>(
        &mut self,
        surface: &mut Surface,
        shape: &Shape<G>,
        path: &Path,
        transform: &Transform,
        bbox: Option<Rect>,
    ) {
        let Some(source) = PaintSource::new(&shape.fill.paint, transform, bbox) else {
            return;
        };

        let polygons = raster::flatten(path, transform, FLATTEN_TOLERANCE);
        let coverage = raster::fill(&polygons, shape.fill.rule, surface.extents());

        surface.paint_coverage(&coverage, shape.fill.opacity.0 as f32, |x, y| {
            source.color_at(x, y)
        });
    }

    /// Strokes are expanded in user space, so that non-uniform transforms distort the
    /// pen the same way they distort the path.
    fn stroke_path<G>(
        &mut self,
        surface: &mut Surface,
        shape: &Shape<G>,
        path: &Path,
        transform: &Transform,
        bbox: Option<Rect>,
    ) {
        let stroke = &shape.stroke;

        if !stroke.is_painted() {
            return;
        }

        let Some(source) = PaintSource::new(&stroke.paint, transform, bbox) else {
            return;
        };

        let scale = transform.average_scale();
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }

        let tolerance = FLATTEN_TOLERANCE / scale;

        let mut lines = raster::flatten(path, &Transform::identity(), tolerance);
        if !stroke.dashes.is_empty() {
            match raster::dash(&lines, &stroke.dashes, stroke.dash_offset) {
                Some(dashed) => lines = dashed,
                None => {
                    svg2png_log!(
                        self.session,
                        "stroke-dasharray would make more than {} dashes; not stroking",
                        MAX_DASH_COUNT
                    );
                    return;
                }
            }
        }

        let style = StrokeStyle {
            width: stroke.width,
            line_cap: stroke.line_cap,
            line_join: stroke.line_join,
            miter_limit: stroke.miter_limit,
            tolerance,
        };

        let mut polygons = raster::stroke(&lines, &style);
        for polygon in polygons.iter_mut() {
            polygon.transform(transform);
        }

        // all stroke polygons wind the same way; a reflection flips them all at once
        let coverage = raster::fill(&polygons, FillRule::NonZero, surface.extents());

        surface.paint_coverage(&coverage, stroke.opacity.0 as f32, |x, y| {
            source.color_at(x, y)
        });
    }

    /// Runs `draw_fn` either directly on `surface`, or on a temporary layer when the
    /// node has opacity, a clip path or a clip rectangle.
    ///
    /// `bbox` is the node's bounding box in its own user space, for clip paths in
    /// `objectBoundingBox` units.  `paint_bounds` gives the area that the node can
    /// paint, also in its user space; the layer only covers that area.
    fn with_discrete_layer(
        &mut self,
        surface: &mut Surface,
        common: &NodeCommon,
        transform: &Transform,
        clip_rect: Option<Rect>,
        bbox: Option<Rect>,
        paint_bounds: impl FnOnce() -> Option<Rect>,
        draw_fn: &mut dyn FnMut(&mut DrawingCtx<'a>, &mut Surface),
    ) {
        if !transform.is_invertible() {
            // "If a transform function causes the current transformation matrix of an
            // object to be non-invertible, the object and its content do not get
            // displayed."
            return;
        }

        if !common.needs_layer() && clip_rect.is_none() {
            draw_fn(self, surface);
            return;
        }

        let opacity = common.opacity.0 as f32;
        if opacity <= 0.0 {
            return;
        }

        let Some(area) = paint_bounds()
            .map(|b| device_area(&transform.transform_rect(&b)))
            .and_then(|r| r.intersection(&surface.extents()))
        else {
            return;
        };

        let mut mask = clip_rect.map(|r| self.rect_coverage(&r, transform, area));

        if let Some(ref clip) = common.clip {
            let clip_coverage = self.clip_coverage(clip, transform, bbox, area);

            match mask {
                Some(ref mut m) => m.intersect(&clip_coverage),
                None => mask = Some(clip_coverage),
            }
        }

        if mask.as_ref().map_or(false, |m| m.extents().is_empty()) {
            return;
        }

        let pixels = area.width() as u64 * area.height() as u64;
        if self.layer_pixels + pixels > MAX_LAYER_PIXELS {
            svg2png_log!(
                self.session,
                "offscreen layers would need more than {} pixels; not drawing a node",
                MAX_LAYER_PIXELS
            );
            return;
        }

        self.layer_pixels += pixels;

        let mut layer = Surface::with_extents(area);
        draw_fn(self, &mut layer);

        surface.composite_layer(&layer, opacity, mask.as_ref());

        self.layer_pixels -= pixels;
    }

    fn rect_coverage(&self, rect: &Rect, transform: &Transform, area: IRect) -> Coverage {
        let mut builder = PathBuilder::default();
        builder.move_to(rect.x0, rect.y0);
        builder.line_to(rect.x1, rect.y0);
        builder.line_to(rect.x1, rect.y1);
        builder.line_to(rect.x0, rect.y1);
        builder.close_path();

        let polygons = raster::flatten(&builder.into_path(), transform, FLATTEN_TOLERANCE);
        raster::fill(&polygons, FillRule::NonZero, area)
    }

    /// Computes the mask for a clip path over `area`: the union of its shapes,
    /// intersected with the clip path's own clip path.
    fn clip_coverage(
        &self,
        clip: &ClipPath,
        transform: &Transform,
        bbox: Option<Rect>,
        area: IRect,
    ) -> Coverage {
        let units_transform = match clip.units {
            CoordUnits::UserSpaceOnUse => Transform::identity(),
            CoordUnits::ObjectBoundingBox => match bbox {
                Some(r) if !r.is_empty() => {
                    Transform::new_translate(r.x0, r.y0).pre_scale(r.width(), r.height())
                }

                _ => {
                    svg2png_log!(
                        self.session,
                        "clip path in objectBoundingBox units on an element without a bounding box"
                    );
                    return Coverage::new(IRect::default());
                }
            },
        };

        let clip_transform = transform
            .pre_transform(&clip.transform)
            .pre_transform(&units_transform);

        let mut coverage = Coverage::new(area);

        for shape in &clip.shapes {
            let t = clip_transform.pre_transform(&shape.transform);
            if !t.is_invertible() {
                continue;
            }

            let polygons = raster::flatten(&shape.path, &t, FLATTEN_TOLERANCE);
            coverage.union(&raster::fill(&polygons, shape.rule, area));
        }

        if let Some(ref inner) = clip.clip {
            coverage.intersect(&self.clip_coverage(inner, transform, bbox, area));
        }

        coverage
    }
}

fn shape_bbox<G: Geometry>(shape: &Shape<G>) -> Option<Rect> {
    shape
        .to_path()
        .control_bounds()
        .map(|r| shape.common.transform.transform_rect(&r))
}

/// Bounding box of a node in its parent's user space.
fn node_bbox(node: &DrawNode) -> Option<Rect> {
    match *node {
        DrawNode::Group(ref group) => {
            group_bbox(group).map(|r| group.common.transform.transform_rect(&r))
        }
        DrawNode::Path(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Rect(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Circle(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Ellipse(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Line(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Polyline(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Polygon(ref shape) => shape_bbox(shape.as_ref()),
        DrawNode::Text(_) | DrawNode::Unsupported(_) => None,
    }
}

/// Bounding box of the children of a group, in the group's user space.
fn group_bbox(group: &Group) -> Option<Rect> {
    group
        .children
        .iter()
        .filter_map(node_bbox)
        .reduce(|a, b| a.union(&b))
}

/// How far the stroke of a shape can reach past its geometry, in user units.
fn stroke_extent<G>(shape: &Shape<G>) -> f64 {
    let stroke = &shape.stroke;

    if !stroke.is_painted() {
        return 0.0;
    }

    // square caps reach sqrt(2) half-widths from the end point, miters up to the limit
    let factor = match stroke.line_join {
        StrokeLinejoin::Miter => stroke.miter_limit.max(SQRT_2),
        _ => SQRT_2,
    };

    stroke.width / 2.0 * factor
}

/// Pixels touched by a device-space rectangle, plus one on each side for the
/// antialiased edges of flattened curves.
fn device_area(r: &Rect) -> IRect {
    let r = IRect::from(*r);

    IRect::new(
        r.x0.saturating_sub(1),
        r.y0.saturating_sub(1),
        r.x1.saturating_add(1),
        r.y1.saturating_add(1),
    )
}

fn inflate(r: &Rect, d: f64) -> Rect {
    Rect::new(r.x0 - d, r.y0 - d, r.x1 + d, r.y1 + d)
}

/// Area that a node can paint, strokes included, in its parent's user space.
fn node_paint_bounds(node: &DrawNode) -> Option<Rect> {
    fn shape_bounds<G: Geometry>(shape: &Shape<G>) -> Option<Rect> {
        shape
            .to_path()
            .control_bounds()
            .map(|r| shape.common.transform.transform_rect(&inflate(&r, stroke_extent(shape))))
    }

    match *node {
        DrawNode::Group(ref group) => {
            group_paint_bounds(group).map(|r| group.common.transform.transform_rect(&r))
        }
        DrawNode::Path(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Rect(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Circle(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Ellipse(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Line(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Polyline(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Polygon(ref shape) => shape_bounds(shape.as_ref()),
        DrawNode::Text(_) | DrawNode::Unsupported(_) => None,
    }
}

/// Area that the children of a group can paint, in the group's user space.
fn group_paint_bounds(group: &Group) -> Option<Rect> {
    let bounds = group
        .children
        .iter()
        .filter_map(node_paint_bounds)
        .reduce(|a, b| a.union(&b))?;

    match group.clip_rect {
        Some(clip) => clip.intersection(&bounds),
        None => Some(bounds),
    }
}
