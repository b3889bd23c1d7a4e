//! Representation of Bézier paths.
//!
//! Shapes and the path parser push commands into a [`PathBuilder`], which is mutable,
//! temporary storage.  Elliptical arcs are approximated with cubic Bézier curves as soon
//! as they are added, so the rest of the renderer only ever deals with lines and cubics.
//!
//! The builder then gets turned into an immutable [`Path`] with a compact representation:
//! a dense array of one-byte commands and a separate array with their coordinates.  The
//! builder keeps its commands in a [`TinyVec`] with space for 32 of them on the stack;
//! most paths in SVGs in the wild are shorter than that.

use tinyvec::TinyVec;

use std::f64::consts::*;
use std::slice;

use crate::path_parser::{ParseError, PathParser};
use crate::rect::Rect;

/// Whether an arc's sweep should be >= 180 degrees, or smaller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LargeArc(pub bool);

/// Angular direction in which an arc is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sweep {
    Negative,
    Positive,
}

/// A cubic Bézier segment that starts at the current point.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CubicBezierCurve {
    /// The (x, y) coordinates of the first control point.
    pub pt1: (f64, f64),
    /// The (x, y) coordinates of the second control point.
    pub pt2: (f64, f64),
    /// The (x, y) coordinates of the end point of this path segment.
    pub to: (f64, f64),
}

/// Center parameterization of an elliptical arc, or what to do instead.
///
/// SVG path data specifies arcs by their endpoints; drawing them is easier from the
/// center, radii and angles.  Out of range parameters turn the arc into a straight
/// line or omit it altogether.
#[derive(Debug, PartialEq)]
pub enum ArcParameterization {
    CenterParameters {
        /// Center of the ellipse.
        center: (f64, f64),
        /// Radii of the ellipse, scaled up if they were too small.
        radii: (f64, f64),
        /// Angle of the start point.
        theta1: f64,
        /// Delta angle to the end point.
        delta_theta: f64,
    },
    LineTo,
    Omit,
}

/// An elliptical arc in terms of its endpoints, as in the "a" path command.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArc {
    /// The (x-axis, y-axis) radii for the ellipse.
    pub r: (f64, f64),
    /// Rotation in degrees of the ellipse's x axis relative to the user x axis.
    pub x_axis_rotation: f64,
    pub large_arc: LargeArc,
    pub sweep: Sweep,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl EllipticalArc {
    /// Computes the center parameterization from the endpoint parameterization.
    ///
    /// See [B.2.4. Conversion from endpoint to center
    /// parameterization](https://www.w3.org/TR/SVG2/implnote.html#ArcConversionEndpointToCenter)
    pub fn center_parameterization(&self) -> ArcParameterization {
        let (x1, y1) = self.from;
        let (x2, y2) = self.to;

        if x1 == x2 && y1 == y2 {
            return ArcParameterization::Omit;
        }

        let mut rx = self.r.0.abs();
        let mut ry = self.r.1.abs();

        // Zero radii turn the arc into a straight line; we also divide by their
        // squares below.
        if rx * rx < f64::EPSILON || ry * ry < f64::EPSILON {
            return ArcParameterization::LineTo;
        }

        let positive_sweep = self.sweep == Sweep::Positive;
        let (sin_phi, cos_phi) = self.x_axis_rotation.to_radians().sin_cos();

        // Move the origin to the midpoint of the chord and rotate the axes to the
        // ellipse's axes; primed values are in that system.
        let half_dx = (x1 - x2) / 2.0;
        let half_dy = (y1 - y2) / 2.0;
        let x1p = cos_phi * half_dx + sin_phi * half_dy;
        let y1p = -sin_phi * half_dx + cos_phi * half_dy;

        // Radii that are too small to reach both endpoints are scaled up uniformly.
        let lambda = (x1p / rx).powi(2) + (y1p / ry).powi(2);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let denom = (rx * y1p).powi(2) + (ry * x1p).powi(2);
        if denom == 0.0 {
            return ArcParameterization::Omit;
        }

        let mut k = ((rx * ry).powi(2) / denom - 1.0).abs().sqrt();
        if positive_sweep == self.large_arc.0 {
            k = -k;
        }

        let cxp = k * rx * y1p / ry;
        let cyp = -k * ry * x1p / rx;

        let cx = cos_phi * cxp - sin_phi * cyp + (x1 + x2) / 2.0;
        let cy = sin_phi * cxp + cos_phi * cyp + (y1 + y2) / 2.0;

        let (ux, uy) = ((x1p - cxp) / rx, (y1p - cyp) / ry);
        let (vx, vy) = ((-x1p - cxp) / rx, (-y1p - cyp) / ry);

        let u_len = ux.hypot(uy);
        let v_len = vx.hypot(vy);
        if u_len == 0.0 || v_len == 0.0 {
            return ArcParameterization::Omit;
        }

        let mut theta1 = (ux / u_len).clamp(-1.0, 1.0).acos();
        if uy < 0.0 {
            theta1 = -theta1;
        }

        let mut delta_theta = ((ux * vx + uy * vy) / (u_len * v_len)).clamp(-1.0, 1.0).acos();
        if ux * vy - uy * vx < 0.0 {
            delta_theta = -delta_theta;
        }

        if positive_sweep && delta_theta < 0.0 {
            delta_theta += 2.0 * PI;
        } else if !positive_sweep && delta_theta > 0.0 {
            delta_theta -= 2.0 * PI;
        }

        ArcParameterization::CenterParameters {
            center: (cx, cy),
            radii: (rx, ry),
            theta1,
            delta_theta,
        }
    }
}

/// Approximates the part of an ellipse between angles `th0` and `th1` with one cubic.
///
/// The span must be at most a quarter turn for the approximation to be good.
fn arc_segment(
    center: (f64, f64),
    radii: (f64, f64),
    x_axis_rotation: f64,
    th0: f64,
    th1: f64,
) -> CubicBezierCurve {
    let (cx, cy) = center;
    let (rx, ry) = radii;
    let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();
    let (sin_th0, cos_th0) = th0.sin_cos();
    let (sin_th1, cos_th1) = th1.sin_cos();

    let half = 0.5 * (th1 - th0);
    let t = (8.0 / 3.0) * (half * 0.5).sin().powi(2) / half.sin();

    // control points on the unrotated ellipse centered at the origin
    let p1 = (rx * (cos_th0 - t * sin_th0), ry * (sin_th0 + t * cos_th0));
    let p3 = (rx * cos_th1, ry * sin_th1);
    let p2 = (p3.0 + rx * t * sin_th1, p3.1 - ry * t * cos_th1);

    let place = |(x, y): (f64, f64)| (cx + cos_phi * x - sin_phi * y, cy + sin_phi * x + cos_phi * y);

    CubicBezierCurve {
        pt1: place(p1),
        pt2: place(p2),
        to: place(p3),
    }
}

/// Long-form version of a single path command.
///
/// This is returned from iterators on paths.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(CubicBezierCurve),
    #[default]
    ClosePath,
}

// TinyVec needs T: Default; this value has no meaning in SVG.

/// Compact version of a `PathCommand`, used in `Path`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
enum PackedCommand {
    MoveTo,
    LineTo,
    CurveTo,
    ClosePath,
}

impl PackedCommand {
    fn num_coordinates(self) -> usize {
        match self {
            PackedCommand::MoveTo | PackedCommand::LineTo => 2,
            PackedCommand::CurveTo => 6,
            PackedCommand::ClosePath => 0,
        }
    }
}

impl PathCommand {
    fn pack(&self, coords: &mut Vec<f64>) -> PackedCommand {
        match *self {
            PathCommand::MoveTo(x, y) => {
                coords.extend_from_slice(&[x, y]);
                PackedCommand::MoveTo
            }

            PathCommand::LineTo(x, y) => {
                coords.extend_from_slice(&[x, y]);
                PackedCommand::LineTo
            }

            PathCommand::CurveTo(c) => {
                coords.extend_from_slice(&[c.pt1.0, c.pt1.1, c.pt2.0, c.pt2.1, c.to.0, c.to.1]);
                PackedCommand::CurveTo
            }

            PathCommand::ClosePath => PackedCommand::ClosePath,
        }
    }

    fn unpack(packed: PackedCommand, coords: &mut slice::Iter<'_, f64>) -> PathCommand {
        let mut next = || coords.next().copied().unwrap_or(0.0);

        match packed {
            PackedCommand::MoveTo => PathCommand::MoveTo(next(), next()),
            PackedCommand::LineTo => PathCommand::LineTo(next(), next()),
            PackedCommand::CurveTo => PathCommand::CurveTo(CubicBezierCurve {
                pt1: (next(), next()),
                pt2: (next(), next()),
                to: (next(), next()),
            }),
            PackedCommand::ClosePath => PathCommand::ClosePath,
        }
    }
}

/// Constructs a path out of commands.
///
/// Create this with `PathBuilder::default`; you can then add commands to it or call the
/// `parse` method.  When you are finished, turn it into a `Path` with `into_path`.
///
/// Drawing commands issued before any `move_to` start a subpath at the origin.
#[derive(Default)]
pub struct PathBuilder {
    path_commands: TinyVec<[PathCommand; 32]>,
    current: (f64, f64),
    subpath_start: (f64, f64),
    has_subpath: bool,
}

impl PathBuilder {
    /// Parses SVG path data and appends its commands.
    ///
    /// On error, the commands before the error are kept.
    pub fn parse(&mut self, path_str: &str) -> Result<(), ParseError> {
        let mut parser = PathParser::new(self, path_str);
        parser.parse()
    }

    /// Consumes the `PathBuilder` and returns a compact, immutable representation as a `Path`.
    pub fn into_path(self) -> Path {
        let mut coords = Vec::new();
        let commands: Vec<_> = self
            .path_commands
            .iter()
            .map(|cmd| cmd.pack(&mut coords))
            .collect();

        Path {
            commands: commands.into_boxed_slice(),
            coords: coords.into_boxed_slice(),
        }
    }

    #[cfg(test)]
    fn current_point(&self) -> (f64, f64) {
        self.current
    }

    fn ensure_subpath(&mut self) {
        if !self.has_subpath {
            let (x, y) = self.current;
            self.move_to(x, y);
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.path_commands.push(PathCommand::MoveTo(x, y));
        self.current = (x, y);
        self.subpath_start = (x, y);
        self.has_subpath = true;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.ensure_subpath();
        self.path_commands.push(PathCommand::LineTo(x, y));
        self.current = (x, y);
    }

    pub fn curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.ensure_subpath();
        self.path_commands.push(PathCommand::CurveTo(CubicBezierCurve {
            pt1: (x2, y2),
            pt2: (x3, y3),
            to: (x4, y4),
        }));
        self.current = (x4, y4);
    }

    /// Adds an elliptical arc from the current point to `(x2, y2)`.
    ///
    /// The arc is approximated with cubic curves of at most a quarter turn each.
    pub fn arc(
        &mut self,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: LargeArc,
        sweep: Sweep,
        x2: f64,
        y2: f64,
    ) {
        self.ensure_subpath();

        let arc = EllipticalArc {
            r: (rx, ry),
            x_axis_rotation,
            large_arc,
            sweep,
            from: self.current,
            to: (x2, y2),
        };

        match arc.center_parameterization() {
            ArcParameterization::CenterParameters {
                center,
                radii,
                theta1,
                delta_theta,
            } => {
                let n_segs = (delta_theta / (FRAC_PI_2 + 0.001)).abs().ceil().max(1.0) as usize;
                let d_theta = delta_theta / n_segs as f64;

                let mut theta = theta1;
                for i in 0..n_segs {
                    let mut curve = arc_segment(center, radii, x_axis_rotation, theta, theta + d_theta);

                    // land exactly on the endpoint to avoid cracks between segments
                    if i == n_segs - 1 {
                        curve.to = (x2, y2);
                    }

                    self.path_commands.push(PathCommand::CurveTo(curve));
                    theta += d_theta;
                }

                self.current = (x2, y2);
            }

            ArcParameterization::LineTo => self.line_to(x2, y2),

            ArcParameterization::Omit => (),
        }
    }

    pub fn close_path(&mut self) {
        if self.has_subpath {
            self.path_commands.push(PathCommand::ClosePath);
            self.current = self.subpath_start;
        }
    }
}

/// An immutable path with a compact representation.
///
/// This is constructed from a `PathBuilder` once it is finished.  This struct
/// implements `Default`, and it yields an empty path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Path {
    commands: Box<[PackedCommand]>,
    coords: Box<[f64]>,
}

impl Path {
    /// Get an iterator over a path's commands.
    pub fn iter(&self) -> impl Iterator<Item = PathCommand> + '_ {
        let mut coords = self.coords.iter();

        self.commands
            .iter()
            .map(move |cmd| PathCommand::unpack(*cmd, &mut coords))
    }

    /// Returns whether there are no commands in the path.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of coordinate values stored for the path.
    pub fn num_coordinates(&self) -> usize {
        self.commands.iter().map(|c| c.num_coordinates()).sum()
    }

    /// Bounding box of all the points and control points.
    ///
    /// This is exact for paths made only of lines, and for the curves that
    /// approximate circles and ellipses.
    pub fn control_bounds(&self) -> Option<Rect> {
        let mut xs = self.coords.iter().step_by(2);
        let mut ys = self.coords.iter().skip(1).step_by(2);

        let (&x0, &y0) = (xs.next()?, ys.next()?);
        let mut r = Rect::new(x0, y0, x0, y0);

        for (&x, &y) in xs.zip(ys) {
            r = Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y));
        }

        Some(r)
    }
}
