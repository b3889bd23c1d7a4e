//! Axis-aligned rectangles in user space and in pixels.
//!
//! Rectangles are stored by their corners, `(x0, y0)` inclusive and `(x1, y1)` exclusive
//! for pixel rectangles.  A rectangle with `x1 <= x0` or `y1 <= y0` is empty.

use float_cmp::approx_eq;
use num_traits::Num;

/// A rectangle with coordinates of type `T`.
///
/// Use the [`Rect`] and [`IRect`] aliases instead of naming this directly.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectOf<T> {
    pub x0: T,
    pub y0: T,
    pub x1: T,
    pub y1: T,
}

pub type Rect = RectOf<f64>;

/// Integer rectangle, used for pixel regions.
pub type IRect = RectOf<i32>;

// f64 is only PartialOrd, so std's min/max don't apply
fn lesser<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

fn greater<T: PartialOrd>(a: T, b: T) -> T {
    if b > a {
        b
    } else {
        a
    }
}

impl<T> RectOf<T> {
    pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
        RectOf { x0, y0, x1, y1 }
    }
}

impl<T: Num + Copy + PartialOrd> RectOf<T> {
    /// A rectangle at the origin.
    pub fn from_size(width: T, height: T) -> Self {
        RectOf::new(T::zero(), T::zero(), width, height)
    }

    pub fn width(&self) -> T {
        self.x1 - self.x0
    }

    pub fn height(&self) -> T {
        self.y1 - self.y0
    }

    pub fn size(&self) -> (T, T) {
        (self.width(), self.height())
    }

    /// The common area of both rectangles, or `None` if they do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let r = RectOf::new(
            greater(self.x0, other.x0),
            greater(self.y0, other.y0),
            lesser(self.x1, other.x1),
            lesser(self.y1, other.y1),
        );

        (r.x0 < r.x1 && r.y0 < r.y1).then_some(r)
    }

    /// The smallest rectangle that contains both.
    pub fn union(&self, other: &Self) -> Self {
        RectOf::new(
            lesser(self.x0, other.x0),
            lesser(self.y0, other.y0),
            greater(self.x1, other.x1),
            greater(self.y1, other.y1),
        )
    }
}

impl IRect {
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

impl Rect {
    /// Also true for rectangles that are a hair's width thick, like the bounds of a
    /// horizontal line.
    pub fn is_empty(&self) -> bool {
        approx_eq!(f64, self.width(), 0.0) || approx_eq!(f64, self.height(), 0.0)
    }

    pub fn approx_eq(&self, other: &Rect) -> bool {
        [
            (self.x0, other.x0),
            (self.y0, other.y0),
            (self.x1, other.x1),
            (self.y1, other.y1),
        ]
        .iter()
        .all(|&(a, b)| approx_eq!(f64, a, b, epsilon = 0.0001))
    }
}

impl From<Rect> for IRect {
    /// Smallest pixel rectangle that covers the float rectangle.
    fn from(r: Rect) -> Self {
        IRect::new(
            r.x0.floor() as i32,
            r.y0.floor() as i32,
            r.x1.ceil() as i32,
            r.y1.ceil() as i32,
        )
    }
}

impl From<IRect> for Rect {
    fn from(r: IRect) -> Self {
        Rect::new(
            f64::from(r.x0),
            f64::from(r.y0),
            f64::from(r.x1),
            f64::from(r.y1),
        )
    }
}
