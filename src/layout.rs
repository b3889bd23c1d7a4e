//! Output size and the transform from the document's user space to pixels.
//!
//! The document provides its intrinsic dimensions: the `width`, `height` and `viewBox`
//! of the toplevel `<svg>`.  The caller provides a [`SizingRequest`].  [`resolve`]
//! combines both into a [`Canvas`].  It never fails; unusable values get clamped and
//! logged as [`InvalidSizingError`].

use crate::coord_units::CoordUnits;
use crate::error::InvalidSizingError;
use crate::rect::Rect;
use crate::session::Session;
use crate::svg2png_log;
use crate::transform::Transform;
use crate::viewbox::ViewBox;

/// Width of documents that specify neither a `width` nor a `viewBox`.
pub const FALLBACK_WIDTH: f64 = 300.0;

/// Height of documents that specify neither a `height` nor a `viewBox`.
pub const FALLBACK_HEIGHT: f64 = 150.0;

/// The rectangle against which percentage lengths are resolved.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    /// Current viewBox in user-space units.
    pub vbox: Rect,
}

impl Viewport {
    pub fn new(vbox: Rect) -> Viewport {
        Viewport { vbox }
    }

    /// Viewport for lengths in the given units.
    ///
    /// For `objectBoundingBox`, lengths are fractions of the bounding box, so
    /// percentages resolve against a unit square.
    pub fn with_units(&self, units: CoordUnits) -> Viewport {
        match units {
            CoordUnits::ObjectBoundingBox => Viewport::new(Rect::from_size(1.0, 1.0)),
            CoordUnits::UserSpaceOnUse => *self,
        }
    }
}

/// A size in user units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Size {
        Size { width, height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// The `width`, `height` and `viewBox` of the toplevel `<svg>`.
///
/// `width` and `height` are in pixels; they are `None` when absent or when they cannot be
/// resolved without a viewport, like percentages.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct IntrinsicDimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub vbox: Option<ViewBox>,
}

impl IntrinsicDimensions {
    /// The size of the document in user units.
    ///
    /// This is the size of the `viewBox` if there is one; otherwise the `width` and
    /// `height`.  An axis without a value takes the fallback of 300×150.  Degenerate
    /// sizes are replaced by the fallback.
    pub fn base_size(&self) -> Size {
        self.checked_base_size()
            .unwrap_or_else(|_| Size::new(FALLBACK_WIDTH, FALLBACK_HEIGHT))
    }

    fn checked_base_size(&self) -> Result<Size, InvalidSizingError> {
        let size = match self.vbox {
            Some(vbox) => Size::new(vbox.width(), vbox.height()),
            None => Size::new(
                self.width.unwrap_or(FALLBACK_WIDTH),
                self.height.unwrap_or(FALLBACK_HEIGHT),
            ),
        };

        if size.is_degenerate() {
            Err(InvalidSizingError::DocumentSize(size.width, size.height))
        } else {
            Ok(size)
        }
    }

    /// The viewport for the toplevel element's children.
    pub fn root_viewbox(&self) -> Rect {
        match self.vbox {
            Some(vbox) if self.checked_base_size().is_ok() => vbox.rect(),
            _ => {
                let size = self.base_size();
                Rect::from_size(size.width, size.height)
            }
        }
    }

    fn origin(&self) -> (f64, f64) {
        match self.vbox {
            Some(vbox) if self.checked_base_size().is_ok() => (vbox.x0, vbox.y0),
            _ => (0.0, 0.0),
        }
    }
}

/// How the caller wants the output to be sized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SizingRequest {
    /// Stretch to exactly this size; each axis is scaled independently.
    Explicit { width: f64, height: f64 },

    /// This width; the height keeps the document's aspect ratio.
    Width(f64),

    /// This height; the width keeps the document's aspect ratio.
    Height(f64),

    /// Multiply the document's size by this factor.
    Scale(f64),

    /// Use the document's size.
    Intrinsic,
}

impl Default for SizingRequest {
    fn default() -> Self {
        SizingRequest::Intrinsic
    }
}

impl SizingRequest {
    /// Builds a request out of optional parameters.
    ///
    /// A scale that is present and not 1.0 takes precedence over the width and height.
    pub fn from_params(width: Option<u32>, height: Option<u32>, scale: Option<f64>) -> SizingRequest {
        match (width, height, scale) {
            (_, _, Some(s)) if s != 1.0 => SizingRequest::Scale(s),

            (Some(w), Some(h), _) => SizingRequest::Explicit {
                width: f64::from(w),
                height: f64::from(h),
            },
            (Some(w), None, _) => SizingRequest::Width(f64::from(w)),
            (None, Some(h), _) => SizingRequest::Height(f64::from(h)),
            (None, None, _) => SizingRequest::Intrinsic,
        }
    }
}

/// Size of the output image and the transform from user space to pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub transform: Transform,
}

fn is_valid(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Drops invalid values from a request, falling back to what can still be used.
fn sanitize(request: SizingRequest, session: &Session) -> SizingRequest {
    use SizingRequest::*;

    let invalid = |e: InvalidSizingError| {
        svg2png_log!(session, "{}", e);
    };

    match request {
        Explicit { width, height } => match (is_valid(width), is_valid(height)) {
            (true, true) => request,
            (false, true) => {
                invalid(InvalidSizingError::Width(width));
                Height(height)
            }
            (true, false) => {
                invalid(InvalidSizingError::Height(height));
                Width(width)
            }
            (false, false) => {
                invalid(InvalidSizingError::Width(width));
                invalid(InvalidSizingError::Height(height));
                Intrinsic
            }
        },

        Width(w) if !is_valid(w) => {
            invalid(InvalidSizingError::Width(w));
            Intrinsic
        }

        Height(h) if !is_valid(h) => {
            invalid(InvalidSizingError::Height(h));
            Intrinsic
        }

        Scale(s) if !is_valid(s) => {
            invalid(InvalidSizingError::Scale(s));
            Intrinsic
        }

        _ => request,
    }
}

/// Computes the output size and the root transform for a document.
///
/// The output is at least 1×1 pixels and at most `max_pixels` pixels; larger requests
/// are scaled down uniformly to fit.
pub fn resolve(
    dimensions: &IntrinsicDimensions,
    request: SizingRequest,
    max_pixels: u64,
    session: &Session,
) -> Canvas {
    let base = dimensions.checked_base_size().unwrap_or_else(|e| {
        svg2png_log!(session, "{}; using {}x{}", e, FALLBACK_WIDTH, FALLBACK_HEIGHT);
        Size::new(FALLBACK_WIDTH, FALLBACK_HEIGHT)
    });

    let (mut sx, mut sy) = match sanitize(request, session) {
        SizingRequest::Explicit { width, height } => (width / base.width, height / base.height),

        SizingRequest::Width(w) => {
            let s = w / base.width;
            (s, s)
        }

        SizingRequest::Height(h) => {
            let s = h / base.height;
            (s, s)
        }

        SizingRequest::Scale(s) => (s, s),

        SizingRequest::Intrinsic => (1.0, 1.0),
    };

    // NaN goes to 1 as well
    let mut width = (base.width * sx).round().max(1.0);
    let mut height = (base.height * sy).round().max(1.0);

    let budget = max_pixels.max(1);

    if width * height > budget as f64 {
        svg2png_log!(
            session,
            "{}; scaling down",
            InvalidSizingError::ExceedsPixelBudget {
                width: width as u32,
                height: height as u32,
                budget,
            }
        );

        let factor = (budget as f64).sqrt() / (width.sqrt() * height.sqrt());

        width = (width * factor).floor().max(1.0);
        height = (height * factor).floor().max(1.0);

        // a side clamped up to 1 pixel can leave a thin image over the budget
        if width * height > budget as f64 {
            if width >= height {
                width = (budget as f64 / height).floor().max(1.0);
            } else {
                height = (budget as f64 / width).floor().max(1.0);
            }
        }

        sx = width / base.width;
        sy = height / base.height;
    }

    let (x0, y0) = dimensions.origin();

    Canvas {
        width: width as u32,
        height: height as u32,
        transform: Transform::new_scale(sx, sy).pre_translate(-x0, -y0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use float_cmp::approx_eq;

    use crate::limits::DEFAULT_MAX_PIXELS;

    fn dims(width: Option<f64>, height: Option<f64>, vbox: Option<(f64, f64, f64, f64)>) -> IntrinsicDimensions {
        IntrinsicDimensions {
            width,
            height,
            vbox: vbox.map(|(x, y, w, h)| ViewBox::from(Rect::new(x, y, x + w, y + h))),
        }
    }

    fn canvas(d: &IntrinsicDimensions, request: SizingRequest) -> Canvas {
        resolve(d, request, DEFAULT_MAX_PIXELS, &Session::new_for_test_suite())
    }

    #[test]
    fn base_size_prefers_the_viewbox() {
        let d = dims(Some(100.0), Some(100.0), Some((10.0, 10.0, 50.0, 25.0)));
        assert_eq!(d.base_size(), Size::new(50.0, 25.0));
        assert_eq!(d.root_viewbox(), Rect::new(10.0, 10.0, 60.0, 35.0));
    }

    #[test]
    fn base_size_falls_back_per_axis() {
        assert_eq!(dims(None, None, None).base_size(), Size::new(300.0, 150.0));
        assert_eq!(dims(Some(40.0), None, None).base_size(), Size::new(40.0, 150.0));
        assert_eq!(dims(None, Some(40.0), None).base_size(), Size::new(300.0, 40.0));
    }

    #[test]
    fn degenerate_document_uses_the_fallback() {
        let d = dims(Some(0.0), Some(10.0), None);
        let c = canvas(&d, SizingRequest::Intrinsic);
        assert_eq!((c.width, c.height), (300, 150));

        let d = dims(None, None, Some((0.0, 0.0, 0.0, 10.0)));
        let c = canvas(&d, SizingRequest::Intrinsic);
        assert_eq!((c.width, c.height), (300, 150));
        assert!(c.transform.is_identity());
    }

    #[test]
    fn from_params_routes_scale_first() {
        assert_eq!(
            SizingRequest::from_params(Some(10), Some(20), Some(2.0)),
            SizingRequest::Scale(2.0)
        );
        assert_eq!(
            SizingRequest::from_params(Some(10), Some(20), Some(1.0)),
            SizingRequest::Explicit {
                width: 10.0,
                height: 20.0
            }
        );
        assert_eq!(
            SizingRequest::from_params(Some(10), None, None),
            SizingRequest::Width(10.0)
        );
        assert_eq!(
            SizingRequest::from_params(None, Some(20), None),
            SizingRequest::Height(20.0)
        );
        assert_eq!(
            SizingRequest::from_params(None, None, None),
            SizingRequest::Intrinsic
        );
    }

    #[test]
    fn sizing_modes() {
        let d = dims(Some(100.0), Some(50.0), None);

        let c = canvas(&d, SizingRequest::Intrinsic);
        assert_eq!((c.width, c.height), (100, 50));
        assert!(c.transform.is_identity());

        let c = canvas(&d, SizingRequest::Width(200.0));
        assert_eq!((c.width, c.height), (200, 100));

        let c = canvas(&d, SizingRequest::Height(25.0));
        assert_eq!((c.width, c.height), (50, 25));

        let c = canvas(&d, SizingRequest::Scale(2.0));
        assert_eq!((c.width, c.height), (200, 100));
        assert_eq!(c.transform, Transform::new_scale(2.0, 2.0));

        let c = canvas(
            &d,
            SizingRequest::Explicit {
                width: 10.0,
                height: 10.0,
            },
        );
        assert_eq!((c.width, c.height), (10, 10));
        assert_eq!(c.transform, Transform::new_scale(0.1, 0.2));
    }

    #[test]
    fn root_transform_maps_viewbox_origin() {
        let d = dims(None, None, Some((-10.0, 20.0, 50.0, 50.0)));
        let c = canvas(&d, SizingRequest::Scale(2.0));

        let (x, y) = c.transform.transform_point(-10.0, 20.0);
        assert!(approx_eq!(f64, x, 0.0));
        assert!(approx_eq!(f64, y, 0.0));

        let (x, y) = c.transform.transform_point(40.0, 70.0);
        assert!(approx_eq!(f64, x, 100.0));
        assert!(approx_eq!(f64, y, 100.0));
    }

    #[test]
    fn invalid_requests_are_clamped() {
        let d = dims(Some(100.0), Some(50.0), None);

        for request in [
            SizingRequest::Scale(0.0),
            SizingRequest::Scale(f64::NAN),
            SizingRequest::Width(-5.0),
            SizingRequest::Height(f64::INFINITY),
            SizingRequest::Explicit {
                width: 0.0,
                height: 0.0,
            },
        ] {
            let c = canvas(&d, request);
            assert_eq!((c.width, c.height), (100, 50), "{request:?}");
        }

        let c = canvas(
            &d,
            SizingRequest::Explicit {
                width: 0.0,
                height: 100.0,
            },
        );
        assert_eq!((c.width, c.height), (200, 100));
    }

    #[test]
    fn tiny_outputs_are_at_least_one_pixel() {
        let d = dims(Some(100.0), Some(1.0), None);
        let c = canvas(&d, SizingRequest::Scale(0.01));
        assert_eq!((c.width, c.height), (1, 1));
    }

    #[test]
    fn pixel_budget_scales_down_to_fit() {
        let d = dims(Some(100.0), Some(50.0), None);
        let c = resolve(
            &d,
            SizingRequest::Scale(10.0),
            10_000,
            &Session::new_for_test_suite(),
        );

        assert!(u64::from(c.width) * u64::from(c.height) <= 10_000);
        assert_eq!((c.width, c.height), (141, 70));

        // the content spans the whole canvas
        assert!(approx_eq!(f64, c.transform.xx, 1.41));
        assert!(approx_eq!(f64, c.transform.yy, 1.4));
    }

    #[test]
    fn pixel_budget_handles_extreme_aspect_ratios() {
        let d = dims(Some(1e15), Some(1.0), None);
        let c = canvas(&d, SizingRequest::Intrinsic);

        assert_eq!((c.width, c.height), (DEFAULT_MAX_PIXELS as u32, 1));
        assert!(approx_eq!(f64, c.transform.xx, DEFAULT_MAX_PIXELS as f64 / 1e15));
        assert!(approx_eq!(f64, c.transform.yy, 1.0));

        let d = dims(Some(1.0), Some(1e15), None);
        let c = resolve(&d, SizingRequest::Scale(3.0), 1000, &Session::new_for_test_suite());
        assert_eq!((c.width, c.height), (1, 1000));
    }

    #[test]
    fn zero_budget_still_gives_a_pixel() {
        let d = dims(Some(100.0), Some(50.0), None);
        let c = resolve(&d, SizingRequest::Intrinsic, 0, &Session::new_for_test_suite());
        assert_eq!((c.width, c.height), (1, 1));
    }
}
