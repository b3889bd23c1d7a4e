//! Processing limits to mitigate malicious SVGs.

/// Maximum number of times that elements can be referenced through URL fragments.
///
/// Imagine the XML [billion laughs attack], but done in SVG's terms: a chain of
/// `<use>` elements where the first one references the second one ten times, the
/// second one references the third one ten times, and so on.  This does not exhaust
/// memory, but it would take a really long time to render.
///
/// We deal with this by placing a limit on how many references will be resolved
/// while building the scene, that is, how many `url(#foo)` or `href="#foo"` will
/// be followed.
///
/// [billion laughs attack]: https://bitbucket.org/tiran/defusedxml
pub const MAX_REFERENCED_ELEMENTS: usize = 500_000;

/// Maximum number of nodes in the scene graph of a document.
///
/// Each `<use>` makes a copy of the element that it references, so a small
/// document with nested `<use>` elements can expand into a huge scene.  Loading
/// fails once lowering has produced this many nodes.
pub const MAX_DRAW_NODES: usize = 1_000_000;

/// Maximum number of pixels in all the offscreen layers that exist at the same time.
///
/// Opacity and clipping are drawn through layers, and nested groups keep their
/// layers alive while their children are drawn.  A node whose layer would go over
/// this limit is not drawn.
pub const MAX_LAYER_PIXELS: u64 = 4 * DEFAULT_MAX_PIXELS;

/// Maximum number of elements loadable per document.
///
/// This is a mitigation for SVG files which create millions of elements
/// in an attempt to exhaust memory.
pub const MAX_LOADED_ELEMENTS: usize = 1_000_000;

/// Maximum number of dashes that a single stroke may be split into.
///
/// A tiny `stroke-dasharray` on a long path would otherwise produce billions of
/// polylines.  Strokes over this limit are not drawn.
pub const MAX_DASH_COUNT: usize = 1_000_000;

/// Default maximum number of pixels in an output image, 4096×4096.
///
/// Requests that would produce a larger image are scaled down uniformly.
/// This can be changed with [`crate::api::Converter::with_pixel_budget`].
pub const DEFAULT_MAX_PIXELS: u64 = 16_777_216;
