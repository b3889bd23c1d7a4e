//! Elements: the parsed, per-kind data of element nodes and their cascade state.

use markup5ever::{expanded_name, local_name, namespace_url, ns, QualName};
use std::fmt;

use crate::clip_path::ClipPath;
use crate::error::*;
use crate::gradient::{LinearGradient, RadialGradient, Stop};
use crate::layout::Viewport;
use crate::node::*;
use crate::properties::{ComputedValues, Overflow, ParsedProperty, SpecifiedValue, SpecifiedValues};
use crate::scene::{DrawNode, SceneBuilder};
use crate::session::Session;
use crate::shapes::{Circle, Ellipse, Line, Path, Polygon, Polyline, Rect};
use crate::structure::{Group, Link, NonRendering, Svg, Switch, Symbol, Use};
use crate::svg2png_log;
use crate::text::{TSpan, Text};
use crate::xml::Attributes;

/// Behavior of a kind of element.
pub trait ElementTrait {
    /// Reads the element's own attributes.
    ///
    /// Unknown attributes are skipped.  An invalid value leaves the field at its
    /// `Default`; [`set_attribute`] takes care of that.
    fn set_attributes(&mut self, _attributes: &Attributes, _session: &Session) {}

    /// Builds the scene node for this element.  Elements that are only used by
    /// reference, like gradients, keep the default and draw nothing.
    fn lower(
        &self,
        _node: &Node,
        _builder: &mut SceneBuilder<'_>,
        _cascaded: &CascadedValues<'_>,
        _viewport: &Viewport,
    ) -> Option<DrawNode> {
        None
    }
}

/// Stores the parsed value in `dest`, or logs the error and leaves `dest` alone.
pub fn set_attribute<T>(dest: &mut T, parse_result: Result<T, ElementError>, session: &Session) {
    match parse_result {
        Ok(value) => *dest = value,
        Err(e) => svg2png_log!(session, "ignoring attribute with invalid value: {}", e),
    }
}

/// Reads attributes without a namespace into the given places, like
/// `read_attributes!(attrs, session, { "x" => self.x, "y" => self.y, })`.
///
/// Invalid values are logged and leave the destination as it was.
macro_rules! read_attributes {
    ($attrs:expr, $session:expr, { $($name:literal => $dest:expr,)+ }) => {
        for (attr, value) in $attrs.iter() {
            if !attr.ns.is_empty() {
                continue;
            }

            match &*attr.local {
                $($name => $crate::element::set_attribute(
                    &mut $dest,
                    $crate::parsers::ParseValue::parse(&attr, value),
                    $session,
                ),)+
                _ => (),
            }
        }
    };
}

pub(crate) use read_attributes;

pub struct Element {
    element_name: QualName,
    attributes: Attributes,
    specified_values: SpecifiedValues,
    values: ComputedValues,
    pub element_data: ElementData,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get_id() {
            Some(id) => write!(f, "<{} id=\"{}\">", self.element_name.local, id),
            None => write!(f, "<{}>", self.element_name.local),
        }
    }
}

/// The per-kind data of an element.  Every variant is boxed so that the enum stays
/// small.
pub enum ElementData {
    Circle(Box<Circle>),
    ClipPath(Box<ClipPath>),
    Ellipse(Box<Ellipse>),
    Group(Box<Group>),
    Line(Box<Line>),
    LinearGradient(Box<LinearGradient>),
    Link(Box<Link>),
    NonRendering(Box<NonRendering>),
    Path(Box<Path>),
    Polygon(Box<Polygon>),
    Polyline(Box<Polyline>),
    RadialGradient(Box<RadialGradient>),
    Rect(Box<Rect>),
    Stop(Box<Stop>),
    Svg(Box<Svg>),
    Switch(Box<Switch>),
    Symbol(Box<Symbol>),
    Text(Box<Text>),
    TSpan(Box<TSpan>),
    Use(Box<Use>),

    /// A known element that is not rendered, like `<filter>`.
    Unsupported(Box<Unsupported>),
}

/// Stands in for a known element that is not rendered, along with its subtree.
pub struct Unsupported {
    error: UnsupportedFeatureError,
}

impl ElementTrait for Unsupported {
    fn lower(
        &self,
        _node: &Node,
        _builder: &mut SceneBuilder<'_>,
        _cascaded: &CascadedValues<'_>,
        _viewport: &Viewport,
    ) -> Option<DrawNode> {
        Some(DrawNode::Unsupported(self.error.clone()))
    }
}

fn build<T>(
    session: &Session,
    attributes: &Attributes,
    wrap: impl FnOnce(Box<T>) -> ElementData,
) -> ElementData
where
    T: ElementTrait + Default,
{
    let mut data = Box::<T>::default();
    data.set_attributes(attributes, session);
    wrap(data)
}

/// Data for the SVG elements that are rendered or referenced, or `None` for any
/// other name.
#[rustfmt::skip]
fn create_element_data(local: &str, session: &Session, attrs: &Attributes) -> Option<ElementData> {
    use ElementData as D;

    let data = match local {
        "a"              => build(session, attrs, D::Link),
        "circle"         => build(session, attrs, D::Circle),
        "clipPath"       => build(session, attrs, D::ClipPath),
        "defs"           => build(session, attrs, D::NonRendering),
        "ellipse"        => build(session, attrs, D::Ellipse),
        "g"              => build(session, attrs, D::Group),
        "line"           => build(session, attrs, D::Line),
        "linearGradient" => build(session, attrs, D::LinearGradient),
        "path"           => build(session, attrs, D::Path),
        "polygon"        => build(session, attrs, D::Polygon),
        "polyline"       => build(session, attrs, D::Polyline),
        "radialGradient" => build(session, attrs, D::RadialGradient),
        "rect"           => build(session, attrs, D::Rect),
        "stop"           => build(session, attrs, D::Stop),
        "svg"            => build(session, attrs, D::Svg),
        "switch"         => build(session, attrs, D::Switch),
        "symbol"         => build(session, attrs, D::Symbol),
        "text"           => build(session, attrs, D::Text),
        "tspan"          => build(session, attrs, D::TSpan),
        "use"            => build(session, attrs, D::Use),
        _                => return None,
    };

    Some(data)
}

/// Known elements that draw nothing here.  Unlike unknown elements, they are
/// reported through [`UnsupportedFeatureError::Element`].
const UNSUPPORTED_ELEMENTS: &[&str] = &[
    "animate",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "feImage",
    "filter",
    "foreignObject",
    "image",
    "marker",
    "mask",
    "pattern",
    "script",
    "set",
    "style",
    "textPath",
    "tref",
];

impl Element {
    /// Creates the element and runs the cascade steps that only need its own
    /// attributes.  The computed values are filled in later by [`NodeCascade`].
    ///
    /// Names without a namespace are taken as SVG.  Names from other namespaces and
    /// unknown SVG names become [`NonRendering`] elements, which hide their subtree.
    pub fn new(session: &Session, name: &QualName, attributes: Attributes) -> Element {
        let local: &str = &name.local;
        let in_svg_namespace = name.ns == ns!(svg) || name.ns == ns!();

        let known = if in_svg_namespace {
            create_element_data(local, session, &attributes)
        } else {
            None
        };

        let element_data = match known {
            Some(data) => data,

            None if in_svg_namespace && UNSUPPORTED_ELEMENTS.contains(&local) => {
                ElementData::Unsupported(Box::new(Unsupported {
                    error: UnsupportedFeatureError::Element(local.to_string()),
                }))
            }

            None => build(session, &attributes, ElementData::NonRendering),
        };

        let mut specified_values = SpecifiedValues::default();

        // The sources go from lowest to highest precedence.
        if matches!(element_data, ElementData::Svg(_) | ElementData::Symbol(_)) {
            // svg:not(:root), symbol { overflow: hidden }
            specified_values.set_parsed_property_user_agent(&ParsedProperty::Overflow(
                SpecifiedValue::Specified(Overflow::Hidden),
            ));
        }

        specified_values.parse_presentation_attributes(session, &attributes);

        if let Some((_, style)) = attributes
            .iter()
            .find(|(attr, _)| attr.expanded() == expanded_name!("", "style"))
        {
            specified_values.parse_style_declarations(style, session);
        }

        Element {
            element_name: name.clone(),
            attributes,
            specified_values,
            values: ComputedValues::default(),
            element_data,
        }
    }

    pub fn element_name(&self) -> &QualName {
        &self.element_name
    }

    pub fn get_id(&self) -> Option<&str> {
        self.attributes.get_id()
    }

    pub fn get_specified_values(&self) -> &SpecifiedValues {
        &self.specified_values
    }

    pub fn get_computed_values(&self) -> &ComputedValues {
        &self.values
    }

    pub fn set_computed_values(&mut self, values: &ComputedValues) {
        self.values = values.clone();
    }

    pub fn unsupported_feature(&self) -> Option<&UnsupportedFeatureError> {
        match &self.element_data {
            ElementData::Unsupported(u) => Some(&u.error),
            _ => None,
        }
    }

    /// Elements that are only drawn through references from other elements, and
    /// that can therefore be part of a reference cycle.
    pub fn is_accessed_by_reference(&self) -> bool {
        matches!(
            self.element_data,
            ElementData::ClipPath(_) | ElementData::LinearGradient(_) | ElementData::RadialGradient(_)
        )
    }

    /// Lowers the element unless it has `display: none`.
    pub fn lower(
        &self,
        node: &Node,
        builder: &mut SceneBuilder<'_>,
        cascaded: &CascadedValues<'_>,
        viewport: &Viewport,
    ) -> Option<DrawNode> {
        if !cascaded.get().is_displayed() {
            return None;
        }

        self.element_data
            .as_element_trait()
            .lower(node, builder, cascaded, viewport)
    }
}

impl ElementData {
    #[rustfmt::skip]
    fn as_element_trait(&self) -> &dyn ElementTrait {
        use ElementData::*;

        match self {
            Circle(d)         => &**d,
            ClipPath(d)       => &**d,
            Ellipse(d)        => &**d,
            Group(d)          => &**d,
            Line(d)           => &**d,
            LinearGradient(d) => &**d,
            Link(d)           => &**d,
            NonRendering(d)   => &**d,
            Path(d)           => &**d,
            Polygon(d)        => &**d,
            Polyline(d)       => &**d,
            RadialGradient(d) => &**d,
            Rect(d)           => &**d,
            Stop(d)           => &**d,
            Svg(d)            => &**d,
            Switch(d)         => &**d,
            Symbol(d)         => &**d,
            Text(d)           => &**d,
            TSpan(d)          => &**d,
            Use(d)            => &**d,
            Unsupported(d)    => &**d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use markup5ever::{LocalName, Namespace};

    use crate::parsers::Parse;
    use crate::properties::{Fill, StrokeWidth};

    fn element(ns: Namespace, name: &str, attrs: &[(&str, &str)]) -> Element {
        let session = Session::new_for_test_suite();
        let name = QualName::new(None, ns, LocalName::from(name));
        let mut e = Element::new(&session, &name, Attributes::from_pairs(attrs));

        let mut values = ComputedValues::default();
        e.get_specified_values().to_computed_values(&mut values);
        e.set_computed_values(&values);

        e
    }

    #[test]
    fn elements_without_namespace_are_svg() {
        let e = element(ns!(), "rect", &[]);
        assert!(matches!(e.element_data, ElementData::Rect(_)));

        let e = element(ns!(svg), "circle", &[]);
        assert!(matches!(e.element_data, ElementData::Circle(_)));

        let e = element(Namespace::from("http://example.com"), "rect", &[]);
        assert!(matches!(e.element_data, ElementData::NonRendering(_)));
    }

    #[test]
    fn classifies_unsupported_and_unknown_elements() {
        let e = element(ns!(svg), "filter", &[]);
        assert_eq!(
            e.unsupported_feature(),
            Some(&UnsupportedFeatureError::Element("filter".to_string()))
        );

        let e = element(ns!(svg), "frobnicate", &[]);
        assert!(e.unsupported_feature().is_none());
        assert!(matches!(e.element_data, ElementData::NonRendering(_)));
    }

    #[test]
    fn style_attribute_beats_presentation_attribute() {
        let e = element(
            ns!(svg),
            "rect",
            &[("fill", "blue"), ("style", "fill: red"), ("stroke-width", "3")],
        );
        let values = e.get_computed_values();

        assert_eq!(values.fill(), Fill::parse_str("red").unwrap());
        assert_eq!(values.stroke_width(), StrokeWidth::parse_str("3").unwrap());
    }

    #[test]
    fn nested_viewports_hide_overflow_by_default() {
        let e = element(ns!(svg), "symbol", &[]);
        assert_eq!(e.get_computed_values().overflow(), Overflow::Hidden);

        let e = element(ns!(svg), "svg", &[("overflow", "visible")]);
        assert_eq!(e.get_computed_values().overflow(), Overflow::Visible);

        let e = element(ns!(svg), "g", &[]);
        assert_eq!(e.get_computed_values().overflow(), Overflow::Visible);
    }
}
