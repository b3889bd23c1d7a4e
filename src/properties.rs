//! The cascade: specified values for each element and the computed values that result.
//!
//! Values come from three places, in increasing order of precedence: user agent
//! defaults, presentation attributes like `fill="red"`, and the declarations in a
//! `style` attribute.  There are no stylesheets.
//!
//! Adding a property takes two steps.  Define its value type in `property_defs.rs`,
//! usually with [`make_property`], and list it in the [`make_properties`] invocation
//! below.  Its computed value is then available as a method on [`ComputedValues`].

use cssparser::{DeclarationListParser, Parser, ParserInput};
use markup5ever::{expanded_name, local_name, namespace_url, ns, QualName};

#[cfg(doc)]
use crate::make_property;

use crate::css::DeclParser;
use crate::error::*;
use crate::parsers::Parse;
use crate::property_macros::Property;
use crate::session::Session;
use crate::svg2png_log;
use crate::transform::Transform;
use crate::xml::Attributes;

pub use crate::property_defs::*;

/// The value that one source gives for a property.
#[derive(Clone)]
pub enum SpecifiedValue<T>
where
    T: Property + Clone + Default,
{
    /// Nothing was given; inherited properties take the parent's value, the rest
    /// take their initial value.
    Unspecified,

    /// The `inherit` keyword, which also works for properties that do not inherit
    /// on their own.
    Inherit,

    Specified(T),
}

impl<T> SpecifiedValue<T>
where
    T: Property + Clone + Default,
{
    /// Resolves against the parent's value for this property and the parent's
    /// computed values as a whole.
    pub fn compute(&self, parent: &T, parent_values: &ComputedValues) -> T {
        let value = match self {
            SpecifiedValue::Specified(v) => v.clone(),
            SpecifiedValue::Inherit => parent.clone(),
            SpecifiedValue::Unspecified if T::inherits_automatically() => parent.clone(),
            SpecifiedValue::Unspecified => T::default(),
        };

        value.compute(parent_values)
    }
}

/// Where a value being parsed comes from.
///
/// Shorthands can only be used in `style` declarations.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum ParseAs {
    Property,
    PresentationAttr,
}

/// Generates the enums and structs that tie property names to their types.
///
/// * `PropertyId` names each property, without a value.
/// * `ParsedProperty` holds a [`SpecifiedValue`] for one property.
/// * `ComputedValues` has a field and a getter per longhand.
/// * `parse_value` turns a property name and its text into a `ParsedProperty`.
///
/// Each entry is `"css-name" => field_name: TypeName`.  Shorthands get no field in
/// `ComputedValues`; [`ParsedProperty::into_longhands`] splits them up.
macro_rules! make_properties {
    {
        shorthands: {
            $($short_str:literal => $short_name:ident,)*
        }

        longhands: {
            $($long_str:literal => $long_field:ident: $long_name:ident,)+
        }
    } => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        enum PropertyId {
            $($short_name,)*
            $($long_name,)+
        }

        const LONGHANDS: &[PropertyId] = &[$(PropertyId::$long_name,)+];

        /// A property together with the value given for it.
        #[derive(Clone)]
        pub enum ParsedProperty {
            $($short_name(SpecifiedValue<$short_name>),)*
            $($long_name(SpecifiedValue<$long_name>),)+
        }

        impl ParsedProperty {
            fn id(&self) -> PropertyId {
                match self {
                    $(ParsedProperty::$short_name(_) => PropertyId::$short_name,)*
                    $(ParsedProperty::$long_name(_) => PropertyId::$long_name,)+
                }
            }
        }

        /// The computed values of all properties for one element.
        #[derive(Debug, Default, Clone)]
        pub struct ComputedValues {
            $($long_field: $long_name,)+

            transform: Transform,
        }

        impl ComputedValues {
            $(
                pub fn $long_field(&self) -> $long_name {
                    self.$long_field.clone()
                }
            )+
        }

        impl SpecifiedValues {
            /// Computes one longhand in place; `computed` still holds the parent's
            /// values for the properties that have not been computed yet.
            fn compute_longhand(&self, id: PropertyId, computed: &mut ComputedValues) {
                match id {
                    $(
                        PropertyId::$long_name => {
                            let unspecified = SpecifiedValue::Unspecified;
                            let specified = match self.find(id) {
                                Some(ParsedProperty::$long_name(s)) => s,
                                _ => &unspecified,
                            };
                            computed.$long_field = specified.compute(&computed.$long_field, computed);
                        }
                    )+

                    $(PropertyId::$short_name => (),)*
                }
            }
        }

        /// Parses the value of a property, either from a `style` declaration or from a
        /// presentation attribute.
        ///
        /// Names that are not properties give a [`ValueErrorKind::UnknownProperty`].
        pub fn parse_value<'i>(
            prop_name: &QualName,
            input: &mut Parser<'i, '_>,
            parse_as: ParseAs,
        ) -> Result<ParsedProperty, ParseError<'i>> {
            if prop_name.ns == ns!() {
                match &*prop_name.local {
                    $($long_str => return Ok(ParsedProperty::$long_name(parse_input(input)?)),)+

                    $(
                        $short_str if parse_as == ParseAs::Property => {
                            return Ok(ParsedProperty::$short_name(parse_input(input)?));
                        }
                    )*

                    _ => (),
                }
            }

            Err(input.new_custom_error(ValueErrorKind::UnknownProperty))
        }
    };
}

#[rustfmt::skip]
make_properties! {
    shorthands: {
        "marker" => Marker,
    }

    longhands: {
        "clip-path"         => clip_path:         ClipPath,
        "clip-rule"         => clip_rule:         ClipRule,
        "color"             => color:             Color,
        "display"           => display:           Display,
        "fill"              => fill:              Fill,
        "fill-opacity"      => fill_opacity:      FillOpacity,
        "fill-rule"         => fill_rule:         FillRule,
        "filter"            => filter:            Filter,
        "font-size"         => font_size:         FontSize,
        "marker-end"        => marker_end:        MarkerEnd,
        "marker-mid"        => marker_mid:        MarkerMid,
        "marker-start"      => marker_start:      MarkerStart,
        "mask"              => mask:              Mask,
        "opacity"           => opacity:           Opacity,
        "overflow"          => overflow:          Overflow,
        "paint-order"       => paint_order:       PaintOrder,
        "stop-color"        => stop_color:        StopColor,
        "stop-opacity"      => stop_opacity:      StopOpacity,
        "stroke"            => stroke:            Stroke,
        "stroke-dasharray"  => stroke_dasharray:  StrokeDasharray,
        "stroke-dashoffset" => stroke_dashoffset: StrokeDashoffset,
        "stroke-linecap"    => stroke_line_cap:   StrokeLinecap,
        "stroke-linejoin"   => stroke_line_join:  StrokeLinejoin,
        "stroke-miterlimit" => stroke_miterlimit: StrokeMiterlimit,
        "stroke-opacity"    => stroke_opacity:    StrokeOpacity,
        "stroke-width"      => stroke_width:      StrokeWidth,
        "visibility"        => visibility:        Visibility,
    }
}

impl ParsedProperty {
    /// The longhands that this property sets; a longhand just sets itself.
    pub fn into_longhands(self) -> Vec<ParsedProperty> {
        use SpecifiedValue::*;

        match self {
            ParsedProperty::Marker(Specified(Marker(iri))) => vec![
                ParsedProperty::MarkerStart(Specified(MarkerStart(iri.clone()))),
                ParsedProperty::MarkerMid(Specified(MarkerMid(iri.clone()))),
                ParsedProperty::MarkerEnd(Specified(MarkerEnd(iri))),
            ],

            ParsedProperty::Marker(Inherit) => vec![
                ParsedProperty::MarkerStart(Inherit),
                ParsedProperty::MarkerMid(Inherit),
                ParsedProperty::MarkerEnd(Inherit),
            ],

            ParsedProperty::Marker(Unspecified) => Vec::new(),

            longhand => vec![longhand],
        }
    }
}

impl ComputedValues {
    /// The element's own `transform` attribute; it does not inherit.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// False for `display: none`, which skips the element and its subtree.
    pub fn is_displayed(&self) -> bool {
        self.display() != Display::None
    }

    /// False for hidden elements; their children may still be visible.
    pub fn is_visible(&self) -> bool {
        self.visibility() == Visibility::Visible
    }

    /// Whether nested viewports let their contents spill outside.
    pub fn is_overflow(&self) -> bool {
        matches!(self.overflow(), Overflow::Auto | Overflow::Visible)
    }
}

/// The declared longhands of one element, at most one value per property.
#[derive(Clone, Default)]
pub struct SpecifiedValues {
    declared: Vec<ParsedProperty>,
    transform: Option<Transform>,
}

impl SpecifiedValues {
    fn find(&self, id: PropertyId) -> Option<&ParsedProperty> {
        self.declared.iter().find(|p| p.id() == id)
    }

    fn declare(&mut self, prop: &ParsedProperty, replace: bool) {
        for longhand in prop.clone().into_longhands() {
            let id = longhand.id();

            match self.declared.iter_mut().find(|p| p.id() == id) {
                Some(existing) if replace => *existing = longhand,
                Some(_) => (),
                None => self.declared.push(longhand),
            }
        }
    }

    /// Sets a property, replacing any earlier value for it.
    pub fn set_parsed_property(&mut self, prop: &ParsedProperty) {
        self.declare(prop, true);
    }

    /// Sets a user agent default, which loses to any value that the document gives.
    pub fn set_parsed_property_user_agent(&mut self, prop: &ParsedProperty) {
        self.declare(prop, false);
    }

    /// Turns the parent's computed values in `computed` into this element's own.
    pub fn to_computed_values(&self, computed: &mut ComputedValues) {
        // em and ex in other properties resolve against the element's own font size
        self.compute_longhand(PropertyId::FontSize, computed);

        for &id in LONGHANDS.iter().filter(|&&id| id != PropertyId::FontSize) {
            self.compute_longhand(id, computed);
        }

        computed.transform = self.transform.unwrap_or_default();
    }

    fn parse_presentation_attribute(&mut self, session: &Session, attr: &QualName, value: &str) {
        let mut input = ParserInput::new(value);
        let mut parser = Parser::new(&mut input);

        let result = parse_value(attr, &mut parser, ParseAs::PresentationAttr).and_then(|prop| {
            parser.expect_exhausted()?;
            Ok(prop)
        });

        match result {
            Ok(prop) => self.set_parsed_property(&prop),

            Err(ParseError {
                kind: cssparser::ParseErrorKind::Custom(ValueErrorKind::UnknownProperty),
                ..
            }) => (),

            // Invalid values are ignored without putting the element in error.
            // https://www.w3.org/TR/CSS2/syndata.html#unsupported-values
            Err(e) => {
                let err = ElementError::from_parse_error(e, attr.clone());
                svg2png_log!(
                    session,
                    "(ignoring invalid presentation attribute {} value=\"{}\")",
                    err,
                    value
                );
            }
        }
    }

    /// Applies every presentation attribute in `attrs`, plus `transform`.
    pub fn parse_presentation_attributes(&mut self, session: &Session, attrs: &Attributes) {
        for (attr, value) in attrs.iter() {
            if attr.expanded() != expanded_name!("", "transform") {
                self.parse_presentation_attribute(session, &attr, value);
                continue;
            }

            match Transform::parse_str(value) {
                Ok(t) => self.transform = Some(t),
                Err(_) => svg2png_log!(
                    session,
                    "(ignoring invalid transform attribute value=\"{}\")",
                    value
                ),
            }
        }
    }

    /// Applies the declarations of a `style` attribute over the presentation attributes.
    ///
    /// `!important` is accepted but has no effect on precedence.
    pub fn parse_style_declarations(&mut self, declarations: &str, session: &Session) {
        let mut input = ParserInput::new(declarations);
        let mut parser = Parser::new(&mut input);

        for result in DeclarationListParser::new(&mut parser, DeclParser) {
            match result {
                Ok(decl) => self.set_parsed_property(&decl.property),
                Err(e) => svg2png_log!(session, "Invalid declaration; ignoring: {:?}", e),
            }
        }
    }
}

/// Parses `inherit` or a value of the property's type.
fn parse_input<'i, T>(input: &mut Parser<'i, '_>) -> Result<SpecifiedValue<T>, ParseError<'i>>
where
    T: Property + Clone + Default + Parse,
{
    if input
        .try_parse(|p| p.expect_ident_matching("inherit"))
        .is_ok()
    {
        return Ok(SpecifiedValue::Inherit);
    }

    T::parse(input).map(SpecifiedValue::Specified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dasharray::Dasharray;
    use crate::iri::Iri;
    use crate::length::*;
    use crate::paint_server::PaintServer;
    use crate::unit_interval::UnitInterval;

    fn computed_from_style(style: &str) -> ComputedValues {
        let mut specified = SpecifiedValues::default();
        specified.parse_style_declarations(style, &Session::new_for_test_suite());

        let mut computed = ComputedValues::default();
        specified.to_computed_values(&mut computed);
        computed
    }

    #[test]
    fn empty_values_computes_to_defaults() {
        let specified = SpecifiedValues::default();

        let mut computed = ComputedValues::default();
        specified.to_computed_values(&mut computed);

        assert_eq!(
            computed.fill(),
            Fill(PaintServer::SolidColor(cssparser::Color::RGBA(
                cssparser::RGBA::new(0, 0, 0, 255)
            )))
        );
        assert_eq!(computed.fill_opacity(), FillOpacity(UnitInterval(1.0)));
        assert_eq!(computed.fill_rule(), FillRule::NonZero);
        assert_eq!(computed.stroke(), Stroke(PaintServer::None));
        assert_eq!(
            computed.stroke_width(),
            StrokeWidth(ULength::new(1.0, LengthUnit::Px))
        );
        assert_eq!(computed.stroke_opacity(), StrokeOpacity(UnitInterval(1.0)));
        assert_eq!(computed.stroke_line_cap(), StrokeLinecap::Butt);
        assert_eq!(computed.stroke_line_join(), StrokeLinejoin::Miter);
        assert_eq!(computed.stroke_miterlimit(), StrokeMiterlimit(MiterLimit(4.0)));
        assert_eq!(computed.stroke_dasharray(), StrokeDasharray(Dasharray::None));
        assert_eq!(
            computed.stroke_dashoffset(),
            StrokeDashoffset(Length::new(0.0, LengthUnit::Px))
        );
        assert_eq!(computed.opacity(), Opacity(UnitInterval(1.0)));
        assert_eq!(computed.color(), Color(cssparser::RGBA::new(0, 0, 0, 255)));
        assert_eq!(computed.display(), Display::Inline);
        assert_eq!(computed.visibility(), Visibility::Visible);
        assert_eq!(computed.clip_path(), ClipPath(Iri::None));
        assert_eq!(computed.clip_rule(), ClipRule::NonZero);
        assert_eq!(computed.font_size().to_px(), 12.0);
        assert_eq!(computed.filter(), Filter(UnsupportedValue::None));
        assert_eq!(computed.mask(), Mask(Iri::None));
        assert_eq!(computed.marker_start(), MarkerStart(Iri::None));
        assert!(computed.transform().is_identity());
    }

    #[test]
    fn set_one_property() {
        let length = ULength::<Both>::new(42.0, LengthUnit::Px);

        let mut specified = SpecifiedValues::default();
        specified.set_parsed_property(&ParsedProperty::StrokeWidth(SpecifiedValue::Specified(
            StrokeWidth(length),
        )));

        let mut computed = ComputedValues::default();
        specified.to_computed_values(&mut computed);

        assert_eq!(computed.stroke_width(), StrokeWidth(length));
    }

    #[test]
    fn replace_existing_property() {
        let length1 = ULength::<Both>::new(42.0, LengthUnit::Px);
        let length2 = ULength::<Both>::new(24.0, LengthUnit::Px);

        let mut specified = SpecifiedValues::default();

        specified.set_parsed_property(&ParsedProperty::StrokeWidth(SpecifiedValue::Specified(
            StrokeWidth(length1),
        )));

        specified.set_parsed_property(&ParsedProperty::StrokeWidth(SpecifiedValue::Specified(
            StrokeWidth(length2),
        )));

        let mut computed = ComputedValues::default();
        specified.to_computed_values(&mut computed);

        assert_eq!(computed.stroke_width(), StrokeWidth(length2));
    }

    #[test]
    fn user_agent_values_do_not_replace() {
        let mut specified = SpecifiedValues::default();

        specified.set_parsed_property(&ParsedProperty::Overflow(SpecifiedValue::Specified(
            Overflow::Visible,
        )));
        specified.set_parsed_property_user_agent(&ParsedProperty::Overflow(
            SpecifiedValue::Specified(Overflow::Hidden),
        ));

        let mut computed = ComputedValues::default();
        specified.to_computed_values(&mut computed);

        assert_eq!(computed.overflow(), Overflow::Visible);
    }

    #[test]
    fn expands_marker_shorthand() {
        let mut specified = SpecifiedValues::default();
        let iri = Iri::parse_str("url(#foo)").unwrap();

        let marker = Marker(iri.clone());
        specified.set_parsed_property(&ParsedProperty::Marker(SpecifiedValue::Specified(marker)));

        let mut computed = ComputedValues::default();
        specified.to_computed_values(&mut computed);

        assert_eq!(computed.marker_start(), MarkerStart(iri.clone()));
        assert_eq!(computed.marker_mid(), MarkerMid(iri.clone()));
        assert_eq!(computed.marker_end(), MarkerEnd(iri));
    }

    #[test]
    fn computes_property_that_does_not_inherit_automatically() {
        assert!(!<Opacity as Property>::inherits_automatically());

        let half_opacity = Opacity::parse_str("0.5").unwrap();

        // first level, as specified with opacity

        let mut with_opacity = SpecifiedValues::default();
        with_opacity.set_parsed_property(&ParsedProperty::Opacity(SpecifiedValue::Specified(
            half_opacity.clone(),
        )));

        let mut computed_0_5 = ComputedValues::default();
        with_opacity.to_computed_values(&mut computed_0_5);

        assert_eq!(computed_0_5.opacity(), half_opacity.clone());

        // second level, no opacity specified, and it doesn't inherit

        let without_opacity = SpecifiedValues::default();

        let mut computed = computed_0_5.clone();
        without_opacity.to_computed_values(&mut computed);

        assert_eq!(computed.opacity(), Opacity::default());

        // another at second level, opacity set to explicitly inherit

        let mut with_inherit_opacity = SpecifiedValues::default();
        with_inherit_opacity.set_parsed_property(&ParsedProperty::Opacity(SpecifiedValue::Inherit));

        let mut computed = computed_0_5.clone();
        with_inherit_opacity.to_computed_values(&mut computed);

        assert_eq!(computed.opacity(), half_opacity);
    }

    #[test]
    fn inherits_automatically_for_fill() {
        let parent = computed_from_style("fill: blue; stroke-width: 3");

        let mut child = parent.clone();
        SpecifiedValues::default().to_computed_values(&mut child);

        assert_eq!(child.fill(), parent.fill());
        assert_eq!(child.stroke_width(), parent.stroke_width());
    }

    #[test]
    fn style_declarations_apply_in_order() {
        let computed = computed_from_style("fill: red; fill: lime !important; opacity: 0.25");
        assert_eq!(
            computed.fill(),
            Fill(PaintServer::SolidColor(cssparser::Color::RGBA(
                cssparser::RGBA::new(0, 255, 0, 255)
            )))
        );
        assert_eq!(computed.opacity(), Opacity(UnitInterval(0.25)));
    }

    #[test]
    fn ignores_invalid_and_unknown_declarations() {
        let computed = computed_from_style("fill: bogus; frobnicate: 3; stroke-width: 2");
        assert_eq!(computed.fill(), Fill::default());
        assert_eq!(
            computed.stroke_width(),
            StrokeWidth(ULength::new(2.0, LengthUnit::Px))
        );
    }

    #[test]
    fn font_size_em_is_relative_to_parent() {
        let parent = computed_from_style("font-size: 20px");

        let mut specified = SpecifiedValues::default();
        specified.parse_style_declarations("font-size: 2em", &Session::new_for_test_suite());

        let mut computed = parent;
        specified.to_computed_values(&mut computed);
        assert_eq!(computed.font_size().to_px(), 40.0);
    }

    #[test]
    fn paint_order_is_a_property() {
        let computed = computed_from_style("paint-order: stroke");
        assert_eq!(
            computed.paint_order().targets,
            [PaintTarget::Stroke, PaintTarget::Fill, PaintTarget::Markers]
        );
    }
}
