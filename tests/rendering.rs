//! Rendering of styling properties, checked on decoded pixels.

mod utils;

use utils::{render, BLACK, BLUE, CLEAR, LIME, RED};

fn svg(width: u32, height: u32, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"
                width="{width}" height="{height}">{body}</svg>"#
    )
}

#[test]
fn fill_defaults_to_black_and_stroke_to_none() {
    let img = render(&svg(10, 10, r#"<rect x="2" y="2" width="6" height="6"/>"#));

    assert_eq!(img.pixel(5, 5), BLACK);
    // no stroke outside the geometry
    assert_eq!(img.pixel(1, 5), CLEAR);
}

#[test]
fn stroke_width_defaults_to_one() {
    let img = render(&svg(
        10,
        10,
        r#"<line x1="0" y1="5.5" x2="10" y2="5.5" stroke="black"/>"#,
    ));

    assert_eq!(img.pixel(5, 5), BLACK);
    assert_eq!(img.pixel(5, 4), CLEAR);
    assert_eq!(img.pixel(5, 6), CLEAR);
}

#[test]
fn style_attribute_beats_presentation_attribute() {
    let img = render(&svg(
        10,
        10,
        r#"<rect width="10" height="10" fill="red" style="fill: lime"/>"#,
    ));
    assert_eq!(img.pixel(5, 5), LIME);
}

#[test]
fn properties_inherit_from_groups() {
    let img = render(&svg(
        10,
        10,
        r#"<g fill="blue"><g><rect width="10" height="10"/></g></g>"#,
    ));
    assert_eq!(img.pixel(5, 5), BLUE);
}

#[test]
fn explicit_inherit_takes_the_parent_value() {
    let img = render(&svg(
        10,
        10,
        r#"<g fill="lime"><rect width="10" height="10" fill="red" style="fill: inherit"/></g>"#,
    ));
    assert_eq!(img.pixel(5, 5), LIME);
}

#[test]
fn current_color() {
    let img = render(&svg(
        10,
        10,
        r#"<g color="blue"><rect width="10" height="10" fill="currentColor"/></g>"#,
    ));
    assert_eq!(img.pixel(5, 5), BLUE);
}

#[test]
fn invalid_values_keep_the_default() {
    let img = render(&svg(
        10,
        10,
        r#"<rect width="10" height="10" fill="not-a-color" opacity="bogus"/>"#,
    ));
    assert_eq!(img.pixel(5, 5), BLACK);
}

#[test]
fn fill_rules() {
    let star = r#"d="M10,1 L16,19 L1,7 L19,7 L4,19 Z""#;

    let nonzero = render(&svg(20, 20, &format!(r#"<path {star} fill="red"/>"#)));
    let evenodd = render(&svg(
        20,
        20,
        &format!(r#"<path {star} fill="red" fill-rule="evenodd"/>"#),
    ));

    // the center of the pentagram has winding number 2
    assert_eq!(nonzero.pixel(10, 10), RED);
    assert_eq!(evenodd.pixel(10, 10), CLEAR);

    // a point on one of the tips is filled either way
    assert_eq!(nonzero.pixel(10, 4), RED);
    assert_eq!(evenodd.pixel(10, 4), RED);
}

#[test]
fn fill_rule_inherits() {
    let img = render(&svg(
        10,
        10,
        r#"<g fill-rule="evenodd">
             <path fill="red" d="M0,0 H10 V10 H0 Z M3,3 H7 V7 H3 Z"/>
           </g>"#,
    ));
    assert_eq!(img.pixel(1, 1), RED);
    assert_eq!(img.pixel(5, 5), CLEAR);
}

#[test]
fn line_caps() {
    let line = r#"x1="5" y1="10" x2="15" y2="10" stroke="red" stroke-width="4""#;

    let butt = render(&svg(20, 20, &format!("<line {line}/>")));
    let square = render(&svg(20, 20, &format!(r#"<line {line} stroke-linecap="square"/>"#)));
    let round = render(&svg(20, 20, &format!(r#"<line {line} stroke-linecap="round"/>"#)));

    assert_eq!(butt.pixel(3, 10), CLEAR);
    assert_eq!(square.pixel(3, 10), RED);
    assert!(round.pixel(3, 10)[3] > 200);

    // the corners of a square cap are not part of a round cap
    assert_eq!(square.pixel(3, 8), RED);
    assert!(round.pixel(3, 8)[3] < 128);
}

#[test]
fn line_joins() {
    let corner = r#"points="5,5 15,5 15,15" fill="none" stroke="red" stroke-width="4""#;

    let miter = render(&svg(20, 20, &format!("<polyline {corner}/>")));
    let bevel = render(&svg(
        20,
        20,
        &format!(r#"<polyline {corner} stroke-linejoin="bevel"/>"#),
    ));

    assert_eq!(miter.pixel(16, 3), RED);
    assert!(bevel.pixel(16, 3)[3] < 16);

    // both have the inner part of the join
    assert_eq!(miter.pixel(14, 5), RED);
    assert_eq!(bevel.pixel(14, 5), RED);
}

#[test]
fn miter_limit_falls_back_to_bevel() {
    let corner = r#"points="2,18 10,2 18,18" fill="none" stroke="red" stroke-width="2""#;

    let sharp = render(&svg(20, 20, &format!(r#"<polyline {corner} stroke-miterlimit="10"/>"#)));
    let limited = render(&svg(20, 20, &format!(r#"<polyline {corner} stroke-miterlimit="1"/>"#)));

    // the miter tip extends above the vertex; the bevel is cut off below it
    assert!(sharp.pixel(10, 0)[3] > 48);
    assert!(sharp.pixel(10, 1)[3] > 160);
    assert_eq!(limited.pixel(10, 0), CLEAR);
    assert!(limited.pixel(10, 1)[3] < 160);
}

#[test]
fn dashes() {
    let img = render(&svg(
        20,
        4,
        r#"<line x1="0" y1="2" x2="20" y2="2" stroke="red" stroke-width="2"
                 stroke-dasharray="4 2"/>"#,
    ));

    assert_eq!(img.pixel(1, 1), RED);
    assert_eq!(img.pixel(4, 1), CLEAR);
    assert_eq!(img.pixel(7, 1), RED);
    assert_eq!(img.pixel(10, 1), CLEAR);

    let offset = render(&svg(
        20,
        4,
        r#"<line x1="0" y1="2" x2="20" y2="2" stroke="red" stroke-width="2"
                 stroke-dasharray="4 2" stroke-dashoffset="4"/>"#,
    ));
    assert_eq!(offset.pixel(1, 1), CLEAR);
    assert_eq!(offset.pixel(3, 1), RED);
}

#[test]
fn dash_patterns_with_too_many_dashes_are_not_stroked() {
    let img = render(&svg(
        10,
        10,
        r#"<path d="M0 5 H1e9" stroke="black" stroke-dasharray="0.01"/>
           <rect x="2" y="2" width="2" height="2" fill="red"/>"#,
    ));

    assert_eq!(img.pixel(3, 3), RED);
    assert_eq!(img.pixel(7, 5), CLEAR);
}

#[test]
fn opacity_values() {
    let img = render(&svg(
        10,
        10,
        r#"<rect width="5" height="10" fill="red" fill-opacity="0.5"/>
           <rect x="5" width="5" height="10" fill="red" opacity="0.5"/>"#,
    ));

    assert_eq!(img.pixel(2, 5), [255, 0, 0, 128]);
    assert_eq!(img.pixel(7, 5), [255, 0, 0, 128]);
}

#[test]
fn stroke_opacity_applies_to_the_stroke_only() {
    let img = render(&svg(
        20,
        20,
        r#"<rect x="5" y="5" width="10" height="10" fill="blue"
                 stroke="red" stroke-width="2" stroke-opacity="0"/>"#,
    ));

    assert_eq!(img.pixel(10, 10), BLUE);
    assert_eq!(img.pixel(4, 10), CLEAR);
}

#[test]
fn display_and_visibility() {
    let img = render(&svg(
        10,
        10,
        r#"<g display="none"><rect width="10" height="10" fill="red"/></g>
           <g visibility="hidden">
             <rect width="5" height="10" fill="red"/>
             <rect x="5" width="5" height="10" fill="lime" visibility="visible"/>
           </g>"#,
    ));

    assert_eq!(img.pixel(2, 5), CLEAR);
    assert_eq!(img.pixel(7, 5), LIME);
}

#[test]
fn transforms_compose_in_order() {
    let img = render(&svg(
        20,
        20,
        r#"<g transform="translate(10, 0)">
             <rect width="5" height="5" fill="red" transform="scale(2)"/>
           </g>"#,
    ));

    assert_eq!(img.pixel(12, 2), RED);
    assert_eq!(img.pixel(19, 9), RED);
    assert_eq!(img.pixel(9, 2), CLEAR);
    assert_eq!(img.pixel(12, 11), CLEAR);
}

#[test]
fn percentage_lengths_resolve_against_the_viewport() {
    let img = render(&svg(
        200,
        100,
        r#"<rect width="50%" height="50%" fill="red"/>
           <circle cx="75%" cy="50%" r="10%" fill="blue"/>"#,
    ));

    assert_eq!(img.pixel(99, 49), RED);
    assert_eq!(img.pixel(101, 49), CLEAR);

    // r = 10% of sqrt((200² + 100²) / 2) ≈ 15.8
    assert_eq!(img.pixel(150, 50), BLUE);
    assert_eq!(img.pixel(150, 64), BLUE);
    assert_eq!(img.pixel(150, 67), CLEAR);
}

#[test]
fn rounded_rect_corners() {
    let img = render(&svg(
        20,
        20,
        r#"<rect width="20" height="20" rx="8" fill="red"/>"#,
    ));

    assert_eq!(img.pixel(0, 0), CLEAR);
    assert_eq!(img.pixel(10, 0), RED);
    assert_eq!(img.pixel(10, 10), RED);
}

#[test]
fn linear_gradient_with_bounding_box_units() {
    let img = render(&svg(
        100,
        10,
        r##"<linearGradient id="g">
              <stop offset="0" stop-color="red"/>
              <stop offset="1" stop-color="blue"/>
            </linearGradient>
            <rect x="50" width="50" height="10" fill="url(#g)"/>"##,
    ));

    let left = img.pixel(50, 5);
    let right = img.pixel(99, 5);
    assert!(left[0] > 240 && left[2] < 15);
    assert!(right[0] < 15 && right[2] > 240);
    assert_eq!(img.pixel(49, 5), CLEAR);
}

#[test]
fn gradient_spread_methods() {
    let body = |spread: &str| {
        format!(
            r##"<linearGradient id="g" gradientUnits="userSpaceOnUse" x1="0" x2="10"
                                spreadMethod="{spread}">
                  <stop offset="0" stop-color="black"/>
                  <stop offset="1" stop-color="white"/>
                </linearGradient>
                <rect width="30" height="2" fill="url(#g)"/>"##
        )
    };

    let pad = render(&svg(30, 2, &body("pad")));
    let reflect = render(&svg(30, 2, &body("reflect")));
    let repeat = render(&svg(30, 2, &body("repeat")));

    // x = 12.5 is a quarter into the second period
    assert!(pad.pixel(12, 0)[0] > 250);
    assert!((180..200).contains(&reflect.pixel(12, 0)[0]));
    assert!((55..75).contains(&repeat.pixel(12, 0)[0]));
}

#[test]
fn radial_gradient() {
    let img = render(&svg(
        40,
        40,
        r##"<radialGradient id="g">
              <stop offset="0" stop-color="lime"/>
              <stop offset="1" stop-color="blue"/>
            </radialGradient>
            <rect width="40" height="40" fill="url(#g)"/>"##,
    ));

    let center = img.pixel(20, 20);
    assert!(center[1] > 240 && center[2] < 15);

    // outside the circle, the last stop is padded
    assert_eq!(img.pixel(0, 0), BLUE);
}

#[test]
fn gradient_href_inherits_stops() {
    let img = render(&svg(
        10,
        10,
        r##"<linearGradient id="base">
              <stop offset="0" stop-color="lime"/>
              <stop offset="1" stop-color="lime"/>
            </linearGradient>
            <linearGradient id="derived" xlink:href="#base" x2="0.5"/>
            <rect width="10" height="10" fill="url(#derived)"/>"##,
    ));

    assert_eq!(img.pixel(5, 5), LIME);
}

#[test]
fn missing_paint_server_uses_the_fallback() {
    let img = render(&svg(
        10,
        10,
        r##"<rect width="5" height="10" fill="url(#nowhere) lime"/>
            <rect x="5" width="5" height="10" fill="url(#nowhere)"/>"##,
    ));

    assert_eq!(img.pixel(2, 5), LIME);
    assert_eq!(img.pixel(7, 5), CLEAR);
}

#[test]
fn clip_path_on_a_group() {
    let img = render(&svg(
        20,
        20,
        r##"<clipPath id="c"><circle cx="10" cy="10" r="5"/></clipPath>
            <g clip-path="url(#c)">
              <rect width="20" height="20" fill="red"/>
            </g>"##,
    ));

    assert_eq!(img.pixel(10, 10), RED);
    assert_eq!(img.pixel(2, 2), CLEAR);
    assert_eq!(img.pixel(17, 10), CLEAR);
}

#[test]
fn clip_rule_applies_to_clip_children() {
    let img = render(&svg(
        10,
        10,
        r##"<clipPath id="c">
              <path clip-rule="evenodd" d="M0,0 H10 V10 H0 Z M3,3 H7 V7 H3 Z"/>
            </clipPath>
            <rect width="10" height="10" fill="red" clip-path="url(#c)"/>"##,
    ));

    assert_eq!(img.pixel(1, 1), RED);
    assert_eq!(img.pixel(5, 5), CLEAR);
}

#[test]
fn clip_path_with_its_own_clip_path() {
    let img = render(&svg(
        10,
        10,
        r##"<clipPath id="left"><rect width="5" height="10"/></clipPath>
            <clipPath id="top" clip-path="url(#left)"><rect width="10" height="5"/></clipPath>
            <rect width="10" height="10" fill="red" clip-path="url(#top)"/>"##,
    ));

    assert_eq!(img.pixel(2, 2), RED);
    assert_eq!(img.pixel(7, 2), CLEAR);
    assert_eq!(img.pixel(2, 7), CLEAR);
}

#[test]
fn self_referencing_clip_path_is_ignored() {
    let img = render(&svg(
        10,
        10,
        r##"<clipPath id="c" clip-path="url(#c)"><rect width="5" height="10"/></clipPath>
            <rect width="10" height="10" fill="red" clip-path="url(#c)"/>"##,
    ));

    assert_eq!(img.pixel(2, 5), RED);
}

#[test]
fn use_instances_an_element() {
    let img = render(&svg(
        20,
        10,
        r##"<defs><rect id="r" width="5" height="5" fill="red"/></defs>
            <use xlink:href="#r" x="10" y="2"/>
            <use href="#r" x="0" y="2"/>"##,
    ));

    assert_eq!(img.pixel(12, 4), RED);
    assert_eq!(img.pixel(2, 4), RED);
    assert_eq!(img.pixel(7, 4), CLEAR);
}

#[test]
fn use_cycles_are_rejected() {
    let img = render(&svg(
        10,
        10,
        r##"<g id="a">
              <rect width="5" height="10" fill="red"/>
              <use href="#a" x="5"/>
            </g>
            <use id="b" href="#c"/>
            <use id="c" href="#b"/>"##,
    ));

    // the group itself renders; its recursive copy does not
    assert_eq!(img.pixel(2, 5), RED);
    assert_eq!(img.pixel(7, 5), CLEAR);
}

#[test]
fn symbols_are_only_drawn_through_use() {
    let img = render(&svg(
        20,
        20,
        r##"<symbol id="s" viewBox="0 0 2 2"><rect width="1" height="1" fill="red"/></symbol>
            <use href="#s" x="10" y="10" width="10" height="10"/>"##,
    ));

    assert_eq!(img.pixel(12, 12), RED);
    assert_eq!(img.pixel(17, 17), CLEAR);
    assert_eq!(img.pixel(2, 2), CLEAR);
}

#[test]
fn nested_svg_with_viewbox() {
    let img = render(&svg(
        20,
        20,
        r#"<svg x="10" y="0" width="10" height="10" viewBox="0 0 100 100">
             <rect width="100" height="100" fill="red"/>
             <rect x="-100" width="100" height="100" fill="blue"/>
           </svg>"#,
    ));

    assert_eq!(img.pixel(15, 5), RED);
    // outside the nested viewport
    assert_eq!(img.pixel(5, 5), CLEAR);
    assert_eq!(img.pixel(15, 15), CLEAR);
}

#[test]
fn switch_renders_its_first_child() {
    let img = render(&svg(
        10,
        10,
        r#"<switch>
             <rect width="10" height="10" fill="lime"/>
             <rect width="10" height="10" fill="red"/>
           </switch>"#,
    ));

    assert_eq!(img.pixel(5, 5), LIME);
}

#[test]
fn arcs_in_paths() {
    let img = render(&svg(
        20,
        20,
        r#"<path d="M2,10 A8,8 0 0 1 18,10 Z" fill="red"/>"#,
    ));

    assert_eq!(img.pixel(10, 5), RED);
    assert_eq!(img.pixel(10, 14), CLEAR);
}

#[test]
fn path_data_errors_keep_the_valid_prefix() {
    let img = render(&svg(
        10,
        10,
        r#"<path d="M0,0 H10 V10 H0 Z L oops" fill="red"/>"#,
    ));

    assert_eq!(img.pixel(5, 5), RED);
}

#[test]
fn text_is_parsed_but_not_drawn() {
    let img = render(&svg(
        40,
        20,
        r#"<text x="0" y="15" font-size="16" fill="red">Hello</text>"#,
    ));

    assert!(img.is_blank());
}
