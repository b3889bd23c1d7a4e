use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use svg2png::{Converter, FilterStrategy, Session, SizingRequest};

const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200">
  <linearGradient id="sky" x2="0" y2="1">
    <stop offset="0" stop-color="#3060c0"/>
    <stop offset="1" stop-color="#e0f0ff"/>
  </linearGradient>
  <clipPath id="round">
    <circle cx="100" cy="100" r="90"/>
  </clipPath>
  <g clip-path="url(#round)">
    <rect width="200" height="200" fill="url(#sky)"/>
    <path d="M0,150 Q50,110 100,140 T200,130 V200 H0 z" fill="#306030"/>
  </g>
  <circle cx="100" cy="100" r="90" fill="none" stroke="#202020" stroke-width="6"
          stroke-dasharray="12 6"/>
  <g opacity="0.7" transform="rotate(-20 100 100)">
    <rect x="60" y="40" width="80" height="30" rx="8" fill="gold" stroke="black"/>
  </g>
</svg>"##;

fn converter() -> Converter {
    Converter::new().with_session(Session::new_with_logging(false))
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [100.0, 400.0] {
        group.bench_with_input(BenchmarkId::new("width", size), &size, |b, &size| {
            let converter = converter();
            let document = converter.parse(SVG).unwrap();

            b.iter(|| {
                converter
                    .render(&document, black_box(SizingRequest::Width(size)))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_filter_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter strategy");

    for strategy in [
        FilterStrategy::None,
        FilterStrategy::Paeth,
        FilterStrategy::Adaptive,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{strategy:?}")),
            &strategy,
            |b, &strategy| {
                let converter = converter().with_filter_strategy(strategy);
                let document = converter.parse(SVG).unwrap();

                b.iter(|| {
                    converter
                        .render(&document, SizingRequest::Width(300.0))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_filter_strategies);
criterion_main!(benches);
