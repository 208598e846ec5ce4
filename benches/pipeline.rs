use criterion::{black_box, criterion_group, criterion_main, Criterion};

use panelcut_core::{LengthMode, Orientation, PanelSpec, Point, Polygon};

fn rect_polygon(w: f64, h: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ])
}

fn l_shaped_polygon() -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(8000.0, 0.0),
        Point::new(8000.0, 4000.0),
        Point::new(4000.0, 4000.0),
        Point::new(4000.0, 8000.0),
        Point::new(0.0, 8000.0),
    ])
}

fn spec() -> PanelSpec {
    PanelSpec::new(1150.0, LengthMode::Auto, 20.0)
}

fn bench_generate_for_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_for_region");

    group.bench_function("rectangle_8000x6000", |b| {
        let polygon = rect_polygon(8000.0, 6000.0);
        b.iter(|| {
            let mut inventory = panelcut_core::LeftoverInventory::new();
            let mut next_id = 1u64;
            let result = panelcut_core::generator::generate_for_region(
                black_box(&polygon),
                Orientation::Vertical,
                &spec(),
                &mut inventory,
                &mut next_id,
                "CP",
                None,
                None,
            );
            black_box(result)
        });
    });

    group.bench_function("l_shape_8000x8000", |b| {
        let polygon = l_shaped_polygon();
        b.iter(|| {
            let mut inventory = panelcut_core::LeftoverInventory::new();
            let mut next_id = 1u64;
            let result = panelcut_core::generator::generate_for_region(
                black_box(&polygon),
                Orientation::Horizontal,
                &spec(),
                &mut inventory,
                &mut next_id,
                "CP",
                None,
                None,
            );
            black_box(result)
        });
    });

    group.finish();
}

fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose");

    group.bench_function("rectangle", |b| {
        let polygon = rect_polygon(8000.0, 6000.0);
        b.iter(|| black_box(panelcut_core::decomposer::decompose(black_box(&polygon))));
    });

    group.bench_function("l_shape", |b| {
        let polygon = l_shaped_polygon();
        b.iter(|| black_box(panelcut_core::decomposer::decompose(black_box(&polygon))));
    });

    group.finish();
}

criterion_group!(benches, bench_decompose, bench_generate_for_region);
criterion_main!(benches);
