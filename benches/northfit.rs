use northfit::{
    BuiltinTransform, Composition, Crs, Extent, MapUpdate, NaturalSize, NorthMode, Rect,
    ResizeFitter, ResizeMode, TrueNorthCalculator,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn arctic_extent() -> Extent {
    Extent::new(2120672.293, -3056394.691, 2481640.226, -2796718.780)
}

fn bench_fit(c: &mut Criterion) {
    let fitter = ResizeFitter::default();
    let frame = Rect::new(10.0, 10.0, 120.0, 80.0);
    let natural = NaturalSize::new(1920, 1080);

    c.bench_function("fit_zoom", |b| {
        b.iter(|| fitter.fit(black_box(frame), black_box(natural), ResizeMode::Zoom))
    });
    c.bench_function("fit_zoom_rotated", |b| {
        b.iter(|| {
            fitter.fit_rotated(
                black_box(frame),
                black_box(natural),
                ResizeMode::ZoomResizeFrame,
                black_box(33.0),
            )
        })
    });
}

fn bench_true_north(c: &mut Criterion) {
    let geo = BuiltinTransform::new();
    let calc = TrueNorthCalculator::new();
    let laea = Crs::epsg(3575);
    let stereo = Crs::epsg(3413);
    let extent = arctic_extent();

    c.bench_function("convergence_laea", |b| {
        b.iter(|| calc.convergence_angle(black_box(&extent), &laea, &geo))
    });
    c.bench_function("convergence_stereographic", |b| {
        b.iter(|| calc.convergence_angle(black_box(&extent), &stereo, &geo))
    });
}

fn bench_propagation(c: &mut Criterion) {
    let mut comp = Composition::default();
    let map = comp.add_map(arctic_extent(), Crs::epsg(3575), 0.0).unwrap();
    for i in 0..32 {
        let id = comp
            .add_picture(Rect::new(0.0, 0.0, 20.0 + i as f64, 20.0))
            .unwrap();
        comp.set_natural_size(id, NaturalSize::new(256, 256)).unwrap();
        comp.set_rotation_map(id, Some(map)).unwrap();
        comp.set_north_mode(id, NorthMode::TrueNorth).unwrap();
    }
    let mut rotation = 0.0;

    c.bench_function("map_update_32_pictures", |b| {
        b.iter(|| {
            rotation = (rotation + 1.0) % 360.0;
            comp.update_map(map, MapUpdate::new().rotation_deg(rotation))
                .unwrap();
            black_box(comp.drain_events())
        })
    });
}

criterion_group!(benches, bench_fit, bench_true_north, bench_propagation);
criterion_main!(benches);
