#[macro_use]
extern crate criterion;
extern crate juliaset;
extern crate num;

use criterion::Criterion;
use juliaset::{escape_value, ColorScheme, IntegralPlane, Limits, RenderParams, Viewport, WorkerPool};
use num::Complex;

fn escape_benchmark(c: &mut Criterion) {
    let limits = Limits::default();
    let constant = Complex::new(-1.417_022_856_18, 0.0);
    c.bench_function("escape origin", move |b| {
        b.iter(|| escape_value(Complex::new(0.0, 0.0), constant, &limits))
    });
}

fn frame_benchmark(c: &mut Criterion) {
    let pool = WorkerPool::new(4, 4, IntegralPlane(256, 256)).unwrap();
    let params = RenderParams {
        viewport: Viewport::default(),
        constant: Complex::new(-0.8, 0.156),
        limits: Limits::default(),
        scheme: ColorScheme::HueCycle(0),
    };
    c.bench_function("frame 256x256", move |b| b.iter(|| pool.render(params).unwrap()));
}

criterion_group!(benches, escape_benchmark, frame_benchmark);
criterion_main!(benches);
