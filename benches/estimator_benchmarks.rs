//! Benchmarks for the per-frame estimators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_tracking::{
    calibration::Calibration,
    head_orientation::HeadOrientation,
    landmarks::Landmarks,
    pupil::{binarize, create_preprocessor, PupilLocator},
};
use ndarray::{s, Array2};

/// Noisy eye crop with a darker iris disc in the middle
fn noisy_eye(height: usize, width: usize) -> Array2<u8> {
    let (cy, cx) = (height as f64 / 2.0, width as f64 / 2.0);
    let radius = height as f64 / 3.0;

    Array2::from_shape_fn((height, width), |(row, col)| {
        let inside = (row as f64 - cy).hypot(col as f64 - cx) < radius;
        let base: u8 = if inside { 35 } else { 190 };
        base.saturating_add(rand::random::<u8>() % 20)
    })
}

fn noisy_face() -> Landmarks {
    let pixels: Vec<(i32, i32)> = (0..68)
        .map(|i| {
            let angle = f64::from(i) / 68.0 * std::f64::consts::TAU;
            let x = 200.0 + 80.0 * angle.cos() + rand::random::<f64>();
            let y = 220.0 + 100.0 * angle.sin() + rand::random::<f64>();
            (x as i32, y as i32)
        })
        .collect();
    Landmarks::from_pixels(&pixels).unwrap_or_else(|e| panic!("{e}"))
}

fn benchmark_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration");

    for (height, width) in [(20, 40), (40, 80), (80, 160)] {
        let eye = noisy_eye(height, width);
        let calibration = Calibration::default();

        group.bench_with_input(
            BenchmarkId::new("find_best_threshold", format!("{width}x{height}")),
            &eye,
            |b, eye| {
                b.iter(|| black_box(calibration.find_best_threshold(black_box(&eye.view()))));
            },
        );
    }

    let eye = noisy_eye(40, 80);
    group.bench_function("evaluate_full_window", |b| {
        b.iter(|| {
            let mut calibration = Calibration::default();
            for _ in 0..calibration.window_size() {
                calibration.evaluate(black_box(&eye.view()));
            }
            black_box(calibration.threshold())
        });
    });

    group.finish();
}

fn benchmark_pupil(c: &mut Criterion) {
    let mut group = c.benchmark_group("pupil");

    let eye = noisy_eye(40, 80);
    let binary = binarize(&eye.view(), 60);

    for name in ["identity", "truncate:120"] {
        let preprocessor = create_preprocessor(name).unwrap_or_else(|e| panic!("{e}"));
        let locator = PupilLocator::with_preprocessor(preprocessor);

        group.bench_with_input(BenchmarkId::new("locate", name), &binary, |b, binary| {
            b.iter(|| black_box(locator.locate(black_box(&binary.view()))));
        });
    }

    group.bench_function("binarize", |b| {
        b.iter(|| black_box(binarize(black_box(&eye.slice(s![.., ..])), 60)));
    });

    group.finish();
}

fn benchmark_head_orientation(c: &mut Criterion) {
    let mut group = c.benchmark_group("head_orientation");

    let faces: Vec<Landmarks> = (0..100).map(|_| noisy_face()).collect();
    let mut head = HeadOrientation::default();

    group.bench_function("refresh", |b| {
        b.iter(|| head.refresh(black_box(Some(&faces[0]))));
    });

    group.bench_function("refresh_sequence_100", |b| {
        b.iter(|| {
            for face in &faces {
                head.refresh(black_box(Some(face)));
            }
            black_box(head.angles())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_calibration,
    benchmark_pupil,
    benchmark_head_orientation
);
criterion_main!(benches);
