//! B-Format decoder benchmarks

use al_ambi::decoder::{BFormatDec, DecoderMatrix};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ndarray::Array2;

fn first_order_matrix(dual_band: bool) -> DecoderMatrix {
    let hf = Array2::from_shape_fn((8, 4), |(o, i)| 0.25 / (1.0 + (o + i) as f32));
    DecoderMatrix {
        dual_band,
        xover_f0norm: 400.0 / 48000.0,
        lf: dual_band.then(|| hf.mapv(|g| g * 0.5)),
        hf,
    }
}

fn input_block() -> Vec<Vec<f32>> {
    (0..4)
        .map(|c| (0..1024).map(|i| ((i + c * 17) as f32 * 0.01).sin()).collect())
        .collect()
}

fn bench_single_band(c: &mut Criterion) {
    let mut dec = BFormatDec::new(first_order_matrix(false));
    let input = input_block();
    let mut out = vec![vec![0.0f32; 1024]; 8];

    c.bench_function("bformatdec_single_band_1024", |b| {
        b.iter(|| {
            dec.process(black_box(&mut out), black_box(&input), 1024).ok();
        })
    });
}

fn bench_dual_band(c: &mut Criterion) {
    let mut dec = BFormatDec::new(first_order_matrix(true));
    let input = input_block();
    let mut out = vec![vec![0.0f32; 1024]; 8];

    c.bench_function("bformatdec_dual_band_1024", |b| {
        b.iter(|| {
            dec.process(black_box(&mut out), black_box(&input), 1024).ok();
        })
    });
}

criterion_group!(benches, bench_single_band, bench_dual_band);
criterion_main!(benches);
