use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use circuit_designer::designer::{FEATURE_DIM, layer_sizes, sample_inputs};
use circuit_designer::{CircuitDesigner, Dataset, Mlp, TrainConfig, loss};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn mlp_forward_bench(c: &mut Criterion) {
    let mlp = Mlp::new_with_seed(&layer_sizes(3), 0).unwrap();
    let mut scratch = mlp.scratch();
    let input = vec![0.1_f32; mlp.input_dim()];

    c.bench_function("mlp_forward_5_10_10_3", |b| {
        b.iter(|| {
            let out = mlp.forward(black_box(&input), &mut scratch);
            black_box(out);
        })
    });
}

fn mlp_backward_bench(c: &mut Criterion) {
    let mlp = Mlp::new_with_seed(&layer_sizes(3), 0).unwrap();
    let mut scratch = mlp.scratch();
    let mut grads = mlp.gradients();
    let input = vec![0.1_f32; mlp.input_dim()];
    let target = vec![0.0_f32; mlp.output_dim()];

    mlp.forward(&input, &mut scratch);
    loss::mse_backward(scratch.output(), &target, grads.d_output_mut());

    c.bench_function("mlp_backward_5_10_10_3", |b| {
        b.iter(|| {
            let d_input = mlp.backward(black_box(&input), black_box(&scratch), &mut grads);
            black_box(d_input);
        })
    });
}

fn design_batch_bench(c: &mut Criterion) {
    let designer = CircuitDesigner::new(5, Some(0)).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let batch = sample_inputs(256, &mut rng).unwrap();

    c.bench_function("design_batch_256", |b| {
        b.iter(|| {
            let out = designer.design(black_box(&batch)).unwrap();
            black_box(out);
        })
    });
}

fn fit_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let base = Mlp::new_with_rng(&layer_sizes(3), &mut rng).unwrap();
    let data = Dataset::standard_normal(10, FEATURE_DIM, 3, &mut rng).unwrap();
    let cfg = TrainConfig::default();

    c.bench_function("fit_default_10x20", |b| {
        b.iter(|| {
            let mut mlp = base.clone();
            let report = mlp.fit(black_box(&data), &cfg).unwrap();
            black_box(report);
        })
    });
}

criterion_group!(
    benches,
    mlp_forward_bench,
    mlp_backward_bench,
    design_batch_bench,
    fit_bench
);
criterion_main!(benches);
