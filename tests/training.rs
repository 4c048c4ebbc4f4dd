use circuit_designer::designer::FEATURE_DIM;
use circuit_designer::{CircuitDesigner, Dataset, Optimizer, TrainConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn seeded_run(seed: u64) -> (CircuitDesigner, Dataset) {
    let mut rng = StdRng::seed_from_u64(seed);
    let designer = CircuitDesigner::new_with_rng(3, &mut rng).unwrap();
    let data = Dataset::standard_normal(10, FEATURE_DIM, 3, &mut rng).unwrap();
    (designer, data)
}

#[test]
fn default_run_reports_four_times_and_does_not_diverge() {
    let (mut designer, data) = seeded_run(0);
    let cfg = TrainConfig::default();
    assert_eq!(cfg.steps, 20);
    assert_eq!(cfg.samples, 10);
    assert!(matches!(cfg.optimizer, Optimizer::Adam { .. }));

    let report = designer.mlp_mut().fit(&data, &cfg).unwrap();

    assert_eq!(report.losses.len(), 20);
    let steps: Vec<usize> = report.reports.iter().map(|r| r.step).collect();
    assert_eq!(steps, [5, 10, 15, 20]);
    assert!(report.losses.iter().all(|l| l.is_finite() && *l >= 0.0));
    assert!(
        report.final_loss() <= report.initial_loss() + 1e-3,
        "initial={} final={}",
        report.initial_loss(),
        report.final_loss()
    );
}

#[test]
fn seeded_runs_are_reproducible() {
    let (mut a, data_a) = seeded_run(17);
    let (mut b, data_b) = seeded_run(17);
    let cfg = TrainConfig::default();

    let ra = a.mlp_mut().fit(&data_a, &cfg).unwrap();
    let rb = b.mlp_mut().fit(&data_b, &cfg).unwrap();
    assert_eq!(ra.losses, rb.losses);

    let probe = Dataset::standard_normal(3, FEATURE_DIM, 3, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(
        a.design(probe.inputs()).unwrap(),
        b.design(probe.inputs()).unwrap()
    );
}

#[test]
fn training_changes_the_design() {
    let (mut designer, data) = seeded_run(3);
    let before = designer.design(data.inputs()).unwrap();
    designer
        .mlp_mut()
        .fit(&data, &TrainConfig::default())
        .unwrap();
    assert_ne!(designer.design(data.inputs()).unwrap(), before);
}

#[test]
fn five_wide_designer_rejects_three_dimensional_targets() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut designer = CircuitDesigner::new_with_rng(5, &mut rng).unwrap();
    let data = Dataset::standard_normal(10, FEATURE_DIM, 3, &mut rng).unwrap();
    assert!(designer.mlp_mut().fit(&data, &TrainConfig::default()).is_err());
}
