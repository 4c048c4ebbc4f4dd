use circuit_designer::designer::FEATURE_DIM;
use circuit_designer::{CircuitDesigner, Dataset, DesignerConfig};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cfg = DesignerConfig::from_env()?;
    let train_cfg = cfg.training;

    println!("TRAINING NETWORK...");

    // One stream drives both initialization and the synthetic data, so a seed pins both.
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut designer = CircuitDesigner::new_with_rng(cfg.output_width, &mut rng)?;
    let width = designer.output_width();
    let data = Dataset::standard_normal(train_cfg.samples, FEATURE_DIM, width, &mut rng)?;
    info!(
        "training on {} synthetic samples for {} steps",
        data.len(),
        train_cfg.steps
    );

    designer.mlp_mut().fit_with(&data, &train_cfg, |r| {
        println!("Step {}/{} | Loss: {:.4}", r.step, train_cfg.steps, r.loss);
    })?;

    println!("Training Complete!");
    Ok(())
}
