use circuit_designer::designer::sample_inputs;
use circuit_designer::report::{
    BarChart, FeatureSummary, Gauges, OutputList, Recommendations, SampleTable,
};
use circuit_designer::{CircuitDesigner, DesignOutput, DesignerConfig, FeatureVector};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

const RULE: &str = "========================================";
const SAMPLE_COUNT: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cfg = DesignerConfig::from_env()?;
    info!("config: {cfg:?}");

    println!("{RULE}");
    println!("AI CIRCUIT DESIGNER");
    println!("{RULE}");

    println!("Step 1: Loading network...");
    let designer = CircuitDesigner::from_config(&cfg)?;

    let features = FeatureVector::default();
    println!("\nStep 2: Circuit Input ({} values):", features.to_array().len());
    println!("{}", FeatureSummary(&features));

    println!("\nStep 3: Designing circuit...");
    let design = designer.design_one(&features);

    println!("\nStep 4: Design Output ({} values):", design.len());
    println!("{}", OutputList(&design));

    let components: Vec<_> = design.components().collect();
    println!("\nComponent Values");
    println!("{}", BarChart { items: &components });

    let performance: Vec<_> = design.performance().collect();
    println!("\nCircuit Performance");
    println!("{}", Gauges { items: &performance });

    println!("\nRecommendations");
    println!("{}", Recommendations(&design.recommendations()));

    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let samples = sample_inputs(SAMPLE_COUNT, &mut rng)?;
    let designs: Vec<DesignOutput> = designer
        .design(&samples)?
        .chunks_exact(designer.output_width())
        .map(|row| DesignOutput::new(row.to_vec()))
        .collect();
    println!("\nExample Circuits");
    println!("{}", SampleTable { designs: &designs });

    println!("\n{RULE}");
    println!("COMPLETE! Circuit design generated.");
    println!("{RULE}");
    Ok(())
}
