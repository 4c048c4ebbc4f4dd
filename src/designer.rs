//! The circuit-design network.
//!
//! `CircuitDesigner` pins an [`Mlp`] to the shape `5 -> 10 -> 10 -> W` (ReLU on both
//! hidden layers, identity on the output) and maps circuit operating points to design
//! outputs. The parameters are random, so the outputs carry no physical meaning; callers
//! attach positional labels such as "Resistor" or "Efficiency".

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use crate::{DesignerConfig, Error, Inputs, Mlp, Result};

/// Width of a feature vector.
pub const FEATURE_DIM: usize = 5;
/// Width of each hidden layer.
pub const HIDDEN_DIM: usize = 10;
pub const MIN_OUTPUT_WIDTH: usize = 3;
pub const MAX_OUTPUT_WIDTH: usize = 5;

/// Positional labels for the design output when read as component values.
pub const COMPONENT_LABELS: [&str; MAX_OUTPUT_WIDTH] =
    ["Resistor", "Capacitor", "Inductor", "Gain", "Q-Factor"];

/// Positional labels for the first three outputs when read as performance scores.
pub const PERFORMANCE_LABELS: [&str; MIN_OUTPUT_WIDTH] = ["Efficiency", "Stability", "Cost Score"];

/// A circuit operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Volts.
    pub voltage: f32,
    /// Ohms.
    pub resistance: f32,
    /// Farads.
    pub capacitance: f32,
    /// Hertz.
    pub frequency: f32,
    /// Amperes.
    pub current: f32,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            voltage: 5.0,
            resistance: 1000.0,
            capacitance: 0.0001,
            frequency: 1000.0,
            current: 0.01,
        }
    }
}

impl FeatureVector {
    pub const LABELS: [&'static str; FEATURE_DIM] =
        ["Voltage", "Resistance", "Capacitance", "Frequency", "Current"];
    pub const UNITS: [&'static str; FEATURE_DIM] = ["V", "Ω", "F", "Hz", "A"];
    /// Inclusive physical ranges offered to interactive callers.
    pub const RANGES: [(f32, f32); FEATURE_DIM] = [
        (1.0, 24.0),
        (10.0, 10_000.0),
        (1e-9, 1e-3),
        (1.0, 1e6),
        (0.001, 1.0),
    ];

    pub fn to_array(&self) -> [f32; FEATURE_DIM] {
        [
            self.voltage,
            self.resistance,
            self.capacitance,
            self.frequency,
            self.current,
        ]
    }

    pub fn from_array(values: [f32; FEATURE_DIM]) -> Self {
        let [voltage, resistance, capacitance, frequency, current] = values;
        Self {
            voltage,
            resistance,
            capacitance,
            frequency,
            current,
        }
    }

    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let values: [f32; FEATURE_DIM] =
            values.try_into().map_err(|_| Error::DimensionMismatch {
                what: "feature vector",
                expected: FEATURE_DIM,
                got: values.len(),
            })?;
        Ok(Self::from_array(values))
    }

    /// Clamp every field into [`FeatureVector::RANGES`].
    pub fn clamped(&self) -> Self {
        let mut values = self.to_array();
        for (v, &(lo, hi)) in values.iter_mut().zip(&Self::RANGES) {
            *v = v.clamp(lo, hi);
        }
        Self::from_array(values)
    }
}

/// Network output for one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignOutput {
    values: Vec<f32>,
}

impl DesignOutput {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values paired with [`COMPONENT_LABELS`].
    pub fn components(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        COMPONENT_LABELS.iter().copied().zip(self.values.iter().copied())
    }

    /// The first three values scaled to percentages and paired with
    /// [`PERFORMANCE_LABELS`].
    pub fn performance(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        PERFORMANCE_LABELS
            .iter()
            .copied()
            .zip(self.values.iter().map(|v| v * 100.0))
    }

    /// Threshold hints derived from the first three outputs.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut out = Vec::new();
        if self.values.first().is_some_and(|&v| v > 0.7) {
            out.push(Recommendation::HighEfficiency);
        }
        if self.values.get(1).is_some_and(|&v| v > 0.6) {
            out.push(Recommendation::Stable);
        }
        if self.values.get(2).is_some_and(|&v| v < 0.4) {
            out.push(Recommendation::CostEffective);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    HighEfficiency,
    Stable,
    CostEffective,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::HighEfficiency => {
                "High efficiency design - suitable for power applications"
            }
            Recommendation::Stable => "Stable circuit - good for high-frequency applications",
            Recommendation::CostEffective => "Cost-effective design",
        }
    }
}

/// Layer widths of the designer network for a given output width.
pub fn layer_sizes(output_width: usize) -> [usize; 4] {
    [FEATURE_DIM, HIDDEN_DIM, HIDDEN_DIM, output_width]
}

#[derive(Debug, Clone)]
pub struct CircuitDesigner {
    mlp: Mlp,
}

impl CircuitDesigner {
    /// Randomly initialized designer; `seed = None` draws from entropy.
    pub fn new(output_width: usize, seed: Option<u64>) -> Result<Self> {
        match seed {
            Some(seed) => Self::new_with_rng(output_width, &mut StdRng::seed_from_u64(seed)),
            None => Self::new_with_rng(output_width, &mut rand::rng()),
        }
    }

    pub fn new_with_rng<R: Rng + ?Sized>(output_width: usize, rng: &mut R) -> Result<Self> {
        check_output_width(output_width)?;
        let mlp = Mlp::new_with_rng(&layer_sizes(output_width), rng)?;
        debug!("circuit designer ready, output width {output_width}");
        Ok(Self { mlp })
    }

    pub fn from_config(cfg: &DesignerConfig) -> Result<Self> {
        cfg.validate()?;
        Self::new(cfg.output_width, cfg.seed)
    }

    /// Wrap an existing network; it must accept feature vectors and emit 3..=5 values.
    pub fn from_mlp(mlp: Mlp) -> Result<Self> {
        if mlp.input_dim() != FEATURE_DIM {
            return Err(Error::DimensionMismatch {
                what: "network input",
                expected: FEATURE_DIM,
                got: mlp.input_dim(),
            });
        }
        check_output_width(mlp.output_dim())?;
        Ok(Self { mlp })
    }

    pub fn output_width(&self) -> usize {
        self.mlp.output_dim()
    }

    pub fn mlp(&self) -> &Mlp {
        &self.mlp
    }

    /// Mutable access for training.
    pub fn mlp_mut(&mut self) -> &mut Mlp {
        &mut self.mlp
    }

    /// Map an `(N, 5)` batch to a flat `(N, W)` batch. `N` may be zero.
    pub fn design(&self, batch: &Inputs) -> Result<Vec<f32>> {
        check_feature_width(batch.input_dim())?;
        self.mlp.predict_inputs(batch)
    }

    /// Row-oriented variant of [`CircuitDesigner::design`].
    pub fn design_rows(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        let batch = Inputs::from_rows(rows, FEATURE_DIM)?;
        let flat = self.design(&batch)?;
        Ok(flat
            .chunks_exact(self.output_width())
            .map(<[f32]>::to_vec)
            .collect())
    }

    pub fn design_one(&self, features: &FeatureVector) -> DesignOutput {
        let mut scratch = self.mlp.scratch();
        let out = self.mlp.forward(&features.to_array(), &mut scratch);
        DesignOutput::new(out.to_vec())
    }

    /// Post-ReLU outputs of each hidden layer for `batch`, each flat `(N, HIDDEN_DIM)`.
    pub fn hidden_activations(&self, batch: &Inputs) -> Result<Vec<Vec<f32>>> {
        check_feature_width(batch.input_dim())?;
        let mut scratch = self.mlp.batch_scratch();
        self.mlp
            .forward_batch(batch.as_flat(), batch.len(), &mut scratch);

        Ok((0..self.mlp.num_layers() - 1)
            .map(|idx| scratch.layer_output(idx).to_vec())
            .collect())
    }
}

/// Example operating points: every field drawn from `N(1.0, 0.5^2)`.
pub fn sample_inputs<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Inputs> {
    let values = (0..count * FEATURE_DIM)
        .map(|_| {
            let z: f32 = StandardNormal.sample(rng);
            z * 0.5 + 1.0
        })
        .collect();
    Inputs::from_flat(values, FEATURE_DIM)
}

fn check_feature_width(got: usize) -> Result<()> {
    if got != FEATURE_DIM {
        return Err(Error::DimensionMismatch {
            what: "feature vector",
            expected: FEATURE_DIM,
            got,
        });
    }
    Ok(())
}

fn check_output_width(width: usize) -> Result<()> {
    if !(MIN_OUTPUT_WIDTH..=MAX_OUTPUT_WIDTH).contains(&width) {
        return Err(Error::InvalidConfig(format!(
            "output width must be in {MIN_OUTPUT_WIDTH}..={MAX_OUTPUT_WIDTH}, got {width}"
        )));
    }
    Ok(())
}
