//! A small feed-forward network that maps circuit operating points to design scores.
//!
//! Five circuit parameters (voltage, resistance, capacitance, frequency, current) go
//! through a `5 -> 10 -> 10 -> W` network with ReLU hidden layers, producing `W` (3 to 5)
//! numbers that callers label as component values or performance scores. The network is
//! randomly initialized and the bundled training loop fits it to synthetic noise: this is
//! a demonstration of the inference and training path, not a circuit solver.
//!
//! # Layers of API
//!
//! - [`CircuitDesigner`]: shape-fixed facade, returns [`Result`] and rejects feature
//!   vectors whose width is not 5 with [`Error::DimensionMismatch`].
//! - [`Mlp`]: general dense network. [`Mlp::forward`], [`Mlp::forward_batch`] and
//!   [`Mlp::backward`] are the allocation-free hot path and panic on shape misuse;
//!   [`Mlp::fit`], [`Mlp::predict_inputs`] and [`Mlp::evaluate_mse`] validate and return
//!   [`Result`].
//!
//! # Data layout and shapes
//!
//! - Scalars are `f32`.
//! - [`Dataset`] and [`Inputs`] store samples contiguously in row-major layout.
//! - Layer weights are row-major with shape `(out_dim, in_dim)`.
//! - Batched inputs/outputs are flat row-major buffers.
//!
//! # Quick start
//!
//! ```rust
//! use circuit_designer::{CircuitDesigner, FeatureVector};
//!
//! # fn main() -> circuit_designer::Result<()> {
//! let designer = CircuitDesigner::new(3, Some(0))?;
//! let design = designer.design_one(&FeatureVector::default());
//! assert_eq!(design.len(), 3);
//!
//! let rows = vec![vec![5.0, 1000.0, 0.0001, 1000.0, 0.01]; 4];
//! assert_eq!(designer.design_rows(&rows)?.len(), 4);
//! assert!(designer.design_rows(&[vec![1.0, 2.0]]).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # Training
//!
//! ```rust
//! use circuit_designer::{CircuitDesigner, Dataset, TrainConfig};
//! use rand::SeedableRng;
//!
//! # fn main() -> circuit_designer::Result<()> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut designer = CircuitDesigner::new_with_rng(3, &mut rng)?;
//! let data = Dataset::standard_normal(10, 5, 3, &mut rng)?;
//!
//! let report = designer.mlp_mut().fit(&data, &TrainConfig::default())?;
//! assert_eq!(report.reports.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod config;
pub mod data;
pub mod designer;
pub mod error;
pub mod layer;
pub mod loss;
pub(crate) mod matmul;
pub mod mlp;
pub mod optim;
pub mod report;
pub mod train;

pub use activation::Activation;
pub use builder::MlpBuilder;
pub use config::DesignerConfig;
pub use data::{Dataset, Inputs};
pub use designer::{CircuitDesigner, DesignOutput, FeatureVector, Recommendation};
pub use error::{Error, Result};
pub use layer::Layer;
pub use mlp::{BatchScratch, Gradients, Mlp, Scratch, Trainer};
pub use optim::{Optimizer, OptimizerState};
pub use train::{FitReport, StepReport, TrainConfig};
