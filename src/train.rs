use log::{info, trace};
use serde::Deserialize;

use crate::{Dataset, Error, Inputs, Mlp, Optimizer, Result, Trainer, loss};

/// Full-batch training configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Number of optimizer steps; every step sees the whole dataset once.
    pub steps: usize,
    /// Number of synthetic samples the `train` binary generates.
    pub samples: usize,
    pub lr: f32,
    /// Record (and log) the loss every `report_every` steps.
    pub report_every: usize,
    pub optimizer: Optimizer,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            samples: 10,
            lr: 1e-2,
            report_every: 5,
            optimizer: Optimizer::default(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(Error::InvalidConfig("steps must be > 0".to_owned()));
        }
        if self.samples == 0 {
            return Err(Error::InvalidConfig("samples must be > 0".to_owned()));
        }
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be > 0".to_owned()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lr must be finite and > 0, got {}",
                self.lr
            )));
        }
        self.optimizer.validate()
    }
}

/// Loss recorded at a reporting step (1-based).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub loss: f32,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    /// Loss of every step, measured before that step's update.
    pub losses: Vec<f32>,
    /// Every `report_every`-th step.
    pub reports: Vec<StepReport>,
}

impl FitReport {
    /// Loss measured at step 1.
    pub fn initial_loss(&self) -> f32 {
        self.losses.first().copied().unwrap_or(f32::NAN)
    }

    /// Loss measured at the last step.
    pub fn final_loss(&self) -> f32 {
        self.losses.last().copied().unwrap_or(f32::NAN)
    }
}

impl Mlp {
    /// Train on the whole dataset for `cfg.steps` optimizer steps.
    ///
    /// Each step runs every sample forward, takes the mean squared error over all
    /// outputs of the batch, backpropagates, and applies one optimizer update. There is
    /// no early stopping and no guard against non-finite losses.
    pub fn fit(&mut self, train: &Dataset, cfg: &TrainConfig) -> Result<FitReport> {
        self.fit_with(train, cfg, |_| {})
    }

    /// Like [`Mlp::fit`], calling `on_report` at each reporting step as it happens.
    pub fn fit_with<F>(
        &mut self,
        train: &Dataset,
        cfg: &TrainConfig,
        mut on_report: F,
    ) -> Result<FitReport>
    where
        F: FnMut(StepReport),
    {
        cfg.validate()?;
        if train.is_empty() {
            return Err(Error::InvalidData(
                "train dataset must not be empty".to_owned(),
            ));
        }
        if train.input_dim() != self.input_dim() {
            return Err(Error::DimensionMismatch {
                what: "train inputs",
                expected: self.input_dim(),
                got: train.input_dim(),
            });
        }
        if train.target_dim() != self.output_dim() {
            return Err(Error::DimensionMismatch {
                what: "train targets",
                expected: self.output_dim(),
                got: train.target_dim(),
            });
        }

        let mut opt = cfg.optimizer.state(self)?;
        let mut trainer = Trainer::new(self);
        let mut report = FitReport {
            losses: Vec::with_capacity(cfg.steps),
            reports: Vec::with_capacity(cfg.steps / cfg.report_every),
        };

        let inv_len = 1.0 / train.len() as f32;
        for step in 1..=cfg.steps {
            let loss = self.batch_gradients(train, &mut trainer, inv_len);
            opt.step(self, &mut trainer.batch_grads, cfg.lr);

            trace!("step {step}/{} loss={loss}", cfg.steps);
            report.losses.push(loss);
            if step % cfg.report_every == 0 {
                info!("step {step}/{} loss={loss:.4}", cfg.steps);
                let r = StepReport { step, loss };
                on_report(r);
                report.reports.push(r);
            }
        }

        Ok(report)
    }

    /// Mean loss over `train` and its gradient, accumulated into `trainer.batch_grads`.
    ///
    /// The per-sample MSE is a mean over outputs, so averaging it over samples gives the
    /// mean over every element of the batch.
    fn batch_gradients(&self, train: &Dataset, trainer: &mut Trainer, inv_len: f32) -> f32 {
        trainer.batch_grads.zero();

        let mut total = 0.0_f32;
        for idx in 0..train.len() {
            let input = train.input(idx);
            let target = train.target(idx);

            self.forward(input, &mut trainer.scratch);
            total += loss::mse_backward(
                trainer.scratch.output(),
                target,
                trainer.grads.d_output_mut(),
            );

            self.backward(input, &trainer.scratch, &mut trainer.grads);
            trainer.batch_grads.accumulate(&trainer.grads, inv_len);
        }

        total * inv_len
    }

    /// Predict outputs for inputs (X).
    ///
    /// Returns a flat buffer with shape `(len, output_dim)`; zero rows give an empty buffer.
    pub fn predict_inputs(&self, inputs: &Inputs) -> Result<Vec<f32>> {
        if inputs.input_dim() != self.input_dim() {
            return Err(Error::DimensionMismatch {
                what: "inputs",
                expected: self.input_dim(),
                got: inputs.input_dim(),
            });
        }

        let mut scratch = self.batch_scratch();
        Ok(self
            .forward_batch(inputs.as_flat(), inputs.len(), &mut scratch)
            .to_vec())
    }

    /// Evaluate mean MSE over a dataset.
    pub fn evaluate_mse(&self, data: &Dataset) -> Result<f32> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_dim() {
            return Err(Error::DimensionMismatch {
                what: "dataset inputs",
                expected: self.input_dim(),
                got: data.input_dim(),
            });
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::DimensionMismatch {
                what: "dataset targets",
                expected: self.output_dim(),
                got: data.target_dim(),
            });
        }

        let mut scratch = self.scratch();
        let mut total = 0.0_f32;
        for idx in 0..data.len() {
            self.forward(data.input(idx), &mut scratch);
            total += loss::mse(scratch.output(), data.target(idx));
        }
        Ok(total / data.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_setup(seed: u64) -> (Mlp, Dataset) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mlp = Mlp::new_with_rng(&[5, 10, 10, 3], &mut rng).unwrap();
        let data = Dataset::standard_normal(10, 5, 3, &mut rng).unwrap();
        (mlp, data)
    }

    #[test]
    fn config_validation() {
        assert!(TrainConfig::default().validate().is_ok());
        let bad = [
            TrainConfig {
                steps: 0,
                ..TrainConfig::default()
            },
            TrainConfig {
                samples: 0,
                ..TrainConfig::default()
            },
            TrainConfig {
                report_every: 0,
                ..TrainConfig::default()
            },
            TrainConfig {
                lr: f32::NAN,
                ..TrainConfig::default()
            },
            TrainConfig {
                lr: -0.1,
                ..TrainConfig::default()
            },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn first_recorded_loss_matches_evaluate_mse() {
        let (mut mlp, data) = small_setup(0);
        let before = mlp.evaluate_mse(&data).unwrap();
        let report = mlp.fit(&data, &TrainConfig::default()).unwrap();
        assert!((report.initial_loss() - before).abs() < 1e-5);
    }

    #[test]
    fn reports_every_fifth_step() {
        let (mut mlp, data) = small_setup(1);
        let report = mlp.fit(&data, &TrainConfig::default()).unwrap();

        assert_eq!(report.losses.len(), 20);
        let steps: Vec<usize> = report.reports.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![5, 10, 15, 20]);
        assert_eq!(report.reports[3].loss, report.final_loss());
    }

    #[test]
    fn fit_with_streams_reports_in_order() {
        let (mut mlp, data) = small_setup(1);
        let mut seen = Vec::new();
        let report = mlp
            .fit_with(&data, &TrainConfig::default(), |r| seen.push(r))
            .unwrap();
        assert_eq!(seen, report.reports);

        let (mut plain, _) = small_setup(1);
        let plain_report = plain.fit(&data, &TrainConfig::default()).unwrap();
        assert_eq!(plain_report.losses, report.losses);
    }

    #[test]
    fn fit_rejects_mismatched_targets() {
        let mut mlp = Mlp::new_with_seed(&[5, 10, 10, 5], 0).unwrap();
        let data = Dataset::standard_normal(4, 5, 3, &mut StdRng::seed_from_u64(0)).unwrap();
        let err = mlp.fit(&data, &TrainConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 5,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn sgd_also_reduces_loss_on_a_fixed_target() {
        let mut mlp = Mlp::new_with_seed(&[5, 10, 10, 3], 2).unwrap();
        let data = Dataset::from_flat(
            vec![0.5, -0.5, 1.0, 0.25, -1.0],
            vec![1.0, -1.0, 0.5],
            5,
            3,
        )
        .unwrap();
        let cfg = TrainConfig {
            steps: 50,
            lr: 0.05,
            optimizer: Optimizer::Sgd,
            ..TrainConfig::default()
        };
        let report = mlp.fit(&data, &cfg).unwrap();
        assert!(report.final_loss() < report.initial_loss());
    }

    #[test]
    fn predict_inputs_handles_empty_and_mismatched_batches() {
        let mlp = Mlp::new_with_seed(&[5, 10, 10, 3], 0).unwrap();
        let empty = Inputs::from_flat(Vec::new(), 5).unwrap();
        assert!(mlp.predict_inputs(&empty).unwrap().is_empty());

        let wrong = Inputs::from_flat(vec![0.0; 8], 4).unwrap();
        assert!(mlp.predict_inputs(&wrong).is_err());
    }
}
