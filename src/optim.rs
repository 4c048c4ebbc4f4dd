//! Optimizers.
//!
//! This module provides small, allocation-free-per-step optimizers that update an `Mlp`
//! given a set of `Gradients`.
//!
//! Optimizer *state* (Adam moments) lives outside the model. The training loop owns the
//! optimizer state and reuses it across steps.

use serde::Deserialize;

use crate::{Error, Gradients, Mlp, Result};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Optimizer choice for training.
pub enum Optimizer {
    /// Plain gradient descent.
    Sgd,
    /// Adam (bias-corrected).
    Adam {
        #[serde(default = "default_beta1")]
        beta1: f32,
        #[serde(default = "default_beta2")]
        beta2: f32,
        #[serde(default = "default_eps")]
        eps: f32,
    },
}

fn default_beta1() -> f32 {
    0.9
}

fn default_beta2() -> f32 {
    0.999
}

fn default_eps() -> f32 {
    1e-8
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer::Adam {
            beta1: default_beta1(),
            beta2: default_beta2(),
            eps: default_eps(),
        }
    }
}

impl Optimizer {
    /// Validate optimizer hyperparameters.
    pub fn validate(self) -> Result<()> {
        match self {
            Optimizer::Sgd => Ok(()),
            Optimizer::Adam { beta1, beta2, eps } => {
                if !(beta1.is_finite() && (0.0..1.0).contains(&beta1)) {
                    return Err(Error::InvalidConfig(format!(
                        "adam beta1 must be finite and in [0,1), got {beta1}"
                    )));
                }
                if !(beta2.is_finite() && (0.0..1.0).contains(&beta2)) {
                    return Err(Error::InvalidConfig(format!(
                        "adam beta2 must be finite and in [0,1), got {beta2}"
                    )));
                }
                if !(eps.is_finite() && eps > 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "adam eps must be finite and > 0, got {eps}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Allocate optimizer state for `model`.
    pub fn state(self, model: &Mlp) -> Result<OptimizerState> {
        self.validate()?;

        match self {
            Optimizer::Sgd => Ok(OptimizerState::Sgd),
            Optimizer::Adam { beta1, beta2, eps } => {
                let (mw, mb) = zeros_like_params(model);
                let (vw, vb) = zeros_like_params(model);
                Ok(OptimizerState::Adam {
                    beta1,
                    beta2,
                    eps,
                    t: 0,
                    beta1_pow: 1.0,
                    beta2_pow: 1.0,
                    m_weights: mw,
                    m_biases: mb,
                    v_weights: vw,
                    v_biases: vb,
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
/// Owned optimizer state.
pub enum OptimizerState {
    /// Plain gradient descent (no state).
    Sgd,
    /// Adam state.
    Adam {
        beta1: f32,
        beta2: f32,
        eps: f32,
        t: u64,
        beta1_pow: f32,
        beta2_pow: f32,
        m_weights: Vec<Vec<f32>>,
        m_biases: Vec<Vec<f32>>,
        v_weights: Vec<Vec<f32>>,
        v_biases: Vec<Vec<f32>>,
    },
}

impl OptimizerState {
    /// Apply one optimizer step.
    ///
    /// For Adam, `grads` is overwritten with the update direction.
    pub fn step(&mut self, model: &mut Mlp, grads: &mut Gradients, lr: f32) {
        assert!(lr.is_finite() && lr > 0.0, "lr must be finite and > 0");

        match self {
            OptimizerState::Sgd => {
                model.sgd_step(grads, lr);
            }
            OptimizerState::Adam {
                beta1,
                beta2,
                eps,
                t,
                beta1_pow,
                beta2_pow,
                m_weights,
                m_biases,
                v_weights,
                v_biases,
            } => {
                *t += 1;
                *beta1_pow *= *beta1;
                *beta2_pow *= *beta2;

                let moments = AdamMoments {
                    beta1: *beta1,
                    beta2: *beta2,
                    eps: *eps,
                    corr1: 1.0 - *beta1_pow,
                    corr2: 1.0 - *beta2_pow,
                };

                for layer_idx in 0..model.num_layers() {
                    moments.apply(
                        grads.d_weights_mut(layer_idx),
                        &mut m_weights[layer_idx],
                        &mut v_weights[layer_idx],
                    );
                    moments.apply(
                        grads.d_biases_mut(layer_idx),
                        &mut m_biases[layer_idx],
                        &mut v_biases[layer_idx],
                    );
                }

                model.sgd_step(grads, lr);
            }
        }
    }

    /// Number of updates applied so far (always 0 for plain SGD).
    pub fn steps_taken(&self) -> u64 {
        match self {
            OptimizerState::Sgd => 0,
            OptimizerState::Adam { t, .. } => *t,
        }
    }
}

struct AdamMoments {
    beta1: f32,
    beta2: f32,
    eps: f32,
    corr1: f32,
    corr2: f32,
}

impl AdamMoments {
    /// Update the moments from `g` and overwrite `g` with the bias-corrected direction.
    #[inline]
    fn apply(&self, g: &mut [f32], m: &mut [f32], v: &mut [f32]) {
        debug_assert_eq!(g.len(), m.len());
        debug_assert_eq!(g.len(), v.len());

        for i in 0..g.len() {
            let gi = g[i];
            m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * gi;
            v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * (gi * gi);

            let m_hat = m[i] / self.corr1;
            let v_hat = v[i] / self.corr2;
            g[i] = m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}

fn zeros_like_params(model: &Mlp) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    let mut ws = Vec::with_capacity(model.num_layers());
    let mut bs = Vec::with_capacity(model.num_layers());
    for i in 0..model.num_layers() {
        let layer = model.layer(i).expect("layer idx must be valid");
        ws.push(vec![0.0; layer.in_dim() * layer.out_dim()]);
        bs.push(vec![0.0; layer.out_dim()]);
    }
    (ws, bs)
}
